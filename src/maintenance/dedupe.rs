use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{self, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use spdlog::{error, info, warn};

use crate::maintenance::{list_images, SourceImage};

const BUFFER_SIZE: usize = 64 * 1024;

/// Originals sharing one content hash. `keep` is the oldest copy.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub hash: String,
    pub keep: SourceImage,
    pub duplicates: Vec<SourceImage>,
}

#[derive(Debug, Clone, Default)]
pub struct DedupeOptions {
    pub dry_run: bool,
    pub backup_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DedupeReport {
    pub groups: usize,
    pub removed: usize,
    pub moved: usize,
    pub failed: usize,
}

/// Hex-encoded blake3 of the file contents.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut hasher = blake3::Hasher::new();
    let mut buffer = [0u8; BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buffer[..n]);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(hex::encode(hasher.finalize().as_bytes()))
}

fn modified(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Groups the originals by content. Only hashes seen more than once are returned,
/// in the order their first file was listed.
pub fn find_duplicates(dir: &Path) -> io::Result<Vec<DuplicateGroup>> {
    let mut order: Vec<String> = vec![];
    let mut by_hash: HashMap<String, Vec<(SystemTime, SourceImage)>> = HashMap::new();

    for image in list_images(dir)? {
        let hash = match hash_file(&image.path) {
            Ok(hash) => hash,
            Err(e) => {
                warn!("Error hashing {}: {}", image.path.display(), e);
                continue;
            }
        };
        let entry = by_hash.entry(hash.clone()).or_default();
        if entry.is_empty() {
            order.push(hash);
        }
        entry.push((modified(&image.path), image));
    }

    let mut groups = vec![];
    for hash in order {
        let Some(mut files) = by_hash.remove(&hash) else {
            continue;
        };
        if files.len() < 2 {
            continue;
        }
        files.sort_by(|(a_time, a), (b_time, b)| a_time.cmp(b_time).then_with(|| a.key.cmp(&b.key)));
        let mut files = files.into_iter().map(|(_, image)| image);
        let Some(keep) = files.next() else {
            continue;
        };
        groups.push(DuplicateGroup { hash, keep, duplicates: files.collect() });
    }

    Ok(groups)
}

/// `rename` cannot cross filesystems, so a failed rename is retried as copy and remove.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

enum Disposal {
    Removed,
    Moved(PathBuf),
}

fn dispose(duplicate: &SourceImage, backup_dir: Option<&Path>) -> Result<Disposal> {
    let Some(backup_dir) = backup_dir else {
        fs::remove_file(&duplicate.path)
            .with_context(|| format!("Error removing {}", duplicate.path.display()))?;
        return Ok(Disposal::Removed);
    };

    let target = backup_dir.join(&duplicate.key);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Error creating {}", parent.display()))?;
    }
    move_file(&duplicate.path, &target)
        .with_context(|| format!("Error moving {} to {}", duplicate.path.display(), target.display()))?;
    Ok(Disposal::Moved(target))
}

/// Removes every copy except the oldest, or moves them under `backup_dir`
/// keeping their `category/file` layout. A file that cannot be removed or moved
/// is logged and counted as failed, and the run goes on.
pub fn remove_duplicates(dir: &Path, options: &DedupeOptions) -> Result<DedupeReport> {
    let groups = find_duplicates(dir)
        .with_context(|| format!("Error scanning {} for duplicates", dir.display()))?;

    let mut report = DedupeReport { groups: groups.len(), ..Default::default() };
    for group in groups.iter() {
        info!("Keeping {} ({})", group.keep.key, &group.hash[..16]);
        for duplicate in group.duplicates.iter() {
            if options.dry_run {
                info!("Would remove duplicate {}", duplicate.key);
                continue;
            }

            match dispose(duplicate, options.backup_dir.as_deref()) {
                Ok(Disposal::Removed) => {
                    info!("Removed duplicate {}", duplicate.key);
                    report.removed += 1;
                }
                Ok(Disposal::Moved(target)) => {
                    info!("Moved duplicate {} to {}", duplicate.key, target.display());
                    report.moved += 1;
                }
                Err(e) => {
                    error!("Error disposing of duplicate {}: {:#}", duplicate.key, e);
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}
