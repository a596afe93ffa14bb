//! Offline jobs over the originals directory. Never called while serving.

use std::{fs, io};
use std::path::{Path, PathBuf};

pub mod dedupe;
pub mod exif_fields;
pub mod image_processor;
pub mod metadata_store;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// An original image and the key it has in the metadata document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceImage {
    pub path: PathBuf,
    pub key: String,
    pub category: Option<String>,
    pub file_name: String,
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.iter().any(|x| x.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}

fn sorted_entries(dir: &Path) -> io::Result<Vec<fs::DirEntry>> {
    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

/// Images directly under `dir` (keyed by file name) and one level of category
/// directories below it (keyed `category/file`), sorted by name.
pub fn list_images(dir: &Path) -> io::Result<Vec<SourceImage>> {
    let mut root_images = vec![];
    let mut categorized = vec![];

    for entry in sorted_entries(dir)? {
        let file_type = entry.file_type()?;
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }

        if file_type.is_file() && is_image(&entry.path()) {
            root_images.push(SourceImage {
                path: entry.path(),
                key: name.clone(),
                category: None,
                file_name: name,
            });
        } else if file_type.is_dir() {
            for sub in sorted_entries(&entry.path())? {
                let Some(file_name) = sub.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if sub.file_type()?.is_file() && is_image(&sub.path()) && !file_name.starts_with('.') {
                    categorized.push(SourceImage {
                        path: sub.path(),
                        key: format!("{}/{}", name, file_name),
                        category: Some(name.clone()),
                        file_name,
                    });
                }
            }
        }
    }

    root_images.extend(categorized);
    Ok(root_images)
}
