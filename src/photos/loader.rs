use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use spdlog::{error, warn};

use crate::photos::{Photo, PhotoEntry};
use crate::tags;

pub const DEFAULT_WEB_PREFIX: &str = "/photos/web";

/// Reads the metadata document as ordered `(key, entry)` pairs.
/// Entries that do not match the expected shape are logged and skipped.
pub fn read_entries(metadata_path: &Path) -> io::Result<Vec<(String, PhotoEntry)>> {
    let raw = fs::read_to_string(metadata_path)?;
    let document: Map<String, Value> = match serde_json::from_str(&raw) {
        Ok(document) => document,
        Err(e) => {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                format!("Invalid photo metadata: {} - file={}", e, metadata_path.display()),
            ));
        }
    };

    let mut entries = Vec::with_capacity(document.len());
    for (key, value) in document {
        match serde_json::from_value::<PhotoEntry>(value) {
            Ok(entry) => entries.push((key, entry)),
            Err(e) => warn!("Skipping photo metadata entry {}: {}", key, e),
        }
    }
    Ok(entries)
}

/// Handle to the photo metadata JSON. Every call reads from disk.
#[derive(Debug, Clone)]
pub struct PhotoSource {
    pub metadata_path: PathBuf,
    pub web_prefix: String,
}

impl PhotoSource {
    pub fn new<P: Into<PathBuf>>(metadata_path: P) -> Self {
        PhotoSource {
            metadata_path: metadata_path.into(),
            web_prefix: DEFAULT_WEB_PREFIX.to_string(),
        }
    }

    /// All photos in document order. A missing or unreadable document yields none.
    pub fn all_photos(&self) -> Vec<Photo> {
        let entries = match read_entries(&self.metadata_path) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Error reading photo metadata {}: {}", self.metadata_path.display(), e);
                return vec![];
            }
        };

        entries.into_iter()
            .map(|(key, entry)| Photo::from_entry(&key, entry, &self.web_prefix))
            .collect()
    }

    pub fn photo_by_id(&self, id: &str) -> io::Result<Photo> {
        match self.all_photos().into_iter().find(|p| p.id == id) {
            Some(photo) => Ok(photo),
            None => Err(io::Error::new(ErrorKind::NotFound, format!("Photo not found: {}", id))),
        }
    }

    pub fn photos_by_tag(&self, tag: &str) -> Vec<Photo> {
        self.all_photos().into_iter()
            .filter(|p| tags::Tagged::has_tag(p, tag))
            .collect()
    }

    pub fn all_tags(&self) -> Vec<String> {
        tags::all_tags(&self.all_photos())
    }

    /// Sorted categories of photos keyed as `category/file`.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self.all_photos().into_iter()
            .filter_map(|p| p.category)
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }
}
