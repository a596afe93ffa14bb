use std::{fs, io};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use spdlog::info;

use crate::photos::PhotoEntry;

/// Editable copy of the photo metadata document. Keeps key order and only writes
/// back when an entry actually changed.
#[derive(Debug)]
pub struct MetadataStore {
    path: PathBuf,
    entries: Vec<(String, PhotoEntry)>,
    dirty: bool,
}

impl MetadataStore {
    /// A missing file is an empty document. A malformed one is an error, since writing
    /// it back would lose whatever could not be read.
    pub fn open(path: &Path) -> io::Result<MetadataStore> {
        let entries = if path.exists() {
            let raw = fs::read_to_string(path)?;
            Self::parse(path, &raw)?
        } else {
            vec![]
        };

        Ok(MetadataStore { path: path.to_path_buf(), entries, dirty: false })
    }

    fn parse(path: &Path, raw: &str) -> io::Result<Vec<(String, PhotoEntry)>> {
        let invalid = |e: serde_json::Error| io::Error::new(
            ErrorKind::InvalidData,
            format!("Invalid photo metadata: {} - file={}", e, path.display()),
        );

        let document: Map<String, Value> = serde_json::from_str(raw).map_err(invalid)?;
        document.into_iter()
            .map(|(key, value)| Ok((key, serde_json::from_value(value).map_err(invalid)?)))
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&PhotoEntry> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn insert(&mut self, key: &str, entry: PhotoEntry) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((key.to_string(), entry)),
        }
        self.dirty = true;
    }

    /// Applies `f` to the entry and marks the store dirty only if it returned true.
    pub fn update<F>(&mut self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut PhotoEntry) -> bool,
    {
        let changed = match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, entry)) => f(entry),
            None => false,
        };
        self.dirty |= changed;
        changed
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> io::Result<String> {
        let mut document = Map::new();
        for (key, entry) in self.entries.iter() {
            document.insert(key.clone(), serde_json::to_value(entry)?);
        }
        Ok(serde_json::to_string_pretty(&Value::Object(document))?)
    }

    /// Returns whether the file was written.
    pub fn save_if_dirty(&mut self) -> io::Result<bool> {
        if !self.dirty {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.to_json()?)?;
        self.dirty = false;
        info!("Photo metadata written to {}", self.path.display());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use crate::photos::Dimensions;
    use crate::test_data::PHOTO_METADATA;

    use super::*;

    #[test]
    fn test_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, PHOTO_METADATA).unwrap();

        let store = MetadataStore::open(&path).unwrap();
        assert_eq!(store.len(), 4);
        let json = store.to_json().unwrap();
        let harbor = json.find("\"harbor.jpg\"").unwrap();
        let fog = json.find("\"landscape/fog.jpg\"").unwrap();
        let dunes = json.find("\"dunes.png\"").unwrap();
        assert!(harbor < fog && fog < dunes);
        assert!(json.starts_with("{\n  \"harbor.jpg\": {\n    \"title\": \"Harbor Lights\""));
    }

    #[test]
    fn test_update_tracks_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photos/metadata.json");
        let mut store = MetadataStore::open(&path).unwrap();
        assert!(store.is_empty());
        assert!(!store.save_if_dirty().unwrap());

        store.insert("a.jpg", PhotoEntry { title: "A".to_string(), ..Default::default() });
        assert!(store.save_if_dirty().unwrap());
        assert!(!store.is_dirty());

        assert!(!store.update("a.jpg", |_| false));
        assert!(!store.update("missing.jpg", |_| true));
        assert!(!store.is_dirty());

        assert!(store.update("a.jpg", |e| {
            e.dimensions = Some(Dimensions { width: 3, height: 2 });
            true
        }));
        assert!(store.save_if_dirty().unwrap());

        let reopened = MetadataStore::open(&path).unwrap();
        assert_eq!(reopened.get("a.jpg").unwrap().dimensions, Some(Dimensions { width: 3, height: 2 }));
    }

    #[test]
    fn test_malformed_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metadata.json");
        fs::write(&path, r#"{"a.jpg": {"tags": 3}}"#).unwrap();
        assert_eq!(MetadataStore::open(&path).err().unwrap().kind(), ErrorKind::InvalidData);
    }
}
