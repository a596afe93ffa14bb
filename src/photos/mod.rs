use std::io;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content::render_body;
use crate::tags::Tagged;

pub mod loader;

pub use loader::PhotoSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Dimensions {
    pub fn orientation(&self) -> Orientation {
        if self.height > self.width {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }
}

/// One value of the metadata JSON document, keyed by file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotoEntry {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Dimensions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    /// Key in the metadata document, `file.jpg` or `category/file.jpg`.
    pub key: String,
    pub category: Option<String>,
    pub src: String,
    pub thumb_src: String,
    pub alt: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub metadata: Map<String, Value>,
    pub dimensions: Option<Dimensions>,
    pub extra: Map<String, Value>,
}

/// Splits `category/file.jpg` into its category and file name.
pub fn split_key(key: &str) -> (Option<&str>, &str) {
    match key.rsplit_once('/') {
        Some((category, file_name)) if !category.is_empty() => (Some(category), file_name),
        Some((_, file_name)) => (None, file_name),
        None => (None, key),
    }
}

pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[..pos],
        _ => file_name,
    }
}

pub fn thumb_file_name(file_name: &str) -> String {
    format!("{}-thumb.jpg", strip_extension(file_name))
}

impl Photo {
    pub fn from_entry(key: &str, entry: PhotoEntry, web_prefix: &str) -> Photo {
        let (category, file_name) = split_key(key);
        let id = strip_extension(file_name).to_string();
        let thumb_src = match category {
            Some(category) => format!("{}/{}/{}", web_prefix, category, thumb_file_name(file_name)),
            None => format!("{}/{}", web_prefix, thumb_file_name(file_name)),
        };

        Photo {
            src: format!("{}/{}", web_prefix, key),
            thumb_src,
            alt: entry.title.clone(),
            id,
            key: key.to_string(),
            category: category.map(|c| c.to_string()),
            title: entry.title,
            description: entry.description,
            tags: entry.tags,
            metadata: entry.metadata,
            dimensions: entry.dimensions,
            extra: entry.extra,
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.dimensions.map(|d| d.orientation())
    }

    pub fn is_portrait(&self) -> bool {
        self.orientation() == Some(Orientation::Portrait)
    }

    /// Renders the markdown description on demand.
    pub fn description_html(&self) -> io::Result<String> {
        Ok(render_body(&self.description)?.html)
    }

    /// Metadata values as display strings, in document order.
    pub fn metadata_strings(&self) -> Vec<(String, String)> {
        self.metadata.iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    v => v.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }

    pub fn link(&self) -> String {
        format!("/photos/{}", self.id)
    }
}

impl Tagged for Photo {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}
