use std::{fs, io};
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;

use crate::content::parsing_utils::parse_front_matter;
use crate::content::{render_body, RenderedBody};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageHeader {
    title: String,
}

/// A standalone markdown page such as `about.md`.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub name: String,
    pub title: String,
    pub body: RenderedBody,
}

pub fn load_page(pages_dir: &Path, name: &str) -> io::Result<Page> {
    if name.is_empty() || name.contains('/') || name.contains("..") {
        return Err(io::Error::new(ErrorKind::NotFound, format!("Invalid page name: {}", name)));
    }

    let path = pages_dir.join(format!("{}.md", name));
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(io::Error::new(ErrorKind::NotFound, format!("Page not found: {}", path.display())));
        }
        Err(e) => return Err(e),
    };

    let (header, body) = parse_front_matter::<PageHeader>(&path, &raw)?;
    Ok(Page {
        name: name.to_string(),
        title: header.title,
        body: render_body(body)?,
    })
}
