use std::io;

pub mod collapsible;
pub mod headings;
pub mod markdown_renderer;
pub mod parsing_utils;

pub use collapsible::CollapsibleSection;
pub use headings::TocEntry;

/// A markdown body turned into HTML, with the outline a page needs for its widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedBody {
    pub html: String,
    pub toc: Vec<TocEntry>,
    pub sections: Vec<CollapsibleSection>,
}

pub fn render_body(md_text: &str) -> io::Result<RenderedBody> {
    let blocks = collapsible::parse_blocks(md_text);
    let sections = collapsible::sections(&blocks);
    let html = collapsible::render_blocks(&blocks)?;
    let (html, toc) = headings::anchor_headings(&html);

    Ok(RenderedBody { html, toc, sections })
}
