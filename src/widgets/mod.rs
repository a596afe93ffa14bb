//! Page widget state driven by the data the renderer already produced
//! (collapsible sections, heading outline, photo viewer).

pub mod sections;
pub mod toc;
pub mod viewer;

pub use sections::SectionToggles;
pub use toc::TableOfContents;
pub use viewer::{BackToTop, FullscreenViewer, ViewerKey};
