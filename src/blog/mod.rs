use serde::{Deserialize, Serialize};

use crate::content::{CollapsibleSection, TocEntry};
use crate::tags::Tagged;

pub mod loader;
pub mod read_time;

pub use loader::BlogSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub avatar: String,
    pub bio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelatedPost {
    pub slug: String,
    pub title: String,
}

/// YAML header of a post file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub image: String,
    pub read_time: Option<String>,
    pub author: Author,
    pub related_posts: Vec<RelatedPost>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostMetadata {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub tags: Vec<String>,
    pub excerpt: String,
    pub image: String,
    pub category: Option<String>,
    pub read_time: String,
    pub author: Author,
    pub related_posts: Vec<RelatedPost>,
}

impl PostMetadata {
    pub fn new(slug: String, front_matter: FrontMatter, body: &str) -> Self {
        let read_time = match front_matter.read_time {
            Some(read_time) if !read_time.trim().is_empty() => read_time,
            _ => read_time::estimate(body),
        };

        PostMetadata {
            slug,
            title: front_matter.title,
            date: front_matter.date,
            tags: front_matter.tags,
            excerpt: front_matter.excerpt,
            image: front_matter.image,
            category: front_matter.category,
            read_time,
            author: front_matter.author,
            related_posts: front_matter.related_posts,
        }
    }

    pub fn link(&self) -> String {
        format!("/blog/{}", self.slug)
    }
}

impl Tagged for PostMetadata {
    fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// A fully loaded post. The HTML is rebuilt from `content` on every load.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub metadata: PostMetadata,
    pub content: String,
    pub content_html: String,
    pub toc: Vec<TocEntry>,
    pub sections: Vec<CollapsibleSection>,
}

impl Tagged for Post {
    fn tags(&self) -> &[String] {
        &self.metadata.tags
    }
}
