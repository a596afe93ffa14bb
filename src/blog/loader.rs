use std::{fs, io};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use spdlog::{debug, warn};

use crate::blog::{FrontMatter, Post, PostMetadata};
use crate::content::parsing_utils::parse_front_matter;
use crate::content::render_body;

const POST_EXTENSION: &str = "md";

/// Handle to a directory of `<slug>.md` posts. Every call reads from disk.
#[derive(Debug, Clone)]
pub struct BlogSource {
    pub root_dir: PathBuf,
}

impl BlogSource {
    pub fn new<P: Into<PathBuf>>(root_dir: P) -> Self {
        BlogSource { root_dir: root_dir.into() }
    }

    /// Post files sorted by file name.
    fn post_files(&self) -> io::Result<Vec<PathBuf>> {
        let mut files = vec![];
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(POST_EXTENSION) {
                files.push(path);
            }
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    fn files_or_empty(&self) -> Vec<PathBuf> {
        if !self.root_dir.is_dir() {
            warn!("Blog directory not found: {}", self.root_dir.display());
            return vec![];
        }

        match self.post_files() {
            Ok(files) => files,
            Err(e) => {
                warn!("Error listing blog directory {}: {}", self.root_dir.display(), e);
                vec![]
            }
        }
    }

    pub fn slugs(&self) -> Vec<String> {
        self.files_or_empty().iter()
            .filter_map(|path| slug_of(path))
            .collect()
    }

    /// Metadata of every post, most recent first. Equal dates keep file name order.
    /// Files with broken front-matter are logged and left out.
    pub fn all_posts(&self) -> Vec<PostMetadata> {
        let files = self.files_or_empty();

        let loaded: Vec<Option<PostMetadata>> = files.par_iter()
            .map(|path| match read_metadata(path) {
                Ok(meta) => Some(meta),
                Err(e) => {
                    warn!("Skipping post {}: {}", path.display(), e);
                    None
                }
            })
            .collect();

        let mut posts: Vec<PostMetadata> = loaded.into_iter().flatten().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    /// Loads one post and renders its body. Related posts pointing to missing slugs are dropped.
    pub fn post_by_slug(&self, slug: &str) -> io::Result<Post> {
        if !is_valid_slug(slug) {
            return Err(io::Error::new(ErrorKind::NotFound, format!("Invalid post slug: {}", slug)));
        }

        let path = self.root_dir.join(format!("{}.{}", slug, POST_EXTENSION));
        if !path.is_file() {
            return Err(io::Error::new(ErrorKind::NotFound, format!("Post not found: {}", slug)));
        }

        let raw = fs::read_to_string(&path)?;
        let (front_matter, body) = parse_front_matter::<FrontMatter>(&path, &raw)?;
        let mut metadata = PostMetadata::new(slug.to_string(), front_matter, body);

        let existing: HashSet<String> = self.slugs().into_iter().collect();
        metadata.related_posts.retain(|related| {
            let found = existing.contains(&related.slug);
            if !found {
                warn!("Post {} references missing related post {}", slug, related.slug);
            }
            found
        });

        debug!("Rendering post {}", slug);
        let rendered = render_body(body)?;

        Ok(Post {
            metadata,
            content: body.to_string(),
            content_html: rendered.html,
            toc: rendered.toc,
            sections: rendered.sections,
        })
    }
}

fn slug_of(path: &Path) -> Option<String> {
    path.file_stem().and_then(|s| s.to_str()).map(|s| s.to_string())
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && !slug.contains('/') && !slug.contains('\\') && !slug.contains("..")
}

fn read_metadata(path: &Path) -> io::Result<PostMetadata> {
    let slug = match slug_of(path) {
        Some(slug) => slug,
        None => return Err(io::Error::new(ErrorKind::InvalidData, format!("Invalid file name: {}", path.display()))),
    };

    let raw = fs::read_to_string(path)?;
    let (front_matter, body) = parse_front_matter::<FrontMatter>(path, &raw)?;
    Ok(PostMetadata::new(slug, front_matter, body))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::blog::RelatedPost;

    use super::*;

    fn write_post(dir: &Path, slug: &str, contents: &str) {
        fs::write(dir.join(format!("{}.md", slug)), contents).unwrap();
    }

    fn post(title: &str, date: &str, tags: &str) -> String {
        format!("---\ntitle: {}\ndate: \"{}\"\ntags: [{}]\n---\nSome body text\n", title, date, tags)
    }

    fn blog_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_post(dir.path(), "b-older", &post("Older", "2023-01-10", "rust"));
        write_post(dir.path(), "c-newest", &post("Newest", "2024-05-01", "rust, web"));
        write_post(dir.path(), "a-tie", &post("Tie A", "2023-06-15", "web"));
        write_post(dir.path(), "d-tie", &post("Tie D", "2023-06-15", "travel"));
        fs::write(dir.path().join("notes.txt"), "not a post").unwrap();
        dir
    }

    #[test]
    fn test_all_posts_sorted() {
        let dir = blog_dir();
        let source = BlogSource::new(dir.path());
        let slugs: Vec<_> = source.all_posts().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, ["c-newest", "a-tie", "d-tie", "b-older"]);
    }

    #[test]
    fn test_metadata_fields() {
        let dir = blog_dir();
        let posts = BlogSource::new(dir.path()).all_posts();
        let newest = &posts[0];
        assert_eq!(newest.title, "Newest");
        assert_eq!(newest.date, "2024-05-01");
        assert_eq!(newest.tags, ["rust", "web"]);
        assert_eq!(newest.read_time, "Less than 1 min read");
        assert_eq!(newest.link(), "/blog/c-newest");
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let source = BlogSource::new(dir.path().join("missing"));
        assert!(source.all_posts().is_empty());
        assert!(source.slugs().is_empty());
    }

    #[test]
    fn test_broken_post_skipped_in_listing() {
        let dir = blog_dir();
        write_post(dir.path(), "broken", "---\ntitle: [oops\n---\nbody");
        let source = BlogSource::new(dir.path());
        assert_eq!(source.all_posts().len(), 4);

        let err = source.post_by_slug("broken").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn test_slugs() {
        let dir = blog_dir();
        let source = BlogSource::new(dir.path());
        assert_eq!(source.slugs(), ["a-tie", "b-older", "c-newest", "d-tie"]);
    }

    #[test]
    fn test_post_by_slug_not_found() {
        let dir = blog_dir();
        let source = BlogSource::new(dir.path());
        assert_eq!(source.post_by_slug("nope").err().unwrap().kind(), ErrorKind::NotFound);
        assert_eq!(source.post_by_slug("../b-older").err().unwrap().kind(), ErrorKind::NotFound);
        assert_eq!(source.post_by_slug("").err().unwrap().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_dangling_related_post_dropped() {
        let dir = blog_dir();
        let raw = "---
title: With related
date: \"2024-02-02\"
author:
  name: Jane Doe
  avatar: /public/jane.jpg
  bio: Writes things
relatedPosts:
  - slug: b-older
    title: Older
  - slug: ghost
    title: Does not exist
  - slug: a-tie
    title: Tie A
---
## First

Body with ![pic](x.jpg)
";
        write_post(dir.path(), "related", raw);
        let source = BlogSource::new(dir.path());

        let listed = source.all_posts().into_iter().find(|p| p.slug == "related").unwrap();
        assert_eq!(listed.related_posts.len(), 3);

        let post = source.post_by_slug("related").unwrap();
        assert_eq!(post.metadata.related_posts, vec![
            RelatedPost { slug: "b-older".to_string(), title: "Older".to_string() },
            RelatedPost { slug: "a-tie".to_string(), title: "Tie A".to_string() },
        ]);
        assert_eq!(post.metadata.title, listed.title);
        assert_eq!(post.metadata.author, listed.author);
        assert_eq!(post.metadata.read_time, listed.read_time);
        assert!(post.content.starts_with("## First"));
        assert!(post.content_html.contains("<h2 id=\"first\">"));
        assert_eq!(post.toc.len(), 1);
    }

    #[test]
    fn test_rendering_is_repeatable() {
        let dir = blog_dir();
        write_post(dir.path(), "coll", "---\ntitle: C\n---\n:::collapsible[More]{open}\nHidden\n:::\n");
        let source = BlogSource::new(dir.path());
        let first = source.post_by_slug("coll").unwrap();
        let second = source.post_by_slug("coll").unwrap();
        assert_eq!(first, second);
        assert_eq!(first.sections.len(), 1);
        assert!(first.sections[0].open);
    }
}
