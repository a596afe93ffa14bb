use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rayon::prelude::*;
use spdlog::{error, info, warn};

use crate::config::Config;
use crate::site::{LinkStyle, Site, TagDirs};
use crate::tags::all_tags;

const DEFAULT_OUTPUT_DIR: &str = "out";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct BuildReport {
    pub pages: usize,
    pub posts: usize,
    pub photos: usize,
    pub failed: usize,
    pub files_copied: usize,
}

fn write_page(out_dir: &Path, rel_dir: &str, html: &str) -> Result<()> {
    let dir = if rel_dir.is_empty() { out_dir.to_path_buf() } else { out_dir.join(rel_dir) };
    fs::create_dir_all(&dir).with_context(|| format!("Error creating {}", dir.display()))?;
    let path = dir.join("index.html");
    fs::write(&path, html).with_context(|| format!("Error writing {}", path.display()))
}

fn copy_dir(from: &Path, to: &Path) -> Result<usize> {
    let mut copied = 0;
    fs::create_dir_all(to).with_context(|| format!("Error creating {}", to.display()))?;
    for entry in fs::read_dir(from).with_context(|| format!("Error reading {}", from.display()))? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Error copying {} to {}", entry.path().display(), target.display()))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Renders the site into `paths.output_dir` using directory-style links.
pub fn build_site(config: &Config) -> Result<BuildReport> {
    let out_dir = config.paths.output_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    let mut site = Site::new(config.clone(), LinkStyle::Query);
    let posts = site.blog.all_posts();
    let photos = site.photos.all_photos();
    // Listing links and output directories come from the same map
    let tag_dirs = TagDirs::new(all_tags(&posts).into_iter().chain(all_tags(&photos)));
    site.links = LinkStyle::Static(tag_dirs.clone());
    let mut report = BuildReport::default();

    info!("Building site into {}", out_dir.display());
    fs::create_dir_all(&out_dir).with_context(|| format!("Error creating {}", out_dir.display()))?;

    write_page(&out_dir, "", &site.render_index()?)?;
    write_page(&out_dir, "contact", &site.render_contact(false)?)?;
    report.pages += 2;

    match site.render_about() {
        Ok(html) => {
            write_page(&out_dir, "about", &html)?;
            report.pages += 1;
        }
        Err(e) => warn!("Skipping about page: {}", e),
    }

    // Blog listings, all posts first and then one set of pages per tag
    let mut listings: Vec<Option<String>> = vec![None];
    listings.extend(all_tags(&posts).into_iter().map(Some));
    for tag in listings {
        let base = match tag {
            Some(ref tag) => format!("blog/tag/{}", tag_dirs.get(tag)),
            None => "blog".to_string(),
        };
        for page in 1..=site.blog_page_count(&posts, tag.as_deref()) {
            let html = site.render_blog_list_of(&posts, tag.clone(), page)?;
            let rel_dir = if page == 1 { base.clone() } else { format!("{}/page/{}", base, page) };
            write_page(&out_dir, &rel_dir, &html)?;
            report.pages += 1;
        }
    }

    let rendered: Vec<(String, Result<String>)> = posts.par_iter()
        .map(|post| (post.slug.clone(), site.render_post(&post.slug).map_err(anyhow::Error::from)))
        .collect();
    for (slug, html) in rendered {
        match html {
            Ok(html) => {
                write_page(&out_dir, &format!("blog/{}", slug), &html)?;
                report.posts += 1;
            }
            Err(e) => {
                error!("Error rendering post {}: {}", slug, e);
                report.failed += 1;
            }
        }
    }

    write_page(&out_dir, "photos", &site.render_photo_list_of(&photos, None)?)?;
    report.pages += 1;
    for tag in all_tags(&photos) {
        let html = site.render_photo_list_of(&photos, Some(tag.clone()))?;
        write_page(&out_dir, &format!("photos/tag/{}", tag_dirs.get(&tag)), &html)?;
        report.pages += 1;
    }
    for photo in photos.iter() {
        match site.render_photo(&photo.id, None) {
            Ok(html) => {
                write_page(&out_dir, &format!("photos/{}", photo.id), &html)?;
                report.photos += 1;
            }
            Err(e) => {
                error!("Error rendering photo {}: {}", photo.id, e);
                report.failed += 1;
            }
        }
    }

    let feed_path = out_dir.join("feed.xml");
    fs::write(&feed_path, site.render_feed()?).with_context(|| format!("Error writing {}", feed_path.display()))?;

    for (from, to) in [(&config.paths.public_dir, out_dir.join("public")), (&config.images.web_dir, out_dir.join("photos/web"))] {
        if from.is_dir() {
            report.files_copied += copy_dir(from, &to)?;
        } else {
            warn!("Nothing to copy from {}", from.display());
        }
    }

    info!("Site built: {} pages, {} posts, {} photos, {} failed",
        report.pages, report.posts, report.photos, report.failed);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use crate::config::parse_config;
    use crate::test_data::{CONFIG_DATA, PHOTO_METADATA, POST_DATA};

    use super::*;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn config(root: &Path) -> Config {
        let mut config = parse_config(CONFIG_DATA).unwrap();
        config.paths.template_dir = root.join("tpl");
        config.paths.blog_dir = root.join("blog");
        config.paths.pages_dir = root.join("pages");
        config.paths.public_dir = root.join("public");
        config.paths.photo_metadata = root.join("photos.json");
        config.paths.output_dir = Some(root.join("out"));
        config.images.web_dir = root.join("web");
        config.defaults.page_size = 1;

        write(root, "tpl/bloglist.tpl", "{{#post_list}}{{title}} {{/post_list}}|{{#page_list}}{{link}} {{/page_list}}");
        write(root, "tpl/post.tpl", "{{post_title}}|{{#tags}}{{link}} {{/tags}}");
        write(root, "tpl/photolist.tpl", "{{#photos}}{{id}} {{/photos}}");
        write(root, "tpl/photo.tpl", "{{#photo}}{{title}}{{/photo}}|{{back_link}}");
        write(root, "tpl/about.tpl", "{{page_title}}");
        write(root, "tpl/contact.tpl", "{{form_action}}");
        write(root, "tpl/index.tpl", "{{post_count}}");
        write(root, "blog/fog.md", POST_DATA);
        write(root, "blog/short.md", "---\ntitle: Short\ndate: \"2024-01-01\"\ntags: [travel]\n---\nbody\n");
        write(root, "photos.json", PHOTO_METADATA);
        write(root, "public/style.css", "body {}");
        write(root, "web/landscape/fog.jpg", "jpeg");
        config
    }

    fn read(root: &Path, rel: &str) -> String {
        fs::read_to_string(root.join("out").join(rel)).unwrap()
    }

    #[test]
    fn test_build_site() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let report = build_site(&config(root)).unwrap();

        assert_eq!(report.posts, 2);
        assert_eq!(report.photos, 4);
        assert_eq!(report.failed, 0);
        assert_eq!(report.files_copied, 2);

        assert_eq!(read(root, "index.html"), "2");
        assert_eq!(read(root, "contact/index.html"), "https://forms.example/f/abc123");
        // No about.md, so no about page
        assert!(!root.join("out/about").exists());

        assert_eq!(read(root, "blog/index.html"), "Shooting in fog |/blog/ /blog/page/2/ ");
        assert_eq!(read(root, "blog/page/2/index.html"), "Short |/blog/ /blog/page/2/ ");
        assert_eq!(read(root, "blog/tag/travel/page/2/index.html"), "Short |/blog/tag/travel/ /blog/tag/travel/page/2/ ");
        assert_eq!(read(root, "blog/tag/photography/index.html"), "Shooting in fog |/blog/tag/photography/ ");
        assert!(!root.join("out/blog/tag/photography/page").exists());

        assert_eq!(read(root, "blog/fog/index.html"), "Shooting in fog|/blog/tag/photography/ /blog/tag/travel/ ");
        assert_eq!(read(root, "photos/index.html"), "harbor fog market dunes ");
        assert_eq!(read(root, "photos/tag/sea/index.html"), "harbor dunes ");
        assert_eq!(read(root, "photos/fog/index.html"), "Morning Fog|/photos/");

        assert!(read(root, "feed.xml").contains("<rss"));
        assert_eq!(read(root, "public/style.css"), "body {}");
        assert!(root.join("out/photos/web/landscape/fog.jpg").exists());
    }

    #[test]
    fn test_tags_differing_by_case() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = config(root);
        fs::remove_file(root.join("blog/fog.md")).unwrap();
        fs::remove_file(root.join("blog/short.md")).unwrap();
        write(root, "blog/lower.md", "---\ntitle: Lower\ndate: \"2024-01-01\"\ntags: [rust]\n---\nbody\n");
        write(root, "blog/upper.md", "---\ntitle: Upper\ndate: \"2024-02-01\"\ntags: [Rust]\n---\nbody\n");

        let report = build_site(&config).unwrap();
        assert_eq!(report.posts, 2);

        assert_eq!(read(root, "blog/tag/rust/index.html"), "Upper |/blog/tag/rust/ ");
        assert_eq!(read(root, "blog/tag/rust-1/index.html"), "Lower |/blog/tag/rust-1/ ");
        assert_eq!(read(root, "blog/upper/index.html"), "Upper|/blog/tag/rust/ ");
        assert_eq!(read(root, "blog/lower/index.html"), "Lower|/blog/tag/rust-1/ ");
    }

    #[test]
    fn test_missing_template_fails() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = config(root);
        fs::remove_file(root.join("tpl/index.tpl")).unwrap();
        assert!(build_site(&config).is_err());
    }
}
