use std::{fs, io};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::io::ErrorKind;

use chrono::{Datelike, Utc};

use crate::blog::{BlogSource, PostMetadata};
use crate::config::Config;
use crate::pages::load_page;
use crate::paginator::Paginator;
use crate::photos::{Photo, PhotoSource};
use crate::tags::{filter_by_tags, selection_from_query, tag_counts, Tagged};
use crate::text_utils::slugify;
use crate::view::list_renderer::{BlogListView, ListRenderer};
use crate::view::page_renderer::PageRenderer;
use crate::view::photo_renderer::{PhotoListRenderer, PhotoRenderer};
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::RssChannel;
use crate::view::{SiteInfo, ViewTag};

const INDEX_ITEMS: usize = 3;
const DEFAULT_FEED_SIZE: usize = 20;

/// How listing links are spelled: query strings when served, directories when built.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkStyle {
    Query,
    Static(TagDirs),
}

/// Slug a tag's directory name starts from.
pub fn tag_dir(tag: &str) -> String {
    let slug = slugify(tag);
    if slug.is_empty() { "tag".to_string() } else { slug }
}

/// One output directory per tag. Tags whose slugs collide (`rust` and `Rust`,
/// `c++` and `c`) get `-1`, `-2` suffixes, assigned in sorted tag order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagDirs {
    dirs: HashMap<String, String>,
}

impl TagDirs {
    pub fn new<I: IntoIterator<Item = String>>(tags: I) -> Self {
        let sorted: BTreeSet<String> = tags.into_iter().collect();
        let mut used = HashSet::new();
        let mut dirs = HashMap::new();

        for tag in sorted {
            let base = tag_dir(&tag);
            let mut dir = base.clone();
            let mut n = 1;
            while used.contains(&dir) {
                dir = format!("{}-{}", base, n);
                n += 1;
            }
            used.insert(dir.clone());
            dirs.insert(tag, dir);
        }
        TagDirs { dirs }
    }

    /// Tags outside the map fall back to their plain slug.
    pub fn get(&self, tag: &str) -> String {
        self.dirs.get(tag).cloned().unwrap_or_else(|| tag_dir(tag))
    }
}

fn tag_query(tag: &str) -> String {
    serde_urlencoded::to_string(&[("tag", tag)]).unwrap_or_default()
}

impl LinkStyle {
    pub fn blog_list(&self, tag: Option<&str>, page: u32) -> String {
        match (self, tag) {
            (LinkStyle::Query, None) if page <= 1 => "/blog".to_string(),
            (LinkStyle::Query, None) => format!("/blog?page={}", page),
            (LinkStyle::Query, Some(tag)) if page <= 1 => format!("/blog?{}", tag_query(tag)),
            (LinkStyle::Query, Some(tag)) => format!("/blog?{}&page={}", tag_query(tag), page),
            (LinkStyle::Static(_), None) if page <= 1 => "/blog/".to_string(),
            (LinkStyle::Static(_), None) => format!("/blog/page/{}/", page),
            (LinkStyle::Static(dirs), Some(tag)) if page <= 1 => format!("/blog/tag/{}/", dirs.get(tag)),
            (LinkStyle::Static(dirs), Some(tag)) => format!("/blog/tag/{}/page/{}/", dirs.get(tag), page),
        }
    }

    pub fn photo_list(&self, tag: Option<&str>) -> String {
        match (self, tag) {
            (LinkStyle::Query, None) => "/photos".to_string(),
            (LinkStyle::Query, Some(tag)) => format!("/photos?{}", tag_query(tag)),
            (LinkStyle::Static(_), None) => "/photos/".to_string(),
            (LinkStyle::Static(dirs), Some(tag)) => format!("/photos/tag/{}/", dirs.get(tag)),
        }
    }
}

/// Everything needed to render the site's pages. Content is read from disk on each call.
pub struct Site {
    pub config: Config,
    pub blog: BlogSource,
    pub photos: PhotoSource,
    pub links: LinkStyle,
}

impl Site {
    pub fn new(config: Config, links: LinkStyle) -> Self {
        Site {
            blog: BlogSource::new(&config.paths.blog_dir),
            photos: PhotoSource::new(&config.paths.photo_metadata),
            config,
            links,
        }
    }

    pub fn site_info(&self) -> SiteInfo {
        SiteInfo::from_config(&self.config, Utc::now().year())
    }

    fn read_template(&self, file_name: &str) -> io::Result<String> {
        let full_path = self.config.paths.template_dir.join(file_name);
        match fs::read_to_string(&full_path) {
            Ok(src) => Ok(src),
            Err(e) => Err(io::Error::new(e.kind(), format!("Error reading template {}: {}", full_path.display(), e))),
        }
    }

    pub fn render_index(&self) -> io::Result<String> {
        let template_src = self.read_template("index.tpl")?;
        let renderer = PageRenderer::new(&template_src)?;
        let posts = self.blog.all_posts();
        let photos = self.photos.all_photos();
        Ok(renderer.render_index(&self.site_info(), &posts, &photos, INDEX_ITEMS))
    }

    pub fn render_about(&self) -> io::Result<String> {
        let template_src = self.read_template("about.tpl")?;
        let renderer = PageRenderer::new(&template_src)?;
        let page = load_page(&self.config.paths.pages_dir, "about")?;
        Ok(renderer.render_page(&self.site_info(), &page))
    }

    pub fn render_contact(&self, success: bool) -> io::Result<String> {
        let template_src = self.read_template("contact.tpl")?;
        let renderer = PageRenderer::new(&template_src)?;
        Ok(renderer.render_contact(&self.site_info(), &self.config.contact, success))
    }

    pub fn render_blog_list(&self, tag: Option<String>, page: u32) -> io::Result<String> {
        let posts = self.blog.all_posts();
        self.render_blog_list_of(&posts, tag, page)
    }

    /// Number of listing pages for the posts carrying `tag` (all posts when `None`).
    pub fn blog_page_count(&self, posts: &[PostMetadata], tag: Option<&str>) -> u32 {
        let selection: Vec<String> = tag.map(|t| vec![t.to_string()]).unwrap_or_default();
        let filtered = filter_by_tags(posts, &selection);
        Paginator::from(&filtered, self.config.defaults.page_size).page_count().max(1)
    }

    pub fn render_blog_list_of(&self, posts: &[PostMetadata], tag: Option<String>, page: u32) -> io::Result<String> {
        let selection = selection_from_query(posts, tag);
        let selected = selection.first().map(String::as_str);
        let filtered = filter_by_tags(posts, &selection);

        let tags: Vec<ViewTag> = tag_counts(posts).iter()
            .map(|(tag, count)| {
                let is_selected = selected == Some(tag.as_str());
                // Clicking the selected tag clears the filter
                let link = if is_selected { self.links.blog_list(None, 1) } else { self.links.blog_list(Some(tag.as_str()), 1) };
                ViewTag::new(tag, *count, is_selected, &link)
            })
            .collect();

        let paginator = Paginator::from(&filtered, self.config.defaults.page_size);
        let cur_page = paginator.clamp_page(page);
        let page_posts: &[&PostMetadata] = if filtered.is_empty() {
            &[]
        } else {
            match paginator.get_page(cur_page) {
                Ok(page_posts) => page_posts,
                Err(err_desc) => return Err(io::Error::new(ErrorKind::InvalidInput, err_desc)),
            }
        };
        let page_links: Vec<String> = (1..=paginator.page_count().max(1))
            .map(|n| self.links.blog_list(selected, n))
            .collect();

        let template_src = self.read_template("bloglist.tpl")?;
        let renderer = ListRenderer::new(&template_src)?;
        Ok(renderer.render(&self.site_info(), &BlogListView {
            posts: page_posts,
            tags: &tags,
            selected_tag: selected,
            cur_page,
            page_links: &page_links,
        }))
    }

    pub fn render_post(&self, slug: &str) -> io::Result<String> {
        let post = self.blog.post_by_slug(slug)?;
        let template_src = self.read_template("post.tpl")?;
        let renderer = PostRenderer::new(&template_src)?;
        Ok(renderer.render(&self.site_info(), &post, |tag| self.links.blog_list(Some(tag), 1)))
    }

    fn photo_tags(&self, photos: &[Photo], selected: Option<&str>) -> Vec<ViewTag> {
        tag_counts(photos).iter()
            .map(|(tag, count)| {
                let is_selected = selected == Some(tag.as_str());
                let link = if is_selected { self.links.photo_list(None) } else { self.links.photo_list(Some(tag.as_str())) };
                ViewTag::new(tag, *count, is_selected, &link)
            })
            .collect()
    }

    pub fn render_photo_list(&self, tag: Option<String>) -> io::Result<String> {
        let photos = self.photos.all_photos();
        self.render_photo_list_of(&photos, tag)
    }

    pub fn render_photo_list_of(&self, photos: &[Photo], tag: Option<String>) -> io::Result<String> {
        let selection = selection_from_query(photos, tag);
        let selected = selection.first().map(String::as_str);
        let filtered = filter_by_tags(photos, &selection);
        let tags = self.photo_tags(photos, selected);

        let template_src = self.read_template("photolist.tpl")?;
        let renderer = PhotoListRenderer::new(&template_src)?;
        Ok(renderer.render(&self.site_info(), &filtered, &tags, selected))
    }

    /// Photo detail page. `tag` is the gallery filter the visitor came from, kept for the back link.
    pub fn render_photo(&self, id: &str, tag: Option<String>) -> io::Result<String> {
        let photo = self.photos.photo_by_id(id)?;
        let back_tag = tag.filter(|t| photo.has_tag(t));
        let back_link = self.links.photo_list(back_tag.as_deref());
        let tags: Vec<ViewTag> = photo.tags.iter()
            .map(|t| ViewTag::new(t, 1, back_tag.as_deref() == Some(t.as_str()), &self.links.photo_list(Some(t.as_str()))))
            .collect();
        let description_html = photo.description_html()?;

        let template_src = self.read_template("photo.tpl")?;
        let renderer = PhotoRenderer::new(&template_src)?;
        Ok(renderer.render(&self.site_info(), &photo, &description_html, &tags, &back_link))
    }

    pub fn render_feed(&self) -> io::Result<Vec<u8>> {
        let posts = self.blog.all_posts();
        let (title, description, size) = match self.config.feed {
            Some(ref feed) => (feed.title.as_str(), feed.description.as_str(), feed.size as usize),
            None => (self.config.site.title.as_str(), self.config.site.description.as_str(), DEFAULT_FEED_SIZE),
        };
        let size = size.min(posts.len());

        let rss = RssChannel {
            ch_title: title,
            ch_link: self.config.site.base_url.as_str(),
            ch_desc: description,
        };
        match rss.render(&posts[..size]) {
            Ok(xml) => Ok(xml),
            Err(e) => Err(io::Error::new(ErrorKind::Other, format!("Error rendering feed: {}", e))),
        }
    }
}
