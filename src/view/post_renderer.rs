use std::io;

use ramhorns::Template;

use crate::blog::Post;
use crate::text_utils::format_long_date;
use crate::view::{parse_template, SiteInfo};

#[derive(ramhorns::Content)]
struct ViewTag<'a> {
    tag: &'a str,
    link: String,
}

#[derive(ramhorns::Content)]
struct ViewToc<'a> {
    id: &'a str,
    text: &'a str,
    level: u8,
}

#[derive(ramhorns::Content)]
struct ViewRelated<'a> {
    title: &'a str,
    link: String,
}

#[derive(ramhorns::Content)]
struct ViewItem<'a> {
    site: &'a SiteInfo,
    slug: &'a str,
    post_title: &'a str,
    date: String,
    read_time: &'a str,
    excerpt: &'a str,
    image: &'a str,
    author_name: &'a str,
    author_avatar: &'a str,
    author_bio: &'a str,
    tags: Vec<ViewTag<'a>>,
    toc: Vec<ViewToc<'a>>,
    has_toc: bool,
    related_posts: Vec<ViewRelated<'a>>,
    has_related: bool,
    post_content: &'a str,
}

pub struct PostRenderer<'a> {
    pub template: Template<'a>,
}

impl PostRenderer<'_> {
    pub fn new(view_tpl_src: &str) -> io::Result<PostRenderer> {
        let template = parse_template(view_tpl_src, "post view")?;
        Ok(PostRenderer { template })
    }

    /// `tag_link` maps a tag to the listing filtered by it.
    pub fn render<F>(&self, site: &SiteInfo, post: &Post, tag_link: F) -> String
    where
        F: Fn(&str) -> String,
    {
        let meta = &post.metadata;
        let tags = meta.tags.iter()
            .map(|t| ViewTag { tag: t.as_str(), link: tag_link(t) })
            .collect();
        let toc: Vec<ViewToc> = post.toc.iter()
            .map(|e| ViewToc { id: e.id.as_str(), text: e.text.as_str(), level: e.level })
            .collect();
        let related_posts: Vec<ViewRelated> = meta.related_posts.iter()
            .map(|r| ViewRelated { title: r.title.as_str(), link: format!("/blog/{}", r.slug) })
            .collect();

        self.template.render(&ViewItem {
            site,
            slug: meta.slug.as_str(),
            post_title: meta.title.as_str(),
            date: format_long_date(&meta.date),
            read_time: meta.read_time.as_str(),
            excerpt: meta.excerpt.as_str(),
            image: meta.image.as_str(),
            author_name: meta.author.name.as_str(),
            author_avatar: meta.author.avatar.as_str(),
            author_bio: meta.author.bio.as_str(),
            tags,
            has_toc: !toc.is_empty(),
            toc,
            has_related: !related_posts.is_empty(),
            related_posts,
            post_content: post.content_html.as_str(),
        })
    }
}
