use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::blog::PostMetadata;
use crate::text_utils::format_long_date;
use crate::view::{SiteInfo, ViewTag};

#[derive(ramhorns::Content)]
struct ListPage<'a> {
    site: &'a SiteInfo,
    post_list: Vec<PostItem<'a>>,
    tags: &'a [ViewTag],
    selected_tag: &'a str,
    has_selected_tag: bool,
    page_list: Vec<ViewPagination<'a>>,
    show_pagination: bool,
    is_empty: bool,
}

#[derive(ramhorns::Content)]
struct PostItem<'a> {
    link: String,
    title: &'a str,
    date: String,
    excerpt: &'a str,
    image: &'a str,
    read_time: &'a str,
    tags: Vec<ItemTag<'a>>,
}

#[derive(ramhorns::Content)]
struct ItemTag<'a> {
    tag: &'a str,
}

#[derive(ramhorns::Content)]
struct ViewPagination<'a> {
    current: bool,
    number: u32,
    link: &'a str,
}

/// One page of the blog listing, with links already resolved by the caller.
pub struct BlogListView<'a> {
    pub posts: &'a [&'a PostMetadata],
    pub tags: &'a [ViewTag],
    pub selected_tag: Option<&'a str>,
    pub cur_page: u32,
    /// Link of each page, index 0 being page 1.
    pub page_links: &'a [String],
}

pub struct ListRenderer<'a> {
    pub template: Template<'a>,
}

impl ListRenderer<'_> {
    pub fn new(list_tpl_src: &str) -> io::Result<ListRenderer> {
        let template = match Template::new(list_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing list template: {}", e)));
            }
        };

        Ok(ListRenderer { template })
    }

    pub fn render(&self, site: &SiteInfo, view: &BlogListView) -> String {
        let post_list: Vec<PostItem> = view.posts.iter()
            .map(|post| PostItem {
                link: post.link(),
                title: post.title.as_str(),
                date: format_long_date(&post.date),
                excerpt: post.excerpt.as_str(),
                image: post.image.as_str(),
                read_time: post.read_time.as_str(),
                tags: post.tags.iter().map(|t| ItemTag { tag: t.as_str() }).collect(),
            })
            .collect();

        let page_list: Vec<ViewPagination> = view.page_links.iter()
            .enumerate()
            .map(|(i, link)| ViewPagination {
                current: i as u32 + 1 == view.cur_page,
                number: i as u32 + 1,
                link: link.as_str(),
            })
            .collect();

        self.template.render(&ListPage {
            site,
            is_empty: post_list.is_empty(),
            post_list,
            tags: view.tags,
            selected_tag: view.selected_tag.unwrap_or_default(),
            has_selected_tag: view.selected_tag.is_some(),
            show_pagination: page_list.len() > 1,
            page_list,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::blog::{FrontMatter, PostMetadata};

    use super::*;

    fn meta(slug: &str, title: &str, tags: &[&str]) -> PostMetadata {
        let fm = FrontMatter {
            title: title.to_string(),
            date: "2024-01-02".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            excerpt: format!("about {}", slug),
            ..Default::default()
        };
        PostMetadata::new(slug.to_string(), fm, "body")
    }

    #[test]
    fn render_list() {
        let template_src = "{{#post_list}}[{{title}}|{{link}}|{{date}}|{{read_time}}|{{#tags}}{{tag}},{{/tags}}]{{/post_list}}\n\
TAGS={{#tags}}({{tag}}:{{count}}{{#selected}}*{{/selected}}){{/tags}}\n\
SEL={{#has_selected_tag}}{{selected_tag}}{{/has_selected_tag}}\n\
{{#show_pagination}}PAGES={{#page_list}}{{#current}}<{{number}}>{{/current}}{{^current}}{{link}}{{/current}} {{/page_list}}{{/show_pagination}}";
        let renderer = ListRenderer::new(template_src).unwrap();

        let a = meta("a", "<A>", &["rust"]);
        let b = meta("b", "B", &["rust", "web"]);
        let posts = vec![&a, &b];
        let tags = vec![
            ViewTag::new("rust", 2, true, "/blog"),
            ViewTag::new("web", 1, false, "/blog?tag=web"),
        ];
        let page_links = vec!["/blog?tag=rust&page=1".to_string(), "/blog?tag=rust&page=2".to_string()];

        let site = SiteInfo::default();
        let res = renderer.render(&site, &BlogListView {
            posts: &posts,
            tags: &tags,
            selected_tag: Some("rust"),
            cur_page: 1,
            page_links: &page_links,
        });

        assert_eq!(res, "[&lt;A&gt;|/blog/a|January 2, 2024|Less than 1 min read|rust,][B|/blog/b|January 2, 2024|Less than 1 min read|rust,web,]\n\
TAGS=(rust:2*)(web:1)\n\
SEL=rust\n\
PAGES=<1> /blog?tag=rust&amp;page=2 ");
    }

    #[test]
    fn render_single_page_hides_pagination() {
        let renderer = ListRenderer::new("{{#show_pagination}}PAGES{{/show_pagination}}{{#is_empty}}EMPTY{{/is_empty}}").unwrap();
        let site = SiteInfo::default();
        let res = renderer.render(&site, &BlogListView {
            posts: &[],
            tags: &[],
            selected_tag: None,
            cur_page: 1,
            page_links: &["/blog".to_string()],
        });
        assert_eq!(res, "EMPTY");
    }
}
