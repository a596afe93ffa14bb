use std::io;

use ramhorns::Template;

use crate::blog::PostMetadata;
use crate::config::Contact;
use crate::pages::Page;
use crate::photos::Photo;
use crate::text_utils::format_long_date;
use crate::view::{parse_template, SiteInfo};

#[derive(ramhorns::Content)]
struct RecentPost<'a> {
    title: &'a str,
    link: String,
    date: String,
    excerpt: &'a str,
}

#[derive(ramhorns::Content)]
struct FeaturedPhoto<'a> {
    title: &'a str,
    link: String,
    thumb_src: &'a str,
    alt: &'a str,
}

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    site: &'a SiteInfo,
    recent_posts: Vec<RecentPost<'a>>,
    featured_photos: Vec<FeaturedPhoto<'a>>,
    post_count: usize,
    photo_count: usize,
}

#[derive(ramhorns::Content)]
struct ContentPage<'a> {
    site: &'a SiteInfo,
    page_title: &'a str,
    page_content: &'a str,
}

#[derive(ramhorns::Content)]
struct ContactPage<'a> {
    site: &'a SiteInfo,
    form_action: &'a str,
    redirect_url: &'a str,
    email: &'a str,
    location: &'a str,
    success: bool,
}

/// Renders one of the standalone pages: home, about or contact.
pub struct PageRenderer<'a> {
    pub template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<PageRenderer> {
        Ok(PageRenderer { template: parse_template(tpl_src, "page")? })
    }

    pub fn render_index(&self, site: &SiteInfo, posts: &[PostMetadata], photos: &[Photo], max_items: usize) -> String {
        let recent_posts = posts.iter()
            .take(max_items)
            .map(|p| RecentPost {
                title: p.title.as_str(),
                link: p.link(),
                date: format_long_date(&p.date),
                excerpt: p.excerpt.as_str(),
            })
            .collect();
        let featured_photos = photos.iter()
            .take(max_items)
            .map(|p| FeaturedPhoto {
                title: p.title.as_str(),
                link: p.link(),
                thumb_src: p.thumb_src.as_str(),
                alt: p.alt.as_str(),
            })
            .collect();

        self.template.render(&IndexPage {
            site,
            recent_posts,
            featured_photos,
            post_count: posts.len(),
            photo_count: photos.len(),
        })
    }

    pub fn render_page(&self, site: &SiteInfo, page: &Page) -> String {
        self.template.render(&ContentPage {
            site,
            page_title: page.title.as_str(),
            page_content: page.body.html.as_str(),
        })
    }

    /// The form posts straight to the external endpoint; nothing is validated here.
    pub fn render_contact(&self, site: &SiteInfo, contact: &Contact, success: bool) -> String {
        self.template.render(&ContactPage {
            site,
            form_action: contact.form_action.as_str(),
            redirect_url: contact.redirect_url.as_str(),
            email: contact.email.as_deref().unwrap_or_default(),
            location: contact.location.as_deref().unwrap_or_default(),
            success,
        })
    }
}
