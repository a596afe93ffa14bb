pub mod list_renderer;
pub mod page_renderer;
pub mod photo_renderer;
pub mod post_renderer;
pub mod rss_renderer;

use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::config::Config;

#[derive(ramhorns::Content, Debug, Clone, PartialEq)]
pub struct ViewLink {
    pub name: String,
    pub url: String,
}

/// Site-wide values every template can reach through `{{#site}}`.
#[derive(ramhorns::Content, Debug, Clone, Default)]
pub struct SiteInfo {
    pub title: String,
    pub description: String,
    pub owner: String,
    pub base_url: String,
    pub year: i32,
    pub social: Vec<ViewLink>,
}

impl SiteInfo {
    pub fn from_config(config: &Config, year: i32) -> Self {
        SiteInfo {
            title: config.site.title.clone(),
            description: config.site.description.clone(),
            owner: config.site.owner.clone(),
            base_url: config.site.base_url.clone(),
            year,
            social: config.site.social.iter()
                .map(|link| ViewLink { name: link.name.clone(), url: link.url.clone() })
                .collect(),
        }
    }
}

/// A tag in a filter bar: its label, how many items carry it and where clicking leads.
#[derive(ramhorns::Content, Debug, Clone, PartialEq)]
pub struct ViewTag {
    pub tag: String,
    pub count: usize,
    pub selected: bool,
    pub link: String,
}

impl ViewTag {
    pub fn new(tag: &str, count: usize, selected: bool, link: &str) -> Self {
        ViewTag {
            tag: tag.to_string(),
            count,
            selected,
            link: link.to_string(),
        }
    }
}

pub(crate) fn parse_template<'a>(src: &'a str, name: &str) -> io::Result<Template<'a>> {
    match Template::new(src) {
        Ok(x) => Ok(x),
        Err(e) => Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing {} template: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::parse_config;
    use crate::test_data::CONFIG_DATA;

    use super::*;

    #[test]
    fn test_social_links_in_templates() {
        let config = parse_config(CONFIG_DATA).unwrap();
        let info = SiteInfo::from_config(&config, 2024);
        assert_eq!(info.social[1], ViewLink { name: "Instagram".to_string(), url: "https://instagram.com/janedoe".to_string() });

        let template = parse_template("{{#site}}{{owner}}:{{#social}} <a href=\"{{url}}\">{{name}}</a>{{/social}}{{/site}}", "test").unwrap();
        #[derive(ramhorns::Content)]
        struct Page {
            site: SiteInfo,
        }
        assert_eq!(template.render(&Page { site: info }),
            "Jane Doe: <a href=\"https://github.com/janedoe\">GitHub</a> <a href=\"https://instagram.com/janedoe\">Instagram</a>");
    }
}
