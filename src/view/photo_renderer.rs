use std::io;

use ramhorns::Template;

use crate::photos::Photo;
use crate::view::{parse_template, SiteInfo, ViewTag};

#[derive(ramhorns::Content)]
struct PhotoItem<'a> {
    id: &'a str,
    link: String,
    src: &'a str,
    thumb_src: &'a str,
    alt: &'a str,
    title: &'a str,
    width: u32,
    height: u32,
    has_dimensions: bool,
    portrait: bool,
}

impl<'a> PhotoItem<'a> {
    fn new(photo: &'a Photo) -> Self {
        let (width, height) = photo.dimensions.map(|d| (d.width, d.height)).unwrap_or((0, 0));
        PhotoItem {
            id: photo.id.as_str(),
            link: photo.link(),
            src: photo.src.as_str(),
            thumb_src: photo.thumb_src.as_str(),
            alt: photo.alt.as_str(),
            title: photo.title.as_str(),
            width,
            height,
            has_dimensions: photo.dimensions.is_some(),
            portrait: photo.is_portrait(),
        }
    }
}

#[derive(ramhorns::Content)]
struct GalleryPage<'a> {
    site: &'a SiteInfo,
    photos: Vec<PhotoItem<'a>>,
    tags: &'a [ViewTag],
    selected_tag: &'a str,
    has_selected_tag: bool,
    is_empty: bool,
}

#[derive(ramhorns::Content)]
struct MetadataRow {
    key: String,
    value: String,
}

#[derive(ramhorns::Content)]
struct PhotoPage<'a> {
    site: &'a SiteInfo,
    photo: PhotoItem<'a>,
    description_html: &'a str,
    tags: &'a [ViewTag],
    metadata: Vec<MetadataRow>,
    back_link: &'a str,
}

pub struct PhotoListRenderer<'a> {
    pub template: Template<'a>,
}

impl PhotoListRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<PhotoListRenderer> {
        Ok(PhotoListRenderer { template: parse_template(tpl_src, "photo list")? })
    }

    pub fn render(&self, site: &SiteInfo, photos: &[&Photo], tags: &[ViewTag], selected_tag: Option<&str>) -> String {
        let photos: Vec<PhotoItem> = photos.iter().copied().map(PhotoItem::new).collect();
        self.template.render(&GalleryPage {
            site,
            is_empty: photos.is_empty(),
            photos,
            tags,
            selected_tag: selected_tag.unwrap_or_default(),
            has_selected_tag: selected_tag.is_some(),
        })
    }
}

pub struct PhotoRenderer<'a> {
    pub template: Template<'a>,
}

impl PhotoRenderer<'_> {
    pub fn new(tpl_src: &str) -> io::Result<PhotoRenderer> {
        Ok(PhotoRenderer { template: parse_template(tpl_src, "photo view")? })
    }

    pub fn render(&self, site: &SiteInfo, photo: &Photo, description_html: &str, tags: &[ViewTag], back_link: &str) -> String {
        let metadata = photo.metadata_strings().into_iter()
            .map(|(key, value)| MetadataRow { key, value })
            .collect();

        self.template.render(&PhotoPage {
            site,
            photo: PhotoItem::new(photo),
            description_html,
            tags,
            metadata,
            back_link,
        })
    }
}
