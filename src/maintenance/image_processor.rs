use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use serde_json::{Map, Value};
use spdlog::{debug, error, info};
use tempfile::NamedTempFile;

use crate::config::Images;
use crate::maintenance::exif_fields::{apply_orientation, read_exif, ExifFields};
use crate::maintenance::metadata_store::MetadataStore;
use crate::maintenance::{list_images, SourceImage};
use crate::photos::{strip_extension, thumb_file_name, Dimensions, PhotoEntry};

pub const UNKNOWN: &str = "Unknown";
const DEFAULT_DESCRIPTION: &str = "No description provided.";
const UNKNOWN_FIELDS: [&str; 6] = ["camera", "lens", "aperture", "shutterSpeed", "iso", "location"];

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProcessReport {
    pub processed: usize,
    pub failed: usize,
    pub files_written: usize,
    pub metadata_written: bool,
}

pub struct ImageProcessor {
    pub originals_dir: PathBuf,
    pub web_dir: PathBuf,
    pub web_width: u32,
    pub thumb_width: u32,
    pub quality: u8,
}

/// Metadata for an image seen for the first time.
pub fn default_entry(image: &SourceImage) -> PhotoEntry {
    let mut metadata = Map::new();
    for key in UNKNOWN_FIELDS {
        metadata.insert(key.to_string(), Value::String(UNKNOWN.to_string()));
    }
    metadata.insert("date".to_string(), Value::String(Local::now().format("%Y-%m-%d").to_string()));

    PhotoEntry {
        title: strip_extension(&image.file_name).replace('-', " "),
        description: DEFAULT_DESCRIPTION.to_string(),
        tags: image.category.iter().cloned().collect(),
        metadata,
        ..Default::default()
    }
}

/// Fills "Unknown" fields from EXIF; the capture date is replaced whenever EXIF has one.
/// Returns whether anything changed.
pub fn backfill_metadata(metadata: &mut Map<String, Value>, exif: &ExifFields) -> bool {
    let mut changed = false;

    for (key, value) in exif.backfill_values() {
        if metadata.get(key).and_then(Value::as_str) == Some(UNKNOWN) && value != UNKNOWN {
            metadata.insert(key.to_string(), Value::String(value.to_string()));
            changed = true;
        }
    }

    if let Some(ref date) = exif.date {
        if metadata.get("date").and_then(Value::as_str) != Some(date.as_str()) {
            metadata.insert("date".to_string(), Value::String(date.clone()));
            changed = true;
        }
    }

    changed
}

/// Scales down to `width`, keeping the aspect ratio. Smaller images are left alone.
pub fn resize_to_width(img: &DynamicImage, width: u32) -> DynamicImage {
    if img.width() <= width || width == 0 {
        return img.clone();
    }
    let height = ((img.height() as u64 * width as u64) as f64 / img.width() as f64).round().max(1.0) as u32;
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Encodes into a temporary file next to `path` and renames it into place, so a
/// failed encode never leaves a truncated file that a later run would skip.
/// JPEG output uses `quality`, other formats follow the extension.
fn save_image(img: &DynamicImage, path: &Path, quality: u8) -> Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("Error creating temporary file in {}", dir.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        if is_jpeg(path) {
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
            DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)
                .with_context(|| format!("Error encoding {}", path.display()))?;
        } else {
            let format = ImageFormat::from_path(path).with_context(|| format!("Unknown image format for {}", path.display()))?;
            img.write_to(&mut writer, format).with_context(|| format!("Error encoding {}", path.display()))?;
        }
        writer.flush().with_context(|| format!("Error writing {}", path.display()))?;
    }
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Error writing {}", path.display()))?;
    Ok(())
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

impl ImageProcessor {
    pub fn from_config(images: &Images) -> Self {
        ImageProcessor {
            originals_dir: images.originals_dir.clone(),
            web_dir: images.web_dir.clone(),
            web_width: images.web_width,
            thumb_width: images.thumb_width,
            quality: images.quality,
        }
    }

    fn output_dir(&self, image: &SourceImage) -> PathBuf {
        match image.category {
            Some(ref category) => self.web_dir.join(category),
            None => self.web_dir.clone(),
        }
    }

    /// Processes every original in order. One image failing is logged and does not stop the rest.
    pub fn process_all(&self, store: &mut MetadataStore) -> Result<ProcessReport> {
        let images = list_images(&self.originals_dir)
            .with_context(|| format!("Error listing originals in {}", self.originals_dir.display()))?;

        let mut report = ProcessReport::default();
        for image in images.iter() {
            match self.process_one(image, store) {
                Ok(written) => {
                    report.processed += 1;
                    report.files_written += written;
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Error processing {}: {:#}", image.key, e);
                }
            }
        }

        report.metadata_written = store.save_if_dirty()?;
        info!("Image processing complete: {} processed, {} failed, {} files written",
            report.processed, report.failed, report.files_written);
        Ok(report)
    }

    /// Returns the number of image files written.
    fn process_one(&self, image: &SourceImage, store: &mut MetadataStore) -> Result<usize> {
        if !store.contains(&image.key) {
            store.insert(&image.key, default_entry(image));
            info!("Added metadata for {}", image.key);
        }

        let exif = read_exif(&image.path);
        if let Some(ref fields) = exif {
            if store.update(&image.key, |entry| backfill_metadata(&mut entry.metadata, fields)) {
                info!("Updated EXIF metadata for {}", image.key);
            }
        }

        let out_dir = self.output_dir(image);
        let web_path = out_dir.join(&image.file_name);
        let thumb_path = out_dir.join(thumb_file_name(&image.file_name));
        let need_web = !web_path.exists();
        let need_thumb = !thumb_path.exists();
        let need_dimensions = store.get(&image.key).map(|e| e.dimensions.is_none()).unwrap_or(true);

        if !need_web && !need_thumb && !need_dimensions {
            debug!("Nothing to do for {}", image.key);
            return Ok(0);
        }

        let img = image::open(&image.path).with_context(|| format!("Error decoding {}", image.path.display()))?;
        let img = apply_orientation(img, exif.as_ref().and_then(|e| e.orientation));

        if need_dimensions {
            let dimensions = Dimensions { width: img.width(), height: img.height() };
            store.update(&image.key, |entry| {
                entry.dimensions = Some(dimensions);
                true
            });
            info!("Added dimensions for {}", image.key);
        }

        let mut written = 0;
        if need_web || need_thumb {
            fs::create_dir_all(&out_dir).with_context(|| format!("Error creating {}", out_dir.display()))?;
        }
        if need_web {
            save_image(&resize_to_width(&img, self.web_width), &web_path, self.quality)?;
            written += 1;
        }
        if need_thumb {
            save_image(&resize_to_width(&img, self.thumb_width), &thumb_path, self.quality)?;
            written += 1;
        }

        info!("Processed {}", image.key);
        Ok(written)
    }
}

/// Runs the whole job against the metadata document at `metadata_path`.
pub fn process_images(images: &Images, metadata_path: &Path) -> Result<ProcessReport> {
    let mut store = MetadataStore::open(metadata_path)
        .with_context(|| format!("Error opening photo metadata {}", metadata_path.display()))?;
    ImageProcessor::from_config(images).process_all(&mut store)
}
