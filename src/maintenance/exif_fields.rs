use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use exif::{Exif, In, Rational, Tag, Value};
use image::DynamicImage;

/// Display values pulled from an image's EXIF block, named after the metadata keys they fill.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifFields {
    pub camera: Option<String>,
    pub lens: Option<String>,
    pub aperture: Option<String>,
    pub shutter_speed: Option<String>,
    pub iso: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub orientation: Option<u32>,
}

impl ExifFields {
    /// `(metadata key, value)` for the fields only filled while still "Unknown".
    pub fn backfill_values(&self) -> Vec<(&'static str, &str)> {
        [
            ("camera", &self.camera),
            ("lens", &self.lens),
            ("aperture", &self.aperture),
            ("shutterSpeed", &self.shutter_speed),
            ("iso", &self.iso),
            ("location", &self.location),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

/// Reads the EXIF block. Images without one, or with one that does not parse, give `None`.
pub fn read_exif(path: &Path) -> Option<ExifFields> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut reader).ok()?;
    Some(fields_of(&exif))
}

fn fields_of(exif: &Exif) -> ExifFields {
    ExifFields {
        camera: camera(ascii(exif, Tag::Make), ascii(exif, Tag::Model)),
        lens: ascii(exif, Tag::LensModel),
        aperture: rational(exif, Tag::FNumber).map(|r| format_aperture(r.to_f64())),
        shutter_speed: rational(exif, Tag::ExposureTime).map(|r| format_shutter_speed(r.num, r.denom)),
        iso: uint(exif, Tag::PhotographicSensitivity).map(|iso| iso.to_string()),
        location: gps_location(exif),
        date: ascii(exif, Tag::DateTimeOriginal)
            .or_else(|| ascii(exif, Tag::DateTime))
            .and_then(|d| exif_date(&d)),
        orientation: uint(exif, Tag::Orientation),
    }
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => parts.first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_matches(char::from(0)).trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

fn rational(exif: &Exif, tag: Tag) -> Option<Rational> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Rational(ref v) => v.first().copied().filter(|r| r.denom != 0),
        _ => None,
    }
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

fn gps_location(exif: &Exif) -> Option<String> {
    let lat = gps_coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef)?;
    let lon = gps_coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef)?;
    Some(format_location(lat, lon))
}

fn gps_coordinate(exif: &Exif, tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let dms = match field.value {
        Value::Rational(ref v) if v.len() >= 3 && v.iter().all(|r| r.denom != 0) => {
            [v[0].to_f64(), v[1].to_f64(), v[2].to_f64()]
        }
        _ => return None,
    };
    let reference = ascii(exif, ref_tag).unwrap_or_default();
    Some(dms_to_decimal(dms, &reference))
}

pub fn camera(make: Option<String>, model: Option<String>) -> Option<String> {
    match (make, model) {
        (Some(make), Some(model)) if model.to_lowercase().starts_with(&make.to_lowercase()) => Some(model),
        (Some(make), Some(model)) => Some(format!("{} {}", make, model)),
        (None, Some(model)) => Some(model),
        (Some(make), None) => Some(make),
        (None, None) => None,
    }
}

fn format_number(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}

pub fn format_aperture(f_number: f64) -> String {
    format!("f/{}", format_number(f_number))
}

pub fn format_shutter_speed(num: u32, denom: u32) -> String {
    if num == 0 || denom == 0 {
        return "0s".to_string();
    }
    if num >= denom {
        return format!("{}s", format_number(num as f64 / denom as f64));
    }
    let reciprocal = (denom as f64 / num as f64).round() as u64;
    format!("1/{}s", reciprocal)
}

pub fn dms_to_decimal(dms: [f64; 3], reference: &str) -> f64 {
    let value = dms[0] + dms[1] / 60.0 + dms[2] / 3600.0;
    match reference.trim() {
        "S" | "W" => -value,
        _ => value,
    }
}

pub fn format_location(lat: f64, lon: f64) -> String {
    format!("{:.5}, {:.5}", lat, lon)
}

/// "2023:08:01 10:15:00" becomes "2023-08-01".
pub fn exif_date(value: &str) -> Option<String> {
    let date = value.split_whitespace().next()?;
    let parts: Vec<&str> = date.split(':').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }
    if parts[0].chars().all(|c| c == '0') {
        return None;
    }
    Some(parts.join("-"))
}

/// Turns the stored pixels upright according to the EXIF orientation tag.
pub fn apply_orientation(img: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(2) => img.fliph(),
        Some(3) => img.rotate180(),
        Some(4) => img.flipv(),
        Some(5) => img.rotate90().fliph(),
        Some(6) => img.rotate90(),
        Some(7) => img.rotate270().fliph(),
        Some(8) => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn test_camera() {
        let s = |v: &str| Some(v.to_string());
        assert_eq!(camera(s("FUJIFILM"), s("X100V")), s("FUJIFILM X100V"));
        assert_eq!(camera(s("Canon"), s("Canon EOS R6")), s("Canon EOS R6"));
        assert_eq!(camera(None, s("X100V")), s("X100V"));
        assert_eq!(camera(None, None), None);
    }

    #[test]
    fn test_exposure_formatting() {
        assert_eq!(format_aperture(2.0), "f/2");
        assert_eq!(format_aperture(2.8), "f/2.8");
        assert_eq!(format_shutter_speed(1, 250), "1/250s");
        assert_eq!(format_shutter_speed(10, 600), "1/60s");
        assert_eq!(format_shutter_speed(2, 1), "2s");
        assert_eq!(format_shutter_speed(5, 2), "2.5s");
    }

    #[test]
    fn test_gps() {
        let lat = dms_to_decimal([33.0, 51.0, 54.0], "S");
        let lon = dms_to_decimal([151.0, 12.0, 36.0], "E");
        assert_eq!(format_location(lat, lon), "-33.86500, 151.21000");
    }

    #[test]
    fn test_exif_date() {
        assert_eq!(exif_date("2023:08:01 10:15:00"), Some("2023-08-01".to_string()));
        assert_eq!(exif_date("0000:00:00 00:00:00"), None);
        assert_eq!(exif_date("garbage"), None);
    }

    #[test]
    fn test_apply_orientation() {
        let mut img = RgbImage::new(4, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        let img = DynamicImage::ImageRgb8(img);

        let rotated = apply_orientation(img.clone(), Some(6));
        assert_eq!((rotated.width(), rotated.height()), (2, 4));
        assert_eq!(rotated.to_rgb8().get_pixel(1, 0), &Rgb([255, 0, 0]));

        let same = apply_orientation(img.clone(), Some(1));
        assert_eq!((same.width(), same.height()), (4, 2));
        let flipped = apply_orientation(img, Some(2));
        assert_eq!(flipped.to_rgb8().get_pixel(3, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_no_exif() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.png");
        DynamicImage::ImageRgb8(RgbImage::new(2, 2)).save(&path).unwrap();
        assert_eq!(read_exif(&path), None);
        assert_eq!(read_exif(&dir.path().join("missing.jpg")), None);
    }

    #[test]
    fn test_backfill_values() {
        let fields = ExifFields {
            camera: Some("X100V".to_string()),
            iso: Some("200".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.backfill_values(), vec![("camera", "X100V"), ("iso", "200")]);
    }
}
