use std::io;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;

const FRONT_MATTER_DELIMITER: &str = "---";

/// Splits a document into its YAML front-matter and the body after it.
/// A document not starting with `---`, or whose block is never closed, is all body.
pub fn split_front_matter(raw: &str) -> (Option<&str>, &str) {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let mut lines = raw.split_inclusive('\n');
    let first = match lines.next() {
        Some(line) => line,
        None => return (None, raw),
    };
    if first.trim_end() != FRONT_MATTER_DELIMITER {
        return (None, raw);
    }

    let yaml_start = first.len();
    let mut offset = yaml_start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == FRONT_MATTER_DELIMITER || trimmed == "..." {
            let yaml = &raw[yaml_start..offset];
            let body = &raw[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    (None, raw)
}

/// Deserializes the front-matter of `raw` into `T`, returning it with the body.
/// Missing or empty front-matter yields `T::default()`.
pub fn parse_front_matter<'a, T>(file_name: &Path, raw: &'a str) -> io::Result<(T, &'a str)>
where
    T: DeserializeOwned + Default,
{
    let (yaml, body) = split_front_matter(raw);
    let yaml = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => yaml,
        _ => return Ok((T::default(), body)),
    };

    match serde_yaml::from_str::<T>(yaml) {
        Ok(front_matter) => Ok((front_matter, body)),
        Err(e) => Err(io::Error::new(
            ErrorKind::InvalidData,
            format!("Invalid front-matter: {} - file={}", e, file_name.display()),
        )),
    }
}
