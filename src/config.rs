use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Site {
    pub title: String,
    pub base_url: String,
    pub description: String,
    pub owner: String,
    #[serde(default)]
    pub social: Vec<SocialLink>,
}

/// A `[[site.social]]` entry shown in every page header and footer.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize, Clone)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
    pub blog_dir: PathBuf,
    pub pages_dir: PathBuf,
    pub photo_metadata: PathBuf,
    pub output_dir: Option<PathBuf>,
}

#[derive(Deserialize, Clone)]
pub struct Defaults {
    pub page_size: u32,
}

#[derive(Deserialize, Clone)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct Images {
    pub originals_dir: PathBuf,
    pub web_dir: PathBuf,
    pub backup_dir: Option<PathBuf>,
    #[serde(default = "default_web_width")]
    pub web_width: u32,
    #[serde(default = "default_thumb_width")]
    pub thumb_width: u32,
    #[serde(default = "default_quality")]
    pub quality: u8,
}

fn default_web_width() -> u32 { 1200 }

fn default_thumb_width() -> u32 { 300 }

fn default_quality() -> u8 { 80 }

#[derive(Deserialize, Clone)]
pub struct Contact {
    pub form_action: String,
    pub redirect_url: String,
    pub email: Option<String>,
    pub location: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize, Clone)]
pub struct Feed {
    pub title: String,
    pub description: String,
    pub size: u32,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub site: Site,
    pub paths: Paths,
    pub defaults: Defaults,
    pub server: Server,
    pub images: Images,
    pub contact: Contact,
    pub log: Option<Log>,
    pub feed: Option<Feed>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    if !path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = match env::current_exe() {
        Ok(exe) => exe.parent().map(Path::to_path_buf).unwrap_or_default(),
        Err(_) => return path,
    };
    let rest = path.strip_prefix("${exe_dir}").unwrap_or(&path);
    exe_dir.join(rest)
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
        blog_dir: parse_path(cfg.paths.blog_dir),
        pages_dir: parse_path(cfg.paths.pages_dir),
        photo_metadata: parse_path(cfg.paths.photo_metadata),
        output_dir: cfg.paths.output_dir.map(parse_path),
    };
    cfg.images.originals_dir = parse_path(cfg.images.originals_dir);
    cfg.images.web_dir = parse_path(cfg.images.web_dir);
    cfg.images.backup_dir = cfg.images.backup_dir.map(parse_path);

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    parse_config(&cfg_content)
}
