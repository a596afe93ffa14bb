use std::env;
use std::path::PathBuf;

use folio::config::{read_config, Config};

use crate::CFG_FILE_NAME;

fn get_config_path() -> Option<PathBuf> {
    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()));
    if let Some(exe_dir) = exe_dir {
        if exe_dir.join(CFG_FILE_NAME).exists() {
            return Some(exe_dir.join(CFG_FILE_NAME));
        }
    }

    if let Ok(cur_dir) = env::current_dir() {
        if cur_dir.join(CFG_FILE_NAME).exists() {
            return Some(cur_dir.join(CFG_FILE_NAME));
        }
    }

    let cfg_path = dirs::config_dir()?.join("folio").join(CFG_FILE_NAME);
    if cfg_path.exists() {
        return Some(cfg_path);
    }

    None
}

pub(crate) fn open_config(cfg_path: Option<PathBuf>) -> Result<Config, String> {
    let config_path = match cfg_path.or_else(get_config_path) {
        Some(path) => path,
        None => return Err(format!("Could not find {}", CFG_FILE_NAME)),
    };

    println!("Reading config from {}", config_path.display());
    let mut config = match read_config(&config_path) {
        Ok(config) => config,
        Err(e) => return Err(e.to_string()),
    };

    if let Some(mut log) = config.log {
        let location = log.location.or_else(|| {
            dirs::cache_dir().map(|dir| dir.join("folio").join("log").join("folio.log"))
        });
        match location {
            Some(ref location) => println!("Log enabled. Files will be written in {}", location.display()),
            None => println!("No cache dir for log files. Using stdout"),
        }
        log.location = location;
        config.log = Some(log);
    } else {
        println!("Log disabled. Using stdout");
    }

    Ok(config)
}
