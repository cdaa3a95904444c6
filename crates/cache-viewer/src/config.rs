use crate::error::{Result, ViewerError};
use std::env;
use std::path::{Path, PathBuf};

/// Service configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub port: u16,
    pub cache_dir: PathBuf,
    /// Front-end bundle served at `/`
    pub assets_dir: Option<PathBuf>,
}

impl ViewerConfig {
    /// Parse configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let cache_dir = match env::var("CACHE_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = dirs::home_dir().ok_or_else(|| {
                    ViewerError::Config("unable to determine home directory".to_string())
                })?;
                default_cache_dir(env::consts::OS, &home)?
            }
        };

        let assets_dir = env::var("ASSETS_DIR").ok().map(PathBuf::from);

        Ok(Self {
            port,
            cache_dir,
            assets_dir,
        })
    }
}

/// Discord's cache directory for `os` under `home`
pub fn default_cache_dir(os: &str, home: &Path) -> Result<PathBuf> {
    let relative: &[&str] = match os {
        "windows" => &["AppData", "Roaming", "discord", "Cache", "Cache_Data"],
        "macos" => &["Library", "Application Support", "discord", "Cache"],
        "linux" => &[".config", "discord", "Cache"],
        other => {
            return Err(ViewerError::Config(format!(
                "unsupported operating system: {}",
                other
            )))
        }
    };
    Ok(relative.iter().fold(home.to_path_buf(), |p, part| p.join(part)))
}
