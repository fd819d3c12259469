use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Versioned menu document served when no override is given.
pub const DEFAULT_MENU_URL: &str =
    "https://raw.githubusercontent.com/Meta-Mobile-Developer-PC/Working-With-Data-API/main/capstone.json";

pub struct Config {
    pub data_dir: PathBuf,
    pub menu_db_path: PathBuf,
    pub profile_db_path: PathBuf,
    pub menu_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Config {
    pub fn load(data_dir: Option<PathBuf>, menu_url: Option<String>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => ProjectDirs::from("", "", "bistro")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        Self::in_dir(data_dir, menu_url)
    }

    fn in_dir(data_dir: PathBuf, menu_url: Option<String>) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(Config {
            menu_db_path: data_dir.join("menu.db"),
            profile_db_path: data_dir.join("profile.db"),
            data_dir,
            menu_url: menu_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MENU_URL.to_string()),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_creates_directory_and_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("bistro");
        let config = Config::in_dir(dir.clone(), None).unwrap();

        assert!(dir.is_dir());
        assert_eq!(config.menu_db_path, dir.join("menu.db"));
        assert_eq!(config.profile_db_path, dir.join("profile.db"));
        assert_eq!(config.menu_url, DEFAULT_MENU_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_menu_url_override() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(
            Some(tmp.path().to_path_buf()),
            Some("http://127.0.0.1:9/menu.json".to_string()),
        )
        .unwrap();
        assert_eq!(config.menu_url, "http://127.0.0.1:9/menu.json");

        let config = Config::load(Some(tmp.path().to_path_buf()), Some("  ".to_string())).unwrap();
        assert_eq!(config.menu_url, DEFAULT_MENU_URL);
    }
}
