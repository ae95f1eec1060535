use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use crate::error::ConfigError;

const QUALIFIER: &str = "net.dualedit";
const ORGANIZATION: &str = "Dualedit";
const APPLICATION: &str = "dualedit";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Acknowledgment shown after the markup was copied to the clipboard
    pub export_ack: String,
    /// Message passed to the URL prompt when creating a link
    pub link_prompt: String,
    /// Tracing filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            export_ack: "HTML copied to clipboard!".to_string(),
            link_prompt: "Enter URL:".to_string(),
            log_filter: "warn".to_string(),
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(EditorConfig::default()),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config from `path`, or from the default location when none is given
pub fn load(path: Option<&Path>) -> Result<EditorConfig, ConfigError> {
    match path.map(Path::to_path_buf).or_else(config_file_path) {
        Some(path) => load_config(&path),
        None => Ok(EditorConfig::default()),
    }
}

pub fn save_config(path: &Path, config: &EditorConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let toml = toml::to_string_pretty(config)?;

    fs::write(path, toml).map_err(|source| ConfigError::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "export_ack = \"Copied.\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.export_ack, "Copied.");
        assert_eq!(config.link_prompt, "Enter URL:");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "export_ack = [").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));

        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load(Some(&dir.path().join("absent.toml"))).unwrap(),
            EditorConfig::default()
        );

        let path = dir.path().join("config.toml");
        fs::write(&path, "link_prompt = \"URL?\"\n").unwrap();
        assert_eq!(load(Some(&path)).unwrap().link_prompt, "URL?");
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = EditorConfig {
            log_filter: "dualedit=debug".to_string(),
            ..EditorConfig::default()
        };
        save_config(&path, &config).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
