use std::fs;
use std::path::{Path, PathBuf};
use serde::Deserialize;


#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}


/// Engine settings, usually read from the `views` block of the
/// application configuration.
///
/// ```yaml
/// root: resources/views
/// extension: html
/// cache: false
/// base_url: https://lore.example
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the templates.
    pub root: PathBuf,
    /// File extension appended to template names.
    pub extension: String,
    /// Keep compiled templates in memory.
    pub cache: bool,
    /// Longest chain of layouts plus partials in one render.
    pub max_depth: usize,
    /// Prefix for the `url` helper.
    pub base_url: String,
    /// Prefix for the `asset` helper.
    pub asset_base: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from("views"),
            extension: "html".to_owned(),
            cache: true,
            max_depth: 32,
            base_url: String::new(),
            asset_base: "/assets".to_owned(),
        }
    }
}

impl Config {
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Config::from_yaml(&text)
    }
}
