///
/// # Layout Configuration
///
/// File extensions that decide which files count as scripts, images,
/// sounds and config resources. Defaults cover the stock game layout and
/// can be overridden from a TOML file:
///
/// ```toml
/// script_extensions = ["js"]
/// image_extensions = ["png", "jpg", "jpeg", "bmp", "gif"]
/// sound_extensions = ["mp3", "ogg"]
/// config_extensions = ["json"]
/// ```
///
/// Omitted keys keep their defaults. Matching ignores case.
///

use serde::Deserialize;
use std::path::Path;

use crate::errors::PackageError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub script_extensions: Vec<String>,
    pub image_extensions: Vec<String>,
    pub sound_extensions: Vec<String>,
    pub config_extensions: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            script_extensions: strings(&["js"]),
            image_extensions: strings(&["png", "jpg", "jpeg", "bmp", "gif"]),
            sound_extensions: strings(&["mp3", "ogg"]),
            config_extensions: strings(&["json"]),
        }
    }
}

impl LayoutConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_path(path: &Path) -> Result<Self, PackageError> {
        let content = std::fs::read_to_string(path).map_err(PackageError::io(path))?;
        Self::from_toml_str(&content).map_err(|e| PackageError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Every extension a resource listing under `resources/` accepts.
    pub fn resource_extensions(&self) -> Vec<String> {
        self.image_extensions
            .iter()
            .chain(&self.sound_extensions)
            .chain(&self.config_extensions)
            .cloned()
            .collect()
    }
}
