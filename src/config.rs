use crate::error::MetagraphError;
use serde::{Deserialize, Serialize};
use std::{
    fs::{read_to_string, write},
    path::Path,
};

/// Canonical file name of a saved graph document.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Graph-wide settings, readable from a TOML file.
///
/// ```toml
/// metadata_file = "metadata.json"
/// indent = 2
/// sort_entries = true
/// skip_hidden = false
/// follow_links = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// File name used when a graph is saved without an explicit or remembered destination.
    pub metadata_file: String,
    /// JSON indentation width for saved documents.
    pub indent: usize,
    /// Sort directory entries by name while populating, instead of filesystem order.
    pub sort_entries: bool,
    /// Skip dot-files and dot-directories while populating.
    pub skip_hidden: bool,
    /// Follow symbolic links while populating.
    pub follow_links: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            metadata_file: METADATA_FILE_NAME.to_string(),
            indent: 2,
            sort_entries: false,
            skip_hidden: false,
            follow_links: false,
        }
    }
}

impl GraphConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, MetagraphError> {
        let config: GraphConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields the defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MetagraphError> {
        let path = path.as_ref();
        tracing::debug!("Attempting to read graph config from: {:?}", path);
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(GraphConfig::default());
        }
        GraphConfig::from_toml_str(&read_to_string(path)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), MetagraphError> {
        tracing::debug!("Attempting to write graph config to: {:?}", path.as_ref());
        write(path, toml::to_string(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), MetagraphError> {
        let name = Path::new(&self.metadata_file);
        if self.metadata_file.is_empty() || name.components().count() != 1 {
            return Err(MetagraphError::Config(format!(
                "metadata_file must be a plain file name, got '{}'",
                self.metadata_file
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_defaults() {
        let config = GraphConfig::from_toml_str("sort_entries = true\nindent = 4\n").unwrap();
        assert!(config.sort_entries);
        assert_eq!(config.indent, 4);
        assert_eq!(config.metadata_file, METADATA_FILE_NAME);
        assert!(!config.skip_hidden);
    }

    #[test]
    fn metadata_file_must_be_a_name() {
        let err = GraphConfig::from_toml_str("metadata_file = \"a/b.json\"").unwrap_err();
        assert!(matches!(err, MetagraphError::Config(_)));
    }

    #[test]
    fn missing_file_is_default_and_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("metagraph.toml");
        assert_eq!(GraphConfig::from_file(&path).unwrap(), GraphConfig::default());

        let config = GraphConfig {
            skip_hidden: true,
            ..Default::default()
        };
        config.to_file(&path).unwrap();
        assert_eq!(GraphConfig::from_file(&path).unwrap(), config);
    }
}
