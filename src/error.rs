use std::{io, path::StripPrefixError};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use tempfile::PersistError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum MetagraphError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Corrupt graph document: {0}")]
    CorruptGraph(String),
    #[error("Invalid path: {0}")]
    InvalidPath(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Type registry error: {0}")]
    TypeRegistry(String),
    #[error("Node has no parent to compute a relative path against: {0}")]
    UnparentedNode(String),
}

impl MetagraphError {
    /// Lookup misses are the one error class callers routinely recover from.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetagraphError::NotFound(_))
    }
}

impl From<StripPrefixError> for MetagraphError {
    fn from(src: StripPrefixError) -> MetagraphError {
        MetagraphError::InvalidPath(format!("Strip prefix failed for path. Error: {src}"))
    }
}

impl From<toml::de::Error> for MetagraphError {
    fn from(src: toml::de::Error) -> MetagraphError {
        MetagraphError::Config(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for MetagraphError {
    fn from(src: toml::ser::Error) -> MetagraphError {
        MetagraphError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for MetagraphError {
    fn from(src: JsonError) -> MetagraphError {
        MetagraphError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<uuid::Error> for MetagraphError {
    fn from(src: uuid::Error) -> MetagraphError {
        MetagraphError::Serialization(format!("UUID conversion failed: {src}"))
    }
}

impl From<io::Error> for MetagraphError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => MetagraphError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => MetagraphError::PermissionDenied,
            _ => MetagraphError::Io(format!("IOError: {}: {x}", x.kind())),
        }
    }
}

impl From<walkdir::Error> for MetagraphError {
    fn from(x: walkdir::Error) -> Self {
        let path = x.path().map(|p| p.display().to_string()).unwrap_or_default();
        match x.into_io_error() {
            Some(io_error) => MetagraphError::from(io_error),
            None => MetagraphError::Io(format!("directory walk failed at '{path}'")),
        }
    }
}

impl From<PersistError> for MetagraphError {
    fn from(x: PersistError) -> Self {
        MetagraphError::Io(format!(
            "could not move temporary file into place: {}",
            x.error
        ))
    }
}
