//! Whole-document JSON persistence shared by the catalog and the queue

use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;

use crate::errors::StoreError;

/// Outcome of reading a persisted document
#[derive(Debug)]
pub(crate) enum DocumentRead<T> {
    Loaded(T),
    Missing,
    Malformed(String),
}

pub(crate) async fn read_document<T: DeserializeOwned>(path: &Path) -> DocumentRead<T> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return DocumentRead::Missing,
        Err(err) => return DocumentRead::Malformed(err.to_string()),
    };
    match serde_json::from_str(&raw) {
        Ok(value) => DocumentRead::Loaded(value),
        Err(err) => DocumentRead::Malformed(err.to_string()),
    }
}

/// Serialize `value` as pretty-printed UTF-8 JSON, replacing the file
pub(crate) async fn write_document<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> Result<(), StoreError> {
    let body = serde_json::to_string_pretty(value)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    fs::write(path, body).await.map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
