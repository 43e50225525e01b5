//! Catalog store
//!
//! Loading never fails: a missing or unreadable catalog degrades healing to
//! "primary selector only" instead of blocking the caller.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::document::{read_document, write_document, DocumentRead};
use crate::errors::StoreError;
use crate::types::Catalog;

/// Durable key -> selectors mapping
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Current catalog; empty when the source is missing or malformed
    async fn load(&self) -> Catalog;

    /// Replace the persisted catalog
    async fn save(&self, catalog: &Catalog) -> Result<(), StoreError>;
}

/// Catalog persisted as a pretty-printed JSON object
#[derive(Debug, Clone)]
pub struct JsonFileCatalogStore {
    path: PathBuf,
}

impl JsonFileCatalogStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CatalogStore for JsonFileCatalogStore {
    async fn load(&self) -> Catalog {
        match read_document::<Catalog>(&self.path).await {
            DocumentRead::Loaded(catalog) => {
                debug!(path = %self.path.display(), entries = catalog.len(), "catalog loaded");
                catalog
            }
            DocumentRead::Missing => {
                warn!(path = %self.path.display(), "catalog not found, using empty catalog");
                Catalog::new()
            }
            DocumentRead::Malformed(reason) => {
                warn!(path = %self.path.display(), %reason, "failed to load catalog, using empty catalog");
                Catalog::new()
            }
        }
    }

    async fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        write_document(&self.path, catalog).await?;
        debug!(path = %self.path.display(), entries = catalog.len(), "catalog saved");
        Ok(())
    }
}

/// Process-local catalog
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    catalog: RwLock<Catalog>,
}

impl InMemoryCatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: RwLock::new(catalog),
        }
    }

    pub fn snapshot(&self) -> Catalog {
        self.catalog.read().clone()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn load(&self) -> Catalog {
        self.snapshot()
    }

    async fn save(&self, catalog: &Catalog) -> Result<(), StoreError> {
        *self.catalog.write() = catalog.clone();
        Ok(())
    }
}
