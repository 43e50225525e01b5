use std::path::{Path, PathBuf};

use action_locator::{HealConfig, JsonFileCatalogStore, JsonFilePendingQueue};

use super::output::OutputFormat;

pub struct CliContext {
    config: HealConfig,
    config_path: PathBuf,
    output: OutputFormat,
}

impl CliContext {
    pub fn new(config: HealConfig, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config,
            config_path,
            output,
        }
    }

    pub fn config(&self) -> &HealConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> &OutputFormat {
        &self.output
    }

    pub fn catalog_store(&self) -> JsonFileCatalogStore {
        JsonFileCatalogStore::new(&self.config.catalog_path)
    }

    pub fn pending_queue(&self) -> JsonFilePendingQueue {
        JsonFilePendingQueue::new(&self.config.pending_path)
    }
}
