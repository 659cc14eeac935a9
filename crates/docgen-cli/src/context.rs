use std::env;

use docgen::config::ROOT_DIR_VAR;
use docgen::{DocgenConfig, DocumentManager, FilesystemStore, StoragePaths};

use crate::error::CliError;
use crate::util::Verbosity;

pub struct CliSession {
    pub paths: StoragePaths,
    pub manager: DocumentManager<FilesystemStore>,
    pub verbosity: Verbosity,
}

impl CliSession {
    /// Resolves configuration from the environment, with `--root` taking
    /// precedence over `DOCGEN_ROOT_DIR`.
    pub fn bootstrap(root_override: Option<String>, verbosity: Verbosity) -> Result<Self, CliError> {
        let config = DocgenConfig::from_lookup(|key| match &root_override {
            Some(root) if key == ROOT_DIR_VAR => Some(root.clone()),
            _ => env::var(key).ok(),
        })?;

        let paths = config.paths();
        let store = FilesystemStore::with_paths(paths.clone());
        Ok(Self {
            paths,
            manager: DocumentManager::new(store, config),
            verbosity,
        })
    }
}
