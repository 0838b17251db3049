use std::path::{Path, PathBuf};

use tokio::fs;

use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::RawPluginDefinition;

/// File name the loader looks for inside each plugin directory.
pub const DEFINITION_FILE: &str = "plugin.json";

/// A definition file the scan could not use, with the reason it was
/// skipped.
#[derive(Debug)]
pub struct SkippedDefinition {
    pub path: PathBuf,
    pub error: PluginSystemError,
}

/// Everything one scan produced: the parsed definitions plus a record per
/// skipped file.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub definitions: Vec<RawPluginDefinition>,
    pub skipped: Vec<SkippedDefinition>,
}

/// Definition source: walks configured directories for
/// `<plugin>/plugin.json` files and parses each into a raw definition.
///
/// A malformed file never aborts the batch — it is logged, recorded in
/// the outcome, and the walk continues. Resolution of what was found is
/// someone else's job.
pub struct DefinitionLoader {
    search_paths: Vec<PathBuf>,
}

impl DefinitionLoader {
    pub fn new() -> Self {
        Self {
            search_paths: Vec::new(),
        }
    }

    /// Add a directory to search for plugin definitions.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.search_paths.contains(&path) {
            self.search_paths.push(path);
        }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }

    /// Scans every search path. Plugin directories are visited in name
    /// order so the definition order (and with it the first-seen
    /// tie-break downstream) does not depend on filesystem iteration
    /// order.
    pub async fn scan(&self) -> ScanOutcome {
        let mut outcome = ScanOutcome::default();
        for base in &self.search_paths {
            self.scan_directory(base, &mut outcome).await;
        }
        outcome
    }

    async fn scan_directory(&self, base: &Path, outcome: &mut ScanOutcome) {
        let mut reader = match fs::read_dir(base).await {
            Ok(reader) => reader,
            Err(e) => {
                log::warn!(
                    "Skipping plugin directory '{}': {}",
                    base.display(),
                    e
                );
                return;
            }
        };

        let mut candidates: Vec<PathBuf> = Vec::new();
        loop {
            match reader.next_entry().await {
                Ok(Some(entry)) => {
                    let candidate = entry.path().join(DEFINITION_FILE);
                    if fs::metadata(&candidate).await.is_ok() {
                        candidates.push(candidate);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!(
                        "Error while scanning '{}': {}",
                        base.display(),
                        e
                    );
                    break;
                }
            }
        }
        candidates.sort();

        for path in candidates {
            match self.load_definition(&path).await {
                Ok(definition) => {
                    log::debug!(
                        "Loaded plugin definition '{}' from '{}'",
                        definition.id,
                        path.display()
                    );
                    outcome.definitions.push(definition);
                }
                Err(error) => {
                    log::warn!("{}", error);
                    outcome.skipped.push(SkippedDefinition { path, error });
                }
            }
        }
    }

    /// Reads and parses one definition file, stamping the definition with
    /// its on-disk location.
    pub async fn load_definition(
        &self,
        path: &Path,
    ) -> Result<RawPluginDefinition, PluginSystemError> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message: "could not read definition file".to_string(),
                source: Some(Box::new(e)),
            })?;
        let mut definition: RawPluginDefinition =
            serde_json::from_str(&text).map_err(|e| PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message: "could not parse definition file".to_string(),
                source: Some(Box::new(e)),
            })?;
        definition.location = Some(path.to_path_buf());
        Ok(definition)
    }
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new()
    }
}
