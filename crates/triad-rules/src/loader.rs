//! Rule set loading from strings and files.
//!
//! `RuleSetLoader` parses and validates a document once. `FileRuleSource`
//! implements the `RuleSource` trait from triad-core and re-reads its file
//! on every `load`, so each audit sees the file as it is at that moment.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use triad_contracts::{
    error::{TriadError, TriadResult},
    rules::RuleSet,
};
use triad_core::traits::RuleSource;

use crate::schema::RuleSetDocument;

pub struct RuleSetLoader;

impl RuleSetLoader {
    /// Parse `s` as a TOML rule set and validate it.
    pub fn from_toml_str(s: &str) -> TriadResult<RuleSet> {
        let doc: RuleSetDocument = toml::from_str(s).map_err(|e| TriadError::Configuration {
            reason: format!("failed to parse rule set TOML: {}", e),
        })?;
        doc.validate()
    }

    /// Parse `s` as a JSON rule set and validate it.
    pub fn from_json_str(s: &str) -> TriadResult<RuleSet> {
        let doc: RuleSetDocument = serde_json::from_str(s).map_err(|e| TriadError::Configuration {
            reason: format!("failed to parse rule set JSON: {}", e),
        })?;
        doc.validate()
    }

    /// Read and validate the rule set at `path`.
    ///
    /// A `.json` extension selects JSON; anything else is read as TOML.
    pub fn from_file(path: &Path) -> TriadResult<RuleSet> {
        let contents = std::fs::read_to_string(path).map_err(|e| TriadError::Configuration {
            reason: format!("failed to read rule set file '{}': {}", path.display(), e),
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let rules = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };

        match &rules {
            Ok(r) => debug!(path = %path.display(), version = %r.version, "rule set loaded"),
            Err(e) => warn!(path = %path.display(), error = %e, "rule set rejected"),
        }
        rules
    }
}

/// A `RuleSource` backed by a file on disk, reloaded on every call.
#[derive(Debug, Clone)]
pub struct FileRuleSource {
    path: PathBuf,
}

impl FileRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSource for FileRuleSource {
    fn load(&self) -> TriadResult<RuleSet> {
        RuleSetLoader::from_file(&self.path)
    }
}
