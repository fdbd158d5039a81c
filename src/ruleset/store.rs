//! Ruleset lookup and loading.
//!
//! This module provides the [`RulesetStore`], the engine's read-only view of
//! published tax parameters. Lookups are deterministic and cacheable; there
//! is no mutation and never a fallback rate.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;

use crate::error::{EngineError, EngineResult};

use super::types::Ruleset;

/// Read-only store of published rulesets.
///
/// The store holds every published version and answers point-in-time
/// lookups: the active ruleset for a date is the one whose effective
/// interval contains it, highest version winning on overlap.
///
/// # Directory Structure
///
/// [`RulesetStore::load`] reads every `.yaml`/`.yml` file beneath a
/// directory, each file one published ruleset:
///
/// ```text
/// rulesets/
/// ├── us_income_tax_2025.yaml
/// ├── us_fica_2025.yaml
/// └── ca_income_tax_2025.yaml
/// ```
#[derive(Debug, Clone, Default)]
pub struct RulesetStore {
    rulesets: Vec<Ruleset>,
}

impl RulesetStore {
    /// Builds a store from already-published rulesets.
    pub fn with_rulesets(rulesets: Vec<Ruleset>) -> Self {
        RulesetStore { rulesets }
    }

    /// Loads every ruleset file from the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RulesetFileNotFound`] when the directory does
    /// not exist and [`EngineError::RulesetParseError`] when any file fails
    /// to parse.
    pub fn load<P: AsRef<Path>>(dir: P) -> EngineResult<Self> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|_| EngineError::RulesetFileNotFound {
            path: dir.display().to_string(),
        })?;

        let mut rulesets = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| EngineError::RulesetParseError {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            let is_yaml = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml");
            if !is_yaml {
                continue;
            }

            let content = fs::read_to_string(&path).map_err(|_| EngineError::RulesetFileNotFound {
                path: path.display().to_string(),
            })?;
            rulesets.push(Self::parse(&content, &path.display().to_string())?);
        }

        Ok(RulesetStore { rulesets })
    }

    /// Parses a single ruleset document.
    pub fn parse(content: &str, path: &str) -> EngineResult<Ruleset> {
        serde_yaml::from_str(content).map_err(|e| EngineError::RulesetParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the active ruleset for `(key, jurisdiction)` as of a date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RulesetUnavailable`] when no published ruleset
    /// covers the date. This is a blocking error for any dependent
    /// calculation; the engine never substitutes default rates.
    pub fn get_active(
        &self,
        key: &str,
        jurisdiction: &str,
        as_of: NaiveDate,
    ) -> EngineResult<&Ruleset> {
        self.rulesets
            .iter()
            .filter(|r| r.key == key && r.jurisdiction == jurisdiction && r.is_active(as_of))
            .max_by_key(|r| r.version)
            .ok_or_else(|| EngineError::RulesetUnavailable {
                key: key.to_string(),
                jurisdiction: jurisdiction.to_string(),
                as_of,
            })
    }

    /// Number of published rulesets in the store.
    pub fn len(&self) -> usize {
        self.rulesets.len()
    }

    /// True when the store holds no rulesets.
    pub fn is_empty(&self) -> bool {
        self.rulesets.is_empty()
    }
}
