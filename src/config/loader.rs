use crate::config::schema::{RuleSetConfig, ValidationError};
use crate::patcher::NoMatchPolicy;
use crate::rule::{RewriteRule, RuleError};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read rule set {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule set{} is not valid TOML: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("rule set{} failed validation: {source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },

    #[error("rule set {} does not compile: {source}", .path.display())]
    Rule {
        path: PathBuf,
        #[source]
        source: RuleError,
    },

    #[error(
        "rule id '{id}' is declared in both {} and {}",
        .first.display(),
        .second.display()
    )]
    DuplicateRuleId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("cannot scan {} for rule sets: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no .toml rule files found in {}", .path.display())]
    NoRuleFiles { path: PathBuf },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

/// Rules gathered from one or more rule-set files, in load order.
#[derive(Debug, Clone, Default)]
pub struct LoadedRuleSets {
    pub rules: Vec<RewriteRule>,
    /// Policy of the first rule set that declares one.
    pub on_no_match: Option<NoMatchPolicy>,
}

pub fn load_from_str(input: &str) -> Result<RuleSetConfig, ConfigError> {
    let config: RuleSetConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<RuleSetConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    load_from_str(&contents).map_err(|error| match error {
        ConfigError::Toml { path: None, source } => ConfigError::Toml {
            path: Some(path.to_path_buf()),
            source,
        },
        ConfigError::Validation { path: None, source } => ConfigError::Validation {
            path: Some(path.to_path_buf()),
            source,
        },
        other => other,
    })
}

/// Resolve `--rules` to a list of rule files.
///
/// A file is returned as-is. A directory yields its direct `*.toml` children,
/// sorted by path.
pub fn discover_rule_files(path: impl AsRef<Path>) -> Result<Vec<PathBuf>, ConfigError> {
    let path = path.as_ref();
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path).max_depth(1) {
        let entry = entry.map_err(|source| ConfigError::Discovery {
            path: path.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("toml")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();

    if files.is_empty() {
        return Err(ConfigError::NoRuleFiles {
            path: path.to_path_buf(),
        });
    }

    Ok(files)
}

/// Load and compile every rule set under `path`.
///
/// Rule ids must be unique across all files, not only within one.
pub fn load_rule_sets(path: impl AsRef<Path>) -> Result<LoadedRuleSets, ConfigError> {
    let mut loaded = LoadedRuleSets::default();
    let mut declared_in: HashMap<String, PathBuf> = HashMap::new();

    for rule_file in discover_rule_files(path)? {
        let config = load_from_path(&rule_file)?;

        for rule in &config.rules {
            if let Some(first) = declared_in.get(&rule.id) {
                return Err(ConfigError::DuplicateRuleId {
                    id: rule.id.clone(),
                    first: first.clone(),
                    second: rule_file.clone(),
                });
            }
            declared_in.insert(rule.id.clone(), rule_file.clone());
        }

        let rules = config.compile().map_err(|source| ConfigError::Rule {
            path: rule_file.clone(),
            source,
        })?;
        debug!(path = %rule_file.display(), rules = rules.len(), "loaded rule set");

        loaded.on_no_match = loaded.on_no_match.or(config.meta.on_no_match);
        loaded.rules.extend(rules);
    }

    Ok(loaded)
}
