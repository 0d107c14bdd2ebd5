use crate::rule::RewriteRule;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("File I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not valid UTF-8: {source}")]
    Utf8 {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("rule '{rule_id}' matched nothing in {file}")]
    NoMatch { file: PathBuf, rule_id: String },
}

impl PatchError {
    /// True when the target file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            PatchError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}

/// What to do when a rule finds nothing to rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoMatchPolicy {
    /// Rewrite the file unchanged and stay silent.
    Ignore,
    /// Rewrite the file unchanged and log a warning.
    #[default]
    Warn,
    /// Fail before writing anything.
    Error,
}

impl FromStr for NoMatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(NoMatchPolicy::Ignore),
            "warn" => Ok(NoMatchPolicy::Warn),
            "error" => Ok(NoMatchPolicy::Error),
            other => Err(format!(
                "unknown no-match policy '{other}' (expected ignore, warn or error)"
            )),
        }
    }
}

impl fmt::Display for NoMatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NoMatchPolicy::Ignore => "ignore",
            NoMatchPolicy::Warn => "warn",
            NoMatchPolicy::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PatchOptions {
    pub on_no_match: NoMatchPolicy,
    /// Compute the result without touching the file.
    pub dry_run: bool,
}

/// Match count of one rule during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub rule_id: String,
    pub matches: usize,
}

#[derive(Debug, Clone)]
#[must_use = "PatchReport should be checked for unmatched rules"]
pub struct PatchReport {
    pub file: PathBuf,
    pub original: String,
    pub patched: String,
    pub outcomes: Vec<RuleOutcome>,
    /// False for dry runs.
    pub written: bool,
}

impl PatchReport {
    pub fn total_matches(&self) -> usize {
        self.outcomes.iter().map(|o| o.matches).sum()
    }

    pub fn unmatched_rules(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.matches == 0)
            .map(|o| o.rule_id.as_str())
    }

    pub fn changed(&self) -> bool {
        self.original != self.patched
    }
}

/// Read the whole file as UTF-8 text.
pub fn load(path: &Path) -> Result<String, PatchError> {
    let bytes = fs::read(path).map_err(|source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|source| PatchError::Utf8 {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "loaded target");
    Ok(text)
}

/// Overwrite the file in place with `text`.
pub fn save(path: &Path, text: &str) -> Result<(), PatchError> {
    fs::write(path, text.as_bytes()).map_err(|source| PatchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "saved target");
    Ok(())
}

/// Run every rule over `text` in order.
pub fn substitute(text: &str, rules: &[RewriteRule]) -> (String, Vec<RuleOutcome>) {
    let mut current = text.to_string();
    let mut outcomes = Vec::with_capacity(rules.len());

    for rule in rules {
        let result = rule.substitute(&current);
        debug!(rule = rule.id(), matches = result.matches, "applied rule");
        outcomes.push(RuleOutcome {
            rule_id: rule.id().to_string(),
            matches: result.matches,
        });
        current = result.text;
    }

    (current, outcomes)
}

/// Applies a fixed list of rules to one file: load, substitute, save.
#[derive(Debug, Clone)]
pub struct Patcher {
    rules: Vec<RewriteRule>,
    options: PatchOptions,
}

impl Patcher {
    pub fn new(rules: Vec<RewriteRule>) -> Self {
        Self {
            rules,
            options: PatchOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Count matches per rule without writing.
    pub fn check_file(&self, path: &Path) -> Result<Vec<RuleOutcome>, PatchError> {
        let content = load(path)?;
        let (_, outcomes) = substitute(&content, &self.rules);
        Ok(outcomes)
    }

    /// Rewrite `path` in place.
    ///
    /// A rule with zero matches is handled per [`NoMatchPolicy`]. Under `Ignore`
    /// and `Warn` the file is still rewritten, byte-identical when nothing matched.
    pub fn patch_file(&self, path: &Path) -> Result<PatchReport, PatchError> {
        let original = load(path)?;
        let (patched, outcomes) = substitute(&original, &self.rules);

        for outcome in outcomes.iter().filter(|o| o.matches == 0) {
            match self.options.on_no_match {
                NoMatchPolicy::Ignore => {}
                NoMatchPolicy::Warn => {
                    warn!(
                        rule = %outcome.rule_id,
                        path = %path.display(),
                        "rule matched nothing; file left unchanged by this rule"
                    );
                }
                NoMatchPolicy::Error => {
                    return Err(PatchError::NoMatch {
                        file: path.to_path_buf(),
                        rule_id: outcome.rule_id.clone(),
                    });
                }
            }
        }

        let written = if self.options.dry_run {
            false
        } else {
            save(path, &patched)?;
            true
        };

        let report = PatchReport {
            file: path.to_path_buf(),
            original,
            patched,
            outcomes,
            written,
        };
        info!(
            path = %report.file.display(),
            matches = report.total_matches(),
            written = report.written,
            "patch run finished"
        );

        Ok(report)
    }
}
