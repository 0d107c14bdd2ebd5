//! Snippet Patcher: one-shot regex rewrites of known code snippets
//!
//! Locates a known multi-line fragment inside a source file and replaces it with
//! new text. The built-in rule moves a radio-station slug lookup from a
//! `window.location.pathname` regex to a `?radio=` query parameter; further rules
//! can be supplied as TOML rule sets.
//!
//! # Pipeline
//!
//! Every run is `load` -> `substitute` -> `save` on a single file:
//!
//! - Patterns are compiled with `.` matching newlines
//! - Replacements are literal text (no `$1` expansion)
//! - A rule that matches nothing is reported, per [`NoMatchPolicy`]
//! - Bytes outside the matches, line endings included, are kept as-is
//!
//! # Example
//!
//! ```no_run
//! use snippet_patcher::{builtin, Patcher};
//! use std::path::Path;
//!
//! let report = Patcher::new(builtin::all())
//!     .patch_file(Path::new("src/App.tsx"))
//!     .expect("patch failed");
//! println!("{} match(es) rewritten", report.total_matches());
//! ```

pub mod config;
pub mod logging;
pub mod patcher;
pub mod rule;

// Re-exports
pub use config::{
    discover_rule_files, load_from_path, load_from_str, load_rule_sets, ConfigError,
    LoadedRuleSets, RuleSetConfig, ValidationError,
};
pub use patcher::{
    load, save, substitute, NoMatchPolicy, PatchError, PatchOptions, PatchReport, Patcher,
    RuleOutcome,
};
pub use rule::{builtin, RewriteRule, RuleError, Substitution};
