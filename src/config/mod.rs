pub mod loader;
pub mod schema;

pub use loader::{
    discover_rule_files, load_from_path, load_from_str, load_rule_sets, ConfigError,
    LoadedRuleSets,
};
pub use schema::{Metadata, RuleDefinition, RuleSetConfig, ValidationError, ValidationIssue};
