//! Rewrite rules: a compiled pattern paired with literal replacement text.

use regex::{NoExpand, Regex, RegexBuilder};
use thiserror::Error;

/// A named regex rewrite.
///
/// The pattern is compiled with `.` matching line breaks so a rule can describe a
/// multi-line snippet. The replacement is inserted verbatim; `$1` or `\n` inside it
/// are plain text, not capture references or escapes.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    id: String,
    pattern: Regex,
    replacement: String,
}

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("rule '{id}' has an invalid pattern: {source}")]
    InvalidPattern {
        id: String,
        #[source]
        source: regex::Error,
    },
}

/// Outcome of running one rule over a text.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "Substitution carries the rewritten text and the match count"]
pub struct Substitution {
    pub text: String,
    pub matches: usize,
}

impl Substitution {
    pub fn is_unmatched(&self) -> bool {
        self.matches == 0
    }
}

impl RewriteRule {
    pub fn new(
        id: impl Into<String>,
        pattern: &str,
        replacement: impl Into<String>,
    ) -> Result<Self, RuleError> {
        let id = id.into();
        let pattern = RegexBuilder::new(pattern)
            .dot_matches_new_line(true)
            .build()
            .map_err(|source| RuleError::InvalidPattern {
                id: id.clone(),
                source,
            })?;

        Ok(Self {
            id,
            pattern,
            replacement: replacement.into(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Source text of the compiled pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Number of non-overlapping matches in `text`.
    pub fn count_matches(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    /// Replace every non-overlapping match with the literal replacement.
    ///
    /// With zero matches the returned text equals the input.
    pub fn substitute(&self, text: &str) -> Substitution {
        let matches = self.count_matches(text);
        if matches == 0 {
            return Substitution {
                text: text.to_string(),
                matches,
            };
        }

        let text = self
            .pattern
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned();

        Substitution { text, matches }
    }
}

/// Rules shipped with the binary.
pub mod builtin {
    use super::RewriteRule;

    pub const RADIO_QUERY_PARAM_ID: &str = "radio-query-param";

    /// Old shape: the radio slug is pulled out of `window.location.pathname`
    /// with `path.match(/^\/radio\/([^\/]+)/)`. Whitespace between statements
    /// is free-form.
    pub const RADIO_PATHNAME_PATTERN: &str = concat!(
        r"const path = window\.location\.pathname;\s*",
        r"const radioMatch = path\.match\(/\^\\/radio\\/\(\[\^\\/\]\+\)/\);\s*",
        r"if \(radioMatch\) \{\s*",
        r"setRadioSlug\(radioMatch\[1\]\);\s*",
        r"setIsRadioMode\(true\);\s*",
        r"\}",
    );

    /// New shape: the slug comes from the `?radio=` query parameter.
    pub const RADIO_QUERY_PARAM_REPLACEMENT: &str = concat!(
        "const params = new URLSearchParams(window.location.search);\n",
        "    const radioParam = params.get('radio');\n",
        "    \n",
        "    if (radioParam) {\n",
        "      setRadioSlug(radioParam);\n",
        "      setIsRadioMode(true);\n",
        "    }",
    );

    pub fn radio_query_param() -> RewriteRule {
        RewriteRule::new(
            RADIO_QUERY_PARAM_ID,
            RADIO_PATHNAME_PATTERN,
            RADIO_QUERY_PARAM_REPLACEMENT,
        )
        .expect("built-in radio pattern is a valid regex")
    }

    pub fn all() -> Vec<RewriteRule> {
        vec![radio_query_param()]
    }
}
