//! Filename pattern compilation.
//!
//! Users type patterns in two flavours: a plain substring (the common case,
//! e.g. `_C1.tif`) or a raw regular expression. Both end up as a
//! [`MatchPredicate`] that is tested against the *whole* file name.
//!
//! # Examples
//!
//! ```
//! use area_selector::services::pattern::compile;
//!
//! let positive = compile("_C1.tif", false).unwrap();
//! assert!(positive.matches("sample_C1.tif"));
//! assert!(!positive.matches("sample_C1xtif"));
//!
//! let raw = compile(r".*C\d\.tif", true).unwrap();
//! assert!(raw.matches("sample_C3.tif"));
//! ```

use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Errors raised while compiling user patterns
#[derive(Error, Debug)]
pub enum PatternError {
    #[error("Invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// A compiled whole-name match predicate.
#[derive(Clone)]
pub enum MatchPredicate {
    /// Matches no input at all (an empty literal pattern).
    Nothing,

    /// Anchored regex; `source` is the expression before anchoring.
    Regex { source: String, regex: Regex },
}

impl MatchPredicate {
    /// Test the predicate against a complete file or directory name.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            MatchPredicate::Nothing => false,
            MatchPredicate::Regex { regex, .. } => regex.is_match(name),
        }
    }

    /// The expression the predicate was built from, `None` when it matches nothing.
    pub fn source(&self) -> Option<&str> {
        match self {
            MatchPredicate::Nothing => None,
            MatchPredicate::Regex { source, .. } => Some(source),
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, MatchPredicate::Nothing)
    }
}

impl fmt::Debug for MatchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPredicate::Nothing => f.write_str("MatchPredicate::Nothing"),
            MatchPredicate::Regex { source, .. } => {
                f.debug_tuple("MatchPredicate::Regex").field(source).finish()
            }
        }
    }
}

/// Compile a user pattern into a whole-name predicate.
///
/// * `is_regex == true` - `raw` is used verbatim and must match the entire
///   name. Callers wanting substring semantics write `.*foo.*` themselves.
/// * `is_regex == false` - `raw` is a literal; the result matches any name
///   containing it. All regex metacharacters (notably `.`) are escaped.
///   An empty literal yields [`MatchPredicate::Nothing`].
///
/// # Errors
///
/// [`PatternError::InvalidRegex`] when a raw regex does not compile.
pub fn compile(raw: &str, is_regex: bool) -> Result<MatchPredicate, PatternError> {
    let source = if is_regex {
        raw.to_string()
    } else if raw.is_empty() {
        return Ok(MatchPredicate::Nothing);
    } else {
        literal_to_regex(raw)
    };

    let anchored = format!("^(?:{})$", source);
    let regex = Regex::new(&anchored).map_err(|e| PatternError::InvalidRegex {
        pattern: raw.to_string(),
        source: e,
    })?;

    tracing::debug!("Compiled pattern '{}' (regex: {}) as {}", raw, is_regex, source);

    Ok(MatchPredicate::Regex { source, regex })
}

/// Turn a literal into the "any prefix, literal, any suffix" expression.
///
/// `(?s)` lets the wildcards span any character so the result is a pure
/// contains-match.
pub fn literal_to_regex(literal: &str) -> String {
    format!("(?s).*{}.*", regex::escape(literal))
}

/// Literal search-and-replace used to derive companion file names.
///
/// Every occurrence of the literal `pattern` is replaced; the replacement is
/// inserted verbatim (`$1` is not expanded).
#[derive(Debug, Clone)]
pub struct Substitution {
    pattern: String,
    regex: Regex,
}

impl Substitution {
    /// Build a substitution for a non-empty literal.
    ///
    /// Returns `None` for an empty pattern, which has no meaningful occurrence.
    pub fn literal(pattern: &str) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }

        // An escaped literal is always a valid expression
        let regex = Regex::new(&regex::escape(pattern)).ok()?;

        Some(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether `haystack` contains the pattern at least once.
    pub fn occurs_in(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }

    /// Replace every occurrence of the pattern with `replacement`.
    pub fn apply<'h>(&self, haystack: &'h str, replacement: &str) -> Cow<'h, str> {
        self.regex.replace_all(haystack, NoExpand(replacement))
    }
}
