//! Error types for agenda-core operations.

use serde::Serialize;
use thiserror::Error;

/// Why a sentence could not be turned into an event.
///
/// All variants are terminal: the same `(text, anchor)` pair always fails the
/// same way, so there is nothing to retry.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseError {
    /// No date, no time and no scheduling trigger word were found.
    #[error("No event keyword found: message does not look like a scheduling request")]
    NoEventKeywordFound,

    /// The message looks like an event but has no resolvable date.
    #[error("No date expression found")]
    NoDateExpressionFound,

    /// An explicit `DD/MM[/YYYY]` date was present but is not a calendar date.
    #[error("Invalid explicit date: day or month out of calendar range")]
    InvalidExplicitDate,
}

impl ParseError {
    /// Stable label for logs and for collaborators that branch on the outcome.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::NoEventKeywordFound => "no_event_keyword_found",
            ParseError::NoDateExpressionFound => "no_date_expression_found",
            ParseError::InvalidExplicitDate => "invalid_explicit_date",
        }
    }
}

/// Errors building an [`AnchorContext`](crate::event::AnchorContext).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnchorError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Errors compiling a [`Parser`](crate::parser::Parser) from [`ParseOptions`](crate::parser::ParseOptions).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Category '{0}' has no keywords")]
    EmptyKeywords(String),

    #[error("Category title must not be empty")]
    EmptyTitle,

    #[error("Invalid complement pattern for category '{title}': {source}")]
    InvalidPattern {
        title: String,
        #[source]
        source: regex::Error,
    },

    #[error("Complement pattern for category '{0}' must capture a named group 'obj'")]
    MissingObjectGroup(String),

    #[error("Complement template for category '{0}' must contain '{{}}'")]
    MissingPlaceholder(String),
}

pub type Result<T> = std::result::Result<T, ParseError>;
