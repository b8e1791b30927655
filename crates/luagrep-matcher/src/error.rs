//! Matcher error types

use thiserror::Error;

/// Reasons a match could not be attempted or completed.
///
/// A template that simply does not occur is not an error; it yields
/// `Verdict::NoMatch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("template is empty")]
    EmptyTemplate,

    #[error("template nesting depth {depth} exceeds the limit of {limit}")]
    TemplateTooDeep { depth: usize, limit: usize },

    #[error("candidate nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },
}
