//! Annotation loading errors

use thiserror::Error;

/// Annotation refresh failures.
///
/// Both variants are non-fatal: the store keeps serving its previous
/// snapshot and the caller decides how to tell the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoadError {
    /// Source could not be reached (network down, not configured, timed out)
    #[error("Annotation source unreachable: {0}")]
    SourceUnreachable(String),

    /// Source answered with something that could not be mapped
    #[error("Annotation source rejected: {0}")]
    SourceRejected(String),
}
