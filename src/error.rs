//! Error types for the genic library.

use thiserror::Error;

/// Errors that can occur while loading annotations or computing consequences.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A parse error occurred while reading input data.
    #[error("{0}")]
    Parse(String),

    /// A validation constraint was violated.
    #[error("{0}")]
    Validation(String),

    /// Two spans on different references were compared.
    #[error("mismatched references: '{left}' vs '{right}'")]
    MismatchedReference { left: String, right: String },

    /// The sequence source could not return the requested range.
    #[error("sequence fetch failed: {0}")]
    SequenceFetch(String),

    /// Input violated a structural precondition (unsorted GTF, broken codon frame).
    /// The affected gene or transcript is skipped rather than aborting the run.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A variant that could not be placed on a transcript's coding sequence.
    #[error("unresolvable variant: {0}")]
    UnresolvableVariant(String),
}
