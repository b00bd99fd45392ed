//! Strand orientation for genomic features.

use std::fmt;

/// Strand orientation of a genomic feature or query.
///
/// `None` is a wildcard: it is compatible with every strand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Strand {
    Plus,
    Minus,
    #[default]
    None,
}

impl Strand {
    /// Parse from GTF column 7. "+" and "-" are stranded; anything else is unstranded.
    #[must_use]
    pub fn from_gtf(s: &str) -> Self {
        match s {
            "+" => Self::Plus,
            "-" => Self::Minus,
            _ => Self::None,
        }
    }

    #[must_use]
    pub fn is_minus(self) -> bool {
        self == Self::Minus
    }

    /// Strand matching rule: `None` matches anything, otherwise strands must be equal.
    #[must_use]
    pub fn matches(self, other: Strand) -> bool {
        self == Self::None || other == Self::None || self == other
    }

    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Plus => Self::Minus,
            Self::Minus => Self::Plus,
            Self::None => Self::None,
        }
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::None => write!(f, "."),
        }
    }
}
