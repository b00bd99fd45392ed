//! Coding sequence construction and variant consequence prediction.

pub mod consequence;
pub mod sequence;
pub mod variant;

pub use consequence::{Consequence, Impact};
pub use sequence::{CodingBase, CodingSequence};
pub use variant::{CodingVariant, SPLICE_WINDOW};
