//! Genic region classification of positions, regions and reads.

pub mod classifier;
pub mod region;

pub use classifier::{GenicRegionClassifier, MITOCHONDRIAL_REFERENCES, reconcile};
pub use region::{GenicRegion, RegionTraits};
