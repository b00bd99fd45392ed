//! genic: genomic interval indexing, genic-region classification and coding
//! variant consequence prediction.

pub mod error;

pub mod cli;
pub mod coding;
pub mod codon;
pub mod config;
pub mod effect;
pub mod fasta;
pub mod genic;
pub mod gtf;
pub mod index;
pub mod model;
pub mod reference;
pub mod span;
pub mod strand;
