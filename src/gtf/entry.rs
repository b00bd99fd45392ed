//! GTF data structures for parsed records.

use std::collections::BTreeSet;

use crate::strand::Strand;

/// GTF feature types consumed when building a gene model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Exon,
    Cds,
    StartCodon,
    StopCodon,
}

impl Feature {
    /// Parse GTF column 3. Feature types outside the model return `None`.
    #[must_use]
    pub fn from_gtf(s: &str) -> Option<Self> {
        match s {
            "exon" => Some(Self::Exon),
            "CDS" => Some(Self::Cds),
            "start_codon" => Some(Self::StartCodon),
            "stop_codon" => Some(Self::StopCodon),
            _ => None,
        }
    }
}

/// Parsed attributes from GTF column 9.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GtfAttributes {
    pub gene_id: String,
    pub transcript_id: String,
    pub gene_name: Option<String>,
    pub gene_biotype: Option<String>,
    pub gene_status: Option<String>,
    pub transcript_biotype: Option<String>,
    pub protein_id: Option<String>,
    pub tags: BTreeSet<String>,
    /// Every key not consumed above, in file order. `tag` entries are kept here too.
    pub extra: Vec<(String, String)>,
}

impl GtfAttributes {
    /// True if every tag in `required` is present on this record.
    #[must_use]
    pub fn has_tags(&self, required: &[String]) -> bool {
        required.iter().all(|t| self.tags.contains(t))
    }
}

/// A single parsed GTF record (one line), in 0-based half-open coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GtfRecord {
    pub seqname: String,
    pub source: String,
    pub feature: Feature,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub frame: Option<u8>,
    pub attributes: GtfAttributes,
}
