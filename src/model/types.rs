//! Gene model records stored in the [`super::GeneModel`] arena.

use std::fmt;

use crate::error::Error;
use crate::index::AnnotationFields;
use crate::span::GenomeSpan;
use crate::strand::Strand;

/// Arena index of a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneKey(pub usize);

/// Arena index of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TranscriptKey(pub usize);

impl AnnotationFields for GeneKey {
    const FIELDS: &'static [&'static str] = &["gene_id", "gene_name", "biotype", "status", "strand"];
}

/// An exon, CDS segment, or start/stop codon segment of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    pub transcript: TranscriptKey,
    pub start: i64,
    pub end: i64,
    pub attributes: Vec<(String, String)>,
}

impl Exon {
    #[must_use]
    pub fn len(&self) -> i64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn contains(&self, start: i64, end: i64) -> bool {
        self.start <= start && end <= self.end
    }
}

/// A transcript and its exon, CDS and codon segments.
///
/// Start and stop codon spans are tracked apart from the CDS bounds because a
/// codon may straddle two exons.
#[derive(Debug, Clone)]
pub struct Transcript {
    pub key: TranscriptKey,
    pub id: String,
    pub gene: GeneKey,
    pub biotype: Option<String>,
    pub protein_id: Option<String>,
    pub start: i64,
    pub end: i64,
    pub cds_start: Option<i64>,
    pub cds_end: Option<i64>,
    pub start_codon: Option<(i64, i64)>,
    pub stop_codon: Option<(i64, i64)>,
    pub exons: Vec<Exon>,
    pub cds_exons: Vec<Exon>,
    pub start_codon_exons: Vec<Exon>,
    pub stop_codon_exons: Vec<Exon>,
}

fn widen(bounds: Option<(i64, i64)>, start: i64, end: i64) -> (i64, i64) {
    match bounds {
        Some((s, e)) => (s.min(start), e.max(end)),
        None => (start, end),
    }
}

impl Transcript {
    pub(crate) fn new(key: TranscriptKey, id: String, gene: GeneKey) -> Self {
        Self {
            key,
            id,
            gene,
            biotype: None,
            protein_id: None,
            start: i64::MAX,
            end: i64::MIN,
            cds_start: None,
            cds_end: None,
            start_codon: None,
            stop_codon: None,
            exons: Vec::new(),
            cds_exons: Vec::new(),
            start_codon_exons: Vec::new(),
            stop_codon_exons: Vec::new(),
        }
    }

    fn segment(&self, start: i64, end: i64, attributes: Vec<(String, String)>) -> Exon {
        Exon {
            transcript: self.key,
            start,
            end,
            attributes,
        }
    }

    pub fn add_exon(&mut self, start: i64, end: i64, attributes: Vec<(String, String)>) {
        self.start = self.start.min(start);
        self.end = self.end.max(end);
        let exon = self.segment(start, end, attributes);
        self.exons.push(exon);
    }

    pub fn add_cds(&mut self, start: i64, end: i64, attributes: Vec<(String, String)>) {
        let bounds = self.cds_start.zip(self.cds_end);
        let (s, e) = widen(bounds, start, end);
        self.cds_start = Some(s);
        self.cds_end = Some(e);
        let exon = self.segment(start, end, attributes);
        self.cds_exons.push(exon);
    }

    pub fn add_start_codon(&mut self, start: i64, end: i64, attributes: Vec<(String, String)>) {
        self.start_codon = Some(widen(self.start_codon, start, end));
        let exon = self.segment(start, end, attributes);
        self.start_codon_exons.push(exon);
    }

    pub fn add_stop_codon(&mut self, start: i64, end: i64, attributes: Vec<(String, String)>) {
        self.stop_codon = Some(widen(self.stop_codon, start, end));
        let exon = self.segment(start, end, attributes);
        self.stop_codon_exons.push(exon);
    }

    /// Sort every segment list by `(start, end)`. Called once when loading finishes.
    pub(crate) fn freeze(&mut self) {
        for list in [
            &mut self.exons,
            &mut self.cds_exons,
            &mut self.start_codon_exons,
            &mut self.stop_codon_exons,
        ] {
            list.sort_by_key(|e| (e.start, e.end));
        }
    }

    #[must_use]
    pub fn has_cds(&self) -> bool {
        self.cds_start.is_some() && self.cds_end.is_some()
    }

    /// Genomic extent of the translated region including start and stop codons.
    #[must_use]
    pub fn coding_bounds(&self) -> Option<(i64, i64)> {
        let mut bounds = self.cds_start.zip(self.cds_end);
        for codon in [self.start_codon, self.stop_codon].into_iter().flatten() {
            bounds = Some(widen(bounds, codon.0, codon.1));
        }
        bounds
    }

    /// True if some exon fully contains `[start, end)`.
    #[must_use]
    pub fn exon_contains(&self, start: i64, end: i64) -> bool {
        self.exons.iter().any(|e| e.contains(start, end))
    }

    /// True if some CDS segment fully contains `[start, end)`.
    #[must_use]
    pub fn cds_contains(&self, start: i64, end: i64) -> bool {
        self.cds_exons.iter().any(|e| e.contains(start, end))
    }
}

/// A gene: the union of its transcripts' exons on one reference and strand.
#[derive(Debug, Clone)]
pub struct Gene {
    pub key: GeneKey,
    pub id: String,
    pub name: String,
    pub biotype: Option<String>,
    pub status: Option<String>,
    pub reference: String,
    pub start: i64,
    pub end: i64,
    pub strand: Strand,
    pub transcripts: Vec<TranscriptKey>,
}

impl Gene {
    pub fn span(&self) -> Result<GenomeSpan, Error> {
        GenomeSpan::new(self.reference.clone(), self.start, self.end, self.strand)
    }
}

/// What kind of feature a load diagnostic refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Gene,
    Transcript,
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gene => write!(f, "gene"),
            Self::Transcript => write!(f, "transcript"),
        }
    }
}

/// A gene or transcript excluded from the model while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFeature {
    pub kind: FeatureKind,
    pub id: String,
    pub reason: String,
}

impl fmt::Display for SkippedFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.id, self.reason)
    }
}
