//! In-memory gene model: genes and transcripts held in an arena with a binned
//! interval index over gene spans.

pub mod builder;
pub mod types;

use std::collections::HashMap;
use std::io::{BufRead, Read};
use std::path::Path;

use crate::error::Error;
use crate::gtf;
use crate::index::{AnnotationFields, IntervalIndex};
use crate::span::GenomeSpan;

pub use builder::{GeneModelBuilder, LoadOptions};
pub use types::{Exon, FeatureKind, Gene, GeneKey, SkippedFeature, Transcript, TranscriptKey};

/// Genes and transcripts loaded from a GTF, queryable by coordinate or id.
#[derive(Debug)]
pub struct GeneModel {
    pub(crate) genes: Vec<Gene>,
    pub(crate) transcripts: Vec<Transcript>,
    pub(crate) gene_ids: HashMap<String, GeneKey>,
    pub(crate) transcript_ids: HashMap<String, TranscriptKey>,
    pub(crate) index: IntervalIndex<GeneKey>,
    pub(crate) skipped: Vec<SkippedFeature>,
}

impl GeneModel {
    /// Load a model from uncompressed GTF text.
    pub fn from_reader<R: BufRead>(reader: R, options: &LoadOptions) -> Result<Self, Error> {
        let mut builder = GeneModelBuilder::new(options.clone())?;
        gtf::read_gtf(reader, |record| builder.add(record))?;
        builder.build()
    }

    /// Load a model from a gzip-compressed GTF stream.
    pub fn from_gtf_gz<R: Read>(reader: R, options: &LoadOptions) -> Result<Self, Error> {
        let mut builder = GeneModelBuilder::new(options.clone())?;
        gtf::read_gtf_gz(reader, |record| builder.add(record))?;
        builder.build()
    }

    /// Load a model from a `.gtf` or `.gtf.gz` file.
    pub fn from_path(path: &Path, options: &LoadOptions) -> Result<Self, Error> {
        Self::from_reader(gtf::open(path)?, options)
    }

    #[must_use]
    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    #[must_use]
    pub fn transcripts(&self) -> &[Transcript] {
        &self.transcripts
    }

    #[must_use]
    pub fn gene(&self, key: GeneKey) -> &Gene {
        &self.genes[key.0]
    }

    #[must_use]
    pub fn transcript(&self, key: TranscriptKey) -> &Transcript {
        &self.transcripts[key.0]
    }

    #[must_use]
    pub fn gene_by_id(&self, id: &str) -> Option<&Gene> {
        self.gene_ids.get(id).map(|k| self.gene(*k))
    }

    #[must_use]
    pub fn transcript_by_id(&self, id: &str) -> Option<&Transcript> {
        self.transcript_ids.get(id).map(|k| self.transcript(*k))
    }

    /// Transcripts of `gene`, in input order.
    pub fn transcripts_of<'a>(&'a self, gene: &'a Gene) -> impl Iterator<Item = &'a Transcript> {
        gene.transcripts.iter().map(|k| self.transcript(*k))
    }

    #[must_use]
    pub fn gene_of(&self, transcript: &Transcript) -> &Gene {
        self.gene(transcript.gene)
    }

    #[must_use]
    pub fn index(&self) -> &IntervalIndex<GeneKey> {
        &self.index
    }

    /// Genes whose span overlaps (or, with `only_within`, contains) `query`.
    #[must_use]
    pub fn find_genes(&self, query: &GenomeSpan, only_within: bool) -> Vec<&Gene> {
        self.index
            .find_values(query, only_within)
            .into_iter()
            .map(|k| self.gene(*k))
            .collect()
    }

    /// Genes and transcripts excluded while loading, with the reason.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedFeature] {
        &self.skipped
    }

    /// True if gene annotations carry the named field.
    #[must_use]
    pub fn provides(&self, key: &str) -> bool {
        GeneKey::FIELDS.contains(&key)
    }
}
