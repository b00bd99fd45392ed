//! Variant-effect caller: runs each variant against every nearby transcript
//! and produces one row per (variant, transcript) pair.

use std::fmt;
use std::io::BufRead;
use std::str::FromStr;

use crate::coding::{CodingSequence, Consequence, Impact};
use crate::error::Error;
use crate::model::{GeneModel, Transcript};
use crate::reference::SequenceSource;
use crate::span::GenomeSpan;
use crate::strand::Strand;

/// Distance from a transcript within which upstream/downstream rows are reported.
pub const DEFAULT_FLANK: i64 = 5_000;

/// One REF/ALT pair at a 1-based position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub chrom: String,
    pub pos: i64,
    pub reference: String,
    pub alternate: String,
}

impl VariantRecord {
    /// Forward-strand span covered by the REF allele (at least one base).
    pub fn span(&self) -> Result<GenomeSpan, Error> {
        let start = self.pos - 1;
        let len = self.reference.len().max(1) as i64;
        GenomeSpan::new(self.chrom.clone(), start, start + len, Strand::None)
    }
}

impl FromStr for VariantRecord {
    type Err = Error;

    /// Parse `chrom <tab> pos <tab> ref <tab> alt`. ALT must hold a single allele.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() < 4 {
            return Err(Error::Parse(format!(
                "variant line has {} columns, expected 4",
                fields.len()
            )));
        }
        let pos: i64 = fields[1]
            .parse()
            .map_err(|e| Error::Parse(format!("invalid position '{}': {e}", fields[1])))?;
        if pos < 1 {
            return Err(Error::Parse(format!("position must be 1-based, got {pos}")));
        }
        if fields[2].is_empty() || fields[3].is_empty() {
            return Err(Error::Parse("empty REF or ALT allele".to_string()));
        }
        if fields[3].contains(',') {
            return Err(Error::Parse(format!(
                "multi-allelic ALT '{}' must be split first",
                fields[3]
            )));
        }
        Ok(Self {
            chrom: fields[0].to_string(),
            pos,
            reference: fields[2].to_string(),
            alternate: fields[3].to_string(),
        })
    }
}

/// Read variant lines, splitting multi-allelic ALT columns into one record per allele.
pub fn read_variants<R: BufRead>(reader: R) -> Result<Vec<VariantRecord>, Error> {
    let mut variants = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') || line.trim().is_empty() {
            continue;
        }
        let wrap = |e: Error| Error::Parse(format!("{e} (line {}: {line})", line_num + 1));
        let fields: Vec<&str> = line.split('\t').collect();
        let Some(alts) = fields.get(3) else {
            return Err(wrap(Error::Parse("missing ALT column".to_string())));
        };
        for alt in alts.split(',') {
            let mut allele = fields.clone();
            allele[3] = alt;
            variants.push(allele.join("\t").parse::<VariantRecord>().map_err(wrap)?);
        }
    }
    Ok(variants)
}

/// A produced row: one variant against one transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectRow {
    pub chrom: String,
    pub pos: i64,
    pub reference: String,
    pub alternate: String,
    pub gene: String,
    pub transcript_id: String,
    pub protein_id: String,
    pub cds_variant: String,
    pub protein_variant: String,
    pub consequence: Consequence,
    pub impact: Impact,
}

impl EffectRow {
    pub const HEADER: &'static str = "chrom\tpos\tref\talt\tgene\ttranscript_id\tprotein_id\tcds_variant\tprotein_variant\tconsequence\timpact";

    fn intergenic(variant: &VariantRecord) -> Self {
        Self {
            chrom: variant.chrom.clone(),
            pos: variant.pos,
            reference: variant.reference.clone(),
            alternate: variant.alternate.clone(),
            gene: String::new(),
            transcript_id: String::new(),
            protein_id: String::new(),
            cds_variant: String::new(),
            protein_variant: String::new(),
            consequence: Consequence::IntergenicVariant,
            impact: Consequence::IntergenicVariant.impact(),
        }
    }
}

impl fmt::Display for EffectRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            self.reference,
            self.alternate,
            self.gene,
            self.transcript_id,
            self.protein_id,
            self.cds_variant,
            self.protein_variant,
            self.consequence,
            self.impact
        )
    }
}

/// A (variant, transcript) pair that could not be annotated.
#[derive(Debug)]
pub struct AnnotationFailure {
    pub variant: VariantRecord,
    pub transcript_id: String,
    pub error: Error,
}

impl fmt::Display for AnnotationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {}>{} on {}: {}",
            self.variant.chrom,
            self.variant.pos,
            self.variant.reference,
            self.variant.alternate,
            self.transcript_id,
            self.error
        )
    }
}

/// Rows produced for a batch, plus the pairs that were skipped.
#[derive(Debug, Default)]
pub struct AnnotationOutcome {
    pub rows: Vec<EffectRow>,
    pub failures: Vec<AnnotationFailure>,
}

impl AnnotationOutcome {
    fn extend(&mut self, other: AnnotationOutcome) {
        self.rows.extend(other.rows);
        self.failures.extend(other.failures);
    }
}

/// Annotates variants against a gene model using reference bases from `source`.
pub struct VariantAnnotator<'a, S: SequenceSource + ?Sized> {
    model: &'a GeneModel,
    source: &'a S,
    flank: i64,
}

impl<'a, S: SequenceSource + ?Sized> VariantAnnotator<'a, S> {
    pub fn new(model: &'a GeneModel, source: &'a S) -> Self {
        Self {
            model,
            source,
            flank: DEFAULT_FLANK,
        }
    }

    /// Report upstream/downstream rows up to `flank` bases from a transcript.
    #[must_use]
    pub fn with_flank(mut self, flank: i64) -> Self {
        self.flank = flank.max(0);
        self
    }

    /// Annotate one variant. Failures on individual transcripts are collected,
    /// never propagated.
    pub fn annotate(&self, variant: &VariantRecord) -> AnnotationOutcome {
        let mut outcome = AnnotationOutcome::default();
        let span = match variant.span() {
            Ok(span) => span,
            Err(error) => {
                outcome.failures.push(AnnotationFailure {
                    variant: variant.clone(),
                    transcript_id: String::new(),
                    error,
                });
                return outcome;
            }
        };

        let window = span.extend5(self.flank).extend3(self.flank);
        for gene in self.model.find_genes(&window, false) {
            for tx in self.model.transcripts_of(gene) {
                if !self.within_flank(tx, &span) {
                    continue;
                }
                match self.annotate_transcript(tx, variant) {
                    Ok(row) => outcome.rows.push(row),
                    Err(error) => outcome.failures.push(AnnotationFailure {
                        variant: variant.clone(),
                        transcript_id: tx.id.clone(),
                        error,
                    }),
                }
            }
        }

        if outcome.rows.is_empty() && outcome.failures.is_empty() {
            outcome.rows.push(EffectRow::intergenic(variant));
        }
        outcome
    }

    /// Annotate a batch in input order.
    pub fn annotate_all<'v, I>(&self, variants: I) -> AnnotationOutcome
    where
        I: IntoIterator<Item = &'v VariantRecord>,
    {
        let mut outcome = AnnotationOutcome::default();
        for variant in variants {
            outcome.extend(self.annotate(variant));
        }
        outcome
    }

    fn within_flank(&self, tx: &Transcript, span: &GenomeSpan) -> bool {
        span.start() < tx.end + self.flank && span.end() > tx.start - self.flank
    }

    fn annotate_transcript(&self, tx: &Transcript, variant: &VariantRecord) -> Result<EffectRow, Error> {
        let gene = self.model.gene_of(tx);
        let sequence = CodingSequence::for_transcript(gene, tx, self.source)?;
        let effect = sequence.add_variant(
            &variant.chrom,
            variant.pos,
            &variant.reference,
            &variant.alternate,
        )?;
        Ok(EffectRow {
            chrom: variant.chrom.clone(),
            pos: variant.pos,
            reference: variant.reference.clone(),
            alternate: variant.alternate.clone(),
            gene: gene.name.clone(),
            transcript_id: tx.id.clone(),
            protein_id: tx.protein_id.clone().unwrap_or_default(),
            cds_variant: effect.cds_notation,
            protein_variant: effect.aa_notation,
            impact: effect.consequence.impact(),
            consequence: effect.consequence,
        })
    }
}
