//! Transcript coding sequence with genome, CDS and amino-acid coordinates.

use crate::codon::{self, CodonTable};
use crate::error::Error;
use crate::model::{Gene, Transcript};
use crate::reference::SequenceSource;
use crate::strand::Strand;

/// One reference base of a transcript.
///
/// `cds_pos`, `aa_pos` and `codon_pos` are 1-based and counted 5'→3' along
/// the transcript; they are unset outside the coding region and `aa_pos` is
/// unset on a trailing partial codon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodingBase {
    pub genome_pos: i64,
    pub cds_pos: Option<u32>,
    pub aa_pos: Option<u32>,
    pub codon_pos: Option<u8>,
    pub base: u8,
}

impl CodingBase {
    pub(crate) fn new(genome_pos: i64, base: u8) -> Self {
        Self {
            genome_pos,
            cds_pos: None,
            aa_pos: None,
            codon_pos: None,
            base,
        }
    }
}

/// Exon bases of one transcript, stored in ascending genome order.
///
/// After [`CodingSequence::assign_cds_aa_positions`] only the translated
/// region remains.
#[derive(Debug, Clone)]
pub struct CodingSequence {
    pub(crate) chrom: String,
    pub(crate) strand: Strand,
    pub(crate) transcript_start: i64,
    pub(crate) transcript_end: i64,
    pub(crate) exons: Vec<(i64, i64)>,
    pub(crate) coding_bounds: Option<(i64, i64)>,
    pub(crate) table: &'static CodonTable,
    pub(crate) bases: Vec<CodingBase>,
}

impl CodingSequence {
    /// Concatenate the reference bases of every exon of `transcript`.
    pub fn build<S>(gene: &Gene, transcript: &Transcript, source: &S) -> Result<Self, Error>
    where
        S: SequenceSource + ?Sized,
    {
        let mut bases = Vec::new();
        for exon in &transcript.exons {
            let seq = source.fetch(&gene.reference, exon.start, exon.end)?;
            if seq.len() as i64 != exon.len() {
                return Err(Error::SequenceFetch(format!(
                    "{}:[{},{}) returned {} bases",
                    gene.reference,
                    exon.start,
                    exon.end,
                    seq.len()
                )));
            }
            bases.extend(
                seq.iter()
                    .zip(exon.start..)
                    .map(|(&b, pos)| CodingBase::new(pos, b.to_ascii_uppercase())),
            );
        }

        Ok(Self {
            chrom: gene.reference.clone(),
            strand: gene.strand,
            transcript_start: transcript.start,
            transcript_end: transcript.end,
            exons: transcript.exons.iter().map(|e| (e.start, e.end)).collect(),
            coding_bounds: transcript.coding_bounds(),
            table: CodonTable::for_reference(&gene.reference),
            bases,
        })
    }

    /// Build and number the coding sequence in one step.
    pub fn for_transcript<S>(gene: &Gene, transcript: &Transcript, source: &S) -> Result<Self, Error>
    where
        S: SequenceSource + ?Sized,
    {
        let mut seq = Self::build(gene, transcript, source)?;
        seq.assign_cds_aa_positions(transcript)?;
        Ok(seq)
    }

    /// Trim to the translated region and number CDS, codon and amino-acid positions.
    ///
    /// Transcripts without a coding region keep every exon base, unnumbered.
    pub fn assign_cds_aa_positions(&mut self, transcript: &Transcript) -> Result<(), Error> {
        let Some((start, end)) = self.coding_bounds else {
            return Ok(());
        };
        self.bases.retain(|b| start <= b.genome_pos && b.genome_pos < end);
        number_positions(&mut self.bases, self.strand);

        let complete = transcript.start_codon.is_some() && transcript.stop_codon.is_some();
        if complete && self.bases.len() % 3 != 0 {
            return Err(Error::InvariantViolation(format!(
                "transcript {} has a coding length of {} bases, not a multiple of 3",
                transcript.id,
                self.bases.len()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[must_use]
    pub fn bases(&self) -> &[CodingBase] {
        &self.bases
    }

    #[must_use]
    pub fn is_coding(&self) -> bool {
        self.coding_bounds.is_some()
    }

    #[must_use]
    pub fn codon_table(&self) -> &'static CodonTable {
        self.table
    }

    /// Bases 5'→3' along the transcript.
    #[must_use]
    pub fn cds_string(&self) -> String {
        String::from_utf8_lossy(&self.cds_bytes()).into_owned()
    }

    /// Translation of [`CodingSequence::cds_string`] with this transcript's codon table.
    #[must_use]
    pub fn aa_string(&self) -> String {
        self.aa_string_with(self.table)
    }

    #[must_use]
    pub fn aa_string_with(&self, table: &CodonTable) -> String {
        String::from_utf8_lossy(&table.translate(&self.cds_bytes())).into_owned()
    }

    pub(crate) fn cds_bytes(&self) -> Vec<u8> {
        let forward: Vec<u8> = self.bases.iter().map(|b| b.base).collect();
        if self.strand.is_minus() {
            codon::reverse_complement(&forward)
        } else {
            forward
        }
    }

    /// Index of the base at `genome_pos`.
    pub(crate) fn index_of(&self, genome_pos: i64) -> Option<usize> {
        self.bases
            .binary_search_by_key(&genome_pos, |b| b.genome_pos)
            .ok()
    }

    /// Same transcript metadata, different bases.
    pub(crate) fn with_bases(&self, bases: Vec<CodingBase>) -> Self {
        Self {
            chrom: self.chrom.clone(),
            strand: self.strand,
            transcript_start: self.transcript_start,
            transcript_end: self.transcript_end,
            exons: self.exons.clone(),
            coding_bounds: self.coding_bounds,
            table: self.table,
            bases,
        }
    }
}

/// Number `bases` 5'→3' along the transcript: ascending genome order on the
/// plus strand, descending on the minus strand.
pub(crate) fn number_positions(bases: &mut [CodingBase], strand: Strand) {
    let order: Box<dyn Iterator<Item = usize>> = if strand.is_minus() {
        Box::new((0..bases.len()).rev())
    } else {
        Box::new(0..bases.len())
    };

    let mut codon: Vec<usize> = Vec::with_capacity(3);
    for (n, i) in order.enumerate() {
        let cds_pos = n as u32 + 1;
        let base = &mut bases[i];
        base.cds_pos = Some(cds_pos);
        base.codon_pos = Some((n % 3) as u8 + 1);
        base.aa_pos = None;
        codon.push(i);
        if codon.len() == 3 {
            let aa_pos = cds_pos / 3;
            for &j in &codon {
                bases[j].aa_pos = Some(aa_pos);
            }
            codon.clear();
        }
    }
}
