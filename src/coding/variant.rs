//! Applying a single-locus variant to a transcript's coding sequence.
//!
//! Classification proceeds from the outside in: position relative to the
//! transcript, the first exon boundary, introns and splice sites, UTRs, and
//! finally an edit of the coding bases followed by translation.

use crate::codon::{self, STOP};
use crate::error::Error;

use super::consequence::{Consequence, Impact};
use super::sequence::{CodingBase, CodingSequence, number_positions};

/// Bases at each end of an intron that count as the splice site.
pub const SPLICE_WINDOW: i64 = 2;

/// Outcome of [`CodingSequence::add_variant`].
///
/// Notation and positions are only set when the variant edits coding bases.
#[derive(Debug, Clone)]
pub struct CodingVariant {
    pub consequence: Consequence,
    pub cds_notation: String,
    pub aa_notation: String,
    pub cds_pos: Option<u32>,
    pub aa_pos: Option<u32>,
    pub aa_end_pos: Option<u32>,
    /// The edited coding sequence; the original is left untouched.
    pub sequence: Option<CodingSequence>,
}

impl CodingVariant {
    fn located(consequence: Consequence) -> Self {
        Self {
            consequence,
            cds_notation: String::new(),
            aa_notation: String::new(),
            cds_pos: None,
            aa_pos: None,
            aa_end_pos: None,
            sequence: None,
        }
    }

    #[must_use]
    pub fn impact(&self) -> Impact {
        self.consequence.impact()
    }
}

/// Forward-strand alleles with shared flanking bases removed.
///
/// `[start, end)` covers the reference allele; an insertion has `start == end`
/// and goes in front of the base at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Alleles {
    start: i64,
    end: i64,
    reference: Vec<u8>,
    alternate: Vec<u8>,
}

impl Alleles {
    fn trim(start: i64, mut reference: Vec<u8>, mut alternate: Vec<u8>) -> Self {
        while !reference.is_empty() && reference.last() == alternate.last() {
            reference.pop();
            alternate.pop();
        }
        let prefix = reference
            .iter()
            .zip(&alternate)
            .take_while(|(r, a)| r == a)
            .count();
        reference.drain(..prefix);
        alternate.drain(..prefix);
        let start = start + prefix as i64;
        Self {
            start,
            end: start + reference.len() as i64,
            reference,
            alternate,
        }
    }

    fn is_insertion(&self) -> bool {
        self.reference.is_empty()
    }
}

fn allele_bytes(allele: &str) -> Vec<u8> {
    match allele {
        "-" | "." => Vec::new(),
        a => a.trim().to_ascii_uppercase().into_bytes(),
    }
}

impl CodingSequence {
    /// Apply a variant given as `(chrom, 1-based pos, REF, ALT)` on the forward strand.
    ///
    /// Returns the consequence for this transcript. Errors describe pairs that
    /// cannot be resolved and should be skipped by the caller.
    pub fn add_variant(
        &self,
        chrom: &str,
        pos: i64,
        reference: &str,
        alternate: &str,
    ) -> Result<CodingVariant, Error> {
        if chrom != self.chrom {
            return Err(Error::MismatchedReference {
                left: self.chrom.clone(),
                right: chrom.to_string(),
            });
        }
        if pos < 1 {
            return Err(Error::Validation(format!("variant position {pos} is not 1-based")));
        }
        let ref_bytes = allele_bytes(reference);
        let alt_bytes = allele_bytes(alternate);
        let delta = alt_bytes.len() as i64 - ref_bytes.len() as i64;
        let alleles = Alleles::trim(pos - 1, ref_bytes, alt_bytes);
        if alleles.reference.is_empty() && alleles.alternate.is_empty() {
            return Err(Error::Validation(format!(
                "{chrom}:{pos} {reference}>{alternate} does not change the sequence"
            )));
        }

        match self.locate(&alleles)? {
            Some(consequence) => Ok(CodingVariant::located(consequence)),
            None => self.edit(&alleles, delta),
        }
    }

    /// Consequences decided by position alone. `None` means the variant edits coding bases.
    fn locate(&self, a: &Alleles) -> Result<Option<Consequence>, Error> {
        let minus = self.strand.is_minus();

        if a.end <= self.transcript_start {
            return Ok(Some(if minus {
                Consequence::DownstreamGeneVariant
            } else {
                Consequence::UpstreamGeneVariant
            }));
        }
        if a.start >= self.transcript_end {
            return Ok(Some(if minus {
                Consequence::UpstreamGeneVariant
            } else {
                Consequence::DownstreamGeneVariant
            }));
        }

        let tss = if minus {
            self.transcript_end
        } else {
            self.transcript_start
        };
        if a.start < tss && a.end > tss {
            return Ok(Some(Consequence::TranscriptionalStartLoss));
        }

        let in_exon = self.exons.iter().any(|&(start, end)| {
            if a.is_insertion() {
                start < a.start && a.start < end
            } else {
                start <= a.start && a.end <= end
            }
        });
        if !in_exon {
            return self.locate_intronic(a).map(Some);
        }

        let Some((cds_start, cds_end)) = self.coding_bounds else {
            return Ok(Some(Consequence::NonCodingTranscriptExonVariant));
        };
        if a.end <= cds_start {
            return Ok(Some(if minus {
                Consequence::ThreePrimeUtrVariant
            } else {
                Consequence::FivePrimeUtrVariant
            }));
        }
        if a.start >= cds_end {
            return Ok(Some(if minus {
                Consequence::FivePrimeUtrVariant
            } else {
                Consequence::ThreePrimeUtrVariant
            }));
        }
        if a.start < cds_start || a.end > cds_end {
            return Err(Error::UnresolvableVariant(format!(
                "{}:[{},{}) spans the coding region boundary",
                self.chrom, a.start, a.end
            )));
        }
        Ok(None)
    }

    /// Intron and splice-site classification for a variant not inside any exon.
    fn locate_intronic(&self, a: &Alleles) -> Result<Consequence, Error> {
        let minus = self.strand.is_minus();
        // an insertion is judged by the two bases it falls between
        let (start, end) = if a.is_insertion() {
            (a.start - 1, a.start + 1)
        } else {
            (a.start, a.end)
        };

        for pair in self.exons.windows(2) {
            let (upstream_end, downstream_start) = (pair[0].1, pair[1].0);
            if !(start < downstream_start && end > upstream_end) {
                continue;
            }
            let near_upstream = start < upstream_end + SPLICE_WINDOW && end > upstream_end;
            let near_downstream = start < downstream_start && end > downstream_start - SPLICE_WINDOW;
            let consequence = match (near_upstream, near_downstream, minus) {
                (true, _, false) | (false, true, true) => Consequence::SpliceDonorVariant,
                (true, _, true) | (false, true, false) => Consequence::SpliceAcceptorVariant,
                (false, false, _) => Consequence::IntronVariant,
            };
            return Ok(consequence);
        }

        Err(Error::UnresolvableVariant(format!(
            "{}:[{},{}) extends past the transcript end",
            self.chrom, a.start, a.end
        )))
    }

    /// Substitute, delete or insert bases, then compare translations.
    fn edit(&self, a: &Alleles, delta: i64) -> Result<CodingVariant, Error> {
        let minus = self.strand.is_minus();
        let missing = |pos: i64| {
            Error::UnresolvableVariant(format!("{}:{} is not a coding base", self.chrom, pos + 1))
        };

        let i = self.index_of(a.start).ok_or_else(|| missing(a.start))?;
        let j = i + a.reference.len();
        if a.is_insertion() && i == 0 {
            return Err(missing(a.start - 1));
        }
        if j > self.bases.len() || (j > i && self.bases[j - 1].genome_pos != a.end - 1) {
            return Err(missing(a.end - 1));
        }

        let observed: Vec<u8> = self.bases[i..j].iter().map(|b| b.base).collect();
        if observed != a.reference {
            return Err(Error::Validation(format!(
                "REF {} does not match reference {} at {}:{}",
                String::from_utf8_lossy(&a.reference),
                String::from_utf8_lossy(&observed),
                self.chrom,
                a.start + 1
            )));
        }

        // CDS coordinates of the affected bases (or insertion flanks), 5'→3'
        let (low, high) = if a.is_insertion() {
            (&self.bases[i - 1], &self.bases[i])
        } else {
            (&self.bases[i], &self.bases[j - 1])
        };
        let (first, last) = if minus { (high, low) } else { (low, high) };
        let first_cds = first.cds_pos.ok_or_else(|| missing(first.genome_pos))?;
        let last_cds = last.cds_pos.ok_or_else(|| missing(last.genome_pos))?;
        let base_aa = self.bases[i..j].iter().filter_map(|b| b.aa_pos).min();

        let edited = self.with_bases(self.edited_bases(a, i, j));
        let cds_notation = cds_notation(
            first_cds,
            last_cds,
            &oriented(&a.reference, minus),
            &oriented(&a.alternate, minus),
        );

        let original_aa = self.table.translate(&self.cds_bytes());
        let edited_aa = self.table.translate(&edited.cds_bytes());
        let change = ProteinChange::between(&original_aa, &edited_aa);

        let (mut consequence, aa_notation) = if delta != 0 {
            let consequence = if delta % 3 != 0 {
                Consequence::FrameshiftVariant
            } else if delta < 0 {
                Consequence::InframeDeletion
            } else {
                Consequence::InframeInsertion
            };
            let notation = if consequence == Consequence::FrameshiftVariant {
                change.frameshift_notation()
            } else {
                change.inframe_notation()
            };
            (consequence, notation)
        } else if change.is_identity() {
            let aa_pos = base_aa.ok_or_else(|| {
                Error::UnresolvableVariant(format!(
                    "{}:{} has no amino acid position",
                    self.chrom,
                    a.start + 1
                ))
            })?;
            let residue = original_aa
                .get(aa_pos as usize - 1)
                .copied()
                .unwrap_or(codon::UNKNOWN) as char;
            (Consequence::SynonymousVariant, format!("p.{residue}{aa_pos}="))
        } else {
            (change.substitution_consequence(), change.substitution_notation())
        };

        let (aa_pos, aa_end_pos) = if change.is_identity() {
            (base_aa, base_aa)
        } else {
            let start = change.start as u32 + 1;
            (Some(start), Some(start.max(change.original_end as u32)))
        };

        let affected_aa = base_aa.or(aa_pos);
        if affected_aa == Some(1) && consequence != Consequence::SynonymousVariant {
            consequence = Consequence::StartLost;
        }

        Ok(CodingVariant {
            consequence,
            cds_notation,
            aa_notation,
            cds_pos: Some(first_cds),
            aa_pos,
            aa_end_pos,
            sequence: Some(edited),
        })
    }

    fn edited_bases(&self, a: &Alleles, i: usize, j: usize) -> Vec<CodingBase> {
        let mut bases = Vec::with_capacity(self.bases.len() + a.alternate.len());
        bases.extend_from_slice(&self.bases[..i]);
        if a.reference.len() == a.alternate.len() {
            bases.extend(
                self.bases[i..j]
                    .iter()
                    .zip(&a.alternate)
                    .map(|(b, &alt)| CodingBase::new(b.genome_pos, alt)),
            );
        } else {
            // new bases take the position of the reference base they replace,
            // or of the base they precede, so the list stays sorted
            let last = a.reference.len().saturating_sub(1) as i64;
            bases.extend(
                a.alternate
                    .iter()
                    .enumerate()
                    .map(|(k, &alt)| CodingBase::new(a.start + (k as i64).min(last), alt)),
            );
        }
        bases.extend_from_slice(&self.bases[j..]);
        number_positions(&mut bases, self.strand);
        bases
    }
}

fn oriented(allele: &[u8], minus: bool) -> String {
    let bytes = if minus {
        codon::reverse_complement(allele)
    } else {
        allele.to_vec()
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

fn cds_notation(first: u32, last: u32, reference: &str, alternate: &str) -> String {
    let range = if first == last {
        first.to_string()
    } else {
        format!("{first}_{last}")
    };
    match (reference.len(), alternate.len()) {
        (1, 1) => format!("c.{first}{reference}>{alternate}"),
        (_, 0) => format!("c.{range}del"),
        (0, _) => format!("c.{first}_{last}ins{alternate}"),
        _ => format!("c.{range}delins{alternate}"),
    }
}

/// Differing stretch between two translations after removing the common
/// prefix and suffix.
#[derive(Debug)]
struct ProteinChange<'a> {
    original: &'a [u8],
    edited: &'a [u8],
    start: usize,
    original_end: usize,
    edited_end: usize,
}

impl<'a> ProteinChange<'a> {
    fn between(original: &'a [u8], edited: &'a [u8]) -> Self {
        let start = original
            .iter()
            .zip(edited)
            .take_while(|(a, b)| a == b)
            .count();
        let room = original.len().min(edited.len()) - start;
        let suffix = (0..room)
            .take_while(|k| original[original.len() - 1 - k] == edited[edited.len() - 1 - k])
            .count();
        Self {
            original,
            edited,
            start,
            original_end: original.len() - suffix,
            edited_end: edited.len() - suffix,
        }
    }

    fn is_identity(&self) -> bool {
        self.original == self.edited
    }

    fn removed(&self) -> &'a [u8] {
        &self.original[self.start..self.original_end]
    }

    fn added(&self) -> &'a [u8] {
        &self.edited[self.start..self.edited_end]
    }

    fn residue(&self, pos: usize) -> char {
        self.original.get(pos).copied().unwrap_or(codon::UNKNOWN) as char
    }

    /// `X12` or `X12_Y14` over the removed residues.
    fn removed_range(&self) -> String {
        let first = self.start + 1;
        let last = self.original_end;
        if last <= first {
            format!("{}{first}", self.residue(self.start))
        } else {
            format!(
                "{}{first}_{}{last}",
                self.residue(self.start),
                self.residue(last - 1)
            )
        }
    }

    fn substitution_consequence(&self) -> Consequence {
        let gained = self.added().contains(&STOP);
        let lost = self.removed().contains(&STOP);
        match (gained, lost) {
            (true, false) => Consequence::StopGained,
            (false, true) => Consequence::StopLost,
            _ => Consequence::MissenseVariant,
        }
    }

    fn substitution_notation(&self) -> String {
        let added = String::from_utf8_lossy(self.added());
        if self.removed().len() == 1 && self.added().len() == 1 {
            format!("p.{}{}{added}", self.residue(self.start), self.start + 1)
        } else {
            format!("p.{}delins{added}", self.removed_range())
        }
    }

    fn inframe_notation(&self) -> String {
        if self.is_identity() {
            return "p.=".to_string();
        }
        let added = String::from_utf8_lossy(self.added());
        if self.removed().is_empty() {
            // pure insertion between residues start and start + 1
            if self.start == 0 || self.start >= self.original.len() {
                return "p.?".to_string();
            }
            return format!(
                "p.{}{}_{}{}ins{added}",
                self.residue(self.start - 1),
                self.start,
                self.residue(self.start),
                self.start + 1
            );
        }
        if self.added().is_empty() {
            format!("p.{}del", self.removed_range())
        } else {
            format!("p.{}delins{added}", self.removed_range())
        }
    }

    fn frameshift_notation(&self) -> String {
        if self.start >= self.original.len() {
            return "p.?".to_string();
        }
        let reference = self.residue(self.start);
        let pos = self.start + 1;
        match self.edited.get(self.start) {
            Some(&STOP) => format!("p.{reference}{pos}*"),
            Some(&alt) => {
                let length = self.edited[self.start..]
                    .iter()
                    .position(|&aa| aa == STOP)
                    .map_or_else(|| "?".to_string(), |i| (i + 1).to_string());
                format!("p.{reference}{pos}{}fs*{length}", alt as char)
            }
            None => format!("p.{reference}{pos}fs*?"),
        }
    }
}
