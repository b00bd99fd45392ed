//! Codon translation tables and nucleotide helpers.

use std::sync::LazyLock;

use crate::genic::MITOCHONDRIAL_REFERENCES;

/// Stop codon symbol in translated sequences.
pub const STOP: u8 = b'*';

/// Symbol for a codon containing an ambiguous base.
pub const UNKNOWN: u8 = b'X';

/// Codon → amino acid lookup, indexed by 6-bit encoding (A=0, C=1, G=2, T/U=3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonTable {
    name: &'static str,
    table: [u8; 64],
}

static STANDARD: LazyLock<CodonTable> = LazyLock::new(|| CodonTable {
    name: "standard",
    #[rustfmt::skip]
    table: [
        b'K', b'N', b'K', b'N',  // AA*
        b'T', b'T', b'T', b'T',  // AC*
        b'R', b'S', b'R', b'S',  // AG*
        b'I', b'I', b'M', b'I',  // AT*
        b'Q', b'H', b'Q', b'H',  // CA*
        b'P', b'P', b'P', b'P',  // CC*
        b'R', b'R', b'R', b'R',  // CG*
        b'L', b'L', b'L', b'L',  // CT*
        b'E', b'D', b'E', b'D',  // GA*
        b'A', b'A', b'A', b'A',  // GC*
        b'G', b'G', b'G', b'G',  // GG*
        b'V', b'V', b'V', b'V',  // GT*
        b'*', b'Y', b'*', b'Y',  // TA*
        b'S', b'S', b'S', b'S',  // TC*
        b'*', b'C', b'W', b'C',  // TG*
        b'L', b'F', b'L', b'F',  // TT*
    ],
});

// Vertebrate mitochondrial code: TGA→W, AGA→*, AGG→*, ATA→M.
static MITOCHONDRIAL: LazyLock<CodonTable> = LazyLock::new(|| {
    let mut table = STANDARD.table;
    table[56] = b'W';
    table[8] = STOP;
    table[10] = STOP;
    table[12] = b'M';
    CodonTable {
        name: "vertebrate_mitochondrial",
        table,
    }
});

fn base_index(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' | b'U' | b'u' => Some(3),
        _ => None,
    }
}

impl CodonTable {
    /// NCBI translation table 1.
    #[must_use]
    pub fn standard() -> &'static Self {
        &STANDARD
    }

    /// NCBI translation table 2.
    #[must_use]
    pub fn mitochondrial() -> &'static Self {
        &MITOCHONDRIAL
    }

    /// Table to use for transcripts on `reference`.
    #[must_use]
    pub fn for_reference(reference: &str) -> &'static Self {
        if MITOCHONDRIAL_REFERENCES.contains(&reference) {
            Self::mitochondrial()
        } else {
            Self::standard()
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Amino acid for one codon; `X` if any base is ambiguous.
    #[must_use]
    pub fn translate_codon(&self, codon: &[u8; 3]) -> u8 {
        match (base_index(codon[0]), base_index(codon[1]), base_index(codon[2])) {
            (Some(a), Some(b), Some(c)) => self.table[a * 16 + b * 4 + c],
            _ => UNKNOWN,
        }
    }

    /// Translate whole codons of `cds`. A trailing partial codon is ignored.
    #[must_use]
    pub fn translate(&self, cds: &[u8]) -> Vec<u8> {
        cds.chunks_exact(3)
            .map(|c| self.translate_codon(&[c[0], c[1], c[2]]))
            .collect()
    }
}

/// Watson-Crick complement, preserving case. Unknown bases become `N`.
#[must_use]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' | b'u' => b'a',
        b'n' => b'n',
        _ => b'N',
    }
}

#[must_use]
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
