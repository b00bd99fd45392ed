//! Random-access reference sequence lookup.

use std::collections::HashMap;
use std::io::{BufRead, Read};
use std::path::Path;

use crate::error::Error;
use crate::fasta;

/// Supplies forward-strand reference bases for `[start, end)` (0-based) on a reference.
///
/// Implementations must be safe for concurrent reads when shared across threads.
pub trait SequenceSource {
    fn fetch(&self, reference: &str, start: i64, end: i64) -> Result<Vec<u8>, Error>;
}

/// Whole reference sequences held in memory, keyed by name.
#[derive(Debug, Default, Clone)]
pub struct ReferenceSequences {
    sequences: HashMap<String, Vec<u8>>,
}

impl ReferenceSequences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from uncompressed FASTA text.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        Self::from_records(fasta::parse_fasta(reader)?)
    }

    /// Build from a gzip-compressed FASTA stream.
    pub fn from_gz<R: Read>(reader: R) -> Result<Self, Error> {
        Self::from_records(fasta::parse_fasta_gz(reader)?)
    }

    /// Build from a `.fa` or `.fa.gz` file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        Self::from_records(fasta::parse_fasta_path(path)?)
    }

    fn from_records(records: Vec<(String, Vec<u8>)>) -> Result<Self, Error> {
        let mut sequences = HashMap::with_capacity(records.len());
        for (name, seq) in records {
            if sequences.contains_key(&name) {
                return Err(Error::Validation(format!(
                    "duplicate reference name in FASTA: {name}"
                )));
            }
            sequences.insert(name, seq);
        }
        Ok(Self { sequences })
    }

    /// Add or replace a reference. Bases are uppercased.
    pub fn insert(&mut self, name: impl Into<String>, mut bases: Vec<u8>) {
        bases.make_ascii_uppercase();
        self.sequences.insert(name.into(), bases);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.sequences.get(name).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}

impl SequenceSource for ReferenceSequences {
    fn fetch(&self, reference: &str, start: i64, end: i64) -> Result<Vec<u8>, Error> {
        let seq = self
            .get(reference)
            .ok_or_else(|| Error::SequenceFetch(format!("unknown reference '{reference}'")))?;
        let len = seq.len() as i64;
        if start < 0 || end < start || end > len {
            return Err(Error::SequenceFetch(format!(
                "{reference}:[{start},{end}) outside sequence of length {len}"
            )));
        }
        Ok(seq[start as usize..end as usize].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn fetch_ranges() {
        let refs = ReferenceSequences::from_reader(Cursor::new(">chr1\nACGTACGTAC\n>chr2\nggg\n")).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs.fetch("chr1", 2, 6).unwrap(), b"GTAC");
        assert_eq!(refs.fetch("chr2", 0, 3).unwrap(), b"GGG");
        assert!(refs.fetch("chr1", 5, 5).unwrap().is_empty());
    }

    #[test]
    fn fetch_errors() {
        let mut refs = ReferenceSequences::new();
        refs.insert("chr1", b"acgt".to_vec());
        assert_eq!(refs.get("chr1"), Some(&b"ACGT"[..]));
        assert!(matches!(refs.fetch("chr9", 0, 1), Err(Error::SequenceFetch(_))));
        assert!(matches!(refs.fetch("chr1", 2, 5), Err(Error::SequenceFetch(_))));
        assert!(matches!(refs.fetch("chr1", -1, 2), Err(Error::SequenceFetch(_))));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = ReferenceSequences::from_reader(Cursor::new(">chr1\nA\n>chr1\nC\n")).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
