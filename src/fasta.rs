//! Parser for plain and gzip-compressed FASTA reference files.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Error;

/// Reads gzip-compressed FASTA and returns `(name, sequence)` pairs.
pub fn parse_fasta_gz<R: Read>(reader: R) -> Result<Vec<(String, Vec<u8>)>, Error> {
    parse_fasta(BufReader::new(MultiGzDecoder::new(reader)))
}

/// Reads a `.fa`/`.fasta` file, decompressing when the name ends in `.gz`.
pub fn parse_fasta_path(path: &Path) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        parse_fasta_gz(file)
    } else {
        parse_fasta(BufReader::new(file))
    }
}

/// Reads FASTA records in file order.
///
/// The record name is the first whitespace-delimited token of the header.
/// Sequence bases are uppercased so soft-masked regions compare equal.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let mut records: Vec<(String, Vec<u8>)> = Vec::new();
    let mut current: Option<(String, Vec<u8>)> = None;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if let Some(header) = line.strip_prefix('>') {
            if let Some(done) = current.take() {
                records.push(done);
            }
            let name = header.split_whitespace().next().ok_or_else(|| {
                Error::Parse(format!("empty FASTA header (line {})", line_num + 1))
            })?;
            current = Some((name.to_string(), Vec::new()));
        } else if let Some((_, seq)) = current.as_mut() {
            let start = seq.len();
            seq.extend_from_slice(line.trim().as_bytes());
            seq[start..].make_ascii_uppercase();
        } else if !line.trim().is_empty() {
            return Err(Error::Parse(format!(
                "sequence data before first FASTA header (line {})",
                line_num + 1
            )));
        }
    }

    if let Some(done) = current {
        records.push(done);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};

    fn make_gz(content: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
        encoder.write_all(content).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn parse_multiple_sequences() {
        let fasta = b">chr1 assembled\nACGT\n>chr2\nTTTT\naaaa\n>chr3\nGGG\n";
        let records = parse_fasta(Cursor::new(&fasta[..])).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], ("chr1".to_string(), b"ACGT".to_vec()));
        assert_eq!(records[1], ("chr2".to_string(), b"TTTTAAAA".to_vec()));
        assert_eq!(records[2], ("chr3".to_string(), b"GGG".to_vec()));
    }

    #[test]
    fn parse_gzip() {
        let gz = make_gz(b">chrM\nGATCACAGG\nTCTATCACC\n");
        let records = parse_fasta_gz(Cursor::new(gz)).unwrap();
        assert_eq!(records[0].0, "chrM");
        assert_eq!(records[0].1, b"GATCACAGGTCTATCACC");
    }

    #[test]
    fn parse_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("ref.fa");
        std::fs::write(&plain, ">chr1\nACGT\n").unwrap();
        let gz = dir.path().join("ref.fa.gz");
        std::fs::write(&gz, make_gz(b">chr1\nACGT\n")).unwrap();
        for path in [plain, gz] {
            assert_eq!(parse_fasta_path(&path).unwrap()[0].1, b"ACGT");
        }
    }

    #[test]
    fn malformed_input() {
        assert!(parse_fasta(Cursor::new(&b">\nACGT\n"[..])).is_err());
        assert!(parse_fasta(Cursor::new(&b"ACGT\n>chr1\n"[..])).is_err());
    }
}
