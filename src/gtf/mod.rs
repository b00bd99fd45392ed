//! GTF reader: streams gene-structure records out of plain or gzip-compressed GTF.

pub mod entry;
pub mod parser;

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::Error;

use entry::GtfRecord;
use parser::ParsedLine;

/// Open a GTF file, decompressing when the name ends in `.gz`.
pub fn open(path: &Path) -> Result<Box<dyn BufRead>, Error> {
    let file = File::open(path)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Stream a gzip-compressed GTF into `sink`.
pub fn read_gtf_gz<R: Read, F>(reader: R, sink: F) -> Result<(), Error>
where
    F: FnMut(GtfRecord) -> Result<(), Error>,
{
    read_gtf(BufReader::new(MultiGzDecoder::new(reader)), sink)
}

/// Stream every exon/CDS/start_codon/stop_codon record into `sink`.
///
/// Parse errors abort the stream and carry the offending line.
pub fn read_gtf<R: BufRead, F>(reader: R, mut sink: F) -> Result<(), Error>
where
    F: FnMut(GtfRecord) -> Result<(), Error>,
{
    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line?;
        match parser::parse_line(&line)
            .map_err(|e| Error::Parse(format!("{e} (line {line_num}: {line})")))?
        {
            ParsedLine::Record(record) => sink(*record)?,
            ParsedLine::Discarded | ParsedLine::Comment => continue,
        }
    }
    Ok(())
}
