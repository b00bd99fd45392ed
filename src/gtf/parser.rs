//! GTF line and attribute parser.

use crate::error::Error;
use crate::strand::Strand;

use super::entry::{Feature, GtfAttributes, GtfRecord};

/// Result of parsing a single GTF line.
#[derive(Debug)]
pub enum ParsedLine {
    Record(Box<GtfRecord>),
    Discarded,
    Comment,
}

/// Parse a single GTF line into a structured record.
pub fn parse_line(line: &str) -> Result<ParsedLine, Error> {
    if line.starts_with('#') {
        return Ok(ParsedLine::Comment);
    }
    let line = line.trim_end_matches(['\n', '\r']);
    if line.trim().is_empty() {
        return Ok(ParsedLine::Comment);
    }

    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() != 9 {
        return Err(Error::Parse(format!(
            "GTF line has {} columns, expected 9",
            columns.len()
        )));
    }

    // Column 3: only the gene-structure features are kept
    let Some(feature) = Feature::from_gtf(columns[2]) else {
        return Ok(ParsedLine::Discarded);
    };

    // Columns 4 & 5: 1-based closed on the wire
    let start: i64 = columns[3]
        .parse()
        .map_err(|e| Error::Parse(format!("invalid start '{}': {e}", columns[3])))?;
    let end: i64 = columns[4]
        .parse()
        .map_err(|e| Error::Parse(format!("invalid end '{}': {e}", columns[4])))?;
    if start < 1 || end < start {
        return Err(Error::Parse(format!("invalid coordinates {start}-{end}")));
    }

    let strand = Strand::from_gtf(columns[6]);

    // Column 8: frame
    let frame = match columns[7] {
        "." => None,
        f => Some(
            f.parse::<u8>()
                .ok()
                .filter(|v| *v < 3)
                .ok_or_else(|| Error::Parse(format!("invalid frame '{f}'")))?,
        ),
    };

    let attributes = parse_attributes(columns[8])?;
    if attributes.gene_id.is_empty() {
        return Err(Error::Parse("GTF record missing gene_id attribute".to_string()));
    }
    if attributes.transcript_id.is_empty() {
        return Err(Error::Parse(
            "GTF record missing transcript_id attribute".to_string(),
        ));
    }

    Ok(ParsedLine::Record(Box::new(GtfRecord {
        seqname: columns[0].to_string(),
        source: columns[1].to_string(),
        feature,
        start: start - 1,
        end,
        strand,
        frame,
        attributes,
    })))
}

/// Parse GTF column 9: `key "value";` pairs. Unquoted values are accepted.
pub fn parse_attributes(attrs_str: &str) -> Result<GtfAttributes, Error> {
    let mut attrs = GtfAttributes::default();
    let mut fallback_name: Option<String> = None;

    for pair in split_pairs(attrs_str) {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (key, value) = pair
            .split_once(char::is_whitespace)
            .ok_or_else(|| Error::Parse(format!("attribute missing value: '{pair}'")))?;
        let value = unquote(value.trim())?;

        match key {
            "gene_id" => attrs.gene_id = value,
            "transcript_id" => attrs.transcript_id = value,
            "gene_name" => attrs.gene_name = Some(value),
            // Some sources use `gene` in place of `gene_name`
            "gene" => fallback_name = Some(value),
            "gene_type" | "gene_biotype" => attrs.gene_biotype = Some(value),
            "gene_status" => attrs.gene_status = Some(value),
            "transcript_type" | "transcript_biotype" => attrs.transcript_biotype = Some(value),
            "protein_id" => attrs.protein_id = Some(value),
            "tag" => {
                attrs.tags.insert(value.clone());
                attrs.extra.push((key.to_string(), value));
            }
            _ => attrs.extra.push((key.to_string(), value)),
        }
    }

    if attrs.gene_name.is_none() {
        attrs.gene_name = fallback_name;
    }
    Ok(attrs)
}

/// Split on `;` outside double quotes.
fn split_pairs(s: &str) -> Vec<&str> {
    let mut pairs = Vec::new();
    let mut in_quotes = false;
    let mut last = 0;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                pairs.push(&s[last..i]);
                last = i + 1;
            }
            _ => {}
        }
    }
    pairs.push(&s[last..]);
    pairs
}

fn unquote(value: &str) -> Result<String, Error> {
    match value.strip_prefix('"') {
        Some(rest) => rest
            .strip_suffix('"')
            .map(str::to_string)
            .ok_or_else(|| Error::Parse(format!("unterminated quoted value: '{value}'"))),
        None => Ok(value.to_string()),
    }
}
