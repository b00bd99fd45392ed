//! Half-open genomic intervals with strand.
//!
//! All coordinates are 0-based, half-open `[start, end)`. A start of `-1` is the
//! whole-reference sentinel: such a span covers every position on its reference.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::strand::Strand;

/// Start coordinate of a span covering an entire reference.
pub const WHOLE_REFERENCE: i64 = -1;

/// An immutable genomic interval on one reference sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenomeSpan {
    reference: String,
    start: i64,
    end: i64,
    strand: Strand,
}

impl GenomeSpan {
    /// Create a span `[start, end)`. A start of `-1` creates a whole-reference span.
    pub fn new(
        reference: impl Into<String>,
        start: i64,
        end: i64,
        strand: Strand,
    ) -> Result<Self, Error> {
        let reference = reference.into();
        if start == WHOLE_REFERENCE {
            return Ok(Self::whole_reference(reference, strand));
        }
        if start < 0 || end < start {
            return Err(Error::Validation(format!(
                "invalid span {reference}:[{start},{end})"
            )));
        }
        Ok(Self {
            reference,
            start,
            end,
            strand,
        })
    }

    /// A span covering every position of `reference`.
    #[must_use]
    pub fn whole_reference(reference: impl Into<String>, strand: Strand) -> Self {
        Self {
            reference: reference.into(),
            start: WHOLE_REFERENCE,
            end: WHOLE_REFERENCE,
            strand,
        }
    }

    /// A single-base span `[pos, pos + 1)`.
    pub fn position(reference: impl Into<String>, pos: i64, strand: Strand) -> Result<Self, Error> {
        Self::new(reference, pos, pos + 1, strand)
    }

    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    #[must_use]
    pub fn start(&self) -> i64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> i64 {
        self.end
    }

    #[must_use]
    pub fn strand(&self) -> Strand {
        self.strand
    }

    #[must_use]
    pub fn is_whole_reference(&self) -> bool {
        self.start == WHOLE_REFERENCE
    }

    /// Number of bases covered; `None` for the whole-reference sentinel.
    #[must_use]
    pub fn len(&self) -> Option<i64> {
        (!self.is_whole_reference()).then_some(self.end - self.start)
    }

    #[must_use]
    pub fn with_strand(&self, strand: Strand) -> Self {
        Self {
            strand,
            ..self.clone()
        }
    }

    /// Copy of this span with strand `None`, matching features on either strand.
    #[must_use]
    pub fn unstranded(&self) -> Self {
        self.with_strand(Strand::None)
    }

    fn compatible(&self, other: &GenomeSpan) -> bool {
        self.reference == other.reference && self.strand.matches(other.strand)
    }

    /// True if `other` touches this span.
    ///
    /// Succeeds when `other` starts inside this span, ends inside it, or fully
    /// contains it.
    #[must_use]
    pub fn overlaps(&self, other: &GenomeSpan) -> bool {
        if !self.compatible(other) {
            return false;
        }
        if self.is_whole_reference() || other.is_whole_reference() {
            return true;
        }
        self.coords_overlap(other)
    }

    fn coords_overlap(&self, other: &GenomeSpan) -> bool {
        (self.start <= other.start && other.start < self.end)
            || (self.start < other.end && other.end <= self.end)
            || (other.start <= self.start && self.end <= other.end)
    }

    /// True if this span fully contains `other`.
    #[must_use]
    pub fn contains(&self, other: &GenomeSpan) -> bool {
        if !self.compatible(other) {
            return false;
        }
        if self.is_whole_reference() {
            return true;
        }
        if other.is_whole_reference() {
            return false;
        }
        self.start <= other.start && other.end <= self.end
    }

    /// Containment when `only_within`, otherwise overlap.
    #[must_use]
    pub fn covers(&self, other: &GenomeSpan, only_within: bool) -> bool {
        if only_within {
            self.contains(other)
        } else {
            self.overlaps(other)
        }
    }

    /// Signed distance from this span to `other`, ignoring strand.
    ///
    /// Zero when the spans overlap, positive when `other` lies at higher
    /// coordinates, negative when it lies at lower ones. Adjacent spans are 1 apart.
    pub fn distance_to(&self, other: &GenomeSpan) -> Result<i64, Error> {
        if self.reference != other.reference {
            return Err(Error::MismatchedReference {
                left: self.reference.clone(),
                right: other.reference.clone(),
            });
        }
        if self.is_whole_reference() || other.is_whole_reference() || self.coords_overlap(other)
        {
            return Ok(0);
        }
        if other.start >= self.end {
            Ok(other.start - self.end + 1)
        } else {
            Ok(-(self.start - other.end + 1))
        }
    }

    /// Grow the span `n` bases upstream (towards the 5' end of its strand).
    #[must_use]
    pub fn extend5(&self, n: i64) -> Self {
        if self.is_whole_reference() {
            return self.clone();
        }
        let mut out = self.clone();
        if self.strand.is_minus() {
            out.end += n;
        } else {
            out.start = (self.start - n).max(0);
        }
        out
    }

    /// Grow the span `n` bases downstream (towards the 3' end of its strand).
    #[must_use]
    pub fn extend3(&self, n: i64) -> Self {
        if self.is_whole_reference() {
            return self.clone();
        }
        let mut out = self.clone();
        if self.strand.is_minus() {
            out.start = (self.start - n).max(0);
        } else {
            out.end += n;
        }
        out
    }

    /// Bounding union of two spans. The strand collapses to `None` when they differ.
    pub fn combine(&self, other: &GenomeSpan) -> Result<Self, Error> {
        if self.reference != other.reference {
            return Err(Error::MismatchedReference {
                left: self.reference.clone(),
                right: other.reference.clone(),
            });
        }
        let strand = if self.strand == other.strand {
            self.strand
        } else {
            Strand::None
        };
        if self.is_whole_reference() || other.is_whole_reference() {
            return Ok(Self::whole_reference(self.reference.clone(), strand));
        }
        Ok(Self {
            reference: self.reference.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            strand,
        })
    }
}

impl Ord for GenomeSpan {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.reference, &other.reference)
            .then(self.start.cmp(&other.start))
            .then(self.end.cmp(&other.end))
            .then(self.strand.cmp(&other.strand))
    }
}

impl PartialOrd for GenomeSpan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare reference names so that embedded numbers sort numerically (`chr2 < chr10`).
///
/// Names that differ only in leading zeros fall back to byte order, keeping the
/// order total.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (mut x, mut y) = (a.as_bytes(), b.as_bytes());
    loop {
        match (x.first(), y.first()) {
            (None, None) => break,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(cx), Some(cy)) if cx.is_ascii_digit() && cy.is_ascii_digit() => {
                let nx = x.iter().take_while(|c| c.is_ascii_digit()).count();
                let ny = y.iter().take_while(|c| c.is_ascii_digit()).count();
                let (dx, rest_x) = x.split_at(nx);
                let (dy, rest_y) = y.split_at(ny);
                let dx = trim_leading_zeros(dx);
                let dy = trim_leading_zeros(dy);
                let ord = dx.len().cmp(&dy.len()).then_with(|| dx.cmp(dy));
                if ord != Ordering::Equal {
                    return ord;
                }
                x = rest_x;
                y = rest_y;
            }
            (Some(cx), Some(cy)) => {
                if cx != cy {
                    return cx.cmp(cy);
                }
                x = &x[1..];
                y = &y[1..];
            }
        }
    }
    a.cmp(b)
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let zeros = digits.iter().take_while(|&&d| d == b'0').count();
    &digits[zeros..]
}

impl fmt::Display for GenomeSpan {
    /// Samtools-style region: 1-based inclusive coordinates, optional `:+`/`:-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reference)?;
        if !self.is_whole_reference() {
            write!(f, ":{}-{}", self.start + 1, self.end)?;
        }
        match self.strand {
            Strand::None => Ok(()),
            strand => write!(f, ":{strand}"),
        }
    }
}

impl FromStr for GenomeSpan {
    type Err = Error;

    /// Parse `ref`, `ref:pos` or `ref:start-end` (1-based inclusive), each
    /// optionally followed by `:+` or `:-`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (body, strand) = match s.strip_suffix(":+") {
            Some(body) => (body, Strand::Plus),
            None => match s.strip_suffix(":-") {
                Some(body) => (body, Strand::Minus),
                None => (s, Strand::None),
            },
        };
        if body.is_empty() {
            return Err(Error::Parse(format!("empty region: '{s}'")));
        }

        let Some((reference, coords)) = body.rsplit_once(':') else {
            return Ok(Self::whole_reference(body, strand));
        };

        let parse = |v: &str| -> Result<i64, Error> {
            v.replace(',', "")
                .parse::<i64>()
                .map_err(|e| Error::Parse(format!("invalid coordinate '{v}' in '{s}': {e}")))
        };
        let (start, end) = match coords.split_once('-') {
            Some((a, b)) => (parse(a)?, parse(b)?),
            None => {
                let pos = parse(coords)?;
                (pos, pos)
            }
        };
        if start < 1 {
            return Err(Error::Parse(format!("region start must be >= 1: '{s}'")));
        }
        Self::new(reference, start - 1, end, strand)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn span(start: i64, end: i64, strand: Strand) -> GenomeSpan {
        GenomeSpan::new("chr1", start, end, strand).unwrap()
    }

    #[test]
    fn overlap_half_open_boundary() {
        let a = span(1000, 2000, Strand::Plus);
        assert!(a.overlaps(&span(1999, 2000, Strand::None)));
        assert!(!a.overlaps(&span(2000, 2001, Strand::None)));
        assert!(!a.overlaps(&span(999, 1000, Strand::None)));
    }

    #[test]
    fn overlap_query_containing_span() {
        let a = span(100, 200, Strand::None);
        let wide = span(50, 250, Strand::None);
        assert!(a.overlaps(&wide));
        assert!(wide.overlaps(&a));
        assert!(!a.contains(&wide));
        assert!(wide.contains(&a));
    }

    #[test]
    fn strand_mismatch_blocks_overlap() {
        let a = span(100, 200, Strand::Plus);
        assert!(!a.overlaps(&span(150, 151, Strand::Minus)));
        assert!(a.overlaps(&span(150, 151, Strand::Plus)));
        assert!(a.overlaps(&span(150, 151, Strand::None)));
    }

    #[test]
    fn whole_reference_sentinel() {
        let whole = GenomeSpan::whole_reference("chr1", Strand::None);
        let a = span(5, 10, Strand::Plus);
        assert!(whole.contains(&a));
        assert!(!a.contains(&whole));
        assert!(a.overlaps(&whole));
        assert!(!whole.overlaps(&GenomeSpan::new("chr2", 5, 10, Strand::None).unwrap()));
        assert_eq!(whole.len(), None);
    }

    #[test]
    fn invalid_span_rejected() {
        assert!(GenomeSpan::new("chr1", 10, 5, Strand::None).is_err());
        assert!(GenomeSpan::new("chr1", -5, 5, Strand::None).is_err());
    }

    #[test]
    fn distance() {
        let a = span(100, 200, Strand::None);
        assert_eq!(a.distance_to(&span(150, 300, Strand::None)).unwrap(), 0);
        assert_eq!(a.distance_to(&span(200, 210, Strand::None)).unwrap(), 1);
        assert_eq!(a.distance_to(&span(210, 220, Strand::None)).unwrap(), 11);
        assert_eq!(a.distance_to(&span(50, 100, Strand::None)).unwrap(), -1);
        let other = GenomeSpan::new("chr2", 0, 1, Strand::None).unwrap();
        assert!(matches!(
            a.distance_to(&other),
            Err(Error::MismatchedReference { .. })
        ));
    }

    #[test]
    fn extend_is_strand_aware() {
        let plus = span(100, 200, Strand::Plus);
        assert_eq!(plus.extend5(10), span(90, 200, Strand::Plus));
        assert_eq!(plus.extend3(10), span(100, 210, Strand::Plus));

        let minus = span(100, 200, Strand::Minus);
        assert_eq!(minus.extend5(10), span(100, 210, Strand::Minus));
        assert_eq!(minus.extend3(10), span(90, 200, Strand::Minus));

        let none = span(5, 20, Strand::None);
        assert_eq!(none.extend5(10), span(0, 20, Strand::None));
    }

    #[test]
    fn combine_collapses_strand() {
        let a = span(100, 200, Strand::Plus);
        let b = span(150, 300, Strand::Minus);
        assert_eq!(a.combine(&b).unwrap(), span(100, 300, Strand::None));
        let c = span(400, 500, Strand::Plus);
        assert_eq!(a.combine(&c).unwrap(), span(100, 500, Strand::Plus));
    }

    #[test]
    fn natural_reference_order() {
        assert_eq!(natural_cmp("chr2", "chr10"), Ordering::Less);
        assert_eq!(natural_cmp("chr10", "chrX"), Ordering::Less);
        assert_eq!(natural_cmp("chr1", "chr1"), Ordering::Equal);
        assert_ne!(natural_cmp("chr01", "chr1"), Ordering::Equal);

        let mut spans = vec![
            GenomeSpan::new("chr10", 0, 5, Strand::None).unwrap(),
            GenomeSpan::new("chr2", 10, 20, Strand::Minus).unwrap(),
            GenomeSpan::new("chr2", 10, 20, Strand::Plus).unwrap(),
            GenomeSpan::new("chr2", 5, 30, Strand::None).unwrap(),
        ];
        spans.sort();
        let rendered: Vec<String> = spans.iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            vec!["chr2:6-30", "chr2:11-20:+", "chr2:11-20:-", "chr10:1-5"]
        );
    }

    #[test]
    fn parse_regions() {
        let s: GenomeSpan = "chr1:1001-2000:+".parse().unwrap();
        assert_eq!(s, span(1000, 2000, Strand::Plus));
        let p: GenomeSpan = "chr1:151".parse().unwrap();
        assert_eq!(p, span(150, 151, Strand::None));
        let w: GenomeSpan = "chrX".parse().unwrap();
        assert!(w.is_whole_reference());
        let c: GenomeSpan = "chr1:1,001-2,000".parse().unwrap();
        assert_eq!(c.start(), 1000);
        assert!("chr1:0-10".parse::<GenomeSpan>().is_err());
        assert!("chr1:abc".parse::<GenomeSpan>().is_err());
    }

    #[test]
    fn display_parse_round_trip() {
        for text in ["chr1:101-200", "chr7:5-5:-", "chrM"] {
            let parsed: GenomeSpan = text.parse().unwrap();
            assert_eq!(parsed.to_string(), text);
        }
    }

    fn arb_strand() -> impl Strategy<Value = Strand> {
        prop_oneof![Just(Strand::Plus), Just(Strand::Minus), Just(Strand::None)]
    }

    fn arb_span() -> impl Strategy<Value = GenomeSpan> {
        (
            prop_oneof![Just("chr1"), Just("chr2"), Just("chr10")],
            0i64..500,
            1i64..100,
            arb_strand(),
        )
            .prop_map(|(r, start, len, strand)| {
                GenomeSpan::new(r, start, start + len, strand).unwrap()
            })
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_span(), b in arb_span()) {
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        #[test]
        fn containment_implies_overlap(a in arb_span(), b in arb_span()) {
            if a.contains(&b) {
                prop_assert!(a.overlaps(&b));
            }
        }

        #[test]
        fn overlap_matches_interval_arithmetic(a in arb_span(), b in arb_span()) {
            let expected = a.reference() == b.reference()
                && a.strand().matches(b.strand())
                && a.start() < b.end()
                && b.start() < a.end();
            prop_assert_eq!(a.overlaps(&b), expected);
        }

        #[test]
        fn ordering_is_total_and_lexicographic(a in arb_span(), b in arb_span(), c in arb_span()) {
            prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
            prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
            if a < b && b < c {
                prop_assert!(a < c);
            }
            if a.reference() == b.reference() && a.start() != b.start() {
                prop_assert_eq!(a.cmp(&b), a.start().cmp(&b.start()));
            }
        }
    }
}
