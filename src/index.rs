//! Binned spatial index associating annotation values with genomic spans.
//!
//! Annotations are bucketed into fixed-width bins per reference. Each bin keeps
//! its entries sorted by `(start, end)` so a query can stop scanning a bin as
//! soon as an entry starts past the query end.

use std::collections::HashMap;
use std::ops::ControlFlow;

use crate::error::Error;
use crate::span::GenomeSpan;

/// Default bin width in bases.
pub const BIN_SIZE: i64 = 100_000;

/// Index key: one fixed-width bin on one reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefBin {
    pub reference: String,
    pub bin: i64,
}

/// A value attached to a genomic span.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation<T> {
    pub span: GenomeSpan,
    pub value: T,
}

/// Static description of the fields an annotation type can report.
pub trait AnnotationFields {
    const FIELDS: &'static [&'static str];
}

/// A generic named feature, as found in BED-style annotation tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct BedFeature {
    pub name: String,
    pub score: Option<f64>,
}

impl AnnotationFields for BedFeature {
    const FIELDS: &'static [&'static str] = &["name", "score"];
}

/// Collects annotations, then freezes them into an immutable [`IntervalIndex`].
pub struct IntervalIndexBuilder<T> {
    bin_size: i64,
    annotations: Vec<Annotation<T>>,
}

impl<T> Default for IntervalIndexBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IntervalIndexBuilder<T> {
    pub fn new() -> Self {
        Self {
            bin_size: BIN_SIZE,
            annotations: Vec::new(),
        }
    }

    pub fn with_bin_size(bin_size: i64) -> Result<Self, Error> {
        if bin_size <= 0 {
            return Err(Error::Validation(format!(
                "bin size must be positive, got {bin_size}"
            )));
        }
        Ok(Self {
            bin_size,
            annotations: Vec::new(),
        })
    }

    pub fn insert(&mut self, span: GenomeSpan, value: T) {
        self.annotations.push(Annotation { span, value });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Sort once and distribute every annotation into the bins it touches.
    pub fn build(mut self) -> IntervalIndex<T> {
        self.annotations.sort_by(|a, b| a.span.cmp(&b.span));

        let mut bins: HashMap<RefBin, Vec<usize>> = HashMap::new();
        let mut whole_reference: HashMap<String, Vec<usize>> = HashMap::new();
        let mut known_bins: HashMap<String, Vec<i64>> = HashMap::new();

        // Entries are visited in coordinate order, so every bin list comes out
        // sorted by (start, end) without a per-bin sort.
        for (i, annotation) in self.annotations.iter().enumerate() {
            let span = &annotation.span;
            if span.is_whole_reference() {
                whole_reference
                    .entry(span.reference().to_string())
                    .or_default()
                    .push(i);
                continue;
            }
            for bin in bin_range(span, self.bin_size) {
                let key = RefBin {
                    reference: span.reference().to_string(),
                    bin,
                };
                let list = bins.entry(key).or_default();
                if list.is_empty() {
                    known_bins
                        .entry(span.reference().to_string())
                        .or_default()
                        .push(bin);
                }
                list.push(i);
            }
        }
        for list in known_bins.values_mut() {
            list.sort_unstable();
        }

        IntervalIndex {
            bin_size: self.bin_size,
            annotations: self.annotations,
            bins,
            whole_reference,
            known_bins,
        }
    }
}

fn bin_range(span: &GenomeSpan, bin_size: i64) -> std::ops::RangeInclusive<i64> {
    span.start().div_euclid(bin_size)..=span.end().div_euclid(bin_size)
}

/// Read-only binned interval index.
#[derive(Debug)]
pub struct IntervalIndex<T> {
    bin_size: i64,
    /// Master list, sorted by span.
    annotations: Vec<Annotation<T>>,
    bins: HashMap<RefBin, Vec<usize>>,
    whole_reference: HashMap<String, Vec<usize>>,
    known_bins: HashMap<String, Vec<i64>>,
}

impl<T> IntervalIndex<T> {
    #[must_use]
    pub fn bin_size(&self) -> i64 {
        self.bin_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// All annotations in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = &Annotation<T>> {
        self.annotations.iter()
    }

    /// Annotations overlapping `query` (or containing it, when `only_within`).
    ///
    /// Each annotation appears once, in coordinate order, even if it spans
    /// several bins.
    #[must_use]
    pub fn find(&self, query: &GenomeSpan, only_within: bool) -> Vec<&Annotation<T>> {
        let mut hits = Vec::new();
        self.scan(query, only_within, |i| {
            hits.push(i);
            ControlFlow::Continue(())
        });
        hits.sort_unstable();
        hits.dedup();
        hits.into_iter().map(|i| &self.annotations[i]).collect()
    }

    /// Values of [`IntervalIndex::find`].
    #[must_use]
    pub fn find_values(&self, query: &GenomeSpan, only_within: bool) -> Vec<&T> {
        self.find(query, only_within)
            .into_iter()
            .map(|a| &a.value)
            .collect()
    }

    /// True if any annotation matches; stops at the first hit.
    #[must_use]
    pub fn has(&self, query: &GenomeSpan, only_within: bool) -> bool {
        let mut found = false;
        self.scan(query, only_within, |_| {
            found = true;
            ControlFlow::Break(())
        });
        found
    }

    /// Visit the master-list index of every matching annotation (possibly more
    /// than once). Returns how many candidates were examined.
    pub(crate) fn scan<F>(&self, query: &GenomeSpan, only_within: bool, mut visit: F) -> usize
    where
        F: FnMut(usize) -> ControlFlow<()>,
    {
        let mut examined = 0;
        let mut test = |i: usize, examined: &mut usize| -> ControlFlow<()> {
            *examined += 1;
            if self.annotations[i].span.covers(query, only_within) {
                visit(i)
            } else {
                ControlFlow::Continue(())
            }
        };

        if let Some(list) = self.whole_reference.get(query.reference()) {
            for &i in list {
                if test(i, &mut examined).is_break() {
                    return examined;
                }
            }
        }

        let mut key = RefBin {
            reference: query.reference().to_string(),
            bin: 0,
        };

        if query.is_whole_reference() {
            let Some(known) = self.known_bins.get(query.reference()) else {
                return examined;
            };
            for &bin in known {
                key.bin = bin;
                for &i in self.bins.get(&key).map(Vec::as_slice).unwrap_or_default() {
                    if test(i, &mut examined).is_break() {
                        return examined;
                    }
                }
            }
            return examined;
        }

        for bin in bin_range(query, self.bin_size) {
            key.bin = bin;
            let Some(list) = self.bins.get(&key) else {
                continue;
            };
            for &i in list {
                if self.annotations[i].span.start() > query.end() {
                    break;
                }
                if test(i, &mut examined).is_break() {
                    return examined;
                }
            }
        }
        examined
    }
}

impl<T: AnnotationFields> IntervalIndex<T> {
    /// Whether annotations in this index can report `key`. Independent of content.
    #[must_use]
    pub fn provides(&self, key: &str) -> bool {
        T::FIELDS.contains(&key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strand::Strand;
    use proptest::prelude::*;

    fn span(r: &str, start: i64, end: i64, strand: Strand) -> GenomeSpan {
        GenomeSpan::new(r, start, end, strand).unwrap()
    }

    fn feature(name: &str) -> BedFeature {
        BedFeature {
            name: name.to_string(),
            score: None,
        }
    }

    #[test]
    fn bed_feature_half_open_boundary() {
        let mut builder = IntervalIndexBuilder::new();
        builder.insert(span("chr1", 1000, 2000, Strand::Plus), feature("foo"));
        let index = builder.build();

        assert!(index.has(&span("chr1", 1999, 2000, Strand::None), false));
        assert!(!index.has(&span("chr1", 2000, 2001, Strand::None), false));
        assert!(index.has(&span("chr1", 1000, 1001, Strand::Plus), false));
        assert!(!index.has(&span("chr1", 1000, 1001, Strand::Minus), false));
        assert!(!index.has(&span("chr2", 1500, 1501, Strand::None), false));
    }

    #[test]
    fn only_within_requires_containment() {
        let mut builder = IntervalIndexBuilder::new();
        builder.insert(span("chr1", 100, 200, Strand::None), feature("a"));
        let index = builder.build();

        assert_eq!(index.find(&span("chr1", 150, 250, Strand::None), false).len(), 1);
        assert!(index.find(&span("chr1", 150, 250, Strand::None), true).is_empty());
        assert_eq!(index.find(&span("chr1", 150, 160, Strand::None), true).len(), 1);
    }

    #[test]
    fn multi_bin_annotation_reported_once() {
        let mut builder = IntervalIndexBuilder::new();
        builder.insert(span("chr1", 50_000, 350_000, Strand::None), feature("long"));
        builder.insert(span("chr1", 120_000, 130_000, Strand::None), feature("short"));
        let index = builder.build();

        let hits = index.find(&span("chr1", 0, 400_000, Strand::None), false);
        let names: Vec<&str> = hits.iter().map(|a| a.value.name.as_str()).collect();
        assert_eq!(names, vec!["long", "short"]);

        let hits = index.find(&GenomeSpan::whole_reference("chr1", Strand::None), false);
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn whole_reference_annotation_matches_any_query() {
        let mut builder = IntervalIndexBuilder::new();
        builder.insert(GenomeSpan::whole_reference("chrM", Strand::None), feature("mito"));
        let index = builder.build();

        assert!(index.has(&span("chrM", 16_000, 16_001, Strand::Minus), false));
        assert!(index.has(&span("chrM", 5, 6, Strand::None), true));
        assert!(!index.has(&span("chr1", 5, 6, Strand::None), false));
    }

    #[test]
    fn early_exit_bounds_scanned_candidates() {
        let mut builder = IntervalIndexBuilder::new();
        builder.insert(span("chr1", 10, 20, Strand::None), feature("hit"));
        for i in 0..1000 {
            builder.insert(span("chr1", 500 + i, 600 + i, Strand::None), feature("later"));
        }
        let index = builder.build();

        let query = span("chr1", 12, 15, Strand::None);
        let examined = index.scan(&query, false, |_| ControlFlow::Continue(()));
        assert_eq!(examined, 1);
        assert_eq!(index.find(&query, false).len(), 1);
    }

    #[test]
    fn provides_is_static() {
        let index: IntervalIndex<BedFeature> = IntervalIndexBuilder::new().build();
        assert!(index.provides("name"));
        assert!(index.provides("score"));
        assert!(!index.provides("gene_id"));
    }

    #[test]
    fn rejects_non_positive_bin_size() {
        assert!(IntervalIndexBuilder::<BedFeature>::with_bin_size(0).is_err());
        assert!(IntervalIndexBuilder::<BedFeature>::with_bin_size(1000).is_ok());
    }

    fn arb_entry() -> impl Strategy<Value = (u8, i64, i64, u8)> {
        (0u8..2, 0i64..5_000, 1i64..800, 0u8..3)
    }

    fn to_span(reference: u8, start: i64, len: i64, strand: u8) -> GenomeSpan {
        let strand = match strand {
            0 => Strand::Plus,
            1 => Strand::Minus,
            _ => Strand::None,
        };
        let reference = if reference == 0 { "chr1" } else { "chr2" };
        GenomeSpan::new(reference, start, start + len, strand).unwrap()
    }

    proptest! {
        #[test]
        fn find_matches_linear_scan(
            entries in proptest::collection::vec(arb_entry(), 0..60),
            query in arb_entry(),
            only_within in any::<bool>(),
        ) {
            let mut builder = IntervalIndexBuilder::with_bin_size(1_000).unwrap();
            for (id, &(r, s, l, st)) in entries.iter().enumerate() {
                builder.insert(to_span(r, s, l, st), id);
            }
            let index = builder.build();
            let query = to_span(query.0, query.1, query.2, query.3);

            let mut found: Vec<usize> = index
                .find(&query, only_within)
                .into_iter()
                .map(|a| a.value)
                .collect();
            found.sort_unstable();

            let expected: Vec<usize> = entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| {
                    let (r, s, l, st) = **entry;
                    to_span(r, s, l, st).covers(&query, only_within)
                })
                .map(|(id, _)| id)
                .collect();

            prop_assert_eq!(&found, &expected);
            prop_assert_eq!(index.has(&query, only_within), !expected.is_empty());
        }
    }
}
