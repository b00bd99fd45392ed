//! Assigns a [`GenicRegion`] to positions, regions and aligned reads.

use crate::model::{Gene, GeneModel, Transcript};
use crate::span::GenomeSpan;
use crate::strand::Strand;

use super::region::GenicRegion;

/// Reference names treated as the mitochondrial genome.
pub const MITOCHONDRIAL_REFERENCES: [&str; 3] = ["chrM", "M", "MT"];

/// Number of sense categories, which is also the offset of their antisense twins.
const TIERS: usize = 10;

/// Best hit per sense category, kept separately for sense and antisense genes.
#[derive(Debug, Default)]
struct Hits {
    sense: [bool; TIERS],
    anti: [bool; TIERS],
}

impl Hits {
    fn record(&mut self, region: GenicRegion, sense: bool) {
        let tier = region.priority() as usize;
        if sense {
            self.sense[tier] = true;
        } else {
            self.anti[tier] = true;
        }
    }

    /// First tier with any hit wins; an antisense hit in that tier selects the `_ANTI` twin.
    fn resolve(&self) -> GenicRegion {
        for tier in 0..TIERS {
            let region = GenicRegion::ALL[tier];
            if self.anti[tier] {
                return region.antisense();
            }
            if self.sense[tier] {
                return region;
            }
        }
        GenicRegion::Intergenic
    }
}

/// Classifies loci against a loaded [`GeneModel`].
#[derive(Debug, Clone, Copy)]
pub struct GenicRegionClassifier<'a> {
    model: &'a GeneModel,
}

impl<'a> GenicRegionClassifier<'a> {
    #[must_use]
    pub fn new(model: &'a GeneModel) -> Self {
        Self { model }
    }

    /// Classify `pos`, optionally considering only the gene with `gene_id`.
    ///
    /// Genes are found regardless of strand; a stranded query that disagrees
    /// with a gene's strand yields the antisense category.
    #[must_use]
    pub fn classify(&self, pos: &GenomeSpan, gene_id: Option<&str>) -> GenicRegion {
        if MITOCHONDRIAL_REFERENCES.contains(&pos.reference()) {
            return GenicRegion::Mitochondrial;
        }

        let mut hits = Hits::default();
        for gene in self.model.find_genes(&pos.unstranded(), false) {
            if gene_id.is_some_and(|id| id != gene.id) {
                continue;
            }
            let sense = pos.strand().matches(gene.strand);
            let mut claimed = false;
            for tx in self.model.transcripts_of(gene) {
                if let Some(region) = transcript_region(gene, tx, pos) {
                    hits.record(region, sense);
                    claimed = true;
                }
            }
            if !claimed {
                hits.record(GenicRegion::NcIntron, sense);
            }
        }
        hits.resolve()
    }

    /// Classify a region by its two endpoints and reconcile them.
    #[must_use]
    pub fn classify_region(&self, span: &GenomeSpan, gene_id: Option<&str>) -> GenicRegion {
        if span.is_whole_reference() || span.end() - span.start() <= 1 {
            return self.classify(span, gene_id);
        }
        let first = GenomeSpan::position(span.reference(), span.start(), span.strand());
        let last = GenomeSpan::position(span.reference(), span.end() - 1, span.strand());
        match (first, last) {
            (Ok(first), Ok(last)) => reconcile(
                self.classify(&first, gene_id),
                self.classify(&last, gene_id),
            ),
            _ => self.classify(span, gene_id),
        }
    }

    /// Classify an aligned read. A spliced alignment landing in an exon is
    /// promoted to the matching junction category.
    #[must_use]
    pub fn classify_read(&self, has_gap: bool, pos: &GenomeSpan, gene_id: Option<&str>) -> GenicRegion {
        let region = self.classify(pos, gene_id);
        if has_gap && region.is_gene() {
            if let Some(junction) = region.junction() {
                return junction;
            }
        }
        region
    }
}

/// Category of `pos` within one transcript, or `None` if the transcript does not reach it.
fn transcript_region(gene: &Gene, tx: &Transcript, pos: &GenomeSpan) -> Option<GenicRegion> {
    if !(pos.start() < tx.end && pos.end() > tx.start) {
        return None;
    }
    let exonic = tx.exon_contains(pos.start(), pos.end());

    let (Some(cds_start), Some(cds_end)) = (tx.cds_start, tx.cds_end) else {
        return Some(if exonic {
            GenicRegion::NcExon
        } else {
            GenicRegion::NcIntron
        });
    };

    if tx.cds_contains(pos.start(), pos.end()) {
        return Some(GenicRegion::Coding);
    }

    let minus = gene.strand == Strand::Minus;
    let before = pos.start() < cds_start;
    let after = pos.start() >= cds_end;
    let region = match (exonic, before, after) {
        (true, false, false) => GenicRegion::Coding,
        (true, true, _) if minus => GenicRegion::Utr3,
        (true, true, _) => GenicRegion::Utr5,
        (true, false, true) if minus => GenicRegion::Utr5,
        (true, false, true) => GenicRegion::Utr3,
        (false, false, false) => GenicRegion::CodingIntron,
        (false, true, _) if minus => GenicRegion::Utr3Intron,
        (false, true, _) => GenicRegion::Utr5Intron,
        (false, false, true) if minus => GenicRegion::Utr5Intron,
        (false, false, true) => GenicRegion::Utr3Intron,
    };
    Some(region)
}

/// Combine the classifications of a region's two endpoints.
#[must_use]
pub fn reconcile(start: GenicRegion, end: GenicRegion) -> GenicRegion {
    if start == end {
        return start;
    }
    match (start.is_gene(), end.is_gene()) {
        (true, false) => return start,
        (false, true) => return end,
        _ => {}
    }
    if start.is_gene() && start.is_exon() != end.is_exon() {
        let exonic = if start.is_exon() { start } else { end };
        if let Some(junction) = exonic.junction() {
            return junction;
        }
    }
    if start.is_coding() != end.is_coding() {
        return if start.is_coding() { start } else { end };
    }
    if start.priority() <= end.priority() {
        start
    } else {
        end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LoadOptions;
    use std::io::Cursor;

    fn line(feature: &str, start: i64, end: i64, strand: char, attrs: &str) -> String {
        format!("chr1\tsrc\t{feature}\t{start}\t{end}\t.\t{strand}\t.\t{attrs}\n")
    }

    fn load(gtf: &str) -> GeneModel {
        GeneModel::from_reader(Cursor::new(gtf.to_string()), &LoadOptions::default()).unwrap()
    }

    fn pos(p: i64, strand: Strand) -> GenomeSpan {
        GenomeSpan::position("chr1", p, strand).unwrap()
    }

    /// Single-exon gene on `chr1:[100,200)`, CDS over the whole exon.
    fn single_exon() -> GeneModel {
        let attrs = "gene_id \"G1\"; transcript_id \"T1\";";
        load(&(line("exon", 101, 200, '+', attrs) + &line("CDS", 101, 200, '+', attrs)))
    }

    /// Plus-strand gene with exons [100,200) [300,400) [500,600), CDS [150,550),
    /// and a non-coding transcript on [1000,1100) [1200,1300).
    fn spliced() -> GeneModel {
        let t1 = "gene_id \"G1\"; transcript_id \"T1\";";
        let t2 = "gene_id \"G2\"; transcript_id \"T2\";";
        let mut gtf = String::new();
        gtf += &line("exon", 101, 200, '+', t1);
        gtf += &line("exon", 301, 400, '+', t1);
        gtf += &line("exon", 501, 600, '+', t1);
        gtf += &line("CDS", 151, 200, '+', t1);
        gtf += &line("CDS", 301, 400, '+', t1);
        gtf += &line("CDS", 501, 550, '+', t1);
        gtf += &line("exon", 1001, 1100, '+', t2);
        gtf += &line("exon", 1201, 1300, '+', t2);
        load(&gtf)
    }

    #[test]
    fn single_exon_gene_scenario() {
        let model = single_exon();
        let genes = model.find_genes(&pos(150, Strand::None), false);
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0].id, "G1");

        let c = GenicRegionClassifier::new(&model);
        assert_eq!(c.classify(&pos(150, Strand::Plus), None), GenicRegion::Coding);
        assert_eq!(c.classify(&pos(150, Strand::Minus), None), GenicRegion::CodingAnti);
        assert_eq!(c.classify(&pos(250, Strand::None), None), GenicRegion::Intergenic);
    }

    #[test]
    fn mitochondrial_short_circuit() {
        let model = single_exon();
        let c = GenicRegionClassifier::new(&model);
        for name in ["chrM", "M", "MT"] {
            let p = GenomeSpan::position(name, 10, Strand::None).unwrap();
            assert_eq!(c.classify(&p, None), GenicRegion::Mitochondrial);
        }
    }

    #[test]
    fn plus_strand_tiers() {
        let model = spliced();
        let c = GenicRegionClassifier::new(&model);
        let cases = [
            (120, GenicRegion::Utr5),
            (160, GenicRegion::Coding),
            (250, GenicRegion::CodingIntron),
            (350, GenicRegion::Coding),
            (560, GenicRegion::Utr3),
            (1050, GenicRegion::NcExon),
            (1150, GenicRegion::NcIntron),
            (800, GenicRegion::Intergenic),
        ];
        for (p, expected) in cases {
            assert_eq!(c.classify(&pos(p, Strand::None), None), expected, "position {p}");
        }
        assert_eq!(c.classify(&pos(1150, Strand::Minus), None), GenicRegion::NcIntronAnti);
    }

    #[test]
    fn utr_introns_flip_on_minus_strand() {
        let t = "gene_id \"G1\"; transcript_id \"T1\";";
        let mut gtf = String::new();
        gtf += &line("exon", 101, 200, '-', t);
        gtf += &line("exon", 301, 400, '-', t);
        gtf += &line("exon", 501, 600, '-', t);
        gtf += &line("exon", 701, 800, '-', t);
        gtf += &line("CDS", 301, 400, '-', t);
        gtf += &line("CDS", 501, 600, '-', t);
        let model = load(&gtf);
        let c = GenicRegionClassifier::new(&model);
        // genomically before the CDS is the 3' end of a minus-strand transcript
        assert_eq!(c.classify(&pos(150, Strand::None), None), GenicRegion::Utr3);
        assert_eq!(c.classify(&pos(250, Strand::None), None), GenicRegion::Utr3Intron);
        assert_eq!(c.classify(&pos(450, Strand::None), None), GenicRegion::CodingIntron);
        assert_eq!(c.classify(&pos(650, Strand::None), None), GenicRegion::Utr5Intron);
        assert_eq!(c.classify(&pos(750, Strand::Minus), None), GenicRegion::Utr5);
        assert_eq!(c.classify(&pos(750, Strand::Plus), None), GenicRegion::Utr5Anti);
    }

    #[test]
    fn coding_beats_overlapping_non_coding_transcript() {
        let mut gtf = String::new();
        let t1 = "gene_id \"G1\"; transcript_id \"T1\";";
        let t2 = "gene_id \"G1\"; transcript_id \"T2\";";
        gtf += &line("exon", 101, 200, '+', t1);
        gtf += &line("exon", 101, 300, '+', t2);
        gtf += &line("CDS", 101, 200, '+', t1);
        let model = load(&gtf);
        let c = GenicRegionClassifier::new(&model);
        assert_eq!(c.classify(&pos(150, Strand::None), None), GenicRegion::Coding);
        // T1 does not reach 250, T2 is non-coding there
        assert_eq!(c.classify(&pos(250, Strand::None), None), GenicRegion::NcExon);
    }

    #[test]
    fn antisense_hit_marks_the_shared_tier() {
        let mut gtf = String::new();
        gtf += &line("exon", 101, 200, '+', "gene_id \"G1\"; transcript_id \"T1\";");
        gtf += &line("exon", 101, 200, '-', "gene_id \"G2\"; transcript_id \"T2\";");
        let model = load(&gtf);
        let c = GenicRegionClassifier::new(&model);
        // G1 disagrees with the query strand, so the tier resolves antisense
        assert_eq!(c.classify(&pos(150, Strand::Minus), None), GenicRegion::NcExonAnti);
        assert_eq!(c.classify(&pos(150, Strand::Plus), None), GenicRegion::NcExonAnti);
        assert_eq!(c.classify(&pos(150, Strand::None), None), GenicRegion::NcExon);
        assert_eq!(c.classify(&pos(150, Strand::Minus), Some("G2")), GenicRegion::NcExon);
        assert_eq!(c.classify(&pos(150, Strand::Minus), Some("G1")), GenicRegion::NcExonAnti);
        assert_eq!(c.classify(&pos(150, Strand::Plus), Some("G3")), GenicRegion::Intergenic);
    }

    #[test]
    fn region_reconciliation() {
        let model = spliced();
        let c = GenicRegionClassifier::new(&model);
        let region = |s: i64, e: i64| {
            let span = GenomeSpan::new("chr1", s, e, Strand::None).unwrap();
            c.classify_region(&span, None)
        };
        assert_eq!(region(155, 170), GenicRegion::Coding);
        // exon into intron
        assert_eq!(region(180, 250), GenicRegion::Junction);
        assert_eq!(region(1050, 1150), GenicRegion::NcJunction);
        // intergenic endpoint loses to a genic one
        assert_eq!(region(580, 800), GenicRegion::Utr3);
        // coding beats UTR
        assert_eq!(region(120, 170), GenicRegion::Coding);
        // both intronic: lower priority number wins
        assert_eq!(region(250, 1150), GenicRegion::CodingIntron);
    }

    #[test]
    fn reconcile_rules() {
        use GenicRegion::*;
        assert_eq!(reconcile(Intergenic, NcIntronAnti), NcIntronAnti);
        assert_eq!(reconcile(Utr5Anti, CodingIntronAnti), NcJunctionAnti);
        assert_eq!(reconcile(Utr5, Utr3), Utr5);
        assert_eq!(reconcile(Utr3Anti, CodingAnti), CodingAnti);
        assert_eq!(reconcile(Mitochondrial, Intergenic), Mitochondrial);
    }

    #[test]
    fn spliced_reads_promote_to_junction() {
        let model = spliced();
        let c = GenicRegionClassifier::new(&model);
        assert_eq!(c.classify_read(true, &pos(160, Strand::None), None), GenicRegion::Junction);
        assert_eq!(c.classify_read(false, &pos(160, Strand::None), None), GenicRegion::Coding);
        assert_eq!(c.classify_read(true, &pos(120, Strand::None), None), GenicRegion::NcJunction);
        assert_eq!(
            c.classify_read(true, &pos(1050, Strand::Minus), None),
            GenicRegion::NcJunctionAnti
        );
        assert_eq!(c.classify_read(true, &pos(250, Strand::None), None), GenicRegion::CodingIntron);
        assert_eq!(c.classify_read(true, &pos(800, Strand::None), None), GenicRegion::Intergenic);
    }
}
