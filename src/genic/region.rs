//! Genic region categories and their precedence.

use std::fmt;

/// Where a locus falls relative to gene structure.
///
/// Every gene-level category has a sense and an antisense twin. Precedence is
/// carried by [`GenicRegion::priority`]: a lower number wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenicRegion {
    Junction,
    Coding,
    Utr5,
    Utr3,
    NcJunction,
    NcExon,
    CodingIntron,
    Utr5Intron,
    Utr3Intron,
    NcIntron,
    JunctionAnti,
    CodingAnti,
    Utr5Anti,
    Utr3Anti,
    NcJunctionAnti,
    NcExonAnti,
    CodingIntronAnti,
    Utr5IntronAnti,
    Utr3IntronAnti,
    NcIntronAnti,
    Mitochondrial,
    Intergenic,
}

/// Flags and rank attached to each [`GenicRegion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionTraits {
    pub priority: u8,
    pub is_gene: bool,
    pub is_exon: bool,
    pub is_coding: bool,
    pub is_sense: bool,
}

const fn traits(priority: u8, is_gene: bool, is_exon: bool, is_coding: bool, is_sense: bool) -> RegionTraits {
    RegionTraits {
        priority,
        is_gene,
        is_exon,
        is_coding,
        is_sense,
    }
}

impl GenicRegion {
    pub const ALL: [GenicRegion; 22] = [
        Self::Junction,
        Self::Coding,
        Self::Utr5,
        Self::Utr3,
        Self::NcJunction,
        Self::NcExon,
        Self::CodingIntron,
        Self::Utr5Intron,
        Self::Utr3Intron,
        Self::NcIntron,
        Self::JunctionAnti,
        Self::CodingAnti,
        Self::Utr5Anti,
        Self::Utr3Anti,
        Self::NcJunctionAnti,
        Self::NcExonAnti,
        Self::CodingIntronAnti,
        Self::Utr5IntronAnti,
        Self::Utr3IntronAnti,
        Self::NcIntronAnti,
        Self::Mitochondrial,
        Self::Intergenic,
    ];

    #[must_use]
    pub const fn traits(self) -> RegionTraits {
        match self {
            Self::Junction => traits(0, true, true, true, true),
            Self::Coding => traits(1, true, true, true, true),
            Self::Utr5 => traits(2, true, true, false, true),
            Self::Utr3 => traits(3, true, true, false, true),
            Self::NcJunction => traits(4, true, true, false, true),
            Self::NcExon => traits(5, true, true, false, true),
            Self::CodingIntron => traits(6, true, false, false, true),
            Self::Utr5Intron => traits(7, true, false, false, true),
            Self::Utr3Intron => traits(8, true, false, false, true),
            Self::NcIntron => traits(9, true, false, false, true),
            Self::JunctionAnti => traits(10, true, true, true, false),
            Self::CodingAnti => traits(11, true, true, true, false),
            Self::Utr5Anti => traits(12, true, true, false, false),
            Self::Utr3Anti => traits(13, true, true, false, false),
            Self::NcJunctionAnti => traits(14, true, true, false, false),
            Self::NcExonAnti => traits(15, true, true, false, false),
            Self::CodingIntronAnti => traits(16, true, false, false, false),
            Self::Utr5IntronAnti => traits(17, true, false, false, false),
            Self::Utr3IntronAnti => traits(18, true, false, false, false),
            Self::NcIntronAnti => traits(19, true, false, false, false),
            Self::Mitochondrial => traits(20, false, false, false, true),
            Self::Intergenic => traits(21, false, false, false, true),
        }
    }

    /// Rank used to resolve competing hits; lower wins.
    ///
    /// The tiers run coding, UTR, non-coding exon, intronic, then the non-gene
    /// categories. `Junction` and `NcJunction` sit directly above the exon tier
    /// they are promoted from and only arise from region or read promotion.
    #[must_use]
    pub const fn priority(self) -> u8 {
        self.traits().priority
    }

    #[must_use]
    pub const fn is_gene(self) -> bool {
        self.traits().is_gene
    }

    #[must_use]
    pub const fn is_exon(self) -> bool {
        self.traits().is_exon
    }

    #[must_use]
    pub const fn is_coding(self) -> bool {
        self.traits().is_coding
    }

    #[must_use]
    pub const fn is_sense(self) -> bool {
        self.traits().is_sense
    }

    /// The antisense twin of a sense category. Non-genic categories map to themselves.
    #[must_use]
    pub const fn antisense(self) -> Self {
        match self {
            Self::Junction => Self::JunctionAnti,
            Self::Coding => Self::CodingAnti,
            Self::Utr5 => Self::Utr5Anti,
            Self::Utr3 => Self::Utr3Anti,
            Self::NcJunction => Self::NcJunctionAnti,
            Self::NcExon => Self::NcExonAnti,
            Self::CodingIntron => Self::CodingIntronAnti,
            Self::Utr5Intron => Self::Utr5IntronAnti,
            Self::Utr3Intron => Self::Utr3IntronAnti,
            Self::NcIntron => Self::NcIntronAnti,
            other => other,
        }
    }

    /// `sense` selects between a category and its antisense twin.
    #[must_use]
    pub const fn with_sense(self, sense: bool) -> Self {
        if sense { self } else { self.antisense() }
    }

    /// Junction category for an exonic region: coding exons promote to
    /// [`GenicRegion::Junction`], all other exons to [`GenicRegion::NcJunction`].
    /// Returns `None` for non-exonic regions.
    #[must_use]
    pub const fn junction(self) -> Option<Self> {
        if !self.is_exon() {
            return None;
        }
        let base = if self.is_coding() {
            Self::Junction
        } else {
            Self::NcJunction
        };
        Some(base.with_sense(self.is_sense()))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junction => "JUNCTION",
            Self::Coding => "CODING",
            Self::Utr5 => "UTR5",
            Self::Utr3 => "UTR3",
            Self::NcJunction => "NC_JUNCTION",
            Self::NcExon => "NC_EXON",
            Self::CodingIntron => "CODING_INTRON",
            Self::Utr5Intron => "UTR5_INTRON",
            Self::Utr3Intron => "UTR3_INTRON",
            Self::NcIntron => "NC_INTRON",
            Self::JunctionAnti => "JUNCTION_ANTI",
            Self::CodingAnti => "CODING_ANTI",
            Self::Utr5Anti => "UTR5_ANTI",
            Self::Utr3Anti => "UTR3_ANTI",
            Self::NcJunctionAnti => "NC_JUNCTION_ANTI",
            Self::NcExonAnti => "NC_EXON_ANTI",
            Self::CodingIntronAnti => "CODING_INTRON_ANTI",
            Self::Utr5IntronAnti => "UTR5_INTRON_ANTI",
            Self::Utr3IntronAnti => "UTR3_INTRON_ANTI",
            Self::NcIntronAnti => "NC_INTRON_ANTI",
            Self::Mitochondrial => "MITOCHONDRIAL",
            Self::Intergenic => "INTERGENIC",
        }
    }
}

impl fmt::Display for GenicRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priorities_are_unique_and_ordered() {
        for (i, region) in GenicRegion::ALL.iter().enumerate() {
            assert_eq!(region.priority() as usize, i, "{region}");
        }
    }

    #[test]
    fn junctions_rank_above_their_exon_tier() {
        use GenicRegion::*;
        assert_eq!(Junction.priority() + 1, Coding.priority());
        assert_eq!(NcJunction.priority() + 1, NcExon.priority());
        assert!(Coding.priority() < Utr5.priority());
        assert!(Utr3.priority() < NcExon.priority());
        assert!(NcExon.priority() < CodingIntron.priority());
        for region in GenicRegion::ALL.iter().filter(|r| r.is_gene()) {
            assert!(region.priority() < Mitochondrial.priority(), "{region}");
            assert!(region.priority() < Intergenic.priority(), "{region}");
        }
    }

    #[test]
    fn antisense_twins() {
        for region in GenicRegion::ALL.iter().filter(|r| r.is_gene() && r.is_sense()) {
            let anti = region.antisense();
            assert!(!anti.is_sense());
            assert_eq!(anti.is_exon(), region.is_exon());
            assert_eq!(anti.is_coding(), region.is_coding());
            assert_eq!(anti.priority(), region.priority() + 10);
            assert_eq!(anti.as_str(), format!("{region}_ANTI"));
        }
        assert_eq!(GenicRegion::Intergenic.antisense(), GenicRegion::Intergenic);
    }

    #[test]
    fn junction_promotion() {
        assert_eq!(GenicRegion::Coding.junction(), Some(GenicRegion::Junction));
        assert_eq!(GenicRegion::Utr5.junction(), Some(GenicRegion::NcJunction));
        assert_eq!(GenicRegion::NcExonAnti.junction(), Some(GenicRegion::NcJunctionAnti));
        assert_eq!(GenicRegion::CodingAnti.junction(), Some(GenicRegion::JunctionAnti));
        assert_eq!(GenicRegion::CodingIntron.junction(), None);
        assert_eq!(GenicRegion::Intergenic.junction(), None);
    }
}
