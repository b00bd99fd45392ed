//! Sequence Ontology consequence terms and their impact tiers.

use std::fmt;

/// Effect of a variant on one transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Consequence {
    TranscriptionalStartLoss,
    SpliceDonorVariant,
    SpliceAcceptorVariant,
    IntronVariant,
    FivePrimeUtrVariant,
    ThreePrimeUtrVariant,
    FrameshiftVariant,
    InframeDeletion,
    InframeInsertion,
    SynonymousVariant,
    MissenseVariant,
    StopGained,
    StopLost,
    StartLost,
    UpstreamGeneVariant,
    DownstreamGeneVariant,
    NonCodingTranscriptExonVariant,
    IntergenicVariant,
}

/// Coarse severity of a [`Consequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Impact {
    High,
    Moderate,
    Low,
    Modifier,
}

impl Consequence {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TranscriptionalStartLoss => "transcriptional_start_loss",
            Self::SpliceDonorVariant => "splice_donor_variant",
            Self::SpliceAcceptorVariant => "splice_acceptor_variant",
            Self::IntronVariant => "intron_variant",
            Self::FivePrimeUtrVariant => "5_prime_UTR_variant",
            Self::ThreePrimeUtrVariant => "3_prime_UTR_variant",
            Self::FrameshiftVariant => "frameshift_variant",
            Self::InframeDeletion => "inframe_deletion",
            Self::InframeInsertion => "inframe_insertion",
            Self::SynonymousVariant => "synonymous_variant",
            Self::MissenseVariant => "missense_variant",
            Self::StopGained => "stop_gained",
            Self::StopLost => "stop_lost",
            Self::StartLost => "start_lost",
            Self::UpstreamGeneVariant => "upstream_gene_variant",
            Self::DownstreamGeneVariant => "downstream_gene_variant",
            Self::NonCodingTranscriptExonVariant => "non_coding_transcript_exon_variant",
            Self::IntergenicVariant => "intergenic_variant",
        }
    }

    #[must_use]
    pub fn impact(self) -> Impact {
        match self {
            Self::TranscriptionalStartLoss
            | Self::SpliceAcceptorVariant
            | Self::SpliceDonorVariant
            | Self::StopGained
            | Self::StopLost
            | Self::FrameshiftVariant
            | Self::StartLost => Impact::High,
            Self::InframeInsertion | Self::InframeDeletion | Self::MissenseVariant => {
                Impact::Moderate
            }
            Self::SynonymousVariant => Impact::Low,
            _ => Impact::Modifier,
        }
    }

    /// True for the 5' and 3' UTR terms.
    #[must_use]
    pub fn is_utr(self) -> bool {
        matches!(self, Self::FivePrimeUtrVariant | Self::ThreePrimeUtrVariant)
    }
}

impl fmt::Display for Consequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Impact {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Moderate => "MODERATE",
            Self::Low => "LOW",
            Self::Modifier => "MODIFIER",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_tiers() {
        assert_eq!(Consequence::SpliceDonorVariant.impact(), Impact::High);
        assert_eq!(Consequence::StartLost.impact(), Impact::High);
        assert_eq!(Consequence::InframeDeletion.impact(), Impact::Moderate);
        assert_eq!(Consequence::MissenseVariant.impact(), Impact::Moderate);
        assert_eq!(Consequence::SynonymousVariant.impact(), Impact::Low);
        assert_eq!(Consequence::IntronVariant.impact(), Impact::Modifier);
        assert_eq!(Consequence::FivePrimeUtrVariant.impact(), Impact::Modifier);
        assert_eq!(Consequence::IntergenicVariant.impact(), Impact::Modifier);
    }

    #[test]
    fn sequence_ontology_terms() {
        assert_eq!(Consequence::FivePrimeUtrVariant.to_string(), "5_prime_UTR_variant");
        assert_eq!(Consequence::TranscriptionalStartLoss.to_string(), "transcriptional_start_loss");
        assert_eq!(Impact::Moderate.to_string(), "MODERATE");
        assert!(Impact::High < Impact::Modifier);
    }
}
