//! Incremental gene model construction with chromosome-scoped flushing.
//!
//! Records are grouped by `gene_id` in a scratch map. When the input moves to a
//! new reference sequence every scratch gene is finalized and the map is
//! cleared, so the input must be sorted by chromosome: a gene whose records
//! reappear after its block was flushed is reported and dropped.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::gtf::entry::{Feature, GtfRecord};
use crate::index::{BIN_SIZE, IntervalIndexBuilder};
use crate::strand::Strand;

use super::GeneModel;
use super::types::{FeatureKind, Gene, GeneKey, SkippedFeature, Transcript, TranscriptKey};

/// Options controlling which records enter the model and how it is indexed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Records lacking any of these `tag` values are dropped.
    pub required_tags: Vec<String>,
    pub bin_size: i64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            required_tags: Vec::new(),
            bin_size: BIN_SIZE,
        }
    }
}

#[derive(Debug, Clone)]
struct Segment {
    feature: Feature,
    start: i64,
    end: i64,
    attributes: Vec<(String, String)>,
}

#[derive(Debug)]
struct PendingTranscript {
    id: String,
    biotype: Option<String>,
    protein_id: Option<String>,
    segments: Vec<Segment>,
}

#[derive(Debug)]
struct PendingGene {
    id: String,
    name: Option<String>,
    biotype: Option<String>,
    status: Option<String>,
    reference: String,
    strand: Strand,
    transcripts: Vec<PendingTranscript>,
    transcript_index: HashMap<String, usize>,
}

impl PendingGene {
    fn from_record(record: &GtfRecord) -> Self {
        let attrs = &record.attributes;
        Self {
            id: attrs.gene_id.clone(),
            name: attrs.gene_name.clone(),
            biotype: attrs.gene_biotype.clone(),
            status: attrs.gene_status.clone(),
            reference: record.seqname.clone(),
            strand: record.strand,
            transcripts: Vec::new(),
            transcript_index: HashMap::new(),
        }
    }

    fn transcript_mut(&mut self, id: &str) -> &mut PendingTranscript {
        let next = self.transcripts.len();
        let i = *self.transcript_index.entry(id.to_string()).or_insert(next);
        if i == next {
            self.transcripts.push(PendingTranscript {
                id: id.to_string(),
                biotype: None,
                protein_id: None,
                segments: Vec::new(),
            });
        }
        &mut self.transcripts[i]
    }
}

/// Streams GTF records into a [`GeneModel`].
pub struct GeneModelBuilder {
    options: LoadOptions,
    current_reference: Option<String>,
    scratch: Vec<PendingGene>,
    scratch_index: HashMap<String, usize>,
    finished: Vec<PendingGene>,
    /// gene_id → reference whose block it was flushed with.
    flushed: HashMap<String, String>,
    /// transcript_id → owning gene_id.
    transcript_owner: HashMap<String, String>,
    dropped_genes: HashSet<String>,
    dropped_transcripts: HashSet<String>,
    skipped: Vec<SkippedFeature>,
}

impl GeneModelBuilder {
    pub fn new(options: LoadOptions) -> Result<Self, Error> {
        if options.bin_size <= 0 {
            return Err(Error::Validation(format!(
                "bin size must be positive, got {}",
                options.bin_size
            )));
        }
        Ok(Self {
            options,
            current_reference: None,
            scratch: Vec::new(),
            scratch_index: HashMap::new(),
            finished: Vec::new(),
            flushed: HashMap::new(),
            transcript_owner: HashMap::new(),
            dropped_genes: HashSet::new(),
            dropped_transcripts: HashSet::new(),
            skipped: Vec::new(),
        })
    }

    /// Add one parsed GTF record.
    pub fn add(&mut self, record: GtfRecord) -> Result<(), Error> {
        if !record.attributes.has_tags(&self.options.required_tags) {
            return Ok(());
        }

        if self.current_reference.as_deref() != Some(record.seqname.as_str()) {
            self.flush();
            self.current_reference = Some(record.seqname.clone());
        }

        let gene_id = record.attributes.gene_id.as_str();
        if self.dropped_genes.contains(gene_id) {
            return Ok(());
        }
        if let Some(previous) = self.flushed.get(gene_id) {
            let reason = format!(
                "records reappear on {} after the {previous} block was flushed; GTF must be sorted by chromosome",
                record.seqname
            );
            self.drop_gene(gene_id.to_string(), reason);
            return Ok(());
        }

        let transcript_id = record.attributes.transcript_id.as_str();
        if self.dropped_transcripts.contains(transcript_id) {
            return Ok(());
        }
        match self.transcript_owner.get(transcript_id) {
            Some(owner) if owner != gene_id => {
                let reason = format!("assigned to both gene {owner} and gene {gene_id}");
                self.drop_transcript(transcript_id.to_string(), reason);
                return Ok(());
            }
            Some(_) => {}
            None => {
                self.transcript_owner
                    .insert(transcript_id.to_string(), gene_id.to_string());
            }
        }

        let next = self.scratch.len();
        let gene_index = *self
            .scratch_index
            .entry(gene_id.to_string())
            .or_insert(next);
        if gene_index == next {
            self.scratch.push(PendingGene::from_record(&record));
        }
        let gene = &mut self.scratch[gene_index];
        if gene.name.is_none() {
            gene.name = record.attributes.gene_name.clone();
        }

        let GtfRecord {
            feature,
            start,
            end,
            attributes,
            ..
        } = record;
        let transcript = gene.transcript_mut(&attributes.transcript_id);
        if transcript.biotype.is_none() {
            transcript.biotype = attributes.transcript_biotype;
        }
        if transcript.protein_id.is_none() {
            transcript.protein_id = attributes.protein_id;
        }
        transcript.segments.push(Segment {
            feature,
            start,
            end,
            attributes: attributes.extra,
        });
        Ok(())
    }

    /// Finalize every gene of the current reference block.
    fn flush(&mut self) {
        self.scratch_index.clear();
        for gene in self.scratch.drain(..) {
            self.flushed.insert(gene.id.clone(), gene.reference.clone());
            self.finished.push(gene);
        }
    }

    fn drop_gene(&mut self, id: String, reason: String) {
        if self.dropped_genes.insert(id.clone()) {
            self.skipped.push(SkippedFeature {
                kind: FeatureKind::Gene,
                id,
                reason,
            });
        }
    }

    fn drop_transcript(&mut self, id: String, reason: String) {
        if self.dropped_transcripts.insert(id.clone()) {
            self.skipped.push(SkippedFeature {
                kind: FeatureKind::Transcript,
                id,
                reason,
            });
        }
    }

    /// Freeze the arena and build the gene interval index.
    pub fn build(mut self) -> Result<GeneModel, Error> {
        self.flush();

        let mut genes: Vec<Gene> = Vec::new();
        let mut transcripts: Vec<Transcript> = Vec::new();
        let mut index = IntervalIndexBuilder::with_bin_size(self.options.bin_size)?;
        let finished = std::mem::take(&mut self.finished);

        for pending in finished {
            if self.dropped_genes.contains(&pending.id) {
                continue;
            }
            let gene_key = GeneKey(genes.len());
            let mut gene_transcripts = Vec::new();
            let mut bounds: Option<(i64, i64)> = None;

            for pending_tx in pending.transcripts {
                if self.dropped_transcripts.contains(&pending_tx.id) {
                    continue;
                }
                if !pending_tx.segments.iter().any(|s| s.feature == Feature::Exon) {
                    self.drop_transcript(pending_tx.id, "no exon records".to_string());
                    continue;
                }
                let key = TranscriptKey(transcripts.len());
                let mut tx = Transcript::new(key, pending_tx.id, gene_key);
                tx.biotype = pending_tx.biotype;
                tx.protein_id = pending_tx.protein_id;
                for seg in pending_tx.segments {
                    match seg.feature {
                        Feature::Exon => tx.add_exon(seg.start, seg.end, seg.attributes),
                        Feature::Cds => tx.add_cds(seg.start, seg.end, seg.attributes),
                        Feature::StartCodon => {
                            tx.add_start_codon(seg.start, seg.end, seg.attributes);
                        }
                        Feature::StopCodon => tx.add_stop_codon(seg.start, seg.end, seg.attributes),
                    }
                }
                tx.freeze();
                bounds = Some(match bounds {
                    Some((s, e)) => (s.min(tx.start), e.max(tx.end)),
                    None => (tx.start, tx.end),
                });
                gene_transcripts.push(key);
                transcripts.push(tx);
            }

            let Some((start, end)) = bounds else {
                self.drop_gene(pending.id, "no transcripts with exon records".to_string());
                continue;
            };

            let gene = Gene {
                key: gene_key,
                name: pending.name.unwrap_or_else(|| pending.id.clone()),
                id: pending.id,
                biotype: pending.biotype,
                status: pending.status,
                reference: pending.reference,
                start,
                end,
                strand: pending.strand,
                transcripts: gene_transcripts,
            };
            index.insert(gene.span()?, gene_key);
            genes.push(gene);
        }

        let gene_ids = genes.iter().map(|g| (g.id.clone(), g.key)).collect();
        let transcript_ids = transcripts.iter().map(|t| (t.id.clone(), t.key)).collect();

        Ok(GeneModel {
            genes,
            transcripts,
            gene_ids,
            transcript_ids,
            index: index.build(),
            skipped: self.skipped,
        })
    }
}
