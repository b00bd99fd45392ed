use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use genic::cli;
use genic::config::AnnotationConfig;
use genic::effect::{self, DEFAULT_FLANK, EffectRow, VariantAnnotator};
use genic::model::GeneModel;
use genic::reference::ReferenceSequences;

#[derive(Parser)]
#[command(
    name = "annotate_variants",
    about = "Predict per-transcript consequences for a file of variants"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Tab-separated variants: chrom, 1-based pos, ref, alt
    #[arg(short = 'i', long = "in")]
    variants: PathBuf,

    /// Output TSV (defaults to stdout)
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Report upstream/downstream consequences up to this distance from a transcript
    #[arg(long = "flank", default_value_t = DEFAULT_FLANK)]
    flank: i64,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();

    cli::banner("Annotate Variants");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = AnnotationConfig::from_file(&cli_args.config)?;
    let fasta_path = config.require_fasta("annotate_variants")?;

    cli::kv("Config", &cli_args.config.display().to_string());
    cli::kv("GTF", &config.gtf.display().to_string());
    cli::kv("FASTA", &fasta_path.display().to_string());
    cli::kv("Variants", &cli_args.variants.display().to_string());
    cli::kv("Flank", &cli_args.flank.to_string());
    if !config.required_tags.is_empty() {
        cli::kv("Required tags", &config.required_tags.join(", "));
    }

    eprintln!();

    // ── Gene Model ───────────────────────────────────────
    cli::section("Gene Model");

    let model = GeneModel::from_path(&config.gtf, &config.load_options())
        .with_context(|| format!("failed to load GTF: {}", config.gtf.display()))?;

    cli::kv("Genes", &model.genes().len().to_string());
    cli::kv("Transcripts", &model.transcripts().len().to_string());
    cli::warn_each(model.skipped(), "skipped features");

    eprintln!();

    // ── Reference ────────────────────────────────────────
    cli::section("Reference");

    let reference = ReferenceSequences::from_path(fasta_path)
        .with_context(|| format!("failed to load FASTA: {}", fasta_path.display()))?;

    cli::kv("Sequences", &reference.len().to_string());

    eprintln!();

    // ── Annotation ───────────────────────────────────────
    cli::section("Annotation");

    let file = File::open(&cli_args.variants).with_context(|| {
        format!("failed to open variants: {}", cli_args.variants.display())
    })?;
    let variants = effect::read_variants(BufReader::new(file))
        .with_context(|| format!("failed to parse variants: {}", cli_args.variants.display()))?;

    let annotator = VariantAnnotator::new(&model, &reference).with_flank(cli_args.flank);
    let outcome = annotator.annotate_all(&variants);

    cli::kv("Records", &variants.len().to_string());
    cli::kv("Rows", &outcome.rows.len().to_string());
    cli::warn_each(&outcome.failures, "failed transcript/variant pairs");

    let out: Box<dyn Write> = match &cli_args.out {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);
    writeln!(out, "{}", EffectRow::HEADER)?;
    for row in &outcome.rows {
        writeln!(out, "{row}")?;
    }
    out.flush()?;

    if let Some(path) = &cli_args.out {
        cli::success(&format!("wrote {}", path.display()));
    }

    cli::print_summary(start);
    Ok(())
}

