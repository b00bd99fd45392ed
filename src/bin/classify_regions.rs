use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use genic::cli;
use genic::config::AnnotationConfig;
use genic::genic::GenicRegionClassifier;
use genic::model::GeneModel;
use genic::span::GenomeSpan;

#[derive(Parser)]
#[command(
    name = "classify_regions",
    about = "Classify genomic regions into genic categories"
)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// File with one region per line (`chr1:100-200:+`); reads stdin when omitted
    #[arg(short = 'i', long = "in")]
    regions: Option<PathBuf>,

    /// Output TSV (defaults to stdout)
    #[arg(short = 'o', long = "out")]
    out: Option<PathBuf>,

    /// Treat each region as a spliced read alignment
    #[arg(long = "read-gap")]
    read_gap: bool,

    /// Only consider the gene with this id
    #[arg(short = 'g', long = "gene")]
    gene: Option<String>,
}

fn main() -> Result<()> {
    let start = Instant::now();
    let cli_args = Cli::parse();

    cli::banner("Classify Regions");

    // ── Configuration ────────────────────────────────────
    cli::section("Configuration");

    let config = AnnotationConfig::from_file(&cli_args.config)?;

    cli::kv("Config", &cli_args.config.display().to_string());
    cli::kv("GTF", &config.gtf.display().to_string());
    if let Some(gene) = &cli_args.gene {
        cli::kv("Gene", gene);
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

    // ── Classification ───────────────────────────────────
    cli::section("Classification");

    let input: Box<dyn BufRead> = match &cli_args.regions {
        Some(path) => Box::new(BufReader::new(
            File::open(path)
                .with_context(|| format!("failed to open regions: {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let out: Box<dyn Write> = match &cli_args.out {
        Some(path) => Box::new(
            File::create(path)
                .with_context(|| format!("failed to create output: {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);

    let classifier = GenicRegionClassifier::new(&model);
    let gene = cli_args.gene.as_deref();
    let mut classified = 0usize;
    let mut rejected = Vec::new();

    writeln!(out, "region\tgenic_region")?;
    for (line_num, line) in input.lines().enumerate() {
        let line = line?;
        let text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let span: GenomeSpan = match text.parse() {
            Ok(span) => span,
            Err(e) => {
                rejected.push(format!("line {}: {e}", line_num + 1));
                continue;
            }
        };
        let region = if cli_args.read_gap {
            classifier.classify_read(true, &span, gene)
        } else {
            classifier.classify_region(&span, gene)
        };
        writeln!(out, "{text}\t{region}")?;
        classified += 1;
    }
    out.flush()?;

    cli::kv("Classified", &classified.to_string());
    cli::warn_each(&rejected, "rejected regions");
    if let Some(path) = &cli_args.out {
        cli::success(&format!("wrote {}", path.display()));
    }

    cli::print_summary(start);
    Ok(())
}
