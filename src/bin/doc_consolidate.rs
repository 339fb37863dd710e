//! Consolidate extracted elements into nodes.
//!
//! Reads a JSON array of elements, runs a pipeline preset and writes the
//! resulting nodes as JSON.
//!
//! Usage:
//!   doc-consolidate --input elements.json [--output nodes.json] [--preset none|basic|semantic]
//!                   [--provider openai|ollama|cloudflare] [--model NAME]
//!                   [--min-tokens N] [--max-tokens N] [--min-similarity F]
//!                   [--no-tables] [--no-images]
//!
//! Credentials come from `OPENAI_API_KEY`, `OLLAMA_API_URL`,
//! `CLOUDFLARE_API_TOKEN` and `CLOUDFLARE_ACCOUNT_ID`. Set `RUST_LOG=debug`
//! to see per-step node counts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use doc_consolidate::embeddings::{create_embeddings_client, EmbeddingsConfig, EmbeddingsProvider};
use doc_consolidate::pipeline::{
    ElementSelection, IngestionPipeline, PipelineConfig, PipelinePreset, SemanticConfig,
};
use doc_consolidate::{Element, Error, Result};

const USAGE: &str = "usage: doc-consolidate --input FILE [--output FILE] [--preset none|basic|semantic] \
[--provider openai|ollama|cloudflare] [--model NAME] [--min-tokens N] [--max-tokens N] \
[--min-similarity F] [--no-tables] [--no-images]";

struct CliConfig {
    input: PathBuf,
    output: Option<PathBuf>,
    preset: PipelinePreset,
    provider: EmbeddingsProvider,
    model: Option<String>,
    semantic: SemanticConfig,
    selection: ElementSelection,
}

impl CliConfig {
    fn from_args() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut input = None;
        let mut output = None;
        let mut preset = PipelinePreset::default();
        let mut provider = EmbeddingsProvider::OpenAi;
        let mut model = None;
        let mut semantic = SemanticConfig::default();
        let mut selection = ElementSelection::default();

        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--input" | "-i" => input = Some(PathBuf::from(value(&args, &mut i, flag)?)),
                "--output" | "-o" => output = Some(PathBuf::from(value(&args, &mut i, flag)?)),
                "--preset" => preset = value(&args, &mut i, flag)?.parse()?,
                "--provider" => provider = value(&args, &mut i, flag)?.parse()?,
                "--model" => model = Some(value(&args, &mut i, flag)?.to_string()),
                "--min-tokens" => semantic.min_tokens = number(&args, &mut i, flag)?,
                "--max-tokens" => semantic.max_tokens = number(&args, &mut i, flag)?,
                "--min-similarity" => semantic.min_similarity = number(&args, &mut i, flag)?,
                "--no-tables" => selection.tables = false,
                "--no-images" => selection.images = false,
                "--help" | "-h" => {
                    println!("{}", USAGE);
                    std::process::exit(0);
                },
                other => {
                    return Err(Error::InvalidConfig(format!("unknown argument '{}'\n{}", other, USAGE)));
                },
            }
            i += 1;
        }

        let input = input.ok_or_else(|| Error::InvalidConfig(format!("--input is required\n{}", USAGE)))?;
        Ok(Self {
            input,
            output,
            preset,
            provider,
            model,
            semantic,
            selection,
        })
    }
}

fn value<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| Error::InvalidConfig(format!("{} expects a value", flag)))
}

fn number<T: FromStr>(args: &[String], i: &mut usize, flag: &str) -> Result<T> {
    let raw = value(args, i, flag)?;
    raw.parse()
        .map_err(|_| Error::InvalidConfig(format!("{} expects a number, got '{}'", flag, raw)))
}

fn run() -> Result<()> {
    let cli = CliConfig::from_args()?;
    let config = PipelineConfig::default()
        .with_semantic(cli.semantic)
        .with_selection(cli.selection);

    let client = match cli.preset {
        PipelinePreset::Semantic => {
            let mut embeddings = EmbeddingsConfig::from_env(cli.provider);
            if let Some(model) = &cli.model {
                embeddings = embeddings.with_model(model.as_str());
            }
            Some(create_embeddings_client(&embeddings)?)
        },
        _ => None,
    };
    let pipeline = IngestionPipeline::from_preset(cli.preset, &config, client)?;

    let elements: Vec<Element> = serde_json::from_str(&fs::read_to_string(&cli.input)?)?;
    let element_count = elements.len();
    let start = Instant::now();
    let nodes = pipeline.run_elements(elements)?;
    log::info!(
        "{}: {} elements -> {} nodes with preset '{}' in {:.2?}",
        cli.input.display(),
        element_count,
        nodes.len(),
        cli.preset,
        start.elapsed()
    );

    match &cli.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(&mut writer, &nodes)?;
            writer.flush()?;
        },
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &nodes)?;
            writeln!(writer)?;
        },
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
