//! Flat-file generator CLI
//!
//! Generates fixed-width bank files with random details and verifies existing
//! files against their trailer.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- generate -n 10000 -n 100000 --seed 7
//! cargo run -- verify SHARC.EDCMP.FCS3D01.RETAIL.DEBIT.TCB_10000
//! ```
//!
//! A CSV summary of every file is written to stdout.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `info` or `debug` to control logging verbosity

use chrono::NaiveDateTime;
use clap::{Args, Parser, Subcommand, ValueEnum};
use flatfile_records::field::TIMESTAMP_FORMAT;
use flatfile_records::{
    default_file_name, generate_file, verify, write_summary, Amount, CodecError, FileSummary,
    GeneratorConfig, RecordEncoder, Result, TextOverflow,
};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;
use tempfile::NamedTempFile;

#[derive(Parser, Debug)]
#[command(name = "flatfile-gen", version, about = "Generate and verify fixed-width bank files")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one file per record count
    Generate(GenerateArgs),
    /// Check a file's trailer against its details
    Verify {
        /// File to verify
        file: PathBuf,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of detail records (repeat for several files)
    #[arg(short = 'n', long = "records", required = true, num_args = 1..)]
    records: Vec<u64>,

    /// Output file (only with a single record count)
    #[arg(short = 'o', long = "output", conflicts_with = "output_dir")]
    output: Option<PathBuf>,

    /// Directory for conventionally named output files
    #[arg(long = "output-dir", default_value = ".")]
    output_dir: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a detail is a debit
    #[arg(long, default_value_t = 0.6)]
    debit_ratio: f64,

    /// Transaction amounts are drawn from 0.5x to 1.5x this value
    #[arg(long, default_value = "1000.00")]
    base_amount: Amount,

    /// System timestamp for the header (default: now)
    #[arg(long, value_parser = parse_timestamp)]
    timestamp: Option<NaiveDateTime>,

    /// What to do with text longer than its column
    #[arg(long, value_enum, default_value_t = OverflowArg::Truncate)]
    text_overflow: OverflowArg,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OverflowArg {
    Truncate,
    Reject,
}

impl From<OverflowArg> for TextOverflow {
    fn from(arg: OverflowArg) -> Self {
        match arg {
            OverflowArg::Truncate => TextOverflow::Truncate,
            OverflowArg::Reject => TextOverflow::Reject,
        }
    }
}

fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map_err(|e| e.to_string())
}

fn main() {
    env_logger::init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let summaries = match cli.command {
        Command::Generate(args) => generate(args)?,
        Command::Verify { file } => vec![verify_path(&file)?],
    };

    let stdout = io::stdout();
    write_summary(stdout.lock(), &summaries)
}

fn generate(args: GenerateArgs) -> Result<Vec<FileSummary>> {
    if args.output.is_some() && args.records.len() > 1 {
        return Err(CodecError::InvalidConfig(
            "--output takes a single record count; use --output-dir for several".to_string(),
        ));
    }

    let config = GeneratorConfig {
        debit_ratio: args.debit_ratio,
        base_amount: args.base_amount,
        ..GeneratorConfig::default()
    };
    config.validate()?;

    let encoder = RecordEncoder::new().with_text_overflow(args.text_overflow.into());
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Local::now().naive_local());
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut summaries = Vec::with_capacity(args.records.len());
    for &count in &args.records {
        let path = match &args.output {
            Some(path) => path.clone(),
            None => args.output_dir.join(default_file_name(count)),
        };

        let start = Instant::now();
        let trailer = write_atomically(&path, |file| {
            generate_file(
                BufWriter::new(file),
                &mut rng,
                &config,
                encoder,
                timestamp,
                count,
            )
        })?;
        info!(
            "Generated {} records into {} in {:.2?}",
            count,
            path.display(),
            start.elapsed()
        );

        summaries.push(FileSummary::from_trailer(path.display().to_string(), &trailer));
    }

    Ok(summaries)
}

/// Writes through a temporary file in the target directory and renames it
/// into place only if `write` succeeds.
fn write_atomically<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&File) -> Result<T>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let value = write(tmp.as_file())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(value)
}

fn verify_path(path: &Path) -> Result<FileSummary> {
    let file = File::open(path)?;
    let start = Instant::now();
    let trailer = verify(BufReader::new(file))?;
    info!("Verified {} in {:.2?}", path.display(), start.elapsed());
    Ok(FileSummary::from_trailer(path.display().to_string(), &trailer))
}
