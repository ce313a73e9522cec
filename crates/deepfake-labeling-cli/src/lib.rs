//! Operator tooling for the doctor whitelist.
//!
//! - `generate-doctor-whitelist`: build `doctor_whitelist.json` from prompts,
//!   patterns, text files and CSV files
//! - `show-doctor-ids`: print the whitelist for distribution, optionally with
//!   per-doctor labeling counts

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::Rng;

use deepfake_labeling_core::config::{LABELS_DIR_ENV, WHITELIST_PATH_ENV};
use deepfake_labeling_core::store::{JsonFileBackend, LabelBackend};
use deepfake_labeling_core::whitelist::{
    has_placeholders, GeneratorOutcome, GeneratorRequest, DEFAULT_PATTERN, DEFAULT_WHITELIST_PATH,
};
use deepfake_labeling_core::{load_whitelist, save_whitelist, DoctorId, WhitelistGenerator};

const SECURITY_NOTES: [&str; 4] = [
    "IDs are case-sensitive",
    "Each doctor should use their assigned ID only",
    "IDs are hashed for privacy in the system",
    "Contact the administrator if access is needed",
];

/// Install the stderr log subscriber. `RUST_LOG` overrides the `warn` default.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// =========================================================================
// generate-doctor-whitelist
// =========================================================================

#[derive(Parser, Debug)]
#[command(
    name = "generate-doctor-whitelist",
    about = "Generate the doctor whitelist for the deepfake labeling application",
    after_help = "Examples:\n  \
        generate-doctor-whitelist --interactive\n  \
        generate-doctor-whitelist --random 10\n  \
        generate-doctor-whitelist --random 5 --pattern 'MD{number}'\n  \
        generate-doctor-whitelist --from-file doctors.txt --from-csv roster.csv --output custom.json"
)]
pub struct GenerateArgs {
    /// Enter doctor IDs at a prompt, one per line; an empty line finishes
    #[arg(long)]
    pub interactive: bool,

    /// Generate N random doctor IDs
    #[arg(long, value_name = "N")]
    pub random: Option<usize>,

    /// Pattern for random IDs; {number}, {random} and {letter} are filled in
    #[arg(long, value_name = "PAT", default_value = DEFAULT_PATTERN)]
    pub pattern: String,

    /// Import doctor IDs from a text file, one per line (repeatable)
    #[arg(long = "from-file", value_name = "FILE")]
    pub from_file: Vec<PathBuf>,

    /// Import doctor IDs from the first column of a CSV file (repeatable)
    #[arg(long = "from-csv", value_name = "FILE")]
    pub from_csv: Vec<PathBuf>,

    /// Output file
    #[arg(long, value_name = "FILE", default_value = DEFAULT_WHITELIST_PATH)]
    pub output: PathBuf,

    /// Print the generated whitelist
    #[arg(long)]
    pub show: bool,
}

impl GenerateArgs {
    pub fn request(&self) -> GeneratorRequest {
        GeneratorRequest {
            interactive: self.interactive,
            random_count: self.random,
            pattern: self.pattern.clone(),
            text_files: self.from_file.clone(),
            csv_files: self.from_csv.clone(),
        }
    }
}

/// How a generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateStatus {
    /// Whitelist written
    Written,
    /// Sources were read but yielded no IDs; nothing written
    NothingCollected,
    /// No source was selected
    NoSources,
}

impl GenerateStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, GenerateStatus::NoSources)
    }
}

/// Collect IDs from every selected source and write the whitelist.
///
/// Prompts go to `prompt`, the report to `out`. Errors only when the output
/// file cannot be written.
pub fn generate<I, P, O, R>(
    args: &GenerateArgs,
    input: I,
    prompt: P,
    out: &mut O,
    rng: &mut R,
) -> Result<GenerateStatus>
where
    I: BufRead,
    P: Write,
    O: Write,
    R: Rng,
{
    let request = args.request();
    if !request.has_sources() {
        writeln!(out, "No input source given. Use --help to see available options.")?;
        return Ok(GenerateStatus::NoSources);
    }

    if matches!(request.random_count, Some(n) if n > 1) && !has_placeholders(&request.pattern) {
        writeln!(
            out,
            "Pattern {:?} has no placeholders and can produce only one ID.",
            request.pattern
        )?;
    }

    let mut generator = WhitelistGenerator::new();
    generator.collect(&request, input, prompt, rng);

    for report in generator.reports() {
        match &report.error {
            None => writeln!(
                out,
                "{}: added {}, skipped {}",
                report.source, report.added, report.skipped
            )?,
            Some(error) => writeln!(
                out,
                "{}: added {}, skipped {} (error: {})",
                report.source, report.added, report.skipped, error
            )?,
        }
    }

    let whitelist = match generator.finish()? {
        GeneratorOutcome::Built(whitelist) => whitelist,
        GeneratorOutcome::Empty => {
            writeln!(out, "No doctor IDs were added to the whitelist; nothing written.")?;
            return Ok(GenerateStatus::NothingCollected);
        }
    };

    save_whitelist(&args.output, &whitelist)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    writeln!(out, "Whitelist saved to: {}", args.output.display())?;
    writeln!(out, "Total doctors: {}", whitelist.total_doctors)?;

    if args.show {
        writeln!(out)?;
        print_ids(out, &whitelist.whitelist)?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Whitelist contains {} authorized doctor IDs.",
        whitelist.total_doctors
    )?;
    print_security_notes(out)?;
    writeln!(out)?;
    writeln!(out, "To view the whitelist later: show-doctor-ids")?;

    Ok(GenerateStatus::Written)
}

// =========================================================================
// show-doctor-ids
// =========================================================================

#[derive(Parser, Debug)]
#[command(
    name = "show-doctor-ids",
    about = "Display the authorized doctor IDs for distribution"
)]
pub struct ShowArgs {
    /// Whitelist file
    #[arg(long, value_name = "FILE", env = WHITELIST_PATH_ENV, default_value = DEFAULT_WHITELIST_PATH)]
    pub whitelist: PathBuf,

    /// Labels directory; when given, also print each doctor's label count
    #[arg(long = "labels-dir", value_name = "DIR", env = LABELS_DIR_ENV)]
    pub labels_dir: Option<PathBuf>,
}

/// Print the whitelist and, when a labels directory is given, per-doctor
/// progress keyed by hash.
pub fn show<O: Write>(args: &ShowArgs, out: &mut O) -> Result<()> {
    let whitelist = load_whitelist(&args.whitelist)
        .with_context(|| format!("cannot show {}", args.whitelist.display()))?;

    writeln!(out, "Medical Deepfake Labeling - Authorized Doctor IDs")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Total authorized doctors: {}", whitelist.total_doctors)?;
    writeln!(out, "Created: {}", whitelist.created)?;
    writeln!(out)?;
    writeln!(out, "Doctor IDs to distribute:")?;
    writeln!(out, "{}", "-".repeat(30))?;
    print_ids(out, &whitelist.whitelist)?;
    writeln!(out)?;
    print_security_notes(out)?;

    let Some(labels_dir) = &args.labels_dir else {
        return Ok(());
    };

    let listings = JsonFileBackend::new(labels_dir)
        .list()
        .with_context(|| format!("cannot list {}", labels_dir.display()))?;
    let mut counts: HashMap<String, Option<usize>> = listings
        .into_iter()
        .map(|l| (l.doctor.as_str().to_string(), l.record_count))
        .collect();

    writeln!(out)?;
    writeln!(out, "Labeling progress ({}):", labels_dir.display())?;
    writeln!(out, "{}", "-".repeat(30))?;
    for id in &whitelist.whitelist {
        let doctor = DoctorId::parse(id)?;
        let hash = doctor.hash();
        let count = match counts.remove(hash.as_str()) {
            Some(Some(n)) => format!("{} labels", n),
            Some(None) => "unreadable store".to_string(),
            None => "0 labels".to_string(),
        };
        writeln!(out, "{}  {}  {}", id, hash.short(), count)?;
    }
    if !counts.is_empty() {
        writeln!(
            out,
            "{} label stores belong to doctors no longer on the whitelist",
            counts.len()
        )?;
    }

    Ok(())
}

// =========================================================================
// Output helpers
// =========================================================================

fn print_ids<O: Write>(out: &mut O, ids: &[String]) -> std::io::Result<()> {
    for (i, id) in ids.iter().enumerate() {
        writeln!(out, "{:2}. {}", i + 1, id)?;
    }
    writeln!(out)?;
    writeln!(out, "Total: {} doctors", ids.len())
}

fn print_security_notes<O: Write>(out: &mut O) -> std::io::Result<()> {
    writeln!(out, "Security notes:")?;
    for note in SECURITY_NOTES {
        writeln!(out, "- {}", note)?;
    }
    Ok(())
}
