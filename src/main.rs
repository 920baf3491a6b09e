//! matesect: keep the read pairs present in both mates of a paired-end run.
//!
//! Usage: matesect <COMMAND> [OPTIONS]

use clap::{Parser, Subcommand};
use env_logger::Env;
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use matesect::commands::IntersectCommand;
use matesect::config::{DuplicatePolicy, IntersectConfig};
use matesect::fastq::{FastqError, FastqReader};
use matesect::id_set::{read_ids, read_unique_ids};

/// Suffix appended to an input path when no output path is given.
const DEFAULT_OUTPUT_SUFFIX: &str = ".intersect";

#[derive(Parser)]
#[command(name = "matesect")]
#[command(version)]
#[command(about = "Intersect paired-end FASTQ files by read id", long_about = None)]
struct Cli {
    /// Use smaller I/O buffers
    #[arg(long, global = true)]
    low_memory: bool,

    /// Only log warnings and errors (RUST_LOG overrides)
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the records whose read id occurs in both files
    Intersect {
        /// Forward (mate 1) FASTQ file
        #[arg(short = '1', long)]
        forward: PathBuf,

        /// Reverse (mate 2) FASTQ file
        #[arg(short = '2', long)]
        reverse: PathBuf,

        /// Forward output (default: <forward>.intersect)
        #[arg(short = 'o', long)]
        out_forward: Option<PathBuf>,

        /// Reverse output (default: <reverse>.intersect)
        #[arg(short = 'p', long)]
        out_reverse: Option<PathBuf>,

        /// Handling of repeated read ids within a file: error, keep-first
        #[arg(long, default_value = "error")]
        duplicates: String,

        /// Require /1 on every forward read and /2 on every reverse read
        #[arg(long)]
        check_mates: bool,

        /// Print run statistics to stderr
        #[arg(long)]
        stats: bool,
    },

    /// Print the canonical read id of every record
    Ids {
        /// Input FASTQ file (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Print each id once, at its first occurrence
        #[arg(short, long)]
        unique: bool,
    },

    /// Print the read ids present in both files, in forward-file order
    Common {
        /// Forward (mate 1) FASTQ file
        #[arg(short = '1', long)]
        forward: PathBuf,

        /// Reverse (mate 2) FASTQ file
        #[arg(short = '2', long)]
        reverse: PathBuf,

        /// Handling of repeated read ids within a file: error, keep-first
        #[arg(long, default_value = "error")]
        duplicates: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = IntersectConfig::new().with_low_memory(cli.low_memory);

    let result = match cli.command {
        Commands::Intersect {
            forward,
            reverse,
            out_forward,
            out_reverse,
            duplicates,
            check_mates,
            stats,
        } => run_intersect(
            config,
            forward,
            reverse,
            out_forward,
            out_reverse,
            &duplicates,
            check_mates,
            stats,
        ),
        Commands::Ids { input, unique } => run_ids(config, input, unique),
        Commands::Common {
            forward,
            reverse,
            duplicates,
        } => run_common(config, forward, reverse, &duplicates),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn parse_duplicates(value: &str) -> Result<DuplicatePolicy, FastqError> {
    DuplicatePolicy::from_str(value).ok_or_else(|| {
        FastqError::InvalidArgument(format!(
            "Invalid duplicates policy '{}'. Use: error, keep-first",
            value
        ))
    })
}

fn default_output(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(DEFAULT_OUTPUT_SUFFIX);
    PathBuf::from(name)
}

#[allow(clippy::too_many_arguments)]
fn run_intersect(
    config: IntersectConfig,
    forward: PathBuf,
    reverse: PathBuf,
    out_forward: Option<PathBuf>,
    out_reverse: Option<PathBuf>,
    duplicates: &str,
    check_mates: bool,
    stats: bool,
) -> Result<(), FastqError> {
    let config = config
        .with_duplicates(parse_duplicates(duplicates)?)
        .with_check_mates(check_mates);

    let out_forward = out_forward.unwrap_or_else(|| default_output(&forward));
    let out_reverse = out_reverse.unwrap_or_else(|| default_output(&reverse));

    let cmd = IntersectCommand::new().with_config(config);
    let result = cmd.run(&forward, &reverse, &out_forward, &out_reverse)?;

    if stats {
        eprintln!("Intersect stats: {}", result);
    }

    Ok(())
}

fn run_ids(config: IntersectConfig, input: PathBuf, unique: bool) -> Result<(), FastqError> {
    let ids = if input.to_string_lossy() == "-" {
        let stdin = io::stdin();
        let reader = FastqReader::with_capacity(stdin.lock(), config.input_buffer());
        collect_ids(reader, unique)?
    } else {
        let file = File::open(&input)?;
        let reader = FastqReader::with_capacity(file, config.input_buffer());
        collect_ids(reader, unique)?
    };

    write_ids(&ids, config.output_buffer())
}

fn collect_ids<R: io::Read>(
    reader: FastqReader<R>,
    unique: bool,
) -> Result<Vec<String>, FastqError> {
    if unique {
        read_unique_ids(reader)
    } else {
        read_ids(reader)
    }
}

fn run_common(
    config: IntersectConfig,
    forward: PathBuf,
    reverse: PathBuf,
    duplicates: &str,
) -> Result<(), FastqError> {
    let config = config.with_duplicates(parse_duplicates(duplicates)?);
    let cmd = IntersectCommand::new().with_config(config);

    let mut forward = File::open(&forward)?;
    let reverse = File::open(&reverse)?;
    let ids = cmd.common_ids_ordered(&mut forward, reverse)?;

    write_ids(&ids, config.output_buffer())
}

fn write_ids(ids: &[String], capacity: usize) -> Result<(), FastqError> {
    let stdout = io::stdout();
    let mut handle = BufWriter::with_capacity(capacity, stdout.lock());
    for id in ids {
        writeln!(handle, "{}", id)?;
    }
    handle.flush()?;
    Ok(())
}
