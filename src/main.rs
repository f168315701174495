//! Score a Bloom filter built from one word list against another.
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bloom_eval::corpus::DEFAULT_MAX_LINE_LEN;
use bloom_eval::pipeline::{DEFAULT_BITS, DEFAULT_HASHES};
use bloom_eval::{Config, Error, Sizing};

/// Build a Bloom filter from a reference word list and report how it
/// classifies a query word list.
#[derive(Parser, Debug)]
#[command(name = "bloom-eval", version)]
struct Args {
    /// Reference corpus, inserted into the filter and used as ground truth
    #[arg(long, default_value = "rockyou.ISO-8859-1.txt")]
    reference: PathBuf,

    /// Query corpus
    #[arg(long, default_value = "dictionary.txt")]
    queries: PathBuf,

    /// Bit-array size (m)
    #[arg(short = 'm', long, conflicts_with_all = ["capacity", "fp_rate"])]
    bits: Option<usize>,

    /// Number of hashes per item (k)
    #[arg(short = 'k', long, conflicts_with_all = ["capacity", "fp_rate"])]
    hashes: Option<u32>,

    /// Expected number of reference items; sizes the filter together with --fp-rate
    #[arg(long, requires = "fp_rate")]
    capacity: Option<usize>,

    /// Target false positive rate; sizes the filter together with --capacity
    #[arg(long, requires = "capacity")]
    fp_rate: Option<f64>,

    /// Lines longer than this many bytes are truncated
    #[arg(long, default_value_t = DEFAULT_MAX_LINE_LEN)]
    max_line_len: usize,

    /// Print "maybe" or "no" for every query before the report
    #[arg(long)]
    verdicts: bool,
}

impl Args {
    fn into_config(self) -> Config {
        let sizing = match (self.capacity, self.fp_rate) {
            (Some(capacity), Some(fp_rate)) => Sizing::Rate { capacity, fp_rate },
            _ => Sizing::Explicit {
                bits: self.bits.unwrap_or(DEFAULT_BITS),
                hashes: self.hashes.unwrap_or(DEFAULT_HASHES),
            },
        };

        Config {
            reference: self.reference,
            queries: self.queries,
            sizing,
            max_line_len: self.max_line_len,
            verdicts: self.verdicts,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    match execute(args.into_config()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(exhaustion = err.is_exhaustion(), "{}", err);
            ExitCode::FAILURE
        }
    }
}

fn execute(config: Config) -> Result<(), Error> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let report = bloom_eval::run(&config, &mut out)?;

    writeln!(out, "{}", report.confusion).map_err(Error::Write)?;
    out.flush().map_err(Error::Write)
}
