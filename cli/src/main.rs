//! Canonicalize an RDF N-Quads document with RDFC-1.0.

mod loader;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use rdfc::canon::normalize_digest;
use rdfc::hash::DigestAlgorithm;
use rdfc::nquads::parse_str;
use rdfc::ticker::Ticker;

use crate::loader::Loader;

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(
    name = "rdfc",
    version,
    about = "Canonicalize an RDF N-Quads document with RDFC-1.0"
)]
struct Args {
    /// Input document IRI or filepath; reads standard input when absent
    #[arg(short, long)]
    input: Option<String>,

    /// Output document filename; writes standard output when absent
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Terminate after the specified time in milliseconds; 0 disables the budget
    #[arg(short, long, default_value_t = 10_000)]
    timeout: u64,

    /// The name of the hash algorithm to use
    #[arg(short, long, default_value = "SHA256", value_name = "SHA256|SHA384")]
    digest: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let digest: DigestAlgorithm = args.digest.parse()?;
    let ticker = Ticker::from_millis(args.timeout);

    let text = Loader::new(HTTP_TIMEOUT).load(args.input.as_deref())?;
    let source = args.input.as_deref().unwrap_or("<stdin>");
    let dataset = parse_str(&text).map_err(|e| anyhow!("{}", e.in_context(source)))?;
    log::debug!("parsed {} quads from {source}", dataset.len());

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    normalize_digest(&dataset, digest, &ticker, &mut out)?;
    out.flush().context("failed to write the canonical form")?;
    Ok(())
}
