use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use structfields::config::StructfieldsConfig;
use structfields::output::{OutputFormat, write_structs};

/// Print the structs declared in Go packages, with embedded fields flattened.
#[derive(Parser, Debug)]
#[command(name = "structfields", version, about)]
struct Cli {
    /// Packages to scan: directories, `dir/...` patterns or import paths (default: `.`)
    patterns: Vec<String>,

    /// Working directory
    #[arg(short = 'C', long)]
    dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Include _test.go files
    #[arg(long)]
    tests: bool,

    /// Do not load imported packages
    #[arg(long)]
    no_deps: bool,

    /// Use a field's trailing comment as its doc when it has none
    #[arg(long)]
    collapse_comments: bool,

    /// Doc comment prefix that marks a directive
    #[arg(long)]
    directive_prefix: Option<String>,

    /// Maximum embedding depth to follow
    #[arg(long)]
    max_depth: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("STRUCTFIELDS_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let dir = cli.dir.unwrap_or_else(|| PathBuf::from("."));
    let config = StructfieldsConfig::load(&dir);

    let mut load_config = config.load_config(&dir);
    if cli.tests {
        load_config.tests = true;
    }
    if cli.no_deps {
        load_config.deps = false;
    }

    let mut options = config.scan_options();
    if cli.collapse_comments {
        options.collapse_comments = true;
    }
    if let Some(prefix) = cli.directive_prefix {
        options.directive_prefix = prefix;
    }
    if let Some(depth) = cli.max_depth {
        options.max_embed_depth = depth;
    }

    let format = cli.format.unwrap_or_else(|| config.output_format());

    let structs = structfields::load_with(&load_config, options, &cli.patterns)
        .context("failed to load packages")?;
    tracing::info!(structs = structs.len(), "scan complete");

    let mut out = BufWriter::new(std::io::stdout().lock());
    write_structs(&mut out, &structs, format).context("failed to write output")?;
    out.flush().context("failed to write output")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
