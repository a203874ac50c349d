//! `sor-dump`: decode a SOR file, or every SOR file under a directory, and
//! write `<name>-dump.json` for each.

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use sor_rs::{batch, dump::DumpOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sor-dump", version, about = "Decode an OTDR SOR file into a JSON dump")]
struct Cli {
    /// SOR file to decode, or a directory searched recursively for `*.sor`
    input: Option<PathBuf>,

    /// Directory that receives the dump (created if missing)
    output_dir: Option<PathBuf>,

    /// Embed the trace samples in the JSON dump
    #[arg(long)]
    trace: bool,

    /// Also write the trace as `<name>-trace.dat`
    #[arg(long)]
    trace_file: bool,

    /// Compact JSON instead of indented
    #[arg(long)]
    compact: bool,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| level.into()))
        .with_target(false)
        .without_time()
        .init();
}

fn run(cli: &Cli, input: &Path, output_dir: &Path) -> Result<()> {
    let options = DumpOptions::default()
        .with_trace(cli.trace)
        .with_pretty(!cli.compact)
        .with_trace_file(cli.trace_file);

    if input.is_dir() {
        let report = batch::dump_directory(input, output_dir, &options)
            .with_context(|| format!("converting {}", input.display()))?;
        if !report.is_clean() {
            let total = report.failed.len() + report.written.len();
            bail!("{} of {} files failed", report.failed.len(), total);
        }
        return Ok(());
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory {}", output_dir.display()))?;
    let dump_path = sor_rs::dump::dump_to_dir(input, output_dir, &options)
        .with_context(|| format!("decoding {}", input.display()))?;
    info!("Wrote {}", dump_path.display());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (Some(input), Some(output_dir)) = (cli.input.as_deref(), cli.output_dir.as_deref())
    else {
        let mut command = Cli::command();
        let _ = command.print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    match run(&cli, input, output_dir) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error processing file: {e:#}");
            ExitCode::FAILURE
        }
    }
}
