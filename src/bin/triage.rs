//! Triage CLI binary.

use std::io::Write;
use std::process;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;
use env_logger::Builder;
use log::LevelFilter;

use triage::cli::args::*;
use triage::cli::commands::*;

fn main() {
    // Parse command line arguments using clap
    let args = match TriageArgs::try_parse() {
        Ok(args) => args,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    // Set up logging/verbosity based on args
    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,  // Verbose
        _ => LevelFilter::Debug, // Very verbose (3+)
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    // Execute the command
    let database = args.database.display().to_string();
    if let Err(e) = execute_command(args).with_context(|| format!("training on {database} failed")) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
