//! Output formatting for CLI commands.

use std::fmt::Display;

use serde::Serialize;

use crate::cli::args::{OutputFormat, TriageArgs};
use crate::error::Result;

/// Print a progress line in human mode unless quiet.
pub fn progress(message: &str, args: &TriageArgs) {
    if args.verbosity() > 0 && args.output_format == OutputFormat::Human {
        println!("{message}");
    }
}

/// Output a result in the format requested on the command line.
pub fn output_result<T: Serialize + Display>(result: &T, args: &TriageArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => output_human(result),
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: Display>(result: &T) -> Result<()> {
    print!("{result}");
    Ok(())
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &TriageArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    println!("{json}");
    Ok(())
}
