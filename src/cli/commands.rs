//! Command implementation for the triage CLI.

use std::time::Instant;

use log::info;

use crate::cli::args::{OutputFormat, TriageArgs};
use crate::cli::output::{output_result, progress};
use crate::error::Result;
use crate::ml::build_model;
use crate::training::LoadedRun;

/// Run the whole training pipeline for the parsed arguments.
pub fn execute_command(args: TriageArgs) -> Result<()> {
    let started = Instant::now();
    let config = args.training_config()?;

    progress(
        &format!("Loading data...\n    DATABASE: {}", args.database.display()),
        &args,
    );
    let loaded = LoadedRun::load(&args.database, config)?;

    progress("Building model...", &args);
    let search = build_model(&loaded.config().model)?;

    progress("Training model...", &args);
    let trained = loaded.train(search)?;
    if args.verbosity() > 1 && args.output_format == OutputFormat::Human {
        let artifact = trained.artifact();
        for candidate in &artifact.cv_results {
            println!(
                "    {}: mean score {:.3} (+/- {:.3}), rank {}",
                candidate.params, candidate.mean_score, candidate.std_score, candidate.rank
            );
        }
    }

    progress("Evaluating model...", &args);
    let evaluation = trained.evaluate()?;
    output_result(&evaluation, &args)?;

    progress(
        &format!("Saving model...\n    MODEL: {}", args.model.display()),
        &args,
    );
    let saved = trained.save(&args.model)?;

    progress("Trained model saved!", &args);
    info!(
        "Finished in {:.1}s with {} (model at {})",
        started.elapsed().as_secs_f64(),
        saved.artifact().best_params,
        saved.path().display()
    );
    Ok(())
}
