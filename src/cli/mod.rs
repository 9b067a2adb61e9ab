// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// clap and hands off to the application layer (Layer 2) or,
// for single-call utilities, straight to the function.
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, ConfigArgs, EvaluateArgs, ExportArgs, InspectArgs, PickBestArgs};

use crate::infra::config::RunOptions;

#[derive(Parser, Debug)]
#[command(
    name = "mhan-util",
    version,
    about = "Data loading and evaluation utilities for multilingual hierarchical attention networks."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch the subcommand. The CLI layer only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Inspect(args)  => run_inspect(args),
            Commands::PickBest(args) => run_pick_best(args),
            Commands::Evaluate(args) => run_evaluate(args),
            Commands::Export(args)   => run_export(args),
            Commands::Config(args)   => run_config(args),
        }
    }
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    use crate::data::store::DatasetStore;
    use crate::domain::traits::SampleSource;

    let store = DatasetStore::open(&args.store)?;
    let labelled = store
        .ids()
        .iter()
        .filter(|id| store.label_ids(id).is_some())
        .count();

    println!("samples:   {}", store.len());
    println!("labelled:  {}", labelled);
    println!("label map: {} entries", store.label_map().len());
    Ok(())
}

fn run_pick_best(args: PickBestArgs) -> Result<()> {
    use crate::infra::checkpoint::CheckpointDir;

    let best = CheckpointDir::new(&args.dev_path).pick_best()?;
    println!("epoch:   {}", best.epoch);
    println!("score:   {:.3}", best.score);
    println!("weights: {}", best.path.display());
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    tracing::info!("Evaluating predictions on: {}", args.store);
    let metrics = EvaluateUseCase::new(args.into()).execute()?;

    println!(
        "{} one-error: {:.4} ({} samples, {} skipped, {:.1}% skip rate)",
        metrics.language,
        metrics.one_error,
        metrics.samples,
        metrics.skipped,
        metrics.skip_rate() * 100.0
    );
    Ok(())
}

fn run_export(args: ExportArgs) -> Result<()> {
    use crate::application::export_use_case::ExportUseCase;

    let out = args.out.clone();
    let n   = ExportUseCase::new(args.into()).execute()?;
    println!("Exported {} documents to {}", n, out);
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    use crate::infra::{checkpoint::CheckpointDir, config::load_missing_args};

    let ckpt = CheckpointDir::new(&args.dev_path);
    let mut saved = ckpt.load_args()?;
    let mut run: RunOptions = args.run.into();

    load_missing_args(&mut saved, &mut run)?;

    if args.save {
        ckpt.save_args(&saved)?;
    }

    println!("{}", serde_json::to_string_pretty(&saved)?);
    println!("languages: {}", run.languages.unwrap_or_default().join(","));
    Ok(())
}
