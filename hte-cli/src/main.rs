mod cli;
mod commands;
mod config;
mod wiring;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    hte_telemetry::init_telemetry("hte-cli").expect("telemetry init");

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Extract {
            input_file,
            batch_size,
            max_concurrent,
            extraction_batch_size,
            quality_check_batch_size,
            normalization_batch_size,
            max_targets_per_source,
            confidence_weight,
            quality_weight,
            checkpoint,
            stage_dir,
            no_resume,
            clean_checkpoint,
            start_from_stage,
            max_entries,
        } => {
            commands::extract::run(
                input_file,
                batch_size,
                max_concurrent,
                extraction_batch_size,
                quality_check_batch_size,
                normalization_batch_size,
                max_targets_per_source,
                confidence_weight,
                quality_weight,
                checkpoint,
                stage_dir,
                no_resume,
                clean_checkpoint,
                start_from_stage,
                max_entries,
            )
            .await
        }
        Commands::Run {
            samples,
            ablations,
            max_concurrent,
            test_set,
            save_intermediate,
            selection_layers,
            num_candidates,
            gating_layers,
            term_gate_threshold,
            syntax_gate_threshold,
            discourse_gate_threshold,
            tm_gate_threshold,
            enable_quality_assessment,
        } => {
            commands::run::run(
                samples,
                ablations,
                max_concurrent,
                test_set,
                save_intermediate,
                selection_layers,
                num_candidates,
                gating_layers,
                term_gate_threshold,
                syntax_gate_threshold,
                discourse_gate_threshold,
                tm_gate_threshold,
                enable_quality_assessment,
            )
            .await
        }
    };

    if let Err(err) = outcome {
        hte_telemetry::error!(error = %err, "command failed");
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
