use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hte")]
#[command(about = "Hierarchical Translation Engine command-line tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the offline bilingual term extraction pipeline over a text-pair corpus
    Extract {
        /// JSON file of `TextPairEntry` records to extract terms from
        input_file: PathBuf,

        /// Entries per Stage 1/2 LLM batch call
        #[arg(long, default_value_t = 10)]
        batch_size: usize,

        /// Max micro-batches run concurrently in Stage 1
        #[arg(long, default_value_t = 4)]
        max_concurrent: usize,

        /// Stage 1 extraction micro-batch size (defaults to --batch-size)
        #[arg(long)]
        extraction_batch_size: Option<usize>,

        /// Stage 2 quality-check batch size (defaults to --batch-size)
        #[arg(long)]
        quality_check_batch_size: Option<usize>,

        /// Stage 3 normalization batch size (defaults to --batch-size)
        #[arg(long)]
        normalization_batch_size: Option<usize>,

        /// Max distinct target terms kept per normalized source in Stage 4
        #[arg(long, default_value_t = 5)]
        max_targets_per_source: usize,

        /// Weight given to term confidence in Stage 4's combined_score
        #[arg(long, default_value_t = 0.4)]
        confidence_weight: f64,

        /// Weight given to quality_score in Stage 4's combined_score
        #[arg(long, default_value_t = 0.6)]
        quality_weight: f64,

        /// Checkpoint file path
        #[arg(long, default_value = "btep_checkpoint.json")]
        checkpoint: PathBuf,

        /// Directory the checkpoint lives in, if not alongside --checkpoint
        #[arg(long)]
        stage_dir: Option<PathBuf>,

        /// Ignore an existing checkpoint and start from stage 1 regardless
        #[arg(long, default_value_t = false)]
        no_resume: bool,

        /// Delete the checkpoint file before running
        #[arg(long, default_value_t = false)]
        clean_checkpoint: bool,

        /// Resume at this stage, recomputing it and everything after (1-4)
        #[arg(long, default_value_t = 1)]
        start_from_stage: u8,

        /// Only process the first N entries of the input file
        #[arg(long)]
        max_entries: Option<usize>,
    },

    /// Run hierarchical translation ablations over a sample set and score them
    Run {
        /// JSON file of `Sample` records (`{id, source, target, metadata?}`)
        #[arg(long)]
        samples: PathBuf,

        /// Comma-separated ablation names: baseline, full, terminology, terminology_syntax
        #[arg(long, default_value = "baseline,full")]
        ablations: String,

        /// Max samples translated concurrently
        #[arg(long, default_value_t = 4)]
        max_concurrent: usize,

        /// Where to write the `{ablation: [SampleResult]}` result file
        #[arg(long, default_value = "results.json")]
        test_set: PathBuf,

        /// Derive terminology/terminology_syntax pseudo-ablations from `full`'s trace
        #[arg(long, default_value_t = false)]
        save_intermediate: bool,

        /// Comma-separated layers to enable candidate selection for: terminology,syntax,discourse
        #[arg(long, default_value = "")]
        selection_layers: String,

        /// Candidates generated per round when selection is enabled for that round's layer
        #[arg(long, default_value_t = 3)]
        num_candidates: usize,

        /// Comma-separated layers to enable gating for: terminology,syntax,discourse
        #[arg(long, default_value = "")]
        gating_layers: String,

        #[arg(long, default_value_t = 0.7)]
        term_gate_threshold: f64,

        #[arg(long, default_value_t = 0.85)]
        syntax_gate_threshold: f64,

        #[arg(long, default_value_t = 0.85)]
        discourse_gate_threshold: f64,

        #[arg(long, default_value_t = 0.5)]
        tm_gate_threshold: f64,

        /// Run the Evaluation Suite (BLEU/chrF++) over each ablation's predictions
        #[arg(long, default_value_t = false)]
        enable_quality_assessment: bool,
    },
}
