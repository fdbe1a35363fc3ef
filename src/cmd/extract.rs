//! The `extract` subcommand.

use clap::Args;

use crate::{
    async_utils::io::{read_text, write_string_output},
    extract::{ParseMode, auto_detect, extract},
    prelude::*,
};

/// Extract command line arguments.
#[derive(Debug, Args)]
pub struct ExtractOpts {
    /// OCR text to read. Defaults to standard input.
    pub input_path: Option<PathBuf>,

    /// What kind of questions to look for.
    #[clap(short = 'm', long, value_enum, default_value_t = ParseMode::AutoDetect)]
    pub mode: ParseMode,

    /// Output path. Defaults to standard output.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,

    /// Print one question per line instead of JSON.
    #[clap(long)]
    pub text_only: bool,
}

/// The `extract` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_extract(opts: &ExtractOpts) -> Result<()> {
    let text = read_text(opts.input_path.as_deref()).await?;
    let extraction = match opts.mode {
        ParseMode::AutoDetect => auto_detect(&text),
        mode => extract(&text, mode),
    };
    info!(
        questions = extraction.questions.len(),
        detected_types = ?extraction.detected_types,
        "Extraction complete"
    );

    let output = if opts.text_only {
        extraction
            .questions
            .iter()
            .map(|q| q.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        serde_json::to_string_pretty(&extraction)
            .context("failed to serialize extraction")?
    };
    write_string_output(opts.output_path.as_deref(), &output).await
}
