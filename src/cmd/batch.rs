//! The `batch` subcommand.

use clap::Args;
use futures::StreamExt as _;

use crate::{
    async_utils::io::{read_jsonl_or_csv, write_output},
    batch::{BatchStreamInfo, process_batch_stream},
    extract::ParseMode,
    prelude::*,
    ui::{ProgressConfig, Ui},
};

use super::StreamOpts;

/// Batch command line arguments.
#[derive(Debug, Args)]
pub struct BatchOpts {
    /// JSONL or CSV input with `id` and `text` fields, and an optional `mode`.
    /// Defaults to standard input.
    pub input_path: Option<PathBuf>,

    /// Mode for records which don't specify one.
    #[clap(short = 'm', long, value_enum, default_value_t = ParseMode::AutoDetect)]
    pub mode: ParseMode,

    #[clap(flatten)]
    pub stream_opts: StreamOpts,

    /// JSONL output path. Defaults to standard output.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `batch` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_batch(ui: Ui, opts: &BatchOpts) -> Result<()> {
    let input = read_jsonl_or_csv(ui.clone(), opts.input_path.as_deref()).await?;
    let input = opts.stream_opts.apply_stream_input_opts(input);

    let pb = ui.new_from_size_hint(
        &ProgressConfig {
            emoji: "🔎",
            msg: "Extracting questions",
            done_msg: "Extracted questions",
        },
        input.size_hint(),
    );

    let BatchStreamInfo { stream, counters } = process_batch_stream(input, opts.mode);
    let output = pb
        .wrap_stream(stream.buffered(opts.stream_opts.job_count()))
        .boxed();
    write_output(opts.output_path.as_deref(), output).await?;

    let counters = counters.lock().await;
    ui.display_message(
        "📋",
        &format!(
            "Found {} questions on {} pages ({} pages had none)",
            counters.questions, counters.pages, counters.empty_pages
        ),
    );
    Ok(())
}
