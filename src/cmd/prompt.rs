//! The `prompt` subcommand.

use clap::Args;

use crate::{
    async_utils::io::{read_json_or_toml, read_text, write_string_output},
    extract::{ParseMode, extract_questions},
    prelude::*,
    prompt::{KaganStructure, PromptTemplates, build_prompt},
};

/// Prompt command line arguments.
#[derive(Debug, Args)]
pub struct PromptOpts {
    /// OCR text to read. Defaults to standard input.
    pub input_path: Option<PathBuf>,

    /// The cooperative-learning structure to generate materials for.
    #[clap(short = 's', long, value_enum)]
    pub structure: KaganStructure,

    /// What kind of questions to look for.
    #[clap(short = 'm', long, value_enum, default_value_t = ParseMode::AutoDetect)]
    pub mode: ParseMode,

    /// A TOML or JSON file overriding the built-in templates. Run `schema
    /// PromptTemplates` for the format.
    #[clap(long = "templates", value_name = "FILE")]
    pub templates_path: Option<PathBuf>,

    /// Print the prompt as plain text instead of chat messages.
    #[clap(long)]
    pub plain: bool,

    /// Output path. Defaults to standard output.
    #[clap(short = 'o', long = "out")]
    pub output_path: Option<PathBuf>,
}

/// The `prompt` subcommand.
#[instrument(level = "debug", skip_all)]
pub async fn cmd_prompt(opts: &PromptOpts) -> Result<()> {
    let templates = match &opts.templates_path {
        Some(path) => read_json_or_toml::<PromptTemplates>(path).await?,
        None => PromptTemplates::default(),
    };

    let text = read_text(opts.input_path.as_deref()).await?;
    let questions = extract_questions(&text, opts.mode);
    let prompt = build_prompt(&templates, opts.structure, &questions)?;

    let output = if opts.plain {
        prompt.to_plain_text()
    } else {
        serde_json::to_string_pretty(&prompt.to_chat_messages())
            .context("failed to serialize chat messages")?
    };
    write_string_output(opts.output_path.as_deref(), &output).await
}
