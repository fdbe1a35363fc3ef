//! Master prompts for cooperative-learning structures.
//!
//! We don't call an LLM ourselves. We just build the prompt (or the chat
//! messages) that a downstream `/chat/completions` client should send.

use std::{collections::HashMap, sync::LazyLock};

use clap::ValueEnum;
use handlebars::Handlebars;
use schemars::JsonSchema;

use crate::{extract::Question, prelude::*};

/// Built-in templates, compiled into the binary.
static DEFAULT_TEMPLATES: LazyLock<HashMap<KaganStructure, StructureTemplate>> =
    LazyLock::new(|| {
        toml::from_str(include_str!("prompt/default_templates.toml"))
            .expect("built-in prompt templates should be valid")
    });

/// The user message. Everything is already plain text, so we don't escape.
const USER_TEMPLATE: &str = "{{task}}

{{format}}

Comprehension Questions:

{{question_list}}

Please generate the materials now.";

/// A Kagan cooperative-learning structure.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum KaganStructure {
    /// Students quiz each other with strips, then trade.
    QuizQuizTrade,
    /// A worksheet of "Find someone who..." prompts.
    FindSomeoneWho,
    /// Numbered question cards.
    FanNPick,
}

/// Prompt text for a single structure.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StructureTemplate {
    /// Who the model should act as. Sent as the system message.
    pub role: String,
    /// What to produce.
    pub task: String,
    /// How to lay out the output.
    pub format: String,
}

/// Templates for every structure. Any structure missing from a
/// user-supplied file falls back to the built-in template.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PromptTemplates {
    pub quiz_quiz_trade: StructureTemplate,
    pub find_someone_who: StructureTemplate,
    pub fan_n_pick: StructureTemplate,
}

impl PromptTemplates {
    /// Look up the template for `structure`.
    pub fn get(&self, structure: KaganStructure) -> &StructureTemplate {
        match structure {
            KaganStructure::QuizQuizTrade => &self.quiz_quiz_trade,
            KaganStructure::FindSomeoneWho => &self.find_someone_who,
            KaganStructure::FanNPick => &self.fan_n_pick,
        }
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        let builtin = |structure: KaganStructure| {
            DEFAULT_TEMPLATES
                .get(&structure)
                .cloned()
                .expect("built-in prompt templates should cover every structure")
        };
        Self {
            quiz_quiz_trade: builtin(KaganStructure::QuizQuizTrade),
            find_someone_who: builtin(KaganStructure::FindSomeoneWho),
            fan_n_pick: builtin(KaganStructure::FanNPick),
        }
    }
}

/// A rendered prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KaganPrompt {
    /// The role text.
    pub system: String,
    /// The task, format and question list.
    pub user: String,
}

impl KaganPrompt {
    /// The whole prompt as a single block of text.
    pub fn to_plain_text(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }

    /// The prompt as OpenAI-style chat messages.
    pub fn to_chat_messages(&self) -> Value {
        json!([
            { "role": "system", "content": self.system },
            { "role": "user", "content": self.user },
        ])
    }
}

/// Build a prompt asking for `structure` materials based on `questions`.
#[instrument(level = "debug", skip(templates, questions), fields(count = questions.len()))]
pub fn build_prompt(
    templates: &PromptTemplates,
    structure: KaganStructure,
    questions: &[Question],
) -> Result<KaganPrompt> {
    if questions.is_empty() {
        anyhow::bail!("no questions found");
    }
    for question in questions.iter().filter(|q| !q.looks_valid()) {
        warn!(id = %question.id, text = %question.text, "Question may be unusable");
    }

    let question_list = questions
        .iter()
        .enumerate()
        .map(|(idx, q)| format!("{}. {}", idx + 1, q.text))
        .collect::<Vec<_>>()
        .join("\n");

    let template = templates.get(structure);
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    let user = handlebars
        .render_template(
            USER_TEMPLATE,
            &json!({
                "task": template.task,
                "format": template.format,
                "question_list": question_list,
            }),
        )
        .context("failed to render prompt template")?;

    Ok(KaganPrompt {
        system: template.role.clone(),
        user,
    })
}
