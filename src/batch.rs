//! Batch extraction over a stream of page records.

use std::sync::Arc;

use futures::StreamExt as _;
use schemars::JsonSchema;
use serde::{Deserializer, de};
use tokio::sync::Mutex;

use crate::{
    async_utils::{
        BoxedFuture, BoxedStream, io::JsonStream, spawn_blocking_propagating_panics,
    },
    extract::{Extraction, ParseMode, extract},
    prelude::*,
};

/// One page of OCR text to process.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct BatchInput {
    /// An identifier copied to the output. May be any JSON value.
    pub id: Value,

    /// The OCR text of the page.
    pub text: String,

    /// The mode to use for this page, overriding `--mode`. Blank means "use
    /// the default".
    #[serde(
        default,
        deserialize_with = "deserialize_optional_mode",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<ParseMode>")]
    pub mode: Option<ParseMode>,
}

/// CSV input has no nulls, so an empty string also means "no mode".
fn deserialize_optional_mode<'de, D>(deserializer: D) -> Result<Option<ParseMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let mode = Option::<String>::deserialize(deserializer)?;
    match mode.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(mode) => mode.parse().map(Some).map_err(de::Error::custom),
    }
}

/// The questions found on one page.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
pub struct BatchOutput {
    /// The `id` from the input record.
    pub id: Value,

    /// The mode we actually used.
    pub mode: ParseMode,

    /// What we found.
    #[serde(flatten)]
    pub extraction: Extraction,
}

/// Running totals for a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchCounters {
    /// Pages processed.
    pub pages: usize,
    /// Questions found across all pages.
    pub questions: usize,
    /// Pages where we found nothing.
    pub empty_pages: usize,
}

impl BatchCounters {
    fn record(&mut self, extraction: &Extraction) {
        self.pages += 1;
        self.questions += extraction.questions.len();
        if extraction.questions.is_empty() {
            self.empty_pages += 1;
        }
    }
}

/// The pieces returned by [`process_batch_stream`].
pub struct BatchStreamInfo {
    /// One future per input record, each producing a [`BatchOutput`] as JSON.
    /// Resolve these with `buffered` to keep the output in input order.
    pub stream: BoxedStream<BoxedFuture<Result<Value>>>,

    /// Totals, updated as futures complete.
    pub counters: Arc<Mutex<BatchCounters>>,
}

/// Turn a stream of input records into a stream of extraction futures.
///
/// Extraction is CPU-bound, so each page runs on the blocking thread pool.
pub fn process_batch_stream(input: JsonStream, default_mode: ParseMode) -> BatchStreamInfo {
    let counters = Arc::new(Mutex::new(BatchCounters::default()));
    let stream_counters = counters.clone();
    let stream = input
        .enumerate()
        .map(move |(idx, record)| -> BoxedFuture<Result<Value>> {
            let counters = stream_counters.clone();
            Box::pin(async move {
                let input = serde_json::from_value::<BatchInput>(record?)
                    .with_context(|| format!("Invalid input record #{}", idx + 1))?;
                let mode = input.mode.unwrap_or(default_mode);
                let BatchInput { id, text, .. } = input;
                trace!(?id, %mode, "Extracting page");
                let extraction =
                    spawn_blocking_propagating_panics(move || extract(&text, mode))
                        .await?;
                counters.lock().await.record(&extraction);
                let output = BatchOutput {
                    id,
                    mode,
                    extraction,
                };
                serde_json::to_value(&output).context("Failed to serialize output")
            })
        })
        .boxed();
    BatchStreamInfo { stream, counters }
}
