//! Heuristic question extraction from OCR text.
//!
//! OCR output from photographed textbook pages is noisy, so everything here
//! is best-effort pattern matching. We never fail on malformed input. If no
//! structural cues are found, we just return fewer (or zero) questions.
//!
//! Each [`ParseMode`] except [`ParseMode::AutoDetect`] has an [`Extractor`].
//! Auto-detection runs all of them and merges their results.

use std::{borrow::Cow, collections::HashSet, fmt, str::FromStr};

use clap::ValueEnum;
use schemars::JsonSchema;

use crate::prelude::*;

use self::layout::{char_len, normalized_key};

mod auto;
mod fill_blank;
mod graphic;
mod layout;
mod matching;
mod ordering;
mod questions;
mod sentences;

/// The marker we substitute for a removed word.
pub const BLANK: &str = "______";

/// Candidates this short (after trimming) are never emitted as questions.
const MIN_QUESTION_LEN: usize = 10;

/// What kind of content are we looking for?
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum ParseMode {
    /// Plain questions, numbered or ending in `?`.
    Questions,
    /// Turn each sentence into a fill-in-the-blank prompt.
    FillInTheBlank,
    /// "Put these in order" tasks.
    Ordering,
    /// "Match these up" tasks.
    Matching,
    /// Tables, labeled categories, bullet hierarchies and connections.
    GraphicOrganizer,
    /// Run every other mode and merge the results.
    AutoDetect,
}

impl ParseMode {
    /// The order in which auto-detection runs the individual extractors.
    pub const SCAN_ORDER: [ParseMode; 5] = [
        ParseMode::Questions,
        ParseMode::FillInTheBlank,
        ParseMode::Ordering,
        ParseMode::Matching,
        ParseMode::GraphicOrganizer,
    ];

    /// The name used on the command line and in JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            ParseMode::Questions => "questions",
            ParseMode::FillInTheBlank => "fill-in-the-blank",
            ParseMode::Ordering => "ordering",
            ParseMode::Matching => "matching",
            ParseMode::GraphicOrganizer => "graphic-organizer",
            ParseMode::AutoDetect => "auto-detect",
        }
    }

    /// The prefix used for question IDs produced in this mode.
    pub fn id_prefix(self) -> &'static str {
        match self {
            ParseMode::Questions => "q",
            ParseMode::FillInTheBlank => "fill",
            ParseMode::Ordering => "order",
            ParseMode::Matching => "match",
            ParseMode::GraphicOrganizer => "graphic",
            ParseMode::AutoDetect => "auto",
        }
    }
}

impl fmt::Display for ParseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        ParseMode::SCAN_ORDER
            .into_iter()
            .chain([ParseMode::AutoDetect])
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| anyhow::anyhow!("unknown parse mode: {:?}", s))
    }
}

/// A single extracted question.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Question {
    /// An ID of the form `<prefix>-<n>`, unique within one extraction.
    pub id: String,

    /// The prompt shown to students.
    pub text: String,
}

impl Question {
    /// Does this look like something a student could actually answer?
    ///
    /// This is a loose check: either it asks something, or it's long enough
    /// to be a statement worth turning into a prompt.
    pub fn looks_valid(&self) -> bool {
        let len = char_len(self.text.trim());
        len > MIN_QUESTION_LEN && (self.text.contains('?') || len > 20)
    }
}

/// The result of running one or more extractors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Extraction {
    /// The questions we found, in discovery order.
    pub questions: Vec<Question>,

    /// Which modes produced at least one question, in scan order.
    pub detected_types: Vec<ParseMode>,
}

impl Extraction {
    /// Wrap the output of a single extractor.
    fn from_single_mode(mode: ParseMode, questions: Vec<Question>) -> Self {
        let detected_types = if questions.is_empty() {
            vec![]
        } else {
            vec![mode]
        };
        Self {
            questions,
            detected_types,
        }
    }
}

/// Interface implemented by each single-mode extractor.
pub trait Extractor: Send + Sync {
    /// The mode this extractor implements.
    fn mode(&self) -> ParseMode;

    /// Extract questions from newline-normalized, non-blank text.
    fn extract(&self, text: &str) -> Vec<Question>;
}

/// Get the extractor for a mode. There is none for [`ParseMode::AutoDetect`].
pub fn extractor_for_mode(mode: ParseMode) -> Option<&'static dyn Extractor> {
    match mode {
        ParseMode::Questions => Some(&questions::PlainQuestionExtractor),
        ParseMode::FillInTheBlank => Some(&fill_blank::FillInTheBlankExtractor),
        ParseMode::Ordering => Some(&ordering::OrderingExtractor),
        ParseMode::Matching => Some(&matching::MatchingExtractor),
        ParseMode::GraphicOrganizer => Some(&graphic::GraphicOrganizerExtractor),
        ParseMode::AutoDetect => None,
    }
}

/// Extract questions from OCR text using `mode`.
#[instrument(level = "debug", skip_all, fields(mode = %mode))]
pub fn extract(text: &str, mode: ParseMode) -> Extraction {
    let text = normalize_newlines(text);
    if text.trim().is_empty() {
        return Extraction::default();
    }
    let extraction = match extractor_for_mode(mode) {
        Some(extractor) => {
            Extraction::from_single_mode(mode, extractor.extract(&text))
        }
        None => auto::merge_all_modes(&text),
    };
    debug!(
        question_count = extraction.questions.len(),
        detected_types = ?extraction.detected_types,
        "Extracted questions"
    );
    extraction
}

/// Extract just the questions from OCR text using `mode`.
pub fn extract_questions(text: &str, mode: ParseMode) -> Vec<Question> {
    extract(text, mode).questions
}

/// Run every extractor and merge the results.
pub fn auto_detect(text: &str) -> Extraction {
    extract(text, ParseMode::AutoDetect)
}

/// Convert `\r\n` and bare `\r` line endings to `\n`.
fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Accumulates questions for one extraction call, assigning sequential IDs
/// and rejecting candidates which are too short.
///
/// Unless created with [`QuestionSet::allowing_duplicates`], candidates whose
/// [`normalized_key`] has already been seen are dropped.
pub(crate) struct QuestionSet {
    /// Prefix for our IDs.
    prefix: &'static str,

    /// Questions accepted so far.
    questions: Vec<Question>,

    /// Keys of the questions accepted so far, if we're deduplicating.
    seen: Option<HashSet<String>>,
}

impl QuestionSet {
    /// Create a deduplicating set.
    pub(crate) fn new(mode: ParseMode) -> Self {
        Self {
            prefix: mode.id_prefix(),
            questions: vec![],
            seen: Some(HashSet::new()),
        }
    }

    /// Create a set which keeps repeated texts.
    pub(crate) fn allowing_duplicates(mode: ParseMode) -> Self {
        Self {
            seen: None,
            ..Self::new(mode)
        }
    }

    /// Add a candidate. Returns `true` if it was accepted.
    pub(crate) fn push(&mut self, text: impl AsRef<str>) -> bool {
        let text = text.as_ref().trim();
        if char_len(text) <= MIN_QUESTION_LEN {
            return false;
        }
        if let Some(seen) = &mut self.seen {
            if !seen.insert(normalized_key(text)) {
                return false;
            }
        }
        let id = format!("{}-{}", self.prefix, self.questions.len() + 1);
        self.questions.push(Question {
            id,
            text: text.to_owned(),
        });
        true
    }

    /// Have we accepted anything yet?
    pub(crate) fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Return our questions.
    pub(crate) fn into_questions(self) -> Vec<Question> {
        self.questions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(questions: &[Question]) -> Vec<&str> {
        questions.iter().map(|q| q.text.as_str()).collect()
    }

    #[test]
    fn test_parse_mode_names_round_trip() {
        for mode in ParseMode::SCAN_ORDER.into_iter().chain([ParseMode::AutoDetect]) {
            assert_eq!(mode.as_str().parse::<ParseMode>().unwrap(), mode);
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, Value::String(mode.as_str().to_owned()));
        }
        assert!("essay".parse::<ParseMode>().is_err());
    }

    #[test]
    fn test_empty_input_yields_nothing_in_every_mode() {
        for mode in ParseMode::SCAN_ORDER.into_iter().chain([ParseMode::AutoDetect]) {
            assert_eq!(extract("", mode), Extraction::default());
            assert_eq!(extract("  \n\t \r\n ", mode), Extraction::default());
        }
    }

    #[test]
    fn test_question_set_assigns_ids_and_drops_duplicates() {
        let mut set = QuestionSet::new(ParseMode::Ordering);
        assert!(set.push("  Order the following: a, b  "));
        assert!(!set.push("ORDER THE   following: A, B"));
        assert!(!set.push("too short"));
        assert!(set.push("Order the following: c, d"));
        let questions = set.into_questions();
        assert_eq!(questions[0].id, "order-1");
        assert_eq!(questions[0].text, "Order the following: a, b");
        assert_eq!(questions[1].id, "order-2");
    }

    #[test]
    fn test_question_set_can_keep_duplicates() {
        let mut set = QuestionSet::allowing_duplicates(ParseMode::GraphicOrganizer);
        assert!(set.push("Fill in the Capital: ______"));
        assert!(set.push("Fill in the Capital: ______"));
        let ids = set
            .into_questions()
            .into_iter()
            .map(|q| q.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, ["graphic-1", "graphic-2"]);
    }

    #[test]
    fn test_single_mode_reports_detected_type() {
        let extraction = extract("Order: Apple, Banana, Cherry.", ParseMode::Ordering);
        assert_eq!(extraction.detected_types, [ParseMode::Ordering]);
        assert_eq!(
            texts(&extraction.questions),
            ["Order the following: Apple, Banana, Cherry"]
        );

        let extraction = extract("nothing to see here", ParseMode::Ordering);
        assert!(extraction.questions.is_empty());
        assert!(extraction.detected_types.is_empty());
    }

    #[test]
    fn test_windows_line_endings_match_unix() {
        let unix = "A. Seed\nB. Sprout\nC. Flower";
        let windows = "A. Seed\r\nB. Sprout\r\nC. Flower";
        assert_eq!(
            extract(unix, ParseMode::Ordering),
            extract(windows, ParseMode::Ordering)
        );
    }

    #[test]
    fn test_surrounding_whitespace_does_not_matter() {
        let cases = [
            (
                ParseMode::Ordering,
                "Order: Apple, Banana, Cherry.",
                "\n\n   Order: Apple, Banana, Cherry.   \n\n\n",
            ),
            (
                ParseMode::GraphicOrganizer,
                "Country | Capital\nJapan |  ",
                "\n\nCountry | Capital   \nJapan |      \n\n",
            ),
        ];
        for (mode, plain, padded) in cases {
            let extraction = extract(plain, mode);
            assert_eq!(extraction.questions.len(), 1, "{mode}");
            assert_eq!(extraction, extract(padded, mode), "{mode}");
        }
    }

    #[test]
    fn test_auto_detect_is_extract_in_auto_mode() {
        let text = "Put in order: Seed, Sprout, Flower.\nWhat do seeds need to grow?";
        assert_eq!(auto_detect(text), extract(text, ParseMode::AutoDetect));
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "1. What is a cell? 2. What is a tissue?\n\
                    Name | Function\nNucleus |  \nRibosome | makes proteins";
        for mode in ParseMode::SCAN_ORDER.into_iter().chain([ParseMode::AutoDetect]) {
            assert_eq!(extract(text, mode), extract(text, mode));
        }
    }

    #[test]
    fn test_looks_valid() {
        let question = |text: &str| Question {
            id: "q-1".to_owned(),
            text: text.to_owned(),
        };
        assert!(question("Why is the sky blue?").looks_valid());
        assert!(question("Describe the water cycle in detail.").looks_valid());
        assert!(!question("Define osmosis").looks_valid());
        assert!(!question("Why?").looks_valid());
    }
}
