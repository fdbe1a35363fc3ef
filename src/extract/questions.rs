//! Plain questions, numbered or ending in a question mark.

use std::sync::LazyLock;

use regex::Regex;

use crate::prelude::*;

use super::{
    Extractor, ParseMode, Question, QuestionSet,
    layout::collapse_whitespace,
};

/// A question number such as `3.` or `12)`.
static NUMBER_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+[.)]").expect("failed to compile regex"));

/// A question number at the start of a string.
static LEADING_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+[.)]\s*").expect("failed to compile regex"));

/// A capitalized run of text ending in `?`, without intervening sentence
/// terminators.
static CAPITALIZED_QUESTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][^.!?]*\?").expect("failed to compile regex"));

/// The start of each line, up to its first `?`.
static LINE_QUESTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\n]+?\?").expect("failed to compile regex"));

/// One or more blank lines.
static BLANK_LINES_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("failed to compile regex"));

/// Extractor for [`ParseMode::Questions`].
pub struct PlainQuestionExtractor;

impl Extractor for PlainQuestionExtractor {
    fn mode(&self) -> ParseMode {
        ParseMode::Questions
    }

    fn extract(&self, text: &str) -> Vec<Question> {
        let mut questions = QuestionSet::new(self.mode());

        let candidates = numbered_items(text)
            .chain(CAPITALIZED_QUESTION_REGEX.find_iter(text).map(|m| m.as_str()))
            .chain(LINE_QUESTION_REGEX.find_iter(text).map(|m| m.as_str()));
        for candidate in candidates {
            questions.push(clean_candidate(candidate));
        }

        if questions.is_empty() {
            debug!("No question patterns matched, splitting on question marks");
            for block in BLANK_LINES_REGEX.split(text) {
                for fragment in block.split_inclusive('?') {
                    if fragment.contains('?') {
                        questions.push(clean_candidate(fragment));
                    }
                }
            }
        }

        questions.into_questions()
    }
}

/// Find numbered items. Each item starts with a number marker and runs up to
/// the next marker or the end of the text. If a digit which doesn't start a
/// marker gets in the way, the item is ignored.
fn numbered_items(text: &str) -> impl Iterator<Item = &str> + '_ {
    NUMBER_MARKER_REGEX.find_iter(text).filter_map(move |marker| {
        let rest = &text[marker.end()..];
        let body_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let ends_cleanly = body_len == rest.len()
            || LEADING_NUMBER_REGEX.is_match(&rest[body_len..]);
        (body_len > 0 && ends_cleanly)
            .then(|| &text[marker.start()..marker.end() + body_len])
    })
}

/// Trim, strip numbering, and collapse whitespace.
fn clean_candidate(candidate: &str) -> String {
    let candidate = candidate.trim();
    let candidate = LEADING_NUMBER_REGEX.replace(candidate, "");
    collapse_whitespace(&candidate)
}
