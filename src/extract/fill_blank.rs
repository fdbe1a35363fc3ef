//! Fill-in-the-blank generation.

use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;

use super::{
    BLANK, Extractor, ParseMode, Question, QuestionSet,
    layout::char_len,
    sentences::split_sentences,
};

/// Words which make poor blanks: articles, conjunctions, common prepositions,
/// auxiliaries, demonstratives and pronouns.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
        "with", "by", "from", "as", "is", "are", "was", "were", "be", "been", "being",
        "have", "has", "had", "do", "does", "did", "will", "would", "could", "should",
        "may", "might", "this", "that", "these", "those", "it", "its", "they", "them",
        "their",
    ]
    .into_iter()
    .collect()
});

/// Words, or single punctuation marks.
static TOKEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+|[^\w\s]").expect("failed to compile regex"));

/// Sentences this short are skipped entirely.
const MIN_SENTENCE_LEN: usize = 10;

/// Turn a sentence into a fill-in-the-blank prompt by replacing one word
/// with [`BLANK`].
///
/// We pick the first reasonably long, non-stop-word token between 20% and
/// 80% of the way through the sentence. Failing that, we take the middle
/// token, and for very short sentences we just split the text in half.
pub fn create_fill_in_the_blank(sentence: &str) -> String {
    let mut cleaned = sentence.trim().to_owned();
    if !cleaned.ends_with(|c: char| matches!(c, '.' | '!' | '?')) {
        cleaned.push('.');
    }

    let mut tokens = TOKEN_REGEX
        .find_iter(&cleaned)
        .map(|m| m.as_str())
        .collect::<Vec<_>>();
    match choose_blank_index(&tokens) {
        Some(idx) => {
            tokens[idx] = BLANK;
            tokens.join(" ")
        }
        None => insert_blank_at_midpoint(&cleaned),
    }
}

/// Choose which token to blank out, if any.
fn choose_blank_index(tokens: &[&str]) -> Option<usize> {
    let len = tokens.len();
    let start = (len / 5).max(2);
    let end = (len * 4 / 5).min(len.saturating_sub(2));
    (start..end)
        .find(|&idx| is_blank_candidate(tokens[idx]))
        .or_else(|| (len > 4).then_some(len / 2))
}

/// Is this token worth blanking out?
fn is_blank_candidate(token: &str) -> bool {
    char_len(token) > 3
        && token.chars().all(char::is_alphabetic)
        && !STOP_WORDS.contains(token.to_lowercase().as_str())
}

/// Insert a blank halfway through the text, ignoring word boundaries.
fn insert_blank_at_midpoint(text: &str) -> String {
    let mid = char_len(text) / 2;
    let split_at = text
        .char_indices()
        .nth(mid)
        .map_or(text.len(), |(idx, _)| idx);
    format!("{} {}{}", &text[..split_at], BLANK, &text[split_at..])
}

/// Extractor for [`ParseMode::FillInTheBlank`].
pub struct FillInTheBlankExtractor;

impl Extractor for FillInTheBlankExtractor {
    fn mode(&self) -> ParseMode {
        ParseMode::FillInTheBlank
    }

    fn extract(&self, text: &str) -> Vec<Question> {
        let mut questions = QuestionSet::new(self.mode());
        for sentence in split_sentences(text) {
            if char_len(sentence) > MIN_SENTENCE_LEN {
                questions.push(create_fill_in_the_blank(sentence));
            }
        }
        questions.into_questions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_replaces_first_candidate_word() {
        let blanked =
            create_fill_in_the_blank("The mitochondria is the powerhouse of the cell.");
        assert_eq!(blanked, "The mitochondria is the ______ of the cell .");
        assert_eq!(blanked.matches(BLANK).count(), 1);
    }

    #[test]
    fn test_blank_prefers_first_not_longest() {
        // "green" comes before "photosynthesis" in the scan window.
        let blanked = create_fill_in_the_blank(
            "Most of the green leaves use photosynthesis to make sugar",
        );
        assert_eq!(
            blanked,
            "Most of the ______ leaves use photosynthesis to make sugar ."
        );
    }

    #[test]
    fn test_blank_falls_back_to_middle_token() {
        // Every word in the window is a stop word or too short.
        let blanked = create_fill_in_the_blank("It is to be or not to be, ok?");
        let tokens = ["It", "is", "to", "be", "or", "not", "to", "be", ",", "ok", "?"];
        let mut expected = tokens.to_vec();
        expected[tokens.len() / 2] = BLANK;
        assert_eq!(blanked, expected.join(" "));
    }

    #[test]
    fn test_blank_short_sentence_uses_character_midpoint() {
        assert_eq!(
            create_fill_in_the_blank("Photosynthesis matters"),
            "Photosynthe ______sis matters."
        );
    }

    #[test]
    fn test_blank_handles_non_ascii_midpoint() {
        let blanked = create_fill_in_the_blank("Éléphants mangent");
        assert_eq!(blanked.matches(BLANK).count(), 1);
        assert!(blanked.ends_with('.'));
    }

    #[test]
    fn test_extractor_skips_short_sentences() {
        let questions = FillInTheBlankExtractor
            .extract("Short one. Plants convert sunlight into chemical energy.");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "fill-1");
        assert!(questions[0].text.contains(BLANK));
        assert!(questions[0].text.starts_with("Plants convert"));
    }

    #[test]
    fn test_extractor_emits_repeated_sentence_once() {
        let questions = FillInTheBlankExtractor
            .extract("Plants need sunlight to grow. Plants need sunlight to grow.");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "fill-1");
        assert_eq!(questions[0].text, "Plants need ______ to grow .");
    }
}
