//! Sentence splitting.

use std::{iter, sync::LazyLock};

use regex::Regex;

/// Terminal punctuation followed by whitespace.
static SENTENCE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("failed to compile regex"));

/// Split text into trimmed, non-empty sentences. Terminal punctuation stays
/// with the sentence it ends.
pub fn split_sentences(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut start = 0;
    SENTENCE_BREAK_REGEX
        .find_iter(text)
        // The punctuation mark is a single byte, so the sentence ends just
        // after the start of the match.
        .map(|m| (m.start() + 1, m.end()))
        .chain(iter::once((text.len(), text.len())))
        .map(move |(end, next_start)| {
            let sentence = &text[start..end];
            start = next_start;
            sentence.trim()
        })
        .filter(|sentence| !sentence.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<&str> {
        split_sentences(text).collect()
    }

    #[test]
    fn test_split_keeps_punctuation() {
        assert_eq!(
            split("Plants need light. Do animals?  Yes!\nThe end."),
            ["Plants need light.", "Do animals?", "Yes!", "The end."]
        );
    }

    #[test]
    fn test_split_without_terminal_punctuation() {
        assert_eq!(split("  no punctuation here  "), ["no punctuation here"]);
        assert_eq!(split("3.14 is pi"), ["3.14 is pi"]);
    }

    #[test]
    fn test_split_empty() {
        assert!(split("").is_empty());
        assert!(split(" \n ").is_empty());
        assert_eq!(split("Hi. "), ["Hi."]);
    }
}
