//! Matching tasks, such as "Match: cat - animal, rose - flower".

use std::sync::LazyLock;

use regex::Regex;

use super::{
    Extractor, ParseMode, Question, QuestionSet,
    layout::{char_len, line_runs, split_items},
};

/// A matching cue phrase, followed by a colon and a list of pairs.
static CUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:match|connect|pair).*?:\s*([^.!?\n]+)")
        .expect("failed to compile regex")
});

/// A `left - right`, `left = right` or `left: right` pair.
static PAIR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*[-=:]\s*(.+)$").expect("failed to compile regex")
});

/// Cue lists this short are ignored.
const MIN_CUE_LIST_LEN: usize = 5;

/// Unpaired segments this short are dropped.
const MIN_UNPAIRED_LEN: usize = 3;

/// Extractor for [`ParseMode::Matching`].
pub struct MatchingExtractor;

impl Extractor for MatchingExtractor {
    fn mode(&self) -> ParseMode {
        ParseMode::Matching
    }

    fn extract(&self, text: &str) -> Vec<Question> {
        let mut questions = QuestionSet::new(self.mode());

        for caps in CUE_REGEX.captures_iter(text) {
            let list = caps[1].trim();
            if char_len(list) <= MIN_CUE_LIST_LEN {
                continue;
            }
            let pairs = split_items(list)
                .into_iter()
                .filter_map(|segment| match PAIR_REGEX.captures(segment) {
                    Some(pair) => Some(format!("{} - {}", pair[1].trim(), pair[2].trim())),
                    None if char_len(segment) > MIN_UNPAIRED_LEN => Some(segment.to_owned()),
                    None => None,
                })
                .collect::<Vec<_>>();
            push_matching_task(&mut questions, &pairs);
        }

        for run in line_runs(text, 2, is_two_column_row) {
            let rows = run
                .into_iter()
                .map(|row| match row.split_once('|') {
                    Some((left, right))
                        if !left.trim().is_empty() && !right.trim().is_empty() =>
                    {
                        format!("{} - {}", left.trim(), right.trim())
                    }
                    _ => row.trim().to_owned(),
                })
                .filter(|row| !row.is_empty())
                .collect::<Vec<_>>();
            push_matching_task(&mut questions, &rows);
        }

        questions.into_questions()
    }
}

/// Is this a `left | right` row, with exactly one separator and something on
/// both sides of it?
fn is_two_column_row(line: &str) -> bool {
    line.matches('|').count() == 1
        && line
            .split_once('|')
            .is_some_and(|(left, right)| !left.is_empty() && !right.is_empty())
}

/// Emit a matching task if we have enough pairs.
fn push_matching_task(questions: &mut QuestionSet, pairs: &[String]) {
    if pairs.len() >= 2 {
        questions.push(format!("Match the following: {}", pairs.join(", ")));
    }
}
