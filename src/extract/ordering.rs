//! Ordering tasks, such as "Put in order: seed, sprout, flower".

use std::sync::LazyLock;

use regex::Regex;

use super::{
    Extractor, ParseMode, Question, QuestionSet,
    layout::{char_len, line_runs, split_items},
};

/// Cue phrases followed by a colon and a list. The captured list runs up to
/// the next sentence terminator or line break.
static CUE_REGEXES: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        r"(?i)(?:order|arrange|put|sequence|sort).*?:\s*([^.!?\n]+)",
        r"(?i)(?:in\s+order|chronological|sequence).*?:\s*([^.!?\n]+)",
    ]
    .map(|pattern| Regex::new(pattern).expect("failed to compile regex"))
});

/// A line such as `B. Caterpillar`.
static LETTERED_LINE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[A-Z]\.\s*(\S.*?)\s*$").expect("failed to compile regex")
});

/// Cue lists this short are ignored.
const MIN_CUE_LIST_LEN: usize = 5;

/// Extractor for [`ParseMode::Ordering`].
pub struct OrderingExtractor;

impl Extractor for OrderingExtractor {
    fn mode(&self) -> ParseMode {
        ParseMode::Ordering
    }

    fn extract(&self, text: &str) -> Vec<Question> {
        let mut questions = QuestionSet::new(self.mode());

        for regex in CUE_REGEXES.iter() {
            for caps in regex.captures_iter(text) {
                let list = caps[1].trim();
                if char_len(list) > MIN_CUE_LIST_LEN {
                    push_ordering_task(&mut questions, &split_items(list));
                }
            }
        }

        for run in line_runs(text, 2, |line| lettered_item(line).is_some()) {
            let items = run
                .into_iter()
                .filter_map(lettered_item)
                .collect::<Vec<_>>();
            push_ordering_task(&mut questions, &items);
        }

        questions.into_questions()
    }
}

/// Strip the letter prefix from a lettered list line.
fn lettered_item(line: &str) -> Option<&str> {
    LETTERED_LINE_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Emit an ordering task if we have enough items to order.
fn push_ordering_task(questions: &mut QuestionSet, items: &[&str]) {
    if items.len() >= 2 {
        questions.push(format!("Order the following: {}", items.join(", ")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str) -> Vec<String> {
        OrderingExtractor
            .extract(text)
            .into_iter()
            .map(|q| q.text)
            .collect()
    }

    #[test]
    fn test_order_cue() {
        assert_eq!(
            texts("Order: Apple, Banana, Cherry."),
            ["Order the following: Apple, Banana, Cherry"]
        );
    }

    #[test]
    fn test_cue_matched_by_both_passes_is_emitted_once() {
        let questions = OrderingExtractor.extract("Put in order: egg; larva; pupa; adult");
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "order-1");
        assert_eq!(questions[0].text, "Order the following: egg, larva, pupa, adult");
    }

    #[test]
    fn test_chronological_cue() {
        assert_eq!(
            texts("List these events in chronological sequence:\n1776, 1812, 1865"),
            ["Order the following: 1776, 1812, 1865"]
        );
    }

    #[test]
    fn test_single_item_is_skipped() {
        assert!(texts("Arrange: everything").is_empty());
        assert!(texts("Sort: a, b").is_empty());
    }

    #[test]
    fn test_lettered_list() {
        let text = "Life cycle\nA. Egg\nB. Caterpillar\nC.   Butterfly  \nThe end";
        assert_eq!(texts(text), ["Order the following: Egg, Caterpillar, Butterfly"]);
    }

    #[test]
    fn test_cue_results_come_before_lettered_lists() {
        let text = "A. Wake up\nB. Eat breakfast\nSequence: dawn, noon, dusk";
        let questions = OrderingExtractor.extract(text);
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].id, "order-1");
        assert_eq!(questions[0].text, "Order the following: dawn, noon, dusk");
        assert_eq!(questions[1].id, "order-2");
        assert_eq!(questions[1].text, "Order the following: Wake up, Eat breakfast");
    }
}
