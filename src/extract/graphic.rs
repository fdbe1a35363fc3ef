//! Graphic organizers: tables, labeled categories, bullet hierarchies and
//! concept-map style connections.
//!
//! Each organizer is turned into fill-in-the-blank prompts. The four
//! detectors run independently, and their output is concatenated without
//! deduplication, so the same fragment may produce overlapping prompts (for
//! example, `Mammals: dog, cat` is both a labeled category and a
//! connection). Auto-detection removes exact duplicates when merging.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::{
    BLANK, Extractor, ParseMode, Question, QuestionSet,
    layout::{
        char_len, has_border_pipes, is_separator_row, leading_indent, line_runs,
        split_cells, split_items, strip_border_pipes,
    },
};

/// `Category: item, item, item`.
static LABELED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([A-Z][^:\n]+):\s*([^\n.!?]+)").expect("failed to compile regex")
});

/// An item which is really just a placeholder: one lowercase word, or a
/// single capital letter.
static PLACEHOLDER_ITEM_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-z]+|[A-Z])$").expect("failed to compile regex")
});

/// A bullet line, capturing indentation and content.
static BULLET_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)[-•*]\s*(\S.*?)\s*$").expect("failed to compile regex")
});

/// The first word of a bullet item.
static FIRST_WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("failed to compile regex"));

/// `left SEP right` on a single line. The left side is as short as possible,
/// so the first workable separator wins.
static CONNECTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)([A-Za-z][^\n]+?)[ \t]*[-=:>→][ \t]*([A-Za-z][^\n]+?)[ \t]*$")
        .expect("failed to compile regex")
});

/// Separator characters for [`CONNECTION_REGEX`].
const CONNECTION_SEPARATORS: &[char] = &['-', '=', ':', '>', '→'];

/// Table cells shorter than this are gaps to fill in.
const MIN_FILLED_CELL_LEN: usize = 3;

/// Cells, items and bullet entries must be longer than this to be used as
/// content.
const MIN_CONTENT_LEN: usize = 3;

/// Labeled items shorter than this are treated as placeholders.
const MIN_LABELED_ITEM_LEN: usize = 5;

/// Bullets indented this much or less are category headings.
const MAX_CATEGORY_INDENT: usize = 2;

/// Connection sides must be longer than this.
const MIN_CONNECTION_SIDE_LEN: usize = 2;

/// Extractor for [`ParseMode::GraphicOrganizer`].
pub struct GraphicOrganizerExtractor;

impl Extractor for GraphicOrganizerExtractor {
    fn mode(&self) -> ParseMode {
        ParseMode::GraphicOrganizer
    }

    fn extract(&self, text: &str) -> Vec<Question> {
        let mut questions = QuestionSet::allowing_duplicates(self.mode());
        push_table_questions(text, &mut questions);
        push_labeled_questions(text, &mut questions);
        push_bullet_questions(text, &mut questions);
        push_connection_questions(text, &mut questions);
        questions.into_questions()
    }
}

/// Does this line contain a `|` with something on both sides of it?
fn is_table_row(line: &str) -> bool {
    line.char_indices()
        .any(|(idx, c)| c == '|' && idx > 0 && idx + 1 < line.len())
}

/// Strip border pipes from a row, if the table uses them.
fn unborder(row: &str, bordered: bool) -> &str {
    if bordered { strip_border_pipes(row) } else { row }
}

/// Ask for every gap in every pipe table.
fn push_table_questions(text: &str, questions: &mut QuestionSet) {
    for rows in line_runs(text, 2, is_table_row) {
        let bordered = has_border_pipes(rows[0]);
        let headers = split_cells(unborder(rows[0], bordered))
            .into_iter()
            .filter(|header| !header.is_empty())
            .collect::<Vec<_>>();

        for &row in &rows[1..] {
            if is_separator_row(row) {
                continue;
            }
            let cells = split_cells(unborder(row, bordered));
            for (gap_idx, (header, cell)) in headers.iter().zip(&cells).enumerate() {
                if char_len(cell) >= MIN_FILLED_CELL_LEN {
                    continue;
                }
                let context = headers
                    .iter()
                    .zip(&cells)
                    .enumerate()
                    .filter(|&(idx, (_, cell))| {
                        idx != gap_idx && char_len(cell) > MIN_CONTENT_LEN
                    })
                    .map(|(_, (header, cell))| format!("{header}: {cell}"))
                    .collect::<Vec<_>>();
                if context.is_empty() {
                    questions.push(format!("Fill in the {header}: {BLANK}"));
                } else {
                    questions.push(format!(
                        "In the {header} row, given {}, fill in: {header} = {BLANK}",
                        context.join(", ")
                    ));
                }
            }
        }
    }
}

/// Ask about each item listed under a `Category:` label.
fn push_labeled_questions(text: &str, questions: &mut QuestionSet) {
    for caps in LABELED_REGEX.captures_iter(text) {
        let category = caps[1].trim();
        for item in split_items(&caps[2]) {
            if char_len(item) < MIN_LABELED_ITEM_LEN || PLACEHOLDER_ITEM_REGEX.is_match(item)
            {
                questions.push(format!("Under {category}, fill in: {BLANK}"));
            } else {
                questions.push(format!("{category}: {item} (complete or identify)"));
            }
        }
    }
}

/// Blank out the first word of each nested bullet in a bullet hierarchy.
fn push_bullet_questions(text: &str, questions: &mut QuestionSet) {
    for run in line_runs(text, 2, |line| BULLET_REGEX.is_match(line)) {
        let mut category = None;
        for line in run {
            let Some(caps) = BULLET_REGEX.captures(line) else {
                continue;
            };
            let content = caps.get(2).map_or("", |m| m.as_str());
            if leading_indent(&caps[1]) <= MAX_CATEGORY_INDENT {
                category = Some(content);
                continue;
            }
            if char_len(content) <= MIN_CONTENT_LEN {
                continue;
            }
            let blanked = FIRST_WORD_REGEX.replace(content, NoExpand(BLANK));
            match category {
                Some(category) => {
                    questions.push(format!("Complete: {category} - {blanked}"))
                }
                None => questions.push(format!("Fill in: {blanked}")),
            };
        }
    }
}

/// Ask for each side of every `left -> right` style connection.
fn push_connection_questions(text: &str, questions: &mut QuestionSet) {
    let trim_side = |side: &str| {
        side.trim_matches(|c: char| c.is_whitespace() || CONNECTION_SEPARATORS.contains(&c))
            .to_owned()
    };
    for caps in CONNECTION_REGEX.captures_iter(text) {
        let left = trim_side(&caps[1]);
        let right = trim_side(&caps[2]);
        if char_len(&left) > MIN_CONNECTION_SIDE_LEN && char_len(&right) > MIN_CONNECTION_SIDE_LEN
        {
            questions.push(format!("Complete the connection: {left} → {BLANK}"));
            questions.push(format!("Complete the connection: {BLANK} → {right}"));
        }
    }
}
