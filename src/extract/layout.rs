//! Line, row, cell and item tokenizers shared by the structural extractors.
//!
//! Ordering, matching and graphic-organizer detection all come down to
//! "find a run of lines with some shape, split each line into cells, and
//! compare what we got". These helpers do the splitting.

use std::sync::LazyLock;

use regex::Regex;

/// Separators between list items: commas, semicolons, or line breaks.
static ITEM_SEPARATOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;]\s*|\n").expect("failed to compile regex"));

/// Length in characters, not bytes.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Collapse every whitespace run to a single space, and trim.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The key we use to decide whether two question texts are duplicates.
///
/// Besides trimming and lowercasing, this collapses every internal run of
/// whitespace to a single space, so `"What  is"` and `"what is"` are the
/// same question.
pub fn normalized_key(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

/// Split a list such as `"Apple, Banana; Cherry"` into trimmed, non-empty
/// items.
pub fn split_items(list: &str) -> Vec<&str> {
    ITEM_SEPARATOR_REGEX
        .split(list)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Find runs of at least `min_len` consecutive lines which all satisfy
/// `is_member`.
pub fn line_runs<'a, F>(text: &'a str, min_len: usize, mut is_member: F) -> Vec<Vec<&'a str>>
where
    F: FnMut(&str) -> bool,
{
    let mut runs = vec![];
    let mut current = vec![];
    for line in text.split('\n') {
        if is_member(line) {
            current.push(line);
        } else if !current.is_empty() {
            let run = std::mem::take(&mut current);
            if run.len() >= min_len {
                runs.push(run);
            }
        }
    }
    if current.len() >= min_len {
        runs.push(current);
    }
    runs
}

/// Split a table row on `|`, trimming each cell. Empty cells are kept, so
/// that column positions line up.
pub fn split_cells(row: &str) -> Vec<&str> {
    row.split('|').map(str::trim).collect()
}

/// Does this row use border pipes, as in `| a | b |`?
pub fn has_border_pipes(row: &str) -> bool {
    let row = row.trim();
    row.len() > 1 && row.starts_with('|') && row.ends_with('|')
}

/// Remove one pair of border pipes from a row, if present.
pub fn strip_border_pipes(row: &str) -> &str {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    row.strip_suffix('|').unwrap_or(row)
}

/// Is this a markdown header separator such as `|---|:---:|`?
pub fn is_separator_row(row: &str) -> bool {
    row.contains('-')
        && row
            .chars()
            .all(|c| matches!(c, '|' | '-' | ':' | '+' | '=') || c.is_whitespace())
}

/// Indentation width of a line. Tabs count as four columns.
pub fn leading_indent(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}
