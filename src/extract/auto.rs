//! Auto-detection: run every extractor and merge the results.

use crate::prelude::*;

use super::{Extraction, ParseMode, QuestionSet, extractor_for_mode};

/// Run each extractor in [`ParseMode::SCAN_ORDER`], recording which ones
/// found something, and merge their questions. A text seen under an earlier
/// mode suppresses the same text from a later one.
pub(super) fn merge_all_modes(text: &str) -> Extraction {
    let mut merged = QuestionSet::new(ParseMode::AutoDetect);
    let mut detected_types = vec![];
    for mode in ParseMode::SCAN_ORDER {
        let Some(extractor) = extractor_for_mode(mode) else {
            continue;
        };
        let questions = extractor.extract(text);
        trace!(%mode, count = questions.len(), "Ran extractor");
        if questions.is_empty() {
            continue;
        }
        detected_types.push(mode);
        for question in questions {
            merged.push(&question.text);
        }
    }
    Extraction {
        questions: merged.into_questions(),
        detected_types,
    }
}
