//! Case-insensitive substring filter over a note list.
//!
//! # Invariants
//! - An empty query returns every note in the original order.
//! - Matching never reorders, ranks or mutates notes.
//! - Filtering is idempotent for the same query.

use crate::model::note::Note;

/// Returns notes whose content contains `query`, ignoring case.
///
/// Lowercasing is Unicode-aware, so `"ÁGUA"` matches `"água"`.
pub fn filter_notes<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    if query.is_empty() {
        return notes.iter().collect();
    }

    let needle = query.to_lowercase();
    notes
        .iter()
        .filter(|note| note.content.to_lowercase().contains(needle.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::filter_notes;
    use crate::model::note::Note;
    use chrono::Utc;

    fn notes(contents: &[&str]) -> Vec<Note> {
        contents
            .iter()
            .enumerate()
            .map(|(index, content)| Note::new(format!("n{index}"), Utc::now(), *content))
            .collect()
    }

    fn contents<'a>(hits: &[&'a Note]) -> Vec<&'a str> {
        hits.iter().map(|note| note.content.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_full_list_in_order() {
        let list = notes(&["b", "a", "c"]);
        assert_eq!(contents(&filter_notes(&list, "")), vec!["b", "a", "c"]);
    }

    #[test]
    fn matches_case_insensitively_and_keeps_relative_order() {
        let list = notes(&["Buy MILK", "call mom", "milkshake recipe"]);
        assert_eq!(
            contents(&filter_notes(&list, "mIlK")),
            vec!["Buy MILK", "milkshake recipe"]
        );
    }

    #[test]
    fn whitespace_query_is_matched_literally() {
        let list = notes(&["a b", "ab"]);
        assert_eq!(contents(&filter_notes(&list, " ")), vec!["a b"]);
    }

    #[test]
    fn unicode_lowercase_matching() {
        let list = notes(&["Beber água", "café"]);
        assert_eq!(contents(&filter_notes(&list, "ÁGUA")), vec!["Beber água"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let list = notes(&["alpha", "Alphabet", "beta"]);
        let first = filter_notes(&list, "alp")
            .into_iter()
            .cloned()
            .collect::<Vec<_>>();
        let second = filter_notes(&first, "alp");
        assert_eq!(contents(&second), vec!["alpha", "Alphabet"]);
        assert_eq!(second.len(), first.len());
    }
}
