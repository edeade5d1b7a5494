use std::collections::HashMap;

use crate::DocId;

pub const MAX_TERM_LEN: usize = 100;

/// Term counts for a single document, produced before the merge phase.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialIndex {
    pub doc_id: DocId,
    pub counts: HashMap<String, u32>,
}

impl PartialIndex {
    pub fn empty(doc_id: DocId) -> Self {
        Self { doc_id, counts: HashMap::new() }
    }
}

/// Split on ASCII whitespace (space, tab, newline, vertical tab, form feed,
/// carriage return). Other separators such as U+00A0 stay inside the token.
fn split_ascii_space(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| c.is_ascii_whitespace() || c == '\x0b')
        .filter(|raw| !raw.is_empty())
}

/// Strip every character that is not an ASCII letter or digit from a raw
/// token and accept the result only if it is 1..=100 ASCII letters. Non-ASCII
/// characters count as punctuation, so `café` becomes `caf`. Case is kept.
pub fn normalize_token(raw: &str) -> Option<String> {
    let stripped: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    if stripped.is_empty() || stripped.len() > MAX_TERM_LEN {
        return None;
    }
    if !stripped.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(stripped)
}

fn terms(text: &str) -> impl Iterator<Item = String> + '_ {
    split_ascii_space(text).filter_map(normalize_token)
}

/// Accepted index terms of `text`, in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    terms(text).collect()
}

/// Count the accepted terms of one document.
pub fn build_partial_index(doc_id: DocId, text: &str) -> PartialIndex {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for term in terms(text) {
        *counts.entry(term).or_insert(0) += 1;
    }
    PartialIndex { doc_id, counts }
}

/// Query terms are split on ASCII whitespace and nothing else; a term
/// carrying punctuation is looked up as written.
pub fn tokenize_query(query: &str) -> Vec<&str> {
    split_ascii_space(query).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("Milk, sugar! (salt)");
        assert_eq!(t, vec!["Milk", "sugar", "salt"]);
    }

    #[test]
    fn digits_reject_the_whole_token() {
        assert_eq!(normalize_token("abc123"), None);
        assert_eq!(normalize_token("2024"), None);
        assert_eq!(normalize_token("--"), None);
        assert_eq!(normalize_token("don't"), Some("dont".to_string()));
    }

    #[test]
    fn length_limit_is_inclusive() {
        let ok = "a".repeat(MAX_TERM_LEN);
        let too_long = "a".repeat(MAX_TERM_LEN + 1);
        assert_eq!(normalize_token(&ok), Some(ok.clone()));
        assert_eq!(normalize_token(&too_long), None);
    }

    #[test]
    fn query_keeps_punctuation() {
        assert_eq!(tokenize_query("  milk, sugar\tsalt "), vec!["milk,", "sugar", "salt"]);
        assert!(tokenize_query("").is_empty());
    }

    #[test]
    fn non_ascii_is_punctuation() {
        assert_eq!(normalize_token("café"), Some("caf".to_string()));
        assert_eq!(normalize_token("привет"), None);
        assert_eq!(tokenize("milk\u{a0}sugar\u{b}salt"), vec!["milksugar", "salt"]);
        assert_eq!(tokenize_query("milk\u{a0}sugar salt"), vec!["milk\u{a0}sugar", "salt"]);
    }
}
