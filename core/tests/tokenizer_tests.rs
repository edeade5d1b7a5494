use searchcore::tokenizer::{build_partial_index, tokenize, tokenize_query};

#[test]
fn it_strips_punctuation_and_keeps_case() {
    let words = tokenize("Running, runner's RUN! The cafe's menu.");
    assert_eq!(words, vec!["Running", "runners", "RUN", "The", "cafes", "menu"]);
}

#[test]
fn it_rejects_tokens_with_digits() {
    let words = tokenize("version 2 of r2d2 shipped in 1999");
    assert_eq!(words, vec!["version", "of", "shipped", "in"]);
}

#[test]
fn it_counts_terms_per_document() {
    let partial = build_partial_index(7, "milk a milk b milk c milk d");
    assert_eq!(partial.doc_id, 7);
    assert_eq!(partial.counts.get("milk"), Some(&4));
    assert_eq!(partial.counts.get("a"), Some(&1));
    assert_eq!(partial.counts.len(), 5);
}

#[test]
fn it_strips_non_ascii_bytes() {
    let words = tokenize("café naïve «привет»");
    assert_eq!(words, vec!["caf", "nave"]);
}

#[test]
fn it_splits_on_ascii_whitespace_only() {
    let words = tokenize("milk\u{a0}sugar\tsalt\r\npepper");
    assert_eq!(words, vec!["milksugar", "salt", "pepper"]);
}

#[test]
fn query_tokens_are_not_filtered() {
    assert_eq!(tokenize_query("Milk, 2 sugar"), vec!["Milk,", "2", "sugar"]);
}
