use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::index::{DocId, IndexSnapshot, InvertedIndex, RelativeIndex};
use crate::tokenizer::tokenize_query;

pub const DEFAULT_MAX_RESPONSES: usize = 5;

/// Answers free-text queries against an [`InvertedIndex`].
///
/// A document matches a query only if it contains every distinct query term.
/// Its score is the sum of those terms' counts, normalized by the best score
/// for the query, so the top hit always has rank 1.0.
pub struct SearchServer {
    index: Arc<InvertedIndex>,
    max_responses: usize,
}

impl SearchServer {
    pub fn new(index: Arc<InvertedIndex>, max_responses: usize) -> Self {
        Self { index, max_responses: max_responses.max(1) }
    }

    pub fn with_default_limit(index: Arc<InvertedIndex>) -> Self {
        Self::new(index, DEFAULT_MAX_RESPONSES)
    }

    pub fn max_responses(&self) -> usize {
        self.max_responses
    }

    /// Values below 1 are clamped to 1.
    pub fn set_max_responses(&mut self, max_responses: usize) {
        self.max_responses = max_responses.max(1);
    }

    /// One ranked result list per query, in query order. All queries of one
    /// call see the same index snapshot.
    pub fn search<S: AsRef<str>>(&self, queries: &[S]) -> Vec<Vec<RelativeIndex>> {
        let snapshot = self.index.snapshot();
        queries
            .iter()
            .map(|q| rank_query(&snapshot, q.as_ref(), self.max_responses))
            .collect()
    }
}

/// Score and rank a single query against `snapshot`.
pub fn rank_query(
    snapshot: &IndexSnapshot,
    query: &str,
    max_responses: usize,
) -> Vec<RelativeIndex> {
    let unique: HashSet<&str> = tokenize_query(query).into_iter().collect();
    if unique.is_empty() {
        return Vec::new();
    }

    // Rarest first keeps the running intersection small.
    let mut terms: Vec<&str> = unique.into_iter().collect();
    terms.sort_by(|a, b| {
        snapshot
            .lookup(a)
            .len()
            .cmp(&snapshot.lookup(b).len())
            .then_with(|| a.cmp(b))
    });

    let rarest = snapshot.lookup(terms[0]);
    if rarest.is_empty() {
        return Vec::new();
    }

    let mut scores: HashMap<DocId, u64> =
        rarest.iter().map(|p| (p.doc_id, p.count as u64)).collect();
    for term in &terms[1..] {
        let counts: HashMap<DocId, u32> =
            snapshot.lookup(term).iter().map(|p| (p.doc_id, p.count)).collect();
        scores.retain(|doc_id, score| match counts.get(doc_id) {
            Some(&count) => {
                *score += count as u64;
                true
            }
            None => false,
        });
        if scores.is_empty() {
            return Vec::new();
        }
    }

    let mut scored: Vec<(DocId, u64)> = scores.into_iter().collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.truncate(max_responses.max(1));

    let max_score = scored[0].1 as f32;
    scored
        .into_iter()
        .map(|(doc_id, score)| RelativeIndex { doc_id, rank: score as f32 / max_score })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::TaskScheduler;

    fn server(docs: &[&str]) -> SearchServer {
        let index = InvertedIndex::with_scheduler(Arc::new(TaskScheduler::new(2).unwrap()));
        index.update_document_base_from_strings(docs.iter().copied()).unwrap();
        SearchServer::with_default_limit(Arc::new(index))
    }

    #[test]
    fn and_semantics_across_terms() {
        let s = server(&["milk sugar", "milk", "sugar milk milk"]);
        let res = s.search(&["milk sugar"]);
        assert_eq!(
            res,
            vec![vec![
                RelativeIndex { doc_id: 2, rank: 1.0 },
                RelativeIndex { doc_id: 0, rank: 2.0 / 3.0 },
            ]]
        );
    }

    #[test]
    fn disjoint_terms_yield_nothing() {
        let s = server(&["milk", "sugar"]);
        assert_eq!(s.search(&["milk sugar"]), vec![Vec::<RelativeIndex>::new()]);
    }

    #[test]
    fn ties_break_by_doc_id() {
        let s = server(&["b a", "a b", "a"]);
        let ids: Vec<DocId> = s.search(&["a"])[0].iter().map(|r| r.doc_id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn limit_is_clamped_to_one() {
        let mut s = server(&["a", "a"]);
        s.set_max_responses(0);
        assert_eq!(s.max_responses(), 1);
        assert_eq!(s.search(&["a"])[0].len(), 1);
    }
}
