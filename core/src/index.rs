use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::{BuildStats, IndexBuilder};
use crate::error::Result;
use crate::scheduler::TaskScheduler;
use crate::source::DocumentSource;

pub type DocId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub count: u32,
}

/// One ranked search hit; `rank` is in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeIndex {
    pub doc_id: DocId,
    pub rank: f32,
}

/// An immutable, fully built postings map.
#[derive(Debug, Default)]
pub struct IndexSnapshot {
    pub(crate) postings: HashMap<String, Vec<Posting>>, // postings sorted by doc_id
    pub(crate) num_docs: u32,
}

impl IndexSnapshot {
    pub fn lookup(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_docs(&self) -> u32 {
        self.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }
}

/// Inverted index over the current document batch.
///
/// Readers work on an `Arc<IndexSnapshot>`. A rebuild constructs a new
/// snapshot on the side and swaps it in, so a query never observes a
/// half-built index. Rebuilds are serialized with each other.
pub struct InvertedIndex {
    current: RwLock<Arc<IndexSnapshot>>,
    rebuild: Mutex<()>,
    builder: IndexBuilder,
}

impl InvertedIndex {
    /// Empty index backed by a scheduler with one worker per hardware thread.
    pub fn new() -> Result<Self> {
        Ok(Self::with_scheduler(Arc::new(TaskScheduler::with_default_workers()?)))
    }

    pub fn with_scheduler(scheduler: Arc<TaskScheduler>) -> Self {
        Self {
            current: RwLock::new(Arc::new(IndexSnapshot::default())),
            rebuild: Mutex::new(()),
            builder: IndexBuilder::new(scheduler),
        }
    }

    /// Replace the whole index with one built from `sources`. Sources that
    /// fail to load are indexed as empty documents. On error the previous
    /// index stays in place.
    pub fn update_document_base<I>(&self, sources: I) -> Result<BuildStats>
    where
        I: IntoIterator,
        I::Item: Into<DocumentSource>,
    {
        let sources: Vec<DocumentSource> = sources.into_iter().map(Into::into).collect();
        let _guard = self.rebuild.lock();
        let (snapshot, stats) = self.builder.build(sources)?;
        *self.current.write() = Arc::new(snapshot);
        Ok(stats)
    }

    pub fn update_document_base_from_strings<I, S>(&self, docs: I) -> Result<BuildStats>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.update_document_base(docs.into_iter().map(|d| DocumentSource::Text(d.into())))
    }

    /// Postings for `term`, ascending by doc_id; empty if the term is unknown.
    pub fn lookup(&self, term: &str) -> Vec<Posting> {
        self.current.read().lookup(term).to_vec()
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    pub fn document_count(&self) -> u32 {
        self.current.read().num_docs
    }

    pub fn term_count(&self) -> usize {
        self.current.read().num_terms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> InvertedIndex {
        InvertedIndex::with_scheduler(Arc::new(TaskScheduler::new(2).unwrap()))
    }

    #[test]
    fn starts_empty() {
        let idx = index();
        assert!(idx.lookup("anything").is_empty());
        assert_eq!(idx.document_count(), 0);
        assert_eq!(idx.term_count(), 0);
    }

    #[test]
    fn default_scheduler_builds() {
        let idx = InvertedIndex::new().unwrap();
        idx.update_document_base_from_strings(["alpha alpha", "alpha"]).unwrap();
        assert_eq!(
            idx.lookup("alpha"),
            vec![Posting { doc_id: 0, count: 2 }, Posting { doc_id: 1, count: 1 }]
        );
    }

    #[test]
    fn rebuild_discards_previous_terms() {
        let idx = index();
        idx.update_document_base_from_strings(["alpha beta"]).unwrap();
        assert_eq!(idx.lookup("alpha"), vec![Posting { doc_id: 0, count: 1 }]);

        idx.update_document_base_from_strings(["gamma", "gamma gamma"]).unwrap();
        assert!(idx.lookup("alpha").is_empty());
        assert_eq!(
            idx.lookup("gamma"),
            vec![Posting { doc_id: 0, count: 1 }, Posting { doc_id: 1, count: 2 }]
        );
        assert_eq!(idx.document_count(), 2);
    }

    #[test]
    fn old_snapshot_survives_rebuild() {
        let idx = index();
        idx.update_document_base_from_strings(["alpha"]).unwrap();
        let before = idx.snapshot();
        idx.update_document_base_from_strings(["beta"]).unwrap();
        assert_eq!(before.lookup("alpha").len(), 1);
        assert!(idx.snapshot().lookup("alpha").is_empty());
    }

    #[test]
    fn failed_build_keeps_published_index() {
        let scheduler = Arc::new(TaskScheduler::new(1).unwrap());
        let idx = InvertedIndex::with_scheduler(Arc::clone(&scheduler));
        idx.update_document_base_from_strings(["alpha"]).unwrap();

        scheduler.shutdown();
        assert!(idx.update_document_base_from_strings(["beta"]).is_err());
        assert_eq!(idx.lookup("alpha").len(), 1);
    }
}
