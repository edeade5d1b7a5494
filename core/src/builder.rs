//! Two-phase parallel index construction.
//!
//! Phase one tokenizes every document on the scheduler and waits for all of
//! them. Phase two splits the distinct terms into batches and merges each
//! batch's postings into a sharded map, again waiting for every batch before
//! the snapshot is assembled.

use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::Result;
use crate::index::{DocId, IndexSnapshot, Posting};
use crate::scheduler::TaskScheduler;
use crate::source::DocumentSource;
use crate::tokenizer::{build_partial_index, PartialIndex};

/// Merge batches per worker; keeps workers busy when term batches are uneven.
const BATCHES_PER_WORKER: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub documents: usize,
    /// Documents that failed to load and were indexed as empty.
    pub unavailable: usize,
    pub terms: usize,
}

pub struct IndexBuilder {
    scheduler: Arc<TaskScheduler>,
}

impl IndexBuilder {
    pub fn new(scheduler: Arc<TaskScheduler>) -> Self {
        Self { scheduler }
    }

    /// Build a fresh snapshot from `sources`; the doc_id of each source is its
    /// position. Only scheduler errors and failed merge tasks abort the build.
    pub fn build(&self, sources: Vec<DocumentSource>) -> Result<(IndexSnapshot, BuildStats)> {
        let num_docs = sources.len();
        let (partials, unavailable) = self.tokenize_all(sources)?;

        let terms: Vec<String> = partials
            .iter()
            .flat_map(|p| p.counts.keys().cloned())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let num_terms = terms.len();
        tracing::debug!(num_docs, num_terms, "tokenization finished");

        let postings = self.merge_all(terms, Arc::new(partials))?;

        let stats = BuildStats { documents: num_docs, unavailable, terms: num_terms };
        tracing::info!(num_docs, num_terms, unavailable, "index build complete");
        Ok((IndexSnapshot { postings, num_docs: num_docs as u32 }, stats))
    }

    fn tokenize_all(&self, sources: Vec<DocumentSource>) -> Result<(Vec<PartialIndex>, usize)> {
        let handles = sources
            .into_iter()
            .enumerate()
            .map(|(position, source)| {
                let doc_id = position as DocId;
                self.scheduler.submit(move || -> Result<PartialIndex> {
                    let text = source.load(doc_id)?;
                    Ok(build_partial_index(doc_id, &text))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut partials = Vec::with_capacity(handles.len());
        let mut unavailable = 0;
        for (position, handle) in handles.into_iter().enumerate() {
            let doc_id = position as DocId;
            match handle.wait().and_then(|outcome| outcome) {
                Ok(partial) => partials.push(partial),
                Err(err) => {
                    tracing::warn!(doc_id, error = %err, "indexing document as empty");
                    unavailable += 1;
                    partials.push(PartialIndex::empty(doc_id));
                }
            }
        }
        Ok((partials, unavailable))
    }

    fn merge_all(
        &self,
        terms: Vec<String>,
        partials: Arc<Vec<PartialIndex>>,
    ) -> Result<HashMap<String, Vec<Posting>>> {
        if terms.is_empty() {
            return Ok(HashMap::new());
        }

        let merged: Arc<DashMap<String, Vec<Posting>>> =
            Arc::new(DashMap::with_capacity(terms.len()));
        let batches = self.scheduler.worker_count() * BATCHES_PER_WORKER;
        let batch_size = terms.len().div_ceil(batches).max(1);

        let handles = terms
            .chunks(batch_size)
            .map(|batch| {
                let batch = batch.to_vec();
                let partials = Arc::clone(&partials);
                let merged = Arc::clone(&merged);
                self.scheduler.submit(move || merge_terms(&batch, &partials, &merged))
            })
            .collect::<Result<Vec<_>>>()?;

        for handle in handles {
            handle.wait()?;
        }

        let postings = match Arc::try_unwrap(merged) {
            Ok(map) => map.into_iter().collect(),
            Err(shared) => shared
                .iter()
                .map(|entry| (entry.key().clone(), entry.value().clone()))
                .collect(),
        };
        Ok(postings)
    }
}

/// Gather each term's postings from every partial index. Partials are held in
/// doc_id order, so every postings list comes out ascending by doc_id.
fn merge_terms(
    terms: &[String],
    partials: &[PartialIndex],
    merged: &DashMap<String, Vec<Posting>>,
) {
    for term in terms {
        let postings: Vec<Posting> = partials
            .iter()
            .filter_map(|p| p.counts.get(term).map(|&count| Posting { doc_id: p.doc_id, count }))
            .collect();
        merged.insert(term.clone(), postings);
    }
}
