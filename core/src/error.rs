//! Error type shared by the index, scheduler and JSON collaborators.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::DocId;

#[derive(Error, Debug)]
pub enum SearchError {
    /// A document could not be loaded. The builder absorbs this and indexes
    /// the document as empty.
    #[error("document {doc_id} unavailable ({}): {source}", .path.display())]
    SourceUnavailable {
        doc_id: DocId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Work was submitted after the scheduler was shut down.
    #[error("scheduler is closed")]
    SchedulerClosed,

    /// A unit of work panicked or its worker went away before reporting.
    #[error("task failed: {0}")]
    TaskFailed(String),

    #[error("{0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl SearchError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SearchError::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
