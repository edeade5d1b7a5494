use std::fs;
use std::path::PathBuf;

use crate::error::{Result, SearchError};
use crate::DocId;

/// Where a document's text comes from. The doc_id is the source's position
/// in the batch handed to the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Text(String),
    File(PathBuf),
}

impl DocumentSource {
    pub fn load(&self, doc_id: DocId) -> Result<String> {
        match self {
            DocumentSource::Text(text) => Ok(text.clone()),
            DocumentSource::File(path) => {
                fs::read_to_string(path).map_err(|source| SearchError::SourceUnavailable {
                    doc_id,
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl From<String> for DocumentSource {
    fn from(text: String) -> Self {
        DocumentSource::Text(text)
    }
}

impl From<&str> for DocumentSource {
    fn from(text: &str) -> Self {
        DocumentSource::Text(text.to_string())
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::File(path)
    }
}
