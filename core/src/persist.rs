//! JSON files around the engine: `config.json` (documents and limits),
//! `requests.json` (queries) and `answers.json` (ranked results).

use crate::error::{Result, SearchError};
use crate::search::DEFAULT_MAX_RESPONSES;
use crate::{DocId, DocumentSource, RelativeIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigInfo {
    pub name: String,
    pub version: String,
    #[serde(default = "default_max_responses")]
    pub max_responses: usize,
}
fn default_max_responses() -> usize { DEFAULT_MAX_RESPONSES }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub config: ConfigInfo,
    pub files: Vec<String>,
}

impl SearchConfig {
    pub fn new(name: impl Into<String>, max_responses: usize, files: Vec<String>) -> Self {
        Self {
            config: ConfigInfo {
                name: name.into(),
                version: CONFIG_VERSION.to_string(),
                max_responses,
            },
            files,
        }
    }

    /// Document sources in config order. Relative paths are taken relative
    /// to the directory holding `config_path`.
    pub fn document_sources<P: AsRef<Path>>(&self, config_path: P) -> Vec<DocumentSource> {
        let base = config_path.as_ref().parent().map(Path::to_path_buf).unwrap_or_default();
        self.files
            .iter()
            .map(|f| {
                let p = PathBuf::from(f);
                DocumentSource::File(if p.is_absolute() { p } else { base.join(p) })
            })
            .collect()
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SearchConfig> {
    let f = match File::open(path.as_ref()) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(SearchError::config("config file is missing"))
        }
        Err(e) => return Err(e.into()),
    };
    let json: Value = serde_json::from_reader(BufReader::new(f))
        .map_err(|e| SearchError::config(format!("config file is invalid JSON: {e}")))?;

    let Some(info) = json.get("config") else {
        return Err(SearchError::config("config file is empty"));
    };
    let config: ConfigInfo = serde_json::from_value(info.clone())
        .map_err(|e| SearchError::config(format!("config file has invalid structure: {e}")))?;
    if config.version != CONFIG_VERSION {
        return Err(SearchError::config("config.json has incorrect file version"));
    }

    let files = match json.get("files") {
        Some(Value::Array(entries)) => entries
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                SearchError::config(
                    "config file has invalid structure: non-string entry in 'files'",
                )
            })?,
        _ => return Err(SearchError::config("config file missing or invalid 'files' array")),
    };

    Ok(SearchConfig { config, files })
}

pub fn save_config<P: AsRef<Path>>(path: P, config: &SearchConfig) -> Result<()> {
    write_pretty(path.as_ref(), config)
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RequestsFile {
    requests: Vec<Value>,
}

/// Query strings from a requests file; non-string entries are skipped.
pub fn load_requests<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let f = File::open(path.as_ref())?;
    let file: RequestsFile = serde_json::from_reader(BufReader::new(f))?;
    Ok(file
        .requests
        .into_iter()
        .filter_map(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

pub fn save_requests<P: AsRef<Path>>(path: P, requests: &[String]) -> Result<()> {
    let file = RequestsFile { requests: requests.iter().cloned().map(Value::String).collect() };
    write_pretty(path.as_ref(), &file)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relevance {
    pub doc_id: DocId,
    pub rank: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub request: String,
    pub result: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relevance: Vec<Relevance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswersFile {
    pub answers: Vec<Answer>,
}

/// Pair each query with its result list. A query with no result list, or an
/// empty one, is recorded as `result: false`.
pub fn build_answers(queries: &[String], results: &[Vec<RelativeIndex>]) -> AnswersFile {
    let answers = queries
        .iter()
        .enumerate()
        .map(|(i, request)| {
            let relevance: Vec<Relevance> = results
                .get(i)
                .map(|hits| {
                    hits.iter().map(|h| Relevance { doc_id: h.doc_id, rank: h.rank }).collect()
                })
                .unwrap_or_default();
            Answer { request: request.clone(), result: !relevance.is_empty(), relevance }
        })
        .collect();
    AnswersFile { answers }
}

pub fn save_answers<P: AsRef<Path>>(
    path: P,
    queries: &[String],
    results: &[Vec<RelativeIndex>],
) -> Result<()> {
    write_pretty(path.as_ref(), &build_answers(queries, results))
}

pub fn load_answers<P: AsRef<Path>>(path: P) -> Result<AnswersFile> {
    let f = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

fn write_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        create_dir_all(dir)?;
    }
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(value)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}
