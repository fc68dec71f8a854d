//! Read-only access to the pre-built corpus, split by backend.

mod dir;
mod http;
#[cfg(test)]
pub(crate) mod memory;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::CorpusError;
use crate::models::{PoemSummary, PoetDetail, PoetSummary};

pub use dir::DirectoryCorpus;
pub use http::HttpCorpus;

/// File holding every poet summary, relative to the corpus root.
pub const POETS_INDEX: &str = "poets.json";
/// File holding every poem summary, relative to the corpus root.
pub const POEMS_INDEX: &str = "poems.json";
/// Directory holding one detail document per poet, relative to the corpus root.
pub const POET_DATA_DIR: &str = "data/poets";

/// A source of corpus documents. Implementations must be usable from the
/// background fetch threads, hence `Send + Sync`.
pub trait Corpus: Send + Sync {
    fn fetch_poets(&self) -> Result<Vec<PoetSummary>, CorpusError>;
    fn fetch_poems(&self) -> Result<Vec<PoemSummary>, CorpusError>;
    fn fetch_poet(&self, id: &str) -> Result<PoetDetail, CorpusError>;
    /// Human readable origin used in log lines.
    fn describe(&self) -> String;
}

/// Relative path of a poet detail document.
pub fn poet_document_path(id: &str) -> String {
    format!("{POET_DATA_DIR}/{id}.json")
}

/// Pick the backend from the shape of `source`: http(s) URLs go over the
/// network, anything else is treated as a local directory.
pub fn open_corpus(source: &str, timeout: Duration) -> Result<Arc<dyn Corpus>> {
    if is_http(source) {
        let corpus = HttpCorpus::new(source, timeout).context("failed to build http client")?;
        Ok(Arc::new(corpus))
    } else {
        Ok(Arc::new(DirectoryCorpus::new(PathBuf::from(source))))
    }
}

pub(crate) fn is_http(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Reject identifiers that would escape the poet directory or form odd URLs.
/// Generated ids are pinyin with optional `_n` suffixes, so this never rejects
/// a real poet.
pub(crate) fn validate_id(id: &str) -> Result<(), CorpusError> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '?', '#']);
    if bad {
        Err(CorpusError::NotFound(format!("poet '{id}'")))
    } else {
        Ok(())
    }
}
