use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::{poet_document_path, validate_id, Corpus, POEMS_INDEX, POETS_INDEX};
use crate::error::CorpusError;
use crate::models::{PoemSummary, PoetDetail, PoetSummary};

/// Corpus laid out on disk exactly like the published web root.
#[derive(Debug, Clone)]
pub struct DirectoryCorpus {
    root: PathBuf,
}

impl DirectoryCorpus {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn read_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, CorpusError> {
        let path = self.root.join(relative);
        debug!(path = %path.display(), "reading corpus file");
        let raw = fs::read(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                CorpusError::NotFound(path.display().to_string())
            } else {
                CorpusError::Io(err)
            }
        })?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

impl Corpus for DirectoryCorpus {
    fn fetch_poets(&self) -> Result<Vec<PoetSummary>, CorpusError> {
        self.read_json(POETS_INDEX)
    }

    fn fetch_poems(&self) -> Result<Vec<PoemSummary>, CorpusError> {
        self.read_json(POEMS_INDEX)
    }

    fn fetch_poet(&self, id: &str) -> Result<PoetDetail, CorpusError> {
        validate_id(id)?;
        self.read_json(&poet_document_path(id))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
