use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{validate_id, Corpus};
use crate::error::CorpusError;
use crate::models::{Poem, PoemSummary, PoetDetail, PoetSummary};

/// In-memory corpus for application tests. Index fetches can be made to fail,
/// and detail fetches can answer with a server status, to exercise the
/// degraded paths.
#[derive(Default)]
pub(crate) struct MemoryCorpus {
    pub(crate) poets: Vec<PoetSummary>,
    pub(crate) poems: Vec<PoemSummary>,
    pub(crate) details: HashMap<String, PoetDetail>,
    pub(crate) fail_index: bool,
    pub(crate) detail_status: Option<u16>,
    pub(crate) detail_fetches: AtomicUsize,
}

impl MemoryCorpus {
    /// Add a poet with `count` generated poems, keeping the summaries, the
    /// poem index and the detail document consistent with each other.
    pub(crate) fn with_poet(mut self, id: &str, name: &str, pinyin: &str, count: usize) -> Self {
        let poems: Vec<Poem> = (0..count)
            .map(|i| Poem {
                title: format!("{name} poem {i}"),
                date: String::new(),
                content: format!("line one of {i}\nline two of {i}"),
            })
            .collect();
        for (index, poem) in poems.iter().enumerate() {
            self.poems.push(PoemSummary {
                title: poem.title.clone(),
                author: name.to_string(),
                poet_id: id.to_string(),
                index,
            });
        }
        self.poets.push(PoetSummary {
            id: id.to_string(),
            name: name.to_string(),
            pinyin: pinyin.to_string(),
            poem_count: count,
        });
        self.details.insert(
            id.to_string(),
            PoetDetail {
                id: id.to_string(),
                name: name.to_string(),
                pinyin: pinyin.to_string(),
                poems,
            },
        );
        self
    }
}

impl Corpus for MemoryCorpus {
    fn fetch_poets(&self) -> Result<Vec<PoetSummary>, CorpusError> {
        if self.fail_index {
            return Err(CorpusError::NotFound("poets.json".into()));
        }
        Ok(self.poets.clone())
    }

    fn fetch_poems(&self) -> Result<Vec<PoemSummary>, CorpusError> {
        if self.fail_index {
            return Err(CorpusError::NotFound("poems.json".into()));
        }
        Ok(self.poems.clone())
    }

    fn fetch_poet(&self, id: &str) -> Result<PoetDetail, CorpusError> {
        validate_id(id)?;
        self.detail_fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = self.detail_status {
            return Err(CorpusError::Status {
                url: format!("memory/{id}"),
                status,
            });
        }
        self.details
            .get(id)
            .cloned()
            .ok_or_else(|| CorpusError::NotFound(format!("poet '{id}'")))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
