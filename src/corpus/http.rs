use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{poet_document_path, validate_id, Corpus, POEMS_INDEX, POETS_INDEX};
use crate::error::CorpusError;
use crate::models::{PoemSummary, PoetDetail, PoetSummary};

const USER_AGENT: &str = concat!("shiku/", env!("CARGO_PKG_VERSION"));

/// Corpus served by a static web host, fetched with a blocking client from the
/// loader threads.
pub struct HttpCorpus {
    base_url: String,
    client: Client,
}

impl HttpCorpus {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, CorpusError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(base_url, client))
    }

    pub(crate) fn with_client(base_url: &str, client: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    pub(crate) fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative)
    }

    fn get_json<T: DeserializeOwned>(&self, relative: &str) -> Result<T, CorpusError> {
        let url = self.url_for(relative);
        debug!(url = %url, "fetching corpus document");
        let response = self.client.get(&url).send()?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CorpusError::NotFound(url));
        }
        if !status.is_success() {
            return Err(CorpusError::Status {
                url,
                status: status.as_u16(),
            });
        }
        // Decode from bytes so a bad payload reports as a JSON error rather
        // than an opaque transport error.
        let body = response.bytes()?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl Corpus for HttpCorpus {
    fn fetch_poets(&self) -> Result<Vec<PoetSummary>, CorpusError> {
        self.get_json(POETS_INDEX)
    }

    fn fetch_poems(&self) -> Result<Vec<PoemSummary>, CorpusError> {
        self.get_json(POEMS_INDEX)
    }

    fn fetch_poet(&self, id: &str) -> Result<PoetDetail, CorpusError> {
        validate_id(id)?;
        self.get_json(&poet_document_path(id))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}
