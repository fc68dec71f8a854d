//! Background fetching. Every request runs on its own thread and reports back
//! through a channel tagged with a ticket; screens remember the ticket they
//! are waiting for and ignore anything else. Requests are never cancelled and
//! never retried.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::corpus::Corpus;
use crate::error::CorpusError;
use crate::models::{PoemSummary, PoetDetail, PoetSummary};

/// Identifies one request for its whole lifetime.
pub type Ticket = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Both index collections, loaded once per session.
    Index,
    /// A poet document for the detail screen.
    Poet { id: String },
    /// A poet document used only to pick a random poem.
    Random { poet_id: String },
}

/// Both collections or nothing: a failure in either leaves the index empty.
pub type IndexData = (Vec<PoetSummary>, Vec<PoemSummary>);

#[derive(Debug)]
pub enum Payload {
    Index(Result<IndexData, CorpusError>),
    Poet {
        id: String,
        result: Result<PoetDetail, CorpusError>,
    },
    Random {
        poet_id: String,
        result: Result<PoetDetail, CorpusError>,
    },
}

#[derive(Debug)]
pub struct Response {
    pub ticket: Ticket,
    pub payload: Payload,
}

pub struct Loader {
    corpus: Arc<dyn Corpus>,
    tx: Sender<Response>,
    rx: Receiver<Response>,
    next_ticket: Ticket,
}

impl Loader {
    pub fn new(corpus: Arc<dyn Corpus>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            corpus,
            tx,
            rx,
            next_ticket: 1,
        }
    }

    /// Start fetching and hand back the ticket the response will carry.
    pub fn request(&mut self, request: Request) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        debug!(ticket, ?request, "dispatching fetch");

        let corpus = Arc::clone(&self.corpus);
        let tx = self.tx.clone();
        let job = move || {
            let payload = execute(corpus.as_ref(), request);
            // The receiver only disappears at shutdown; nothing to report then.
            let _ = tx.send(Response { ticket, payload });
        };

        let spawned = thread::Builder::new()
            .name(format!("shiku-fetch-{ticket}"))
            .spawn(job.clone());
        if let Err(err) = spawned {
            warn!(ticket, error = %err, "could not spawn fetch thread, fetching inline");
            job();
        }
        ticket
    }

    /// Next finished response, if any, without blocking.
    pub fn try_next(&self) -> Option<Response> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next finished response.
    pub fn next_timeout(&self, timeout: Duration) -> Option<Response> {
        self.rx.recv_timeout(timeout).ok()
    }
}

fn execute(corpus: &dyn Corpus, request: Request) -> Payload {
    match request {
        Request::Index => {
            let result = corpus
                .fetch_poets()
                .and_then(|poets| corpus.fetch_poems().map(|poems| (poets, poems)));
            Payload::Index(result)
        }
        Request::Poet { id } => {
            let result = corpus.fetch_poet(&id);
            Payload::Poet { id, result }
        }
        Request::Random { poet_id } => {
            let result = corpus.fetch_poet(&poet_id);
            Payload::Random { poet_id, result }
        }
    }
}
