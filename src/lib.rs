//! Core library surface for the Shiku poetry reader.
//!
//! The binary only parses configuration and starts the terminal loop; all of
//! the search, navigation and loading behavior lives here so it can be tested
//! without a terminal.
pub mod clipboard;
pub mod config;
pub mod corpus;
pub mod error;
pub mod loader;
pub mod logging;
pub mod models;
pub mod random;
pub mod reader;
pub mod route;
pub mod search;
pub mod ui;

/// Corpus backends and the trait they share.
pub use corpus::{open_corpus, Corpus, DirectoryCorpus, HttpCorpus};

/// Data types read from the corpus.
pub use models::{Poem, PoemSummary, PoetDetail, PoetSummary};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Phase};
