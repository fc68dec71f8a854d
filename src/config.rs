//! Command-line configuration with environment fallbacks. Defaults live under
//! `~/.shiku`, next to where the log file goes.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use directories::BaseDirs;

use crate::corpus::is_http;
use crate::route::{Location, APP_SCHEME};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".shiku";
/// Default corpus folder inside the data directory.
const CORPUS_DIR_NAME: &str = "public";
const LOG_FILE_NAME: &str = "shiku.log";

#[derive(Parser, Debug, Clone)]
#[command(name = "shiku")]
#[command(about = "Browse, search and read a classical poetry corpus in the terminal")]
#[command(version)]
pub struct Args {
    /// Corpus location: an http(s) base URL or a local directory holding
    /// poets.json, poems.json and data/poets/
    #[arg(short, long, env = "SHIKU_SOURCE")]
    pub source: Option<String>,

    /// Base used when sharing links (defaults to the source when it is a URL)
    #[arg(long, env = "SHIKU_SITE")]
    pub site: Option<String>,

    /// Location to open first, e.g. /poet/li-bai#poem-3 or a shared URL
    #[arg(short, long)]
    pub open: Option<String>,

    /// Where to write logs; the terminal itself is owned by the UI
    #[arg(long, env = "SHIKU_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// HTTP timeout in seconds for remote corpora
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

/// Fully resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source: String,
    pub site: String,
    pub start: Location,
    pub log_file: PathBuf,
    pub timeout: Duration,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let data_dir = data_dir();
        let source = match args.source {
            Some(source) => source,
            None => data_dir
                .as_ref()
                .map(|dir| dir.join(CORPUS_DIR_NAME).display().to_string())
                .map_err(|err| anyhow!("no --source given and {err}"))?,
        };
        let log_file = match args.log_file {
            Some(path) => path,
            None => data_dir
                .map(|dir| dir.join(LOG_FILE_NAME))
                .map_err(|err| anyhow!("no --log-file given and {err}"))?,
        };
        let site = args
            .site
            .unwrap_or_else(|| default_site(&source));
        let start = args
            .open
            .as_deref()
            .map(Location::parse)
            .unwrap_or_else(Location::index);

        Ok(Self {
            source,
            site,
            start,
            log_file,
            timeout: Duration::from_secs(args.timeout_secs.max(1)),
        })
    }
}

fn default_site(source: &str) -> String {
    if is_http(source) {
        source.trim_end_matches('/').to_string()
    } else {
        APP_SCHEME.to_string()
    }
}

fn data_dir() -> Result<PathBuf, String> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DATA_DIR_NAME))
        .ok_or_else(|| "could not locate home directory".to_string())
}
