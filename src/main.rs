//! Binary entry point: resolve configuration, start logging, open the corpus
//! and drive the Ratatui event loop until the user exits.
use clap::Parser;
use shiku::clipboard::SystemClipboard;
use shiku::config::{Args, Config};
use shiku::logging::init_logging;
use shiku::{open_corpus, run_app, App};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logging(&config.log_file)?;
    info!(source = %config.source, start = %config.start, "starting shiku");

    let corpus = open_corpus(&config.source, config.timeout)?;
    let mut app = App::new(
        corpus,
        Box::new(SystemClipboard::new()),
        &config.site,
        config.start.clone(),
    );
    run_app(&mut app)
}
