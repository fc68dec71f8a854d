//! Ratatui front-end: the index screen, the poet reader and the loop that
//! drives them.

mod app;
mod helpers;
mod home;
mod poet;
mod terminal;

pub use app::{App, Phase};
pub use terminal::run_app;
