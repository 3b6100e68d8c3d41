pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{
    connectivity::TcpProbe, settings::SettingsStore, terminal::TerminalDisplay,
};
pub use crate::core::{controller::ListController, fetcher::TmdbFetcher, screen::MovieListScreen};
pub use crate::utils::error::{MoviesError, Result};
