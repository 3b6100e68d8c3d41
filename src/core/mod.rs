pub mod controller;
pub mod fetcher;
pub mod screen;

pub use crate::domain::model::{FetchOutcome, Movie, Notice, ScreenState, ScreenView, SortMode};
pub use crate::domain::ports::{ConfigProvider, Connectivity, MovieDisplay, MovieFetcher};
pub use crate::utils::error::Result;
