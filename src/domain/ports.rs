use crate::domain::model::{FetchOutcome, Notice, ScreenView, SortMode};
use async_trait::async_trait;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn api_key(&self) -> &str;
    fn image_base_url(&self) -> &str;
    fn settings_path(&self) -> &str;
    fn grid_columns(&self) -> usize;
    fn probe_timeout_ms(&self) -> u64;
}

/// Retrieves one page of movies. Failures are folded into
/// [`FetchOutcome::NoData`] instead of being returned as errors.
#[async_trait]
pub trait MovieFetcher: Send + Sync {
    async fn fetch(&self, sort: SortMode, api_key: &str) -> FetchOutcome;
}

#[async_trait]
pub trait Connectivity: Send + Sync {
    async fn is_reachable(&self) -> bool;
}

/// Presentation side of the list screen. Only called from the foreground task.
pub trait MovieDisplay {
    fn render(&mut self, view: &ScreenView);
    fn show_notice(&mut self, notice: Notice);
}
