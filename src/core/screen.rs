use crate::adapters::settings::{PreferenceSubscription, SettingsStore};
use crate::core::controller::{ListController, RefreshDecision};
use crate::domain::model::{FetchOutcome, Notice, ScreenState, ScreenView, SortMode, SORT_PREFERENCE_KEY};
use crate::domain::ports::{Connectivity, MovieDisplay, MovieFetcher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A finished fetch on its way back to the foreground task.
#[derive(Debug)]
pub struct FetchDelivery {
    pub generation: u64,
    pub outcome: FetchOutcome,
}

#[derive(Debug)]
pub enum ScreenEvent {
    FetchFinished(FetchDelivery),
    PreferenceChanged(String),
}

/// Foreground driver of the movie list.
///
/// All controller mutations and renders happen on the task that owns the
/// screen. Fetches run on spawned tasks and come back through a channel, so a
/// result is only applied when the owner calls [`handle`](Self::handle).
pub struct MovieListScreen<F, C, D>
where
    F: MovieFetcher + 'static,
    C: Connectivity,
    D: MovieDisplay,
{
    controller: ListController,
    fetcher: Arc<F>,
    connectivity: C,
    display: D,
    settings: SettingsStore,
    subscription: Option<PreferenceSubscription>,
    api_key: String,
    deliveries_tx: mpsc::UnboundedSender<FetchDelivery>,
    deliveries_rx: mpsc::UnboundedReceiver<FetchDelivery>,
    in_flight: Option<JoinHandle<()>>,
}

impl<F, C, D> MovieListScreen<F, C, D>
where
    F: MovieFetcher + 'static,
    C: Connectivity,
    D: MovieDisplay,
{
    pub fn new(
        fetcher: Arc<F>,
        connectivity: C,
        display: D,
        settings: SettingsStore,
        api_key: impl Into<String>,
    ) -> Self {
        let (deliveries_tx, deliveries_rx) = mpsc::unbounded_channel();
        Self {
            controller: ListController::new(),
            fetcher,
            connectivity,
            display,
            settings,
            subscription: None,
            api_key: api_key.into(),
            deliveries_tx,
            deliveries_rx,
            in_flight: None,
        }
    }

    pub fn state(&self) -> ScreenState {
        self.controller.state()
    }

    pub fn view(&self) -> ScreenView {
        self.controller.view()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// 進入畫面：訂閱設定變更並開始第一次載入
    pub async fn enter(&mut self) {
        if self.subscription.is_none() {
            self.subscription = Some(self.settings.subscribe());
        }
        self.refresh().await;
    }

    /// Runs the connectivity check and, when online, starts a fetch for the
    /// current sort preference.
    pub async fn refresh(&mut self) {
        let sort = self.settings.sort_mode();
        let reachable = self.connectivity.is_reachable().await;

        match self.controller.begin_refresh(sort, reachable) {
            RefreshDecision::NoConnectivity => {
                tracing::info!("📵 No internet connection, {} movies not requested", sort);
                self.display.show_notice(Notice::NoInternet);
            }
            RefreshDecision::Fetch(generation) => {
                self.display.render(&self.controller.view());
                self.spawn_fetch(generation, sort);
            }
        }
    }

    fn spawn_fetch(&mut self, generation: u64, sort: SortMode) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let fetcher = Arc::clone(&self.fetcher);
        let api_key = self.api_key.clone();
        let tx = self.deliveries_tx.clone();

        self.in_flight = Some(tokio::spawn(async move {
            let outcome = fetcher.fetch(sort, &api_key).await;
            // receiver 只會在畫面釋放後消失
            let _ = tx.send(FetchDelivery {
                generation,
                outcome,
            });
        }));
    }

    /// Waits for the next fetch result or preference change. Cancel-safe, so
    /// it can sit in a `select!` next to other input sources.
    pub async fn next_event(&mut self) -> ScreenEvent {
        tokio::select! {
            Some(delivery) = self.deliveries_rx.recv() => ScreenEvent::FetchFinished(delivery),
            key = next_preference_change(&mut self.subscription) => ScreenEvent::PreferenceChanged(key),
        }
    }

    pub async fn handle(&mut self, event: ScreenEvent) {
        match event {
            ScreenEvent::FetchFinished(delivery) => {
                let count = delivery.outcome.len();
                if self.controller.complete(delivery.generation, delivery.outcome) {
                    self.in_flight = None;
                    tracing::debug!(
                        "Screen now {:?} with {} movies",
                        self.controller.state(),
                        count
                    );
                    self.display.render(&self.controller.view());
                }
            }
            ScreenEvent::PreferenceChanged(key) => {
                if key == SORT_PREFERENCE_KEY {
                    tracing::info!("Sort preference changed to {}", self.settings.sort_mode());
                    self.refresh().await;
                }
            }
        }
    }

    pub async fn pump(&mut self) {
        let event = self.next_event().await;
        self.handle(event).await;
    }

    /// Pumps events until no fetch is pending.
    pub async fn settle(&mut self) {
        while self.controller.state() == ScreenState::Loading {
            if self.in_flight.is_none() && self.deliveries_rx.is_empty() {
                // 沒有任何請求會再送達
                self.controller.cancel_loading();
                break;
            }
            self.pump().await;
        }
    }

    /// Releases the preference subscription and abandons any in-flight fetch.
    pub fn teardown(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("Preference subscription released");
        }
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
        if self.controller.cancel_loading() {
            self.display.render(&self.controller.view());
        }
    }
}

impl<F, C, D> Drop for MovieListScreen<F, C, D>
where
    F: MovieFetcher + 'static,
    C: Connectivity,
    D: MovieDisplay,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

async fn next_preference_change(subscription: &mut Option<PreferenceSubscription>) -> String {
    match subscription {
        Some(subscription) => match subscription.changed().await {
            Some(key) => key,
            None => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}
