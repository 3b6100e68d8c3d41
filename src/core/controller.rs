use crate::domain::model::{FetchOutcome, Movie, ScreenState, ScreenView, SortMode};

/// What the screen should do after a refresh was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Show the no-internet notice; nothing else changes.
    NoConnectivity,
    /// Start a fetch tagged with this generation.
    Fetch(u64),
}

/// Visibility state of the list screen.
///
/// Pure state machine: it never performs I/O and is only touched from the
/// foreground task, so it needs no locking.
#[derive(Debug, Default)]
pub struct ListController {
    state: ScreenState,
    sort: SortMode,
    spinner_visible: bool,
    empty_message_visible: bool,
    movies: Vec<Movie>,
    generation: u64,
    // 進入 Loading 前的狀態，取消載入時回復
    resting_state: ScreenState,
}

impl ListController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScreenState {
        self.state
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn spinner_visible(&self) -> bool {
        self.spinner_visible
    }

    pub fn empty_message_visible(&self) -> bool {
        self.empty_message_visible
    }

    /// Latest generation handed out by [`begin_refresh`](Self::begin_refresh).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_refresh(&mut self, sort: SortMode, reachable: bool) -> RefreshDecision {
        if !reachable {
            tracing::debug!("Refresh skipped, network unreachable (state {:?})", self.state);
            return RefreshDecision::NoConnectivity;
        }

        self.generation += 1;
        self.sort = sort;
        if self.state != ScreenState::Loading {
            self.resting_state = self.state;
        }
        self.state = ScreenState::Loading;
        self.spinner_visible = true;
        self.empty_message_visible = false;

        tracing::debug!("Loading {} movies (generation {})", sort, self.generation);
        RefreshDecision::Fetch(self.generation)
    }

    /// Applies a finished fetch. Returns `false` when the delivery belongs to a
    /// superseded generation and was dropped.
    pub fn complete(&mut self, generation: u64, outcome: FetchOutcome) -> bool {
        if generation != self.generation || self.state != ScreenState::Loading {
            tracing::debug!(
                "Dropping stale fetch result (generation {}, current {})",
                generation,
                self.generation
            );
            return false;
        }

        self.spinner_visible = false;

        match outcome {
            FetchOutcome::Movies(movies) => {
                self.movies = movies;
                self.empty_message_visible = false;
                self.state = ScreenState::ShowingResults;
            }
            FetchOutcome::Empty | FetchOutcome::NoData => {
                self.movies.clear();
                self.empty_message_visible = true;
                self.state = ScreenState::ShowingEmpty;
            }
        }

        true
    }

    /// Abandons a pending fetch: hides the spinner, returns to the state held
    /// before loading started and invalidates the outstanding generation.
    pub fn cancel_loading(&mut self) -> bool {
        if self.state != ScreenState::Loading {
            return false;
        }

        self.generation += 1;
        self.spinner_visible = false;
        self.state = self.resting_state;
        tracing::debug!("Loading cancelled, back to {:?}", self.state);
        true
    }

    pub fn view(&self) -> ScreenView {
        ScreenView {
            state: self.state,
            sort: self.sort,
            spinner_visible: self.spinner_visible,
            empty_message_visible: self.empty_message_visible,
            movies: self.movies.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movies(n: i64) -> Vec<Movie> {
        (1..=n)
            .map(|id| Movie {
                id,
                title: format!("Movie {}", id),
                poster_path: format!("/{}.jpg", id),
                overview: String::new(),
                release_date: "2020-01-01".to_string(),
                vote_average: 7.0,
            })
            .collect()
    }

    #[test]
    fn test_initial_state_is_idle() {
        let controller = ListController::new();
        assert_eq!(controller.state(), ScreenState::Idle);
        assert!(!controller.spinner_visible());
        assert!(!controller.empty_message_visible());
        assert!(controller.movies().is_empty());
    }

    #[test]
    fn test_unreachable_keeps_idle() {
        let mut controller = ListController::new();

        let decision = controller.begin_refresh(SortMode::Popular, false);

        assert_eq!(decision, RefreshDecision::NoConnectivity);
        assert_eq!(controller.state(), ScreenState::Idle);
        assert!(!controller.spinner_visible());
        assert_eq!(controller.generation(), 0);
    }

    #[test]
    fn test_results_flow() {
        let mut controller = ListController::new();

        let RefreshDecision::Fetch(generation) = controller.begin_refresh(SortMode::Popular, true)
        else {
            panic!("expected a fetch");
        };
        assert_eq!(controller.state(), ScreenState::Loading);
        assert!(controller.spinner_visible());
        assert!(!controller.empty_message_visible());

        assert!(controller.complete(generation, FetchOutcome::Movies(movies(20))));

        assert_eq!(controller.state(), ScreenState::ShowingResults);
        assert_eq!(controller.movies().len(), 20);
        assert_eq!(controller.movies()[0].id, 1);
        assert_eq!(controller.movies()[19].id, 20);
        assert!(!controller.spinner_visible());
        assert!(!controller.empty_message_visible());
    }

    #[test]
    fn test_empty_and_no_data_are_indistinguishable() {
        let mut views = Vec::new();

        for outcome in [FetchOutcome::Empty, FetchOutcome::NoData] {
            let mut controller = ListController::new();
            let RefreshDecision::Fetch(first) = controller.begin_refresh(SortMode::Popular, true)
            else {
                panic!("expected a fetch");
            };
            controller.complete(first, FetchOutcome::Movies(movies(3)));

            let RefreshDecision::Fetch(second) = controller.begin_refresh(SortMode::Popular, true)
            else {
                panic!("expected a fetch");
            };
            controller.complete(second, outcome);
            views.push(controller.view());
        }

        assert_eq!(views[0], views[1]);
        assert_eq!(views[0].state, ScreenState::ShowingEmpty);
        assert!(views[0].empty_message_visible);
        assert!(!views[0].spinner_visible);
        assert!(views[0].movies.is_empty());
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut controller = ListController::new();

        let RefreshDecision::Fetch(old) = controller.begin_refresh(SortMode::Popular, true) else {
            panic!("expected a fetch");
        };
        let RefreshDecision::Fetch(new) = controller.begin_refresh(SortMode::TopRated, true)
        else {
            panic!("expected a fetch");
        };

        assert!(!controller.complete(old, FetchOutcome::Movies(movies(5))));
        assert_eq!(controller.state(), ScreenState::Loading);

        assert!(controller.complete(new, FetchOutcome::NoData));
        assert_eq!(controller.state(), ScreenState::ShowingEmpty);
        assert_eq!(controller.sort(), SortMode::TopRated);

        // 同一 generation 重複送達不再生效
        assert!(!controller.complete(new, FetchOutcome::Movies(movies(1))));
        assert_eq!(controller.state(), ScreenState::ShowingEmpty);
    }

    #[test]
    fn test_unreachable_after_results_keeps_list() {
        let mut controller = ListController::new();
        let RefreshDecision::Fetch(generation) = controller.begin_refresh(SortMode::Popular, true)
        else {
            panic!("expected a fetch");
        };
        controller.complete(generation, FetchOutcome::Movies(movies(2)));

        assert_eq!(
            controller.begin_refresh(SortMode::TopRated, false),
            RefreshDecision::NoConnectivity
        );
        assert_eq!(controller.state(), ScreenState::ShowingResults);
        assert_eq!(controller.sort(), SortMode::Popular);
        assert_eq!(controller.movies().len(), 2);
    }

    #[test]
    fn test_cancel_loading_restores_previous_state() {
        let mut controller = ListController::new();
        assert!(!controller.cancel_loading());

        let RefreshDecision::Fetch(first) = controller.begin_refresh(SortMode::Popular, true)
        else {
            panic!("expected a fetch");
        };
        assert!(controller.cancel_loading());
        assert_eq!(controller.state(), ScreenState::Idle);
        assert!(!controller.spinner_visible());
        assert!(!controller.complete(first, FetchOutcome::Movies(movies(1))));

        let RefreshDecision::Fetch(second) = controller.begin_refresh(SortMode::Popular, true)
        else {
            panic!("expected a fetch");
        };
        controller.complete(second, FetchOutcome::Movies(movies(2)));
        controller.begin_refresh(SortMode::TopRated, true);
        controller.begin_refresh(SortMode::TopRated, true);

        assert!(controller.cancel_loading());
        assert_eq!(controller.state(), ScreenState::ShowingResults);
        assert_eq!(controller.movies().len(), 2);
    }
}
