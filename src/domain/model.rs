use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Preference key holding the sort segment.
pub const SORT_PREFERENCE_KEY: &str = "sort";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub poster_path: String,
    pub overview: String,
    pub release_date: String,
    pub vote_average: f64,
}

impl Movie {
    /// 將相對的 poster_path 接到圖片主機上
    pub fn poster_url(&self, image_base_url: &str) -> String {
        format!(
            "{}/{}",
            image_base_url.trim_end_matches('/'),
            self.poster_path.trim_start_matches('/')
        )
    }

    pub fn release_year(&self) -> Option<i32> {
        NaiveDate::parse_from_str(&self.release_date, "%Y-%m-%d")
            .ok()
            .map(|date| date.year())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Popular,
    TopRated,
}

impl SortMode {
    pub const ALL: [SortMode; 2] = [SortMode::Popular, SortMode::TopRated];

    pub fn segment(self) -> &'static str {
        match self {
            SortMode::Popular => "popular",
            SortMode::TopRated => "top_rated",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment.trim() {
            "popular" => Some(SortMode::Popular),
            "top_rated" => Some(SortMode::TopRated),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortMode::Popular => SortMode::TopRated,
            SortMode::TopRated => SortMode::Popular,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Popular => "Most popular",
            SortMode::TopRated => "Top rated",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// Result of one catalog fetch.
///
/// `NoData` means the request could not be completed or parsed; it is kept
/// apart from `Empty` even though the screen renders both the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Movies(Vec<Movie>),
    Empty,
    NoData,
}

impl FetchOutcome {
    pub fn from_movies(movies: Vec<Movie>) -> Self {
        if movies.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Movies(movies)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FetchOutcome::Movies(movies) => movies.len(),
            FetchOutcome::Empty | FetchOutcome::NoData => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    #[default]
    Idle,
    Loading,
    ShowingResults,
    ShowingEmpty,
}

/// Snapshot of everything the display needs to draw the list screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScreenView {
    pub state: ScreenState,
    pub sort: SortMode,
    pub spinner_visible: bool,
    pub empty_message_visible: bool,
    pub movies: Vec<Movie>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NoInternet,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::NoInternet => "No internet connection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(release_date: &str, poster_path: &str) -> Movie {
        Movie {
            id: 550,
            title: "Fight Club".to_string(),
            poster_path: poster_path.to_string(),
            overview: "An insomniac office worker...".to_string(),
            release_date: release_date.to_string(),
            vote_average: 8.4,
        }
    }

    #[test]
    fn test_sort_mode_segments() {
        assert_eq!(SortMode::Popular.segment(), "popular");
        assert_eq!(SortMode::TopRated.segment(), "top_rated");
        for mode in SortMode::ALL {
            assert_eq!(SortMode::from_segment(mode.segment()), Some(mode));
            assert_eq!(mode.toggled().toggled(), mode);
        }
        assert_eq!(SortMode::from_segment("upcoming"), None);
        assert_eq!(SortMode::default(), SortMode::Popular);
    }

    #[test]
    fn test_movie_helpers() {
        let m = movie("1999-10-15", "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg");
        assert_eq!(m.release_year(), Some(1999));
        assert_eq!(
            m.poster_url("https://image.tmdb.org/t/p/w185/"),
            "https://image.tmdb.org/t/p/w185/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg"
        );

        assert_eq!(movie("", "/x.jpg").release_year(), None);
    }

    #[test]
    fn test_fetch_outcome_from_movies() {
        assert_eq!(FetchOutcome::from_movies(vec![]), FetchOutcome::Empty);
        let outcome = FetchOutcome::from_movies(vec![movie("2000-01-01", "/a.jpg")]);
        assert_eq!(outcome.len(), 1);
        assert!(FetchOutcome::NoData.is_empty());
    }
}
