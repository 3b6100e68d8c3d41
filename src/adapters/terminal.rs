use crate::domain::model::{Movie, Notice, ScreenView};
use crate::domain::ports::MovieDisplay;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::Write;
use std::time::Duration;

const CELL_WIDTH: usize = 38;
const SPINNER_TICK: Duration = Duration::from_millis(100);

/// Draws the list screen as a text grid.
pub struct TerminalDisplay<W: Write> {
    out: W,
    columns: usize,
    image_base_url: String,
    show_posters: bool,
    live_spinner: bool,
    spinner: Option<ProgressBar>,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, columns: usize, image_base_url: impl Into<String>) -> Self {
        Self {
            out,
            columns: columns.max(1),
            image_base_url: image_base_url.into(),
            show_posters: false,
            live_spinner: false,
            spinner: None,
        }
    }

    /// 在 stderr 上畫出轉動的 spinner；預設不畫，只記錄狀態
    pub fn with_live_spinner(mut self, live: bool) -> Self {
        self.live_spinner = live;
        self
    }

    pub fn spinner_active(&self) -> bool {
        self.spinner.is_some()
    }

    pub fn spinner_message(&self) -> Option<String> {
        self.spinner.as_ref().map(|pb| pb.message())
    }

    pub fn with_posters(mut self, show_posters: bool) -> Self {
        self.show_posters = show_posters;
        self
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.out
    }

    fn write_view(&mut self, view: &ScreenView) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "=== {} ===", view.sort.label())?;

        self.sync_spinner(view);
        if view.empty_message_visible {
            writeln!(self.out, "No movies found")?;
        }

        for row in view.movies.chunks(self.columns) {
            let line: Vec<String> = row.iter().map(|m| format_cell(m, CELL_WIDTH)).collect();
            writeln!(self.out, "{}", line.join(" | ").trim_end())?;

            if self.show_posters {
                let posters: Vec<String> = row
                    .iter()
                    .map(|m| m.poster_url(&self.image_base_url))
                    .collect();
                writeln!(self.out, "  {}", posters.join("  "))?;
            }
        }

        self.out.flush()
    }

    fn sync_spinner(&mut self, view: &ScreenView) {
        if !view.spinner_visible {
            if let Some(pb) = self.spinner.take() {
                pb.finish_and_clear();
            }
            return;
        }

        let message = format!("Loading {} movies...", view.sort.label().to_lowercase());
        if let Some(pb) = &self.spinner {
            pb.set_message(message);
            return;
        }

        let target = if self.live_spinner {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        let pb = ProgressBar::with_draw_target(None, target);
        let style = ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        pb.set_style(style);
        pb.set_message(message);
        if self.live_spinner {
            pb.enable_steady_tick(SPINNER_TICK);
        }
        self.spinner = Some(pb);
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl<W: Write> MovieDisplay for TerminalDisplay<W> {
    fn render(&mut self, view: &ScreenView) {
        if let Err(e) = self.write_view(view) {
            tracing::warn!("Failed to draw movie list: {}", e);
        }
    }

    fn show_notice(&mut self, notice: Notice) {
        let result = writeln!(self.out, "! {}", notice.message()).and_then(|_| self.out.flush());
        if let Err(e) = result {
            tracing::warn!("Failed to show notice: {}", e);
        }
    }
}

fn format_cell(movie: &Movie, width: usize) -> String {
    let year = movie
        .release_year()
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    let suffix = format!("{} ★{:.1}", year, movie.vote_average);

    let budget = width.saturating_sub(suffix.chars().count());
    let title: String = if movie.title.chars().count() > budget {
        let mut cut: String = movie.title.chars().take(budget.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        movie.title.clone()
    };

    let cell = format!("{}{}", title, suffix);
    let pad = width.saturating_sub(cell.chars().count());
    format!("{}{}", cell, " ".repeat(pad))
}
