use clap::Parser;
use popular_movies::app::commands::{apply_sort_command, Command, HELP};
use popular_movies::config::toml_config::TomlConfig;
use popular_movies::core::screen::ScreenEvent;
use popular_movies::core::ConfigProvider;
use popular_movies::utils::{logger, validation::Validate};
use popular_movies::{
    CliConfig, MovieListScreen, MoviesError, SettingsStore, TcpProbe, TerminalDisplay,
    TmdbFetcher,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

enum Input {
    Screen(ScreenEvent),
    Line(Option<String>),
}

fn exit_with(e: MoviesError) -> ! {
    tracing::error!("❌ {}", e);
    tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting popular-movies");

    if let Some(path) = config.config.clone() {
        match TomlConfig::from_file(&path).and_then(|file| file.validate().map(|_| file)) {
            Ok(file) => {
                tracing::debug!("Loaded config file {}", path);
                config.merge_toml(&file);
            }
            Err(e) => exit_with(e),
        }
    }

    if config.verbose {
        tracing::debug!(
            "Base URL: {}, settings: {}, columns: {}",
            config.api_base_url(),
            config.settings_path(),
            config.grid_columns()
        );
    }

    if let Err(e) = config.validate() {
        exit_with(e);
    }

    let settings = SettingsStore::open(config.settings_path()).unwrap_or_else(|e| exit_with(e));
    match config.sort_mode() {
        Ok(Some(sort)) => {
            if let Err(e) = settings.set_sort_mode(sort) {
                exit_with(e);
            }
        }
        Ok(None) => {}
        Err(e) => exit_with(e),
    }

    let connectivity = TcpProbe::for_url(
        config.api_base_url(),
        Duration::from_millis(config.probe_timeout_ms()),
    )
    .unwrap_or_else(|e| exit_with(e));
    let fetcher = Arc::new(TmdbFetcher::new(config.api_base_url()));
    let display = TerminalDisplay::new(
        std::io::stdout(),
        config.grid_columns(),
        config.image_base_url(),
    )
    .with_posters(config.posters)
    .with_live_spinner(true);

    let mut screen = MovieListScreen::new(
        fetcher,
        connectivity,
        display,
        settings.clone(),
        config.api_key(),
    );

    screen.enter().await;

    if config.once {
        screen.settle().await;
        screen.teardown();
        return Ok(());
    }

    println!("{}", HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = tokio::select! {
            event = screen.next_event() => Input::Screen(event),
            line = lines.next_line() => Input::Line(line?),
        };

        match input {
            Input::Screen(event) => screen.handle(event).await,
            Input::Line(None) => break,
            Input::Line(Some(line)) => match Command::parse(&line) {
                Command::Quit => break,
                Command::Refresh => screen.refresh().await,
                Command::Help => println!("{}", HELP),
                Command::Empty => {}
                Command::Unknown(other) => println!("unknown command '{}'; {}", other, HELP),
                command @ (Command::Toggle | Command::SetSort(_)) => {
                    match apply_sort_command(&settings, &command) {
                        Ok(Some(sort)) => tracing::info!("Sort order set to {}", sort),
                        Ok(None) => {}
                        Err(e) => {
                            tracing::error!("❌ Could not save sort preference: {}", e);
                            eprintln!("❌ {}", e.user_friendly_message());
                        }
                    }
                }
            },
        }
    }

    screen.teardown();
    tracing::info!("Bye");
    Ok(())
}
