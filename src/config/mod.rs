pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::toml_config::{
        TomlConfig, DEFAULT_GRID_COLUMNS, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_SETTINGS_PATH,
        MAX_GRID_COLUMNS,
    };
    use crate::core::fetcher::{DEFAULT_API_BASE_URL, DEFAULT_IMAGE_BASE_URL};
    use crate::domain::model::SortMode;
    use crate::domain::ports::ConfigProvider;
    use crate::utils::error::{MoviesError, Result};
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "popular-movies")]
    #[command(about = "Browse popular and top rated movies from The Movie Database")]
    pub struct CliConfig {
        #[arg(long, env = "TMDB_API_KEY", hide_env_values = true)]
        pub api_key: Option<String>,

        #[arg(long, default_value = DEFAULT_API_BASE_URL)]
        pub base_url: String,

        #[arg(long, default_value = DEFAULT_IMAGE_BASE_URL)]
        pub image_base_url: String,

        #[arg(long, default_value = DEFAULT_SETTINGS_PATH)]
        pub settings_path: String,

        #[arg(long, help = "TOML config file; values fill in flags left at their defaults")]
        pub config: Option<String>,

        #[arg(long, default_value_t = DEFAULT_GRID_COLUMNS)]
        pub grid_columns: usize,

        #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT_MS)]
        pub probe_timeout_ms: u64,

        #[arg(long, help = "Store this sort order (popular or top_rated) before loading")]
        pub sort: Option<String>,

        #[arg(long, help = "Load once, print the result and exit")]
        pub once: bool,

        #[arg(long, help = "Print poster URLs under each grid row")]
        pub posters: bool,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Write logs as JSON")]
        pub log_json: bool,
    }

    impl CliConfig {
        /// 用 TOML 檔的值補上仍是預設值的參數，命令列優先
        pub fn merge_toml(&mut self, file: &TomlConfig) {
            if self.api_key.is_none() {
                self.api_key = file.api.api_key.clone();
            }
            if self.base_url == DEFAULT_API_BASE_URL {
                self.base_url = file.api_base_url().to_string();
            }
            if self.image_base_url == DEFAULT_IMAGE_BASE_URL {
                self.image_base_url = file.image_base_url().to_string();
            }
            if self.settings_path == DEFAULT_SETTINGS_PATH {
                self.settings_path = file.settings_path().to_string();
            }
            if self.grid_columns == DEFAULT_GRID_COLUMNS {
                self.grid_columns = file.grid_columns();
            }
            if self.probe_timeout_ms == DEFAULT_PROBE_TIMEOUT_MS {
                self.probe_timeout_ms = file.probe_timeout_ms();
            }
            if !self.posters {
                self.posters = file.show_posters().unwrap_or(false);
            }
        }

        pub fn sort_mode(&self) -> Result<Option<SortMode>> {
            match &self.sort {
                None => Ok(None),
                Some(raw) => SortMode::from_segment(raw).map(Some).ok_or_else(|| {
                    MoviesError::InvalidConfigValueError {
                        field: "sort".to_string(),
                        value: raw.clone(),
                        reason: "expected popular or top_rated".to_string(),
                    }
                }),
            }
        }
    }

    impl ConfigProvider for CliConfig {
        fn api_base_url(&self) -> &str {
            &self.base_url
        }

        fn api_key(&self) -> &str {
            self.api_key.as_deref().unwrap_or("")
        }

        fn image_base_url(&self) -> &str {
            &self.image_base_url
        }

        fn settings_path(&self) -> &str {
            &self.settings_path
        }

        fn grid_columns(&self) -> usize {
            self.grid_columns
        }

        fn probe_timeout_ms(&self) -> u64 {
            self.probe_timeout_ms
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            let key = validation::validate_required_field("api_key", &self.api_key)?;
            validation::validate_non_empty_string("api_key", key)?;
            validation::validate_url("base_url", &self.base_url)?;
            validation::validate_url("image_base_url", &self.image_base_url)?;
            validation::validate_path("settings_path", &self.settings_path)?;
            validation::validate_range("grid_columns", self.grid_columns, 1, MAX_GRID_COLUMNS)?;
            validation::validate_range("probe_timeout_ms", self.probe_timeout_ms, 1, u64::MAX)?;
            self.sort_mode()?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> CliConfig {
            let mut argv = vec!["popular-movies"];
            argv.extend_from_slice(args);
            CliConfig::try_parse_from(argv).unwrap()
        }

        #[test]
        fn test_defaults_and_validation() {
            let config = parse(&["--api-key", "k"]);

            assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
            assert_eq!(config.grid_columns(), 2);
            assert_eq!(config.settings_path(), DEFAULT_SETTINGS_PATH);
            assert!(config.validate().is_ok());
            assert_eq!(config.sort_mode().unwrap(), None);
        }

        #[test]
        fn test_invalid_sort_and_columns() {
            let config = parse(&["--api-key", "k", "--sort", "upcoming"]);
            assert!(config.validate().is_err());

            let config = parse(&["--api-key", "k", "--grid-columns", "9"]);
            assert!(config.validate().is_err());

            let config = parse(&["--api-key", "k", "--sort", "top_rated"]);
            assert_eq!(config.sort_mode().unwrap(), Some(SortMode::TopRated));
        }

        #[test]
        fn test_merge_toml_keeps_explicit_flags() {
            let mut config = parse(&["--grid-columns", "4", "--api-key", "cli-key"]);
            let file = TomlConfig::from_toml_str(
                r#"
[api]
api_key = "file-key"
base_url = "http://localhost:9000/3/movie"

[display]
grid_columns = 3
show_posters = true
"#,
            )
            .unwrap();

            config.merge_toml(&file);

            assert_eq!(config.api_key(), "cli-key");
            assert_eq!(config.api_base_url(), "http://localhost:9000/3/movie");
            assert_eq!(config.grid_columns(), 4);
            assert!(config.posters);
        }
    }
}
