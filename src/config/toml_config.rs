use crate::core::fetcher::{DEFAULT_API_BASE_URL, DEFAULT_IMAGE_BASE_URL};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{MoviesError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SETTINGS_PATH: &str = "./movie_settings.toml";
pub const DEFAULT_GRID_COLUMNS: usize = 2;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 3000;
pub const MAX_GRID_COLUMNS: usize = 6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    pub settings: Option<SettingsConfig>,
    pub display: Option<DisplayConfig>,
    pub connectivity: Option<ConnectivityConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub image_base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub grid_columns: Option<usize>,
    pub show_posters: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    pub probe_timeout_ms: Option<u64>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(MoviesError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${TMDB_API_KEY})，未設定的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| MoviesError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.base_url", self.api_base_url())?;
        validation::validate_url("api.image_base_url", self.image_base_url())?;

        if let Some(key) = &self.api.api_key {
            validation::validate_non_empty_string("api.api_key", key)?;
            if key.starts_with("${") {
                return Err(MoviesError::InvalidConfigValueError {
                    field: "api.api_key".to_string(),
                    value: key.clone(),
                    reason: "environment variable is not set".to_string(),
                });
            }
        }

        validation::validate_path("settings.path", self.settings_path())?;
        validation::validate_range("display.grid_columns", self.grid_columns(), 1, MAX_GRID_COLUMNS)?;
        validation::validate_range(
            "connectivity.probe_timeout_ms",
            self.probe_timeout_ms(),
            1,
            u64::MAX,
        )?;

        Ok(())
    }

    pub fn show_posters(&self) -> Option<bool> {
        self.display.as_ref().and_then(|d| d.show_posters)
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base_url(&self) -> &str {
        self.api.base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL)
    }

    fn api_key(&self) -> &str {
        self.api.api_key.as_deref().unwrap_or("")
    }

    fn image_base_url(&self) -> &str {
        self.api
            .image_base_url
            .as_deref()
            .unwrap_or(DEFAULT_IMAGE_BASE_URL)
    }

    fn settings_path(&self) -> &str {
        self.settings
            .as_ref()
            .map(|s| s.path.as_str())
            .unwrap_or(DEFAULT_SETTINGS_PATH)
    }

    fn grid_columns(&self) -> usize {
        self.display
            .as_ref()
            .and_then(|d| d.grid_columns)
            .unwrap_or(DEFAULT_GRID_COLUMNS)
    }

    fn probe_timeout_ms(&self) -> u64 {
        self.connectivity
            .as_ref()
            .and_then(|c| c.probe_timeout_ms)
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_MS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[api]
base_url = "https://api.example.com/3/movie"
api_key = "abc123"
image_base_url = "https://img.example.com/w342"

[settings]
path = "/tmp/movies/settings.toml"

[display]
grid_columns = 3
show_posters = true

[connectivity]
probe_timeout_ms = 500
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_base_url(), "https://api.example.com/3/movie");
        assert_eq!(config.api_key(), "abc123");
        assert_eq!(config.image_base_url(), "https://img.example.com/w342");
        assert_eq!(config.settings_path(), "/tmp/movies/settings.toml");
        assert_eq!(config.grid_columns(), 3);
        assert_eq!(config.show_posters(), Some(true));
        assert_eq!(config.probe_timeout_ms(), 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_for_missing_sections() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.api_base_url(), DEFAULT_API_BASE_URL);
        assert_eq!(config.image_base_url(), DEFAULT_IMAGE_BASE_URL);
        assert_eq!(config.settings_path(), DEFAULT_SETTINGS_PATH);
        assert_eq!(config.grid_columns(), DEFAULT_GRID_COLUMNS);
        assert_eq!(config.probe_timeout_ms(), DEFAULT_PROBE_TIMEOUT_MS);
        assert_eq!(config.api_key(), "");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("POPULAR_MOVIES_TEST_KEY", "from-env");

        let toml_content = r#"
[api]
api_key = "${POPULAR_MOVIES_TEST_KEY}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_key(), "from-env");

        std::env::remove_var("POPULAR_MOVIES_TEST_KEY");
    }

    #[test]
    fn test_unset_env_var_fails_validation() {
        let toml_content = r#"
[api]
api_key = "${POPULAR_MOVIES_SURELY_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[api]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_columns = TomlConfig::from_toml_str("[display]\ngrid_columns = 0\n").unwrap();
        assert!(bad_columns.validate().is_err());

        let malformed = TomlConfig::from_toml_str("[api\nbase_url = 1");
        assert!(matches!(malformed, Err(MoviesError::TomlError(_))));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[settings]\npath = \"./prefs.toml\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.settings_path(), "./prefs.toml");
    }
}
