use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoviesError {
    #[error("API request failed: {0}")]
    ApiError(#[source] reqwest::Error),

    #[error("API responded with HTTP status {status}")]
    HttpStatusError { status: u16 },

    #[error("Malformed API response: {message}")]
    MalformedResponseError { message: String },

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWriteError(#[from] toml::ser::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Settings store error: {message}")]
    SettingsError { message: String },
}

// reqwest 的錯誤訊息會帶完整 URL（含 api_key），轉換時一律去掉
impl From<reqwest::Error> for MoviesError {
    fn from(e: reqwest::Error) -> Self {
        MoviesError::ApiError(e.without_url())
    }
}

impl MoviesError {
    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            MoviesError::ApiError(_)
            | MoviesError::HttpStatusError { .. }
            | MoviesError::MalformedResponseError { .. } => {
                "Could not load movies from the catalog".to_string()
            }
            MoviesError::MissingConfigError { field } => {
                format!("Missing required setting: {}", field)
            }
            MoviesError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid setting {}: {}", field, reason)
            }
            MoviesError::ConfigError { .. }
            | MoviesError::TomlError(_)
            | MoviesError::UrlError(_) => "Configuration could not be loaded".to_string(),
            MoviesError::SettingsError { .. } | MoviesError::TomlWriteError(_) => {
                "Preferences could not be read or saved".to_string()
            }
            MoviesError::IoError(e) => format!("File access failed: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            MoviesError::ApiError(_) | MoviesError::HttpStatusError { .. } => {
                "Check the network connection and the API key, then refresh"
            }
            MoviesError::MalformedResponseError { .. } => {
                "Check that --base-url points at the movie catalog API"
            }
            MoviesError::MissingConfigError { .. } => {
                "Pass --api-key or set the TMDB_API_KEY environment variable"
            }
            MoviesError::InvalidConfigValueError { .. }
            | MoviesError::ConfigError { .. }
            | MoviesError::TomlError(_)
            | MoviesError::UrlError(_) => "Fix the value in the command line or config file",
            MoviesError::SettingsError { .. }
            | MoviesError::TomlWriteError(_)
            | MoviesError::IoError(_) => {
                "Check that the settings file path is writable, or delete the file to reset it"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, MoviesError>;
