use crate::domain::ports::Connectivity;
use crate::utils::error::{MoviesError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tokio::net::TcpStream;
use url::Url;

/// Reports the network as reachable when a TCP connection to the catalog
/// host can be opened.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    host: String,
    port: u16,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }

    /// 從 API base URL 取出要探測的 host:port
    pub fn for_url(url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| MoviesError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: url.to_string(),
                reason: "URL has no host".to_string(),
            })?
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| MoviesError::InvalidConfigValueError {
                field: "base_url".to_string(),
                value: url.to_string(),
                reason: "URL has no port and no known default".to_string(),
            })?;

        Ok(Self::new(host, port, timeout))
    }

    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[async_trait]
impl Connectivity for TcpProbe {
    async fn is_reachable(&self) -> bool {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => {
                tracing::debug!("Connectivity probe to {} succeeded", self.target());
                true
            }
            Ok(Err(e)) => {
                tracing::debug!("Connectivity probe to {} failed: {}", self.target(), e);
                false
            }
            Err(_) => {
                tracing::debug!(
                    "Connectivity probe to {} timed out after {:?}",
                    self.target(),
                    self.timeout
                );
                false
            }
        }
    }
}
