//! HTTP sink
//!
//! POSTs each reading as a JSON body to a collection endpoint. Blocking
//! `ureq` client, one request per reading, no batching and no retry
//! queue - a failed POST fails that cycle's append and the acquisition
//! loop logs and continues on schedule.

use std::time::Duration;

use aerolog_core::measurement::Reading;
use aerolog_core::sink::RecordSink;

use crate::{ConnectorError, SinkStats};

/// HTTP sink configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Endpoint URL the readings are POSTed to
    pub url: String,
    /// Request timeout
    pub timeout: Duration,
    /// Optional bearer token
    pub bearer: Option<String>,
}

impl HttpConfig {
    /// Configuration for `url` with a 30-second timeout and no auth
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_secs(30),
            bearer: None,
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

/// Blocking HTTP POST sink
#[derive(Debug)]
pub struct HttpSink {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: SinkStats,
}

impl HttpSink {
    /// Validate the configuration and build the client
    pub fn new(config: HttpConfig) -> Result<Self, ConnectorError> {
        if !config.url.starts_with("http://") && !config.url.starts_with("https://") {
            return Err(ConnectorError::Config(
                "endpoint URL must start with http:// or https://".into(),
            ));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(concat!("aerolog/", env!("CARGO_PKG_VERSION")))
            .build();

        Ok(Self {
            config,
            agent,
            stats: SinkStats::default(),
        })
    }

    /// Append statistics so far
    pub fn stats(&self) -> SinkStats {
        self.stats
    }

    fn post(&self, reading: &Reading) -> Result<u64, ConnectorError> {
        let body = serde_json::to_string(reading)?;

        let mut request = self
            .agent
            .post(&self.config.url)
            .set("Content-Type", "application/json");
        if let Some(token) = &self.config.bearer {
            request = request.set("Authorization", &format!("Bearer {}", token));
        }

        match request.send_string(&body) {
            Ok(_) => Ok(body.len() as u64),
            Err(ureq::Error::Status(status, response)) => Err(ConnectorError::Server {
                status,
                message: response
                    .into_string()
                    .unwrap_or_else(|_| "unreadable response body".into()),
            }),
            Err(ureq::Error::Transport(transport)) => {
                Err(ConnectorError::Transport(transport.to_string()))
            }
        }
    }
}

impl RecordSink for HttpSink {
    type Error = ConnectorError;

    fn append(&mut self, reading: &Reading) -> Result<(), Self::Error> {
        match self.post(reading) {
            Ok(bytes) => {
                self.stats.records_written += 1;
                self.stats.bytes_written += bytes;
                Ok(())
            }
            Err(err) => {
                self.stats.records_failed += 1;
                Err(err)
            }
        }
    }
}
