//! Overlay session configuration

use std::time::Duration;

use reqwest::Url;

use crate::error::ConfigError;
use crate::poll::VoteGuard;

/// Default poll service base URL
pub const DEFAULT_SERVICE_BASE_URL: &str = "http://localhost:8080/";

/// What to do with the active overlay when a cue fails to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrorPolicy {
    /// Clear the overlay; an unreadable cue means nothing to show
    #[default]
    Clear,
    /// Keep the current overlay and ignore the cue
    Retain,
}

/// Overlay session configuration options
#[derive(Debug, Clone)]
pub struct OverlayConfig {
    /// Base URL of the poll service
    pub service_base_url: Url,

    /// Stream the overlay is attached to (informational, used by the host player)
    pub stream_url: Option<String>,

    /// Per-request timeout for poll fetches and vote submissions
    pub request_timeout: Duration,

    /// User-Agent header sent to the poll service
    pub user_agent: String,

    /// Handling of cues that fail to decode
    pub decode_error_policy: DecodeErrorPolicy,

    /// Duplicate vote handling
    pub vote_guard: VoteGuard,

    /// Capacity of the session's inbound event queue
    pub event_capacity: usize,

    /// Capacity of the rendered view broadcast channel
    pub view_capacity: usize,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            service_base_url: Url::parse(DEFAULT_SERVICE_BASE_URL)
                .expect("default service URL is valid"),
            stream_url: None,
            request_timeout: Duration::from_secs(8),
            user_agent: concat!("stream-overlay/", env!("CARGO_PKG_VERSION")).to_string(),
            decode_error_policy: DecodeErrorPolicy::Clear,
            vote_guard: VoteGuard::Unguarded,
            event_capacity: 256,
            view_capacity: 16,
        }
    }
}

impl OverlayConfig {
    /// Create a config pointing at a poll service
    pub fn with_base_url(url: &str) -> Result<Self, ConfigError> {
        Ok(Self::default().base_url(parse_base_url(url)?))
    }

    /// Set the poll service base URL
    pub fn base_url(mut self, url: Url) -> Self {
        self.service_base_url = url;
        self
    }

    /// Set the stream URL
    pub fn stream_url(mut self, url: impl Into<String>) -> Self {
        self.stream_url = Some(url.into());
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the decode error policy
    pub fn decode_error_policy(mut self, policy: DecodeErrorPolicy) -> Self {
        self.decode_error_policy = policy;
        self
    }

    /// Set duplicate vote handling
    pub fn vote_guard(mut self, guard: VoteGuard) -> Self {
        self.vote_guard = guard;
        self
    }

    /// Set event queue capacity (at least 1)
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Set view channel capacity (at least 1)
    pub fn view_capacity(mut self, capacity: usize) -> Self {
        self.view_capacity = capacity.max(1);
        self
    }
}

fn parse_base_url(url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", parsed.scheme())));
    }
    Ok(parsed)
}
