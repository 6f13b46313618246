//! Error types for stream-overlay
//!
//! Each pipeline stage has its own error type so that the session can decide
//! per stage whether a failure is absorbed, logged, or surfaced. None of these
//! errors is fatal to playback.

use thiserror::Error;

use crate::cue::MetadataType;

/// Result type alias using the crate's umbrella error
pub type Result<T> = std::result::Result<T, Error>;

/// Umbrella error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("cue decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("poll fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("vote submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("script data error: {0}")]
    Script(#[from] ScriptError),

    #[error("overlay store error: {0}")]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("session closed")]
    SessionClosed,

    #[error("session event queue is full")]
    QueueFull,
}

/// Failure to turn raw cue text into an envelope
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Not structured data at all (invalid JSON, or not a JSON object)
    #[error("malformed cue: {0}")]
    Malformed(String),

    /// Structured, but `type` is missing or outside the known set
    #[error("unknown metadata type: {}", .0.as_deref().unwrap_or("<missing>"))]
    UnknownType(Option<String>),

    /// Known `type`, but the payload has the wrong shape
    #[error("{kind} payload mismatch: {reason}")]
    SchemaMismatch { kind: MetadataType, reason: String },
}

/// Failure to fetch poll detail
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Failure to submit a vote
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("transport: {0}")]
    Transport(String),

    #[error("unexpected status {0}")]
    Status(u16),
}

/// Failure to read an AMF0 script data body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("unexpected end of script data")]
    UnexpectedEof,

    #[error("invalid UTF-8 in script data string")]
    InvalidUtf8,

    #[error("script data nesting too deep")]
    NestingTooDeep,

    #[error("unknown AMF0 marker 0x{0:02x}")]
    UnknownMarker(u8),

    #[error("script data does not start with a handler name")]
    NotAHandler,
}

/// Overlay store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The overlay was torn down
    #[error("overlay store is closed")]
    Closed,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid service base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::SchemaMismatch(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<reqwest::Error> for SubmitError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => SubmitError::Status(status.as_u16()),
            None => SubmitError::Transport(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_display() {
        let e = DecodeError::UnknownType(Some("quiz".into()));
        assert_eq!(e.to_string(), "unknown metadata type: quiz");

        let e = DecodeError::UnknownType(None);
        assert_eq!(e.to_string(), "unknown metadata type: <missing>");
    }

    #[test]
    fn test_schema_mismatch_display() {
        let e = DecodeError::SchemaMismatch {
            kind: MetadataType::Poll,
            reason: "missing field `id`".into(),
        };
        assert_eq!(e.to_string(), "poll payload mismatch: missing field `id`");
    }

    #[test]
    fn test_umbrella_from() {
        let e: Error = FetchError::Status(404).into();
        assert!(matches!(e, Error::Fetch(FetchError::Status(404))));

        let e: Error = StoreError::Closed.into();
        assert_eq!(e.to_string(), "overlay store error: overlay store is closed");
    }
}
