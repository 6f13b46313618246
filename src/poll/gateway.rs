//! Poll service gateway
//!
//! Two operations against the remote poll service:
//!
//! ```text
//! GET  {base}/polls/{id}        -> {"data": {"id", "question", "options": [...]}}
//! POST {base}/polls/{id}/votes  <- {"answer": "...", "userId": "..."}
//! ```
//!
//! Both are single attempts. The session spawns them and never blocks its
//! event loop on either.

use std::future::Future;
use std::time::Duration;

use reqwest::Url;

use super::detail::{PollDetail, PollResponse, Vote};
use crate::error::{ConfigError, FetchError, SubmitError};
use crate::session::config::OverlayConfig;

/// Remote poll service
///
/// Implementations must be shareable across the tasks the session spawns.
pub trait PollGateway: Send + Sync + 'static {
    /// Fetch the full poll for `poll_id`
    fn fetch_poll(
        &self,
        poll_id: &str,
    ) -> impl Future<Output = Result<PollDetail, FetchError>> + Send;

    /// Submit one vote for `poll_id`. The response body is ignored.
    fn submit_vote(
        &self,
        poll_id: &str,
        vote: &Vote,
    ) -> impl Future<Output = Result<(), SubmitError>> + Send;
}

/// HTTP implementation of [`PollGateway`]
#[derive(Debug, Clone)]
pub struct HttpPollGateway {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpPollGateway {
    /// Build a gateway from the overlay configuration
    pub fn new(config: &OverlayConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout.max(Duration::from_millis(100)))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self::with_client(client, config.service_base_url.clone()))
    }

    /// Use an existing client
    pub fn with_client(client: reqwest::Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Service base URL
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/polls/{id}` followed by `extra` segments, each percent-encoded
    fn poll_url(&self, poll_id: &str, extra: &[&str]) -> Option<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .push("polls")
            .push(poll_id)
            .extend(extra);
        Some(url)
    }
}

impl PollGateway for HttpPollGateway {
    async fn fetch_poll(&self, poll_id: &str) -> Result<PollDetail, FetchError> {
        let url = self
            .poll_url(poll_id, &[])
            .ok_or_else(|| FetchError::Transport(format!("base URL {} cannot carry a path", self.base_url)))?;

        tracing::debug!(poll_id = %poll_id, url = %url, "Fetching poll");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: PollResponse = response.json().await?;
        body.data.validate()?;
        Ok(body.data)
    }

    async fn submit_vote(&self, poll_id: &str, vote: &Vote) -> Result<(), SubmitError> {
        let url = self
            .poll_url(poll_id, &["votes"])
            .ok_or_else(|| SubmitError::Transport(format!("base URL {} cannot carry a path", self.base_url)))?;

        tracing::debug!(poll_id = %poll_id, answer = %vote.answer, "Submitting vote");

        let response = self.client.post(url).json(vote).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SubmitError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    use super::*;

    /// Serve one canned response and hand back the raw request text
    async fn serve_once(status: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            request
        });

        (Url::parse(&format!("http://{}/", addr)).unwrap(), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        String::from_utf8_lossy(&buf).into_owned()
    }

    fn gateway(base_url: Url) -> HttpPollGateway {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpPollGateway::with_client(client, base_url)
    }

    #[tokio::test]
    async fn test_fetch_poll() {
        let body = r#"{"data":{"id":"abc","question":"Time for DRG?","options":[{"id":"y","label":"Yes"},{"id":"n","label":"No"}]}}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let detail = gateway(base).fetch_poll("abc").await.unwrap();
        assert_eq!(detail.id, "abc");
        assert_eq!(detail.options.len(), 2);
        assert_eq!(detail.options[0].label, "Yes");

        let request = server.await.unwrap();
        assert!(request.starts_with("GET /polls/abc HTTP/1.1"), "{}", request);
    }

    #[tokio::test]
    async fn test_fetch_poll_status_error() {
        let (base, server) = serve_once("404 Not Found", "{}").await;

        let result = gateway(base).fetch_poll("missing").await;
        assert_eq!(result, Err(FetchError::Status(404)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_poll_schema_mismatch() {
        let (base, server) = serve_once("200 OK", r#"{"data":{"id":"abc"}}"#).await;

        let result = gateway(base).fetch_poll("abc").await;
        assert!(matches!(result, Err(FetchError::SchemaMismatch(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_poll_duplicate_options() {
        let body = r#"{"data":{"id":"abc","question":"q","options":[{"id":"y","label":"Yes"},{"id":"y","label":"Yes!"}]}}"#;
        let (base, server) = serve_once("200 OK", body).await;

        let result = gateway(base).fetch_poll("abc").await;
        assert!(matches!(result, Err(FetchError::SchemaMismatch(_))));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_poll_transport_error() {
        // Bind then drop to get a port with nothing listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let base = Url::parse(&format!("http://{}/", addr)).unwrap();
        let result = gateway(base).fetch_poll("abc").await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_submit_vote() {
        let (base, server) = serve_once("201 Created", "{}").await;

        let vote = Vote {
            answer: "y".into(),
            user_id: "123".into(),
        };
        gateway(base).submit_vote("abc", &vote).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /polls/abc/votes HTTP/1.1"), "{}", request);
        assert!(request.ends_with(r#"{"answer":"y","userId":"123"}"#), "{}", request);
    }

    #[tokio::test]
    async fn test_submit_vote_status_error() {
        let (base, server) = serve_once("500 Internal Server Error", "{}").await;

        let vote = Vote {
            answer: "y".into(),
            user_id: "1".into(),
        };
        let result = gateway(base).submit_vote("abc", &vote).await;
        assert_eq!(result, Err(SubmitError::Status(500)));
        server.await.unwrap();
    }

    #[test]
    fn test_poll_url_encoding() {
        let gw = gateway(Url::parse("http://svc.local/api/").unwrap());

        let url = gw.poll_url("a b/c", &["votes"]).unwrap();
        assert_eq!(url.as_str(), "http://svc.local/api/polls/a%20b%2Fc/votes");

        let gw = gateway(Url::parse("http://svc.local").unwrap());
        assert_eq!(gw.poll_url("abc", &[]).unwrap().as_str(), "http://svc.local/polls/abc");
    }
}
