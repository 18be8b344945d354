//! HTTP transport used by the request gateway.
//!
//! The gateway only needs "GET this URL, give me the status and body". That
//! seam is the `HttpTransport` trait, implemented over `reqwest` for real
//! traffic and over canned replies in tests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before a response was received
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError>;
}

/// Transport backed by a shared `reqwest::Client`
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("ExploreFlix/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Canned reply for a route
    #[derive(Debug, Clone)]
    pub enum Reply {
        /// Respond with a status and body
        Body(u16, String),
        /// Fail before any response
        Fail,
        /// Respond with `{}` after a delay
        Hang(Duration),
    }

    impl Reply {
        pub fn json(value: serde_json::Value) -> Self {
            Reply::Body(200, value.to_string())
        }
    }

    struct Route {
        pattern: String,
        replies: VecDeque<Reply>,
    }

    /// In-memory transport.
    ///
    /// A URL is served by the first route whose pattern it contains. Each
    /// route plays its replies in order and then repeats the last one. URLs
    /// with no route fail like a dropped connection.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<Vec<Route>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(self, pattern: &str, reply: Reply) -> Self {
            {
                let mut routes = self.routes.lock().unwrap();
                match routes.iter_mut().find(|r| r.pattern == pattern) {
                    Some(route) => route.replies.push_back(reply),
                    None => routes.push(Route {
                        pattern: pattern.to_string(),
                        replies: VecDeque::from([reply]),
                    }),
                }
            }
            self
        }

        pub fn json(self, pattern: &str, value: serde_json::Value) -> Self {
            self.route(pattern, Reply::json(value))
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_matching(&self, pattern: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|url| url.contains(pattern))
                .count()
        }

        fn next_reply(&self, url: &str) -> Option<Reply> {
            let mut routes = self.routes.lock().unwrap();
            let route = routes.iter_mut().find(|r| url.contains(&r.pattern))?;
            if route.replies.len() > 1 {
                route.replies.pop_front()
            } else {
                route.replies.front().cloned()
            }
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str) -> Result<TransportResponse, TransportError> {
            self.calls.lock().unwrap().push(url.to_string());

            match self.next_reply(url) {
                Some(Reply::Body(status, body)) => Ok(TransportResponse { status, body }),
                Some(Reply::Hang(delay)) => {
                    tokio::time::sleep(delay).await;
                    Ok(TransportResponse {
                        status: 200,
                        body: "{}".to_string(),
                    })
                }
                Some(Reply::Fail) | None => {
                    Err(TransportError::Other(format!("connection refused: {}", url)))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockTransport, Reply};
    use super::*;

    #[test]
    fn test_success_range() {
        let ok = TransportResponse {
            status: 204,
            body: String::new(),
        };
        let limited = TransportResponse {
            status: 429,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!limited.is_success());
    }

    #[test]
    fn test_client_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }

    #[tokio::test]
    async fn test_mock_replays_then_repeats_last() {
        let transport = MockTransport::new()
            .route("/a", Reply::Body(500, "{}".to_string()))
            .route("/a", Reply::Body(200, "ok".to_string()));

        assert_eq!(transport.get("http://x/a").await.unwrap().status, 500);
        assert_eq!(transport.get("http://x/a").await.unwrap().status, 200);
        assert_eq!(transport.get("http://x/a").await.unwrap().status, 200);
        assert!(transport.get("http://x/b").await.is_err());
        assert_eq!(transport.calls_matching("/a"), 3);
    }
}
