//! HTTP client for the remote quote service.
//!
//! This is the only place remote schema knowledge lives: each remote record
//! maps deterministically to one [`Quote`], keeping the reconciler isolated
//! from transport concerns.

use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use quotesync_core::quotes::Quote;
use quotesync_core::sync::{PushOutcome, RemoteGateway};

use crate::error::{RemoteSyncError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_LOG_BODY_CHARS: usize = 512;

/// Path of the quote collection resource under the base URL.
const QUOTES_PATH: &str = "/posts";

/// Read the remote service base URL from the environment.
pub fn base_url_from_env() -> Option<String> {
    std::env::var("QUOTE_SYNC_API_URL")
        .ok()
        .map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
}

/// One record in the remote service's schema.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemotePostRecord {
    #[serde(default)]
    id: Option<i64>,
    title: String,
    #[serde(default)]
    user_id: i64,
}

/// Request body for creating a record in the remote schema.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewRemotePost<'a> {
    title: &'a str,
    body: &'a str,
    user_id: i64,
}

impl RemotePostRecord {
    /// Adapt one remote record into the quote model.
    fn into_quote(self) -> Result<Quote> {
        if self.title.trim().is_empty() {
            return Err(RemoteSyncError::schema(
                "Remote record has an empty title",
            ));
        }
        Ok(Quote::new(
            self.id.map(|value| value.to_string()),
            self.title,
            format!("User {}", self.user_id),
        ))
    }
}

/// Client for the remote quote service API.
#[derive(Debug, Clone)]
pub struct RemoteQuoteClient {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteQuoteClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the remote service
    ///   (e.g., "https://jsonplaceholder.typicode.com")
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    fn body_preview(body: &str) -> String {
        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        preview
    }

    /// Fetch the remote snapshot.
    ///
    /// GET {base_url}/posts
    async fn fetch_posts(&self) -> Result<Vec<Quote>> {
        let url = format!("{}{}", self.base_url, QUOTES_PATH);
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            return Err(RemoteSyncError::api(
                status.as_u16(),
                format!("Request failed: {}", Self::body_preview(&body)),
            ));
        }

        let records: Vec<RemotePostRecord> = serde_json::from_str(&body)?;
        records
            .into_iter()
            .map(RemotePostRecord::into_quote)
            .collect()
    }

    /// Push one quote as a new remote record.
    ///
    /// POST {base_url}/posts
    async fn post_quote(&self, quote: &Quote) -> Result<PushOutcome> {
        let url = format!("{}{}", self.base_url, QUOTES_PATH);
        let response = self
            .client
            .post(&url)
            .json(&NewRemotePost {
                title: &quote.text,
                body: &quote.category,
                user_id: 1,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if status.is_success() {
            Ok(PushOutcome::Accepted)
        } else {
            Ok(PushOutcome::Rejected {
                reason: format!("HTTP {}: {}", status.as_u16(), Self::body_preview(&body)),
            })
        }
    }
}

#[async_trait]
impl RemoteGateway for RemoteQuoteClient {
    async fn fetch_remote(&self) -> quotesync_core::Result<Vec<Quote>> {
        Ok(self.fetch_posts().await?)
    }

    async fn push_local(&self, quotes: &[Quote]) -> quotesync_core::Result<PushOutcome> {
        for quote in quotes {
            match self.post_quote(quote).await? {
                PushOutcome::Accepted => {}
                rejected => return Ok(rejected),
            }
        }
        Ok(PushOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::Mutex as TokioMutex;

    #[derive(Debug, Clone)]
    struct CapturedRequest {
        request_line: String,
        body: String,
    }

    #[derive(Debug, Clone)]
    struct MockResponse {
        status: u16,
        body: String,
    }

    fn header_end_offset(buffer: &[u8]) -> Option<usize> {
        buffer.windows(4).position(|window| window == b"\r\n\r\n")
    }

    async fn read_http_request(
        stream: &mut tokio::net::TcpStream,
    ) -> Option<(String, HashMap<String, String>, String)> {
        let mut buffer = Vec::new();
        loop {
            let mut chunk = [0_u8; 2048];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                return None;
            }
            buffer.extend_from_slice(&chunk[..read]);
            if header_end_offset(&buffer).is_some() {
                break;
            }
        }

        let header_end = header_end_offset(&buffer)?;
        let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
        let mut lines = head.lines();
        let request_line = lines.next()?.to_string();

        let mut headers = HashMap::new();
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        let content_length = headers
            .get("content-length")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(0);

        let mut body = buffer[header_end + 4..].to_vec();
        while body.len() < content_length {
            let mut chunk = [0_u8; 2048];
            let read = stream.read(&mut chunk).await.ok()?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..read]);
        }

        Some((
            request_line,
            headers,
            String::from_utf8_lossy(&body).to_string(),
        ))
    }

    fn status_text(status: u16) -> &'static str {
        match status {
            200 => "OK",
            201 => "Created",
            400 => "Bad Request",
            500 => "Internal Server Error",
            _ => "Error",
        }
    }

    async fn write_http_response(
        stream: &mut tokio::net::TcpStream,
        status: u16,
        body: &str,
    ) -> std::io::Result<()> {
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            status_text(status),
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await?;
        stream.flush().await
    }

    async fn start_mock_server(
        responses: Vec<MockResponse>,
    ) -> (
        String,
        Arc<TokioMutex<Vec<CapturedRequest>>>,
        tokio::task::JoinHandle<()>,
    ) {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        let captured = Arc::new(TokioMutex::new(Vec::<CapturedRequest>::new()));
        let scripted = Arc::new(TokioMutex::new(VecDeque::from(responses)));
        let captured_clone = Arc::clone(&captured);
        let scripted_clone = Arc::clone(&scripted);

        let handle = tokio::spawn(async move {
            loop {
                let (mut stream, _) = match listener.accept().await {
                    Ok(value) => value,
                    Err(_) => break,
                };
                let captured_inner = Arc::clone(&captured_clone);
                let scripted_inner = Arc::clone(&scripted_clone);
                tokio::spawn(async move {
                    let Some((request_line, _headers, body)) =
                        read_http_request(&mut stream).await
                    else {
                        return;
                    };
                    captured_inner
                        .lock()
                        .await
                        .push(CapturedRequest { request_line, body });

                    let response = scripted_inner.lock().await.pop_front().unwrap_or(
                        MockResponse {
                            status: 500,
                            body: r#"{"error":"unexpected request"}"#.to_string(),
                        },
                    );
                    let _ = write_http_response(&mut stream, response.status, &response.body).await;
                });
            }
        });

        (format!("http://{}", addr), captured, handle)
    }

    #[tokio::test]
    async fn fetch_adapts_remote_records_into_quotes() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 200,
            body: r#"[{"id":1,"title":"A","userId":7},{"title":"B","userId":7}]"#.to_string(),
        }])
        .await;

        let client = RemoteQuoteClient::new(&base_url);
        let quotes = client.fetch_remote().await.expect("fetch success");

        assert_eq!(
            quotes,
            vec![
                Quote::new(Some("1".to_string()), "A", "User 7"),
                Quote::new(None, "B", "User 7"),
            ]
        );
        let requests = captured.lock().await.clone();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].request_line.starts_with("GET /posts"));

        server.abort();
    }

    #[tokio::test]
    async fn fetch_maps_non_success_status_to_network_error() {
        let (base_url, _captured, server) = start_mock_server(vec![MockResponse {
            status: 500,
            body: r#"{"error":"boom"}"#.to_string(),
        }])
        .await;

        let client = RemoteQuoteClient::new(&base_url);
        let err = client.fetch_remote().await.expect_err("fetch failure");
        assert!(matches!(err, quotesync_core::Error::Network(_)));

        server.abort();
    }

    #[tokio::test]
    async fn fetch_maps_malformed_body_to_network_error() {
        let (base_url, _captured, server) = start_mock_server(vec![MockResponse {
            status: 200,
            body: "{not json".to_string(),
        }])
        .await;

        let client = RemoteQuoteClient::new(&base_url);
        let err = client.fetch_remote().await.expect_err("parse failure");
        assert!(matches!(err, quotesync_core::Error::Network(_)));

        server.abort();
    }

    #[tokio::test]
    async fn fetch_rejects_records_violating_the_quote_model() {
        let (base_url, _captured, server) = start_mock_server(vec![MockResponse {
            status: 200,
            body: r#"[{"id":1,"title":"  ","userId":7}]"#.to_string(),
        }])
        .await;

        let client = RemoteQuoteClient::new(&base_url);
        let err = client.fetch_remote().await.expect_err("schema failure");
        assert!(matches!(err, quotesync_core::Error::Format(_)));

        server.abort();
    }

    #[tokio::test]
    async fn push_posts_the_remote_schema_and_reports_accepted() {
        let (base_url, captured, server) = start_mock_server(vec![MockResponse {
            status: 201,
            body: r#"{"id":101,"title":"A","body":"X","userId":1}"#.to_string(),
        }])
        .await;

        let client = RemoteQuoteClient::new(&base_url);
        let outcome = client
            .push_local(&[Quote::new(None, "A", "X")])
            .await
            .expect("push success");

        assert_eq!(outcome, PushOutcome::Accepted);
        let requests = captured.lock().await.clone();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].request_line.starts_with("POST /posts"));
        assert_eq!(
            requests[0].body,
            r#"{"title":"A","body":"X","userId":1}"#
        );

        server.abort();
    }

    #[tokio::test]
    async fn push_reports_rejected_on_non_success_status() {
        let (base_url, _captured, server) = start_mock_server(vec![MockResponse {
            status: 400,
            body: r#"{"error":"invalid"}"#.to_string(),
        }])
        .await;

        let client = RemoteQuoteClient::new(&base_url);
        let outcome = client
            .push_local(&[Quote::new(None, "A", "X")])
            .await
            .expect("push completes");

        match outcome {
            PushOutcome::Rejected { reason } => assert!(reason.contains("400")),
            other => panic!("expected rejection, got {:?}", other),
        }

        server.abort();
    }
}
