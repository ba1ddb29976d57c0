//! JSON relay client.

use async_trait::async_trait;
use deck_core::resolve::is_data_uri;
use deck_core::{Error, ImageResolver, ResolvedImage, Result};
use serde::Deserialize;
use std::time::Duration;

/// Relay endpoint; the URL-encoded image URL is appended to it.
pub const DEFAULT_RELAY_URL: &str = "https://api.allorigins.win/get?url=";

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Relay connection settings.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    base_url: String,
    timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_RELAY_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl RelayConfig {
    /// Create a config pointing at the default relay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different relay endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The relay endpoint.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

/// Envelope returned by the relay.
#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
    status: Option<RelayStatus>,
}

/// Upstream status reported inside the envelope.
#[derive(Debug, Deserialize)]
struct RelayStatus {
    http_code: Option<u16>,
}

/// Resolves images by fetching them through the relay.
#[derive(Debug, Clone)]
pub struct RelayResolver {
    client: reqwest::Client,
    config: RelayConfig,
}

impl RelayResolver {
    /// Create a resolver for the default relay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageFetch`] if the HTTP client can't be initialised.
    pub fn new() -> Result<Self> {
        Self::with_config(RelayConfig::default())
    }

    /// Create a resolver with custom settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageFetch`] if the HTTP client can't be initialised.
    pub fn with_config(config: RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::ImageFetch {
                url: config.base_url.clone(),
                reason: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, config })
    }

    /// The settings this resolver uses.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Relay URL that fetches `source`.
    pub fn request_url(&self, source: &str) -> String {
        format!("{}{}", self.config.base_url, urlencoding::encode(source))
    }

    async fn fetch(&self, source: &str) -> Result<String> {
        let url = self.request_url(source);
        log::debug!("Fetching via relay: {}", url);

        let fetch_error = |reason: String| Error::ImageFetch {
            url: source.to_string(),
            reason,
        };

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                fetch_error(format!(
                    "relay timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            } else {
                fetch_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| fetch_error(format!("Failed to read relay response: {}", e)))
    }
}

#[async_trait]
impl ImageResolver for RelayResolver {
    async fn resolve(&self, source: &str) -> Result<ResolvedImage> {
        if is_data_uri(source) {
            log::debug!("Image is inline, skipping relay");
            return ResolvedImage::from_data_uri(source, source);
        }

        let body = self.fetch(source).await?;
        parse_envelope(source, &body)
    }
}

/// Turn a relay response body into an image.
fn parse_envelope(source: &str, body: &str) -> Result<ResolvedImage> {
    let envelope: Envelope = serde_json::from_str(body).map_err(|e| Error::ImageData {
        url: source.to_string(),
        reason: format!("relay response is not a JSON envelope: {}", e),
    })?;

    if let Some(code) = envelope.status.and_then(|s| s.http_code) {
        if !(200..300).contains(&code) {
            return Err(Error::ImageFetch {
                url: source.to_string(),
                reason: format!("upstream returned HTTP {}", code),
            });
        }
    }

    let contents = envelope
        .contents
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| Error::ImageData {
            url: source.to_string(),
            reason: "relay response has no contents".to_string(),
        })?;

    ResolvedImage::from_data_uri(source, &contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // 1x1 transparent PNG
    const PIXEL: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAQAAAC1HAwCAAAAC0lEQVR42mNkYAAAAAYAAjCB0C8AAAAASUVORK5CYII=";

    /// Serve one connection on a local port and return a relay base URL for it.
    ///
    /// With `None` the connection is accepted but never answered.
    async fn serve_once(response: Option<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut request = [0u8; 4096];
            let _ = socket.read(&mut request).await;

            match response {
                Some(response) => {
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
                None => tokio::time::sleep(Duration::from_secs(10)).await,
            }
        });

        format!("http://{}/get?url=", addr)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn resolver_for(base_url: String, timeout: Duration) -> RelayResolver {
        let config = RelayConfig::new()
            .with_base_url(base_url)
            .with_timeout(timeout);
        RelayResolver::with_config(config).unwrap()
    }

    #[test]
    fn test_request_url_encodes_source() {
        let resolver = RelayResolver::new().unwrap();
        assert_eq!(
            resolver.request_url("https://example.com/a b.png?x=1&y=2"),
            "https://api.allorigins.win/get?url=https%3A%2F%2Fexample.com%2Fa%20b.png%3Fx%3D1%26y%3D2"
        );
    }

    #[test]
    fn test_config_builder() {
        let config = RelayConfig::new()
            .with_base_url("http://localhost:8080/raw?u=")
            .with_timeout(Duration::from_secs(5));
        let resolver = RelayResolver::with_config(config).unwrap();

        assert_eq!(resolver.config().timeout(), Duration::from_secs(5));
        assert_eq!(
            resolver.request_url("a.png"),
            "http://localhost:8080/raw?u=a.png"
        );
    }

    #[test]
    fn test_parse_envelope() {
        let body = format!(
            r#"{{"contents":"data:image/png;base64,{}","status":{{"url":"https://example.com/p.png","http_code":200}}}}"#,
            PIXEL
        );
        let image = parse_envelope("https://example.com/p.png", &body).unwrap();
        assert_eq!(image.source, "https://example.com/p.png");
        assert_eq!(image.media_type, "image/png");
        assert!(image.data.starts_with(&[0x89, b'P', b'N', b'G']));
    }

    #[test]
    fn test_parse_envelope_without_status() {
        let body = format!(r#"{{"contents":"data:image/gif;base64,{}"}}"#, PIXEL);
        let image = parse_envelope("x", &body).unwrap();
        assert_eq!(image.media_type, "image/gif");
    }

    #[test]
    fn test_parse_envelope_missing_contents() {
        for body in [
            r#"{}"#,
            r#"{"contents":null}"#,
            r#"{"contents":"  "}"#,
            r#"not json"#,
            r#"{"contents":"<html>blocked</html>"}"#,
        ] {
            assert!(
                matches!(parse_envelope("x", body), Err(Error::ImageData { .. })),
                "expected ImageData error for {body}"
            );
        }
    }

    #[test]
    fn test_parse_envelope_upstream_failure() {
        let body = r#"{"contents":null,"status":{"http_code":404}}"#;
        let err = parse_envelope("https://example.com/missing.png", body).unwrap_err();
        match err {
            Error::ImageFetch { url, reason } => {
                assert_eq!(url, "https://example.com/missing.png");
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inline_images_skip_the_relay() {
        // Unroutable relay: any network attempt would fail.
        let config = RelayConfig::new().with_base_url("http://127.0.0.1:9/?url=");
        let resolver = RelayResolver::with_config(config).unwrap();

        let uri = format!("data:image/png;base64,{}", PIXEL);
        let image = resolver.resolve(&uri).await.unwrap();
        assert_eq!(image.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_relay_error_status_is_a_fetch_error() {
        let base = serve_once(Some(http_response("404 Not Found", ""))).await;
        let resolver = resolver_for(base, Duration::from_secs(5));

        match resolver.resolve("https://example.com/a.png").await {
            Err(Error::ImageFetch { url, reason }) => {
                assert_eq!(url, "https://example.com/a.png");
                assert!(reason.contains("404"), "unexpected reason: {reason}");
            }
            other => panic!("expected ImageFetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_silent_relay_times_out() {
        let base = serve_once(None).await;
        let resolver = resolver_for(base, Duration::from_millis(300));

        match resolver.resolve("https://example.com/slow.png").await {
            Err(Error::ImageFetch { reason, .. }) => {
                assert!(reason.contains("timed out"), "unexpected reason: {reason}");
            }
            other => panic!("expected ImageFetch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_a_fetch_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resolver = resolver_for(format!("http://{}/get?url=", addr), Duration::from_secs(5));
        let result = resolver.resolve("https://example.com/a.png").await;
        assert!(matches!(result, Err(Error::ImageFetch { .. })));
    }

    #[tokio::test]
    async fn test_envelope_without_contents_is_a_data_error() {
        let body = r#"{"contents":null,"status":{"http_code":200}}"#;
        let base = serve_once(Some(http_response("200 OK", body))).await;
        let resolver = resolver_for(base, Duration::from_secs(5));

        let result = resolver.resolve("https://example.com/a.png").await;
        assert!(matches!(result, Err(Error::ImageData { .. })));
    }

    #[tokio::test]
    async fn test_image_fetched_through_relay() {
        let body = format!(r#"{{"contents":"data:image/png;base64,{}"}}"#, PIXEL);
        let base = serve_once(Some(http_response("200 OK", &body))).await;
        let resolver = resolver_for(base, Duration::from_secs(5));

        let image = resolver.resolve("https://example.com/p.png").await.unwrap();
        assert_eq!(image.source, "https://example.com/p.png");
        assert!(image.data.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
