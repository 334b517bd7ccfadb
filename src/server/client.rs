use crate::app::config::ServerConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Job-creation request body for `POST /download`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadRequest {
    pub url: String,
    pub quality: String,
    pub format: String,
    pub output_path: String,
    pub use_firefox_cookies: bool,
}

/// Server answer to a job-creation request
///
/// The server signals failure in the body, not only in the status code,
/// so this parses for any response that carries JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DownloadReceipt {
    pub success: bool,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One entry of the server-owned queue; read-only on this side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    pub url: String,
    pub quality: String,
    pub format_selector: String,
}

/// Result of the yt-dlp installation probe
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ToolCheck {
    pub installed: bool,
    #[serde(default)]
    pub version: Option<String>,
}

/// Typed client for the download server's HTTP contract
#[derive(Clone)]
pub struct ServerClient {
    client: reqwest::Client,
    base_url: String,
}

impl ServerClient {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        Self::from_base_url(server.base_url())
    }

    pub fn from_base_url(base_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("vda/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Health probe; any transport failure or non-2xx counts as unhealthy
    pub async fn is_healthy(&self) -> bool {
        let url = format!("{}/status", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!("Health probe failed: {}", e);
                false
            }
        }
    }

    /// Current job queue
    pub async fn fetch_queue(&self) -> Result<Vec<QueueItem>, reqwest::Error> {
        let url = format!("{}/queue", self.base_url);
        self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// yt-dlp installation probe
    pub async fn check_ytdlp(&self) -> Result<ToolCheck, reqwest::Error> {
        let url = format!("{}/check-ytdlp", self.base_url);
        self.client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
    }

    /// Create a download job
    ///
    /// A rejected job still comes back as a parseable receipt carrying the
    /// server's error text. A non-2xx status forces `success: false` even
    /// if the body claims otherwise.
    pub async fn submit_download(
        &self,
        request: &DownloadRequest,
    ) -> Result<DownloadReceipt, reqwest::Error> {
        let url = format!("{}/download", self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        let http_ok = response.status().is_success();
        let mut receipt: DownloadReceipt = response.json().await?;
        receipt.success = receipt.success && http_ok;
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ServerClient {
        ServerClient::from_base_url(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_health_probe_accepts_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "running", "version": "0.3.0"
            })))
            .mount(&server)
            .await;

        assert!(test_client(&server).is_healthy().await);
    }

    #[tokio::test]
    async fn test_health_probe_rejects_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        assert!(!test_client(&server).is_healthy().await);
    }

    #[tokio::test]
    async fn test_health_probe_rejects_unreachable_host() {
        let client = ServerClient::from_base_url("http://127.0.0.1:1".to_string()).unwrap();
        assert!(!client.is_healthy().await);
    }

    #[tokio::test]
    async fn test_fetch_queue_ignores_unknown_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/queue"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {
                    "id": 3,
                    "title": "A Talk",
                    "url": "https://video.test/a",
                    "quality": "best",
                    "format_selector": "mp4",
                    "subfolder": "talks",
                    "username": null,
                    "password": null
                },
                {
                    "id": 4,
                    "url": "https://video.test/b",
                    "quality": "worst",
                    "format_selector": "webm"
                }
            ])))
            .mount(&server)
            .await;

        let queue = test_client(&server).fetch_queue().await.unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue[0].id, 3);
        assert_eq!(queue[0].title.as_deref(), Some("A Talk"));
        assert_eq!(queue[1].title, None);
        assert_eq!(queue[1].format_selector, "webm");
    }

    #[tokio::test]
    async fn test_check_ytdlp_carries_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/check-ytdlp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "installed": true,
                "version": "2025.08.11",
                "message": "yt-dlp is available"
            })))
            .mount(&server)
            .await;

        let check = test_client(&server).check_ytdlp().await.unwrap();
        assert_eq!(
            check,
            ToolCheck {
                installed: true,
                version: Some("2025.08.11".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_submit_download_sends_exact_body() {
        let server = MockServer::start().await;
        let request = DownloadRequest {
            url: "https://video.test/watch?v=9".to_string(),
            quality: "best".to_string(),
            format: "mp4".to_string(),
            output_path: "Downloads".to_string(),
            use_firefox_cookies: false,
        };

        Mock::given(method("POST"))
            .and(path("/download"))
            .and(body_json(serde_json::json!({
                "url": "https://video.test/watch?v=9",
                "quality": "best",
                "format": "mp4",
                "output_path": "Downloads",
                "use_firefox_cookies": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "id": 12,
                "message": "queued"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = test_client(&server).submit_download(&request).await.unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.id, Some(12));
    }

    #[tokio::test]
    async fn test_submit_download_parses_error_body_on_4xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/download"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "success": false,
                "error": "Invalid URL",
                "id": null
            })))
            .mount(&server)
            .await;

        let request = DownloadRequest {
            url: "garbage".to_string(),
            quality: "best".to_string(),
            format: "mp4".to_string(),
            output_path: "Downloads".to_string(),
            use_firefox_cookies: false,
        };

        let receipt = test_client(&server).submit_download(&request).await.unwrap();
        assert!(!receipt.success);
        assert_eq!(receipt.error.as_deref(), Some("Invalid URL"));
    }
}
