use vda::app::config::Config;
use vda::extract::VideoInfo;
use vda::server::SubmitOptions;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Setup a mock download server whose /status answers 200 and whose
/// /queue answers with `queue` as JSON
/// Returns (MockServer, base_url)
pub async fn setup_download_server(queue: serde_json::Value) -> (MockServer, String) {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "running",
            "version": "0.3.0"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/queue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(queue))
        .mount(&server)
        .await;

    (server, uri)
}

/// One queue entry in the shape the server reports
pub fn queue_entry(id: u64, url: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "title": format!("Video {}", id),
        "url": url,
        "quality": "best",
        "format_selector": "mp4"
    })
}

/// Mount a POST /download that accepts every job with a fixed id
#[allow(dead_code)]
pub async fn mount_download_accept(server: &MockServer, id: u64) {
    Mock::given(method("POST"))
        .and(path("/download"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "id": id,
            "message": "queued"
        })))
        .mount(server)
        .await;
}

/// Setup a mock server serving one video page at `route`
/// Returns (MockServer, page_url)
#[allow(dead_code)]
pub async fn setup_video_page(route: &str, title: &str) -> (MockServer, String) {
    let server = MockServer::start().await;
    let html = format!(
        concat!(
            "<html><head><title>{}</title>\n",
            "<meta property=\"og:image\" content=\"https://cdn.test/thumb.jpg\">\n",
            "</head><body><video src=\"/clip.mp4\"></video></body></html>"
        ),
        title
    );

    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&server)
        .await;

    let page_url = format!("{}{}", server.uri(), route);
    (server, page_url)
}

/// Create a configuration pointed at a mock server
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    let addr = server.address();
    config.server.host = addr.ip().to_string();
    config.server.port = addr.port();
    config
}

/// Create an extraction record for a plain page
#[allow(dead_code)]
pub fn sample_video(url: &str) -> VideoInfo {
    VideoInfo::new(url.to_string(), "Sample Video".to_string(), String::new())
}

/// Submission options matching the defaults of a fresh configuration
#[allow(dead_code)]
pub fn default_options() -> SubmitOptions {
    SubmitOptions {
        quality: "best".to_string(),
        format: "mp4".to_string(),
        output_folder: "Downloads".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_download_server_setup() {
        let (_server, uri) = setup_download_server(serde_json::json!([])).await;
        assert!(uri.starts_with("http://"));
    }

    #[tokio::test]
    async fn test_config_points_at_mock_server() {
        let (server, uri) = setup_download_server(serde_json::json!([])).await;
        let config = config_for(&server);
        assert_eq!(config.server.base_url(), uri);
    }

    #[test]
    fn test_queue_entry_shape() {
        let entry = queue_entry(3, "https://video.test/a");
        assert_eq!(entry["id"], 3);
        assert_eq!(entry["url"], "https://video.test/a");
        assert_eq!(entry["format_selector"], "mp4");
    }
}
