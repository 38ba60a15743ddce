//! Retrieval of the spreadsheet export, over HTTP or from a local file.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::StatusCode;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::error::{ReportError, ReportResult};

/// Issues a GET for `url` and returns the body.
///
/// # Errors
///
/// Returns [`ReportError::Fetch`] on transport errors (including timeouts)
/// and [`ReportError::HttpStatus`] for any status other than 200.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> ReportResult<Vec<u8>> {
    let fetch_err = |source| ReportError::Fetch {
        url: url.to_string(),
        source,
    };

    let parsed = url.parse().map_err(|_| {
        ReportError::Config(format!("invalid source URL {url:?}"))
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await.map_err(fetch_err)?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(ReportError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let bytes = resp.bytes().await.map_err(fetch_err)?;
    debug!(bytes = bytes.len(), "Source body received");
    Ok(bytes.to_vec())
}

fn is_url(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Loads the export from a local file path or fetches it over HTTP.
#[tracing::instrument(skip(source, config), fields(source = %source))]
pub async fn load_source(source: &str, config: &DashboardConfig) -> ReportResult<Vec<u8>> {
    if is_url(source) {
        let client = BasicClient::with_timeouts(config.fetch_timeout(), config.connect_timeout())
            .map_err(|e| ReportError::Fetch {
                url: source.to_string(),
                source: e,
            })?;
        fetch_bytes(&client, source).await
    } else {
        Ok(std::fs::read(source)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned HTTP response on a local port.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{addr}/export?format=csv")
    }

    /// Accepts one connection and holds it open without ever answering.
    async fn serve_silence() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        format!("http://{addr}/export?format=csv")
    }

    fn local_client() -> BasicClient {
        BasicClient::from_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    #[tokio::test]
    async fn test_fetch_bytes_ok() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\nGiorno",
        )
        .await;

        let bytes = fetch_bytes(&local_client(), &url).await.unwrap();
        assert_eq!(bytes, b"Giorno");
    }

    #[tokio::test]
    async fn test_fetch_bytes_non_200_is_fetch_failure() {
        let url =
            serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .await;

        let err = fetch_bytes(&local_client(), &url).await.unwrap_err();
        assert!(err.is_fetch_failure());
        assert!(matches!(err, ReportError::HttpStatus { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_fetch_bytes_invalid_url() {
        let err = fetch_bytes(&local_client(), "http://").await.unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[tokio::test]
    async fn test_load_source_reads_local_file() {
        let path = format!("{}/weight_report_test_source.csv", env::temp_dir().display());
        fs::write(&path, "Giorno,Data\n").unwrap();

        let bytes = load_source(&path, &DashboardConfig::default()).await.unwrap();
        assert_eq!(bytes, b"Giorno,Data\n");

        fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_load_source_missing_file_is_io_error() {
        let err = load_source("/nonexistent/weights.csv", &DashboardConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
    }

    #[tokio::test]
    async fn test_fetch_bytes_times_out_on_silent_server() {
        let url = serve_silence().await;
        let client =
            BasicClient::with_timeouts(Duration::from_millis(300), Duration::from_millis(300))
                .unwrap();

        let result = tokio::time::timeout(Duration::from_secs(5), fetch_bytes(&client, &url))
            .await
            .expect("fetch did not honour its timeout");

        let err = result.unwrap_err();
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_load_source_applies_configured_timeout() {
        let url = serve_silence().await;
        let config = DashboardConfig {
            fetch_timeout_secs: 1,
            connect_timeout_secs: 1,
            ..Default::default()
        };

        let result = tokio::time::timeout(Duration::from_secs(10), load_source(&url, &config))
            .await
            .expect("load_source did not honour its timeout");

        assert!(result.unwrap_err().is_fetch_failure());
    }

    #[test]
    fn test_is_url_requires_scheme() {
        assert!(is_url("http://example.com/export?format=csv"));
        assert!(is_url("https://docs.google.com/spreadsheets/d/x/export"));
        assert!(!is_url("httpdata.csv"));
        assert!(!is_url("data/weights.csv"));
    }
}
