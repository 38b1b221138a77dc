//! HTTP client for release-index probing and archive downloads.

use anyhow::{Context, Result};
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::io::Write;

use super::retry::{check_retryable, with_retry};

/// HTTP client wrapping a reqwest [`Client`].
///
/// JSON requests retry on transient errors. The existence probe and the
/// streaming download deliberately do not: probe failures fall through to
/// the next release candidate and mid-transfer failures abort the install.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    /// Automatically retries on transient errors.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);

        with_retry("GET JSON", || async {
            let response = self
                .client
                .get(url)
                .query(query)
                .send()
                .await
                .context("Failed to send request")?;

            let response = response.error_for_status().map_err(check_retryable)?;

            let result = response
                .json::<T>()
                .await
                .context("Failed to parse JSON response")?;

            Ok(result)
        })
        .await
    }

    /// Probes whether a remote file exists via a HEAD request.
    ///
    /// Any failure (404, transport error, timeout) counts as absent: the
    /// caller falls through to its next candidate either way.
    #[tracing::instrument(skip(self))]
    pub async fn exists(&self, url: &str) -> bool {
        debug!("HEAD probe {}...", url);

        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("HEAD probe failed for {}: {}", url, e);
                false
            }
        }
    }

    /// Streams a download to the given writer, reporting each chunk through
    /// `on_chunk` with (bytes downloaded so far, total size if known).
    ///
    /// Single attempt, no retry: a mid-transfer error here is fatal for the
    /// caller's install flow by contract.
    #[tracing::instrument(skip(self, writer, on_chunk))]
    pub async fn download<W, F>(&self, url: &str, writer: &mut W, mut on_chunk: F) -> Result<u64>
    where
        W: Write,
        F: FnMut(u64, Option<u64>),
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to start download request")?;

        let mut response = response
            .error_for_status()
            .context("Download request was rejected")?;

        let total_bytes = response.content_length();
        let mut downloaded_bytes: u64 = 0;

        while let Some(chunk) = response
            .chunk()
            .await
            .context("Failed to read chunk from download stream")?
        {
            writer
                .write_all(&chunk)
                .context("Failed to write chunk to file")?;
            downloaded_bytes += chunk.len() as u64;
            on_chunk(downloaded_bytes, total_bytes);
        }

        debug!(
            "Downloaded {:.2} MB",
            downloaded_bytes as f64 / (1024.0 * 1024.0)
        );

        Ok(downloaded_bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_json_with_query_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test?page=1&per_page=10")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["item1", "item2"]"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Vec<String> = client
            .get_json_with_query(
                &format!("{}/test", url),
                &[("page", "1"), ("per_page", "10")],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, vec!["item1", "item2"]);
    }

    #[tokio::test]
    async fn test_get_json_not_found() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> = client
            .get_json_with_query(&format!("{}/test", url), &[])
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_exists_true_on_200() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("HEAD", "/file.tar.gz")
            .with_status(200)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        assert!(client.exists(&format!("{}/file.tar.gz", url)).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exists_false_on_404() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("HEAD", "/missing.tar.gz")
            .with_status(404)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        assert!(!client.exists(&format!("{}/missing.tar.gz", url)).await);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_exists_false_on_connection_error() {
        // Nothing is listening on this port.
        let client = HttpClient::new(Client::new());
        assert!(!client.exists("http://127.0.0.1:1/file.tar.gz").await);
    }

    #[tokio::test]
    async fn test_download_streams_and_reports_progress() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/file.txt")
            .with_status(200)
            .with_body("test content")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut buf = Vec::new();
        let mut last_seen = 0u64;
        let bytes = client
            .download(&format!("{}/file.txt", url), &mut buf, |done, _total| {
                last_seen = done;
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(bytes, 12); // "test content" is 12 bytes
        assert_eq!(buf, b"test content");
        assert_eq!(last_seen, 12);
    }

    #[tokio::test]
    async fn test_download_fails_on_404_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        // expect(1): a 404 during download must not be retried
        let mock = server
            .mock("GET", "/file.txt")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let mut buf = Vec::new();
        let result = client
            .download(&format!("{}/file.txt", url), &mut buf, |_, _| {})
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
        assert!(buf.is_empty());
    }
}
