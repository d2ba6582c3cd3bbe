//! Where TLD lists come from.

use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::TldError;

/// IANA's list of every delegated top-level domain.
pub const IANA_TLD_URL: &str = "https://data.iana.org/TLD/tlds-alpha-by-domain.txt";

/// A source of raw TLD list bodies.
pub trait TldSource {
    /// Fetch the current list body.
    fn fetch(&self) -> impl Future<Output = Result<String, TldError>> + Send;
}

/// Fetches the list over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTldSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTldSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Default for HttpTldSource {
    fn default() -> Self {
        Self::new(IANA_TLD_URL)
    }
}

impl TldSource for HttpTldSource {
    async fn fetch(&self) -> Result<String, TldError> {
        tracing::debug!(url = %self.url, "fetching TLD list");
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TldError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

/// Reads the list from a local file.
#[derive(Debug, Clone)]
pub struct FileTldSource {
    path: PathBuf,
}

impl FileTldSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TldSource for FileTldSource {
    async fn fetch(&self) -> Result<String, TldError> {
        tracing::debug!(path = %self.path.display(), "reading TLD list");
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_source_reads_body() {
        let path = std::env::temp_dir().join(format!("hilite-tlds-{}.txt", std::process::id()));
        tokio::fs::write(&path, "# header\nCOM\n").await.unwrap();

        let body = FileTldSource::new(&path).fetch().await.unwrap();
        assert_eq!(body, "# header\nCOM\n");

        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_transient() {
        let err = FileTldSource::new("/nonexistent/hilite/tlds.txt")
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, TldError::Io(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_default_source_points_at_iana() {
        assert_eq!(HttpTldSource::default().url(), IANA_TLD_URL);
    }
}
