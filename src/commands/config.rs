use anyhow::Result;
use reqwest::Client;

use crate::archive::ArchiveExtractorImpl;
use crate::http::HttpClient;
use crate::release::{DEFAULT_FILES_URL, GitHubTags};

/// Wiring for the install flow: HTTP client, tag listing and extractor.
pub struct Config {
    pub http: HttpClient,
    pub tags: GitHubTags,
    pub extractor: ArchiveExtractorImpl,
    pub files_url: String,
}

impl Config {
    pub fn new(files_url: Option<String>, api_url: Option<String>) -> Result<Self> {
        let client = Client::builder().user_agent("cmth-cli").build()?;
        let http = HttpClient::new(client);
        let tags = GitHubTags::new(http.clone(), api_url);

        Ok(Self {
            http,
            tags,
            extractor: ArchiveExtractorImpl::new(),
            files_url: files_url.unwrap_or_else(|| DEFAULT_FILES_URL.to_string()),
        })
    }
}
