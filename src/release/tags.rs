//! Remote CMake version tags from the GitHub API.

use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::http::HttpClient;

/// Repository whose tags enumerate the published CMake versions.
pub const CMAKE_TAGS_REPO: &str = "Kitware/CMake";

#[derive(Deserialize, Debug, Clone, PartialEq)]
struct Tag {
    name: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListTags: Send + Sync {
    /// Fetch the remote version tag names (e.g. `v3.18.4`), unordered.
    async fn list_tags(&self) -> Result<Vec<String>>;
}

pub struct GitHubTags {
    http: HttpClient,
    api_url: String,
}

impl GitHubTags {
    pub fn new(http: HttpClient, api_url: Option<String>) -> Self {
        let api_url = api_url.unwrap_or_else(|| "https://api.github.com".to_string());
        Self { http, api_url }
    }
}

#[async_trait]
impl ListTags for GitHubTags {
    #[tracing::instrument(skip(self))]
    async fn list_tags(&self) -> Result<Vec<String>> {
        let url = format!("{}/repos/{}/tags", self.api_url, CMAKE_TAGS_REPO);
        let mut tags = Vec::new();
        let mut page = 1;

        // Limit to 10 pages (1000 tags) to prevent an unbounded loop
        while page <= 10 {
            debug!("Fetching tags page {} from {}...", page, url);

            let parsed: Vec<Tag> = self
                .http
                .get_json_with_query(&url, &[("per_page", "100"), ("page", &page.to_string())])
                .await?;

            if parsed.is_empty() {
                break;
            }

            tags.extend(parsed.into_iter().map(|t| t.name));
            page += 1;
        }

        Ok(tags)
    }
}

/// Sorts tag names descending, the order the version picker presents them in.
pub fn sorted_descending(mut tags: Vec<String>) -> Vec<String> {
    tags.sort();
    tags.reverse();
    tags
}
