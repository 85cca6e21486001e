//! HTTP implementation of the content API client.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::application::ports::{ContentClient, DocumentQuery, FetchError};
use crate::config::ContentSettings;
use crate::domain::documents::DocumentPage;
use crate::domain::repository::RepositoryId;

use super::error::InfraError;

/// Placeholder in the base URL template replaced with the repository id.
const REPOSITORY_PLACEHOLDER: &str = "{repository}";

pub struct HttpContentClient {
    client: Client,
    base_url_template: String,
    page_size: u32,
}

impl HttpContentClient {
    pub fn new(settings: &ContentSettings) -> Result<Self, InfraError> {
        let client = Client::builder()
            .user_agent(concat!("vetrina/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| {
                InfraError::configuration(format!("failed to build content http client: {err}"))
            })?;

        Ok(Self {
            client,
            base_url_template: settings.base_url_template.clone(),
            page_size: settings.page_size,
        })
    }

    fn search_url(
        &self,
        repository: &RepositoryId,
        page: u32,
        query: &DocumentQuery,
    ) -> Result<Url, FetchError> {
        let base = self
            .base_url_template
            .replace(REPOSITORY_PLACEHOLDER, repository.as_str());
        let mut url = Url::parse(&format!("{base}/documents/search"))
            .map_err(|err| FetchError::Transport(format!("invalid content url: {err}")))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            pairs.append_pair("pagesize", &self.page_size.to_string());
            if let Some(lang) = query.lang.as_deref() {
                pairs.append_pair("lang", lang);
            }
        }

        Ok(url)
    }
}

#[async_trait]
impl ContentClient for HttpContentClient {
    async fn fetch_page(
        &self,
        repository: &RepositoryId,
        page: u32,
        query: &DocumentQuery,
    ) -> Result<DocumentPage, FetchError> {
        let url = self.search_url(repository, page, query)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                repository: repository.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<DocumentPage>()
            .await
            .map_err(|err| FetchError::Decode(err.to_string()))
    }
}
