//! Read and write access to the content backend.
//!
//! Reads go through [`ContentClient::project`] and
//! [`ContentClient::projects`]: each request has a deadline, transport
//! failures are retried with a linearly growing delay, and error responses
//! surface immediately as [`ContentError`].

pub mod error;
pub mod model;
pub mod query;

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

pub use error::{ContentError, ContentResult};
pub use model::{LeadRequest, ProjectDetail, ProjectImage, ProjectRecord, ProjectSummary};
use error::messages;
use model::{ErrorEnvelope, ItemsEnvelope};
use query::{sort_value, ItemsQuery, Op};

pub const DEFAULT_BASE_URL: &str = "https://admin.showsystem.productions";

const PROJECTS: &str = "projects";
const REQUESTS: &str = "request";
const PROJECT_FIELDS: &str = "*,images.directus_files_id.*";
const SIBLING_FIELDS: &str = "id,title,slug,main_photo";
const LIST_FIELDS: &str = "id,title,slug,main_color,main_photo";

/// Configuration for the content client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin, without a trailing path.
    pub base_url: String,
    /// Deadline for each request, body included.
    pub timeout: Duration,
    /// Extra attempts after a transport failure.
    pub max_retries: u32,
    /// Delay before retry `n` is `retry_delay * n`.
    pub retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(10),
            max_retries: 2,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Outcome of one attempt: either final, or worth retrying.
enum Failure {
    Fatal(ContentError),
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for Failure {
    fn from(err: reqwest::Error) -> Self {
        Failure::Transport(err)
    }
}

pub struct ContentClient {
    http: Client,
    base_url: Url,
    config: ClientConfig,
}

impl ContentClient {
    pub fn new() -> ContentResult<Self> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> ContentResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            ContentError::Client {
                message: format!("invalid backend url {:?}: {}", config.base_url, e),
            }
        })?;
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ContentError::Client {
                message: format!("http client setup failed: {}", e),
            })?;
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn items_url(&self, collection: &str, query: &ItemsQuery) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("items").push(collection);
        }
        query.apply(&mut url);
        url
    }

    /// One published project by slug, with its media filtered to images and
    /// its circular neighbours by sort order.
    #[instrument(skip(self))]
    pub async fn project(&self, slug: &str) -> ContentResult<ProjectDetail> {
        self.with_retry(Some(slug), || self.fetch_project(slug)).await
    }

    /// Every published project, summary fields only, in sort order.
    #[instrument(skip(self))]
    pub async fn projects(&self) -> ContentResult<Vec<ProjectSummary>> {
        self.with_retry(None, || self.fetch_projects()).await
    }

    /// Submit the lead-capture form. Single attempt.
    #[instrument(skip(self, lead), fields(company = %lead.company))]
    pub async fn submit_request(&self, lead: &LeadRequest) -> ContentResult<serde_json::Value> {
        let url = self.items_url(REQUESTS, &ItemsQuery::new());
        let response = self
            .http
            .post(url)
            .json(lead)
            .send()
            .await
            .map_err(|source| ContentError::Submit {
                message: messages::SUBMIT_FAILED.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let default = if status == StatusCode::NOT_FOUND {
                messages::SUBMIT_UNAVAILABLE
            } else {
                messages::SUBMIT_FAILED
            };
            return Err(backend_error(response, default, None).await);
        }

        let body = response.bytes().await.map_err(|source| ContentError::Submit {
            message: messages::SUBMIT_FAILED.to_string(),
            source,
        })?;
        if body.is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null))
    }

    async fn with_retry<T, F, Fut>(&self, slug: Option<&str>, mut attempt: F) -> ContentResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Failure>>,
    {
        let mut retries = 0u32;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(Failure::Fatal(err)) => return Err(err),
                Err(Failure::Transport(err)) if retries < self.config.max_retries => {
                    retries += 1;
                    let delay = self.config.retry_delay * retries;
                    warn!(error = %err, retry = retries, ?delay, "transport failure, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(Failure::Transport(source)) => {
                    warn!(error = %source, "backend unreachable, giving up");
                    return Err(ContentError::ServiceUnavailable {
                        message: messages::SERVICE_UNAVAILABLE.to_string(),
                        slug: slug.map(String::from),
                        source,
                    });
                }
            }
        }
    }

    async fn fetch_project(&self, slug: &str) -> Result<ProjectDetail, Failure> {
        let query = ItemsQuery::new()
            .filter("slug", Op::Eq, slug)
            .published()
            .fields(PROJECT_FIELDS);
        let response = self.http.get(self.items_url(PROJECTS, &query)).send().await?;

        if !response.status().is_success() {
            let default = if response.status() == StatusCode::NOT_FOUND {
                messages::PROJECT_NOT_FOUND
            } else {
                messages::PROJECT_LOAD_FAILED
            };
            return Err(Failure::Fatal(backend_error(response, default, Some(slug)).await));
        }

        let envelope: ItemsEnvelope<ProjectRecord> = response.json().await?;
        let Some(mut project) = envelope.into_items().into_iter().next() else {
            return Err(Failure::Fatal(ContentError::NotFound {
                message: messages::unknown_slug(slug),
                slug: Some(slug.to_string()),
            }));
        };

        if let Some(images) = project.images.as_mut() {
            images.retain(ProjectImage::is_image);
        }

        let (prev_project, next_project) = self.siblings(project.sort).await?;
        Ok(ProjectDetail {
            project,
            prev_project,
            next_project,
        })
    }

    /// Previous and next published projects by sort order, wrapping around
    /// the ends of the list.
    async fn siblings(
        &self,
        sort: Option<f64>,
    ) -> Result<(Option<ProjectSummary>, Option<ProjectSummary>), Failure> {
        let (prev, next) = match sort {
            Some(sort) => {
                let before = ItemsQuery::new()
                    .filter("sort", Op::Lt, sort_value(sort))
                    .published()
                    .sort("-sort")
                    .limit(1)
                    .fields(SIBLING_FIELDS);
                let after = ItemsQuery::new()
                    .filter("sort", Op::Gt, sort_value(sort))
                    .published()
                    .sort("sort")
                    .limit(1)
                    .fields(SIBLING_FIELDS);
                tokio::try_join!(self.first_summary(&before), self.first_summary(&after))?
            }
            None => (None, None),
        };

        let prev = match prev {
            Some(prev) => Some(prev),
            None => {
                debug!("no earlier project, wrapping to the last one");
                self.first_summary(&edge_query("-sort")).await?
            }
        };
        let next = match next {
            Some(next) => Some(next),
            None => {
                debug!("no later project, wrapping to the first one");
                self.first_summary(&edge_query("sort")).await?
            }
        };
        Ok((prev, next))
    }

    /// First item of a sibling query. Error responses count as "no item".
    async fn first_summary(&self, query: &ItemsQuery) -> Result<Option<ProjectSummary>, Failure> {
        let response = self.http.get(self.items_url(PROJECTS, query)).send().await?;
        if !response.status().is_success() {
            debug!(status = %response.status(), "sibling lookup failed");
            return Ok(None);
        }
        let envelope: ItemsEnvelope<ProjectSummary> = response.json().await?;
        Ok(envelope.into_items().into_iter().next())
    }

    async fn fetch_projects(&self) -> Result<Vec<ProjectSummary>, Failure> {
        let query = ItemsQuery::new()
            .published()
            .sort("sort")
            .fields(LIST_FIELDS);
        let response = self.http.get(self.items_url(PROJECTS, &query)).send().await?;

        if !response.status().is_success() {
            let default = if response.status() == StatusCode::NOT_FOUND {
                messages::PROJECTS_NOT_FOUND
            } else {
                messages::PROJECTS_LOAD_FAILED
            };
            return Err(Failure::Fatal(backend_error(response, default, None).await));
        }

        let projects = response.json::<ItemsEnvelope<ProjectSummary>>().await?.into_items();
        if projects.is_empty() {
            return Err(Failure::Fatal(ContentError::NotFound {
                message: messages::PROJECTS_NOT_FOUND.to_string(),
                slug: None,
            }));
        }
        Ok(projects)
    }
}

/// Lowest (`sort`) or highest (`-sort`) published project.
fn edge_query(sort: &str) -> ItemsQuery {
    ItemsQuery::new()
        .published()
        .sort(sort)
        .limit(1)
        .fields(SIBLING_FIELDS)
}

/// Error for a non-success response, preferring the backend's own message.
async fn backend_error(response: Response, default: &str, slug: Option<&str>) -> ContentError {
    let status = response.status().as_u16();
    let body = response.json::<ErrorEnvelope>().await.unwrap_or_default();
    let message = body.first_message().unwrap_or(default).to_string();
    debug!(status, %message, "backend returned an error");
    ContentError::Backend {
        status,
        message,
        slug: slug.map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_url_keeps_base_path() {
        let client = ContentClient::with_config(ClientConfig {
            base_url: "http://localhost:8055/cms/".into(),
            ..Default::default()
        })
        .unwrap();
        let url = client.items_url(PROJECTS, &ItemsQuery::new().limit(1));
        assert_eq!(url.as_str(), "http://localhost:8055/cms/items/projects?limit=1");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let err = ContentClient::with_config(ClientConfig {
            base_url: "not a url".into(),
            ..Default::default()
        })
        .err()
        .unwrap();
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn defaults_match_site_backend() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay, Duration::from_secs(1));
    }
}
