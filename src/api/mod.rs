use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::NetworkConfig;
use crate::internal::models::{Comment, ErrorResponse, NewComment, SummaryResponse};

/// Failure kinds of the site endpoints. Controllers treat all of them alike;
/// the distinction only shows up in logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },
    #[error("invalid url '{0}'")]
    InvalidUrl(String),
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// HTTP client for the newsroom site.
///
/// Every request is resolved against `base_url`, which makes the service easy
/// to point at a mock server in tests.
#[derive(Clone, Debug)]
pub struct ApiService {
    client: Client,
    base_url: Url,
}

impl ApiService {
    pub fn new(base_url: &str, network: &NetworkConfig) -> ApiResult<Self> {
        let base_url = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;

        let mut builder = Client::builder().user_agent(network.user_agent.clone());
        if let Some(timeout) = network.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|source| ApiError::Transport {
            url: base_url.to_string(),
            source,
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a link the way a browser would from the site root.
    pub fn resolve(&self, href: &str) -> ApiResult<Url> {
        self.base_url
            .join(href)
            .map_err(|_| ApiError::InvalidUrl(href.to_string()))
    }

    /// Endpoint under the base path. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `POST /summarize` with `url=<target_url>` as a form body.
    pub async fn summarize(&self, target_url: &str) -> ApiResult<String> {
        let url = self.endpoint(&["summarize"])?;
        let resp = self
            .client
            .post(url.clone())
            .form(&[("url", target_url)])
            .send()
            .await
            .map_err(|source| transport(&url, source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            // The server explains most failures in an `error` field; keep it for the logs.
            if let Ok(body) = resp.json::<ErrorResponse>().await {
                tracing::debug!(%status, error = %body.error, "summarize rejected");
            }
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body: SummaryResponse = read_json(&url, resp).await?;
        Ok(body.summary)
    }

    /// `GET /articles/{article_id}/comments`
    pub async fn fetch_comments(&self, article_id: &str) -> ApiResult<Vec<Comment>> {
        let url = self.endpoint(&["articles", article_id, "comments"])?;

        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        let resp = ensure_success(&url, resp)?;
        read_json(&url, resp).await
    }

    /// `POST /comments` with a JSON body. Only the status matters.
    pub async fn post_comment(&self, article_id: &str, content: &str) -> ApiResult<()> {
        let url = self.endpoint(&["comments"])?;
        let resp = self
            .client
            .post(url.clone())
            .json(&NewComment {
                content,
                article_id,
            })
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        ensure_success(&url, resp)?;
        Ok(())
    }

    /// Fetch a site page. Returns the final URL after redirects and the HTML.
    pub async fn fetch_page(&self, href: &str) -> ApiResult<(Url, String)> {
        let url = self.resolve(href)?;
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| transport(&url, source))?;
        let resp = ensure_success(&url, resp)?;
        let final_url = resp.url().clone();
        let html = resp.text().await.map_err(|source| transport(&url, source))?;
        Ok((final_url, html))
    }
}

fn transport(url: &Url, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        source,
    }
}

fn ensure_success(url: &Url, resp: Response) -> ApiResult<Response> {
    match resp.status() {
        status if status.is_success() => Ok(resp),
        status => Err(ApiError::Status {
            url: url.to_string(),
            status,
        }),
    }
}

/// Read the body and deserialize it, reporting schema mismatches as `Malformed`.
async fn read_json<T>(url: &Url, resp: Response) -> ApiResult<T>
where
    T: DeserializeOwned,
{
    let bytes = resp.bytes().await.map_err(|source| transport(url, source))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Malformed {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
