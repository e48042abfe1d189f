pub mod events;
pub mod experiments;
pub mod items;

pub use experiments::NewExperiment;

use crate::config::ElabConfig;
use crate::error::{ElabError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, LOCATION};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

/// HTTP client for the eLabFTW REST API.
///
/// Every semantic operation (list experiments, create item, ...) boils down to
/// one call through [`ElabClient::send`]: shared Authorization header, fixed
/// per-request timeout, non-2xx mapped to [`ElabError::RemoteHttp`] with the
/// server body kept verbatim, network-level failures mapped to
/// [`ElabError::Transport`].
#[derive(Debug, Clone)]
pub struct ElabClient {
    http: reqwest::Client,
    config: ElabConfig,
}

/// Outcome of a create operation that commits in two steps: POST first, then
/// a follow-up GET on the id parsed from the `Location` header.
///
/// `id` is `None` when the server did not return a `Location` header; the
/// resource was still created remotely, so this is reported as a distinct
/// degraded success rather than a failure. `suppressed` collects best-effort
/// sub-step failures (tag attachments) that were deliberately not propagated.
#[derive(Debug, Default)]
pub struct CreateOutcome {
    pub id: Option<i64>,
    pub resource: Option<Value>,
    pub suppressed: Vec<String>,
}

impl ElabClient {
    pub fn new(config: ElabConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if config.has_api_key() {
            let value = HeaderValue::from_str(&config.api_key)
                .map_err(|_| ElabError::Config("API key contains invalid characters".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| ElabError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.has_api_key()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// Perform one HTTP call and check the status. This is the single funnel
    /// every gateway operation goes through.
    pub(crate) async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(%method, %url, "eLabFTW request");

        let mut request = self.http.request(method, &url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ElabError::RemoteHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Perform one call and parse the response body as JSON.
    pub(crate) async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let response = self.send(method, path, query, body).await?;
        Ok(response.json().await?)
    }

    /// Multipart POST for file attachments. The Authorization default header
    /// still applies; reqwest sets the multipart Content-Type itself.
    pub(crate) async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<reqwest::Response> {
        let url = self.url(path);
        debug!(%url, "eLabFTW multipart upload");

        let response = self.http.post(&url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ElabError::RemoteHttp {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    /// Extract the numeric id of a freshly created resource from the
    /// `Location` response header. eLabFTW returns the new resource's URL
    /// there; the final path segment is the id.
    pub(crate) fn created_id(response: &reqwest::Response) -> Option<i64> {
        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .and_then(id_from_location)
    }
}

fn id_from_location(location: &str) -> Option<i64> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()?
        .parse()
        .ok()
}
