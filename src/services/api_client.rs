use crate::error::ApiError;
use crate::models::config::ApiConfig;
use crate::models::report::{ActionResponse, ReportForm, ReportsResponse, SubmitResponse};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// The HTTP/JSON report and chart backend as seen by the page controllers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn submit_report(&self, form: &ReportForm) -> Result<SubmitResponse, ApiError>;

    async fn list_reports(&self, password: &str) -> Result<ReportsResponse, ApiError>;

    async fn delete_report(&self, id: u64, password: &str) -> Result<ActionResponse, ApiError>;

    async fn delete_all_reports(&self, password: &str) -> Result<ActionResponse, ApiError>;

    /// Fetches a chart image by file name, e.g. `state.png`. Non-2xx answers
    /// become `ApiError::Status` carrying the body's `error` message.
    async fn fetch_chart(&self, file_name: &str) -> Result<Vec<u8>, ApiError>;

    /// Browser-facing CSV download link. Builds a URL, sends nothing.
    fn export_url(&self, password: &str) -> String;
}

pub struct HttpPortalApi {
    client: Client,
    base_url: String,
    public_url: String,
}

impl HttpPortalApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent("CrimePortal/1.0")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            public_url: config.public_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl PortalApi for HttpPortalApi {
    async fn submit_report(&self, form: &ReportForm) -> Result<SubmitResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/api/submit-report"))
            .json(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn list_reports(&self, password: &str) -> Result<ReportsResponse, ApiError> {
        let response = self
            .client
            .get(self.url("/api/reports"))
            .query(&[("password", password)])
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_report(&self, id: u64, password: &str) -> Result<ActionResponse, ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/reports/{}", id)))
            .query(&[("password", password)])
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_all_reports(&self, password: &str) -> Result<ActionResponse, ApiError> {
        let response = self
            .client
            .delete(self.url("/api/reports/delete-all"))
            .query(&[("password", password)])
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_chart(&self, file_name: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(self.url(&chart_path(file_name))).send().await?;
        let status = response.status();
        debug!("Chart response status: {}", status);

        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    fn export_url(&self, password: &str) -> String {
        format!("{}{}", self.public_url, export_path(password))
    }
}

/// Bodies are decoded whatever the status code, the backend reports
/// failures through `error` keys.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `/api/charts/<file_name>` with the name encoded as one path segment.
pub fn chart_path(file_name: &str) -> String {
    let mut url = Url::parse("http://localhost/").expect("static url");
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(["api", "charts", file_name]);
    }
    url.path().to_string()
}

pub fn export_path(password: &str) -> String {
    format!("/api/reports/export?{}", password_query(password))
}

/// `password=<urlencoded>`
pub fn password_query(password: &str) -> String {
    let mut url = Url::parse("http://localhost/").expect("static url");
    url.query_pairs_mut().append_pair("password", password);
    url.query().unwrap_or_default().to_string()
}
