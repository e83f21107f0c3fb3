use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::dto::application_dto::{
    ApplicationEnvelope, ApplicationListQuery, ApplicationListResponse, UpdateStatusPayload,
};
use crate::dto::auth_dto::{CurrentUserResponse, SavedJobsResponse};
use crate::dto::job_dto::{JobListQuery, JobListResponse};
use crate::dto::notification_dto::NotificationListResponse;
use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::models::job::JobPosting;
use crate::models::notification::Notification;
use crate::models::saved_job::SavedJob;
use crate::models::user::CurrentUser;

pub const DEFAULT_DOCUMENT_TYPE: &str = "application/pdf";

/// Binary payload together with the content type the server declared for it.
#[derive(Debug, Clone)]
pub struct Document {
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        let base_url = Url::parse(&config.api_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "API base URL cannot carry paths: {}",
                config.api_base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            token: config.api_token.clone(),
        })
    }

    pub fn has_credential(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("Invalid API base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn require_token(&self, action: &str) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| Error::Unauthorized(format!("Please login to {}", action)))
    }

    fn with_optional_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!("API call failed with status {}: {}", status, body);
        Err(Error::from_status(status, &body))
    }

    async fn json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
        let response = Self::send(request).await?;
        Ok(response.json::<T>().await?)
    }

    /// `GET /jobs`. The credential is attached when available but not required.
    pub async fn list_jobs(&self, query: &JobListQuery) -> Result<Vec<JobPosting>> {
        let url = self.endpoint(&["jobs"])?;
        debug!("Fetching jobs: {}", query.locator());
        let request = self.with_optional_auth(self.client.get(url).query(query));
        let body: JobListResponse = Self::json(request).await?;
        Ok(body.jobs)
    }

    pub async fn list_job_applications(
        &self,
        job_id: &str,
        employer_id: Option<&str>,
    ) -> Result<Vec<Application>> {
        let token = self.require_token("view applications")?;
        let url = self.endpoint(&["applications", "job", job_id])?;
        let query = ApplicationListQuery {
            employer_id: employer_id.map(str::to_string),
        };
        let request = self.client.get(url).bearer_auth(token).query(&query);
        let body: ApplicationListResponse = Self::json(request).await?;
        Ok(body.applications)
    }

    /// Returns the application as the server stored it, when the server echoes it.
    pub async fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let token = self.require_token("update applications")?;
        let url = self.endpoint(&["applications", "status", application_id])?;
        let request = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&UpdateStatusPayload { status });
        let response = Self::send(request).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            return Ok(None);
        }
        match serde_json::from_slice::<ApplicationEnvelope>(&body) {
            Ok(envelope) => Ok(envelope.application),
            Err(e) => {
                warn!("Status update response was not an application envelope: {}", e);
                Ok(None)
            }
        }
    }

    pub async fn fetch_resume(&self, application_id: &str) -> Result<Document> {
        let token = self.require_token("view resumes")?;
        let url = self.endpoint(&["applications", "resume", application_id])?;
        let response = Self::send(self.client.get(url).bearer_auth(token)).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_DOCUMENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?;
        debug!(
            "Fetched resume for application {} ({} bytes, {})",
            application_id,
            bytes.len(),
            content_type
        );
        Ok(Document {
            bytes,
            content_type,
        })
    }

    pub async fn my_applications(&self) -> Result<Vec<Application>> {
        let token = self.require_token("view your applications")?;
        let url = self.endpoint(&["applications", "my-applications"])?;
        let body: ApplicationListResponse =
            Self::json(self.client.get(url).bearer_auth(token)).await?;
        if body.success == Some(false) {
            return Err(Error::Rejected(
                body.message
                    .unwrap_or_else(|| "Failed to fetch applications".to_string()),
            ));
        }
        Ok(body.applications)
    }

    pub async fn saved_jobs(&self) -> Result<Vec<SavedJob>> {
        let token = self.require_token("view saved jobs")?;
        let url = self.endpoint(&["auth", "saved-jobs"])?;
        let body: SavedJobsResponse = Self::json(self.client.get(url).bearer_auth(token)).await?;
        Ok(body.saved_jobs)
    }

    pub async fn save_job(&self, job_id: &str) -> Result<()> {
        let token = self.require_token("bookmark jobs")?;
        let url = self.endpoint(&["auth", "saved-jobs", job_id])?;
        Self::send(self.client.post(url).bearer_auth(token).json(&serde_json::json!({}))).await?;
        Ok(())
    }

    pub async fn remove_saved_job(&self, job_id: &str) -> Result<()> {
        let token = self.require_token("bookmark jobs")?;
        let url = self.endpoint(&["auth", "saved-jobs", job_id])?;
        Self::send(self.client.delete(url).bearer_auth(token)).await?;
        Ok(())
    }

    pub async fn current_user(&self) -> Result<CurrentUser> {
        let token = self.require_token("continue")?;
        let url = self.endpoint(&["auth", "current-user"])?;
        let body: CurrentUserResponse = Self::json(self.client.get(url).bearer_auth(token)).await?;
        Ok(body.user)
    }

    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        let token = self.require_token("view notifications")?;
        let url = self.endpoint(&["notifications"])?;
        let body: NotificationListResponse =
            Self::json(self.client.get(url).bearer_auth(token)).await?;
        Ok(body.notifications)
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        let token = self.require_token("update notifications")?;
        let url = self.endpoint(&["notifications", notification_id, "read"])?;
        Self::send(self.client.put(url).bearer_auth(token)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_segments_onto_base_path() {
        let client = ApiClient::new(&Config::new("http://localhost:9000/api/")).unwrap();
        let url = client.endpoint(&["applications", "job", "abc 1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/applications/job/abc%201");
    }

    #[tokio::test]
    async fn authenticated_calls_fail_locally_without_token() {
        let client = ApiClient::new(&Config::new("http://localhost:9")).unwrap();
        let err = client.saved_jobs().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::NotAuthorized);
        assert_eq!(err.to_string(), "Unauthorized: Please login to view saved jobs");
    }
}
