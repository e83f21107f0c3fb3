use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::models::application::Application;
use crate::services::api_client::ApiClient;
use crate::services::document_service::{DocumentLoader, OpenOutcome, ViewerStatus};
use crate::store::resource::{LoadOutcome, ResourceStore};
use crate::store::transient::TransientStore;

const MY_APPLICATIONS: &str = "applications/my-applications";

/// A job seeker's own applications with resume viewing and download.
pub struct AppliedJobsService {
    api: ApiClient,
    documents: TransientStore,
    applications: ResourceStore<Application>,
    resume_viewer: DocumentLoader,
}

impl AppliedJobsService {
    pub fn new(api: ApiClient, documents: TransientStore) -> Self {
        Self {
            api,
            resume_viewer: DocumentLoader::new(documents.clone(), "Failed to load resume"),
            documents,
            applications: ResourceStore::new(),
        }
    }

    pub fn applications(&self) -> &ResourceStore<Application> {
        &self.applications
    }

    pub async fn load(&self) -> Result<LoadOutcome> {
        self.applications
            .load(MY_APPLICATIONS, self.api.my_applications())
            .await
    }

    pub fn summary(&self) -> String {
        format!("You have applied for {} jobs", self.applications.len())
    }

    pub async fn open_resume(&self, application_id: &str) -> Result<OpenOutcome> {
        self.resume_viewer
            .open_resume(&self.api, application_id)
            .await
    }

    pub fn resume_status(&self) -> ViewerStatus {
        self.resume_viewer.status()
    }

    pub fn close_resume(&self) {
        self.resume_viewer.close();
    }

    /// Saves the resume of `application_id` into `dir` under the file name the
    /// applicant uploaded, releasing the in-memory copy afterwards.
    pub async fn download_resume(&self, application_id: &str, dir: &Path) -> Result<PathBuf> {
        let file_name = self
            .applications
            .get(application_id)
            .map(|app| app.resume_file_name().to_string())
            .ok_or_else(|| Error::NotFound(format!("Application {}", application_id)))?;

        let document = self.api.fetch_resume(application_id).await?;
        let handle = self.documents.create(document.bytes, document.content_type);
        let saved = self.documents.persist(&handle, dir, &file_name).await;
        self.documents.revoke(handle);
        let path = saved?;
        info!("Saved resume for application {} to {}", application_id, path.display());
        Ok(path)
    }
}
