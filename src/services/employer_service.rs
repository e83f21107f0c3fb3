use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use crate::dto::job_dto::JobListQuery;
use crate::error::{Error, ErrorKind, Result};
use crate::models::application::{
    Application, ApplicationStatus, CoverLetterView, DEFAULT_RESUME_NAME,
};
use crate::models::job::JobPosting;
use crate::models::user::CurrentUser;
use crate::services::api_client::ApiClient;
use crate::services::document_service::{DocumentLoader, OpenOutcome, ViewerStatus};
use crate::store::derived::{ApplicationQuery, JobQuery};
use crate::store::resource::{LoadOutcome, ResourceStore};
use crate::store::transient::TransientStore;

const APPLICATIONS_PREFIX: &str = "applications/job/";

fn applications_locator(job_id: &str) -> String {
    format!("{}{}", APPLICATIONS_PREFIX, job_id)
}

/// Employer's review desk: own postings, applications of the selected posting,
/// status changes and the resume/cover letter viewers.
pub struct EmployerReviewService {
    api: ApiClient,
    employer_id: String,
    employer_email: String,
    jobs: ResourceStore<JobPosting>,
    applications: ResourceStore<Application>,
    resume_viewer: DocumentLoader,
    cover_letter: Mutex<Option<CoverLetterView>>,
}

impl EmployerReviewService {
    pub fn new(api: ApiClient, documents: TransientStore, employer: &CurrentUser) -> Self {
        Self {
            api,
            employer_id: employer.id.clone(),
            employer_email: employer.email.clone(),
            jobs: ResourceStore::new(),
            applications: ResourceStore::new(),
            resume_viewer: DocumentLoader::new(documents, "Failed to load resume"),
            cover_letter: Mutex::new(None),
        }
    }

    pub fn jobs(&self) -> &ResourceStore<JobPosting> {
        &self.jobs
    }

    pub fn applications(&self) -> &ResourceStore<Application> {
        &self.applications
    }

    pub async fn load_jobs(&self) -> Result<LoadOutcome> {
        let query = JobListQuery::for_employer(self.employer_email.clone());
        self.jobs
            .load(&query.locator(), self.api.list_jobs(&query))
            .await
    }

    pub fn visible_jobs(&self, query: &JobQuery) -> Vec<JobPosting> {
        self.jobs.derive(query)
    }

    pub fn selected_job_id(&self) -> Option<String> {
        self.applications
            .locator()
            .and_then(|l| l.strip_prefix(APPLICATIONS_PREFIX).map(str::to_string))
    }

    pub fn selected_job(&self) -> Option<JobPosting> {
        self.selected_job_id().and_then(|id| self.jobs.get(&id))
    }

    /// Selects a posting and loads its applications. Selecting another posting
    /// before this one returns makes this response stale; it is then dropped.
    pub async fn select_job(&self, job_id: &str) -> Result<LoadOutcome> {
        let fetch = self
            .api
            .list_job_applications(job_id, Some(self.employer_id.as_str()));
        let outcome = self
            .applications
            .load(&applications_locator(job_id), fetch)
            .await?;
        if let LoadOutcome::Applied(count) = outcome {
            info!("Loaded {} applications for job {}", count, job_id);
        }
        Ok(outcome)
    }

    pub async fn retry(&self) -> Result<LoadOutcome> {
        match self.selected_job_id() {
            Some(job_id) => self.select_job(&job_id).await,
            None => self.load_jobs().await,
        }
    }

    pub fn visible_applications(&self, query: &ApplicationQuery) -> Vec<Application> {
        self.applications.derive(query)
    }

    /// What to show when the filtered list is empty.
    pub fn empty_message(&self, query: &ApplicationQuery) -> Option<&'static str> {
        if self.applications.is_empty() {
            Some("No applications found for this job.")
        } else if self.visible_applications(query).is_empty() {
            Some("No applications match your search criteria.")
        } else {
            None
        }
    }

    /// Requests a status change and converges on the server's answer. The
    /// returned application is the server's copy, which may differ from the
    /// requested status.
    pub async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let confirmed = self
            .api
            .update_application_status(application_id, status)
            .await?;

        match confirmed {
            Some(application) => {
                if application.status != status {
                    warn!(
                        "Server kept application {} at {} instead of {}",
                        application.id, application.status, status
                    );
                }
                self.applications.replace_item(application.clone());
                info!("Application {} status is now {}", application.id, application.status);
                Ok(Some(application))
            }
            None => {
                if let Some(job_id) = self.selected_job_id() {
                    self.select_job(&job_id).await?;
                }
                Ok(self.applications.get(application_id))
            }
        }
    }

    pub async fn open_resume(&self, application_id: &str) -> Result<OpenOutcome> {
        self.resume_viewer
            .open_resume(&self.api, application_id)
            .await
    }

    pub fn resume_status(&self) -> ViewerStatus {
        self.resume_viewer.status()
    }

    pub fn is_resume_loading(&self, application_id: &str) -> bool {
        self.resume_viewer.is_busy(application_id)
    }

    pub fn resume_viewer(&self) -> &DocumentLoader {
        &self.resume_viewer
    }

    pub fn close_resume(&self) {
        self.resume_viewer.close();
    }

    /// Saves the resume on display into `dir` under the file name the
    /// applicant uploaded. `None` when no resume is on display.
    pub async fn save_resume(&self, dir: &Path) -> Result<Option<PathBuf>> {
        let file_name = match self.resume_viewer.status() {
            ViewerStatus::Ready { resource_id, .. } => self
                .applications
                .get(&resource_id)
                .map(|app| app.resume_file_name().to_string())
                .unwrap_or_else(|| DEFAULT_RESUME_NAME.to_string()),
            _ => return Ok(None),
        };
        self.resume_viewer.save(dir, &file_name).await
    }

    pub fn open_cover_letter(&self, application_id: &str) -> Result<CoverLetterView> {
        let application = self
            .applications
            .get(application_id)
            .ok_or_else(|| Error::NotFound(format!("Application {}", application_id)))?;
        let view = application.cover_letter_view();
        *self.cover_letter.lock().expect("cover letter mutex poisoned") = Some(view.clone());
        Ok(view)
    }

    pub fn cover_letter(&self) -> Option<CoverLetterView> {
        self.cover_letter
            .lock()
            .expect("cover letter mutex poisoned")
            .clone()
    }

    pub fn close_cover_letter(&self) {
        self.cover_letter
            .lock()
            .expect("cover letter mutex poisoned")
            .take();
    }
}

/// Banner text for a failed application list read.
pub fn applications_error_message(err: &Error) -> &'static str {
    match err.kind() {
        ErrorKind::NotAuthorized => "You don't have permission to view applications for this job.",
        _ => "Failed to fetch applications. Please try again.",
    }
}
