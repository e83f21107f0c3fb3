use std::sync::Arc;

use tracing::{info, warn};

use crate::dto::job_dto::JobListQuery;
use crate::error::Result;
use crate::models::job::JobPosting;
use crate::services::api_client::ApiClient;
use crate::store::bookmarks::BookmarkSet;
use crate::store::derived::JobQuery;
use crate::store::resource::{LoadOutcome, ResourceStore};

/// Public job listing for job seekers: approved postings plus bookmarks.
pub struct JobBoardService {
    api: ApiClient,
    jobs: ResourceStore<JobPosting>,
    bookmarks: Arc<BookmarkSet>,
}

impl JobBoardService {
    pub fn new(api: ApiClient, bookmarks: Arc<BookmarkSet>) -> Self {
        Self {
            api,
            jobs: ResourceStore::new(),
            bookmarks,
        }
    }

    pub fn jobs(&self) -> &ResourceStore<JobPosting> {
        &self.jobs
    }

    pub fn bookmarks(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    /// Loads approved postings, then refreshes bookmarks when signed in. A
    /// bookmark refresh failure does not fail the listing, and a refresh that
    /// raced a toggle or logout is dropped.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let ticket = self.bookmarks.sync_ticket();
        let query = JobListQuery::approved();
        let outcome = self
            .jobs
            .load(&query.locator(), self.api.list_jobs(&query))
            .await?;

        if self.api.has_credential() {
            match self.api.current_user().await {
                Ok(user) => {
                    self.bookmarks.hydrate(ticket, user.saved_job_ids());
                }
                Err(e) => warn!("Failed to fetch user bookmarks: {}", e),
            }
        }
        if let LoadOutcome::Applied(count) = outcome {
            info!("Loaded {} approved jobs", count);
        }
        Ok(outcome)
    }

    pub fn visible(&self, query: &JobQuery) -> Vec<JobPosting> {
        self.jobs.derive(query)
    }

    pub fn is_bookmarked(&self, job_id: &str) -> bool {
        self.bookmarks.contains(job_id)
    }

    pub async fn toggle_bookmark(&self, job_id: &str) -> Result<bool> {
        self.bookmarks.toggle(&self.api, job_id).await
    }
}
