use std::sync::Arc;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::saved_job::SavedJob;
use crate::services::api_client::ApiClient;
use crate::store::bookmarks::BookmarkSet;
use crate::store::derived::JobQuery;
use crate::store::resource::{LoadOutcome, ResourceStore};

const SAVED_JOBS: &str = "auth/saved-jobs";

pub struct SavedJobsService {
    api: ApiClient,
    saved: ResourceStore<SavedJob>,
    bookmarks: Arc<BookmarkSet>,
}

impl SavedJobsService {
    pub fn new(api: ApiClient, bookmarks: Arc<BookmarkSet>) -> Self {
        Self {
            api,
            saved: ResourceStore::new(),
            bookmarks,
        }
    }

    pub fn saved(&self) -> &ResourceStore<SavedJob> {
        &self.saved
    }

    pub async fn load(&self) -> Result<LoadOutcome> {
        if !self.api.has_credential() {
            return Err(Error::Unauthorized("Please login to view saved jobs".to_string()));
        }
        let ticket = self.bookmarks.sync_ticket();
        let outcome = self.saved.load(SAVED_JOBS, self.api.saved_jobs()).await?;
        if let LoadOutcome::Applied(_) = outcome {
            let ids: Vec<String> = self.saved.with_items(|items| {
                items
                    .iter()
                    .filter_map(SavedJob::job_id)
                    .map(str::to_string)
                    .collect()
            });
            self.bookmarks.hydrate(ticket, ids);
        }
        Ok(outcome)
    }

    /// Saved entries whose job is still available, optionally filtered.
    pub fn visible(&self, query: &JobQuery) -> Vec<SavedJob> {
        self.saved
            .derive(query)
            .into_iter()
            .filter(|saved| saved.job_posting().is_some())
            .collect()
    }

    pub fn count_label(&self) -> String {
        let count = self.saved.len();
        format!("{} {} saved", count, if count == 1 { "job" } else { "jobs" })
    }

    /// Removes a bookmark; the list only changes once the server confirmed.
    pub async fn remove(&self, job_id: &str) -> Result<()> {
        self.api.remove_saved_job(job_id).await?;
        self.saved.remove_where(|saved| saved.job_id() == Some(job_id));
        self.bookmarks.forget(job_id);
        info!("Job {} removed from bookmarks", job_id);
        Ok(())
    }
}
