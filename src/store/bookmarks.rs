use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::services::api_client::ApiClient;

/// Job ids the signed-in user has bookmarked.
///
/// Local state only changes after the server confirmed the add or remove.
/// `clear` starts a new epoch; toggles that were in flight across it are
/// confirmed remotely but not applied locally.
pub struct BookmarkSet {
    ids: watch::Sender<HashSet<String>>,
    sync: Arc<Mutex<SyncState>>,
}

#[derive(Default)]
struct SyncState {
    pending: HashSet<String>,
    /// Bumped on `clear`.
    epoch: u64,
    /// Bumped on every local change to the set.
    revision: u64,
}

/// Taken before reading the server's bookmark list; `hydrate` refuses the
/// list if the set changed since.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
    revision: u64,
}

impl Default for BookmarkSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a job as having a toggle in flight until dropped.
struct PendingToggle {
    job_id: String,
    epoch: u64,
    sync: Arc<Mutex<SyncState>>,
}

impl Drop for PendingToggle {
    fn drop(&mut self) {
        self.sync
            .lock()
            .expect("bookmark mutex poisoned")
            .pending
            .remove(&self.job_id);
    }
}

impl BookmarkSet {
    pub fn new() -> Self {
        let (ids, _) = watch::channel(HashSet::new());
        Self {
            ids,
            sync: Arc::new(Mutex::new(SyncState::default())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<HashSet<String>> {
        self.ids.subscribe()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.ids.borrow().contains(job_id)
    }

    pub fn len(&self) -> usize {
        self.ids.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_pending(&self, job_id: &str) -> bool {
        self.lock().pending.contains(job_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SyncState> {
        self.sync.lock().expect("bookmark mutex poisoned")
    }

    pub fn sync_ticket(&self) -> SyncTicket {
        SyncTicket {
            revision: self.lock().revision,
        }
    }

    /// Replaces the whole set, e.g. from the current user's saved jobs.
    /// Returns false, leaving the set alone, when the set changed after
    /// `ticket` was taken or a toggle is still in flight.
    pub fn hydrate<I, S>(&self, ticket: SyncTicket, job_ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sync = self.lock();
        if sync.revision != ticket.revision || !sync.pending.is_empty() {
            debug!("Skipping stale bookmark list");
            return false;
        }
        sync.revision += 1;
        let ids: HashSet<String> = job_ids.into_iter().map(Into::into).collect();
        self.ids.send_replace(ids);
        true
    }

    pub fn clear(&self) {
        let mut sync = self.lock();
        sync.epoch += 1;
        sync.revision += 1;
        self.ids.send_if_modified(|ids| {
            let changed = !ids.is_empty();
            ids.clear();
            changed
        });
    }

    /// Drops a job from the set after a removal confirmed elsewhere.
    pub fn forget(&self, job_id: &str) {
        let mut sync = self.lock();
        sync.revision += 1;
        self.ids.send_if_modified(|ids| ids.remove(job_id));
    }

    fn claim(&self, job_id: &str) -> Result<PendingToggle> {
        let mut sync = self.lock();
        if !sync.pending.insert(job_id.to_string()) {
            return Err(Error::Busy(format!("bookmark for job {}", job_id)));
        }
        Ok(PendingToggle {
            job_id: job_id.to_string(),
            epoch: sync.epoch,
            sync: Arc::clone(&self.sync),
        })
    }

    /// Applies a confirmed toggle unless the set was cleared meanwhile.
    fn apply(&self, toggle: &PendingToggle, saved: bool) {
        let mut sync = self.lock();
        if sync.epoch != toggle.epoch {
            debug!("Bookmark for job {} confirmed after logout", toggle.job_id);
            return;
        }
        sync.revision += 1;
        self.ids.send_if_modified(|ids| {
            if saved {
                ids.insert(toggle.job_id.clone())
            } else {
                ids.remove(&toggle.job_id)
            }
        });
    }

    /// Flips the bookmark for `job_id` and returns the new state.
    pub async fn toggle(&self, api: &ApiClient, job_id: &str) -> Result<bool> {
        if !api.has_credential() {
            return Err(Error::Unauthorized("Please login to bookmark jobs".to_string()));
        }
        let pending = self.claim(job_id)?;

        if self.contains(job_id) {
            api.remove_saved_job(job_id).await?;
            self.apply(&pending, false);
            info!("Job {} removed from bookmarks", job_id);
            Ok(false)
        } else {
            api.save_job(job_id).await?;
            self.apply(&pending, true);
            info!("Job {} bookmarked", job_id);
            Ok(true)
        }
    }
}
