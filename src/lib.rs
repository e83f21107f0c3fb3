pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::user::CurrentUser;
use crate::services::{
    api_client::ApiClient, applicant_service::AppliedJobsService,
    employer_service::EmployerReviewService, job_service::JobBoardService,
    notification_service::NotificationCenter, saved_job_service::SavedJobsService,
};
use crate::store::{bookmarks::BookmarkSet, transient::TransientStore};

/// State shared by every page of one signed-in (or anonymous) session.
pub struct Session {
    pub config: Config,
    pub api: ApiClient,
    pub documents: TransientStore,
    pub bookmarks: Arc<BookmarkSet>,
    pub notifications: Arc<NotificationCenter>,
    user: Mutex<Option<CurrentUser>>,
}

impl Session {
    pub fn new(config: Config) -> Result<Self> {
        let api = ApiClient::new(&config)?;
        let notifications = Arc::new(NotificationCenter::new(api.clone()));

        Ok(Self {
            config,
            api,
            documents: TransientStore::new(),
            bookmarks: Arc::new(BookmarkSet::new()),
            notifications,
            user: Mutex::new(None),
        })
    }

    /// Loads the signed-in user, seeds bookmarks and starts the notification
    /// center. Anonymous sessions skip all of it. Notification failures are
    /// logged and leave the session usable.
    pub async fn start(&self) -> Result<Option<CurrentUser>> {
        if !self.api.has_credential() {
            info!("Starting anonymous session");
            return Ok(None);
        }

        let ticket = self.bookmarks.sync_ticket();
        let user = self.api.current_user().await?;
        self.bookmarks.hydrate(ticket, user.saved_job_ids());
        *self.user.lock().expect("session mutex poisoned") = Some(user.clone());
        info!("Session started for {}", user.email);

        if let Err(e) = self.notifications.start().await {
            warn!("Failed to load notifications: {}", e);
        }
        Ok(Some(user))
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.user.lock().expect("session mutex poisoned").clone()
    }

    /// Clears the user, bookmarks and notifications and releases every
    /// document. Loaders that were showing a document read as idle afterwards.
    pub fn logout(&self) {
        self.user.lock().expect("session mutex poisoned").take();
        self.bookmarks.clear();
        self.notifications.teardown();
        let revoked = self.documents.revoke_all();
        info!("Session closed, released {} documents", revoked);
    }

    pub fn job_board(&self) -> JobBoardService {
        JobBoardService::new(self.api.clone(), Arc::clone(&self.bookmarks))
    }

    pub fn saved_jobs(&self) -> SavedJobsService {
        SavedJobsService::new(self.api.clone(), Arc::clone(&self.bookmarks))
    }

    pub fn applied_jobs(&self) -> AppliedJobsService {
        AppliedJobsService::new(self.api.clone(), self.documents.clone())
    }

    /// The review desk is only available to a signed-in employer.
    pub fn employer_review(&self) -> Result<EmployerReviewService> {
        let user = self
            .current_user()
            .ok_or_else(|| Error::Unauthorized("Please login to view applications".to_string()))?;
        if !user.is_employer() {
            return Err(Error::Unauthorized(
                "Only employers can review applications".to_string(),
            ));
        }
        Ok(EmployerReviewService::new(
            self.api.clone(),
            self.documents.clone(),
            &user,
        ))
    }
}
