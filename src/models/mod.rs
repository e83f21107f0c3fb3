pub mod application;
pub mod job;
pub mod notification;
pub mod saved_job;
pub mod user;
