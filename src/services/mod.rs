pub mod api_client;
pub mod applicant_service;
pub mod document_service;
pub mod employer_service;
pub mod job_service;
pub mod notification_service;
pub mod saved_job_service;
