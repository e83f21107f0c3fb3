use serde::{Deserialize, Serialize};

use crate::models::application::{Application, ApplicationStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employer_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationListResponse {
    /// Absent on endpoints that do not report it; only an explicit `false` fails.
    pub success: Option<bool>,
    #[serde(default)]
    pub applications: Vec<Application>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStatusPayload {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationEnvelope {
    pub application: Option<Application>,
    pub message: Option<String>,
}
