//! API request and response types.

use crate::files::FileService;
use serde::{Deserialize, Serialize};

/// Multipart field name carrying uploaded files.
pub const UPLOAD_FIELD: &str = "files";

/// API server state.
#[derive(Clone)]
pub struct ApiState {
    pub service: FileService,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status
    pub status: String,
    /// API version
    pub version: String,
    /// Number of stored file records
    pub records: usize,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error type name
    pub error_type: String,
    /// Error message
    pub message: String,
    /// HTTP status code
    pub status_code: u16,
}
