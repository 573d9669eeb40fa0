//! HTTP API over the file service.
//!
//! # Endpoints
//!
//! - `POST /files` - Upload one or more files (multipart, field `files`)
//! - `GET /files` - List every stored record
//! - `GET /files/{id}` - Fetch one record
//! - `GET /files/{id}/export/json` - Download a record as JSON
//! - `GET /files/{id}/export/csv` - Download a record as CSV
//! - `GET /health` - Health check
//!
//! # cURL Examples
//!
//! ```bash
//! curl -F "files=@report.pdf" -F "files=@data.csv" http://localhost:8080/files
//! curl http://localhost:8080/files/1
//! curl -OJ http://localhost:8080/files/1/export/csv
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::ApiError;
pub use server::{create_router, serve};
pub use types::{ApiState, ErrorResponse, HealthResponse, UPLOAD_FIELD};
