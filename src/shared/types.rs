use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of every non-2xx JSON response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Summary of what failed
    pub message: String,
    /// Underlying error message, when an external service failed
    pub error: Option<String>,
}
