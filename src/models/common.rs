use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of the `error` field in failed responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InvalidateCacheRequest {
    /// Cache tags, e.g. `apigee_my_purchased_plans`.
    pub tags: Vec<String>,
}
