use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub success: bool,
    pub query: String,
    pub user_id: String,
    pub results: Vec<Value>,
    pub metadata: SearchMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub search_id: Uuid,
    pub timestamp: String,
    pub results_count: usize,
    pub source: ResultSource,
    /// Why the manager could not be used; present only on the fallback path.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub manager_error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultSource {
    #[serde(rename = "manager-service")]
    ManagerService,
    #[serde(rename = "fallback")]
    Fallback,
}

impl ResultSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultSource::ManagerService => "manager-service",
            ResultSource::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct InternalErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    pub results: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
