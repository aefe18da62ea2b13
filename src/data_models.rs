use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// Caller identity as resolved by the identity provider. Lives for one request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub email: String,
}

/// One row of the search log.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchLog {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: String,
    pub query: String,
    pub results_count: i64,
    pub metadata: SearchLogMetadata,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SearchLogMetadata {
    pub user_agent: String,
    pub source: String,
    pub search_id: String,
    pub timestamp: DateTime,
}

impl SearchLog {
    pub fn new(
        user_id: String,
        query: String,
        results_count: usize,
        user_agent: String,
        source: String,
        search_id: String,
    ) -> SearchLog {
        SearchLog {
            id: ObjectId::new(),
            user_id,
            query,
            results_count: results_count as i64,
            metadata: SearchLogMetadata {
                user_agent,
                source,
                search_id,
                timestamp: DateTime::now(),
            },
        }
    }
}
