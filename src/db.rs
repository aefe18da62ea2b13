use anyhow::{Context, Result};
use mongodb::options::ClientOptions;
use mongodb::{
    Client, Collection, Database as MongoDatabase,
    bson::{doc, oid::ObjectId},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::Config;
use crate::data_models::SearchLog;

/// Collection names as constants for consistency
pub mod collections {
    pub const SEARCH_LOGS: &str = "search_logs";
}

/// Main database wrapper providing connection management and collection access
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: MongoDatabase,
}

impl Database {
    /// Connect and ping. Fails if the server is unreachable.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let client_options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;

        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        tracing::info!(db_name, "connected to MongoDB");

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Connect using the configured URI, or return `None` when search logging
    /// is not configured.
    pub async fn from_config(config: &Config) -> Result<Option<Self>> {
        match config.mongo_uri.as_deref() {
            Some(uri) => Ok(Some(Self::new(uri, &config.mongo_db_name).await?)),
            None => Ok(None),
        }
    }

    /// Get a typed collection by name
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.db.collection(name)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn search_logs(&self) -> Collection<SearchLog> {
        self.collection(collections::SEARCH_LOGS)
    }
}

/// Thin typed wrapper over a collection.
#[derive(Debug, Clone)]
pub struct Repository<T>
where
    T: Send + Sync,
{
    collection: Collection<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    /// Insert a single document
    pub async fn insert(&self, doc: &T) -> Result<ObjectId> {
        let result = self
            .collection
            .insert_one(doc)
            .await
            .context("Failed to insert document")?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| anyhow::anyhow!("Failed to get inserted ObjectId"))
    }
}

/// Append-only log of searches, one document per answered request.
#[derive(Debug, Clone)]
pub struct SearchLogRepo {
    repo: Repository<SearchLog>,
}

impl SearchLogRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            repo: Repository::new(db.search_logs()),
        }
    }

    pub async fn insert(&self, entry: &SearchLog) -> Result<ObjectId> {
        self.repo.insert(entry).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::*;

    #[tokio::test]
    #[ignore = "requires a running MongoDB"]
    async fn test_search_log_insert() -> Result<()> {
        let (db, db_name) = create_test_db().await?;
        let repo = SearchLogRepo::new(&db);

        let entry = SearchLog::new(
            "user-1".to_string(),
            "onion routing".to_string(),
            5,
            "curl/8.0".to_string(),
            "fallback".to_string(),
            "b6f0c7c2-0000-4000-8000-000000000000".to_string(),
        );

        let id = repo.insert(&entry).await?;

        let found = db.search_logs().find_one(doc! { "_id": id }).await?;
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.query, "onion routing");
        assert_eq!(found.results_count, 5);
        assert_eq!(found.metadata.source, "fallback");

        let for_user = db
            .search_logs()
            .count_documents(doc! { "user_id": "user-1" })
            .await?;
        assert_eq!(for_user, 1);

        cleanup_test_db(&db, &db_name).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_from_config_without_uri_disables_logging() -> Result<()> {
        let config = Config::default();
        assert!(Database::from_config(&config).await?.is_none());
        Ok(())
    }
}
