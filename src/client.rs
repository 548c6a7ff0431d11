use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{
    AggregateOptions, DistinctOptions, FindOneAndDeleteOptions, FindOneAndReplaceOptions,
    FindOneAndUpdateOptions, FindOneOptions, FindOptions, UpdateModifications, WriteModel,
};
use mongodb::results::{
    DeleteResult, InsertManyResult, InsertOneResult, SummaryBulkWriteResult, UpdateResult,
};
use mongodb::{Client, Collection, Cursor, Database};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::MongoConfig;
use crate::error::{MongoError, MongoResult};

/// Client handle bound to a default database
///
/// Wraps the driver's `Client` and forwards query, CRUD, and admin
/// operations to it. Every method that accepts an optional filter treats
/// `None` as the empty filter; single-document lookups report an absent
/// document as `Ok(None)` rather than an error.
///
/// Cloning is cheap: the underlying driver handles share one connection
/// pool.
///
/// # Example
///
/// ```ignore
/// use mongokit::{MongoClient, MongoConfig};
/// use mongodb::bson::doc;
///
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "mydb");
/// let client = MongoClient::connect(&config).await?;
///
/// let user: Option<User> = client.find_one("users", doc! { "email": "a@b.c" }, None).await?;
/// ```
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db: Database,
}

impl MongoClient {
    /// Build a client from configuration without touching the network
    ///
    /// The driver connects lazily on first use; call [`MongoClient::connect`]
    /// instead to verify reachability up front.
    pub async fn new(config: &MongoConfig) -> MongoResult<Self> {
        let options = config.client_options().await?;
        let client = Client::with_options(options)?;
        let db = client.database(&config.database);
        Ok(Self { client, db })
    }

    /// Build a client from configuration and verify the connection
    pub async fn connect(config: &MongoConfig) -> MongoResult<Self> {
        let handle = Self::new(config).await?;
        handle
            .ping()
            .await
            .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;
        info!(database = %config.database, "Connected to MongoDB");
        Ok(handle)
    }

    /// Run a `ping` command against the server
    pub async fn ping(&self) -> MongoResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    /// The underlying driver client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// The default database this handle is bound to
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// A typed collection in the default database
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.db.collection::<T>(name)
    }

    /// The same client bound to another database
    pub fn with_database(&self, name: &str) -> Self {
        Self {
            client: self.client.clone(),
            db: self.client.database(name),
        }
    }

    /// Tear down the client, draining pooled connections
    pub async fn shutdown(self) {
        debug!(database = %self.db.name(), "Shutting down MongoDB client");
        self.client.shutdown().await;
    }

    /// List database names visible to this client
    pub async fn list_database_names(
        &self,
        filter: impl Into<Option<Document>>,
    ) -> MongoResult<Vec<String>> {
        let mut action = self.client.list_database_names();
        if let Some(filter) = filter.into() {
            action = action.filter(filter);
        }
        Ok(action.await?)
    }

    /// List collection names in the default database
    pub async fn list_collection_names(
        &self,
        filter: impl Into<Option<Document>>,
    ) -> MongoResult<Vec<String>> {
        let mut action = self.db.list_collection_names();
        if let Some(filter) = filter.into() {
            action = action.filter(filter);
        }
        Ok(action.await?)
    }

    /// Count documents matching `filter`
    ///
    /// With no filter this uses the server's collection metadata
    /// (`estimated_document_count`), which is fast but approximate; with a
    /// filter it runs an exact `count_documents`.
    pub async fn count(
        &self,
        coll: &str,
        filter: impl Into<Option<Document>>,
    ) -> MongoResult<u64> {
        let collection = self.collection::<Document>(coll);
        match filter.into() {
            None => Ok(collection.estimated_document_count().await?),
            Some(filter) => Ok(collection.count_documents(filter).await?),
        }
    }

    /// Look up a single document by its `_id`
    ///
    /// Returns `Ok(None)` when no document has that id.
    pub async fn find_by_id<T>(&self, coll: &str, id: impl Into<Bson>) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        Ok(self.collection::<T>(coll).find_one(id_filter(id)).await?)
    }

    /// Find the first document matching `filter`
    ///
    /// Returns `Ok(None)` when nothing matches.
    pub async fn find_one<T>(
        &self,
        coll: &str,
        filter: impl Into<Option<Document>>,
        options: impl Into<Option<FindOneOptions>>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(coll);
        let mut action = collection.find_one(filter.into().unwrap_or_default());
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        Ok(action.await?)
    }

    /// Find matching documents and return a cursor for streaming
    pub async fn find<T>(
        &self,
        coll: &str,
        filter: impl Into<Option<Document>>,
        options: impl Into<Option<FindOptions>>,
    ) -> MongoResult<Cursor<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(coll);
        let mut action = collection.find(filter.into().unwrap_or_default());
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        Ok(action.await?)
    }

    /// Find matching documents collected into a `Vec`
    pub async fn find_all<T>(
        &self,
        coll: &str,
        filter: impl Into<Option<Document>>,
        options: impl Into<Option<FindOptions>>,
    ) -> MongoResult<Vec<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let cursor = self.find::<T>(coll, filter, options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Distinct values of `field` across documents matching `filter`
    pub async fn distinct(
        &self,
        coll: &str,
        field: &str,
        filter: impl Into<Option<Document>>,
        options: impl Into<Option<DistinctOptions>>,
    ) -> MongoResult<Vec<Bson>> {
        let collection = self.collection::<Document>(coll);
        let mut action = collection.distinct(field, filter.into().unwrap_or_default());
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        Ok(action.await?)
    }

    /// Insert a single document
    pub async fn insert_one<T>(&self, coll: &str, document: &T) -> MongoResult<InsertOneResult>
    where
        T: Serialize + Send + Sync,
    {
        Ok(self.collection::<T>(coll).insert_one(document).await?)
    }

    /// Insert a batch of documents
    pub async fn insert_many<T>(
        &self,
        coll: &str,
        documents: impl IntoIterator<Item = T>,
    ) -> MongoResult<InsertManyResult>
    where
        T: Serialize + Send + Sync,
    {
        Ok(self.collection::<T>(coll).insert_many(documents).await?)
    }

    /// Replace the first document matching `filter`
    pub async fn replace_one<T>(
        &self,
        coll: &str,
        filter: Document,
        replacement: &T,
    ) -> MongoResult<UpdateResult>
    where
        T: Serialize + Send + Sync,
    {
        Ok(self
            .collection::<T>(coll)
            .replace_one(filter, replacement)
            .await?)
    }

    /// Replace the document with the given `_id`
    pub async fn replace_by_id<T>(
        &self,
        coll: &str,
        id: impl Into<Bson>,
        replacement: &T,
    ) -> MongoResult<UpdateResult>
    where
        T: Serialize + Send + Sync,
    {
        self.replace_one(coll, id_filter(id), replacement).await
    }

    /// Update the first document matching `filter`
    pub async fn update_one(
        &self,
        coll: &str,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> MongoResult<UpdateResult> {
        Ok(self
            .collection::<Document>(coll)
            .update_one(filter, update)
            .await?)
    }

    /// Update every document matching `filter`
    pub async fn update_many(
        &self,
        coll: &str,
        filter: Document,
        update: impl Into<UpdateModifications>,
    ) -> MongoResult<UpdateResult> {
        Ok(self
            .collection::<Document>(coll)
            .update_many(filter, update)
            .await?)
    }

    /// Update the document with the given `_id`
    pub async fn update_by_id(
        &self,
        coll: &str,
        id: impl Into<Bson>,
        update: impl Into<UpdateModifications>,
    ) -> MongoResult<UpdateResult> {
        self.update_one(coll, id_filter(id), update).await
    }

    /// Delete the first document matching `filter`
    pub async fn delete_one(&self, coll: &str, filter: Document) -> MongoResult<DeleteResult> {
        Ok(self.collection::<Document>(coll).delete_one(filter).await?)
    }

    /// Delete every document matching `filter`
    pub async fn delete_many(&self, coll: &str, filter: Document) -> MongoResult<DeleteResult> {
        Ok(self
            .collection::<Document>(coll)
            .delete_many(filter)
            .await?)
    }

    /// Delete the document with the given `_id`
    pub async fn delete_by_id(
        &self,
        coll: &str,
        id: impl Into<Bson>,
    ) -> MongoResult<DeleteResult> {
        self.delete_one(coll, id_filter(id)).await
    }

    /// Atomically update one document and return it
    ///
    /// Returns the document as it was before the update unless the options
    /// request the post-image. `Ok(None)` when nothing matched.
    pub async fn find_one_and_update<T>(
        &self,
        coll: &str,
        filter: Document,
        update: impl Into<UpdateModifications>,
        options: impl Into<Option<FindOneAndUpdateOptions>>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(coll);
        let mut action = collection.find_one_and_update(filter, update);
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        Ok(action.await?)
    }

    /// Atomically replace one document and return it
    pub async fn find_one_and_replace<T>(
        &self,
        coll: &str,
        filter: Document,
        replacement: &T,
        options: impl Into<Option<FindOneAndReplaceOptions>>,
    ) -> MongoResult<Option<T>>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(coll);
        let mut action = collection.find_one_and_replace(filter, replacement);
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        Ok(action.await?)
    }

    /// Atomically delete one document and return it
    pub async fn find_one_and_delete<T>(
        &self,
        coll: &str,
        filter: Document,
        options: impl Into<Option<FindOneAndDeleteOptions>>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Send + Sync,
    {
        let collection = self.collection::<T>(coll);
        let mut action = collection.find_one_and_delete(filter);
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        Ok(action.await?)
    }

    /// Run an aggregation pipeline and collect the resulting documents
    pub async fn aggregate(
        &self,
        coll: &str,
        pipeline: impl IntoIterator<Item = Document>,
        options: impl Into<Option<AggregateOptions>>,
    ) -> MongoResult<Vec<Document>> {
        let collection = self.collection::<Document>(coll);
        let mut action = collection.aggregate(pipeline);
        if let Some(options) = options.into() {
            action = action.with_options(options);
        }
        let cursor = action.await?;
        Ok(cursor.try_collect().await?)
    }

    /// Execute a mixed batch of write operations in one round trip
    ///
    /// Operations may target any database, not just the default one.
    pub async fn bulk_write(
        &self,
        models: impl IntoIterator<Item = WriteModel>,
    ) -> MongoResult<SummaryBulkWriteResult> {
        Ok(self.client.bulk_write(models).await?)
    }
}

fn id_filter(id: impl Into<Bson>) -> Document {
    doc! { "_id": id.into() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MongoConfig;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn test_id_filter_shapes() {
        assert_eq!(id_filter(42i64), doc! { "_id": 42i64 });
        assert_eq!(id_filter("abc"), doc! { "_id": "abc" });
        let oid = ObjectId::new();
        assert_eq!(id_filter(oid), doc! { "_id": oid });
    }

    #[tokio::test]
    async fn test_new_binds_default_database() {
        let config = MongoConfig::with_database("mongodb://localhost:27017", "reports");
        let client = MongoClient::new(&config).await.unwrap();
        assert_eq!(client.database().name(), "reports");
    }

    #[tokio::test]
    async fn test_with_database_rebinds() {
        let config = MongoConfig::with_database("mongodb://localhost:27017", "reports");
        let client = MongoClient::new(&config).await.unwrap();
        let other = client.with_database("audit");
        assert_eq!(other.database().name(), "audit");
        // The original handle is untouched
        assert_eq!(client.database().name(), "reports");
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_find_one_missing_returns_none() {
        let config = MongoConfig::with_database(test_uri(), "mongokit_test");
        let client = MongoClient::connect(&config).await.unwrap();
        let found: Option<Document> = client
            .find_by_id("things", "no-such-id-ever")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_insert_find_roundtrip() {
        let config = MongoConfig::with_database(test_uri(), "mongokit_test");
        let client = MongoClient::connect(&config).await.unwrap();
        client.delete_many("things", doc! {}).await.unwrap();

        client
            .insert_one("things", &doc! { "_id": "a", "code": 7 })
            .await
            .unwrap();
        let found: Option<Document> = client.find_by_id("things", "a").await.unwrap();
        assert_eq!(found.unwrap().get_i32("code").unwrap(), 7);

        let exact = client.count("things", doc! { "code": 7 }).await.unwrap();
        assert_eq!(exact, 1);

        let codes = client
            .distinct("things", "code", None, None)
            .await
            .unwrap();
        assert_eq!(codes.len(), 1);
    }

    fn test_uri() -> String {
        std::env::var("MONGODB_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string())
    }
}
