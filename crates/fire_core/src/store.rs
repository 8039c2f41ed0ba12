//! The document store seam
//!
//! [`crate::firestore::FirestoreClient`] is the production implementation.

use crate::model::Document;
use async_trait::async_trait;
use fire_common::Result;

/// Read-only access to a document database
#[async_trait]
pub trait DocumentStore {
    /// Fetch up to `limit` documents from `collection`, in server order
    async fn fetch(&self, collection: &str, limit: u32) -> Result<Vec<Document>>;

    /// Server-side count of every document in `collection`
    async fn count(&self, collection: &str) -> Result<u64>;
}
