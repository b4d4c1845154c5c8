use async_trait::async_trait;
use status24_core::models::OrganizationDocument;

use super::{StoreError, Subscription};

/// A field-level write applied to one organization document.
///
/// The closure only touches the fields it names; the store applies it to the
/// latest document, so concurrent writers resolve as last write wins per field.
/// Returning an error discards the write.
pub type Mutation = Box<dyn FnOnce(&mut OrganizationDocument) -> Result<(), StoreError> + Send>;

/// How a write treats an organization without a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Start from an empty document.
    CreateIfMissing,
    /// Fail with [`StoreError::DocumentNotFound`].
    RequireExisting,
}

/// Trait for organization document stores.
///
/// One document per organization. Every committed write publishes the new
/// document to the organization's subscribers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of every organization that has a document.
    async fn list_ids(&self) -> Result<Vec<String>, StoreError>;

    async fn get(&self, org_id: &str) -> Result<Option<OrganizationDocument>, StoreError>;

    async fn exists(&self, org_id: &str) -> Result<bool, StoreError> {
        Ok(self.get(org_id).await?.is_some())
    }

    /// Creates an empty document if there is none. Returns whether one was created.
    async fn ensure_document(&self, org_id: &str) -> Result<bool, StoreError>;

    /// Applies `mutation` atomically and returns the committed document.
    async fn apply(
        &self,
        org_id: &str,
        mode: WriteMode,
        mutation: Mutation,
    ) -> Result<OrganizationDocument, StoreError>;

    /// Opens a live view of one organization's document. The document does
    /// not have to exist yet.
    async fn subscribe(&self, org_id: &str) -> Result<Subscription, StoreError>;

    /// Number of live subscriptions for an organization.
    async fn subscriber_count(&self, org_id: &str) -> usize;
}
