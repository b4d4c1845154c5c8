use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::sync::{watch, RwLock};

use status24_core::models::OrganizationDocument;

use super::{DocumentStore, Mutation, Snapshot, StoreError, Subscription, WriteMode};

type Documents = BTreeMap<String, OrganizationDocument>;
type Channels = HashMap<String, watch::Sender<Snapshot>>;

fn snapshot(documents: &Documents, org_id: &str) -> Snapshot {
    documents.get(org_id).cloned().map(Arc::new)
}

fn lock_channels(channels: &Mutex<Channels>) -> MutexGuard<'_, Channels> {
    channels.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drops the channel of `org_id` once nobody listens on it.
fn release_channel(channels: &Weak<Mutex<Channels>>, org_id: &str) {
    let Some(channels) = channels.upgrade() else {
        return;
    };
    let mut channels = lock_channels(&channels);
    if channels
        .get(org_id)
        .is_some_and(|sender| sender.receiver_count() == 0)
    {
        channels.remove(org_id);
        tracing::debug!(org_id, "Subscription channel released");
    }
}

/// Process-local document store.
///
/// Writes are serialised behind one async `RwLock`; each organization gets a
/// `watch` channel on first subscription, dropped again as soon as its last
/// subscriber is gone.
#[derive(Clone, Default)]
pub struct MemoryDocumentStore {
    documents: Arc<RwLock<Documents>>,
    channels: Arc<Mutex<Channels>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `documents`. A document without an id takes
    /// the id it is keyed under.
    pub fn with_documents(documents: impl IntoIterator<Item = (String, OrganizationDocument)>) -> Self {
        let documents = documents
            .into_iter()
            .map(|(org_id, mut document)| {
                if document.id.is_empty() {
                    document.id = org_id.clone();
                }
                (org_id, document)
            })
            .collect();

        MemoryDocumentStore {
            documents: Arc::new(RwLock::new(documents)),
            channels: Arc::default(),
        }
    }

    /// Loads a JSON object mapping organization ids to documents.
    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        if !value.is_object() {
            return Err(StoreError::Seed(format!(
                "{} must contain a JSON object keyed by organization id",
                path.display()
            )));
        }
        let documents: Documents = serde_json::from_value(value)?;

        tracing::info!(
            path = %path.display(),
            organizations = documents.len(),
            "Loaded document store seed"
        );
        Ok(Self::with_documents(documents))
    }

    /// Must be called while holding the documents write lock.
    fn publish(&self, documents: &Documents, org_id: &str) {
        let mut channels = lock_channels(&self.channels);
        if let Some(sender) = channels.get(org_id) {
            if sender.receiver_count() == 0 {
                channels.remove(org_id);
            } else {
                sender.send_replace(snapshot(documents, org_id));
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.keys().cloned().collect())
    }

    async fn get(&self, org_id: &str) -> Result<Option<OrganizationDocument>, StoreError> {
        let documents = self.documents.read().await;
        Ok(documents.get(org_id).cloned())
    }

    async fn ensure_document(&self, org_id: &str) -> Result<bool, StoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(org_id) {
            return Ok(false);
        }
        documents.insert(org_id.to_string(), OrganizationDocument::new(org_id));
        self.publish(&documents, org_id);
        Ok(true)
    }

    #[tracing::instrument(skip(self, mutation), fields(db.operation = "apply"))]
    async fn apply(
        &self,
        org_id: &str,
        mode: WriteMode,
        mutation: Mutation,
    ) -> Result<OrganizationDocument, StoreError> {
        let mut documents = self.documents.write().await;

        let mut document = match (documents.get(org_id), mode) {
            (Some(existing), _) => existing.clone(),
            (None, WriteMode::CreateIfMissing) => OrganizationDocument::new(org_id),
            (None, WriteMode::RequireExisting) => {
                return Err(StoreError::DocumentNotFound(org_id.to_string()))
            }
        };

        mutation(&mut document)?;

        documents.insert(org_id.to_string(), document.clone());
        self.publish(&documents, org_id);
        Ok(document)
    }

    async fn subscribe(&self, org_id: &str) -> Result<Subscription, StoreError> {
        // Holding the read lock keeps writers from publishing in between.
        let documents = self.documents.read().await;
        let receiver = lock_channels(&self.channels)
            .entry(org_id.to_string())
            .or_insert_with(|| watch::Sender::new(snapshot(&documents, org_id)))
            .subscribe();
        drop(documents);

        tracing::debug!(org_id, "Subscription opened");
        let channels = Arc::downgrade(&self.channels);
        let key = org_id.to_string();
        Ok(Subscription::new(org_id, receiver).on_release(move || release_channel(&channels, &key)))
    }

    async fn subscriber_count(&self, org_id: &str) -> usize {
        lock_channels(&self.channels)
            .get(org_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn ensure_document_creates_once() {
        let store = MemoryDocumentStore::new();
        assert!(store.ensure_document("org_1").await.unwrap());
        assert!(!store.ensure_document("org_1").await.unwrap());
        assert_eq!(store.list_ids().await.unwrap(), vec!["org_1".to_string()]);
        assert_eq!(store.get("org_1").await.unwrap().unwrap().id, "org_1");
    }

    #[tokio::test]
    async fn require_existing_fails_without_document() {
        let store = MemoryDocumentStore::new();
        let err = store
            .apply("org_1", WriteMode::RequireExisting, Box::new(|_| Ok(())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DocumentNotFound(_)));
        assert!(!store.exists("org_1").await.unwrap());
    }

    #[tokio::test]
    async fn failed_mutation_leaves_store_untouched() {
        let store = MemoryDocumentStore::new();
        let err = store
            .apply(
                "org_1",
                WriteMode::CreateIfMissing,
                Box::new(|_| Err(StoreError::Seed("boom".to_string()))),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Seed(_)));
        assert!(!store.exists("org_1").await.unwrap());
    }

    #[tokio::test]
    async fn subscribers_receive_each_write() {
        let store = MemoryDocumentStore::new();
        let mut subscription = store.subscribe("org_1").await.unwrap();
        assert!(subscription.current().is_none());

        store.ensure_document("org_1").await.unwrap();
        let snapshot = subscription.changed().await.unwrap();
        assert_eq!(snapshot.unwrap().id, "org_1");
    }

    #[tokio::test]
    async fn dropping_subscription_releases_it() {
        let store = MemoryDocumentStore::new();
        let first = store.subscribe("org_1").await.unwrap();
        let second = store.subscribe("org_1").await.unwrap();
        assert_eq!(store.subscriber_count("org_1").await, 2);

        drop(first);
        assert_eq!(store.subscriber_count("org_1").await, 1);

        second.unsubscribe();
        assert_eq!(store.subscriber_count("org_1").await, 0);
        assert!(lock_channels(&store.channels).is_empty());

        store.ensure_document("org_1").await.unwrap();
        let third = store.subscribe("org_1").await.unwrap();
        assert_eq!(third.current().unwrap().id, "org_1");
    }

    #[tokio::test]
    async fn channels_of_unknown_orgs_are_released() {
        let store = MemoryDocumentStore::new();
        for i in 0..1000 {
            let subscription = store.subscribe(&format!("org_{}", i)).await.unwrap();
            assert!(subscription.current().is_none());
            drop(subscription);
        }
        assert!(lock_channels(&store.channels).is_empty());
        assert!(store.list_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn release_after_store_dropped_is_noop() {
        let store = MemoryDocumentStore::new();
        let subscription = store.subscribe("org_1").await.unwrap();
        drop(store);
        drop(subscription);
    }

    #[tokio::test]
    async fn seed_file_fills_missing_ids() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"org_acme": {{"services": {{"s1": {{"name": "Website", "type": "website", "status": "operational"}}}}}}}}"#
        )
        .unwrap();

        let store = MemoryDocumentStore::from_seed_file(file.path()).unwrap();
        let document = store.get("org_acme").await.unwrap().unwrap();
        assert_eq!(document.id, "org_acme");
        assert_eq!(document.services.len(), 1);
    }

    #[tokio::test]
    async fn seed_file_must_be_an_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[]").unwrap();
        assert!(matches!(
            MemoryDocumentStore::from_seed_file(file.path()),
            Err(StoreError::Seed(_))
        ));
    }
}
