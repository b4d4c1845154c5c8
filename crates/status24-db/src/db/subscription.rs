use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

use status24_core::models::OrganizationDocument;

use super::StoreError;

/// Latest published state of a document; `None` while it does not exist.
pub type Snapshot = Option<Arc<OrganizationDocument>>;

/// Hook run when a subscription goes away.
struct Release(Option<Box<dyn FnOnce() + Send + Sync>>);

impl Drop for Release {
    fn drop(&mut self) {
        if let Some(hook) = self.0.take() {
            hook();
        }
    }
}

impl fmt::Debug for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Release").field(&self.0.is_some()).finish()
    }
}

/// Live handle on one organization document.
///
/// Dropping the handle unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    org_id: String,
    receiver: watch::Receiver<Snapshot>,
    // Declared after `receiver` so the hook sees the receiver already dropped.
    _release: Release,
}

impl Subscription {
    pub(crate) fn new(org_id: impl Into<String>, receiver: watch::Receiver<Snapshot>) -> Self {
        Subscription {
            org_id: org_id.into(),
            receiver,
            _release: Release(None),
        }
    }

    /// Runs `hook` after the receiver is dropped.
    pub(crate) fn on_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self._release = Release(Some(Box::new(hook)));
        self
    }

    pub fn org_id(&self) -> &str {
        &self.org_id
    }

    /// The most recent snapshot, without waiting.
    pub fn current(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Waits for the next published snapshot.
    ///
    /// Intermediate snapshots published while the caller was busy are
    /// skipped; only the newest one is returned.
    pub async fn changed(&mut self) -> Result<Snapshot, StoreError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::SubscriptionClosed(self.org_id.clone()))?;
        Ok(self.receiver.borrow_and_update().clone())
    }

    /// Releases the subscription.
    pub fn unsubscribe(self) {
        tracing::debug!(org_id = %self.org_id, "Subscription released");
    }
}
