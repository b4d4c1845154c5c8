//! Document id generation.

use uuid::Uuid;

/// Generates a new id for a service, incident or incident update.
///
/// Ids are 32 lowercase hex characters, unique within a document.
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}
