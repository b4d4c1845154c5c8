//! Store implementations and the repository on top of them.
//
// Store seam and its in-memory implementation
pub mod memory;
pub mod store;
//
// Live snapshot handles
pub mod subscription;
//
// Organization document operations used by the API
pub mod organization;
//
pub mod error;

pub use error::StoreError;
pub use memory::MemoryDocumentStore;
pub use organization::OrganizationRepository;
pub use store::{DocumentStore, Mutation, WriteMode};
pub use subscription::{Snapshot, Subscription};
