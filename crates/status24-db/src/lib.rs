//! Document store and repositories for Status24.
//!
//! Each organization owns one document holding its services and incidents.
//! Stores publish a fresh snapshot to every subscriber after each write.

pub mod db;

pub use db::{
    DocumentStore, MemoryDocumentStore, Mutation, OrganizationRepository, Snapshot, StoreError,
    Subscription, WriteMode,
};
