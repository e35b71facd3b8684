//! External collaborator traits and in-memory implementations.

pub mod auth;
pub mod blob;

pub use auth::{AuthProvider, InMemoryAuthProvider, Principal, Role};
pub use blob::{BlobError, BlobStore, InMemoryBlobStore, StoredBlob};
