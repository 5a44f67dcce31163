//! `firmdex-infra` — storage implementations behind the domain's ports.
//!
//! In-memory stores for the request-per-call model. A database-backed
//! implementation would slot in behind the same traits.

pub mod access_store;
pub mod directory_store;

pub use access_store::{InMemoryAccessStore, InMemoryPermissionCatalog};
pub use directory_store::{DirectoryStore, InMemoryDirectoryStore};
