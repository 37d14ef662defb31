//! Persistence implementations
//!
//! File-based implementations of the domain repository traits.

mod atomic;
mod file_audit_repo;
mod file_store_repo;

pub use file_audit_repo::FileAuditRepository;
pub use file_store_repo::FileStoreRepository;
