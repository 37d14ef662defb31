//! Repository trait definitions for data persistence

use crate::model::{Audit, NewStore, Store};
use planocheck_types::Error;

/// Repository for stores and their planograms
pub trait StoreRepository {
    /// Register a store and return it with its assigned id
    fn create(&self, store: NewStore) -> Result<Store, Error>;

    /// Find a store by id
    fn find_by_id(&self, id: u64) -> Result<Option<Store>, Error>;

    /// Find all stores, ordered by id
    fn find_all(&self) -> Result<Vec<Store>, Error>;
}

/// Repository for audits. Audits are append-only.
pub trait AuditRepository {
    /// Reserve the id for the next audit
    fn next_id(&self) -> Result<u64, Error>;

    /// Persist an audit together with its detections in one write
    fn save(&self, audit: &Audit) -> Result<(), Error>;

    /// Find an audit by id
    fn find_by_id(&self, id: u64) -> Result<Option<Audit>, Error>;

    /// Find audits for one store, newest first
    fn find_by_store(&self, store_id: u64) -> Result<Vec<Audit>, Error>;

    /// Find all audits, newest first
    fn find_all(&self) -> Result<Vec<Audit>, Error>;
}
