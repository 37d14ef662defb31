//! Repository adapters for persistence layer

use std::path::PathBuf;

use planocheck_infra::persistence::{FileAuditRepository, FileStoreRepository};
use planocheck_types::Result;

use crate::config::Config;

/// Open file-based store repository
pub fn open_store_repo(config: &Config) -> Result<FileStoreRepository> {
    FileStoreRepository::open(config.data_dir()?)
}

/// Open file-based audit repository
pub fn open_audit_repo(config: &Config) -> Result<FileAuditRepository> {
    FileAuditRepository::open(config.data_dir()?)
}

/// Open store repository at a custom directory
pub fn open_store_repo_at(data_dir: PathBuf) -> Result<FileStoreRepository> {
    FileStoreRepository::open(data_dir)
}

/// Open audit repository at a custom directory
pub fn open_audit_repo_at(data_dir: PathBuf) -> Result<FileAuditRepository> {
    FileAuditRepository::open(data_dir)
}
