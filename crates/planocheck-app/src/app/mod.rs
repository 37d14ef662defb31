//! Application use cases

pub mod audit_service;

pub use audit_service::{AuditService, AuditServiceError};
