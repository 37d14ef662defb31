//! Audit Service - core use case for shelf photo audits
//!
//! Orchestrates one audit:
//! 1. Look up the store and its planogram
//! 2. Validate the image
//! 3. Copy the image into the data directory
//! 4. Run the detection provider
//! 5. Normalize and evaluate against the planogram
//! 6. Persist the audit with its detections in one write

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use planocheck_domain::model::Audit;
use planocheck_domain::repository::{AuditRepository, StoreRepository};
use planocheck_domain::service::audit_detections;
use planocheck_types::Error;
use planocheck_vision::DetectionProvider;

use crate::scanner::{hash_image, validate_image};

/// Ids tried before giving up when other writers keep claiming them
const MAX_SAVE_ATTEMPTS: u32 = 5;

/// Errors specific to the audit service
#[derive(Debug, Error)]
pub enum AuditServiceError {
    #[error("Store not found: {0}")]
    StoreNotFound(u64),

    #[error("Image validation failed: {0}")]
    InvalidImage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Detection failed: {0}")]
    DetectionFailed(String),

    #[error("Store error: {0}")]
    StoreError(String),
}

impl From<Error> for AuditServiceError {
    fn from(err: Error) -> Self {
        match err {
            Error::StoreNotFound(id) => AuditServiceError::StoreNotFound(id),
            Error::FileNotFound(msg) | Error::InvalidImageFormat(msg) => {
                AuditServiceError::InvalidImage(msg)
            }
            Error::Image(e) => AuditServiceError::InvalidImage(e.to_string()),
            Error::InvalidDetection(_) | Error::InvalidPlanogram(_) => {
                AuditServiceError::InvalidInput(err.to_string())
            }
            Error::DetectionFailed(msg) => AuditServiceError::DetectionFailed(msg),
            _ => AuditServiceError::StoreError(err.to_string()),
        }
    }
}

impl AuditServiceError {
    /// Maps to a "not found" response at the boundary
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuditServiceError::StoreNotFound(_))
    }

    /// Maps to a "bad request" response at the boundary
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            AuditServiceError::InvalidImage(_) | AuditServiceError::InvalidInput(_)
        )
    }
}

/// Runs shelf audits against injected repositories and a detection provider
pub struct AuditService {
    stores: Box<dyn StoreRepository>,
    audits: Box<dyn AuditRepository>,
    detector: Box<dyn DetectionProvider>,
    images_dir: PathBuf,
}

impl AuditService {
    pub fn new(
        stores: Box<dyn StoreRepository>,
        audits: Box<dyn AuditRepository>,
        detector: Box<dyn DetectionProvider>,
        images_dir: PathBuf,
    ) -> Self {
        Self {
            stores,
            audits,
            detector,
            images_dir,
        }
    }

    pub fn stores(&self) -> &dyn StoreRepository {
        self.stores.as_ref()
    }

    pub fn audits(&self) -> &dyn AuditRepository {
        self.audits.as_ref()
    }

    /// Audit one shelf photo for `store_id` and persist the result
    pub fn process_shelf_audit(
        &self,
        store_id: u64,
        image_path: &Path,
    ) -> std::result::Result<Audit, AuditServiceError> {
        // Step 1: Store lookup
        let store = self
            .stores
            .find_by_id(store_id)?
            .ok_or(AuditServiceError::StoreNotFound(store_id))?;

        // Step 2: Validate image
        let ext = validate_image(image_path)?;

        // Step 3: Keep a copy of the audited image
        let stored_name = format!("{}.{}", Uuid::new_v4(), ext);
        std::fs::create_dir_all(&self.images_dir).map_err(Error::from)?;
        let stored_path = self.images_dir.join(&stored_name);
        std::fs::copy(image_path, &stored_path).map_err(Error::from)?;

        match self.evaluate_and_save(&store.planogram, store_id, image_path, &stored_path, &stored_name) {
            Ok(audit) => {
                info!(
                    "Audit #{} for store #{} '{}': score {:.2}%, {} missing, {} misplaced",
                    audit.id,
                    store.id,
                    store.name,
                    audit.report.compliance_score,
                    audit.report.missing_items.len(),
                    audit.report.misplaced_items.len()
                );
                Ok(audit)
            }
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_file(&stored_path) {
                    warn!("Failed to remove {}: {}", stored_path.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    fn evaluate_and_save(
        &self,
        planogram: &planocheck_types::Planogram,
        store_id: u64,
        source_path: &Path,
        stored_path: &Path,
        stored_name: &str,
    ) -> std::result::Result<Audit, AuditServiceError> {
        let image_hash = hash_image(stored_path)?;

        // Step 4: Detection
        debug!("Running {} detector on {}", self.detector.name(), source_path.display());
        let detections = self.detector.detect(source_path).map_err(|e| match e {
            Error::FileNotFound(path) => {
                AuditServiceError::DetectionFailed(format!("no recorded detections at {}", path))
            }
            other => AuditServiceError::from(other),
        })?;

        // Step 5: Compliance
        let report = audit_detections(detections, planogram)?;

        // Step 6: Persist under a fresh id
        let mut audit = Audit {
            id: self.audits.next_id()?,
            store_id,
            image_path: format!("images/{}", stored_name),
            image_hash,
            timestamp: Utc::now(),
            report,
        };
        let mut attempts = 1;
        loop {
            match self.audits.save(&audit) {
                Ok(()) => return Ok(audit),
                Err(Error::AuditExists(id)) if attempts < MAX_SAVE_ATTEMPTS => {
                    debug!("Audit id {} taken by another writer, retrying", id);
                    audit.id = self.audits.next_id()?;
                    attempts += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
