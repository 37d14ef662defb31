use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use planocheck_types::ComplianceReport;

/// One shelf audit. Created once with its report and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Audit {
    pub id: u64,
    pub store_id: u64,
    pub image_path: String,
    /// SHA-256 of the audited image
    pub image_hash: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub report: ComplianceReport,
}

impl Audit {
    pub fn compliance_score(&self) -> f64 {
        self.report.compliance_score
    }
}
