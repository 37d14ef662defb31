//! Domain services

pub mod compliance_evaluator;
pub mod normalizer;
pub mod report;

pub use compliance_evaluator::{audit_detections, evaluate};
pub use normalizer::normalize;
pub use report::generate_compliance_report;
