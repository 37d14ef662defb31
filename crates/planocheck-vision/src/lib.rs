//! Detection providers for shelf images
//!
//! The audit workflow only sees the [`DetectionProvider`] trait. The composition
//! root picks an implementation and hands it to the service:
//!
//! - [`CommandDetectionProvider`] runs an external object detector (e.g. a YOLO
//!   script) and parses its JSON output
//! - [`JsonFileDetectionProvider`] reads detections recorded next to the image
//! - [`StaticDetectionProvider`] returns a fixed list

mod command;
mod sidecar;

pub use command::{CommandDetectionProvider, DEFAULT_LOW_CONFIDENCE, DEFAULT_MIN_CONFIDENCE};
pub use sidecar::{sidecar_path, JsonFileDetectionProvider};

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use planocheck_types::{Detection, Result};

/// Something that can turn a shelf image into object detections
pub trait DetectionProvider {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Detect products in the image at `image_path`
    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>>;
}

impl<P: DetectionProvider + ?Sized> DetectionProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        (**self).detect(image_path)
    }
}

/// Returns the same detections for every image
#[derive(Debug, Clone, Default)]
pub struct StaticDetectionProvider {
    detections: Vec<Detection>,
}

impl StaticDetectionProvider {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }
}

impl DetectionProvider for StaticDetectionProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        debug!(
            "static provider: {} detections for {}",
            self.detections.len(),
            image_path.display()
        );
        Ok(self.detections.clone())
    }
}

/// Detector output is either `{"detections": [...]}` or a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DetectorOutput {
    Wrapped { detections: Vec<Detection> },
    Bare(Vec<Detection>),
}

/// Parse detector JSON output into detections
pub fn parse_detections(text: &str) -> Result<Vec<Detection>> {
    let json_str = extract_json_from_response(text);
    let parsed: DetectorOutput = serde_json::from_str(&json_str)?;
    Ok(match parsed {
        DetectorOutput::Wrapped { detections } => detections,
        DetectorOutput::Bare(detections) => detections,
    })
}

/// Strip code fences or surrounding log noise around a JSON payload
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    let open = response.find(['{', '[']);
    let close = response.rfind(['}', ']']);
    if let (Some(start), Some(end)) = (open, close) {
        if start < end {
            return response[start..=end].to_string();
        }
    }

    response.to_string()
}
