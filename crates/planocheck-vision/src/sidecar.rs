//! Pre-recorded detections stored next to the image

use std::path::{Path, PathBuf};

use tracing::debug;

use planocheck_types::{Detection, Error, Result};

use crate::{parse_detections, DetectionProvider};

/// `shelf.jpg` -> `shelf.jpg.detections.json`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = image_path.as_os_str().to_os_string();
    name.push(".detections.json");
    PathBuf::from(name)
}

/// Reads `<image>.detections.json` instead of running a model
#[derive(Debug, Clone, Default)]
pub struct JsonFileDetectionProvider;

impl JsonFileDetectionProvider {
    pub fn new() -> Self {
        Self
    }
}

impl DetectionProvider for JsonFileDetectionProvider {
    fn name(&self) -> &str {
        "sidecar"
    }

    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let path = sidecar_path(image_path);
        if !path.exists() {
            return Err(Error::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let detections = parse_detections(&content)?;
        for detection in &detections {
            detection.validate()?;
        }
        debug!("{}: {} recorded detections", path.display(), detections.len());
        Ok(detections)
    }
}
