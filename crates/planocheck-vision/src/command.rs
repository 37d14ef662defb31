//! External detector command provider

use std::path::Path;
use std::process::Command;

use tracing::{debug, info, warn};

use planocheck_types::{Detection, Error, Result};

use crate::{parse_detections, DetectionProvider};

/// Detections below this confidence are dropped
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.25;

/// Detections below this confidence are logged as possible drift
pub const DEFAULT_LOW_CONFIDENCE: f64 = 0.4;

/// Runs an external detector and parses its JSON stdout.
///
/// The command is invoked as `<command...> --image <path> --min-conf <c>` and
/// must print `{"detections": [...]}` (or a bare array) with normalized boxes.
#[derive(Debug, Clone)]
pub struct CommandDetectionProvider {
    program: String,
    args: Vec<String>,
    min_confidence: f64,
    low_confidence: f64,
}

impl CommandDetectionProvider {
    /// Build from a shell-style command line, e.g. `python detect.py --model yolov8n.pt`
    pub fn new(command_line: &str) -> Result<Self> {
        let mut parts = shell_words::split(command_line)
            .map_err(|e| Error::DetectionFailed(format!("invalid detector command: {}", e)))?;
        if parts.is_empty() {
            return Err(Error::DetectionFailed("detector command is empty".to_string()));
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            low_confidence: DEFAULT_LOW_CONFIDENCE,
        })
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    pub fn with_low_confidence(mut self, low_confidence: f64) -> Self {
        self.low_confidence = low_confidence.clamp(0.0, 1.0);
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Apply the confidence floor and the provider contract checks
    fn filter(&self, detections: Vec<Detection>) -> Result<Vec<Detection>> {
        let mut kept = Vec::with_capacity(detections.len());
        for detection in detections {
            if detection.confidence < self.min_confidence {
                continue;
            }
            detection.validate()?;
            if detection.confidence < self.low_confidence {
                debug!(
                    "Low confidence detection: {} {:.3}",
                    detection.class_name, detection.confidence
                );
            }
            kept.push(detection);
        }
        Ok(kept)
    }
}

impl DetectionProvider for CommandDetectionProvider {
    fn name(&self) -> &str {
        "command"
    }

    fn detect(&self, image_path: &Path) -> Result<Vec<Detection>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.arg("--image");
        cmd.arg(image_path);
        cmd.arg("--min-conf");
        cmd.arg(format!("{}", self.min_confidence));

        debug!(
            "Running: {} {:?} --image {:?} --min-conf {}",
            self.program, self.args, image_path, self.min_confidence
        );

        let output = cmd
            .output()
            .map_err(|e| Error::DetectionFailed(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("detector exited with {}: {}", output.status, stderr.trim());
            return Err(Error::DetectionFailed(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Err(Error::DetectionFailed(format!(
                "{} produced no output",
                self.program
            )));
        }

        let raw = parse_detections(&stdout)?;
        let raw_count = raw.len();
        let detections = self.filter(raw)?;
        info!(
            "{}: {} detections ({} below confidence floor)",
            image_path.display(),
            detections.len(),
            raw_count - detections.len()
        );
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_split() {
        let provider = CommandDetectionProvider::new("python3 'my detect.py' --model yolov8n.pt").unwrap();
        assert_eq!(provider.program(), "python3");
        assert_eq!(provider.args, vec!["my detect.py", "--model", "yolov8n.pt"]);
    }

    #[test]
    fn test_empty_command_rejected() {
        assert!(CommandDetectionProvider::new("   ").is_err());
        assert!(CommandDetectionProvider::new("python 'unterminated").is_err());
    }

    #[test]
    fn test_filter_drops_below_floor() {
        let provider = CommandDetectionProvider::new("detector").unwrap().with_min_confidence(0.3);
        let kept = provider
            .filter(vec![
                Detection::new("bottle", 0.9, [0.1, 0.1, 0.2, 0.2]),
                Detection::new("cup", 0.1, [0.3, 0.3, 0.4, 0.4]),
            ])
            .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].class_name, "bottle");
    }

    #[test]
    fn test_filter_rejects_malformed() {
        let provider = CommandDetectionProvider::new("detector").unwrap();
        let result = provider.filter(vec![Detection::new("bottle", 0.9, [0.5, 0.1, 0.2, 0.2])]);
        assert!(matches!(result, Err(Error::InvalidDetection(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_runs_command() {
        let script = r#"printf '{"detections":[{"class_name":"bottle","confidence":0.9,"bbox":[0.1,0.1,0.2,0.2]},{"class_name":"cup","confidence":0.2,"bbox":[0.3,0.3,0.4,0.4]}]}'"#;
        let provider = CommandDetectionProvider {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            low_confidence: DEFAULT_LOW_CONFIDENCE,
        };
        let detections = provider.detect(Path::new("shelf.jpg")).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].class_name, "bottle");
    }

    #[cfg(unix)]
    #[test]
    fn test_detect_reports_failure() {
        let provider = CommandDetectionProvider {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "echo boom >&2; exit 3".to_string()],
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            low_confidence: DEFAULT_LOW_CONFIDENCE,
        };
        let err = provider.detect(Path::new("shelf.jpg")).unwrap_err();
        assert!(matches!(err, Error::DetectionFailed(ref msg) if msg.contains("boom")));
    }
}
