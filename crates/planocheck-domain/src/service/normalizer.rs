//! Detection normalizer: tallies a raw detection batch by class name

use planocheck_types::{DetectedCounts, Detection, Error, Result};

/// Count detections per class name.
///
/// Confidence and bbox ranges are the provider's contract and are not checked
/// here. An empty class name is rejected.
pub fn normalize(detections: &[Detection]) -> Result<DetectedCounts> {
    let mut counts = DetectedCounts::new();
    for (idx, detection) in detections.iter().enumerate() {
        if detection.class_name.trim().is_empty() {
            return Err(Error::InvalidDetection(format!(
                "detection #{} has an empty class name",
                idx
            )));
        }
        counts.increment(&detection.class_name);
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(name: &str) -> Detection {
        Detection::new(name, 0.9, [0.1, 0.1, 0.2, 0.2])
    }

    #[test]
    fn test_empty_batch() {
        let counts = normalize(&[]).unwrap();
        assert!(counts.is_empty());
    }

    #[test]
    fn test_tally_by_class() {
        let counts = normalize(&[det("bottle"), det("cup"), det("bottle")]).unwrap();
        assert_eq!(counts.get("bottle"), Some(2));
        assert_eq!(counts.get("cup"), Some(1));
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_first_seen_key_order() {
        let counts = normalize(&[det("cup"), det("bottle"), det("cup")]).unwrap();
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["cup", "bottle"]);
    }

    #[test]
    fn test_permutation_gives_same_counts() {
        let forward = vec![det("bottle"), det("cup"), det("bowl"), det("bottle"), det("cup")];
        let mut reversed = forward.clone();
        reversed.reverse();
        let rotated: Vec<Detection> = forward[2..].iter().chain(forward[..2].iter()).cloned().collect();

        let expected = normalize(&forward).unwrap();
        assert_eq!(normalize(&reversed).unwrap(), expected);
        assert_eq!(normalize(&rotated).unwrap(), expected);
    }

    #[test]
    fn test_rejects_empty_class_name() {
        let result = normalize(&[det("bottle"), det("")]);
        assert!(matches!(result, Err(Error::InvalidDetection(_))));
    }

    #[test]
    fn test_out_of_range_confidence_is_tallied() {
        let odd = Detection::new("cup", 1.5, [0.0, 0.0, 1.0, 1.0]);
        let counts = normalize(&[odd]).unwrap();
        assert_eq!(counts.get("cup"), Some(1));
    }
}
