//! Core value types for shelf compliance auditing

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// One recognized object instance returned by a detection provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Product / class label (e.g. "bottle")
    pub class_name: String,
    /// Model confidence in [0.0, 1.0]
    pub confidence: f64,
    /// Normalized [x_min, y_min, x_max, y_max]
    pub bbox: [f64; 4],
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f64, bbox: [f64; 4]) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }

    /// Strict check of the provider contract: label, confidence range and box geometry
    pub fn validate(&self) -> Result<()> {
        if self.class_name.trim().is_empty() {
            return Err(Error::InvalidDetection("empty class name".to_string()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(Error::InvalidDetection(format!(
                "{}: confidence {} outside [0, 1]",
                self.class_name, self.confidence
            )));
        }
        if self.bbox.iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(Error::InvalidDetection(format!(
                "{}: bbox {:?} not normalized",
                self.class_name, self.bbox
            )));
        }
        let [x_min, y_min, x_max, y_max] = self.bbox;
        if x_min > x_max || y_min > y_max {
            return Err(Error::InvalidDetection(format!(
                "{}: bbox {:?} has inverted corners",
                self.class_name, self.bbox
            )));
        }
        Ok(())
    }
}

/// Expected quantity for a single product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanogramEntry {
    pub product: String,
    /// Signed so that negative quantities can be reported instead of failing to parse
    pub expected: i64,
}

/// Expected product layout of a shelf: product name -> quantity, in declaration order
///
/// Serializes as a plain JSON/TOML object. An empty planogram means no
/// expectation has been declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Planogram {
    entries: Vec<PlanogramEntry>,
}

impl Planogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a product. Replacing keeps its position.
    pub fn insert(&mut self, product: impl Into<String>, expected: i64) {
        let product = product.into();
        match self.entries.iter_mut().find(|e| e.product == product) {
            Some(entry) => entry.expected = expected,
            None => self.entries.push(PlanogramEntry { product, expected }),
        }
    }

    pub fn get(&self, product: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|e| e.product == product)
            .map(|e| e.expected)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanogramEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all expected quantities, widened so it cannot overflow
    pub fn total_expected(&self) -> i128 {
        self.entries.iter().map(|e| i128::from(e.expected)).sum()
    }
}

impl<S: Into<String>> FromIterator<(S, i64)> for Planogram {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut planogram = Planogram::new();
        for (product, expected) in iter {
            planogram.insert(product, expected);
        }
        planogram
    }
}

impl Serialize for Planogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.product, &entry.expected)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Planogram {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PlanogramVisitor;

        impl<'de> Visitor<'de> for PlanogramVisitor {
            type Value = Planogram;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of product name to expected quantity")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Planogram, A::Error> {
                let mut planogram = Planogram::new();
                while let Some((product, expected)) = access.next_entry::<String, i64>()? {
                    planogram.insert(product, expected);
                }
                Ok(planogram)
            }

            fn visit_unit<E: serde::de::Error>(self) -> std::result::Result<Planogram, E> {
                Ok(Planogram::new())
            }

            fn visit_none<E: serde::de::Error>(self) -> std::result::Result<Planogram, E> {
                Ok(Planogram::new())
            }
        }

        deserializer.deserialize_any(PlanogramVisitor)
    }
}

/// Observed quantity per class name, kept in first-seen order
///
/// Equality ignores ordering: two tallies are equal when they hold the same
/// class -> count pairs.
#[derive(Debug, Clone, Default)]
pub struct DetectedCounts {
    counts: Vec<(String, u32)>,
}

impl DetectedCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observation of `class_name`
    pub fn increment(&mut self, class_name: &str) {
        match self.counts.iter_mut().find(|(name, _)| name == class_name) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((class_name.to_string(), 1)),
        }
    }

    /// Set the count for `class_name`, keeping its position if already present
    pub fn insert(&mut self, class_name: impl Into<String>, count: u32) {
        let class_name = class_name.into();
        match self.counts.iter_mut().find(|(name, _)| *name == class_name) {
            Some((_, c)) => *c = count,
            None => self.counts.push((class_name, count)),
        }
    }

    pub fn get(&self, class_name: &str) -> Option<u32> {
        self.counts
            .iter()
            .find(|(name, _)| name == class_name)
            .map(|(_, count)| *count)
    }

    /// Remove the whole entry for `class_name`, returning its count
    pub fn remove(&mut self, class_name: &str) -> Option<u32> {
        let idx = self.counts.iter().position(|(name, _)| name == class_name)?;
        Some(self.counts.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.counts.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total number of observations across all classes
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, count)| u64::from(*count)).sum()
    }
}

impl PartialEq for DetectedCounts {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, count)| other.get(name) == Some(count))
    }
}

impl<S: Into<String>> FromIterator<(S, u32)> for DetectedCounts {
    fn from_iter<I: IntoIterator<Item = (S, u32)>>(iter: I) -> Self {
        let mut counts = DetectedCounts::new();
        for (name, count) in iter {
            counts.insert(name, count);
        }
        counts
    }
}

impl Serialize for DetectedCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (name, count) in &self.counts {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

/// Result of comparing one shelf photo against a planogram
///
/// Field names are part of the JSON output and must stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceReport {
    /// Every detection, in provider order
    pub detections: Vec<Detection>,
    /// "<product> (Exp: <expected>, Fnd: <actual>)" for each under-stocked product
    pub missing_items: Vec<String>,
    /// Detected classes that the planogram does not name
    pub misplaced_items: Vec<String>,
    /// Percentage of expected units found, rounded to 2 decimals
    pub compliance_score: f64,
}

impl ComplianceReport {
    pub fn is_fully_compliant(&self) -> bool {
        self.missing_items.is_empty() && self.misplaced_items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_validate_ok() {
        let d = Detection::new("bottle", 0.91, [0.1, 0.2, 0.3, 0.4]);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_detection_validate_rejects_empty_name() {
        let d = Detection::new("  ", 0.9, [0.0, 0.0, 1.0, 1.0]);
        assert!(matches!(d.validate(), Err(Error::InvalidDetection(_))));
    }

    #[test]
    fn test_detection_validate_rejects_bad_confidence() {
        let d = Detection::new("cup", 1.2, [0.0, 0.0, 1.0, 1.0]);
        assert!(d.validate().is_err());
        let nan = Detection::new("cup", f64::NAN, [0.0, 0.0, 1.0, 1.0]);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_detection_validate_rejects_inverted_bbox() {
        let d = Detection::new("cup", 0.5, [0.6, 0.1, 0.2, 0.3]);
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_planogram_keeps_declaration_order() {
        let json = r#"{"bottle": 5, "cup": 3, "bowl": 2}"#;
        let planogram: Planogram = serde_json::from_str(json).unwrap();
        let products: Vec<&str> = planogram.iter().map(|e| e.product.as_str()).collect();
        assert_eq!(products, vec!["bottle", "cup", "bowl"]);
        assert_eq!(planogram.total_expected(), 10);
    }

    #[test]
    fn test_total_expected_beyond_i64() {
        let planogram: Planogram = [("bottle", i64::MAX), ("cup", 1)].into_iter().collect();
        assert_eq!(planogram.total_expected(), i128::from(i64::MAX) + 1);
    }

    #[test]
    fn test_planogram_serializes_as_object() {
        let planogram: Planogram = [("bottle", 5), ("cup", 3)].into_iter().collect();
        let json = serde_json::to_string(&planogram).unwrap();
        assert_eq!(json, r#"{"bottle":5,"cup":3}"#);
    }

    #[test]
    fn test_planogram_null_is_empty() {
        let planogram: Planogram = serde_json::from_str("null").unwrap();
        assert!(planogram.is_empty());
    }

    #[test]
    fn test_planogram_insert_replaces_in_place() {
        let mut planogram: Planogram = [("a", 1), ("b", 2)].into_iter().collect();
        planogram.insert("a", 7);
        assert_eq!(planogram.len(), 2);
        assert_eq!(planogram.iter().next().unwrap().expected, 7);
    }

    #[test]
    fn test_counts_equality_ignores_order() {
        let a: DetectedCounts = [("bottle", 2), ("cup", 1)].into_iter().collect();
        let b: DetectedCounts = [("cup", 1), ("bottle", 2)].into_iter().collect();
        assert_eq!(a, b);
        let c: DetectedCounts = [("cup", 1)].into_iter().collect();
        assert_ne!(a, c);
    }

    #[test]
    fn test_counts_remove_returns_full_count() {
        let mut counts: DetectedCounts = [("bottle", 9), ("can", 2)].into_iter().collect();
        assert_eq!(counts.remove("bottle"), Some(9));
        assert_eq!(counts.remove("bottle"), None);
        assert_eq!(counts.keys().collect::<Vec<_>>(), vec!["can"]);
    }

    #[test]
    fn test_report_json_field_names() {
        let report = ComplianceReport {
            detections: vec![],
            missing_items: vec!["bowl (Exp: 2, Fnd: 0)".to_string()],
            misplaced_items: vec![],
            compliance_score: 60.0,
        };
        let value = serde_json::to_value(&report).unwrap();
        for key in ["detections", "missing_items", "misplaced_items", "compliance_score"] {
            assert!(value.get(key).is_some(), "missing field {}", key);
        }
    }
}
