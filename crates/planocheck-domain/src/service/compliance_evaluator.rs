//! Compliance evaluation: detected counts vs. planogram

use planocheck_types::{ComplianceReport, DetectedCounts, Detection, Error, Planogram, Result};

use super::normalizer::normalize;

/// Compare detected counts against a planogram and build the report.
///
/// Planogram products are visited in declaration order. A product's whole
/// detected count is consumed when it is matched, so surplus units of a
/// planogram product are capped in the score and never reported as misplaced.
pub fn evaluate(
    detections: Vec<Detection>,
    counts: &DetectedCounts,
    planogram: &Planogram,
) -> Result<ComplianceReport> {
    if let Some(entry) = planogram.iter().find(|e| e.expected < 0) {
        return Err(Error::InvalidPlanogram(format!(
            "{} has negative expected quantity {}",
            entry.product, entry.expected
        )));
    }

    // i128: no sum of i64 quantities overflows
    let mut total_expected: i128 = 0;
    let mut total_found_correctly: i128 = 0;
    let mut missing_items = Vec::new();
    let mut remaining_counts = counts.clone();

    for entry in planogram.iter() {
        let expected = i128::from(entry.expected);
        total_expected += expected;
        let actual = i128::from(remaining_counts.get(&entry.product).unwrap_or(0));

        if actual < expected {
            missing_items.push(format!(
                "{} (Exp: {}, Fnd: {})",
                entry.product, entry.expected, actual
            ));
            total_found_correctly += actual;
        } else {
            total_found_correctly += expected;
        }

        remaining_counts.remove(&entry.product);
    }

    let misplaced_items: Vec<String> = remaining_counts.keys().map(str::to_string).collect();

    let compliance_score = if total_expected > 0 {
        round2(total_found_correctly as f64 / total_expected as f64 * 100.0)
    } else if !detections.is_empty() || !counts.is_empty() {
        100.0
    } else {
        0.0
    };

    Ok(ComplianceReport {
        detections,
        missing_items,
        misplaced_items,
        compliance_score,
    })
}

/// Normalize a raw detection batch and evaluate it in one step
pub fn audit_detections(detections: Vec<Detection>, planogram: &Planogram) -> Result<ComplianceReport> {
    let counts = normalize(&detections)?;
    evaluate(detections, &counts, planogram)
}

/// Two-decimal rounding with ties to even, so 3.125 becomes 3.12
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
