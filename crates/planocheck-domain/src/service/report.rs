//! Plain-text rendering of a compliance report

use planocheck_types::ComplianceReport;

/// Render a report; detections below `low_confidence` are flagged "(low)"
pub fn generate_compliance_report(title: &str, report: &ComplianceReport, low_confidence: f64) -> String {
    let mut out = String::new();
    out.push_str("==================================================\n");
    out.push_str(&format!("  Shelf Compliance Report: {}\n", title));
    out.push_str("==================================================\n\n");

    out.push_str("[Summary]\n");
    out.push_str(&format!("  Compliance score:   {:.2}%\n", report.compliance_score));
    out.push_str(&format!("  Detections:         {}\n", report.detections.len()));
    out.push_str(&format!("  Missing products:   {}\n", report.missing_items.len()));
    out.push_str(&format!("  Misplaced products: {}\n", report.misplaced_items.len()));
    out.push('\n');

    out.push_str("[Missing]\n");
    if report.missing_items.is_empty() {
        out.push_str("  All items present\n");
    } else {
        for item in &report.missing_items {
            out.push_str(&format!("  - {}\n", item));
        }
    }
    out.push('\n');

    out.push_str("[Misplaced]\n");
    if report.misplaced_items.is_empty() {
        out.push_str("  Planogram compliant\n");
    } else {
        for item in &report.misplaced_items {
            out.push_str(&format!("  - {}\n", item));
        }
    }
    out.push('\n');

    if !report.detections.is_empty() {
        out.push_str("[Detections]\n");
        out.push_str("-".repeat(60).as_str());
        out.push('\n');
        out.push_str(&format!(
            "{:<20} {:>6}  {}\n",
            "Class", "Conf", "BBox [x1, y1, x2, y2]"
        ));
        out.push_str("-".repeat(60).as_str());
        out.push('\n');
        for d in &report.detections {
            let flag = if d.confidence < low_confidence { " (low)" } else { "" };
            out.push_str(&format!(
                "{:<20} {:>5.0}%  [{:.3}, {:.3}, {:.3}, {:.3}]{}\n",
                truncate_str(&d.class_name, 19),
                d.confidence * 100.0,
                d.bbox[0],
                d.bbox[1],
                d.bbox[2],
                d.bbox[3],
                flag
            ));
        }
        out.push('\n');
    }

    out.push_str("==================================================\n");
    out
}

fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(2)).collect();
        format!("{}..", truncated)
    } else {
        s.to_string()
    }
}
