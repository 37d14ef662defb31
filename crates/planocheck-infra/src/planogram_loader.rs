//! Planogram loaders (JSON, TOML, CSV)
//!
//! CSV format: `product,expected` per line, optional header row.

use std::path::Path;

use tracing::debug;

use planocheck_types::{Error, Planogram, Result};

/// Load a planogram, choosing the format from the file extension
pub fn load_planogram(path: &Path) -> Result<Planogram> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    let planogram: Planogram = match ext.as_str() {
        "json" => serde_json::from_str(&content)?,
        "toml" => toml::from_str(&content)?,
        "csv" => parse_planogram_csv(&content)?,
        other => {
            return Err(Error::InvalidPlanogram(format!(
                "unsupported planogram format '{}' (expected json, toml or csv)",
                other
            )))
        }
    };
    debug!("Loaded planogram with {} products from {}", planogram.len(), path.display());
    Ok(planogram)
}

/// Parse `product,expected` rows. A first row whose quantity is not a number is a header.
pub fn parse_planogram_csv(content: &str) -> Result<Planogram> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut planogram = Planogram::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let product = record.get(0).unwrap_or_default();
        let quantity = record.get(1).unwrap_or_default();
        let expected = match quantity.parse::<i64>() {
            Ok(n) => n,
            Err(_) if idx == 0 => continue,
            Err(_) => {
                return Err(Error::InvalidPlanogram(format!(
                    "line {}: '{}' is not a quantity",
                    idx + 1,
                    quantity
                )))
            }
        };
        if product.is_empty() {
            return Err(Error::InvalidPlanogram(format!("line {}: empty product name", idx + 1)));
        }
        planogram.insert(product, expected);
    }
    Ok(planogram)
}
