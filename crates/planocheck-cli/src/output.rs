//! Output formatting module

use planocheck_domain::model::{Audit, Store};
use planocheck_domain::service::generate_compliance_report;
use planocheck_types::{ComplianceReport, OutputFormat, Result};

pub fn output_audit(
    output_format: OutputFormat,
    audit: &Audit,
    store_name: &str,
    low_confidence: f64,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(audit)?);
    } else {
        let title = format!("{} (audit #{})", store_name, audit.id);
        print!("{}", generate_compliance_report(&title, &audit.report, low_confidence));
        println!("Image:     {}", audit.image_path);
        println!("SHA-256:   {}", audit.image_hash);
        println!("Timestamp: {}", audit.timestamp.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    Ok(())
}

pub fn output_report(
    output_format: OutputFormat,
    report: &ComplianceReport,
    title: &str,
    low_confidence: f64,
) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        print!("{}", generate_compliance_report(title, report, low_confidence));
    }
    Ok(())
}

pub fn output_stores(output_format: OutputFormat, stores: &[Store]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(stores)?);
        return Ok(());
    }
    if stores.is_empty() {
        println!("No stores registered. Run `planocheck seed` or `planocheck store add`.");
        return Ok(());
    }
    println!("{:>4}  {:<24} {:<20} {:>8} {:>8}", "ID", "Name", "Location", "Products", "Units");
    println!("{}", "-".repeat(70));
    for store in stores {
        println!(
            "{:>4}  {:<24} {:<20} {:>8} {:>8}",
            store.id,
            store.name,
            store.location,
            store.planogram.len(),
            store.planogram.total_expected()
        );
    }
    Ok(())
}

pub fn output_store(output_format: OutputFormat, store: &Store) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(store)?);
        return Ok(());
    }
    println!("Store #{}: {}", store.id, store.name);
    println!("Location: {}", store.location);
    println!("Created:  {}", store.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    if store.planogram.is_empty() {
        println!("Planogram: (none declared)");
    } else {
        println!("Planogram:");
        for entry in store.planogram.iter() {
            println!("  {:<24} {:>4}", entry.product, entry.expected);
        }
    }
    Ok(())
}

pub fn output_history(output_format: OutputFormat, audits: &[Audit]) -> Result<()> {
    if output_format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(audits)?);
        return Ok(());
    }
    if audits.is_empty() {
        println!("No audits recorded.");
        return Ok(());
    }
    println!(
        "{:>5} {:>6}  {:<20} {:>8} {:>8} {:>10}",
        "Audit", "Store", "Timestamp", "Score", "Missing", "Misplaced"
    );
    println!("{}", "-".repeat(64));
    for audit in audits {
        println!(
            "{:>5} {:>6}  {:<20} {:>7.2}% {:>8} {:>10}",
            audit.id,
            audit.store_id,
            audit.timestamp.format("%Y-%m-%d %H:%M").to_string(),
            audit.report.compliance_score,
            audit.report.missing_items.len(),
            audit.report.misplaced_items.len()
        );
    }
    Ok(())
}
