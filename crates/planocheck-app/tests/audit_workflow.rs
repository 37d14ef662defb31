//! End-to-end audit workflow over file repositories and sidecar detections

use std::path::{Path, PathBuf};

use planocheck_app::app::{AuditService, AuditServiceError};
use planocheck_app::repository::{open_audit_repo_at, open_store_repo_at};
use planocheck_app::seed::seed_demo_store;
use planocheck_domain::model::NewStore;
use planocheck_domain::repository::{AuditRepository, StoreRepository};
use planocheck_vision::{sidecar_path, JsonFileDetectionProvider};
use tempfile::tempdir;

fn write_shelf(dir: &Path, name: &str, detections_json: &str) -> PathBuf {
    let image = dir.join(name);
    image::RgbImage::new(32, 24).save(&image).unwrap();
    std::fs::write(sidecar_path(&image), detections_json).unwrap();
    image
}

fn detection(class: &str, x: f64) -> String {
    format!(
        r#"{{"class_name":"{}","confidence":0.9,"bbox":[{},0.1,{},0.5]}}"#,
        class,
        x,
        x + 0.05
    )
}

fn detections_json(classes: &[(&str, usize)]) -> String {
    let mut items = Vec::new();
    for (class, n) in classes {
        for i in 0..*n {
            items.push(detection(class, i as f64 * 0.06));
        }
    }
    format!(r#"{{"detections":[{}]}}"#, items.join(","))
}

fn service(data: &Path) -> AuditService {
    AuditService::new(
        Box::new(open_store_repo_at(data.to_path_buf()).unwrap()),
        Box::new(open_audit_repo_at(data.to_path_buf()).unwrap()),
        Box::new(JsonFileDetectionProvider::new()),
        data.join("images"),
    )
}

#[test]
fn test_demo_store_partial_shelf() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let stores = open_store_repo_at(data.clone()).unwrap();
    let store = seed_demo_store(&stores).unwrap().unwrap();
    drop(stores);

    let image = write_shelf(dir.path(), "shelf.png", &detections_json(&[("bottle", 3), ("cup", 3)]));
    let audit = service(&data).process_shelf_audit(store.id, &image).unwrap();

    assert_eq!(audit.report.compliance_score, 60.0);
    assert_eq!(
        audit.report.missing_items,
        vec!["bottle (Exp: 5, Fnd: 3)", "bowl (Exp: 2, Fnd: 0)"]
    );
    assert!(audit.report.misplaced_items.is_empty());
    assert_eq!(audit.report.detections.len(), 6);
}

#[test]
fn test_overstocked_product_and_unlisted_class() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let stores = open_store_repo_at(data.clone()).unwrap();
    let store = stores
        .create(NewStore {
            name: "Bodega".to_string(),
            location: "Queens".to_string(),
            planogram: [("bottle", 5)].into_iter().collect(),
        })
        .unwrap();
    drop(stores);

    let image = write_shelf(dir.path(), "shelf.png", &detections_json(&[("bottle", 9), ("can", 2)]));
    let svc = service(&data);
    let audit = svc.process_shelf_audit(store.id, &image).unwrap();

    assert_eq!(audit.report.compliance_score, 100.0);
    assert!(audit.report.missing_items.is_empty());
    assert_eq!(audit.report.misplaced_items, vec!["can"]);

    // Persisted JSON mirrors the report field names at the top level
    let reloaded = open_audit_repo_at(data.clone()).unwrap().find_by_id(audit.id).unwrap().unwrap();
    assert_eq!(reloaded, audit);
    let raw = std::fs::read_to_string(data.join("audits").join(format!("audit_{}.json", audit.id))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["compliance_score"], 100.0);
    assert_eq!(value["detections"].as_array().unwrap().len(), 11);
}

#[test]
fn test_store_without_planogram() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let stores = open_store_repo_at(data.clone()).unwrap();
    let store = stores
        .create(NewStore {
            name: "Kiosk".to_string(),
            location: "".to_string(),
            planogram: Default::default(),
        })
        .unwrap();
    drop(stores);

    let svc = service(&data);
    let with_cup = write_shelf(dir.path(), "cup.png", &detections_json(&[("cup", 1)]));
    let audit = svc.process_shelf_audit(store.id, &with_cup).unwrap();
    assert_eq!(audit.report.compliance_score, 100.0);
    assert_eq!(audit.report.misplaced_items, vec!["cup"]);

    let empty = write_shelf(dir.path(), "empty.png", &detections_json(&[]));
    let audit = svc.process_shelf_audit(store.id, &empty).unwrap();
    assert_eq!(audit.report.compliance_score, 0.0);
    assert!(audit.report.missing_items.is_empty());
    assert!(audit.report.misplaced_items.is_empty());

    assert_eq!(svc.audits().find_by_store(store.id).unwrap().len(), 2);
}

#[test]
fn test_missing_store_is_not_found() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let image = write_shelf(dir.path(), "shelf.png", &detections_json(&[("cup", 1)]));
    let err = service(&data).process_shelf_audit(404, &image).unwrap_err();
    assert!(matches!(err, AuditServiceError::StoreNotFound(404)));
    assert!(open_audit_repo_at(data).unwrap().find_all().unwrap().is_empty());
}

#[test]
fn test_malformed_sidecar_is_invalid_input() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");
    let stores = open_store_repo_at(data.clone()).unwrap();
    seed_demo_store(&stores).unwrap();
    drop(stores);

    let image = write_shelf(
        dir.path(),
        "shelf.png",
        r#"{"detections":[{"class_name":"","confidence":0.9,"bbox":[0.1,0.1,0.2,0.2]}]}"#,
    );
    let err = service(&data).process_shelf_audit(1, &image).unwrap_err();
    assert!(err.is_invalid_input());
}
