//! Demo data

use tracing::info;

use planocheck_domain::model::{NewStore, Store};
use planocheck_domain::repository::StoreRepository;
use planocheck_types::Result;

/// Register a demo store when the repository is empty.
///
/// Planogram keys are COCO class names so a stock YOLO model works out of the box.
pub fn seed_demo_store(repo: &dyn StoreRepository) -> Result<Option<Store>> {
    if !repo.find_all()?.is_empty() {
        return Ok(None);
    }
    let store = repo.create(NewStore {
        name: "SuperMart Downtown".to_string(),
        location: "NYC Block 4".to_string(),
        planogram: [("bottle", 5), ("cup", 3), ("bowl", 2)].into_iter().collect(),
    })?;
    info!("Seeded demo store #{}", store.id);
    Ok(Some(store))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planocheck_infra::persistence::FileStoreRepository;
    use tempfile::tempdir;

    #[test]
    fn test_seed_only_once() {
        let dir = tempdir().unwrap();
        let repo = FileStoreRepository::open(dir.path().to_path_buf()).unwrap();
        let store = seed_demo_store(&repo).unwrap().unwrap();
        assert_eq!(store.planogram.total_expected(), 10);
        assert!(seed_demo_store(&repo).unwrap().is_none());
        assert_eq!(repo.find_all().unwrap().len(), 1);
    }
}
