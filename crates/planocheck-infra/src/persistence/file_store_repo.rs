//! File-based store repository
//!
//! All stores live in a single `stores.json` array under the data directory.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;

use chrono::Utc;
use tracing::{debug, info};

use planocheck_domain::model::{NewStore, Store};
use planocheck_domain::repository::StoreRepository;
use planocheck_types::{Error, Result};

use super::atomic::write_json_atomic;

pub struct FileStoreRepository {
    store_path: PathBuf,
    stores: RefCell<Vec<Store>>,
}

impl FileStoreRepository {
    /// Create or load the store repository in `data_dir`
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;
        let store_path = data_dir.join("stores.json");

        let stores: Vec<Store> = if store_path.exists() {
            let file = File::open(&store_path)?;
            serde_json::from_reader(BufReader::new(file))?
        } else {
            Vec::new()
        };
        debug!("Loaded {} stores from {}", stores.len(), store_path.display());

        Ok(Self {
            store_path,
            stores: RefCell::new(stores),
        })
    }

    fn persist(&self) -> Result<()> {
        write_json_atomic(&self.store_path, &*self.stores.borrow())
    }

    pub fn is_empty(&self) -> bool {
        self.stores.borrow().is_empty()
    }
}

impl StoreRepository for FileStoreRepository {
    fn create(&self, new_store: NewStore) -> std::result::Result<Store, Error> {
        let id = self.stores.borrow().iter().map(|s| s.id).max().unwrap_or(0) + 1;
        let store = Store {
            id,
            name: new_store.name,
            location: new_store.location,
            planogram: new_store.planogram,
            created_at: Utc::now(),
        };
        self.stores.borrow_mut().push(store.clone());
        if let Err(e) = self.persist() {
            self.stores.borrow_mut().retain(|s| s.id != id);
            return Err(e);
        }
        info!("Registered store #{} '{}'", store.id, store.name);
        Ok(store)
    }

    fn find_by_id(&self, id: u64) -> std::result::Result<Option<Store>, Error> {
        Ok(self.stores.borrow().iter().find(|s| s.id == id).cloned())
    }

    fn find_all(&self) -> std::result::Result<Vec<Store>, Error> {
        let mut stores = self.stores.borrow().clone();
        stores.sort_by_key(|s| s.id);
        Ok(stores)
    }
}
