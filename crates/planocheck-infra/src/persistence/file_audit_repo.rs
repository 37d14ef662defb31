//! File-based audit repository
//!
//! One JSON file per audit (`audits/audit_<id>.json`) holding the audit and all
//! of its detections, so an audit is never visible without its detections.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use planocheck_domain::model::Audit;
use planocheck_domain::repository::AuditRepository;
use planocheck_types::{Error, Result};

use super::atomic::write_json_new;

pub struct FileAuditRepository {
    audits_dir: PathBuf,
    next_id: Cell<u64>,
}

impl FileAuditRepository {
    /// Create or load the audit repository in `data_dir`
    pub fn open(data_dir: PathBuf) -> Result<Self> {
        let audits_dir = data_dir.join("audits");
        fs::create_dir_all(&audits_dir)?;

        let max_id = Self::scan_ids(&audits_dir)?.into_iter().max().unwrap_or(0);
        Ok(Self {
            audits_dir,
            next_id: Cell::new(max_id + 1),
        })
    }

    fn audit_path(&self, id: u64) -> PathBuf {
        self.audits_dir.join(format!("audit_{}.json", id))
    }

    fn parse_id(path: &Path) -> Option<u64> {
        let stem = path.file_name()?.to_str()?.strip_suffix(".json")?;
        stem.strip_prefix("audit_")?.parse().ok()
    }

    fn scan_ids(dir: &Path) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(id) = Self::parse_id(&path) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    fn load(&self, path: &Path) -> Result<Audit> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn load_all(&self) -> Result<Vec<Audit>> {
        let mut audits = Vec::new();
        for id in Self::scan_ids(&self.audits_dir)? {
            let path = self.audit_path(id);
            match self.load(&path) {
                Ok(audit) => audits.push(audit),
                Err(e) => warn!("Skipping unreadable audit {}: {}", path.display(), e),
            }
        }
        audits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(audits)
    }
}

impl AuditRepository for FileAuditRepository {
    fn next_id(&self) -> std::result::Result<u64, Error> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(id)
    }

    fn save(&self, audit: &Audit) -> std::result::Result<(), Error> {
        let path = self.audit_path(audit.id);
        match write_json_new(&path, audit) {
            Ok(()) => {}
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // Another writer holds this id; skip past everything on disk
                let max_id = Self::scan_ids(&self.audits_dir)?.into_iter().max().unwrap_or(0);
                self.next_id.set(self.next_id.get().max(max_id + 1));
                return Err(Error::AuditExists(audit.id));
            }
            Err(e) => return Err(e),
        }
        if audit.id >= self.next_id.get() {
            self.next_id.set(audit.id + 1);
        }
        debug!(
            "Saved audit #{} ({} detections) to {}",
            audit.id,
            audit.report.detections.len(),
            path.display()
        );
        Ok(())
    }

    fn find_by_id(&self, id: u64) -> std::result::Result<Option<Audit>, Error> {
        let path = self.audit_path(id);
        if !path.exists() {
            return Ok(None);
        }
        self.load(&path).map(Some)
    }

    fn find_by_store(&self, store_id: u64) -> std::result::Result<Vec<Audit>, Error> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|a| a.store_id == store_id)
            .collect())
    }

    fn find_all(&self) -> std::result::Result<Vec<Audit>, Error> {
        self.load_all()
    }
}
