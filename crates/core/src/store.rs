//! Persistence of value tables keyed by unit identity and hyperparameters.
//!
//! `FileQTableStore` writes one JSON document per key:
//! - `format_version`, the full key, and the table `shape`.
//! - The row-major `values`, which round-trip bit-exactly.
//! - A SHA-256 of the values' little-endian bytes for corruption detection.
//!
//! Writes land in a temporary sibling first and are renamed into place.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::QTableError;
use crate::policy::{QTable, TABLE_SHAPE};

const FORMAT_VERSION: u16 = 1;

/// Identity of one persisted table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QTableKey {
    pub unit_name: String,
    pub version: String,
    pub run_name: String,
    pub alpha: f64,
    pub gamma: f64,
}

impl QTableKey {
    pub fn stem(&self) -> String {
        format!(
            "{}_qtable_v{}_{}_{}-{}",
            self.unit_name, self.version, self.run_name, self.alpha, self.gamma
        )
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.stem())
    }
}

/// Storage port for value tables. Loading a key that was never saved
/// yields a zeroed table.
pub trait QTableStore {
    fn load(&self, key: &QTableKey) -> Result<QTable, QTableError>;

    fn save(&mut self, key: &QTableKey, table: &QTable) -> Result<(), QTableError>;
}

#[derive(Serialize, Deserialize, Debug)]
struct TableFile {
    format_version: u16,
    key: QTableKey,
    shape: Vec<usize>,
    values: Vec<f64>,
    sha256_hex: String,
}

fn values_sha256(values: &[f64]) -> String {
    let mut hasher = Sha256::new();
    for value in values {
        hasher.update(value.to_le_bytes());
    }
    format!("{:064x}", hasher.finalize())
}

#[derive(Clone, Debug)]
pub struct FileQTableStore {
    dir: PathBuf,
}

impl FileQTableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &QTableKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

impl QTableStore for FileQTableStore {
    fn load(&self, key: &QTableKey) -> Result<QTable, QTableError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(QTable::zeros());
        }
        let content = fs::read_to_string(&path)?;
        let file: TableFile = serde_json::from_str(&content).map_err(QTableError::Decode)?;

        if file.format_version != FORMAT_VERSION {
            return Err(QTableError::UnsupportedVersion(file.format_version));
        }
        if file.key.stem() != key.stem() {
            return Err(QTableError::KeyMismatch { expected: key.stem(), found: file.key.stem() });
        }
        if values_sha256(&file.values) != file.sha256_hex {
            return Err(QTableError::ChecksumMismatch);
        }
        QTable::from_values(&file.shape, file.values)
    }

    fn save(&mut self, key: &QTableKey, table: &QTable) -> Result<(), QTableError> {
        fs::create_dir_all(&self.dir)?;
        let file = TableFile {
            format_version: FORMAT_VERSION,
            key: key.clone(),
            shape: TABLE_SHAPE.to_vec(),
            values: table.values().to_vec(),
            sha256_hex: values_sha256(table.values()),
        };
        let json = serde_json::to_string(&file).map_err(QTableError::Encode)?;

        let path = self.path_for(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &path)?;

        tracing::info!(table = %key.stem(), path = %path.display(), "saved value table");
        Ok(())
    }
}

/// In-process store; clones share the same tables.
#[derive(Clone, Debug, Default)]
pub struct MemoryQTableStore {
    tables: Rc<RefCell<BTreeMap<String, QTable>>>,
}

impl MemoryQTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &QTableKey) -> Option<QTable> {
        self.tables.borrow().get(&key.stem()).cloned()
    }

    pub fn len(&self) -> usize {
        self.tables.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.borrow().is_empty()
    }
}

impl QTableStore for MemoryQTableStore {
    fn load(&self, key: &QTableKey) -> Result<QTable, QTableError> {
        Ok(self.get(key).unwrap_or_default())
    }

    fn save(&mut self, key: &QTableKey, table: &QTable) -> Result<(), QTableError> {
        self.tables.borrow_mut().insert(key.stem(), table.clone());
        Ok(())
    }
}
