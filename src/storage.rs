/// 指纹库持久化
///
/// 存储格式为 JSON：`{ "fingerprints": [...], "lastUpdated": <毫秒> }`。
/// 写入先落到同目录下的唯一临时文件再重命名，读者只会看到完整的旧库或新库。

use crate::algorithms::FingerprintDatabase;
use crate::error::NavError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// 指纹库存储
pub trait DatabaseStore: Send + Sync {
    /// 读取指纹库；尚未保存过时返回 None
    fn load(&self) -> Result<Option<FingerprintDatabase>, NavError>;

    /// 整体替换指纹库
    fn save(&self, database: &FingerprintDatabase) -> Result<(), NavError>;
}

/// 本地 JSON 文件存储
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl DatabaseStore for JsonFileStore {
    fn load(&self) -> Result<Option<FingerprintDatabase>, NavError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored fingerprint database");
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let database: FingerprintDatabase = serde_json::from_str(&contents)?;
        Ok(Some(database))
    }

    fn save(&self, database: &FingerprintDatabase) -> Result<(), NavError> {
        let parent = self.parent_dir();
        std::fs::create_dir_all(parent)?;

        let json = serde_json::to_vec(database)?;
        let mut temp = tempfile::NamedTempFile::new_in(parent)?;
        temp.write_all(&json)?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| e.error)?;
        info!(
            path = %self.path.display(),
            fingerprints = database.len(),
            "fingerprint database stored"
        );
        Ok(())
    }
}

/// 内存存储（测试和无持久化场景）
#[derive(Debug, Default)]
pub struct MemoryStore {
    database: Mutex<Option<FingerprintDatabase>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_database(database: FingerprintDatabase) -> Self {
        MemoryStore {
            database: Mutex::new(Some(database)),
        }
    }
}

impl DatabaseStore for MemoryStore {
    fn load(&self) -> Result<Option<FingerprintDatabase>, NavError> {
        let guard = self.database.lock().map_err(|_| NavError::StoreLock)?;
        Ok(guard.clone())
    }

    fn save(&self, database: &FingerprintDatabase) -> Result<(), NavError> {
        let mut guard = self.database.lock().map_err(|_| NavError::StoreLock)?;
        *guard = Some(database.clone());
        Ok(())
    }
}
