/// 室内定位服务
///
/// 功能：
/// - 持有当前指纹库快照（整体替换）
/// - 从扫描源读取实时 WiFi 观测并定位
/// - 任何失败都退回默认位置，不向调用方报错
/// - 周期性定位任务（tokio）

use crate::algorithms::{
    FallbackReason, FingerprintDatabase, FingerprintLocator, LocatorConfig, PositionEstimate,
    WifiObservation, build_database,
};
use crate::error::NavError;
use crate::feed::ScanFeed;
use crate::storage::DatabaseStore;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 实时 WiFi 扫描来源（系统接口、硬件）
pub trait ScanSource: Send + Sync {
    fn scan(&self) -> Result<Vec<WifiObservation>, NavError>;
}

/// 固定观测列表
#[derive(Clone, Debug, Default)]
pub struct StaticScanSource {
    observations: Vec<WifiObservation>,
}

impl StaticScanSource {
    pub fn new(observations: Vec<WifiObservation>) -> Self {
        StaticScanSource { observations }
    }
}

impl ScanSource for StaticScanSource {
    fn scan(&self) -> Result<Vec<WifiObservation>, NavError> {
        Ok(self.observations.clone())
    }
}

/// 每次扫描重新读取的 JSON 观测文件，由外部扫描程序持续覆盖写入
#[derive(Clone, Debug)]
pub struct JsonFileScanSource {
    path: PathBuf,
}

impl JsonFileScanSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileScanSource { path: path.into() }
    }
}

impl ScanSource for JsonFileScanSource {
    fn scan(&self) -> Result<Vec<WifiObservation>, NavError> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| NavError::ScanFailed(format!("{}: {}", self.path.display(), e)))?;
        let observations = serde_json::from_str(&contents)?;
        Ok(observations)
    }
}

/// 定位服务
pub struct Positioner<S: DatabaseStore> {
    store: S,
    locator: FingerprintLocator,
    snapshot: RwLock<Option<Arc<FingerprintDatabase>>>,
    /// 保存与替换快照必须成对完成
    update_lock: Mutex<()>,
}

impl<S: DatabaseStore> Positioner<S> {
    pub fn new(store: S, config: LocatorConfig) -> Self {
        Positioner {
            store,
            locator: FingerprintLocator::new(config),
            snapshot: RwLock::new(None),
            update_lock: Mutex::new(()),
        }
    }

    pub fn locator(&self) -> &FingerprintLocator {
        &self.locator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 当前指纹库；尚未缓存时从存储读取
    pub fn database(&self) -> Result<Option<Arc<FingerprintDatabase>>, NavError> {
        {
            let guard = self.snapshot.read().map_err(|_| NavError::StoreLock)?;
            if let Some(database) = guard.as_ref() {
                return Ok(Some(Arc::clone(database)));
            }
        }

        let Some(loaded) = self.store.load()? else {
            return Ok(None);
        };
        let loaded = Arc::new(loaded);
        let mut guard = self.snapshot.write().map_err(|_| NavError::StoreLock)?;
        // 并发读取时保留先写入的快照
        let current = guard.get_or_insert_with(|| Arc::clone(&loaded));
        Ok(Some(Arc::clone(current)))
    }

    /// 丢弃缓存，下一次定位重新读取存储
    pub fn invalidate(&self) -> Result<(), NavError> {
        let mut guard = self.snapshot.write().map_err(|_| NavError::StoreLock)?;
        *guard = None;
        Ok(())
    }

    /// 拉取历史扫描，重建并保存指纹库，然后替换快照
    pub fn update(&self, feed: &dyn ScanFeed) -> Result<Arc<FingerprintDatabase>, NavError> {
        let scans = feed.fetch_scans()?;
        info!(scans = scans.len(), "building fingerprint database");
        let database = build_database(&scans);
        self.replace(database)
    }

    /// 保存并整体替换指纹库
    pub fn replace(&self, database: FingerprintDatabase) -> Result<Arc<FingerprintDatabase>, NavError> {
        let _update = self.update_lock.lock().map_err(|_| NavError::StoreLock)?;
        self.store.save(&database)?;
        let database = Arc::new(database);
        let mut guard = self.snapshot.write().map_err(|_| NavError::StoreLock)?;
        *guard = Some(Arc::clone(&database));
        info!(
            fingerprints = database.len(),
            last_updated = database.last_updated,
            "fingerprint database replaced"
        );
        Ok(database)
    }

    /// 用给定扫描定位
    pub fn locate(&self, scan: &[WifiObservation]) -> PositionEstimate {
        match self.database() {
            Ok(Some(database)) => self.locator.locate(scan, &database),
            Ok(None) => {
                warn!("no fingerprint database available");
                self.locator.default_estimate(0.0, FallbackReason::EmptyDatabase)
            }
            Err(e) => {
                warn!(error = %e, "failed to read fingerprint database");
                self.locator.default_estimate(0.0, FallbackReason::EmptyDatabase)
            }
        }
    }

    /// 从扫描源读取后定位；扫描失败时返回默认位置
    pub fn locate_with(&self, source: &dyn ScanSource) -> PositionEstimate {
        match source.scan() {
            Ok(scan) => {
                debug!(networks = scan.len(), "wifi scan complete");
                self.locate(&scan)
            }
            Err(e) => {
                warn!(error = %e, "wifi scan failed, using default position");
                self.locator.default_estimate(0.0, FallbackReason::ScanUnavailable)
            }
        }
    }
}

/// 启动周期性定位任务
///
/// 每个周期扫描并定位一次，结果通过通道发送；接收端关闭后任务退出
pub fn spawn_position_polling<S>(
    positioner: Arc<Positioner<S>>,
    source: Arc<dyn ScanSource>,
    interval: Duration,
    capacity: usize,
) -> (JoinHandle<()>, mpsc::Receiver<PositionEstimate>)
where
    S: DatabaseStore + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let positioner = Arc::clone(&positioner);
            let source = Arc::clone(&source);
            let estimate = match tokio::task::spawn_blocking(move || positioner.locate_with(source.as_ref())).await {
                Ok(estimate) => estimate,
                Err(e) => {
                    warn!(error = %e, "positioning task failed");
                    continue;
                }
            };
            if tx.send(estimate).await.is_err() {
                debug!("position receiver dropped, stopping polling");
                break;
            }
        }
    });

    (handle, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{GridPosition, Scan};
    use crate::feed::StaticFeed;
    use crate::storage::MemoryStore;

    struct FailingSource;

    impl ScanSource for FailingSource {
        fn scan(&self) -> Result<Vec<WifiObservation>, NavError> {
            Err(NavError::ScanFailed("permission denied".to_string()))
        }
    }

    fn feed() -> StaticFeed {
        StaticFeed::new(vec![
            Scan::new(
                "A1",
                GridPosition::new(100.0, 100.0, "2"),
                vec![WifiObservation::with_rssi("ap1", -45), WifiObservation::with_rssi("ap2", -60)],
            ),
            Scan::new(
                "A1",
                GridPosition::new(100.0, 100.0, "2"),
                vec![WifiObservation::with_rssi("ap1", -55), WifiObservation::with_rssi("ap2", -60)],
            ),
        ])
    }

    #[test]
    fn test_missing_database_falls_back() {
        let positioner = Positioner::new(MemoryStore::new(), LocatorConfig::default());
        let estimate = positioner.locate(&[WifiObservation::with_rssi("ap1", -50)]);
        assert_eq!(estimate.fallback, Some(FallbackReason::EmptyDatabase));
        assert_eq!(estimate.grid_cell_id, "04.0.H3-P7");
    }

    #[test]
    fn test_scan_failure_falls_back() {
        let positioner = Positioner::new(MemoryStore::new(), LocatorConfig::default());
        positioner.update(&feed()).unwrap();
        let estimate = positioner.locate_with(&FailingSource);
        assert_eq!(estimate.fallback, Some(FallbackReason::ScanUnavailable));
    }

    #[test]
    fn test_update_persists_and_swaps_snapshot() {
        let positioner = Positioner::new(MemoryStore::new(), LocatorConfig::default());
        let database = positioner.update(&feed()).unwrap();
        assert_eq!(database.len(), 1);
        assert_eq!(database.fingerprints[0].observation("ap1").unwrap().rssi, -50);
        assert_eq!(positioner.store().load().unwrap().as_ref(), Some(&*database));

        let estimate = positioner.locate_with(&StaticScanSource::new(vec![
            WifiObservation::with_rssi("ap1", -50),
            WifiObservation::with_rssi("ap2", -60),
        ]));
        assert_eq!(estimate.grid_cell_id, "A1");
        assert_eq!(estimate.similarity, 1.0);
        assert!(!estimate.is_fallback());
    }

    #[test]
    fn test_json_file_source_rereads_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("scan.json");
        let source = JsonFileScanSource::new(&path);
        assert!(matches!(source.scan(), Err(NavError::ScanFailed(_))));

        std::fs::write(&path, r#"[{"bssid": "ap1", "ssid": "eduroam", "rssi": -50, "frequency": 2412}]"#)?;
        assert_eq!(source.scan()?[0].rssi, -50);

        std::fs::write(&path, r#"[{"bssid": "ap1", "rssi": -61}]"#)?;
        assert_eq!(source.scan()?[0].rssi, -61);

        std::fs::write(&path, "not json")?;
        let positioner = Positioner::new(MemoryStore::new(), LocatorConfig::default());
        positioner.update(&feed())?;
        let estimate = positioner.locate_with(&source);
        assert_eq!(estimate.fallback, Some(FallbackReason::ScanUnavailable));
        Ok(())
    }

    #[test]
    fn test_snapshot_is_loaded_from_store_once() {
        let store = MemoryStore::with_database(crate::algorithms::build_database_at(&feed().fetch_scans().unwrap(), 7));
        let positioner = Positioner::new(store, LocatorConfig::default());
        let first = positioner.database().unwrap().unwrap();
        let second = positioner.database().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.last_updated, 7);

        positioner.invalidate().unwrap();
        let third = positioner.database().unwrap().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
