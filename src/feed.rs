/// 历史扫描数据源
///
/// 聚合服务返回的格式：
/// `{ "scans": [ { id, timestamp, location: { position_px, floor, building, gridSquare }, samples } ] }`

use crate::algorithms::{GridPosition, Scan, WifiObservation};
use crate::error::NavError;
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::LazyLock;

/// 楼层标签前缀，如 "Etage 2"
static FLOOR_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Etage\s*").expect("floor pattern is valid"));

/// 历史扫描来源（远程聚合服务、导出文件等）
pub trait ScanFeed: Send + Sync {
    fn fetch_scans(&self) -> Result<Vec<Scan>, NavError>;
}

#[derive(Debug, Deserialize)]
struct FeedPayload {
    scans: Vec<FeedScan>,
}

#[derive(Debug, Deserialize)]
struct FeedScan {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: Option<i64>,
    location: FeedLocation,
    #[serde(default)]
    samples: Vec<WifiObservation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedLocation {
    #[serde(rename = "position_px")]
    position_px: FeedPoint,
    floor: String,
    grid_square: String,
}

#[derive(Debug, Deserialize)]
struct FeedPoint {
    x: f64,
    y: f64,
}

/// 去掉楼层标签前缀
pub fn normalize_floor(label: &str) -> String {
    FLOOR_LABEL.replace(label, "").trim().to_string()
}

/// 解析聚合服务返回的 JSON
pub fn parse_feed(json: &str) -> Result<Vec<Scan>, NavError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.get("scans").is_some_and(serde_json::Value::is_array) {
        return Err(NavError::InvalidFeed("缺少 scans 数组".to_string()));
    }
    let payload: FeedPayload = serde_json::from_value(value)?;

    Ok(payload
        .scans
        .into_iter()
        .map(|scan| Scan {
            id: scan.id,
            timestamp_ms: scan.timestamp,
            grid_cell_id: scan.location.grid_square,
            position: GridPosition::new(
                scan.location.position_px.x,
                scan.location.position_px.y,
                normalize_floor(&scan.location.floor),
            ),
            samples: scan.samples,
        })
        .collect())
}

/// 从导出的 JSON 文件读取历史扫描
#[derive(Clone, Debug)]
pub struct JsonFileFeed {
    path: PathBuf,
}

impl JsonFileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileFeed { path: path.into() }
    }
}

impl ScanFeed for JsonFileFeed {
    fn fetch_scans(&self) -> Result<Vec<Scan>, NavError> {
        let contents = std::fs::read_to_string(&self.path)?;
        parse_feed(&contents)
    }
}

/// 固定扫描列表
#[derive(Clone, Debug, Default)]
pub struct StaticFeed {
    scans: Vec<Scan>,
}

impl StaticFeed {
    pub fn new(scans: Vec<Scan>) -> Self {
        StaticFeed { scans }
    }
}

impl ScanFeed for StaticFeed {
    fn fetch_scans(&self) -> Result<Vec<Scan>, NavError> {
        Ok(self.scans.clone())
    }
}
