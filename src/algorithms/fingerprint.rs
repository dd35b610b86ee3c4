/// 指纹库数据结构与构建
///
/// 指纹库由多次扫描聚合而来：
/// - 按网格单元分组
/// - 单元内按 bssid 分组，RSSI 取算术平均
/// - 每次更新整体替换，不做增量修改

use crate::algorithms::WifiObservation;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 楼层平面图上的坐标
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridPosition {
    /// X 坐标（平面图像素）
    pub x: f64,
    /// Y 坐标（平面图像素）
    pub y: f64,
    /// 楼层标识
    pub floor: String,
}

impl GridPosition {
    pub fn new(x: f64, y: f64, floor: impl Into<String>) -> Self {
        GridPosition {
            x,
            y,
            floor: floor.into(),
        }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0}) 楼层 {}", self.x, self.y, self.floor)
    }
}

/// 在已知位置进行的一次采样扫描
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 采样时间（毫秒）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
    #[serde(alias = "gridSquare")]
    pub grid_cell_id: String,
    pub position: GridPosition,
    pub samples: Vec<WifiObservation>,
}

impl Scan {
    pub fn new(grid_cell_id: impl Into<String>, position: GridPosition, samples: Vec<WifiObservation>) -> Self {
        Scan {
            id: None,
            timestamp_ms: None,
            grid_cell_id: grid_cell_id.into(),
            position,
            samples,
        }
    }
}

/// 单个网格单元的指纹
///
/// 不变量：每个 bssid 至多一条观测
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintRecord {
    #[serde(alias = "gridSquare")]
    pub grid_cell_id: String,
    pub position: GridPosition,
    #[serde(alias = "samples")]
    pub observations: Vec<WifiObservation>,
}

impl FingerprintRecord {
    /// 接入点数量
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// 查找某个接入点的参考观测
    pub fn observation(&self, bssid: &str) -> Option<&WifiObservation> {
        self.observations.iter().find(|o| o.bssid == bssid)
    }
}

/// 指纹库，按最后更新时间（毫秒）标记版本
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintDatabase {
    pub fingerprints: Vec<FingerprintRecord>,
    pub last_updated: i64,
}

impl FingerprintDatabase {
    pub fn new(fingerprints: Vec<FingerprintRecord>, last_updated: i64) -> Self {
        FingerprintDatabase {
            fingerprints,
            last_updated,
        }
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    /// 按网格单元查找指纹
    pub fn record(&self, grid_cell_id: &str) -> Option<&FingerprintRecord> {
        self.fingerprints
            .iter()
            .find(|r| r.grid_cell_id == grid_cell_id)
    }
}

// ============================================================================
// 指纹库构建
// ============================================================================

/// 单元内的中间聚合状态
struct CellAccumulator {
    grid_cell_id: String,
    position: GridPosition,
    /// bssid -> 下标，保持首次出现顺序
    index: HashMap<String, usize>,
    groups: Vec<(WifiObservation, Vec<i32>)>,
}

impl CellAccumulator {
    fn new(grid_cell_id: String, position: GridPosition) -> Self {
        CellAccumulator {
            grid_cell_id,
            position,
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn push(&mut self, sample: &WifiObservation) {
        match self.index.get(&sample.bssid) {
            Some(&i) => self.groups[i].1.push(sample.rssi),
            None => {
                self.index.insert(sample.bssid.clone(), self.groups.len());
                self.groups.push((sample.clone(), vec![sample.rssi]));
            }
        }
    }

    fn finish(self) -> FingerprintRecord {
        let observations = self
            .groups
            .into_iter()
            .map(|(representative, rssis)| WifiObservation {
                rssi: mean_rssi(&rssis),
                ..representative
            })
            .collect();

        FingerprintRecord {
            grid_cell_id: self.grid_cell_id,
            position: self.position,
            observations,
        }
    }
}

/// RSSI 均值，四舍五入到整数（0.5 向正无穷取整，-50.5 -> -50）
pub fn mean_rssi(rssis: &[i32]) -> i32 {
    if rssis.is_empty() {
        return 0;
    }
    let sum: i64 = rssis.iter().map(|&r| r as i64).sum();
    let mean = sum as f64 / rssis.len() as f64;
    (mean + 0.5).floor() as i32
}

/// 由原始扫描聚合出指纹库，时间戳为当前时间
pub fn build_database(scans: &[Scan]) -> FingerprintDatabase {
    build_database_at(scans, Utc::now().timestamp_millis())
}

/// 由原始扫描聚合出指纹库，使用给定时间戳
///
/// 网格单元位置取该单元第一次出现的扫描；输出顺序与首次出现顺序一致
pub fn build_database_at(scans: &[Scan], last_updated: i64) -> FingerprintDatabase {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut cells: Vec<CellAccumulator> = Vec::new();

    for scan in scans {
        let slot = match index.get(scan.grid_cell_id.as_str()) {
            Some(&i) => i,
            None => {
                index.insert(scan.grid_cell_id.as_str(), cells.len());
                cells.push(CellAccumulator::new(
                    scan.grid_cell_id.clone(),
                    scan.position.clone(),
                ));
                cells.len() - 1
            }
        };

        for sample in &scan.samples {
            cells[slot].push(sample);
        }
    }

    let fingerprints = cells.into_iter().map(CellAccumulator::finish).collect();
    FingerprintDatabase::new(fingerprints, last_updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(cell: &str, samples: Vec<WifiObservation>) -> Scan {
        Scan::new(cell, GridPosition::new(10.0, 20.0, "2"), samples)
    }

    #[test]
    fn test_mean_rssi_rounding() {
        assert_eq!(mean_rssi(&[-40, -60]), -50);
        assert_eq!(mean_rssi(&[-50, -51]), -50);
        assert_eq!(mean_rssi(&[-51, -52]), -51);
        assert_eq!(mean_rssi(&[-70, -71, -71]), -71);
    }

    #[test]
    fn test_build_groups_by_cell_and_bssid() {
        let scans = vec![
            scan(
                "A1",
                vec![
                    WifiObservation::new("ap1", "eduroam", -40, 2412),
                    WifiObservation::new("ap2", "eduroam", -70, 5180),
                ],
            ),
            scan("A1", vec![WifiObservation::new("ap1", "eduroam", -60, 2412)]),
            scan("B7", vec![WifiObservation::new("ap1", "eduroam", -80, 2412)]),
        ];

        let db = build_database_at(&scans, 42);
        assert_eq!(db.len(), 2);
        assert_eq!(db.last_updated, 42);

        let a1 = db.record("A1").unwrap();
        assert_eq!(a1.len(), 2);
        let ap1 = a1.observation("ap1").unwrap();
        assert_eq!(ap1.rssi, -50);
        assert_eq!(ap1.ssid, "eduroam");
        assert_eq!(ap1.frequency, 2412);
        assert_eq!(a1.observation("ap2").unwrap().rssi, -70);

        assert_eq!(db.record("B7").unwrap().observation("ap1").unwrap().rssi, -80);
    }

    #[test]
    fn test_empty_input_gives_empty_database() {
        let db = build_database(&[]);
        assert!(db.is_empty());
    }
}
