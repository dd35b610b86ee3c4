/// WiFi 接入点观测数据结构

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 单个接入点的一次观测
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WifiObservation {
    /// 接入点硬件地址（跨扫描的关联键）
    pub bssid: String,
    /// 网络名称
    #[serde(default)]
    pub ssid: String,
    /// 信号强度 (dBm)，越接近 0 越强
    pub rssi: i32,
    /// 频率
    #[serde(default)]
    pub frequency: i32,
}

impl WifiObservation {
    /// 创建新的观测
    pub fn new(bssid: impl Into<String>, ssid: impl Into<String>, rssi: i32, frequency: i32) -> Self {
        WifiObservation {
            bssid: bssid.into(),
            ssid: ssid.into(),
            rssi,
            frequency,
        }
    }

    /// 仅指定 bssid 和 RSSI（测试和简单数据源）
    pub fn with_rssi(bssid: impl Into<String>, rssi: i32) -> Self {
        Self::new(bssid, "", rssi, 0)
    }
}

/// 一次扫描的观测集合，按 bssid 去重
///
/// 同一 bssid 重复出现时保留最后一次读数
#[derive(Clone, Debug, Default)]
pub struct ScanReadings {
    readings: HashMap<String, WifiObservation>,
}

impl ScanReadings {
    /// 创建空集合
    pub fn new() -> Self {
        Self::default()
    }

    /// 从观测列表创建
    pub fn from_observations(observations: &[WifiObservation]) -> Self {
        let mut readings = ScanReadings::new();
        for observation in observations {
            readings.add(observation.clone());
        }
        readings
    }

    /// 从观测列表创建，并丢弃不强于 `min_rssi_dbm` 的信号
    pub fn filtered(observations: &[WifiObservation], min_rssi_dbm: i32) -> Self {
        let mut readings = ScanReadings::new();
        for observation in observations.iter().filter(|o| o.rssi > min_rssi_dbm) {
            readings.add(observation.clone());
        }
        readings
    }

    /// 从 (bssid, rssi) 对创建
    pub fn from_pairs(pairs: &[(&str, i32)]) -> Self {
        let mut readings = ScanReadings::new();
        for &(bssid, rssi) in pairs {
            readings.add(WifiObservation::with_rssi(bssid, rssi));
        }
        readings
    }

    /// 添加观测
    pub fn add(&mut self, observation: WifiObservation) {
        self.readings.insert(observation.bssid.clone(), observation);
    }

    /// 获取 RSSI
    pub fn rssi(&self, bssid: &str) -> Option<i32> {
        self.readings.get(bssid).map(|o| o.rssi)
    }

    /// 是否包含接入点
    pub fn contains(&self, bssid: &str) -> bool {
        self.readings.contains_key(bssid)
    }

    /// 迭代所有观测
    pub fn iter(&self) -> impl Iterator<Item = &WifiObservation> {
        self.readings.values()
    }

    /// 接入点数量
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
