/// WiFi 指纹定位算法
///
/// 流程：
/// - 过滤过弱信号
/// - 对每个指纹计算加权相似度并乘以覆盖率
/// - 最佳得分低于阈值时返回默认位置

use crate::algorithms::{
    FallbackReason, FingerprintDatabase, FingerprintRecord, GridPosition, PositionEstimate,
    RankedFingerprint, ScanReadings, SimilarityModel, WifiObservation,
};
use serde::Deserialize;
use tracing::debug;

// ============================================================================
// 配置
// ============================================================================

/// 预先配置的回退位置
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DefaultPosition {
    pub grid_cell_id: String,
    pub x: f64,
    pub y: f64,
    pub floor: String,
}

impl DefaultPosition {
    pub fn position(&self) -> GridPosition {
        GridPosition::new(self.x, self.y, self.floor.clone())
    }
}

impl Default for DefaultPosition {
    fn default() -> Self {
        DefaultPosition {
            grid_cell_id: "04.0.H3-P7".to_string(),
            x: 577.0,
            y: 498.0,
            floor: "0".to_string(),
        }
    }
}

/// 定位参数
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// 实时扫描中只保留强于该值的信号 (dBm)
    pub min_rssi_dbm: i32,
    /// 接受匹配所需的最低相似度
    pub min_similarity: f64,
    /// 信号相似度模型
    pub model: SimilarityModel,
    /// 回退位置
    pub default_position: DefaultPosition,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        LocatorConfig {
            min_rssi_dbm: -85,
            min_similarity: 0.3,
            model: SimilarityModel::default(),
            default_position: DefaultPosition::default(),
        }
    }
}

// ============================================================================
// 相似度计算
// ============================================================================

/// 计算当前扫描与一个指纹的相似度
///
/// # 返回
/// - (最终得分, 共同接入点数量)；没有共同接入点时得分为 0
pub fn network_similarity(
    current: &ScanReadings,
    record: &FingerprintRecord,
    model: &SimilarityModel,
) -> (f64, usize) {
    let mut match_score = 0.0;
    let mut total_weight = 0.0;
    let mut common = 0usize;

    for reference in &record.observations {
        let Some(current_rssi) = current.rssi(&reference.bssid) else {
            continue;
        };
        let weight = model.signal_weight(reference.rssi);
        match_score += model.ap_similarity(current_rssi, reference.rssi) * weight;
        total_weight += weight;
        common += 1;
    }

    if common == 0 || total_weight <= 0.0 {
        return (0.0, 0);
    }

    // 覆盖率：共同接入点占较大一方的比例
    let coverage = common as f64 / current.len().max(record.len()) as f64;
    ((match_score / total_weight) * coverage, common)
}

// ============================================================================
// 定位器
// ============================================================================

/// 指纹定位器
#[derive(Clone, Debug, Default)]
pub struct FingerprintLocator {
    config: LocatorConfig,
}

impl FingerprintLocator {
    pub fn new(config: LocatorConfig) -> Self {
        FingerprintLocator { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// 得分是否足以信任
    pub fn accepts(&self, score: f64) -> bool {
        score >= self.config.min_similarity
    }

    /// 过滤实时扫描
    pub fn prepare_scan(&self, scan: &[WifiObservation]) -> ScanReadings {
        ScanReadings::filtered(scan, self.config.min_rssi_dbm)
    }

    /// 对所有指纹打分并按得分从高到低排序，同分保持库中顺序
    pub fn rank(&self, scan: &[WifiObservation], database: &FingerprintDatabase) -> Vec<RankedFingerprint> {
        let readings = self.prepare_scan(scan);
        self.rank_readings(&readings, database)
    }

    fn rank_readings(&self, readings: &ScanReadings, database: &FingerprintDatabase) -> Vec<RankedFingerprint> {
        let mut ranked: Vec<RankedFingerprint> = database
            .fingerprints
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let (score, common) = network_similarity(readings, record, &self.config.model);
                RankedFingerprint {
                    index,
                    grid_cell_id: record.grid_cell_id.clone(),
                    score,
                    common_access_points: common,
                }
            })
            .collect();

        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// 根据当前扫描估计位置，从不失败
    pub fn locate(&self, scan: &[WifiObservation], database: &FingerprintDatabase) -> PositionEstimate {
        if database.is_empty() {
            debug!("fingerprint database empty, using default position");
            return self.default_estimate(0.0, FallbackReason::EmptyDatabase);
        }

        let readings = self.prepare_scan(scan);
        let ranked = self.rank_readings(&readings, database);

        for candidate in ranked.iter().take(3) {
            debug!(
                grid_cell = %candidate.grid_cell_id,
                score = candidate.score,
                common = candidate.common_access_points,
                "top fingerprint match"
            );
        }

        let Some(best) = ranked.first() else {
            return self.default_estimate(0.0, FallbackReason::EmptyDatabase);
        };

        if !self.accepts(best.score) {
            debug!(
                best = best.score,
                threshold = self.config.min_similarity,
                "no reliable fingerprint match, using default position"
            );
            return self.default_estimate(best.score, FallbackReason::BelowThreshold);
        }

        let record = &database.fingerprints[best.index];
        PositionEstimate::matched(record.grid_cell_id.clone(), record.position.clone(), best.score)
    }

    /// 构造默认位置结果
    pub fn default_estimate(&self, best_similarity: f64, reason: FallbackReason) -> PositionEstimate {
        let default = &self.config.default_position;
        PositionEstimate::fallback(
            default.grid_cell_id.clone(),
            default.position(),
            best_similarity,
            reason,
        )
    }
}
