/// 信号相似度模型
///
/// 两个部分：
/// - 信号权重：w = base^((offset + RSSI_ref) / scale)，强信号权重指数级增大
/// - 单接入点相似度：max(0, 1 - |RSSI_cur - RSSI_ref| / tolerance)

use serde::Deserialize;
use std::fmt;

/// 信号相似度模型参数
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimilarityModel {
    /// 权重指数的底数
    pub weight_base: f64,
    /// 权重偏移 (dB)，RSSI 加上该值后作为指数分子
    pub weight_offset_db: f64,
    /// 权重刻度 (dB)
    pub weight_scale_db: f64,
    /// RSSI 差达到该值时相似度降为 0
    pub rssi_tolerance_db: f64,
}

impl SimilarityModel {
    /// 创建自定义模型
    pub fn new(weight_base: f64, weight_offset_db: f64, weight_scale_db: f64, rssi_tolerance_db: f64) -> Self {
        SimilarityModel {
            weight_base,
            weight_offset_db,
            weight_scale_db,
            rssi_tolerance_db,
        }
    }

    /// 参考 RSSI 对应的信号权重
    pub fn signal_weight(&self, reference_rssi: i32) -> f64 {
        let exponent = (self.weight_offset_db + reference_rssi as f64) / self.weight_scale_db;
        self.weight_base.powf(exponent)
    }

    /// 单个接入点的相似度，范围 0.0 ~ 1.0
    pub fn ap_similarity(&self, current_rssi: i32, reference_rssi: i32) -> f64 {
        let diff = (current_rssi - reference_rssi).abs() as f64;
        (1.0 - diff / self.rssi_tolerance_db).max(0.0)
    }

    /// 验证模型参数的合理性
    pub fn validate(&self) -> Result<(), String> {
        if self.weight_base <= 1.0 {
            return Err("权重底数应大于 1（强信号权重更大）".to_string());
        }
        if self.weight_scale_db <= 0.0 {
            return Err("权重刻度应为正数".to_string());
        }
        if self.rssi_tolerance_db <= 0.0 {
            return Err("RSSI 容差应为正数".to_string());
        }
        Ok(())
    }

    /// 获取模型描述
    pub fn description(&self) -> String {
        format!(
            "相似度模型 - 权重 {:.1}^(({:.0} + RSSI) / {:.0}), 容差 {:.0} dB",
            self.weight_base, self.weight_offset_db, self.weight_scale_db, self.rssi_tolerance_db
        )
    }
}

impl Default for SimilarityModel {
    fn default() -> Self {
        SimilarityModel::new(2.0, 100.0, 20.0, 40.0)
    }
}

impl fmt::Display for SimilarityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}
