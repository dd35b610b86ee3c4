/// 定位结果数据结构
///
/// 包含定位输出以及回退原因等元数据

use crate::algorithms::GridPosition;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// 使用默认位置的原因
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// 指纹库为空或不可用
    EmptyDatabase,
    /// 最佳相似度低于阈值
    BelowThreshold,
    /// 扫描失败（权限、硬件）
    ScanUnavailable,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FallbackReason::EmptyDatabase => "指纹库不可用",
            FallbackReason::BelowThreshold => "相似度过低",
            FallbackReason::ScanUnavailable => "扫描失败",
        };
        write!(f, "{}", text)
    }
}

/// 定位结果
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionEstimate {
    /// 网格单元
    pub grid_cell_id: String,
    /// 平面图坐标
    pub position: GridPosition,
    /// 相似度 (0.0 ~ 1.0)；回退时为观测到的最佳分数
    pub similarity: f64,
    /// 回退原因；None 表示来自指纹匹配
    pub fallback: Option<FallbackReason>,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
}

impl PositionEstimate {
    /// 来自指纹匹配的结果
    pub fn matched(grid_cell_id: impl Into<String>, position: GridPosition, similarity: f64) -> Self {
        PositionEstimate {
            grid_cell_id: grid_cell_id.into(),
            position,
            similarity: similarity.clamp(0.0, 1.0),
            fallback: None,
            timestamp: Utc::now(),
        }
    }

    /// 默认位置
    pub fn fallback(
        grid_cell_id: impl Into<String>,
        position: GridPosition,
        best_similarity: f64,
        reason: FallbackReason,
    ) -> Self {
        PositionEstimate {
            grid_cell_id: grid_cell_id.into(),
            position,
            similarity: best_similarity.clamp(0.0, 1.0),
            fallback: Some(reason),
            timestamp: Utc::now(),
        }
    }

    /// 是否为默认位置
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

impl fmt::Display for PositionEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} [{:.1}%]",
            self.grid_cell_id,
            self.position,
            self.similarity * 100.0
        )?;
        if let Some(reason) = self.fallback {
            write!(f, " (默认位置: {})", reason)?;
        }
        Ok(())
    }
}

/// 单个指纹的匹配得分
#[derive(Clone, Debug, PartialEq)]
pub struct RankedFingerprint {
    /// 指纹在库中的下标
    pub index: usize,
    pub grid_cell_id: String,
    /// 最终得分（已乘覆盖率）
    pub score: f64,
    /// 共同接入点数量
    pub common_access_points: usize,
}

impl fmt::Display for RankedFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.3} ({} 个共同接入点)",
            self.grid_cell_id, self.score, self.common_access_points
        )
    }
}
