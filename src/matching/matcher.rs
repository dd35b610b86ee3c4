/// 目的地匹配
///
/// 对目录中每个地点取名称和所有别名中的最高分，全局最高且超过阈值才接受

use crate::matching::{ComplexNameRegistry, Location, MatchScorer, MatcherConfig, normalize};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// 匹配结果
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    pub location: Location,
    /// 置信度百分比 (0 ~ 100)
    pub confidence_percent: u8,
    /// 原始得分
    pub score: f64,
    /// 得分最高的名称或别名
    pub matched_on: String,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}%]", self.location, self.confidence_percent)
    }
}

/// 单个地点的候选得分
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<'a> {
    pub location: &'a Location,
    pub score: f64,
    pub matched_on: &'a str,
}

/// 目的地匹配器
#[derive(Clone, Debug, Default)]
pub struct DestinationMatcher {
    scorer: MatchScorer,
}

impl DestinationMatcher {
    pub fn new(config: MatcherConfig, registry: ComplexNameRegistry) -> Self {
        DestinationMatcher {
            scorer: MatchScorer::new(config, registry),
        }
    }

    pub fn scorer(&self) -> &MatchScorer {
        &self.scorer
    }

    /// 输入与目标名称的相似度
    pub fn score_match(&self, spoken: &str, target: &str) -> f64 {
        self.scorer.score_match(spoken, target)
    }

    /// 一个地点的候选得分：名称与所有别名中的最高分，同分取先出现者
    pub fn candidate<'a>(&self, spoken: &str, location: &'a Location) -> Candidate<'a> {
        let mut best = Candidate {
            location,
            score: 0.0,
            matched_on: location.name.as_str(),
        };
        for name in location.names() {
            let score = self.scorer.score_match(spoken, name);
            if score > best.score {
                best.score = score;
                best.matched_on = name;
            }
        }
        best
    }

    /// 按得分从高到低列出前 `limit` 个候选（"您是不是要找"列表）
    pub fn rank_candidates<'a>(&self, spoken: &str, directory: &'a [Location], limit: usize) -> Vec<Candidate<'a>> {
        let spoken = normalize(spoken);
        let mut candidates: Vec<Candidate<'a>> = directory
            .iter()
            .map(|location| self.candidate(&spoken, location))
            .filter(|c| c.score > 0.0)
            .collect();
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(limit);
        candidates
    }

    /// 找到最匹配的地点；得分不超过阈值时返回 None
    pub fn find_best_match(&self, spoken_text: &str, directory: &[Location]) -> Option<MatchResult> {
        let spoken = normalize(spoken_text);
        let mut best: Option<Candidate<'_>> = None;

        for location in directory {
            let candidate = self.candidate(&spoken, location);
            debug!(
                input = %spoken,
                location = %location.name,
                score = candidate.score,
                "destination candidate"
            );
            if candidate.score > best.as_ref().map_or(0.0, |b| b.score) {
                best = Some(candidate);
            }
        }

        let threshold = self.scorer.config().min_confidence;
        match best {
            Some(candidate) if candidate.score > threshold => Some(MatchResult {
                location: candidate.location.clone(),
                confidence_percent: (candidate.score * 100.0).round().clamp(0.0, 100.0) as u8,
                score: candidate.score,
                matched_on: candidate.matched_on.to_string(),
            }),
            other => {
                debug!(
                    input = %spoken,
                    best = other.map_or(0.0, |c| c.score),
                    threshold,
                    "destination not recognized"
                );
                None
            }
        }
    }
}
