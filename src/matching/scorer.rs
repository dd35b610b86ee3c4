/// 语音/文本与地点名称的匹配打分
///
/// 三级匹配：
/// - 规范化后完全相同
/// - 复合名称（已登记的常见误识别形式）
/// - 逐词编辑距离

use crate::matching::string_distance;
use serde::Deserialize;
use std::collections::BTreeMap;

/// 匹配参数
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    /// 接受匹配所需的最低得分（严格大于）
    pub min_confidence: f64,
    /// 单词视为匹配的最低得分（严格大于）
    pub word_match_threshold: f64,
    /// 少于该字符数的单词不参与比较
    pub min_word_length: usize,
    /// 目标单词超过该字符数时提升得分
    pub long_word_length: usize,
    /// 长单词得分提升倍数，结果上限 1.0
    pub long_word_boost: f64,
    /// 复合名称变体允许的最大编辑距离
    pub complex_edit_distance: usize,
    /// 输入包含复合名称变体时的得分
    pub complex_exact_score: f64,
    /// 输入接近复合名称变体时的得分
    pub complex_fuzzy_score: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            min_confidence: 0.65,
            word_match_threshold: 0.6,
            min_word_length: 3,
            long_word_length: 8,
            long_word_boost: 1.2,
            complex_edit_distance: 3,
            complex_exact_score: 0.95,
            complex_fuzzy_score: 0.9,
        }
    }
}

/// 复合名称登记表：名称 -> 常见口语/误识别变体
///
/// 名称和变体都以小写、去首尾空白的形式保存
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComplexNameRegistry {
    entries: BTreeMap<String, Vec<String>>,
}

impl ComplexNameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: BTreeMap<String, Vec<String>>) -> Self {
        let mut registry = ComplexNameRegistry::new();
        for (name, variations) in map {
            registry.register(&name, variations);
        }
        registry
    }

    /// 登记一个复合名称；重复登记时追加变体
    pub fn register<I, S>(&mut self, name: &str, variations: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.entries.entry(normalize(name)).or_default();
        for variation in variations {
            let variation = normalize(variation.as_ref());
            if !variation.is_empty() && !entry.contains(&variation) {
                entry.push(variation);
            }
        }
    }

    /// 目标名称中包含的复合名称及其变体
    pub fn matching<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a [String]> + 'a {
        self.entries
            .iter()
            .filter(move |(name, _)| target.contains(name.as_str()))
            .map(|(_, variations)| variations.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 小写并去除首尾空白
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// 匹配打分器
#[derive(Clone, Debug, Default)]
pub struct MatchScorer {
    config: MatcherConfig,
    registry: ComplexNameRegistry,
}

impl MatchScorer {
    pub fn new(config: MatcherConfig, registry: ComplexNameRegistry) -> Self {
        MatchScorer { config, registry }
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn registry(&self) -> &ComplexNameRegistry {
        &self.registry
    }

    /// 输入与目标名称的相似度，范围 0.0 ~ 1.0
    ///
    /// 不对称：长单词提升和复合名称都以目标一方为准
    pub fn score_match(&self, spoken: &str, target: &str) -> f64 {
        let spoken = normalize(spoken);
        let target = normalize(target);

        if spoken == target {
            return 1.0;
        }

        if let Some(score) = self.complex_name_score(&spoken, &target) {
            return score;
        }

        self.word_score(&spoken, &target)
    }

    fn complex_name_score(&self, spoken: &str, target: &str) -> Option<f64> {
        for variations in self.registry.matching(target) {
            for variation in variations {
                if spoken.contains(variation.as_str()) {
                    return Some(self.config.complex_exact_score);
                }
                if string_distance(variation, spoken) <= self.config.complex_edit_distance {
                    return Some(self.config.complex_fuzzy_score);
                }
            }
        }
        None
    }

    fn word_score(&self, spoken: &str, target: &str) -> f64 {
        let spoken_words: Vec<&str> = spoken.split_whitespace().collect();
        let target_words: Vec<&str> = target.split_whitespace().collect();

        let mut total = 0.0;
        let mut matched = 0usize;

        for spoken_word in &spoken_words {
            let best = target_words
                .iter()
                .filter_map(|target_word| self.pair_score(spoken_word, target_word))
                .fold(0.0, f64::max);

            if best > self.config.word_match_threshold {
                total += best;
                matched += 1;
            }
        }

        if matched == 0 {
            return 0.0;
        }

        let coverage = matched as f64 / spoken_words.len().max(target_words.len()) as f64;
        (total / matched as f64) * coverage
    }

    /// 单词对得分；过短的单词返回 None
    fn pair_score(&self, spoken_word: &str, target_word: &str) -> Option<f64> {
        let spoken_len = spoken_word.chars().count();
        let target_len = target_word.chars().count();
        if spoken_len < self.config.min_word_length || target_len < self.config.min_word_length {
            return None;
        }

        let distance = string_distance(spoken_word, target_word);
        let mut score = 1.0 - distance as f64 / spoken_len.max(target_len) as f64;

        if target_len > self.config.long_word_length {
            score = (score * self.config.long_word_boost).min(1.0);
        }
        Some(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer_with(names: &[(&str, &[&str])]) -> MatchScorer {
        let mut registry = ComplexNameRegistry::new();
        for (name, variations) in names {
            registry.register(name, variations.iter());
        }
        MatchScorer::new(MatcherConfig::default(), registry)
    }

    #[test]
    fn test_exact_after_normalization() {
        let scorer = MatchScorer::default();
        assert_eq!(scorer.score_match("  PC Pool ", "pc pool"), 1.0);
    }

    #[test]
    fn test_short_words_are_ignored() {
        let scorer = MatchScorer::default();
        // "pc" 和 "fs" 都不足 3 个字符
        assert_eq!(scorer.score_match("pc", "pc pool"), 0.0);
        assert_eq!(scorer.score_match("fs", "fachschaft"), 0.0);
    }

    #[test]
    fn test_partial_phrase_is_penalized() {
        let scorer = MatchScorer::default();
        // 一个词完全匹配，目标有两个词
        let score = scorer.score_match("huber", "professor huber");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_long_target_word_boost() {
        let scorer = MatchScorer::default();
        // "computers" 对 "computer"：距离 1，最长 9 -> 8/9，目标 8 个字符不提升
        let plain = scorer.score_match("computers", "computer");
        assert!((plain - 8.0 / 9.0).abs() < 1e-9);
        // 反过来目标 9 个字符，提升后封顶 1.0
        assert_eq!(scorer.score_match("computer", "computers"), 1.0);
    }

    #[test]
    fn test_complex_name_variation_contained() {
        let scorer = scorer_with(&[("wojciechowski", &["wotschikowski", "wotschkowski"])]);
        let score = scorer.score_match("zu professor wotschikowski bitte", "Professor Wojciechowski");
        assert_eq!(score, 0.95);
    }

    #[test]
    fn test_complex_name_variation_close() {
        let scorer = scorer_with(&[("wojciechowski", &["wotschikowski"])]);
        // 距离 2
        assert_eq!(scorer.score_match("wotschkowsky", "Professor Wojciechowski"), 0.9);
    }

    #[test]
    fn test_complex_name_only_applies_to_registered_targets() {
        let scorer = scorer_with(&[("wojciechowski", &["wotschikowski"])]);
        assert_eq!(scorer.score_match("wotschikowski", "Professor Rakow"), 0.0);
    }

    #[test]
    fn test_registry_normalizes_entries() {
        let mut registry = ComplexNameRegistry::new();
        registry.register(" Wojciechowski ", [" WOJO ", "wojo", ""]);
        let variations: Vec<&[String]> = registry.matching("professor wojciechowski").collect();
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].to_vec(), vec!["wojo".to_string()]);
    }
}
