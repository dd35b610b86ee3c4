/// 目的地匹配综合测试

#[cfg(test)]
mod tests {
    use indoornav::matching::*;

    fn directory() -> LocationDirectory {
        let json = std::fs::read_to_string(concat!(env!("CARGO_MANIFEST_DIR"), "/data/directory.json"))
            .expect("sample directory present");
        LocationDirectory::from_json(&json)
            .expect("sample directory parses")
            .with_room_numbers(40, "04.2")
    }

    fn dahm_only() -> Vec<Location> {
        vec![
            Location::new("28", "Professor Dahm", LocationKind::Person).with_aliases(["dahm", "dam"]),
        ]
    }

    fn matcher_with_complex_names() -> DestinationMatcher {
        let mut registry = ComplexNameRegistry::new();
        registry.register("wojciechowski", ["wotschikowski", "wotschkowski", "woschkowski"]);
        DestinationMatcher::new(MatcherConfig::default(), registry)
    }

    #[test]
    fn test_string_distance_properties() {
        let words = ["", "a", "dahm", "dam", "toilette", "professor", "hörsaal"];
        for a in words {
            assert_eq!(string_distance(a, a), 0);
            assert_eq!(string_distance("", a), a.chars().count());
            for b in words {
                assert_eq!(string_distance(a, b), string_distance(b, a));
                for c in words {
                    assert!(string_distance(a, c) <= string_distance(a, b) + string_distance(b, c));
                }
            }
        }
    }

    #[test]
    fn test_score_match_identity() {
        let matcher = DestinationMatcher::default();
        for text in ["PC Pool", "toilette", "Professor Wojciechowski", "  Raum 12 "] {
            assert_eq!(matcher.score_match(text, text), 1.0);
        }
    }

    #[test]
    fn test_score_match_is_asymmetric() {
        // 长单词提升只看目标一方
        let matcher = DestinationMatcher::default();
        let forward = matcher.score_match("computer", "computers");
        let backward = matcher.score_match("computers", "computer");
        println!("computer -> computers: {:.3}, 反向: {:.3}", forward, backward);
        assert_eq!(forward, 1.0);
        assert!(backward < forward);

        // 复合名称只在目标包含登记名称时生效
        let matcher = matcher_with_complex_names();
        assert_eq!(matcher.score_match("wotschikowski", "Professor Wojciechowski"), 0.95);
        assert!(matcher.score_match("Professor Wojciechowski", "wotschikowski") < 0.95);
    }

    #[test]
    fn test_dahm_examples() {
        let matcher = DestinationMatcher::default();
        let locations = dahm_only();

        let result = matcher.find_best_match("dahm", &locations).expect("dahm resolves");
        assert_eq!(result.location.name, "Professor Dahm");
        assert_eq!(result.confidence_percent, 100);

        let result = matcher.find_best_match("dam", &locations).expect("dam resolves");
        assert_eq!(result.location.id, "28");

        assert!(matcher.find_best_match("xyzzy totally unrelated", &locations).is_none());
    }

    #[test]
    fn test_find_best_match_never_accepts_at_or_below_threshold() {
        let matcher = DestinationMatcher::default();
        let dir = directory();
        let inputs = [
            "professor",
            "herr",
            "raum",
            "toilete",
            "computerraum bitte",
            "wo ist der pc pool",
            "fachschaft",
            "audimaks",
            "rakov",
            "7",
            "",
        ];
        for input in inputs {
            if let Some(result) = matcher.find_best_match(input, dir.locations()) {
                println!("{:?} -> {} ({:.3})", input, result, result.score);
                assert!(result.score > 0.65);
                let candidate = matcher.candidate(input, &result.location);
                assert_eq!(candidate.score, result.score);
            }
        }
    }

    #[test]
    fn test_complex_name_resolution() {
        let matcher = matcher_with_complex_names();
        let dir = directory();

        let result = matcher
            .find_best_match("zu professor wotschikowski", dir.locations())
            .expect("complex name resolves");
        assert_eq!(result.location.id, "29");
        assert_eq!(result.confidence_percent, 95);

        let result = matcher
            .find_best_match("wotschkowsky", dir.locations())
            .expect("near variation resolves");
        assert_eq!(result.location.id, "29");
        assert_eq!(result.confidence_percent, 90);
    }

    #[test]
    fn test_room_number_by_voice() {
        let matcher = DestinationMatcher::default();
        let dir = directory();
        let result = matcher.find_best_match("Raum 12", dir.locations()).expect("room resolves");
        assert_eq!(result.location.id, "room-012");
        assert_eq!(result.location.room.as_deref(), Some("04.2.012"));
    }

    #[test]
    fn test_typed_search_and_signage() {
        let dir = directory();

        let hits: Vec<&str> = dir.filter_by_prefix("hörsaal").iter().map(|l| l.name.as_str()).collect();
        assert_eq!(hits, vec!["Audimax"]);

        let hits = filter_by_prefix("Professor", dir.locations());
        assert_eq!(hits.len(), 3);

        let signage = dir.find_signage_by_room("04.2.10").expect("signage for W/D");
        assert_eq!(signage.visual_sign, "W/D");
        assert_eq!(signage.sign_color, SignColor::Red);
    }

    #[test]
    fn test_resolved_destination_key() {
        let matcher = DestinationMatcher::default();
        let dir = directory();

        // 有房间号的地点交出房间号
        let result = matcher.find_best_match("herr dahm", dir.locations()).expect("person resolves");
        assert_eq!(result.location.destination_key(), "04.2.010");

        // 没有房间号的设施交出小写名称
        let result = matcher.find_best_match("Toilette", dir.locations()).expect("facility resolves");
        assert_eq!(result.location.destination_key(), "toilette");
        let result = matcher.find_best_match("lernzimmer", dir.locations()).expect("room resolves");
        assert_eq!(result.location.destination_key(), "lernraum");
    }

    #[test]
    fn test_matcher_config_changes_outcome() {
        let dir = directory();

        // 只说出 "professor"：0.5，默认阈值下不接受
        let default = DestinationMatcher::default();
        assert!(default.find_best_match("professor", dir.locations()).is_none());

        let lenient = DestinationMatcher::new(
            MatcherConfig {
                min_confidence: 0.4,
                ..MatcherConfig::default()
            },
            ComplexNameRegistry::new(),
        );
        let result = lenient.find_best_match("professor", dir.locations()).expect("lower threshold accepts");
        println!("professor -> {}", result);
        assert_eq!(result.location.id, "28");
        assert_eq!(result.confidence_percent, 50);

        // 关闭长单词提升
        let no_boost = DestinationMatcher::new(
            MatcherConfig {
                long_word_boost: 1.0,
                ..MatcherConfig::default()
            },
            ComplexNameRegistry::new(),
        );
        assert_eq!(default.score_match("computer", "computers"), 1.0);
        assert!((no_boost.score_match("computer", "computers") - 8.0 / 9.0).abs() < 1e-9);

        // 复合名称编辑距离收紧到 1 后，距离 2 的说法不再命中
        let mut registry = ComplexNameRegistry::new();
        registry.register("wojciechowski", ["wotschikowski"]);
        let strict = DestinationMatcher::new(
            MatcherConfig {
                complex_edit_distance: 1,
                ..MatcherConfig::default()
            },
            registry,
        );
        assert!(strict.score_match("wotschkowsky", "Professor Wojciechowski") < 0.9);
        assert_eq!(
            matcher_with_complex_names().score_match("wotschkowsky", "Professor Wojciechowski"),
            0.9
        );
    }
}
