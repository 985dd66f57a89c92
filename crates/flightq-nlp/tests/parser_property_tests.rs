use std::collections::HashSet;

use flightq_nlp::lexicon::is_main_verb;
use flightq_nlp::parser::DependencyParser;
use flightq_nlp::tokenizer::Token;
use proptest::prelude::*;

/// Words the reference bank knows, plus a few it does not.
const VOCABULARY: &[&str] = &[
    "Máy bay", "máy bay", "nào", "những", "VN4", "VJ5", "có", "đến", "bay", "xuất phát", "hạ cánh",
    "thành phố", "từ", "ở", "Huế", "Đà Nẵng", "Hà Nội", "lúc", "mất", "13:30HR", "mấy giờ", "bao lâu",
    "không", "?", "hôm nay", "Vinh",
];

fn tokens() -> impl Strategy<Value = Vec<Token>> {
    proptest::collection::vec(proptest::sample::select(VOCABULARY).prop_map(str::to_string), 0..14)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn parse_terminates_within_twice_the_input(tokens in tokens()) {
        let parse = DependencyParser::default().parse(&tokens);
        prop_assert!(parse.transitions.len() <= 2 * tokens.len());
    }

    #[test]
    fn arcs_are_never_repeated(tokens in tokens()) {
        let parse = DependencyParser::default().parse(&tokens);
        let mut seen = HashSet::new();
        for arc in &parse.arcs {
            let key = (arc.head.to_lowercase(), arc.dependent.to_lowercase(), arc.label);
            prop_assert!(seen.insert(key), "duplicate arc {}", arc);
        }
    }

    #[test]
    fn root_arcs_attach_main_verbs(tokens in tokens()) {
        let parse = DependencyParser::default().parse(&tokens);
        let roots: Vec<_> = parse.arcs.iter().filter(|a| a.is_root()).collect();
        prop_assert!(roots.len() <= 1);
        for arc in roots {
            prop_assert!(is_main_verb(&arc.dependent), "root on {}", arc.dependent);
        }
    }
}
