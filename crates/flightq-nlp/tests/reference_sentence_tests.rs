//! Every sentence pattern the reference bank is built from, end to end
//! through the translator chain.

use std::io::Write;

use flightq_nlp::pipeline::{PipelineConfig, QueryProcessor};
use flightq_nlp::Procedure;

fn procedural(query: &str) -> String {
    QueryProcessor::default().process(query).procedural.to_string()
}

#[test]
fn reference_sentences_translate() {
    let cases = [
        (
            "Máy bay nào đến thành phố Huế lúc 13:30HR ?",
            "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HUE 13:30HR))",
        ),
        ("Máy bay VN4 có xuất phát từ Đà Nẵng không ?", "(TEST ?m1 (DTIME VN4 ĐN ?))"),
        (
            "Những máy bay nào xuất phát từ TP. Hồ Chí Minh ?",
            "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(DTIME ?m1 HCM ?))",
        ),
        (
            "Máy bay nào bay từ Hà Nội đến Khánh Hòa ?",
            "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(RUN-TIME ?m1 HN KH ?))",
        ),
        (
            "Thời gian máy bay VN1 bay từ Hà Nội đến Huế mất bao lâu ?",
            "(PRINT-ALL ?time (MÁY_BAY VN1)(RUN-TIME VN1 HN HUE ?time))",
        ),
        (
            "Máy bay VJ5 đến Đà Nẵng lúc mấy giờ ?",
            "(PRINT-ALL ?time (MÁY_BAY VJ5)(ATIME VJ5 ĐN ?time))",
        ),
        (
            "Máy bay nào hạ cánh ở Hải Phòng lúc 10 giờ ?",
            "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HP 10:00HR))",
        ),
        (
            "Máy bay VJ2 có xuất phát từ Huế lúc 8:30HR không ?",
            "(TEST ?m1 (DTIME VJ2 HUE 8:30HR))",
        ),
        (
            "Máy bay nào xuất phát từ Hải Phòng lúc 7:00HR ?",
            "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(DTIME ?m1 HP 7:00HR))",
        ),
        (
            "Máy bay nào bay từ Đà Nẵng đến TP. Hồ Chí Minh mất bao lâu ?",
            "(PRINT-ALL ?time (MÁY_BAY ?m1)(RUN-TIME ?m1 ĐN HCM ?time))",
        ),
    ];

    for (query, expected) in cases {
        assert_eq!(procedural(query), expected, "query: {query}");
    }
}

#[test]
fn city_spelling_variants_reach_the_same_query() {
    assert_eq!(
        procedural("Máy bay nào xuất phát từ Tp.HCM?"),
        "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(DTIME ?m1 HCM ?))"
    );
}

#[test]
fn stage_outputs_for_the_arrival_question() {
    let analysis = QueryProcessor::default().process("Máy bay nào đến thành phố Huế lúc 13:30HR ?");
    let grammatical: Vec<String> = analysis.grammatical.iter().map(ToString::to_string).collect();
    assert_eq!(
        grammatical,
        vec![
            "(WHICH m1 MÁY BAY)",
            "(LSUBJ m1 MÁY BAY)",
            "(PRED m1 ĐẾN)",
            "(TO-LOC m1 HUẾ)",
            "(AT-TIME m1 13:30HR)",
        ]
    );
    assert_eq!(
        analysis.logical.to_string(),
        "(m1 WHICH MÁY BAY)(m1 PRED ĐẾN [LSUBJ MÁY BAY] [TO-LOC HUẾ] [AT-TIME 13:30HR])"
    );
}

#[test]
fn unsupported_structure_is_invalid() {
    assert_eq!(
        QueryProcessor::default().process("Hôm nay trời đẹp không ?").procedural,
        Procedure::Invalid
    );
    assert_eq!(
        QueryProcessor::default().process("").procedural,
        Procedure::Invalid
    );
}

#[test]
fn custom_bank_from_config() -> anyhow::Result<()> {
    let mut bank = tempfile::NamedTempFile::new()?;
    writeln!(bank, "# arrival only")?;
    writeln!(bank, "nsubj(đến, máy bay)")?;
    writeln!(bank, "to-loc(đến, huế)")?;

    let config = PipelineConfig {
        bank_path: Some(bank.path().to_path_buf()),
        ..PipelineConfig::default()
    };
    let processor = QueryProcessor::from_config(&config)?;
    assert_eq!(processor.bank().len(), 2);
    assert_eq!(
        processor.process("máy bay đến Huế").procedural.to_string(),
        "(PRINT-ALL ?m1 (MÁY_BAY ?m1)(ATIME ?m1 HUE ?))"
    );
    // The built-in bank would have produced a `which` arc here.
    assert!(processor
        .process("Máy bay nào đến Huế")
        .dependencies
        .iter()
        .all(|arc| arc.label != flightq_nlp::RelationLabel::Which));
    Ok(())
}

#[test]
fn stopword_filtering_from_config() -> anyhow::Result<()> {
    let mut stopwords = tempfile::NamedTempFile::new()?;
    writeln!(stopwords, "có")?;

    let config = PipelineConfig {
        filter_stopwords: true,
        stopwords_path: Some(stopwords.path().to_path_buf()),
        bank_path: None,
    };
    let analysis = QueryProcessor::from_config(&config)?.process("Máy bay VN4 có xuất phát từ Đà Nẵng không ?");
    assert!(!analysis.tokens.iter().any(|t| t == "có"));
    assert_eq!(analysis.procedural.to_string(), "(TEST ?m1 (DTIME VN4 ĐN ?))");
    Ok(())
}

#[test]
fn missing_stopword_file_is_not_fatal() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let config = PipelineConfig {
        filter_stopwords: true,
        stopwords_path: Some(dir.path().join("missing.txt")),
        bank_path: None,
    };
    let processor = QueryProcessor::from_config(&config)?;
    assert_eq!(processor.process("Máy bay VN4 có xuất phát từ Đà Nẵng không ?").tokens.len(), 8);
    Ok(())
}
