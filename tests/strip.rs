//! Tests for the strip workflow.

mod common;

use common::write_input;
use snomed_tools::NormalizeMode;
use snomed_tools::PipelineError;
use snomed_tools::sink::MemorySink;
use snomed_tools::strip::{StripConfig, strip_file};
use snomed_tools::table::read_tsv;

const INPUT: &str = "Id\tPost_Coordinated_Expression\n\
1\t264476002 |surgical action| : { 405813007 |procedure site| = 181216001 |entire retina| }\n\
2\t\n\
3\t421720008 |spray dose form| + 7946007 |drug suspension|\n";

#[test]
fn adds_stripped_column_next_to_input() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), "expressions.tsv", INPUT);
    let mut sink = MemorySink::default();

    let summary = strip_file(&input, &StripConfig::default(), &mut sink).expect("strip");
    assert_eq!(
        summary.output_path,
        dir.path().join("expressions_stripped.tsv")
    );
    assert_eq!(summary.rows, 3);
    assert_eq!(
        sink.messages,
        vec![format!(
            "Stripped file saved as {}",
            summary.output_path.display()
        )]
    );

    let output = read_tsv(&summary.output_path).expect("read output");
    assert_eq!(
        output.headers,
        vec![
            "Id",
            "Post_Coordinated_Expression",
            "Post_Coordinated_Expression_Stripped"
        ]
    );
    let stripped: Vec<&str> = output
        .records
        .iter()
        .map(|r| r.get("Post_Coordinated_Expression_Stripped").unwrap_or("?"))
        .collect();
    assert_eq!(
        stripped,
        vec!["264476002:{405813007=181216001}", "", "421720008 7946007"]
    );
}

#[test]
fn legacy_mode_keeps_other_symbols() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), "expressions.tsv", INPUT);
    let config = StripConfig {
        mode: NormalizeMode::Legacy,
        ..StripConfig::default()
    };

    let summary = strip_file(&input, &config, &mut MemorySink::default()).expect("strip");
    let output = read_tsv(&summary.output_path).expect("read output");
    assert_eq!(
        output.records[2].get("Post_Coordinated_Expression_Stripped"),
        Some("421720008+7946007")
    );
}

#[test]
fn restripping_is_stable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), "expressions.tsv", INPUT);
    let first = strip_file(&input, &StripConfig::default(), &mut MemorySink::default())
        .expect("first strip");

    // Feed the stripped values back in as raw expressions.
    let output = read_tsv(&first.output_path).expect("read output");
    let mut contents = String::from("Post_Coordinated_Expression\n");
    for record in &output.records {
        contents.push_str(record.get("Post_Coordinated_Expression_Stripped").unwrap_or(""));
        contents.push('\n');
    }
    let again = write_input(dir.path(), "again.tsv", &contents);
    let second = strip_file(&again, &StripConfig::default(), &mut MemorySink::default())
        .expect("second strip");

    for record in read_tsv(&second.output_path).expect("read").records {
        assert_eq!(
            record.get("Post_Coordinated_Expression"),
            record.get("Post_Coordinated_Expression_Stripped")
        );
    }
}

#[test]
fn missing_expression_column_writes_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write_input(dir.path(), "bad.tsv", "Id\tExpression\n1\t123\n");
    let mut sink = MemorySink::default();

    let err = strip_file(&input, &StripConfig::default(), &mut sink).expect_err("should fail");
    match err {
        PipelineError::MissingColumn { column, path } => {
            assert_eq!(column, "Post_Coordinated_Expression");
            assert_eq!(path, input);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(sink.messages.is_empty());
    assert!(!dir.path().join("bad_stripped.tsv").exists());
}
