// CLI integration tests for framekit subcommands.
use std::io::Write;
use std::process::{Command, Output, Stdio};

use framekit::api::{LabeledTable, Scalar, encode};
use serde_json::{Value, json};

fn cmd() -> Command {
    let exe = env!("CARGO_BIN_EXE_framekit");
    let mut cmd = Command::new(exe);
    cmd.env_remove("RUST_LOG");
    cmd
}

fn parse_json(value: &str) -> Value {
    serde_json::from_str(value).expect("valid json")
}

fn stdout_json(output: &Output) -> Value {
    parse_json(std::str::from_utf8(&output.stdout).expect("utf8").trim())
}

fn stderr_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_json)
        .collect()
}

fn write_input(dir: &tempfile::TempDir, name: &str, value: &Value) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, value.to_string()).expect("write input");
    path.to_str().expect("utf8 path").to_string()
}

fn run_with_stdin(args: &[&str], stdin: &str) -> Output {
    let mut child = cmd()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

fn small_table(offset: i64) -> Value {
    let table = LabeledTable::from_columns([
        ("a", vec![Scalar::Int(offset), Scalar::Int(offset + 1)]),
        ("b", vec![Scalar::Float(0.5), Scalar::Float(1.5)]),
    ])
    .expect("table");
    encode(&table)
}

#[test]
fn version_emits_json_when_piped() {
    let output = cmd().arg("version").output().expect("version");
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["name"], "framekit");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn flatten_joins_tables_from_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(
        &temp,
        "tables.json",
        &json!({"second": small_table(10), "first": small_table(0)}),
    );

    let output = cmd().args(["flatten", &path]).output().expect("flatten");
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["type"], "DataFrame");
    assert_eq!(value["columns"], json!(["label", "a", "b"]));
    assert_eq!(value["index"], json!([0, 1, 2, 3]));
    assert_eq!(value["values"][0], json!(["second", 10, 0.5]));
    assert_eq!(value["values"][2], json!(["first", 0, 0.5]));
    assert_eq!(value["dtypes"], json!(["object", "int64", "float64"]));
}

#[test]
fn flatten_reads_stdin_with_custom_label_field() {
    let input = json!({"only": small_table(0)}).to_string();
    let output = run_with_stdin(&["flatten", "--label-field", "source", "-"], &input);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["columns"][0], "source");
}

#[test]
fn flatten_rejects_non_envelope_values() {
    let input = json!({"oops": [1, 2, 3]}).to_string();
    let output = run_with_stdin(&["flatten"], &input);
    assert_eq!(output.status.code(), Some(2));
    let err = &stderr_lines(&output)[0]["error"];
    assert_eq!(err["kind"], "Usage");
    assert_eq!(err["field"], "oops");
}

#[test]
fn malformed_envelope_exits_with_decode_code() {
    let input = json!({"t": {"type": "DataFrame", "values": [], "index": [], "index_dtype": "int64"}})
        .to_string();
    let output = run_with_stdin(&["flatten"], &input);
    assert_eq!(output.status.code(), Some(4));
    let err = &stderr_lines(&output)[0]["error"];
    assert_eq!(err["kind"], "Decode");
    assert_eq!(err["field"], "columns");
}

#[test]
fn invalid_json_is_a_usage_error_with_parse_hint() {
    let output = run_with_stdin(&["inspect"], "{\"a\":");
    assert_eq!(output.status.code(), Some(2));
    let err = &stderr_lines(&output)[0]["error"];
    assert_eq!(err["kind"], "Usage");
    let hint = err["hint"].as_str().expect("hint");
    assert!(hint.contains("parse category: unexpected-eof"));
    assert!(hint.contains("context: inspect"));
}

#[test]
fn missing_input_file_is_an_io_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("nope.json");
    let output = cmd()
        .args(["flatten", missing.to_str().unwrap()])
        .output()
        .expect("flatten");
    assert_eq!(output.status.code(), Some(6));
    let err = &stderr_lines(&output)[0]["error"];
    assert_eq!(err["kind"], "Io");
    assert!(err["hint"].as_str().unwrap().contains("input path"));
}

#[test]
fn significance_reports_pairs_and_truncation_notice() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_input(
        &temp,
        "samples.json",
        &json!({
            "A": [1, 2, 3, 4, 5, 6],
            "B": [5, 4, 3, 2, 1],
        }),
    );

    let output = cmd()
        .args(["significance", &path])
        .output()
        .expect("significance");
    assert!(output.status.success());
    let value = stdout_json(&output);
    let comparisons = value["comparisons"].as_array().expect("comparisons");
    assert_eq!(comparisons.len(), 1);
    assert_eq!(comparisons[0]["a"], "A");
    assert_eq!(comparisons[0]["b"], "B");
    assert_eq!(comparisons[0]["asterisks"], "ns");
    assert_eq!(comparisons[0]["significant"], false);

    let notices = stderr_lines(&output);
    assert_eq!(notices.len(), 1);
    let notice = &notices[0]["notice"];
    assert_eq!(notice["kind"], "truncate");
    assert_eq!(notice["cmd"], "significance");
    assert_eq!(notice["details"]["sample"], "A");
    assert_eq!(notice["details"]["used_len"], 5);
}

#[test]
fn significance_table_output_is_an_envelope() {
    let input = json!({"A": [1, 2, 3, 4, 5], "B": [2, 3, 4, 5, 6], "C": [1, 1, 1, 1, 1]}).to_string();
    let output = run_with_stdin(&["significance", "--table"], &input);
    assert!(output.status.success());
    let value = stdout_json(&output);
    assert_eq!(value["type"], "DataFrame");
    assert_eq!(
        value["columns"],
        json!(["A", "B", "p-value", "significant", "asterisks"])
    );
    assert_eq!(value["values"].as_array().unwrap().len(), 3);
    assert_eq!(value["values"][1][0], "A");
    assert_eq!(value["values"][1][1], "C");
}

#[test]
fn significance_short_sample_exits_with_validation_code() {
    let input = json!({"A": [1, 2], "B": [1, 2, 3, 4, 5]}).to_string();
    let output = run_with_stdin(&["significance"], &input);
    assert_eq!(output.status.code(), Some(3));
    let err = &stderr_lines(&output)[0]["error"];
    assert!(err["message"].as_str().unwrap().contains("A has 2"));
}

#[test]
fn significance_min_elements_can_be_lowered() {
    let input = json!({"A": [1, 2, 3], "B": [3, 2, 1]}).to_string();
    let output = run_with_stdin(&["significance", "--min-elements", "3"], &input);
    assert!(output.status.success());
}

#[test]
fn inspect_lists_embedded_objects() {
    let input = json!({
        "meta": {"run": 1},
        "results": [small_table(0), {"type": "Series", "values": [1], "index": [0], "index_dtype": "int64", "dtype": "int64"}],
    })
    .to_string();
    let output = run_with_stdin(&["inspect"], &input);
    assert!(output.status.success());
    let objects = stdout_json(&output)["objects"].clone();
    assert_eq!(objects.as_array().unwrap().len(), 2);
    assert_eq!(objects[0]["path"], "$.results[0]");
    assert_eq!(objects[0]["type"], "DataFrame");
    assert_eq!(objects[0]["rows"], 2);
    assert_eq!(objects[0]["columns"], 2);
    assert_eq!(objects[1]["path"], "$.results[1]");
    assert_eq!(objects[1]["type"], "Series");
}

#[test]
fn unknown_subcommand_is_usage_error() {
    let output = cmd().arg("frobnicate").output().expect("run");
    assert_eq!(output.status.code(), Some(2));
    let err = &stderr_lines(&output)[0]["error"];
    assert_eq!(err["kind"], "Usage");
    assert_eq!(err["hint"], "Try `framekit --help`.");
}

#[test]
fn completion_generates_script() {
    let output = cmd().args(["completion", "bash"]).output().expect("completion");
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("framekit"));
}
