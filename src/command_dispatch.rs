//! Purpose: Execute parsed CLI subcommands against the framekit library.
//! Exports: `dispatch_command`.
//! Role: Map each `Command` variant to input reading, library calls, and JSON emission.
//! Invariants: Every handler reads its whole input before emitting anything on stdout.
//! Invariants: Malformed input JSON is a usage error carrying a parse-category hint.
use super::*;

use framekit::api::{
    CodecRegistry, LabeledTable, Node, comparisons_to_table, decode_document, encode_table,
    flatten, significance_comparison,
};
use framekit::notice::truncation_notice;
use indexmap::IndexMap;

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Flatten { input, label_field } => {
            let object = read_object(input.as_deref(), "flatten")?;
            let registry = CodecRegistry::new();
            let mut tables = IndexMap::with_capacity(object.len());
            for (key, value) in object {
                let table = registry
                    .decode(&value)?
                    .into_table()
                    .ok_or_else(|| not_a_table(&key))?;
                tables.insert(key, table);
            }
            tracing::debug!(tables = tables.len(), "flattening tables");
            let flat = flatten(&tables, &label_field)?;
            emit_json(encode_table(&flat));
            Ok(RunOutcome::ok())
        }
        Command::Significance {
            input,
            min_elements,
            table,
        } => {
            let object = read_object(input.as_deref(), "significance")?;
            let mut samples = IndexMap::with_capacity(object.len());
            for (key, value) in object {
                let sample = numeric_sample(&key, &value)?;
                samples.insert(key, sample);
            }
            let comparisons = significance_comparison(&samples, min_elements)?;
            for truncation in comparisons.iter().filter_map(|c| c.truncation.as_ref()) {
                emit_notice(&truncation_notice("significance", truncation));
            }
            if table {
                emit_json(encode_table(&comparisons_to_table(&comparisons)?));
            } else {
                let rows: Vec<Value> = comparisons
                    .iter()
                    .map(|c| {
                        json!({
                            "a": c.a,
                            "b": c.b,
                            "p_value": c.p_value,
                            "significant": c.significant,
                            "asterisks": c.asterisks,
                        })
                    })
                    .collect();
                emit_json(json!({ "comparisons": rows }));
            }
            Ok(RunOutcome::ok())
        }
        Command::Inspect { input } => {
            let value = read_json(input.as_deref(), "inspect")?;
            let node = decode_document(value, &CodecRegistry::new())?;
            emit_json(json!({ "objects": inspect_objects(&node) }));
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output();
            Ok(RunOutcome::ok())
        }
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "framekit", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
    }
}

fn read_json(path: Option<&std::path::Path>, context: &str) -> Result<Value, Error> {
    let text = input::read_input(path)?;
    json::parse::from_str(&text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid json input")
            .with_hint(json::parse::hint_for_error(&err, context))
            .with_source(err)
    })
}

fn read_object(path: Option<&std::path::Path>, context: &str) -> Result<Map<String, Value>, Error> {
    match read_json(path, context)? {
        Value::Object(object) => Ok(object),
        other => Err(Error::new(ErrorKind::Usage)
            .with_message(format!(
                "{context} input must be a JSON object, got {}",
                json_type_name(&other)
            ))
            .with_hint("Wrap the input as {\"name\": ...}.")),
    }
}

fn not_a_table(key: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("value for {key:?} is not a DataFrame envelope"))
        .with_field(key)
        .with_hint("Each value must be an object with \"type\": \"DataFrame\".")
}

fn numeric_sample(key: &str, value: &Value) -> Result<Vec<f64>, Error> {
    let invalid = || {
        Error::new(ErrorKind::Validation)
            .with_message(format!("sample {key:?} must be an array of numbers"))
            .with_field(key)
    };
    let Value::Array(items) = value else {
        return Err(invalid());
    };
    items
        .iter()
        .map(|item| item.as_f64().ok_or_else(invalid))
        .collect()
}

fn inspect_objects(node: &Node) -> Vec<Value> {
    let mut objects = Vec::new();
    node.walk(&mut |path, node| match node {
        Node::Table(table) => objects.push(table_summary(path, table)),
        Node::Series(series) => objects.push(json!({
            "path": path,
            "type": "Series",
            "rows": series.len(),
            "multi_index": series.index().is_multi(),
        })),
        Node::Custom(custom) => objects.push(json!({
            "path": path,
            "type": custom.tag(),
        })),
        _ => {}
    });
    objects
}

fn table_summary(path: &str, table: &LabeledTable) -> Value {
    let (rows, columns) = table.shape();
    json!({
        "path": path,
        "type": "DataFrame",
        "rows": rows,
        "columns": columns,
        "multi_index": table.index().is_multi(),
        "multi_columns": table.columns().is_multi(),
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
