//! Purpose: Combine a mapping of labeled tables into one long-form table.
//! Exports: `flatten`, `flatten_default`, `DEFAULT_LABEL_FIELD`.
//! Role: Provenance-preserving concatenation; the key of each table becomes a leading column.
//! Invariants: Output order follows mapping insertion order, then each table's row order.
//! Invariants: Output rows get a fresh 0-based contiguous index; source indexes are dropped.
//! Invariants: No truncation: every input row appears exactly once.
use indexmap::IndexMap;

use crate::core::dtype::DType;
use crate::core::error::{Error, ErrorKind};
use crate::core::frame::LabeledTable;
use crate::core::index::{FlatIndex, Index};
use crate::core::scalar::Scalar;

pub const DEFAULT_LABEL_FIELD: &str = "label";

pub fn flatten_default(tables_by_label: &IndexMap<String, LabeledTable>) -> Result<LabeledTable, Error> {
    flatten(tables_by_label, DEFAULT_LABEL_FIELD)
}

pub fn flatten(
    tables_by_label: &IndexMap<String, LabeledTable>,
    label_field_name: &str,
) -> Result<LabeledTable, Error> {
    let label_column = Scalar::Str(label_field_name.to_string());
    let Some((first_key, first)) = tables_by_label.first() else {
        return Ok(LabeledTable::empty(Index::flat(vec![label_column])));
    };

    let Index::Flat(first_columns) = first.columns() else {
        return Err(hierarchical_columns_error(first_key));
    };
    if first_columns.labels.contains(&label_column) {
        return Err(Error::new(ErrorKind::Validation)
            .with_message(format!(
                "table {first_key:?} already has a column named {label_field_name:?}"
            ))
            .with_hint("Pick a different label field name."));
    }

    let mut values = Vec::new();
    for (key, table) in tables_by_label {
        let Index::Flat(columns) = table.columns() else {
            return Err(hierarchical_columns_error(key));
        };
        if columns.labels != first_columns.labels {
            return Err(Error::new(ErrorKind::Validation).with_message(format!(
                "table {key:?} has columns [{}] but table {first_key:?} has [{}]",
                join_labels(&columns.labels),
                join_labels(&first_columns.labels)
            )));
        }
        for row in table.values() {
            let mut out = Vec::with_capacity(row.len() + 1);
            out.push(Scalar::Str(key.clone()));
            out.extend(row.iter().cloned());
            values.push(out);
        }
    }

    let mut dtypes = vec![DType::Object];
    dtypes.extend((0..first_columns.labels.len()).map(|col| {
        let declared = &first.dtypes()[col];
        if tables_by_label.values().all(|t| &t.dtypes()[col] == declared) {
            declared.clone()
        } else {
            let column: Vec<Scalar> = values.iter().map(|row| row[col + 1].clone()).collect();
            DType::infer(&column)
        }
    }));

    let mut labels = vec![label_column];
    labels.extend(first_columns.labels.iter().cloned());
    let columns = Index::Flat(FlatIndex {
        dtype: DType::infer(&labels),
        labels,
        name: first_columns.name.clone(),
    });

    let nrows = values.len();
    tracing::debug!(tables = tables_by_label.len(), rows = nrows, "flattened tables");
    LabeledTable::from_parts(values, Index::range(nrows), columns, dtypes)
}

fn hierarchical_columns_error(key: &str) -> Error {
    Error::new(ErrorKind::Validation)
        .with_message(format!("table {key:?} has hierarchical columns"))
        .with_hint("Flatten requires tables with a flat column index.")
}

fn join_labels(labels: &[Scalar]) -> String {
    labels
        .iter()
        .map(Scalar::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::{flatten, flatten_default};
    use crate::core::dtype::DType;
    use crate::core::error::ErrorKind;
    use crate::core::frame::LabeledTable;
    use crate::core::index::Index;
    use crate::core::scalar::Scalar;
    use indexmap::IndexMap;

    fn abc_table() -> LabeledTable {
        LabeledTable::from_columns([
            ("a", (0..3).map(Scalar::from).collect()),
            ("b", (3..6).map(Scalar::from).collect()),
            ("c", (6..9).map(Scalar::from).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn label_column_leads_and_index_is_fresh() {
        let mut tables = IndexMap::new();
        tables.insert("A".to_string(), abc_table());
        tables.insert("B".to_string(), abc_table());

        let flat = flatten_default(&tables).unwrap();
        assert_eq!(flat.shape(), (6, 4));
        assert_eq!(flat.index(), &Index::range(6));
        assert_eq!(
            flat.columns(),
            &Index::flat(vec!["label".into(), "a".into(), "b".into(), "c".into()])
        );
        assert_eq!(
            flat.column(&"label".into()).unwrap(),
            ["A", "A", "A", "B", "B", "B"].map(Scalar::from).to_vec()
        );
        assert_eq!(
            flat.column(&"b".into()).unwrap(),
            [3, 4, 5, 3, 4, 5].map(Scalar::from).to_vec()
        );
        assert_eq!(flat.dtypes()[0], DType::Object);
        assert_eq!(flat.dtypes()[1], DType::Int64);
    }

    #[test]
    fn insertion_order_wins_over_key_order() {
        let mut tables = IndexMap::new();
        tables.insert("zeta".to_string(), abc_table());
        tables.insert("alpha".to_string(), abc_table());
        let flat = flatten(&tables, "source").unwrap();
        let labels = flat.column(&"source".into()).unwrap();
        assert_eq!(labels[0], Scalar::from("zeta"));
        assert_eq!(labels[5], Scalar::from("alpha"));
    }

    #[test]
    fn empty_mapping_gives_label_only_table() {
        let flat = flatten_default(&IndexMap::new()).unwrap();
        assert_eq!(flat.shape(), (0, 1));
        assert_eq!(flat.columns(), &Index::flat(vec!["label".into()]));
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let other = LabeledTable::from_columns([("x", vec![1.into()])]).unwrap();
        let mut tables = IndexMap::new();
        tables.insert("A".to_string(), abc_table());
        tables.insert("B".to_string(), other);
        let err = flatten_default(&tables).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.message().unwrap().contains("\"B\""));
    }

    #[test]
    fn label_field_collision_is_rejected() {
        let mut tables = IndexMap::new();
        tables.insert("A".to_string(), abc_table());
        let err = flatten(&tables, "a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn differing_column_dtypes_are_widened() {
        let ints = LabeledTable::from_columns([("v", vec![1.into()])]).unwrap();
        let floats = LabeledTable::from_columns([("v", vec![2.5.into()])]).unwrap();
        let mut tables = IndexMap::new();
        tables.insert("i".to_string(), ints);
        tables.insert("f".to_string(), floats);
        let flat = flatten_default(&tables).unwrap();
        assert_eq!(flat.dtypes()[1], DType::Float64);
        assert_eq!(flat.values()[0][1], Scalar::Float(1.0));
    }
}
