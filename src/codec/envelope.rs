//! Purpose: Encode/decode `LabeledTable` and `LabeledSeries` to the JSON envelope format.
//! Exports: `ToEnvelope`, `encode`, `encode_table`, `encode_series`, decode helpers (crate).
//! Role: The wire contract; field names here are shared with every existing decoder.
//! Invariants: Decoders branch on `multi_index`/`multi_columns`, never on label shape.
//! Invariants: Hierarchical level dtypes are written but not reapplied when reading.
//! Notes: Per-column `dtypes` are reapplied when present so flat tables round-trip exactly.
use serde_json::{Map, Value};

use crate::core::dtype::DType;
use crate::core::error::{Error, ErrorKind};
use crate::core::frame::{LabeledSeries, LabeledTable};
use crate::core::index::Index;
use crate::core::scalar::Scalar;

pub const SERIES_TAG: &str = "Series";
pub const DATAFRAME_TAG: &str = "DataFrame";

/// Field names for one axis of the envelope.
struct AxisFields {
    labels: &'static str,
    flag: &'static str,
    dtype: Option<&'static str>,
    name: &'static str,
    dtypes: Option<&'static str>,
    names: &'static str,
}

const ROW_AXIS: AxisFields = AxisFields {
    labels: "index",
    flag: "multi_index",
    dtype: Some("index_dtype"),
    name: "index_name",
    dtypes: Some("index_dtypes"),
    names: "index_names",
};

const COLUMN_AXIS: AxisFields = AxisFields {
    labels: "columns",
    flag: "multi_columns",
    dtype: None,
    name: "column_name",
    dtypes: None,
    names: "column_names",
};

pub trait ToEnvelope {
    fn to_envelope(&self) -> Value;
}

impl ToEnvelope for LabeledTable {
    fn to_envelope(&self) -> Value {
        encode_table(self)
    }
}

impl ToEnvelope for LabeledSeries {
    fn to_envelope(&self) -> Value {
        encode_series(self)
    }
}

pub fn encode(obj: &impl ToEnvelope) -> Value {
    obj.to_envelope()
}

pub fn encode_series(series: &LabeledSeries) -> Value {
    let mut out = Map::new();
    out.insert("type".to_string(), Value::from(SERIES_TAG));
    out.insert("values".to_string(), scalars_json(series.values()));
    encode_axis(series.index(), &ROW_AXIS, &mut out);
    out.insert("dtype".to_string(), Value::from(series.dtype().name()));
    if let Some(name) = series.name() {
        out.insert("name".to_string(), Value::from(name));
    }
    Value::Object(out)
}

pub fn encode_table(table: &LabeledTable) -> Value {
    let mut out = Map::new();
    out.insert("type".to_string(), Value::from(DATAFRAME_TAG));
    let rows = table.values().iter().map(|row| scalars_json(row)).collect();
    out.insert("values".to_string(), Value::Array(rows));
    encode_axis(table.index(), &ROW_AXIS, &mut out);
    encode_axis(table.columns(), &COLUMN_AXIS, &mut out);
    out.insert("dtypes".to_string(), dtype_names_json(table.dtypes()));
    Value::Object(out)
}

fn encode_axis(index: &Index, axis: &AxisFields, out: &mut Map<String, Value>) {
    match index {
        Index::Flat(flat) => {
            out.insert(axis.labels.to_string(), scalars_json(&flat.labels));
            out.insert(axis.flag.to_string(), Value::Bool(false));
            if let Some(field) = axis.dtype {
                out.insert(field.to_string(), Value::from(flat.dtype.name()));
            }
            if let Some(name) = &flat.name {
                out.insert(axis.name.to_string(), Value::from(name.as_str()));
            }
        }
        Index::Multi(multi) => {
            let tuples = multi.tuples.iter().map(|tuple| scalars_json(tuple)).collect();
            out.insert(axis.labels.to_string(), Value::Array(tuples));
            out.insert(axis.flag.to_string(), Value::Bool(true));
            if let Some(field) = axis.dtypes {
                out.insert(field.to_string(), dtype_names_json(&multi.dtypes));
            }
            let names = multi
                .names
                .iter()
                .map(|name| Value::from(name.as_deref().unwrap_or("")))
                .collect();
            out.insert(axis.names.to_string(), Value::Array(names));
        }
    }
}

fn scalars_json(values: &[Scalar]) -> Value {
    Value::Array(values.iter().map(Scalar::to_json).collect())
}

fn dtype_names_json(dtypes: &[DType]) -> Value {
    Value::Array(dtypes.iter().map(|dtype| Value::from(dtype.name())).collect())
}

pub(crate) fn decode_series(map: &Map<String, Value>) -> Result<LabeledSeries, Error> {
    let values = scalars_field(map, "values", SERIES_TAG)?;
    let index = decode_axis(map, &ROW_AXIS, SERIES_TAG)?;
    let dtype = DType::from_name(str_field(map, "dtype", SERIES_TAG)?);
    let name = optional_str_field(map, "name")?;
    if values.len() != index.len() {
        return Err(Error::new(ErrorKind::Shape).with_message(format!(
            "Series has {} values but {} index labels",
            values.len(),
            index.len()
        )));
    }
    LabeledSeries::from_parts(values, index, dtype, name).map_err(coercion_at("dtype"))
}

pub(crate) fn decode_table(map: &Map<String, Value>) -> Result<LabeledTable, Error> {
    let rows = array_field(map, "values", DATAFRAME_TAG)?
        .iter()
        .map(|row| match row {
            Value::Array(cells) => scalars(cells, "values"),
            _ => Err(Error::invalid_field("values", "an array of rows")),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let index = decode_axis(map, &ROW_AXIS, DATAFRAME_TAG)?;
    let columns = decode_axis(map, &COLUMN_AXIS, DATAFRAME_TAG)?;
    let dtypes = match map.get("dtypes") {
        None | Some(Value::Null) => None,
        Some(Value::Array(names)) => Some(dtype_names(names, "dtypes")?),
        Some(_) => return Err(Error::invalid_field("dtypes", "an array of dtype names")),
    };
    match dtypes {
        Some(dtypes) => LabeledTable::from_parts(rows, index, columns, dtypes)
            .map_err(coercion_at("dtypes")),
        None => LabeledTable::new(rows, index, columns),
    }
}

fn decode_axis(map: &Map<String, Value>, axis: &AxisFields, tag: &str) -> Result<Index, Error> {
    let labels = array_field(map, axis.labels, tag)?;
    let is_multi = match map.get(axis.flag) {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => return Err(Error::invalid_field(axis.flag, "a boolean")),
    };

    if is_multi {
        let names = match map.get(axis.names) {
            None | Some(Value::Null) => None,
            Some(Value::Array(names)) => Some(level_names(names, axis.names)?),
            Some(_) => return Err(Error::invalid_field(axis.names, "an array of level names")),
        };
        let tuples = labels
            .iter()
            .map(|label| match label {
                Value::Array(parts) => scalars(parts, axis.labels),
                _ => Err(Error::invalid_field(
                    axis.labels,
                    "an array of label tuples when hierarchical",
                )),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let nlevels = names
            .as_ref()
            .map(Vec::len)
            .or_else(|| tuples.first().map(Vec::len))
            .unwrap_or(0);
        let index = Index::multi_with_levels(tuples, nlevels)?;
        return match names {
            Some(names) => index.with_names(names),
            None => Ok(index),
        };
    }

    let labels = scalars(labels, axis.labels)?;
    let index = match axis.dtype {
        Some(field) => {
            let dtype = DType::from_name(str_field(map, field, tag)?);
            Index::flat_with_dtype(labels, dtype).map_err(coercion_at(field))?
        }
        None => Index::flat(labels),
    };
    match optional_str_field(map, axis.name)? {
        Some(name) => Ok(index.with_name(name)),
        None => Ok(index),
    }
}

fn array_field<'a>(
    map: &'a Map<String, Value>,
    field: &str,
    tag: &str,
) -> Result<&'a Vec<Value>, Error> {
    match map.get(field) {
        None => Err(Error::missing_field(field, tag)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(Error::invalid_field(field, "an array")),
    }
}

fn str_field<'a>(map: &'a Map<String, Value>, field: &str, tag: &str) -> Result<&'a str, Error> {
    match map.get(field) {
        None => Err(Error::missing_field(field, tag)),
        Some(Value::String(text)) => Ok(text),
        Some(_) => Err(Error::invalid_field(field, "a string")),
    }
}

fn optional_str_field(map: &Map<String, Value>, field: &str) -> Result<Option<String>, Error> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(Error::invalid_field(field, "a string")),
    }
}

fn scalars_field(map: &Map<String, Value>, field: &str, tag: &str) -> Result<Vec<Scalar>, Error> {
    scalars(array_field(map, field, tag)?, field)
}

fn scalars(items: &[Value], field: &str) -> Result<Vec<Scalar>, Error> {
    items
        .iter()
        .map(|item| Scalar::from_json(item).map_err(|err| err.with_field(field)))
        .collect()
}

fn dtype_names(names: &[Value], field: &str) -> Result<Vec<DType>, Error> {
    names
        .iter()
        .map(|name| {
            name.as_str()
                .map(DType::from_name)
                .ok_or_else(|| Error::invalid_field(field, "an array of dtype names"))
        })
        .collect()
}

// Unnamed levels travel as "" (or null from other writers).
fn level_names(names: &[Value], field: &str) -> Result<Vec<Option<String>>, Error> {
    names
        .iter()
        .map(|name| match name {
            Value::Null => Ok(None),
            Value::String(text) if text.is_empty() => Ok(None),
            Value::String(text) => Ok(Some(text.clone())),
            _ => Err(Error::invalid_field(field, "an array of level names")),
        })
        .collect()
}

/// Values that do not fit the declared dtype are reported against that field.
fn coercion_at(field: &'static str) -> impl Fn(Error) -> Error {
    move |err| {
        if err.kind() != ErrorKind::Validation {
            return err;
        }
        let message = err.message().unwrap_or("value does not fit dtype").to_string();
        Error::new(ErrorKind::Decode)
            .with_message(message)
            .with_field(field)
            .with_source(err)
    }
}
