//! Purpose: Decode/encode whole JSON documents that embed table envelopes.
//! Exports: `Node`, `decode_document`, `encode_document`, `from_json_str`, `to_json_string`.
//! Role: One recursive pass over arbitrary JSON, decoding every recognised envelope in place.
//! Invariants: Fields of a recognised envelope are never themselves recursed into.
//! Invariants: Object key order is preserved in both directions.
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::codec::envelope;
use crate::codec::registry::{CodecRegistry, CustomValue, Decoded};
use crate::core::error::{Error, ErrorKind};
use crate::core::frame::{LabeledSeries, LabeledTable};

#[derive(Debug)]
pub enum Node {
    Value(Value),
    Array(Vec<Node>),
    Object(IndexMap<String, Node>),
    Series(LabeledSeries),
    Table(LabeledTable),
    Custom(CustomValue),
}

impl Node {
    pub fn as_table(&self) -> Option<&LabeledTable> {
        match self {
            Node::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&LabeledSeries> {
        match self {
            Node::Series(series) => Some(series),
            _ => None,
        }
    }

    /// Visits every node depth-first with a JSONPath-like location (`$`, `$[0]`, `$.key`).
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&str, &Node),
    {
        self.walk_at("$", visit);
    }

    fn walk_at<F>(&self, path: &str, visit: &mut F)
    where
        F: FnMut(&str, &Node),
    {
        visit(path, self);
        match self {
            Node::Array(items) => {
                for (idx, item) in items.iter().enumerate() {
                    item.walk_at(&format!("{path}[{idx}]"), visit);
                }
            }
            Node::Object(fields) => {
                for (key, item) in fields {
                    item.walk_at(&format!("{path}.{key}"), visit);
                }
            }
            _ => {}
        }
    }
}

impl From<LabeledTable> for Node {
    fn from(table: LabeledTable) -> Self {
        Node::Table(table)
    }
}

impl From<LabeledSeries> for Node {
    fn from(series: LabeledSeries) -> Self {
        Node::Series(series)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Value(value)
    }
}

impl From<Decoded> for Node {
    fn from(decoded: Decoded) -> Self {
        match decoded {
            Decoded::Series(series) => Node::Series(series),
            Decoded::Table(table) => Node::Table(table),
            Decoded::Custom(custom) => Node::Custom(custom),
            Decoded::Passthrough(value) => Node::Value(value),
        }
    }
}

pub fn decode_document(value: Value, registry: &CodecRegistry) -> Result<Node, Error> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| decode_document(item, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Array),
        Value::Object(map) => {
            if let Some(decoded) = registry.decode_tagged(&map) {
                return decoded.map(Node::from);
            }
            map.into_iter()
                .map(|(key, item)| Ok((key, decode_document(item, registry)?)))
                .collect::<Result<IndexMap<_, _>, Error>>()
                .map(Node::Object)
        }
        scalar => Ok(Node::Value(scalar)),
    }
}

pub fn encode_document(node: &Node, registry: &CodecRegistry) -> Result<Value, Error> {
    match node {
        Node::Value(value) => Ok(value.clone()),
        Node::Array(items) => items
            .iter()
            .map(|item| encode_document(item, registry))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Node::Object(fields) => fields
            .iter()
            .map(|(key, item)| Ok((key.clone(), encode_document(item, registry)?)))
            .collect::<Result<Map<_, _>, Error>>()
            .map(Value::Object),
        Node::Series(series) => Ok(envelope::encode_series(series)),
        Node::Table(table) => Ok(envelope::encode_table(table)),
        Node::Custom(custom) => registry.encode_any(custom.as_any()),
    }
}

pub fn from_json_str(text: &str, registry: &CodecRegistry) -> Result<Node, Error> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Decode)
            .with_message("document is not valid JSON")
            .with_source(err)
    })?;
    decode_document(value, registry)
}

pub fn to_json_string(node: &Node, registry: &CodecRegistry) -> Result<String, Error> {
    let value = encode_document(node, registry)?;
    serde_json::to_string(&value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to serialize document")
            .with_source(err)
    })
}
