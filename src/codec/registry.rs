//! Purpose: Explicit encode/decode extensions keyed by envelope type tag.
//! Exports: `CodecRegistry`, `Decoded`, `CustomValue`.
//! Role: Dispatch point for built-in envelopes, registered extensions, and pass-through data.
//! Invariants: `Series` and `DataFrame` tags are reserved for the built-in codec.
//! Invariants: One tag per Rust type and one Rust type per tag.
//! Invariants: Unknown tags and untagged values decode to `Decoded::Passthrough` unchanged.
use serde_json::{Map, Value};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::codec::envelope::{self, DATAFRAME_TAG, SERIES_TAG};
use crate::core::error::{Error, ErrorKind};
use crate::core::frame::{LabeledSeries, LabeledTable};

type EncodeFn = Box<dyn Fn(&dyn Any) -> Result<Map<String, Value>, Error> + Send + Sync>;
type DecodeFn = Box<dyn Fn(&Map<String, Value>) -> Result<Box<dyn Any + Send>, Error> + Send + Sync>;

struct Extension {
    tag: String,
    encode: EncodeFn,
    decode: DecodeFn,
}

#[derive(Default)]
pub struct CodecRegistry {
    extensions: Vec<Extension>,
    by_tag: HashMap<String, usize>,
    by_type: HashMap<TypeId, usize>,
}

/// Result of decoding one JSON value.
#[derive(Debug)]
pub enum Decoded {
    Series(LabeledSeries),
    Table(LabeledTable),
    Custom(CustomValue),
    Passthrough(Value),
}

impl Decoded {
    pub fn type_tag(&self) -> Option<&str> {
        match self {
            Decoded::Series(_) => Some(SERIES_TAG),
            Decoded::Table(_) => Some(DATAFRAME_TAG),
            Decoded::Custom(custom) => Some(custom.tag()),
            Decoded::Passthrough(_) => None,
        }
    }

    pub fn into_table(self) -> Option<LabeledTable> {
        match self {
            Decoded::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn into_series(self) -> Option<LabeledSeries> {
        match self {
            Decoded::Series(series) => Some(series),
            _ => None,
        }
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, Decoded::Passthrough(_))
    }
}

/// A value produced by a registered extension decoder.
pub struct CustomValue {
    tag: String,
    value: Box<dyn Any + Send>,
}

impl CustomValue {
    pub fn new<T: Any + Send>(tag: impl Into<String>, value: T) -> Self {
        Self {
            tag: tag.into(),
            value: Box::new(value),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        let tag = self.tag;
        self.value
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|value| Self { tag, value })
    }

    pub(crate) fn as_any(&self) -> &dyn Any {
        &*self.value
    }
}

impl fmt::Debug for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomValue")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an encode/decode pair for `T` under `tag`.
    ///
    /// The encoder returns the envelope body; the `type` field is added by the
    /// registry and overrides any `type` the encoder wrote.
    pub fn register<T, E, D>(
        &mut self,
        tag: impl Into<String>,
        encode: E,
        decode: D,
    ) -> Result<&mut Self, Error>
    where
        T: Any + Send,
        E: Fn(&T) -> Result<Map<String, Value>, Error> + Send + Sync + 'static,
        D: Fn(&Map<String, Value>) -> Result<T, Error> + Send + Sync + 'static,
    {
        let tag = tag.into();
        if tag == SERIES_TAG || tag == DATAFRAME_TAG {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("type tag `{tag}` is reserved for the built-in codec")));
        }
        if self.by_tag.contains_key(&tag) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("type tag `{tag}` is already registered")));
        }
        let type_id = TypeId::of::<T>();
        if self.by_type.contains_key(&type_id) {
            return Err(Error::new(ErrorKind::Usage).with_message(format!(
                "an encoder for {} is already registered",
                std::any::type_name::<T>()
            )));
        }

        let encode: EncodeFn = Box::new(move |value: &dyn Any| {
            let typed = value.downcast_ref::<T>().ok_or_else(|| {
                Error::new(ErrorKind::Internal).with_message(format!(
                    "extension encoder expected {}",
                    std::any::type_name::<T>()
                ))
            })?;
            encode(typed)
        });
        let decode: DecodeFn = Box::new(move |map: &Map<String, Value>| {
            decode(map).map(|value| Box::new(value) as Box<dyn Any + Send>)
        });

        let slot = self.extensions.len();
        self.by_tag.insert(tag.clone(), slot);
        self.by_type.insert(type_id, slot);
        self.extensions.push(Extension {
            tag,
            encode,
            decode,
        });
        Ok(self)
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    pub fn encode<T: Any>(&self, value: &T) -> Result<Value, Error> {
        self.encode_any(value)
    }

    pub(crate) fn encode_any(&self, value: &dyn Any) -> Result<Value, Error> {
        if let Some(table) = value.downcast_ref::<LabeledTable>() {
            return Ok(envelope::encode_table(table));
        }
        if let Some(series) = value.downcast_ref::<LabeledSeries>() {
            return Ok(envelope::encode_series(series));
        }
        let Some(&slot) = self.by_type.get(&value.type_id()) else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("no encoder registered for this type")
                .with_hint("Register an encode/decode pair with `CodecRegistry::register`."));
        };
        let extension = &self.extensions[slot];
        let body = (extension.encode)(value)?;
        let mut out = Map::with_capacity(body.len() + 1);
        out.insert("type".to_string(), Value::from(extension.tag.as_str()));
        for (key, field) in body {
            if key != "type" {
                out.insert(key, field);
            }
        }
        Ok(Value::Object(out))
    }

    /// Decodes a value, passing through anything without a known `type`.
    pub fn decode(&self, value: &Value) -> Result<Decoded, Error> {
        match value.as_object().and_then(|map| self.decode_tagged(map)) {
            Some(decoded) => decoded,
            None => Ok(Decoded::Passthrough(value.clone())),
        }
    }

    /// `None` when the object's `type` is absent or not recognised.
    pub(crate) fn decode_tagged(&self, map: &Map<String, Value>) -> Option<Result<Decoded, Error>> {
        let tag = map.get("type").and_then(Value::as_str)?;
        match tag {
            SERIES_TAG => Some(envelope::decode_series(map).map(Decoded::Series)),
            DATAFRAME_TAG => Some(envelope::decode_table(map).map(Decoded::Table)),
            _ => {
                let Some(&slot) = self.by_tag.get(tag) else {
                    tracing::debug!(tag, "unrecognised envelope type; passing through");
                    return None;
                };
                let extension = &self.extensions[slot];
                Some((extension.decode)(map).map(|value| {
                    Decoded::Custom(CustomValue {
                        tag: extension.tag.clone(),
                        value,
                    })
                }))
            }
        }
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.extensions.iter().map(|ext| ext.tag.as_str()).collect();
        f.debug_struct("CodecRegistry").field("tags", &tags).finish()
    }
}
