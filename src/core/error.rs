//! Purpose: Single error type shared by the codec, flattener, and significance tester.
//! Exports: `Error`, `ErrorKind`, `to_exit_code`.
//! Role: Carry a stable kind plus optional message, hint, and offending field name.
//! Invariants: Kinds map to fixed process exit codes (see `to_exit_code`).
//! Invariants: `Decode` errors name the envelope field that was missing or ill-typed.
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    Validation,
    Decode,
    Shape,
    Io,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    field: Option<String>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            field: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// Envelope field the error refers to, when there is one.
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub(crate) fn missing_field(field: &str, type_tag: &str) -> Self {
        Error::new(ErrorKind::Decode)
            .with_message(format!("{type_tag} envelope is missing `{field}`"))
            .with_field(field)
    }

    pub(crate) fn invalid_field(field: &str, expected: &str) -> Self {
        Error::new(ErrorKind::Decode)
            .with_message(format!("envelope field `{field}` must be {expected}"))
            .with_field(field)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {field})")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

pub fn to_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Internal => 1,
        ErrorKind::Usage => 2,
        ErrorKind::Validation => 3,
        ErrorKind::Decode => 4,
        ErrorKind::Shape => 5,
        ErrorKind::Io => 6,
    }
}
