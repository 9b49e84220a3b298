//! Scalar values stored in descriptor fields.
//!
//! [`Value`] is the closed set of things a line can hold. Typed fields use the
//! [`FieldValue`] trait to convert between their Rust type, a [`Value`] and
//! the text on disk.
use std::fmt::{Debug, Display};
use std::path::PathBuf;

use error_stack::{Report, ResultExt};

use crate::datetime::DateTime;
use crate::error::{DResult, DescriptorError};
use crate::ser::{format_integer, format_real};

/// Which variant of [`Value`] a field holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Int,
    Float,
    Str,
    Path,
    DateTime,
}

impl ValueKind {
    /// Number of whitespace-separated tokens a value of this kind spans on a line
    pub fn tokens(&self) -> usize {
        match self {
            ValueKind::DateTime => 2,
            _ => 1,
        }
    }
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::Int => "integer",
            ValueKind::Float => "real",
            ValueKind::Str => "string",
            ValueKind::Path => "path",
            ValueKind::DateTime => "date-time",
        };
        write!(f, "{s}")
    }
}

/// A single scalar from the descriptor
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    DateTime(DateTime),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Path(_) => ValueKind::Path,
            Value::DateTime(_) => ValueKind::DateTime,
        }
    }

    /// Convert a token (two space-separated tokens for date-times) into a value of the given kind.
    pub fn decode(kind: ValueKind, token: &str) -> DResult<Self> {
        let parse_err = |reason: String| {
            Report::new(DescriptorError::Parse { s: token.to_string(), t: kind, reason })
        };

        match kind {
            ValueKind::Int => token.parse::<i64>()
                .map(Value::Int)
                .map_err(|e| parse_err(e.to_string())),
            ValueKind::Float => parse_real(token)
                .map(Value::Float)
                .map_err(|e| parse_err(e.to_string())),
            ValueKind::Str => Ok(Value::Str(token.to_string())),
            ValueKind::Path => Ok(Value::Path(normalize_path(PathBuf::from(token)))),
            ValueKind::DateTime => DateTime::parse(token).map(Value::DateTime),
        }
    }

    /// Decode the value at the start of a line.
    ///
    /// Leading whitespace is ignored and anything after the value's token(s)
    /// is treated as annotation. A line with too few tokens is an error.
    pub fn decode_line(kind: ValueKind, line: &str) -> DResult<Self> {
        let n = kind.tokens();
        let tokens: Vec<&str> = line.split_whitespace().take(n).collect();
        if tokens.len() < n {
            return Err(Report::new(DescriptorError::Parse {
                s: line.trim_end().to_string(),
                t: kind,
                reason: "line does not contain a value".to_string()
            }));
        }
        Self::decode(kind, &tokens.join(" "))
    }

    /// Canonical text of the value, as substituted into a template line
    pub fn encode(&self) -> String {
        match self {
            Value::Int(i) => format_integer(*i),
            Value::Float(f) => format_real(*f),
            Value::Str(s) => s.clone(),
            Value::Path(p) => p.display().to_string(),
            Value::DateTime(dt) => dt.as_str().to_string(),
        }
    }

    /// Like [`Value::encode`], but refuse text that would read back as a
    /// different value: a string or path must be one non-empty token.
    pub fn token(&self) -> DResult<String> {
        let s = self.encode();
        let single = matches!(self, Value::Str(_) | Value::Path(_));
        if single && (s.is_empty() || s.contains(char::is_whitespace)) {
            return Err(Report::new(DescriptorError::serialization(format!(
                "{:?} is not a single token and would not read back unchanged", s
            ))));
        }
        Ok(s)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<PathBuf> for Value {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<DateTime> for Value {
    fn from(value: DateTime) -> Self {
        Self::DateTime(value)
    }
}

/// Read a real number, accepting Fortran `D` exponents (`1.5D-3`).
fn parse_real(s: &str) -> Result<f64, std::num::ParseFloatError> {
    if s.contains(['d', 'D']) {
        s.replace(['d', 'D'], "e").parse()
    } else {
        s.parse()
    }
}

/// Drop trailing slashes so that `a/b/` and `a/b` compare equal. The root stays `/`.
pub(crate) fn normalize_path(path: PathBuf) -> PathBuf {
    match path.to_str() {
        Some(s) if s.len() > 1 && s.ends_with('/') => {
            let trimmed = s.trim_end_matches('/');
            if trimmed.is_empty() {
                PathBuf::from("/")
            } else {
                PathBuf::from(trimmed)
            }
        },
        _ => path,
    }
}

/// A Rust type that can be stored in a typed field
pub trait FieldValue: Clone + Debug + PartialEq + Into<Value> {
    const KIND: ValueKind;

    /// Unwrap a value of the matching variant, giving the value back if it does not match.
    fn from_value(value: Value) -> Result<Self, Value>;

    /// Bring a value into its canonical form before it is stored.
    fn normalized(self) -> Self {
        self
    }

    fn try_from_value(value: Value) -> DResult<Self> {
        Self::from_value(value)
            .map(Self::normalized)
            .map_err(|v| Report::new(DescriptorError::TypeMismatch { expected: Self::KIND, found: v.kind() }))
    }

    fn decode(token: &str) -> DResult<Self> {
        Self::try_from_value(Value::decode(Self::KIND, token)?)
    }

    fn decode_line(line: &str) -> DResult<Self> {
        Value::decode_line(Self::KIND, line)
            .and_then(Self::try_from_value)
            .attach_printable_lazy(|| format!("line was: {:?}", line.trim_end()))
    }

    fn to_value(&self) -> Value {
        self.clone().into()
    }

    fn encode(&self) -> String {
        self.to_value().encode()
    }

    fn token(&self) -> DResult<String> {
        self.to_value().token()
    }
}

impl FieldValue for i64 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Int(i) => Ok(i),
            v => Err(v),
        }
    }
}

impl FieldValue for f64 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Int(i) => Ok(i as f64),
            v => Err(v),
        }
    }
}

impl FieldValue for String {
    const KIND: ValueKind = ValueKind::Str;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Str(s) => Ok(s),
            v => Err(v),
        }
    }
}

impl FieldValue for PathBuf {
    const KIND: ValueKind = ValueKind::Path;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::Path(p) => Ok(p),
            v => Err(v),
        }
    }

    fn normalized(self) -> Self {
        normalize_path(self)
    }
}

impl FieldValue for DateTime {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_value(value: Value) -> Result<Self, Value> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            v => Err(v),
        }
    }
}
