//! Path addressing for decoded records.
//!
//! Rules refer to fields with dotted paths such as `par_udp.par_val[0]` or
//! `setup_n_lin.limit_values[2].hi_limit`. A path is parsed once into a
//! [`FieldPath`] and walked against any record implementing [`Navigate`],
//! which is an explicit per-record field table rather than runtime
//! reflection.

use crate::{Error, Result};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A scalar read from, or written to, a record field.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Numeric view of the value; text has none.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(value) => Some(*value as f64),
            Value::Float(value) => Some(*value),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }
}

// Integers and floats compare numerically with each other, text only with
// text. Everything else is unordered and unequal.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(lhs), Value::Int(rhs)) => Some(lhs.cmp(rhs)),
            (Value::Text(lhs), Value::Text(rhs)) => Some(lhs.cmp(rhs)),
            (lhs, rhs) => lhs.as_f64()?.partial_cmp(&rhs.as_f64()?),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(text) => write!(f, "{text}"),
        }
    }
}

macro_rules! impl_value_from_int {
    ($($int:ty),*) => {
        $(
            impl From<$int> for Value {
                fn from(value: $int) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_value_from_int!(u8, i16, u16, i32, u32, i64);

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

/// One step of a path: a field name with an optional sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub index: Option<usize>,
}

impl Segment {
    pub fn new(name: impl Into<String>, index: Option<usize>) -> Self {
        Segment {
            name: name.into(),
            index,
        }
    }

    fn parse(part: &str) -> Option<Self> {
        let (name, index) = match part.split_once('[') {
            Some((name, rest)) => {
                let index = rest.strip_suffix(']')?.trim().parse().ok()?;
                (name, Some(index))
            }
            None => (part, None),
        };
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        valid.then(|| Segment {
            name: name.to_string(),
            index,
        })
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}[{index}]", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A parsed dotted path, e.g. `par_udp.par_val[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    fn unresolved(&self, reason: impl Into<String>) -> Error {
        Error::PathResolution {
            path: self.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for FieldPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let segments = s
            .trim()
            .split('.')
            .map(Segment::parse)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::InvalidPath(s.to_string()))?;
        Ok(FieldPath { segments })
    }
}

impl FromIterator<Segment> for FieldPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        FieldPath {
            segments: iter.into_iter().collect(),
        }
    }
}

impl TryFrom<String> for FieldPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Read access to one segment of a record.
pub enum Field<'a> {
    Record(&'a dyn Navigate),
    Value(Value),
}

/// Write access to one segment of a record.
pub enum FieldMut<'a> {
    Record(&'a mut dyn Navigate),
    Slot(&'a mut dyn Slot),
    /// The field exists but rules may not write it.
    ReadOnly,
}

/// A leaf that accepts assignments from rules.
pub trait Slot {
    /// Stores `value`, or fails with [`Error::ValueRejected`] if the slot
    /// cannot hold it.
    fn assign(&mut self, value: Value) -> Result<()>;
}

/// The field table of a record.
///
/// Implementors return `None` for unknown names, for an index on a
/// non-sequence field, for a missing index on a sequence field and for an
/// index out of bounds.
pub trait Navigate {
    fn field(&self, segment: &Segment) -> Option<Field<'_>>;

    fn field_mut(&mut self, segment: &Segment) -> Option<FieldMut<'_>>;
}

/// Picks `items[index]` when the segment carries an in-bounds index.
pub(crate) fn indexed<'a, T>(items: &'a [T], segment: &Segment) -> Option<&'a T> {
    items.get(segment.index?)
}

pub(crate) fn indexed_mut<'a, T>(items: &'a mut [T], segment: &Segment) -> Option<&'a mut T> {
    items.get_mut(segment.index?)
}

/// Reads the value at `path`.
pub fn get(target: &dyn Navigate, path: &FieldPath) -> Result<Value> {
    let (last, parents) = path
        .segments
        .split_last()
        .ok_or_else(|| path.unresolved("empty path"))?;

    let mut current = target;
    for segment in parents {
        current = match current.field(segment) {
            Some(Field::Record(record)) => record,
            Some(Field::Value(_)) => {
                return Err(path.unresolved(format!("'{segment}' is not a record")))
            }
            None => return Err(path.unresolved(format!("no field '{segment}'"))),
        };
    }

    match current.field(last) {
        Some(Field::Value(value)) => Ok(value),
        Some(Field::Record(_)) => Err(path.unresolved(format!("'{last}' is a record"))),
        None => Err(path.unresolved(format!("no field '{last}'"))),
    }
}

/// Writes `value` into the slot at `path`.
pub fn set(target: &mut dyn Navigate, path: &FieldPath, value: Value) -> Result<()> {
    let (last, parents) = path
        .segments
        .split_last()
        .ok_or_else(|| path.unresolved("empty path"))?;

    let mut current: &mut dyn Navigate = target;
    for segment in parents {
        current = match current.field_mut(segment) {
            Some(FieldMut::Record(record)) => record,
            Some(_) => return Err(path.unresolved(format!("'{segment}' is not a record"))),
            None => return Err(path.unresolved(format!("no field '{segment}'"))),
        };
    }

    match current.field_mut(last) {
        Some(FieldMut::Slot(slot)) => slot.assign(value),
        Some(FieldMut::ReadOnly) => Err(path.unresolved(format!("'{last}' is read-only"))),
        Some(FieldMut::Record(_)) => Err(path.unresolved(format!("'{last}' is a record"))),
        None => Err(path.unresolved(format!("no field '{last}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parse_dotted_and_indexed() {
        let path: FieldPath = "par_udp.par_val[2]".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment {
                    name: "par_udp".into(),
                    index: None
                },
                Segment {
                    name: "par_val".into(),
                    index: Some(2)
                },
            ]
        );
        assert_eq!(path.to_string(), "par_udp.par_val[2]");
    }

    #[test]
    fn parse_rejects_malformed() {
        for bad in ["", "a..b", "par_val[", "par_val[x]", "par_val[0", "[1]", "a.b c"] {
            assert_matches!(bad.parse::<FieldPath>(), Err(Error::InvalidPath(..)), "{bad}");
        }
    }

    #[test]
    fn value_comparison() {
        assert_eq!(Value::Int(58), Value::Float(58.0));
        assert_ne!(Value::Int(58), Value::from("58"));
        assert!(Value::Int(3) < Value::Float(3.5));
        assert!(Value::from("HR") > Value::from("DIABP"));
        assert_eq!(Value::from("HR").partial_cmp(&Value::Int(1)), None);
    }
}
