//! Tagged values produced by the row scan step.
//!
//! The driver layer decodes every cell into one of these variants so
//! that the binary-to-text normalization is an explicit conversion
//! rather than a property of the serializer.

use serde_json::{Number, Value};

/// A single scanned cell from a query result.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer (up to i64).
    Int(i64),
    /// Unsigned integer (up to u64).
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Character data.
    Text(String),
    /// Variable-length binary data.
    Bytes(Vec<u8>),
}

impl ScanValue {
    /// Converts the scanned value into its transport JSON form.
    ///
    /// Binary payloads are transcoded to text byte-for-byte (invalid
    /// UTF-8 sequences become replacement characters); every other
    /// variant maps onto the corresponding JSON scalar. A float that
    /// JSON cannot represent (NaN, infinity) becomes null.
    pub fn into_json(self) -> Value {
        match self {
            ScanValue::Null => Value::Null,
            ScanValue::Bool(b) => Value::Bool(b),
            ScanValue::Int(i) => Value::Number(i.into()),
            ScanValue::UInt(u) => Value::Number(u.into()),
            ScanValue::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
            ScanValue::Text(s) => Value::String(s),
            ScanValue::Bytes(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
        }
    }
}
