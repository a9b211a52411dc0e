//! Dynamic representation of data within the serialized data model,
//! analogous to `serde_json::Value`.

use crate::schema::Schema;
use std::collections::BTreeMap;


#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub enum Value {
    Null,
    Bool(bool),
    /// Any integer flavor; the schema decides width and sign on the wire.
    Int(i128),
    Float(f32),
    Double(f64),
    /// Textual decimal, kept exact rather than rounded through a float.
    Decimal(String),
    Complex(f32, f32),
    DoubleComplex(f64, f64),
    Char(char),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Tuple(Vec<Value>),
    /// Unordered collection; the stored order is the encoder's wire order.
    Set(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Range { start: i128, stop: i128, step: i128 },
    /// A schema as a value, consumed and produced by the `Type` codec.
    Schema(Box<Schema>),
}

impl Value {
    /// Short name of the value's own shape, for error messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::Complex(..) => "complex",
            Value::DoubleComplex(..) => "double complex",
            Value::Char(_) => "char",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Range { .. } => "range",
            Value::Schema(_) => "schema",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i128> for Value {
    fn from(n: i128) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n as i128)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

impl From<Schema> for Value {
    fn from(s: Schema) -> Self {
        Value::Schema(Box::new(s))
    }
}

/// Map-literal sugar used across the tests.
#[macro_export]
macro_rules! map_value {
    ($($key:ident: $val:expr),*$(,)?)=>{
        $crate::value::Value::Map(::std::collections::BTreeMap::from([
            $( (::std::string::String::from(::core::stringify!($key)), $crate::value::Value::from($val)), )*
        ]))
    };
}

pub use map_value;
