//! The schema-directed codec: one module per codec family and the
//! kind-dispatch that drives recursion.
//!
//! Every decoder consumes bytes off the front of its input and hands back
//! the unconsumed suffix, so recursion is stack-bounded and the caller can
//! keep decoding after any value.

pub(crate) mod choice;
pub(crate) mod enums;
pub(crate) mod num;
pub(crate) mod object;
pub(crate) mod primitive;
pub(crate) mod range;
pub(crate) mod seq;
pub(crate) mod types;

pub use num::{
    recommended_width,
    IntWidth,
};

use crate::{
    error::{
        decode_err,
        Result,
    },
    schema::Schema,
    value::Value,
};

/// Encodes `value` under `schema`, appending to `out`.
///
/// On error, `out` is rolled back to its length at entry, so the caller
/// never observes a partial value.
pub fn encode(schema: &Schema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let mark = out.len();
    let result = encode_value(schema, value, out);
    if result.is_err() {
        out.truncate(mark);
    }
    result
}

fn encode_value(schema: &Schema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match schema {
        Schema::Null => primitive::encode_null(value, out),
        Schema::Bool => primitive::encode_bool(value, out),
        Schema::Char => primitive::encode_char(value, out),
        Schema::Str => primitive::encode_str(value, out),
        Schema::Binary(mods) => primitive::encode_binary(mods, value, out),
        Schema::Number => num::encode_number(value, out),
        Schema::Float => num::encode_float(value, out),
        Schema::Double => num::encode_double(value, out),
        Schema::Decimal => primitive::encode_decimal(value, out),
        Schema::Complex => num::encode_complex(value, out),
        Schema::DoubleComplex => num::encode_double_complex(value, out),
        Schema::Int(int) => num::encode_int(int, value, out),
        Schema::Array(seq) => seq::encode_array(seq, value, out),
        Schema::Tuple(seq) => seq::encode_tuple(seq, value, out),
        Schema::Set(seq) => seq::encode_set(seq, value, out),
        Schema::Object(obj) => object::encode(obj, value, out),
        Schema::Optional(variants) => choice::encode_optional(variants, value, out),
        Schema::Union(variants) => choice::encode_union(variants, value, out),
        Schema::Enum(literals) => enums::encode(literals, value, out),
        Schema::Range(mods) => range::encode(mods, value, out),
        Schema::Type => types::encode(value, out),
    }
}

/// Decodes one `schema`-shaped value off the front of `input`, returning it
/// with the unconsumed suffix.
pub fn decode<'a>(schema: &Schema, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    match schema {
        Schema::Null => Ok((Value::Null, input)),
        Schema::Bool => primitive::decode_bool(input),
        Schema::Char => primitive::decode_char(input),
        Schema::Str => primitive::decode_str(input),
        Schema::Binary(mods) => primitive::decode_binary(mods, input),
        Schema::Number => num::decode_number(input),
        Schema::Float => num::decode_float(input),
        Schema::Double => num::decode_double(input),
        Schema::Decimal => primitive::decode_decimal(input),
        Schema::Complex => num::decode_complex(input),
        Schema::DoubleComplex => num::decode_double_complex(input),
        Schema::Int(int) => num::decode_int(int, input),
        Schema::Array(seq) => seq::decode_array(seq, input),
        Schema::Tuple(seq) => seq::decode_tuple(seq, input),
        Schema::Set(seq) => seq::decode_set(seq, input),
        Schema::Object(obj) => object::decode(obj, input),
        Schema::Optional(variants) => choice::decode_optional(variants, input),
        Schema::Union(variants) => choice::decode_union(variants, input),
        Schema::Enum(literals) => enums::decode(literals, input),
        Schema::Range(mods) => range::decode(mods, input),
        Schema::Type => types::decode(input),
    }
}

/// Splits `n` bytes off the front of `input`, or fails with the schema kind
/// that ran dry.
pub(crate) fn take<'a>(
    kind: &'static str,
    input: &'a [u8],
    n: usize,
) -> Result<(&'a [u8], &'a [u8])> {
    if input.len() < n {
        Err(decode_err!(
            kind,
            "input ends after {} of {} needed bytes",
            input.len(),
            n,
        ))
    } else {
        Ok(input.split_at(n))
    }
}
