//! Cain is a schema-driven binary interchange format built around one idea:
//! anything the schema already implies never reaches the wire. The writer
//! and the reader agree on a schema tree out-of-band, and a message carries
//! only the residual information: payload bytes, presence bits, union
//! discriminants and the repetition table that factors out equal encoded
//! payloads inside ordered compounds. For small, deeply-nested records this
//! routinely beats formats that re-state their structure in every message.
//!
//! Typical usage pattern:
//!
//! - build a [`Schema`] once (the [`schema!`] macro is the comfortable way)
//!   and share it; schema trees are immutable and thread-safe
//! - encode with [`dumps`] (or [`dump`] into a writer), passing a [`Value`]
//!   tree that mirrors the schema
//! - decode with [`loads`] (or [`load`] from a reader); pass the schema, or
//!   pass none and let the reader pull it from a self-describing header
//!   written with `include_header`
//! - [`encode_schema`]/[`decode_schema`] move schema trees themselves as
//!   Cain data, which is what the header framing is made of
//!
//! The data model supports:
//!
//! - integers of any byte width (big-endian two's-complement, width chosen
//!   by the schema), floats and doubles (little-endian), textual decimals,
//!   complex pairs
//! - booleans, single code points, NUL-terminated strings, length-prefixed
//!   binary blobs
//! - arrays, tuples and sets with byte-level deduplication of repeated
//!   elements
//! - keyed records whose field names stay off the wire
//! - optionals, unions, string enums, integer ranges
//! - schemas themselves, through the reflective `Type` kind

pub mod error;
pub mod schema;
pub mod value;

mod codec;
mod json;

pub use crate::{
    codec::{
        decode,
        encode,
        recommended_width,
        types::TYPES_REGISTRY,
        IntWidth,
    },
    error::{
        Error,
        Result,
    },
    json::{
        schema_lookup_json,
        to_json_string,
        value_from_json,
        value_to_json,
    },
    schema::{
        IntFlavor,
        IntSchema,
        Modifier,
        ObjectField,
        ObjectSchema,
        Schema,
        SeqSchema,
    },
    value::Value,
};

use std::io::{
    Read,
    Write,
};
use tracing::debug;


/// Encodes `value` following `schema`. With `include_header` the result is
/// framed as a two-blob tuple of (Type-encoded schema, payload), which is
/// what lets [`loads`] decode it without being told the schema.
pub fn dumps(value: &Value, schema: &Schema, include_header: bool) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    codec::encode(schema, value, &mut payload)?;
    if !include_header {
        return Ok(payload);
    }
    let header = encode_schema(schema)?;
    debug!(header = header.len(), payload = payload.len(), "framing header");
    let mut framed = Vec::new();
    codec::encode(
        &header_framing(),
        &Value::Tuple(vec![Value::Bytes(header), Value::Bytes(payload)]),
        &mut framed,
    )?;
    Ok(framed)
}

/// [`dumps`] straight into a byte sink.
pub fn dump<W: Write>(
    value: &Value,
    sink: &mut W,
    schema: &Schema,
    include_header: bool,
) -> Result<()> {
    let bytes = dumps(value, schema, include_header)?;
    sink.write_all(&bytes)?;
    Ok(())
}

/// Decodes `bytes` following `schema`; with no schema the input must carry
/// the header framing written by [`dumps`] with `include_header`. Trailing
/// bytes after the value are ignored.
pub fn loads(bytes: &[u8], schema: Option<&Schema>) -> Result<Value> {
    match schema {
        Some(schema) => {
            let (value, rest) = codec::decode(schema, bytes)?;
            if !rest.is_empty() {
                debug!(trailing = rest.len(), "ignoring bytes after the value");
            }
            Ok(value)
        }
        None => {
            let (framed, _) = codec::decode(&header_framing(), bytes)?;
            let (header, payload) = match framed {
                Value::Tuple(blobs) => match <[Value; 2]>::try_from(blobs) {
                    Ok([Value::Bytes(header), Value::Bytes(payload)]) => (header, payload),
                    _ => {
                        return Err(error::decode_err!("Tuple", "header framing is not two blobs"))
                    }
                },
                _ => return Err(error::decode_err!("Tuple", "header framing is not a tuple")),
            };
            let schema = decode_schema(&header)?;
            debug!(schema = schema.kind_name(), "decoding through embedded header");
            loads(&payload, Some(&schema))
        }
    }
}

/// [`loads`] from a byte source, read to its end.
pub fn load<R: Read>(source: &mut R, schema: Option<&Schema>) -> Result<Value> {
    let mut bytes = Vec::new();
    source.read_to_end(&mut bytes)?;
    loads(&bytes, schema)
}

/// Encodes a schema tree as ordinary Cain data via the `Type` codec.
pub fn encode_schema(schema: &Schema) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    codec::types::encode_node(schema, &mut out)?;
    Ok(out)
}

/// Inverse of [`encode_schema`].
pub fn decode_schema(bytes: &[u8]) -> Result<Schema> {
    let (value, _) = codec::decode(&Schema::Type, bytes)?;
    match value {
        Value::Schema(schema) => Ok(*schema),
        _ => Err(error::decode_err!("Type", "schema bytes did not decode to a schema")),
    }
}

fn header_framing() -> Schema {
    Schema::Tuple(SeqSchema::new(vec![
        Schema::Binary(Vec::new()),
        Schema::Binary(Vec::new()),
    ]))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_matches_the_documented_object_bytes() {
        let schema = schema!({ (a: int) });
        let bytes = dumps(&map_value! { a: 2i64 }, &schema, false).unwrap();
        assert_eq!(bytes, [0x00, 0x00, 0x02]);
    }

    #[test]
    fn header_round_trip_needs_no_schema() {
        let schema = schema!([(str), ({ (bar: tuple((str), (option(str)), (float), (int))) })]);
        let value = Value::List(vec![
            Value::Str("foo".into()),
            map_value! {
                bar: Value::Tuple(vec![
                    Value::Str("baz".into()),
                    Value::Null,
                    Value::Float(1.0),
                    Value::Int(2),
                ])
            },
        ]);
        let framed = dumps(&value, &schema, true).unwrap();
        assert_eq!(loads(&framed, None).unwrap(), value);
    }

    #[test]
    fn dump_and_load_move_through_io() {
        let schema = schema!(str);
        let mut sink = Vec::new();
        dump(&Value::Str("hello".into()), &mut sink, &schema, false).unwrap();
        assert_eq!(sink, b"hello\0");
        let value = load(&mut sink.as_slice(), Some(&schema)).unwrap();
        assert_eq!(value, Value::Str("hello".into()));
    }

    #[test]
    fn schema_trees_survive_their_own_codec() {
        let schema = schema!({ (name: str), (scores: [(int[short])]), (tag: option(str)) });
        let bytes = encode_schema(&schema).unwrap();
        assert_eq!(decode_schema(&bytes).unwrap(), schema);
    }
}
