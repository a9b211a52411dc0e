//! Schema-directed bridge between the dynamic value tree and JSON, used by
//! the CLI to accept human-readable input and to render decoded output.

use crate::{
    codec::types,
    error::{
        encode_err,
        Result,
    },
    schema::Schema,
    value::Value,
};
use serde_json::{
    json,
    Value as Json,
};
use std::collections::BTreeMap;


/// Renders a decoded value as JSON. Bytes become arrays of numbers, complex
/// pairs become `[re, im]`, ranges become `{start, stop, step}` and schema
/// values render as their lookup record.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => json!(b),
        Value::Int(n) => int_to_json(*n),
        Value::Float(n) => json!(*n as f64),
        Value::Double(n) => json!(n),
        Value::Decimal(text) => json!(text),
        Value::Complex(re, im) => json!([*re as f64, *im as f64]),
        Value::DoubleComplex(re, im) => json!([re, im]),
        Value::Char(c) => json!(c.to_string()),
        Value::Str(s) => json!(s),
        Value::Bytes(bytes) => Json::Array(bytes.iter().map(|&b| json!(b)).collect()),
        Value::List(elems) | Value::Tuple(elems) | Value::Set(elems) => {
            Json::Array(elems.iter().map(value_to_json).collect())
        }
        Value::Map(map) => Json::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect(),
        ),
        Value::Range { start, stop, step } => json!({
            "start": int_to_json(*start),
            "stop": int_to_json(*stop),
            "step": int_to_json(*step),
        }),
        Value::Schema(schema) => schema_lookup_json(schema),
    }
}

fn int_to_json(n: i128) -> Json {
    if let Ok(n) = i64::try_from(n) {
        json!(n)
    } else if let Ok(n) = u64::try_from(n) {
        json!(n)
    } else {
        json!(n.to_string())
    }
}

/// Looks up inside a schema: the same record the `Type` codec writes, with
/// the kind name attached.
pub fn schema_lookup_json(schema: &Schema) -> Json {
    let record = match types::pack(schema) {
        Value::Map(map) => map,
        _ => BTreeMap::new(),
    };
    let mut out = serde_json::Map::new();
    out.insert("datatype".into(), json!(schema.kind_name()));
    for (key, value) in &record {
        out.insert(key.clone(), value_to_json(value));
    }
    Json::Object(out)
}

/// Builds a value from JSON under the direction of `schema`; the schema
/// decides whether a JSON number is an integer, a float or a decimal, and
/// which compound a JSON array is.
pub fn value_from_json(schema: &Schema, json: &Json) -> Result<Value> {
    let kind = schema.kind_name();
    let mismatch = || encode_err!(kind, "JSON {} does not fit this kind", json_shape(json));
    Ok(match schema {
        Schema::Null => match json {
            Json::Null => Value::Null,
            _ => return Err(mismatch()),
        },
        Schema::Bool => Value::Bool(json.as_bool().ok_or_else(mismatch)?),
        Schema::Int(_) => Value::Int(json_int(json).ok_or_else(mismatch)?),
        Schema::Float => Value::Float(json.as_f64().ok_or_else(mismatch)? as f32),
        Schema::Double | Schema::Number => Value::Double(json.as_f64().ok_or_else(mismatch)?),
        Schema::Decimal => match json {
            Json::String(s) => Value::Decimal(s.clone()),
            Json::Number(n) => Value::Decimal(n.to_string()),
            _ => return Err(mismatch()),
        },
        Schema::Complex => {
            let (re, im) = json_pair(json).ok_or_else(mismatch)?;
            Value::Complex(re as f32, im as f32)
        }
        Schema::DoubleComplex => {
            let (re, im) = json_pair(json).ok_or_else(mismatch)?;
            Value::DoubleComplex(re, im)
        }
        Schema::Char => {
            let s = json.as_str().ok_or_else(mismatch)?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => {
                    return Err(encode_err!(kind, "expected a single character, got {:?}", s))
                }
            }
        }
        Schema::Str => Value::Str(json.as_str().ok_or_else(mismatch)?.into()),
        Schema::Binary(_) => match json {
            Json::String(s) => Value::Bytes(s.clone().into_bytes()),
            Json::Array(elems) => {
                let mut bytes = Vec::with_capacity(elems.len());
                for elem in elems {
                    let b = elem
                        .as_u64()
                        .and_then(|n| u8::try_from(n).ok())
                        .ok_or_else(|| encode_err!(kind, "byte out of range in JSON array"))?;
                    bytes.push(b);
                }
                Value::Bytes(bytes)
            }
            _ => return Err(mismatch()),
        },
        Schema::Array(seq) => Value::List(json_seq(kind, seq, json)?),
        Schema::Tuple(seq) => Value::Tuple(json_seq(kind, seq, json)?),
        Schema::Set(seq) => {
            let elems = json.as_array().ok_or_else(mismatch)?;
            let elem_schema = Schema::Union(seq.items.clone());
            elems
                .iter()
                .map(|elem| value_from_json(&elem_schema, elem))
                .collect::<Result<Vec<_>>>()
                .map(Value::Set)?
        }
        Schema::Object(obj) => {
            let fields = json.as_object().ok_or_else(mismatch)?;
            let mut map = BTreeMap::new();
            for field in &obj.fields {
                let value = fields.get(&field.name).ok_or_else(|| {
                    encode_err!(kind, "missing field `{}` in JSON input", field.name)
                })?;
                map.insert(field.name.clone(), value_from_json(&field.inner, value)?);
            }
            Value::Map(map)
        }
        Schema::Optional(variants) => match json {
            Json::Null => Value::Null,
            _ => first_fit(kind, variants, json)?,
        },
        Schema::Union(variants) => first_fit(kind, variants, json)?,
        Schema::Enum(_) => Value::Str(json.as_str().ok_or_else(mismatch)?.into()),
        Schema::Range(_) => {
            let fields = json.as_object().ok_or_else(mismatch)?;
            let bound = |name: &str| {
                fields
                    .get(name)
                    .and_then(json_int)
                    .ok_or_else(|| encode_err!(kind, "missing integer `{}` in JSON range", name))
            };
            Value::Range {
                start: bound("start")?,
                stop: bound("stop")?,
                step: bound("step")?,
            }
        }
        Schema::Type => {
            return Err(encode_err!(kind, "schema values cannot be built from JSON"))
        }
    })
}

fn json_int(json: &Json) -> Option<i128> {
    if let Some(n) = json.as_i64() {
        Some(n as i128)
    } else {
        json.as_u64().map(|n| n as i128)
    }
}

fn json_pair(json: &Json) -> Option<(f64, f64)> {
    match json.as_array()?.as_slice() {
        [re, im] => Some((re.as_f64()?, im.as_f64()?)),
        _ => None,
    }
}

fn json_seq(
    kind: &'static str,
    seq: &crate::schema::SeqSchema,
    json: &Json,
) -> Result<Vec<Value>> {
    let elems = json
        .as_array()
        .ok_or_else(|| encode_err!(kind, "JSON {} does not fit this kind", json_shape(json)))?;
    if seq.is_homogenous() {
        elems
            .iter()
            .map(|elem| value_from_json(&seq.items[0], elem))
            .collect()
    } else {
        if elems.len() != seq.items.len() {
            return Err(encode_err!(
                kind,
                "{} JSON elements do not match the {} declared item schemas",
                elems.len(),
                seq.items.len(),
            ));
        }
        seq.items
            .iter()
            .zip(elems)
            .map(|(item, elem)| value_from_json(item, elem))
            .collect()
    }
}

fn first_fit(kind: &'static str, variants: &[Schema], json: &Json) -> Result<Value> {
    for variant in variants {
        if let Ok(value) = value_from_json(variant, json) {
            return Ok(value);
        }
    }
    Err(encode_err!(kind, "JSON {} fits none of the alternatives", json_shape(json)))
}

fn json_shape(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

/// Serializes JSON for the CLI: `indent` of `None` minifies, `ascii`
/// rewrites non-ASCII characters as `\u` escapes.
pub fn to_json_string(json: &Json, indent: Option<usize>, ascii: bool) -> String {
    let rendered = match indent {
        None => serde_json::to_string(json),
        Some(width) => {
            let pad = b" ".repeat(width);
            let formatter = serde_json::ser::PrettyFormatter::with_indent(&pad);
            let mut out = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
            serde::Serialize::serialize(json, &mut ser)
                .map(|()| String::from_utf8(out).unwrap_or_default())
        }
    }
    .unwrap_or_default();
    if ascii {
        ascii_escape(&rendered)
    } else {
        rendered
    }
}

fn ascii_escape(rendered: &str) -> String {
    let mut out = String::with_capacity(rendered.len());
    for c in rendered.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
