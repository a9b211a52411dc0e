//! Keyed records. Declared fields are sorted by name and the resulting
//! positions feed the repetition table exactly like a fixed-arity sequence,
//! so field names never reach the wire.

use crate::{
    codec::seq::{
        arity_width,
        decode_positions,
        encode_positions,
    },
    error::{
        encode_err,
        ensure_encode,
        Result,
    },
    schema::ObjectSchema,
    value::Value,
};
use std::collections::BTreeMap;


pub(crate) fn encode(obj: &ObjectSchema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let map = match value {
        Value::Map(map) => map,
        other => {
            return Err(encode_err!("Object", "expected a map, got {}", other.shape_name()))
        }
    };
    let fields = obj.sorted_fields();
    check_unique(&fields)?;

    let mut schemas = Vec::with_capacity(fields.len());
    let mut elems = Vec::with_capacity(fields.len());
    for field in &fields {
        let elem = map.get(&field.name).ok_or_else(|| {
            encode_err!("Object", "missing field `{}`", field.name)
        })?;
        schemas.push(&field.inner);
        elems.push(elem);
    }

    let ix = arity_width("Object", fields.len(), true)?;
    encode_positions("Object", &schemas, &elems, ix, out)
}

pub(crate) fn decode<'a>(obj: &ObjectSchema, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    let fields = obj.sorted_fields();
    let schemas = fields.iter().map(|f| &f.inner).collect::<Vec<_>>();
    let ix = arity_width("Object", fields.len(), false)?;
    let (elems, rest) = decode_positions("Object", &schemas, ix, input)?;

    let map = fields
        .iter()
        .map(|f| f.name.clone())
        .zip(elems)
        .collect::<BTreeMap<_, _>>();
    Ok((Value::Map(map), rest))
}

fn check_unique(fields: &[&crate::schema::ObjectField]) -> Result<()> {
    for pair in fields.windows(2) {
        ensure_encode!(
            pair[0].name != pair[1].name,
            "Object",
            "duplicate field `{}`",
            pair[0].name,
        );
    }
    Ok(())
}
