//! The ordered compounds (Array, Tuple, Set) and the repetition table they
//! share.
//!
//! Every position is encoded independently; equal payload byte strings are
//! then factored into a prefixed repetition table when that actually
//! shrinks the output:
//!
//! ```text
//! [N]  R   { k  pos_1 .. pos_k  payload } * R   uncovered payloads ...
//! ```
//!
//! `N` (homogenous arrays only) and every other frame integer use the index
//! width `Ix`: the full unsigned integer with the compound's modifiers for
//! homogenous arrays, `recommended_width(arity)` for fixed-arity forms.

use crate::{
    codec::{
        decode,
        encode,
        num::{
            read_be_uint,
            recommended_width,
            resolved_int,
            write_be_uint,
            IntWidth,
            MAX_INT_BYTES,
        },
    },
    error::{
        decode_err,
        encode_err,
        ensure_decode,
        ensure_encode,
        Result,
    },
    schema::{
        IntFlavor,
        IntSchema,
        Modifier,
        Schema,
        SeqSchema,
    },
    value::Value,
};
use std::collections::HashMap;


pub(crate) fn encode_array(seq: &SeqSchema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::List(elems) => encode_seq("Array", seq, elems, out),
        other => Err(encode_err!("Array", "expected a list, got {}", other.shape_name())),
    }
}

pub(crate) fn decode_array<'a>(seq: &SeqSchema, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    let (elems, rest) = decode_seq("Array", seq, input)?;
    Ok((Value::List(elems), rest))
}

pub(crate) fn encode_tuple(seq: &SeqSchema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Tuple(elems) => encode_seq("Tuple", seq, elems, out),
        other => Err(encode_err!("Tuple", "expected a tuple, got {}", other.shape_name())),
    }
}

pub(crate) fn decode_tuple<'a>(seq: &SeqSchema, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    let (elems, rest) = decode_seq("Tuple", seq, input)?;
    Ok((Value::Tuple(elems), rest))
}

/// Sets have no positional typing, so the declared item schemas collapse
/// into one `Union` and the whole collection rides the homogenous path
/// (a single-item `Union` stays a zero-overhead passthrough). Wire order
/// is the caller's iteration order.
pub(crate) fn encode_set(seq: &SeqSchema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let elems = match value {
        Value::Set(elems) => elems,
        other => {
            return Err(encode_err!("Set", "expected a set, got {}", other.shape_name()))
        }
    };
    let elem_schema = Schema::Union(seq.items.clone());
    encode_homogenous("Set", &elem_schema, &seq.modifiers, elems, out)
}

pub(crate) fn decode_set<'a>(seq: &SeqSchema, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    let elem_schema = Schema::Union(seq.items.clone());
    let (elems, rest) = decode_homogenous("Set", &elem_schema, &seq.modifiers, input)?;
    Ok((Value::Set(elems), rest))
}

fn encode_seq(
    kind: &'static str,
    seq: &SeqSchema,
    elems: &[Value],
    out: &mut Vec<u8>,
) -> Result<()> {
    if seq.is_homogenous() {
        encode_homogenous(kind, &seq.items[0], &seq.modifiers, elems, out)
    } else {
        ensure_encode!(
            elems.len() == seq.items.len(),
            kind,
            "{} elements do not match the {} declared item schemas",
            elems.len(),
            seq.items.len(),
        );
        let ix = arity_width(kind, seq.items.len(), true)?;
        let schemas = seq.items.iter().collect::<Vec<_>>();
        let elems = elems.iter().collect::<Vec<_>>();
        encode_positions(kind, &schemas, &elems, ix, out)
    }
}

fn decode_seq<'a>(
    kind: &'static str,
    seq: &SeqSchema,
    input: &'a [u8],
) -> Result<(Vec<Value>, &'a [u8])> {
    if seq.is_homogenous() {
        decode_homogenous(kind, &seq.items[0], &seq.modifiers, input)
    } else {
        let ix = arity_width(kind, seq.items.len(), false)?;
        let schemas = seq.items.iter().collect::<Vec<_>>();
        decode_positions(kind, &schemas, ix, input)
    }
}

fn encode_homogenous(
    kind: &'static str,
    elem_schema: &Schema,
    modifiers: &[Modifier],
    elems: &[Value],
    out: &mut Vec<u8>,
) -> Result<()> {
    let ix = homogenous_width(kind, modifiers, true)?;
    ensure_encode!(
        uint_fits(elems.len() as u128, ix.bytes),
        kind,
        "length {} exceeds a {}-byte prefix",
        elems.len(),
        ix.bytes,
    );
    write_be_uint(out, elems.len() as u128, ix.bytes);
    let schemas = vec![elem_schema; elems.len()];
    let elems = elems.iter().collect::<Vec<_>>();
    encode_positions(kind, &schemas, &elems, ix, out)
}

fn decode_homogenous<'a>(
    kind: &'static str,
    elem_schema: &Schema,
    modifiers: &[Modifier],
    input: &'a [u8],
) -> Result<(Vec<Value>, &'a [u8])> {
    let ix = homogenous_width(kind, modifiers, false)?;
    let (len, rest) = read_be_uint(kind, input, ix.bytes)?;
    let len = usize::try_from(len)
        .map_err(|_| decode_err!(kind, "length {} out of range", len))?;
    // TODO: cap pre-allocation for hostile length prefixes
    let schemas = vec![elem_schema; len];
    decode_positions(kind, &schemas, ix, rest)
}

/// The index integer of the homogenous form: a full unsigned Int carrying
/// the compound's own modifiers.
fn homogenous_width(
    kind: &'static str,
    modifiers: &[Modifier],
    encoding: bool,
) -> Result<IntWidth> {
    let unsigned = IntSchema {
        flavor: IntFlavor::Unsigned,
        modifiers: modifiers.to_vec(),
    };
    resolved_int(&unsigned).ok_or_else(|| {
        if encoding {
            encode_err!(kind, "modifiers leave no valid length width")
        } else {
            decode_err!(kind, "modifiers leave no valid length width")
        }
    })
}

/// The index integer of the fixed-arity forms, sized to the arity.
pub(crate) fn arity_width(kind: &'static str, arity: usize, encoding: bool) -> Result<IntWidth> {
    recommended_width(arity as i128, false).ok_or_else(|| {
        if encoding {
            encode_err!(kind, "arity {} exceeds 64 bits", arity)
        } else {
            decode_err!(kind, "arity {} exceeds 64 bits", arity)
        }
    })
}

fn uint_fits(n: u128, bytes: usize) -> bool {
    bytes >= MAX_INT_BYTES || n < (1u128 << (bytes * 8))
}

/// Encodes `elems` position by position, factoring equal payloads into the
/// repetition table. A repeated payload is only worth factoring when it
/// occurs at two or more positions and is longer than the index integer.
pub(crate) fn encode_positions(
    kind: &'static str,
    schemas: &[&Schema],
    elems: &[&Value],
    ix: IntWidth,
    out: &mut Vec<u8>,
) -> Result<()> {
    debug_assert_eq!(schemas.len(), elems.len());

    let mut payloads = Vec::with_capacity(elems.len());
    for (schema, elem) in schemas.iter().zip(elems) {
        let mut payload = Vec::new();
        encode(schema, elem, &mut payload)?;
        payloads.push(payload);
    }

    // positions grouped by payload bytes, in first-occurrence order
    let mut groups: Vec<(&[u8], Vec<usize>)> = Vec::new();
    let mut group_of: HashMap<&[u8], usize> = HashMap::new();
    for (index, payload) in payloads.iter().enumerate() {
        match group_of.get(payload.as_slice()) {
            Some(&g) => groups[g].1.push(index),
            None => {
                group_of.insert(payload, groups.len());
                groups.push((payload, vec![index]));
            }
        }
    }

    let worthwhile = groups
        .iter()
        .filter(|(payload, positions)| positions.len() >= 2 && payload.len() > ix.bytes)
        .collect::<Vec<_>>();

    write_be_uint(out, worthwhile.len() as u128, ix.bytes);
    let mut covered = vec![false; elems.len()];
    for (payload, positions) in &worthwhile {
        write_be_uint(out, positions.len() as u128, ix.bytes);
        for &position in positions {
            write_be_uint(out, position as u128, ix.bytes);
            covered[position] = true;
        }
        out.extend_from_slice(payload);
    }

    for (index, payload) in payloads.iter().enumerate() {
        if !covered[index] {
            out.extend_from_slice(payload);
        }
    }
    Ok(())
}

/// Reverses `encode_positions`. The payload of a repetition block is decoded
/// through the codec at its first index, which also decides how many bytes
/// the block consumes; the other indices re-decode the same bytes through
/// their own codecs.
pub(crate) fn decode_positions<'a>(
    kind: &'static str,
    schemas: &[&Schema],
    ix: IntWidth,
    input: &'a [u8],
) -> Result<(Vec<Value>, &'a [u8])> {
    let n = schemas.len();
    let mut slots: Vec<Option<Value>> = vec![None; n];

    let (repeats, mut rest) = read_be_uint(kind, input, ix.bytes)?;
    for _ in 0..repeats {
        let (count, after_count) = read_be_uint(kind, rest, ix.bytes)?;
        ensure_decode!(count > 0, kind, "repetition block with zero occurrences");
        let count = usize::try_from(count)
            .map_err(|_| decode_err!(kind, "occurrence count {} out of range", count))?;

        rest = after_count;
        let mut positions = Vec::with_capacity(count);
        for _ in 0..count {
            let (position, after_index) = read_be_uint(kind, rest, ix.bytes)?;
            let position = usize::try_from(position).ok().filter(|&p| p < n).ok_or_else(
                || decode_err!(kind, "repetition index {} out of range for {} positions", position, n),
            )?;
            positions.push(position);
            rest = after_index;
        }

        let first = positions[0];
        let (value, after_payload) = decode(schemas[first], rest)?;
        slots[first] = Some(value);
        for &position in &positions[1..] {
            let (value, _) = decode(schemas[position], rest)?;
            slots[position] = Some(value);
        }
        rest = after_payload;
    }

    let mut elems = Vec::with_capacity(n);
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(value) => elems.push(value),
            None => {
                let (value, after) = decode(schemas[index], rest)?;
                elems.push(value);
                rest = after;
            }
        }
    }
    Ok((elems, rest))
}
