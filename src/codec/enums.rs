//! Enumerations of string literals. The literal list is sorted before use,
//! so the wire index never depends on declaration order.

use crate::{
    codec::num::{
        read_be_uint,
        recommended_width,
        write_be_uint,
    },
    error::{
        decode_err,
        encode_err,
        ensure_encode,
        Result,
    },
    value::Value,
};


pub(crate) fn encode(literals: &[String], value: &Value, out: &mut Vec<u8>) -> Result<()> {
    ensure_encode!(!literals.is_empty(), "Enum", "no literals declared");
    let sorted = sorted(literals);
    let ix = recommended_width(sorted.len() as i128, false)
        .ok_or_else(|| encode_err!("Enum", "{} literals exceed 64 bits", sorted.len()))?;
    let text = match value {
        Value::Str(text) => text,
        other => {
            return Err(encode_err!("Enum", "expected a literal, got {}", other.shape_name()))
        }
    };
    let index = sorted
        .iter()
        .position(|lit| *lit == text)
        .ok_or_else(|| encode_err!("Enum", "{:?} is not one of the declared literals", text))?;
    write_be_uint(out, index as u128, ix.bytes);
    Ok(())
}

pub(crate) fn decode<'a>(literals: &[String], input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    if literals.is_empty() {
        return Err(decode_err!("Enum", "no literals declared"));
    }
    let sorted = sorted(literals);
    let ix = recommended_width(sorted.len() as i128, false)
        .ok_or_else(|| decode_err!("Enum", "{} literals exceed 64 bits", sorted.len()))?;
    let (index, rest) = read_be_uint("Enum", input, ix.bytes)?;
    let literal = usize::try_from(index).ok().and_then(|i| sorted.get(i)).ok_or_else(
        || decode_err!("Enum", "index {} out of range for {} literals", index, sorted.len()),
    )?;
    Ok((Value::Str((*literal).clone()), rest))
}

fn sorted(literals: &[String]) -> Vec<&String> {
    let mut sorted = literals.iter().collect::<Vec<_>>();
    sorted.sort();
    sorted
}
