//! The choice codecs: Optional (presence bit) and Union (discriminant).

use crate::{
    codec::{
        decode,
        encode,
        num::{
            read_be_uint,
            recommended_width,
            write_be_uint,
        },
        take,
    },
    error::{
        decode_err,
        encode_err,
        ensure_encode,
        Result,
    },
    schema::{
        IntFlavor,
        Schema,
    },
    value::Value,
};


pub(crate) fn encode_optional(
    variants: &[Schema],
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<()> {
    if matches!(value, Value::Null) {
        out.push(0);
        return Ok(());
    }
    out.push(1);
    if variants.len() == 1 {
        encode(&variants[0], value, out)
    } else {
        encode_union(variants, value, out)
    }
}

pub(crate) fn decode_optional<'a>(
    variants: &[Schema],
    input: &'a [u8],
) -> Result<(Value, &'a [u8])> {
    let (flag, rest) = take("Optional", input, 1)?;
    match flag[0] {
        0 => Ok((Value::Null, rest)),
        1 => {
            if variants.len() == 1 {
                decode(&variants[0], rest)
            } else {
                decode_union(variants, rest)
            }
        }
        n => Err(decode_err!("Optional", "{:#04x} is not a presence byte", n)),
    }
}

/// A single-alternative union is a zero-overhead alias for its alternative;
/// anything larger prepends a discriminant sized to the alternative count.
pub(crate) fn encode_union(variants: &[Schema], value: &Value, out: &mut Vec<u8>) -> Result<()> {
    ensure_encode!(!variants.is_empty(), "Union", "no alternatives declared");
    if variants.len() == 1 {
        return encode(&variants[0], value, out);
    }
    let ix = recommended_width(variants.len() as i128, false)
        .ok_or_else(|| encode_err!("Union", "{} alternatives exceed 64 bits", variants.len()))?;
    let arm = select_arm(variants, value).ok_or_else(|| {
        encode_err!(
            "Union",
            "a {} value matches none of [{}]",
            value.shape_name(),
            variants.iter().map(Schema::kind_name).collect::<Vec<_>>().join(", "),
        )
    })?;
    write_be_uint(out, arm as u128, ix.bytes);
    encode(&variants[arm], value, out)
}

pub(crate) fn decode_union<'a>(variants: &[Schema], input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    if variants.is_empty() {
        return Err(decode_err!("Union", "no alternatives declared"));
    }
    if variants.len() == 1 {
        return decode(&variants[0], input);
    }
    let ix = recommended_width(variants.len() as i128, false)
        .ok_or_else(|| decode_err!("Union", "{} alternatives exceed 64 bits", variants.len()))?;
    let (arm, rest) = read_be_uint("Union", input, ix.bytes)?;
    let arm = usize::try_from(arm).ok().filter(|&a| a < variants.len()).ok_or_else(
        || decode_err!("Union", "discriminant {} out of range for {} alternatives", arm, variants.len()),
    )?;
    decode(&variants[arm], rest)
}

/// Resolves the arm a value encodes through: first the alternative that is
/// exactly the value's own unparameterized codec, then any alternative of
/// the same kind family.
fn select_arm(variants: &[Schema], value: &Value) -> Option<usize> {
    variants
        .iter()
        .position(|schema| matches_exact(value, schema))
        .or_else(|| variants.iter().position(|schema| matches_family(value, schema)))
}

fn matches_exact(value: &Value, schema: &Schema) -> bool {
    match (value, schema) {
        (Value::Null, Schema::Null) => true,
        (Value::Bool(_), Schema::Bool) => true,
        (Value::Char(_), Schema::Char) => true,
        (Value::Str(_), Schema::Str) => true,
        (Value::Bytes(_), Schema::Binary(mods)) => mods.is_empty(),
        (Value::Int(_), Schema::Int(int)) => {
            matches!(int.flavor, IntFlavor::Int) && int.modifiers.is_empty()
        }
        (Value::Float(_), Schema::Float) => true,
        (Value::Double(_), Schema::Double) => true,
        (Value::Decimal(_), Schema::Decimal) => true,
        (Value::Complex(..), Schema::Complex) => true,
        (Value::DoubleComplex(..), Schema::DoubleComplex) => true,
        (Value::Range { .. }, Schema::Range(mods)) => mods.is_empty(),
        (Value::Schema(_), Schema::Type) => true,
        _ => false,
    }
}

fn matches_family(value: &Value, schema: &Schema) -> bool {
    match (value, schema) {
        (Value::Int(_), Schema::Int(_)) => true,
        (Value::Double(_), Schema::Number) => true,
        (Value::Bytes(_), Schema::Binary(_)) => true,
        (Value::Range { .. }, Schema::Range(_)) => true,
        (Value::List(_), Schema::Array(_)) => true,
        (Value::Tuple(_), Schema::Tuple(_)) => true,
        (Value::Set(_), Schema::Set(_)) => true,
        (Value::Map(_), Schema::Object(_)) => true,
        _ => false,
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn enc(schema: &Schema, value: &Value) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        encode(schema, value, &mut out)?;
        Ok(out)
    }

    #[test]
    fn optional_presence_byte() {
        let schema = schema!(option(str));
        assert_eq!(enc(&schema, &Value::Null).unwrap(), [0x00]);
        assert_eq!(
            enc(&schema, &Value::Str("Hello world".into())).unwrap(),
            b"\x01Hello world\x00",
        );
        assert_eq!(decode(&schema, &[0x00]).unwrap().0, Value::Null);
        assert_eq!(
            decode(&schema, b"\x01Hello world\x00").unwrap().0,
            Value::Str("Hello world".into()),
        );
        assert!(decode(&schema, &[0x02]).is_err());
    }

    #[test]
    fn single_alternative_union_is_transparent() {
        let schema = Schema::Union(vec![Schema::Str]);
        assert_eq!(
            enc(&schema, &Value::Str("Hello world".into())).unwrap(),
            b"Hello world\x00",
        );
    }

    #[test]
    fn union_prepends_a_discriminant() {
        let schema = schema!(union((str), (int)));
        assert_eq!(
            enc(&schema, &Value::Str("Hello world".into())).unwrap(),
            b"\x00Hello world\x00",
        );
        assert_eq!(enc(&schema, &Value::Int(2)).unwrap(), [0x01, 0x00, 0x02]);
        assert_eq!(
            decode(&schema, &[0x01, 0x00, 0x02]).unwrap().0,
            Value::Int(2),
        );
    }

    #[test]
    fn modified_arm_is_found_through_the_family_pass() {
        let schema = schema!(union((str), (int[short])));
        assert_eq!(enc(&schema, &Value::Int(2)).unwrap(), [0x01, 0x02]);
    }

    #[test]
    fn unmatched_value_is_fatal() {
        let schema = schema!(union((str), (int)));
        assert!(enc(&schema, &Value::Bool(true)).is_err());
    }

    #[test]
    fn out_of_range_discriminant_is_fatal() {
        let schema = schema!(union((str), (int)));
        assert!(decode(&schema, &[0x05, 0x00]).is_err());
    }

    #[test]
    fn null_in_a_choice_resolves_to_optional() {
        let schema = schema!(union((str), (null)));
        assert_eq!(schema, Schema::Optional(vec![Schema::Str]));
        assert_eq!(enc(&schema, &Value::Null).unwrap(), [0x00]);
    }
}
