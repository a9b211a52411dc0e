//! The (start, stop, step) triple. Each bound is a generic integer with an
//! implicit trailing `short`, so the default is one signed byte each;
//! user modifiers append before it and may widen.

use crate::{
    codec::num::{
        decode_int,
        encode_int,
    },
    error::{
        encode_err,
        Result,
    },
    schema::{
        IntSchema,
        Modifier,
    },
    value::Value,
};


fn bound_schema(modifiers: &[Modifier]) -> IntSchema {
    let mut modifiers = modifiers.to_vec();
    modifiers.push(Modifier::Short);
    IntSchema::generic(modifiers)
}

pub(crate) fn encode(modifiers: &[Modifier], value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let (start, stop, step) = match value {
        &Value::Range { start, stop, step } => (start, stop, step),
        other => {
            return Err(encode_err!("Range", "expected a range, got {}", other.shape_name()))
        }
    };
    let bound = bound_schema(modifiers);
    encode_int(&bound, &Value::Int(start), out)?;
    encode_int(&bound, &Value::Int(stop), out)?;
    encode_int(&bound, &Value::Int(step), out)
}

pub(crate) fn decode<'a>(modifiers: &[Modifier], input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    let bound = bound_schema(modifiers);
    let mut bounds = [0i128; 3];
    let mut rest = input;
    for slot in &mut bounds {
        let (value, after) = decode_int(&bound, rest)?;
        *slot = match value {
            Value::Int(n) => n,
            _ => unreachable!(),
        };
        rest = after;
    }
    let [start, stop, step] = bounds;
    Ok((Value::Range { start, stop, step }, rest))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        codec,
        schema,
    };

    #[test]
    fn default_is_one_signed_byte_per_bound() {
        let schema = schema!(range);
        let value = Value::Range { start: 0, stop: 4, step: 2 };
        let mut out = Vec::new();
        codec::encode(&schema, &value, &mut out).unwrap();
        assert_eq!(out, [0x00, 0x04, 0x02]);
        let (decoded, rest) = codec::decode(&schema, &out).unwrap();
        assert_eq!(decoded, value);
        assert!(rest.is_empty());
    }

    #[test]
    fn negative_bounds() {
        let schema = schema!(range);
        let value = Value::Range { start: -4, stop: 4, step: 1 };
        let mut out = Vec::new();
        codec::encode(&schema, &value, &mut out).unwrap();
        assert_eq!(out, [0xfc, 0x04, 0x01]);
        assert_eq!(codec::decode(&schema, &out).unwrap().0, value);
    }

    #[test]
    fn long_modifier_widens_each_bound() {
        let schema = schema!(range[long]);
        let value = Value::Range { start: 0, stop: 300, step: 1 };
        let mut out = Vec::new();
        codec::encode(&schema, &value, &mut out).unwrap();
        assert_eq!(out, [0x00, 0x00, 0x01, 0x2c, 0x00, 0x01]);
        assert_eq!(codec::decode(&schema, &out).unwrap().0, value);
    }

    #[test]
    fn out_of_width_bound_is_fatal() {
        let schema = schema!(range);
        let value = Value::Range { start: 0, stop: 300, step: 1 };
        assert!(codec::encode(&schema, &value, &mut Vec::new()).is_err());
    }
}
