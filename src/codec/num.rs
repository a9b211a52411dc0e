//! Integer sizing policy and the number codecs.
//!
//! Integers are big-endian two's-complement at a schema-chosen width.
//! Floats are IEEE-754 little-endian.

use crate::{
    codec::take,
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
    },
    value::Value,
};

/// Widest integer the codec will move through `i128`.
pub(crate) const MAX_INT_BYTES: usize = 16;

/// A resolved integer width: byte count plus sign flag.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct IntWidth {
    pub bytes: usize,
    pub signed: bool,
}

/// Narrowest of the 1/2/4/8-byte ladder that fits `n`: the unsigned ladder
/// for non-negative `n` unless `signed` is requested, the signed ladder by
/// absolute range otherwise. `None` when `n` needs more than 64 bits.
///
/// Every length, index, enum-index and union-discriminant on the wire is
/// sized through here, so frame overhead tracks actual cardinality.
pub fn recommended_width(n: i128, signed: bool) -> Option<IntWidth> {
    if !signed && n >= 0 {
        let bytes = match n as u128 {
            n if n <= u8::MAX as u128 => 1,
            n if n <= u16::MAX as u128 => 2,
            n if n <= u32::MAX as u128 => 4,
            n if n <= u64::MAX as u128 => 8,
            _ => return None,
        };
        Some(IntWidth { bytes, signed: false })
    } else {
        let bytes = match n {
            n if i8::try_from(n).is_ok() => 1,
            n if i16::try_from(n).is_ok() => 2,
            n if i32::try_from(n).is_ok() => 4,
            n if i64::try_from(n).is_ok() => 8,
            _ => return None,
        };
        Some(IntWidth { bytes, signed: true })
    }
}

/// Applies `long`/`short` to a base byte count, ignoring sign tokens.
pub(crate) fn modified_width(base: isize, modifiers: &[Modifier]) -> isize {
    modifiers.iter().fold(base, |width, m| match m {
        Modifier::Long => width + 1,
        Modifier::Short => width - 1,
        Modifier::Signed | Modifier::Unsigned => width,
    })
}

/// Resolves an integer schema to (bytes, signed). `None` when the modifier
/// arithmetic leaves the width outside 1..=16 bytes.
pub(crate) fn resolved_int(int: &IntSchema) -> Option<IntWidth> {
    let (bytes, signed) = match int.flavor {
        IntFlavor::Int => {
            let signed = int.modifiers.iter().fold(true, |s, m| match m {
                Modifier::Signed => true,
                Modifier::Unsigned => false,
                _ => s,
            });
            (modified_width(2, &int.modifiers), signed)
        }
        IntFlavor::Signed => (modified_width(2, &int.modifiers), true),
        IntFlavor::Unsigned => (modified_width(2, &int.modifiers), false),
        IntFlavor::Fixed { bytes, signed } => (bytes as isize, signed),
    };
    if (1..=MAX_INT_BYTES as isize).contains(&bytes) {
        Some(IntWidth { bytes: bytes as usize, signed })
    } else {
        None
    }
}

pub(crate) fn write_be_uint(out: &mut Vec<u8>, n: u128, bytes: usize) {
    out.extend_from_slice(&n.to_be_bytes()[16 - bytes..]);
}

pub(crate) fn read_be_uint<'a>(
    kind: &'static str,
    input: &'a [u8],
    bytes: usize,
) -> Result<(u128, &'a [u8])> {
    let (head, rest) = take(kind, input, bytes)?;
    let mut buf = [0u8; 16];
    buf[16 - bytes..].copy_from_slice(head);
    Ok((u128::from_be_bytes(buf), rest))
}

/// Writes `n` as `width` big-endian two's-complement bytes. A value outside
/// the range of the chosen width is a fatal encoding error.
pub(crate) fn write_be_int(
    kind: &'static str,
    out: &mut Vec<u8>,
    n: i128,
    width: IntWidth,
) -> Result<()> {
    ensure_encode!(
        int_fits(n, width),
        kind,
        "{} out of range for a {}-byte {} integer",
        n,
        width.bytes,
        if width.signed { "signed" } else { "unsigned" },
    );
    out.extend_from_slice(&n.to_be_bytes()[16 - width.bytes..]);
    Ok(())
}

fn int_fits(n: i128, width: IntWidth) -> bool {
    if width.bytes >= MAX_INT_BYTES {
        return width.signed || n >= 0;
    }
    let bits = width.bytes as u32 * 8;
    if width.signed {
        let max = (1i128 << (bits - 1)) - 1;
        n >= -max - 1 && n <= max
    } else {
        n >= 0 && n < (1i128 << bits)
    }
}

pub(crate) fn read_be_int<'a>(
    kind: &'static str,
    input: &'a [u8],
    width: IntWidth,
) -> Result<(i128, &'a [u8])> {
    let (head, rest) = take(kind, input, width.bytes)?;
    let negative = width.signed && head[0] & 0x80 != 0;
    let mut buf = if negative { [0xffu8; 16] } else { [0u8; 16] };
    buf[16 - width.bytes..].copy_from_slice(head);
    let n = i128::from_be_bytes(buf);
    ensure_decode!(
        width.signed || width.bytes < MAX_INT_BYTES || n >= 0,
        kind,
        "unsigned {}-byte integer exceeds the representable range",
        width.bytes,
    );
    Ok((n, rest))
}

pub(crate) fn encode_int(int: &IntSchema, value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let kind = int_kind(int);
    let width = resolved_int(int)
        .ok_or_else(|| encode_err!(kind, "modifiers leave no valid width"))?;
    let n = match value {
        &Value::Int(n) => n,
        other => {
            return Err(encode_err!(kind, "expected an integer, got {}", other.shape_name()))
        }
    };
    write_be_int(kind, out, n, width)
}

pub(crate) fn decode_int<'a>(int: &IntSchema, input: &'a [u8]) -> Result<(Value, &'a [u8])> {
    let kind = int_kind(int);
    let width = resolved_int(int)
        .ok_or_else(|| decode_err!(kind, "modifiers leave no valid width"))?;
    let (n, rest) = read_be_int(kind, input, width)?;
    Ok((Value::Int(n), rest))
}

fn int_kind(int: &IntSchema) -> &'static str {
    match int.flavor {
        IntFlavor::Int => "Int",
        IntFlavor::Signed => "SignedInt",
        IntFlavor::Unsigned => "UnsignedInt",
        IntFlavor::Fixed { .. } => "Int",
    }
}

macro_rules! float_codec {
    ($($enc:ident/$dec:ident($t:ident) $kind:literal $variant:ident,)*)=>{$(
        pub(crate) fn $enc(value: &Value, out: &mut Vec<u8>) -> Result<()> {
            let n = match value {
                &Value::$variant(n) => n,
                other => {
                    return Err(encode_err!(
                        $kind,
                        "expected a {}, got {}",
                        stringify!($t),
                        other.shape_name(),
                    ))
                }
            };
            out.extend_from_slice(&n.to_le_bytes());
            Ok(())
        }

        pub(crate) fn $dec(input: &[u8]) -> Result<(Value, &[u8])> {
            let (head, rest) = take($kind, input, ::std::mem::size_of::<$t>())?;
            let mut buf = [0u8; ::std::mem::size_of::<$t>()];
            buf.copy_from_slice(head);
            Ok((Value::$variant($t::from_le_bytes(buf)), rest))
        }
    )*};
}

float_codec!(
    encode_float/decode_float(f32) "Float" Float,
    encode_double/decode_double(f64) "Double" Double,
    encode_number/decode_number(f64) "Number" Double,
);

macro_rules! complex_codec {
    ($($enc:ident/$dec:ident($t:ident) $kind:literal $variant:ident,)*)=>{$(
        pub(crate) fn $enc(value: &Value, out: &mut Vec<u8>) -> Result<()> {
            let (re, im) = match value {
                &Value::$variant(re, im) => (re, im),
                other => {
                    return Err(encode_err!(
                        $kind,
                        "expected a complex pair, got {}",
                        other.shape_name(),
                    ))
                }
            };
            out.extend_from_slice(&re.to_le_bytes());
            out.extend_from_slice(&im.to_le_bytes());
            Ok(())
        }

        pub(crate) fn $dec(input: &[u8]) -> Result<(Value, &[u8])> {
            const SIZE: usize = ::std::mem::size_of::<$t>();
            let (head, rest) = take($kind, input, SIZE * 2)?;
            let mut re = [0u8; SIZE];
            let mut im = [0u8; SIZE];
            re.copy_from_slice(&head[..SIZE]);
            im.copy_from_slice(&head[SIZE..]);
            Ok((Value::$variant($t::from_le_bytes(re), $t::from_le_bytes(im)), rest))
        }
    )*};
}

complex_codec!(
    encode_complex/decode_complex(f32) "Complex" Complex,
    encode_double_complex/decode_double_complex(f64) "DoubleComplex" DoubleComplex,
);


#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn int_schema(src: crate::schema::Schema) -> IntSchema {
        match src {
            crate::schema::Schema::Int(int) => int,
            _ => unreachable!(),
        }
    }

    fn enc(int: &IntSchema, n: i128) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        encode_int(int, &Value::Int(n), &mut out)?;
        Ok(out)
    }

    #[test]
    fn generic_int_default_is_two_bytes_signed() {
        let int = int_schema(schema!(int));
        assert_eq!(enc(&int, 3).unwrap(), [0x00, 0x03]);
        assert_eq!(enc(&int, -1).unwrap(), [0xff, 0xff]);
        assert_eq!(decode_int(&int, &[0x00, 0x03, 0xAA]).unwrap(), (Value::Int(3), &[0xAA][..]));
        assert_eq!(decode_int(&int, &[0xff, 0xff]).unwrap().0, Value::Int(-1));
    }

    #[test]
    fn modifiers_step_one_byte() {
        assert_eq!(enc(&int_schema(schema!(int[short])), 3).unwrap(), [0x03]);
        assert_eq!(enc(&int_schema(schema!(int[long])), 3).unwrap(), [0x00, 0x00, 0x03]);
        assert_eq!(enc(&int_schema(schema!(int[long, short, unsigned])), 3).unwrap(), [0x00, 0x03]);
        assert_eq!(enc(&int_schema(schema!(int[short, unsigned])), 255).unwrap(), [0xff]);
        assert_eq!(enc(&int_schema(schema!(uint[short])), 255).unwrap(), [0xff]);
    }

    #[test]
    fn signed_bounds() {
        let int = int_schema(schema!(int[short]));
        assert_eq!(enc(&int, 127).unwrap(), [0x7f]);
        assert_eq!(enc(&int, -128).unwrap(), [0x80]);
        assert!(enc(&int, 128).is_err());
        assert!(enc(&int, -129).is_err());
        assert_eq!(decode_int(&int, &[0x80]).unwrap().0, Value::Int(-128));
    }

    #[test]
    fn sign_tokens_do_not_move_pinned_flavors() {
        let uint = int_schema(schema!(uint[signed, short]));
        assert_eq!(enc(&uint, 255).unwrap(), [0xff]);
        let sint = int_schema(schema!(sint[unsigned, short]));
        assert_eq!(enc(&sint, -1).unwrap(), [0xff]);
    }

    #[test]
    fn fixed_widths_ignore_modifiers() {
        let mut u8_schema = int_schema(schema!(u8));
        u8_schema.modifiers = vec![Modifier::Long, Modifier::Long];
        assert_eq!(enc(&u8_schema, 255).unwrap(), [0xff]);
        assert_eq!(enc(&int_schema(schema!(u16)), 65_535).unwrap(), [0xff, 0xff]);
        assert_eq!(
            enc(&int_schema(schema!(i64)), i64::MAX as i128).unwrap(),
            [0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        );
    }

    #[test]
    fn too_many_shorts_is_an_error() {
        let int = int_schema(schema!(int[short, short]));
        assert!(enc(&int, 0).is_err());
        assert!(decode_int(&int, &[]).is_err());
    }

    #[test]
    fn recommended_width_ladder() {
        assert_eq!(recommended_width((1 << 8) - 1, false).unwrap(), IntWidth { bytes: 1, signed: false });
        assert_eq!(recommended_width((1 << 16) - 1, false).unwrap(), IntWidth { bytes: 2, signed: false });
        assert_eq!(recommended_width((1 << 32) - 1, false).unwrap(), IntWidth { bytes: 4, signed: false });
        assert_eq!(recommended_width(u64::MAX as i128, false).unwrap(), IntWidth { bytes: 8, signed: false });
        assert_eq!(recommended_width(u64::MAX as i128 + 1, false), None);

        assert_eq!(recommended_width(-(1 << 7), false).unwrap(), IntWidth { bytes: 1, signed: true });
        assert_eq!(recommended_width(-(1 << 15), false).unwrap(), IntWidth { bytes: 2, signed: true });
        assert_eq!(recommended_width(-(1 << 31), false).unwrap(), IntWidth { bytes: 4, signed: true });
        assert_eq!(recommended_width(-(1i128 << 63), false).unwrap(), IntWidth { bytes: 8, signed: true });
        assert_eq!(recommended_width(127, true).unwrap(), IntWidth { bytes: 1, signed: true });
    }

    #[test]
    fn floats_are_little_endian() {
        let mut out = Vec::new();
        encode_float(&Value::Float(3.14), &mut out).unwrap();
        assert_eq!(out, [0xc3, 0xf5, 0x48, 0x40]);
        assert_eq!(decode_float(&out).unwrap().0, Value::Float(3.14));

        let mut out = Vec::new();
        encode_double(&Value::Double(3.14), &mut out).unwrap();
        assert_eq!(out, [0x1f, 0x85, 0xeb, 0x51, 0xb8, 0x1e, 0x09, 0x40]);
    }

    #[test]
    fn complex_pairs() {
        let mut out = Vec::new();
        encode_complex(&Value::Complex(2.0, 3.0), &mut out).unwrap();
        assert_eq!(out, [0x00, 0x00, 0x00, 0x40, 0x00, 0x00, 0x40, 0x40]);
        assert_eq!(decode_complex(&out).unwrap().0, Value::Complex(2.0, 3.0));
    }
}
