//! Leaf codecs: Null, Bool, Char, Str, Binary, Decimal.

use crate::{
    codec::{
        num::{
            modified_width,
            read_be_uint,
            write_be_uint,
            MAX_INT_BYTES,
        },
        take,
    },
    error::{
        decode_err,
        encode_err,
        ensure_encode,
        Result,
    },
    schema::Modifier,
    value::Value,
};

pub(crate) fn encode_null(value: &Value, _out: &mut Vec<u8>) -> Result<()> {
    ensure_encode!(
        matches!(value, Value::Null),
        "NoneType",
        "expected null, got {}",
        value.shape_name(),
    );
    Ok(())
}

pub(crate) fn encode_bool(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Bool(b) => {
            out.push(*b as u8);
            Ok(())
        }
        other => Err(encode_err!("Boolean", "expected a bool, got {}", other.shape_name())),
    }
}

pub(crate) fn decode_bool(input: &[u8]) -> Result<(Value, &[u8])> {
    let (head, rest) = take("Boolean", input, 1)?;
    match head[0] {
        0 => Ok((Value::Bool(false), rest)),
        1 => Ok((Value::Bool(true), rest)),
        n => Err(decode_err!("Boolean", "{:#04x} is not a boolean byte", n)),
    }
}

pub(crate) fn encode_char(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Char(c) => {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            Ok(())
        }
        other => Err(encode_err!("Character", "expected a char, got {}", other.shape_name())),
    }
}

/// Reads one code point; the UTF-8 lead byte decides how many continuation
/// bytes follow.
pub(crate) fn decode_char(input: &[u8]) -> Result<(Value, &[u8])> {
    let (lead, _) = take("Character", input, 1)?;
    let len = match lead[0] {
        b if b & 0b1000_0000 == 0b0000_0000 => 1,
        b if b & 0b1110_0000 == 0b1100_0000 => 2,
        b if b & 0b1111_0000 == 0b1110_0000 => 3,
        b if b & 0b1111_1000 == 0b1111_0000 => 4,
        b => return Err(decode_err!("Character", "{:#04x} is not a UTF-8 lead byte", b)),
    };
    let (head, rest) = take("Character", input, len)?;
    let s = std::str::from_utf8(head)
        .map_err(|_| decode_err!("Character", "invalid UTF-8 sequence"))?;
    let c = s
        .chars()
        .next()
        .ok_or_else(|| decode_err!("Character", "empty code point"))?;
    Ok((Value::Char(c), rest))
}

/// UTF-8 code points terminated by a single NUL. The encoder refuses
/// embedded NULs so the terminator stays unambiguous.
pub(crate) fn encode_str(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let s = match value {
        Value::Str(s) => s,
        other => {
            return Err(encode_err!("String", "expected a string, got {}", other.shape_name()))
        }
    };
    ensure_encode!(
        !s.as_bytes().contains(&0),
        "String",
        "embedded NUL in {:?}",
        s,
    );
    out.extend_from_slice(s.as_bytes());
    out.push(0);
    Ok(())
}

pub(crate) fn decode_str(input: &[u8]) -> Result<(Value, &[u8])> {
    let nul = input
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| decode_err!("String", "unterminated string"))?;
    let s = std::str::from_utf8(&input[..nul])
        .map_err(|_| decode_err!("String", "invalid UTF-8 in string body"))?;
    Ok((Value::Str(s.into()), &input[nul + 1..]))
}

/// Length of the Binary length prefix: 4 bytes, `long` +1 / `short` -1.
fn binary_len_width(modifiers: &[Modifier]) -> Option<usize> {
    let width = modified_width(4, modifiers);
    if (1..=MAX_INT_BYTES as isize).contains(&width) {
        Some(width as usize)
    } else {
        None
    }
}

pub(crate) fn encode_binary(
    modifiers: &[Modifier],
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<()> {
    let bytes = match value {
        Value::Bytes(b) => b,
        other => {
            return Err(encode_err!("Binary", "expected bytes, got {}", other.shape_name()))
        }
    };
    let width = binary_len_width(modifiers)
        .ok_or_else(|| encode_err!("Binary", "modifiers leave no valid length width"))?;
    ensure_encode!(
        width >= MAX_INT_BYTES || (bytes.len() as u128) < (1u128 << (width * 8)),
        "Binary",
        "{} bytes exceed a {}-byte length prefix",
        bytes.len(),
        width,
    );
    write_be_uint(out, bytes.len() as u128, width);
    out.extend_from_slice(bytes);
    Ok(())
}

pub(crate) fn decode_binary<'a>(
    modifiers: &[Modifier],
    input: &'a [u8],
) -> Result<(Value, &'a [u8])> {
    let width = binary_len_width(modifiers)
        .ok_or_else(|| decode_err!("Binary", "modifiers leave no valid length width"))?;
    let (len, rest) = read_be_uint("Binary", input, width)?;
    let len = usize::try_from(len)
        .map_err(|_| decode_err!("Binary", "length {} out of range", len))?;
    let (blob, rest) = take("Binary", rest, len)?;
    Ok((Value::Bytes(blob.to_vec()), rest))
}

/// The textual decimal, moved through the `Str` wire shape.
pub(crate) fn encode_decimal(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    let text = match value {
        Value::Decimal(text) => text.clone(),
        other => {
            return Err(encode_err!("Decimal", "expected a decimal, got {}", other.shape_name()))
        }
    };
    encode_str(&Value::Str(text), out)
        .map_err(|_| encode_err!("Decimal", "decimal text is not encodable"))
}

pub(crate) fn decode_decimal(input: &[u8]) -> Result<(Value, &[u8])> {
    let (s, rest) = decode_str(input)
        .map_err(|_| decode_err!("Decimal", "unterminated or invalid decimal text"))?;
    match s {
        Value::Str(text) => Ok((Value::Decimal(text), rest)),
        _ => Err(decode_err!("Decimal", "decimal body is not text")),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_zero_bytes() {
        let mut out = Vec::new();
        encode_null(&Value::Null, &mut out).unwrap();
        assert!(out.is_empty());
        assert!(encode_null(&Value::Bool(true), &mut out).is_err());
    }

    #[test]
    fn bool_bytes() {
        let mut out = Vec::new();
        encode_bool(&Value::Bool(true), &mut out).unwrap();
        encode_bool(&Value::Bool(false), &mut out).unwrap();
        assert_eq!(out, [0x01, 0x00]);
        assert!(decode_bool(&[0x02]).is_err());
    }

    #[test]
    fn char_reads_by_lead_byte() {
        let mut out = Vec::new();
        encode_char(&Value::Char('夏'), &mut out).unwrap();
        assert_eq!(out, [0xe5, 0xa4, 0x8f]);
        assert_eq!(decode_char(&out).unwrap().0, Value::Char('夏'));
        assert_eq!(decode_char(b"ax").unwrap(), (Value::Char('a'), &b"x"[..]));
        // a continuation byte can never lead
        assert!(decode_char(&[0x8f]).is_err());
    }

    #[test]
    fn str_terminates_with_nul() {
        let mut out = Vec::new();
        encode_str(&Value::Str("\"foo\u{8}ar".into()), &mut out).unwrap();
        assert_eq!(out, [0x22, 0x66, 0x6f, 0x6f, 0x08, 0x61, 0x72, 0x00]);
        assert_eq!(decode_str(&out).unwrap().0, Value::Str("\"foo\u{8}ar".into()));

        assert!(encode_str(&Value::Str("a\0b".into()), &mut Vec::new()).is_err());
        assert!(decode_str(b"no terminator").is_err());
    }

    #[test]
    fn binary_prefix_width_follows_modifiers() {
        let mut out = Vec::new();
        encode_binary(&[], &Value::Bytes(b"Hello world".to_vec()), &mut out).unwrap();
        assert_eq!(&out[..4], [0x00, 0x00, 0x00, 0x0b]);
        assert_eq!(&out[4..], b"Hello world");

        let mut long = Vec::new();
        encode_binary(&[Modifier::Long], &Value::Bytes(b"Hello world".to_vec()), &mut long).unwrap();
        assert_eq!(&long[..5], [0x00, 0x00, 0x00, 0x00, 0x0b]);

        let mut short = Vec::new();
        encode_binary(&[Modifier::Short], &Value::Bytes(b"hi".to_vec()), &mut short).unwrap();
        assert_eq!(short, [0x00, 0x00, 0x02, b'h', b'i']);

        let (v, rest) = decode_binary(&[], &out).unwrap();
        assert_eq!(v, Value::Bytes(b"Hello world".to_vec()));
        assert!(rest.is_empty());
    }

    #[test]
    fn decimal_round_trips_text() {
        let mut out = Vec::new();
        encode_decimal(&Value::Decimal("3.14".into()), &mut out).unwrap();
        assert_eq!(out, b"3.14\0");
        assert_eq!(decode_decimal(&out).unwrap().0, Value::Decimal("3.14".into()));
    }
}
