use cain::{
    decode,
    decode_schema,
    dumps,
    encode,
    encode_schema,
    loads,
    map_value,
    schema,
    Schema,
    Value,
};
use std::fmt::Debug;


fn round_trip_test(schema: &Schema, value: Value) {
    let mut buf = Vec::new();
    encode(schema, &value, &mut buf)
        .map_err(|e| println!("{e}"))
        .unwrap();

    let (decoded, rest) = decode(schema, &buf)
        .map_err(|e| println!("{e}"))
        .unwrap();
    assert!(rest.is_empty(), "{} bytes left over", rest.len());
    assert_eq!(decoded, value);

    // equal inputs produce identical bytes
    let mut again = Vec::new();
    encode(schema, &value, &mut again).unwrap();
    assert_eq!(buf, again);
}

fn assert_err<T: Debug>(result: cain::Result<T>) {
    assert!(result.is_err(), "expected an error, got {:?}", result.unwrap());
}

#[test]
fn primitives() {
    round_trip_test(&schema!(null), Value::Null);
    round_trip_test(&schema!(bool), Value::Bool(true));
    round_trip_test(&schema!(char), Value::Char('夏'));
    round_trip_test(&schema!(str), Value::Str("hello world".into()));
    round_trip_test(&schema!(str), Value::Str(String::new()));
    round_trip_test(&schema!(bytes), Value::Bytes(vec![0, 1, 2, 0xff]));
    round_trip_test(&schema!(bytes[short, short]), Value::Bytes(b"tiny prefix".to_vec()));
    round_trip_test(&schema!(number), Value::Double(3.14));
    round_trip_test(&schema!(float), Value::Float(-0.5));
    round_trip_test(&schema!(double), Value::Double(f64::MIN_POSITIVE));
    round_trip_test(&schema!(decimal), Value::Decimal("3.1415926535897932384626433".into()));
    round_trip_test(&schema!(complex), Value::Complex(2.0, 3.0));
    round_trip_test(&schema!(dcomplex), Value::DoubleComplex(2.0, 3.0));
}

#[test]
fn integers() {
    round_trip_test(&schema!(int), Value::Int(-32768));
    round_trip_test(&schema!(int[long, long]), Value::Int(1 << 30));
    round_trip_test(&schema!(uint[short]), Value::Int(255));
    round_trip_test(&schema!(sint), Value::Int(-1));
    round_trip_test(&schema!(u64), Value::Int(u64::MAX as i128));
    round_trip_test(&schema!(i8), Value::Int(-128));
}

#[test]
fn compounds() {
    round_trip_test(
        &schema!([(int)]),
        Value::List((0..100).map(Value::Int).collect()),
    );
    round_trip_test(
        &schema!([(str)]),
        Value::List(
            ["Hello", "Hi", "Hello", "Hey"]
                .into_iter()
                .map(|s| Value::Str(s.into()))
                .collect(),
        ),
    );
    round_trip_test(
        &schema!(tuple((str), (int), (str))),
        Value::Tuple(vec![
            Value::Str("Hello".into()),
            Value::Int(1),
            Value::Str("Yay".into()),
        ]),
    );
    round_trip_test(
        &schema!(set((str), (int))),
        Value::Set(vec![Value::Str("Hello".into()), Value::Int(1)]),
    );
    round_trip_test(
        &schema!({ (username: str), (favorite_number: int) }),
        map_value! { username: "test1", favorite_number: 2i64 },
    );
}

#[test]
fn deep_nesting() {
    let schema = schema!({
        (name: str),
        (versions: [({ (major: uint[short]), (tags: [(enum["alpha", "beta", "stable"])]) })]),
        (checksum: option(bytes)),
    });
    let value = map_value! {
        name: "cain",
        versions: Value::List(vec![
            map_value! {
                major: 1i64,
                tags: Value::List(vec![Value::Str("alpha".into()), Value::Str("stable".into())]),
            },
            map_value! {
                major: 2i64,
                tags: Value::List(Vec::new()),
            },
        ]),
        checksum: Value::Null,
    };
    round_trip_test(&schema, value);
}

#[test]
fn choices() {
    let union = schema!(union((str), (int[short])));
    round_trip_test(&union, Value::Str("text arm".into()));
    round_trip_test(&union, Value::Int(2));

    let optional = schema!(option(str));
    round_trip_test(&optional, Value::Null);
    round_trip_test(&optional, Value::Str("present".into()));

    round_trip_test(&schema!(enum["hello", "world"]), Value::Str("world".into()));
    round_trip_test(&schema!(range), Value::Range { start: 0, stop: 4, step: 2 });
    round_trip_test(&schema!(range[long]), Value::Range { start: -300, stop: 300, step: 3 });
}

#[test]
fn schemas_as_values() {
    let schema = schema!([(str), ({ (bar: tuple((str), (option(str)), (float), (int))) })]);
    round_trip_test(&schema!(type), Value::Schema(Box::new(schema)));
    // the Type kind can describe itself
    round_trip_test(&schema!(type), Value::Schema(Box::new(Schema::Type)));
}

#[test]
fn encoded_schema_bytes_are_self_inverse() {
    let schema = schema!({
        (name: str),
        (arm_lengths: [(float)]),
        (parent: option(str)),
    });
    let bytes = encode_schema(&schema).unwrap();
    assert_eq!(decode_schema(&bytes).unwrap(), schema);
}

#[test]
fn header_round_trip_for_every_kind_of_payload() {
    let cases = vec![
        (schema!(str), Value::Str("foo".into())),
        (schema!([(int)]), Value::List(vec![Value::Int(5), Value::Int(5), Value::Int(5)])),
        (
            schema!({ (a: int), (b: option(str)) }),
            map_value! { a: 2i64, b: "there" },
        ),
        (schema!(range), Value::Range { start: 0, stop: 10, step: 1 }),
    ];
    for (schema, value) in cases {
        let framed = dumps(&value, &schema, true).unwrap();
        assert_eq!(loads(&framed, None).unwrap(), value, "schema {schema:?}");
    }
}

#[test]
fn dedup_makes_repeated_elements_cost_only_an_index() {
    let schema = schema!([(str)]);
    let mut sizes = Vec::new();
    for n in [1usize, 2, 3, 10] {
        let value = Value::List(vec![Value::Str("a long repeated payload".into()); n]);
        sizes.push(dumps(&value, &schema, false).unwrap().len());
    }
    // once dedup kicks in, each extra element adds exactly one 2-byte index
    assert_eq!(sizes[2] - sizes[1], 2);
    assert_eq!(sizes[3] - sizes[2], 7 * 2);
}

#[test]
fn unique_elements_cost_their_full_payload() {
    let schema = schema!([(str)]);
    let short = dumps(
        &Value::List(vec![Value::Str("aa".into()), Value::Str("bb".into())]),
        &schema,
        false,
    )
    .unwrap();
    let longer = dumps(
        &Value::List(vec![
            Value::Str("aa".into()),
            Value::Str("bb".into()),
            Value::Str("cc".into()),
        ]),
        &schema,
        false,
    )
    .unwrap();
    assert_eq!(longer.len() - short.len(), "cc\0".len());
}

#[test]
fn encoding_failures() {
    // wrong arity
    assert_err(dumps(
        &Value::List(vec![Value::Str("one".into())]),
        &schema!([(str), (int)]),
        false,
    ));
    // missing field
    assert_err(dumps(&map_value! {}, &schema!({ (a: int) }), false));
    // no matching union arm
    assert_err(dumps(&Value::Bool(true), &schema!(union((str), (int))), false));
    // literal not in the enum
    assert_err(dumps(&Value::Str("hey".into()), &schema!(enum["hello"]), false));
    // integer out of the chosen width
    assert_err(dumps(&Value::Int(40_000), &schema!(int), false));
    // embedded NUL
    assert_err(dumps(&Value::Str("a\0b".into()), &schema!(str), false));
}

#[test]
fn failed_encodes_leave_the_buffer_untouched() {
    let mut out = vec![0xAA];
    // start fits one byte, stop does not; nothing may stick
    let value = Value::Range { start: 0, stop: 300, step: 1 };
    assert!(encode(&schema!(range), &value, &mut out).is_err());
    assert_eq!(out, [0xAA]);
}

#[test]
fn decoding_failures() {
    // bad bool byte
    assert_err(loads(&[0x07], Some(&schema!(bool))));
    // unterminated string
    assert_err(loads(b"missing terminator", Some(&schema!(str))));
    // impossible UTF-8 lead
    assert_err(loads(&[0x80], Some(&schema!(char))));
    // truncated input
    assert_err(loads(&[0x00], Some(&schema!(int))));
    // headerless bytes without a schema
    assert_err(loads(&[0x00, 0x01, 0x02], None));
}

#[test]
fn trailing_bytes_are_returned_by_decode() {
    let (value, rest) = decode(&schema!(int), &[0x00, 0x07, 0xde, 0xad]).unwrap();
    assert_eq!(value, Value::Int(7));
    assert_eq!(rest, [0xde, 0xad]);
}
