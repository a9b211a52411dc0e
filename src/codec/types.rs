//! The schema-of-schemas codec. A schema node is itself encodable as an
//! Object-shaped record, which is what lets a payload carry a header that
//! makes it self-decoding.

use crate::{
    codec::object,
    error::{
        decode_err,
        encode_err,
        ensure_decode,
        Result,
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
use std::{
    collections::BTreeMap,
    sync::OnceLock,
};

// New kinds go at the end of the registry so existing indices stay stable
// on the wire.
pub static TYPES_REGISTRY: [&str; 31] = [
    "Array",
    "Binary",
    "Boolean",
    "Character",
    "NoneType",
    "Number",
    "Int",
    "Float",
    "Double",
    "Decimal",
    "Complex",
    "DoubleComplex",
    "SignedInt",
    "UnsignedInt",
    "Int8",
    "UInt8",
    "Int16",
    "UInt16",
    "Int32",
    "UInt32",
    "Int64",
    "UInt64",
    "Object",
    "Optional",
    "Range",
    "Set",
    "String",
    "Tuple",
    "Type",
    "Union",
    "Enum",
];

/// Registry position of a schema node's kind.
pub fn registry_index(schema: &Schema) -> u8 {
    let name = schema.kind_name();
    TYPES_REGISTRY
        .iter()
        .position(|&entry| entry == name)
        .map(|i| i as u8)
        .unwrap_or_else(|| unreachable!("kind `{}` missing from the registry", name))
}

/// The record every schema node encodes as. Field order on the wire is the
/// usual lexicographic sort, so the layout is: annotations_keys,
/// annotations_values, arguments, index, name.
fn record_schema() -> &'static ObjectSchema {
    static RECORD: OnceLock<ObjectSchema> = OnceLock::new();
    RECORD.get_or_init(|| {
        ObjectSchema::new(vec![
            ObjectField {
                name: "index".into(),
                inner: Schema::Int(IntSchema::fixed(1, false)),
            },
            ObjectField {
                name: "name".into(),
                inner: Schema::Optional(vec![Schema::Str]),
            },
            ObjectField {
                name: "annotations_keys".into(),
                inner: Schema::Array(SeqSchema::new(vec![Schema::Str])),
            },
            ObjectField {
                name: "annotations_values".into(),
                inner: Schema::Array(SeqSchema::new(vec![Schema::Type])),
            },
            ObjectField {
                name: "arguments".into(),
                inner: Schema::Array(SeqSchema::new(vec![Schema::Union(vec![
                    Schema::Str,
                    Schema::Type,
                ])])),
            },
        ])
    })
}

pub(crate) fn encode(value: &Value, out: &mut Vec<u8>) -> Result<()> {
    match value {
        Value::Schema(schema) => encode_node(schema, out),
        other => Err(encode_err!("Type", "expected a schema, got {}", other.shape_name())),
    }
}

/// Encodes a schema node without routing it through a `Value` first.
pub(crate) fn encode_node(schema: &Schema, out: &mut Vec<u8>) -> Result<()> {
    object::encode(record_schema(), &pack(schema), out)
}

pub(crate) fn decode(input: &[u8]) -> Result<(Value, &[u8])> {
    let (record, rest) = object::decode(record_schema(), input)?;
    let map = match record {
        Value::Map(map) => map,
        _ => return Err(decode_err!("Type", "record did not decode to a map")),
    };
    Ok((Value::Schema(Box::new(unpack(&map)?)), rest))
}

/// Flattens a schema node into its wire record: registry index, optional
/// rename, field annotations (Object kinds only) and positional arguments
/// (string tokens or child schemas).
pub(crate) fn pack(schema: &Schema) -> Value {
    let mut annotations_keys = Vec::new();
    let mut annotations_values = Vec::new();
    let mut name = Value::Null;
    if let Schema::Object(obj) = schema {
        if let Some(n) = &obj.name {
            name = Value::Str(n.clone());
        }
        for field in &obj.fields {
            annotations_keys.push(Value::Str(field.name.clone()));
            annotations_values.push(Value::Schema(Box::new(field.inner.clone())));
        }
    }

    let arguments = match schema {
        Schema::Binary(mods) | Schema::Range(mods) => token_args(mods),
        Schema::Int(int) => match int.flavor {
            IntFlavor::Fixed { .. } => Vec::new(),
            _ => token_args(&int.modifiers),
        },
        Schema::Array(seq) | Schema::Tuple(seq) | Schema::Set(seq) => {
            let mut args = seq
                .items
                .iter()
                .map(|item| Value::Schema(Box::new(item.clone())))
                .collect::<Vec<_>>();
            args.extend(token_args(&seq.modifiers));
            args
        }
        Schema::Optional(variants) | Schema::Union(variants) => variants
            .iter()
            .map(|variant| Value::Schema(Box::new(variant.clone())))
            .collect(),
        Schema::Enum(literals) => literals
            .iter()
            .map(|lit| Value::Str(lit.clone()))
            .collect(),
        _ => Vec::new(),
    };

    Value::Map(BTreeMap::from([
        ("index".into(), Value::Int(registry_index(schema) as i128)),
        ("name".into(), name),
        ("annotations_keys".into(), Value::List(annotations_keys)),
        ("annotations_values".into(), Value::List(annotations_values)),
        ("arguments".into(), Value::List(arguments)),
    ]))
}

fn token_args(modifiers: &[Modifier]) -> Vec<Value> {
    modifiers
        .iter()
        .map(|m| Value::Str(m.token().into()))
        .collect()
}

/// Rebuilds a schema node from its wire record.
pub(crate) fn unpack(map: &BTreeMap<String, Value>) -> Result<Schema> {
    let index = match map.get("index") {
        Some(&Value::Int(n)) => n,
        _ => return Err(decode_err!("Type", "record is missing its registry index")),
    };
    let kind = usize::try_from(index).ok().and_then(|i| TYPES_REGISTRY.get(i)).ok_or_else(
        || decode_err!("Type", "registry index {} out of range", index),
    )?;

    let arguments = match map.get("arguments") {
        Some(Value::List(args)) => args.as_slice(),
        _ => &[],
    };
    let schema_args = || -> Result<Vec<Schema>> {
        arguments
            .iter()
            .filter_map(|arg| match arg {
                Value::Schema(s) => Some(Ok((**s).clone())),
                _ => None,
            })
            .collect()
    };
    let token_mods = || -> Vec<Modifier> {
        arguments
            .iter()
            .filter_map(|arg| match arg {
                Value::Str(token) => Modifier::from_token(token),
                _ => None,
            })
            .collect()
    };
    let seq = || -> Result<SeqSchema> {
        Ok(SeqSchema {
            items: schema_args()?,
            modifiers: token_mods(),
        })
    };

    Ok(match *kind {
        "NoneType" => Schema::Null,
        "Boolean" => Schema::Bool,
        "Character" => Schema::Char,
        "String" => Schema::Str,
        "Binary" => Schema::Binary(token_mods()),
        "Number" => Schema::Number,
        "Float" => Schema::Float,
        "Double" => Schema::Double,
        "Decimal" => Schema::Decimal,
        "Complex" => Schema::Complex,
        "DoubleComplex" => Schema::DoubleComplex,
        "Int" => Schema::Int(IntSchema::generic(token_mods())),
        "SignedInt" => Schema::Int(IntSchema {
            flavor: IntFlavor::Signed,
            modifiers: token_mods(),
        }),
        "UnsignedInt" => Schema::Int(IntSchema {
            flavor: IntFlavor::Unsigned,
            modifiers: token_mods(),
        }),
        "Int8" => Schema::Int(IntSchema::fixed(1, true)),
        "UInt8" => Schema::Int(IntSchema::fixed(1, false)),
        "Int16" => Schema::Int(IntSchema::fixed(2, true)),
        "UInt16" => Schema::Int(IntSchema::fixed(2, false)),
        "Int32" => Schema::Int(IntSchema::fixed(4, true)),
        "UInt32" => Schema::Int(IntSchema::fixed(4, false)),
        "Int64" => Schema::Int(IntSchema::fixed(8, true)),
        "UInt64" => Schema::Int(IntSchema::fixed(8, false)),
        "Array" => Schema::Array(seq()?),
        "Tuple" => Schema::Tuple(seq()?),
        "Set" => Schema::Set(seq()?),
        "Object" => Schema::Object(unpack_object(map)?),
        "Optional" => Schema::Optional(schema_args()?),
        "Union" => Schema::Union(schema_args()?),
        "Enum" => Schema::Enum(
            arguments
                .iter()
                .filter_map(|arg| match arg {
                    Value::Str(lit) => Some(lit.clone()),
                    _ => None,
                })
                .collect(),
        ),
        "Range" => Schema::Range(token_mods()),
        "Type" => Schema::Type,
        other => {
            return Err(crate::error::Error::UnknownKind { name: other.into() })
        }
    })
}

fn unpack_object(map: &BTreeMap<String, Value>) -> Result<ObjectSchema> {
    let keys = match map.get("annotations_keys") {
        Some(Value::List(keys)) => keys.as_slice(),
        _ => &[],
    };
    let values = match map.get("annotations_values") {
        Some(Value::List(values)) => values.as_slice(),
        _ => &[],
    };
    ensure_decode!(
        keys.len() == values.len(),
        "Type",
        "{} annotation keys against {} values",
        keys.len(),
        values.len(),
    );

    let mut fields = Vec::with_capacity(keys.len());
    for (key, value) in keys.iter().zip(values) {
        match (key, value) {
            (Value::Str(name), Value::Schema(inner)) => fields.push(ObjectField {
                name: name.clone(),
                inner: (**inner).clone(),
            }),
            _ => return Err(decode_err!("Type", "malformed annotation entry")),
        }
    }

    let name = match map.get("name") {
        Some(Value::Str(name)) => Some(name.clone()),
        _ => None,
    };
    Ok(ObjectSchema { name, fields })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn round_trip(schema: Schema) {
        let mut out = Vec::new();
        encode(&Value::Schema(Box::new(schema.clone())), &mut out).unwrap();
        let (decoded, rest) = decode(&out).unwrap();
        assert!(rest.is_empty());
        assert_eq!(decoded, Value::Schema(Box::new(schema)));
    }

    #[test]
    fn registry_indices_are_wire_stable() {
        assert_eq!(registry_index(&schema!([(str)])), 0);
        assert_eq!(registry_index(&schema!(null)), 4);
        assert_eq!(registry_index(&schema!(int)), 6);
        assert_eq!(registry_index(&schema!(u8)), 15);
        assert_eq!(registry_index(&schema!({ (a: int) })), 22);
        assert_eq!(registry_index(&schema!(str)), 26);
        assert_eq!(registry_index(&schema!(type)), 28);
        assert_eq!(registry_index(&schema!(enum["a"])), 30);
    }

    #[test]
    fn leaf_kinds_round_trip() {
        round_trip(schema!(str));
        round_trip(schema!(bool));
        round_trip(schema!(bytes[long]));
        round_trip(schema!(int[short, unsigned]));
        round_trip(schema!(u32));
        round_trip(schema!(decimal));
        round_trip(schema!(range[long]));
        round_trip(schema!(type));
    }

    #[test]
    fn compound_kinds_round_trip() {
        round_trip(schema!([(str), ({ (bar: tuple((str), (option(str)), (float), (int))) })]));
        round_trip(schema!(set((str), (int))));
        round_trip(schema!(enum["hello", "world"]));
        round_trip(schema!(union((str), (int[short]))));
    }

    #[test]
    fn renamed_object_keeps_its_name() {
        let schema = Schema::Object(ObjectSchema {
            name: Some("TestObject".into()),
            fields: vec![("bar", schema!(int)).into()],
        });
        round_trip(schema);
    }

    #[test]
    fn unknown_registry_index_is_fatal() {
        let mut record = match pack(&schema!(str)) {
            Value::Map(map) => map,
            _ => unreachable!(),
        };
        record.insert("index".into(), Value::Int(200));
        assert!(unpack(&record).is_err());
    }
}
