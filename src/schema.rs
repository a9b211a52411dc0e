//! Data types for representing a schema, and the macro for constructing them
//! with syntactic sugar.

use serde::{
    Deserialize,
    Serialize,
};


/// Description of how raw binary data encodes structures of semantic
/// primitives. The schema is agreed on out-of-band; the wire carries only
/// what the schema cannot imply.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Schema {
    /// Encoded as nothing.
    Null,
    /// Encoded as 1 byte, 0 or 1.
    Bool,
    /// One code point, encoded as its 1-4 UTF-8 bytes.
    Char,
    /// UTF-8 code points terminated by a single NUL byte.
    Str,
    /// Binary blob.
    ///
    /// Encoded as:
    /// - unsigned big-endian length (4 bytes, `long` +1 / `short` -1)
    /// - length bytes of data
    Binary(Vec<Modifier>),
    /// Double-precision float, the default number. Encoded as binary64 LE.
    Number,
    /// Encoded as binary32 LE.
    Float,
    /// Encoded as binary64 LE.
    Double,
    /// Arbitrary-precision decimal, encoded as its textual form via `Str`.
    Decimal,
    /// (real, imag) pair of binary32 LE.
    Complex,
    /// (real, imag) pair of binary64 LE.
    DoubleComplex,
    /// Big-endian two's-complement integer; width and sign come from the
    /// flavor and modifiers (see `IntSchema`).
    Int(IntSchema),
    /// Sequence with list semantics.
    ///
    /// Encoded as:
    /// - with one item schema (homogenous): unsigned length, then elements
    ///   through the repetition table
    /// - with k > 1 item schemas (heterogenous): elements through the
    ///   repetition table only; the value must have exactly k elements
    Array(SeqSchema),
    /// Same wire shape as `Array`, tuple-typed values.
    Tuple(SeqSchema),
    /// Unordered collection. Items are coerced through a `Union` of the
    /// declared item schemas, then encoded as a homogenous `Array`.
    Set(SeqSchema),
    /// Keyed record. Fields are sorted by name lexicographically and the
    /// resulting positions feed the repetition table like a fixed-arity
    /// `Array`.
    Object(ObjectSchema),
    /// Some or none.
    ///
    /// Encoded as:
    /// - 1 byte, 0 (nothing follows) or 1
    /// - if 1: inner data, through a `Union` when several alternatives are
    ///   declared
    Optional(Vec<Schema>),
    /// Tagged choice.
    ///
    /// Encoded as a discriminant sized to the number of alternatives,
    /// then the selected alternative's data. A single-alternative union is
    /// a transparent passthrough with no discriminant.
    Union(Vec<Schema>),
    /// One of a closed set of string literals, encoded as the index of the
    /// value in the sorted literal list.
    Enum(Vec<String>),
    /// (start, stop, step) triple of generic integers with an implicit
    /// trailing `short` (1 byte each by default).
    Range(Vec<Modifier>),
    /// A schema encoded as ordinary data, so payloads can carry a
    /// self-describing header.
    Type,
}

/// Width and sign tokens accepted by `Int`, `Binary` and `Range`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Modifier {
    /// Widens the integer by one byte. May be repeated.
    Long,
    /// Narrows the integer by one byte. May be repeated.
    Short,
    Signed,
    Unsigned,
}

impl Modifier {
    pub fn token(self) -> &'static str {
        match self {
            Modifier::Long => "long",
            Modifier::Short => "short",
            Modifier::Signed => "signed",
            Modifier::Unsigned => "unsigned",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "long" => Modifier::Long,
            "short" => Modifier::Short,
            "signed" => Modifier::Signed,
            "unsigned" => Modifier::Unsigned,
            _ => return None,
        })
    }
}

/// Integer schema: a flavor plus its modifier tokens.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IntSchema {
    pub flavor: IntFlavor,
    pub modifiers: Vec<Modifier>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntFlavor {
    /// 2 bytes signed by default; modifiers adjust both width and sign.
    Int,
    /// Width from modifiers, sign pinned.
    Signed,
    /// Width from modifiers, sign pinned.
    Unsigned,
    /// Named width in bytes (1, 2, 4 or 8); ignores modifiers entirely.
    Fixed { bytes: u8, signed: bool },
}

impl IntSchema {
    pub fn generic(modifiers: Vec<Modifier>) -> Self {
        IntSchema { flavor: IntFlavor::Int, modifiers }
    }

    pub fn fixed(bytes: u8, signed: bool) -> Self {
        IntSchema {
            flavor: IntFlavor::Fixed { bytes, signed },
            modifiers: Vec::new(),
        }
    }
}

/// Value in `Schema::Array`, `Schema::Tuple` and `Schema::Set`.
///
/// `modifiers` widen or narrow the length and repetition-index integers of
/// the homogenous form; heterogenous forms size those from the arity
/// instead.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SeqSchema {
    pub items: Vec<Schema>,
    pub modifiers: Vec<Modifier>,
}

impl SeqSchema {
    pub fn new(items: Vec<Schema>) -> Self {
        SeqSchema { items, modifiers: Vec::new() }
    }

    /// Homogenous sequences declare one item schema and take any length.
    pub fn is_homogenous(&self) -> bool {
        self.items.len() == 1
    }
}

/// Value in `Schema::Object`.
///
/// `name` survives only through the `Type` codec: a record renamed from the
/// default carries its name in the self-describing header.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectSchema {
    pub name: Option<String>,
    pub fields: Vec<ObjectField>,
}

impl ObjectSchema {
    pub fn new(fields: Vec<ObjectField>) -> Self {
        ObjectSchema { name: None, fields }
    }

    /// Fields in wire order: lexicographic ascending by name.
    pub fn sorted_fields(&self) -> Vec<&ObjectField> {
        let mut sorted = self.fields.iter().collect::<Vec<_>>();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }
}

/// Item in `Schema::Object`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectField {
    pub name: String,
    pub inner: Schema,
}

impl<S: Into<String>> From<(S, Schema)> for ObjectField {
    fn from((name, inner): (S, Schema)) -> Self {
        ObjectField {
            name: name.into(),
            inner,
        }
    }
}

impl Schema {
    /// The registry name of this node's kind, used in error messages and by
    /// the `Type` codec.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Schema::Null => "NoneType",
            Schema::Bool => "Boolean",
            Schema::Char => "Character",
            Schema::Str => "String",
            Schema::Binary(_) => "Binary",
            Schema::Number => "Number",
            Schema::Float => "Float",
            Schema::Double => "Double",
            Schema::Decimal => "Decimal",
            Schema::Complex => "Complex",
            Schema::DoubleComplex => "DoubleComplex",
            Schema::Int(int) => match int.flavor {
                IntFlavor::Int => "Int",
                IntFlavor::Signed => "SignedInt",
                IntFlavor::Unsigned => "UnsignedInt",
                IntFlavor::Fixed { bytes: 1, signed: true } => "Int8",
                IntFlavor::Fixed { bytes: 1, signed: false } => "UInt8",
                IntFlavor::Fixed { bytes: 2, signed: true } => "Int16",
                IntFlavor::Fixed { bytes: 2, signed: false } => "UInt16",
                IntFlavor::Fixed { bytes: 4, signed: true } => "Int32",
                IntFlavor::Fixed { bytes: 4, signed: false } => "UInt32",
                IntFlavor::Fixed { bytes: 8, signed: true } => "Int64",
                IntFlavor::Fixed { bytes: _, signed: false } => "UInt64",
                IntFlavor::Fixed { bytes: _, signed: true } => "Int64",
            },
            Schema::Array(_) => "Array",
            Schema::Tuple(_) => "Tuple",
            Schema::Set(_) => "Set",
            Schema::Object(_) => "Object",
            Schema::Optional(_) => "Optional",
            Schema::Union(_) => "Union",
            Schema::Enum(_) => "Enum",
            Schema::Range(_) => "Range",
            Schema::Type => "Type",
        }
    }

    /// Normalizes a choice argument list the way the resolver does: a
    /// `Null` among the alternatives turns the whole choice into an
    /// `Optional` of the remaining alternatives.
    pub fn union_of(variants: Vec<Schema>) -> Schema {
        if variants.iter().any(|v| matches!(v, Schema::Null)) {
            let rest = variants
                .into_iter()
                .filter(|v| !matches!(v, Schema::Null))
                .collect();
            Schema::Optional(rest)
        } else {
            Schema::Union(variants)
        }
    }
}

/// Syntax sugar for constructing `Schema`.
///
/// ```
/// use cain::schema::*;
/// use cain::schema;
///
/// let _: Schema = schema!(null);
/// let _: Schema = schema!(bool);
/// let _: Schema = schema!(char);
/// let _: Schema = schema!(str);
/// let _: Schema = schema!(bytes);
/// let _: Schema = schema!(bytes[long]);
/// let _: Schema = schema!(number);
/// let _: Schema = schema!(float);
/// let _: Schema = schema!(double);
/// let _: Schema = schema!(decimal);
/// let _: Schema = schema!(complex);
/// let _: Schema = schema!(dcomplex);
/// let _: Schema = schema!(int);
/// let _: Schema = schema!(int[short, unsigned]);
/// let _: Schema = schema!(sint[long]);
/// let _: Schema = schema!(uint);
/// let _: Schema = schema!(i8);
/// let _: Schema = schema!(u64);
/// let _: Schema = schema!([(str)]);
/// let _: Schema = schema!([(str), (int)]);
/// let _: Schema = schema!(tuple((bytes), (bytes)));
/// let _: Schema = schema!(set((str), (int)));
/// let _: Schema = schema!({ (a: int), (b: str) });
/// let _: Schema = schema!(option(str));
/// let _: Schema = schema!(union((str), (int[short])));
/// let _: Schema = schema!(enum["hello", "world"]);
/// let _: Schema = schema!(range);
/// let _: Schema = schema!(type);
/// let _: Schema = schema!(%Schema::Str);
/// ```
#[macro_export]
macro_rules! schema {
    (null)=>{ $crate::schema::Schema::Null };
    (bool)=>{ $crate::schema::Schema::Bool };
    (char)=>{ $crate::schema::Schema::Char };
    (str)=>{ $crate::schema::Schema::Str };
    (bytes)=>{ $crate::schema::Schema::Binary(::std::vec::Vec::new()) };
    (bytes[$($m:ident),*$(,)?])=>{ $crate::schema::Schema::Binary($crate::modifiers!($($m),*)) };
    (number)=>{ $crate::schema::Schema::Number };
    (float)=>{ $crate::schema::Schema::Float };
    (double)=>{ $crate::schema::Schema::Double };
    (decimal)=>{ $crate::schema::Schema::Decimal };
    (complex)=>{ $crate::schema::Schema::Complex };
    (dcomplex)=>{ $crate::schema::Schema::DoubleComplex };
    (int)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::generic(::std::vec::Vec::new())) };
    (int[$($m:ident),*$(,)?])=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::generic($crate::modifiers!($($m),*))) };
    (sint)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema { flavor: $crate::schema::IntFlavor::Signed, modifiers: ::std::vec::Vec::new() }) };
    (sint[$($m:ident),*$(,)?])=>{ $crate::schema::Schema::Int($crate::schema::IntSchema { flavor: $crate::schema::IntFlavor::Signed, modifiers: $crate::modifiers!($($m),*) }) };
    (uint)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema { flavor: $crate::schema::IntFlavor::Unsigned, modifiers: ::std::vec::Vec::new() }) };
    (uint[$($m:ident),*$(,)?])=>{ $crate::schema::Schema::Int($crate::schema::IntSchema { flavor: $crate::schema::IntFlavor::Unsigned, modifiers: $crate::modifiers!($($m),*) }) };
    (i8)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(1, true)) };
    (u8)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(1, false)) };
    (i16)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(2, true)) };
    (u16)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(2, false)) };
    (i32)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(4, true)) };
    (u32)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(4, false)) };
    (i64)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(8, true)) };
    (u64)=>{ $crate::schema::Schema::Int($crate::schema::IntSchema::fixed(8, false)) };
    ([$(($($item:tt)*)),+$(,)?])=>{ $crate::schema::Schema::Array($crate::schema::SeqSchema::new(::std::vec![$( $crate::schema!($($item)*), )*])) };
    (tuple($(($($item:tt)*)),+$(,)?))=>{ $crate::schema::Schema::Tuple($crate::schema::SeqSchema::new(::std::vec![$( $crate::schema!($($item)*), )*])) };
    (set($(($($item:tt)*)),+$(,)?))=>{ $crate::schema::Schema::Set($crate::schema::SeqSchema::new(::std::vec![$( $crate::schema!($($item)*), )*])) };
    ({ $(($name:ident: $($field:tt)*)),*$(,)? })=>{
        $crate::schema::Schema::Object($crate::schema::ObjectSchema::new(::std::vec![
            $( $crate::schema::ObjectField { name: ::std::string::String::from(::core::stringify!($name)), inner: $crate::schema!($($field)*) }, )*
        ]))
    };
    (option($(($($variant:tt)*)),+$(,)?))=>{ $crate::schema::Schema::Optional(::std::vec![$( $crate::schema!($($variant)*), )*]) };
    (option($($inner:tt)*))=>{ $crate::schema::Schema::Optional(::std::vec![$crate::schema!($($inner)*)]) };
    (union($(($($variant:tt)*)),+$(,)?))=>{ $crate::schema::Schema::union_of(::std::vec![$( $crate::schema!($($variant)*), )*]) };
    (enum[$($lit:literal),+$(,)?])=>{ $crate::schema::Schema::Enum(::std::vec![$( ::std::string::String::from($lit), )*]) };
    (range)=>{ $crate::schema::Schema::Range(::std::vec::Vec::new()) };
    (range[$($m:ident),*$(,)?])=>{ $crate::schema::Schema::Range($crate::modifiers!($($m),*)) };
    (type)=>{ $crate::schema::Schema::Type };
    (%$schema:expr)=>{ $schema };
}

/// Modifier-token list sugar used by `schema!`.
#[macro_export]
macro_rules! modifiers {
    ($($m:ident),*$(,)?)=>{
        ::std::vec![$( $crate::modifiers!(@one $m), )*]
    };
    (@one long)=>{ $crate::schema::Modifier::Long };
    (@one short)=>{ $crate::schema::Modifier::Short };
    (@one signed)=>{ $crate::schema::Modifier::Signed };
    (@one unsigned)=>{ $crate::schema::Modifier::Unsigned };
}

pub use schema;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macro_builds_expected_nodes() {
        assert_eq!(schema!(str), Schema::Str);
        assert_eq!(
            schema!(int[short, unsigned]),
            Schema::Int(IntSchema::generic(vec![Modifier::Short, Modifier::Unsigned])),
        );
        assert_eq!(schema!(u8), Schema::Int(IntSchema::fixed(1, false)));
        assert_eq!(
            schema!([(str), (int)]),
            Schema::Array(SeqSchema::new(vec![Schema::Str, schema!(int)])),
        );
        assert_eq!(
            schema!({ (a: int), (b: str) }),
            Schema::Object(ObjectSchema::new(vec![
                ("a", schema!(int)).into(),
                ("b", Schema::Str).into(),
            ])),
        );
    }

    #[test]
    fn union_with_null_resolves_to_optional() {
        let s = Schema::union_of(vec![Schema::Str, Schema::Null, schema!(int)]);
        assert_eq!(s, Schema::Optional(vec![Schema::Str, schema!(int)]));
    }

    #[test]
    fn object_fields_sort_lexicographically() {
        let obj = ObjectSchema::new(vec![
            ("zulu", Schema::Str).into(),
            ("alpha", Schema::Bool).into(),
            ("mike", Schema::Null).into(),
        ]);
        let order = obj.sorted_fields().iter().map(|f| f.name.as_str()).collect::<Vec<_>>();
        assert_eq!(order, ["alpha", "mike", "zulu"]);
    }
}
