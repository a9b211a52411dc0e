//! Error taxonomy shared by every codec.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A schema reference names a kind the resolver cannot identify.
    #[error("unknown kind `{name}`")]
    UnknownKind { name: String },
    /// The value does not conform to the schema.
    #[error("encoding {kind}: {reason}")]
    Encoding { kind: &'static str, reason: String },
    /// The byte stream does not conform to the schema.
    #[error("decoding {kind}: {reason}")]
    Decoding { kind: &'static str, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

macro_rules! encode_err {
    ($kind:expr, $($e:tt)*)=>{
        $crate::error::Error::Encoding {
            kind: $kind,
            reason: format!($($e)*),
        }
    };
}

macro_rules! decode_err {
    ($kind:expr, $($e:tt)*)=>{
        $crate::error::Error::Decoding {
            kind: $kind,
            reason: format!($($e)*),
        }
    };
}

macro_rules! ensure_encode {
    ($c:expr, $kind:expr, $($e:tt)*)=>{
        if !$c {
            return Err($crate::error::encode_err!($kind, $($e)*));
        }
    };
}

macro_rules! ensure_decode {
    ($c:expr, $kind:expr, $($e:tt)*)=>{
        if !$c {
            return Err($crate::error::decode_err!($kind, $($e)*));
        }
    };
}

pub(crate) use {decode_err, encode_err, ensure_decode, ensure_encode};
