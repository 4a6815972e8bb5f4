//! `fixcore`: a statically-typed, schema-driven, zero-copy tag-value FIX
//! codec.
//!
//! The public surface is small by design: declare message shapes with
//! [`schema::Shape`]/[`message_shape`], register them into a
//! [`dispatch::Registry`] (`definitions::registry` builds the one this
//! crate ships), then hand both to a [`tagvalue::Decoder`]/
//! [`tagvalue::Encoder`] pair. Everything else — the cursor, the tag
//! index, the presence bitmaps — is implementation detail a caller
//! rarely touches directly.

pub mod config;
pub mod cursor;
pub mod definitions;
pub mod dispatch;
pub mod error;
pub mod extension;
pub mod index;
pub mod schema;
pub mod storage;
pub mod tagvalue;
pub mod types;

pub use config::Config;
pub use error::{AccessError, ParseError, SchemaError, WriteError};
pub use storage::{Bytes, MessageStorage};
pub use tagvalue::{Decoder, Encoder};
