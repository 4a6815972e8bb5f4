//! Error taxonomy, `thiserror`-derived.

use fixcore_dictionary::Tag;

/// Errors surfaced by [`crate::tagvalue::Decoder::visit`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unrecognized BeginString value {value:?}")]
    InvalidVersion { value: String },

    #[error("no shape registered for msgtype {msgtype:?} under {version}")]
    UnknownMessageType { msgtype: String, version: String },

    #[error("tag {0} is not declared in this shape (strict mode)")]
    UnknownTag(u32),

    #[error("field {tag} could not be parsed as its declared type")]
    MalformedField { tag: Tag },

    #[error("frame ended before a complete field could be read")]
    Truncated,

    #[error("checksum mismatch: expected {expected:03}, computed {actual:03}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("body length mismatch: header declared {expected}, measured {actual}")]
    BodyLengthMismatch { expected: usize, actual: usize },

    #[error("required field(s) missing at end of frame: {0:?}")]
    MissingRequired(Vec<Tag>),
}

/// Errors surfaced by [`crate::tagvalue::Encoder::write`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    #[error("missing required field(s): {0:?}")]
    MissingRequired(Vec<Tag>),
}

/// Errors from runtime typed accessors on message storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("field {0} is not present in this message")]
    Absent(Tag),
    #[error("field {0} could not be decoded as the requested type")]
    WrongType(Tag),
}

/// Errors raised while building or extending a [`crate::schema::Shape`].
/// These are "compile-time" in intent — a shape with
/// a duplicate tag, or an extension naming a tag that doesn't exist, is
/// a programmer error discovered the first time the shape is
/// constructed, not a data-dependent runtime condition — but since this
/// codec builds shapes from `const` data rather than a procedural macro,
/// they surface as a `Result` rather than a compile error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("tag {0} is declared more than once in this shape")]
    DuplicateTag(Tag),
    #[error("AddTag: tag {0} is already present in this shape")]
    AlreadyPresent(Tag),
    #[error("ChangeType: tag {0} is not declared in this shape")]
    NoSuchTag(Tag),
    #[error("ExtendGroup: no repeating group with count tag {0}")]
    NoSuchGroup(Tag),
}
