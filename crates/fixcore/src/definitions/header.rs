//! The standard header, shared by every version this codec ships. A
//! version whose header genuinely differed would only need its own
//! `ShapeInfo` here — the rest of the codec is agnostic to whether two
//! versions share a header shape or not.

use crate::message_shape;
use crate::schema::Entry;
use fixcore_dictionary::{FixDatatype, Tag};

fn t(n: u32) -> Tag {
    Tag::new(n).expect("well-known header tag id is nonzero and fits u16")
}

/// `BeginString`/`BodyLength` are declared here so the decoder can
/// address them through the ordinary slot-index path, even though the
/// serializer always synthesizes their wire bytes itself (from the
/// `Version` argument and the measured body length) rather than reading
/// them from the caller's header storage. `MsgType` is declared for the
/// same slot-index reason, but unlike 8/9 the serializer does read it
/// back off the caller's header — callers must set tag 35 themselves.
fn standard_header_entries() -> Vec<Entry> {
    vec![
        Entry::field(t(8), true, FixDatatype::String),
        Entry::field(t(9), true, FixDatatype::Length),
        Entry::field(t(35), true, FixDatatype::String),
        Entry::field(t(49), true, FixDatatype::String),
        Entry::field(t(56), true, FixDatatype::String),
        Entry::field(t(34), true, FixDatatype::SeqNum),
        Entry::field(t(52), true, FixDatatype::UtcTimestamp),
        Entry::field(t(57), false, FixDatatype::String),
    ]
}

message_shape! {
    /// The FIX.4.2 standard header.
    pub struct HeaderV42 = "" => standard_header_entries()
}

message_shape! {
    /// The FIX.4.3 standard header.
    pub struct HeaderV43 = "" => standard_header_entries()
}

message_shape! {
    /// The FIX.4.4 standard header.
    pub struct HeaderV44 = "" => standard_header_entries()
}

message_shape! {
    /// The FIXT.1.1 standard header.
    pub struct HeaderFixt11 = "" => standard_header_entries()
}
