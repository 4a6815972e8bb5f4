//! FIX.4.3 message shapes. This version's Logon/Heartbeat are identical
//! in shape to FIX.4.2's; they get their own types (rather than reusing
//! `fix42::Logon`) so each version's dictionary can evolve its shapes
//! independently without one version's `Change` accidentally mutating
//! another's cached `ShapeInfo`.

use crate::message_shape;
use crate::schema::Entry;
use fixcore_dictionary::{FixDatatype, Tag};

fn t(n: u32) -> Tag {
    Tag::new(n).expect("well-known tag id is nonzero and fits u16")
}

message_shape! {
    /// Logon (MsgType = A).
    pub struct Logon = "A" => vec![
        Entry::field(t(98), true, FixDatatype::Int),
        Entry::field(t(108), true, FixDatatype::Int),
        Entry::field(t(141), false, FixDatatype::Boolean),
    ]
}

message_shape! {
    /// Heartbeat (MsgType = 0).
    pub struct Heartbeat = "0" => vec![
        Entry::field(t(112), false, FixDatatype::String),
    ]
}
