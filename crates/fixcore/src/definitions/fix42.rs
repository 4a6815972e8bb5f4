//! FIX.4.2 message shapes.

use crate::message_shape;
use crate::schema::Entry;
use fixcore_dictionary::{FixDatatype, Tag};

fn t(n: u32) -> Tag {
    Tag::new(n).expect("well-known tag id is nonzero and fits u16")
}

message_shape! {
    /// Logon (MsgType = A). FIX.4.2 predates the `NoMsgTypes` (384)
    /// extension-negotiation group `fix44::Logon` carries.
    pub struct Logon = "A" => vec![
        Entry::field(t(98), true, FixDatatype::Int),
        Entry::field(t(108), true, FixDatatype::Int),
        Entry::field(t(141), false, FixDatatype::Boolean),
    ]
}

message_shape! {
    /// Heartbeat (MsgType = 0): no required body fields.
    pub struct Heartbeat = "0" => vec![
        Entry::field(t(112), false, FixDatatype::String),
    ]
}
