//! FIX 5.0 SP2 message shapes, carried on the FIXT.1.1 transport.
//! `BeginString` is `FIXT.1.1` for every message of this application
//! version — the application-level version split FIXT introduced
//! (`DefaultApplVerID`) is session-layer negotiation and out of this
//! codec's scope, so these shapes are dispatched the same way the three
//! classic versions are: by `(BeginString, MsgType)`.

use crate::message_shape;
use crate::schema::Entry;
use fixcore_dictionary::{FixDatatype, Tag};

fn t(n: u32) -> Tag {
    Tag::new(n).expect("well-known tag id is nonzero and fits u16")
}

fn instrument_component() -> Vec<Entry> {
    vec![Entry::field(t(55), true, FixDatatype::String)]
}

fn underlying_instrument_component() -> Vec<Entry> {
    vec![
        Entry::field(t(311), false, FixDatatype::String),
        Entry::group(
            t(457),
            false,
            vec![
                Entry::field(t(458), true, FixDatatype::String),
                Entry::field(t(459), false, FixDatatype::String),
            ],
        ),
    ]
}

message_shape! {
    /// Logon (MsgType = A).
    pub struct Logon = "A" => vec![
        Entry::field(t(98), true, FixDatatype::Int),
        Entry::field(t(108), true, FixDatatype::Int),
        Entry::field(t(141), false, FixDatatype::Boolean),
        Entry::group(t(384), false, vec![
            Entry::field(t(372), true, FixDatatype::String),
            Entry::field(t(385), false, FixDatatype::Char),
        ]),
    ]
}

message_shape! {
    /// Heartbeat (MsgType = 0).
    pub struct Heartbeat = "0" => vec![
        Entry::field(t(112), false, FixDatatype::String),
    ]
}

message_shape! {
    /// TestRequest (MsgType = 1).
    pub struct TestRequest = "1" => vec![
        Entry::field(t(112), true, FixDatatype::String),
    ]
}

message_shape! {
    /// NewOrderSingle (MsgType = D).
    pub struct NewOrderSingle = "D" => {
        let mut entries = vec![
            Entry::field(t(11), true, FixDatatype::String),
            Entry::field(t(21), false, FixDatatype::Char),
        ];
        entries.extend(instrument_component());
        entries.extend(vec![
            Entry::field(t(54), true, FixDatatype::Char),
            Entry::field(t(60), true, FixDatatype::UtcTimestamp),
            Entry::field(t(38), true, FixDatatype::Qty),
            Entry::field(t(40), true, FixDatatype::Char),
            Entry::field(t(44), false, FixDatatype::Price),
            Entry::field(t(59), false, FixDatatype::Char),
        ]);
        entries
    }
}

message_shape! {
    /// MarketDataSnapshotFullRefresh (MsgType = W).
    pub struct MarketDataSnapshotFullRefresh = "W" => {
        let mut entries = vec![
            Entry::field(t(262), false, FixDatatype::String),
        ];
        entries.extend(instrument_component());
        let mut md_entry = vec![
            Entry::field(t(269), true, FixDatatype::Char),
            Entry::field(t(270), false, FixDatatype::Price),
            Entry::field(t(271), false, FixDatatype::Qty),
        ];
        md_entry.push(Entry::group(t(711), false, underlying_instrument_component()));
        entries.push(Entry::group(t(268), true, md_entry));
        entries
    }
}
