//! FIX.4.4 message shapes.
//!
//! Unlike `fix42`/`fix43`, FIX.4.4's `Logon` carries the extension-
//! negotiation group `NoMsgTypes` (384). `NewOrderSingle` and the
//! market-data pair below round the dictionary out to the three traffic
//! kinds this codec targets: order management, market data, and session
//! control.

use crate::message_shape;
use crate::schema::Entry;
use fixcore_dictionary::{FixDatatype, Tag};

fn t(n: u32) -> Tag {
    Tag::new(n).expect("well-known tag id is nonzero and fits u16")
}

/// `Instrument` component block:
/// inlined wherever a shape needs to name a security by symbol.
fn instrument_component() -> Vec<Entry> {
    vec![Entry::field(t(55), true, FixDatatype::String)]
}

/// `UnderlyingInstrument` component block, itself containing a nested
/// repeating group (`NoUnderlyingSecurityAltID`, 457) — a component
/// block with a nested group.
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
    /// Logon (MsgType = A), with the `NoMsgTypes` extension-negotiation
    /// group FIX.4.2/4.3 predate.
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
    /// Heartbeat (MsgType = 0): echoes `TestReqID` when sent in reply
    /// to a `TestRequest`.
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
    /// NewOrderSingle (MsgType = D): the order-management shape,
    /// inlining the `Instrument` component for `Symbol`.
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
    /// MarketDataRequest (MsgType = V).
    pub struct MarketDataRequest = "V" => {
        let mut entries = vec![
            Entry::field(t(262), true, FixDatatype::String),
            Entry::field(t(263), true, FixDatatype::Char),
            Entry::field(t(264), false, FixDatatype::Int),
            Entry::group(t(267), true, vec![
                Entry::field(t(269), true, FixDatatype::Char),
            ]),
        ];
        entries.extend(instrument_component());
        entries
    }
}

message_shape! {
    /// MarketDataSnapshotFullRefresh (MsgType = W): the market-data
    /// shape exercising a three-level nested group (`NoMDEntries` >
    /// `NoUnderlyings` > `NoUnderlyingSecurityAltID`).
    pub struct MarketDataSnapshotFullRefresh = "W" => {
        let mut entries = vec![
            Entry::field(t(262), false, FixDatatype::String),
        ];
        entries.extend(instrument_component());
        let mut md_entry = vec![
            Entry::field(t(269), true, FixDatatype::Char),
            Entry::field(t(270), false, FixDatatype::Price),
            Entry::field(t(271), false, FixDatatype::Qty),
            Entry::field(t(278), false, FixDatatype::String),
            Entry::field(t(279), false, FixDatatype::Char),
        ];
        md_entry.push(Entry::group(t(711), false, underlying_instrument_component()));
        entries.push(Entry::group(t(268), true, md_entry));
        entries
    }
}
