//! Tag identity and FIX primitive-type catalogue.
//!
//! This crate holds the data that is common to every FIX version and
//! every message shape: the numeric identity of a tag, the FIX datatype
//! it carries, and the small set of protocol versions this codec
//! recognizes. It deliberately knows nothing about message *shape*
//! (which tags appear in which message, in what order, nested how) —
//! that lives in `fixcore::schema` and `fixcore::definitions`, one layer
//! up, keeping the same separation between data model and generated
//! shapes.

mod tag;
mod version;

pub use tag::Tag;
pub use version::Version;

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// The FIX primitive types this codec distinguishes.
///
/// `NumInGroup` and `Length` are structurally `Int` but are kept distinct
/// so callers inspecting a dictionary entry can tell a repeating-group
/// count tag from an ordinary integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixDatatype {
    Int,
    Length,
    NumInGroup,
    SeqNum,
    Char,
    Boolean,
    Float,
    Amt,
    Price,
    PriceOffset,
    Qty,
    String,
    Data,
    UtcTimestamp,
    UtcDateOnly,
}

impl FixDatatype {
    /// Collapses related numeric/string subtypes down to the primitive
    /// categories that actually parse differently (`Int`, `Char`,
    /// `Bool`, `Float`, `String`, `Data`, `UTCTimestamp`).
    pub fn basetype(self) -> FixDatatype {
        match self {
            FixDatatype::Int | FixDatatype::Length | FixDatatype::NumInGroup
            | FixDatatype::SeqNum => FixDatatype::Int,
            FixDatatype::Float | FixDatatype::Amt | FixDatatype::Price
            | FixDatatype::PriceOffset | FixDatatype::Qty => FixDatatype::Float,
            other => other,
        }
    }
}

/// A named tag/datatype pair, as it would appear in a FIX data
/// dictionary document.
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub tag: Tag,
    pub name: &'static str,
    pub datatype: FixDatatype,
}

/// The catalogue of tags known to this codec, independent of any single
/// message shape. Message shapes (in `fixcore::definitions`) reference
/// entries here by tag id; `fixcore::tagvalue::Decoder` also consults it
/// purely for diagnostics, when a tag isn't declared in the shape being
/// parsed — the unknown-tag trace log names the tag and its primitive
/// category if this catalogue happens to recognize it, rather than
/// logging a bare numeric id.
pub struct Catalogue {
    by_tag: FxHashMap<u32, FieldDef>,
}

impl Catalogue {
    fn new(entries: &[FieldDef]) -> Self {
        Self {
            by_tag: entries.iter().map(|f| (f.tag.get(), *f)).collect(),
        }
    }

    pub fn lookup(&self, tag: Tag) -> Option<&FieldDef> {
        self.by_tag.get(&tag.get())
    }
}

/// The well-known field catalogue shared by all four dictionaries this
/// codec ships. A production catalogue would be exhaustive; this one
/// covers the tags exercised by `fixcore-dictionary`'s message shapes
/// plus the fixed session header/trailer.
static CATALOGUE: OnceLock<Catalogue> = OnceLock::new();

pub fn catalogue() -> &'static Catalogue {
    CATALOGUE.get_or_init(|| {
        use FixDatatype::*;
        Catalogue::new(&[
            field(8, "BeginString", String),
            field(9, "BodyLength", Length),
            field(10, "CheckSum", String),
            field(34, "MsgSeqNum", SeqNum),
            field(35, "MsgType", String),
            field(49, "SenderCompID", String),
            field(52, "SendingTime", UtcTimestamp),
            field(56, "TargetCompID", String),
            field(57, "TargetSubID", String),
            field(98, "EncryptMethod", Int),
            field(108, "HeartBtInt", Int),
            field(141, "ResetSeqNumFlag", Boolean),
            field(112, "TestReqID", String),
            field(11, "ClOrdID", String),
            field(21, "HandlInst", Char),
            field(38, "OrderQty", Qty),
            field(40, "OrdType", Char),
            field(44, "Price", Price),
            field(54, "Side", Char),
            field(55, "Symbol", String),
            field(59, "TimeInForce", Char),
            field(60, "TransactTime", UtcTimestamp),
            field(262, "MDReqID", String),
            field(263, "SubscriptionRequestType", Char),
            field(264, "MarketDepth", Int),
            field(267, "NoMDEntryTypes", NumInGroup),
            field(269, "MDEntryType", Char),
            field(268, "NoMDEntries", NumInGroup),
            field(270, "MDEntryPx", Price),
            field(271, "MDEntrySize", Qty),
            field(278, "MDEntryID", String),
            field(279, "MDUpdateAction", Char),
            field(711, "NoUnderlyings", NumInGroup),
            field(457, "NoUnderlyingSecurityAltID", NumInGroup),
            field(458, "UnderlyingSecurityAltID", String),
            field(459, "UnderlyingSecurityAltIDSource", String),
            field(384, "NoMsgTypes", NumInGroup),
            field(372, "RefMsgType", String),
            field(385, "MsgDirection", Char),
            field(311, "UnderlyingSymbol", String),
        ])
    })
}

const fn field(tag: u32, name: &'static str, datatype: FixDatatype) -> FieldDef {
    FieldDef {
        tag: Tag::new_const(tag),
        name,
        datatype,
    }
}
