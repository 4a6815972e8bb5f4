//! The schema model: message shapes as an ordered,
//! flattened list of entries, with component blocks inlined and
//! repeating groups kept nested.
//!
//! A shape is declared with [`message_shape!`] (see
//! `fixcore::definitions` for worked examples). The macro is
//! intentionally thin: it builds a `Vec<Entry>` the same way a
//! hand-written constructor would, then hands it to
//! [`ShapeInfo::build`], which does the actual flattening bookkeeping
//! (duplicate-tag rejection, tag-index construction, required-tag
//! bookkeeping). This is a `const`-array-of-`Entry`-records model,
//! built once per shape rather than at every parse — the macro is sugar
//! over that constructor, not a from-scratch code generator.

use crate::error::SchemaError;
use crate::index::TagIndex;
use fixcore_dictionary::{FixDatatype, Tag};
use std::sync::OnceLock;

/// How a scalar field's bytes should be interpreted. `Data` carries the
/// tag of its companion `Length` field, since the wire bytes for a
/// `Data` field are not delimiter-terminated — the parser must already
/// know how many bytes to take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(FixDatatype),
    Data { len_tag: Tag },
}

/// One entry in a flattened shape.
#[derive(Debug, Clone)]
pub enum Entry {
    Field {
        tag: Tag,
        required: bool,
        kind: FieldKind,
    },
    /// A repeating group: `count_tag` carries `N`; `inner` is the
    /// sub-shape each of the `N` records follows, with its own
    /// (recursively flattened) entries and tag index.
    Group {
        count_tag: Tag,
        required: bool,
        inner: Vec<Entry>,
        inner_index: TagIndex,
    },
}

impl Entry {
    pub fn field(tag: Tag, required: bool, datatype: FixDatatype) -> Self {
        Entry::Field {
            tag,
            required,
            kind: FieldKind::Scalar(datatype),
        }
    }

    pub fn data_field(tag: Tag, required: bool, len_tag: Tag) -> Self {
        Entry::Field {
            tag,
            required,
            kind: FieldKind::Data { len_tag },
        }
    }

    /// Builds a `Group` entry, computing its inner tag index eagerly:
    /// an entry list inside a repeating group is itself a sub-shape, and
    /// is flattened recursively but remains nested under its count tag.
    pub fn group(count_tag: Tag, required: bool, inner: Vec<Entry>) -> Self {
        let inner_index = TagIndex::build(inner.iter().enumerate().map(|(i, e)| (e.tag(), i)));
        Entry::Group {
            count_tag,
            required,
            inner,
            inner_index,
        }
    }

    pub fn tag(&self) -> Tag {
        match self {
            Entry::Field { tag, .. } => *tag,
            Entry::Group { count_tag, .. } => *count_tag,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            Entry::Field { required, .. } => *required,
            Entry::Group { required, .. } => *required,
        }
    }

    pub fn as_group(&self) -> Option<(&[Entry], &TagIndex)> {
        match self {
            Entry::Group {
                inner, inner_index, ..
            } => Some((inner, inner_index)),
            _ => None,
        }
    }
}

/// A reusable, named subsequence of entries, inlined into a parent
/// shape's entry list at shape-construction time. Since this codec
/// builds shapes at program start rather than via a procedural macro, a
/// component is simply a function returning the entries it contributes
/// — callers `extend()` them into the parent's `Vec<Entry>` in declared
/// position, which is exactly what macro-time inlining would produce.
pub type ComponentBlock = fn() -> Vec<Entry>;

/// The derived tables for one message shape: the flattened
/// entry list, its tag index, and the declared-order list of required
/// tags (used to size and address `required_present`).
#[derive(Debug)]
pub struct ShapeInfo {
    pub msg_type: &'static str,
    pub entries: Vec<Entry>,
    pub index: TagIndex,
    pub required_tags: Vec<Tag>,
}

impl ShapeInfo {
    /// Validates and derives tables for a flattened top-level entry
    /// list. Rejects two entries sharing the same tag id.
    pub fn build(msg_type: &'static str, entries: Vec<Entry>) -> Result<Self, SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for e in &entries {
            if !seen.insert(e.tag().get()) {
                return Err(SchemaError::DuplicateTag(e.tag()));
            }
        }
        let index = TagIndex::build(entries.iter().enumerate().map(|(i, e)| (e.tag(), i)));
        let required_tags = entries
            .iter()
            .filter(|e| e.required())
            .map(|e| e.tag())
            .collect();
        Ok(Self {
            msg_type,
            entries,
            index,
            required_tags,
        })
    }

    pub fn slot_of(&self, tag: Tag) -> Option<usize> {
        self.index.slot_of(tag)
    }

    pub fn required_bit_of(&self, tag: Tag) -> Option<usize> {
        self.required_tags.iter().position(|t| *t == tag)
    }
}

/// A registered message shape: a type tag (the Rust type itself need
/// not be distinct per shape — `definitions::fix44::Logon` and friends
/// exist purely so a `&'static ShapeInfo` can be looked up without a
/// runtime registry lookup on the hot path) whose derived tables are
/// computed once, lazily, and cached for the lifetime of the process.
pub trait Shape: 'static {
    /// Builds this shape's raw (component-inlined, group-nested, but not
    /// yet validated) entry list. Called at most once per process.
    fn build_entries() -> Vec<Entry>;

    const MSG_TYPE: &'static str;

    fn cell() -> &'static OnceLock<ShapeInfo>;

    fn info() -> &'static ShapeInfo {
        Self::cell().get_or_init(|| {
            ShapeInfo::build(Self::MSG_TYPE, Self::build_entries())
                .expect("shape definition has a duplicate tag")
        })
    }
}

/// Declares a message shape type and its [`Shape`] impl.
///
/// ```ignore
/// message_shape! {
///     /// FIX Logon (MsgType = A)
///     pub struct Logon = "A" {
///         Required(SENDER_COMP_ID_LIKE_ENTRY),
///         ...
///     }
/// }
/// ```
///
/// In practice shapes in this crate are built with a plain function
/// body (`build_entries`) rather than a literal entry-by-entry macro
/// invocation, because repeating groups and component blocks need
/// ordinary control flow (`vec![...]`, `.extend(component())`) to
/// express inlining and nesting clearly. `message_shape!` still saves
/// the boilerplate of the marker struct, the `OnceLock`, and the
/// `Shape` impl.
#[macro_export]
macro_rules! message_shape {
    ($(#[$meta:meta])* $vis:vis struct $name:ident = $msg_type:literal => $body:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::schema::Shape for $name {
            const MSG_TYPE: &'static str = $msg_type;

            fn build_entries() -> Vec<$crate::schema::Entry> {
                $body
            }

            fn cell() -> &'static ::std::sync::OnceLock<$crate::schema::ShapeInfo> {
                static CELL: ::std::sync::OnceLock<$crate::schema::ShapeInfo> =
                    ::std::sync::OnceLock::new();
                &CELL
            }
        }
    };
}
