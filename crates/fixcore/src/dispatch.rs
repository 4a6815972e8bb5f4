//! Version/MsgType dispatch and the caller-supplied override
//! set used to substitute a replacement shape for a version's default.

use crate::schema::{Shape, ShapeInfo};
use fixcore_dictionary::Version;
use std::collections::HashMap;

/// A compile-time-checked pairing of a default shape with the
/// replacement a caller wants substituted for it. `message_shape!`
/// gives every shape the same `MsgType`-per-type guarantee the default
/// shapes have, so `Override::new` only needs to check the two
/// `MSG_TYPE` constants match: an override must carry the same
/// `MsgType` discriminator as the default it replaces.
pub struct Override {
    msg_type: &'static str,
    replacement: &'static ShapeInfo,
}

impl Override {
    pub fn new<Default: Shape, Replacement: Shape>() -> Self {
        assert_eq!(
            Default::MSG_TYPE,
            Replacement::MSG_TYPE,
            "override shape must share the default's MsgType discriminator",
        );
        Self {
            msg_type: Default::MSG_TYPE,
            replacement: Replacement::info(),
        }
    }
}

/// The caller's override set: zero or more `(default → replacement)`
/// entries, matched by `(version, msgtype)`.
#[derive(Default)]
pub struct OverrideSet {
    by_version: HashMap<Version, HashMap<&'static str, &'static ShapeInfo>>,
}

impl OverrideSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, version: Version, over: Override) {
        self.by_version
            .entry(version)
            .or_default()
            .insert(over.msg_type, over.replacement);
    }

    pub fn lookup(&self, version: Version, msg_type: &str) -> Option<&'static ShapeInfo> {
        self.by_version.get(&version)?.get(msg_type).copied()
    }
}

/// A version's registered default shapes, keyed by `MsgType`. Built
/// once per version by `fixcore::definitions::{fix42,fix43,fix44,fixt11}
/// ::dictionary()`.
pub struct VersionDictionary {
    pub version: Version,
    /// This version's header shape. Every version this codec ships
    /// happens to share the same header fields, but the field exists
    /// per-version rather than as one global constant so a version
    /// with a genuinely different header (e.g. a hypothetical FIX.5.0
    /// session-layer split) only needs a new `ShapeInfo`, not a new
    /// `VersionDictionary` shape.
    pub header: &'static ShapeInfo,
    by_msg_type: HashMap<&'static str, &'static ShapeInfo>,
}

impl VersionDictionary {
    pub fn new(
        version: Version,
        header: &'static ShapeInfo,
        shapes: impl IntoIterator<Item = &'static ShapeInfo>,
    ) -> Self {
        Self {
            version,
            header,
            by_msg_type: shapes.into_iter().map(|s| (s.msg_type, s)).collect(),
        }
    }

    pub fn default_shape(&self, msg_type: &str) -> Option<&'static ShapeInfo> {
        self.by_msg_type.get(msg_type).copied()
    }
}

/// A caller's complete set of registered per-version dictionaries.
/// `fixcore::definitions` builds one of these with all four shipped
/// versions registered.
#[derive(Default)]
pub struct Registry {
    by_version: HashMap<Version, VersionDictionary>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, dict: VersionDictionary) {
        self.by_version.insert(dict.version, dict);
    }

    pub fn get(&self, version: Version) -> Option<&VersionDictionary> {
        self.by_version.get(&version)
    }
}

/// Resolves `(version, msgtype)` to a concrete shape, applying the
/// caller's override set first.
pub fn resolve_shape<'o>(
    dict: &VersionDictionary,
    overrides: &'o OverrideSet,
    msg_type: &str,
) -> Option<&'static ShapeInfo> {
    overrides
        .lookup(dict.version, msg_type)
        .or_else(|| dict.default_shape(msg_type))
}
