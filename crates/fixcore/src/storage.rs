//! Per-shape message storage.
//!
//! A [`MessageStorage`] holds one value per declared slot, a presence
//! bitmap, a required-fields bitmap, and an overflow map for tags the
//! shape doesn't declare. It comes in two flavors distinguished only by
//! whether its scalar bytes borrow the input frame ([`Bytes::Borrowed`])
//! or own a private copy ([`Bytes::Owned`]) — "view storage" and "owned
//! storage" are the same type with different `Bytes` contents, rather
//! than two distinct storage structs.

use crate::error::AccessError;
use crate::schema::{Entry, ShapeInfo};
use crate::types::FieldType;
use bitvec::prelude::*;
use fixcore_dictionary::Tag;
use nohash_hasher::IntMap;

/// A field's raw textual bytes: either borrowed from the frame that was
/// parsed ("view storage"), or independently owned ("owned storage").
#[derive(Debug, Clone)]
pub enum Bytes<'a> {
    Borrowed(&'a [u8]),
    Owned(Vec<u8>),
}

impl<'a> Bytes<'a> {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Bytes::Borrowed(b) => b,
            Bytes::Owned(v) => v,
        }
    }

    pub fn to_owned_bytes(&self) -> Bytes<'static> {
        Bytes::Owned(self.as_slice().to_vec())
    }
}

/// One slot's contents: a scalar value's raw bytes, or an ordered
/// sequence of inner records for a repeating-group slot.
#[derive(Debug, Clone)]
pub enum SlotValue<'a> {
    Scalar(Bytes<'a>),
    Group(Vec<MessageStorage<'a>>),
}

/// Storage for one shape instance — either the top-level header/body of
/// a frame, or one record inside a repeating group, itself a
/// message-shaped storage.
#[derive(Debug, Clone)]
pub struct MessageStorage<'a> {
    info: &'static ShapeInfo,
    values: Vec<Option<SlotValue<'a>>>,
    present: BitVec,
    required_present: BitVec,
    unparsed: IntMap<u32, Bytes<'a>>,
}

impl<'a> MessageStorage<'a> {
    /// Creates empty storage for `info`'s shape — every slot absent,
    /// every required bit clear.
    pub fn new(info: &'static ShapeInfo) -> Self {
        Self {
            info,
            values: vec![None; info.entries.len()],
            present: bitvec![0; info.entries.len()],
            required_present: bitvec![0; info.required_tags.len()],
            unparsed: IntMap::default(),
        }
    }

    pub fn info(&self) -> &'static ShapeInfo {
        self.info
    }

    fn mark_present(&mut self, tag: Tag, slot: usize) {
        self.present.set(slot, true);
        if let Some(bit) = self.info.required_bit_of(tag) {
            self.required_present.set(bit, true);
        }
    }

    /// Stores a scalar field's raw bytes at the slot declared for
    /// `tag`. Used by the parser (which supplies `Bytes::Borrowed`) and
    /// by `set<T>` (which supplies `Bytes::Owned`).
    pub fn set_raw(&mut self, tag: Tag, bytes: Bytes<'a>) -> Result<(), AccessError> {
        let slot = self.info.slot_of(tag).ok_or(AccessError::WrongType(tag))?;
        self.values[slot] = Some(SlotValue::Scalar(bytes));
        self.mark_present(tag, slot);
        Ok(())
    }

    pub fn get_raw(&self, tag: Tag) -> Option<&[u8]> {
        let slot = self.info.slot_of(tag)?;
        match self.values[slot].as_ref()? {
            SlotValue::Scalar(b) => Some(b.as_slice()),
            SlotValue::Group(_) => None,
        }
    }

    /// `set<T>`: requires `T` be declared for `tag` in this
    /// shape and formats `v` into owned bytes.
    pub fn set<T>(&mut self, tag: Tag, v: T) -> Result<(), AccessError>
    where
        T: for<'b> FieldType<'b>,
    {
        let mut buf = Vec::new();
        v.serialize_with(&mut buf);
        self.set_raw(tag, Bytes::Owned(buf))
    }

    /// `get<T>`: fails with [`AccessError::Absent`] if the
    /// slot's presence bit is clear.
    pub fn get<T>(&'a self, tag: Tag) -> Result<T, AccessError>
    where
        T: FieldType<'a>,
    {
        let raw = self.get_raw(tag).ok_or(AccessError::Absent(tag))?;
        T::deserialize(raw).map_err(|_| AccessError::WrongType(tag))
    }

    /// `try_get<T>`: same as `get`, but reports absence as
    /// `Ok(None)` rather than an error.
    pub fn try_get<T>(&'a self, tag: Tag) -> Result<Option<T>, AccessError>
    where
        T: FieldType<'a>,
    {
        match self.get_raw(tag) {
            None => Ok(None),
            Some(raw) => T::deserialize(raw)
                .map(Some)
                .map_err(|_| AccessError::WrongType(tag)),
        }
    }

    pub fn is_present(&self, tag: Tag) -> bool {
        self.info
            .slot_of(tag)
            .map(|slot| self.present[slot])
            .unwrap_or(false)
    }

    /// Number of distinct fields with their presence bit set.
    pub fn present_count(&self) -> usize {
        self.present.count_ones()
    }

    /// `true` once every required slot has been set. Checked by the serializer before emitting anything.
    pub fn required_satisfied(&self) -> bool {
        self.required_present.all()
    }

    /// The declared tags whose required bit is still clear, in
    /// declared order — used to build `MissingRequired` errors.
    pub fn missing_required(&self) -> Vec<Tag> {
        self.info
            .required_tags
            .iter()
            .zip(self.required_present.iter())
            .filter(|(_, bit)| !**bit)
            .map(|(tag, _)| *tag)
            .collect()
    }

    /// Reserves capacity for a repeating-group slot and returns a
    /// builder for its records.
    pub fn create_group(&mut self, count_tag: Tag, hint: usize) -> Result<GroupBuilder<'a>, AccessError> {
        let slot = self
            .info
            .slot_of(count_tag)
            .ok_or(AccessError::WrongType(count_tag))?;
        let Entry::Group { inner, inner_index, .. } = &self.info.entries[slot] else {
            return Err(AccessError::WrongType(count_tag));
        };
        Ok(GroupBuilder {
            inner,
            inner_index,
            records: Vec::with_capacity(hint),
        })
    }

    /// Commits a group builder's records into the group's slot,
    /// updating presence bitmaps as if it were any other field.
    pub fn add_group(&mut self, count_tag: Tag, builder: GroupBuilder<'a>) -> Result<(), AccessError> {
        let slot = self
            .info
            .slot_of(count_tag)
            .ok_or(AccessError::WrongType(count_tag))?;
        self.values[slot] = Some(SlotValue::Group(builder.records));
        self.mark_present(count_tag, slot);
        Ok(())
    }

    /// Reads a group slot's ordered sequence of sub-records.
    pub fn group(&self, count_tag: Tag) -> Option<&[MessageStorage<'a>]> {
        let slot = self.info.slot_of(count_tag)?;
        match self.values[slot].as_ref()? {
            SlotValue::Group(records) => Some(records),
            SlotValue::Scalar(_) => None,
        }
    }

    pub fn group_mut(&mut self, count_tag: Tag) -> Option<&mut Vec<MessageStorage<'a>>> {
        let slot = self.info.slot_of(count_tag)?;
        match self.values[slot].as_mut()? {
            SlotValue::Group(records) => Some(records),
            SlotValue::Scalar(_) => None,
        }
    }

    /// Records an unknown tag's raw bytes verbatim.
    pub fn capture_unparsed(&mut self, tag: u32, bytes: Bytes<'a>) {
        self.unparsed.insert(tag, bytes);
    }

    pub fn unparsed(&self, tag: u32) -> Option<&[u8]> {
        self.unparsed.get(&tag).map(|b| b.as_slice())
    }

    pub fn unparsed_tags(&self) -> impl Iterator<Item = u32> + '_ {
        self.unparsed.keys().copied()
    }

    /// `to_owned()`: deep-copies every scalar's bytes and
    /// recursively promotes every group record. `present`/
    /// `required_present` are copied bit-for-bit.
    pub fn to_owned_storage(&self) -> MessageStorage<'static> {
        let values = self
            .values
            .iter()
            .map(|slot| {
                slot.as_ref().map(|v| match v {
                    SlotValue::Scalar(b) => SlotValue::Scalar(b.to_owned_bytes()),
                    SlotValue::Group(records) => {
                        SlotValue::Group(records.iter().map(|r| r.to_owned_storage()).collect())
                    }
                })
            })
            .collect();
        let unparsed = self
            .unparsed
            .iter()
            .map(|(tag, b)| (*tag, b.to_owned_bytes()))
            .collect();
        MessageStorage {
            info: self.info,
            values,
            present: self.present.clone(),
            required_present: self.required_present.clone(),
            unparsed,
        }
    }
}

/// Builder for a repeating-group slot's records: `instance()` starts a record, `add()` appends a
/// completed one after checking its own required bits are satisfied.
pub struct GroupBuilder<'a> {
    inner: &'a [Entry],
    inner_index: &'a crate::index::TagIndex,
    records: Vec<MessageStorage<'a>>,
}

impl<'a> GroupBuilder<'a> {
    /// Wraps already-parsed records for [`MessageStorage::add_group`].
    /// Used by the decoder, which builds each record directly off the
    /// wire rather than through [`GroupBuilder::instance`]/`add`.
    pub(crate) fn with_records(
        inner: &'a [Entry],
        inner_index: &'a crate::index::TagIndex,
        records: Vec<MessageStorage<'a>>,
    ) -> Self {
        Self { inner, inner_index, records }
    }

    /// Returns an empty inner record matching the group's declared
    /// sub-shape. Callers populate it with `set`/`set_raw` before
    /// calling [`GroupBuilder::add`].
    pub fn instance(&self) -> MessageStorage<'a> {
        // The inner shape has no message-type discriminator of its own;
        // it reuses the parent group's entries and index via a
        // synthesized ShapeInfo-free constructor.
        MessageStorage {
            info: leak_inner_info(self.inner, self.inner_index),
            values: vec![None; self.inner.len()],
            present: bitvec![0; self.inner.len()],
            required_present: bitvec![0; self.inner.iter().filter(|e| e.required()).count()],
            unparsed: IntMap::default(),
        }
    }

    /// Appends `record`, validating that every required inner field was
    /// set (that the record's `required_present` bitmap is full).
    pub fn add(&mut self, record: MessageStorage<'a>) -> Result<(), AccessError> {
        if !record.required_satisfied() {
            if let Some(tag) = record.missing_required().first() {
                return Err(AccessError::Absent(*tag));
            }
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Synthesizes a `'static`-lifetime [`ShapeInfo`] view over a group's
/// inner entries/index, which are themselves already `'static` data
/// owned by the enclosing shape's registered [`ShapeInfo`]. This lets
/// inner records reuse the exact same [`MessageStorage`] type as
/// top-level messages without duplicating the struct.
pub(crate) fn leak_inner_info(inner: &'static [Entry], inner_index: &'static crate::index::TagIndex) -> &'static ShapeInfo {
    use std::collections::HashMap;
    use std::sync::{Mutex, OnceLock};
    static CACHE: OnceLock<Mutex<HashMap<usize, &'static ShapeInfo>>> = OnceLock::new();
    let cache = CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    let key = inner.as_ptr() as usize;
    let mut guard = cache.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(info) = guard.get(&key) {
        return info;
    }
    let required_tags = inner
        .iter()
        .filter(|e| e.required())
        .map(|e| e.tag())
        .collect();
    let info: &'static ShapeInfo = Box::leak(Box::new(ShapeInfo {
        msg_type: "",
        entries: inner.to_vec(),
        index: inner_index.clone(),
        required_tags,
    }));
    guard.insert(key, info);
    info
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Entry, ShapeInfo};
    use fixcore_dictionary::FixDatatype;
    use std::sync::OnceLock;

    fn t(n: u32) -> Tag {
        Tag::new(n).unwrap()
    }

    fn test_shape() -> &'static ShapeInfo {
        static CELL: OnceLock<ShapeInfo> = OnceLock::new();
        CELL.get_or_init(|| {
            ShapeInfo::build(
                "X",
                vec![
                    Entry::field(t(1), true, FixDatatype::String),
                    Entry::field(t(2), false, FixDatatype::Int),
                ],
            )
            .unwrap()
        })
    }

    #[test]
    fn set_then_get_roundtrip() {
        let mut m = MessageStorage::new(test_shape());
        m.set(t(2), 42i64).unwrap();
        assert_eq!(m.get::<i64>(t(2)).unwrap(), 42);
        assert!(!m.required_satisfied());
        m.set_raw(t(1), Bytes::Borrowed(b"ABC")).unwrap();
        assert!(m.required_satisfied());
    }

    #[test]
    fn get_absent_errors() {
        let m = MessageStorage::new(test_shape());
        assert_eq!(m.get::<i64>(t(2)).unwrap_err(), AccessError::Absent(t(2)));
    }

    #[test]
    fn unknown_tag_is_rejected_by_set_raw() {
        let mut m = MessageStorage::new(test_shape());
        let err = m.set_raw(t(999), Bytes::Borrowed(b"x")).unwrap_err();
        assert_eq!(err, AccessError::WrongType(t(999)));
    }

    #[test]
    fn to_owned_promotes_borrowed_bytes() {
        let mut m = MessageStorage::new(test_shape());
        m.set_raw(t(1), Bytes::Borrowed(b"ABC")).unwrap();
        let owned = m.to_owned_storage();
        assert_eq!(owned.get_raw(t(1)), Some(&b"ABC"[..]));
        assert_eq!(owned.present_count(), m.present_count());
    }
}
