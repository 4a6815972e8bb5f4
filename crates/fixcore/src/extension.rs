//! Shape composition: `AddTag`, `ChangeType`, `ExtendGroup`.
//!
//! Each change takes a [`ShapeInfo`] and produces a new one; changes
//! compose left-to-right via [`Change::apply_all`] and the result is
//! usable as an [`crate::dispatch::Override`] replacement. Incompatible
//! changes (tag already present for `AddTag`, missing tag for
//! `ChangeType`/`ExtendGroup`) surface as [`SchemaError`] — reported as a
//! `Result` from the (one-time, eager) shape-construction path rather
//! than as compiler errors, since shapes here are built from `const`
//! data rather than literal compiler input.

use crate::error::SchemaError;
use crate::schema::{Entry, FieldKind, ShapeInfo};
use fixcore_dictionary::{FixDatatype, Tag};

/// One change to apply to a shape's flattened entry list.
pub enum Change {
    /// Appends a new scalar field to the end of the shape's entry list.
    AddTag { tag: Tag, required: bool, datatype: FixDatatype },
    /// Rebinds the primitive type of an existing field.
    ChangeType { tag: Tag, new_type: FixDatatype },
    /// Appends additional inner entries to an existing repeating
    /// group's sub-shape.
    ExtendGroup { count_tag: Tag, extra: Vec<Entry> },
}

impl Change {
    pub fn apply(self, shape: &ShapeInfo) -> Result<ShapeInfo, SchemaError> {
        let mut entries = shape.entries.clone();
        match self {
            Change::AddTag { tag, required, datatype } => {
                if entries.iter().any(|e| e.tag() == tag) {
                    return Err(SchemaError::AlreadyPresent(tag));
                }
                entries.push(Entry::field(tag, required, datatype));
            }
            Change::ChangeType { tag, new_type } => {
                let entry = entries
                    .iter_mut()
                    .find(|e| e.tag() == tag)
                    .ok_or(SchemaError::NoSuchTag(tag))?;
                match entry {
                    Entry::Field { kind, .. } => *kind = FieldKind::Scalar(new_type),
                    Entry::Group { .. } => return Err(SchemaError::NoSuchTag(tag)),
                }
            }
            Change::ExtendGroup { count_tag, extra } => {
                let entry = entries
                    .iter_mut()
                    .find(|e| e.tag() == count_tag)
                    .ok_or(SchemaError::NoSuchGroup(count_tag))?;
                let Entry::Group { inner, .. } = entry else {
                    return Err(SchemaError::NoSuchGroup(count_tag));
                };
                inner.extend(extra);
                let rebuilt = Entry::group(
                    count_tag,
                    entry.required(),
                    std::mem::take(inner),
                );
                *entry = rebuilt;
            }
        }
        ShapeInfo::build(shape.msg_type, entries)
    }

    /// Applies a sequence of changes left-to-right, short-circuiting on
    /// the first incompatible one.
    pub fn apply_all(shape: &ShapeInfo, changes: impl IntoIterator<Item = Change>) -> Result<ShapeInfo, SchemaError> {
        let mut current = ShapeInfo::build(shape.msg_type, shape.entries.clone())?;
        for change in changes {
            current = change.apply(&current)?;
        }
        Ok(current)
    }
}
