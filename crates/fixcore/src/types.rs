//! Primitive FIX field types: `Int`, `Char`, `Bool`, `Float`,
//! `String`, `Data`, `UTCTimestamp`. Each type knows how to parse itself
//! out of a raw byte slice and how to format itself into a buffer; the
//! codec never special-cases a primitive type outside this module.

use chrono::{NaiveDateTime, Timelike};
use rust_decimal::Decimal;
use std::str::FromStr;

/// A value that can appear as a FIX field. `'a` is the lifetime of the
/// input buffer a *view* value borrows from; owned values ignore it.
pub trait FieldType<'a>: Sized {
    type Error: std::fmt::Debug;

    /// Appends the textual representation of `self` to `buffer`,
    /// returning the number of bytes written.
    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize;

    /// Parses `data` (the bytes between `=` and the delimiter) into a
    /// typed value.
    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotUtf8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedInt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedBool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedFloat;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedTimestamp;

impl<'a> FieldType<'a> for i64 {
    type Error = MalformedInt;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        let start = buffer.len();
        buffer.extend_from_slice(self.to_string().as_bytes());
        buffer.len() - start
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(MalformedInt)
    }
}

/// FIX `Char`: exactly one ASCII byte.
impl<'a> FieldType<'a> for char {
    type Error = MalformedChar;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        let start = buffer.len();
        buffer.push(*self as u8);
        buffer.len() - start
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        if data.len() == 1 && data[0].is_ascii() {
            Ok(data[0] as char)
        } else {
            Err(MalformedChar)
        }
    }
}

/// FIX `Bool`: `Y` or `N`.
impl<'a> FieldType<'a> for bool {
    type Error = MalformedBool;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        buffer.push(if *self { b'Y' } else { b'N' });
        1
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        match data {
            b"Y" => Ok(true),
            b"N" => Ok(false),
            _ => Err(MalformedBool),
        }
    }
}

/// FIX `Float`: an arbitrary-precision decimal.
impl<'a> FieldType<'a> for Decimal {
    type Error = MalformedFloat;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        let start = buffer.len();
        buffer.extend_from_slice(self.to_string().as_bytes());
        buffer.len() - start
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        std::str::from_utf8(data)
            .ok()
            .and_then(|s| Decimal::from_str(s).ok())
            .ok_or(MalformedFloat)
    }
}

/// FIX `String`: ASCII, delimiter-terminated. View storage borrows the
/// slice directly; owned storage copies it in via `to_owned()`.
impl<'a> FieldType<'a> for &'a str {
    type Error = NotUtf8;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        let start = buffer.len();
        buffer.extend_from_slice(self.as_bytes());
        buffer.len() - start
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        std::str::from_utf8(data).map_err(|_| NotUtf8)
    }
}

/// FIX `Data`: length-prefixed binary, consumed verbatim (may contain
/// delimiter bytes). The companion `Length` field is read separately by
/// the parser before the `Data` field's own bytes are sliced out.
impl<'a> FieldType<'a> for &'a [u8] {
    type Error = std::convert::Infallible;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        let start = buffer.len();
        buffer.extend_from_slice(self);
        buffer.len() - start
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        Ok(data)
    }
}

/// FIX `UTCTimestamp`: `YYYYMMDD-HH:MM:SS[.sss]`, always UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcTimestamp(pub NaiveDateTime);

impl<'a> FieldType<'a> for UtcTimestamp {
    type Error = MalformedTimestamp;

    fn serialize_with(&self, buffer: &mut Vec<u8>) -> usize {
        let start = buffer.len();
        let millis = self.0.and_utc().timestamp_subsec_millis();
        if millis == 0 && self.0.nanosecond() == 0 {
            buffer.extend_from_slice(self.0.format("%Y%m%d-%H:%M:%S").to_string().as_bytes());
        } else {
            buffer.extend_from_slice(
                self.0
                    .format("%Y%m%d-%H:%M:%S%.3f")
                    .to_string()
                    .as_bytes(),
            );
        }
        buffer.len() - start
    }

    fn deserialize(data: &'a [u8]) -> Result<Self, Self::Error> {
        let s = std::str::from_utf8(data).map_err(|_| MalformedTimestamp)?;
        let parsed = NaiveDateTime::parse_from_str(s, "%Y%m%d-%H:%M:%S%.f")
            .map_err(|_| MalformedTimestamp)?;
        Ok(UtcTimestamp(parsed))
    }
}
