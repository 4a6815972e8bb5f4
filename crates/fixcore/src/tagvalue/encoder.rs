//! The tag-value serializer: reserve the `8=`/`9=` prefix, emit the
//! body, measure it, and back-patch the reserved `BodyLength` digits in
//! place rather than building a second buffer — then append the
//! checksum trailer. This does **not** auto-populate
//! `MsgSeqNum`/`SendingTime` before checking required-field completeness
//! (that belongs to an out-of-scope session layer); see `HeaderDefaults`
//! below.

use crate::error::WriteError;
use crate::schema::Entry;
use crate::storage::MessageStorage;
use crate::Config;
use fixcore_dictionary::{Tag, Version};

/// The width, in digits, reserved for the `BodyLength` field before the
/// body is measured. Bodies of 99,999 bytes or more fall back to
/// [`Vec::splice`]-based insertion, which is exercised by nothing this
/// codec emits in practice but kept correct regardless.
const BODYLEN_DIGITS: usize = 5;

/// A caller hook for populating header fields the serializer itself
/// deliberately leaves alone. `SendingTime`/`MsgSeqNum` population is an
/// explicit, optional step the caller runs against the header *before*
/// calling [`Encoder::write`], so a caller without a session layer can
/// simply not use it.
pub trait HeaderDefaults {
    fn apply(&self, header: &mut MessageStorage<'_>);
}

/// Serializes a header/body pair into a complete wire frame.
pub struct Encoder {
    config: Config,
}

impl Encoder {
    pub fn new() -> Self {
        Self { config: Config::default() }
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Writes `header` and `body` into one complete frame: `BeginString`
    /// and `BodyLength` are synthesized from `version` and the measured
    /// body length (callers never set tags 8/9 on `header` themselves —
    /// [`MessageStorage::set_raw`] for those tags is only ever called by
    /// the decoder); every other header field present is emitted in
    /// declared order, followed by the body, followed by the checksum
    /// trailer.
    pub fn write(
        &self,
        version: Version,
        header: &MessageStorage,
        body: &MessageStorage,
    ) -> Result<Vec<u8>, WriteError> {
        let mut missing = header.missing_required();
        missing.extend(body.missing_required());
        // BeginString/BodyLength are synthesized, not stored on the
        // caller's header, so their required bits (if declared) would
        // otherwise always read as missing.
        missing.retain(|t| t.get() != 8 && t.get() != 9);
        if !missing.is_empty() {
            return Err(WriteError::MissingRequired(missing));
        }

        let delim = self.config.separator;
        let tag8 = Tag::new(8).expect("8 is a valid tag id");
        let tag9 = Tag::new(9).expect("9 is a valid tag id");

        let mut buf = Vec::with_capacity(256);
        buf.extend_from_slice(b"8=");
        buf.extend_from_slice(version.as_str().as_bytes());
        buf.push(delim);
        buf.extend_from_slice(b"9=");
        let digits_start = buf.len();
        buf.resize(digits_start + BODYLEN_DIGITS, b'0');
        buf.push(delim);
        let body_start = buf.len();

        write_fields(&mut buf, header, delim, &[tag8, tag9]);
        write_fields(&mut buf, body, delim, &[]);

        let body_len = buf.len() - body_start;
        patch_body_length(&mut buf, digits_start, body_len);

        let checksum = (buf.iter().map(|b| *b as u32).sum::<u32>() % 256) as u8;
        buf.extend_from_slice(format!("10={checksum:03}").as_bytes());
        buf.push(delim);

        Ok(buf)
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Right-aligns `body_len`'s decimal digits into the reserved
/// `BODYLEN_DIGITS`-wide slot at `digits_start`, zero-padding on the
/// left. Falls back to splicing in extra bytes for the (practically
/// unreachable) case of a body 100,000 bytes or longer, so correctness
/// never depends on the reserved width being big enough.
fn patch_body_length(buf: &mut Vec<u8>, digits_start: usize, body_len: usize) {
    let digits = body_len.to_string();
    if digits.len() <= BODYLEN_DIGITS {
        let pad = BODYLEN_DIGITS - digits.len();
        buf[digits_start..digits_start + pad].fill(b'0');
        buf[digits_start + pad..digits_start + BODYLEN_DIGITS].copy_from_slice(digits.as_bytes());
    } else {
        let extra = digits.len() - BODYLEN_DIGITS;
        buf.splice(digits_start..digits_start, std::iter::repeat(0u8).take(extra));
        buf[digits_start..digits_start + digits.len()].copy_from_slice(digits.as_bytes());
    }
}

fn write_fields(buf: &mut Vec<u8>, storage: &MessageStorage, delim: u8, skip: &[Tag]) {
    for entry in &storage.info().entries {
        let tag = entry.tag();
        if skip.contains(&tag) {
            continue;
        }
        if !storage.is_present(tag) {
            continue;
        }
        match entry {
            Entry::Field { .. } => {
                buf.extend_from_slice(tag.get().to_string().as_bytes());
                buf.push(b'=');
                buf.extend_from_slice(storage.get_raw(tag).expect("presence bit implies a value"));
                buf.push(delim);
            }
            Entry::Group { .. } => {
                let records = storage.group(tag).expect("presence bit implies a value");
                buf.extend_from_slice(tag.get().to_string().as_bytes());
                buf.push(b'=');
                buf.extend_from_slice(records.len().to_string().as_bytes());
                buf.push(delim);
                for record in records {
                    write_fields(buf, record, delim, &[]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_shape;
    use crate::schema::{Entry, Shape};
    use crate::storage::Bytes;
    use fixcore_dictionary::FixDatatype;

    fn t(n: u32) -> Tag {
        Tag::new(n).unwrap()
    }

    message_shape! {
        pub struct TestHeader = "" => vec![
            Entry::field(t(49), true, FixDatatype::String),
            Entry::field(t(56), true, FixDatatype::String),
        ]
    }

    message_shape! {
        pub struct TestLogon = "A" => vec![
            Entry::field(t(98), true, FixDatatype::Int),
            Entry::field(t(108), true, FixDatatype::Int),
            Entry::group(t(384), false, vec![
                Entry::field(t(372), true, FixDatatype::String),
                Entry::field(t(385), false, FixDatatype::Char),
            ]),
        ]
    }

    fn checksum_of(bytes: &[u8]) -> u8 {
        (bytes.iter().map(|b| *b as u32).sum::<u32>() % 256) as u8
    }

    #[test]
    fn writes_a_simple_frame_with_valid_trailer() {
        let mut header = MessageStorage::new(TestHeader::info());
        header.set_raw(t(49), Bytes::Borrowed(b"SENDER")).unwrap();
        header.set_raw(t(56), Bytes::Borrowed(b"TARGET")).unwrap();

        let mut body = MessageStorage::new(TestLogon::info());
        body.set(t(98), 0i64).unwrap();
        body.set(t(108), 30i64).unwrap();

        let encoder = Encoder::new();
        let frame = encoder.write(Version::Fix44, &header, &body).unwrap();
        let frame_str = String::from_utf8(frame.iter().map(|b| if *b == 1 { b'|' } else { *b }).collect()).unwrap();

        assert!(frame_str.starts_with("8=FIX.4.4|9="));
        assert!(frame_str.contains("49=SENDER|"));
        assert!(frame_str.contains("98=0|"));

        let checksum_field_start = frame.len() - 7;
        let expected = checksum_of(&frame[..checksum_field_start]);
        assert!(frame_str.ends_with(&format!("10={expected:03}|")));
    }

    #[test]
    fn writes_a_nonempty_group_in_declared_order() {
        let mut header = MessageStorage::new(TestHeader::info());
        header.set_raw(t(49), Bytes::Borrowed(b"S")).unwrap();
        header.set_raw(t(56), Bytes::Borrowed(b"T")).unwrap();

        let mut body = MessageStorage::new(TestLogon::info());
        body.set(t(98), 0i64).unwrap();
        body.set(t(108), 30i64).unwrap();
        let mut group = body.create_group(t(384), 1).unwrap();
        let mut record = group.instance();
        record.set_raw(t(372), Bytes::Borrowed(b"TEST")).unwrap();
        group.add(record).unwrap();
        body.add_group(t(384), group).unwrap();

        let frame = Encoder::new().write(Version::Fix44, &header, &body).unwrap();
        let frame_str = String::from_utf8(frame.iter().map(|b| if *b == 1 { b'|' } else { *b }).collect()).unwrap();
        assert!(frame_str.contains("384=1|372=TEST|"));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let header = MessageStorage::new(TestHeader::info());
        let body = MessageStorage::new(TestLogon::info());
        let err = Encoder::new().write(Version::Fix44, &header, &body).unwrap_err();
        assert!(matches!(err, WriteError::MissingRequired(_)));
    }

    struct SessionDefaults {
        sender: &'static str,
        target: &'static str,
    }

    impl HeaderDefaults for SessionDefaults {
        fn apply(&self, header: &mut MessageStorage<'_>) {
            header.set_raw(t(49), Bytes::Borrowed(self.sender.as_bytes())).unwrap();
            header.set_raw(t(56), Bytes::Borrowed(self.target.as_bytes())).unwrap();
        }
    }

    #[test]
    fn header_defaults_hook_populates_header_before_write() {
        let mut header = MessageStorage::new(TestHeader::info());
        let defaults = SessionDefaults { sender: "SENDER", target: "TARGET" };
        defaults.apply(&mut header);

        let mut body = MessageStorage::new(TestLogon::info());
        body.set(t(98), 0i64).unwrap();
        body.set(t(108), 30i64).unwrap();

        let frame = Encoder::new().write(Version::Fix44, &header, &body).unwrap();
        let frame_str = String::from_utf8(frame.iter().map(|b| if *b == 1 { b'|' } else { *b }).collect()).unwrap();
        assert!(frame_str.contains("49=SENDER|"));
        assert!(frame_str.contains("56=TARGET|"));
    }
}
