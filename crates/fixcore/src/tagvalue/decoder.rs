//! The tag-value parser: a header/body state machine built around a
//! per-group declared-inner-tag bitset, where a tag that's not valid for
//! the current group but is valid for the surrounding message signals
//! that the group has ended.

use crate::cursor::Cursor;
use crate::dispatch::{resolve_shape, OverrideSet, Registry};
use crate::error::ParseError;
use crate::index::TagIndex;
use crate::schema::{Entry, FieldKind, ShapeInfo};
use crate::storage::{Bytes, GroupBuilder, MessageStorage};
use crate::Config;
use fixcore_dictionary::{Tag, Version};

/// A successfully decoded frame: typed-accessor views over the header
/// and the message body.
pub struct Frame<'a> {
    pub header: MessageStorage<'a>,
    pub body: MessageStorage<'a>,
}

/// Parses tag-value frames against a [`Registry`] of per-version
/// dictionaries, honoring an optional [`OverrideSet`] and [`Config`].
pub struct Decoder {
    registry: Registry,
    overrides: OverrideSet,
    config: Config,
}

impl Decoder {
    pub fn new(registry: Registry) -> Self {
        Self { registry, overrides: OverrideSet::new(), config: Config::default() }
    }

    pub fn with_overrides(mut self, overrides: OverrideSet) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Decodes one complete frame, returning typed views over the
    /// header and body without copying any field bytes.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Result<Frame<'a>, ParseError> {
        let mut cursor = Cursor::new(bytes, self.config.separator);

        let (version, version_str) = match_version_tag(&mut cursor, self.config.separator)?;

        let body_len_raw = match_known_tag(&mut cursor, 9)?;
        let declared_len: usize = std::str::from_utf8(body_len_raw)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or(ParseError::MalformedField { tag: tag(9) })?;
        let body_start = cursor.pos();

        let msg_type_raw = match_known_tag(&mut cursor, 35)?;
        let msg_type = std::str::from_utf8(msg_type_raw)
            .map_err(|_| ParseError::MalformedField { tag: tag(35) })?;

        let dict = self
            .registry
            .get(version)
            .ok_or_else(|| ParseError::InvalidVersion { value: version_str.to_string() })?;
        let shape = resolve_shape(dict, &self.overrides, msg_type).ok_or_else(|| {
            ParseError::UnknownMessageType { msgtype: msg_type.to_string(), version: version.to_string() }
        })?;

        let mut header = MessageStorage::new(dict.header);
        let mut body = MessageStorage::new(shape);
        header
            .set_raw(tag(8), Bytes::Borrowed(version_str.as_bytes()))
            .map_err(|_| ParseError::MalformedField { tag: tag(8) })?;
        header
            .set_raw(tag(9), Bytes::Borrowed(body_len_raw))
            .map_err(|_| ParseError::MalformedField { tag: tag(9) })?;
        header
            .set_raw(tag(35), Bytes::Borrowed(msg_type_raw))
            .map_err(|_| ParseError::MalformedField { tag: tag(35) })?;

        let mut state = State::Header;
        let before_checksum;
        let checksum_value: u8;

        loop {
            let field_start = cursor.pos();
            let Some(raw_tag) = cursor.match_int() else {
                return Err(ParseError::Truncated);
            };
            if raw_tag <= 0 || raw_tag > u16::MAX as i64 {
                return Err(ParseError::MalformedField { tag: tag(35) });
            }
            if !cursor.match_literal(b'=') {
                return Err(ParseError::Truncated);
            }

            if raw_tag == 10 {
                before_checksum = field_start;
                let value = cursor.match_int().ok_or(ParseError::Truncated)?;
                // No trailing separator required.
                cursor.match_literal(self.config.separator);
                if !(0..=255).contains(&value) {
                    return Err(ParseError::MalformedField { tag: tag(10) });
                }
                checksum_value = value as u8;
                break;
            }
            if raw_tag <= 0 || raw_tag > u16::MAX as i64 {
                return Err(ParseError::Truncated);
            }
            let raw_tag = raw_tag as u32;
            let this_tag = Tag::new(raw_tag).ok_or(ParseError::Truncated)?;

            match state {
                State::Header => {
                    if let Some(slot) = dict.header.slot_of(this_tag) {
                        parse_entry(
                            &mut cursor,
                            &dict.header.entries[slot],
                            &mut header,
                            this_tag,
                            &dict.header.index,
                            self.config.strict_mode,
                        )?;
                        continue;
                    }
                    if let Some(slot) = shape.slot_of(this_tag) {
                        state = State::Body;
                        parse_entry(
                            &mut cursor,
                            &shape.entries[slot],
                            &mut body,
                            this_tag,
                            &shape.index,
                            self.config.strict_mode,
                        )?;
                        continue;
                    }
                    capture_unknown(&mut cursor, &mut header, raw_tag, self.config.strict_mode)?;
                }
                State::Body => {
                    if let Some(slot) = shape.slot_of(this_tag) {
                        parse_entry(
                            &mut cursor,
                            &shape.entries[slot],
                            &mut body,
                            this_tag,
                            &shape.index,
                            self.config.strict_mode,
                        )?;
                        continue;
                    }
                    capture_unknown(&mut cursor, &mut body, raw_tag, self.config.strict_mode)?;
                }
            }
        }

        if self.config.validate_length {
            let actual = before_checksum - body_start;
            if actual != declared_len {
                return Err(ParseError::BodyLengthMismatch { expected: declared_len, actual });
            }
        }
        if self.config.validate_checksum {
            let sum: u32 = bytes[..before_checksum].iter().map(|b| *b as u32).sum();
            let actual = (sum % 256) as u8;
            if actual != checksum_value {
                return Err(ParseError::ChecksumMismatch { expected: checksum_value, actual });
            }
        }

        if !header.required_satisfied() || !body.required_satisfied() {
            let mut missing = header.missing_required();
            missing.extend(body.missing_required());
            return Err(ParseError::MissingRequired(missing));
        }

        Ok(Frame { header, body })
    }

    /// Decodes a frame and hands the header/body views to `visitor`.
    pub fn visit<'a>(
        &self,
        bytes: &'a [u8],
        visitor: impl FnOnce(&MessageStorage<'a>, &MessageStorage<'a>),
    ) -> Result<(), ParseError> {
        let frame = self.decode(bytes)?;
        visitor(&frame.header, &frame.body);
        Ok(())
    }
}

enum State {
    Header,
    Body,
}

fn tag(n: u32) -> Tag {
    Tag::new(n).expect("well-known tag id is nonzero and fits u16")
}

/// Matches `<id>=<value><delim>` at the cursor, requiring `id` to equal
/// `expect_id` — used only for the fixed-position header tags
/// (`BodyLength`, `MsgType`) that must appear first and in order.
fn match_known_tag<'a>(cursor: &mut Cursor<'a>, expect_id: i64) -> Result<&'a [u8], ParseError> {
    let id = cursor.match_int().ok_or(ParseError::Truncated)?;
    if id != expect_id {
        return Err(ParseError::Truncated);
    }
    if !cursor.match_literal(b'=') {
        return Err(ParseError::Truncated);
    }
    cursor.match_until_delim().ok_or(ParseError::Truncated)
}

const KNOWN_VERSIONS: [Version; 4] =
    [Version::Fix42, Version::Fix43, Version::Fix44, Version::Fixt11];

/// Matches `8=<value><delim>`, trying each known version as a single
/// branchless byte-packed compare ([`Cursor::match_version`]) before
/// falling back to a generic scan (for error reporting only — an
/// unrecognized `BeginString` is always a parse failure).
fn match_version_tag<'a>(cursor: &mut Cursor<'a>, delim: u8) -> Result<(Version, &'a str), ParseError> {
    let id = cursor.match_int().ok_or(ParseError::Truncated)?;
    if id != 8 {
        return Err(ParseError::Truncated);
    }
    if !cursor.match_literal(b'=') {
        return Err(ParseError::Truncated);
    }
    let start = cursor.pos();
    for version in KNOWN_VERSIONS {
        if cursor.match_version(version.as_str()) {
            let raw = cursor.view_from(start);
            if !cursor.match_literal(delim) {
                return Err(ParseError::Truncated);
            }
            let s = std::str::from_utf8(raw).expect("version literals are ASCII");
            return Ok((version, s));
        }
    }
    let raw = cursor.match_until_delim().ok_or(ParseError::Truncated)?;
    Err(ParseError::InvalidVersion { value: String::from_utf8_lossy(raw).into_owned() })
}

fn capture_unknown<'a>(
    cursor: &mut Cursor<'a>,
    storage: &mut MessageStorage<'a>,
    raw_tag: u32,
    strict_mode: bool,
) -> Result<(), ParseError> {
    let value = cursor.match_until_delim().ok_or(ParseError::Truncated)?;
    if strict_mode {
        return Err(ParseError::UnknownTag(raw_tag));
    }
    log_unknown_tag(raw_tag, "message");
    storage.capture_unparsed(raw_tag, Bytes::Borrowed(value));
    Ok(())
}

/// Traces an unknown tag's capture, naming it and its primitive category
/// when `fixcore_dictionary::catalogue` happens to recognize it — this
/// shape didn't declare the tag, but the codec's well-known-field
/// catalogue might still know what it is.
fn log_unknown_tag(raw_tag: u32, scope: &str) {
    let known = Tag::new(raw_tag).and_then(|t| fixcore_dictionary::catalogue().lookup(t));
    match known {
        Some(def) => log::trace!(
            "capturing unrecognized tag {raw_tag} ({}, {:?}) within a {scope} as unparsed",
            def.name,
            def.datatype.basetype(),
        ),
        None => log::trace!("capturing unrecognized tag {raw_tag} within a {scope} as unparsed"),
    }
}

/// Parses one declared entry's value (scalar, length-prefixed data, or
/// a nested repeating group) into `storage`. The cursor is positioned
/// just after the entry's `=`.
fn parse_entry<'a>(
    cursor: &mut Cursor<'a>,
    entry: &'static Entry,
    storage: &mut MessageStorage<'a>,
    this_tag: Tag,
    container_index: &'static TagIndex,
    strict_mode: bool,
) -> Result<(), ParseError> {
    match entry {
        Entry::Field { kind: FieldKind::Data { len_tag }, .. } => {
            let len_raw = storage
                .get_raw(*len_tag)
                .ok_or(ParseError::MalformedField { tag: this_tag })?;
            let n: usize = std::str::from_utf8(len_raw)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(ParseError::MalformedField { tag: *len_tag })?;
            let data = cursor.take(n).ok_or(ParseError::Truncated)?;
            if !cursor.match_literal(cursor.delim()) {
                return Err(ParseError::Truncated);
            }
            storage
                .set_raw(this_tag, Bytes::Borrowed(data))
                .map_err(|_| ParseError::MalformedField { tag: this_tag })?;
        }
        Entry::Field { .. } => {
            let value = cursor.match_until_delim().ok_or(ParseError::Truncated)?;
            storage
                .set_raw(this_tag, Bytes::Borrowed(value))
                .map_err(|_| ParseError::MalformedField { tag: this_tag })?;
        }
        Entry::Group { inner, inner_index, .. } => {
            let count_raw = cursor.match_until_delim().ok_or(ParseError::Truncated)?;
            let hint: usize = std::str::from_utf8(count_raw)
                .ok()
                .and_then(|s| s.parse().ok())
                .ok_or(ParseError::MalformedField { tag: this_tag })?;
            let records = parse_group(cursor, inner, inner_index, container_index, hint, strict_mode)?;
            let actual = records.len();
            if actual != hint {
                log::warn!(
                    "group {this_tag} declared {hint} record(s) but {actual} were parsed; treating the count as a hint"
                );
            }
            storage
                .add_group(this_tag, GroupBuilder::with_records(inner, inner_index, records))
                .map_err(|_| ParseError::MalformedField { tag: this_tag })?;
        }
    }
    Ok(())
}

/// Parses a repeating group's records: a record is complete once a
/// declared inner tag repeats; an undeclared tag that is valid for the
/// *enclosing scope* ends the group (the cursor is repositioned before
/// it); an undeclared tag that is valid nowhere is captured as unparsed
/// (or rejected, in strict mode). `container_index` is that enclosing
/// scope — the top-level message/header for a first-level group, or the
/// parent record's own inner index for a group nested inside another
/// group's record — never the top-level message unconditionally, since a
/// tag that only terminates a nested group (such as the outer group's
/// own leading tag) would otherwise be neither recognized as a
/// terminator nor reset, and would be swallowed into the wrong record.
/// `declared_count` is treated as a capacity hint rather than a hard
/// bound, since real counterparties are known to send truncated or
/// padded counts.
fn parse_group<'a>(
    cursor: &mut Cursor<'a>,
    inner: &'static [Entry],
    inner_index: &'static TagIndex,
    container_index: &'static TagIndex,
    declared_count: usize,
    strict_mode: bool,
) -> Result<Vec<MessageStorage<'a>>, ParseError> {
    let mut records: Vec<MessageStorage<'a>> = Vec::with_capacity(declared_count);
    let mut seen: smallvec::SmallVec<[bool; 16]> = smallvec::smallvec![false; inner.len()];
    let mut current = MessageStorage::new(crate::storage::leak_inner_info(inner, inner_index));
    let mut current_has_fields = false;

    loop {
        if cursor.eof() {
            break;
        }
        let before_tag = cursor.pos();
        let Some(raw_tag) = cursor.match_int() else {
            break;
        };
        if raw_tag == 10 {
            // Tag 10 always terminates the frame, even mid-group.
            cursor.reset_to(before_tag);
            break;
        }
        if raw_tag <= 0 || raw_tag > u16::MAX as i64 {
            return Err(ParseError::Truncated);
        }
        let this_tag = Tag::new(raw_tag as u32).ok_or(ParseError::Truncated)?;

        if !inner_index.contains(this_tag) {
            if container_index.contains(this_tag) {
                cursor.reset_to(before_tag);
                break;
            }
            if !cursor.match_literal(b'=') {
                return Err(ParseError::Truncated);
            }
            capture_unknown_into_group(cursor, &mut current, raw_tag as u32, strict_mode)?;
            current_has_fields = true;
            continue;
        }

        let slot = inner_index.slot_of(this_tag).expect("checked contains above");
        if !cursor.match_literal(b'=') {
            return Err(ParseError::Truncated);
        }
        if seen[slot] {
            records.push(std::mem::replace(
                &mut current,
                MessageStorage::new(crate::storage::leak_inner_info(inner, inner_index)),
            ));
            seen.iter_mut().for_each(|s| *s = false);
            current_has_fields = false;
        }
        seen[slot] = true;
        current_has_fields = true;
        // A group nested inside this record's own fields (e.g. `711`
        // inside a `268` record) must treat *this* record's scope as its
        // surrounding message, not whatever scope enclosed this group —
        // otherwise a tag that only ends the nested group (like the
        // outer group's own leading tag) is neither recognized as ending
        // it nor reset, and gets swallowed into the wrong record.
        parse_entry(cursor, &inner[slot], &mut current, this_tag, inner_index, strict_mode)?;
    }

    if current_has_fields {
        records.push(current);
    }
    Ok(records)
}

fn capture_unknown_into_group<'a>(
    cursor: &mut Cursor<'a>,
    storage: &mut MessageStorage<'a>,
    raw_tag: u32,
    strict_mode: bool,
) -> Result<(), ParseError> {
    let value = cursor.match_until_delim().ok_or(ParseError::Truncated)?;
    if strict_mode {
        return Err(ParseError::UnknownTag(raw_tag));
    }
    log_unknown_tag(raw_tag, "group record");
    storage.capture_unparsed(raw_tag, Bytes::Borrowed(value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::VersionDictionary;
    use crate::message_shape;
    use crate::schema::Entry;
    use fixcore_dictionary::FixDatatype;

    fn t(n: u32) -> Tag {
        Tag::new(n).unwrap()
    }

    message_shape! {
        pub struct TestHeader = "" => vec![
            Entry::field(t(8), true, FixDatatype::String),
            Entry::field(t(9), true, FixDatatype::Int),
            Entry::field(t(35), true, FixDatatype::String),
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

    fn registry() -> Registry {
        let mut reg = Registry::new();
        reg.register(VersionDictionary::new(
            Version::Fix44,
            TestHeader::info(),
            [TestLogon::info()],
        ));
        reg
    }

    fn with_soh(s: &str) -> Vec<u8> {
        s.replace('|', "\u{1}").into_bytes()
    }

    fn checksum(bytes: &[u8]) -> u8 {
        (bytes.iter().map(|b| *b as u32).sum::<u32>() % 256) as u8
    }

    fn frame(body: &str) -> Vec<u8> {
        let prefix = format!("8=FIX.4.4|9={}|", body.replace('|', "\u{1}").len());
        let mut bytes = with_soh(&prefix);
        bytes.extend(with_soh(body));
        let sum = checksum(&bytes);
        bytes.extend(with_soh(&format!("10={sum:03}|")));
        bytes
    }

    #[test]
    fn decodes_simple_logon() {
        let msg = frame("35=A|49=SENDER|56=TARGET|98=0|108=30|");
        let decoder = Decoder::new(registry());
        let decoded = decoder.decode(&msg).unwrap();
        assert_eq!(decoded.header.get::<&str>(t(49)).unwrap(), "SENDER");
        assert_eq!(decoded.body.get::<i64>(t(108)).unwrap(), 30);
        assert!(!decoded.body.is_present(t(384)));
    }

    #[test]
    fn decodes_repeating_group_with_multiple_records() {
        let msg = frame("35=A|49=SENDER|56=TARGET|98=0|108=30|384=2|372=TEST|385=C|372=MD|");
        let decoder = Decoder::new(registry());
        let decoded = decoder.decode(&msg).unwrap();
        let records = decoded.body.group(t(384)).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get::<&str>(t(372)).unwrap(), "TEST");
        assert_eq!(records[0].get::<char>(t(385)).unwrap(), 'C');
        assert_eq!(records[1].get::<&str>(t(372)).unwrap(), "MD");
        assert!(!records[1].is_present(t(385)));
    }

    #[test]
    fn unknown_tag_is_captured_when_not_strict() {
        let msg = frame("35=A|49=SENDER|56=TARGET|98=0|108=30|9999=hello|");
        let decoder = Decoder::new(registry());
        let decoded = decoder.decode(&msg).unwrap();
        assert_eq!(decoded.body.unparsed(9999), Some(&b"hello"[..]));
    }

    #[test]
    fn unknown_tag_errors_in_strict_mode() {
        let msg = frame("35=A|49=SENDER|56=TARGET|98=0|108=30|9999=hello|");
        let mut decoder = Decoder::new(registry());
        decoder.config_mut().strict_mode = true;
        let err = decoder.decode(&msg).unwrap_err();
        assert_eq!(err, ParseError::UnknownTag(9999));
    }

    #[test]
    fn detects_checksum_mismatch() {
        let mut msg = frame("35=A|49=SENDER|56=TARGET|98=0|108=30|");
        let last = msg.len();
        msg[last - 4] = b'9'; // perturb the checksum's last digit
        let decoder = Decoder::new(registry());
        assert!(matches!(
            decoder.decode(&msg).unwrap_err(),
            ParseError::ChecksumMismatch { .. }
        ));
    }

    #[test]
    fn missing_required_field_is_reported() {
        let msg = frame("35=A|49=SENDER|56=TARGET|98=0|");
        let decoder = Decoder::new(registry());
        let err = decoder.decode(&msg).unwrap_err();
        assert!(matches!(err, ParseError::MissingRequired(tags) if tags == vec![t(108)]));
    }
}
