//! Byte cursor over an input frame: a position into a borrowed slice, a
//! handful of matchers, and a scoped `Revert` guard for speculative
//! lookahead (used by the dispatcher to peek at `BeginString`/`MsgType`
//! and by the group parser to peek at the next tag before deciding
//! whether the current repeating-group record has ended).

/// The canonical FIX delimiter. Test harnesses commonly
/// substitute `|` for readability; `Cursor` takes the delimiter as a
/// field rather than a const generic so a single `Decoder`/`Encoder`
/// can be configured once via `Config::separator`
/// (`Decoder::config_mut().separator = b'|'`).
pub const SOH: u8 = 0x01;

#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    delim: u8,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8], delim: u8) -> Self {
        Self { data, pos: 0, delim }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn delim(&self) -> u8 {
        self.delim
    }

    /// Advances by `n` bytes, clamped to the end of the buffer.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    pub fn current(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Captures `self.pos` as the start of a token; pair with
    /// [`Cursor::view_from`] once the token's extent is known.
    pub fn mark(&self) -> usize {
        self.pos
    }

    pub fn view_from(&self, start: usize) -> &'a [u8] {
        &self.data[start..self.pos]
    }

    /// Repositions the cursor to a previously captured [`Cursor::mark`].
    /// Used by the group parser to put back a tag that turned out to
    /// belong to the surrounding message rather than the group.
    pub fn reset_to(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Reads a signed decimal integer at the current position and
    /// advances past it. Returns `None` (without advancing) if there is
    /// no digit at `pos`.
    pub fn match_int(&mut self) -> Option<i64> {
        let start = self.pos;
        let negative = self.current() == Some(b'-');
        if negative {
            self.advance(1);
        }
        let digits_start = self.pos;
        while matches!(self.current(), Some(b) if b.is_ascii_digit()) {
            self.advance(1);
        }
        if self.pos == digits_start {
            self.pos = start;
            return None;
        }
        // SAFETY-free: bytes in [digits_start, pos) are ASCII digits.
        let magnitude: i64 = std::str::from_utf8(&self.data[digits_start..self.pos])
            .ok()?
            .parse()
            .ok()?;
        Some(if negative { -magnitude } else { magnitude })
    }

    /// Advances exactly `n` bytes and returns a view over them, without
    /// looking for a delimiter. Used for length-prefixed `Data` fields.
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.remaining() < n {
            return None;
        }
        let start = self.pos;
        self.advance(n);
        Some(&self.data[start..self.pos])
    }

    /// Advances until `self.delim` is seen, returning the bytes before
    /// it and consuming the delimiter. Returns `None` at EOF without
    /// ever finding the delimiter.
    pub fn match_until_delim(&mut self) -> Option<&'a [u8]> {
        let start = self.pos;
        while let Some(b) = self.current() {
            if b == self.delim {
                let view = &self.data[start..self.pos];
                self.advance(1);
                return Some(view);
            }
            self.advance(1);
        }
        None
    }

    /// Advances one byte if it equals `c`.
    pub fn match_literal(&mut self, c: u8) -> bool {
        if self.current() == Some(c) {
            self.advance(1);
            true
        } else {
            false
        }
    }

    /// Matches a literal byte string exactly (case-sensitive), used only
    /// for `BeginString` comparison.
    pub fn match_version(&mut self, s: &str) -> bool {
        let bytes = s.as_bytes();
        if bytes.len() <= 7 {
            let mut packed = [0u8; 8];
            packed[..bytes.len()].copy_from_slice(bytes);
            let want = u64::from_le_bytes(packed);
            let Some(window) = self.data.get(self.pos..) else {
                return false;
            };
            let mut actual = [0u8; 8];
            let take = bytes.len().min(window.len());
            actual[..take].copy_from_slice(&window[..take]);
            if u64::from_le_bytes(actual) == want {
                self.advance(bytes.len());
                return true;
            }
            false
        } else if self.data[self.pos..].starts_with(bytes) {
            self.advance(bytes.len());
            true
        } else {
            false
        }
    }

    /// Opens a scoped revert guard: if the guard is dropped without
    /// [`Revert::commit`] being called, `self.pos` is restored to the
    /// position it had when the guard was created.
    pub fn revert(&mut self) -> Revert<'_, 'a> {
        let saved = self.pos;
        Revert {
            cursor: self,
            saved_pos: saved,
            active: true,
        }
    }
}

/// A scoped snapshot of a [`Cursor`]'s position. Used for tag lookahead: peek at the
/// next tag id, and if it turns out not to belong here, let the guard's
/// `Drop` put the cursor back before the tag so the caller that *does*
/// own that tag can read it from the top.
pub struct Revert<'c, 'a> {
    cursor: &'c mut Cursor<'a>,
    saved_pos: usize,
    active: bool,
}

impl<'c, 'a> Revert<'c, 'a> {
    /// Keeps the cursor's current position; the guard becomes a no-op.
    pub fn commit(mut self) {
        self.active = false;
    }

    /// Explicit alias for `commit`.
    pub fn ignore(self) {
        self.commit();
    }
}

impl<'c, 'a> Drop for Revert<'c, 'a> {
    fn drop(&mut self) {
        if self.active {
            self.cursor.pos = self.saved_pos;
        }
    }
}

impl<'c, 'a> std::ops::Deref for Revert<'c, 'a> {
    type Target = Cursor<'a>;
    fn deref(&self) -> &Cursor<'a> {
        self.cursor
    }
}

impl<'c, 'a> std::ops::DerefMut for Revert<'c, 'a> {
    fn deref_mut(&mut self) -> &mut Cursor<'a> {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_int_reads_digits() {
        let mut c = Cursor::new(b"123=x", SOH);
        assert_eq!(c.match_int(), Some(123));
        assert_eq!(c.current(), Some(b'='));
    }

    #[test]
    fn match_int_none_on_non_digit() {
        let mut c = Cursor::new(b"abc", SOH);
        assert_eq!(c.match_int(), None);
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn match_until_delim_consumes_delimiter() {
        let mut c = Cursor::new(b"hello|rest", b'|');
        assert_eq!(c.match_until_delim(), Some(&b"hello"[..]));
        assert_eq!(c.pos(), 6);
    }

    #[test]
    fn revert_restores_without_commit() {
        let mut c = Cursor::new(b"35=D|", b'|');
        {
            let mut r = c.revert();
            r.match_int();
        }
        assert_eq!(c.pos(), 0);
    }

    #[test]
    fn revert_commit_keeps_position() {
        let mut c = Cursor::new(b"35=D|", b'|');
        {
            let mut r = c.revert();
            r.match_int();
            r.commit();
        }
        assert_eq!(c.pos(), 2);
    }

    #[test]
    fn match_version_short_and_long() {
        let mut c = Cursor::new(b"FIX.4.2|", b'|');
        assert!(c.match_version("FIX.4.2"));
        let mut c2 = Cursor::new(b"FIXT.1.1|", b'|');
        assert!(c2.match_version("FIXT.1.1"));
    }
}
