use crate::types::Position;
use crate::util::{decode_utf8_seq, is_utf8_continuation, utf8_sequence_len};

/// \return whether a byte represents the start of a utf8 sequence (aka a
/// char boundary).
#[inline(always)]
fn is_seq_start(b: u8) -> bool {
    // "This is bit magic equivalent to: b < 128 || b >= 192"
    (b as i8) >= -0x40
}

/// Decodes chars to the left and right of byte positions in a str.
/// Positions are always char boundaries.
#[derive(Debug, Copy, Clone)]
pub struct Utf8Input<'a> {
    input: &'a str,
}

impl<'a> Utf8Input<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { input: s }
    }

    #[inline(always)]
    pub fn text(&self) -> &'a str {
        self.input
    }

    #[inline(always)]
    pub fn len(&self) -> Position {
        self.input.len()
    }

    #[inline(always)]
    pub fn contents(&self) -> &'a [u8] {
        self.input.as_bytes()
    }

    /// \return a byte at a given position.
    /// This asserts that we are not at the right end.
    #[inline(always)]
    fn getb(&self, pos: Position) -> u8 {
        debug_assert!(pos < self.len());
        if cfg!(feature = "prohibit-unsafe") {
            self.contents()[pos]
        } else {
            unsafe { *self.contents().get_unchecked(pos) }
        }
    }

    /// Assert that a position is a valid UTF8 character boundary.
    #[inline(always)]
    fn debug_assert_boundary(&self, pos: Position) {
        debug_assert!(pos <= self.len());
        debug_assert!(pos == self.len() || is_seq_start(self.getb(pos)));
    }

    /// Decode the char at \p pos and advance past it.
    #[inline(always)]
    pub fn next_right(&self, pos: &mut Position) -> Option<char> {
        self.debug_assert_boundary(*pos);
        if *pos == self.len() {
            return None;
        }

        let b0 = self.getb(*pos);
        if b0 < 128 {
            *pos += 1;
            return Some(b0 as char);
        }

        let len = utf8_sequence_len(b0);
        let codepoint = decode_utf8_seq(&self.contents()[*pos..*pos + len]);
        *pos += len;
        match char::from_u32(codepoint) {
            Some(c) => Some(c),
            None => rs_unreachable!("Should have decoded a valid char from utf8 sequence"),
        }
    }

    /// Decode the char ending at \p pos and retreat before it.
    #[inline(always)]
    pub fn next_left(&self, pos: &mut Position) -> Option<char> {
        self.debug_assert_boundary(*pos);
        if *pos == 0 {
            return None;
        }

        let z = self.getb(*pos - 1);
        if z < 128 {
            *pos -= 1;
            return Some(z as char);
        }

        // Back up over continuation bytes to the lead byte.
        let end = *pos;
        let mut start = end - 1;
        while is_utf8_continuation(self.getb(start)) {
            start -= 1;
        }
        let codepoint = decode_utf8_seq(&self.contents()[start..end]);
        *pos = start;
        self.debug_assert_boundary(*pos);
        match char::from_u32(codepoint) {
            Some(c) => Some(c),
            None => rs_unreachable!("Should have decoded a valid char from utf8 sequence"),
        }
    }

    #[inline(always)]
    pub fn peek_right(&self, mut pos: Position) -> Option<char> {
        self.next_right(&mut pos)
    }

    #[inline(always)]
    pub fn peek_left(&self, mut pos: Position) -> Option<char> {
        self.next_left(&mut pos)
    }

    /// \return the position one char to the right, or None at the end.
    #[inline(always)]
    pub fn next_right_pos(&self, pos: Position) -> Option<Position> {
        self.debug_assert_boundary(pos);
        if pos == self.len() {
            return None;
        }
        Some(pos + utf8_sequence_len(self.getb(pos)))
    }

    /// \return the position one char to the left, or None at the start.
    #[inline(always)]
    pub fn next_left_pos(&self, mut pos: Position) -> Option<Position> {
        self.debug_assert_boundary(pos);
        if pos == 0 {
            return None;
        }
        pos -= 1;
        while !is_seq_start(self.getb(pos)) {
            pos -= 1;
        }
        Some(pos)
    }

    /// \return whether the text at \p pos begins with \p bytes, advancing
    /// past them if so.
    #[inline(always)]
    pub fn match_bytes(&self, bytes: &[u8], pos: &mut Position) -> bool {
        let end = *pos + bytes.len();
        if end <= self.len() && &self.contents()[*pos..end] == bytes {
            *pos = end;
            true
        } else {
            false
        }
    }
}

/// Convert a byte offset into \p text to the equivalent UTF-16 index.
/// Chars outside the BMP count as two code units.
pub fn utf16_index(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().map(char::len_utf16).sum()
}

/// Convert a UTF-16 index into a byte offset. \return None if the index is
/// past the end or falls between the two halves of a surrogate pair.
pub fn byte_offset_for_utf16_index(text: &str, utf16_index: usize) -> Option<usize> {
    let mut units = 0;
    for (offset, c) in text.char_indices() {
        if units == utf16_index {
            return Some(offset);
        }
        units += c.len_utf16();
        if units > utf16_index {
            return None;
        }
    }
    if units == utf16_index {
        Some(text.len())
    } else {
        None
    }
}

/// Convert a byte offset into a code point index.
pub fn codepoint_index(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// Convert a code point index into a byte offset, or None if past the end.
pub fn byte_offset_for_codepoint_index(text: &str, index: usize) -> Option<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .nth(index)
}
