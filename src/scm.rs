//! Matchers for instructions which always consume exactly one char.

use crate::bytesearch::{AsciiBitmap, ByteSet};
use crate::codepointset::CodePointSet;
use crate::indexing::Utf8Input;
use crate::types::Position;

/// A trait for things that match a single char.
pub trait SingleCharMatcher {
    /// \return whether we match the character at the given position, advancing
    /// the position if so. On a false return, the position is unspecified.
    fn matches(&self, input: &Utf8Input, pos: &mut Position) -> bool;
}

/// Insn::Char
pub struct Char {
    pub c: char,
}

impl SingleCharMatcher for Char {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut Position) -> bool {
        input.next_right(pos) == Some(self.c)
    }
}

/// Insn::AsciiBracket
pub struct MatchByteSet<'a, Bytes: ByteSet> {
    pub bytes: &'a Bytes,
}

impl<Bytes: ByteSet> SingleCharMatcher for MatchByteSet<'_, Bytes> {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut Position) -> bool {
        match input.contents().get(*pos) {
            // Non-ASCII lead bytes are never in an ASCII set.
            Some(&b) if self.bytes.contains(b) => {
                *pos += 1;
                true
            }
            _ => false,
        }
    }
}

/// Insn::Bracket
pub struct Bracket<'a> {
    pub cps: &'a CodePointSet,
}

impl SingleCharMatcher for Bracket<'_> {
    #[inline(always)]
    fn matches(&self, input: &Utf8Input, pos: &mut Position) -> bool {
        match input.next_right(pos) {
            Some(c) => self.cps.contains(c as u32),
            None => false,
        }
    }
}

/// Insn::JustFail
pub struct Nothing {}

impl SingleCharMatcher for Nothing {
    #[inline(always)]
    fn matches(&self, _input: &Utf8Input, _pos: &mut Position) -> bool {
        false
    }
}

/// Wrap an ASCII bitmap as a matcher.
pub fn ascii_bracket(bitmap: &AsciiBitmap) -> MatchByteSet<'_, AsciiBitmap> {
    MatchByteSet { bytes: bitmap }
}
