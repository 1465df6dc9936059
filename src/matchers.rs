use crate::folds;
use crate::indexing::Utf8Input;
use crate::types::Position;
use crate::unicode::{self, WordBreakClass};
use std::ops::Range;

/// The character data the matcher consults at runtime.
/// Implemented over the real Unicode tables by `IcuCharProperties`; tests
/// substitute small synthetic tables.
pub trait CharProperties: core::fmt::Debug {
    /// Simple case fold.
    fn fold(c: char) -> char;

    /// \return whether these two chars fold to the same value.
    fn fold_equals(c1: char, c2: char) -> bool {
        c1 == c2 || Self::fold(c1) == Self::fold(c2)
    }

    /// \return whether this is a word char for simple word boundaries.
    fn is_word_char(c: char) -> bool;

    /// LF, VT, FF, CR, NEL, LS and PS.
    fn is_line_terminator(c: char) -> bool {
        unicode::is_newline(c as u32)
    }

    /// The UAX #29 Word_Break class, for default word boundaries.
    fn word_break(c: char) -> WordBreakClass;
}

#[derive(Debug)]
pub struct IcuCharProperties {}

impl CharProperties for IcuCharProperties {
    fn fold(c: char) -> char {
        folds::fold(c)
    }

    fn is_word_char(c: char) -> bool {
        unicode::is_word_character(c as u32)
    }

    fn word_break(c: char) -> WordBreakClass {
        unicode::word_break_class(c as u32)
    }
}

/// Check whether the text of \p orig_range appears at \p pos, advancing pos
/// past it if so.
pub fn backref(input: &Utf8Input, orig_range: Range<Position>, pos: &mut Position) -> bool {
    let bytes = &input.contents()[orig_range];
    input.match_bytes(bytes, pos)
}

pub fn backref_icase<Props: CharProperties>(
    input: &Utf8Input,
    orig_range: Range<Position>,
    pos: &mut Position,
) -> bool {
    let mut ref_pos = orig_range.start;
    while ref_pos < orig_range.end {
        let c1 = match input.next_right(&mut ref_pos) {
            Some(c) => c,
            None => return false,
        };
        match input.next_right(pos) {
            Some(c2) if Props::fold_equals(c1, c2) => {}
            _ => return false,
        }
    }
    true
}
