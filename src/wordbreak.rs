//! Word boundary detection.
//!
//! Two algorithms are supported. The default follows the UAX #29 word
//! segmentation rules (without the emoji ZWJ sequence rule). The simple
//! algorithm places a boundary wherever word-character-ness changes.

use crate::matchers::CharProperties;
use crate::unicode::WordBreakClass;
use crate::unicode::WordBreakClass::*;

/// Which definition of "word boundary" to use.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum WordBreakAlgorithm {
    /// UAX #29 word segmentation.
    #[default]
    Default,
    /// A boundary between a word character and a non-word character.
    Simple,
}

fn is_ignorable(cls: WordBreakClass) -> bool {
    matches!(cls, Extend | Format | ZWJ)
}

fn is_newline_class(cls: WordBreakClass) -> bool {
    matches!(cls, CR | LF | Newline)
}

fn is_ahletter(cls: WordBreakClass) -> bool {
    matches!(cls, ALetter | HebrewLetter)
}

fn is_midnumletq(cls: WordBreakClass) -> bool {
    matches!(cls, MidNumLet | SingleQuote)
}

/// The class of the char logically before \p pos, skipping
/// Extend/Format/ZWJ runs unless they directly follow a newline or the start.
/// \return the class and the position where that logical char starts.
fn prev_logical<P: CharProperties>(text: &str, pos: usize) -> Option<(WordBreakClass, usize)> {
    let mut last_ignorable = None;
    for (offset, c) in text[..pos].char_indices().rev() {
        let cls = P::word_break(c);
        if is_ignorable(cls) {
            last_ignorable = Some((cls, offset));
            continue;
        }
        if is_newline_class(cls) && last_ignorable.is_some() {
            return last_ignorable;
        }
        return Some((cls, offset));
    }
    last_ignorable
}

/// The class of the first non-ignorable char at or after \p pos.
fn next_logical<P: CharProperties>(text: &str, pos: usize) -> Option<(WordBreakClass, usize)> {
    text[pos..]
        .char_indices()
        .map(|(offset, c)| (P::word_break(c), pos + offset))
        .find(|(cls, _)| !is_ignorable(*cls))
}

/// \return whether \p pos is a UAX #29 word boundary in \p text.
fn is_default_boundary<P: CharProperties>(text: &str, pos: usize) -> bool {
    // WB1, WB2.
    if pos == 0 || pos == text.len() {
        return !text.is_empty();
    }
    let (prev_raw, next_raw) = match (text[..pos].chars().next_back(), text[pos..].chars().next()) {
        (Some(p), Some(n)) => (P::word_break(p), P::word_break(n)),
        _ => return true,
    };
    // WB3 through WB3d.
    if prev_raw == CR && next_raw == LF {
        return false;
    }
    if is_newline_class(prev_raw) || is_newline_class(next_raw) {
        return true;
    }
    if prev_raw == WSegSpace && next_raw == WSegSpace {
        return false;
    }
    // WB4.
    if is_ignorable(next_raw) {
        return false;
    }

    let (l1, l1_pos) = match prev_logical::<P>(text, pos) {
        Some(found) => found,
        None => return true,
    };
    let l0 = prev_logical::<P>(text, l1_pos).map(|(cls, _)| cls);
    let r1 = next_raw;
    let r2 = text[pos..]
        .chars()
        .next()
        .and_then(|c| next_logical::<P>(text, pos + c.len_utf8()))
        .map(|(cls, _)| cls);

    let no_break = match (l1, r1) {
        // WB5.
        (a, b) if is_ahletter(a) && is_ahletter(b) => true,
        // WB6.
        (a, b) if is_ahletter(a) && (b == MidLetter || is_midnumletq(b)) => {
            r2.map_or(false, is_ahletter)
        }
        // WB7.
        (a, b) if (a == MidLetter || is_midnumletq(a)) && is_ahletter(b) => {
            l0.map_or(false, is_ahletter)
        }
        // WB7a.
        (HebrewLetter, SingleQuote) => true,
        // WB7b.
        (HebrewLetter, DoubleQuote) => r2 == Some(HebrewLetter),
        // WB7c.
        (DoubleQuote, HebrewLetter) => l0 == Some(HebrewLetter),
        // WB8, WB9, WB10.
        (Numeric, Numeric) => true,
        (a, Numeric) if is_ahletter(a) => true,
        (Numeric, b) if is_ahletter(b) => true,
        // WB11.
        (a, Numeric) if a == MidNum || is_midnumletq(a) => l0 == Some(Numeric),
        // WB12.
        (Numeric, b) if b == MidNum || is_midnumletq(b) => r2 == Some(Numeric),
        // WB13.
        (Katakana, Katakana) => true,
        // WB13a.
        (a, ExtendNumLet) if is_ahletter(a) || matches!(a, Numeric | Katakana | ExtendNumLet) => {
            true
        }
        // WB13b.
        (ExtendNumLet, b) if is_ahletter(b) || matches!(b, Numeric | Katakana) => true,
        // WB15, WB16.
        (RegionalIndicator, RegionalIndicator) => {
            let mut count = 0;
            let mut p = pos;
            while let Some((RegionalIndicator, start)) = prev_logical::<P>(text, p) {
                count += 1;
                p = start;
            }
            count % 2 == 1
        }
        _ => false,
    };
    !no_break
}

/// \return whether \p pos is a simple word boundary: exactly one of the
/// adjacent chars is a word character.
fn is_simple_boundary<P: CharProperties>(text: &str, pos: usize) -> bool {
    let before = text[..pos].chars().next_back().map_or(false, P::is_word_char);
    let after = text[pos..].chars().next().map_or(false, P::is_word_char);
    before != after
}

/// \return whether byte offset \p pos of \p text is a word boundary.
/// \p pos must be a char boundary.
pub fn is_word_boundary<P: CharProperties>(
    text: &str,
    pos: usize,
    algorithm: WordBreakAlgorithm,
) -> bool {
    debug_assert!(text.is_char_boundary(pos));
    match algorithm {
        WordBreakAlgorithm::Default => is_default_boundary::<P>(text, pos),
        WordBreakAlgorithm::Simple => is_simple_boundary::<P>(text, pos),
    }
}

/// \return every boundary position in \p text, in order.
pub fn word_breaks<P: CharProperties>(text: &str, algorithm: WordBreakAlgorithm) -> Vec<usize> {
    text.char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .filter(|&pos| is_word_boundary::<P>(text, pos, algorithm))
        .collect()
}

/// Split \p text into the segments between consecutive boundaries.
/// The start and end of the text always delimit segments.
pub fn split_words<P: CharProperties>(text: &str, algorithm: WordBreakAlgorithm) -> Vec<&str> {
    let mut cuts = word_breaks::<P>(text, algorithm);
    cuts.insert(0, 0);
    cuts.push(text.len());
    cuts.dedup();
    cuts.windows(2)
        .map(|w| &text[w[0]..w[1]])
        .filter(|s| !s.is_empty())
        .collect()
}
