//! Facilities for quickly locating literals and byte classes.

use crate::folds;
use crate::indexing::Utf8Input;
use crate::types::Position;
use core::fmt;
use std::collections::HashMap;

/// A ByteSet is any set of bytes.
pub trait ByteSet {
    /// \return whether the ByteSet contains the byte.
    fn contains(&self, b: u8) -> bool;
}

/// A helper function for formatting bitmaps, using - ranges.
fn format_bitmap<Func>(name: &str, f: &mut fmt::Formatter<'_>, contains: Func) -> fmt::Result
where
    Func: Fn(u8) -> bool,
{
    write!(f, "{}[", name)?;
    let mut idx = 0;
    let mut maybe_space = "";
    while idx < 256 {
        // Compute the next value not contained.
        let mut end = idx;
        while end < 256 && contains(end as u8) {
            end += 1;
        }
        match end - idx {
            0 => (),
            1 => write!(f, "{}{}", maybe_space, idx)?,
            _ => write!(f, "{}{}-{}", maybe_space, idx, end - 1)?,
        };
        if end > idx {
            maybe_space = " ";
        }
        idx = end + 1
    }
    write!(f, "]")?;
    Ok(())
}

/// A bitmap covering ASCII characters.
#[derive(Default, Copy, Clone, PartialEq, Eq)]
#[repr(align(4))]
pub struct AsciiBitmap(pub [u8; 16]);

impl AsciiBitmap {
    /// Set a byte val in this bitmap.
    #[inline(always)]
    pub fn set(&mut self, val: u8) {
        debug_assert!(val <= 127, "Value should be ASCII");
        self.0[(val >> 3) as usize] |= 1 << (val & 0x7);
    }
}

impl fmt::Debug for AsciiBitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        format_bitmap("AsciiBitmap", f, |v| self.contains(v))
    }
}

impl ByteSet for AsciiBitmap {
    /// \return whether this bitmap contains a given value.
    /// The value does NOT have to be ASCII.
    #[inline(always)]
    fn contains(&self, val: u8) -> bool {
        // Mask off the MSB so the byte index is always in range; the mask is
        // then zero for non-ASCII values.
        let byte = (val & 0x7F) >> 3;
        let bit = val & 0x7;
        let mask = ((val >> 7) ^ 1) << bit;
        (self.0[byte as usize] & mask) != 0
    }
}

/// Searches text for a fixed literal using the Boyer-Moore bad-character and
/// good-suffix rules, optionally comparing chars under simple case folding.
/// Shifts are counted in chars, so the text is never decoded twice.
#[derive(Clone)]
pub struct BoyerMooreScanner {
    /// The literal's chars, folded if icase.
    pattern: Vec<char>,

    /// Compare under simple case folding.
    icase: bool,

    /// Index of the last occurrence of each (folded) char in the pattern.
    last_occurrence: HashMap<char, usize>,

    /// Good-suffix shift, indexed by one past the mismatching position.
    good_suffix: Vec<usize>,
}

impl fmt::Debug for BoyerMooreScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let literal: String = self.pattern.iter().collect();
        write!(
            f,
            "BoyerMooreScanner({:?}{})",
            literal,
            if self.icase { ", icase" } else { "" }
        )
    }
}

/// Compute the good-suffix shift table with the usual border construction.
fn good_suffix_table(p: &[char]) -> Vec<usize> {
    let m = p.len();
    let mut shift = vec![0; m + 1];
    let mut border = vec![0; m + 1];
    let mut i = m;
    let mut j = m + 1;
    border[i] = j;
    while i > 0 {
        while j <= m && p[i - 1] != p[j - 1] {
            if shift[j] == 0 {
                shift[j] = j - i;
            }
            j = border[j];
        }
        i -= 1;
        j -= 1;
        border[i] = j;
    }
    j = border[0];
    for (i, s) in shift.iter_mut().enumerate() {
        if *s == 0 {
            *s = j;
        }
        if i == j {
            j = border[j];
        }
    }
    shift
}

impl BoyerMooreScanner {
    /// Build a scanner for \p literal.
    pub fn new(literal: &str, icase: bool) -> BoyerMooreScanner {
        let pattern: Vec<char> = if icase {
            literal.chars().map(folds::fold).collect()
        } else {
            literal.chars().collect()
        };
        let mut last_occurrence = HashMap::new();
        for (idx, &c) in pattern.iter().enumerate() {
            last_occurrence.insert(c, idx);
        }
        let good_suffix = good_suffix_table(&pattern);
        BoyerMooreScanner {
            pattern,
            icase,
            last_occurrence,
            good_suffix,
        }
    }

    /// \return the literal, as searched (folded if case-insensitive).
    pub fn literal(&self) -> String {
        self.pattern.iter().collect()
    }

    pub fn icase(&self) -> bool {
        self.icase
    }

    #[inline(always)]
    fn key(&self, c: char) -> char {
        if self.icase {
            folds::fold(c)
        } else {
            c
        }
    }

    /// Find the first occurrence of the literal starting at or after byte
    /// offset \p from, which must be a char boundary.
    /// \return the byte offset where the occurrence starts.
    /// To enumerate every occurrence, scan again from one past the previous
    /// result.
    pub fn scan(&self, text: &str, from: Position) -> Option<Position> {
        if from > text.len() {
            return None;
        }
        let m = self.pattern.len();
        if m == 0 {
            return Some(from);
        }
        if m == 1 && !self.icase && self.pattern[0].is_ascii() {
            let bytes = &text.as_bytes()[from..];
            return memchr::memchr(self.pattern[0] as u8, bytes).map(|idx| from + idx);
        }

        let input = Utf8Input::new(text);
        // The window covers the m chars ending at 'end'.
        let mut end = from;
        for _ in 0..m {
            end = input.next_right_pos(end)?;
        }
        loop {
            let mut pos = end;
            let mut j = m;
            let mut mismatch = None;
            while j > 0 {
                let c = input.next_left(&mut pos)?;
                j -= 1;
                let c = self.key(c);
                if c != self.pattern[j] {
                    mismatch = Some((j, c));
                    break;
                }
            }
            let (j, c) = match mismatch {
                None => return Some(pos),
                Some(found) => found,
            };
            let bad_char = match self.last_occurrence.get(&c) {
                Some(&last) if last < j => j - last,
                Some(_) => 1,
                None => j + 1,
            };
            let shift = bad_char.max(self.good_suffix[j + 1]);
            for _ in 0..shift {
                end = input.next_right_pos(end)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// \return the start offsets of all occurrences, including overlapping
    /// ones.
    fn scan_all(scanner: &BoyerMooreScanner, text: &str) -> Vec<Position> {
        let input = Utf8Input::new(text);
        let mut result = Vec::new();
        let mut from = 0;
        while let Some(found) = scanner.scan(text, from) {
            result.push(found);
            from = match input.next_right_pos(found) {
                Some(next) => next,
                None => break,
            };
        }
        result
    }

    fn naive(literal: &str, text: &str, icase: bool) -> Vec<usize> {
        let lit: Vec<char> = literal.chars().collect();
        let mut result = Vec::new();
        for (offset, _) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            let window: Vec<char> = text[offset..].chars().take(lit.len()).collect();
            if window.len() == lit.len()
                && window.iter().zip(lit.iter()).all(|(&a, &b)| {
                    if icase {
                        folds::fold_equals(a, b)
                    } else {
                        a == b
                    }
                })
            {
                result.push(offset);
            }
        }
        result
    }

    #[test]
    fn finds_literal() {
        let scanner = BoyerMooreScanner::new("example", false);
        assert_eq!(scanner.scan("this is a simple example", 0), Some(17));
        assert_eq!(scanner.scan("this is a simple example", 18), None);
        assert_eq!(scanner.scan("THIS IS A SIMPLE EXAMPLE", 0), None);
        let folded = BoyerMooreScanner::new("example", true);
        assert_eq!(folded.scan("THIS IS A SIMPLE EXAMPLE", 0), Some(17));
        assert_eq!(folded.literal(), "example");
    }

    #[test]
    fn rescanning_enumerates_overlaps() {
        let scanner = BoyerMooreScanner::new("aba", false);
        assert_eq!(scan_all(&scanner, "abababa"), vec![0, 2, 4]);
        let scanner = BoyerMooreScanner::new("a", false);
        assert_eq!(scan_all(&scanner, "banana"), vec![1, 3, 5]);
        assert_eq!(scanner.scan("banana", 6), None);
        assert_eq!(scanner.scan("banana", 7), None);
    }

    #[test]
    fn multibyte_text() {
        let scanner = BoyerMooreScanner::new("σα", true);
        let text = "ΚΑΛΗΜΕΡΑ ΣΑΣ";
        assert_eq!(scan_all(&scanner, text), naive("σα", text, true));
        assert_eq!(scanner.scan(text, 0), Some(text.find("ΣΑ").unwrap()));
        let scanner = BoyerMooreScanner::new("k", true);
        assert_eq!(scanner.scan("x\u{212A}", 0), Some(1));
    }

    #[test]
    fn empty_literal() {
        let scanner = BoyerMooreScanner::new("", false);
        assert_eq!(scanner.scan("abc", 2), Some(2));
        assert_eq!(scanner.scan("abc", 3), Some(3));
    }

    #[test]
    fn agrees_with_naive_search() {
        let texts = [
            "abracadabra",
            "aaaaaaaaab",
            "ababcabababcab",
            "ÀàÁáAa aA",
            "the quick brown fox jumps over the lazy dog",
        ];
        let literals = ["abra", "aab", "abab", "ab", "aA", "the", "o", "àa", "cabab"];
        for text in texts {
            for literal in literals {
                for icase in [false, true] {
                    let scanner = BoyerMooreScanner::new(literal, icase);
                    assert_eq!(
                        scan_all(&scanner, text),
                        naive(literal, text, icase),
                        "{:?} in {:?} icase={}",
                        literal,
                        text,
                        icase
                    );
                }
            }
        }
    }

    #[test]
    fn ascii_bitmap() {
        let mut bm = AsciiBitmap::default();
        for b in b"az_" {
            bm.set(*b);
        }
        assert!(bm.contains(b'a'));
        assert!(bm.contains(b'_'));
        assert!(!bm.contains(b'b'));
        assert!(!bm.contains(b'a' | 0x80));
        assert_eq!(format!("{:?}", bm), "AsciiBitmap[95 97 122]");
    }
}
