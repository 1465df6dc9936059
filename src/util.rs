use core::cmp::Ordering;
use core::ops::{Index, IndexMut};
use core::slice::SliceIndex;

// Unreachable code: checked under prohibit-unsafe, a hint otherwise.
macro_rules! rs_unreachable {
    () => {{
        if cfg!(feature = "prohibit-unsafe") {
            unreachable!();
        } else {
            unsafe { core::hint::unreachable_unchecked() }
        }
    }};
    ($msg:expr) => {
        if cfg!(feature = "prohibit-unsafe") {
            unreachable!($msg);
        } else {
            unsafe { core::hint::unreachable_unchecked() }
        }
    };
}

/// Indexing whose bounds check runs only in debug builds, unless
/// prohibit-unsafe is enabled. Vecs reach this through deref.
pub trait DebugCheckIndex<Idx>: Index<Idx> + IndexMut<Idx> {
    fn iat(&self, index: Idx) -> &Self::Output;
    fn mat(&mut self, index: Idx) -> &mut Self::Output;
}

impl<Idx, T> DebugCheckIndex<Idx> for [T]
where
    Idx: SliceIndex<[T]> + Clone,
{
    #[inline(always)]
    fn iat(&self, idx: Idx) -> &Self::Output {
        debug_assert!(self.get(idx.clone()).is_some(), "Index out of bounds");
        if cfg!(feature = "prohibit-unsafe") {
            &self[idx]
        } else {
            unsafe { self.get_unchecked(idx) }
        }
    }

    #[inline(always)]
    fn mat(&mut self, idx: Idx) -> &mut Self::Output {
        debug_assert!(self.get(idx.clone()).is_some(), "Index out of bounds");
        if cfg!(feature = "prohibit-unsafe") {
            &mut self[idx]
        } else {
            unsafe { self.get_unchecked_mut(idx) }
        }
    }
}

/// Convert a u32 to a char, saturating to the largest char on failure.
/// Only use the result to compare against literals.
pub fn to_char_sat(c: u32) -> char {
    char::from_u32(c).unwrap_or(char::MAX)
}

pub trait SliceHelp {
    type Item;

    /// Given that self is sorted according to f, returns the range of indexes
    /// where f reports Equal.
    fn equal_range_by<F>(&self, f: F) -> core::ops::Range<usize>
    where
        F: FnMut(&Self::Item) -> Ordering;
}

impl<T> SliceHelp for [T] {
    type Item = T;
    fn equal_range_by<F>(&self, mut f: F) -> core::ops::Range<usize>
    where
        F: FnMut(&T) -> Ordering,
    {
        let left = self.partition_point(|v| f(v) == Ordering::Less);
        let len = self[left..].partition_point(|v| f(v) == Ordering::Equal);
        left..left + len
    }
}

/// \return the length in bytes of the UTF-8 sequence introduced by \p lead.
#[inline(always)]
pub fn utf8_sequence_len(lead: u8) -> usize {
    match lead.leading_ones() {
        0 => 1,
        2 => 2,
        3 => 3,
        _ => 4,
    }
}

/// \return true if \p b is a UTF-8 continuation byte.
#[inline(always)]
pub fn is_utf8_continuation(b: u8) -> bool {
    (b & 0b1100_0000) == 0b1000_0000
}

/// Decode one complete multibyte UTF-8 sequence.
/// Each continuation byte contributes its low six bits.
#[inline(always)]
pub fn decode_utf8_seq(seq: &[u8]) -> u32 {
    debug_assert!((2..=4).contains(&seq.len()));
    debug_assert_eq!(utf8_sequence_len(seq[0]), seq.len());
    debug_assert!(seq[1..].iter().all(|&b| is_utf8_continuation(b)));
    let lead_bits = 7 - seq.len() as u32;
    let lead = u32::from(seq[0]) & ((1 << lead_bits) - 1);
    seq[1..]
        .iter()
        .fold(lead, |acc, &b| (acc << 6) | u32::from(b & 0x3F))
}

#[cfg(test)]
mod tests {
    use super::{decode_utf8_seq, to_char_sat, utf8_sequence_len, SliceHelp};

    #[test]
    fn ranges() {
        let vals = [0, 1, 2, 3, 4, 4, 4, 7, 8, 9, 9];
        let er = |needle: usize| vals.equal_range_by(|v| v.cmp(&needle));
        assert_eq!(er(0), 0..1);
        assert_eq!(er(4), 4..7);
        assert_eq!(er(5), 7..7);
        assert_eq!(er(9), 9..11);
        assert_eq!(er(12), 11..11);
    }

    #[test]
    fn utf8() {
        for c in ['\0', 'a', '\u{7F}', '\u{80}', '\u{7FF}', '\u{800}', '\u{FFFF}', '\u{10000}', char::MAX] {
            let mut buff = [0; 4];
            let bytes = c.encode_utf8(&mut buff).as_bytes();
            assert_eq!(bytes.len(), utf8_sequence_len(bytes[0]));
            if bytes.len() > 1 {
                assert_eq!(decode_utf8_seq(bytes), c as u32);
            }
        }
    }

    #[test]
    fn saturating_chars() {
        assert_eq!(to_char_sat(0x61), 'a');
        assert_eq!(to_char_sat(0xD800), char::MAX);
    }
}
