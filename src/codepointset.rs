use crate::util::SliceHelp;
use core::cmp::{self, Ordering};
use core::fmt;

pub type CodePoint = u32;

/// The maximum (inclusive) code point.
pub const CODE_POINT_MAX: CodePoint = 0x10FFFF;

/// An inclusive, non-empty range of code points.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    pub(crate) first: CodePoint,
    pub(crate) last: CodePoint,
}

impl Interval {
    pub const fn new(first: CodePoint, last: CodePoint) -> Interval {
        debug_assert!(first <= last);
        Interval { first, last }
    }

    /// Locate \p cp relative to self: Greater if self lies after it.
    #[inline(always)]
    pub fn compare(self, cp: CodePoint) -> Ordering {
        if cp < self.first {
            Ordering::Greater
        } else if cp > self.last {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }

    /// Like compare, but intervals that overlap or abut \p other are Equal.
    fn touch_cmp(self, other: Interval) -> Ordering {
        if self.last + 1 < other.first {
            Ordering::Less
        } else if other.last + 1 < self.first {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    pub fn contains(self, cp: CodePoint) -> bool {
        self.compare(cp) == Ordering::Equal
    }

    /// Return whether every code point of \p other is also in self.
    pub fn contains_interval(self, other: Interval) -> bool {
        self.first <= other.first && other.last <= self.last
    }

    pub fn codepoints(self) -> core::ops::RangeInclusive<CodePoint> {
        self.first..=self.last
    }

    pub fn count_codepoints(self) -> usize {
        (self.last - self.first) as usize + 1
    }

    pub fn first(self) -> CodePoint {
        self.first
    }

    pub fn last(self) -> CodePoint {
        self.last
    }
}

/// A set of code points, held as sorted intervals that neither overlap nor
/// abut. Two sets with the same members therefore compare equal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CodePointSet {
    ivs: Vec<Interval>,
}

impl CodePointSet {
    pub fn new() -> CodePointSet {
        CodePointSet::default()
    }

    /// The set of every code point.
    pub fn all() -> CodePointSet {
        CodePointSet {
            ivs: vec![Interval::new(0, CODE_POINT_MAX)],
        }
    }

    pub fn from_codepoint(cp: CodePoint) -> CodePointSet {
        CodePointSet {
            ivs: vec![Interval::new(cp, cp)],
        }
    }

    /// A set built from arbitrary ranges. Empty ranges are skipped and
    /// ends past the last code point are clamped.
    pub fn from_ranges<I>(ranges: I) -> CodePointSet
    where
        I: IntoIterator<Item = core::ops::RangeInclusive<CodePoint>>,
    {
        let mut result = CodePointSet::new();
        for r in ranges {
            let (first, last) = (*r.start(), cmp::min(*r.end(), CODE_POINT_MAX));
            if first <= last {
                result.add(Interval::new(first, last));
            }
        }
        result
    }

    /// Construct from intervals which are already sorted and separated by
    /// at least one missing code point.
    pub fn from_sorted_disjoint_intervals(ivs: Vec<Interval>) -> CodePointSet {
        let res = CodePointSet { ivs };
        res.debug_check();
        res
    }

    fn debug_check(&self) {
        debug_assert!(self.ivs.iter().all(|iv| iv.first <= iv.last && iv.last <= CODE_POINT_MAX));
        debug_assert!(self.ivs.windows(2).all(|w| w[0].last + 1 < w[1].first));
    }

    pub fn clear(&mut self) {
        self.ivs.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.ivs.is_empty()
    }

    pub fn contains_all_codepoints(&self) -> bool {
        self.ivs == [Interval::new(0, CODE_POINT_MAX)]
    }

    pub fn contains(&self, cp: CodePoint) -> bool {
        self.ivs.binary_search_by(|iv| iv.compare(cp)).is_ok()
    }

    pub fn count_codepoints(&self) -> usize {
        self.ivs.iter().map(|iv| iv.count_codepoints()).sum()
    }

    /// If the set holds exactly one code point, return it as a char.
    pub fn single_char(&self) -> Option<char> {
        match self.ivs[..] {
            [iv] if iv.first == iv.last => char::from_u32(iv.first),
            _ => None,
        }
    }

    /// Iterate over every code point, in order.
    pub fn codepoints(&self) -> impl Iterator<Item = CodePoint> + '_ {
        self.ivs.iter().flat_map(|iv| iv.codepoints())
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.ivs
    }

    /// Add an interval, coalescing every interval it overlaps or abuts.
    pub fn add(&mut self, iv: Interval) {
        let touching = self.ivs.equal_range_by(|x| x.touch_cmp(iv));
        let span = &self.ivs[touching.clone()];
        let merged = match (span.first(), span.last()) {
            (Some(lo), Some(hi)) => Interval {
                first: cmp::min(lo.first, iv.first),
                last: cmp::max(hi.last, iv.last),
            },
            _ => iv,
        };
        self.ivs.splice(touching, core::iter::once(merged));
        self.debug_check();
    }

    #[inline]
    pub fn add_one(&mut self, cp: CodePoint) {
        self.add(Interval::new(cp, cp))
    }

    /// Add every code point of \p rhs.
    pub fn add_set(&mut self, mut rhs: CodePointSet) {
        if self.ivs.len() < rhs.ivs.len() {
            core::mem::swap(self, &mut rhs);
        }
        for iv in rhs.ivs {
            self.add(iv)
        }
    }

    /// The intervals missing from self, in order.
    fn gaps(&self) -> impl Iterator<Item = Interval> + '_ {
        let starts = core::iter::once(0).chain(self.ivs.iter().map(|iv| iv.last + 1));
        let ends = self
            .ivs
            .iter()
            .map(|iv| iv.first.checked_sub(1))
            .chain(core::iter::once(Some(CODE_POINT_MAX)));
        starts.zip(ends).filter_map(|(first, last)| match last {
            Some(last) if first <= last => Some(Interval { first, last }),
            _ => None,
        })
    }

    /// \return a set holding every code point NOT in self.
    pub fn inverted(&self) -> CodePointSet {
        CodePointSet::from_sorted_disjoint_intervals(self.gaps().collect())
    }

    pub fn union(&self, rhs: &CodePointSet) -> CodePointSet {
        let mut result = self.clone();
        result.add_set(rhs.clone());
        result
    }

    /// \return the code points in both self and \p rhs.
    pub fn intersection(&self, rhs: &CodePointSet) -> CodePointSet {
        let mut ivs = Vec::new();
        let (mut lhs_iter, mut rhs_iter) = (self.ivs.iter().peekable(), rhs.ivs.iter().peekable());
        while let (Some(&&a), Some(&&b)) = (lhs_iter.peek(), rhs_iter.peek()) {
            let first = cmp::max(a.first, b.first);
            let last = cmp::min(a.last, b.last);
            if first <= last {
                ivs.push(Interval { first, last });
            }
            // Drop whichever interval ends first; the other may meet more.
            if a.last < b.last {
                lhs_iter.next();
            } else {
                rhs_iter.next();
            }
        }
        CodePointSet::from_sorted_disjoint_intervals(ivs)
    }

    /// \return the code points in self but not in \p rhs.
    pub fn difference(&self, rhs: &CodePointSet) -> CodePointSet {
        self.intersection(&rhs.inverted())
    }

    pub fn is_superset(&self, rhs: &CodePointSet) -> bool {
        rhs.difference(self).is_empty()
    }

    pub fn is_disjoint(&self, rhs: &CodePointSet) -> bool {
        self.intersection(rhs).is_empty()
    }
}

impl fmt::Display for CodePointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn show(f: &mut fmt::Formatter<'_>, cp: CodePoint) -> fmt::Result {
            match char::from_u32(cp) {
                Some(c) if c.is_ascii_graphic() => write!(f, "{}", c),
                _ => write!(f, "\\u{{{:X}}}", cp),
            }
        }
        f.write_str("[")?;
        for iv in &self.ivs {
            show(f, iv.first)?;
            if iv.last != iv.first {
                f.write_str("-")?;
                show(f, iv.last)?;
            }
        }
        f.write_str("]")
    }
}
