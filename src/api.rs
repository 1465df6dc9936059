use crate::classicalbacktrack;
use crate::emit;
use crate::exec;
use crate::insn::CompiledRegex;
use crate::ir;
use crate::optimizer;
use crate::parse;
use crate::types::CaptureGroupName;
use crate::util::to_char_sat;
use core::{fmt, str::FromStr};
use log::debug;

pub use parse::Error;

/// Options fixed when a regex is compiled.
/// By default matching is case-sensitive, single-line and simplified.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Flags {
    /// Compare characters by simple case folding ('i').
    pub icase: bool,

    /// ^ and $ also match next to line terminators ('m').
    pub multiline: bool,

    /// . also matches line terminators ('s').
    pub dot_all: bool,

    /// Free spacing: whitespace and #-comments outside classes are ignored ('x').
    pub extended: bool,

    /// Only try a match at the position where the search starts ('A').
    pub anchored: bool,

    /// \b and \B use the simple word/non-word rule instead of UAX #29 ('w').
    pub simple_word_break: bool,

    /// Run the parsed tree as-is, without simplification.
    pub no_opt: bool,
}

impl Flags {
    /// Build flags from code points spelling flag letters, any of "imsxAw".
    /// Unknown letters are ignored.
    pub fn new<T: Iterator<Item = u32>>(chars: T) -> Self {
        let mut result = Self::default();
        for c in chars.map(to_char_sat) {
            match c {
                'i' => result.icase = true,
                'm' => result.multiline = true,
                's' => result.dot_all = true,
                'x' => result.extended = true,
                'A' => result.anchored = true,
                'w' => result.simple_word_break = true,
                _ => (),
            }
        }
        result
    }
}

impl From<&str> for Flags {
    fn from(s: &str) -> Self {
        Self::new(s.chars().map(u32::from))
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (set, letter) in [
            (self.icase, "i"),
            (self.multiline, "m"),
            (self.dot_all, "s"),
            (self.extended, "x"),
            (self.anchored, "A"),
            (self.simple_word_break, "w"),
        ] {
            if set {
                f.write_str(letter)?;
            }
        }
        Ok(())
    }
}

/// Range is used to express the extent of a match, as byte offsets into the
/// input string.
pub type Range = core::ops::Range<usize>;

/// An iterator type which yields `Match`es found in a string.
pub type Matches<'r, 't> = exec::Matches<backends::DefaultExecutor<'r, 't>>;

/// Misuse of the matching API. This is distinct from failing to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// The start offset is past the end of the text.
    StartOutOfRange { start: usize, len: usize },

    /// The offset falls inside a UTF-8 sequence.
    NotCharBoundary { offset: usize },

    /// The Match was produced by a different Regex.
    ForeignMatch,
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UsageError::StartOutOfRange { start, len } => write!(
                f,
                "Start offset {} is out of range for text of length {}",
                start, len
            ),
            UsageError::NotCharBoundary { offset } => {
                write!(f, "Offset {} is not a char boundary", offset)
            }
            UsageError::ForeignMatch => write!(f, "Match was produced by a different regex"),
        }
    }
}

impl std::error::Error for UsageError {}

/// Check that \p start may begin a search in \p text.
fn check_start(text: &str, start: usize) -> Result<(), UsageError> {
    if start > text.len() {
        Err(UsageError::StartOutOfRange {
            start,
            len: text.len(),
        })
    } else if !text.is_char_boundary(start) {
        Err(UsageError::NotCharBoundary { offset: start })
    } else {
        Ok(())
    }
}

/// One successful match of a Regex against a text.
#[derive(Debug, Clone)]
pub struct Match {
    /// Byte range of the whole match. Empty when the regex matched an
    /// empty string, and may start after the search point when `\K`
    /// moved the reported start.
    pub range: Range,

    /// One slot per capturing group, in group order. None means the group did
    /// not take part in the match; a repeated group holds its last iteration.
    pub captures: Vec<Option<Range>>,

    // Names indexed like captures.
    pub(crate) group_names: Box<[Option<CaptureGroupName>]>,

    // Identifies the regex which produced this match.
    regex_id: u64,
}

impl Match {
    pub(crate) fn new(
        range: Range,
        captures: Vec<Option<Range>>,
        group_names: Box<[Option<CaptureGroupName>]>,
        regex_id: u64,
    ) -> Match {
        Match {
            range,
            captures,
            group_names,
            regex_id,
        }
    }

    /// Group \p idx, where 0 is the whole match and 1 the first capturing
    /// group. None if the group did not participate or does not exist.
    #[inline]
    pub fn group(&self, idx: usize) -> Option<Range> {
        match idx.checked_sub(1) {
            None => Some(self.range()),
            Some(cap) => self.captures.get(cap).cloned().flatten(),
        }
    }

    /// The group named \p name, if it exists and participated.
    pub fn named_group(&self, name: &str) -> Option<Range> {
        self.named_groups()
            .find(|&(n, _)| n == name)
            .and_then(|(_, r)| r)
    }

    /// Iterate over (name, range) for every named group.
    #[inline]
    pub fn named_groups(&self) -> NamedGroups<'_> {
        NamedGroups {
            mat: self,
            names: self.group_names.iter().enumerate(),
        }
    }

    /// The byte range of the match. Range is not Copy, so this clones.
    #[inline]
    pub fn range(&self) -> Range {
        self.range.clone()
    }

    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// The matched slice of \p text, which must be the searched text.
    #[inline]
    pub fn as_str<'t>(&self, text: &'t str) -> &'t str {
        &text[self.range()]
    }

    /// Iterate over the whole match followed by each capturing group.
    #[inline]
    pub fn groups(&self) -> Groups<'_> {
        Groups {
            mat: self,
            idxs: 0..self.captures.len() + 1,
        }
    }

    /// Compare two matches of the same regex by range and captures.
    /// Matches from different regexes cannot be compared.
    pub fn try_eq(&self, other: &Match) -> Result<bool, UsageError> {
        if self.regex_id != other.regex_id {
            return Err(UsageError::ForeignMatch);
        }
        Ok(self.range == other.range && self.captures == other.captures)
    }
}

/// Iterator returned by [`Match::groups`].
#[derive(Clone)]
pub struct Groups<'m> {
    mat: &'m Match,
    idxs: core::ops::Range<usize>,
}

impl Iterator for Groups<'_> {
    type Item = Option<Range>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.idxs.next().map(|i| self.mat.group(i))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.idxs.size_hint()
    }
}

/// Iterator returned by [`Match::named_groups`].
#[derive(Clone)]
pub struct NamedGroups<'m> {
    mat: &'m Match,
    names: core::iter::Enumerate<core::slice::Iter<'m, Option<CaptureGroupName>>>,
}

impl<'m> Iterator for NamedGroups<'m> {
    type Item = (&'m str, Option<Range>);

    fn next(&mut self) -> Option<Self::Item> {
        let mat = self.mat;
        self.names.find_map(|(idx, name)| {
            let name = name.as_deref()?;
            Some((name, mat.captures[idx].clone()))
        })
    }
}

/// Append the expansion of a replacement \p template for match \p m of
/// \p text to \p out.
///
/// `$&` and `$0` insert the match, `` $` `` and `$'` the text before and
/// after it, `$N`, `$NN` and `${N}` a numbered group, `${name}` a named group,
/// and `$$` a dollar sign. Anything else is copied literally.
fn expand_template(m: &Match, text: &str, template: &str, out: &mut String) {
    let group_text = |r: Option<Range>| r.map_or("", |r| &text[r]);
    let mut rest = template;
    while let Some(dollar) = rest.find('$') {
        out.push_str(&rest[..dollar]);
        let after = &rest[dollar + 1..];
        let mut chars = after.chars();
        let consumed = match chars.next() {
            Some('$') => {
                out.push('$');
                1
            }
            Some('&') => {
                out.push_str(group_text(Some(m.range())));
                1
            }
            Some('`') => {
                out.push_str(&text[..m.start()]);
                1
            }
            Some('\'') => {
                out.push_str(&text[m.end()..]);
                1
            }
            Some('{') => match after.find('}') {
                Some(close) => {
                    let key = &after[1..close];
                    let range = match key.parse::<usize>() {
                        Ok(idx) => m.group(idx),
                        Err(_) => m.named_group(key),
                    };
                    out.push_str(group_text(range));
                    close + 1
                }
                None => {
                    out.push('$');
                    0
                }
            },
            Some(d) if d.is_ascii_digit() => {
                let digits: String = after.chars().take(2).take_while(char::is_ascii_digit).collect();
                let group_count = m.captures.len();
                let two = digits.parse::<usize>().ok().filter(|&n| digits.len() == 2 && n <= group_count);
                let one = d.to_digit(10).map(|n| n as usize).filter(|&n| n <= group_count);
                match (two, one) {
                    (Some(idx), _) => {
                        out.push_str(group_text(m.group(idx)));
                        2
                    }
                    (None, Some(idx)) => {
                        out.push_str(group_text(m.group(idx)));
                        1
                    }
                    (None, None) => {
                        out.push('$');
                        0
                    }
                }
            }
            _ => {
                out.push('$');
                0
            }
        };
        rest = &after[consumed..];
    }
    out.push_str(rest);
}

/// Escape \p text so that it matches itself literally when used as a
/// pattern.
pub fn escape(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '^'
                | '$'
                | '.'
                | '|'
                | '?'
                | '*'
                | '+'
                | '('
                | ')'
                | '['
                | ']'
                | '{'
                | '}'
                | '&'
                | '~'
                | '#'
        ) {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// A Regex is the compiled version of a pattern.
#[derive(Debug, Clone)]
pub struct Regex {
    // The pattern text.
    source: String,

    // The canonical (simplified) form, used for equality.
    ast: ir::Regex,

    cr: CompiledRegex,
}

impl Regex {
    /// Compile \p pattern with default flags.
    /// Compilation parses, simplifies and emits a program, so reuse the result.
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        Self::with_flags(pattern, Flags::default())
    }

    /// Compile \p pattern with \p flags, which may be a Flags or a string of
    /// flag letters.
    pub fn with_flags<F>(pattern: &str, flags: F) -> Result<Regex, Error>
    where
        F: Into<Flags>,
    {
        let flags = flags.into();
        let raw = parse::try_parse(pattern, flags)?;
        debug!("Parsed /{}/:\n{}", pattern, raw);
        let mut ast = raw.clone();
        optimizer::simplify(&mut ast);
        debug!("Simplified /{}/:\n{}", pattern, ast);
        let cr = emit::emit(if flags.no_opt { &raw } else { &ast });
        debug!(
            "Compiled /{}/ to {} instructions, start predicate {:?}",
            pattern,
            cr.insns.len(),
            cr.start_pred
        );
        Ok(Regex {
            source: pattern.to_string(),
            ast,
            cr,
        })
    }

    /// \return the pattern text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// \return the flags the regex was compiled with.
    #[inline]
    pub fn flags(&self) -> Flags {
        self.cr.flags
    }

    /// \return the canonical syntax tree. Two regexes are equal exactly
    /// when their canonical trees are.
    #[inline]
    pub fn ast(&self) -> &ir::Regex {
        &self.ast
    }

    /// \return the number of capture groups.
    #[inline]
    pub fn group_count(&self) -> usize {
        self.cr.group_names.len()
    }

    /// \return the name of every capture group, in group order.
    pub fn group_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.cr.group_names.iter().map(|n| n.as_deref())
    }

    /// The leftmost match in \p text, if any.
    pub fn find(&self, text: &str) -> Option<Match> {
        self.find_iter(text).next()
    }

    /// Searches `text` for the first match starting at or after byte offset
    /// `start`. Lookbehind-like constructs such as `^` and `\b` still see
    /// the text before `start`.
    pub fn find_at(&self, text: &str, start: usize) -> Result<Option<Match>, UsageError> {
        check_start(text, start)?;
        Ok(self.find_from(text, start).next())
    }

    /// Searches for the match following `prev`, which must have been produced
    /// by this regex on the same text.
    /// The search resumes at the end of `prev`, or one char past it if `prev`
    /// was empty.
    pub fn find_next(&self, text: &str, prev: &Match) -> Result<Option<Match>, UsageError> {
        if prev.regex_id != self.cr.id {
            return Err(UsageError::ForeignMatch);
        }
        check_start(text, prev.end())?;
        let resume = if prev.range.is_empty() {
            match text[prev.end()..].chars().next() {
                Some(c) => prev.end() + c.len_utf8(),
                None => return Ok(None),
            }
        } else {
            prev.end()
        };
        Ok(self.find_from(text, resume).next())
    }

    /// \return whether the regex matches anywhere in `text`.
    #[inline]
    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// Iterate over successive non-overlapping matches in \p text.
    /// An empty match is followed by a search one character later.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.find_from(text, 0)
    }

    /// Returns an iterator for matches found in 'text' starting at byte index
    /// `start`. Note this may be different from passing a sliced `text` in
    /// the case of anchors and word boundaries.
    /// Example:
    ///
    ///  ```rust
    ///   use regalg::Regex;
    ///   let text = "xyxy";
    ///   let re = Regex::new(r"\b{W}y").unwrap();
    ///   assert!(re.find(&text[1..]).is_some());
    ///   assert!(re.find_from(text, 1).next().is_none());
    ///   ```
    ///
    /// An invalid `start` produces no matches; see [`Regex::find_at`].
    #[inline]
    pub fn find_from<'r, 't>(&'r self, text: &'t str, start: usize) -> Matches<'r, 't> {
        backends::find(self, text, start)
    }

    /// Replace the first match in `text` with the expansion of `template`.
    pub fn replace(&self, text: &str, template: &str) -> String {
        self.replace_n(text, 1, |m, out| expand_template(m, text, template, out))
    }

    /// Replace every non-overlapping match in `text` with the expansion of
    /// `template`.
    pub fn replace_all(&self, text: &str, template: &str) -> String {
        self.replace_n(text, usize::MAX, |m, out| expand_template(m, text, template, out))
    }

    /// Replace the first match in `text` with the result of calling `replacer`
    /// on it.
    pub fn replace_with<F>(&self, text: &str, mut replacer: F) -> String
    where
        F: FnMut(&Match) -> String,
    {
        self.replace_n(text, 1, |m, out| out.push_str(&replacer(m)))
    }

    /// Replace every non-overlapping match in `text` with the result of
    /// calling `replacer` on it.
    pub fn replace_all_with<F>(&self, text: &str, mut replacer: F) -> String
    where
        F: FnMut(&Match) -> String,
    {
        self.replace_n(text, usize::MAX, |m, out| out.push_str(&replacer(m)))
    }

    fn replace_n<F>(&self, text: &str, limit: usize, mut expand: F) -> String
    where
        F: FnMut(&Match, &mut String),
    {
        let mut result = String::with_capacity(text.len());
        let mut last = 0;
        for m in self.find_iter(text).take(limit) {
            // A \K may place a match before the end of the previous one.
            let start = m.start().max(last);
            result.push_str(&text[last..start]);
            expand(&m, &mut result);
            last = m.end().max(last);
        }
        result.push_str(&text[last..]);
        result
    }

    /// Split `text` on every non-overlapping match.
    /// Captured groups are not included in the result.
    pub fn split<'t>(&self, text: &'t str) -> Vec<&'t str> {
        let mut result = Vec::new();
        let mut last = 0;
        for m in self.find_iter(text) {
            let start = m.start().max(last);
            result.push(&text[last..start]);
            last = m.end().max(last);
        }
        result.push(&text[last..]);
        result
    }
}

impl PartialEq for Regex {
    /// Regexes are equal when they simplify to the same tree.
    fn eq(&self, other: &Regex) -> bool {
        self.ast.node == other.ast.node && self.ast.flags.anchored == other.ast.flags.anchored
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Regex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::new(s)
    }
}

// Access to the individual compilation phases, for tools and tests.
#[doc(hidden)]
pub mod backends {
    use super::exec;
    use super::Regex;
    use crate::matchers::IcuCharProperties;
    pub use crate::emit::emit;
    pub use crate::optimizer::simplify;
    pub use crate::parse::try_parse;

    /// The backtracking executor over ICU character data.
    pub type BacktrackExecutor<'r, 't> =
        super::classicalbacktrack::BacktrackExecutor<'r, 't, IcuCharProperties>;

    pub type DefaultExecutor<'r, 't> = BacktrackExecutor<'r, 't>;

    /// Iterate matches of \p re in \p text from byte \p start with a chosen
    /// executor. A start that is out of range or not a char boundary yields
    /// nothing.
    pub fn find<'r, 't, Executor: exec::Executor<'r, 't>>(
        re: &'r Regex,
        text: &'t str,
        start: usize,
    ) -> exec::Matches<Executor> {
        let start = super::check_start(text, start).ok().map(|()| start);
        exec::Matches::new(Executor::new(&re.cr, text), start)
    }
}
