//! Glue between executors and match iteration.

use crate::api::Match;
use crate::insn::CompiledRegex;
use crate::types::Position;

/// Finds successive matches. Kept separate from Executor so Matches needs
/// no lifetimes.
pub trait MatchProducer: std::fmt::Debug {
    /// Search for a match starting at or after \p pos.
    /// \return the Match, setting \p next_start to the position to resume
    /// searching from (None if the text is exhausted), or None on failure.
    fn next_match(&mut self, pos: Position, next_start: &mut Option<Position>) -> Option<Match>;
}

/// A MatchProducer constructed from a program and a text.
pub trait Executor<'r, 't>: MatchProducer {
    fn new(re: &'r CompiledRegex, text: &'t str) -> Self;
}

/// Iterator over the matches of an executor.
#[derive(Debug)]
pub struct Matches<Producer: MatchProducer> {
    mp: Producer,
    offset: Option<Position>,
}

impl<Producer: MatchProducer> Matches<Producer> {
    /// Construct Matches which begin searching at \p start.
    /// No matches are produced if \p start is None.
    pub fn new(mp: Producer, start: Option<Position>) -> Self {
        Matches { mp, offset: start }
    }
}

impl<Producer: MatchProducer> Iterator for Matches<Producer> {
    type Item = Match;
    fn next(&mut self) -> Option<Self::Item> {
        let start = self.offset.take()?;
        self.mp.next_match(start, &mut self.offset)
    }
}
