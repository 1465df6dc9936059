use core::ops;

/// Capture groups are numbered from 0 internally; the API adds one.
pub type CaptureGroupID = u16;

pub type CaptureGroupName = String;

/// Limits enforced while parsing.
pub const MAX_CAPTURE_GROUPS: usize = 65535;

pub const MAX_LOOPS: usize = 65535;
pub type LoopID = u16;

/// Scratch registers hold positions for intersection checks.
pub type RegisterID = u16;

/// The maximum number of registers supported.
pub const MAX_REGISTERS: usize = 65535;

/// Positions are byte offsets into the input text.
pub type Position = usize;

/// Index into CompiledRegex::insns.
pub type IP = usize;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CharacterClassType {
    Digits,
    Spaces,
    Words,
}

/// Per-attempt state of one loop.
#[derive(Debug, Copy, Clone)]
pub struct LoopData {
    pub iters: usize,
    pub entry: Position,
}

impl LoopData {
    pub fn new(entry: Position) -> LoopData {
        LoopData { iters: 0, entry }
    }
}

/// Per-attempt state of one capture group.
/// `open` records where the innermost pending entry began; start and end are
/// only committed when the group closes.
#[derive(Debug, Copy, Clone, Default)]
pub struct GroupData {
    pub open: Option<Position>,
    pub start: Option<Position>,
    pub end: Option<Position>,
}

impl GroupData {
    pub fn new() -> GroupData {
        GroupData::default()
    }

    pub fn as_range(&self) -> Option<ops::Range<Position>> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(ops::Range { start, end }),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        *self = GroupData::default();
    }
}
