//! The program executed by the backtracker.

use crate::api;
use crate::bytesearch::{AsciiBitmap, BoyerMooreScanner};
use crate::codepointset::CodePointSet;
use crate::types::{CaptureGroupID, CaptureGroupName, LoopID, RegisterID};
use crate::wordbreak::WordBreakAlgorithm;

pub type JumpTarget = u32;

#[derive(Debug, Clone)]
pub struct LoopFields {
    pub loop_id: LoopID,
    pub min_iters: usize,
    pub max_iters: usize,
    pub greedy: bool,
    pub exit: JumpTarget,
}

/// One program step.
///
/// Instructions which run a sub-match (atomic groups, trailing context,
/// conditional assertions, intersection checks and complements) are followed
/// by the sub-match's instructions, terminated by a Goal.
#[derive(Debug, Clone)]
pub enum Insn {
    /// Accept, unless a sub-match requires a different end.
    Goal,

    /// Match a single char.
    Char(char),

    /// Match a sequence of literal bytes, which is always whole chars.
    ByteSeq(Box<[u8]>),

    /// A set of ASCII chars, tested by bitmap.
    AsciiBracket(AsciiBitmap),

    /// Match the next char against a set.
    Bracket(CodePointSet),

    /// Match at the start of the text, or after a line terminator.
    StartOfLine,

    /// Match at the end of the text, or before a line terminator.
    EndOfLine,

    StartOfText,
    EndOfText,

    /// Word boundaries.
    WordBoundary {
        algorithm: WordBreakAlgorithm,
        invert: bool,
    },

    /// First entry into a loop; resets its iteration count.
    EnterLoop(LoopFields),

    /// End of a loop body; decide whether to iterate again.
    LoopAgain { begin: JumpTarget },

    /// The next instruction always matches exactly one char.
    /// Attempt to match it [min, max] times.
    Loop1CharBody {
        min_iters: usize,
        max_iters: usize,
        greedy: bool,
    },

    /// Unconditional jump.
    Jump { target: JumpTarget },

    /// Try the next insn, then secondary on failure.
    Alt { secondary: JumpTarget },

    /// Opening paren of a capture group.
    BeginCaptureGroup(CaptureGroupID),

    /// Closing paren; commits the span.
    EndCaptureGroup(CaptureGroupID),

    /// Match the text of an earlier group.
    BackRef { group: CaptureGroupID, icase: bool },

    /// Match the contents once, committing to the first way they match.
    Atomic {
        start_group: CaptureGroupID,
        end_group: CaptureGroupID,
        continuation: JumpTarget,
    },

    /// The contents must match here, but do not consume anything.
    Lookahead {
        start_group: CaptureGroupID,
        end_group: CaptureGroupID,
        continuation: JumpTarget,
    },

    /// Continue with the next instruction if the group has participated,
    /// otherwise jump to the else branch.
    CondGroup {
        group: CaptureGroupID,
        else_branch: JumpTarget,
    },

    /// Test the contents as a lookahead, then continue at one branch or the
    /// other.
    CondAssertion {
        start_group: CaptureGroupID,
        end_group: CaptureGroupID,
        then_branch: JumpTarget,
        else_branch: JumpTarget,
    },

    /// Record the current position in a register.
    SaveRegister(RegisterID),

    /// The contents must match exactly the span from the register to the
    /// current position.
    IntersectCheck {
        register: RegisterID,
        start_group: CaptureGroupID,
        end_group: CaptureGroupID,
        continuation: JumpTarget,
    },

    /// Match a span which the contents cannot match exactly, preferring the
    /// longest.
    Complement { continuation: JumpTarget },

    /// \K: the overall match starts here.
    ResetMatchStart,

    /// An instruction that always fails, produced for empty classes.
    JustFail,
}

/// A fast way of locating the first potential match.
#[derive(Debug, Clone)]
pub enum StartPredicate {
    /// Any position may start a match.
    Arbitrary,

    /// Every match begins with this literal.
    Literal(BoyerMooreScanner),

    /// Only try matching at the initial position.
    StartAnchored,
}

#[derive(Debug, Clone)]
pub struct CompiledRegex {
    // Entry point is insns[0].
    pub insns: Vec<Insn>,

    // Filters candidate start positions.
    pub start_pred: StartPredicate,

    // Sizes of the per-attempt state tables.
    pub loops: u32,

    pub groups: u32,

    // Number of position registers used by intersections.
    pub registers: u32,

    // The capture group names, indexed by CaptureGroupID.
    pub group_names: Box<[Option<CaptureGroupName>]>,

    // Flags controlling matching.
    pub flags: api::Flags,

    // Distinguishes this program from every other one in the process.
    pub id: u64,
}
