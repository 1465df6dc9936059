//! Regex compiler back-end: transforms IR into a CompiledRegex

use crate::bytesearch::AsciiBitmap;
use crate::codepointset::CodePointSet;
use crate::insn::{CompiledRegex, Insn, JumpTarget, LoopFields};
use crate::ir;
use crate::ir::{Condition, Greediness, Node};
use crate::startpredicate;
use crate::types::{CaptureGroupID, LoopID, RegisterID, MAX_REGISTERS};
use core::ops::Range;
use core::sync::atomic::{AtomicU64, Ordering};

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// \return an anchor instruction for a given IR anchor.
fn make_anchor(anchor_type: ir::AnchorType) -> Insn {
    match anchor_type {
        ir::AnchorType::StartOfLine => Insn::StartOfLine,
        ir::AnchorType::EndOfLine => Insn::EndOfLine,
        ir::AnchorType::StartOfText => Insn::StartOfText,
        ir::AnchorType::EndOfText => Insn::EndOfText,
    }
}

/// If the given set only contains ASCII, return it as a bitmap.
fn set_as_ascii(cps: &CodePointSet) -> Option<AsciiBitmap> {
    let mut result = AsciiBitmap::default();
    for iv in cps.intervals() {
        if iv.last() >= 128 {
            return None;
        }
        for bit in iv.codepoints() {
            result.set(bit as u8)
        }
    }
    Some(result)
}

/// \return the single-char instruction matching a set.
fn make_set_insn(cps: &CodePointSet) -> Insn {
    if cps.is_empty() {
        Insn::JustFail
    } else if let Some(c) = cps.single_char() {
        Insn::Char(c)
    } else if let Some(bitmap) = set_as_ascii(cps) {
        Insn::AsciiBracket(bitmap)
    } else {
        Insn::Bracket(cps.clone())
    }
}

/// Type which wraps up the context needed to emit a CompiledRegex.
struct Emitter {
    result: CompiledRegex,

    // Number of loops seen so far.
    next_loop_id: u32,
}

impl Emitter {
    /// Emit an instruction.
    fn emit_insn(&mut self, insn: Insn) {
        self.result.insns.push(insn);
    }

    /// Get an instruction at a given index.
    fn get_insn(&mut self, idx: JumpTarget) -> &mut Insn {
        &mut self.result.insns[idx as usize]
    }

    /// \return the offset of the next instruction emitted.
    fn next_offset(&self) -> JumpTarget {
        self.result.insns.len() as JumpTarget
    }

    /// Emit an instruction, returning its offset.
    fn emit_insn_offset(&mut self, insn: Insn) -> JumpTarget {
        let ret = self.next_offset();
        self.emit_insn(insn);
        ret
    }

    /// Point the continuation of the sub-match instruction at \p idx to the
    /// next offset.
    fn fixup_continuation(&mut self, idx: JumpTarget) {
        let next = self.next_offset();
        match self.get_insn(idx) {
            Insn::Atomic { continuation, .. }
            | Insn::Lookahead { continuation, .. }
            | Insn::IntersectCheck { continuation, .. }
            | Insn::Complement { continuation } => *continuation = next,
            _ => panic!("Should be a sub-match instruction"),
        }
    }

    /// Point the Jump at \p idx to the next offset.
    fn fixup_jump(&mut self, idx: JumpTarget) {
        let next = self.next_offset();
        match self.get_insn(idx) {
            Insn::Jump { target } => *target = next,
            _ => panic!("Should be a Jump instruction"),
        }
    }

    /// Emit the contents of a sub-match, terminated by a Goal.
    fn emit_submatch(&mut self, contents: &Node) {
        self.emit_node(contents);
        self.emit_insn(Insn::Goal);
    }

    fn group_bounds(node: &Node) -> Range<CaptureGroupID> {
        node.enclosed_groups()
    }

    /// Emit a catenation, gathering runs of literal chars into byte
    /// sequences.
    fn emit_cat(&mut self, children: &[Node]) {
        let mut literal = String::new();
        let mut literal_len = 0;
        for child in children {
            if let Node::Set(cps) = child {
                if let Some(c) = cps.single_char() {
                    literal.push(c);
                    literal_len += 1;
                    continue;
                }
            }
            self.flush_literal(&mut literal, &mut literal_len);
            self.emit_node(child);
        }
        self.flush_literal(&mut literal, &mut literal_len);
    }

    fn flush_literal(&mut self, literal: &mut String, literal_len: &mut usize) {
        match *literal_len {
            0 => {}
            1 => {
                if let Some(c) = literal.chars().next() {
                    self.emit_insn(Insn::Char(c))
                }
            }
            _ => self.emit_insn(Insn::ByteSeq(literal.as_bytes().into())),
        }
        literal.clear();
        *literal_len = 0;
    }

    /// Emit an alternation. Each branch but the last is preceded by an Alt
    /// pointing at the next branch, and followed by a jump to the exit.
    fn emit_alt(&mut self, branches: &[Node]) {
        let (last, rest) = match branches.split_last() {
            Some(split) => split,
            None => {
                self.emit_insn(Insn::JustFail);
                return;
            }
        };
        let mut jumps = Vec::with_capacity(rest.len());
        for branch in rest {
            let alt_insn = self.emit_insn_offset(Insn::Alt { secondary: 0 });
            self.emit_node(branch);
            jumps.push(self.emit_insn_offset(Insn::Jump { target: 0 }));
            let secondary_branch = self.next_offset();
            match self.get_insn(alt_insn) {
                Insn::Alt { secondary } => *secondary = secondary_branch,
                _ => panic!("Should be an Alt instruction"),
            }
        }
        self.emit_node(last);
        for jump in jumps {
            self.fixup_jump(jump);
        }
    }

    fn emit_loop(&mut self, loopee: &Node, quant: &ir::Quantifier) {
        if quant.greediness == Greediness::Possessive {
            let groups = Self::group_bounds(loopee);
            let atomic = self.emit_insn_offset(Insn::Atomic {
                start_group: groups.start,
                end_group: groups.end,
                continuation: 0,
            });
            self.emit_loop_body(loopee, quant.min, quant.max, true);
            self.emit_insn(Insn::Goal);
            self.fixup_continuation(atomic);
        } else {
            let greedy = quant.greediness == Greediness::Greedy;
            self.emit_loop_body(loopee, quant.min, quant.max, greedy);
        }
    }

    fn emit_loop_body(&mut self, loopee: &Node, min_iters: usize, max_iters: usize, greedy: bool) {
        if let Node::Set(cps) = loopee {
            self.emit_insn(Insn::Loop1CharBody {
                min_iters,
                max_iters,
                greedy,
            });
            self.emit_insn(make_set_insn(cps));
            return;
        }
        let loop_id = self.next_loop_id;
        self.next_loop_id += 1;
        let loop_insn = self.emit_insn_offset(Insn::EnterLoop(LoopFields {
            loop_id: loop_id as LoopID,
            min_iters,
            max_iters,
            greedy,
            exit: 0,
        }));
        self.result.loops += 1;
        self.emit_node(loopee);
        self.emit_insn(Insn::LoopAgain { begin: loop_insn });
        // Fix up our loop exit.
        let exit = self.next_offset();
        match self.get_insn(loop_insn) {
            Insn::EnterLoop(fields) => fields.exit = exit,
            _ => panic!("Should be an EnterLoop instruction"),
        }
    }

    fn emit_intersection(&mut self, branches: &[Node]) {
        let (first, rest) = match branches.split_first() {
            Some(split) => split,
            None => {
                self.emit_insn(Insn::JustFail);
                return;
            }
        };
        if rest.is_empty() {
            self.emit_node(first);
            return;
        }
        debug_assert!((self.result.registers as usize) < MAX_REGISTERS);
        let register = self.result.registers as RegisterID;
        self.result.registers += 1;
        self.emit_insn(Insn::SaveRegister(register));
        self.emit_node(first);
        for branch in rest {
            let groups = Self::group_bounds(branch);
            let check = self.emit_insn_offset(Insn::IntersectCheck {
                register,
                start_group: groups.start,
                end_group: groups.end,
                continuation: 0,
            });
            self.emit_submatch(branch);
            self.fixup_continuation(check);
        }
    }

    fn emit_conditional(&mut self, test: &Condition, then_branch: &Node, else_branch: &Node) {
        let test_insn = match test {
            &Condition::Capture(group) => self.emit_insn_offset(Insn::CondGroup {
                group,
                else_branch: 0,
            }),
            Condition::Assertion(assertion) => {
                let groups = Self::group_bounds(assertion);
                let insn = self.emit_insn_offset(Insn::CondAssertion {
                    start_group: groups.start,
                    end_group: groups.end,
                    then_branch: 0,
                    else_branch: 0,
                });
                self.emit_submatch(assertion);
                let then_offset = self.next_offset();
                match self.get_insn(insn) {
                    Insn::CondAssertion { then_branch, .. } => *then_branch = then_offset,
                    _ => panic!("Should be a CondAssertion instruction"),
                }
                insn
            }
        };
        self.emit_node(then_branch);
        let jump = self.emit_insn_offset(Insn::Jump { target: 0 });
        let else_offset = self.next_offset();
        match self.get_insn(test_insn) {
            Insn::CondGroup { else_branch, .. } | Insn::CondAssertion { else_branch, .. } => {
                *else_branch = else_offset
            }
            _ => panic!("Should be a conditional instruction"),
        }
        self.emit_node(else_branch);
        self.fixup_jump(jump);
    }

    /// Emit instructions corresponding to a given node.
    fn emit_node(&mut self, node: &Node) {
        match node {
            Node::Empty => {}
            Node::Goal => self.emit_insn(Insn::Goal),
            Node::Set(cps) => self.emit_insn(make_set_insn(cps)),
            Node::Cat(children) => self.emit_cat(children),
            Node::Alt(branches) => self.emit_alt(branches),
            Node::Intersect(branches) => self.emit_intersection(branches),
            Node::Complement(contents) => {
                let insn = self.emit_insn_offset(Insn::Complement { continuation: 0 });
                self.emit_submatch(contents);
                self.fixup_continuation(insn);
            }
            Node::Loop { loopee, quant } => self.emit_loop(loopee, quant),
            &Node::CaptureGroup {
                ref contents,
                group,
                ..
            } => {
                self.emit_insn(Insn::BeginCaptureGroup(group));
                self.emit_node(contents);
                self.emit_insn(Insn::EndCaptureGroup(group));
            }
            Node::NonCapturingGroup(contents) | Node::ModeSwitch { contents, .. } => {
                self.emit_node(contents)
            }
            Node::AtomicGroup(contents) => {
                let groups = Self::group_bounds(contents);
                let insn = self.emit_insn_offset(Insn::Atomic {
                    start_group: groups.start,
                    end_group: groups.end,
                    continuation: 0,
                });
                self.emit_submatch(contents);
                self.fixup_continuation(insn);
            }
            &Node::BackRef { group, icase } => self.emit_insn(Insn::BackRef { group, icase }),
            Node::Conditional {
                test,
                then_branch,
                else_branch,
            } => self.emit_conditional(test, then_branch, else_branch),
            &Node::Anchor(anchor_type) => self.emit_insn(make_anchor(anchor_type)),
            &Node::WordBoundary { algorithm, invert } => {
                self.emit_insn(Insn::WordBoundary { algorithm, invert })
            }
            Node::ResetMatchStart => self.emit_insn(Insn::ResetMatchStart),
            Node::TrailingContext(contents) => {
                let groups = Self::group_bounds(contents);
                let insn = self.emit_insn_offset(Insn::Lookahead {
                    start_group: groups.start,
                    end_group: groups.end,
                    continuation: 0,
                });
                self.emit_submatch(contents);
                self.fixup_continuation(insn);
            }
        }
    }
}

/// Compile the given IR to a CompiledRegex.
pub fn emit(re: &ir::Regex) -> CompiledRegex {
    let mut emitter = Emitter {
        next_loop_id: 0,
        result: CompiledRegex {
            insns: Vec::new(),
            start_pred: startpredicate::predicate_for_re(re),
            loops: 0,
            groups: re.group_count() as u32,
            registers: 0,
            group_names: re.group_names.clone().into_boxed_slice(),
            flags: re.flags,
            id: NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed),
        },
    };
    emitter.emit_node(&re.node);
    emitter.emit_insn(Insn::Goal);
    emitter.result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Flags;
    use crate::parse;

    fn compile(pattern: &str) -> CompiledRegex {
        let re = parse::try_parse(pattern, Flags::default()).expect("should parse");
        emit(&re)
    }

    #[test]
    fn literal_runs() {
        let cr = compile("abc");
        assert!(matches!(&cr.insns[0], Insn::ByteSeq(bytes) if &bytes[..] == b"abc"));
        assert!(matches!(cr.insns[1], Insn::Goal));
        let cr = compile("a[xy]é");
        assert!(matches!(cr.insns[0], Insn::Char('a')));
        assert!(matches!(cr.insns[1], Insn::AsciiBracket(..)));
        assert!(matches!(cr.insns[2], Insn::Char('é')));
    }

    #[test]
    fn jump_targets() {
        let cr = compile("a|b|c");
        assert!(matches!(cr.insns[0], Insn::Alt { secondary: 3 }));
        assert!(matches!(cr.insns[2], Insn::Jump { target: 7 }));
        assert!(matches!(cr.insns[3], Insn::Alt { secondary: 6 }));
        assert!(matches!(cr.insns[5], Insn::Jump { target: 7 }));
        assert!(matches!(cr.insns[7], Insn::Goal));
    }

    #[test]
    fn loops_and_submatches() {
        let cr = compile("(+ab)*x");
        assert!(matches!(&cr.insns[0], Insn::EnterLoop(fields) if fields.exit == 5));
        assert_eq!(cr.loops, 1);
        assert_eq!(cr.groups, 1);
        let cr = compile("a*+");
        assert!(matches!(cr.insns[0], Insn::Atomic { continuation: 4, .. }));
        assert!(matches!(cr.insns[1], Insn::Loop1CharBody { greedy: true, .. }));
        let cr = compile("a&b&c");
        assert_eq!(cr.registers, 1);
        assert!(matches!(cr.insns[0], Insn::SaveRegister(0)));
        assert!(matches!(cr.insns[2], Insn::IntersectCheck { continuation: 5, .. }));
    }
}
