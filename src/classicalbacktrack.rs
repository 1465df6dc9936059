//! Backtracking executor for compiled programs.

use crate::api::Match;
use crate::exec;
use crate::indexing::Utf8Input;
use crate::insn::{CompiledRegex, Insn, LoopFields, StartPredicate};
use crate::matchers;
use crate::matchers::CharProperties;
use crate::scm;
use crate::scm::SingleCharMatcher;
use crate::types::{
    CaptureGroupID, GroupData, LoopData, LoopID, Position, RegisterID, IP, MAX_CAPTURE_GROUPS,
};
use crate::util::DebugCheckIndex;
use crate::wordbreak;
use core::marker::PhantomData;
use core::ops::Range;
use log::trace;

#[derive(Clone, Debug)]
enum BacktrackInsn {
    /// Bottom of every stack; popping it means the attempt failed.
    Exhausted,

    /// Resume at ip with pos.
    SetPosition { ip: IP, pos: Position },

    SetLoopData {
        id: LoopID,
        data: LoopData,
    },

    SetCaptureGroup {
        id: CaptureGroupID,
        data: GroupData,
    },

    SetRegister {
        id: RegisterID,
        pos: Position,
    },

    SetMatchStart {
        pos: Position,
    },

    EnterNonGreedyLoop {
        // Always an EnterLoop.
        ip: IP,
        data: LoopData,
    },

    GreedyLoop1Char {
        continuation: IP,
        min: Position,
        max: Position,
    },

    NonGreedyLoop1Char {
        continuation: IP,
        min: Position,
        max: Position,
    },

    /// A complement matched [start, end); try shorter spans next.
    /// The IP points at the Complement insn.
    NextComplementEnd {
        ip: IP,
        start: Position,
        end: Position,
    },
}

#[derive(Debug, Default)]
struct State {
    loops: Vec<LoopData>,
    groups: Vec<GroupData>,
    registers: Vec<Position>,

    /// Where the overall match begins; moved by \K.
    match_start: Position,

    /// If set, the innermost sub-match must end exactly here.
    required_end: Option<Position>,
}

#[derive(Debug)]
pub(crate) struct MatchAttempter<'a, Props: CharProperties> {
    re: &'a CompiledRegex,
    stack: Vec<BacktrackInsn>,
    s: State,
    props: PhantomData<Props>,
}

impl<'a, Props: CharProperties> MatchAttempter<'a, Props> {
    pub(crate) fn new(re: &'a CompiledRegex) -> Self {
        Self {
            re,
            stack: vec![BacktrackInsn::Exhausted],
            s: State {
                loops: vec![LoopData::new(0); re.loops as usize],
                groups: vec![GroupData::new(); re.groups as usize],
                registers: vec![0; re.registers as usize],
                match_start: 0,
                required_end: None,
            },
            props: PhantomData,
        }
    }

    #[inline(always)]
    fn push_bt(&mut self, bt: BacktrackInsn) {
        self.stack.push(bt)
    }

    #[inline(always)]
    fn pop_bt(&mut self) {
        debug_assert!(self.stack.len() > 1, "Exhausted must stay on the stack");
        self.stack.pop();
    }

    fn begin_iteration(
        stack: &mut Vec<BacktrackInsn>,
        pos: Position,
        loop_fields: &LoopFields,
        loop_data: &mut LoopData,
    ) {
        stack.push(BacktrackInsn::SetLoopData {
            id: loop_fields.loop_id,
            data: *loop_data,
        });
        loop_data.iters += 1;
        loop_data.entry = pos;
    }

    fn run_loop(&mut self, loop_fields: &'a LoopFields, pos: Position, ip: IP) -> Option<IP> {
        let loop_data = self.s.loops.mat(loop_fields.loop_id as usize);
        let iteration = loop_data.iters;

        let may_iterate = iteration < loop_fields.max_iters;
        let may_exit = iteration >= loop_fields.min_iters;

        let body_ip = ip + 1;
        let exit_ip = loop_fields.exit as IP;

        // Once the minimum is satisfied, an iteration which matched the empty
        // string ends the loop. The iteration stands, along with its captures.
        if loop_data.entry == pos && iteration > loop_fields.min_iters {
            return Some(exit_ip);
        }

        match (may_iterate, may_exit) {
            (false, false) => None,
            (false, true) => Some(exit_ip),
            (true, false) => {
                Self::begin_iteration(&mut self.stack, pos, loop_fields, loop_data);
                Some(body_ip)
            }
            (true, true) if !loop_fields.greedy => {
                // Lazy: exit now, iterate on failure.
                loop_data.entry = pos;
                self.stack.push(BacktrackInsn::EnterNonGreedyLoop {
                    ip,
                    data: *loop_data,
                });
                Some(exit_ip)
            }
            (true, true) => {
                // Greedy: iterate now, exit on failure.
                self.stack.push(BacktrackInsn::SetPosition {
                    ip: exit_ip,
                    pos,
                });
                Self::begin_iteration(&mut self.stack, pos, loop_fields, loop_data);
                Some(body_ip)
            }
        }
    }

    // Step \p matcher at least \p min and at most \p max times.
    // \return the positions after min steps and after the last step.
    #[inline(always)]
    fn run_scm_loop_impl<Scm: SingleCharMatcher>(
        input: &Utf8Input,
        mut pos: Position,
        min: usize,
        max: usize,
        matcher: Scm,
    ) -> Option<(Position, Position)> {
        debug_assert!(min <= max);
        for _ in 0..min {
            if !matcher.matches(input, &mut pos) {
                return None;
            }
        }
        let min_pos = pos;

        let mut iters = min;
        while iters < max {
            let saved = pos;
            if !matcher.matches(input, &mut pos) {
                pos = saved;
                break;
            }
            iters += 1;
        }
        Some((min_pos, pos))
    }

    // Run a loop whose body is a single char matcher. Rather than one stack
    // entry per iteration, push one entry covering every end position.
    fn run_scm_loop(
        &mut self,
        input: &Utf8Input,
        pos: &mut Position,
        min: usize,
        max: usize,
        ip: IP,
        greedy: bool,
    ) -> Option<IP> {
        let loop_res = match self.re.insns.iat(ip + 1) {
            &Insn::Char(c) => Self::run_scm_loop_impl(input, *pos, min, max, scm::Char { c }),
            Insn::AsciiBracket(bitmap) => {
                Self::run_scm_loop_impl(input, *pos, min, max, scm::ascii_bracket(bitmap))
            }
            Insn::Bracket(cps) => {
                Self::run_scm_loop_impl(input, *pos, min, max, scm::Bracket { cps })
            }
            Insn::JustFail => Self::run_scm_loop_impl(input, *pos, min, max, scm::Nothing {}),
            _ => rs_unreachable!("Loop1CharBody must be followed by a single char matcher"),
        };

        let (min_pos, max_pos) = loop_res?;
        debug_assert!(min_pos <= max_pos);

        // Skip the body insn.
        let continuation = ip + 2;
        if min_pos != max_pos {
            let bti = if greedy {
                BacktrackInsn::GreedyLoop1Char {
                    continuation,
                    min: min_pos,
                    max: max_pos,
                }
            } else {
                BacktrackInsn::NonGreedyLoop1Char {
                    continuation,
                    min: min_pos,
                    max: max_pos,
                }
            };
            self.push_bt(bti);
        }
        *pos = if greedy { max_pos } else { min_pos };
        Some(continuation)
    }

    // Run the sub-match whose instructions begin at \p ip, on a fresh
    // backtrack stack. The half-open range \p groups contains the capture
    // groups it may set. If \p keep is set and the sub-match succeeds, its
    // captures are retained (restorable by backtracking); otherwise the state
    // is put back as it was.
    // \return the position where the sub-match ended.
    fn run_submatch(
        &mut self,
        input: &Utf8Input,
        ip: IP,
        pos: Position,
        groups: Range<CaptureGroupID>,
        required_end: Option<Position>,
        keep: bool,
    ) -> Option<Position> {
        let range = (groups.start as usize)..(groups.end as usize);
        let saved_groups = self.s.groups.iat(range.clone()).to_vec();
        let saved_start = self.s.match_start;
        let saved_required_end = core::mem::replace(&mut self.s.required_end, required_end);

        // A sub-match cannot backtrack into the outer stack.
        let mut outer_stack = vec![BacktrackInsn::Exhausted];
        core::mem::swap(&mut self.stack, &mut outer_stack);
        let result = self.try_at_pos(input, ip, pos);
        core::mem::swap(&mut self.stack, &mut outer_stack);
        self.s.required_end = saved_required_end;

        if result.is_some() && keep {
            for (idx, cg) in saved_groups.iter().enumerate() {
                debug_assert!(idx + (groups.start as usize) < MAX_CAPTURE_GROUPS);
                self.push_bt(BacktrackInsn::SetCaptureGroup {
                    id: (idx as CaptureGroupID) + groups.start,
                    data: *cg,
                });
            }
            self.push_bt(BacktrackInsn::SetMatchStart { pos: saved_start });
        } else {
            self.s.groups.splice(range, saved_groups);
            self.s.match_start = saved_start;
        }
        result
    }

    // Find the longest span [start, e) with e <= end which the contents of
    // the Complement at \p ip cannot match exactly.
    fn next_complement_end(
        &mut self,
        input: &Utf8Input,
        ip: IP,
        start: Position,
        mut end: Position,
    ) -> Option<Position> {
        loop {
            if self
                .run_submatch(input, ip + 1, start, 0..0, Some(end), false)
                .is_none()
            {
                return Some(end);
            }
            if end <= start {
                return None;
            }
            end = input.next_left_pos(end)?;
        }
    }

    fn complement_continuation(&self, ip: IP) -> IP {
        match self.re.insns.iat(ip) {
            &Insn::Complement { continuation } => continuation as IP,
            _ => rs_unreachable!("NextComplementEnd must point at a Complement insn"),
        }
    }

    /// Unwind to the most recent choice point, restoring state on the way.
    /// \return false once only Exhausted is left.
    fn try_backtrack(&mut self, input: &Utf8Input, ip: &mut IP, pos: &mut Position) -> bool {
        loop {
            let bt = match self.stack.last_mut() {
                Some(bt) => bt,
                None => rs_unreachable!("Exhausted is never popped"),
            };
            match bt {
                BacktrackInsn::Exhausted => return false,

                &mut BacktrackInsn::SetPosition {
                    ip: saved_ip,
                    pos: saved_pos,
                } => {
                    *ip = saved_ip;
                    *pos = saved_pos;
                    self.pop_bt();
                    return true;
                }
                &mut BacktrackInsn::SetLoopData { id, data } => {
                    *self.s.loops.mat(id as usize) = data;
                    self.pop_bt();
                }
                &mut BacktrackInsn::SetCaptureGroup { id, data } => {
                    *self.s.groups.mat(id as usize) = data;
                    self.pop_bt();
                }
                &mut BacktrackInsn::SetRegister { id, pos: saved } => {
                    *self.s.registers.mat(id as usize) = saved;
                    self.pop_bt();
                }
                &mut BacktrackInsn::SetMatchStart { pos: saved } => {
                    self.s.match_start = saved;
                    self.pop_bt();
                }

                &mut BacktrackInsn::EnterNonGreedyLoop { ip: loop_ip, data } => {
                    // Pop first; entering pushes its own entry.
                    self.pop_bt();
                    *ip = loop_ip + 1;
                    *pos = data.entry;
                    let loop_fields = match self.re.insns.iat(loop_ip) {
                        Insn::EnterLoop(loop_fields) => loop_fields,
                        _ => rs_unreachable!("EnterNonGreedyLoop must point at a loop instruction"),
                    };
                    let loop_data = self.s.loops.mat(loop_fields.loop_id as usize);
                    *loop_data = data;
                    Self::begin_iteration(&mut self.stack, *pos, loop_fields, loop_data);
                    return true;
                }

                BacktrackInsn::GreedyLoop1Char {
                    continuation,
                    min,
                    max,
                } => {
                    // Give back one char from the end.
                    debug_assert!(*max >= *min);
                    if *max == *min {
                        self.pop_bt();
                        continue;
                    }
                    match input.next_left_pos(*max) {
                        Some(newmax) => {
                            *pos = newmax;
                            *max = newmax;
                        }
                        None => rs_unreachable!("Should always be able to retreat since min != max"),
                    }
                    *ip = *continuation;
                    return true;
                }

                BacktrackInsn::NonGreedyLoop1Char {
                    continuation,
                    min,
                    max,
                } => {
                    // Take one more char.
                    debug_assert!(*max >= *min);
                    if *max == *min {
                        self.pop_bt();
                        continue;
                    }
                    match input.next_right_pos(*min) {
                        Some(newmin) => {
                            *pos = newmin;
                            *min = newmin;
                        }
                        None => rs_unreachable!("Should always be able to advance since min != max"),
                    }
                    *ip = *continuation;
                    return true;
                }

                &mut BacktrackInsn::NextComplementEnd {
                    ip: complement_ip,
                    start,
                    end,
                } => {
                    self.pop_bt();
                    if end <= start {
                        continue;
                    }
                    let shorter = match input.next_left_pos(end) {
                        Some(shorter) => shorter,
                        None => continue,
                    };
                    if let Some(found) =
                        self.next_complement_end(input, complement_ip, start, shorter)
                    {
                        self.push_bt(BacktrackInsn::NextComplementEnd {
                            ip: complement_ip,
                            start,
                            end: found,
                        });
                        *pos = found;
                        *ip = self.complement_continuation(complement_ip);
                        return true;
                    }
                }
            }
        }
    }

    /// Run the program from \p ip at \p pos until Goal or exhaustion.
    fn try_at_pos(&mut self, input: &Utf8Input, mut ip: IP, mut pos: Position) -> Option<Position> {
        debug_assert!(
            self.stack.len() == 1,
            "Stack should hold only Exhausted"
        );
        let re = self.re;
        // 'dispatch runs the next insn; breaking 'fail backtracks.
        #[allow(clippy::never_loop)]
        'dispatch: loop {
            'fail: loop {
                macro_rules! advance_or_fail {
                    ($e:expr) => {
                        if $e {
                            ip += 1;
                            continue 'dispatch;
                        } else {
                            break 'fail;
                        }
                    };
                }

                match re.insns.iat(ip) {
                    &Insn::Char(c) => advance_or_fail!(scm::Char { c }.matches(input, &mut pos)),

                    Insn::ByteSeq(bytes) => advance_or_fail!(input.match_bytes(bytes, &mut pos)),

                    Insn::AsciiBracket(bitmap) => {
                        advance_or_fail!(scm::ascii_bracket(bitmap).matches(input, &mut pos))
                    }

                    Insn::Bracket(cps) => {
                        advance_or_fail!(scm::Bracket { cps }.matches(input, &mut pos))
                    }

                    Insn::StartOfText => advance_or_fail!(pos == 0),

                    Insn::EndOfText => advance_or_fail!(pos == input.len()),

                    Insn::StartOfLine => {
                        // There is no line start between CR and LF.
                        let matches = match input.peek_left(pos) {
                            None => true,
                            Some('\r') => input.peek_right(pos) != Some('\n'),
                            Some(c) => Props::is_line_terminator(c),
                        };
                        advance_or_fail!(matches)
                    }

                    Insn::EndOfLine => {
                        let matches = match input.peek_right(pos) {
                            None => true,
                            Some('\n') => input.peek_left(pos) != Some('\r'),
                            Some(c) => Props::is_line_terminator(c),
                        };
                        advance_or_fail!(matches)
                    }

                    &Insn::WordBoundary { algorithm, invert } => {
                        let is_boundary =
                            wordbreak::is_word_boundary::<Props>(input.text(), pos, algorithm);
                        advance_or_fail!(is_boundary != invert)
                    }

                    &Insn::Jump { target } => {
                        ip = target as IP;
                        continue 'dispatch;
                    }

                    &Insn::Alt { secondary } => {
                        self.push_bt(BacktrackInsn::SetPosition {
                            ip: secondary as IP,
                            pos,
                        });
                        advance_or_fail!(true);
                    }

                    &Insn::BeginCaptureGroup(cg_idx) => {
                        let cg = self.s.groups.mat(cg_idx as usize);
                        self.stack.push(BacktrackInsn::SetCaptureGroup {
                            id: cg_idx,
                            data: *cg,
                        });
                        // The previous span stays visible until this entry closes.
                        cg.open = Some(pos);
                        advance_or_fail!(true)
                    }

                    &Insn::EndCaptureGroup(cg_idx) => {
                        let cg = self.s.groups.mat(cg_idx as usize);
                        debug_assert!(cg.open.is_some(), "Capture group should have been entered");
                        self.stack.push(BacktrackInsn::SetCaptureGroup {
                            id: cg_idx,
                            data: *cg,
                        });
                        cg.start = cg.open;
                        cg.end = Some(pos);
                        advance_or_fail!(true)
                    }

                    &Insn::BackRef { group, icase } => {
                        // A group which has not participated matches the empty string.
                        // Note we may be in the group we are examining, e.g. /(+a\1)/.
                        let matched = match self.s.groups.iat(group as usize).as_range() {
                            Some(orig_range) if icase => {
                                matchers::backref_icase::<Props>(input, orig_range, &mut pos)
                            }
                            Some(orig_range) => matchers::backref(input, orig_range, &mut pos),
                            None => true,
                        };
                        advance_or_fail!(matched)
                    }

                    &Insn::Atomic {
                        start_group,
                        end_group,
                        continuation,
                    } => match self.run_submatch(
                        input,
                        ip + 1,
                        pos,
                        start_group..end_group,
                        None,
                        true,
                    ) {
                        Some(end) => {
                            pos = end;
                            ip = continuation as IP;
                            continue 'dispatch;
                        }
                        None => break 'fail,
                    },

                    &Insn::Lookahead {
                        start_group,
                        end_group,
                        continuation,
                    } => {
                        if self
                            .run_submatch(input, ip + 1, pos, start_group..end_group, None, true)
                            .is_some()
                        {
                            ip = continuation as IP;
                            continue 'dispatch;
                        } else {
                            break 'fail;
                        }
                    }

                    &Insn::CondGroup { group, else_branch } => {
                        // The test is made once; neither branch is a choice point.
                        if self.s.groups.iat(group as usize).as_range().is_some() {
                            ip += 1;
                        } else {
                            ip = else_branch as IP;
                        }
                        continue 'dispatch;
                    }

                    &Insn::CondAssertion {
                        start_group,
                        end_group,
                        then_branch,
                        else_branch,
                    } => {
                        let passed = self
                            .run_submatch(input, ip + 1, pos, start_group..end_group, None, true)
                            .is_some();
                        ip = (if passed { then_branch } else { else_branch }) as IP;
                        continue 'dispatch;
                    }

                    &Insn::SaveRegister(register) => {
                        let slot = self.s.registers.mat(register as usize);
                        self.stack.push(BacktrackInsn::SetRegister {
                            id: register,
                            pos: *slot,
                        });
                        *slot = pos;
                        advance_or_fail!(true)
                    }

                    &Insn::IntersectCheck {
                        register,
                        start_group,
                        end_group,
                        continuation,
                    } => {
                        let start = *self.s.registers.iat(register as usize);
                        if self
                            .run_submatch(
                                input,
                                ip + 1,
                                start,
                                start_group..end_group,
                                Some(pos),
                                true,
                            )
                            .is_some()
                        {
                            ip = continuation as IP;
                            continue 'dispatch;
                        } else {
                            break 'fail;
                        }
                    }

                    &Insn::Complement { continuation } => {
                        match self.next_complement_end(input, ip, pos, input.len()) {
                            Some(end) => {
                                self.push_bt(BacktrackInsn::NextComplementEnd {
                                    ip,
                                    start: pos,
                                    end,
                                });
                                pos = end;
                                ip = continuation as IP;
                                continue 'dispatch;
                            }
                            None => break 'fail,
                        }
                    }

                    Insn::ResetMatchStart => {
                        self.stack.push(BacktrackInsn::SetMatchStart {
                            pos: self.s.match_start,
                        });
                        self.s.match_start = pos;
                        advance_or_fail!(true)
                    }

                    Insn::EnterLoop(fields) => {
                        // Fresh entry, not a repeat.
                        self.s.loops.mat(fields.loop_id as usize).iters = 0;
                        match self.run_loop(fields, pos, ip) {
                            Some(next_ip) => {
                                ip = next_ip;
                                continue 'dispatch;
                            }
                            None => break 'fail,
                        }
                    }

                    &Insn::LoopAgain { begin } => {
                        let act = match re.insns.iat(begin as IP) {
                            Insn::EnterLoop(fields) => self.run_loop(fields, pos, begin as IP),
                            _ => rs_unreachable!("LoopAgain should always refer to EnterLoop"),
                        };
                        match act {
                            Some(next_ip) => {
                                ip = next_ip;
                                continue 'dispatch;
                            }
                            None => break 'fail,
                        }
                    }

                    &Insn::Loop1CharBody {
                        min_iters,
                        max_iters,
                        greedy,
                    } => {
                        if let Some(next_ip) =
                            self.run_scm_loop(input, &mut pos, min_iters, max_iters, ip, greedy)
                        {
                            ip = next_ip;
                            continue 'dispatch;
                        } else {
                            break 'fail;
                        }
                    }

                    Insn::Goal => {
                        if self.s.required_end.is_some_and(|end| end != pos) {
                            break 'fail;
                        }
                        self.stack.truncate(1);
                        return Some(pos);
                    }

                    Insn::JustFail => {
                        break 'fail;
                    }
                }
            }

            if self.try_backtrack(input, &mut ip, &mut pos) {
                continue 'dispatch;
            } else {
                debug_assert!(self.stack.len() == 1);
                return None;
            }
        }
    }
}

#[derive(Debug)]
pub struct BacktrackExecutor<'r, 't, Props: CharProperties> {
    input: Utf8Input<'t>,
    matcher: MatchAttempter<'r, Props>,
}

impl<Props: CharProperties> BacktrackExecutor<'_, '_, Props> {
    fn successful_match(&mut self, end: Position) -> Match {
        // Read out the captures, leaving the groups reset for the next attempt.
        let mut captures = Vec::with_capacity(self.matcher.s.groups.len());
        for gd in self.matcher.s.groups.iter_mut() {
            captures.push(gd.as_range());
            gd.reset();
        }
        // A \K inside trailing context may point past the end.
        let start = self.matcher.s.match_start.min(end);
        Match::new(
            start..end,
            captures,
            self.matcher.re.group_names.clone(),
            self.matcher.re.id,
        )
    }

    /// Try matching at exactly \p pos.
    fn attempt(&mut self, pos: Position) -> Option<Match> {
        trace!("Attempting match at {}", pos);
        self.matcher.s.match_start = pos;
        let end = self.matcher.try_at_pos(&self.input, 0, pos)?;
        Some(self.successful_match(end))
    }

    /// \return where to resume searching after \p m.
    fn resume_position(&self, m: &Match) -> Option<Position> {
        if m.range.is_empty() {
            self.input.next_right_pos(m.range.end)
        } else {
            Some(m.range.end)
        }
    }
}

impl<Props: CharProperties> exec::MatchProducer for BacktrackExecutor<'_, '_, Props> {
    fn next_match(&mut self, mut pos: Position, next_start: &mut Option<Position>) -> Option<Match> {
        let re = self.matcher.re;
        let found = match &re.start_pred {
            StartPredicate::StartAnchored => self.attempt(pos),
            StartPredicate::Arbitrary => loop {
                if let Some(m) = self.attempt(pos) {
                    break Some(m);
                }
                match self.input.next_right_pos(pos) {
                    Some(next) => pos = next,
                    None => break None,
                }
            },
            StartPredicate::Literal(scanner) => {
                let text = self.input.text();
                loop {
                    pos = match scanner.scan(text, pos) {
                        Some(candidate) => candidate,
                        None => break None,
                    };
                    if let Some(m) = self.attempt(pos) {
                        break Some(m);
                    }
                    match self.input.next_right_pos(pos) {
                        Some(next) => pos = next,
                        None => break None,
                    }
                }
            }
        };
        *next_start = found.as_ref().and_then(|m| self.resume_position(m));
        found
    }
}

impl<'r, 't, Props: CharProperties> exec::Executor<'r, 't> for BacktrackExecutor<'r, 't, Props> {
    fn new(re: &'r CompiledRegex, text: &'t str) -> Self {
        Self {
            input: Utf8Input::new(text),
            matcher: MatchAttempter::new(re),
        }
    }
}
