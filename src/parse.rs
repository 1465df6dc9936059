//! Parser from regex patterns to IR

use crate::api;
use crate::charclasses::{self, ClassExpr};
use crate::codepointset::CodePointSet;
use crate::folds;
use crate::ir;
use crate::types::{CaptureGroupID, CharacterClassType, MAX_CAPTURE_GROUPS, MAX_LOOPS};
use crate::unicode::{self, Property};
use crate::wordbreak::WordBreakAlgorithm;
use std::fmt;
use std::iter::Peekable;

/// Represents an error encountered during regex compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The pattern which failed to compile.
    pub pattern: String,

    /// The offset of the offending token, counted in chars.
    pub position: usize,

    /// A human-readable error message.
    pub message: String,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Error in /{}/ at position {}: {}",
            self.pattern, self.position, self.message
        )
    }
}

impl std::error::Error for Error {}

fn error<S, T>(position: usize, message: S) -> Result<T, Error>
where
    S: ToString,
{
    Err(Error {
        pattern: String::new(),
        position,
        message: message.to_string(),
    })
}

fn make_cat(mut nodes: ir::NodeList) -> ir::Node {
    match nodes.len() {
        0 => ir::Node::Empty,
        1 => nodes.pop().unwrap_or(ir::Node::Empty),
        _ => ir::Node::Cat(nodes),
    }
}

fn make_alt(mut nodes: ir::NodeList) -> ir::Node {
    match nodes.len() {
        0 => ir::Node::Empty,
        1 => nodes.pop().unwrap_or(ir::Node::Empty),
        _ => ir::Node::Alt(nodes),
    }
}

fn make_intersect(mut nodes: ir::NodeList) -> ir::Node {
    match nodes.len() {
        0 => ir::Node::Empty,
        1 => nodes.pop().unwrap_or(ir::Node::Empty),
        _ => ir::Node::Intersect(nodes),
    }
}

/// \return whether \p name is a valid capture group name.
fn is_group_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A class item: either a single code point (which may start a range) or
/// something which may not.
enum ClassAtom {
    CodePoint(char),
    Expr(ClassExpr),
}

/// What we got from parsing one atom.
enum Atom {
    /// A node which may be followed by quantifiers.
    Quantifiable(ir::Node),

    /// A complete term.
    Term(ir::Node),

    /// A zero-width node which may not be quantified.
    Assertion(ir::Node),

    /// \k: the rest of the sequence is trailing context.
    TrailingContext,

    /// (?flags): the rest of the sequence is parsed with new flags.
    FlagSwitch(api::Flags),

    /// Something which produces no node, like a comment.
    Nothing,
}

/// What a backreference or conditional test refers to, by source text.
#[derive(Debug)]
enum GroupRef {
    Number(usize),
    Name(String),
}

/// A reference which is resolved once all groups are known.
#[derive(Debug)]
struct PendingRef {
    target: GroupRef,
    position: usize,
}

/// The unconsumed pattern text, with the char offset of its first char.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    chars: Peekable<std::str::Chars<'a>>,
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(pattern: &'a str) -> Self {
        Cursor {
            chars: pattern.chars().peekable(),
            offset: 0,
        }
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }
}

impl Iterator for Cursor<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.offset += 1;
        Some(c)
    }
}

/// Represents the state used to parse a regex.
struct Parser<'a> {
    /// The remaining input.
    input: Cursor<'a>,

    /// Flags in effect at the current point of the pattern.
    flags: api::Flags,

    /// Set if an inline `A` flag was seen anywhere.
    anchored: bool,

    /// Number of loops.
    loop_count: usize,

    /// The capture group table, in order of opening paren.
    group_names: Vec<Option<String>>,

    /// Backreferences and capture tests, in source order.
    refs: Vec<PendingRef>,

    /// Nesting depth of conditional tests; an unescaped '}' ends the test.
    test_depth: usize,
}

impl<'a> Parser<'a> {
    /// Consume a character, returning it.
    fn consume(&mut self, c: char) -> char {
        let nc = self.input.next();
        debug_assert!(nc == Some(c), "char was not next");
        c
    }

    /// If our contents begin with the char c, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.input.next();
            true
        } else {
            false
        }
    }

    /// If our contents begin with the string \p s, consume it from our contents
    /// and return true. Otherwise return false.
    fn try_consume_str(&mut self, s: &str) -> bool {
        let mut cursor = self.input.clone();
        for c1 in s.chars() {
            if cursor.next() != Some(c1) {
                return false;
            }
        }
        self.input = cursor;
        true
    }

    /// \return whether our contents begin with \p s, without consuming.
    fn lookahead_str(&self, s: &str) -> bool {
        let mut cursor = self.input.clone();
        s.chars().all(|c1| cursor.next() == Some(c1))
    }

    /// Peek at the next character.
    fn peek(&mut self) -> Option<char> {
        self.input.peek().copied()
    }

    /// \return the next character.
    fn next(&mut self) -> Option<char> {
        self.input.next()
    }

    /// \return the offset in chars of the next character.
    fn position(&self) -> usize {
        self.input.offset
    }

    /// In free-spacing mode, skip whitespace and comments.
    fn skip_insignificant(&mut self) {
        if !self.flags.extended {
            return;
        }
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.consume(c);
                }
                Some('#') => {
                    while let Some(c) = self.next() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }

    /// \return whether the next char ends a sequence.
    fn at_sequence_end(&mut self) -> bool {
        match self.peek() {
            None | Some(')') | Some('|') | Some('&') => true,
            Some('}') => self.test_depth > 0,
            _ => false,
        }
    }

    /// A Set node for a literal char, closed over case if needed.
    fn literal(&self, c: char) -> ir::Node {
        let cps = CodePointSet::from_codepoint(c as u32);
        ir::Node::Set(if self.flags.icase {
            folds::fold_code_points(cps)
        } else {
            cps
        })
    }

    fn try_parse(&mut self) -> Result<ir::Regex, Error> {
        // Parse a disjunction. If we consume everything, it's success. If there's
        // something left, it's an error (for example, an excess closing paren).
        let initial_flags = self.flags;
        let body = self.consume_disjunction()?;
        let position = self.position();
        match self.peek() {
            Some(')') => error(position, "Unbalanced parenthesis"),
            Some(c) => error(position, format!("Unexpected char: {}", c)),
            None => {
                let mut flags = initial_flags;
                flags.anchored |= self.anchored;
                let group_names = std::mem::take(&mut self.group_names);
                self.finalize(ir::Regex {
                    node: body,
                    flags,
                    group_names,
                })
            }
        }
    }

    /// alternation := intersection ('|' intersection)*
    fn consume_disjunction(&mut self) -> Result<ir::Node, Error> {
        let mut branches = vec![self.consume_intersection()?];
        while self.try_consume('|') {
            branches.push(self.consume_intersection()?)
        }
        Ok(make_alt(branches))
    }

    /// intersection := sequence ('&' sequence)*
    fn consume_intersection(&mut self) -> Result<ir::Node, Error> {
        let mut operands = vec![self.consume_sequence()?];
        while self.try_consume('&') {
            operands.push(self.consume_sequence()?)
        }
        Ok(make_intersect(operands))
    }

    /// A sequence of terms, ending at '|', '&', ')' or the end.
    fn consume_sequence(&mut self) -> Result<ir::Node, Error> {
        let mut result: Vec<ir::Node> = Vec::new();
        loop {
            self.skip_insignificant();
            if self.at_sequence_end() {
                break;
            }
            match self.consume_term()? {
                Atom::Quantifiable(node) | Atom::Term(node) | Atom::Assertion(node) => {
                    result.push(node)
                }
                Atom::Nothing => {}
                Atom::TrailingContext => {
                    let rest = self.consume_sequence()?;
                    result.push(ir::Node::TrailingContext(Box::new(rest)));
                    break;
                }
                Atom::FlagSwitch(flags) => {
                    let saved = self.flags;
                    self.flags = flags;
                    let rest = self.consume_sequence()?;
                    self.flags = saved;
                    result.push(ir::Node::ModeSwitch {
                        flags,
                        contents: Box::new(rest),
                    });
                    break;
                }
            }
        }
        Ok(make_cat(result))
    }

    /// term := '~' term | atom quantifier*
    fn consume_term(&mut self) -> Result<Atom, Error> {
        let position = self.position();
        if self.try_consume('~') {
            self.skip_insignificant();
            if self.at_sequence_end() {
                return error(position, "Nothing to complement");
            }
            let operand = match self.consume_term()? {
                Atom::Quantifiable(node) | Atom::Term(node) | Atom::Assertion(node) => node,
                _ => return error(position, "Nothing to complement"),
            };
            let mut forbidden = false;
            ir::walk(false, &operand, &mut |n: &ir::Node, _w: &mut ir::Walk| {
                forbidden |= matches!(
                    n,
                    ir::Node::CaptureGroup { .. } | ir::Node::AtomicGroup(..)
                );
            });
            if forbidden {
                return error(position, "Cannot complement a capturing or atomic group");
            }
            return Ok(Atom::Term(ir::Node::Complement(Box::new(operand))));
        }

        match self.consume_atom()? {
            Atom::Quantifiable(node) => Ok(Atom::Term(self.consume_quantifiers(node)?)),
            atom @ (Atom::Assertion(..) | Atom::TrailingContext) => {
                self.skip_insignificant();
                let position = self.position();
                let saved = self.input.clone();
                if let Ok(Some(_)) = self.try_consume_quantifier() {
                    return error(position, "Quantifier not allowed here");
                }
                self.input = saved;
                Ok(atom)
            }
            atom => Ok(atom),
        }
    }

    /// Apply any (possibly stacked) quantifiers to \p node.
    fn consume_quantifiers(&mut self, mut node: ir::Node) -> Result<ir::Node, Error> {
        loop {
            self.skip_insignificant();
            let position = self.position();
            let quant = match self.try_consume_quantifier()? {
                Some(quant) => quant,
                None => return Ok(node),
            };
            if quant.min > quant.max {
                return error(position, "Invalid quantifier: max is less than min");
            }
            if self.loop_count >= MAX_LOOPS {
                return error(position, "Loop count limit exceeded");
            }
            self.loop_count += 1;
            node = ir::Node::Loop {
                loopee: Box::new(node),
                quant,
            };
        }
    }

    fn consume_atom(&mut self) -> Result<Atom, Error> {
        let position = self.position();
        let c = match self.peek() {
            Some(c) => c,
            None => return error(position, "Unexpected end of pattern"),
        };
        match c {
            '^' => {
                self.consume('^');
                Ok(Atom::Assertion(ir::Node::Anchor(if self.flags.multiline {
                    ir::AnchorType::StartOfLine
                } else {
                    ir::AnchorType::StartOfText
                })))
            }

            '$' => {
                self.consume('$');
                Ok(Atom::Assertion(ir::Node::Anchor(if self.flags.multiline {
                    ir::AnchorType::EndOfLine
                } else {
                    ir::AnchorType::EndOfText
                })))
            }

            '.' => {
                self.consume('.');
                Ok(Atom::Quantifiable(ir::Node::Set(charclasses::dot_set(
                    self.flags.dot_all,
                ))))
            }

            '\\' => {
                self.consume('\\');
                self.consume_atom_escape(position)
            }

            '(' => self.consume_group(),

            '[' => {
                let expr = self.consume_bracket()?;
                Ok(Atom::Quantifiable(ir::Node::Set(
                    expr.simplify().evaluate(self.flags.icase),
                )))
            }

            ']' => error(position, "Unbalanced bracket"),

            '*' | '+' | '?' | '{' => {
                // It's an error if this parses successfully as a quantifier.
                // Otherwise parsing the quantifier produced the error.
                self.try_consume_quantifier()?;
                error(position, "Nothing to repeat")
            }

            c => {
                self.consume(c);
                Ok(Atom::Quantifiable(self.literal(c)))
            }
        }
    }

    fn consume_group(&mut self) -> Result<Atom, Error> {
        let position = self.position();
        let node = if self.try_consume_str("(?:") {
            ir::Node::NonCapturingGroup(Box::new(self.consume_disjunction()?))
        } else if self.try_consume_str("(?>") {
            ir::Node::AtomicGroup(Box::new(self.consume_disjunction()?))
        } else if self.try_consume_str("(?#") {
            loop {
                match self.next() {
                    Some(')') => return Ok(Atom::Nothing),
                    Some(_) => {}
                    None => return error(position, "Unterminated comment"),
                }
            }
        } else if self.try_consume_str("(?{") {
            self.consume_conditional(position)?
        } else if self.try_consume_str("(?") {
            let flags = self.consume_flags(position)?;
            if self.try_consume(')') {
                return Ok(Atom::FlagSwitch(flags));
            }
            if !self.try_consume(':') {
                return error(self.position(), "Invalid group modifier");
            }
            let saved = self.flags;
            self.flags = flags;
            let contents = self.consume_disjunction();
            self.flags = saved;
            ir::Node::ModeSwitch {
                flags,
                contents: Box::new(contents?),
            }
        } else if self.try_consume_str("(+") {
            self.consume_capture_group(position, None)?
        } else if self.try_consume_str("({") {
            let name = self.consume_group_name(position)?;
            if self.group_names.iter().flatten().any(|n| *n == name) {
                return error(position, format!("Duplicate group name '{}'", name));
            }
            self.consume_capture_group(position, Some(name))?
        } else {
            self.consume('(');
            ir::Node::NonCapturingGroup(Box::new(self.consume_disjunction()?))
        };
        if !self.try_consume(')') {
            return error(position, "Unterminated group");
        }
        Ok(Atom::Quantifiable(node))
    }

    fn consume_capture_group(
        &mut self,
        position: usize,
        name: Option<String>,
    ) -> Result<ir::Node, Error> {
        if self.group_names.len() >= MAX_CAPTURE_GROUPS {
            return error(position, "Capture group count limit exceeded");
        }
        let group = self.group_names.len() as CaptureGroupID;
        self.group_names.push(name.clone());
        let contents = self.consume_disjunction()?;
        Ok(ir::Node::CaptureGroup {
            contents: Box::new(contents),
            group,
            name,
        })
    }

    /// Parse a name up to and including '}'.
    fn consume_group_name(&mut self, position: usize) -> Result<String, Error> {
        let mut name = String::new();
        loop {
            match self.next() {
                Some('}') => break,
                Some(c) => name.push(c),
                None => return error(position, "Unterminated group name"),
            }
        }
        if name.is_empty() {
            return error(position, "Empty group name");
        }
        if !is_group_name(&name) {
            return error(position, format!("Invalid group name '{}'", name));
        }
        Ok(name)
    }

    /// Parse inline flags like `im-sx`, applying them to the current flags.
    fn consume_flags(&mut self, position: usize) -> Result<api::Flags, Error> {
        let mut flags = self.flags;
        let mut enable = true;
        while let Some(c) = self.peek() {
            let field = match c {
                'i' => &mut flags.icase,
                'm' => &mut flags.multiline,
                's' => &mut flags.dot_all,
                'x' => &mut flags.extended,
                'w' => &mut flags.simple_word_break,
                'A' => {
                    self.anchored = true;
                    &mut flags.anchored
                }
                '-' if enable => {
                    self.consume('-');
                    enable = false;
                    continue;
                }
                ':' | ')' => break,
                _ => return error(position, format!("Unknown group flag '{}'", c)),
            };
            *field = enable;
            self.consume(c);
        }
        Ok(flags)
    }

    /// Parse `(?{test}then|else)` after the `(?{`.
    fn consume_conditional(&mut self, position: usize) -> Result<ir::Node, Error> {
        let test = if let Some(target) = self.try_consume_braced_reference() {
            self.refs.push(PendingRef { target, position });
            ir::Condition::Capture(0)
        } else {
            if self.peek() == Some('}') {
                return error(position, "Conditional group is missing its assertion");
            }
            self.test_depth += 1;
            let assertion = self.consume_disjunction();
            self.test_depth -= 1;
            let assertion = assertion?;
            if !self.try_consume('}') {
                return error(position, "Unterminated conditional test");
            }
            ir::Condition::Assertion(Box::new(assertion))
        };

        let then_branch = self.consume_intersection()?;
        if !self.try_consume('|') {
            return error(position, "Conditional group must have exactly two branches");
        }
        let else_branch = self.consume_intersection()?;
        if self.peek() == Some('|') {
            return error(position, "Conditional group must have exactly two branches");
        }
        Ok(ir::Node::Conditional {
            test,
            then_branch: Box::new(then_branch),
            else_branch: Box::new(else_branch),
        })
    }

    /// If the input is a group number or name followed by '}', consume it.
    fn try_consume_braced_reference(&mut self) -> Option<GroupRef> {
        let mut cursor = self.input.clone();
        let mut text = String::new();
        loop {
            match cursor.next() {
                Some('}') => break,
                Some(c) if c.is_ascii_alphanumeric() || c == '_' => text.push(c),
                _ => return None,
            }
        }
        let target = if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            GroupRef::Number(text.parse().unwrap_or(usize::MAX))
        } else if is_group_name(&text) {
            GroupRef::Name(text)
        } else {
            return None;
        };
        self.input = cursor;
        Some(target)
    }

    /// Parse a bracketed class after its '[', through its ']'.
    fn consume_bracket(&mut self) -> Result<ClassExpr, Error> {
        let position = self.position();
        self.consume('[');
        let negate = self.try_consume('^');
        if self.peek() == Some(']') {
            return error(position, "Empty character class");
        }

        let mut result = self.consume_class_items(position)?;
        loop {
            let op_position = self.position();
            let op = if self.try_consume_str("||") {
                "||"
            } else if self.try_consume_str("&&") {
                "&&"
            } else if self.try_consume_str("--") {
                "--"
            } else {
                break;
            };
            let lhs = match result {
                Some(lhs) => lhs,
                None => return error(op_position, format!("Missing operand before '{}'", op)),
            };
            let rhs = match self.consume_class_items(position)? {
                Some(rhs) => rhs,
                None => return error(op_position, format!("Missing operand after '{}'", op)),
            };
            result = Some(match op {
                "||" => ClassExpr::Union(vec![lhs, rhs]),
                "&&" => ClassExpr::Intersect(Box::new(lhs), Box::new(rhs)),
                _ => ClassExpr::Difference(Box::new(lhs), Box::new(rhs)),
            });
        }

        if !self.try_consume(']') {
            return error(position, "Unterminated character class");
        }
        let expr = result.unwrap_or(ClassExpr::Union(Vec::new()));
        Ok(if negate {
            ClassExpr::Negate(Box::new(expr))
        } else {
            expr
        })
    }

    /// Parse class items up to ']' or a set operator.
    /// \return their union, or None if there were none.
    fn consume_class_items(&mut self, position: usize) -> Result<Option<ClassExpr>, Error> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => return error(position, "Unterminated character class"),
                Some(']') => break,
                _ => {}
            }
            if self.lookahead_str("||") || self.lookahead_str("&&") || self.lookahead_str("--") {
                break;
            }

            let range_position = self.position();
            let first = self.consume_class_atom(position)?;

            // Check for a dash; we may have a range. A dash before ']' or
            // another dash is literal.
            let first = match first {
                ClassAtom::CodePoint(c1) if self.lookahead_str("-") => {
                    let mut cursor = self.input.clone();
                    cursor.next();
                    match cursor.next() {
                        None | Some(']') | Some('-') => ClassAtom::CodePoint(c1),
                        Some(_) => {
                            self.consume('-');
                            match self.consume_class_atom(position)? {
                                ClassAtom::CodePoint(c2) if c1 <= c2 => {
                                    items.push(ClassExpr::Range(c1, c2));
                                    continue;
                                }
                                _ => return error(range_position, "Invalid character range"),
                            }
                        }
                    }
                }
                atom => atom,
            };
            items.push(match first {
                ClassAtom::CodePoint(c) => ClassExpr::Char(c),
                ClassAtom::Expr(expr) => expr,
            });
        }
        Ok(match items.len() {
            0 => None,
            1 => items.pop(),
            _ => Some(ClassExpr::Union(items)),
        })
    }

    fn consume_class_atom(&mut self, position: usize) -> Result<ClassAtom, Error> {
        let escape_position = self.position();
        match self.peek() {
            None => error(position, "Unterminated character class"),
            Some('[') => Ok(ClassAtom::Expr(self.consume_bracket()?)),
            Some('\\') => {
                self.consume('\\');
                let ec = match self.peek() {
                    Some(ec) => ec,
                    None => return error(escape_position, "Incomplete escape"),
                };
                match ec {
                    'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                        self.consume(ec);
                        Ok(ClassAtom::Expr(class_escape(ec)))
                    }
                    'p' | 'P' => {
                        self.consume(ec);
                        Ok(ClassAtom::Expr(self.consume_property(escape_position, ec == 'P')?))
                    }
                    // Backspace, within a class.
                    'b' => {
                        self.consume('b');
                        Ok(ClassAtom::CodePoint('\x08'))
                    }
                    _ => Ok(ClassAtom::CodePoint(
                        self.consume_character_escape(escape_position)?,
                    )),
                }
            }
            Some(c) => Ok(ClassAtom::CodePoint(self.consume(c))),
        }
    }

    /// Parse a property after `\p` or `\P`: `{Name}`, `{Key=Value}`, `{^Name}`
    /// or a single letter.
    fn consume_property(&mut self, position: usize, negated: bool) -> Result<ClassExpr, Error> {
        let mut negated = negated;
        let text = if self.try_consume('{') {
            if self.try_consume('^') {
                negated = !negated;
            }
            let mut text = String::new();
            loop {
                match self.next() {
                    Some('}') => break,
                    Some(c) => text.push(c),
                    None => return error(position, "Unterminated Unicode property"),
                }
            }
            text
        } else {
            match self.next() {
                Some(c) if c.is_ascii_alphabetic() => c.to_string(),
                _ => return error(position, "Invalid Unicode property"),
            }
        };
        if text.trim().is_empty() {
            return error(position, "Empty Unicode property name");
        }
        let prop = match text.split_once('=') {
            Some((key, value)) => match Property::lookup(key, Some(value)) {
                Some(prop) => prop,
                None if !unicode::is_property_key(key) => {
                    return error(position, format!("Unknown property name '{}'", key));
                }
                None => return error(position, format!("Unknown property value '{}'", value)),
            },
            None => match Property::lookup(&text, None) {
                Some(prop) => prop,
                None => return error(position, format!("Unknown property name '{}'", text)),
            },
        };
        Ok(ClassExpr::Property { prop, negated })
    }

    fn try_consume_quantifier(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        if let Some(mut quant) = self.try_consume_quantifier_prefix()? {
            if self.try_consume('?') {
                quant.greediness = ir::Greediness::Lazy;
            } else if self.try_consume('+') {
                quant.greediness = ir::Greediness::Possessive;
            }
            Ok(Some(quant))
        } else {
            Ok(None)
        }
    }

    fn try_consume_quantifier_prefix(&mut self) -> Result<Option<ir::Quantifier>, Error> {
        let position = self.position();
        let (min, max) = match self.peek() {
            Some('+') => (1, usize::MAX),
            Some('*') => (0, usize::MAX),
            Some('?') => (0, 1),
            Some('{') => {
                self.consume('{');
                let min = self.try_consume_decimal_integer_literal();
                let quant = if self.try_consume(',') {
                    // Like {3,4}, {3,} or {,4}.
                    let max = self.try_consume_decimal_integer_literal();
                    if min.is_none() && max.is_none() {
                        return error(position, "Invalid quantifier");
                    }
                    (min.unwrap_or(0), max.unwrap_or(usize::MAX))
                } else {
                    // Like {3}.
                    match min {
                        Some(min) => (min, min),
                        None => return error(position, "Invalid quantifier"),
                    }
                };
                return match self.peek() {
                    Some('}') => {
                        self.consume('}');
                        Ok(Some(ir::Quantifier {
                            min: quant.0,
                            max: quant.1,
                            greediness: ir::Greediness::Greedy,
                        }))
                    }
                    None => error(position, "Unterminated quantifier"),
                    Some(_) => error(position, "Invalid quantifier"),
                };
            }
            _ => return Ok(None),
        };
        self.next();
        Ok(Some(ir::Quantifier {
            min,
            max,
            greediness: ir::Greediness::Greedy,
        }))
    }

    /// Parse a decimal integer.
    /// If the value would overflow, usize::MAX is returned.
    /// All decimal digits are consumed regardless.
    fn try_consume_decimal_integer_literal(&mut self) -> Option<usize> {
        let mut result: usize = 0;
        let mut char_count = 0;
        while let Some(c) = self.peek() {
            if let Some(digit) = char::to_digit(c, 10) {
                self.consume(c);
                char_count += 1;
                result = result.saturating_mul(10);
                result = result.saturating_add(digit as usize);
            } else {
                break;
            }
        }
        if char_count > 0 {
            Some(result)
        } else {
            None
        }
    }

    /// Parse exactly \p count hex digits.
    fn consume_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut result = 0;
        for _ in 0..count {
            let digit = self.peek()?.to_digit(16)?;
            self.next();
            result = result * 16 + digit;
        }
        Some(result)
    }

    /// Parse a character escape, after the backslash.
    fn consume_character_escape(&mut self, position: usize) -> Result<char, Error> {
        let u2c = |cp: u32| match char::from_u32(cp) {
            Some(c) => Ok(c),
            None => error(position, "Invalid code point in escape"),
        };
        let c = match self.next() {
            Some(c) => c,
            None => return error(position, "Incomplete escape"),
        };
        match c {
            'n' => u2c(0xA),
            'r' => u2c(0xD),
            't' => u2c(0x9),
            'f' => u2c(0xC),
            'v' => u2c(0xB),
            'a' => u2c(0x7),
            'e' => u2c(0x1B),
            '0' => u2c(0x0),
            'c' => match self.next() {
                // Control escape.
                Some(nc) if nc.is_ascii_alphabetic() => u2c((nc as u32) % 32),
                _ => error(position, "Invalid control escape"),
            },
            'x' => {
                if self.try_consume('{') {
                    let mut cp: u32 = 0;
                    let mut digits = 0;
                    loop {
                        match self.next() {
                            Some('}') if digits > 0 => break,
                            Some(h) if h.is_ascii_hexdigit() && digits < 6 => {
                                cp = cp * 16 + h.to_digit(16).unwrap_or(0);
                                digits += 1;
                            }
                            None => return error(position, "Unterminated hex escape"),
                            Some(_) => return error(position, "Invalid hex escape"),
                        }
                    }
                    u2c(cp)
                } else {
                    match self.consume_hex_digits(2) {
                        Some(cp) => u2c(cp),
                        None => error(position, "Invalid hex escape"),
                    }
                }
            }
            'u' => match self.consume_hex_digits(4) {
                Some(cp) => u2c(cp),
                None => error(position, "Invalid Unicode escape"),
            },
            c if !c.is_alphanumeric() => Ok(c),
            c => error(position, format!("Unknown escape '\\{}'", c)),
        }
    }

    /// Parse an escape outside a class, after the backslash.
    fn consume_atom_escape(&mut self, position: usize) -> Result<Atom, Error> {
        let c = match self.peek() {
            Some(c) => c,
            None => return error(position, "Incomplete escape"),
        };
        match c {
            'b' | 'B' => {
                self.consume(c);
                let invert = c == 'B';
                if !self.try_consume('{') {
                    let algorithm = if self.flags.simple_word_break {
                        WordBreakAlgorithm::Simple
                    } else {
                        WordBreakAlgorithm::Default
                    };
                    return Ok(Atom::Assertion(ir::Node::WordBoundary { algorithm, invert }));
                }
                let kind = self.next();
                if !self.try_consume('}') {
                    return error(position, "Unterminated anchor");
                }
                let node = match (kind, invert) {
                    (Some('A'), false) => ir::Node::Anchor(ir::AnchorType::StartOfText),
                    (Some('Z'), false) => ir::Node::Anchor(ir::AnchorType::EndOfText),
                    (Some('a'), false) => ir::Node::Anchor(ir::AnchorType::StartOfLine),
                    (Some('z'), false) => ir::Node::Anchor(ir::AnchorType::EndOfLine),
                    (Some('W'), invert) => ir::Node::WordBoundary {
                        algorithm: WordBreakAlgorithm::Default,
                        invert,
                    },
                    (Some('w'), invert) => ir::Node::WordBoundary {
                        algorithm: WordBreakAlgorithm::Simple,
                        invert,
                    },
                    _ => return error(position, "Invalid anchor"),
                };
                Ok(Atom::Assertion(node))
            }

            'd' | 'D' | 's' | 'S' | 'w' | 'W' => {
                self.consume(c);
                Ok(Atom::Quantifiable(ir::Node::Set(
                    class_escape(c).evaluate(self.flags.icase),
                )))
            }

            'p' | 'P' => {
                self.consume(c);
                let expr = self.consume_property(position, c == 'P')?;
                Ok(Atom::Quantifiable(ir::Node::Set(
                    expr.evaluate(self.flags.icase),
                )))
            }

            'K' => {
                self.consume('K');
                Ok(Atom::Assertion(ir::Node::ResetMatchStart))
            }

            'k' => {
                self.consume('k');
                Ok(Atom::TrailingContext)
            }

            'g' => {
                self.consume('g');
                let target = if self.try_consume('{') {
                    let mut text = String::new();
                    loop {
                        match self.next() {
                            Some('}') => break,
                            Some(c) => text.push(c),
                            None => return error(position, "Unterminated group reference"),
                        }
                    }
                    if text.is_empty() {
                        return error(position, "Empty group reference");
                    } else if text.chars().all(|c| c.is_ascii_digit()) {
                        GroupRef::Number(text.parse().unwrap_or(usize::MAX))
                    } else if is_group_name(&text) {
                        GroupRef::Name(text)
                    } else {
                        return error(position, format!("Invalid group reference '{}'", text));
                    }
                } else if let Some(n) = self.try_consume_decimal_integer_literal() {
                    GroupRef::Number(n)
                } else {
                    let mut name = String::new();
                    while let Some(c) = self.peek() {
                        if c.is_ascii_alphanumeric() || c == '_' {
                            name.push(self.consume(c));
                        } else {
                            break;
                        }
                    }
                    if !is_group_name(&name) {
                        return error(position, "Invalid group reference");
                    }
                    GroupRef::Name(name)
                };
                Ok(Atom::Quantifiable(self.make_backref(target, position)))
            }

            '1'..='9' => {
                // This is a backreference.
                let n = self.try_consume_decimal_integer_literal().unwrap_or(usize::MAX);
                Ok(Atom::Quantifiable(
                    self.make_backref(GroupRef::Number(n), position),
                ))
            }

            _ => {
                let c = self.consume_character_escape(position)?;
                Ok(Atom::Quantifiable(self.literal(c)))
            }
        }
    }

    /// Record a reference to resolve later, and return its placeholder node.
    fn make_backref(&mut self, target: GroupRef, position: usize) -> ir::Node {
        self.refs.push(PendingRef { target, position });
        ir::Node::BackRef {
            group: 0,
            icase: self.flags.icase,
        }
    }

    /// Resolve a reference against the complete group table.
    fn resolve(&self, pending: &PendingRef) -> Result<CaptureGroupID, Error> {
        match &pending.target {
            &GroupRef::Number(n) => {
                if n == 0 || n > self.group_names.len() {
                    error(
                        pending.position,
                        format!("Reference to nonexistent capture group {}", n),
                    )
                } else {
                    Ok((n - 1) as CaptureGroupID)
                }
            }
            GroupRef::Name(name) => {
                match self
                    .group_names
                    .iter()
                    .position(|n| n.as_deref() == Some(name.as_str()))
                {
                    Some(idx) => Ok(idx as CaptureGroupID),
                    None => error(
                        pending.position,
                        format!("Reference to nonexistent capture group '{}'", name),
                    ),
                }
            }
        }
    }

    fn finalize(&mut self, mut re: ir::Regex) -> Result<ir::Regex, Error> {
        debug_assert!(self.loop_count <= MAX_LOOPS);
        debug_assert!(re.group_names.len() <= MAX_CAPTURE_GROUPS);
        // Swap the table back so references can resolve against it.
        std::mem::swap(&mut self.group_names, &mut re.group_names);
        let mut resolved = Vec::with_capacity(self.refs.len());
        for pending in &self.refs {
            resolved.push(self.resolve(pending)?);
        }
        std::mem::swap(&mut self.group_names, &mut re.group_names);

        // References were recorded in source order, which is preorder.
        let mut resolved = resolved.into_iter();
        ir::walk_mut(false, &mut re.node, &mut |n: &mut ir::Node, _w: &mut ir::Walk| {
            match n {
                ir::Node::BackRef { group, .. }
                | ir::Node::Conditional {
                    test: ir::Condition::Capture(group),
                    ..
                } => {
                    if let Some(id) = resolved.next() {
                        *group = id;
                    }
                }
                _ => {}
            }
        });
        debug_assert!(resolved.next().is_none(), "Unresolved references remain");
        Ok(re)
    }
}

/// \return the class for an escape like \d or \W.
fn class_escape(c: char) -> ClassExpr {
    let kind = match c.to_ascii_lowercase() {
        'd' => CharacterClassType::Digits,
        's' => CharacterClassType::Spaces,
        _ => CharacterClassType::Words,
    };
    ClassExpr::Property {
        prop: charclasses::shorthand_property(kind),
        negated: c.is_ascii_uppercase(),
    }
}

/// Try parsing a given pattern.
/// Return the resulting IR regex, or an error.
pub fn try_parse(pattern: &str, flags: api::Flags) -> Result<ir::Regex, Error> {
    let mut p = Parser {
        input: Cursor::new(pattern),
        flags,
        anchored: false,
        loop_count: 0,
        group_names: Vec::new(),
        refs: Vec::new(),
        test_depth: 0,
    };
    p.try_parse().map_err(|mut err| {
        err.pattern = pattern.to_string();
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Node;

    fn parse(pattern: &str) -> ir::Regex {
        try_parse(pattern, api::Flags::default()).unwrap()
    }

    fn parse_err(pattern: &str) -> Error {
        try_parse(pattern, api::Flags::default()).unwrap_err()
    }

    fn lit(c: char) -> Node {
        Node::Set(CodePointSet::from_codepoint(c as u32))
    }

    #[test]
    fn precedence() {
        // '&' binds tighter than '|'.
        let re = parse("a&b|c");
        assert_eq!(
            re.node,
            Node::Alt(vec![Node::Intersect(vec![lit('a'), lit('b')]), lit('c')])
        );
        // '~' binds to the quantified term.
        let re = parse("~a*b");
        match re.node {
            Node::Cat(nodes) => {
                assert!(matches!(&nodes[0], Node::Complement(inner) if matches!(**inner, Node::Loop{..})));
                assert_eq!(nodes[1], lit('b'));
            }
            other => panic!("Unexpected node {:?}", other),
        }
    }

    #[test]
    fn groups_and_references() {
        let re = parse("(+a)({x}b)(c)\\g{x}\\1\\gx");
        assert_eq!(re.group_names, vec![None, Some("x".to_string())]);
        let mut refs = Vec::new();
        ir::walk(false, &re.node, &mut |n: &Node, _w: &mut ir::Walk| {
            if let &Node::BackRef { group, .. } = n {
                refs.push(group);
            }
        });
        assert_eq!(refs, vec![1, 0, 1]);
    }

    #[test]
    fn forward_named_reference() {
        let re = parse("\\g{late}({late}x)");
        match re.node {
            Node::Cat(nodes) => assert_eq!(
                nodes[0],
                Node::BackRef {
                    group: 0,
                    icase: false
                }
            ),
            other => panic!("Unexpected node {:?}", other),
        }
    }

    #[test]
    fn mode_switch_scope() {
        let re = parse("a(?i)b|c");
        match &re.node {
            Node::Alt(branches) => {
                assert_eq!(branches[1], lit('c'));
                match &branches[0] {
                    Node::Cat(nodes) => match &nodes[1] {
                        Node::ModeSwitch { flags, contents } => {
                            assert!(flags.icase);
                            assert!(matches!(&**contents, Node::Set(cps) if cps.contains('B' as u32)));
                        }
                        other => panic!("Unexpected node {:?}", other),
                    },
                    other => panic!("Unexpected node {:?}", other),
                }
            }
            other => panic!("Unexpected node {:?}", other),
        }
    }

    #[test]
    fn inline_anchored_flag() {
        assert!(parse("(?A)abc").flags.anchored);
        assert!(!parse("abc").flags.anchored);
    }

    #[test]
    fn free_spacing() {
        let flags = api::Flags::from("x");
        let re = try_parse("a b # comment\n c\\ ", flags).unwrap();
        assert_eq!(re.node, Node::Cat(vec![lit('a'), lit('b'), lit('c'), lit(' ')]));
        // Whitespace is significant inside classes.
        let re = try_parse("[ ]", flags).unwrap();
        assert_eq!(re.node, lit(' '));
    }

    #[test]
    fn error_positions() {
        let err = parse_err("ab(cd");
        assert_eq!(err.position, 2);
        assert_eq!(err.to_string(), "Error in /ab(cd/ at position 2: Unterminated group");
        assert_eq!(parse_err("a{3,2}").position, 1);
        assert_eq!(parse_err("*a").message, "Nothing to repeat");
        assert_eq!(parse_err("a|*").position, 2);
        assert_eq!(parse_err("^*").message, "Quantifier not allowed here");
        assert_eq!(parse_err("(+a)\\2").position, 4);
        assert_eq!(parse_err("[z-a]").message, "Invalid character range");
        assert_eq!(parse_err("[]").message, "Empty character class");
        assert_eq!(parse_err("~(+a)").position, 0);
        assert_eq!(parse_err("(?{1}a|b|c)").position, 0);
        assert_eq!(parse_err("\\p{Bogus}").message, "Unknown property name 'Bogus'");
        assert_eq!(parse_err("\\p{Script=Bogus}").message, "Unknown property value 'Bogus'");
        assert_eq!(parse_err("({a}x)({a}y)").message, "Duplicate group name 'a'");
        assert_eq!(parse_err("[a&&]").message, "Missing operand after '&&'");
        assert_eq!(parse_err("x\\q").position, 1);
    }

    #[test]
    fn stacked_quantifiers() {
        let re = parse("a{2}{3}");
        match re.node {
            Node::Loop { loopee, quant } => {
                assert_eq!((quant.min, quant.max), (3, 3));
                assert!(matches!(*loopee, Node::Loop { quant, .. } if quant.min == 2));
            }
            other => panic!("Unexpected node {:?}", other),
        }
        let re = parse("a*+");
        assert!(matches!(re.node, Node::Loop { quant, .. } if quant.greediness == ir::Greediness::Possessive));
        let re = parse("a{,3}?");
        assert!(matches!(re.node, Node::Loop { quant, .. } if quant.min == 0 && quant.max == 3 && quant.greediness == ir::Greediness::Lazy));
    }

    #[test]
    fn class_operators() {
        let re = parse("[\\p{Lu}&&\\p{sc=Latin}]");
        match re.node {
            Node::Set(cps) => {
                assert!(cps.contains('A' as u32));
                assert!(!cps.contains('a' as u32));
                assert!(!cps.contains('Σ' as u32));
            }
            other => panic!("Unexpected node {:?}", other),
        }
        let re = parse("[a-z--[aeiou]]");
        match re.node {
            Node::Set(cps) => {
                assert!(cps.contains('b' as u32));
                assert!(!cps.contains('e' as u32));
            }
            other => panic!("Unexpected node {:?}", other),
        }
        let re = parse("[-a-]");
        assert!(matches!(re.node, Node::Set(cps) if cps.contains('-' as u32) && cps.count_codepoints() == 2));
    }

    #[test]
    fn escapes() {
        assert_eq!(parse("\\x{1F600}").node, lit('😀'));
        assert_eq!(parse("\\x41").node, lit('A'));
        assert_eq!(parse("\\u00e9").node, lit('é'));
        assert_eq!(parse("\\cJ").node, lit('\n'));
        assert_eq!(parse("\\}").node, lit('}'));
        assert_eq!(parse("}").node, lit('}'));
        assert!(matches!(parse("\\b{A}").node, Node::Anchor(ir::AnchorType::StartOfText)));
        assert!(matches!(
            parse("\\B{w}").node,
            Node::WordBoundary {
                algorithm: WordBreakAlgorithm::Simple,
                invert: true
            }
        ));
    }

    #[test]
    fn conditionals() {
        let re = parse("(+a)?(?{1}b|c)");
        match re.node {
            Node::Cat(nodes) => assert!(matches!(
                &nodes[1],
                Node::Conditional {
                    test: ir::Condition::Capture(0),
                    ..
                }
            )),
            other => panic!("Unexpected node {:?}", other),
        }
        let re = parse("(?{\\d}1|x)");
        assert!(matches!(
            re.node,
            Node::Conditional {
                test: ir::Condition::Assertion(..),
                ..
            }
        ));
    }

    #[test]
    fn trailing_context() {
        let re = parse("a\\kbc|d");
        match re.node {
            Node::Alt(branches) => {
                assert_eq!(
                    branches[0],
                    Node::Cat(vec![
                        lit('a'),
                        Node::TrailingContext(Box::new(Node::Cat(vec![lit('b'), lit('c')])))
                    ])
                );
            }
            other => panic!("Unexpected node {:?}", other),
        }
    }

    #[test]
    fn positions_count_chars() {
        let mut pattern = "\u{00E9}".repeat(4000);
        pattern.push(')');
        assert_eq!(parse_err(&pattern).position, 4000);

        // Backtracking over a lookahead must not disturb the offset.
        let err = parse_err("[a-]b(?z)");
        assert_eq!(err.position, 5);
    }
}
