//! Regex syntax trees.

use crate::api;
use crate::codepointset::CodePointSet;
use crate::types::{CaptureGroupID, CaptureGroupName};
use crate::wordbreak::WordBreakAlgorithm;
use core::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AnchorType {
    StartOfText, // \b{A}, or ^ without m
    EndOfText,   // \b{Z}, or $ without m
    StartOfLine, // \b{a}, or ^ with m
    EndOfLine,   // \b{z}, or $ with m
}

/// How a loop prefers to iterate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Greediness {
    Greedy,
    Lazy,
    /// Never gives back iterations once taken.
    Possessive,
}

/// Bounds and greediness of a loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Quantifier {
    pub min: usize,

    /// Inclusive; usize::MAX means unbounded.
    pub max: usize,

    pub greediness: Greediness,
}

impl Quantifier {
    pub fn is_unbounded(&self) -> bool {
        self.max == usize::MAX
    }

    /// The quantifier `*`.
    pub fn star() -> Quantifier {
        Quantifier {
            min: 0,
            max: usize::MAX,
            greediness: Greediness::Greedy,
        }
    }
}

/// What a conditional group tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Whether the capture group has participated.
    Capture(CaptureGroupID),

    /// Whether the contents match at the current position, as a lookahead.
    Assertion(Box<Node>),
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Matches the empty string.
    Empty,

    /// Successful end of the program.
    Goal,

    /// Match one code point from a set.
    /// Case-insensitive sets are already closed under case folding.
    Set(CodePointSet),

    /// Each node in sequence.
    Cat(Vec<Node>),

    /// Match an alternation like a|b|c. Earlier branches are preferred.
    Alt(Vec<Node>),

    /// Every branch must match the same span.
    Intersect(Vec<Node>),

    /// Match any span that the contents do not match exactly.
    Complement(Box<Node>),

    /// A quantified node like /.*/ or /x{3,5}?/.
    Loop { loopee: Box<Node>, quant: Quantifier },

    /// A capturing group, optionally named.
    CaptureGroup {
        contents: Box<Node>,
        group: CaptureGroupID,
        name: Option<CaptureGroupName>,
    },

    /// A group which only affects precedence.
    NonCapturingGroup(Box<Node>),

    /// A group which commits to its first match.
    AtomicGroup(Box<Node>),

    /// A backreference to a capture group.
    BackRef { group: CaptureGroupID, icase: bool },

    /// Select one of two branches according to a test made once.
    Conditional {
        test: Condition,
        then_branch: Box<Node>,
        else_branch: Box<Node>,
    },

    /// ^, $ or one of the \b{...} text anchors.
    Anchor(AnchorType),

    /// Word boundary (\b or \B).
    WordBoundary {
        algorithm: WordBreakAlgorithm,
        invert: bool,
    },

    /// \K: the overall match starts here.
    ResetMatchStart,

    /// \k: the contents must follow, but are not part of the match.
    TrailingContext(Box<Node>),

    /// An inline mode switch. The flags have already been applied to the
    /// contents while parsing, so this only records where they changed.
    ModeSwitch {
        flags: api::Flags,
        contents: Box<Node>,
    },
}

pub type NodeList = Vec<Node>;

impl Node {
    /// A node which can never match.
    pub fn make_always_fails() -> Node {
        Node::Set(CodePointSet::new())
    }

    /// Helper to return a node matching any string, `[\s\S]*`.
    pub fn make_universal_star() -> Node {
        Node::Loop {
            loopee: Box::new(Node::Set(CodePointSet::all())),
            quant: Quantifier::star(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    pub fn is_cat(&self) -> bool {
        matches!(self, Node::Cat(..))
    }

    /// \return true if this node can never match, as with the empty set /[]/.
    /// This is not the same as matching only the empty string.
    pub fn match_always_fails(&self) -> bool {
        match self {
            Node::Set(cps) => cps.is_empty(),
            _ => false,
        }
    }

    /// \return whether this node always matches, and only ever matches, the
    /// empty string.
    pub fn matches_only_empty(&self) -> bool {
        match self {
            Node::Empty => true,
            Node::Cat(nodes) | Node::Alt(nodes) => nodes.iter().all(Node::matches_only_empty),
            Node::NonCapturingGroup(contents)
            | Node::AtomicGroup(contents)
            | Node::ModeSwitch { contents, .. }
            | Node::CaptureGroup { contents, .. } => contents.matches_only_empty(),
            Node::Loop { loopee, .. } => loopee.matches_only_empty(),
            _ => false,
        }
    }

    /// \return whether every match of this node is empty. Unlike
    /// matches_only_empty(), the node may fail, as an anchor does.
    pub fn is_zero_width(&self) -> bool {
        match self {
            Node::Empty
            | Node::Anchor(..)
            | Node::WordBoundary { .. }
            | Node::TrailingContext(..) => true,
            Node::Cat(nodes) | Node::Alt(nodes) => nodes.iter().all(Node::is_zero_width),
            Node::NonCapturingGroup(contents)
            | Node::AtomicGroup(contents)
            | Node::ModeSwitch { contents, .. }
            | Node::CaptureGroup { contents, .. } => contents.is_zero_width(),
            Node::Loop { loopee, .. } => loopee.is_zero_width(),
            _ => false,
        }
    }

    /// \return whether this is `[\s\S]*` or a variant with a different
    /// greediness.
    pub fn is_universal_star(&self) -> bool {
        match self {
            Node::Loop { loopee, quant } => {
                quant.min == 0
                    && quant.is_unbounded()
                    && matches!(loopee.as_ref(), Node::Set(cps) if cps.contains_all_codepoints())
            }
            _ => false,
        }
    }

    /// \return whether this node or any descendant is a capture group.
    pub fn contains_captures(&self) -> bool {
        let mut result = false;
        walk(false, self, &mut |n: &Node, w: &mut Walk| {
            if matches!(n, Node::CaptureGroup { .. }) {
                result = true;
            }
            w.skip_children = result;
        });
        result
    }

    /// \return the half-open range of capture group IDs that this node
    /// encloses. Groups are numbered by their opening paren, so the enclosed
    /// groups are always contiguous.
    pub fn enclosed_groups(&self) -> core::ops::Range<CaptureGroupID> {
        let mut lo = CaptureGroupID::MAX;
        let mut hi = 0;
        walk(false, self, &mut |n: &Node, _w: &mut Walk| {
            if let &Node::CaptureGroup { group, .. } = n {
                lo = lo.min(group);
                hi = hi.max(group + 1);
            }
        });
        if lo >= hi {
            0..0
        } else {
            lo..hi
        }
    }

    /// Unwrap a chain of non-capturing groups and mode switches.
    pub fn strip_transparent_groups(&self) -> &Node {
        match self {
            Node::NonCapturingGroup(contents) | Node::ModeSwitch { contents, .. } => {
                contents.strip_transparent_groups()
            }
            _ => self,
        }
    }
}

/// Walk state shared with the visitor.
#[derive(Debug, Clone, Default)]
pub struct Walk {
    // Set by a preorder visitor to avoid descending into this node.
    pub skip_children: bool,

    // Nesting depth of the visited node.
    pub depth: usize,
}

impl Node {
    /// Call \p f on each direct child, in matching order. A conditional's
    /// assertion comes before its branches.
    pub fn for_each_child<'a, F: FnMut(&'a Node)>(&'a self, mut f: F) {
        match self {
            Node::Empty
            | Node::Goal
            | Node::Set(..)
            | Node::BackRef { .. }
            | Node::Anchor(..)
            | Node::WordBoundary { .. }
            | Node::ResetMatchStart => {}
            Node::Cat(nodes) | Node::Alt(nodes) | Node::Intersect(nodes) => nodes.iter().for_each(f),
            Node::Loop { loopee: contents, .. }
            | Node::Complement(contents)
            | Node::NonCapturingGroup(contents)
            | Node::AtomicGroup(contents)
            | Node::TrailingContext(contents)
            | Node::CaptureGroup { contents, .. }
            | Node::ModeSwitch { contents, .. } => f(contents),
            Node::Conditional {
                test,
                then_branch,
                else_branch,
            } => {
                if let Condition::Assertion(assertion) = test {
                    f(assertion);
                }
                f(then_branch);
                f(else_branch);
            }
        }
    }

    /// Mutable form of for_each_child.
    pub fn for_each_child_mut<F: FnMut(&mut Node)>(&mut self, mut f: F) {
        match self {
            Node::Empty
            | Node::Goal
            | Node::Set(..)
            | Node::BackRef { .. }
            | Node::Anchor(..)
            | Node::WordBoundary { .. }
            | Node::ResetMatchStart => {}
            Node::Cat(nodes) | Node::Alt(nodes) | Node::Intersect(nodes) => {
                nodes.iter_mut().for_each(f)
            }
            Node::Loop { loopee: contents, .. }
            | Node::Complement(contents)
            | Node::NonCapturingGroup(contents)
            | Node::AtomicGroup(contents)
            | Node::TrailingContext(contents)
            | Node::CaptureGroup { contents, .. }
            | Node::ModeSwitch { contents, .. } => f(contents),
            Node::Conditional {
                test,
                then_branch,
                else_branch,
            } => {
                if let Condition::Assertion(assertion) = test {
                    f(assertion);
                }
                f(then_branch);
                f(else_branch);
            }
        }
    }
}

fn walk_from<F>(postorder: bool, n: &Node, func: &mut F, walk: &mut Walk)
where
    F: FnMut(&Node, &mut Walk),
{
    walk.skip_children = false;
    if !postorder {
        func(n, walk);
    }
    if !walk.skip_children {
        walk.depth += 1;
        n.for_each_child(|child| walk_from(postorder, child, &mut *func, &mut *walk));
        walk.depth -= 1;
    }
    if postorder {
        func(n, walk);
    }
}

fn walk_mut_from<F>(postorder: bool, n: &mut Node, func: &mut F, walk: &mut Walk)
where
    F: FnMut(&mut Node, &mut Walk),
{
    walk.skip_children = false;
    if !postorder {
        func(n, walk);
    }
    if !walk.skip_children {
        walk.depth += 1;
        n.for_each_child_mut(|child| walk_mut_from(postorder, child, &mut *func, &mut *walk));
        walk.depth -= 1;
    }
    if postorder {
        func(n, walk);
    }
}

/// Visit \p n and all of its descendants, children first if \p postorder.
pub fn walk<F>(postorder: bool, n: &Node, func: &mut F)
where
    F: FnMut(&Node, &mut Walk),
{
    walk_from(postorder, n, func, &mut Walk::default())
}

/// Like walk, but the visitor may rewrite nodes. A preorder visitor sees
/// its own rewrite's children, or none if it sets `skip_children`.
pub fn walk_mut<F>(postorder: bool, n: &mut Node, func: &mut F)
where
    F: FnMut(&mut Node, &mut Walk),
{
    walk_mut_from(postorder, n, func, &mut Walk::default())
}

/// A regex in IR form.
#[derive(Debug, Clone)]
pub struct Regex {
    pub node: Node,
    pub flags: api::Flags,

    /// The capture group table, indexed by CaptureGroupID.
    pub group_names: Vec<Option<CaptureGroupName>>,
}

impl Regex {
    pub fn group_count(&self) -> usize {
        self.group_names.len()
    }
}

fn display_node(node: &Node, depth: usize, f: &mut fmt::Formatter) -> fmt::Result {
    for _ in 0..depth {
        write!(f, "..")?;
    }
    match node {
        Node::Empty => writeln!(f, "Empty"),
        Node::Goal => writeln!(f, "Goal"),
        Node::Set(cps) => writeln!(f, "Set {}", cps),
        Node::Cat(..) => writeln!(f, "Cat"),
        Node::Alt(..) => writeln!(f, "Alt"),
        Node::Intersect(..) => writeln!(f, "Intersect"),
        Node::Complement(..) => writeln!(f, "Complement"),
        Node::Loop { quant, .. } => {
            let max = if quant.is_unbounded() {
                "inf".to_string()
            } else {
                quant.max.to_string()
            };
            writeln!(f, "Loop {{{},{}}} {:?}", quant.min, max, quant.greediness)
        }
        Node::CaptureGroup { group, name, .. } => match name {
            Some(name) => writeln!(f, "CaptureGroup {} {:?}", group, name),
            None => writeln!(f, "CaptureGroup {}", group),
        },
        Node::NonCapturingGroup(..) => writeln!(f, "NonCapturingGroup"),
        Node::AtomicGroup(..) => writeln!(f, "AtomicGroup"),
        &Node::BackRef { group, icase } => {
            writeln!(f, "BackRef {}{}", group, if icase { " icase" } else { "" })
        }
        Node::Conditional { test, .. } => match test {
            Condition::Capture(group) => writeln!(f, "Conditional on group {}", group),
            Condition::Assertion(..) => writeln!(f, "Conditional on assertion"),
        },
        Node::Anchor(anchor_type) => writeln!(f, "Anchor {:?}", anchor_type),
        &Node::WordBoundary { algorithm, invert } => {
            let kind = if invert { "\\B" } else { "\\b" };
            writeln!(f, "WordBoundary {} {:?}", kind, algorithm)
        }
        Node::ResetMatchStart => writeln!(f, "ResetMatchStart"),
        Node::TrailingContext(..) => writeln!(f, "TrailingContext"),
        Node::ModeSwitch { flags, .. } => writeln!(f, "ModeSwitch ({})", flags),
    }
}

/// Print a node and its children, one per line, indented by depth.
pub struct DisplayNode<'a>(pub &'a Node);

impl fmt::Display for DisplayNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut result = Ok(());
        walk(false, self.0, &mut |node: &Node, walk: &mut Walk| {
            if result.is_ok() {
                result = display_node(node, walk.depth, f)
            }
        });
        result
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        DisplayNode(&self.node).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(c: char) -> Node {
        Node::Set(CodePointSet::from_codepoint(c as u32))
    }

    fn group(id: CaptureGroupID, contents: Node) -> Node {
        Node::CaptureGroup {
            contents: Box::new(contents),
            group: id,
            name: None,
        }
    }

    #[test]
    fn capture_queries() {
        let n = Node::Cat(vec![
            lit('a'),
            group(1, Node::Alt(vec![group(2, lit('b')), lit('c')])),
        ]);
        assert!(n.contains_captures());
        assert_eq!(n.enclosed_groups(), 1..3);
        assert!(!lit('a').contains_captures());
        assert_eq!(lit('a').enclosed_groups(), 0..0);
    }

    #[test]
    fn emptiness() {
        assert!(Node::Cat(vec![Node::Empty, group(0, Node::Empty)]).matches_only_empty());
        assert!(!Node::Anchor(AnchorType::StartOfText).matches_only_empty());
        assert!(Node::make_universal_star().is_universal_star());
        assert!(Node::make_always_fails().match_always_fails());
    }

    #[test]
    fn display_indents_children() {
        let n = Node::Cat(vec![lit('a'), Node::AtomicGroup(Box::new(lit('b')))]);
        let text = DisplayNode(&n).to_string();
        assert_eq!(text, "Cat\n..Set [a]\n..AtomicGroup\n....Set [b]\n");
    }
}
