//! Support for quickly finding potential match locations.

use crate::bytesearch::BoyerMooreScanner;
use crate::folds;
use crate::insn::StartPredicate;
use crate::ir;
use crate::ir::Node;

/// Check if a node is anchored to the start of the text.
fn is_start_anchored(n: &Node) -> bool {
    match n {
        Node::Anchor(ir::AnchorType::StartOfText) => true,
        Node::Cat(nodes) => nodes.first().is_some_and(is_start_anchored),
        Node::CaptureGroup { contents, .. }
        | Node::NonCapturingGroup(contents)
        | Node::AtomicGroup(contents)
        | Node::ModeSwitch { contents, .. } => is_start_anchored(contents),
        _ => false,
    }
}

/// The "IR" for a start predicate.
#[derive(Debug, Clone)]
enum AbstractStartPredicate {
    /// No predicate.
    Arbitrary,

    /// Every match begins with these chars.
    /// If `complete` is set, the node matches exactly these chars, so a
    /// following node may extend the literal.
    Literal {
        chars: Vec<char>,
        icase: bool,
        complete: bool,
    },
}

impl AbstractStartPredicate {
    fn single(c: char, icase: bool) -> Self {
        Self::Literal {
            chars: vec![c],
            icase,
            complete: true,
        }
    }

    /// Mark that nothing may be appended to this predicate.
    fn incomplete(self) -> Self {
        match self {
            Self::Literal { chars, icase, .. } => Self::Literal {
                chars,
                icase,
                complete: false,
            },
            other => other,
        }
    }

    /// \return the disjunction of two predicates.
    /// That is, a predicate that matches x OR y.
    fn disjunction(x: Self, y: Self) -> Self {
        match (x, y) {
            (
                Self::Literal {
                    chars: c1,
                    icase: i1,
                    complete: k1,
                },
                Self::Literal {
                    chars: c2,
                    icase: i2,
                    complete: k2,
                },
            ) => {
                let icase = i1 || i2;
                let shared_len = c1
                    .iter()
                    .zip(c2.iter())
                    .take_while(|(&a, &b)| {
                        if icase {
                            folds::fold_equals(a, b)
                        } else {
                            a == b
                        }
                    })
                    .count();
                if shared_len == 0 {
                    return Self::Arbitrary;
                }
                let complete = k1 && k2 && c1.len() == shared_len && c2.len() == shared_len;
                Self::Literal {
                    chars: c1[..shared_len].to_vec(),
                    icase,
                    complete,
                }
            }
            _ => Self::Arbitrary,
        }
    }

    /// Resolve ourselves to a concrete start predicate.
    fn resolve_to_insn(self) -> StartPredicate {
        match self {
            Self::Literal { chars, icase, .. } if !chars.is_empty() => {
                let literal: String = chars.into_iter().collect();
                StartPredicate::Literal(BoyerMooreScanner::new(&literal, icase))
            }
            _ => StartPredicate::Arbitrary,
        }
    }
}

/// Compute any start-predicate for a node.
/// If this returns None, then the node is zero-width (e.g. an anchor) and
/// does not contribute to the predicate.
fn compute_start_predicate(n: &Node) -> Option<AbstractStartPredicate> {
    let arbitrary = Some(AbstractStartPredicate::Arbitrary);
    match n {
        Node::Empty
        | Node::Anchor(..)
        | Node::WordBoundary { .. }
        | Node::ResetMatchStart
        | Node::TrailingContext(..) => None,

        Node::Goal | Node::BackRef { .. } | Node::Complement(..) | Node::Conditional { .. } => {
            arbitrary
        }

        Node::Set(cps) => {
            if let Some(c) = cps.single_char() {
                Some(AbstractStartPredicate::single(c, false))
            } else if let Some(c) = folds::fold_class_char(cps) {
                Some(AbstractStartPredicate::single(c, true))
            } else {
                arbitrary
            }
        }

        // Cats extend the literal for as long as their children are complete.
        Node::Cat(nodes) => {
            let mut chars = Vec::new();
            let mut icase = false;
            for node in nodes {
                match compute_start_predicate(node) {
                    None => continue,
                    Some(AbstractStartPredicate::Arbitrary) => {
                        return Some(if chars.is_empty() {
                            AbstractStartPredicate::Arbitrary
                        } else {
                            AbstractStartPredicate::Literal {
                                chars,
                                icase,
                                complete: false,
                            }
                        });
                    }
                    Some(AbstractStartPredicate::Literal {
                        chars: more,
                        icase: more_icase,
                        complete,
                    }) => {
                        chars.extend(more);
                        icase |= more_icase;
                        if !complete {
                            return Some(AbstractStartPredicate::Literal {
                                chars,
                                icase,
                                complete: false,
                            });
                        }
                    }
                }
            }
            if chars.is_empty() {
                None
            } else {
                Some(AbstractStartPredicate::Literal {
                    chars,
                    icase,
                    complete: true,
                })
            }
        }

        Node::CaptureGroup { contents, .. }
        | Node::NonCapturingGroup(contents)
        | Node::AtomicGroup(contents)
        | Node::ModeSwitch { contents, .. } => compute_start_predicate(contents),

        // Every branch matches the same span, so the first branch's prefix
        // holds for the whole.
        Node::Intersect(nodes) => match nodes.first() {
            Some(first) => compute_start_predicate(first).map(AbstractStartPredicate::incomplete),
            None => arbitrary,
        },

        Node::Loop { loopee, quant } => {
            if quant.min > 0 {
                compute_start_predicate(loopee).map(AbstractStartPredicate::incomplete)
            } else {
                arbitrary
            }
        }

        // The disjunction of the predicates of all arms.
        Node::Alt(nodes) => {
            let mut result: Option<AbstractStartPredicate> = None;
            for node in nodes {
                // A zero-width branch may match anywhere.
                let pred = match compute_start_predicate(node) {
                    Some(pred) => pred,
                    None => return arbitrary,
                };
                result = Some(match result {
                    None => pred,
                    Some(prev) => AbstractStartPredicate::disjunction(prev, pred),
                });
            }
            result.or(arbitrary)
        }
    }
}

/// \return the start predicate for a Regex.
pub fn predicate_for_re(re: &ir::Regex) -> StartPredicate {
    if re.flags.anchored || is_start_anchored(&re.node) {
        return StartPredicate::StartAnchored;
    }
    compute_start_predicate(&re.node)
        .unwrap_or(AbstractStartPredicate::Arbitrary)
        .resolve_to_insn()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Flags;
    use crate::optimizer;
    use crate::parse;

    fn predicate(pattern: &str, flags: &str) -> StartPredicate {
        let mut re = parse::try_parse(pattern, Flags::from(flags)).expect("should parse");
        optimizer::simplify(&mut re);
        predicate_for_re(&re)
    }

    fn literal(pattern: &str, flags: &str) -> Option<(String, bool)> {
        match predicate(pattern, flags) {
            StartPredicate::Literal(scanner) => Some((scanner.literal(), scanner.icase())),
            _ => None,
        }
    }

    #[test]
    fn literal_prefixes() {
        assert_eq!(literal("example", ""), Some(("example".into(), false)));
        assert_eq!(literal("ab+c", ""), Some(("ab".into(), false)));
        assert_eq!(literal("\\b{W}(+foo)bar", ""), Some(("foobar".into(), false)));
        assert_eq!(literal("abc|abd", ""), Some(("ab".into(), false)));
        assert_eq!(literal("Hello", "i"), Some(("hello".into(), true)));
        assert_eq!(literal("x(?i)y", ""), Some(("xy".into(), true)));
    }

    #[test]
    fn no_literal() {
        assert_eq!(literal("a|b", ""), None);
        assert_eq!(literal("a?b", ""), None);
        assert_eq!(literal("[ab]c", ""), None);
        assert_eq!(literal("~abc", ""), None);
        assert_eq!(literal("|abc", ""), None);
    }

    #[test]
    fn anchored() {
        assert!(matches!(predicate("^abc", ""), StartPredicate::StartAnchored));
        assert!(matches!(predicate("\\b{A}abc", ""), StartPredicate::StartAnchored));
        assert!(matches!(predicate("abc", "A"), StartPredicate::StartAnchored));
        assert!(matches!(predicate("^abc", "m"), StartPredicate::Literal(..)));
    }
}
