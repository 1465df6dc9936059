use crate::codepointset::{CodePointSet, Interval};
use crate::folds;
use crate::types::CharacterClassType;
use crate::unicode::{Property, UnicodePropertyBinary};
use icu_properties::GeneralCategoryGroup;

/// Construct an interval from an inclusive range of char.
const fn r(first: char, last: char) -> Interval {
    Interval::new(first as u32, last as u32)
}

/// Construct an interval from a single char.
const fn r1(c: char) -> Interval {
    Interval::new(c as u32, c as u32)
}

/// LF, VT, FF, CR, NEL, LS and PS. Sorted.
pub const LINE_TERMINATORS: [Interval; 3] = [
    r('\u{000A}', '\u{000D}'),
    r1('\u{0085}'),
    r('\u{2028}', '\u{2029}'),
];

pub fn line_terminators() -> CodePointSet {
    CodePointSet::from_sorted_disjoint_intervals(LINE_TERMINATORS.to_vec())
}

/// The set matched by `.`.
pub fn dot_set(dot_all: bool) -> CodePointSet {
    if dot_all {
        CodePointSet::all()
    } else {
        line_terminators().inverted()
    }
}

/// The property a shorthand escape like \d stands for.
pub fn shorthand_property(kind: CharacterClassType) -> Property {
    match kind {
        CharacterClassType::Digits => Property::GeneralCategory(GeneralCategoryGroup::DecimalNumber),
        CharacterClassType::Spaces => Property::Binary(UnicodePropertyBinary::WhiteSpace),
        CharacterClassType::Words => Property::Binary(UnicodePropertyBinary::Word),
    }
}

/// A bracketed class before evaluation.
/// Set operators are left-associative; negation applies to a whole nested
/// class or to a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassExpr {
    Char(char),
    Range(char, char),
    Property { prop: Property, negated: bool },
    Union(Vec<ClassExpr>),
    Intersect(Box<ClassExpr>, Box<ClassExpr>),
    Difference(Box<ClassExpr>, Box<ClassExpr>),
    Negate(Box<ClassExpr>),
}

impl ClassExpr {
    /// Evaluate to a code point set. With \p icase, every leaf is closed over
    /// case folding before the Boolean operators apply, so results stay
    /// closed.
    pub fn evaluate(&self, icase: bool) -> CodePointSet {
        let close = |set: CodePointSet| {
            if icase {
                folds::fold_code_points(set)
            } else {
                set
            }
        };
        match self {
            ClassExpr::Char(c) => close(CodePointSet::from_codepoint(*c as u32)),
            ClassExpr::Range(a, b) => close(CodePointSet::from_ranges([*a as u32..=*b as u32])),
            ClassExpr::Property { prop, negated } => {
                let set = close(prop.codepoints());
                if *negated {
                    set.inverted()
                } else {
                    set
                }
            }
            ClassExpr::Union(items) => {
                let mut result = CodePointSet::new();
                for item in items {
                    result.add_set(item.evaluate(icase));
                }
                result
            }
            ClassExpr::Intersect(a, b) => a.evaluate(icase).intersection(&b.evaluate(icase)),
            ClassExpr::Difference(a, b) => a.evaluate(icase).difference(&b.evaluate(icase)),
            ClassExpr::Negate(inner) => inner.evaluate(icase).inverted(),
        }
    }

    /// Apply property containment: drop union members subsumed by a sibling,
    /// and shrink intersections and differences between related properties.
    pub fn simplify(self) -> ClassExpr {
        match self {
            ClassExpr::Union(items) => {
                let items: Vec<ClassExpr> = items.into_iter().map(ClassExpr::simplify).collect();
                let mut kept: Vec<ClassExpr> = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let subsumed = items.iter().enumerate().any(|(other_idx, other)| {
                        other_idx != idx
                            && subsumes(other, item)
                            && (!subsumes(item, other) || other_idx < idx)
                    });
                    if !subsumed {
                        kept.push(item.clone());
                    }
                }
                if kept.len() == 1 {
                    kept.pop().unwrap_or(ClassExpr::Union(Vec::new()))
                } else {
                    ClassExpr::Union(kept)
                }
            }
            ClassExpr::Intersect(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                if subsumes(&a, &b) {
                    b
                } else if subsumes(&b, &a) {
                    a
                } else {
                    ClassExpr::Intersect(Box::new(a), Box::new(b))
                }
            }
            ClassExpr::Difference(a, b) => {
                let (a, b) = (a.simplify(), b.simplify());
                if subsumes(&b, &a) {
                    ClassExpr::Union(Vec::new())
                } else {
                    ClassExpr::Difference(Box::new(a), Box::new(b))
                }
            }
            ClassExpr::Negate(inner) => match inner.simplify() {
                ClassExpr::Negate(x) => *x,
                ClassExpr::Property { prop, negated } => ClassExpr::Property {
                    prop,
                    negated: !negated,
                },
                other => ClassExpr::Negate(Box::new(other)),
            },
            leaf => leaf,
        }
    }
}

/// \return whether \p outer is known to contain every code point of \p inner.
fn subsumes(outer: &ClassExpr, inner: &ClassExpr) -> bool {
    match (outer, inner) {
        (
            ClassExpr::Property {
                prop: a,
                negated: false,
            },
            ClassExpr::Property {
                prop: b,
                negated: false,
            },
        ) => a.contains(b),
        (
            ClassExpr::Property {
                prop: a,
                negated: false,
            },
            ClassExpr::Char(c),
        ) => a.contains_codepoint(*c as u32),
        (ClassExpr::Range(lo, hi), ClassExpr::Char(c)) => lo <= c && c <= hi,
        (ClassExpr::Range(lo, hi), ClassExpr::Range(lo2, hi2)) => lo <= lo2 && hi2 <= hi,
        (a, b) => a == b,
    }
}
