use crate::codepointset::CodePointSet;
use icu_casemap::{CaseMapper, ClosureSink};
use icu_properties::sets;

const CASE_MAPPER: CaseMapper = CaseMapper::new();

/// \return the simple case fold of \p c.
pub fn fold(c: char) -> char {
    CASE_MAPPER.simple_fold(c)
}

/// \return whether two chars are equal under simple case folding.
pub fn fold_equals(a: char, b: char) -> bool {
    a == b || fold(a) == fold(b)
}

/// Collects the single-character case partners of a char whose simple fold
/// matches. Full (multi-char) folds are ignored.
struct FoldPartners<'a> {
    folded: char,
    recv: &'a mut CodePointSet,
}

impl ClosureSink for FoldPartners<'_> {
    fn add_char(&mut self, c: char) {
        if fold(c) == self.folded {
            self.recv.add_one(c as u32);
        }
    }

    fn add_string(&mut self, _string: &str) {}
}

fn add_partners(c: char, recv: &mut CodePointSet) {
    let mut sink = FoldPartners {
        folded: fold(c),
        recv,
    };
    CASE_MAPPER.add_case_closure_to(c, &mut sink);
    sink.add_char(sink.folded);
}

/// Close \p input over simple case folding: every code point whose fold
/// equals the fold of a member is added.
pub fn fold_code_points(mut input: CodePointSet) -> CodePointSet {
    let mut added = CodePointSet::new();
    for range in sets::changes_when_casemapped().iter_ranges() {
        for cp in range {
            if !input.contains(cp) {
                continue;
            }
            if let Some(c) = char::from_u32(cp) {
                add_partners(c, &mut added);
            }
        }
    }
    input.add_set(added);
    input
}

/// If \p cps is exactly the case closure of a single char, return that
/// char's fold.
pub fn fold_class_char(cps: &CodePointSet) -> Option<char> {
    if cps.count_codepoints() > 4 {
        return None;
    }
    let c = char::from_u32(cps.intervals().first()?.first())?;
    let closed = fold_code_points(CodePointSet::from_codepoint(c as u32));
    if &closed == cps {
        Some(fold(c))
    } else {
        None
    }
}
