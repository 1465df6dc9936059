/*!

# regalg - a backtracking regex engine with set algebra

This crate provides a regular expression engine with Unicode-aware classes, set operations on classes, and whole-pattern intersection and complement.

# Example: finding a match

```rust
use regalg::Regex;
let re = Regex::new(r"\d{4}").unwrap();
let m = re.find("on 2020-20-05").unwrap();
assert_eq!(m.range(), 3..7);
```

# Example: using capture groups

Plain parentheses only group. Capturing groups are written `(+...)`, and named groups are written `({name}...)`.
A capture group is a range of byte indexes into the original string.

```rust
use regalg::Regex;
let re = Regex::new(r"({year}\d{4})-(+\d\d)").unwrap();
let text = "Today is 2020-10-05";
let m = re.find(text).unwrap();
assert_eq!(&text[m.named_group("year").unwrap()], "2020");
assert_eq!(&text[m.group(2).unwrap()], "10");
```

# Example: set algebra

Classes support `||`, `&&` and `--`. Whole expressions support `&` (both sides match the same span) and `~` (any span the operand does not match).

```rust
use regalg::Regex;
let re = Regex::new(r"[\p{Lu}&&\p{sc=Latin}]").unwrap();
assert!(re.is_match("A"));
assert!(!re.is_match("\u{0391}"));

// Words of three letters other than "cat".
let re = Regex::new(r"\b{W}(\w{3}&~(cat))\b{W}").unwrap();
let text = "cat dog";
assert_eq!(&text[re.find(text).unwrap().range()], "dog");
```

# Example: equality

Two regexes are equal when they simplify to the same tree.

```rust
use regalg::Regex;
assert_eq!(Regex::new("a**").unwrap(), Regex::new("a*").unwrap());
assert_eq!(Regex::new("(a|b)|(c|d)").unwrap(), Regex::new("a|b|c|d").unwrap());
```

# Unicode remarks

Case-insensitive matching uses simple Unicode case folding.

```rust
use regalg::Regex;
let re = Regex::with_flags("\u{00B5}", "i").unwrap();
assert!(re.find("\u{03BC}").is_some());
```

Text is not normalized; normalize it before matching if needed.

# Architecture

A pattern is parsed into a syntax tree, rewritten to a canonical form by the simplifier, and emitted as bytecode.
The bytecode runs on a backtracking interpreter with an explicit stack. Patterns with a literal prefix are pre-filtered by a Boyer-Moore scan.
Backtracking makes some patterns take exponential time.

*/

#![warn(clippy::all)]
#![allow(clippy::upper_case_acronyms, clippy::match_like_matches_macro)]
// Clippy's manual_range_contains suggestion produces worse codegen.
#![allow(clippy::manual_range_contains)]

pub use crate::api::*;
pub use crate::indexing::{
    byte_offset_for_codepoint_index, byte_offset_for_utf16_index, codepoint_index, utf16_index,
};
pub use crate::wordbreak::WordBreakAlgorithm;

#[macro_use]
mod util;

mod api;
mod bytesearch;
mod charclasses;
mod classicalbacktrack;
mod codepointset;
mod emit;
mod exec;
mod folds;
mod indexing;
mod insn;
mod ir;
mod matchers;
mod optimizer;
mod parse;
mod scm;
mod startpredicate;
mod types;
mod unicode;
mod unicodetables;
mod wordbreak;

/// \return the byte offsets of every word boundary in \p text under
/// \p algorithm, in increasing order.
pub fn word_breaks(text: &str, algorithm: WordBreakAlgorithm) -> Vec<usize> {
    wordbreak::word_breaks::<matchers::IcuCharProperties>(text, algorithm)
}

/// Split \p text at its word boundaries under \p algorithm.
pub fn split_words(text: &str, algorithm: WordBreakAlgorithm) -> Vec<&str> {
    wordbreak::split_words::<matchers::IcuCharProperties>(text, algorithm)
}
