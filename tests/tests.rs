// Work around dead code warnings: rust-lang issue #46379
pub mod common;

// Work around dead code warnings: rust-lang issue #46379
use common::*;

fn literal_search_tc(tc: TestConfig) {
    let re = tc.compile("example");
    let m = re.find("this is a simple example").unwrap();
    assert_eq!(m.range(), 17..24);
    tc.compile("example").test_fails("THIS IS A SIMPLE EXAMPLE");

    let m = tc
        .compilef("example", "i")
        .find("THIS IS A SIMPLE EXAMPLE")
        .unwrap();
    assert_eq!(m.range(), 17..24);
}

#[test]
fn literal_search() {
    test_with_configs(literal_search_tc)
}

fn nested_captures_tc(tc: TestConfig) {
    tc.compile(r"^(+a(+b(+c)))...")
        .match1f("abcdefhijklm")
        .test_eq("abcdef,abc,bc,c");
    assert_eq!(
        tc.compile(r"^(+a(+b(+c)))").match1_vec("abcdefhijklm"),
        vec![Some("abc"), Some("abc"), Some("bc"), Some("c")]
    );
}

#[test]
fn nested_captures() {
    test_with_configs(nested_captures_tc)
}

fn plain_parens_do_not_capture_tc(tc: TestConfig) {
    tc.compile("(a)(b)").match1f("ab").test_eq("ab");
    tc.compile("(?:a)(+b)").match1f("ab").test_eq("ab,b");
    assert_eq!(tc.compile("(a|b)+").regex().group_count(), 0);
}

#[test]
fn plain_parens_do_not_capture() {
    test_with_configs(plain_parens_do_not_capture_tc)
}

fn repeated_backref_tc(tc: TestConfig) {
    let re = tc.compile(r"\b{A}(+abc|def)=(+\1){2,3}\b{Z}");
    re.match1f("abc=abcabc").test_eq("abc=abcabc,abc,abc");
    re.test_fails("abc=defdef");
    re.match1f("def=defdefdef").test_eq("def=defdefdef,def,def");
    re.test_fails("def=def");
    re.test_fails("def=defdefdefdef");
}

#[test]
fn repeated_backref() {
    test_with_configs(repeated_backref_tc)
}

fn class_intersection_tc(tc: TestConfig) {
    let re = tc.compile(r"[\p{Lu}&&\p{sc=Latin}]");
    re.match1f("A").test_eq("A");
    re.test_fails("a");
    re.test_fails("\u{0391}");
    re.match1f("\u{0391}B").test_eq("B");

    tc.compile(r"[\w--\d]+").match1f("12ab34").test_eq("ab");
    tc.compile(r"[[a-c]||[x-z]]+").match1f("-cxb-").test_eq("cxb");
    tc.compile(r"[^a-y]").match1f("abcz").test_eq("z");
    tc.compile(r"[\p{Greek}&&\p{Ll}]+")
        .match1f("AB\u{0391}\u{03B1}\u{03B2}c")
        .test_eq("\u{03B1}\u{03B2}");
    tc.compile(r"[\P{L}]+").match1f("ab12!c").test_eq("12!");
}

#[test]
fn class_intersection() {
    test_with_configs(class_intersection_tc)
}

fn atomic_groups_tc(tc: TestConfig) {
    let re = tc.compile(r"(?>.*/)foo");
    re.match1f("/this/is/a/long/path/foo")
        .test_eq("/this/is/a/long/path/foo");
    re.test_fails("/this/is/a/long/path/foo/bar");

    tc.compile(r"(?>a+)a").test_fails("aaaa");
    tc.compile(r"(?>a+)b").match1f("aaab").test_eq("aaab");
    tc.compile(r"(?>x|xy)z").test_fails("xyz");
    tc.compile(r"(?>xy|x)z").match1f("xyz").test_eq("xyz");
    tc.compile(r"(?>(+a+))(+a*)").match1f("aaa").test_eq("aaa,aaa,");
}

#[test]
fn atomic_groups() {
    test_with_configs(atomic_groups_tc)
}

fn possessive_quantifiers_tc(tc: TestConfig) {
    tc.compile(r"a++a").test_fails("aaaa");
    tc.compile(r"a*+b").match1f("aaab").test_eq("aaab");
    tc.compile(r"a?+a").test_fails("a");
    tc.compile(r"a{1,3}+a").match1f("aaaa").test_eq("aaaa");
    tc.compile(r"a{1,3}+a").test_fails("aaa");
    tc.compile(r"(?:ab)++c").match1f("ababc").test_eq("ababc");
}

#[test]
fn possessive_quantifiers() {
    test_with_configs(possessive_quantifiers_tc)
}

#[test]
fn word_splitting() {
    use regalg::WordBreakAlgorithm::{Default, Simple};
    let text = "can't ju\u{FEFF}mp";
    assert_eq!(
        regalg::split_words(text, Default),
        vec!["can't", " ", "ju\u{FEFF}mp"]
    );
    assert_eq!(
        regalg::split_words(text, Simple),
        vec!["can", "'", "t", " ", "ju", "\u{FEFF}", "mp"]
    );
    assert_eq!(regalg::word_breaks("ab cd", Simple), vec![0, 2, 3, 5]);
}

fn word_boundaries_tc(tc: TestConfig) {
    tc.compile(r"\b{W}[\w']+\b{W}")
        .match_all("can't stop")
        .test_eq(vec!["can't", "stop"]);
    tc.compile(r"\b{W}\w+\b{W}")
        .match_all("can't stop")
        .test_eq(vec!["stop"]);
    tc.compile(r"\b{w}\w+\b{w}")
        .match_all("can't stop")
        .test_eq(vec!["can", "t", "stop"]);
    tc.compilef(r"\b\w+\b", "w")
        .match_all("can't stop")
        .test_eq(vec!["can", "t", "stop"]);
    tc.compile(r"(?w)\b\w+\b")
        .match_all("can't stop")
        .test_eq(vec!["can", "t", "stop"]);
    tc.compile(r"\B{w}.").match_all("ab  ").test_eq(vec!["b", " "]);
    tc.compile(r"x\b").test_fails("xy");
    tc.compile(r"x\B").match1f("xy").test_eq("x");
}

#[test]
fn word_boundaries() {
    test_with_configs(word_boundaries_tc)
}

#[test]
fn equivalences() {
    test_equivalent("a**", "a*");
    test_equivalent("(a|b)|(c|d)", "a|b|c|d");
    test_equivalent("~(~a)", "a");
    test_equivalent("(?:a{2}){3}", "a{6}");
    test_equivalent("a|", "a?");
    test_equivalent("|a", "a??");
    test_equivalent("abc|abd", "ab[cd]");
    test_equivalent("[ab]|[bc]", "[a-c]");
    test_equivalent("[a-z&&[^b-y]]", "[az]");
    test_equivalent("x|x", "x");
    test_not_equivalent("a|", "|a");
    test_not_equivalent("(+a)", "a");
    test_not_equivalent("a*", "a+");
}

#[test]
fn equality_respects_anchoring() {
    let a = regalg::Regex::with_flags("abc", "A").unwrap();
    let b = regalg::Regex::new("abc").unwrap();
    let c = regalg::Regex::new("(?A)abc").unwrap();
    assert_ne!(a, b);
    assert_eq!(a, c);
}

fn lazy_quantifiers_tc(tc: TestConfig) {
    tc.compile(r"a+?").match1f("aaa").test_eq("a");
    tc.compile(r"<.+?>").match_all("<a><b>").test_eq(vec!["<a>", "<b>"]);
    tc.compile(r"<.+>").match_all("<a><b>").test_eq(vec!["<a><b>"]);
    tc.compile(r"a{2,}?").match1f("aaaa").test_eq("aa");
    tc.compile(r"(+a*?)b").match1f("aab").test_eq("aab,aa");
    tc.compile(r"a??b").match1f("ab").test_eq("ab");
}

#[test]
fn lazy_quantifiers() {
    test_with_configs(lazy_quantifiers_tc)
}

fn counted_quantifiers_tc(tc: TestConfig) {
    tc.compile(r"a{3}").match_all("aaaaaaa").test_eq(vec!["aaa", "aaa"]);
    tc.compile(r"a{2,3}").match_all("aaaaaaa").test_eq(vec!["aaa", "aaa"]);
    tc.compile(r"a{,2}b").match1f("aaab").test_eq("aab");
    tc.compile(r"\d{2}{2}").match1f("1234").test_eq("1234");
    tc.compile(r"a{0}b").match1f("ab").test_eq("b");
    tc.compile(r"x}").match1f("x}").test_eq("x}");
}

#[test]
fn counted_quantifiers() {
    test_with_configs(counted_quantifiers_tc)
}

fn captures_keep_last_iteration_tc(tc: TestConfig) {
    tc.compile(r"(?:(+a)|(+b))+").match1f("ab").test_eq("ab,a,b");
    tc.compile(r"(+[a-z])+").match1f("xyz").test_eq("xyz,z");
    assert_eq!(
        tc.compile("aa(+b)?aa").match1_vec("aaaa"),
        vec![Some("aaaa"), None]
    );
}

#[test]
fn captures_keep_last_iteration() {
    test_with_configs(captures_keep_last_iteration_tc)
}

fn backreferences_tc(tc: TestConfig) {
    tc.compile(r"(+\w)\1").match_all("Frankly, Miss Piggy, I don't give a hoot!")
        .test_eq(vec!["ss", "gg", "oo"]);
    tc.compile(r"(+a)\g{1}").match1f("aa").test_eq("aa,a");
    tc.compile(r"({x}a|b)\g{x}").match1f("bb").test_eq("bb,b");
    tc.compile(r"({x}a|b)\gx").match1f("xaa").test_eq("aa,a");
    tc.compile(r"\g{y}({y}q)").match1f("q").test_eq("q,q");
    tc.compilef(r"(+abc)\1", "i")
        .match1f("abcABC")
        .test_eq("abcABC,abc");
    tc.compile(r"(+abc)\1").test_fails("abcABC");
    tc.compilef("(+\u{00B5})\\1", "i")
        .match1f("\u{00B5}\u{03BC}")
        .test_eq("\u{00B5}\u{03BC},\u{00B5}");
}

#[test]
fn backreferences() {
    test_with_configs(backreferences_tc)
}

fn backref_to_nonparticipating_group_tc(tc: TestConfig) {
    // A group which has not participated matches the empty string.
    assert_eq!(
        tc.compile(r"(+a)?b\1").match1_vec("b"),
        vec![Some("b"), None]
    );
    tc.compile(r"(?:(+x)|y)\1z").match1f("yz").test_eq("yz,");
}

#[test]
fn backref_to_nonparticipating_group() {
    test_with_configs(backref_to_nonparticipating_group_tc)
}

fn named_groups_tc(tc: TestConfig) {
    let re = tc.compile(r"({year}\d{4})-({month}\d{2})");
    re.match1_named_group("on 2020-10-05", "year").test_eq("2020");
    re.match1_named_group("on 2020-10-05", "month").test_eq("10");

    let text = "2021-03";
    let m = re.find(text).unwrap();
    let named: Vec<(&str, &str)> = m
        .named_groups()
        .map(|(name, r)| (name, &text[r.unwrap()]))
        .collect();
    assert_eq!(named, vec![("year", "2021"), ("month", "03")]);
    assert!(m.named_group("day").is_none());

    let compiled = tc.compile(r"(+a)({b}b)");
    let names: Vec<Option<&str>> = compiled.regex().group_names().collect();
    assert_eq!(names, vec![None, Some("b")]);
}

#[test]
fn named_groups() {
    test_with_configs(named_groups_tc)
}

fn conditionals_tc(tc: TestConfig) {
    let re = tc.compile(r"(+<)?\w+(?{1}>|)");
    re.match1f("<abc>").test_eq("<abc>,<");
    re.match1f("abc>").test_eq("abc,");
    re.match1f("<abc").test_eq("abc,");

    let re = tc.compile(r"({open}\()?x(?{open}\)|!)");
    re.match1f("(x)").test_eq("(x),(");
    re.match1f("x!").test_eq("x!,");

    let re = tc.compile(r"^(?{\d}\d+|[a-z]+)$");
    re.match1f("123").test_eq("123");
    re.match1f("abc").test_eq("abc");
    re.test_fails("1bc");
    re.test_fails("a23");
}

#[test]
fn conditionals() {
    test_with_configs(conditionals_tc)
}

fn conditionals_commit_tc(tc: TestConfig) {
    // The untaken branch is never attempted.
    tc.compile(r"^(?{(?:a)}ab|a)c$").test_fails("ac");
    tc.compile(r"^(?{(?:b)}ab|a)c$").match1f("ac").test_eq("ac");
    tc.compile(r"^(?{(?:a)}a|ab)c$").test_fails("abc");
}

#[test]
fn conditionals_commit() {
    test_with_configs(conditionals_commit_tc)
}

fn leading_context_tc(tc: TestConfig) {
    tc.compile(r"foo\Kbar").match1f("foobar").test_eq("bar");
    tc.compile(r"foo\Kbar").test_fails("foobaz");
    tc.compile(r"(+foo)\Kbar").match1f("xfoobar").test_eq("bar,foo");
    tc.compile(r"\d+\K%").match_all("10% 20%").test_eq(vec!["%", "%"]);
    // Backtracking past \K undoes it.
    tc.compile(r"(?:a\Kb|ac)").match1f("ac").test_eq("ac");
}

#[test]
fn leading_context() {
    test_with_configs(leading_context_tc)
}

fn trailing_context_tc(tc: TestConfig) {
    tc.compile(r"foo\kbar").match1f("foobar").test_eq("foo");
    tc.compile(r"foo\kbar").test_fails("foobaz");
    tc.compile(r"\w+\k\d").match1f("abc1").test_eq("abc");
    tc.compile(r"(+a)\k(+b)").match1f("ab").test_eq("a,a,b");
    tc.compile(r"x\k(?:y|z)").match_all("xyxzxw").test_eq(vec!["x", "x"]);
}

#[test]
fn trailing_context() {
    test_with_configs(trailing_context_tc)
}

fn intersection_tc(tc: TestConfig) {
    tc.compile(r"\w+&[a-c]+").match1f("abcd").test_eq("abc");
    tc.compile(r"\d{4}&19\d\d").match_all("1984 2001 1999").test_eq(vec!["1984", "1999"]);
    tc.compile(r"\b{W}(?:\w+&.*o.*)\b{W}")
        .match_all("cat dog cow pig")
        .test_eq(vec!["dog", "cow"]);
    tc.compile(r"a&b").test_fails("ab");
    tc.compile(r"(+\w)\w*&\w*(+\w)").match1f("xyz").test_eq("xyz,x,z");
}

#[test]
fn intersection() {
    test_with_configs(intersection_tc)
}

fn complement_tc(tc: TestConfig) {
    tc.compile(r"<~(.*>.*)>").match_all("<a><bc>").test_eq(vec!["<a>", "<bc>"]);
    tc.compile(r"\b{W}(?:\w{3}&~(cat))\b{W}")
        .match_all("cat dog cow")
        .test_eq(vec!["dog", "cow"]);
    tc.compile(r"/\*~(.*\*/.*)\*/")
        .match1f("x /* a */ y */")
        .test_eq("/* a */");
    // ~ binds to the following quantified term.
    tc.compile(r"^~a*$").match1f("b").test_eq("b");
    tc.compile(r"^~a*$").test_fails("aaa");
    tc.compile(r"^~(ab)c$").match1f("xc").test_eq("xc");
    tc.compile(r"^~(ab)c$").test_fails("abc");
}

#[test]
fn complement() {
    test_with_configs(complement_tc)
}

fn anchors_tc(tc: TestConfig) {
    tc.compile(r"^abc").match1f("abc").test_eq("abc");
    tc.compile(r"^def").test_fails("abc\ndef");
    tc.compilef(r"^def", "m").match1f("abc\ndef").test_eq("def");
    tc.compilef(r"^def", "m").match1f("abc\n\rdef").test_eq("def");
    tc.compile(r"\b{a}def").match1f("abc\ndef").test_eq("def");
    tc.compilef(r"\b{A}def", "m").test_fails("abc\ndef");
    tc.compilef(r"abc\b{Z}", "m").test_fails("abc\ndef");
    tc.compile(r"abc\b{z}").match1f("abc\ndef").test_eq("abc");

    tc.compile(r"(+a*)^(+a*)$").test_fails("aa\raaa");
    tc.compilef(r"(+a*)^(+a*)$", "m")
        .match1f("aa\raaa")
        .test_eq("aa,,aa");
    tc.compile(r"[ab]$").match1f("a\rb").test_eq("b");
    tc.compilef(r"[ab]$", "m").match1f("a\rb").test_eq("a");

    tc.compilef(r"^\d", "m")
        .match_all("aaa\n789\r\nccc\r\n345")
        .test_eq(vec!["7", "3"]);
    tc.compilef(r"\d$", "m")
        .match_all("aaa789\n789\r\nccc10\r\n345")
        .test_eq(vec!["9", "9", "0", "5"]);
    tc.compilef(r"^x", "m")
        .match_all("x\u{2028}x\u{85}x\u{0C}x")
        .test_eq(vec!["x", "x", "x", "x"]);
    // No line start between CR and LF.
    assert_eq!(
        tc.compilef(r"^", "m").match_all_from("a\r\nb", 0),
        vec![0..0, 3..3]
    );
    assert_eq!(
        tc.compilef(r"$", "m").match_all_from("a\r\nb", 0),
        vec![1..1, 4..4]
    );
}

#[test]
fn anchors() {
    test_with_configs(anchors_tc)
}

fn dotall_tc(tc: TestConfig) {
    for terminator in ["\n", "\r", "\u{2028}", "\u{2029}", "\u{85}", "\u{0B}"] {
        tc.compile(r".").test_fails(terminator);
        tc.compilef(r".", "s").match1f(terminator).test_eq(terminator);
    }
    tc.compile("abc.def").test_fails("abc\ndef");
    tc.compilef("abc.def", "s").match1f("abc\ndef").test_eq("abc\ndef");
    tc.compile("(?s)a.b").match1f("a\nb").test_eq("a\nb");
    tc.compile(".").match1f("\u{1F600}").test_eq("\u{1F600}");
}

#[test]
fn dotall() {
    test_with_configs(dotall_tc)
}

fn case_insensitive_tc(tc: TestConfig) {
    tc.compilef("abc", "i").match1f("xAbC").test_eq("AbC");
    tc.compilef("[a-c]+", "i").match1f("xAbC").test_eq("AbC");
    tc.compilef("\u{00B5}", "i").match1f("\u{03BC}").test_eq("\u{03BC}");
    tc.compilef("\u{03A3}", "i").match1f("\u{03C2}").test_eq("\u{03C2}");
    tc.compilef("k", "i").match1f("\u{212A}").test_eq("\u{212A}");
    tc.compile("(?i)abc").match1f("ABC").test_eq("ABC");
    tc.compile("(?i:a)b").match1f("Ab").test_eq("Ab");
    tc.compile("(?i:a)b").test_fails("AB");
    tc.compile("a(?i)b").match1f("aB").test_eq("aB");
    tc.compile("a(?i)b").test_fails("AB");
    tc.compile("(?i)a(?-i)b").test_fails("AB");
    tc.compile("(?i)a(?-i:b)").match1f("Ab").test_eq("Ab");
    // A switch inside a group reverts at the group's close.
    tc.compile("(?:(?i)a)b").test_fails("AB");
    tc.compile("(?:(?i)a)b").match1f("Ab").test_eq("Ab");
}

#[test]
fn case_insensitive() {
    test_with_configs(case_insensitive_tc)
}

fn free_spacing_tc(tc: TestConfig) {
    tc.compilef("a b # comment\n c", "x").match1f("abc").test_eq("abc");
    tc.compilef(r"a\ b", "x").match1f("a b").test_eq("a b");
    tc.compilef(r"a\#b", "x").match1f("a#b").test_eq("a#b");
    tc.compilef("[ ]+", "x").match1f("a  b").test_eq("  ");
    tc.compile("(?x) a b ").match1f("ab").test_eq("ab");
    tc.compile("a(?#comment)b").match1f("ab").test_eq("ab");
}

#[test]
fn free_spacing() {
    test_with_configs(free_spacing_tc)
}

fn escapes_tc(tc: TestConfig) {
    tc.compile(r"\x41\x{1F600}é")
        .match1f("A\u{1F600}\u{e9}")
        .test_eq("A\u{1F600}\u{e9}");
    tc.compile(r"\t\n\r\f\v\a\e\0")
        .match1f("\t\n\r\x0C\x0B\x07\x1B\0")
        .test_eq("\t\n\r\x0C\x0B\x07\x1B\0");
    tc.compile(r"\cJ").match1f("\n").test_eq("\n");
    tc.compile(r"\.\*\&\~").match1f("a.*&~").test_eq(".*&~");
    tc.compile(r"[\b]").match1f("\x08").test_eq("\x08");
    tc.compile(r"\d+").match1f("x\u{0663}\u{0664}").test_eq("\u{0663}\u{0664}");
    tc.compile(r"\s+").match1f("a\u{3000}\t b").test_eq("\u{3000}\t ");
    tc.compile(r"\W+").match1f("ab-+cd").test_eq("-+");
}

#[test]
fn escapes() {
    test_with_configs(escapes_tc)
}

fn zero_length_matches_tc(tc: TestConfig) {
    tc.compile(".*?").match_all("a").test_eq(vec!["", ""]);
    tc.compile(".*?").match_all("\u{0251}").test_eq(vec!["", ""]);
    tc.compile("a*").match_all("baaa").test_eq(vec!["", "aaa", ""]);
    tc.compile("(?:a*)*").match1f("aa").test_eq("aa");
    tc.compile("(?:a?b?)*c").match1f("abbac").test_eq("abbac");
}

#[test]
fn zero_length_matches() {
    test_with_configs(zero_length_matches_tc)
}

fn empty_iterations_tc(tc: TestConfig) {
    // An empty iteration past the minimum ends the loop and keeps its captures.
    tc.compile("b??|").match1f("b").test_eq("");
    tc.compile("(?:a*?)|").match1f("a").test_eq("");
    tc.compile("(?:b?)|").match1f("b").test_eq("b");
    tc.compile("|b").match1f("b").test_eq("");
    assert_eq!(tc.compile("(+)*x").match1_vec("x"), vec![Some("x"), Some("")]);
    assert_eq!(tc.compile("(+)*?x").match1_vec("x"), vec![Some("x"), None]);
    assert_eq!(tc.compile("(+a|)*b").match1_vec("aab"), vec![Some("aab"), Some("")]);
    tc.compile("(?:|a)*").match_all("aa").test_eq(vec!["", "", ""]);
    tc.compile("(?:\\b)*x").match_all("x xx").test_eq(vec!["x", "x", "x"]);
}

#[test]
fn empty_iterations() {
    test_with_configs(empty_iterations_tc)
}

#[test]
fn simplification_preserves_results() {
    let cases = [
        ("b??|", "b"),
        ("(?:a*?)|", "a"),
        ("(?:b?)|", "b"),
        ("(+)*x", "x"),
        ("(+)*?x", "x"),
        ("(+)+x", "x"),
        ("(?:|a)*", "aa"),
        ("(?:a|)*?b", "aab"),
        ("(+a|)*b", "aab"),
        ("(?:\\b){2,3}\\w", "ab cd"),
        ("(?:\\b)*\\w", "ab cd"),
        ("(?:^)+a", "aa"),
        ("[a-z]|x1|b", "bx1"),
        ("(?:a??)?b", "ab"),
    ];
    for (pattern, input) in cases {
        test_same_results(pattern, input);
    }
}

fn anchored_flag_tc(tc: TestConfig) {
    tc.compilef("abc", "A").test_fails("xabc");
    tc.compilef("abc", "A").match1f("abcx").test_eq("abc");
    tc.compile("(?A)b").test_fails("ab");
    assert_eq!(
        tc.compilef("a", "A").match_all_from("baab", 1),
        vec![1..2, 2..3]
    );
}

#[test]
fn anchored_flag() {
    test_with_configs(anchored_flag_tc)
}

fn alternation_order_tc(tc: TestConfig) {
    tc.compile("a|ab").match1f("ab").test_eq("a");
    tc.compile("ab|a").match1f("ab").test_eq("ab");
    tc.compile("(+a|ab)(+c|bcd)(+d*)")
        .match1f("abcd")
        .test_eq("abcd,a,bcd,");
}

#[test]
fn alternation_order() {
    test_with_configs(alternation_order_tc)
}

fn find_from_tc(tc: TestConfig) {
    let re = tc.compile(r"\b{W}y");
    assert!(re.match_all_from("xyxy", 1).is_empty());
    assert_eq!(tc.compile("y").match_all_from("xyxy", 2), vec![3..4]);
    // Positions past the end produce nothing.
    assert!(tc.compile("").match_all_from("ab", 3).is_empty());
    assert_eq!(tc.compile("").match_all_from("ab", 2), vec![2..2]);
}

#[test]
fn find_from() {
    test_with_configs(find_from_tc)
}

#[test]
fn find_at_and_usage_errors() {
    use regalg::{Regex, UsageError};
    let re = Regex::new("b").unwrap();
    assert_eq!(re.find_at("abab", 2).unwrap().unwrap().range(), 3..4);
    assert!(re.find_at("abab", 4).unwrap().is_none());
    assert_eq!(
        re.find_at("abab", 5).unwrap_err(),
        UsageError::StartOutOfRange { start: 5, len: 4 }
    );
    assert_eq!(
        re.find_at("\u{e9}b", 1).unwrap_err(),
        UsageError::NotCharBoundary { offset: 1 }
    );
}

#[test]
fn find_next() {
    use regalg::{Regex, UsageError};
    let re = Regex::new(r"\d+").unwrap();
    let text = "1 22 333";
    let m1 = re.find(text).unwrap();
    let m2 = re.find_next(text, &m1).unwrap().unwrap();
    let m3 = re.find_next(text, &m2).unwrap().unwrap();
    assert_eq!(m2.range(), 2..4);
    assert_eq!(m3.range(), 5..8);
    assert!(re.find_next(text, &m3).unwrap().is_none());

    // An empty match resumes one char later.
    let re = Regex::new("x*").unwrap();
    let text = "\u{e9}x";
    let m1 = re.find(text).unwrap();
    assert_eq!(m1.range(), 0..0);
    let m2 = re.find_next(text, &m1).unwrap().unwrap();
    assert_eq!(m2.range(), 2..3);
    let m3 = re.find_next(text, &m2).unwrap().unwrap();
    assert_eq!(m3.range(), 3..3);
    assert!(re.find_next(text, &m3).unwrap().is_none());

    let other = Regex::new("x*").unwrap();
    assert_eq!(
        other.find_next(text, &m1).unwrap_err(),
        UsageError::ForeignMatch
    );
}

#[test]
fn match_comparison() {
    use regalg::{Regex, UsageError};
    let re = Regex::new("(+a)|b").unwrap();
    let m1 = re.find("a").unwrap();
    let m2 = re.find("xa").unwrap();
    let m3 = re.find("a").unwrap();
    assert_eq!(m1.try_eq(&m3), Ok(true));
    assert_eq!(m1.try_eq(&m2), Ok(false));
    let other = Regex::new("(+a)|b").unwrap();
    assert_eq!(
        m1.try_eq(&other.find("a").unwrap()),
        Err(UsageError::ForeignMatch)
    );
}

#[test]
fn match_accessors() {
    let re = regalg::Regex::new(r"(+\d)(+x)?").unwrap();
    let text = "ab5c";
    let m = re.find(text).unwrap();
    assert_eq!((m.start(), m.end()), (2, 3));
    assert_eq!(m.group(0), Some(2..3));
    assert_eq!(m.group(1), Some(2..3));
    assert_eq!(m.group(2), None);
    assert_eq!(m.group(3), None);
    let groups: Vec<Option<regalg::Range>> = m.groups().collect();
    assert_eq!(groups, vec![Some(2..3), Some(2..3), None]);
}

#[test]
fn split() {
    let re = regalg::Regex::new(r"\s*,\s*").unwrap();
    assert_eq!(re.split("a , b,c"), vec!["a", "b", "c"]);
    assert_eq!(re.split("abc"), vec!["abc"]);
    assert_eq!(re.split(",a,"), vec!["", "a", ""]);
    let re = regalg::Regex::new(r"(+-)").unwrap();
    assert_eq!(re.split("a-b"), vec!["a", "b"]);
}

#[test]
fn regex_display_and_fromstr() {
    use std::str::FromStr;
    let re = regalg::Regex::from_str(r"a(+b)*").unwrap();
    assert_eq!(re.to_string(), r"a(+b)*");
    assert_eq!(re.as_str(), r"a(+b)*");
    assert_eq!(re.group_count(), 1);
    assert!(regalg::Regex::from_str("(").is_err());

    let flags = regalg::Flags::from("imsxAwq");
    assert_eq!(flags.to_string(), "imsxAw");
    assert!(!flags.no_opt);
}

#[test]
fn raw_and_simplified_agree() {
    let patterns = [
        "ab|ac|ad",
        "(?:a|b)*c",
        "~(a|b)x",
        "[a-c]|[b-d]|x",
        "(?:xy)+|xz",
        "a?|b",
    ];
    let inputs = ["abacad", "abbac", "cbxax", "dxq", "xyxyxz", "bab"];
    for pattern in patterns {
        let raw = {
            let mut flags = regalg::Flags::default();
            flags.no_opt = true;
            regalg::Regex::with_flags(pattern, flags).unwrap()
        };
        let opt = regalg::Regex::new(pattern).unwrap();
        assert_eq!(raw, opt);
        for input in inputs {
            let a: Vec<regalg::Range> = raw.find_iter(input).map(|m| m.range()).collect();
            let b: Vec<regalg::Range> = opt.find_iter(input).map(|m| m.range()).collect();
            assert_eq!(a, b, "/{}/ against {}", pattern, input);
        }
    }
}

#[test]
fn catastrophic_patterns_terminate() {
    // Possessive and atomic forms avoid exponential blowup.
    let re = regalg::Regex::new(r"^(?:a++)+b").unwrap();
    assert!(!re.is_match(&"a".repeat(64)));
    let re = regalg::Regex::new(r"^(?>(?:a|aa)+)b").unwrap();
    assert!(!re.is_match(&"a".repeat(64)));
}

#[test]
fn utf16_indexes() {
    let text = "a\u{1F600}b";
    assert_eq!(regalg::utf16_index(text, 5), 3);
    assert_eq!(regalg::byte_offset_for_utf16_index(text, 3), Some(5));
    assert_eq!(regalg::byte_offset_for_utf16_index(text, 2), None);
    assert_eq!(regalg::codepoint_index(text, 5), 2);
    assert_eq!(regalg::byte_offset_for_codepoint_index(text, 2), Some(5));
}
