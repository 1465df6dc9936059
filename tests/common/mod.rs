#![allow(clippy::uninlined_format_args)]

use regalg::backends as rbe;

/// Assert that \p pattern is rejected with default flags.
#[track_caller]
pub fn test_parse_fails(pattern: &str) {
    if let Ok(re) = regalg::Regex::new(pattern) {
        panic!("/{}/ should not have parsed, got {:?}", pattern, re.ast().node);
    }
}

#[track_caller]
fn compile_default(pattern: &str) -> regalg::Regex {
    regalg::Regex::new(pattern).unwrap_or_else(|e| panic!("{}", e))
}

/// Assert that two patterns simplify to the same tree.
#[track_caller]
pub fn test_equivalent(lhs: &str, rhs: &str) {
    assert_eq!(compile_default(lhs), compile_default(rhs), "/{}/ vs /{}/", lhs, rhs);
}

/// Assert that two patterns simplify to different trees.
#[track_caller]
pub fn test_not_equivalent(lhs: &str, rhs: &str) {
    assert_ne!(compile_default(lhs), compile_default(rhs), "/{}/ vs /{}/", lhs, rhs);
}

/// The matched text followed by each capture, comma separated.
/// Non-participating groups contribute an empty field.
fn format_match(m: &regalg::Match, input: &str) -> String {
    m.groups()
        .map(|g| g.map_or("", |r| &input[r]))
        .collect::<Vec<_>>()
        .join(",")
}

pub trait StringTestHelpers {
    /// Fluent equality check against a str.
    fn test_eq(&self, s: &str);
}

impl StringTestHelpers for String {
    #[track_caller]
    fn test_eq(&self, rhs: &str) {
        assert_eq!(self.as_str(), rhs)
    }
}

pub trait VecTestHelpers {
    /// Fluent equality check against a list of strs.
    fn test_eq(&self, rhs: Vec<&str>);
}

impl VecTestHelpers for Vec<&str> {
    #[track_caller]
    fn test_eq(&self, rhs: Vec<&str>) {
        assert_eq!(*self, rhs)
    }
}

/// A regex compiled under some TestConfig.
#[derive(Debug, Clone)]
pub struct TestCompiledRegex {
    re: regalg::Regex,
}

impl TestCompiledRegex {
    pub fn regex(&self) -> &regalg::Regex {
        &self.re
    }

    /// Every match in \p input from byte \p start, via the backtracking
    /// executor directly.
    pub fn matches(&self, input: &str, start: usize) -> Vec<regalg::Match> {
        rbe::find::<rbe::BacktrackExecutor>(&self.re, input, start).collect()
    }

    pub fn find(&self, input: &str) -> Option<regalg::Match> {
        self.matches(input, 0).into_iter().next()
    }

    /// The first match, formatted as by format_match.
    #[track_caller]
    pub fn match1f(&self, input: &str) -> String {
        let m = self
            .find(input)
            .unwrap_or_else(|| panic!("/{}/ failed to match {:?}", self.re, input));
        format_match(&m, input)
    }

    /// The text of the named group in the first match.
    #[track_caller]
    pub fn match1_named_group(&self, input: &str, group: &str) -> String {
        let m = self
            .find(input)
            .unwrap_or_else(|| panic!("/{}/ failed to match {:?}", self.re, input));
        let r = m
            .named_group(group)
            .unwrap_or_else(|| panic!("no group named {} participated", group));
        input[r].to_string()
    }

    /// The first match and its groups, None for non-participating groups.
    #[track_caller]
    pub fn match1_vec<'b>(&self, input: &'b str) -> Vec<Option<&'b str>> {
        let m = self
            .find(input)
            .unwrap_or_else(|| panic!("/{}/ failed to match {:?}", self.re, input));
        m.groups().map(|g| g.map(|r| &input[r])).collect()
    }

    #[track_caller]
    pub fn test_fails(&self, input: &str) {
        if let Some(m) = self.find(input) {
            panic!("/{}/ should not match {:?}, matched {:?}", self.re, input, m.range());
        }
    }

    /// Ranges of every match from byte \p start.
    pub fn match_all_from(&self, input: &str, start: usize) -> Vec<regalg::Range> {
        self.matches(input, start).iter().map(|m| m.range()).collect()
    }

    /// Text of every match.
    pub fn match_all<'b>(&self, input: &'b str) -> Vec<&'b str> {
        self.matches(input, 0)
            .iter()
            .map(|m| &input[m.range()])
            .collect()
    }
}

/// How to compile patterns for a test run.
#[derive(Debug, Copy, Clone)]
pub struct TestConfig {
    // Run the simplified tree rather than the parsed one.
    optimize: bool,
}

impl TestConfig {
    #[track_caller]
    pub fn compile(&self, pattern: &str) -> TestCompiledRegex {
        self.compilef(pattern, "")
    }

    /// Compile \p pattern with the flag letters in \p flags_str.
    #[track_caller]
    pub fn compilef(&self, pattern: &str, flags_str: &str) -> TestCompiledRegex {
        let mut flags = regalg::Flags::from(flags_str);
        flags.no_opt = !self.optimize;
        match regalg::Regex::with_flags(pattern, flags) {
            Ok(re) => TestCompiledRegex { re },
            Err(err) => panic!("flags {:?}: {}", flags_str, err),
        }
    }
}

/// Run \p func against the parsed and then the simplified program.
pub fn test_with_configs<F>(func: F)
where
    F: Fn(TestConfig),
{
    func(TestConfig { optimize: false });
    func(TestConfig { optimize: true });
}

/// Check that the parsed and simplified programs find the same matches of
/// \p pattern in \p input, groups included.
#[track_caller]
pub fn test_same_results(pattern: &str, input: &str) {
    let run = |optimize: bool| -> Vec<Vec<Option<regalg::Range>>> {
        TestConfig { optimize }
            .compile(pattern)
            .matches(input, 0)
            .iter()
            .map(|m| m.groups().collect())
            .collect()
    };
    assert_eq!(run(false), run(true), "/{}/ on {:?}", pattern, input);
}
