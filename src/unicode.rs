//! Unicode character data: general categories, scripts, blocks and binary
//! properties, plus the predicates used by class construction and matching.

use crate::codepointset::{CodePoint, CodePointSet, Interval, CODE_POINT_MAX};
use crate::unicodetables::BLOCKS;
use icu_properties::script::script_with_extensions;
use icu_properties::sets::{self, CodePointSetDataBorrowed};
use icu_properties::{maps, GeneralCategory, GeneralCategoryGroup, Script, WordBreak};

/// Normalize a property or value name for loose matching.
/// Case, whitespace, '_' and '-' are not significant.
pub(crate) fn loose_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodePropertyBinary {
    Alphabetic,
    CaseIgnorable,
    Cased,
    ChangesWhenCasefolded,
    ChangesWhenCasemapped,
    ChangesWhenLowercased,
    ChangesWhenTitlecased,
    ChangesWhenUppercased,
    DefaultIgnorableCodePoint,
    GraphemeBase,
    GraphemeExtend,
    IDContinue,
    IDStart,
    Math,
    XIDContinue,
    XIDStart,
    ASCIIHexDigit,
    BidiControl,
    Dash,
    Deprecated,
    Diacritic,
    Extender,
    HexDigit,
    Ideographic,
    JoinControl,
    Lowercase,
    NoncharacterCodePoint,
    PatternSyntax,
    PatternWhiteSpace,
    QuotationMark,
    Radical,
    RegionalIndicator,
    SentenceTerminal,
    SoftDotted,
    TerminalPunctuation,
    UnifiedIdeograph,
    Uppercase,
    VariationSelector,
    WhiteSpace,
    Emoji,
    EmojiPresentation,
    ExtendedPictographic,
    BidiMirrored,
    Ascii,
    Any,
    Assigned,
    Word,
    Graph,
}

impl UnicodePropertyBinary {
    /// Look up a binary property by name, matching loosely.
    fn from_loose(key: &str) -> Option<Self> {
        use UnicodePropertyBinary::*;
        let prop = match key {
            "alpha" | "alphabetic" => Alphabetic,
            "ci" | "caseignorable" => CaseIgnorable,
            "cased" => Cased,
            "cwcf" | "changeswhencasefolded" => ChangesWhenCasefolded,
            "cwcm" | "changeswhencasemapped" => ChangesWhenCasemapped,
            "cwl" | "changeswhenlowercased" => ChangesWhenLowercased,
            "cwt" | "changeswhentitlecased" => ChangesWhenTitlecased,
            "cwu" | "changeswhenuppercased" => ChangesWhenUppercased,
            "di" | "defaultignorablecodepoint" => DefaultIgnorableCodePoint,
            "grbase" | "graphemebase" => GraphemeBase,
            "grext" | "graphemeextend" => GraphemeExtend,
            "idc" | "idcontinue" => IDContinue,
            "ids" | "idstart" => IDStart,
            "math" => Math,
            "xidc" | "xidcontinue" => XIDContinue,
            "xids" | "xidstart" => XIDStart,
            "ahex" | "asciihexdigit" => ASCIIHexDigit,
            "bidic" | "bidicontrol" => BidiControl,
            "dash" => Dash,
            "dep" | "deprecated" => Deprecated,
            "dia" | "diacritic" => Diacritic,
            "ext" | "extender" => Extender,
            "hex" | "hexdigit" => HexDigit,
            "ideo" | "ideographic" => Ideographic,
            "joinc" | "joincontrol" => JoinControl,
            "lower" | "lowercase" => Lowercase,
            "nchar" | "noncharactercodepoint" => NoncharacterCodePoint,
            "patsyn" | "patternsyntax" => PatternSyntax,
            "patws" | "patternwhitespace" => PatternWhiteSpace,
            "qmark" | "quotationmark" => QuotationMark,
            "radical" => Radical,
            "ri" | "regionalindicator" => RegionalIndicator,
            "sterm" | "sentenceterminal" => SentenceTerminal,
            "sd" | "softdotted" => SoftDotted,
            "term" | "terminalpunctuation" => TerminalPunctuation,
            "uideo" | "unifiedideograph" => UnifiedIdeograph,
            "upper" | "uppercase" => Uppercase,
            "vs" | "variationselector" => VariationSelector,
            "space" | "wspace" | "whitespace" => WhiteSpace,
            "emoji" => Emoji,
            "epres" | "emojipresentation" => EmojiPresentation,
            "extpict" | "extendedpictographic" => ExtendedPictographic,
            "bidim" | "bidimirrored" => BidiMirrored,
            "ascii" => Ascii,
            "any" => Any,
            "assigned" => Assigned,
            "word" => Word,
            "graph" => Graph,
            _ => return None,
        };
        Some(prop)
    }

    /// The backing ICU set, for properties that have one.
    fn icu_set(self) -> Option<CodePointSetDataBorrowed<'static>> {
        use UnicodePropertyBinary::*;
        let set = match self {
            Alphabetic => sets::alphabetic(),
            CaseIgnorable => sets::case_ignorable(),
            Cased => sets::cased(),
            ChangesWhenCasefolded => sets::changes_when_casefolded(),
            ChangesWhenCasemapped => sets::changes_when_casemapped(),
            ChangesWhenLowercased => sets::changes_when_lowercased(),
            ChangesWhenTitlecased => sets::changes_when_titlecased(),
            ChangesWhenUppercased => sets::changes_when_uppercased(),
            DefaultIgnorableCodePoint => sets::default_ignorable_code_point(),
            GraphemeBase => sets::grapheme_base(),
            GraphemeExtend => sets::grapheme_extend(),
            IDContinue => sets::id_continue(),
            IDStart => sets::id_start(),
            Math => sets::math(),
            XIDContinue => sets::xid_continue(),
            XIDStart => sets::xid_start(),
            ASCIIHexDigit => sets::ascii_hex_digit(),
            BidiControl => sets::bidi_control(),
            Dash => sets::dash(),
            Deprecated => sets::deprecated(),
            Diacritic => sets::diacritic(),
            Extender => sets::extender(),
            HexDigit => sets::hex_digit(),
            Ideographic => sets::ideographic(),
            JoinControl => sets::join_control(),
            Lowercase => sets::lowercase(),
            NoncharacterCodePoint => sets::noncharacter_code_point(),
            PatternSyntax => sets::pattern_syntax(),
            PatternWhiteSpace => sets::pattern_white_space(),
            QuotationMark => sets::quotation_mark(),
            Radical => sets::radical(),
            RegionalIndicator => sets::regional_indicator(),
            SentenceTerminal => sets::sentence_terminal(),
            SoftDotted => sets::soft_dotted(),
            TerminalPunctuation => sets::terminal_punctuation(),
            UnifiedIdeograph => sets::unified_ideograph(),
            Uppercase => sets::uppercase(),
            VariationSelector => sets::variation_selector(),
            WhiteSpace => sets::white_space(),
            Emoji => sets::emoji(),
            EmojiPresentation => sets::emoji_presentation(),
            ExtendedPictographic => sets::extended_pictographic(),
            BidiMirrored => sets::bidi_mirrored(),
            Ascii | Any | Assigned | Word | Graph => return None,
        };
        Some(set)
    }

    fn contains(self, cp: CodePoint) -> bool {
        use UnicodePropertyBinary::*;
        match self {
            Ascii => cp <= 0x7F,
            Any => cp <= CODE_POINT_MAX,
            Assigned => category(cp) != GeneralCategory::Unassigned,
            Word => is_word_character(cp),
            Graph => is_graph_character(cp),
            _ => self.icu_set().map_or(false, |set| set.contains32(cp)),
        }
    }

    fn codepoints(self) -> CodePointSet {
        use UnicodePropertyBinary::*;
        match self {
            Ascii => CodePointSet::from_ranges([0..=0x7F]),
            Any => CodePointSet::all(),
            Assigned => gc_set(GeneralCategoryGroup::Unassigned).inverted(),
            Word => word_character_set(),
            Graph => gc_set(
                GeneralCategoryGroup::Control
                    .union(GeneralCategoryGroup::Surrogate)
                    .union(GeneralCategoryGroup::Unassigned),
            )
            .union(&icu_set_codepoints(sets::white_space()))
            .inverted(),
            _ => self
                .icu_set()
                .map(icu_set_codepoints)
                .unwrap_or_default(),
        }
    }
}

fn icu_set_codepoints(set: CodePointSetDataBorrowed<'static>) -> CodePointSet {
    CodePointSet::from_ranges(set.iter_ranges())
}

fn gc_set(group: GeneralCategoryGroup) -> CodePointSet {
    CodePointSet::from_ranges(maps::general_category().iter_ranges_for_group(group))
}

/// The categories whose members are word characters on their own.
const WORD_CATEGORIES: GeneralCategoryGroup = GeneralCategoryGroup::Mark
    .union(GeneralCategoryGroup::DecimalNumber)
    .union(GeneralCategoryGroup::ConnectorPunctuation);

fn word_character_set() -> CodePointSet {
    let mut result = gc_set(WORD_CATEGORIES);
    result.add_set(icu_set_codepoints(sets::alphabetic()));
    result.add_set(icu_set_codepoints(sets::join_control()));
    result
}

/// A named Unicode property, as written in `\p{...}`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Property {
    Binary(UnicodePropertyBinary),
    GeneralCategory(GeneralCategoryGroup),
    Script(Script),
    ScriptExtensions(Script),
    Block(Interval),
}

/// \return whether \p name is a key accepted in `\p{Key=Value}`.
pub fn is_property_key(name: &str) -> bool {
    matches!(
        loose_key(name).as_str(),
        "gc" | "generalcategory" | "sc" | "script" | "scx" | "scriptextensions" | "blk" | "block"
    )
}

impl Property {
    /// Resolve a property from its name and optional value.
    /// `\p{L}` passes ("L", None); `\p{Script=Greek}` passes ("Script", Some("Greek")).
    pub fn lookup(name: &str, value: Option<&str>) -> Option<Property> {
        let key = loose_key(name);
        if let Some(value) = value {
            return match key.as_str() {
                "gc" | "generalcategory" => GeneralCategoryGroup::name_to_enum_mapper()
                    .get_loose(value)
                    .map(Property::GeneralCategory),
                "sc" | "script" => Script::name_to_enum_mapper()
                    .get_loose(value)
                    .map(Property::Script),
                "scx" | "scriptextensions" => Script::name_to_enum_mapper()
                    .get_loose(value)
                    .map(Property::ScriptExtensions),
                "blk" | "block" => find_block(value).map(Property::Block),
                _ => None,
            };
        }
        if let Some(binary) = UnicodePropertyBinary::from_loose(&key) {
            return Some(Property::Binary(binary));
        }
        if let Some(gc) = GeneralCategoryGroup::name_to_enum_mapper().get_loose(name) {
            return Some(Property::GeneralCategory(gc));
        }
        if let Some(sc) = Script::name_to_enum_mapper().get_loose(name) {
            return Some(Property::Script(sc));
        }
        key.strip_prefix("in")
            .and_then(find_block_by_key)
            .map(Property::Block)
    }

    /// \return whether \p cp has this property.
    pub fn contains_codepoint(&self, cp: CodePoint) -> bool {
        match *self {
            Property::Binary(b) => b.contains(cp),
            Property::GeneralCategory(group) => group.contains(category(cp)),
            Property::Script(sc) => script_of(cp) == sc,
            Property::ScriptExtensions(sc) => is_in_extended_script(cp, sc),
            Property::Block(iv) => iv.contains(cp),
        }
    }

    /// \return every code point with this property.
    pub fn codepoints(&self) -> CodePointSet {
        match *self {
            Property::Binary(b) => b.codepoints(),
            Property::GeneralCategory(group) => gc_set(group),
            Property::Script(sc) => {
                CodePointSet::from_ranges(maps::script().iter_ranges_for_value(sc))
            }
            Property::ScriptExtensions(sc) => CodePointSet::from_ranges(
                script_with_extensions().get_script_extensions_ranges(sc),
            ),
            Property::Block(iv) => CodePointSet::from_sorted_disjoint_intervals(vec![iv]),
        }
    }

    /// \return whether every code point with property \p other also has this
    /// property. This only consults known subset relations, so a false result
    /// does not prove the sets differ.
    pub fn contains(&self, other: &Property) -> bool {
        use UnicodePropertyBinary::*;
        if self == other {
            return true;
        }
        let letters_or_nl = GeneralCategoryGroup::Letter.union(GeneralCategoryGroup::LetterNumber);
        let graph_categories = GeneralCategoryGroup::Letter
            .union(GeneralCategoryGroup::Mark)
            .union(GeneralCategoryGroup::Number)
            .union(GeneralCategoryGroup::Punctuation)
            .union(GeneralCategoryGroup::Symbol)
            .union(GeneralCategoryGroup::Format)
            .union(GeneralCategoryGroup::PrivateUse);
        let covers = |outer: GeneralCategoryGroup, inner: GeneralCategoryGroup| {
            outer.intersection(inner) == inner
        };
        match (*self, *other) {
            (Property::Binary(Any), _) => true,
            (Property::Binary(Graph), Property::Binary(Word | Alphabetic | Uppercase | Lowercase)) => {
                true
            }
            (Property::Binary(Word), Property::Binary(Alphabetic | Uppercase | Lowercase)) => true,
            (Property::Binary(Alphabetic), Property::Binary(Uppercase | Lowercase)) => true,
            (Property::Binary(Alphabetic), Property::GeneralCategory(g)) => covers(letters_or_nl, g),
            (Property::Binary(Word), Property::GeneralCategory(g)) => {
                covers(letters_or_nl.union(WORD_CATEGORIES), g)
            }
            (Property::Binary(Graph), Property::GeneralCategory(g)) => covers(graph_categories, g),
            (Property::Binary(Assigned), Property::GeneralCategory(g)) => {
                covers(GeneralCategoryGroup::Unassigned.complement(), g)
            }
            (Property::GeneralCategory(a), Property::GeneralCategory(b)) => covers(a, b),
            (Property::GeneralCategory(g), Property::Binary(NoncharacterCodePoint)) => {
                covers(g, GeneralCategoryGroup::Unassigned)
            }
            (Property::ScriptExtensions(a), Property::Script(b)) => a == b,
            (Property::Block(a), Property::Block(b)) => a.contains_interval(b),
            (Property::Binary(Ascii), Property::Block(b)) => Interval::new(0, 0x7F).contains_interval(b),
            _ => false,
        }
    }
}

/// \return the general category of \p cp.
pub fn category(cp: CodePoint) -> GeneralCategory {
    maps::general_category().get32(cp)
}

/// \return the primary script of \p cp.
pub fn script_of(cp: CodePoint) -> Script {
    maps::script().get32(cp)
}

/// \return whether \p cp is used with \p sc, consulting Script_Extensions.
/// Code points without extension data fall back to their primary script.
pub fn is_in_extended_script(cp: CodePoint, sc: Script) -> bool {
    script_with_extensions().has_script(cp, sc)
}

/// Find a block by name, matching loosely.
pub fn find_block(name: &str) -> Option<Interval> {
    find_block_by_key(&loose_key(name))
}

fn find_block_by_key(key: &str) -> Option<Interval> {
    BLOCKS
        .iter()
        .find(|(name, _)| loose_key(name) == key)
        .map(|&(_, iv)| iv)
}

/// Line terminators: LF, VT, FF, CR, NEL, LS and PS.
pub fn is_newline(cp: CodePoint) -> bool {
    matches!(cp, 0x0A..=0x0D | 0x85 | 0x2028 | 0x2029)
}

pub fn is_whitespace(cp: CodePoint) -> bool {
    sets::white_space().contains32(cp)
}

/// Word characters are Alphabetic, marks, decimal digits, connector
/// punctuation and Join_Control.
pub fn is_word_character(cp: CodePoint) -> bool {
    sets::alphabetic().contains32(cp)
        || WORD_CATEGORIES.contains(category(cp))
        || sets::join_control().contains32(cp)
}

/// Graphic characters exclude whitespace, controls, surrogates and
/// unassigned code points.
pub fn is_graph_character(cp: CodePoint) -> bool {
    let excluded = GeneralCategoryGroup::Control
        .union(GeneralCategoryGroup::Surrogate)
        .union(GeneralCategoryGroup::Unassigned);
    !is_whitespace(cp) && !excluded.contains(category(cp))
}

/// The UAX #29 Word_Break classes the segmentation rules distinguish.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WordBreakClass {
    Other,
    CR,
    LF,
    Newline,
    Extend,
    ZWJ,
    RegionalIndicator,
    Format,
    Katakana,
    HebrewLetter,
    ALetter,
    SingleQuote,
    DoubleQuote,
    MidNumLet,
    MidLetter,
    MidNum,
    Numeric,
    ExtendNumLet,
    WSegSpace,
}

/// \return the Word_Break class of \p cp.
pub fn word_break_class(cp: CodePoint) -> WordBreakClass {
    let wb = maps::word_break().get32(cp);
    match wb {
        WordBreak::CR => WordBreakClass::CR,
        WordBreak::LF => WordBreakClass::LF,
        WordBreak::Newline => WordBreakClass::Newline,
        WordBreak::Extend => WordBreakClass::Extend,
        WordBreak::ZWJ => WordBreakClass::ZWJ,
        WordBreak::RegionalIndicator => WordBreakClass::RegionalIndicator,
        WordBreak::Format => WordBreakClass::Format,
        WordBreak::Katakana => WordBreakClass::Katakana,
        WordBreak::HebrewLetter => WordBreakClass::HebrewLetter,
        WordBreak::ALetter => WordBreakClass::ALetter,
        WordBreak::SingleQuote => WordBreakClass::SingleQuote,
        WordBreak::DoubleQuote => WordBreakClass::DoubleQuote,
        WordBreak::MidNumLet => WordBreakClass::MidNumLet,
        WordBreak::MidLetter => WordBreakClass::MidLetter,
        WordBreak::MidNum => WordBreakClass::MidNum,
        WordBreak::Numeric => WordBreakClass::Numeric,
        WordBreak::ExtendNumLet => WordBreakClass::ExtendNumLet,
        WordBreak::WSegSpace => WordBreakClass::WSegSpace,
        _ => WordBreakClass::Other,
    }
}
