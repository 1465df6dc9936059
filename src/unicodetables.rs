//! Unicode block ranges, sorted by first code point.

use crate::codepointset::Interval;

/// (name, range) pairs for the blocks recognized by `\p{Block=...}` and `\p{In...}`.
pub(crate) const BLOCKS: &[(&str, Interval)] = &[
    ("Basic Latin", Interval::new(0x0000, 0x007F)),
    ("Latin-1 Supplement", Interval::new(0x0080, 0x00FF)),
    ("Latin Extended-A", Interval::new(0x0100, 0x017F)),
    ("Latin Extended-B", Interval::new(0x0180, 0x024F)),
    ("IPA Extensions", Interval::new(0x0250, 0x02AF)),
    ("Spacing Modifier Letters", Interval::new(0x02B0, 0x02FF)),
    ("Combining Diacritical Marks", Interval::new(0x0300, 0x036F)),
    ("Greek and Coptic", Interval::new(0x0370, 0x03FF)),
    ("Cyrillic", Interval::new(0x0400, 0x04FF)),
    ("Cyrillic Supplement", Interval::new(0x0500, 0x052F)),
    ("Armenian", Interval::new(0x0530, 0x058F)),
    ("Hebrew", Interval::new(0x0590, 0x05FF)),
    ("Arabic", Interval::new(0x0600, 0x06FF)),
    ("Syriac", Interval::new(0x0700, 0x074F)),
    ("Arabic Supplement", Interval::new(0x0750, 0x077F)),
    ("Thaana", Interval::new(0x0780, 0x07BF)),
    ("NKo", Interval::new(0x07C0, 0x07FF)),
    ("Samaritan", Interval::new(0x0800, 0x083F)),
    ("Mandaic", Interval::new(0x0840, 0x085F)),
    ("Devanagari", Interval::new(0x0900, 0x097F)),
    ("Bengali", Interval::new(0x0980, 0x09FF)),
    ("Gurmukhi", Interval::new(0x0A00, 0x0A7F)),
    ("Gujarati", Interval::new(0x0A80, 0x0AFF)),
    ("Oriya", Interval::new(0x0B00, 0x0B7F)),
    ("Tamil", Interval::new(0x0B80, 0x0BFF)),
    ("Telugu", Interval::new(0x0C00, 0x0C7F)),
    ("Kannada", Interval::new(0x0C80, 0x0CFF)),
    ("Malayalam", Interval::new(0x0D00, 0x0D7F)),
    ("Sinhala", Interval::new(0x0D80, 0x0DFF)),
    ("Thai", Interval::new(0x0E00, 0x0E7F)),
    ("Lao", Interval::new(0x0E80, 0x0EFF)),
    ("Tibetan", Interval::new(0x0F00, 0x0FFF)),
    ("Myanmar", Interval::new(0x1000, 0x109F)),
    ("Georgian", Interval::new(0x10A0, 0x10FF)),
    ("Hangul Jamo", Interval::new(0x1100, 0x11FF)),
    ("Ethiopic", Interval::new(0x1200, 0x137F)),
    ("Cherokee", Interval::new(0x13A0, 0x13FF)),
    ("Unified Canadian Aboriginal Syllabics", Interval::new(0x1400, 0x167F)),
    ("Ogham", Interval::new(0x1680, 0x169F)),
    ("Runic", Interval::new(0x16A0, 0x16FF)),
    ("Khmer", Interval::new(0x1780, 0x17FF)),
    ("Mongolian", Interval::new(0x1800, 0x18AF)),
    ("Latin Extended Additional", Interval::new(0x1E00, 0x1EFF)),
    ("Greek Extended", Interval::new(0x1F00, 0x1FFF)),
    ("General Punctuation", Interval::new(0x2000, 0x206F)),
    ("Superscripts and Subscripts", Interval::new(0x2070, 0x209F)),
    ("Currency Symbols", Interval::new(0x20A0, 0x20CF)),
    ("Combining Diacritical Marks for Symbols", Interval::new(0x20D0, 0x20FF)),
    ("Letterlike Symbols", Interval::new(0x2100, 0x214F)),
    ("Number Forms", Interval::new(0x2150, 0x218F)),
    ("Arrows", Interval::new(0x2190, 0x21FF)),
    ("Mathematical Operators", Interval::new(0x2200, 0x22FF)),
    ("Miscellaneous Technical", Interval::new(0x2300, 0x23FF)),
    ("Control Pictures", Interval::new(0x2400, 0x243F)),
    ("Optical Character Recognition", Interval::new(0x2440, 0x245F)),
    ("Enclosed Alphanumerics", Interval::new(0x2460, 0x24FF)),
    ("Box Drawing", Interval::new(0x2500, 0x257F)),
    ("Block Elements", Interval::new(0x2580, 0x259F)),
    ("Geometric Shapes", Interval::new(0x25A0, 0x25FF)),
    ("Miscellaneous Symbols", Interval::new(0x2600, 0x26FF)),
    ("Dingbats", Interval::new(0x2700, 0x27BF)),
    ("Braille Patterns", Interval::new(0x2800, 0x28FF)),
    ("CJK Radicals Supplement", Interval::new(0x2E80, 0x2EFF)),
    ("Kangxi Radicals", Interval::new(0x2F00, 0x2FDF)),
    ("CJK Symbols and Punctuation", Interval::new(0x3000, 0x303F)),
    ("Hiragana", Interval::new(0x3040, 0x309F)),
    ("Katakana", Interval::new(0x30A0, 0x30FF)),
    ("Bopomofo", Interval::new(0x3100, 0x312F)),
    ("Hangul Compatibility Jamo", Interval::new(0x3130, 0x318F)),
    ("CJK Unified Ideographs Extension A", Interval::new(0x3400, 0x4DBF)),
    ("Yijing Hexagram Symbols", Interval::new(0x4DC0, 0x4DFF)),
    ("CJK Unified Ideographs", Interval::new(0x4E00, 0x9FFF)),
    ("Yi Syllables", Interval::new(0xA000, 0xA48F)),
    ("Hangul Syllables", Interval::new(0xAC00, 0xD7AF)),
    ("High Surrogates", Interval::new(0xD800, 0xDB7F)),
    ("High Private Use Surrogates", Interval::new(0xDB80, 0xDBFF)),
    ("Low Surrogates", Interval::new(0xDC00, 0xDFFF)),
    ("Private Use Area", Interval::new(0xE000, 0xF8FF)),
    ("CJK Compatibility Ideographs", Interval::new(0xF900, 0xFAFF)),
    ("Alphabetic Presentation Forms", Interval::new(0xFB00, 0xFB4F)),
    ("Arabic Presentation Forms-A", Interval::new(0xFB50, 0xFDFF)),
    ("Variation Selectors", Interval::new(0xFE00, 0xFE0F)),
    ("Combining Half Marks", Interval::new(0xFE20, 0xFE2F)),
    ("CJK Compatibility Forms", Interval::new(0xFE30, 0xFE4F)),
    ("Small Form Variants", Interval::new(0xFE50, 0xFE6F)),
    ("Arabic Presentation Forms-B", Interval::new(0xFE70, 0xFEFF)),
    ("Halfwidth and Fullwidth Forms", Interval::new(0xFF00, 0xFFEF)),
    ("Specials", Interval::new(0xFFF0, 0xFFFF)),
    ("Linear B Syllabary", Interval::new(0x10000, 0x1007F)),
    ("Old Italic", Interval::new(0x10300, 0x1032F)),
    ("Gothic", Interval::new(0x10330, 0x1034F)),
    ("Mathematical Alphanumeric Symbols", Interval::new(0x1D400, 0x1D7FF)),
    ("Mahjong Tiles", Interval::new(0x1F000, 0x1F02F)),
    ("Miscellaneous Symbols and Pictographs", Interval::new(0x1F300, 0x1F5FF)),
    ("Emoticons", Interval::new(0x1F600, 0x1F64F)),
    ("Transport and Map Symbols", Interval::new(0x1F680, 0x1F6FF)),
    ("CJK Unified Ideographs Extension B", Interval::new(0x20000, 0x2A6DF)),
    ("Tags", Interval::new(0xE0000, 0xE007F)),
    ("Variation Selectors Supplement", Interval::new(0xE0100, 0xE01EF)),
    ("Supplementary Private Use Area-A", Interval::new(0xF0000, 0xFFFFF)),
    ("Supplementary Private Use Area-B", Interval::new(0x100000, 0x10FFFF)),
];
