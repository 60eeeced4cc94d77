//! Unicode helpers for name strings.
//!
//! - Homoglyph replacement maps Cyrillic and Greek look-alikes to latin letters.
//! - Ligature decomposition turns æ into ae and similar.
//! - ASCII folding strips diacritics using canonical decomposition.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Greek letters used as infraspecific rank markers in old literature.
pub const ALPHA_DELTA: &str = "ɑα⍺βɣγδẟ";

/// Look-alike characters and their latin counterpart.
///
/// The alpha/delta rank marker letters and the Cyrillic "х" (a common
/// stand-in for the hybrid cross) are deliberately absent.
const HOMOGLYPHS: &[(char, char)] = &[
    // Cyrillic lower case
    ('а', 'a'),
    ('е', 'e'),
    ('о', 'o'),
    ('р', 'p'),
    ('с', 'c'),
    ('у', 'y'),
    ('і', 'i'),
    ('ј', 'j'),
    ('ѕ', 's'),
    ('һ', 'h'),
    ('ԁ', 'd'),
    ('ԛ', 'q'),
    ('ԝ', 'w'),
    // Cyrillic upper case
    ('А', 'A'),
    ('В', 'B'),
    ('Е', 'E'),
    ('К', 'K'),
    ('М', 'M'),
    ('Н', 'H'),
    ('О', 'O'),
    ('Р', 'P'),
    ('С', 'C'),
    ('Т', 'T'),
    ('Х', 'X'),
    ('І', 'I'),
    ('Ј', 'J'),
    ('Ѕ', 'S'),
    // Greek
    ('Α', 'A'),
    ('Β', 'B'),
    ('Ε', 'E'),
    ('Ζ', 'Z'),
    ('Η', 'H'),
    ('Ι', 'I'),
    ('Κ', 'K'),
    ('Μ', 'M'),
    ('Ν', 'N'),
    ('Ο', 'O'),
    ('Ρ', 'P'),
    ('Τ', 'T'),
    ('Υ', 'Y'),
    ('Χ', 'X'),
    ('ο', 'o'),
    // misc
    ('¡', 'i'),
    ('ı', 'i'),
];

fn homoglyph(c: char) -> Option<char> {
    HOMOGLYPHS
        .iter()
        .find(|(glyph, _)| *glyph == c)
        .map(|(_, latin)| *latin)
}

pub fn contains_homoglyphs(s: &str) -> bool {
    s.chars().any(|c| homoglyph(c).is_some())
}

pub fn replace_homoglyphs(s: &str) -> String {
    s.chars().map(|c| homoglyph(c).unwrap_or(c)).collect()
}

/// Expands ligatures and a few special letters into plain latin letters.
pub fn decompose(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("Ae"),
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("Oe"),
            'Ĳ' => out.push_str("Ij"),
            'ĳ' => out.push_str("ij"),
            'ǈ' => out.push_str("Lj"),
            'ǉ' => out.push_str("lj"),
            'ȸ' => out.push_str("db"),
            'ȹ' => out.push_str("qp"),
            'ß' => out.push_str("ss"),
            'ſ' => out.push('s'),
            'ﬆ' => out.push_str("st"),
            'ﬅ' => out.push_str("ft"),
            'ﬀ' => out.push_str("ff"),
            'ﬁ' => out.push_str("fi"),
            'ﬂ' => out.push_str("fl"),
            'ﬃ' => out.push_str("ffi"),
            'ﬄ' => out.push_str("ffl"),
            other => out.push(other),
        }
    }
    out
}

/// Removes accents and diacritics, expanding ligatures on the way.
pub fn fold_to_ascii(s: &str) -> String {
    let mut special = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            'ß' => special.push_str("ss"),
            'ſ' => special.push('s'),
            'Æ' => special.push_str("AE"),
            'æ' => special.push_str("ae"),
            'Ð' => special.push('D'),
            'đ' | 'ð' => special.push('d'),
            'Ø' => special.push('O'),
            'ø' => special.push('o'),
            'Œ' => special.push_str("OE"),
            'œ' => special.push_str("oe"),
            'Ŧ' => special.push('T'),
            'ŧ' => special.push('t'),
            'Ł' => special.push('L'),
            'ł' => special.push('l'),
            other => special.push(other),
        }
    }
    special.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_homoglyphs() {
        // Cyrillic "а" and "о" inside a latin word
        let input = "Ab\u{0456}es \u{0430}lb\u{0430}";
        assert!(contains_homoglyphs(input));
        assert_eq!(replace_homoglyphs(input), "Abies alba");
        assert!(!contains_homoglyphs("Abies ⍺lba"));
    }

    #[test]
    fn test_decompose() {
        assert_eq!(decompose("Cæsalpinia"), "Caesalpinia");
        assert_eq!(decompose("Œnothera"), "Oenothera");
    }

    #[test]
    fn test_fold_to_ascii() {
        assert_eq!(fold_to_ascii("Müller"), "Muller");
        assert_eq!(fold_to_ascii("Caesalpinia bonduc Roxb."), "Caesalpinia bonduc Roxb.");
        assert_eq!(fold_to_ascii("Łomnicki"), "Lomnicki");
        assert_eq!(fold_to_ascii("Doñana"), "Donana");
    }
}
