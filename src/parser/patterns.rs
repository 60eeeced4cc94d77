//! Shared regular expression fragments and bundled word lists.
//!
//! The fragments are plain strings composed into the regexes of the
//! individual pipeline stages. Rank marker alternations are generated from
//! the marker tables in [`super::rank_utils`], longest marker first.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::rank_utils::{
    ALL_MARKERS, FAMILY_GROUP_MARKERS, INFRAGENERIC_MARKERS, INFRASPECIFIC_MARKERS,
    MICROBIAL_RANKS, SUPRAGENERIC_MARKERS, sorted_keys,
};
use crate::unicode::ALPHA_DELTA;

/// Upper case letters allowed to start a name part.
pub const NAME_LETTERS: &str = "A-ZÏËÖÜÄÉÈČÁÀÆŒ";
/// Lower case letters allowed inside name parts.
pub const NAME_LETTERS_LC: &str = "a-zïëöüäåéèčáàæœ";

pub const YEAR: &str = "[12][0-9][0-9][0-9?]";

/// Common author name suffixes of three or more characters.
const AUTHOR_TOKEN_3: &str = "fil|filius|hort|jun|junior|sen|senior";

/// Author name suffixes that are easily mistaken for epithets.
pub const AUTHOR_SUFFIX: &str = r"(?:bis|ter|d(?:[ae][rnl]?|egli)|van(?: de[nr]?)|zur?)";

/// Name placeholder vocabulary like "incertae sedis" or "unassigned".
pub const PLACEHOLDER_NAME: &str = "(?:allocation|awaiting|deleted?|dummy|incertae ?sedis|[iu]ndetermined|mixed|not (?:assigned|stated)|place ?holder|temp|tobedeleted|un(?:accepted|allocated|assigned|certain|classed|classified|cultured|described|det(?:ermined)?|ident|known|named|placed|specified))";

/// Rank abbreviations found in "nov." status notes.
pub const NOV_RANKS: &str = "((?:[sS]ub)?(?:[fF]am|[gG]en|[sS]s?p(?:ec)?|[vV]ar|[fF](?:orma?)?))";

pub const MANUSCRIPT_STATUS: &str = r"(?:(?:comb[. ]?)?ined|ms|in press|unpublished)\.?($|\s)";

pub static YEAR_LOOSE: LazyLock<String> =
    LazyLock::new(|| format!(r"{YEAR}[abcdh?]?(?:[/,-][0-9]{{1,4}})?"));

pub static MONOMIAL: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"[{NAME_LETTERS}](?:\.|[{NAME_LETTERS_LC}]+)(?:-[{NAME_LETTERS}]?[{NAME_LETTERS_LC}]+)?"
    )
});

/// A single author token: a capitalized name, an initial or a name particle.
///
/// "heede" is only accepted right after "den", written as one token.
pub static AUTHOR_TOKEN: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"(?:den heede|(?:\p{{Lu}}|-[a-z])[\p{{Lu}}\p{{Ll}}'-]*|{AUTHOR_TOKEN_3}|al|f|j|jr|ms|sr|v|v[ao]n|zu[rm]?|bis|d[aeiou]?|de[nrmls]?|degli|e|l[ae]s?|s|ter|'?t|y)\.?"
    )
});

pub static AUTHOR: LazyLock<String> =
    LazyLock::new(|| format!("{t}(?:[ '-]?{t})*", t = &*AUTHOR_TOKEN));

pub static AUTHOR_TEAM: LazyLock<String> =
    LazyLock::new(|| format!("{a}(?:[&,;]+{a})*", a = &*AUTHOR));

/// Ex authors, main authors and a fungal sanctioning author.
///
/// The three groups are named `{prefix}ex`, `{prefix}au` and `{prefix}sa`.
pub fn authorship(prefix: &str) -> String {
    format!(
        r"(?:(?P<{prefix}ex>{team}) ?\bex[. ])?(?P<{prefix}au>{team})(?: *: *(?P<{prefix}sa>Pers\.?|Fr\.?))?",
        team = &*AUTHOR_TEAM
    )
}

fn alternation(keys: &[String]) -> String {
    keys.iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|")
}

/// Infrageneric markers like `subgen` or `sect`.
pub static INFRAGENERIC_KEYS: LazyLock<String> =
    LazyLock::new(|| alternation(&sorted_keys(&INFRAGENERIC_MARKERS)));

pub static FAMILY_GROUP_KEYS: LazyLock<String> =
    LazyLock::new(|| alternation(&sorted_keys(&FAMILY_GROUP_MARKERS)));

pub static SUPRAGENERIC_KEYS: LazyLock<String> =
    LazyLock::new(|| alternation(&sorted_keys(&SUPRAGENERIC_MARKERS)));

/// Suprageneric and infrageneric markers combined.
pub static SUPRA_AND_INFRAGENERIC_KEYS: LazyLock<String> = LazyLock::new(|| {
    let mut map = SUPRAGENERIC_MARKERS.clone();
    map.extend(INFRAGENERIC_MARKERS.iter().map(|(k, v)| (k.clone(), *v)));
    alternation(&sorted_keys(&map))
});

/// Every rank marker including symbolic ones.
pub static ALL_KEYS: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"{}|\*+|[{ALPHA_DELTA}]",
        alternation(&sorted_keys(&ALL_MARKERS))
    )
});

/// Infraspecific rank markers, optionally prefixed by notho or agamo.
pub static RANK_MARKER: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"(?:notho|agamo)?(?:sp|t\.infr|{}|\*+|[{ALPHA_DELTA}])",
        alternation(&sorted_keys(&INFRASPECIFIC_MARKERS))
    )
});

/// Literal markers of the bacterial infrasubspecific ranks, dots included.
pub static MICROBIAL_MARKERS: LazyLock<Vec<String>> = LazyLock::new(|| {
    let mut markers = vec!["bv.".to_string(), "ct.".to_string(), "f.sp.".to_string()];
    for rank in MICROBIAL_RANKS.iter() {
        if let Some(marker) = rank.marker() {
            if !markers.iter().any(|m| m == marker) {
                markers.push(marker.to_string());
            }
        }
    }
    markers
});

pub static RANK_MARKER_MICROBIAL: LazyLock<String> =
    LazyLock::new(|| format!("(?:{})", alternation(&MICROBIAL_MARKERS)));

/// An infrageneric block, either a bracketed subgenus or a marker with epithet.
pub static INFRAGENERIC: LazyLock<String> = LazyLock::new(|| {
    format!(
        r"(?:\([{NAME_LETTERS}][{NAME_LETTERS_LC}-]+\)|(?: .+?[. ]| )(?:notho)?(?:{keys})[. ][{NAME_LETTERS}][{NAME_LETTERS_LC}-]+)",
        keys = &*INFRAGENERIC_KEYS
    )
});

// ── Bundled word lists ──

const LATIN_ENDINGS_TXT: &str = include_str!("../../resources/latin-endings.txt");
const BLACKLIST_TXT: &str = include_str!("../../resources/blacklist-epithets.txt");

fn word_list(text: &str) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_lowercase)
}

/// Typical endings of latin name parts, used to tell epithets from authors.
pub static LATIN_ENDINGS: LazyLock<Regex> = LazyLock::new(|| {
    let endings: Vec<String> = word_list(LATIN_ENDINGS_TXT).collect();
    Regex::new(&format!("(?:{})$", alternation(&endings))).unwrap()
});

/// Words that are never genuine epithets, e.g. "undetermined".
pub static BLACKLIST_EPITHETS: LazyLock<HashSet<String>> =
    LazyLock::new(|| word_list(BLACKLIST_TXT).collect());

#[cfg(test)]
mod tests {
    use super::*;

    fn full(pattern: &str) -> Regex {
        Regex::new(&format!("^(?:{pattern})$")).unwrap()
    }

    #[test]
    fn test_monomial() {
        let re = full(&MONOMIAL);
        assert!(re.is_match("Abies"));
        assert!(re.is_match("A."));
        assert!(re.is_match("Hieracium-Pilosella"));
        assert!(!re.is_match("abies"));
        assert!(!re.is_match("Abies alba"));
    }

    #[test]
    fn test_author_team() {
        let re = full(&AUTHOR_TEAM);
        assert!(re.is_match("L."));
        assert!(re.is_match("Mill."));
        assert!(re.is_match("L.L.Daniel"));
        assert!(re.is_match("Baker f."));
        assert!(re.is_match("Hook.f.&Thomson"));
        assert!(re.is_match("van den heede"));
        assert!(re.is_match("DC."));
        assert!(!re.is_match("alba"));
    }

    #[test]
    fn test_year_loose() {
        let re = full(&YEAR_LOOSE);
        assert!(re.is_match("1753"));
        assert!(re.is_match("1887a"));
        assert!(re.is_match("186?"));
        assert!(re.is_match("1901-1902"));
        assert!(!re.is_match("753"));
    }

    #[test]
    fn test_authorship_groups() {
        let re = Regex::new(&format!("^{}$", authorship("c"))).unwrap();
        let caps = re.captures("Baker f.ex Rose").unwrap();
        assert_eq!(caps.name("cex").map(|m| m.as_str()), Some("Baker f."));
        assert_eq!(caps.name("cau").map(|m| m.as_str()), Some("Rose"));
        let caps = re.captures("Fr.:Fr.").unwrap();
        assert_eq!(caps.name("cau").map(|m| m.as_str()), Some("Fr."));
        assert_eq!(caps.name("csa").map(|m| m.as_str()), Some("Fr."));
    }

    #[test]
    fn test_marker_alternations() {
        let re = full(&RANK_MARKER);
        for marker in ["subsp", "var", "nothovar", "f", "sp", "**", "β", "t.infr"] {
            assert!(re.is_match(marker), "{marker} should be a rank marker");
        }
        assert!(!re.is_match("alba"));

        assert!(MICROBIAL_MARKERS.contains(&"pv.".to_string()));
        assert!(MICROBIAL_MARKERS.contains(&"serovar".to_string()));
        let re = full(&RANK_MARKER_MICROBIAL);
        assert!(re.is_match("f.sp."));
        assert!(!re.is_match("fxsp."));
    }

    #[test]
    fn test_word_lists() {
        assert!(LATIN_ENDINGS.is_match("Pinus"));
        assert!(LATIN_ENDINGS.is_match("Abies"));
        assert!(!LATIN_ENDINGS.is_match("Chatanay"));
        assert!(BLACKLIST_EPITHETS.contains("unknown"));
        assert!(!BLACKLIST_EPITHETS.contains("alba"));
    }
}
