//! Careful and aggressive cleaning of raw name strings.
//!
//! [`pre_clean`] runs first on every input and only repairs encoding damage:
//! - whitespace inside html entities
//! - html entity decoding (named and numeric)
//! - dangling `&amp` without the closing semicolon
//! - xml tags
//! - homoglyphs of latin letters
//! - enclosing quotes
//! - apostrophe variants
//!
//! [`clean_strong`] is the last resort before the second grammar attempt and
//! removes anything that is not expected in a name.

use std::sync::LazyLock;

use regex::Regex;

use super::grammar::{is_name_uc, monomial_end};
use crate::models::warnings;
use crate::unicode::replace_homoglyphs;

/// Html entities with whitespace inside, e.g. `& amp ;`.
static XML_ENTITY_STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&\s*([a-z]+)\s*;").unwrap());

static HTML_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:#([0-9]{1,7})|#[xX]([0-9a-fA-F]{1,6})|([a-zA-Z][a-zA-Z0-9]{1,7}));").unwrap()
});

/// Ampersand entities missing their semicolon.
static AMPERSAND_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"& *amp +").unwrap());

static XML_TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"< */? *[a-zA-Z] *>").unwrap());

static NORM_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\\[nr]|\s)+").unwrap());

static NORM_APOSTROPHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\u{0060}\u{00B4}\u{2018}\u{2019}]+").unwrap());

/// Placeholder authors at the very end.
static CLEAN_PLACEHOLDER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i) (?:author|unknown|unassigned|not_stated)$").unwrap());

static CLEAN_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[§$%/#+!;:_|"=*]"#).unwrap());

static FIRST_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([×xX]\s+)?([×x][A-Z])?([a-zA-Z])([a-zA-Z]+) ").unwrap()
});

/// Straight and typographic quotes stripped from both ends.
const QUOTES: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];

/// Named html entities found in name data, mostly Latin-1.
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{00A0}'),
    ("ensp", '\u{2002}'),
    ("emsp", '\u{2003}'),
    ("thinsp", '\u{2009}'),
    ("ndash", '–'),
    ("mdash", '—'),
    ("lsquo", '‘'),
    ("rsquo", '’'),
    ("sbquo", '‚'),
    ("ldquo", '“'),
    ("rdquo", '”'),
    ("bdquo", '„'),
    ("dagger", '†'),
    ("Dagger", '‡'),
    ("hellip", '…'),
    ("times", '×'),
    ("divide", '÷'),
    ("deg", '°'),
    ("plusmn", '±'),
    ("middot", '·'),
    ("para", '¶'),
    ("sect", '§'),
    ("copy", '©'),
    ("reg", '®'),
    ("iexcl", '¡'),
    ("iquest", '¿'),
    ("laquo", '«'),
    ("raquo", '»'),
    ("acute", '´'),
    ("uml", '¨'),
    ("szlig", 'ß'),
    ("alpha", 'α'),
    ("beta", 'β'),
    ("gamma", 'γ'),
    ("delta", 'δ'),
    ("mu", 'μ'),
    ("Agrave", 'À'),
    ("Aacute", 'Á'),
    ("Acirc", 'Â'),
    ("Atilde", 'Ã'),
    ("Auml", 'Ä'),
    ("Aring", 'Å'),
    ("AElig", 'Æ'),
    ("Ccedil", 'Ç'),
    ("Egrave", 'È'),
    ("Eacute", 'É'),
    ("Ecirc", 'Ê'),
    ("Euml", 'Ë'),
    ("Igrave", 'Ì'),
    ("Iacute", 'Í'),
    ("Icirc", 'Î'),
    ("Iuml", 'Ï'),
    ("Ntilde", 'Ñ'),
    ("Ograve", 'Ò'),
    ("Oacute", 'Ó'),
    ("Ocirc", 'Ô'),
    ("Otilde", 'Õ'),
    ("Ouml", 'Ö'),
    ("Oslash", 'Ø'),
    ("Ugrave", 'Ù'),
    ("Uacute", 'Ú'),
    ("Ucirc", 'Û'),
    ("Uuml", 'Ü'),
    ("Yacute", 'Ý'),
    ("agrave", 'à'),
    ("aacute", 'á'),
    ("acirc", 'â'),
    ("atilde", 'ã'),
    ("auml", 'ä'),
    ("aring", 'å'),
    ("aelig", 'æ'),
    ("ccedil", 'ç'),
    ("egrave", 'è'),
    ("eacute", 'é'),
    ("ecirc", 'ê'),
    ("euml", 'ë'),
    ("igrave", 'ì'),
    ("iacute", 'í'),
    ("icirc", 'î'),
    ("iuml", 'ï'),
    ("ntilde", 'ñ'),
    ("ograve", 'ò'),
    ("oacute", 'ó'),
    ("ocirc", 'ô'),
    ("otilde", 'õ'),
    ("ouml", 'ö'),
    ("oslash", 'ø'),
    ("ugrave", 'ù'),
    ("uacute", 'ú'),
    ("ucirc", 'û'),
    ("uuml", 'ü'),
    ("yacute", 'ý'),
    ("yuml", 'ÿ'),
    ("OElig", 'Œ'),
    ("oelig", 'œ'),
    ("Scaron", 'Š'),
    ("scaron", 'š'),
];

/// Decodes named and numeric html entities, leaving unknown ones untouched.
pub fn unescape_html(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    HTML_ENTITY
        .replace_all(s, |caps: &regex::Captures| {
            let decoded = if let Some(dec) = caps.get(1) {
                dec.as_str().parse::<u32>().ok().and_then(char::from_u32)
            } else if let Some(hex) = caps.get(2) {
                u32::from_str_radix(hex.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32)
            } else {
                caps.get(3).and_then(|name| {
                    NAMED_ENTITIES
                        .iter()
                        .find(|(n, _)| *n == name.as_str())
                        .map(|(_, c)| *c)
                })
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Strips leading quotes or whitespace, and the same quote at the end.
fn strip_quotes(mut name: String) -> String {
    for quote in QUOTES {
        let start: usize = name
            .chars()
            .take_while(|c| c == quote || c.is_whitespace())
            .map(char::len_utf8)
            .sum();
        if start == 0 {
            continue;
        }
        let rest = &name[start..];
        let end = rest.trim_end_matches(*quote).len();
        name = rest[..end].to_string();
    }
    name
}

/// Careful cleaning that keeps every parsable name part.
///
/// Returns the cleaned name and the warnings for each repair done.
pub fn pre_clean(name: &str) -> (String, Vec<&'static str>) {
    let mut issues = Vec::new();
    let mut name = XML_ENTITY_STRIP.replace_all(name, "&$1;").into_owned();

    let length = name.chars().count();
    name = unescape_html(&name);
    if name.chars().count() < length {
        issues.push(warnings::HTML_ENTITIES);
    }
    if AMPERSAND_ENTITY.is_match(&name) {
        name = AMPERSAND_ENTITY.replace_all(&name, "&").into_owned();
        issues.push(warnings::HTML_ENTITIES);
    }
    if XML_TAGS.is_match(&name) {
        name = XML_TAGS.replace_all(&name, "").into_owned();
        issues.push(warnings::XML_TAGS);
    }

    let replaced = replace_homoglyphs(&name).replace('¡', "i");
    if replaced != name {
        issues.push(warnings::HOMOGLYPHS);
        name = replaced;
    }

    name = strip_quotes(name.trim().to_string());
    name = NORM_WHITESPACE.replace_all(&name, " ").into_owned();
    name = NORM_APOSTROPHES.replace_all(&name, "'").into_owned();
    issues.dedup();
    (name.trim().to_string(), issues)
}

/// Aggressive cleaning removing placeholders and unexpected punctuation.
///
/// A lower or all upper case first word is capitalized.
pub fn clean_strong(name: &str) -> String {
    let name = CLEAN_PLACEHOLDER_SUFFIX.replace(name, "");
    let mut name = CLEAN_PUNCTUATION.replace_all(&name, " ").into_owned();
    if let Some(caps) = FIRST_WORD.captures(&name) {
        if caps.get(2).is_none() {
            let mut first = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            first.push_str(&caps[3].to_uppercase());
            first.push_str(&caps[4].to_lowercase());
            first.push(' ');
            let end = caps.get(0).map_or(0, |m| m.end());
            name = first + &name[end..];
        }
    }
    norm_hybrid_genus(&name)
}

/// A leading hybrid sign before the genus is attached to it, e.g. "x Abies" to "×Abies".
pub fn norm_hybrid_genus(name: &str) -> String {
    let trimmed = name.trim_start();
    let rest = if let Some(r) = trimmed.strip_prefix("√ó") {
        r
    } else {
        match trimmed.chars().next() {
            Some(c @ ('+' | '×' | 'x' | 'X')) => &trimmed[c.len_utf8()..],
            _ => return name.to_string(),
        }
    };
    let rest = rest.trim_start();
    match rest.chars().next() {
        Some(c) if is_name_uc(c) => format!("×{rest}"),
        _ => name.to_string(),
    }
}

/// A genus wrapped in quotes, e.g. `'Abies' alba`, or `None`.
pub fn unquote_genus(name: &str) -> Option<String> {
    let rest = name.strip_prefix('\'')?;
    let start = rest.len() - rest.trim_start_matches(' ').len();
    let end = monomial_end(rest, start)?;
    let after = rest[end..].trim_start_matches(' ');
    let tail = after.strip_prefix('\'')?;
    Some(format!("{} {}", &rest[start..end], tail))
}
