//! Name normalization.
//!
//! [`normalize`] is careful and keeps the name as close to the input as
//! possible:
//! - rank markers with two dots like "f. sp." or "s.l."
//! - quoted and imprint years
//! - whitespace around punctuation and brackets
//! - "and", "et" and friends become "&"
//! - hybrid marker variants and their placement
//! - all upper case words and lower case genera are capitalized
//!
//! [`normalize_strong`] prepares the string for the grammar. It unifies
//! quotes and brackets, drops question marks and suprageneric rank prefixes,
//! adds a "?" genus to bare epithets and brackets an unbracketed subgenus.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::grammar::{char_at, epithet_ends, monomial_end};
use super::patterns::{AUTHOR_SUFFIX, NAME_LETTERS, NAME_LETTERS_LC, SUPRAGENERIC_KEYS, YEAR, YEAR_LOOSE};
use super::rank_utils::infer_rank_from_marker;
use crate::models::{HYBRID_MARKER, ParsedName, warnings};

static FORM_SPECIALIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bf\. *sp(?:ec)?\b").unwrap());

static SENSU_LATU: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bs\.l\.\b").unwrap());

/// Years in quotes or square brackets.
static NORM_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"["'\[]+\s*({})\s*["'\]]+"#, &*YEAR_LOOSE)).unwrap()
});

/// A publication year followed by an imprint year, e.g. `1887 [1888]`.
static NORM_IMPRINT_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"({y})\s*([(\[,&]? *(?:not|imprint)? *"?{y}"?[)\]]?)"#,
        y = &*YEAR_LOOSE
    ))
    .unwrap()
});

static REPL_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| Regex::new("_+").unwrap());

static NORM_AND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b *(and|et|und|\+|,&) *\b").unwrap());

static COMMA_AFTER_BASYEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"({YEAR})\s*\)\s*,")).unwrap());

static NORM_BRACKETS_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([{(\[])\s*,?\s*").unwrap());

static NORM_BRACKETS_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*,?\s*([})\]])\s*").unwrap());

/// Characters misused for the hybrid cross, including mathematical x variants.
static NORM_HYBRID_HOMOGLYPHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[хᕁᕽ᙮ⅹ⤫⤬⨯ｘ\u{1D431}\u{1D465}\u{1D499}\u{1D4CD}\u{1D501}\u{1D535}\u{1D569}\u{1D59D}\u{1D5D1}\u{1D605}\u{1D639}\u{1D66D}\u{1D6A1}]").unwrap()
});

static NORM_HYBRIDS_FORMULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[. ](?:[×xX]|√ó) ").unwrap());

static NORM_ANON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(anon\.?)(\b|\s|$)").unwrap());

static NORM_UPPERCASE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\p{Lu})(\p{Lu}{2,})\b").unwrap());

static NORM_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\\[nr]|\s)+").unwrap());

static NORM_EX_HORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:hort(?:usa?)?|cv)[. ]ex ").unwrap());

static NORM_QUOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new("[\"'`´]+").unwrap());

/// Question marks after letters, those after years stay.
static NO_Q_MARKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"([{NAME_LETTERS_LC}\p{{Ll}}\-?])\?+")).unwrap()
});

static REPL_RANK_PREFIXES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^(?:sub)?(?:fossil|{})\.?\s+",
        &*SUPRAGENERIC_KEYS
    ))
    .unwrap()
});

/// Bracketed genus remainders produced by taxon finders, e.g. `A(bies) alba`.
static NORM_TF_GENUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^([{NAME_LETTERS}])\(([{NAME_LETTERS_LC}-]+)\)\.? ")).unwrap()
});

static NORM_BRACKETS_OPEN_STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?: ?[{\[] ?)+").unwrap());

static NORM_BRACKETS_CLOSE_STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?: ?[}\]] ?)+").unwrap());

static REPL_FINAL_PUNCTUATIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;:]+$").unwrap());

static AUTHOR_SUFFIX_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{AUTHOR_SUFFIX}$")).unwrap());

static YEAR_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!("^{YEAR}")).unwrap());

fn is_norm_punct(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | ';' | ':' | '&' | '(' | ')' | '{' | '}' | '[' | ']' | '-'
    )
}

/// Removes whitespace around punctuation and collapses repeated punctuation.
///
/// "Mill. , 1768" becomes "Mill.,1768" and "L.." becomes "L.".
pub fn norm_punctuation(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < chars.len() {
        let mut j = i;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        if j == chars.len() {
            out.extend(&chars[i..]);
            break;
        }
        let c = chars[j];
        if !is_norm_punct(c) {
            out.extend(&chars[i..=j]);
            i = j + 1;
            continue;
        }
        out.push(c);
        j += 1;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        while j < chars.len() && chars[j] == c {
            j += 1;
        }
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
        i = j;
    }
    out
}

/// "and", "et", "und", "+" and ",&" become "&", unless part of a hyphenated word.
fn norm_and(name: &str) -> String {
    NORM_AND
        .replace_all(name, |caps: &Captures| {
            let word = &caps[1];
            let whole = &caps[0];
            let Some(m) = caps.get(1) else {
                return whole.to_string();
            };
            let hyphen_before = name[..m.start()].ends_with('-');
            let hyphen_after = name[m.end()..].starts_with('-');
            if hyphen_before || hyphen_after || word.is_empty() {
                whole.to_string()
            } else {
                "&".to_string()
            }
        })
        .into_owned()
}

fn replace_first_hybrid_epithet(name: &str) -> Option<String> {
    let start = name.len() - name.trim_start().len();
    let mut pos = start;
    if char_at(name, pos) == Some(HYBRID_MARKER) {
        pos += HYBRID_MARKER.len_utf8();
    }
    let monomial = monomial_end(name, pos)?;
    let rest = &name[monomial..];
    let after_ws = rest.trim_start();
    if after_ws.len() == rest.len() {
        return None;
    }
    let cross = if let Some(r) = after_ws.strip_prefix('×') {
        r
    } else if let Some(r) = after_ws.strip_prefix("√ó") {
        r
    } else {
        let mut chars = after_ws.chars();
        match (chars.next(), chars.next()) {
            (Some('x' | 'X'), Some(ws)) if ws.is_whitespace() => &after_ws[1..],
            _ => return None,
        }
    };
    let epithet = cross.trim_start();
    let epithet_start = name.len() - epithet.len();
    if epithet_ends(name, epithet_start).is_empty() {
        return None;
    }
    Some(format!("{} {HYBRID_MARKER}{epithet}", &name[start..monomial]))
}

/// Capitalizes a lower case genus of a binomial like "abies alba".
fn capitalize_lowercase_binomial(name: &str) -> Option<String> {
    let first = epithet_ends(name, 0).into_iter().find(|e| {
        char_at(name, *e) == Some(' ') && !epithet_ends(name, e + 1).is_empty()
    })?;
    let mut chars = name[..first].chars();
    let head = chars.next()?;
    Some(format!("{}{}{}", head.to_uppercase(), chars.as_str(), &name[first..]))
}

/// Careful normalization of a pre-cleaned name.
pub fn normalize(name: &str) -> String {
    let mut name = FORM_SPECIALIS.replace_all(name, "fsp").into_owned();
    name = SENSU_LATU.replace_all(&name, "sl").into_owned();
    name = NORM_YEAR.replace_all(&name, "$1").into_owned();
    name = NORM_IMPRINT_YEAR.replace_all(&name, "$1").into_owned();
    name = REPL_UNDERSCORE.replace_all(&name, " ").into_owned();
    name = norm_punctuation(&name);
    name = norm_and(&name);
    name = COMMA_AFTER_BASYEAR.replace(&name, "$1)").into_owned();
    name = NORM_BRACKETS_OPEN.replace_all(&name, "$1").into_owned();
    name = NORM_BRACKETS_CLOSE.replace_all(&name, "$1").into_owned();

    name = NORM_HYBRID_HOMOGLYPHS
        .replace_all(&name, HYBRID_MARKER.to_string())
        .into_owned();
    name = super::cleaner::norm_hybrid_genus(&name);
    if let Some(hybrid) = replace_first_hybrid_epithet(&name) {
        name = hybrid;
    }
    name = NORM_HYBRIDS_FORMULA
        .replace_all(&name, format!(" {HYBRID_MARKER} "))
        .into_owned();

    name = NORM_ANON.replace(&name, "Anon.").into_owned();
    name = NORM_UPPERCASE_WORDS
        .replace_all(&name, |caps: &Captures| {
            format!("{}{}", &caps[1], caps[2].to_lowercase())
        })
        .into_owned();
    if let Some(capitalized) = capitalize_lowercase_binomial(&name) {
        name = capitalized;
    }

    NORM_WHITESPACE.replace_all(&name, " ").trim().to_string()
}

/// Unifies "hort. ex" spellings.
pub fn normalize_hort(name: &str) -> String {
    NORM_EX_HORT.replace_all(name, "hort.ex ").into_owned()
}

/// Removes question marks after letters, flagging the name as doubtful.
pub fn no_q_marks(name: &str, pn: &mut ParsedName) -> String {
    if !NO_Q_MARKS.is_match(name) {
        return name.to_string();
    }
    pn.doubtful = true;
    pn.add_warning(warnings::QUESTION_MARKS_REMOVED);
    NO_Q_MARKS.replace_all(name, "$1").into_owned()
}

/// Square and curly brackets become round ones.
pub fn norm_brackets(name: &str) -> String {
    let name = NORM_BRACKETS_OPEN_STRONG.replace_all(name, "(");
    NORM_BRACKETS_CLOSE_STRONG.replace_all(&name, ")").into_owned()
}

/// Punctuation, whitespace and trailing separators.
pub fn norm_ws_punct(name: &str) -> String {
    let name = norm_punctuation(name);
    let name = NORM_WHITESPACE.replace_all(&name, " ");
    let name = REPL_FINAL_PUNCTUATIONS.replace(&name, "");
    name.trim().to_string()
}

fn prefix_missing_genus(name: &str) -> Option<String> {
    let start = name.len() - name.trim_start().len();
    if epithet_ends(name, start).is_empty() {
        return None;
    }
    Some(format!("? {}", &name[start..]))
}

/// Brackets a subgenus written without brackets, e.g. "Abies Pinus alba".
fn bracket_subgenus(name: &str) -> Option<String> {
    let find = |from: usize| -> Option<(usize, usize, usize, usize, usize)> {
        name[from..]
            .char_indices()
            .map(|(i, _)| from + i)
            .find_map(|i| {
                let genus_end = monomial_end(name, i)?;
                (char_at(name, genus_end) == Some(' ')).then_some(())?;
                let sub_start = genus_end + 1;
                let sub_end = monomial_end(name, sub_start)?;
                (char_at(name, sub_end) == Some(' ')).then_some(())?;
                let epithet_start = sub_end + 1;
                let epithet_end = *epithet_ends(name, epithet_start).first()?;
                Some((i, genus_end, sub_start, sub_end, epithet_end))
            })
    };

    let first = find(0)?;
    let epithet = &name[first.3 + 1..first.4];
    if infer_rank_from_marker(epithet).is_some() || AUTHOR_SUFFIX_ONLY.is_match(epithet) {
        return None;
    }

    let mut out = String::with_capacity(name.len() + 2);
    let mut last = 0;
    let mut next = Some(first);
    while let Some((start, genus_end, sub_start, sub_end, epithet_end)) = next {
        out.push_str(&name[last..start]);
        out.push_str(&name[start..genus_end]);
        out.push('(');
        out.push_str(&name[sub_start..sub_end]);
        out.push(')');
        out.push_str(&name[sub_end + 1..epithet_end]);
        last = epithet_end;
        next = if last < name.len() { find(last) } else { None };
    }
    out.push_str(&name[last..]);
    Some(out)
}

/// Strong normalization applied right before the grammar.
pub fn normalize_strong(name: &str, pn: &mut ParsedName) -> String {
    let mut name = normalize_hort(name);
    name = NORM_QUOTES.replace_all(&name, "'").into_owned();
    if let Some(unquoted) = super::cleaner::unquote_genus(&name) {
        name = unquoted;
    }
    name = no_q_marks(&name, pn);
    name = REPL_RANK_PREFIXES.replace_all(&name, "").into_owned();
    name = NORM_TF_GENUS.replace_all(&name, "$1$2 ").into_owned();
    name = norm_brackets(&name);
    if let Some(prefixed) = prefix_missing_genus(&name) {
        name = prefixed;
        pn.add_warning(warnings::MISSING_GENUS);
    }
    if let Some(bracketed) = bracket_subgenus(&name) {
        name = bracketed;
    }
    norm_ws_punct(&name)
}

/// Normalizes a reference or note: one space after separators and dots.
pub fn norm_note(note: &str) -> Option<String> {
    let note = note
        .strip_prefix('(')
        .and_then(|n| n.strip_suffix(')'))
        .unwrap_or(note);

    let chars: Vec<char> = note.chars().collect();
    let mut out = String::with_capacity(note.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        match c {
            ',' | ';' | ')' => {
                out.push(c);
                out.push(' ');
            }
            '(' => {
                if i > 0 && chars[i - 1] != ' ' {
                    out.push(' ');
                }
                out.push('(');
            }
            '&' => out.push_str(" & "),
            '.' => {
                out.push('.');
                let rest: String = chars[i + 1..].iter().take(4).collect();
                let before_year = YEAR_START.is_match(&rest);
                let lower_run = chars[..i]
                    .iter()
                    .rev()
                    .take_while(|c| c.is_ascii_lowercase())
                    .count();
                let word_start = i - lower_run;
                let after_lower_word = lower_run >= 2
                    && (word_start == 0 || !chars[word_start - 1].is_alphanumeric());
                let followed_by_space = chars.get(i + 1) == Some(&' ');
                if before_year || (after_lower_word && !followed_by_space) {
                    out.push(' ');
                }
            }
            _ => out.push(c),
        }
    }
    let out = NORM_WHITESPACE.replace_all(&out, " ");
    let out = out.trim();
    (!out.is_empty()).then(|| out.to_string())
}
