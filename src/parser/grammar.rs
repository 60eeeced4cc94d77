//! Structural grammar of a normalized scientific name.
//!
//! The grammar is `genus [infrageneric] [species [infraspecific]] [microbial]
//! [indet marker] authorship`. Every optional part is tried present first and
//! alternatives are tried in a fixed priority order, so the first successful
//! combination is the preferred parse. Name parts are recognized by small
//! scanners below. The trailing authorship block is handed to
//! [`super::author_grammar`] and memoized per start position, which keeps the
//! enumeration polynomial. The [`Deadline`] is polled inside every loop.

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::author_grammar::{AuthorshipBlock, match_block};
use super::executor::{Deadline, Interrupted};
use super::patterns::{AUTHOR_SUFFIX, INFRAGENERIC_KEYS, MICROBIAL_MARKERS};
use super::rank_utils::{INFRAGENERIC_MARKERS, INFRASPECIFIC_MARKERS, sorted_keys};
use crate::models::HYBRID_MARKER;
use crate::unicode::ALPHA_DELTA;

/// Author suffixes like "bis" or "degli" that must not become infraspecific epithets.
static AUTHOR_SUFFIX_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^{AUTHOR_SUFFIX}\b")).unwrap());

static INFRASPECIFIC_KEYS: LazyLock<Vec<String>> =
    LazyLock::new(|| sorted_keys(&INFRASPECIFIC_MARKERS));

static INFRAGENERIC_KEY_LIST: LazyLock<Vec<String>> = LazyLock::new(|| {
    debug!("Infrageneric markers: {}", &*INFRAGENERIC_KEYS);
    sorted_keys(&INFRAGENERIC_MARKERS)
});

/// Words that end an author citation rather than an epithet.
const NON_EPITHET_WORDS: &[&str] = &[
    "ex", "la", "le", "van", "von", "fil", "filius", "hort", "jun", "junior", "sen", "senior",
    "aff", "and", "cf", "des", "from", "ms", "of", "the", "where",
];

/// Endings of bacterial type and variety terms.
const NON_EPITHET_ENDINGS: &[&str] = &[
    "bacilliform",
    "coliform",
    "coryneform",
    "cytoform",
    "chemoform",
    "biovar",
    "serovar",
    "genomovar",
    "agamovar",
    "cultivar",
    "genotype",
    "serotype",
    "subtype",
    "ribotype",
    "isolate",
];

const QUALIFIERS: &[&str] = &["aff", "cf", "nr"];

// ── Character classes ──

pub(crate) fn is_name_uc(c: char) -> bool {
    c.is_ascii_uppercase() || "ÏËÖÜÄÉÈČÁÀÆŒ".contains(c)
}

pub(crate) fn is_name_lc(c: char) -> bool {
    c.is_ascii_lowercase() || "ïëöüäåéèčáàæœ".contains(c)
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub(crate) fn char_at(s: &str, i: usize) -> Option<char> {
    s.get(i..).and_then(|rest| rest.chars().next())
}

fn char_before(s: &str, i: usize) -> Option<char> {
    s.get(..i).and_then(|head| head.chars().next_back())
}

/// Word boundary at byte offset `i`, in the sense of regex `\b`.
pub(crate) fn is_boundary(s: &str, i: usize) -> bool {
    let before = char_before(s, i).is_some_and(is_word);
    let after = char_at(s, i).is_some_and(is_word);
    before != after
}

fn is_dot_or_space(c: Option<char>) -> bool {
    matches!(c, Some('.' | ' '))
}

/// End of an optional leading hybrid marker.
fn skip_hybrid(s: &str, i: usize) -> usize {
    if char_at(s, i) == Some(HYBRID_MARKER) {
        i + HYBRID_MARKER.len_utf8()
    } else {
        i
    }
}

fn run_end(s: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    s[start..]
        .char_indices()
        .find(|(_, c)| !pred(*c))
        .map(|(i, _)| start + i)
        .unwrap_or(s.len())
}

// ── Name part scanners ──

/// A capitalized monomial like "Abies", "A." or "Hieracium-Pilosella".
pub(crate) fn monomial_end(s: &str, start: usize) -> Option<usize> {
    let first = char_at(s, start)?;
    if !is_name_uc(first) {
        return None;
    }
    let body = start + first.len_utf8();
    let mut end = if char_at(s, body) == Some('.') {
        body + 1
    } else {
        let end = run_end(s, body, is_name_lc);
        if end == body {
            return None;
        }
        end
    };
    if char_at(s, end) == Some('-') {
        let mut i = end + 1;
        if let Some(c) = char_at(s, i).filter(|c| is_name_uc(*c)) {
            i += c.len_utf8();
        }
        let tail = run_end(s, i, is_name_lc);
        if tail > i {
            end = tail;
        }
    }
    Some(end)
}

/// Genus or uninomial at the very start, optionally a hybrid or a "?" placeholder.
fn genus_end(s: &str) -> Option<usize> {
    let start = skip_hybrid(s, 0);
    if char_at(s, start) == Some('?') {
        return Some(start + 1);
    }
    monomial_end(s, start)
}

/// Capitalized infrageneric epithet such as "Pinus" in "(Pinus)".
fn infrageneric_epithet_end(s: &str, start: usize) -> Option<usize> {
    let first = char_at(s, start).filter(|c| is_name_uc(*c))?;
    let body = start + first.len_utf8();
    let end = run_end(s, body, |c| is_name_lc(c) || c == '-');
    (end > body).then_some(end)
}

/// Possible ends of an infraspecific rank marker starting at `pos`.
pub(crate) fn rank_marker_ends(s: &str, pos: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    for prefix in ["notho", "agamo", ""] {
        if !s[pos..].starts_with(prefix) {
            continue;
        }
        let m = pos + prefix.len();
        let rest = &s[m..];
        if rest.starts_with("sp") && !(s[..m].ends_with("f ") || s[..m].ends_with("f.")) {
            ends.push(m + 2);
        }
        if rest.starts_with("t.infr") {
            ends.push(m + 6);
        }
        for key in INFRASPECIFIC_KEYS.iter() {
            if rest.starts_with(key.as_str()) {
                if key == "hort" && rest[4..].starts_with(".ex") {
                    continue;
                }
                ends.push(m + key.len());
            }
        }
        let stars = rest.chars().take_while(|c| *c == '*').count();
        for n in (1..=stars).rev() {
            ends.push(m + n);
        }
        if let Some(c) = rest.chars().next().filter(|c| ALPHA_DELTA.contains(*c)) {
            ends.push(m + c.len_utf8());
        }
    }
    ends
}

fn rank_marker_word_at(s: &str, pos: usize) -> bool {
    rank_marker_ends(s, pos)
        .into_iter()
        .any(|end| is_boundary(s, end))
}

fn infrageneric_marker_ends(s: &str, pos: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    for prefix in ["notho", ""] {
        if !s[pos..].starts_with(prefix) {
            continue;
        }
        let m = pos + prefix.len();
        for key in INFRAGENERIC_KEY_LIST.iter() {
            if s[m..].starts_with(key.as_str()) {
                ends.push(m + key.len());
            }
        }
    }
    ends
}

/// Ends of the optional epithet prefix like "3-", "d'" or "van d", best first.
fn epithet_prefix_ends(s: &str, t: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    let rest = &s[t..];
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        if rest[digits..].starts_with('-') {
            ends.push(t + digits + 1);
        }
        ends.push(t + digits);
    }
    let mut chars = rest.chars();
    if let (Some(a), Some(b)) = (chars.next(), chars.next()) {
        if a.is_ascii_lowercase() && b == '-' {
            ends.push(t + 2);
        }
        if "doml".contains(a) && b == '\'' {
            ends.push(t + 2);
        }
    }
    for word in ["van ", "novae "] {
        if rest.starts_with(word)
            && rest[word.len()..]
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_lowercase())
        {
            ends.push(t + word.len() + 1);
        }
    }
    ends.push(t);
    ends
}

fn ends_with_word(s: &str, end: usize, word: &str) -> bool {
    s[..end].ends_with(word) && !char_before(s, end - word.len()).is_some_and(is_word)
}

fn acceptable_epithet_end(s: &str, end: usize) -> bool {
    let Some(last) = char_before(s, end) else {
        return false;
    };
    if s[..end - last.len_utf8()].ends_with(" d") {
        return false;
    }
    if NON_EPITHET_WORDS.iter().any(|w| ends_with_word(s, end, w)) {
        return false;
    }
    if NON_EPITHET_ENDINGS.iter().any(|w| s[..end].ends_with(w)) {
        return false;
    }
    is_boundary(s, end)
}

/// Possible ends of a lower case epithet starting at `t`, best first.
///
/// Rank markers, author particles like "ex" or "von", and bacterial type
/// terms are never epithets.
pub(crate) fn epithet_ends(s: &str, t: usize) -> Vec<usize> {
    let mut ends = Vec::new();
    for body in epithet_prefix_ends(s, t) {
        if rank_marker_word_at(s, body) {
            continue;
        }
        let Some(first) = char_at(s, body).filter(|c| is_name_lc(*c)) else {
            continue;
        };
        let run = run_end(s, body, |c| is_name_lc(c) || c == '+' || c == '-');
        let min_end = body + first.len_utf8();
        let mut candidates: Vec<usize> = s[min_end..run]
            .char_indices()
            .filter(|(_, c)| is_name_lc(*c))
            .map(|(i, c)| min_end + i + c.len_utf8())
            .collect();
        candidates.reverse();
        for end in candidates {
            if acceptable_epithet_end(s, end) && !ends.contains(&end) {
                ends.push(end);
            }
        }
    }
    ends
}

/// An epithet qualifier like "cf." at `pos`, returning its span and the end.
fn qualifier_at(s: &str, pos: usize) -> Option<((usize, usize), usize)> {
    if !is_boundary(s, pos) {
        return None;
    }
    let rest = &s[pos..];
    let word = QUALIFIERS.iter().find(|q| rest.starts_with(**q))?;
    let end = pos + word.len();
    matches!(char_at(s, end), Some('?' | '.' | ' ')).then_some(((pos, end), end + 1))
}

fn microbial_marker_end(s: &str, pos: usize) -> Option<usize> {
    MICROBIAL_MARKERS
        .iter()
        .find(|m| s[pos..].starts_with(m.as_str()))
        .map(|m| pos + m.len())
}

// ── Match result ──

/// How much of the input the grammar has to consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// The whole string must be consumed.
    Full,
    /// A prefix ending at a word boundary, the rest is returned as remainder.
    Prefix,
}

type Span = (usize, usize);

#[derive(Debug, Clone, Copy, Default)]
struct Spans {
    genus: Span,
    subgenus: Option<Span>,
    infrageneric_marker: Option<Span>,
    infrageneric_epithet: Option<Span>,
    species_qualifier: Option<Span>,
    specific_epithet: Option<Span>,
    superfluous_epithet: Option<Span>,
    infraspecific_qualifier: Option<Span>,
    infraspecific_marker: Option<Span>,
    infraspecific_epithet: Option<Span>,
    microbial_marker: Option<Span>,
    microbial_epithet: Option<Span>,
    indet_marker: Option<Span>,
}

/// Captured parts of a successful structural match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameMatch {
    /// Genus or uninomial, possibly with a leading hybrid marker.
    pub monomial: String,
    /// Bracketed infrageneric epithet, e.g. "Pinus" in "Abies (Pinus) alba".
    pub subgenus: Option<String>,
    pub infrageneric_marker: Option<String>,
    pub infrageneric_epithet: Option<String>,
    pub species_qualifier: Option<String>,
    pub specific_epithet: Option<String>,
    /// An extra epithet before the terminal one of a quadrinomial.
    pub superfluous_epithet: Option<String>,
    pub infraspecific_qualifier: Option<String>,
    pub infraspecific_marker: Option<String>,
    pub infraspecific_epithet: Option<String>,
    pub microbial_marker: Option<String>,
    pub microbial_epithet: Option<String>,
    /// Rank marker following the epithets without an epithet of its own.
    pub indet_marker: Option<String>,
    pub authorship: AuthorshipBlock,
    pub remainder: Option<String>,
}

struct Matcher<'a> {
    s: &'a str,
    mode: MatchMode,
    deadline: &'a Deadline,
    authorships: HashMap<usize, Option<(AuthorshipBlock, usize)>>,
}

type Attempt = Result<Option<NameMatch>, Interrupted>;

impl Matcher<'_> {
    fn run(&mut self) -> Attempt {
        let Some(end) = genus_end(self.s) else {
            return Ok(None);
        };
        let spans = Spans {
            genus: (0, end),
            ..Spans::default()
        };
        self.infrageneric(spans, end)
    }

    fn infrageneric(&mut self, spans: Spans, pos: usize) -> Attempt {
        self.deadline.check()?;
        let s = self.s;
        if !s[..pos].ends_with("ceae") {
            if char_at(s, pos) == Some('(') {
                if let Some(end) = infrageneric_epithet_end(s, pos + 1) {
                    if char_at(s, end) == Some(')') {
                        let next = Spans {
                            subgenus: Some((pos + 1, end)),
                            ..spans
                        };
                        if let Some(m) = self.species(next, end + 1)? {
                            return Ok(Some(m));
                        }
                    }
                }
            }
            if char_at(s, pos) == Some(' ') {
                // anything up to a dot or space may sit between genus and marker
                let mut starts: Vec<usize> = s[pos + 1..]
                    .char_indices()
                    .skip(1)
                    .filter(|(_, c)| *c == '.' || *c == ' ')
                    .map(|(i, _)| pos + 1 + i + 1)
                    .collect();
                starts.push(pos + 1);
                for start in starts {
                    self.deadline.check()?;
                    for marker_end in infrageneric_marker_ends(s, start) {
                        if !is_dot_or_space(char_at(s, marker_end)) {
                            continue;
                        }
                        let epithet_start = marker_end + 1;
                        let Some(epithet_end) = infrageneric_epithet_end(s, epithet_start) else {
                            continue;
                        };
                        let next = Spans {
                            infrageneric_marker: Some((start, marker_end)),
                            infrageneric_epithet: Some((epithet_start, epithet_end)),
                            ..spans
                        };
                        if let Some(m) = self.species(next, epithet_end)? {
                            return Ok(Some(m));
                        }
                    }
                }
            }
        }
        self.species(spans, pos)
    }

    fn species(&mut self, spans: Spans, pos: usize) -> Attempt {
        self.deadline.check()?;
        let s = self.s;
        let mut starts = Vec::with_capacity(2);
        if is_boundary(s, pos) {
            starts.push(pos);
        }
        if char_at(s, pos) == Some(' ') {
            starts.push(pos + 1);
        }
        for start in starts {
            let mut qualified = Vec::with_capacity(2);
            if let Some((qualifier, end)) = qualifier_at(s, start) {
                qualified.push((Some(qualifier), end));
            }
            qualified.push((None, start));
            for (qualifier, epithet_start) in qualified {
                let mut hybrid_starts = vec![epithet_start];
                let after_hybrid = skip_hybrid(s, epithet_start);
                if after_hybrid != epithet_start {
                    hybrid_starts.insert(0, after_hybrid);
                }
                for body in hybrid_starts {
                    for end in epithet_ends(s, body) {
                        let next = Spans {
                            species_qualifier: qualifier,
                            specific_epithet: Some((epithet_start, end)),
                            ..spans
                        };
                        if let Some(m) = self.infraspecific(next, end)? {
                            return Ok(Some(m));
                        }
                        if let Some(m) = self.microbial(next, end)? {
                            return Ok(Some(m));
                        }
                    }
                }
            }
        }
        self.microbial(spans, pos)
    }

    fn infraspecific(&mut self, spans: Spans, pos: usize) -> Attempt {
        let s = self.s;
        let skips: Vec<usize> = s[pos..]
            .char_indices()
            .map(|(i, _)| pos + i)
            .chain(std::iter::once(s.len()))
            .collect();
        for skip in skips {
            self.deadline.check()?;
            // an optional superfluous epithet
            let mut intermediates: Vec<(Option<Span>, usize)> = Vec::new();
            if char_at(s, skip) == Some(' ') {
                let start = skip + 1;
                let mut bodies = vec![start];
                let after_hybrid = skip_hybrid(s, start);
                if after_hybrid != start {
                    bodies.insert(0, after_hybrid);
                }
                for body in bodies {
                    for end in epithet_ends(s, body) {
                        intermediates.push((Some((skip, end)), end));
                    }
                }
            }
            intermediates.push((None, skip));

            for (superfluous, after_superfluous) in intermediates {
                let mut spaced = Vec::with_capacity(2);
                if char_at(s, after_superfluous) == Some(' ') {
                    spaced.push(after_superfluous + 1);
                }
                spaced.push(after_superfluous);
                for q in spaced {
                    let mut qualified = Vec::with_capacity(2);
                    if let Some((qualifier, end)) = qualifier_at(s, q) {
                        qualified.push((Some(qualifier), end));
                    }
                    qualified.push((None, q));
                    for (qualifier, r) in qualified {
                        let mut marker_starts = Vec::with_capacity(2);
                        if is_dot_or_space(char_at(s, r)) {
                            marker_starts.push(r + 1);
                        }
                        marker_starts.push(r);
                        for m in marker_starts {
                            let mut markers: Vec<(Option<Span>, usize)> = rank_marker_ends(s, m)
                                .into_iter()
                                .map(|end| (Some((m, end)), end))
                                .collect();
                            markers.push((None, m));
                            for (marker, marker_end) in markers {
                                if !is_dot_or_space(char_at(s, marker_end)) {
                                    continue;
                                }
                                let epithet_start = marker_end + 1;
                                if let Some(found) = self.infraspecific_epithet(
                                    Spans {
                                        superfluous_epithet: superfluous,
                                        infraspecific_qualifier: qualifier,
                                        infraspecific_marker: marker,
                                        ..spans
                                    },
                                    epithet_start,
                                )? {
                                    return Ok(Some(found));
                                }
                            }
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn infraspecific_epithet(&mut self, spans: Spans, start: usize) -> Attempt {
        let s = self.s;
        let mut hybrid = vec![start];
        let after_hybrid = skip_hybrid(s, start);
        if after_hybrid != start {
            hybrid.insert(0, after_hybrid);
        }
        for h in hybrid {
            let mut quoted = vec![h];
            if char_at(s, h) == Some('"') {
                quoted.insert(0, h + 1);
            }
            for body in quoted {
                if AUTHOR_SUFFIX_START.is_match(&s[body..]) {
                    continue;
                }
                for end in epithet_ends(s, body) {
                    let mut closings = vec![end];
                    if char_at(s, end) == Some('"') {
                        closings.insert(0, end + 1);
                    }
                    for closing in closings {
                        let next = Spans {
                            infraspecific_epithet: Some((start, closing)),
                            ..spans
                        };
                        if let Some(m) = self.microbial(next, closing)? {
                            return Ok(Some(m));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    fn microbial(&mut self, spans: Spans, pos: usize) -> Attempt {
        let s = self.s;
        if char_at(s, pos) == Some(' ') {
            if let Some(marker_end) = microbial_marker_end(s, pos + 1) {
                if is_dot_or_space(char_at(s, marker_end)) {
                    let epithet_start = marker_end + 1;
                    let epithet_end = run_end(s, epithet_start, |c| !c.is_whitespace());
                    if epithet_end > epithet_start {
                        let next = Spans {
                            microbial_marker: Some((pos + 1, marker_end)),
                            microbial_epithet: Some((epithet_start, epithet_end)),
                            ..spans
                        };
                        if let Some(m) = self.indet(next, epithet_end)? {
                            return Ok(Some(m));
                        }
                    }
                }
            }
        }
        self.indet(spans, pos)
    }

    fn indet(&mut self, spans: Spans, pos: usize) -> Attempt {
        let s = self.s;
        if is_dot_or_space(char_at(s, pos)) {
            for end in rank_marker_ends(s, pos + 1) {
                let next = Spans {
                    indet_marker: Some((pos, end)),
                    ..spans
                };
                if let Some(m) = self.authorship(next, end)? {
                    return Ok(Some(m));
                }
            }
        }
        self.authorship(spans, pos)
    }

    fn authorship(&mut self, spans: Spans, pos: usize) -> Attempt {
        self.deadline.check()?;
        let (s, mode) = (self.s, self.mode);
        let found = self
            .authorships
            .entry(pos)
            .or_insert_with(|| match_block(s, pos, mode))
            .clone();
        Ok(found.map(|(block, end)| self.build(spans, block, end)))
    }

    fn build(&self, spans: Spans, authorship: AuthorshipBlock, end: usize) -> NameMatch {
        let text = |span: Option<Span>| span.map(|(a, b)| self.s[a..b].to_string());
        NameMatch {
            monomial: self.s[spans.genus.0..spans.genus.1].to_string(),
            subgenus: text(spans.subgenus),
            infrageneric_marker: text(spans.infrageneric_marker),
            infrageneric_epithet: text(spans.infrageneric_epithet),
            species_qualifier: text(spans.species_qualifier),
            specific_epithet: text(spans.specific_epithet),
            superfluous_epithet: text(spans.superfluous_epithet),
            infraspecific_qualifier: text(spans.infraspecific_qualifier),
            infraspecific_marker: text(spans.infraspecific_marker),
            infraspecific_epithet: text(spans.infraspecific_epithet),
            microbial_marker: text(spans.microbial_marker),
            microbial_epithet: text(spans.microbial_epithet),
            indet_marker: text(spans.indet_marker),
            authorship,
            remainder: (end < self.s.len()).then(|| self.s[end..].to_string()),
        }
    }
}

/// Matches a strongly normalized name against the structural grammar.
pub fn match_name(name: &str, mode: MatchMode, deadline: &Deadline) -> Result<Option<NameMatch>, Interrupted> {
    let mut matcher = Matcher {
        s: name,
        mode,
        deadline,
        authorships: HashMap::new(),
    };
    let found = matcher.run()?;
    if let Some(m) = &found {
        debug!("{:?} match for {}: {:?}", mode, name, m);
    }
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(name: &str) -> Option<NameMatch> {
        match_name(name, MatchMode::Full, &Deadline::unbounded()).unwrap()
    }

    #[test]
    fn test_monomial_end() {
        assert_eq!(monomial_end("Abies alba", 0), Some(5));
        assert_eq!(monomial_end("A.alba", 0), Some(2));
        assert_eq!(monomial_end("Hieracium-Pilosella x", 0), Some(19));
        assert_eq!(monomial_end("abies", 0), None);
    }

    #[test]
    fn test_epithet_ends() {
        assert_eq!(epithet_ends("alba Mill.", 0), vec![4]);
        assert_eq!(epithet_ends("alba-nana", 0), vec![9, 4]);
        assert_eq!(epithet_ends("3-costata", 0), vec![9]);
        assert!(epithet_ends("var alba", 0).is_empty());
        assert!(epithet_ends("serovar", 0).is_empty());
        assert!(epithet_ends("von", 0).is_empty());
        assert!(epithet_ends("Alba", 0).is_empty());
    }

    #[test]
    fn test_rank_marker_ends() {
        assert!(rank_marker_ends("subsp.alba", 0).contains(&5));
        assert!(rank_marker_ends("nothovar.alba", 0).contains(&8));
        assert!(rank_marker_ends("hort.ex Pax", 0).is_empty());
        // "sp" right after "f." is the forma specialis marker, not species
        let s = "f.sp.alba";
        assert!(!rank_marker_ends(s, 2).contains(&4));
    }

    #[test]
    fn test_binomial_with_author() {
        let m = full("Abies alba Mill.").unwrap();
        assert_eq!(m.monomial, "Abies");
        assert_eq!(m.specific_epithet.as_deref(), Some("alba"));
        assert_eq!(m.authorship.combination.authors.as_deref(), Some("Mill."));
        assert_eq!(m.remainder, None);
    }

    #[test]
    fn test_uninomial() {
        let m = full("Asteraceae").unwrap();
        assert_eq!(m.monomial, "Asteraceae");
        assert_eq!(m.specific_epithet, None);
    }

    #[test]
    fn test_infraspecific_with_basionym() {
        let m = full("Poa pratensis subsp.anceps(Gaudin)Dumort.,1824").unwrap();
        assert_eq!(m.specific_epithet.as_deref(), Some("pratensis"));
        assert_eq!(m.infraspecific_marker.as_deref(), Some("subsp"));
        assert_eq!(m.infraspecific_epithet.as_deref(), Some("anceps"));
        assert_eq!(m.authorship.basionym.authors.as_deref(), Some("Gaudin"));
        assert_eq!(m.authorship.combination.authors.as_deref(), Some("Dumort."));
        assert_eq!(m.authorship.combination.year.as_deref(), Some("1824"));
    }

    #[test]
    fn test_bracket_subgenus() {
        let m = full("Abies(Pinus)alba").unwrap();
        assert_eq!(m.subgenus.as_deref(), Some("Pinus"));
        assert_eq!(m.specific_epithet.as_deref(), Some("alba"));
    }

    #[test]
    fn test_infrageneric_marker() {
        let m = full("Abies sect.Piceae").unwrap();
        assert_eq!(m.infrageneric_marker.as_deref(), Some("sect"));
        assert_eq!(m.infrageneric_epithet.as_deref(), Some("Piceae"));
    }

    #[test]
    fn test_basionym_with_year() {
        let m = full("Zophosis persis(Chatanay 1914)").unwrap();
        assert_eq!(m.specific_epithet.as_deref(), Some("persis"));
        assert_eq!(m.authorship.basionym.authors.as_deref(), Some("Chatanay"));
        assert_eq!(m.authorship.basionym.year.as_deref(), Some("1914"));
        assert_eq!(m.authorship.combination.authors, None);
    }

    #[test]
    fn test_microbial_rank() {
        let m = full("Pseudomonas syringae pv.aceris").unwrap();
        assert_eq!(m.specific_epithet.as_deref(), Some("syringae"));
        // pv. is read as an infraspecific marker before the microbial block
        let marker = m.infraspecific_marker.or(m.microbial_marker);
        assert!(marker.is_some_and(|m| m.starts_with("pv")));
    }

    #[test]
    fn test_prefix_mode_returns_remainder() {
        assert!(full("Abies alba 12345").is_none());
        let m = match_name("Abies alba 12345", MatchMode::Prefix, &Deadline::unbounded())
            .unwrap()
            .unwrap();
        assert_eq!(m.specific_epithet.as_deref(), Some("alba"));
        assert_eq!(m.remainder.as_deref(), Some(" 12345"));
    }

    #[test]
    fn test_cancelled_deadline_interrupts() {
        let deadline = Deadline::unbounded();
        deadline.cancel();
        let result = match_name("Abies alba Mill.", MatchMode::Full, &deadline);
        assert_eq!(result, Err(Interrupted));
    }
}
