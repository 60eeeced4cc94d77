//! Authorship grammar and author team splitting.
//!
//! An authorship block is `[(basionym authors[, year])] [combination
//! authors] [year]`, where each author part may carry ex authors and the
//! combination may carry a sanctioning author after a colon. The block is
//! matched either trailing a name ([`match_block`]) or as a standalone
//! string ([`match_standalone`]). Author teams are then split into single
//! authors in IPNI compact form, i.e. without spaces after initials.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::grammar::MatchMode;
use super::normalize::norm_punctuation;
use super::patterns::{YEAR_LOOSE, authorship};
use crate::models::Authorship;

fn block_pattern(end: &str) -> String {
    format!(
        r"[., ]?(?:\((?:{bas})?[, ]?(?P<by>{year})?\))?(?:{comb})?(?: ?\(?,?(?P<cy>{year})\)?)?{end}",
        bas = authorship("b"),
        comb = authorship("c"),
        year = &*YEAR_LOOSE,
    )
}

/// Authorship block that must run to the end of the name.
static BLOCK_FULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(&block_pattern("$")).unwrap());

/// Authorship block that may stop at any word boundary.
static BLOCK_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&block_pattern(r"(?:$|\b)")).unwrap());

static STANDALONE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^(?:\((?:{bas}\.?)?[, ]?(?P<by>{year})?\))?(?:{comb})?(?: ?\(?,?(?P<cy>{year})\)?)?(?P<rest>\b.*?)??$",
        bas = authorship("b"),
        comb = authorship("c"),
        year = &*YEAR_LOOSE,
    ))
    .unwrap()
});

/// "Smith, J." written surname first.
static AUTHOR_INITIAL_SWAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^,]+) *, *([^,]+)$").unwrap());

/// Surnames followed by unpunctuated initials, e.g. "Smith AB Jones C".
static SPACE_AUTHORTEAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Lu}\p{Ll}+ \p{Lu}+(?: \p{Lu}\p{Ll}+ \p{Lu}+)*$").unwrap()
});

static INITIALS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Lu}{1,2}(?:[. ]\p{Lu}{1,2}){0,2}\.?$").unwrap());

/// Raw captures of one author part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorGroups {
    pub ex_authors: Option<String>,
    pub authors: Option<String>,
    pub sanctioning_author: Option<String>,
    pub year: Option<String>,
}

impl AuthorGroups {
    fn from_captures(caps: &Captures, prefix: &str, year: &str) -> Self {
        let get = |name: &str| caps.name(name).map(|m| m.as_str().to_string());
        Self {
            ex_authors: get(&format!("{prefix}ex")),
            authors: get(&format!("{prefix}au")),
            sanctioning_author: get(&format!("{prefix}sa")),
            year: get(year),
        }
    }

    /// Splits the author teams and cleans the year.
    pub fn to_authorship(&self) -> Authorship {
        Authorship::new(
            self.authors.as_deref().map(split_team).unwrap_or_default(),
            self.ex_authors.as_deref().map(split_team).unwrap_or_default(),
            self.year.as_deref().and_then(clean_year),
        )
    }
}

/// Basionym and combination captures of an authorship block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorshipBlock {
    pub basionym: AuthorGroups,
    pub combination: AuthorGroups,
}

impl AuthorshipBlock {
    fn from_captures(caps: &Captures) -> Self {
        Self {
            basionym: AuthorGroups::from_captures(caps, "b", "by"),
            combination: AuthorGroups::from_captures(caps, "c", "cy"),
        }
    }
}

/// Matches an authorship block starting exactly at byte offset `pos`.
///
/// Returns the captures and the end offset of the block.
pub fn match_block(s: &str, pos: usize, mode: MatchMode) -> Option<(AuthorshipBlock, usize)> {
    let re = match mode {
        MatchMode::Full => &*BLOCK_FULL,
        MatchMode::Prefix => &*BLOCK_PREFIX,
    };
    let caps = re.captures_at(s, pos)?;
    let m = caps.get(0)?;
    if m.start() != pos {
        return None;
    }
    Some((AuthorshipBlock::from_captures(&caps), m.end()))
}

/// Matches a standalone authorship, returning the unmatched tail if any.
pub fn match_standalone(s: &str) -> Option<(AuthorshipBlock, Option<String>)> {
    let caps = STANDALONE.captures(s)?;
    let rest = caps
        .name("rest")
        .map(|m| m.as_str().trim().to_string())
        .filter(|r| !r.is_empty());
    Some((AuthorshipBlock::from_captures(&caps), rest))
}

/// Years need at least three characters, shorter values are dropped.
fn clean_year(year: &str) -> Option<String> {
    let year = year.trim();
    (year.chars().count() > 2).then(|| year.to_string())
}

/// Normalizes a single author name.
pub fn norm_author(author: &str, punctuation: bool) -> Option<String> {
    let author = if punctuation {
        norm_punctuation(author)
    } else {
        author.to_string()
    };
    let author = author.trim();
    (!author.is_empty()).then(|| author.to_string())
}

/// Appends a dot to each initial unless the initials are punctuated already.
fn norm_initials(initials: &str) -> String {
    if initials.ends_with('.') {
        return initials.to_string();
    }
    initials
        .chars()
        .filter(|c| c.is_alphabetic())
        .map(|c| format!("{c}."))
        .collect()
}

/// Joins surnames with trailing initials, "Brown,AB" becomes "A.B.Brown".
fn sanitize_authors<'a>(tokens: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut authors = Vec::new();
    let mut tokens = tokens.peekable();
    while let Some(token) = tokens.next() {
        let mut author = token.to_string();
        if author.chars().count() > 3 && !author.ends_with('.') {
            if let Some(next) = tokens.peek().filter(|n| INITIALS.is_match(n)) {
                author = norm_initials(next) + &author;
                tokens.next();
            }
        }
        authors.extend(norm_author(&author, true));
    }
    authors
}

/// Splits an author team into single authors.
pub fn split_team(team: &str) -> Vec<String> {
    if team.contains(';') {
        team.split(';')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .filter_map(|a| match AUTHOR_INITIAL_SWAP.captures(a) {
                Some(caps) => norm_author(&format!("{} {}", &caps[2], &caps[1]), true),
                None => norm_author(a, false),
            })
            .collect()
    } else if team.contains(',') || team.contains('&') {
        sanitize_authors(team.split([',', '&']).map(str::trim).filter(|a| !a.is_empty()))
    } else if SPACE_AUTHORTEAM.is_match(team) {
        sanitize_authors(team.split_whitespace())
    } else {
        norm_author(team, true).into_iter().collect()
    }
}
