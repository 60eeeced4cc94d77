//! Extraction of notes and references that are not part of the name.
//!
//! Each extractor removes the recognized fragment from the working string
//! and stores it on the [`ParsedName`]:
//! - nomenclatural references (journal titles, volume:page citations)
//! - placeholder authors like "unknown"
//! - nomenclatural status notes such as "nom. illeg." or "sp. nov."
//! - sensu and auct. taxonomic notes
//! - "in" and "apud" publication references
//!
//! The detectors at the bottom recognize strings that cannot be parsed at all.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

use super::normalize::norm_note;
use super::patterns::{AUTHOR_TEAM, MANUSCRIPT_STATUS, NOV_RANKS, PLACEHOLDER_NAME, YEAR_LOOSE};
use super::post::set_rank;
use crate::models::{NameType, ParsedName, warnings};

static NOM_REFS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[,;.]?[\p{Lu}\p{Ll}\s]*\b(?:Proceedings|Journal|Annals|Bulletin|Systematics|Taxonomy|Series|Memoirs|Mitteilungen|Berichte)\b.+$").unwrap()
});

/// Volume and page citations like `4(2): 611 ...`.
static NOM_REF_VOLUME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[,;.]?[\p{Lu}\p{Ll}\s]*\b\d+\s*(?:\(\d+\))?:\s*\d+\b.+$").unwrap()
});

static BAD_AUTHORSHIP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?:\b(?:not\s|un)(?:applicable|given|known|specified|certain)|missing|\?)(?:[, ]+({}))?$",
        &*YEAR_LOOSE
    ))
    .unwrap()
});

static EXTRACT_NOMSTATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        concat!(
            r"[;, ]?[(\[]?\b(",
            r"(?:comb|{nov})[. ]nov\b[. ]?(?:ined[. ])?",
            r"|{ms}",
            r"|orth[. ](?:var|error)",
            r"|nom(?:en)?[. ](?:utiq(?:ue)?[. ])?",
            r"(?:ambig|alter|alt|correct|cons|dubium|dub|herb|illeg|invalid|inval|negatum|neg|novum|nov|nudum|nud|oblitum|obl|praeoccup|prov|prot|transf|superfl|super|rejic|rej)\b[. ]?",
            r"(?:prop[. ]|proposed\b)?",
            r")[)\]]?"
        ),
        nov = NOV_RANKS,
        ms = MANUSCRIPT_STATUS,
    ))
    .unwrap()
});

static NOV_RANK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b({NOV_RANKS})\b")).unwrap());

static MANUSCRIPT_STATUS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MANUSCRIPT_STATUS).unwrap());

static EXTRACT_SENSU: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"[;, ]?(?:\b|^)(",
        r"(?:(?:excl[. ](?:gen|sp|var)|mut.char|p.p)[. ])?",
        r"\(?(?:",
        r"ss?[. ](?:(?:ampl|l|s|str)[. ]|(?:ampl|lat|strict)(?:[uo]|issimo)?)",
        r"|(?:(?:ss[. ])?[aA]uctt?|[eE]mend|[fF]ide|[nN]on|not|[nN]ec|[sS]ec|[sS]ensu|[aA]ccording to)(?:[. (]|\.?$).*",
        r")\)?)"
    ))
    .unwrap()
});

static REPL_IN_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[, ]?\b(in|IN|apud) ({})(.*?)$", &*AUTHOR_TEAM)).unwrap()
});

/// "N. N." (nomen nescio) or placeholder vocabulary anywhere in the name.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^N\.\s*N\.|\b{PLACEHOLDER_NAME}\b")).unwrap()
});

static INFORMAL_UNPARSABLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i) clade\b").unwrap());

static IS_VIRUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)virus(?:es)?\b|\b(?:",
        r"(?:bacterio|viro)?phage(?:in|s)?|particles?|prion|replicon",
        r"|(?:alpha|beta|circular) ?satellites|[a-z]+satellite|vector|viroid|ictv$",
        r")\b"
    ))
    .unwrap()
});

/// Virus acronyms like NPV or GV.
static IS_VIRUS_ACRONYM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?::?[MS]?NP|G)V\b").unwrap());

static IS_VIRUS_POSTFAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bvector\b").unwrap());

fn lower_first(s: String) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => s,
    }
}

/// Strips a trailing nomenclatural reference into `unparsed`.
///
/// Returns `None` if the name carries no reference.
pub fn preparse_nom_ref(name: &str, pn: &mut ParsedName) -> Option<String> {
    let m = NOM_REFS.find(name).or_else(|| NOM_REF_VOLUME.find(name))?;
    pn.unparsed = Some(m.as_str().to_string());
    pn.add_warning(warnings::NOMENCLATURAL_REFERENCE);
    Some(format!("{}{}", &name[..m.start()], &name[m.end()..]))
}

/// Removes placeholder authors like "unknown" or "not given", keeping a year.
pub fn remove_placeholder_author(name: &str, pn: &mut ParsedName) -> String {
    match BAD_AUTHORSHIP.find(name) {
        // a lone "?" is left for the question mark handling
        Some(m) if m.as_str().chars().count() > 2 => {
            pn.add_warning(warnings::AUTHORSHIP_REMOVED);
            BAD_AUTHORSHIP.replace(name, " ${1}").into_owned()
        }
        _ => name.to_string(),
    }
}

/// Moves nomenclatural status notes into the nomenclatural note.
///
/// A rank found in a "nov." note like "sp. nov." becomes the rank and
/// manuscript notes like "ined." set the manuscript flag.
pub fn extract_nom_status(name: &str, pn: &mut ParsedName) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last = 0;
    for caps in EXTRACT_NOMSTATUS.captures_iter(name) {
        let (Some(whole), Some(note)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let note = note.as_str().trim();
        if note.is_empty() {
            continue;
        }
        pn.add_nomenclatural_note(note);
        out.push_str(&name[last..whole.start()]);
        out.push(' ');
        last = whole.end();

        if let Some(rank) = NOV_RANK_MARKER.captures(note).and_then(|c| c.get(1)) {
            set_rank(pn, Some(rank.as_str()), true);
        }
        if MANUSCRIPT_STATUS_PATTERN.is_match(note) {
            pn.manuscript = true;
        }
    }
    out.push_str(&name[last..]);
    out
}

/// Moves sensu, auct., non and similar concept references into the taxonomic note.
pub fn extract_sec_reference(name: &str, pn: &mut ParsedName) -> String {
    let Some(caps) = EXTRACT_SENSU.captures(name) else {
        return name.to_string();
    };
    if let Some(note) = caps.get(1) {
        pn.taxonomic_note = norm_note(note.as_str()).map(lower_first);
    }
    EXTRACT_SENSU.replace(name, "").into_owned()
}

/// Moves "in Author, Reference" citations into `published_in`.
pub fn extract_published_in(name: &str, pn: &mut ParsedName) -> String {
    let Some(caps) = REPL_IN_REF.captures(name) else {
        return name.to_string();
    };
    let team = caps.get(2).map_or("", |m| m.as_str());
    let rest = caps.get(3).map_or("", |m| m.as_str());
    pn.published_in = norm_note(&format!("{team}{rest}"));
    REPL_IN_REF.replace(name, NoExpand(rest)).into_owned()
}

// ── Unparsable names ──

/// Placeholders and clades that cannot be parsed any further.
pub fn detect_further_unparsable(name: &str) -> Option<NameType> {
    if PLACEHOLDER.is_match(name) {
        Some(NameType::Placeholder)
    } else if INFORMAL_UNPARSABLE.is_match(name) {
        Some(NameType::Informal)
    } else {
        None
    }
}

pub fn is_virus(name: &str) -> bool {
    IS_VIRUS.is_match(name) || IS_VIRUS_ACRONYM.is_match(name)
}

/// Virus vocabulary only trusted once the grammar failed.
pub fn is_virus_after_failure(name: &str) -> bool {
    IS_VIRUS_POSTFAIL.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rank;

    #[test]
    fn test_preparse_nom_ref() {
        let mut pn = ParsedName::new();
        let name = preparse_nom_ref("Abies alba Mill., Proceedings of the Zoological Society 3", &mut pn);
        assert_eq!(name.as_deref(), Some("Abies alba Mill."));
        assert_eq!(
            pn.unparsed.as_deref(),
            Some(", Proceedings of the Zoological Society 3")
        );
        assert_eq!(pn.warnings, vec![warnings::NOMENCLATURAL_REFERENCE]);

        let mut pn = ParsedName::new();
        assert_eq!(preparse_nom_ref("Abies alba Mill.", &mut pn), None);
        assert!(pn.unparsed.is_none());
    }

    #[test]
    fn test_nom_ref_volume() {
        let mut pn = ParsedName::new();
        let name = preparse_nom_ref("Abies alba Mill., 4(2): 611 pp", &mut pn);
        assert_eq!(name.as_deref(), Some("Abies alba Mill."));
    }

    #[test]
    fn test_remove_placeholder_author() {
        let mut pn = ParsedName::new();
        assert_eq!(
            remove_placeholder_author("Abies alba unknown, 1887", &mut pn).trim_end(),
            "Abies alba  1887"
        );
        assert_eq!(pn.warnings, vec![warnings::AUTHORSHIP_REMOVED]);

        let mut pn = ParsedName::new();
        assert_eq!(remove_placeholder_author("Abies alba ?", &mut pn), "Abies alba ?");
        assert!(pn.warnings.is_empty());
    }

    #[test]
    fn test_extract_nom_status() {
        let mut pn = ParsedName::new();
        // status notes are extracted from normalized names
        let name = extract_nom_status("Abies alba Mill.,nom.illeg.", &mut pn);
        assert_eq!(name.trim(), "Abies alba Mill.");
        assert_eq!(pn.nomenclatural_note.as_deref(), Some("nom.illeg."));
        assert!(!pn.manuscript);

        let mut pn = ParsedName::new();
        let name = extract_nom_status("Abies alba sp.nov.", &mut pn);
        assert_eq!(name.trim(), "Abies alba");
        assert_eq!(pn.nomenclatural_note.as_deref(), Some("sp.nov."));
        assert_eq!(pn.rank, Rank::Species);

        let mut pn = ParsedName::new();
        extract_nom_status("Abies alba ined.", &mut pn);
        assert!(pn.manuscript);
    }

    #[test]
    fn test_extract_sec_reference() {
        let mut pn = ParsedName::new();
        let name = extract_sec_reference("Abies alba sensu Smith", &mut pn);
        assert_eq!(name, "Abies alba");
        assert_eq!(pn.taxonomic_note.as_deref(), Some("sensu Smith"));

        let mut pn = ParsedName::new();
        let name = extract_sec_reference("Abies alba Auct. non Mill.", &mut pn);
        assert_eq!(name, "Abies alba");
        assert_eq!(pn.taxonomic_note.as_deref(), Some("auct. non Mill."));
    }

    #[test]
    fn test_extract_published_in() {
        let mut pn = ParsedName::new();
        let name = extract_published_in("Abies alba Mill. in Miller", &mut pn);
        assert_eq!(name, "Abies alba Mill.");
        assert_eq!(pn.published_in.as_deref(), Some("Miller"));
    }

    #[test]
    fn test_unparsable_detection() {
        assert_eq!(detect_further_unparsable("Incertae sedis"), Some(NameType::Placeholder));
        assert_eq!(detect_further_unparsable("N. N."), Some(NameType::Placeholder));
        assert_eq!(detect_further_unparsable("Abies clade"), Some(NameType::Informal));
        assert_eq!(detect_further_unparsable("Abies alba"), None);

        assert!(is_virus("Tobacco mosaic virus"));
        assert!(is_virus("Cydia pomonella GV"));
        assert!(is_virus("Enterobacteria phage T4"));
        assert!(!is_virus("Abies alba"));
        assert!(is_virus_after_failure("cloning vector pUC19"));
    }
}
