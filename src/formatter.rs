//! Rendering of parsed names as canonical strings.
//!
//! All canonical forms are produced by [`build_name`] with a [`NameFormat`]
//! selecting the parts to show. Botanical infrageneric names use rank
//! markers while zoological ones are bracketed, and subspecies markers are
//! hidden for zoological names.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::{
    Authorship, HYBRID_MARKER, NamePart, NomCode, ParsedAuthorship, ParsedName, Rank,
};
use crate::unicode::{decompose, fold_to_ascii};

const NOTHO_PREFIX: &str = "notho";
const ET_AL: &str = "et al.";

static AL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^al\.?$").unwrap());

/// Switches for the name parts rendered by [`build_name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameFormat {
    pub hybrid_marker: bool,
    pub rank_marker: bool,
    pub authorship: bool,
    /// Show the genus of an infrageneric name.
    pub genus_for_infrageneric: bool,
    /// Show the subgenus of a species in brackets.
    pub infrageneric: bool,
    /// Expand ligatures like æ.
    pub decomposition: bool,
    pub ascii_only: bool,
    pub qualifier: bool,
    /// Show the rank marker of indetermined names like "Abies sp.".
    pub indet: bool,
    pub nom_note: bool,
    pub sensu: bool,
    pub cultivar: bool,
    pub strain: bool,
}

impl NameFormat {
    pub const CANONICAL: NameFormat = NameFormat {
        hybrid_marker: true,
        rank_marker: true,
        authorship: false,
        genus_for_infrageneric: true,
        infrageneric: false,
        decomposition: true,
        ascii_only: false,
        qualifier: true,
        indet: true,
        nom_note: false,
        sensu: false,
        cultivar: true,
        strain: true,
    };

    pub const CANONICAL_WITH_AUTHORSHIP: NameFormat = NameFormat {
        authorship: true,
        ..Self::CANONICAL
    };

    pub const MINIMAL: NameFormat = NameFormat {
        hybrid_marker: false,
        rank_marker: false,
        authorship: false,
        genus_for_infrageneric: false,
        infrageneric: false,
        decomposition: true,
        ascii_only: true,
        qualifier: false,
        indet: false,
        nom_note: false,
        sensu: false,
        cultivar: false,
        strain: false,
    };

    pub const COMPLETE: NameFormat = NameFormat {
        authorship: true,
        infrageneric: true,
        nom_note: true,
        sensu: true,
        ..Self::CANONICAL
    };
}

/// The name without authorship, e.g. "Abies alba subsp. alpina".
pub fn canonical_name(pn: &ParsedName) -> String {
    build_name(pn, &NameFormat::CANONICAL)
}

/// The canonical name followed by its full authorship.
///
/// Autonyms and indetermined names are rendered without authorship.
pub fn canonical_name_with_authorship(pn: &ParsedName) -> String {
    build_name(pn, &NameFormat::CANONICAL_WITH_AUTHORSHIP)
}

/// Genus and epithets only, in plain ASCII and without any markers.
pub fn canonical_name_minimal(pn: &ParsedName) -> String {
    build_name(pn, &NameFormat::MINIMAL)
}

/// Everything including the subgenus, the taxonomic and the nomenclatural notes.
pub fn canonical_name_complete(pn: &ParsedName) -> String {
    build_name(pn, &NameFormat::COMPLETE)
}

/// Full authorship of a name, e.g. "(L.) Mill., 1768".
pub fn authorship_complete(pn: &ParsedName) -> Option<String> {
    parsed_authorship_complete(&pn.authorship(), pn.code)
}

/// Full authorship of a standalone authorship parse.
pub fn parsed_authorship_complete(pa: &ParsedAuthorship, code: Option<NomCode>) -> Option<String> {
    let mut sb = String::new();
    append_full_authorship(&mut sb, pa, code);
    (!sb.is_empty()).then_some(sb)
}

/// Renders the authors with ex authors and optionally the year.
pub fn author_string(auth: &Authorship, include_year: bool, code: Option<NomCode>) -> Option<String> {
    let mut sb = String::new();
    append_authorship(&mut sb, auth, include_year, code);
    (!sb.is_empty()).then_some(sb)
}

fn is_unknown(rank: Rank) -> bool {
    rank.is_other_or_unranked()
}

fn is_infraspecific_marker(rank: Rank) -> bool {
    rank.is_infraspecific() && !rank.is_uncomparable()
}

fn is_not_zoo(code: Option<NomCode>) -> bool {
    code.is_some_and(|c| c != NomCode::Zoological)
}

fn push_hybrid(sb: &mut String) {
    sb.push(HYBRID_MARKER);
    sb.push(' ');
}

/// Returns true if a marker was added.
fn append_rank_marker(sb: &mut String, rank: Rank, notho: bool) -> bool {
    match rank.marker() {
        Some(marker) => {
            if notho {
                sb.push_str(NOTHO_PREFIX);
            }
            sb.push_str(marker);
            true
        }
        None => false,
    }
}

fn append_qualifier(sb: &mut String, pn: &ParsedName, part: NamePart, fmt: &NameFormat) {
    if fmt.qualifier {
        if let Some(qualifier) = pn.epithet_qualifier.get(&part) {
            sb.push_str(qualifier);
            sb.push(' ');
        }
    }
}

fn append_genus(sb: &mut String, pn: &ParsedName, fmt: &NameFormat) {
    append_qualifier(sb, pn, NamePart::Generic, fmt);
    if fmt.hybrid_marker && pn.notho == Some(NamePart::Generic) {
        push_hybrid(sb);
    }
    if let Some(genus) = &pn.genus {
        sb.push_str(genus);
    }
}

fn append_infraspecific(sb: &mut String, pn: &ParsedName, fmt: &NameFormat, force_rank_marker: bool) {
    sb.push(' ');
    append_qualifier(sb, pn, NamePart::Infraspecific, fmt);
    if fmt.hybrid_marker && pn.notho == Some(NamePart::Infraspecific) {
        if fmt.rank_marker && is_infraspecific_marker(pn.rank) {
            sb.push_str(NOTHO_PREFIX);
        } else {
            push_hybrid(sb);
        }
    }
    // zoological subspecies go without marker
    let show_marker = force_rank_marker
        || (fmt.rank_marker
            && (is_not_zoo(pn.code) || pn.rank != Rank::Subspecies || pn.is_hybrid_name()));
    if show_marker
        && is_infraspecific_marker(pn.rank)
        && append_rank_marker(sb, pn.rank, false)
        && pn.infraspecific_epithet.is_some()
    {
        sb.push(' ');
    }
    if let Some(epithet) = &pn.infraspecific_epithet {
        sb.push_str(epithet);
    }
}

/// Builds a name string from its parts as selected by `fmt`.
pub fn build_name(pn: &ParsedName, fmt: &NameFormat) -> String {
    let mut sb = String::new();
    let mut authorship = fmt.authorship;

    if pn.candidatus {
        sb.push_str("\"Candidatus ");
    }

    if let Some(uninomial) = &pn.uninomial {
        if fmt.hybrid_marker && pn.notho == Some(NamePart::Generic) {
            push_hybrid(&mut sb);
        }
        sb.push_str(uninomial);
    } else {
        if let Some(infrageneric) = &pn.infrageneric_epithet {
            if (is_unknown(pn.rank) && pn.specific_epithet.is_none())
                || pn.rank.is_infrageneric_strictly()
            {
                // the infrageneric epithet is the terminal part
                let mut show_infrageneric = true;
                if pn.genus.is_some() && fmt.genus_for_infrageneric {
                    append_genus(&mut sb, pn, fmt);
                    sb.push(' ');
                    if pn.code == Some(NomCode::Zoological) {
                        sb.push('(');
                        if fmt.hybrid_marker && pn.notho == Some(NamePart::Infrageneric) {
                            push_hybrid(&mut sb);
                        }
                        sb.push_str(infrageneric);
                        sb.push(')');
                        show_infrageneric = false;
                    }
                }
                if show_infrageneric {
                    let notho = fmt.hybrid_marker && pn.notho == Some(NamePart::Infrageneric);
                    if fmt.rank_marker && append_rank_marker(&mut sb, pn.rank, notho) {
                        sb.push(' ');
                    }
                    sb.push_str(infrageneric);
                }
            } else {
                if pn.genus.is_some() {
                    append_genus(&mut sb, pn, fmt);
                }
                if fmt.infrageneric {
                    sb.push_str(" (");
                    sb.push_str(infrageneric);
                    sb.push(')');
                }
            }
        } else if pn.genus.is_some() {
            append_genus(&mut sb, pn, fmt);
        }

        match &pn.specific_epithet {
            None => {
                if fmt.indet && pn.genus.is_some() && pn.cultivar_epithet.is_none() {
                    if pn.rank.is_species_or_below() {
                        if pn.rank.is_infraspecific() {
                            append_infraspecific(&mut sb, pn, fmt, true);
                        } else if let Some(marker) = pn.rank.marker() {
                            sb.push(' ');
                            sb.push_str(marker);
                        }
                        authorship = false;
                    }
                } else if pn.infraspecific_epithet.is_some() {
                    append_infraspecific(&mut sb, pn, fmt, false);
                }
            }
            Some(specific) => {
                sb.push(' ');
                append_qualifier(&mut sb, pn, NamePart::Specific, fmt);
                if fmt.hybrid_marker && pn.notho == Some(NamePart::Specific) {
                    push_hybrid(&mut sb);
                }
                sb.push_str(specific);

                if pn.infraspecific_epithet.is_none() {
                    // a cultivar rank is only indetermined without cultivar epithet
                    if fmt.indet
                        && pn.rank.is_infraspecific()
                        && (!pn.rank.is_cultivar_rank() || pn.cultivar_epithet.is_none())
                    {
                        if pn.rank == Rank::Subspecies {
                            sb.push_str(" ssp.");
                        } else if let Some(marker) = pn.rank.marker() {
                            sb.push(' ');
                            sb.push_str(marker);
                        }
                        authorship = false;
                    }
                } else {
                    append_infraspecific(&mut sb, pn, fmt, false);
                    if pn.is_autonym() {
                        authorship = false;
                    }
                }
            }
        }
    }

    if pn.candidatus {
        sb.push('"');
    }

    if authorship && pn.has_authorship() {
        sb.push(' ');
        append_full_authorship(&mut sb, &pn.authorship(), pn.code);
    }

    if fmt.strain {
        if let Some(strain) = &pn.strain {
            sb.push(' ');
            sb.push_str(strain);
        }
    }

    if fmt.cultivar {
        if let Some(cultivar) = &pn.cultivar_epithet {
            match pn.rank {
                Rank::CultivarGroup => {
                    sb.push(' ');
                    sb.push_str(cultivar);
                    sb.push_str(" Group");
                }
                Rank::Grex => {
                    sb.push(' ');
                    sb.push_str(cultivar);
                    sb.push_str(" gx");
                }
                _ => {
                    sb.push_str(" '");
                    sb.push_str(cultivar);
                    sb.push('\'');
                }
            }
        }
    }

    if fmt.sensu {
        if let Some(note) = &pn.taxonomic_note {
            if !sb.is_empty() {
                sb.push(' ');
            }
            sb.push_str(note);
        }
    }

    if fmt.nom_note {
        if let Some(note) = &pn.nomenclatural_note {
            if !sb.is_empty() {
                sb.push_str(", ");
            }
            sb.push_str(note);
        }
    }

    let mut name = sb.trim().to_string();
    if fmt.decomposition {
        name = decompose(&name);
    }
    if fmt.ascii_only {
        name = fold_to_ascii(&name);
    }
    name
}

/// Joins authors as "A, B & C", collapsing to "A et al." above `max_authors`.
fn join_authors(authors: &[String], max_authors: Option<usize>) -> String {
    match authors {
        [] => String::new(),
        [first, ..] if max_authors.is_some_and(|max| authors.len() > max) => {
            format!("{} {}", first, ET_AL)
        }
        [single] => single.clone(),
        [init @ .., last] => {
            let head = init.join(", ");
            if AL.is_match(last) {
                format!("{} {}", head, ET_AL)
            } else {
                format!("{} & {}", head, last)
            }
        }
    }
}

fn append_authorship(sb: &mut String, auth: &Authorship, include_year: bool, code: Option<NomCode>) {
    if !auth.exists() {
        return;
    }
    let max_authors = (code == Some(NomCode::Bacterial)).then_some(2);
    let mut authors_appended = false;
    if auth.has_ex_authors() {
        sb.push_str(&join_authors(&auth.ex_authors, max_authors));
        sb.push_str(" ex ");
        authors_appended = true;
    }
    if auth.has_authors() {
        sb.push_str(&join_authors(&auth.authors, max_authors));
        authors_appended = true;
    }
    if let Some(year) = auth.year.as_deref().filter(|_| include_year) {
        if authors_appended {
            if code != Some(NomCode::Bacterial) {
                sb.push(',');
            }
            sb.push(' ');
        }
        sb.push_str(year);
    }
}

fn append_full_authorship(sb: &mut String, pa: &ParsedAuthorship, code: Option<NomCode>) {
    let start = sb.len();
    if pa.basionym_authorship.exists() {
        sb.push('(');
        append_authorship(sb, &pa.basionym_authorship, true, code);
        sb.push(')');
    }
    if pa.combination_authorship.exists() {
        if sb.len() > start {
            sb.push(' ');
        }
        append_authorship(sb, &pa.combination_authorship, true, code);
        if let Some(sanctioning) = &pa.sanctioning_author {
            sb.push_str(" : ");
            sb.push_str(sanctioning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(genus: &str, specific: Option<&str>, rank: Rank) -> ParsedName {
        let mut pn = ParsedName::new();
        pn.genus = Some(genus.to_string());
        pn.specific_epithet = specific.map(str::to_string);
        pn.rank = rank;
        pn
    }

    #[test]
    fn test_binomial_with_authorship() {
        let mut pn = name("Abies", Some("alba"), Rank::Species);
        pn.basionym_authorship = Authorship::authors(["L."]);
        pn.combination_authorship = Authorship::authors(["Mill."]).with_year("1768");
        assert_eq!(canonical_name(&pn), "Abies alba");
        assert_eq!(
            canonical_name_with_authorship(&pn),
            "Abies alba (L.) Mill., 1768"
        );
        assert_eq!(authorship_complete(&pn).as_deref(), Some("(L.) Mill., 1768"));
    }

    #[test]
    fn test_infraspecific_markers() {
        let mut pn = name("Abies", Some("alba"), Rank::Subspecies);
        pn.infraspecific_epithet = Some("alpina".to_string());
        pn.code = Some(NomCode::Botanical);
        assert_eq!(canonical_name(&pn), "Abies alba subsp. alpina");
        assert_eq!(canonical_name_minimal(&pn), "Abies alba alpina");

        pn.code = Some(NomCode::Zoological);
        assert_eq!(canonical_name(&pn), "Abies alba alpina");

        pn.rank = Rank::Variety;
        assert_eq!(canonical_name(&pn), "Abies alba var. alpina");

        pn.notho = Some(NamePart::Infraspecific);
        assert_eq!(canonical_name(&pn), "Abies alba nothovar. alpina");
    }

    #[test]
    fn test_autonym_has_no_authorship() {
        let mut pn = name("Abies", Some("alba"), Rank::Subspecies);
        pn.infraspecific_epithet = Some("alba".to_string());
        pn.code = Some(NomCode::Botanical);
        pn.combination_authorship = Authorship::authors(["Mill."]);
        assert_eq!(canonical_name_with_authorship(&pn), "Abies alba subsp. alba");
    }

    #[test]
    fn test_indetermined_names() {
        let pn = name("Abies", None, Rank::Species);
        assert_eq!(canonical_name(&pn), "Abies sp.");
        assert_eq!(canonical_name_minimal(&pn), "Abies");

        let pn = name("Abies", Some("alba"), Rank::Subspecies);
        assert_eq!(canonical_name(&pn), "Abies alba ssp.");
    }

    #[test]
    fn test_infrageneric_names() {
        let mut pn = name("Abies", None, Rank::Section);
        pn.infrageneric_epithet = Some("Pinus".to_string());
        pn.code = Some(NomCode::Botanical);
        assert_eq!(canonical_name(&pn), "Abies sect. Pinus");

        pn.code = Some(NomCode::Zoological);
        pn.rank = Rank::Subgenus;
        assert_eq!(canonical_name(&pn), "Abies (Pinus)");

        let mut pn = name("Abies", Some("alba"), Rank::Species);
        pn.infrageneric_epithet = Some("Pinus".to_string());
        assert_eq!(canonical_name(&pn), "Abies alba");
        assert_eq!(canonical_name_complete(&pn), "Abies (Pinus) alba");
    }

    #[test]
    fn test_hybrids_cultivars_and_candidatus() {
        let mut pn = name("Abies", Some("alba"), Rank::Species);
        pn.notho = Some(NamePart::Specific);
        assert_eq!(canonical_name(&pn), "Abies × alba");

        let mut pn = name("Abies", Some("alba"), Rank::Cultivar);
        pn.cultivar_epithet = Some("Blue Star".to_string());
        assert_eq!(canonical_name(&pn), "Abies alba 'Blue Star'");

        let mut pn = ParsedName::new();
        pn.genus = Some("Rhododendron".to_string());
        pn.rank = Rank::CultivarGroup;
        pn.cultivar_epithet = Some("Ilam".to_string());
        assert_eq!(canonical_name(&pn), "Rhododendron Ilam Group");

        let mut pn = name("Liberibacter", Some("asiaticus"), Rank::Species);
        pn.candidatus = true;
        assert_eq!(canonical_name(&pn), "\"Candidatus Liberibacter asiaticus\"");
    }

    #[test]
    fn test_complete_name_with_notes() {
        let mut pn = name("Abies", Some("alba"), Rank::Species);
        pn.combination_authorship = Authorship::authors(["Mill."]);
        pn.taxonomic_note = Some("sensu Smith".to_string());
        pn.nomenclatural_note = Some("nom.illeg.".to_string());
        assert_eq!(
            canonical_name_complete(&pn),
            "Abies alba Mill. sensu Smith, nom.illeg."
        );
    }

    #[test]
    fn test_unicode_output() {
        let mut pn = ParsedName::new();
        pn.uninomial = Some("Linnæa".to_string());
        assert_eq!(canonical_name(&pn), "Linnaea");

        pn.uninomial = Some("Müllerina".to_string());
        assert_eq!(canonical_name(&pn), "Müllerina");
        assert_eq!(canonical_name_minimal(&pn), "Mullerina");
    }

    #[test]
    fn test_author_joining() {
        let auth = Authorship::new(
            vec!["Smith".into(), "Jones".into(), "Brown".into()],
            vec!["Hook.".into()],
            Some("1901".into()),
        );
        assert_eq!(
            author_string(&auth, true, Some(NomCode::Botanical)).as_deref(),
            Some("Hook. ex Smith, Jones & Brown, 1901")
        );
        assert_eq!(
            author_string(&auth, true, Some(NomCode::Bacterial)).as_deref(),
            Some("Hook. ex Smith et al. 1901")
        );
        assert_eq!(
            author_string(&Authorship::authors(["Smith", "al."]), false, None).as_deref(),
            Some("Smith et al.")
        );
        assert_eq!(author_string(&Authorship::default(), true, None), None);
    }

    #[test]
    fn test_sanctioning_author() {
        let mut pn = name("Agaricus", Some("campestris"), Rank::Species);
        pn.combination_authorship = Authorship::authors(["L."]);
        pn.sanctioning_author = Some("Fr.".to_string());
        assert_eq!(authorship_complete(&pn).as_deref(), Some("L. : Fr."));
    }
}
