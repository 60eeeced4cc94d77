//! Classification applied once the name parts are known.
//!
//! These stages never change the name parts themselves. They settle the
//! rank, the nomenclatural code and the name type and flag doubtful names.

use std::sync::LazyLock;

use regex::Regex;

use super::patterns::{BLACKLIST_EPITHETS, NAME_LETTERS, NAME_LETTERS_LC};
use super::rank_utils::{infer_rank, infer_rank_from_marker};
use crate::models::{HYBRID_MARKER, NamePart, NameType, NomCode, ParsedName, Rank, warnings};
use crate::unicode::ALPHA_DELTA;

/// Any character outside this set makes a name doubtful.
static DOUBTFUL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r#"^[{NAME_LETTERS}\p{{Lu}}{NAME_LETTERS_LC}\p{{Ll}}\-?{HYBRID_MARKER}{ALPHA_DELTA}":;&*+\s,.()\[\]/'`´0-9†]+$"#
    ))
    .unwrap()
});

static DOUBTFUL_NULL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bnull\b").unwrap());

/// Botanical divisions are phyla outside zoology.
fn division_to_phylum(rank: Rank) -> Option<Rank> {
    match rank {
        Rank::Superdivision => Some(Rank::Superphylum),
        Rank::Division => Some(Rank::Phylum),
        Rank::Subdivision => Some(Rank::Subphylum),
        Rank::Infradivision => Some(Rank::Infraphylum),
        _ => None,
    }
}

/// Sets the rank from a rank marker like "subsp." or "nothovar.".
///
/// Without `force` an already known rank is only refined, see
/// [`set_rank_if_not_contradicting`]. Markers starting with "subsp" imply
/// the botanical code and "notho" markers flag the hybrid name part.
pub fn set_rank(pn: &mut ParsedName, marker: Option<&str>, force: bool) {
    let Some(marker) = marker.map(str::trim).filter(|m| !m.is_empty()) else {
        return;
    };
    let Some(rank) = infer_rank_from_marker(marker).filter(|r| r.not_other_or_unranked()) else {
        return;
    };
    if force {
        pn.rank = rank;
    } else {
        set_rank_if_not_contradicting(pn, rank);
    }
    if marker.to_lowercase().starts_with("subsp") {
        pn.code = Some(NomCode::Botanical);
    }
    if marker.starts_with("notho") {
        let part = if rank.is_infraspecific() {
            Some(NamePart::Infraspecific)
        } else if rank == Rank::Species {
            Some(NamePart::Specific)
        } else if rank.is_infrageneric() {
            Some(NamePart::Infrageneric)
        } else if rank == Rank::Genus {
            Some(NamePart::Generic)
        } else {
            None
        };
        if part.is_some() {
            pn.notho = part;
        }
    }
}

/// Only vague ranks are replaced, and only by a rank within their range.
fn set_rank_if_not_contradicting(pn: &mut ParsedName, rank: Rank) {
    if !pn.rank.is_uncomparable() {
        return;
    }
    let fits = match pn.rank {
        Rank::InfragenericName => rank.is_infrageneric_strictly(),
        Rank::InfraspecificName => rank.is_infraspecific(),
        Rank::InfrasubspecificName => rank.is_infrasubspecific(),
        _ => true,
    };
    if fits {
        pn.rank = rank;
    }
}

/// Settles the name type of a parsable name, flagging suspicious combinations.
///
/// `normed_name` is the normalized name before strong normalization.
pub fn determine_name_type(pn: &mut ParsedName, name_type: &mut Option<NameType>, normed_name: &str) {
    if name_type.is_some_and(|t| !t.is_parsable()) {
        return;
    }

    let lowercase_start = normed_name.chars().next().is_some_and(char::is_lowercase);
    if pn.uninomial.is_some() && lowercase_start {
        pn.add_warning(warnings::LC_MONOMIAL);
        pn.doubtful = true;
        name_type.get_or_insert(NameType::Informal);
    } else if pn.rank.not_other_or_unranked() {
        if pn.is_indetermined() {
            *name_type = Some(NameType::Informal);
            pn.add_warning(warnings::INDETERMINED);
        } else if pn.rank.is_supraspecific()
            && (pn.specific_epithet.is_some() || pn.infraspecific_epithet.is_some())
        {
            pn.add_warning(warnings::RANK_MISMATCH);
            pn.doubtful = true;
            *name_type = Some(NameType::Informal);
        } else if !pn.rank.is_species_or_below() && pn.is_binomial() {
            pn.add_warning(warnings::HIGHER_RANK_BINOMIAL);
            pn.doubtful = true;
        }
    }

    if name_type.is_none() {
        let placeholder = [&pn.uninomial, &pn.genus, &pn.specific_epithet]
            .into_iter()
            .any(|part| part.as_deref() == Some("?"));
        *name_type = Some(if pn.is_abbreviated() || pn.is_incomplete() {
            NameType::Informal
        } else if placeholder {
            NameType::Placeholder
        } else {
            NameType::Scientific
        });
    }
}

/// Flags epithets and genera found in the blacklist.
pub fn check_blacklist(pn: &mut ParsedName) {
    let epithet_hit = pn
        .list_epithets()
        .iter()
        .any(|e| BLACKLIST_EPITHETS.contains(*e));
    let genus_hit = pn
        .genus
        .as_ref()
        .is_some_and(|g| BLACKLIST_EPITHETS.contains(&g.to_lowercase()));
    if epithet_hit || genus_hit {
        pn.add_warning(warnings::BLACKLISTED_EPITHET);
        pn.doubtful = true;
    }
}

/// Flags unusual characters and literal "null" epithets in the cleaned input.
pub fn apply_doubtful_flag(pn: &mut ParsedName, name_type: NameType, cleaned: &str) {
    if !DOUBTFUL.is_match(cleaned) {
        pn.doubtful = true;
        pn.add_warning(warnings::UNUSUAL_CHARACTERS);
    } else if name_type.is_parsable() && DOUBTFUL_NULL.is_match(cleaned) {
        pn.doubtful = true;
        pn.add_warning(warnings::NULL_EPITHET);
    }
}

/// Infers a missing rank and maps botanical divisions to phyla.
pub fn determine_rank(pn: &mut ParsedName) {
    if pn.rank.is_other_or_unranked() {
        pn.rank = infer_rank(pn);
    }
    if pn.code != Some(NomCode::Zoological) {
        if let Some(phylum) = division_to_phylum(pn.rank) {
            pn.rank = phylum;
        }
    }
}

/// Infers the nomenclatural code if none was given.
pub fn determine_code(pn: &mut ParsedName, name_type: Option<NameType>) {
    if pn.code.is_some() {
        return;
    }
    let basionym_year = pn.has_basionym_authorship() && pn.basionym_authorship.year.is_some();
    let combination_year =
        pn.has_combination_authorship() && pn.combination_authorship.year.is_some();

    pn.code = if let Some(code) = pn.rank.restricted_code() {
        Some(code)
    } else if pn.cultivar_epithet.is_some() {
        Some(NomCode::Cultivars)
    } else if pn.sanctioning_author.is_some() {
        // sanctioning is only used for fungi
        Some(NomCode::Botanical)
    } else if name_type == Some(NameType::Virus) {
        Some(NomCode::Virus)
    } else if pn.candidatus {
        Some(NomCode::Bacterial)
    } else if !pn.manuscript && (basionym_year || combination_year) {
        Some(NomCode::Zoological)
    } else if !pn.manuscript && pn.has_basionym_authorship() {
        if pn.has_combination_authorship() {
            Some(NomCode::Botanical)
        } else {
            Some(NomCode::Zoological)
        }
    } else if pn
        .nomenclatural_note
        .as_ref()
        .is_some_and(|n| n.contains("illeg"))
    {
        Some(NomCode::Botanical)
    } else {
        None
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Authorship;

    fn binomial(genus: &str, epithet: &str) -> ParsedName {
        let mut pn = ParsedName::new();
        pn.set_genus(Some(genus.to_string()));
        pn.set_specific_epithet(Some(epithet.to_string()));
        pn
    }

    #[test]
    fn test_set_rank_refines_vague_ranks_only() {
        let mut pn = ParsedName::new();
        set_rank(&mut pn, Some("var."), false);
        assert_eq!(pn.rank, Rank::Variety);

        // a known rank is kept unless forced
        set_rank(&mut pn, Some("subsp."), false);
        assert_eq!(pn.rank, Rank::Variety);
        assert_eq!(pn.code, Some(NomCode::Botanical));
        set_rank(&mut pn, Some("f."), true);
        assert_eq!(pn.rank, Rank::Form);

        let mut pn = ParsedName::new();
        pn.rank = Rank::InfraspecificName;
        set_rank(&mut pn, Some("sect."), false);
        assert_eq!(pn.rank, Rank::InfraspecificName);
        set_rank(&mut pn, Some("var."), false);
        assert_eq!(pn.rank, Rank::Variety);

        let mut pn = ParsedName::new();
        pn.rank = Rank::InfragenericName;
        set_rank(&mut pn, Some("subsp."), false);
        assert_eq!(pn.rank, Rank::InfragenericName);
        set_rank(&mut pn, Some("sect."), false);
        assert_eq!(pn.rank, Rank::Section);
    }

    #[test]
    fn test_set_rank_notho_markers() {
        let mut pn = ParsedName::new();
        set_rank(&mut pn, Some("nothosubsp."), false);
        assert_eq!(pn.rank, Rank::Subspecies);
        assert_eq!(pn.notho, Some(NamePart::Infraspecific));

        let mut pn = ParsedName::new();
        set_rank(&mut pn, Some("bogus"), false);
        set_rank(&mut pn, None, false);
        assert_eq!(pn.rank, Rank::Unranked);
        assert_eq!(pn.notho, None);
    }

    #[test]
    fn test_name_type_of_abbreviated_and_placeholder_names() {
        let mut pn = binomial("A.", "alba");
        let mut name_type = None;
        determine_name_type(&mut pn, &mut name_type, "A. alba");
        assert_eq!(name_type, Some(NameType::Informal));

        let mut pn = binomial("?", "alba");
        let mut name_type = None;
        determine_name_type(&mut pn, &mut name_type, "? alba");
        assert_eq!(name_type, Some(NameType::Placeholder));

        let mut pn = binomial("Abies", "alba");
        let mut name_type = None;
        determine_name_type(&mut pn, &mut name_type, "Abies alba");
        assert_eq!(name_type, Some(NameType::Scientific));
    }

    #[test]
    fn test_name_type_warnings() {
        let mut pn = ParsedName::new();
        pn.set_uninomial(Some("Abies".to_string()));
        let mut name_type = None;
        determine_name_type(&mut pn, &mut name_type, "abies");
        assert_eq!(name_type, Some(NameType::Informal));
        assert!(pn.doubtful);
        assert!(pn.warnings.contains(&warnings::LC_MONOMIAL.to_string()));

        let mut pn = ParsedName::new();
        pn.set_genus(Some("Abies".to_string()));
        pn.rank = Rank::Species;
        let mut name_type = None;
        determine_name_type(&mut pn, &mut name_type, "Abies");
        assert_eq!(name_type, Some(NameType::Informal));
        assert!(pn.warnings.contains(&warnings::INDETERMINED.to_string()));

        let mut pn = binomial("Abies", "alba");
        pn.rank = Rank::Genus;
        let mut name_type = None;
        determine_name_type(&mut pn, &mut name_type, "Abies alba");
        assert!(pn.warnings.contains(&warnings::RANK_MISMATCH.to_string()));

        let mut pn = binomial("Abies", "alba");
        let mut name_type = Some(NameType::Virus);
        determine_name_type(&mut pn, &mut name_type, "Abies alba");
        assert_eq!(name_type, Some(NameType::Virus));
        assert!(pn.warnings.is_empty());
    }

    #[test]
    fn test_blacklist_and_doubtful_characters() {
        let mut pn = binomial("Abies", "unknown");
        check_blacklist(&mut pn);
        assert!(pn.doubtful);
        assert_eq!(pn.warnings, vec![warnings::BLACKLISTED_EPITHET]);

        // one warning however many parts are blacklisted
        let mut pn = binomial("Unknown", "unknown");
        pn.set_infraspecific_epithet(Some("unknown".to_string()));
        check_blacklist(&mut pn);
        assert_eq!(pn.warnings, vec![warnings::BLACKLISTED_EPITHET]);

        let mut pn = binomial("Abies", "alba");
        apply_doubtful_flag(&mut pn, NameType::Scientific, "Abies alba Mill., 1768");
        assert!(!pn.doubtful);
        apply_doubtful_flag(&mut pn, NameType::Scientific, "Abies alba Mill. $$");
        assert!(pn.warnings.contains(&warnings::UNUSUAL_CHARACTERS.to_string()));

        let mut pn = binomial("Abies", "null");
        apply_doubtful_flag(&mut pn, NameType::Scientific, "Abies null");
        assert_eq!(pn.warnings, vec![warnings::NULL_EPITHET]);
    }

    #[test]
    fn test_division_becomes_phylum_outside_zoology() {
        let mut pn = ParsedName::new();
        pn.rank = Rank::Division;
        determine_rank(&mut pn);
        assert_eq!(pn.rank, Rank::Phylum);

        let mut pn = ParsedName::new();
        pn.rank = Rank::Division;
        pn.code = Some(NomCode::Zoological);
        determine_rank(&mut pn);
        assert_eq!(pn.rank, Rank::Division);
    }

    #[test]
    fn test_code_inference_precedence() {
        let mut pn = binomial("Abies", "alba");
        pn.combination_authorship = Authorship::authors(["Mill."]).with_year("1768");
        determine_code(&mut pn, Some(NameType::Scientific));
        assert_eq!(pn.code, Some(NomCode::Zoological));

        let mut pn = binomial("Abies", "alba");
        pn.basionym_authorship = Authorship::authors(["L."]);
        pn.combination_authorship = Authorship::authors(["Mill."]);
        determine_code(&mut pn, Some(NameType::Scientific));
        assert_eq!(pn.code, Some(NomCode::Botanical));

        let mut pn = binomial("Abies", "alba");
        pn.basionym_authorship = Authorship::authors(["L."]);
        pn.manuscript = true;
        determine_code(&mut pn, Some(NameType::Scientific));
        assert_eq!(pn.code, None);

        let mut pn = binomial("Abies", "alba");
        pn.cultivar_epithet = Some("Blue".to_string());
        pn.candidatus = true;
        determine_code(&mut pn, Some(NameType::Scientific));
        assert_eq!(pn.code, Some(NomCode::Cultivars));

        let mut pn = binomial("Abies", "alba");
        pn.add_nomenclatural_note("nom. illeg.");
        determine_code(&mut pn, Some(NameType::Scientific));
        assert_eq!(pn.code, Some(NomCode::Botanical));
    }
}
