//! Rank marker tables and rank inference.
//!
//! Marker tables map a normalized marker (lower case, without dots) to its
//! rank. They are derived from [`Rank::marker`] plus a few common spelling
//! variants. Monomials without any marker fall back to suffix tables per
//! nomenclatural code.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use strum::IntoEnumIterator;

use crate::models::{NomCode, ParsedName, Rank};
use crate::unicode::ALPHA_DELTA;

/// Dots, underscores, dashes and spaces, plus hybrid or agamospecies prefixes.
static NORMALIZE_RANK_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:[._ -]+|\b(?:notho|agamo))").unwrap());

fn build_marker_map(
    ranks: impl Iterator<Item = Rank>,
    additions: &[(&'static str, Rank)],
) -> HashMap<String, Rank> {
    let mut map = HashMap::new();
    for rank in ranks {
        if let Some(marker) = rank.marker() {
            map.insert(marker.replace('.', ""), rank);
        }
    }
    for (marker, rank) in additions {
        map.insert((*marker).to_string(), *rank);
    }
    map
}

/// Bacterial ranks below subspecies, e.g. pathovar or serovar.
pub static MICROBIAL_RANKS: LazyLock<Vec<Rank>> = LazyLock::new(|| {
    Rank::iter()
        .filter(|r| r.restricted_code() == Some(NomCode::Bacterial) && r.is_infraspecific())
        .collect()
});

/// Family group markers such as `subfam` or `trib`.
pub static FAMILY_GROUP_MARKERS: LazyLock<HashMap<String, Rank>> =
    LazyLock::new(|| build_marker_map(Rank::iter().filter(Rank::is_family_group), &[]));

/// Markers of all ranks above genus.
pub static SUPRAGENERIC_MARKERS: LazyLock<HashMap<String, Rank>> = LazyLock::new(|| {
    build_marker_map(
        Rank::iter().filter(Rank::is_suprageneric),
        &[
            ("ib", Rank::SupragenericName),
            ("supersubtrib", Rank::SupragenericName),
            ("trib", Rank::Tribe),
        ],
    )
});

/// Markers between genus and species, e.g. `subgen` or `sect`.
pub static INFRAGENERIC_MARKERS: LazyLock<HashMap<String, Rank>> = LazyLock::new(|| {
    build_marker_map(
        Rank::iter().filter(|r| r.is_genus_group() && *r != Rank::Genus),
        &[
            ("suprasect", Rank::Supersection),
            ("supraser", Rank::Superseries),
            ("sect", Rank::Section),
            ("section", Rank::Section),
            ("ser", Rank::Series),
            ("series", Rank::Series),
            ("subg", Rank::Subgenus),
            ("subgen", Rank::Subgenus),
            ("subgenus", Rank::Subgenus),
            ("subsect", Rank::Subsection),
            ("subsection", Rank::Subsection),
            ("subser", Rank::Subseries),
            ("subseries", Rank::Subseries),
        ],
    )
});

pub static SPECIFIC_MARKERS: LazyLock<HashMap<String, Rank>> = LazyLock::new(|| {
    [
        ("sl", Rank::SpeciesAggregate),
        ("agg", Rank::SpeciesAggregate),
        ("aggr", Rank::SpeciesAggregate),
        ("group", Rank::SpeciesAggregate),
        ("sp", Rank::Species),
        ("spec", Rank::Species),
        ("species", Rank::Species),
        ("spp", Rank::Species),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
});

/// Literal infraspecific markers. Runs of `*` and greek alpha to delta
/// letters are infraspecific markers too, see [`is_symbolic_marker`].
pub static INFRASPECIFIC_MARKERS: LazyLock<HashMap<String, Rank>> = LazyLock::new(|| {
    build_marker_map(
        Rank::iter().filter(Rank::is_infraspecific),
        &[
            ("aberration", Rank::Aberration),
            ("bv", Rank::Biovar),
            ("conv", Rank::Convariety),
            ("ct", Rank::Chemoform),
            ("cv", Rank::Cultivar),
            ("f", Rank::Form),
            ("fo", Rank::Form),
            ("form", Rank::Form),
            ("forma", Rank::Form),
            ("fsp", Rank::FormaSpecialis),
            ("fspec", Rank::FormaSpecialis),
            ("gx", Rank::Grex),
            ("hort", Rank::Cultivar),
            ("m", Rank::Morph),
            ("morpha", Rank::Morph),
            ("nat", Rank::Natio),
            ("proles", Rank::Proles),
            ("pv", Rank::Pathovar),
            ("sf", Rank::Subform),
            ("ssp", Rank::Subspecies),
            ("st", Rank::Strain),
            ("subf", Rank::Subform),
            ("subform", Rank::Subform),
            ("subsp", Rank::Subspecies),
            ("subv", Rank::Subvariety),
            ("subvar", Rank::Subvariety),
            ("sv", Rank::Subvariety),
            ("tinfr", Rank::InfraspecificName),
            ("v", Rank::Variety),
            ("var", Rank::Variety),
            ("nvar", Rank::Variety),
        ],
    )
});

/// Every known marker.
pub static ALL_MARKERS: LazyLock<HashMap<String, Rank>> = LazyLock::new(|| {
    let mut map = build_marker_map(Rank::iter(), &[("subser", Rank::Subseries)]);
    for table in [
        &*SUPRAGENERIC_MARKERS,
        &*INFRAGENERIC_MARKERS,
        &*SPECIFIC_MARKERS,
        &*INFRASPECIFIC_MARKERS,
    ] {
        map.extend(table.iter().map(|(k, v)| (k.clone(), *v)));
    }
    map
});

/// Keys of a marker table ordered longest first, then alphabetically.
pub fn sorted_keys(map: &HashMap<String, Rank>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    keys
}

/// A run of asterisks or a single alpha to delta letter.
pub fn is_symbolic_marker(marker: &str) -> bool {
    let mut chars = marker.chars();
    match chars.next() {
        Some('*') => marker.chars().all(|c| c == '*'),
        Some(c) if ALPHA_DELTA.contains(c) => chars.next().is_none(),
        _ => false,
    }
}

/// Infers a rank from a marker such as `subsp.` or `nothovar.`.
pub fn infer_rank_from_marker(marker: &str) -> Option<Rank> {
    let marker = marker.trim();
    if marker.is_empty() {
        return None;
    }
    let normalized = NORMALIZE_RANK_MARKER.replace_all(&marker.to_lowercase(), "").into_owned();
    if is_symbolic_marker(&normalized) {
        return Some(Rank::InfraspecificName);
    }
    ALL_MARKERS.get(&normalized).copied()
}

// ── Suffix tables ──

const BACTERIAL_SUFFIXES: &[(&str, Rank)] = &[
    ("oideae", Rank::Subfamily),
    ("aceae", Rank::Family),
    ("ineae", Rank::Suborder),
    ("ales", Rank::Order),
    ("idae", Rank::Subclass),
    ("inae", Rank::Subtribe),
    ("eae", Rank::Tribe),
    ("ia", Rank::Class),
];

const BOTANICAL_SUFFIXES: &[(&str, Rank)] = &[
    ("mycetidae", Rank::Subclass),
    ("phycidae", Rank::Subclass),
    ("mycotina", Rank::Subphylum),
    ("phytina", Rank::Subphylum),
    ("mycetes", Rank::Class),
    ("phyceae", Rank::Class),
    ("mycota", Rank::Phylum),
    ("opsida", Rank::Class),
    ("oideae", Rank::Subfamily),
    ("phyta", Rank::Phylum),
    ("ineae", Rank::Suborder),
    ("aceae", Rank::Family),
    ("idae", Rank::Subclass),
    ("anae", Rank::Superorder),
    ("acea", Rank::Superfamily),
    ("aria", Rank::Infraorder),
    ("ales", Rank::Order),
    ("inae", Rank::Subtribe),
    ("eae", Rank::Tribe),
];

const ZOOLOGICAL_SUFFIXES: &[(&str, Rank)] = &[
    ("oidea", Rank::Superfamily),
    ("oidae", Rank::Epifamily),
    ("idae", Rank::Family),
    ("inae", Rank::Subfamily),
    ("ini", Rank::Tribe),
    ("ina", Rank::Subtribe),
];

const VIRUS_SUFFIXES: &[(&str, Rank)] = &[
    ("viria", Rank::Realm),
    ("vira", Rank::Subrealm),
    ("viriae", Rank::Kingdom),
    ("virites", Rank::Subkingdom),
    ("viricota", Rank::Phylum),
    ("viricotina", Rank::Subphylum),
    ("viricetes", Rank::Class),
    ("viricetidae", Rank::Subclass),
    ("virales", Rank::Order),
    ("virineae", Rank::Suborder),
    ("viridae", Rank::Family),
    ("virinae", Rank::Subfamily),
];

/// Suffix table of a nomenclatural code, longest and most specific first.
pub fn suffixes(code: NomCode) -> &'static [(&'static str, Rank)] {
    match code {
        NomCode::Bacterial => BACTERIAL_SUFFIXES,
        NomCode::Botanical => BOTANICAL_SUFFIXES,
        NomCode::Zoological => ZOOLOGICAL_SUFFIXES,
        NomCode::Virus => VIRUS_SUFFIXES,
        NomCode::Cultivars => &[],
    }
}

/// Suffixes longer than four characters that point to the same rank in
/// every code using them. Longest first, then alphabetically.
pub static GLOBAL_SUFFIXES: LazyLock<Vec<(&'static str, Rank)>> = LazyLock::new(|| {
    let mut seen: HashMap<&'static str, Rank> = HashMap::new();
    let mut ambiguous: HashSet<&'static str> = HashSet::new();
    for table in [
        BACTERIAL_SUFFIXES,
        BOTANICAL_SUFFIXES,
        ZOOLOGICAL_SUFFIXES,
        VIRUS_SUFFIXES,
    ] {
        for (suffix, rank) in table {
            if suffix.len() <= 4 || ambiguous.contains(suffix) {
                continue;
            }
            match seen.get(suffix) {
                Some(existing) if existing != rank => {
                    seen.remove(suffix);
                    ambiguous.insert(suffix);
                }
                _ => {
                    seen.insert(suffix, *rank);
                }
            }
        }
    }
    let mut suffixes: Vec<(&'static str, Rank)> = seen.into_iter().collect();
    suffixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    suffixes
});

/// Infers a rank from the populated name parts, ignoring any rank already set.
///
/// Uninomials are matched against the suffix table of the name's code, or
/// the unambiguous global table when no code is known.
pub fn infer_rank(pn: &ParsedName) -> Rank {
    if pn.infraspecific_epithet.is_some() {
        return Rank::InfraspecificName;
    }
    if pn.specific_epithet.is_some() {
        return Rank::Species;
    }
    if pn.infrageneric_epithet.is_some() {
        return Rank::InfragenericName;
    }
    if let Some(uninomial) = &pn.uninomial {
        let table: &[(&str, Rank)] = match pn.code {
            Some(code) => suffixes(code),
            None => GLOBAL_SUFFIXES.as_slice(),
        };
        if let Some((_, rank)) = table.iter().find(|(suffix, _)| uninomial.ends_with(suffix)) {
            return *rank;
        }
    }
    Rank::Unranked
}
