//! Taxonomic ranks.
//!
//! [`Rank`] is a closed enumeration declared from the highest rank (domain)
//! down to the lowest (strain), followed by the two catch-all values
//! [`Rank::Other`] and [`Rank::Unranked`]. All "above/below" questions are
//! answered by the explicit predicates on the enum, which compare against
//! fixed anchor ranks instead of leaking raw ordinals to callers.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

use super::NomCode;

/// A taxonomic rank, ordered from highest to lowest.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Rank {
    Domain,
    Realm,
    Subrealm,
    Superkingdom,
    Kingdom,
    Subkingdom,
    Infrakingdom,
    Superphylum,
    Phylum,
    Subphylum,
    Infraphylum,
    Superclass,
    Class,
    Subclass,
    Infraclass,
    Subterclass,
    Parvclass,
    Superdivision,
    Division,
    Subdivision,
    Infradivision,
    Superlegion,
    Legion,
    Sublegion,
    Infralegion,
    Supercohort,
    Cohort,
    Subcohort,
    Infracohort,
    Gigaorder,
    Magnorder,
    Grandorder,
    Mirorder,
    Superorder,
    Order,
    Nanorder,
    Hypoorder,
    Minorder,
    Suborder,
    Infraorder,
    Parvorder,
    Megafamily,
    Grandfamily,
    Superfamily,
    Epifamily,
    Family,
    Subfamily,
    Infrafamily,
    Supertribe,
    Tribe,
    Subtribe,
    Infratribe,
    SupragenericName,
    Genus,
    Subgenus,
    Infragenus,
    Supersection,
    Section,
    Subsection,
    Superseries,
    Series,
    Subseries,
    InfragenericName,
    SpeciesAggregate,
    Species,
    InfraspecificName,
    Grex,
    Subspecies,
    CultivarGroup,
    Convariety,
    InfrasubspecificName,
    Proles,
    Natio,
    Aberration,
    Morph,
    Variety,
    Subvariety,
    Form,
    Subform,
    Pathovar,
    Biovar,
    Chemovar,
    Morphovar,
    Phagovar,
    Serovar,
    Chemoform,
    FormaSpecialis,
    Cultivar,
    Strain,
    Other,
    #[default]
    Unranked,
}

impl Rank {
    /// Upper-case constant name, e.g. `"SUBSPECIES"`.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// The abbreviated rank marker used in names, e.g. `"subsp."`.
    pub fn marker(&self) -> Option<&'static str> {
        use Rank::*;
        let marker = match self {
            Domain => "dom.",
            Realm => "realm",
            Subrealm => "subrealm",
            Superkingdom => "superreg.",
            Kingdom => "reg.",
            Subkingdom => "subreg.",
            Infrakingdom => "infrareg.",
            Superphylum => "superphyl.",
            Phylum => "phyl.",
            Subphylum => "subphyl.",
            Infraphylum => "infraphyl.",
            Superclass => "supercl.",
            Class => "cl.",
            Subclass => "subcl.",
            Infraclass => "infracl.",
            Subterclass => "subtercl.",
            Parvclass => "parvcl.",
            Superdivision => "superdiv.",
            Division => "div.",
            Subdivision => "subdiv.",
            Infradivision => "infradiv.",
            Superlegion => "superleg.",
            Legion => "leg.",
            Sublegion => "subleg.",
            Infralegion => "infraleg.",
            Supercohort => "supercohort",
            Cohort => "cohort",
            Subcohort => "subcohort",
            Infracohort => "infracohort",
            Gigaorder => "gigaord.",
            Magnorder => "magnord.",
            Grandorder => "grandord.",
            Mirorder => "mirord.",
            Superorder => "superord.",
            Order => "ord.",
            Nanorder => "nanord.",
            Hypoorder => "hypoord.",
            Minorder => "minord.",
            Suborder => "subord.",
            Infraorder => "infraord.",
            Parvorder => "parvord.",
            Megafamily => "megafam.",
            Grandfamily => "grandfam.",
            Superfamily => "superfam.",
            Epifamily => "epifam.",
            Family => "fam.",
            Subfamily => "subfam.",
            Infrafamily => "infrafam.",
            Supertribe => "supertrib.",
            Tribe => "trib.",
            Subtribe => "subtrib.",
            Infratribe => "infratrib.",
            SupragenericName => "supragen.",
            Genus => "gen.",
            Subgenus => "subgen.",
            Infragenus => "infrag.",
            Supersection => "supersect.",
            Section => "sect.",
            Subsection => "subsect.",
            Superseries => "superser.",
            Series => "ser.",
            Subseries => "subser.",
            InfragenericName => "infragen.",
            SpeciesAggregate => "agg.",
            Species => "sp.",
            InfraspecificName => "infrasp.",
            Grex => "gx",
            Subspecies => "subsp.",
            Convariety => "convar.",
            InfrasubspecificName => "infrasubsp.",
            Proles => "prol.",
            Natio => "natio",
            Aberration => "ab.",
            Morph => "morph",
            Variety => "var.",
            Subvariety => "subvar.",
            Form => "f.",
            Subform => "subf.",
            Pathovar => "pv.",
            Biovar => "biovar",
            Chemovar => "chemovar",
            Morphovar => "morphovar",
            Phagovar => "phagovar",
            Serovar => "serovar",
            Chemoform => "chemoform",
            FormaSpecialis => "f.sp.",
            Cultivar => "cv.",
            Strain => "strain",
            CultivarGroup | Other | Unranked => return None,
        };
        Some(marker)
    }

    pub fn higher_than(&self, other: Rank) -> bool {
        self < &other
    }

    pub fn higher_or_equal(&self, other: Rank) -> bool {
        self <= &other
    }

    pub fn is_other_or_unranked(&self) -> bool {
        matches!(self, Rank::Other | Rank::Unranked)
    }

    pub fn not_other_or_unranked(&self) -> bool {
        !self.is_other_or_unranked()
    }

    /// Any rank below species, excluding the catch-all values.
    pub fn is_infraspecific(&self) -> bool {
        *self > Rank::Species && self.not_other_or_unranked()
    }

    pub fn is_infrasubspecific(&self) -> bool {
        *self > Rank::Subspecies && self.not_other_or_unranked()
    }

    /// Any rank below genus, including species and infraspecific ranks.
    pub fn is_infrageneric(&self) -> bool {
        *self > Rank::Genus && self.not_other_or_unranked()
    }

    /// Ranks between genus and species aggregate, e.g. subgenus or section.
    pub fn is_infrageneric_strictly(&self) -> bool {
        self.is_infrageneric() && *self < Rank::SpeciesAggregate
    }

    pub fn is_species_or_below(&self) -> bool {
        *self >= Rank::SpeciesAggregate && self.not_other_or_unranked()
    }

    pub fn is_supraspecific(&self) -> bool {
        *self < Rank::SpeciesAggregate
    }

    pub fn is_suprageneric(&self) -> bool {
        *self < Rank::Genus
    }

    pub fn is_genus_or_suprageneric(&self) -> bool {
        *self <= Rank::Genus
    }

    pub fn is_family_group(&self) -> bool {
        *self >= Rank::Megafamily && *self < Rank::SupragenericName
    }

    pub fn is_genus_group(&self) -> bool {
        *self >= Rank::Genus && *self < Rank::SpeciesAggregate
    }

    pub fn is_linnean(&self) -> bool {
        LINNEAN_RANKS.contains(self)
    }

    pub fn is_uncomparable(&self) -> bool {
        UNCOMPARABLE_RANKS.contains(self)
    }

    pub fn is_ambiguous(&self) -> bool {
        AMBIGUOUS_RANKS.contains(self)
    }

    pub fn is_legacy(&self) -> bool {
        LEGACY_RANKS.contains(self)
    }

    /// The nomenclatural code a rank is exclusively used in, if any.
    pub fn restricted_code(&self) -> Option<NomCode> {
        use Rank::*;
        match self {
            Superdivision | Division | Subdivision | Infradivision | Superlegion | Legion
            | Sublegion | Infralegion | Subterclass | Parvclass | Gigaorder | Magnorder
            | Grandorder | Mirorder | Nanorder | Hypoorder | Minorder | Parvorder
            | Supercohort | Cohort | Subcohort | Infracohort | Megafamily | Grandfamily
            | Epifamily | Morph | Aberration | Natio => Some(NomCode::Zoological),
            Proles | Supersection | Section | Subsection | Superseries | Series | Subseries => {
                Some(NomCode::Botanical)
            }
            Cultivar | CultivarGroup | Convariety | Grex => Some(NomCode::Cultivars),
            Pathovar | Biovar | Chemovar | Morphovar | Phagovar | Serovar | Chemoform
            | FormaSpecialis => Some(NomCode::Bacterial),
            Realm | Subrealm => Some(NomCode::Virus),
            _ => None,
        }
    }

    pub fn is_cultivar_rank(&self) -> bool {
        self.restricted_code() == Some(NomCode::Cultivars)
    }

    /// The main rank a prefixed rank belongs to, e.g. SUBORDER -> ORDER.
    pub fn major_rank(&self) -> Rank {
        use Rank::*;
        if self.is_infraspecific() {
            return InfraspecificName;
        }
        match self {
            Superkingdom | Subkingdom | Infrakingdom => Kingdom,
            Superphylum | Subphylum | Infraphylum => Phylum,
            Superclass | Subclass | Infraclass | Subterclass | Parvclass => Class,
            Superdivision | Subdivision | Infradivision => Division,
            Superlegion | Sublegion | Infralegion => Legion,
            Supercohort | Subcohort | Infracohort => Cohort,
            Gigaorder | Magnorder | Grandorder | Mirorder | Superorder | Nanorder | Hypoorder
            | Minorder | Suborder | Infraorder | Parvorder => Order,
            Megafamily | Grandfamily | Superfamily | Epifamily | Subfamily | Infrafamily => Family,
            Supertribe | Subtribe | Infratribe => Tribe,
            Subgenus | Infragenus | InfragenericName => Genus,
            Supersection | Subsection => Section,
            Superseries | Subseries => Series,
            SpeciesAggregate => Species,
            Subrealm => Realm,
            other => *other,
        }
    }
}

/// The seven main Linnean ranks.
pub const LINNEAN_RANKS: &[Rank] = &[
    Rank::Kingdom,
    Rank::Phylum,
    Rank::Class,
    Rank::Order,
    Rank::Family,
    Rank::Genus,
    Rank::Species,
];

/// Ranks that cannot be placed relative to other ranks.
const UNCOMPARABLE_RANKS: &[Rank] = &[
    Rank::SupragenericName,
    Rank::InfragenericName,
    Rank::InfraspecificName,
    Rank::InfrasubspecificName,
    Rank::Other,
    Rank::Unranked,
];

/// Ranks whose position differs between the codes.
const AMBIGUOUS_RANKS: &[Rank] = &[
    Rank::Supersection,
    Rank::Section,
    Rank::Subsection,
    Rank::Superseries,
    Rank::Series,
    Rank::Subseries,
    Rank::Other,
    Rank::Unranked,
];

/// Ranks no longer recommended by any code.
const LEGACY_RANKS: &[Rank] = &[
    Rank::Morph,
    Rank::Aberration,
    Rank::Natio,
    Rank::Proles,
    Rank::Convariety,
];

impl AsRef<str> for Rank {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_ordering_is_top_down() {
        assert!(Rank::Kingdom.higher_than(Rank::Phylum));
        assert!(Rank::Genus.higher_than(Rank::Subgenus));
        assert!(Rank::Species.higher_than(Rank::Subspecies));
        assert!(!Rank::Variety.higher_than(Rank::Subspecies));
    }

    #[test]
    fn test_group_predicates() {
        assert!(Rank::Subspecies.is_infraspecific());
        assert!(Rank::Variety.is_infrasubspecific());
        assert!(!Rank::Subspecies.is_infrasubspecific());
        assert!(Rank::Section.is_infrageneric_strictly());
        assert!(!Rank::Species.is_infrageneric_strictly());
        assert!(Rank::Species.is_infrageneric());
        assert!(Rank::SpeciesAggregate.is_species_or_below());
        assert!(!Rank::Unranked.is_species_or_below());
        assert!(!Rank::Unranked.is_infraspecific());
        assert!(Rank::Subfamily.is_family_group());
        assert!(!Rank::SupragenericName.is_family_group());
        assert!(Rank::Series.is_genus_group());
        assert!(Rank::Tribe.is_suprageneric());
    }

    #[test]
    fn test_explicit_rank_sets() {
        assert!(Rank::InfraspecificName.is_uncomparable());
        assert!(Rank::Section.is_ambiguous());
        assert!(Rank::Natio.is_legacy());
        assert!(!Rank::Species.is_uncomparable());
    }

    #[test]
    fn test_restricted_codes() {
        assert_eq!(Rank::Pathovar.restricted_code(), Some(NomCode::Bacterial));
        assert_eq!(Rank::Section.restricted_code(), Some(NomCode::Botanical));
        assert_eq!(Rank::Division.restricted_code(), Some(NomCode::Zoological));
        assert_eq!(Rank::Cultivar.restricted_code(), Some(NomCode::Cultivars));
        assert_eq!(Rank::Species.restricted_code(), None);
        assert!(Rank::Grex.is_cultivar_rank());
    }

    #[test]
    fn test_major_ranks() {
        assert_eq!(Rank::Suborder.major_rank(), Rank::Order);
        assert_eq!(Rank::Variety.major_rank(), Rank::InfraspecificName);
        assert_eq!(Rank::SpeciesAggregate.major_rank(), Rank::Species);
        assert_eq!(Rank::Genus.major_rank(), Rank::Genus);
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(Rank::SpeciesAggregate.as_str(), "SPECIES_AGGREGATE");
        assert_eq!(Rank::from_str("subspecies").unwrap(), Rank::Subspecies);
        assert_eq!(
            serde_json::to_string(&Rank::FormaSpecialis).unwrap(),
            "\"FORMA_SPECIALIS\""
        );
    }

    #[test]
    fn test_only_catch_alls_and_cultivar_group_lack_markers() {
        let unmarked: Vec<Rank> = Rank::iter().filter(|r| r.marker().is_none()).collect();
        assert_eq!(
            unmarked,
            vec![Rank::CultivarGroup, Rank::Other, Rank::Unranked]
        );
    }
}
