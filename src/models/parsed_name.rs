//! The structured result of parsing a scientific name.
//!
//! A [`ParsedName`] is built incrementally by the parser stages of a single
//! call and handed to the caller once complete. [`ParsedAuthorship`] is the
//! authorship-only subset returned when parsing an authorship string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Authorship, NamePart, NameType, NomCode, Rank, State};

pub const HYBRID_MARKER: char = '×';

fn is_false(value: &bool) -> bool {
    !*value
}

/// A parsed scientific name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedName {
    pub rank: Rank,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<NomCode>,
    /// Single name of a genus or a higher taxon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uninomial: Option<String>,
    /// Genus part of an infrageneric, specific or infraspecific name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infrageneric_epithet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specific_epithet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub infraspecific_epithet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cultivar_epithet: Option<String>,
    /// Strain, BOLD placeholder or manuscript phrase identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strain: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub candidatus: bool,
    /// The hybrid part of the name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notho: Option<NamePart>,
    /// Qualifiers such as "cf." or "aff." keyed by the name part they precede.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub epithet_qualifier: BTreeMap<NamePart, String>,
    #[serde(rename = "type")]
    pub name_type: NameType,
    #[serde(skip_serializing_if = "Authorship::is_empty")]
    pub combination_authorship: Authorship,
    #[serde(skip_serializing_if = "Authorship::is_empty")]
    pub basionym_authorship: Authorship,
    /// Fungal sanctioning author given after a colon, e.g. "Fr.".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanctioning_author: Option<String>,
    /// Taxonomic concept reference like "sensu lato" or "auct. non".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomic_note: Option<String>,
    /// Nomenclatural status notes like "nom. illeg.", space separated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nomenclatural_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_in: Option<String>,
    /// Remainder of the input that could not be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unparsed: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub doubtful: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub manuscript: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub extinct: bool,
    pub state: State,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Default for ParsedName {
    fn default() -> Self {
        Self {
            rank: Rank::Unranked,
            code: None,
            uninomial: None,
            genus: None,
            infrageneric_epithet: None,
            specific_epithet: None,
            infraspecific_epithet: None,
            cultivar_epithet: None,
            strain: None,
            candidatus: false,
            notho: None,
            epithet_qualifier: BTreeMap::new(),
            name_type: NameType::Scientific,
            combination_authorship: Authorship::default(),
            basionym_authorship: Authorship::default(),
            sanctioning_author: None,
            taxonomic_note: None,
            nomenclatural_note: None,
            published_in: None,
            unparsed: None,
            doubtful: false,
            manuscript: false,
            extinct: false,
            state: State::None,
            warnings: Vec::new(),
        }
    }
}

/// Strips a leading hybrid marker, reporting whether one was present.
fn strip_hybrid(value: Option<String>) -> (Option<String>, bool) {
    match value {
        Some(v) if v.starts_with(HYBRID_MARKER) => {
            (Some(v[HYBRID_MARKER.len_utf8()..].to_string()), true)
        }
        other => (other, false),
    }
}

impl ParsedName {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Hybrid aware setters ──

    pub fn set_uninomial(&mut self, value: Option<String>) {
        let (value, hybrid) = strip_hybrid(value);
        if hybrid {
            self.notho = Some(NamePart::Generic);
        }
        self.uninomial = value;
    }

    pub fn set_genus(&mut self, value: Option<String>) {
        let (value, hybrid) = strip_hybrid(value);
        if hybrid {
            self.notho = Some(NamePart::Generic);
        }
        self.genus = value;
    }

    pub fn set_infrageneric_epithet(&mut self, value: Option<String>) {
        let (value, hybrid) = strip_hybrid(value);
        if hybrid {
            self.notho = Some(NamePart::Infrageneric);
        }
        self.infrageneric_epithet = value;
    }

    pub fn set_specific_epithet(&mut self, value: Option<String>) {
        let (value, hybrid) = strip_hybrid(value);
        if hybrid {
            self.notho = Some(NamePart::Specific);
        }
        self.specific_epithet = value;
    }

    pub fn set_infraspecific_epithet(&mut self, value: Option<String>) {
        let (value, hybrid) = strip_hybrid(value);
        if hybrid {
            self.notho = Some(NamePart::Infraspecific);
        }
        self.infraspecific_epithet = value;
    }

    pub fn set_epithet_qualifier(&mut self, part: NamePart, qualifier: impl Into<String>) {
        self.epithet_qualifier.insert(part, qualifier.into());
    }

    pub fn epithet(&self, part: NamePart) -> Option<&str> {
        match part {
            NamePart::Generic => self.genus.as_deref(),
            NamePart::Infrageneric => self.infrageneric_epithet.as_deref(),
            NamePart::Specific => self.specific_epithet.as_deref(),
            NamePart::Infraspecific => self.infraspecific_epithet.as_deref(),
        }
    }

    // ── Notes and warnings ──

    /// Appends a warning unless the same text was already recorded.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn add_nomenclatural_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        self.nomenclatural_note = Some(match self.nomenclatural_note.take() {
            Some(existing) => format!("{existing} {note}"),
            None => note.to_string(),
        });
    }

    pub fn add_unparsed(&mut self, unparsed: &str) {
        if unparsed.trim().is_empty() {
            return;
        }
        self.unparsed = Some(match self.unparsed.take() {
            Some(existing) => existing + unparsed,
            None => unparsed.to_string(),
        });
    }

    // ── Predicates ──

    pub fn has_name(&self) -> bool {
        self.uninomial.is_some()
            || self.genus.is_some()
            || self.infrageneric_epithet.is_some()
            || self.specific_epithet.is_some()
            || self.infraspecific_epithet.is_some()
            || self.strain.is_some()
            || self.cultivar_epithet.is_some()
    }

    pub fn has_authorship(&self) -> bool {
        self.combination_authorship.exists() || self.basionym_authorship.exists()
    }

    pub fn has_combination_authorship(&self) -> bool {
        self.combination_authorship.exists()
    }

    pub fn has_basionym_authorship(&self) -> bool {
        self.basionym_authorship.exists()
    }

    pub fn is_hybrid_name(&self) -> bool {
        self.notho.is_some()
    }

    pub fn is_binomial(&self) -> bool {
        self.genus.is_some() && self.specific_epithet.is_some()
    }

    pub fn is_trinomial(&self) -> bool {
        self.is_binomial() && self.infraspecific_epithet.is_some()
    }

    /// An infraspecific name repeating its species epithet, e.g. "Abies alba subsp. alba".
    pub fn is_autonym(&self) -> bool {
        match (&self.specific_epithet, &self.infraspecific_epithet) {
            (Some(sp), Some(infra)) => sp == infra,
            _ => false,
        }
    }

    /// A name whose rank demands a terminal epithet that is missing, e.g. "Abies spec.".
    pub fn is_indetermined(&self) -> bool {
        let rank = self.rank;
        (rank.is_infrageneric_strictly()
            && self.uninomial.is_none()
            && self.infrageneric_epithet.is_none()
            && self.specific_epithet.is_none())
            || (rank.is_species_or_below()
                && !rank.is_cultivar_rank()
                && self.specific_epithet.is_none())
            || (rank.is_infraspecific()
                && !rank.is_cultivar_rank()
                && self.infraspecific_epithet.is_none())
            || (rank.is_cultivar_rank() && self.cultivar_epithet.is_none())
    }

    /// Epithets without the higher name parts they require.
    pub fn is_incomplete(&self) -> bool {
        ((self.specific_epithet.is_some() || self.cultivar_epithet.is_some())
            && self.genus.is_none())
            || (self.infraspecific_epithet.is_some() && self.specific_epithet.is_none())
    }

    pub fn is_abbreviated(&self) -> bool {
        [&self.uninomial, &self.genus, &self.specific_epithet]
            .into_iter()
            .flatten()
            .any(|s| s.ends_with('.'))
    }

    /// Infrageneric, specific, infraspecific and cultivar epithets, in that order.
    pub fn list_epithets(&self) -> Vec<&str> {
        [
            &self.infrageneric_epithet,
            &self.specific_epithet,
            &self.infraspecific_epithet,
            &self.cultivar_epithet,
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect()
    }

    pub fn terminal_epithet(&self) -> Option<&str> {
        self.infraspecific_epithet
            .as_deref()
            .or(self.specific_epithet.as_deref())
    }

    /// Projects the authorship related fields onto a [`ParsedAuthorship`].
    pub fn authorship(&self) -> ParsedAuthorship {
        ParsedAuthorship {
            combination_authorship: self.combination_authorship.clone(),
            basionym_authorship: self.basionym_authorship.clone(),
            sanctioning_author: self.sanctioning_author.clone(),
            taxonomic_note: self.taxonomic_note.clone(),
            nomenclatural_note: self.nomenclatural_note.clone(),
            published_in: self.published_in.clone(),
            unparsed: self.unparsed.clone(),
            doubtful: self.doubtful,
            manuscript: self.manuscript,
            extinct: self.extinct,
            state: self.state,
            warnings: self.warnings.clone(),
        }
    }
}

/// Result of parsing an authorship string on its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedAuthorship {
    #[serde(skip_serializing_if = "Authorship::is_empty")]
    pub combination_authorship: Authorship,
    #[serde(skip_serializing_if = "Authorship::is_empty")]
    pub basionym_authorship: Authorship,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanctioning_author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomic_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nomenclatural_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unparsed: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub doubtful: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub manuscript: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub extinct: bool,
    pub state: State,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ParsedAuthorship {
    pub fn has_authorship(&self) -> bool {
        self.combination_authorship.exists() || self.basionym_authorship.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn species(genus: &str, epithet: &str) -> ParsedName {
        let mut pn = ParsedName::new();
        pn.set_genus(Some(genus.to_string()));
        pn.set_specific_epithet(Some(epithet.to_string()));
        pn.rank = Rank::Species;
        pn
    }

    #[test]
    fn test_hybrid_setters_set_notho() {
        let mut pn = ParsedName::new();
        pn.set_genus(Some("×Pyrocrataegus".to_string()));
        assert_eq!(pn.genus.as_deref(), Some("Pyrocrataegus"));
        assert_eq!(pn.notho, Some(NamePart::Generic));

        pn.set_infraspecific_epithet(Some("×media".to_string()));
        assert_eq!(pn.infraspecific_epithet.as_deref(), Some("media"));
        assert_eq!(pn.notho, Some(NamePart::Infraspecific));
    }

    #[test]
    fn test_notes_are_joined() {
        let mut pn = ParsedName::new();
        pn.add_nomenclatural_note("nom. illeg.");
        pn.add_nomenclatural_note("  ");
        pn.add_nomenclatural_note(" nom. rej.");
        assert_eq!(pn.nomenclatural_note.as_deref(), Some("nom. illeg. nom. rej."));

        pn.add_unparsed("abc");
        pn.add_unparsed(" def");
        assert_eq!(pn.unparsed.as_deref(), Some("abc def"));
    }

    #[test]
    fn test_warnings_are_unique() {
        let mut pn = ParsedName::new();
        pn.add_warning("a");
        pn.add_warning("b");
        pn.add_warning("a");
        assert_eq!(pn.warnings, vec!["a", "b"]);
    }

    #[test]
    fn test_indetermined() {
        let mut pn = species("Abies", "alba");
        assert!(!pn.is_indetermined());
        pn.rank = Rank::Subspecies;
        assert!(pn.is_indetermined());
        pn.set_infraspecific_epithet(Some("alba".to_string()));
        assert!(!pn.is_indetermined());
        assert!(pn.is_autonym());
        assert!(pn.is_trinomial());

        let mut genus_only = ParsedName::new();
        genus_only.set_genus(Some("Abies".to_string()));
        genus_only.rank = Rank::Species;
        assert!(genus_only.is_indetermined());
    }

    #[test]
    fn test_incomplete_and_abbreviated() {
        let mut pn = ParsedName::new();
        pn.set_specific_epithet(Some("alba".to_string()));
        assert!(pn.is_incomplete());

        let pn = species("A.", "alba");
        assert!(pn.is_abbreviated());
        assert!(!pn.is_incomplete());
    }

    #[test]
    fn test_list_epithets() {
        let mut pn = species("Abies", "alba");
        pn.cultivar_epithet = Some("Pendula".to_string());
        assert_eq!(pn.list_epithets(), vec!["alba", "Pendula"]);
        assert_eq!(pn.terminal_epithet(), Some("alba"));
        assert!(pn.has_name());
        assert!(!ParsedName::new().has_name());
    }

    #[test]
    fn test_authorship_projection() {
        let mut pn = species("Abies", "alba");
        pn.combination_authorship = Authorship::authors(["Mill."]);
        pn.state = State::Complete;
        let auth = pn.authorship();
        assert!(auth.has_authorship());
        assert_eq!(auth.combination_authorship.authors, vec!["Mill."]);
        assert_eq!(auth.state, State::Complete);
    }

    #[test]
    fn test_json_uses_type_key() {
        let json = serde_json::to_value(species("Abies", "alba")).unwrap();
        assert_eq!(json["type"], "SCIENTIFIC");
        assert_eq!(json["rank"], "SPECIES");
        assert!(json.get("uninomial").is_none());
    }
}
