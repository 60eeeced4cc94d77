use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{EnumIter, EnumString, IntoStaticStr};

/// Nomenclatural code a name is governed by.
#[derive(
    Clone,
    Copy,
    Debug,
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
pub enum NomCode {
    Bacterial,
    Botanical,
    Cultivars,
    Virus,
    Zoological,
}

impl NomCode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn acronym(&self) -> &'static str {
        match self {
            NomCode::Bacterial => "ICNP",
            NomCode::Botanical => "ICN",
            NomCode::Cultivars => "ICNCP",
            NomCode::Virus => "ICVCN",
            NomCode::Zoological => "ICZN",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            NomCode::Bacterial => "International Code of Nomenclature of Prokaryotes",
            NomCode::Botanical => "International Code of Nomenclature for algae, fungi, and plants",
            NomCode::Cultivars => "International Code of Nomenclature for Cultivated Plants",
            NomCode::Virus => "International Code of Virus Classification and Nomenclature",
            NomCode::Zoological => "International Code of Zoological Nomenclature",
        }
    }

    /// Looks up a code by acronym or constant name, ignoring case.
    pub fn from_acronym_or_name(value: &str) -> Option<NomCode> {
        use strum::IntoEnumIterator;
        let value = value.trim();
        NomCode::iter()
            .find(|c| c.acronym().eq_ignore_ascii_case(value) || c.as_str().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for NomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acronym_lookup() {
        assert_eq!(NomCode::from_acronym_or_name("icn"), Some(NomCode::Botanical));
        assert_eq!(NomCode::from_acronym_or_name("ZOOLOGICAL"), Some(NomCode::Zoological));
        assert_eq!(NomCode::from_acronym_or_name(" ICNP "), Some(NomCode::Bacterial));
        assert_eq!(NomCode::from_acronym_or_name("ICBN"), None);
    }
}
