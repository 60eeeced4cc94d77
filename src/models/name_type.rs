use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a parsed (or unparsable) name string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NameType {
    /// A regular scientific name that follows a nomenclatural code.
    Scientific,
    Virus,
    /// A hybrid formula like "Abies alba × Pinus sylvestris".
    HybridFormula,
    /// A name with informal parts, e.g. "Abies sp." or "Abies cf. alba".
    Informal,
    /// Operational taxonomic unit identifiers like BOLD BINs.
    Otu,
    /// A placeholder such as "incertae sedis" or "unknown".
    Placeholder,
    NoName,
}

impl NameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NameType::Scientific => "SCIENTIFIC",
            NameType::Virus => "VIRUS",
            NameType::HybridFormula => "HYBRID_FORMULA",
            NameType::Informal => "INFORMAL",
            NameType::Otu => "OTU",
            NameType::Placeholder => "PLACEHOLDER",
            NameType::NoName => "NO_NAME",
        }
    }

    /// Only scientific and informal names are decomposed into name parts.
    pub fn is_parsable(&self) -> bool {
        matches!(self, NameType::Scientific | NameType::Informal)
    }
}

impl fmt::Display for NameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of a name a hybrid marker or an epithet qualifier refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamePart {
    Generic,
    Infrageneric,
    Specific,
    Infraspecific,
}

/// How much of the input string was consumed by the parser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    Complete,
    Partial,
    #[default]
    None,
}

impl State {
    pub fn is_parsed(&self) -> bool {
        *self != State::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsable_types() {
        assert!(NameType::Scientific.is_parsable());
        assert!(NameType::Informal.is_parsable());
        assert!(!NameType::Virus.is_parsable());
        assert!(!NameType::Placeholder.is_parsable());
        assert!(!NameType::NoName.is_parsable());
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(
            serde_json::to_string(&NameType::HybridFormula).unwrap(),
            "\"HYBRID_FORMULA\""
        );
        assert_eq!(NameType::NoName.to_string(), "NO_NAME");
        assert_eq!(
            serde_json::from_str::<NamePart>("\"INFRASPECIFIC\"").unwrap(),
            NamePart::Infraspecific
        );
    }
}
