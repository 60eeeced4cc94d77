//! Manual overrides for names the parser gets wrong.
//!
//! Overrides are keyed by a loose normalization of the raw input so that
//! case, punctuation, whitespace and ligatures do not matter.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{LazyLock, PoisonError, RwLock};

use log::{debug, info, warn};
use regex::Regex;
use serde::Deserialize;

use super::cleaner::pre_clean;
use super::error::ConfigError;
use crate::models::{Authorship, ParsedAuthorship, ParsedName, State};
use crate::unicode::decompose;

static MORE_WS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\\s,.+'\"&_\u{2014}|-]+").unwrap());

static MORE_WS_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*([(){}\[\]]+)\s*").unwrap());

/// Lookup key of a raw name or authorship.
pub fn norm_key(raw: &str) -> String {
    let key = pre_clean(raw).0.to_lowercase();
    let key = decompose(&key);
    let key = MORE_WS.replace_all(&key, " ");
    MORE_WS_BRACKETS.replace_all(&key, " $1 ").into_owned()
}

/// One override entry as stored in a file.
///
/// `id` is the raw name and authorship separated by `|`.
#[derive(Debug, Deserialize)]
struct OverrideEntry {
    id: String,
    #[serde(flatten)]
    name: ParsedName,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OverrideFile {
    List(Vec<OverrideEntry>),
    Wrapped { result: Vec<OverrideEntry> },
}

impl OverrideFile {
    fn into_entries(self) -> Vec<OverrideEntry> {
        match self {
            Self::List(entries) | Self::Wrapped { result: entries } => entries,
        }
    }
}

/// Thread safe table of overrides for names and authorships.
#[derive(Debug, Default)]
pub struct ParserConfigs {
    names: RwLock<HashMap<String, ParsedName>>,
    authorships: RwLock<HashMap<String, ParsedAuthorship>>,
}

impl ParserConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_name(&self, name: &str) -> Option<ParsedName> {
        let names = self.names.read().unwrap_or_else(PoisonError::into_inner);
        names.get(&norm_key(name)).cloned()
    }

    pub fn for_authorship(&self, authorship: &str) -> Option<ParsedAuthorship> {
        let authorships = self
            .authorships
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        authorships.get(&norm_key(authorship)).cloned()
    }

    pub fn set_name(&self, name: &str, pn: ParsedName) {
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        names.insert(norm_key(name), pn);
    }

    pub fn delete_name(&self, name: &str) -> Option<ParsedName> {
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        names.remove(&norm_key(name))
    }

    pub fn set_authorship(&self, authorship: &str, pa: ParsedAuthorship) {
        let mut authorships = self
            .authorships
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        authorships.insert(norm_key(authorship), pa);
    }

    pub fn delete_authorship(&self, authorship: &str) -> Option<ParsedAuthorship> {
        let mut authorships = self
            .authorships
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        authorships.remove(&norm_key(authorship))
    }

    pub fn len(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers the expected result for a name and its optional authorship.
    ///
    /// With an authorship three entries are stored: the full name, the name
    /// without authorship and the authorship on its own.
    pub fn add(&self, scientific_name: &str, authorship: Option<&str>, mut pn: ParsedName) {
        debug!("Add config for {} {:?}", scientific_name, authorship);
        if pn.state == State::None {
            // a NONE state would report the whole name as unparsed
            pn.state = State::Complete;
        }
        let authorship = authorship.map(str::trim).filter(|a| !a.is_empty());
        let full = match authorship {
            Some(a) => format!("{} {}", scientific_name.trim(), a),
            None => scientific_name.trim().to_string(),
        };

        if let Some(authorship) = authorship.filter(|_| pn.has_authorship()) {
            self.set_authorship(authorship, pn.authorship());
            let mut without = pn.clone();
            without.combination_authorship = Authorship::default();
            without.basionym_authorship = Authorship::default();
            without.sanctioning_author = None;
            self.set_name(scientific_name, without);
        }
        self.set_name(&full, pn);
    }

    /// Loads override entries from a JSON or YAML file.
    ///
    /// The file holds a list of entries, optionally wrapped in a `result`
    /// object. Returns the number of entries added.
    pub fn load_file(&self, path: &Path) -> Result<usize, ConfigError> {
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let file: OverrideFile = match extension.as_str() {
            "json" => serde_json::from_str(&content)?,
            "yaml" | "yml" => serde_yaml::from_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let entries = file.into_entries();
        let total = entries.len();
        let mut failed = 0;
        for entry in entries {
            let mut ids = entry.id.splitn(2, '|');
            match ids.next().map(str::trim).filter(|n| !n.is_empty()) {
                Some(name) => self.add(name, ids.next(), entry.name),
                None => {
                    warn!("Failed to load parser config without name: {}", entry.id);
                    failed += 1;
                }
            }
        }
        info!(
            "Loaded {} parser configs from {}. {} failed",
            total - failed,
            path.display(),
            failed
        );
        Ok(total - failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NameType, Rank};
    use std::io::Write;

    #[test]
    fn test_norm_key() {
        assert_eq!(norm_key("zur Strassen,  1973"), "zur strassen 1973");
        assert_eq!(norm_key("zur Strassen,1973"), "zur strassen 1973");
        assert_eq!(norm_key(" zur Strassen, 1973"), "zur strassen 1973");
        assert_eq!(norm_key("(zur Strassen, 1973)"), " ( zur strassen 1973 ) ");
        assert_eq!(
            norm_key("( zur Strassen, 1973 )Markus"),
            " ( zur strassen 1973 ) markus"
        );
        assert_eq!(
            norm_key("( zúr Straßen, 1973 )Märkus"),
            " ( zúr strassen 1973 ) märkus"
        );
        assert_eq!(
            norm_key("Coccinella 2-puſtulata Linnæus, 1758"),
            "coccinella 2 pustulata linnaeus 1758"
        );
    }

    fn abies_alba() -> ParsedName {
        let mut pn = ParsedName::new();
        pn.genus = Some("Abies".to_string());
        pn.specific_epithet = Some("alba".to_string());
        pn.rank = Rank::Species;
        pn.combination_authorship = Authorship::authors(["Mill."]);
        pn
    }

    #[test]
    fn test_add_registers_three_keys() {
        let configs = ParserConfigs::new();
        configs.add("Abies alba", Some("Mill."), abies_alba());

        let full = configs.for_name("Abies  alba MILL.").unwrap();
        assert_eq!(full.state, State::Complete);
        assert!(full.has_authorship());

        let bare = configs.for_name("abies alba").unwrap();
        assert!(!bare.has_authorship());
        assert_eq!(bare.specific_epithet.as_deref(), Some("alba"));

        let authorship = configs.for_authorship("Mill.").unwrap();
        assert_eq!(authorship.combination_authorship.authors, vec!["Mill."]);

        assert!(configs.delete_name("Abies alba Mill.").is_some());
        assert!(configs.for_name("Abies alba Mill.").is_none());
        assert!(configs.delete_authorship("Mill.").is_some());
    }

    #[test]
    fn test_load_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[
                {{"id": "Abies alba|Mill.", "genus": "Abies", "specific_epithet": "alba",
                  "rank": "SPECIES", "combination_authorship": {{"authors": ["Mill."]}}}},
                {{"id": "|", "uninomial": "Nothing"}},
                {{"id": "Lepidoptera", "uninomial": "Lepidoptera", "rank": "ORDER"}}
            ]"#
        )
        .unwrap();

        let configs = ParserConfigs::new();
        let loaded = configs.load_file(file.path()).unwrap();
        assert_eq!(loaded, 2);
        assert_eq!(configs.for_name("Lepidoptera").unwrap().rank, Rank::Order);
        assert!(configs.for_name("Abies alba").is_some());
        assert_eq!(
            configs.for_name("Abies alba Mill.").unwrap().name_type,
            NameType::Scientific
        );
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        write!(
            file,
            "result:\n  - id: \"Iris germanica|\"\n    genus: Iris\n    specific_epithet: germanica\n    type: INFORMAL\n"
        )
        .unwrap();

        let configs = ParserConfigs::new();
        assert_eq!(configs.load_file(file.path()).unwrap(), 1);
        let pn = configs.for_name("Iris germanica").unwrap();
        assert_eq!(pn.name_type, NameType::Informal);
    }

    #[test]
    fn test_unsupported_format() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            configs_load(file.path()),
            Err(ConfigError::UnsupportedFormat(ext)) if ext == "txt"
        ));
    }

    fn configs_load(path: &Path) -> Result<usize, ConfigError> {
        ParserConfigs::new().load_file(path)
    }
}
