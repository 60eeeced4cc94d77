use crate::models::NameType;

/// Error type for name and authorship parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A name that cannot be represented as a parsed name, e.g. a virus or a hybrid formula
    Unparsable { name_type: NameType, name: String },

    /// An authorship string that does not follow the author team grammar
    UnparsableAuthorship { authorship: String },
}

impl ParseError {
    pub fn unparsable(name_type: NameType, name: impl Into<String>) -> Self {
        Self::Unparsable {
            name_type,
            name: name.into(),
        }
    }

    pub fn name_type(&self) -> NameType {
        match self {
            Self::Unparsable { name_type, .. } => *name_type,
            Self::UnparsableAuthorship { .. } => NameType::NoName,
        }
    }

    /// The original input string as given by the caller.
    pub fn name(&self) -> &str {
        match self {
            Self::Unparsable { name, .. } => name,
            Self::UnparsableAuthorship { authorship } => authorship,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparsable { name_type, name } => {
                write!(f, "Unparsable {} name: {}", name_type, name)
            }
            Self::UnparsableAuthorship { authorship } => {
                write!(f, "Unparsable authorship: {}", authorship)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Invalid parser settings.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsError {
    /// Timeouts below the minimum would cancel even trivial names
    TimeoutTooSmall { timeout_ms: u64, minimum_ms: u64 },

    /// The worker pool needs at least one thread
    NoWorkers,
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimeoutTooSmall {
                timeout_ms,
                minimum_ms,
            } => write!(
                f,
                "Timeout of {}ms is below the minimum of {}ms",
                timeout_ms, minimum_ms
            ),
            Self::NoWorkers => write!(f, "The worker pool needs at least one worker"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Errors loading override entries from disk.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Yaml(serde_yaml::Error),
    /// File extension is neither json nor yaml/yml
    UnsupportedFormat(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Failed to read override file: {}", e),
            Self::Json(e) => write!(f, "Invalid JSON override file: {}", e),
            Self::Yaml(e) => write!(f, "Invalid YAML override file: {}", e),
            Self::UnsupportedFormat(ext) => {
                write!(f, "Unsupported override file format: {}", ext)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Yaml(e) => Some(e),
            Self::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ParseError::unparsable(NameType::Placeholder, "Biota incertae sedis");
        assert_eq!(
            err.to_string(),
            "Unparsable PLACEHOLDER name: Biota incertae sedis"
        );
        assert_eq!(err.name(), "Biota incertae sedis");
        assert_eq!(err.name_type(), NameType::Placeholder);

        let err = ParseError::UnparsableAuthorship {
            authorship: "1234 ###".to_string(),
        };
        assert_eq!(err.to_string(), "Unparsable authorship: 1234 ###");
        assert_eq!(err.name_type(), NameType::NoName);
    }
}
