use serde::{Deserialize, Serialize};

/// An author team with optional ex authors and a publication year.
///
/// Ex authors are kept in botanical order: in "Baker f. ex Rose" the ex
/// author is "Baker f." and the validating author is "Rose".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Authorship {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ex_authors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

impl Authorship {
    pub fn new(authors: Vec<String>, ex_authors: Vec<String>, year: Option<String>) -> Self {
        Self {
            authors,
            ex_authors,
            year,
        }
    }

    pub fn authors<I, S>(authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            authors: authors.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn has_authors(&self) -> bool {
        !self.authors.is_empty()
    }

    pub fn has_ex_authors(&self) -> bool {
        !self.ex_authors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty() && self.ex_authors.is_empty() && self.year.is_none()
    }

    pub fn exists(&self) -> bool {
        !self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(Authorship::default().is_empty());
        assert!(Authorship::default().with_year("1824").exists());
        let a = Authorship::authors(["L."]);
        assert!(a.has_authors());
        assert!(!a.has_ex_authors());
    }

    #[test]
    fn test_empty_fields_are_not_serialized() {
        let json = serde_json::to_string(&Authorship::authors(["Mill."])).unwrap();
        assert_eq!(json, r#"{"authors":["Mill."]}"#);
    }
}
