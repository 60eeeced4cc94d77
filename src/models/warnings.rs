//! Human readable warnings attached to parsed names.

pub const NULL_EPITHET: &str = "epithet with literal value null";
pub const HOMOGLYPHS: &str = "homoglyphs replaced";
pub const UNUSUAL_CHARACTERS: &str = "unusual characters";
pub const SUBSPECIES_ASSIGNED: &str = "Name was considered species but contains infraspecific epithet";
pub const LC_MONOMIAL: &str = "lower case monomial match";
pub const INDETERMINED: &str = "indetermined name missing its terminal epithet";
pub const HIGHER_RANK_BINOMIAL: &str = "binomial with rank higher than species aggregate";
pub const QUESTION_MARKS_REMOVED: &str = "question marks removed";
pub const MISSING_GENUS: &str = "epithet without genus";
pub const RANK_MISMATCH: &str = "rank does not fit the parsed name";
pub const HTML_ENTITIES: &str = "html entities unescaped";
pub const XML_TAGS: &str = "xml tags removed";
pub const BLACKLISTED_EPITHET: &str = "blacklisted epithet used";
pub const NOMENCLATURAL_REFERENCE: &str = "nomenclatural reference removed";
pub const AUTHORSHIP_REMOVED: &str = "authorship placeholder removed";
pub const DIRTY_NAME: &str = "name only parsed after aggressive cleaning";

/// Prefix of the warning added when an intermediate classification is dropped.
pub const INTERMEDIATE_CLASSIFICATION_PREFIX: &str = "Intermediate classification removed: ";
