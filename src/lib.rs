pub mod cli;
pub mod formatter;
pub mod models;
pub mod parser;
pub mod unicode;

pub use formatter::{
    authorship_complete, canonical_name, canonical_name_complete, canonical_name_minimal,
    canonical_name_with_authorship,
};
pub use models::{
    Authorship, NamePart, NameType, NomCode, ParsedAuthorship, ParsedName, Rank, State,
};
pub use parser::{
    ConfigError, NameParser, ParseError, ParserConfigs, ParserSettings, ParserSettingsBuilder,
    SettingsError,
};
