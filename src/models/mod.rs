mod authorship;
mod name_type;
mod nom_code;
mod parsed_name;
mod rank;
pub mod warnings;

pub use authorship::Authorship;
pub use name_type::{NamePart, NameType, State};
pub use nom_code::NomCode;
pub use parsed_name::{HYBRID_MARKER, ParsedAuthorship, ParsedName};
pub use rank::{LINNEAN_RANKS, Rank};
