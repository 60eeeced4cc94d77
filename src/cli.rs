use std::str::FromStr;

use clap::Parser;

use crate::models::{NomCode, Rank};
use crate::parser::DEFAULT_TIMEOUT_MS;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scientific names to parse
    #[arg(required_unless_present = "input")]
    pub names: Vec<String>,

    /// File with one name per line
    #[arg(short, long, conflicts_with = "names")]
    pub input: Option<String>,

    /// Parse the inputs as authorships only
    #[arg(short, long)]
    pub authorship: bool,

    /// Known rank of the names, e.g. SPECIES or GENUS
    #[arg(short, long, value_parser = parse_rank)]
    pub rank: Option<Rank>,

    /// Known nomenclatural code, by name or acronym like ICZN
    #[arg(short, long, value_parser = parse_code)]
    pub code: Option<NomCode>,

    /// Deadline in milliseconds for a single grammar match
    #[arg(short, long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// JSON or YAML file with manual parser overrides
    #[arg(short, long)]
    pub overrides: Option<String>,

    /// Pretty print each JSON result
    #[arg(short, long)]
    pub pretty: bool,

    /// Log debug output of the parsing stages
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_rank(value: &str) -> Result<Rank, String> {
    Rank::from_str(&value.replace([' ', '-'], "_")).map_err(|_| format!("unknown rank: {value}"))
}

fn parse_code(value: &str) -> Result<NomCode, String> {
    NomCode::from_acronym_or_name(value).ok_or_else(|| format!("unknown nomenclatural code: {value}"))
}
