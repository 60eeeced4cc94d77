//! Scientific name parser.
//!
//! Splits a scientific name string into its atomic parts using a staged
//! pipeline:
//! 1. Special cases (manual overrides, OTU codes, BOLD placeholders)
//! 2. Cleaning (html entities, homoglyphs, quotes)
//! 3. Extraction of notes, references, cultivars, strains and rank markers
//! 4. Normalization, careful and then strong
//! 5. Structural grammar match with dirty and prefix fallbacks, each attempt
//!    bounded by a deadline on the worker pool
//! 6. Classification of name type, rank and nomenclatural code
//!
//! Names that cannot be represented fail with a [`ParseError`] carrying the
//! [`NameType`](crate::models::NameType) and the original string.

mod author_grammar;
mod authorship_job;
mod cleaner;
mod error;
mod executor;
mod extract;
mod grammar;
mod job;
mod normalize;
mod overrides;
mod patterns;
mod post;
pub mod rank_utils;


use std::path::Path;
use std::time::Duration;

use derive_builder::Builder;
use log::info;

pub use error::{ConfigError, ParseError, SettingsError};
pub use overrides::{ParserConfigs, norm_key};

use authorship_job::AuthorshipParsingJob;
use executor::WorkerPool;
use job::ParsingJob;

use crate::models::{NameType, NomCode, ParsedAuthorship, ParsedName, Rank};

pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
pub const MIN_TIMEOUT_MS: u64 = 10;
pub const DEFAULT_MAX_WORKERS: usize = 100;

/// Tuning of the parser's deadline and worker pool.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(build_fn(skip))]
pub struct ParserSettings {
    /// Deadline of a single grammar match attempt.
    pub timeout_ms: u64,
    pub max_workers: usize,
    /// Idle time after which a worker thread exits.
    pub keep_alive_ms: u64,
}

impl ParserSettingsBuilder {
    pub fn build(&self) -> Result<ParserSettings, SettingsError> {
        let timeout_ms = self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
        let settings = ParserSettings {
            timeout_ms,
            max_workers: self.max_workers.unwrap_or(DEFAULT_MAX_WORKERS),
            keep_alive_ms: self.keep_alive_ms.unwrap_or(2 * timeout_ms),
        };
        settings.validate()?;
        Ok(settings)
    }
}

impl ParserSettings {
    fn validate(&self) -> Result<(), SettingsError> {
        check_timeout(self.timeout_ms)?;
        if self.max_workers == 0 {
            return Err(SettingsError::NoWorkers);
        }
        Ok(())
    }
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_workers: DEFAULT_MAX_WORKERS,
            keep_alive_ms: 2 * DEFAULT_TIMEOUT_MS,
        }
    }
}

fn check_timeout(timeout_ms: u64) -> Result<(), SettingsError> {
    if timeout_ms < MIN_TIMEOUT_MS {
        return Err(SettingsError::TimeoutTooSmall {
            timeout_ms,
            minimum_ms: MIN_TIMEOUT_MS,
        });
    }
    Ok(())
}

/// Parses scientific names and authorships.
///
/// Reuse one instance: it owns the worker pool hosting the grammar attempts
/// and the override table. Dropping it shuts the pool down.
pub struct NameParser {
    configs: ParserConfigs,
    pool: WorkerPool,
    timeout: Duration,
}

impl NameParser {
    pub fn new() -> Self {
        Self::build(ParserSettings::default())
    }

    pub fn with_settings(settings: ParserSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self::build(settings))
    }

    fn build(settings: ParserSettings) -> Self {
        info!(
            "Create new name parser with {}ms timeout",
            settings.timeout_ms
        );
        Self {
            configs: ParserConfigs::new(),
            pool: WorkerPool::new(
                settings.max_workers,
                Duration::from_millis(settings.keep_alive_ms),
            ),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    pub fn set_timeout(&mut self, timeout_ms: u64) -> Result<(), SettingsError> {
        check_timeout(timeout_ms)?;
        info!("Change name parser timeout to {}ms", timeout_ms);
        self.timeout = Duration::from_millis(timeout_ms);
        Ok(())
    }

    /// The override table consulted before any parsing.
    pub fn configs(&self) -> &ParserConfigs {
        &self.configs
    }

    /// Loads overrides from a JSON or YAML file, see [`ParserConfigs::load_file`].
    pub fn load_overrides(&self, path: &Path) -> Result<usize, ConfigError> {
        self.configs.load_file(path)
    }

    /// Parses a scientific name, optionally with a known rank and code.
    ///
    /// A known rank helps telling infrageneric names from bracket authors.
    pub fn parse(
        &self,
        scientific_name: &str,
        rank: Option<Rank>,
        code: Option<NomCode>,
    ) -> Result<ParsedName, ParseError> {
        if scientific_name.trim().is_empty() {
            return Err(ParseError::unparsable(NameType::NoName, scientific_name));
        }
        ParsingJob::new(
            scientific_name,
            rank.unwrap_or(Rank::Unranked),
            code,
            &self.configs,
            &self.pool,
            self.timeout,
        )
        .run()
    }

    /// Parses an authorship on its own, e.g. "(L.) Mill. nom. illeg.".
    pub fn parse_authorship(&self, authorship: &str) -> Result<ParsedAuthorship, ParseError> {
        if authorship.trim().is_empty() {
            return Err(ParseError::UnparsableAuthorship {
                authorship: authorship.to_string(),
            });
        }
        if let Some(over) = self.configs.for_authorship(authorship) {
            log::debug!("Manual override found for authorship: {}", authorship);
            return Ok(over);
        }
        AuthorshipParsingJob::new(authorship, &self.pool, self.timeout).run()
    }
}

impl Default for NameParser {
    fn default() -> Self {
        Self::new()
    }
}
