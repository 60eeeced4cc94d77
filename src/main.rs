use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;
use serde_json::{Map, Value, json};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use sciname::cli::Cli;
use sciname::formatter::parsed_authorship_complete;
use sciname::{
    NameParser, ParseError, ParserSettingsBuilder, canonical_name, canonical_name_complete,
    canonical_name_with_authorship,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let settings = ParserSettingsBuilder::default()
        .timeout_ms(cli.timeout)
        .build()
        .context("Invalid parser settings")?;
    let parser = NameParser::with_settings(settings)?;

    if let Some(overrides) = &cli.overrides {
        let loaded = parser
            .load_overrides(Path::new(overrides))
            .with_context(|| format!("Failed to load overrides from {}", overrides))?;
        info!("Loaded {} overrides", loaded);
    }

    let names: Vec<String> = match &cli.input {
        Some(input) => fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input))?
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        None => cli.names.clone(),
    };

    let start = Instant::now();
    let results: Vec<Value> = if cli.input.is_some() {
        let bar = create_progress_bar(names.len() as u64);
        let results = names
            .par_iter()
            .map(|name| {
                let value = parse_one(&parser, &cli, name);
                bar.inc(1);
                value
            })
            .collect();
        bar.finish_and_clear();
        results
    } else {
        names.iter().map(|name| parse_one(&parser, &cli, name)).collect()
    };
    debug!("Parsed {} names in {:?}", results.len(), start.elapsed());

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for value in &results {
        let line = if cli.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn parse_one(parser: &NameParser, cli: &Cli, input: &str) -> Value {
    let mut record = Map::new();
    record.insert("input".to_string(), Value::String(input.to_string()));

    if cli.authorship {
        match parser.parse_authorship(input) {
            Ok(pa) => {
                record.insert("parsed".to_string(), Value::Bool(true));
                if let Some(complete) = parsed_authorship_complete(&pa, cli.code) {
                    record.insert("authorship".to_string(), Value::String(complete));
                }
                merge(&mut record, serde_json::to_value(&pa));
            }
            Err(err) => insert_error(&mut record, &err),
        }
        return Value::Object(record);
    }

    match parser.parse(input, cli.rank, cli.code) {
        Ok(pn) => {
            record.insert("parsed".to_string(), Value::Bool(true));
            record.insert("canonical_name".to_string(), json!(canonical_name(&pn)));
            record.insert(
                "canonical_name_with_authorship".to_string(),
                json!(canonical_name_with_authorship(&pn)),
            );
            record.insert(
                "canonical_name_complete".to_string(),
                json!(canonical_name_complete(&pn)),
            );
            merge(&mut record, serde_json::to_value(&pn));
        }
        Err(err) => insert_error(&mut record, &err),
    }
    Value::Object(record)
}

fn merge(record: &mut Map<String, Value>, value: serde_json::Result<Value>) {
    match value {
        Ok(Value::Object(fields)) => record.extend(fields),
        Ok(_) => {}
        Err(err) => {
            record.insert("error".to_string(), Value::String(err.to_string()));
        }
    }
}

fn insert_error(record: &mut Map<String, Value>, err: &ParseError) {
    debug!("{}", err);
    record.insert("parsed".to_string(), Value::Bool(false));
    let name_type = match err {
        ParseError::Unparsable { name_type, .. } => Some(name_type.as_str()),
        ParseError::UnparsableAuthorship { .. } => None,
    };
    if let Some(name_type) = name_type {
        record.insert("type".to_string(), Value::String(name_type.to_string()));
    }
    record.insert("error".to_string(), Value::String(err.to_string()));
}

fn create_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} names parsed ({eta})")
    {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}
