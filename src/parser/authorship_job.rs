//! Parsing of a standalone authorship string, e.g. "(L.) Mill., 1768".

use std::time::Duration;

use log::debug;

use super::author_grammar::match_standalone;
use super::cleaner::pre_clean;
use super::error::ParseError;
use super::executor::WorkerPool;
use super::extract::{
    detect_further_unparsable, extract_nom_status, extract_published_in, extract_sec_reference,
    preparse_nom_ref, remove_placeholder_author,
};
use super::normalize::{no_q_marks, norm_brackets, norm_ws_punct, normalize, normalize_hort};
use crate::models::{ParsedAuthorship, ParsedName, State};

pub(crate) struct AuthorshipParsingJob<'a> {
    authorship: &'a str,
    pool: &'a WorkerPool,
    timeout: Duration,
    pn: ParsedName,
}

impl<'a> AuthorshipParsingJob<'a> {
    pub(crate) fn new(authorship: &'a str, pool: &'a WorkerPool, timeout: Duration) -> Self {
        Self {
            authorship,
            pool,
            timeout,
            pn: ParsedName::new(),
        }
    }

    fn unparsable<T>(&self) -> Result<T, ParseError> {
        Err(ParseError::UnparsableAuthorship {
            authorship: self.authorship.to_string(),
        })
    }

    pub(crate) fn run(mut self) -> Result<ParsedAuthorship, ParseError> {
        let (mut name, issues) = pre_clean(self.authorship);
        for issue in issues {
            self.pn.add_warning(issue);
        }

        let mut state = None;
        if let Some(stripped) = preparse_nom_ref(&name, &mut self.pn) {
            name = stripped;
            state = Some(State::Partial);
        }
        name = remove_placeholder_author(&name, &mut self.pn);
        if detect_further_unparsable(&name).is_some() {
            return self.unparsable();
        }

        name = normalize(&name);
        if name.is_empty() {
            return self.unparsable();
        }
        name = extract_nom_status(&name, &mut self.pn);
        name = extract_sec_reference(&name, &mut self.pn);
        name = extract_published_in(&name, &mut self.pn);

        name = normalize_hort(&name);
        name = no_q_marks(&name, &mut self.pn);
        name = norm_brackets(&name);
        name = norm_ws_punct(&name);
        debug!("Parse normed authorship: {}", name);

        let owned = name.clone();
        let matched = self
            .pool
            .run_with_deadline(self.timeout, self.authorship, move |_| {
                Ok(match_standalone(&owned))
            })
            .flatten();
        let Some((block, rest)) = matched else {
            return self.unparsable();
        };

        match rest {
            Some(rest) => {
                debug!("Partial match with unparsed remains \"{}\" for: {}", rest, name);
                self.pn.state = State::Partial;
                self.pn.add_unparsed(&rest);
            }
            None => self.pn.state = State::Complete,
        }
        self.pn.basionym_authorship = block.basionym.to_authorship();
        self.pn.combination_authorship = block.combination.to_authorship();
        if let Some(sanctioning) = block.combination.sanctioning_author {
            self.pn.sanctioning_author = Some(sanctioning);
        }
        if let Some(state) = state {
            self.pn.state = state;
        }
        Ok(self.pn.authorship())
    }
}
