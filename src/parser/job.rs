//! One parse of a scientific name.
//!
//! A [`ParsingJob`] owns the working copy of the name and the
//! [`ParsedName`] under construction. It first tries the special cases (manual
//! overrides, OTU codes, BOLD placeholders), then runs the incremental
//! pipeline: extraction of notes and references, normalization, the
//! structural grammar with its fallbacks and the final classification.

use std::sync::LazyLock;
use std::time::Duration;

use log::debug;
use regex::{NoExpand, Regex};

use super::cleaner::{clean_strong, pre_clean};
use super::error::ParseError;
use super::executor::WorkerPool;
use super::extract::{
    detect_further_unparsable, extract_nom_status, extract_published_in, extract_sec_reference,
    is_virus, is_virus_after_failure, preparse_nom_ref, remove_placeholder_author,
};
use super::grammar::{MatchMode, NameMatch, match_name};
use super::normalize::{norm_ws_punct, normalize, normalize_strong};
use super::overrides::ParserConfigs;
use super::patterns::{
    ALL_KEYS, AUTHOR, FAMILY_GROUP_KEYS, INFRAGENERIC, LATIN_ENDINGS, MONOMIAL, PLACEHOLDER_NAME,
    RANK_MARKER, RANK_MARKER_MICROBIAL, SUPRA_AND_INFRAGENERIC_KEYS, YEAR,
};
use super::post::{
    apply_doubtful_flag, check_blacklist, determine_code, determine_name_type, determine_rank,
    set_rank,
};
use super::rank_utils::{ALL_MARKERS, MICROBIAL_RANKS};
use crate::models::{
    Authorship, HYBRID_MARKER, NamePart, NameType, NomCode, ParsedName, Rank, State, warnings,
};

// ── Special cases ──

/// BOLD BIN and UNITE species hypothesis codes.
static OTU: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(BOLD:[0-9A-Z]{7}$|SH[0-9]{6,8}\.[0-9]{2}FU)").unwrap()
});

static GTDB_OTU_MONOMIAL: LazyLock<String> = LazyLock::new(|| {
    let block = "(?:(?:[A-Z]+(?:[a-z]{1,2}[A-Z]*)?)?[0-9]+b?[A-Z]*|FULL|COMBO|bin)";
    format!("(?:(?:{block}-?)*{block}(?:_[A-Z])?|[A-Z][a-z]{{2,}}_[A-Z])")
});

static GTDB_MONOMIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("^{}$", &*GTDB_OTU_MONOMIAL)).unwrap());

static GTDB_BINOMIAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^({}) +(sp[0-9]+)$", &*GTDB_OTU_MONOMIAL)).unwrap()
});

/// BOLD style placeholders like "Abies_ABC" or "Pinus_AB_2".
static BOLD_PLACEHOLDERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]+)_?([A-Z]{1,5}(?:_\d+)?)$").unwrap());

static UNPARSABLE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][a-z]+)( [a-z]+?)?(?: species)?[ _-]group$").unwrap());

// ── Pre-parsing ──

static EXTINCT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[†‡✝]+\s*").unwrap());

static CANDIDATUS_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)"(Candidatus\s|Ca\.)(.+)""#).unwrap());

static CANDIDATUS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Candidatus\s|Ca\.").unwrap());

/// Outdated bacterial "serotype" style markers.
static TYPE_TO_VAR: LazyLock<Regex> = LazyLock::new(|| {
    let prefixes: Vec<String> = MICROBIAL_RANKS
        .iter()
        .map(|r| r.as_str().to_lowercase())
        .filter_map(|r| r.strip_suffix("var").map(str::to_string))
        .collect();
    Regex::new(&format!(r"\b({})type\b", prefixes.join("|"))).unwrap()
});

/// A single upper case letter as infraspecific epithet of a form.
static INFRASPEC_UPPER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(forma? )([A-Z])\b").unwrap());

static REMOVE_PLACEHOLDER_INFRAGENERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\( ?{PLACEHOLDER_NAME} ?\) ")).unwrap()
});

static PLACEHOLDER_GENUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:In|Dummy|Missing|Temp|Unknown|Unplaced|Unspecified) [a-z]").unwrap()
});

static IS_GENE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:RNA|DNA)[0-9]*(?:\b|_)").unwrap());

static FAMILY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^[A-Z][a-z]*(?:aceae|idae) +({})\b",
        &*FAMILY_GROUP_KEYS
    ))
    .unwrap()
});

static SUPRA_RANK_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({})[. ] *", &*SUPRA_AND_INFRAGENERIC_KEYS)).unwrap()
});

static CULTIVAR_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b["']?((?:[A-ZÏËÖÜÄÉÈČÁÀÆŒ][a-zïëöüäåéèčáàæœ]{2,}[- ]?){1,3})["']? (Group|Hybrids|Sort|[Gg]rex|gx)\b"#).unwrap()
});

static CULTIVAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?:([. ])cv[. ])?["'] ?((?:[A-ZÏËÖÜÄÉÈČÁÀÆŒ]?[a-zïëöüäåéèčáàæœ]+[- ]?){1,3}) ?["']"#).unwrap()
});

static NO_LETTERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^a-zA-Z]+$").unwrap());

static HYBRID_FORMULA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"[. ]{HYBRID_MARKER} ")).unwrap());

/// Manuscript names like "Verticordia sp.1" or "Acacia sp. (Dandaragan)".
static MANUSCRIPT_NAMES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(indet|spp?)[. ](?:nov\.)?[A-Z0-9][a-zA-Z0-9-]*(?:\(.+?\))?").unwrap()
});

/// Strain designations of GenBank names, e.g. "Advenella kashmirensis W13003".
static STRAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z]\.?) +([A-Z]+[ -]?)([0-9]+T?)$").unwrap());

static STRAIN_YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(&format!("^{YEAR}")).unwrap());

static RANK_MARKER_AT_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"[ .](?:notho)? *({}|{})[. ]?(?:Ad|Lv)?\.?$",
        &*ALL_KEYS, &*RANK_MARKER_MICROBIAL
    ))
    .unwrap()
});

/// "f." at the end is more often filius than forma.
static FILIUS_AT_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ .]f\.?$").unwrap());

static ABBREV_AUTHOR_PREFIXES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\b(v\.(?:d\.)?)({})", &*AUTHOR)).unwrap());

static REMOVE_INTER_RANKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b((?:subsp|ssp|var)[ .].+)\b({}\b.{{2,}})",
        &*RANK_MARKER
    ))
    .unwrap()
});

/// "senior" as epithet would be taken for an author suffix.
static SENIOR_EPITHET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({}(?:{})?)(?:\b| )senior\b",
        &*MONOMIAL, &*INFRAGENERIC
    ))
    .unwrap()
});

static POTENTIAL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^×?{}\b", &*MONOMIAL)).unwrap());

static RANK_MARKER_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^(?:notho)? *(?:{})\.?$", &*ALL_KEYS)).unwrap());

fn replace_range(s: &str, start: usize, end: usize, with: &str) -> String {
    format!("{}{}{}", &s[..start], with, &s[end..])
}

fn trim_to_none(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parses a single scientific name.
pub(crate) struct ParsingJob<'a> {
    scientific_name: &'a str,
    cleaned: String,
    rank: Rank,
    configs: &'a ParserConfigs,
    pool: &'a WorkerPool,
    timeout: Duration,
    pn: ParsedName,
    name_type: Option<NameType>,
    ignore_authorship: bool,
    name: String,
    state: Option<State>,
}

type JobResult<T> = Result<T, ParseError>;

impl<'a> ParsingJob<'a> {
    pub(crate) fn new(
        scientific_name: &'a str,
        rank: Rank,
        code: Option<NomCode>,
        configs: &'a ParserConfigs,
        pool: &'a WorkerPool,
        timeout: Duration,
    ) -> Self {
        let mut pn = ParsedName::new();
        pn.rank = rank;
        pn.code = code;
        let (cleaned, issues) = pre_clean(scientific_name);
        for issue in issues {
            pn.add_warning(issue);
        }
        Self {
            scientific_name,
            name: cleaned.clone(),
            cleaned,
            rank,
            configs,
            pool,
            timeout,
            pn,
            name_type: None,
            ignore_authorship: false,
            state: None,
        }
    }

    pub(crate) fn run(mut self) -> JobResult<ParsedName> {
        if !self.special_cases()? {
            self.parse()?;
        }
        if let Some(name_type) = self.name_type {
            self.pn.name_type = name_type;
        }
        debug!("Parsed {}: {:?}", self.scientific_name, self.pn);
        Ok(self.pn)
    }

    fn unparsable<T>(&self, name_type: NameType) -> JobResult<T> {
        Err(ParseError::unparsable(name_type, self.scientific_name))
    }

    /// Returns true if a special case fully parsed the name.
    fn special_cases(&mut self) -> JobResult<bool> {
        if let Some(over) = self.configs.for_name(&self.name) {
            debug!("Manual override found for name: {}", self.name);
            self.name_type = Some(over.name_type);
            self.pn = over;
            return Ok(true);
        }

        if let Some(caps) = OTU.captures(&self.name) {
            self.pn.set_uninomial(Some(caps[1].to_uppercase()));
            self.otu(Rank::Unranked);
            return Ok(true);
        }
        if GTDB_MONOMIAL.is_match(&self.name) {
            self.pn.set_uninomial(Some(self.name.clone()));
            self.otu(Rank::Unranked);
            return Ok(true);
        }
        if let Some(caps) = GTDB_BINOMIAL.captures(&self.name) {
            self.pn.set_genus(Some(caps[1].to_string()));
            self.pn.set_specific_epithet(Some(caps[2].to_string()));
            self.otu(Rank::Species);
            return Ok(true);
        }

        if let Some(caps) = BOLD_PLACEHOLDERS.captures(&self.name) {
            self.pn.set_uninomial(Some(caps[1].to_string()));
            self.pn.strain = Some(caps[2].to_string());
            self.pn.state = State::Complete;
            check_blacklist(&mut self.pn);
            self.name_type = Some(NameType::Placeholder);
            determine_code(&mut self.pn, self.name_type);
            determine_rank(&mut self.pn);
            return Ok(true);
        }

        if let Some(caps) = UNPARSABLE_GROUP.captures(&self.name) {
            let Some(epithet) = caps.get(2) else {
                return self.unparsable(NameType::Placeholder);
            };
            self.pn.set_genus(Some(caps[1].to_string()));
            self.pn.set_specific_epithet(Some(epithet.as_str().trim().to_string()));
            self.pn.state = State::Complete;
            self.pn.rank = Rank::SpeciesAggregate;
            self.name_type = Some(NameType::Scientific);
            check_blacklist(&mut self.pn);
            determine_code(&mut self.pn, self.name_type);
            return Ok(true);
        }
        Ok(false)
    }

    fn otu(&mut self, rank: Rank) {
        self.name_type = Some(NameType::Otu);
        self.pn.rank = rank;
        self.pn.state = State::Complete;
    }

    fn parse(&mut self) -> JobResult<()> {
        if EXTINCT.is_match(&self.name) {
            self.pn.extinct = true;
            self.name = EXTINCT.replace(&self.name, "").into_owned();
        }

        // quotes are gone after cleaning, so look at the raw input
        if let Some(caps) = CANDIDATUS_QUOTE.captures(self.scientific_name) {
            self.pn.candidatus = true;
            let unquoted = CANDIDATUS_QUOTE.replace(self.scientific_name, NoExpand(&caps[2]));
            self.name = pre_clean(&unquoted).0;
        }

        if let Some(name) = preparse_nom_ref(&self.name, &mut self.pn) {
            self.name = name;
            self.state = Some(State::Partial);
        }

        self.name = TYPE_TO_VAR.replace_all(&self.name, "${1}var").into_owned();

        // a single letter epithet is swapped for a dummy and restored after parsing
        let mut infraspec_upper = None;
        if let Some(caps) = INFRASPEC_UPPER.captures(&self.name) {
            infraspec_upper = Some(caps[2].to_string());
            self.name = INFRASPEC_UPPER.replace(&self.name, "${1}vulgaris").into_owned();
            self.name_type = Some(NameType::Informal);
        }

        self.name = remove_placeholder_author(&self.name, &mut self.pn);
        if REMOVE_PLACEHOLDER_INFRAGENERIC.is_match(&self.name) {
            self.name = REMOVE_PLACEHOLDER_INFRAGENERIC.replace(&self.name, "").into_owned();
            self.name_type = Some(NameType::Placeholder);
        }
        if let Some(m) = PLACEHOLDER_GENUS.find(&self.name) {
            // keep the lower case letter that was matched
            self.name = replace_range(&self.name, 0, m.end() - 1, "? ");
            self.name_type = Some(NameType::Placeholder);
        }

        if let Some(name_type) = detect_further_unparsable(&self.name) {
            return self.unparsable(name_type);
        }
        if is_virus(&self.name) {
            return self.unparsable(NameType::Virus);
        }
        if IS_GENE.is_match(&self.name) {
            self.name_type = Some(NameType::Informal);
        }

        self.name = normalize(&self.name);
        debug!("Normalized name: {}", self.name);
        if self.name.trim().is_empty() {
            return self.unparsable(NameType::NoName);
        }

        self.name = FAMILY_PREFIX.replace(&self.name, "$1").into_owned();
        if let Some(caps) = SUPRA_RANK_PREFIX.captures(&self.name) {
            if let Some(rank) = ALL_MARKERS.get(&caps[1].replace('.', "")) {
                self.pn.rank = *rank;
            }
            self.name = SUPRA_RANK_PREFIX.replace(&self.name, "").into_owned();
        }

        // cultivars before strong normalization removes their quotes
        self.extract_cultivar();

        if NO_LETTERS.is_match(&self.name) {
            return self.unparsable(NameType::NoName);
        }
        if HYBRID_FORMULA.is_match(&self.name) {
            return self.unparsable(NameType::HybridFormula);
        }
        if CANDIDATUS.is_match(&self.name) {
            self.pn.candidatus = true;
            self.name = CANDIDATUS.replace(&self.name, "").into_owned();
        }

        self.name = extract_nom_status(&self.name, &mut self.pn);
        let manuscript_epithet = self.extract_manuscript_name();
        self.extract_strain();
        self.name = extract_sec_reference(&self.name, &mut self.pn);
        self.extract_rank_marker_at_end();
        self.name = extract_published_in(&self.name, &mut self.pn);
        let author_prefixes = self.protect_author_prefixes();
        self.remove_intermediate_ranks();

        // ranks known now win over the ones derived from the parsed parts
        let preparsing_rank = self.pn.rank;

        let senior = SENIOR_EPITHET.is_match(&self.name);
        if senior {
            self.name = SENIOR_EPITHET.replace(&self.name, "${1} zenior").into_owned();
        }

        let name_strongly = normalize_strong(&self.name, &mut self.pn);
        debug!("Strongly normalized name: {}", name_strongly);
        if name_strongly.is_empty() {
            // remarks parsed out already act as a placeholder
            if self.pn.has_name() {
                self.pn.state = State::Complete;
                self.name_type = Some(NameType::Placeholder);
                return Ok(());
            }
            return self.unparsable(NameType::NoName);
        }

        if !self.parse_normalized(&name_strongly) {
            if is_virus_after_failure(&name_strongly) {
                return self.unparsable(NameType::Virus);
            }
            if POTENTIAL_NAME.is_match(&self.name) {
                return self.unparsable(NameType::Scientific);
            }
            return self.unparsable(NameType::NoName);
        }

        if senior {
            self.pn.set_specific_epithet(Some("senior".to_string()));
        }
        if !author_prefixes.is_empty() {
            apply_author_prefixes(&author_prefixes, &mut self.pn.basionym_authorship);
            apply_author_prefixes(&author_prefixes, &mut self.pn.combination_authorship);
        }
        if let Some(epithet) = manuscript_epithet {
            if self.pn.specific_epithet.is_none() {
                self.pn.set_specific_epithet(Some(epithet));
            } else {
                self.pn.set_infraspecific_epithet(Some(epithet));
            }
        }
        if infraspec_upper.is_some() {
            self.pn.set_infraspecific_epithet(infraspec_upper);
        }
        if self.rank != preparsing_rank {
            self.pn.rank = preparsing_rank;
        }
        if let Some(state) = self.state {
            self.pn.state = state;
        }

        determine_name_type(&mut self.pn, &mut self.name_type, &self.name);
        check_blacklist(&mut self.pn);
        apply_doubtful_flag(
            &mut self.pn,
            self.name_type.unwrap_or(NameType::Scientific),
            &self.cleaned,
        );
        determine_rank(&mut self.pn);
        determine_code(&mut self.pn, self.name_type);
        Ok(())
    }

    fn extract_cultivar(&mut self) {
        // a cultivar group never starts the name
        let from = self.name.chars().next().map_or(0, char::len_utf8);
        if let Some(caps) = CULTIVAR_GROUP.captures_at(&self.name, from) {
            let group = caps[2].to_string();
            self.pn.cultivar_epithet = Some(caps[1].to_string());
            self.pn.rank = if group.eq_ignore_ascii_case("grex") || group == "gx" {
                Rank::Grex
            } else {
                Rank::CultivarGroup
            };
            if let Some(m) = caps.get(0) {
                self.name = replace_range(&self.name, m.start(), m.end(), " ");
            }
        }

        if let Some(caps) = CULTIVAR.captures(&self.name) {
            self.pn.cultivar_epithet = Some(caps[2].to_string());
            self.pn.rank = Rank::Cultivar;
            self.name = CULTIVAR.replace(&self.name, "${1}").into_owned();
        }
    }

    /// Removes manuscript epithets like "sp. 1", returning them for later reuse.
    fn extract_manuscript_name(&mut self) -> Option<String> {
        let caps = MANUSCRIPT_NAMES.captures(&self.name)?;
        let epithet = caps[0].to_string();
        let marker = caps[1].replace("indet", "sp");
        self.name_type = Some(NameType::Informal);
        set_rank(&mut self.pn, Some(&marker), false);
        self.pn.manuscript = true;
        self.name = MANUSCRIPT_NAMES.replace(&self.name, "").into_owned();
        Some(epithet)
    }

    fn extract_strain(&mut self) {
        let Some(caps) = STRAIN.captures(&self.name) else {
            return;
        };
        if STRAIN_YEAR.is_match(&caps[3]) {
            return;
        }
        let strain = format!("{}{}", &caps[2], &caps[3]);
        debug!("Strain: {}", strain);
        let keep = caps[1].to_string();
        self.name = STRAIN.replace(&self.name, NoExpand(&keep)).into_owned();
        self.name_type = Some(NameType::Informal);
        self.pn.strain = Some(strain);
    }

    /// A trailing rank marker without epithet marks an indetermined name.
    fn extract_rank_marker_at_end(&mut self) {
        let Some(caps) = RANK_MARKER_AT_END.captures(&self.name) else {
            return;
        };
        if FILIUS_AT_END.is_match(&self.name) {
            return;
        }
        self.ignore_authorship = true;
        if self.pn.cultivar_epithet.is_none() {
            let marker = caps[1].to_string();
            set_rank(&mut self.pn, Some(&marker), false);
        }
        self.name = RANK_MARKER_AT_END.replace(&self.name, "").into_owned();
    }

    /// Abbreviated author prefixes like "v." would be taken for rank markers.
    fn protect_author_prefixes(&mut self) -> Vec<(String, String)> {
        let mut prefixes = Vec::new();
        let name = ABBREV_AUTHOR_PREFIXES.replace_all(&self.name, |caps: &regex::Captures| {
            prefixes.push((caps[2].to_string(), caps[1].to_string()));
            caps[2].to_string()
        });
        self.name = name.into_owned();
        prefixes
    }

    fn remove_intermediate_ranks(&mut self) {
        let Some(caps) = REMOVE_INTER_RANKS.captures(&self.name) else {
            return;
        };
        if caps[2].starts_with("hort.ex") {
            return;
        }
        self.pn
            .add_warning(format!("{}{}", warnings::INTERMEDIATE_CLASSIFICATION_PREFIX, &caps[1]));
        if let Some(m) = caps.get(0) {
            let kept = caps[2].to_string();
            self.name = replace_range(&self.name, m.start(), m.end(), &kept);
        }
    }

    // ── Grammar ──

    fn match_grammar(&self, name: &str, mode: MatchMode) -> Option<NameMatch> {
        let owned = name.to_string();
        self.pool
            .run_with_deadline(self.timeout, self.scientific_name, move |deadline| {
                match_name(&owned, mode, deadline)
            })
            .flatten()
    }

    /// Tries the full grammar, then on aggressively cleaned input, then as prefix.
    fn parse_normalized(&mut self, name: &str) -> bool {
        if let Some(m) = self.match_grammar(name, MatchMode::Full) {
            self.pn.state = State::Complete;
            self.apply_match(m);
            return true;
        }

        let dirty = norm_ws_punct(&clean_strong(name));
        if !dirty.is_empty() && dirty != name {
            if let Some(m) = self.match_grammar(&dirty, MatchMode::Full) {
                debug!("Parsed dirty name {}", dirty);
                self.pn.state = State::Complete;
                self.pn.doubtful = true;
                self.pn.add_warning(warnings::DIRTY_NAME);
                self.apply_match(m);
                return true;
            }
        }

        if let Some(m) = self.match_grammar(name, MatchMode::Prefix) {
            match m.remainder.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
                Some(rest) => {
                    debug!("Partial match with unparsed remains \"{}\" for: {}", rest, name);
                    self.pn.state = State::Partial;
                    self.pn.add_unparsed(rest);
                }
                None => self.pn.state = State::Complete,
            }
            self.apply_match(m);
            return true;
        }
        false
    }

    fn apply_match(&mut self, m: NameMatch) {
        self.set_uninomial_or_genus(&m);

        let bracket_subgenus = m.subgenus.is_some();
        if bracket_subgenus {
            self.pn.set_infrageneric_epithet(trim_to_none(m.subgenus.as_deref()));
        } else if m.infrageneric_epithet.is_some() {
            set_rank(&mut self.pn, m.infrageneric_marker.as_deref(), false);
            self.pn
                .set_infrageneric_epithet(trim_to_none(m.infrageneric_epithet.as_deref()));
        }

        self.set_epithet_qualifier(NamePart::Specific, m.species_qualifier.as_deref());
        self.pn.set_specific_epithet(trim_to_none(m.specific_epithet.as_deref()));
        if m
            .superfluous_epithet
            .as_deref()
            .is_some_and(|e| e.chars().count() > 1 && !e.contains("null"))
        {
            // four parted names are below subspecies
            self.pn.rank = Rank::InfrasubspecificName;
        }
        self.set_epithet_qualifier(NamePart::Infraspecific, m.infraspecific_qualifier.as_deref());
        set_rank(&mut self.pn, m.infraspecific_marker.as_deref(), false);
        self.pn
            .set_infraspecific_epithet(trim_to_none(m.infraspecific_epithet.as_deref()));

        if m.microbial_marker.is_some() {
            set_rank(&mut self.pn, m.microbial_marker.as_deref(), false);
            self.pn.set_infraspecific_epithet(m.microbial_epithet.clone());
        }
        if m.indet_marker.is_some() {
            set_rank(&mut self.pn, m.indet_marker.as_deref(), false);
            self.ignore_authorship = true;
        }

        self.look_for_irregular_rank_marker();
        if self.pn.is_indetermined() {
            self.ignore_authorship = true;
        }

        if !self.ignore_authorship {
            let block = &m.authorship;
            self.pn.combination_authorship = block.combination.to_authorship();
            if let Some(sanctioning) = &block.combination.sanctioning_author {
                self.pn.sanctioning_author = Some(sanctioning.clone());
            }
            self.pn.basionym_authorship = block.basionym.to_authorship();
            if bracket_subgenus && self.infrageneric_is_author() {
                // a bracket author rather than a subgenus
                let author = self.pn.infrageneric_epithet.take();
                self.pn.basionym_authorship = Authorship::authors(author);
                if self.pn.genus.is_some()
                    && self.pn.specific_epithet.is_none()
                    && self.pn.infraspecific_epithet.is_none()
                {
                    let genus = self.pn.genus.take();
                    self.pn.set_uninomial(genus);
                }
                debug!("Swapped subgenus with bracket author: {:?}", self.pn.basionym_authorship);
            }
        }
    }

    /// The first word is the genus of a bi- or trinomial, a uninomial or a standalone infrageneric epithet.
    fn set_uninomial_or_genus(&mut self, m: &NameMatch) {
        let monomial = trim_to_none(Some(m.monomial.as_str()));
        if m.subgenus.is_some()
            || m.infrageneric_epithet.is_some()
            || m.specific_epithet.is_some()
            || m.infraspecific_epithet.is_some()
            || self.pn.rank.is_species_or_below()
        {
            self.pn.set_genus(monomial);
        } else if self.pn.rank.is_infrageneric_strictly() {
            self.pn.set_infrageneric_epithet(monomial);
        } else {
            self.pn.set_uninomial(monomial);
        }
    }

    fn set_epithet_qualifier(&mut self, part: NamePart, qualifier: Option<&str>) {
        if let Some(qualifier) = qualifier {
            self.name_type = Some(NameType::Informal);
            self.pn.set_epithet_qualifier(part, format!("{qualifier}."));
        }
    }

    fn infrageneric_is_author(&self) -> bool {
        let pn = &self.pn;
        pn.basionym_authorship.is_empty()
            && pn.specific_epithet.is_none()
            && pn.infraspecific_epithet.is_none()
            && !pn.rank.is_infrageneric_strictly()
            && pn
                .infrageneric_epithet
                .as_deref()
                .is_some_and(|e| !LATIN_ENDINGS.is_match(&e.to_lowercase()))
    }

    /// Epithets that are rank markers, e.g. "Coccyzus americanus ssp.".
    fn look_for_irregular_rank_marker(&mut self) {
        if self.pn.rank.is_other_or_unranked() {
            if let Some(epithet) = self.pn.infraspecific_epithet.clone() {
                if RANK_MARKER_ONLY.is_match(&epithet) {
                    set_rank(&mut self.pn, Some(&epithet), false);
                    self.pn.infraspecific_epithet = None;
                }
            }
            if let Some(epithet) = self.pn.specific_epithet.clone() {
                if RANK_MARKER_ONLY.is_match(&epithet) {
                    set_rank(&mut self.pn, Some(&epithet), false);
                    self.pn.specific_epithet = None;
                }
            }
        } else if self.pn.rank == Rank::Species && self.pn.infraspecific_epithet.is_some() {
            // sp. misused as subspecies marker
            self.pn.rank = Rank::Subspecies;
            self.pn.add_warning(warnings::SUBSPECIES_ASSIGNED);
        }
    }
}

fn apply_author_prefixes(prefixes: &[(String, String)], authorship: &mut Authorship) {
    for author in authorship
        .authors
        .iter_mut()
        .chain(authorship.ex_authors.iter_mut())
    {
        if let Some((_, prefix)) = prefixes.iter().find(|(name, _)| name == author) {
            *author = format!("{prefix}{author}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> JobResult<ParsedName> {
        parse_with_rank(name, Rank::Unranked)
    }

    fn parse_with_rank(name: &str, rank: Rank) -> JobResult<ParsedName> {
        let configs = ParserConfigs::new();
        let pool = WorkerPool::new(2, Duration::from_millis(200));
        ParsingJob::new(name, rank, None, &configs, &pool, Duration::from_secs(5)).run()
    }

    fn failure(name: &str) -> NameType {
        match parse(name) {
            Err(e) => e.name_type(),
            Ok(pn) => panic!("{name} should not parse, got {pn:?}"),
        }
    }

    #[test]
    fn test_otu_names() {
        let pn = parse("BOLD:AAA0001").unwrap();
        assert_eq!(pn.uninomial.as_deref(), Some("BOLD:AAA0001"));
        assert_eq!(pn.name_type, NameType::Otu);
        assert_eq!(pn.rank, Rank::Unranked);

        let pn = parse("sh123456.07fu").unwrap();
        assert_eq!(pn.uninomial.as_deref(), Some("SH123456.07FU"));

        let pn = parse("UBA1234 sp012345").unwrap();
        assert_eq!(pn.genus.as_deref(), Some("UBA1234"));
        assert_eq!(pn.specific_epithet.as_deref(), Some("sp012345"));
        assert_eq!(pn.rank, Rank::Species);
        assert_eq!(pn.name_type, NameType::Otu);
    }

    #[test]
    fn test_bold_placeholders_and_groups() {
        let pn = parse("Iteaphila_AB").unwrap();
        assert_eq!(pn.uninomial.as_deref(), Some("Iteaphila"));
        assert_eq!(pn.strain.as_deref(), Some("AB"));
        assert_eq!(pn.name_type, NameType::Placeholder);

        let pn = parse("Iteaphila macquarti group").unwrap();
        assert_eq!(pn.genus.as_deref(), Some("Iteaphila"));
        assert_eq!(pn.specific_epithet.as_deref(), Some("macquarti"));
        assert_eq!(pn.rank, Rank::SpeciesAggregate);

        assert_eq!(failure("Iteaphila-group"), NameType::Placeholder);
    }

    #[test]
    fn test_unparsable_names() {
        assert_eq!(failure("Tobacco mosaic virus"), NameType::Virus);
        assert_eq!(failure("Abies alba × Pinus nigra"), NameType::HybridFormula);
        assert_eq!(failure("incertae sedis"), NameType::Placeholder);
        assert_eq!(failure("Abies clade"), NameType::Informal);
        assert_eq!(failure("123 456"), NameType::NoName);
    }

    #[test]
    fn test_binomial_with_authorship() {
        let pn = parse("Abies alba Mill., 1768").unwrap();
        assert_eq!(pn.genus.as_deref(), Some("Abies"));
        assert_eq!(pn.specific_epithet.as_deref(), Some("alba"));
        assert_eq!(pn.combination_authorship.authors, vec!["Mill."]);
        assert_eq!(pn.combination_authorship.year.as_deref(), Some("1768"));
        assert_eq!(pn.rank, Rank::Species);
        assert_eq!(pn.code, Some(NomCode::Zoological));
        assert_eq!(pn.state, State::Complete);
        assert_eq!(pn.name_type, NameType::Scientific);
    }

    #[test]
    fn test_extinct_and_notes() {
        let pn = parse("†Abies alba Mill. nom. illeg.").unwrap();
        assert!(pn.extinct);
        assert_eq!(pn.specific_epithet.as_deref(), Some("alba"));
        assert_eq!(pn.nomenclatural_note.as_deref(), Some("nom.illeg."));
        assert_eq!(pn.code, Some(NomCode::Botanical));

        let pn = parse("Abies alba sensu Smith").unwrap();
        assert_eq!(pn.taxonomic_note.as_deref(), Some("sensu Smith"));
    }

    #[test]
    fn test_cultivars() {
        let pn = parse("Abies alba 'Blue Star'").unwrap();
        assert_eq!(pn.cultivar_epithet.as_deref(), Some("Blue Star"));
        assert_eq!(pn.rank, Rank::Cultivar);
        assert_eq!(pn.code, Some(NomCode::Cultivars));

        let pn = parse("Rhododendron Ilam Group").unwrap();
        assert_eq!(pn.uninomial.or(pn.genus).as_deref(), Some("Rhododendron"));
        assert_eq!(pn.cultivar_epithet.as_deref(), Some("Ilam"));
        assert_eq!(pn.rank, Rank::CultivarGroup);
    }

    #[test]
    fn test_indetermined_names() {
        let pn = parse("Abies sp.").unwrap();
        assert_eq!(pn.genus.as_deref(), Some("Abies"));
        assert_eq!(pn.specific_epithet, None);
        assert_eq!(pn.rank, Rank::Species);
        assert_eq!(pn.name_type, NameType::Informal);
        assert!(pn.warnings.contains(&warnings::INDETERMINED.to_string()));

        let pn = parse("Verticordia sp.1").unwrap();
        assert!(pn.manuscript);
        assert_eq!(pn.specific_epithet.as_deref(), Some("sp.1"));
        assert_eq!(pn.name_type, NameType::Informal);
    }

    #[test]
    fn test_strain_names() {
        let pn = parse("Pseudomonas putida W619").unwrap();
        assert_eq!(pn.genus.as_deref(), Some("Pseudomonas"));
        assert_eq!(pn.specific_epithet.as_deref(), Some("putida"));
        assert_eq!(pn.strain.as_deref(), Some("W619"));
        assert_eq!(pn.name_type, NameType::Informal);
    }

    #[test]
    fn test_candidatus() {
        let pn = parse("\"Candidatus Phytoplasma allocasuarinae\"").unwrap();
        assert!(pn.candidatus);
        assert_eq!(pn.genus.as_deref(), Some("Phytoplasma"));
        assert_eq!(pn.code, Some(NomCode::Bacterial));

        let pn = parse("Candidatus Liberibacter asiaticus").unwrap();
        assert!(pn.candidatus);
        assert_eq!(pn.specific_epithet.as_deref(), Some("asiaticus"));
    }

    #[test]
    fn test_external_rank_is_kept() {
        let pn = parse_with_rank("Abies", Rank::Genus).unwrap();
        assert_eq!(pn.uninomial.as_deref(), Some("Abies"));
        assert_eq!(pn.rank, Rank::Genus);
    }

    #[test]
    fn test_author_prefixes_are_restored() {
        let mut prefixes = vec![("Berg".to_string(), "v.d.".to_string())];
        prefixes.push(("Hoeven".to_string(), "v.".to_string()));
        let mut authorship = Authorship::authors(["Berg", "Smith"]);
        authorship.ex_authors = vec!["Hoeven".to_string()];
        apply_author_prefixes(&prefixes, &mut authorship);
        assert_eq!(authorship.authors, vec!["v.d.Berg", "Smith"]);
        assert_eq!(authorship.ex_authors, vec!["v.Hoeven"]);
    }
}
