//! Title attribute extraction
//!
//! Every field is found by a first-match-wins scan over an ordered rule list.
//! A field that no rule recognizes stays unset; extraction never fails.

use super::normalizer;
use super::types::{AttributeRecord, EducationLevel};
use crate::config::{AliasTable, MatcherProfile, RootConfig};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::trace;

/// Maps a level pattern match to (level, grade digit)
type LevelExtractor = fn(&Captures) -> (EducationLevel, Option<String>);

static BRACKET_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*\[([가-힣a-zA-Z0-9]+)\]").expect("bracket prefix pattern is valid")
});

/// Level rules in priority order: level with grade digit, then bare level
static LEVEL_RULES: Lazy<Vec<(Regex, LevelExtractor)>> = Lazy::new(|| {
    let rules: [(&str, LevelExtractor); 8] = [
        (r"초등?\s*([0-9])", |c| (EducationLevel::Elementary, grade(c))),
        (r"중등?\s*([0-9])", |c| (EducationLevel::Middle, grade(c))),
        (r"중학?\s*([0-9])", |c| (EducationLevel::Middle, grade(c))),
        (r"고등?\s*([0-9])", |c| (EducationLevel::High, grade(c))),
        (r"초등", |_| (EducationLevel::Elementary, None)),
        (r"중등", |_| (EducationLevel::Middle, None)),
        (r"중학", |_| (EducationLevel::Middle, None)),
        (r"고등", |_| (EducationLevel::High, None)),
    ];
    rules
        .into_iter()
        .map(|(pattern, extract)| {
            (
                Regex::new(pattern).expect("level pattern is valid"),
                extract,
            )
        })
        .collect()
});

static TERM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]-[0-9]").expect("term pattern is valid"));

static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"20[0-9]{2}").expect("year pattern is valid"));

static KEYWORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[가-힣a-zA-Z]{2,}").expect("keyword pattern is valid"));

fn grade(captures: &Captures) -> Option<String> {
    captures.get(1).map(|m| m.as_str().to_string())
}

/// Parses listing titles into attribute records
#[derive(Debug, Clone)]
pub struct Extractor {
    profile: MatcherProfile,
    /// Known series, first hit by list order wins
    series: Vec<String>,
    /// Subject vocabulary, first hit by list order wins
    subjects: Vec<String>,
    stopwords: HashSet<String>,
    aliases: AliasTable,
}

impl Extractor {
    pub fn new(
        profile: MatcherProfile,
        series: Vec<String>,
        subjects: Vec<String>,
        stopwords: Vec<String>,
        aliases: AliasTable,
    ) -> Self {
        Self {
            profile,
            series,
            subjects,
            stopwords: stopwords.into_iter().collect(),
            aliases,
        }
    }

    /// Build an extractor from the configured vocabularies
    pub fn from_config(config: &RootConfig, profile: MatcherProfile) -> Self {
        Self::new(
            profile,
            config.series.clone(),
            config.subjects.clone(),
            config.stopwords.clone(),
            config.aliases.clone(),
        )
    }

    pub fn profile(&self) -> &MatcherProfile {
        &self.profile
    }

    /// Text the attributes are read from: the cleaned title when the profile
    /// removes noise, the raw title otherwise
    pub fn working_text<'t>(&self, title: &'t str) -> Cow<'t, str> {
        if self.profile.noise_removal {
            Cow::Owned(normalizer::clean(title))
        } else {
            Cow::Borrowed(title)
        }
    }

    /// Parse a title into an attribute record
    pub fn extract(&self, title: &str) -> AttributeRecord {
        let working = self.working_text(title);
        let text = working.as_ref();

        let mut record = AttributeRecord::default();

        // The bracket prefix is read from the raw title since cleaning drops brackets
        self.extract_series(title, text, &mut record);

        if let Some((level, grade)) = extract_level(text) {
            record.level = Some(level);
            record.grade = grade;
        }

        record.subject = self
            .subjects
            .iter()
            .find(|subject| text.contains(subject.as_str()))
            .cloned();

        record.term = TERM.find(text).map(|m| m.as_str().to_string());
        record.year = YEAR.find(text).and_then(|m| m.as_str().parse().ok());
        record.keywords = self.extract_keywords(text);

        trace!(?record, "Extracted attributes from '{}'", title);
        record
    }

    fn extract_series(&self, raw: &str, text: &str, record: &mut AttributeRecord) {
        if let Some(captures) = BRACKET_PREFIX.captures(raw) {
            record.series = captures.get(1).map(|m| m.as_str().to_string());
        }

        // Cleaning drops bracketed spans, so the raw title is scanned second
        let haystacks = if text == raw { vec![text] } else { vec![text, raw] };

        if record.series.is_none() {
            record.series = haystacks.iter().find_map(|haystack| {
                self.series
                    .iter()
                    .find(|series| haystack.contains(series.as_str()))
                    .cloned()
            });
        }

        if !self.profile.use_aliases {
            return;
        }

        if record.series.is_none() {
            if let Some((canonical, alias)) = haystacks
                .iter()
                .find_map(|haystack| self.aliases.find_alias(haystack))
            {
                record.series = Some(alias.to_string());
                record.series_normalized = Some(canonical.to_string());
            }
        }

        if record.series_normalized.is_none() {
            record.series_normalized = record
                .series
                .as_deref()
                .and_then(|series| self.aliases.normalize(series))
                .map(str::to_string);
        }
    }

    fn extract_keywords(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        KEYWORD
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|word| !self.stopwords.contains(*word))
            .filter(|word| !self.profile.dedupe_keywords || seen.insert(*word))
            .map(str::to_string)
            .collect()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::from_config(&RootConfig::default(), MatcherProfile::default())
    }
}

fn extract_level(text: &str) -> Option<(EducationLevel, Option<String>)> {
    LEVEL_RULES
        .iter()
        .find_map(|(pattern, extract)| pattern.captures(text).map(|c| extract(&c)))
}
