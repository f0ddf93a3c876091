use serde::{Deserialize, Serialize};

use super::aliases::AliasTable;

/// Widest year window the cascade will query
pub const MAX_YEAR_WINDOW: u8 = 2;

/// Named matcher presets, from strict to loose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProfileName {
    /// Raw titles, ±1 year, no alias table
    Basic,
    /// Cleaned titles, ±1 year, alias table
    Aggressive,
    /// Cleaned titles, ±2 years, alias table
    #[default]
    Ultra,
}

impl std::fmt::Display for ProfileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileName::Basic => write!(f, "basic"),
            ProfileName::Aggressive => write!(f, "aggressive"),
            ProfileName::Ultra => write!(f, "ultra"),
        }
    }
}

/// Effective matcher behaviour for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherProfile {
    pub name: ProfileName,
    /// Strip promotional noise before extraction
    pub noise_removal: bool,
    /// Years on each side of the extracted year accepted by the strictest level
    pub year_window: u8,
    /// Consult the alias table for series discovery and normalization
    pub use_aliases: bool,
    /// Drop repeated keywords
    pub dedupe_keywords: bool,
    /// Row cap per cascade query
    pub row_limit: usize,
}

impl MatcherProfile {
    pub fn preset(name: ProfileName) -> Self {
        let (noise_removal, year_window, use_aliases, dedupe_keywords) = match name {
            ProfileName::Basic => (false, 1, false, false),
            ProfileName::Aggressive => (true, 1, true, true),
            ProfileName::Ultra => (true, 2, true, true),
        };
        Self {
            name,
            noise_removal,
            year_window,
            use_aliases,
            dedupe_keywords,
            row_limit: default_row_limit(),
        }
    }

    /// Year window clamped to the supported maximum
    pub fn effective_year_window(&self) -> i32 {
        i32::from(self.year_window.min(MAX_YEAR_WINDOW))
    }
}

impl Default for MatcherProfile {
    fn default() -> Self {
        Self::preset(ProfileName::default())
    }
}

/// Matcher section of the configuration file.
///
/// `profile` selects a preset; any field set here overrides that preset.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatcherSettings {
    #[serde(default)]
    pub profile: ProfileName,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noise_removal: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_window: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_aliases: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedupe_keywords: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_limit: Option<usize>,
}

impl MatcherSettings {
    /// Build the profile for a run, `name` taking precedence over the configured preset
    pub fn profile(&self, name: Option<ProfileName>) -> MatcherProfile {
        let mut profile = MatcherProfile::preset(name.unwrap_or(self.profile));
        if let Some(noise_removal) = self.noise_removal {
            profile.noise_removal = noise_removal;
        }
        if let Some(year_window) = self.year_window {
            profile.year_window = year_window;
        }
        if let Some(use_aliases) = self.use_aliases {
            profile.use_aliases = use_aliases;
        }
        if let Some(dedupe_keywords) = self.dedupe_keywords {
            profile.dedupe_keywords = dedupe_keywords;
        }
        if let Some(row_limit) = self.row_limit {
            profile.row_limit = row_limit;
        }
        profile
    }
}

/// Batch applier settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSettings {
    /// Writes per commit
    #[serde(default = "default_checkpoint_size")]
    pub checkpoint_size: usize,

    /// Listings between progress log lines
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,

    /// Resolutions logged individually at the start of a run
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            checkpoint_size: default_checkpoint_size(),
            progress_interval: default_progress_interval(),
            sample_size: default_sample_size(),
        }
    }
}

/// Root configuration file structure for isbn-matcher.yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    #[serde(default)]
    pub matcher: MatcherSettings,

    #[serde(default)]
    pub batch: BatchSettings,

    /// Known series, scanned in order
    #[serde(default = "default_series")]
    pub series: Vec<String>,

    /// Subject vocabulary, scanned in order
    #[serde(default = "default_subjects")]
    pub subjects: Vec<String>,

    /// Tokens never kept as keywords
    #[serde(default = "default_stopwords")]
    pub stopwords: Vec<String>,

    #[serde(default)]
    pub aliases: AliasTable,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            matcher: MatcherSettings::default(),
            batch: BatchSettings::default(),
            series: default_series(),
            subjects: default_subjects(),
            stopwords: default_stopwords(),
            aliases: AliasTable::default(),
        }
    }
}

fn default_row_limit() -> usize {
    5
}

fn default_checkpoint_size() -> usize {
    100
}

fn default_progress_interval() -> usize {
    100
}

fn default_sample_size() -> usize {
    10
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn default_series() -> Vec<String> {
    strings(&[
        "마더텅",
        "자이스토리",
        "오투",
        "완자",
        "쎈",
        "한끝",
        "개념",
        "풍산자",
        "일품",
        "수능특강",
        "개념원리",
    ])
}

pub fn default_subjects() -> Vec<String> {
    strings(&[
        "수학",
        "영어",
        "국어",
        "과학",
        "사회",
        "역사",
        "지리",
        "물리",
        "화학",
        "생물",
        "지구과학",
        "통합과학",
        "통합사회",
        "문학",
        "독서",
        "화법",
        "작문",
        "언어",
        "문법",
        "생명과학",
    ])
}

pub fn default_stopwords() -> Vec<String> {
    strings(&["선물", "사은품", "증정", "포함", "무료", "세트"])
}
