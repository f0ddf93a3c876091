use serde::{Deserialize, Serialize};

/// One canonical series name and the spellings that map to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// Name used when querying the catalog
    pub canonical: String,
    /// Accepted spellings and abbreviations, canonical name included
    pub aliases: Vec<String>,
}

impl AliasEntry {
    pub fn new(canonical: &str, aliases: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Ordered canonical -> aliases lookup.
///
/// Lookups scan entries in declaration order and return the first hit, so an
/// entry declared earlier wins when two alias sets overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new(entries: Vec<AliasEntry>) -> Self {
        Self { entries }
    }

    /// Canonical name of the first entry with an alias contained in `text`
    pub fn normalize(&self, text: &str) -> Option<&str> {
        self.find_alias(text).map(|(canonical, _)| canonical)
    }

    /// First (canonical, alias) pair whose alias is contained in `text`
    pub fn find_alias(&self, text: &str) -> Option<(&str, &str)> {
        self.entries.iter().find_map(|entry| {
            entry
                .aliases
                .iter()
                .find(|alias| !alias.is_empty() && text.contains(alias.as_str()))
                .map(|alias| (entry.canonical.as_str(), alias.as_str()))
        })
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::new(vec![
            AliasEntry::new("오투", &["오투", "O2", "o2"]),
            AliasEntry::new("쎈", &["쎈", "SEN", "sen"]),
            AliasEntry::new("자이스토리", &["자이스토리", "Xistory", "xistory", "자이"]),
            AliasEntry::new("마더텅", &["마더텅", "mother", "Mother"]),
            AliasEntry::new("개념원리", &["개념원리", "개념"]),
            AliasEntry::new("완자", &["완자", "wanja"]),
            AliasEntry::new("풍산자", &["풍산자", "풍산"]),
        ])
    }
}
