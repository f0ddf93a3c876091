use crate::store::CatalogRecord;
use serde::{Deserialize, Serialize};

/// One constraint of a cascade predicate.
///
/// Title containment follows SQL `LIKE '%value%'` semantics: substring match,
/// ASCII letters compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Title contains the value
    /// Example: { type = "title_contains", value = "오투" }
    TitleContains { value: String },

    /// Title contains at least one of the values (logical OR)
    /// Example: { type = "title_contains_any", values = ["중2", "중등2", "중학2"] }
    TitleContainsAny { values: Vec<String> },

    /// Publication year is one of the listed years
    YearIn { years: Vec<i32> },
}

/// Bound parameter of a rendered SQL condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Text(String),
    Int(i64),
}

impl std::fmt::Display for SqlParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlParam::Text(s) => write!(f, "'{}'", s),
            SqlParam::Int(i) => write!(f, "{}", i),
        }
    }
}

impl Condition {
    pub fn title_contains(value: impl Into<String>) -> Self {
        Condition::TitleContains {
            value: value.into(),
        }
    }

    /// Evaluate against a catalog row
    pub fn matches(&self, record: &CatalogRecord) -> bool {
        match self {
            Condition::TitleContains { value } => like_contains(&record.title, value),
            Condition::TitleContainsAny { values } => {
                values.iter().any(|value| like_contains(&record.title, value))
            }
            Condition::YearIn { years } => record
                .year
                .map(|year| years.contains(&year))
                .unwrap_or(false),
        }
    }

    /// Render as a SQL boolean expression over `title` and `year`, pushing its parameters
    pub fn to_sql(&self, params: &mut Vec<SqlParam>) -> String {
        match self {
            Condition::TitleContains { value } => {
                params.push(SqlParam::Text(like_pattern(value)));
                "title LIKE ? ESCAPE '\\'".to_string()
            }
            Condition::TitleContainsAny { values } => {
                if values.is_empty() {
                    return "0".to_string();
                }
                let parts: Vec<&str> = values
                    .iter()
                    .map(|value| {
                        params.push(SqlParam::Text(like_pattern(value)));
                        "title LIKE ? ESCAPE '\\'"
                    })
                    .collect();
                format!("({})", parts.join(" OR "))
            }
            Condition::YearIn { years } => {
                if years.is_empty() {
                    return "0".to_string();
                }
                let parts: Vec<&str> = years
                    .iter()
                    .map(|year| {
                        params.push(SqlParam::Int(i64::from(*year)));
                        "year = ?"
                    })
                    .collect();
                format!("({})", parts.join(" OR "))
            }
        }
    }
}

/// `%value%` with LIKE wildcards in the value escaped
fn like_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn like_contains(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
