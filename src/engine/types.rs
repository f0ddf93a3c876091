use serde::{Deserialize, Serialize};

/// School level named in a title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Elementary,
    Middle,
    High,
}

impl EducationLevel {
    /// Canonical Korean label
    pub fn label(&self) -> &'static str {
        match self {
            EducationLevel::Elementary => "초등",
            EducationLevel::Middle => "중등",
            EducationLevel::High => "고등",
        }
    }

    /// Prefixes a grade digit may follow in catalog titles ("중" + "2" → "중2")
    pub fn grade_prefixes(&self) -> &'static [&'static str] {
        match self {
            EducationLevel::Elementary => &["초", "초등"],
            EducationLevel::Middle => &["중", "중등", "중학"],
            EducationLevel::High => &["고", "고등"],
        }
    }
}

impl std::fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Structured attributes parsed out of one listing title
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRecord {
    /// Series text as it appeared in the title
    pub series: Option<String>,
    /// Canonical series name from the alias table
    pub series_normalized: Option<String>,
    pub level: Option<EducationLevel>,
    /// Grade digit, e.g. "2"
    pub grade: Option<String>,
    pub subject: Option<String>,
    /// Semester unit, e.g. "2-1"
    pub term: Option<String>,
    pub year: Option<i32>,
    pub keywords: Vec<String>,
}

impl AttributeRecord {
    /// Series used for catalog queries: canonical name first, raw text otherwise
    pub fn effective_series(&self) -> Option<&str> {
        self.series_normalized
            .as_deref()
            .or(self.series.as_deref())
    }
}

/// Cascade levels, most specific first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeLevel {
    SeriesGradeSubjectTermYear,
    SeriesGradeSubjectTerm,
    SeriesGradeSubject,
    SeriesSubject,
    Series,
}

impl CascadeLevel {
    /// 1 for the most specific level, 5 for series alone
    pub fn rank(&self) -> u8 {
        match self {
            CascadeLevel::SeriesGradeSubjectTermYear => 1,
            CascadeLevel::SeriesGradeSubjectTerm => 2,
            CascadeLevel::SeriesGradeSubject => 3,
            CascadeLevel::SeriesSubject => 4,
            CascadeLevel::Series => 5,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CascadeLevel::SeriesGradeSubjectTermYear => "series+grade+subject+term+year",
            CascadeLevel::SeriesGradeSubjectTerm => "series+grade+subject+term",
            CascadeLevel::SeriesGradeSubject => "series+grade+subject",
            CascadeLevel::SeriesSubject => "series+subject",
            CascadeLevel::Series => "series",
        }
    }
}

impl std::fmt::Display for CascadeLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{} {}", self.rank(), self.description())
    }
}

/// Catalog match found for a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub isbn: String,
    /// Catalog title of the matched row
    pub catalog_title: String,
    /// Series the cascade queried with
    pub series: String,
    pub level: CascadeLevel,
}

/// Resolution of one listing, staged for the applier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub listing_id: i64,
    pub isbn: String,
    pub series: String,
    pub title: String,
    pub level: CascadeLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effective_series_prefers_normalized() {
        let attrs = AttributeRecord {
            series: Some("O2".to_string()),
            series_normalized: Some("오투".to_string()),
            ..Default::default()
        };
        assert_eq!(attrs.effective_series(), Some("오투"));

        let raw_only = AttributeRecord {
            series: Some("한끝".to_string()),
            ..Default::default()
        };
        assert_eq!(raw_only.effective_series(), Some("한끝"));
        assert_eq!(AttributeRecord::default().effective_series(), None);
    }

    #[test]
    fn test_cascade_level_order() {
        assert!(CascadeLevel::SeriesGradeSubjectTermYear < CascadeLevel::Series);
        assert_eq!(CascadeLevel::SeriesSubject.rank(), 4);
        assert_eq!(CascadeLevel::Series.to_string(), "L5 series");
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(EducationLevel::Middle.to_string(), "중등");
        assert_eq!(EducationLevel::High.grade_prefixes(), &["고", "고등"]);
    }
}
