//! Cascade construction: one attribute record in, an ordered list of catalog
//! predicates out, most specific first.
//!
//! Each predicate is a standalone query, not a refinement of the previous
//! level's rows. Levels are only emitted when the attributes they constrain on
//! are present, and the series-only level is always last.

use super::conditions::{Condition, SqlParam};
use super::types::{AttributeRecord, CascadeLevel, EducationLevel};
use crate::config::MatcherProfile;
use crate::store::CatalogRecord;
use serde::{Deserialize, Serialize};

/// Columns every cascade query selects, in `CatalogRecord` field order
pub const CATALOG_COLUMNS: &str = "isbn, title, year, publisher_name";

/// One cascade level: a conjunction of conditions with a row cap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPredicate {
    pub level: CascadeLevel,
    pub conditions: Vec<Condition>,
    pub limit: usize,
}

impl MatchPredicate {
    /// True when every condition holds for the row
    pub fn matches(&self, record: &CatalogRecord) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }

    /// Render as a parameterized query against the `books` table.
    ///
    /// Rows are ordered by ISBN so "first row" is stable across runs.
    pub fn to_sql(&self) -> (String, Vec<SqlParam>) {
        let mut params = Vec::new();
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|c| c.to_sql(&mut params))
            .collect();

        let where_clause = if clauses.is_empty() {
            "1".to_string()
        } else {
            clauses.join(" AND ")
        };

        params.push(SqlParam::Int(self.limit as i64));
        let query = format!(
            "SELECT {} FROM books WHERE {} ORDER BY isbn ASC LIMIT ?",
            CATALOG_COLUMNS, where_clause
        );
        (query, params)
    }
}

/// Builds cascades for one matcher profile
#[derive(Debug, Clone)]
pub struct CascadeBuilder {
    year_window: i32,
    row_limit: usize,
}

impl CascadeBuilder {
    pub fn new(profile: &MatcherProfile) -> Self {
        Self {
            year_window: profile.effective_year_window(),
            row_limit: profile.row_limit.max(1),
        }
    }

    /// Ordered predicates for `attrs`; empty when no series was found
    pub fn build(&self, attrs: &AttributeRecord) -> Vec<MatchPredicate> {
        let Some(series) = attrs.effective_series() else {
            return Vec::new();
        };

        let series = Condition::title_contains(series);
        let grade = grade_condition(attrs.level, attrs.grade.as_deref());
        let subject = attrs.subject.as_deref().map(Condition::title_contains);
        let term = attrs.term.as_deref().map(Condition::title_contains);
        let years = attrs.year.map(|year| Condition::YearIn {
            years: (year - self.year_window..=year + self.year_window).collect(),
        });

        let has_grade = grade.is_some();
        let mut cascade = Vec::with_capacity(5);

        if has_grade && subject.is_some() && term.is_some() && years.is_some() {
            cascade.push(self.predicate(
                CascadeLevel::SeriesGradeSubjectTermYear,
                [&Some(series.clone()), &grade, &subject, &term, &years],
            ));
        }

        if has_grade && subject.is_some() && term.is_some() {
            cascade.push(self.predicate(
                CascadeLevel::SeriesGradeSubjectTerm,
                [&Some(series.clone()), &grade, &subject, &term, &None],
            ));
        }

        if has_grade && subject.is_some() {
            cascade.push(self.predicate(
                CascadeLevel::SeriesGradeSubject,
                [&Some(series.clone()), &grade, &subject, &None, &None],
            ));
        }

        if subject.is_some() {
            cascade.push(self.predicate(
                CascadeLevel::SeriesSubject,
                [&Some(series.clone()), &subject, &None, &None, &None],
            ));
        }

        cascade.push(self.predicate(
            CascadeLevel::Series,
            [&Some(series), &None, &None, &None, &None],
        ));

        cascade
    }

    fn predicate(&self, level: CascadeLevel, parts: [&Option<Condition>; 5]) -> MatchPredicate {
        MatchPredicate {
            level,
            conditions: parts.into_iter().flatten().cloned().collect(),
            limit: self.row_limit,
        }
    }
}

impl Default for CascadeBuilder {
    fn default() -> Self {
        Self::new(&MatcherProfile::default())
    }
}

/// Surface forms of a grade as an OR condition ("중2", "중등2", "중학2")
fn grade_condition(level: Option<EducationLevel>, grade: Option<&str>) -> Option<Condition> {
    let (level, grade) = (level?, grade?);
    Some(Condition::TitleContainsAny {
        values: level
            .grade_prefixes()
            .iter()
            .map(|prefix| format!("{}{}", prefix, grade))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProfileName;
    use crate::engine::extractor::Extractor;
    use pretty_assertions::assert_eq;

    fn levels(cascade: &[MatchPredicate]) -> Vec<CascadeLevel> {
        cascade.iter().map(|p| p.level).collect()
    }

    fn cascade_for(title: &str) -> Vec<MatchPredicate> {
        CascadeBuilder::default().build(&Extractor::default().extract(title))
    }

    #[test]
    fn test_no_series_no_cascade() {
        assert!(CascadeBuilder::default()
            .build(&AttributeRecord::default())
            .is_empty());
        assert!(cascade_for("중등 2 과학 2-1 2026").is_empty());
    }

    #[test]
    fn test_series_only_cascade() {
        let cascade = cascade_for("쎈");
        assert_eq!(levels(&cascade), vec![CascadeLevel::Series]);
        assert_eq!(
            cascade[0].conditions,
            vec![Condition::title_contains("쎈")]
        );
    }

    #[test]
    fn test_full_cascade() {
        let cascade = cascade_for("[오투] 중등 2 과학 2-1 2026");
        assert_eq!(
            levels(&cascade),
            vec![
                CascadeLevel::SeriesGradeSubjectTermYear,
                CascadeLevel::SeriesGradeSubjectTerm,
                CascadeLevel::SeriesGradeSubject,
                CascadeLevel::SeriesSubject,
                CascadeLevel::Series,
            ]
        );

        assert_eq!(
            cascade[0].conditions,
            vec![
                Condition::title_contains("오투"),
                Condition::TitleContainsAny {
                    values: vec!["중2".to_string(), "중등2".to_string(), "중학2".to_string()],
                },
                Condition::title_contains("과학"),
                Condition::title_contains("2-1"),
                Condition::YearIn {
                    years: vec![2024, 2025, 2026, 2027, 2028],
                },
            ]
        );
    }

    #[test]
    fn test_level_one_sql() {
        let cascade = cascade_for("[오투] 중등 2 과학 2-1 2026");
        let (sql, params) = cascade[0].to_sql();

        assert!(sql.starts_with("SELECT isbn, title, year, publisher_name FROM books WHERE "));
        assert!(sql.ends_with("ORDER BY isbn ASC LIMIT ?"));
        assert_eq!(
            params,
            vec![
                SqlParam::Text("%오투%".to_string()),
                SqlParam::Text("%중2%".to_string()),
                SqlParam::Text("%중등2%".to_string()),
                SqlParam::Text("%중학2%".to_string()),
                SqlParam::Text("%과학%".to_string()),
                SqlParam::Text("%2-1%".to_string()),
                SqlParam::Int(2024),
                SqlParam::Int(2025),
                SqlParam::Int(2026),
                SqlParam::Int(2027),
                SqlParam::Int(2028),
                SqlParam::Int(5),
            ]
        );
    }

    #[test]
    fn test_missing_year_skips_level_one() {
        let cascade = cascade_for("[오투] 중등 2 과학 2-1");
        assert_eq!(cascade[0].level, CascadeLevel::SeriesGradeSubjectTerm);
        assert_eq!(cascade.len(), 4);
    }

    #[test]
    fn test_missing_term_skips_to_grade_subject() {
        let cascade = cascade_for("[오투] 중등 2 과학 2026");
        assert_eq!(
            levels(&cascade),
            vec![
                CascadeLevel::SeriesGradeSubject,
                CascadeLevel::SeriesSubject,
                CascadeLevel::Series,
            ]
        );
    }

    #[test]
    fn test_missing_grade_skips_to_subject() {
        let cascade = cascade_for("[오투] 과학 2-1 2026");
        assert_eq!(
            levels(&cascade),
            vec![CascadeLevel::SeriesSubject, CascadeLevel::Series]
        );
    }

    #[test]
    fn test_missing_subject_skips_to_series() {
        let cascade = cascade_for("[오투] 중등 2 2-1 2026");
        assert_eq!(levels(&cascade), vec![CascadeLevel::Series]);
    }

    #[test]
    fn test_level_without_grade_adds_no_grade_condition() {
        let cascade = cascade_for("[한끝] 고등 국어");
        assert_eq!(
            levels(&cascade),
            vec![CascadeLevel::SeriesSubject, CascadeLevel::Series]
        );
    }

    #[test]
    fn test_year_window_from_profile() {
        let basic = CascadeBuilder::new(&MatcherProfile::preset(ProfileName::Basic));
        let attrs = Extractor::default().extract("[오투] 중등 2 과학 2-1 2026");
        let cascade = basic.build(&attrs);

        assert_eq!(
            cascade[0].conditions[4],
            Condition::YearIn {
                years: vec![2025, 2026, 2027],
            }
        );

        let mut exact = MatcherProfile::default();
        exact.year_window = 0;
        let cascade = CascadeBuilder::new(&exact).build(&attrs);
        assert_eq!(
            cascade[0].conditions[4],
            Condition::YearIn { years: vec![2026] }
        );
    }

    #[test]
    fn test_normalized_series_used_for_queries() {
        let cascade = cascade_for("O2 중2 과학");
        assert_eq!(
            cascade.last().unwrap().conditions,
            vec![Condition::title_contains("오투")]
        );
    }

    #[test]
    fn test_high_school_grade_forms() {
        let cascade = cascade_for("[자이스토리] 고2 수학");
        assert_eq!(
            cascade[0].conditions[1],
            Condition::TitleContainsAny {
                values: vec!["고2".to_string(), "고등2".to_string()],
            }
        );
    }

    #[test]
    fn test_row_limit_applied() {
        let mut profile = MatcherProfile::default();
        profile.row_limit = 3;
        let attrs = Extractor::default().extract("쎈 수학");
        let cascade = CascadeBuilder::new(&profile).build(&attrs);
        assert!(cascade.iter().all(|p| p.limit == 3));
    }

    #[test]
    fn test_predicate_matches_catalog_row() {
        let cascade = cascade_for("[오투] 중등 2 과학 2-1 2026");
        let row = CatalogRecord {
            isbn: "9791100000001".to_string(),
            title: "오투 중등과학 중2-1 중학2 과학 2-1".to_string(),
            year: Some(2025),
            publisher: Some("비상교육".to_string()),
        };
        assert!(cascade[0].matches(&row));

        let old = CatalogRecord {
            year: Some(2020),
            ..row
        };
        assert!(!cascade[0].matches(&old));
        assert!(cascade[1].matches(&old));
    }
}
