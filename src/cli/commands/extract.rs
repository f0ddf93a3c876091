use super::{load_config, CommandHandler};
use crate::cli::OutputFormat;
use crate::config::ProfileName;
use crate::engine::{AttributeRecord, CascadeBuilder, CascadeLevel, Extractor, SqlParam};
use crate::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

/// Handler for the `extract` command
pub struct ExtractCommand {
    pub title: String,
    pub profile: Option<ProfileName>,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
pub struct CascadeStep {
    pub level: CascadeLevel,
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Everything the matcher derives from a title before querying
#[derive(Debug, Serialize)]
pub struct ExtractionReport {
    pub title: String,
    pub profile: ProfileName,
    pub working_text: String,
    pub attributes: AttributeRecord,
    pub cascade: Vec<CascadeStep>,
}

impl ExtractionReport {
    pub fn build(extractor: &Extractor, title: &str) -> Self {
        let attributes = extractor.extract(title);
        let cascade = CascadeBuilder::new(extractor.profile())
            .build(&attributes)
            .into_iter()
            .map(|predicate| {
                let (sql, params) = predicate.to_sql();
                CascadeStep {
                    level: predicate.level,
                    sql,
                    params,
                }
            })
            .collect();

        Self {
            title: title.to_string(),
            profile: extractor.profile().name,
            working_text: extractor.working_text(title).into_owned(),
            attributes,
            cascade,
        }
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let attrs = &self.attributes;
        let show = |value: Option<&str>| value.unwrap_or("-").to_string();

        let _ = writeln!(out, "Title:    {}", self.title);
        let _ = writeln!(out, "Profile:  {}", self.profile);
        let _ = writeln!(out, "Text:     {}", self.working_text);
        let _ = writeln!(out, "Series:   {}", show(attrs.series.as_deref()));
        if let Some(normalized) = &attrs.series_normalized {
            let _ = writeln!(out, "Canonical: {}", normalized);
        }
        let _ = writeln!(
            out,
            "Level:    {}",
            attrs.level.map(|l| l.to_string()).unwrap_or_else(|| "-".to_string())
        );
        let _ = writeln!(out, "Grade:    {}", show(attrs.grade.as_deref()));
        let _ = writeln!(out, "Subject:  {}", show(attrs.subject.as_deref()));
        let _ = writeln!(out, "Term:     {}", show(attrs.term.as_deref()));
        let _ = writeln!(
            out,
            "Year:     {}",
            attrs.year.map(|y| y.to_string()).unwrap_or_else(|| "-".to_string())
        );
        let _ = writeln!(out, "Keywords: {}", attrs.keywords.join(", "));

        if self.cascade.is_empty() {
            let _ = writeln!(out, "Cascade:  none (no series found)");
            return out;
        }

        let _ = writeln!(out, "Cascade:");
        for step in &self.cascade {
            let params: Vec<String> = step.params.iter().map(|p| p.to_string()).collect();
            let _ = writeln!(out, "  {}", step.level);
            let _ = writeln!(out, "    {}", step.sql);
            let _ = writeln!(out, "    [{}]", params.join(", "));
        }
        out
    }
}

impl CommandHandler for ExtractCommand {
    fn execute(&self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let extractor = Extractor::from_config(&config, config.matcher.profile(self.profile));
        let report = ExtractionReport::build(&extractor, &self.title);

        match self.format {
            OutputFormat::Text => print!("{}", report.render_text()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MatcherProfile;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gift_title_report() {
        let report = ExtractionReport::build(&Extractor::default(), "쎈 (사은품)");

        assert_eq!(report.working_text, "쎈");
        assert_eq!(report.attributes.series.as_deref(), Some("쎈"));
        assert_eq!(report.cascade.len(), 1);
        assert_eq!(report.cascade[0].level, CascadeLevel::Series);
        assert_eq!(
            report.cascade[0].params,
            vec![SqlParam::Text("%쎈%".to_string()), SqlParam::Int(5)]
        );
    }

    #[test]
    fn test_basic_profile_keeps_raw_text() {
        let extractor = Extractor::from_config(
            &Default::default(),
            MatcherProfile::preset(ProfileName::Basic),
        );
        let report = ExtractionReport::build(&extractor, "쎈 (사은품)");
        assert_eq!(report.working_text, "쎈 (사은품)");
        assert_eq!(report.profile, ProfileName::Basic);
    }

    #[test]
    fn test_text_rendering() {
        let report = ExtractionReport::build(&Extractor::default(), "[오투] 중등 2 과학 2-1 2026");
        let text = report.render_text();

        assert!(text.contains("Series:   오투"));
        assert!(text.contains("Year:     2026"));
        assert!(text.contains("L1 "));
        assert!(text.contains("L5 "));

        let empty = ExtractionReport::build(&Extractor::default(), "문제집");
        assert!(empty.render_text().contains("none (no series found)"));
    }
}
