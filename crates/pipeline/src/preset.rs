//! Stage lineups and how each turns a finished run into artifacts.

use crate::context::StageContext;
use crate::extract::{
    extract_bullets, extract_illustration, extract_sources, first_sentence, parse_published,
};
use crate::formatter::{format_brief, news_card, short_post, social_post, NEWSROOM_TAGS};
use crate::stage::{StageKind, StageSpec};
use newsdesk_core::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Rendered outputs of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Artifacts {
    pub brief: String,
    pub social_post: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
}

/// What happened while assembling artifacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub preset: Preset,
    pub stages: Vec<StageKind>,

    /// Extractions that fell back to defaults
    pub fallbacks: Vec<String>,
}

impl RunReport {
    pub fn used_fallback(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// researcher → fact_checker → editor → publisher
    Research,
    /// planner → summarizer → fact_checker → illustrator → news_publisher
    Newsroom,
}

impl Preset {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "research" => Ok(Self::Research),
            "newsroom" | "news" => Ok(Self::Newsroom),
            other => Err(AppError::Config(format!(
                "Unknown preset: {}. Supported: research, newsroom",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Newsroom => "newsroom",
        }
    }

    /// Ordered stages with their wiring.
    pub fn stages(&self) -> Vec<StageSpec> {
        use StageKind::*;
        match self {
            Self::Research => vec![
                StageSpec::new(Researcher),
                StageSpec::new(FactChecker).reading([Researcher]),
                StageSpec::new(Editor).reading([FactChecker]),
                StageSpec::new(Publisher).reading([Editor]),
            ],
            Self::Newsroom => vec![
                StageSpec::new(Planner),
                StageSpec::new(Summarizer).reading([Planner]),
                StageSpec::new(FactChecker).reading([Planner, Summarizer]),
                StageSpec::new(Illustrator).reading([FactChecker]),
                StageSpec::new(NewsPublisher).reading([FactChecker, Illustrator]),
            ],
        }
    }

    /// Turn a completed run's outputs into artifacts.
    pub fn assemble(&self, context: &StageContext) -> (Artifacts, RunReport) {
        let mut report = RunReport {
            preset: *self,
            stages: context.outputs().iter().map(|o| o.stage).collect(),
            fallbacks: Vec::new(),
        };

        let artifacts = match self {
            Self::Research => assemble_research(context, &mut report),
            Self::Newsroom => assemble_newsroom(context, &mut report),
        };

        if report.used_fallback() {
            tracing::warn!(
                preset = self.as_str(),
                fallbacks = ?report.fallbacks,
                "Artifacts assembled with fallbacks"
            );
        }

        (artifacts, report)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn stage_text<'a>(
    context: &'a StageContext,
    kind: StageKind,
    report: &mut RunReport,
) -> &'a str {
    context.output(kind).unwrap_or_else(|| {
        report.fallbacks.push(format!("{}: no output", kind));
        ""
    })
}

fn assemble_research(context: &StageContext, report: &mut RunReport) -> Artifacts {
    let raw = stage_text(context, StageKind::Publisher, report);
    let published = parse_published(raw);
    if published.is_fallback() {
        report.fallbacks.push("publisher: unstructured output".to_string());
    }
    let published = published.into_inner();

    let social = if published.linkedin_post.trim().is_empty() {
        social_post(&context.query, &published.markdown)
    } else {
        published.linkedin_post
    };

    Artifacts {
        brief: format_brief(&context.query, &published.markdown, context.date),
        social_post: social,
        image_alt: None,
    }
}

fn assemble_newsroom(context: &StageContext, report: &mut RunReport) -> Artifacts {
    let summary = stage_text(context, StageKind::FactChecker, report);

    let bullets = extract_bullets(summary);
    if bullets.is_fallback() {
        report.fallbacks.push("fact_checker: no bullets".to_string());
    }
    let one_liner = first_sentence(summary);
    if one_liner.is_fallback() {
        report.fallbacks.push("fact_checker: no leading sentence".to_string());
    }
    let illustration = extract_illustration(stage_text(context, StageKind::Illustrator, report));
    if illustration.is_fallback() {
        report.fallbacks.push("illustrator: no JSON object".to_string());
    }
    let illustration = illustration.into_inner();

    let link = extract_sources(summary)
        .into_iter()
        .collect::<Vec<_>>()
        .join(", ");

    Artifacts {
        brief: news_card(
            &context.title,
            summary,
            bullets.value(),
            &illustration.alt,
            &link,
            context.date,
        ),
        social_post: short_post(&context.title, one_liner.value(), &NEWSROOM_TAGS),
        image_alt: Some(illustration.alt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn context_with(outputs: &[(StageKind, &str)]) -> StageContext {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut ctx = StageContext::new("Rust in production", "passages", date);
        for (kind, text) in outputs {
            ctx.record(*kind, text.to_string());
        }
        ctx
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!(Preset::parse("Research").unwrap(), Preset::Research);
        assert_eq!("newsroom".parse::<Preset>().unwrap(), Preset::Newsroom);
        assert!(Preset::parse("podcast").is_err());
    }

    #[test]
    fn test_preset_wiring_is_valid() {
        for preset in [Preset::Research, Preset::Newsroom] {
            let stages = preset.stages();
            for (i, spec) in stages.iter().enumerate() {
                for upstream in &spec.reads {
                    assert!(stages[..i].iter().any(|s| s.kind == *upstream));
                }
            }
        }
    }

    #[test]
    fn test_research_structured() {
        let ctx = context_with(&[(
            StageKind::Publisher,
            r##"{"markdown": "Summary line (Source: a.txt)", "linkedin_post": "Post!"}"##,
        )]);
        let (artifacts, report) = Preset::Research.assemble(&ctx);

        assert!(!report.used_fallback());
        assert_eq!(artifacts.social_post, "Post!");
        assert!(artifacts.brief.contains("Summary line (Source: a.txt)"));
        assert!(artifacts.brief.contains("- 📄 `a.txt`"));
        assert!(artifacts.image_alt.is_none());
    }

    #[test]
    fn test_research_empty_post_is_templated() {
        let ctx = context_with(&[(StageKind::Publisher, r##"{"markdown": "Finding one."}"##)]);
        let (artifacts, report) = Preset::Research.assemble(&ctx);

        assert!(!report.used_fallback());
        assert!(artifacts.social_post.contains("Key Finding: Finding one...."));
    }

    #[test]
    fn test_research_fallback() {
        let ctx = context_with(&[(StageKind::Publisher, "Plain prose brief.")]);
        let (artifacts, report) = Preset::Research.assemble(&ctx);

        assert_eq!(report.fallbacks, vec!["publisher: unstructured output"]);
        assert!(artifacts.brief.contains("Plain prose brief."));
        assert!(artifacts.social_post.contains("Key Finding: Plain prose brief...."));
    }

    #[test]
    fn test_newsroom_assembly() {
        let ctx = context_with(&[
            (
                StageKind::FactChecker,
                "Rust usage grew sharply. Details follow (Source: survey.txt).\n\
                 - Faster builds\n- Fewer bugs",
            ),
            (StageKind::Illustrator, r#"{"prompt": "gears", "alt": "Interlocking gears"}"#),
        ]);
        let (artifacts, report) = Preset::Newsroom.assemble(&ctx);

        assert!(!report.used_fallback());
        assert_eq!(artifacts.image_alt.as_deref(), Some("Interlocking gears"));
        assert!(artifacts.brief.starts_with("# Rust in production\n_Date: 2024-03-09_"));
        assert!(artifacts.brief.contains("- Faster builds\n- Fewer bugs"));
        assert!(artifacts.brief.ends_with("Source: survey.txt\n"));
        assert!(artifacts.social_post.contains("\n\nRust usage grew sharply.\n\n"));
        assert!(artifacts.social_post.ends_with("#Python #LLM\n"));
    }

    #[test]
    fn test_newsroom_defaults() {
        let ctx = context_with(&[
            (StageKind::FactChecker, ""),
            (StageKind::Illustrator, "no json"),
        ]);
        let (artifacts, report) = Preset::Newsroom.assemble(&ctx);

        assert_eq!(report.fallbacks.len(), 3);
        assert_eq!(artifacts.image_alt.as_deref(), Some("news illustration"));
        assert!(artifacts.brief.contains("- Context clarified"));
    }
}
