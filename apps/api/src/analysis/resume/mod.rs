//! Résumé ATS Analyzer.
//!
//! Pipeline: resolve the role profile, score six sections, match keywords, inspect
//! formatting, combine into a heuristic ATS score, detect mistakes, then blend in the
//! insight provider's role-match judgment when it supplies one.

pub mod formatting;
pub mod keywords;
pub mod mistakes;
pub mod sections;

use serde::Serialize;
use tracing::debug;

use crate::analysis::{clamp_score, excerpt, ScoredAnalysis};
use crate::insight::{
    ActionItem, FallbackInsight, Insight, InsightKind, InsightRequest, InsightSource, Priority,
};
use crate::roles::{resolve_role, RoleCategory, RoleProfile};

use formatting::{FormattingChecks, FormattingReport};
use keywords::{match_keywords, KeywordReport};
use mistakes::{detect_mistakes, Mistake, MistakeInputs, Severity};
use sections::{ResumeSections, SectionFindings, SectionKind};

/// Whitespace-collapsed text shorter than this is treated as unreadable.
pub const MIN_READABLE_CHARS: usize = 20;
/// Characters of résumé text sent to the insight provider.
pub const INSIGHT_EXCERPT_CHARS: usize = 3000;

pub const SECTION_WEIGHT: f64 = 0.60;
pub const KEYWORD_WEIGHT: f64 = 0.25;
pub const FORMATTING_WEIGHT: f64 = 0.15;
/// Share of the final score taken from the provider's role-match score.
pub const ROLE_MATCH_BLEND: f64 = 0.5;

pub const UNREADABLE_MESSAGE: &str = "We could not read enough text from this résumé. \
    Please upload a clearer copy (a text-based PDF or DOCX rather than a scanned image).";

const STRENGTH_THRESHOLD: u8 = 70;
const WEAKNESS_THRESHOLD: u8 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeAnalysis {
    pub target_role: String,
    pub role_category: RoleCategory,
    /// Final score after the optional role-match blend.
    pub ats_score: u8,
    pub heuristic_score: u8,
    pub sections: ResumeSections,
    pub keywords: KeywordReport,
    pub formatting: FormattingReport,
    pub mistakes: Vec<Mistake>,
    pub insight: Insight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResumeOutcome {
    Analyzed(Box<ResumeAnalysis>),
    Unreadable { ats_score: u8, message: String },
}

impl ScoredAnalysis for ResumeOutcome {
    fn score(&self) -> u8 {
        match self {
            ResumeOutcome::Analyzed(analysis) => analysis.ats_score,
            ResumeOutcome::Unreadable { ats_score, .. } => *ats_score,
        }
    }

    fn insight(&self) -> Option<&Insight> {
        match self {
            ResumeOutcome::Analyzed(analysis) => Some(&analysis.insight),
            ResumeOutcome::Unreadable { .. } => None,
        }
    }
}

/// Everything derived from the text alone, before any provider input.
#[derive(Debug, Clone)]
pub struct HeuristicReport {
    pub profile: &'static RoleProfile,
    pub sections: ResumeSections,
    pub keywords: KeywordReport,
    pub formatting: FormattingReport,
    pub mistakes: Vec<Mistake>,
    pub score: u8,
}

impl HeuristicReport {
    pub fn build(text: &str, target_role: &str) -> Self {
        let profile = resolve_role(target_role);
        let findings = SectionFindings::extract(text, profile);
        let sections = findings.scores();
        let keywords = match_keywords(text, profile);
        let checks = FormattingChecks::inspect(text);
        let formatting = checks.report();
        let mistakes = detect_mistakes(&MistakeInputs {
            text,
            role_label: role_label(target_role),
            findings: &findings,
            formatting: &checks,
            keywords: &keywords,
        });
        let score = ats_score(sections.average(), keywords.coverage, formatting.score);

        debug!(
            "Résumé heuristics for {}: sections avg {:.1}, coverage {:.2}, formatting {}, score {}",
            profile.category.as_str(),
            sections.average(),
            keywords.coverage,
            formatting.score,
            score
        );

        Self {
            profile,
            sections,
            keywords,
            formatting,
            mistakes,
            score,
        }
    }
}

/// `0.60 × section average + 0.25 × keyword coverage % + 0.15 × formatting`, clamped.
pub fn ats_score(section_average: f64, keyword_coverage: f64, formatting_score: u8) -> u8 {
    clamp_score(
        SECTION_WEIGHT * section_average
            + KEYWORD_WEIGHT * keyword_coverage * 100.0
            + FORMATTING_WEIGHT * f64::from(formatting_score),
    )
}

/// Even blend of the heuristic score with the provider's role-match score.
pub fn blend_role_match(heuristic: u8, role_match: u8) -> u8 {
    clamp_score(
        (1.0 - ROLE_MATCH_BLEND) * f64::from(heuristic) + ROLE_MATCH_BLEND * f64::from(role_match),
    )
}

/// Runs the full analysis. Never fails; the provider is optional.
pub async fn analyze_resume(
    text: &str,
    target_role: &str,
    insight: &FallbackInsight,
) -> ResumeOutcome {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if normalized.chars().count() < MIN_READABLE_CHARS {
        return ResumeOutcome::Unreadable {
            ats_score: 0,
            message: UNREADABLE_MESSAGE.to_string(),
        };
    }

    let report = HeuristicReport::build(text, target_role);

    let provider = insight
        .consult(&InsightRequest {
            kind: InsightKind::Resume,
            input_excerpt: excerpt(text, INSIGHT_EXCERPT_CHARS).to_string(),
            target_role: target_role.to_string(),
        })
        .await;

    let (ats_score, narrative) = match provider.role_match_score {
        Some(role_match) => {
            let ats_score = blend_role_match(report.score, role_match);
            let fallback = fallback_narrative(&report, ats_score, target_role);
            (ats_score, provider.or_fallback(fallback))
        }
        None => (
            report.score,
            fallback_narrative(&report, report.score, target_role),
        ),
    };

    ResumeOutcome::Analyzed(Box::new(ResumeAnalysis {
        target_role: target_role.to_string(),
        role_category: report.profile.category,
        ats_score,
        heuristic_score: report.score,
        sections: report.sections,
        keywords: report.keywords,
        formatting: report.formatting,
        mistakes: report.mistakes,
        insight: narrative,
    }))
}

fn role_label(target_role: &str) -> &str {
    let trimmed = target_role.trim();
    if trimmed.is_empty() {
        "software"
    } else {
        trimmed
    }
}

/// Narrative built only from section scores and detected mistakes. `ats_score` is
/// the score reported on the record, blended or not.
fn fallback_narrative(report: &HeuristicReport, ats_score: u8, target_role: &str) -> Insight {
    let mut best: Option<(SectionKind, u8)> = None;
    let mut worst: Option<(SectionKind, u8)> = None;
    for (kind, section) in report.sections.iter() {
        if best.map_or(true, |(_, s)| section.score > s) {
            best = Some((kind, section.score));
        }
        if worst.map_or(true, |(_, s)| section.score < s) {
            worst = Some((kind, section.score));
        }
    }

    let mut summary = format!(
        "Your résumé scores {ats_score}/100 for {} roles.",
        role_label(target_role)
    );
    if let (Some((best, best_score)), Some((worst, worst_score))) = (best, worst) {
        summary.push_str(&format!(
            " Strongest section: {} ({best_score}). Weakest section: {} ({worst_score}).",
            best.label(),
            worst.label()
        ));
    }

    let strengths = report
        .sections
        .iter()
        .filter(|(_, s)| s.score >= STRENGTH_THRESHOLD)
        .map(|(kind, s)| format!("{}: {}", kind.label(), s.feedback))
        .collect();
    let weaknesses = report
        .sections
        .iter()
        .filter(|(_, s)| s.score < WEAKNESS_THRESHOLD)
        .map(|(kind, s)| format!("{}: {}", kind.label(), s.feedback))
        .collect();
    let recommendations = report.mistakes.iter().take(3).map(|m| m.fix.clone()).collect();
    let action_plan = report
        .mistakes
        .iter()
        .filter(|m| m.severity != Severity::Low)
        .take(5)
        .map(|m| ActionItem {
            action: m.fix.clone(),
            priority: if m.severity == Severity::High {
                Priority::High
            } else {
                Priority::Medium
            },
            timeline: if m.severity == Severity::High {
                "This week".to_string()
            } else {
                "Next two weeks".to_string()
            },
        })
        .collect();

    Insight {
        summary: Some(summary),
        strengths,
        weaknesses,
        recommendations,
        action_plan,
        source: InsightSource::Heuristic,
        ..Insight::default()
    }
}
