//! Résumé mistake taxonomy.
//!
//! Rules run in a fixed order and each emits at most one mistake; the list is then
//! stably sorted by severity so detection order survives inside a tier.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::formatting::FormattingChecks;
use super::keywords::KeywordReport;
use super::sections::SectionFindings;

/// Keyword coverage below this is reported as a mistake.
const LOW_COVERAGE: f64 = 0.4;
/// Summaries longer than this many words (header included) read as padding.
const LONG_SUMMARY_WORDS: usize = 200;
/// Stray first-person pronouns are tolerated below this count ("I/O" and the like).
const FIRST_PERSON_LIMIT: usize = 2;

static FIRST_PERSON: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(i|me|my|mine|myself)\b").expect("valid pronoun regex")
});
static RESUME_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(resume|résumé|curriculum vitae)\b").expect("valid resume-word regex")
});
static REFERENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\breferences\s+(are\s+)?available").expect("valid references regex")
});
static PASSIVE_DUTIES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bresponsibilities\s+included\b").expect("valid passive-duties regex")
});

/// Declaration order is sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mistake {
    pub severity: Severity,
    pub category: String,
    pub issue: String,
    pub fix: String,
}

impl Mistake {
    fn new(
        severity: Severity,
        category: &str,
        issue: impl Into<String>,
        fix: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.to_string(),
            issue: issue.into(),
            fix: fix.into(),
        }
    }
}

pub struct MistakeInputs<'a> {
    pub text: &'a str,
    pub role_label: &'a str,
    pub findings: &'a SectionFindings,
    pub formatting: &'a FormattingChecks,
    pub keywords: &'a KeywordReport,
}

pub fn detect_mistakes(inputs: &MistakeInputs<'_>) -> Vec<Mistake> {
    let mut mistakes = Vec::new();
    section_mistakes(inputs, &mut mistakes);
    formatting_mistakes(inputs.formatting, &mut mistakes);
    content_mistakes(inputs.text, &mut mistakes);
    mistakes.sort_by_key(|m| m.severity);
    mistakes
}

fn section_mistakes(inputs: &MistakeInputs<'_>, out: &mut Vec<Mistake>) {
    let findings = inputs.findings;

    let contact = findings.contact.clone().unwrap_or_default();
    if !contact.email || !contact.phone {
        out.push(Mistake::new(
            Severity::High,
            "Contact Information",
            "Email address or phone number is missing.",
            "Put your email and phone number at the top of the résumé.",
        ));
    } else if !contact.linkedin {
        out.push(Mistake::new(
            Severity::Medium,
            "Contact Information",
            "No LinkedIn profile link.",
            "Add a LinkedIn URL next to your email.",
        ));
    }

    match &findings.summary {
        None => out.push(Mistake::new(
            Severity::Medium,
            "Professional Summary",
            "No summary or objective section.",
            format!("Open with a two to three line summary aimed at {} roles.", inputs.role_label),
        )),
        Some(summary) if summary.words > LONG_SUMMARY_WORDS => out.push(Mistake::new(
            Severity::Low,
            "Professional Summary",
            "Summary runs long.",
            "Cut the summary to three lines that state your focus and one result.",
        )),
        Some(_) => {}
    }

    match &findings.experience {
        None => out.push(Mistake::new(
            Severity::High,
            "Work Experience",
            "No experience section found.",
            "Add internships, freelance work or substantial projects under an Experience heading.",
        )),
        Some(experience) => {
            if experience.metrics == 0 {
                out.push(Mistake::new(
                    Severity::High,
                    "Quantified Impact",
                    "Experience bullets contain no measurable results.",
                    "Add numbers such as percentages, users served or time saved (e.g. 30%).",
                ));
            }
            if experience.action_verbs < 2 {
                out.push(Mistake::new(
                    Severity::Medium,
                    "Action Verbs",
                    "Few strong action verbs in experience bullets.",
                    "Start each bullet with a verb like Built, Led or Optimized.",
                ));
            }
        }
    }

    if findings.education.is_none() {
        out.push(Mistake::new(
            Severity::Medium,
            "Education",
            "No education section found.",
            "List your degree, institution and graduation year.",
        ));
    }

    if findings.skills.is_none() {
        out.push(Mistake::new(
            Severity::High,
            "Skills",
            "No dedicated skills section.",
            "Add a Skills section listing languages, frameworks and tools.",
        ));
    }

    let keywords = inputs.keywords;
    if keywords.coverage < LOW_COVERAGE {
        let total = keywords.found.len() + keywords.missing.len();
        let examples: Vec<&str> = keywords.missing.iter().take(3).map(String::as_str).collect();
        out.push(Mistake::new(
            Severity::Medium,
            "Keywords",
            format!(
                "Only {} of {} core {} keywords appear.",
                keywords.found.len(),
                total,
                inputs.role_label
            ),
            format!("Where truthful, mention: {}.", examples.join(", ")),
        ));
    }

    match &findings.projects {
        None => out.push(Mistake::new(
            Severity::Medium,
            "Projects",
            "No projects section found.",
            "Add two or three projects relevant to the role with the technologies used.",
        )),
        Some(projects) if !projects.has_link => out.push(Mistake::new(
            Severity::Low,
            "Project Links",
            "Projects have no links to code or demos.",
            "Link each project to its repository or live demo.",
        )),
        Some(_) => {}
    }
}

fn formatting_mistakes(checks: &FormattingChecks, out: &mut Vec<Mistake>) {
    if !checks.has_headings {
        out.push(Mistake::new(
            Severity::High,
            "Formatting",
            "No standard section headings.",
            "Use plain headings such as Experience, Education, Skills and Projects.",
        ));
    }
    if !checks.has_bullets {
        out.push(Mistake::new(
            Severity::Medium,
            "Formatting",
            "Achievements are written as paragraphs, not bullets.",
            "Break responsibilities into short bullet points.",
        ));
    }
    if !checks.has_dates {
        out.push(Mistake::new(
            Severity::Medium,
            "Dates",
            "Dates are missing or inconsistent.",
            "Use one format such as 'Jan 2022 - Present' for every entry.",
        ));
    }
    if checks.is_short() {
        out.push(Mistake::new(
            Severity::Medium,
            "Length",
            "Résumé is too short to show your experience.",
            "Expand projects and experience with specific contributions.",
        ));
    } else if checks.is_long() {
        out.push(Mistake::new(
            Severity::Low,
            "Length",
            "Résumé is longer than recruiters will read.",
            "Keep it to one or two pages of the most relevant work.",
        ));
    }
}

fn content_mistakes(text: &str, out: &mut Vec<Mistake>) {
    if FIRST_PERSON.find_iter(text).count() >= FIRST_PERSON_LIMIT {
        out.push(Mistake::new(
            Severity::Low,
            "Writing Style",
            "Uses first-person pronouns (I, me, my).",
            "Drop pronouns and start bullets with the action.",
        ));
    }
    if RESUME_WORD.is_match(text) {
        out.push(Mistake::new(
            Severity::Low,
            "Writing Style",
            "The word 'resume' appears in the body.",
            "Remove it; the document type is obvious.",
        ));
    }
    if REFERENCES.is_match(text) {
        out.push(Mistake::new(
            Severity::Low,
            "Writing Style",
            "Says 'references available upon request'.",
            "Remove the line and use the space for achievements.",
        ));
    }
    if PASSIVE_DUTIES.is_match(text) {
        out.push(Mistake::new(
            Severity::Low,
            "Writing Style",
            "Uses passive phrasing ('responsibilities included').",
            "Describe what you did with active verbs and results.",
        ));
    }
}
