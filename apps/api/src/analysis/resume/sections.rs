//! Section detection and per-section heuristics.
//!
//! Each section is located by a [`SectionExtractor`]: the first case-insensitive hit
//! of its header pattern, widened back to the start of that line and capped at a
//! fixed character lookahead. Signals are collected from that window only, then mapped
//! to a 0–100 score through fixed point bands.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::roles::RoleProfile;

/// Score reported for a section whose header never appears.
pub const SECTION_NOT_FOUND_SCORE: u8 = 20;

const BULLET_MARKERS: &[char] = &['•', '-', '*', '▪', '◦', '‣', '●', '➢', '►'];

pub(super) static METRIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+[%+]").expect("valid metric regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email regex")
});
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d[\d\s().-]{8,}\d").expect("valid phone regex"));
static ACTION_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(led|developed|built|designed|implemented|created|managed|optimized|optimised|improved|launched|architected|delivered|reduced|increased|automated|engineered|migrated|mentored|deployed)\b",
    )
    .expect("valid action verb regex")
});
static DEGREE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(bachelor|master|b\.?\s?tech|m\.?\s?tech|b\.?\s?sc|m\.?\s?sc|ph\.?\s?d|mba|diploma|associate degree|b\.s\.|m\.s\.|b\.e\.)")
        .expect("valid degree regex")
});
static GPA: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(c?gpa|grade|percentage)\b|\d\.\d{1,2}\s*/\s*\d{1,2}")
        .expect("valid gpa regex")
});
static YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").expect("valid year regex"));
static LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(https?://|www\.|github\.com|gitlab\.com|\.vercel\.app|\.netlify\.app)")
        .expect("valid link regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// A header pattern plus a bounded lookahead, in characters.
#[derive(Debug, Clone)]
pub struct SectionExtractor {
    header: Regex,
    lookahead: usize,
    from_top: bool,
}

impl SectionExtractor {
    /// `header_pattern` is matched case-insensitively.
    pub fn new(header_pattern: &str, lookahead: usize) -> Result<Self, regex::Error> {
        Ok(Self {
            header: Regex::new(&format!("(?i){header_pattern}"))?,
            lookahead,
            from_top: false,
        })
    }

    /// Pulls the window back to the start of the text when the header line sits
    /// within `lookahead` characters of it. Used for the unlabelled header block.
    pub fn from_top(mut self) -> Self {
        self.from_top = true;
        self
    }

    /// Returns the section window, or `None` when the header never appears.
    pub fn window<'a>(&self, text: &'a str) -> Option<&'a str> {
        let hit = self.header.find(text)?;
        let line_start = text[..hit.start()].rfind('\n').map_or(0, |i| i + 1);
        let end = text[line_start..]
            .char_indices()
            .nth(self.lookahead)
            .map_or(text.len(), |(i, _)| line_start + i);
        let start = if self.from_top && text[..line_start].chars().count() < self.lookahead {
            0
        } else {
            line_start
        };
        Some(&text[start..end])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
}

impl SectionKind {
    pub const ALL: [SectionKind; 6] = [
        SectionKind::Contact,
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
        SectionKind::Projects,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SectionKind::Contact => "Contact",
            SectionKind::Summary => "Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
            SectionKind::Projects => "Projects",
        }
    }

    fn header_pattern(&self) -> &'static str {
        match self {
            SectionKind::Contact => r"\b(contact|e-?mail|phone|mobile|linkedin|github)\b|@",
            SectionKind::Summary => r"\b(summary|objective|profile|about me)\b",
            SectionKind::Experience => r"\b(experience|work history|employment)\b",
            SectionKind::Education => r"\b(education|academic|qualifications?)\b",
            SectionKind::Skills => r"\b(skills|technologies|tech stack|competencies)\b",
            SectionKind::Projects => r"\b(projects|portfolio)\b",
        }
    }

    fn lookahead(&self) -> usize {
        match self {
            SectionKind::Contact => 500,
            SectionKind::Summary => 800,
            SectionKind::Experience => 2000,
            SectionKind::Education => 1000,
            SectionKind::Skills => 1000,
            SectionKind::Projects => 1500,
        }
    }

    /// Feedback lines for (score ≥ 80, score ≥ 50, below).
    fn feedback(&self) -> [&'static str; 3] {
        match self {
            SectionKind::Contact => [
                "Contact details are complete and easy to find.",
                "Contact details are partial; add LinkedIn or GitHub.",
                "Contact details are incomplete; include at least email and phone.",
            ],
            SectionKind::Summary => [
                "Summary is concise and backed by a measurable result.",
                "Summary is present but could be tighter or include a metric.",
                "Summary is too short or too long to be effective.",
            ],
            SectionKind::Experience => [
                "Experience is well structured with quantified, action-driven bullets.",
                "Experience is readable; add more metrics and strong action verbs.",
                "Experience lacks bullets, metrics or action verbs.",
            ],
            SectionKind::Education => [
                "Education lists degree, dates and grades clearly.",
                "Education is present; add graduation year or GPA.",
                "Education is missing key details such as the degree.",
            ],
            SectionKind::Skills => [
                "Skills align strongly with the target role.",
                "Skills partially match the target role; add missing core keywords.",
                "Skills barely match the target role's core keywords.",
            ],
            SectionKind::Projects => [
                "Projects show links, technologies and measurable outcomes.",
                "Projects are listed; add links or results to stand out.",
                "Projects need links, technologies and outcomes.",
            ],
        }
    }
}

static EXTRACTORS: Lazy<Vec<(SectionKind, SectionExtractor)>> = Lazy::new(|| {
    SectionKind::ALL
        .into_iter()
        .map(|kind| {
            let extractor = SectionExtractor::new(kind.header_pattern(), kind.lookahead())
                .expect("valid section header regex");
            let extractor = if kind == SectionKind::Contact {
                extractor.from_top()
            } else {
                extractor
            };
            (kind, extractor)
        })
        .collect()
});

fn window_for(kind: SectionKind, text: &str) -> Option<&str> {
    EXTRACTORS
        .iter()
        .find(|(k, _)| *k == kind)
        .and_then(|(_, extractor)| extractor.window(text))
}

// ────────────────────────────────────────────────────────────────────────────
// Signals
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactSignals {
    pub email: bool,
    pub phone: bool,
    pub linkedin: bool,
    pub github: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummarySignals {
    pub words: usize,
    pub has_metric: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperienceSignals {
    pub bullets: usize,
    pub metrics: usize,
    pub action_verbs: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EducationSignals {
    pub degree: bool,
    pub gpa: bool,
    pub year: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillsSignals {
    pub matched: usize,
    pub required: usize,
}

impl SkillsSignals {
    pub fn ratio(&self) -> f64 {
        if self.required == 0 {
            0.0
        } else {
            self.matched as f64 / self.required as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectsSignals {
    pub has_link: bool,
    pub tech_mentions: usize,
    pub has_metric: bool,
}

/// Raw signals per section; `None` means the header was never found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionFindings {
    pub contact: Option<ContactSignals>,
    pub summary: Option<SummarySignals>,
    pub experience: Option<ExperienceSignals>,
    pub education: Option<EducationSignals>,
    pub skills: Option<SkillsSignals>,
    pub projects: Option<ProjectsSignals>,
}

impl SectionFindings {
    pub fn extract(text: &str, profile: &RoleProfile) -> Self {
        Self {
            contact: window_for(SectionKind::Contact, text).map(contact_signals),
            summary: window_for(SectionKind::Summary, text).map(|w| SummarySignals {
                words: w.split_whitespace().count(),
                has_metric: METRIC.is_match(w),
            }),
            experience: window_for(SectionKind::Experience, text).map(|w| ExperienceSignals {
                bullets: count_bullets(w),
                metrics: METRIC.find_iter(w).count(),
                action_verbs: ACTION_VERB.find_iter(w).count(),
            }),
            education: window_for(SectionKind::Education, text).map(|w| EducationSignals {
                degree: DEGREE.is_match(w),
                gpa: GPA.is_match(w),
                year: YEAR.is_match(w),
            }),
            skills: window_for(SectionKind::Skills, text).map(|w| {
                let lower = w.to_lowercase();
                SkillsSignals {
                    matched: profile
                        .required_keywords
                        .iter()
                        .filter(|k| lower.contains(*k))
                        .count(),
                    required: profile.required_keywords.len(),
                }
            }),
            projects: window_for(SectionKind::Projects, text).map(|w| {
                let lower = w.to_lowercase();
                ProjectsSignals {
                    has_link: LINK.is_match(w),
                    tech_mentions: profile
                        .required_keywords
                        .iter()
                        .chain(profile.recommended_keywords)
                        .filter(|k| lower.contains(*k))
                        .count(),
                    has_metric: METRIC.is_match(w),
                }
            }),
        }
    }

    pub fn scores(&self) -> ResumeSections {
        ResumeSections {
            contact: section_score(SectionKind::Contact, self.contact.as_ref().map(score_contact)),
            summary: section_score(SectionKind::Summary, self.summary.as_ref().map(score_summary)),
            experience: section_score(
                SectionKind::Experience,
                self.experience.as_ref().map(score_experience),
            ),
            education: section_score(
                SectionKind::Education,
                self.education.as_ref().map(score_education),
            ),
            skills: section_score(SectionKind::Skills, self.skills.as_ref().map(score_skills)),
            projects: section_score(
                SectionKind::Projects,
                self.projects.as_ref().map(score_projects),
            ),
        }
    }
}

fn contact_signals(window: &str) -> ContactSignals {
    let lower = window.to_lowercase();
    ContactSignals {
        email: EMAIL.is_match(window),
        // Date ranges also look like digit runs; a phone needs at least ten digits.
        phone: PHONE
            .find_iter(window)
            .any(|m| m.as_str().chars().filter(char::is_ascii_digit).count() >= 10),
        linkedin: lower.contains("linkedin"),
        github: lower.contains("github"),
    }
}

/// Lines whose first non-blank character is a bullet marker.
pub fn count_bullets(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            line.trim_start()
                .chars()
                .next()
                .is_some_and(|c| BULLET_MARKERS.contains(&c))
        })
        .count()
}

// ────────────────────────────────────────────────────────────────────────────
// Score bands
// ────────────────────────────────────────────────────────────────────────────

pub fn score_contact(s: &ContactSignals) -> u8 {
    let mut score = 0;
    if s.email {
        score += 30;
    }
    if s.phone {
        score += 30;
    }
    if s.linkedin {
        score += 20;
    }
    if s.github {
        score += 20;
    }
    score
}

/// 40 for having a summary, +40 for 30–120 words (+20 for 15–29 or 121–200), +20 for a metric.
pub fn score_summary(s: &SummarySignals) -> u8 {
    let length = match s.words {
        30..=120 => 40,
        15..=29 | 121..=200 => 20,
        _ => 0,
    };
    let metric = if s.has_metric { 20 } else { 0 };
    40 + length + metric
}

pub fn score_experience(s: &ExperienceSignals) -> u8 {
    let bullets = match s.bullets {
        0..=1 => 0,
        2..=4 => 15,
        _ => 30,
    };
    let metrics = match s.metrics {
        0 => 0,
        1..=2 => 15,
        _ => 25,
    };
    let verbs = match s.action_verbs {
        0..=1 => 0,
        2..=4 => 15,
        _ => 25,
    };
    20 + bullets + metrics + verbs
}

pub fn score_education(s: &EducationSignals) -> u8 {
    let mut score = 40;
    if s.degree {
        score += 30;
    }
    if s.gpa {
        score += 15;
    }
    if s.year {
        score += 15;
    }
    score
}

pub fn score_skills(s: &SkillsSignals) -> u8 {
    match s.ratio() {
        r if r >= 0.6 => 100,
        r if r >= 0.4 => 80,
        r if r >= 0.2 => 60,
        r if r > 0.0 => 40,
        _ => 25,
    }
}

pub fn score_projects(s: &ProjectsSignals) -> u8 {
    let link = if s.has_link { 25 } else { 0 };
    let tech = match s.tech_mentions {
        0 => 0,
        1 => 15,
        _ => 25,
    };
    let metric = if s.has_metric { 20 } else { 0 };
    30 + link + tech + metric
}

// ────────────────────────────────────────────────────────────────────────────
// Output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionScore {
    pub score: u8,
    pub feedback: String,
}

fn section_score(kind: SectionKind, score: Option<u8>) -> SectionScore {
    match score {
        None => SectionScore {
            score: SECTION_NOT_FOUND_SCORE,
            feedback: format!("{} section not found.", kind.label()),
        },
        Some(score) => {
            let score = score.min(100);
            let [strong, fair, weak] = kind.feedback();
            let feedback = match score {
                80..=100 => strong,
                50..=79 => fair,
                _ => weak,
            };
            SectionScore {
                score,
                feedback: feedback.to_string(),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeSections {
    pub contact: SectionScore,
    pub summary: SectionScore,
    pub experience: SectionScore,
    pub education: SectionScore,
    pub skills: SectionScore,
    pub projects: SectionScore,
}

impl ResumeSections {
    /// Sections in display order, paired with their kind.
    pub fn iter(&self) -> impl Iterator<Item = (SectionKind, &SectionScore)> {
        [
            (SectionKind::Contact, &self.contact),
            (SectionKind::Summary, &self.summary),
            (SectionKind::Experience, &self.experience),
            (SectionKind::Education, &self.education),
            (SectionKind::Skills, &self.skills),
            (SectionKind::Projects, &self.projects),
        ]
        .into_iter()
    }

    pub fn average(&self) -> f64 {
        let total: u32 = self.iter().map(|(_, s)| u32::from(s.score)).sum();
        f64::from(total) / SectionKind::ALL.len() as f64
    }
}
