use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::sections::count_bullets;

pub const MIN_LINES: usize = 30;
pub const MAX_LINES: usize = 200;

const SHORT_DEDUCTION: u8 = 10;
const LONG_DEDUCTION: u8 = 15;
const NO_BULLETS_DEDUCTION: u8 = 10;
const NO_DATES_DEDUCTION: u8 = 10;
const NO_HEADINGS_DEDUCTION: u8 = 15;

pub const NO_ISSUES_MESSAGE: &str = "No formatting issues detected; the layout is ATS-friendly.";

static DATE_PATTERNS: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|sept|oct|nov|dec)[a-z]*\.?\s+\d{4}\b")
            .expect("valid month-year regex"),
        Regex::new(r"\b\d{1,2}/\d{4}\b").expect("valid numeric date regex"),
        Regex::new(r"(?i)\b(19|20)\d{2}\s*(-|–|to)\s*((19|20)\d{2}|present|current)\b")
            .expect("valid year range regex"),
    ]
});
static HEADINGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(experience|education|skills|projects|summary)\b")
        .expect("valid heading regex")
});

/// Layout facts shared by the formatting score and the mistake detector.
#[derive(Debug, Clone, PartialEq)]
pub struct FormattingChecks {
    /// Non-blank lines.
    pub line_count: usize,
    pub has_bullets: bool,
    /// Some date format appears at least twice.
    pub has_dates: bool,
    pub has_headings: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattingReport {
    pub score: u8,
    pub issues: Vec<String>,
}

impl FormattingChecks {
    pub fn inspect(text: &str) -> Self {
        Self {
            line_count: text.lines().count(),
            has_bullets: count_bullets(text) > 0,
            has_dates: DATE_PATTERNS
                .iter()
                .any(|re| re.find_iter(text).nth(1).is_some()),
            has_headings: HEADINGS.is_match(text),
        }
    }

    pub fn is_short(&self) -> bool {
        self.line_count < MIN_LINES
    }

    pub fn is_long(&self) -> bool {
        self.line_count > MAX_LINES
    }

    /// Starts at 100 and subtracts a fixed amount per failed check, floored at 0.
    pub fn report(&self) -> FormattingReport {
        let mut deductions: u8 = 0;
        let mut issues = Vec::new();

        if self.is_short() {
            deductions += SHORT_DEDUCTION;
            issues.push(format!(
                "Résumé is short ({} lines); expand experience and projects.",
                self.line_count
            ));
        }
        if self.is_long() {
            deductions += LONG_DEDUCTION;
            issues.push(format!(
                "Résumé is long ({} lines); trim to the most relevant content.",
                self.line_count
            ));
        }
        if !self.has_bullets {
            deductions += NO_BULLETS_DEDUCTION;
            issues.push(
                "No bullet points found; ATS parsers favour bulleted achievements.".to_string(),
            );
        }
        if !self.has_dates {
            deductions += NO_DATES_DEDUCTION;
            issues.push("Dates are missing or use an inconsistent format.".to_string());
        }
        if !self.has_headings {
            deductions += NO_HEADINGS_DEDUCTION;
            issues.push(
                "No standard section headings (Experience, Education, Skills) found.".to_string(),
            );
        }

        if issues.is_empty() {
            issues.push(NO_ISSUES_MESSAGE.to_string());
        }

        FormattingReport {
            score: 100u8.saturating_sub(deductions),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed(lines: usize) -> String {
        let mut text = String::from("EXPERIENCE\nJan 2021 - Present\nMar 2019 - Dec 2020\n");
        for i in 0..lines.saturating_sub(3) {
            text.push_str(&format!("- Shipped feature {i}\n"));
        }
        text
    }

    #[test]
    fn test_clean_resume_reports_positive_message() {
        let checks = FormattingChecks::inspect(&well_formed(40));
        assert_eq!(checks.line_count, 40);
        let report = checks.report();
        assert_eq!(report.score, 100);
        assert_eq!(report.issues, vec![NO_ISSUES_MESSAGE.to_string()]);
    }

    #[test]
    fn test_every_deduction_applies_and_stays_in_range() {
        let checks = FormattingChecks::inspect("just one line of prose");
        let report = checks.report();
        assert_eq!(report.score, 100 - 10 - 10 - 10 - 15);
        assert_eq!(report.issues.len(), 4);
    }

    #[test]
    fn test_blank_lines_count_toward_length() {
        let spaced = well_formed(20).replace('\n', "\n\n");
        let checks = FormattingChecks::inspect(&spaced);
        assert_eq!(checks.line_count, 40);
        assert!(!checks.is_short());
    }

    #[test]
    fn test_long_resume_deduction() {
        let checks = FormattingChecks::inspect(&well_formed(250));
        assert!(checks.is_long());
        assert_eq!(checks.report().score, 85);
    }

    #[test]
    fn test_date_patterns_need_two_occurrences() {
        assert!(!FormattingChecks::inspect("Joined 05/2021").has_dates);
        assert!(FormattingChecks::inspect("05/2021 then 08/2023").has_dates);
        assert!(FormattingChecks::inspect("2018 - 2020, 2020 to present").has_dates);
    }
}
