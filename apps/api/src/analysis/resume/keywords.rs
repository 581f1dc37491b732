use serde::Serialize;

use crate::roles::RoleProfile;

pub const MAX_MISSING: usize = 10;
pub const MAX_RECOMMENDED: usize = 5;

/// Role keyword coverage over the whole résumé, in profile order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordReport {
    pub found: Vec<String>,
    pub missing: Vec<String>,
    pub recommended: Vec<String>,
    /// |found| / |required|, before any list capping.
    pub coverage: f64,
}

/// Case-insensitive substring matching of the profile's keywords against `text`.
pub fn match_keywords(text: &str, profile: &RoleProfile) -> KeywordReport {
    let lower = text.to_lowercase();

    let (found, missing): (Vec<&str>, Vec<&str>) = profile
        .required_keywords
        .iter()
        .copied()
        .partition(|k| lower.contains(*k));

    let coverage = if profile.required_keywords.is_empty() {
        0.0
    } else {
        found.len() as f64 / profile.required_keywords.len() as f64
    };

    let recommended = profile
        .recommended_keywords
        .iter()
        .filter(|k| !lower.contains(*k))
        .take(MAX_RECOMMENDED)
        .map(|k| k.to_string())
        .collect();

    KeywordReport {
        found: found.into_iter().map(str::to_string).collect(),
        missing: missing
            .into_iter()
            .take(MAX_MISSING)
            .map(str::to_string)
            .collect(),
        recommended,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{resolve_role, DEFAULT_PROFILE, ROLE_RULES};
    use std::collections::BTreeSet;

    #[test]
    fn test_found_and_missing_partition_required_set() {
        let profile = resolve_role("Backend Developer");
        let report = match_keywords("Java and PYTHON developer, Docker fan", profile);
        assert_eq!(report.found, vec!["java", "python", "docker"]);

        let union: BTreeSet<&str> = report
            .found
            .iter()
            .chain(&report.missing)
            .map(String::as_str)
            .collect();
        let required: BTreeSet<&str> = profile.required_keywords.iter().copied().collect();
        assert_eq!(union, required);
        assert!((report.coverage - 3.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_lists_are_capped_for_every_profile() {
        let profiles = ROLE_RULES
            .iter()
            .map(|r| &r.profile)
            .chain(std::iter::once(&DEFAULT_PROFILE));
        for profile in profiles {
            let report = match_keywords("", profile);
            assert!(report.missing.len() <= MAX_MISSING);
            assert!(report.recommended.len() <= MAX_RECOMMENDED);
            assert!(report.found.is_empty());
            assert_eq!(report.coverage, 0.0);
        }
    }

    #[test]
    fn test_recommended_excludes_present_keywords_in_source_order() {
        let profile = resolve_role("Backend Developer");
        let report = match_keywords("Experience with Kafka and Redis", profile);
        assert_eq!(
            report.recommended,
            vec!["kubernetes", "aws", "golang", "spring boot", "postgresql"]
        );
    }
}
