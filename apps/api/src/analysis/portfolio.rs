//! Project-Portfolio Scorer.
//!
//! A capped baseline over repository count, stars and followers, blended 40/60 with
//! the provider's relevance judgment. Without a judgment, relevance equals the
//! baseline, so the final score is the baseline itself.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{clamp_score, excerpt, ScoredAnalysis};
use crate::insight::{
    ActionItem, FallbackInsight, Insight, InsightKind, InsightRequest, InsightSource, Priority,
};

pub const BASELINE_WEIGHT: f64 = 0.4;
pub const RELEVANCE_WEIGHT: f64 = 0.6;

const REPO_CAP: f64 = 30.0;
const STAR_CAP: f64 = 40.0;
const FOLLOWER_CAP: f64 = 30.0;

const TOP_LANGUAGES: usize = 3;
const INSIGHT_REPOS: usize = 20;
const INSIGHT_EXCERPT_CHARS: usize = 3000;

pub const NO_REPOS_MESSAGE: &str =
    "No public repositories found. Publish a project or two to build your portfolio score.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: u32,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub public_repos: u32,
    pub total_stars: u32,
    pub followers: u32,
    #[serde(default)]
    pub repositories: Vec<RepoSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioReport {
    pub score: u8,
    pub baseline_score: u8,
    pub relevance_score: u8,
    /// `provider` when the relevance came from the insight provider.
    pub relevance_source: InsightSource,
    pub top_languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub insight: Insight,
}

impl ScoredAnalysis for PortfolioReport {
    fn score(&self) -> u8 {
        self.score
    }

    fn insight(&self) -> Option<&Insight> {
        Some(&self.insight)
    }
}

/// `min(repos/2, 30) + min(stars/5, 40) + min(followers/10, 30)`.
///
/// Kept unrounded: it is blended before the final rounding.
pub fn baseline_score(stats: &PortfolioStats) -> f64 {
    let repos = (f64::from(stats.public_repos) / 2.0).min(REPO_CAP);
    let stars = (f64::from(stats.total_stars) / 5.0).min(STAR_CAP);
    let followers = (f64::from(stats.followers) / 10.0).min(FOLLOWER_CAP);
    (repos + stars + followers).clamp(0.0, 100.0)
}

pub fn blend(baseline: f64, relevance: f64) -> u8 {
    clamp_score(BASELINE_WEIGHT * baseline + RELEVANCE_WEIGHT * relevance)
}

pub async fn analyze_portfolio(
    stats: &PortfolioStats,
    target_role: &str,
    insight: &FallbackInsight,
) -> PortfolioReport {
    let baseline = baseline_score(stats);
    let top_languages = top_languages(&stats.repositories);

    let provider = insight
        .consult(&InsightRequest {
            kind: InsightKind::Portfolio,
            input_excerpt: excerpt(&repo_digest(stats), INSIGHT_EXCERPT_CHARS).to_string(),
            target_role: target_role.to_string(),
        })
        .await;

    let (relevance, relevance_source) = match provider.project_relevance_score {
        Some(judged) => (f64::from(judged), InsightSource::Provider),
        None => (baseline, InsightSource::Heuristic),
    };
    let score = blend(baseline, relevance);

    let mut narrative = provider.or_fallback(fallback_narrative(stats, &top_languages, score));
    narrative.role_match_score = None;

    PortfolioReport {
        score,
        baseline_score: clamp_score(baseline),
        relevance_score: clamp_score(relevance),
        relevance_source,
        top_languages,
        message: (stats.public_repos == 0).then(|| NO_REPOS_MESSAGE.to_string()),
        insight: narrative,
    }
}

/// Most used languages, ties broken alphabetically.
fn top_languages(repos: &[RepoSummary]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        if !language.trim().is_empty() {
            *counts.entry(language).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(TOP_LANGUAGES)
        .map(|(language, _)| language.to_string())
        .collect()
}

fn most_starred(repos: &[RepoSummary]) -> Option<&RepoSummary> {
    repos
        .iter()
        .fold(None, |best: Option<&RepoSummary>, repo| match best {
            Some(b) if b.stars >= repo.stars => Some(b),
            _ => Some(repo),
        })
}

fn repo_digest(stats: &PortfolioStats) -> String {
    let mut digest = format!(
        "Public repositories: {}\nTotal stars: {}\nFollowers: {}\n",
        stats.public_repos, stats.total_stars, stats.followers
    );
    for repo in stats.repositories.iter().take(INSIGHT_REPOS) {
        digest.push_str(&format!(
            "- {} [{}] ★{}: {}\n",
            repo.name,
            repo.language.as_deref().unwrap_or("unknown"),
            repo.stars,
            repo.description.as_deref().unwrap_or("no description")
        ));
    }
    digest
}

fn fallback_narrative(stats: &PortfolioStats, languages: &[String], score: u8) -> Insight {
    if stats.public_repos == 0 {
        return Insight {
            summary: Some(NO_REPOS_MESSAGE.to_string()),
            recommendations: vec![
                "Publish a project that matches your target role, with a clear README.".to_string(),
            ],
            action_plan: vec![ActionItem {
                action: "Push your best project to a public repository".to_string(),
                priority: Priority::High,
                timeline: "This week".to_string(),
            }],
            source: InsightSource::Heuristic,
            ..Insight::default()
        };
    }

    let mut summary = format!(
        "Portfolio score {score}/100 across {} public repositories with {} stars.",
        stats.public_repos, stats.total_stars
    );
    if !languages.is_empty() {
        summary.push_str(&format!(" Main languages: {}.", languages.join(", ")));
    }

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    match most_starred(&stats.repositories) {
        Some(repo) if repo.stars > 0 => strengths.push(format!(
            "{} is your most starred repository ({} stars).",
            repo.name, repo.stars
        )),
        _ => weaknesses.push("None of your repositories has stars yet.".to_string()),
    }
    if languages.len() >= 2 {
        strengths.push(format!("Works across {}.", languages.join(", ")));
    }
    if stats.public_repos < 5 {
        weaknesses.push("Few public repositories.".to_string());
    }
    let undocumented = stats
        .repositories
        .iter()
        .filter(|r| r.description.as_deref().map_or(true, |d| d.trim().is_empty()))
        .count();
    if undocumented > 0 {
        weaknesses.push(format!("{undocumented} repositories have no description."));
    }

    let mut recommendations =
        vec!["Pin your two strongest projects and add screenshots.".to_string()];
    if undocumented > 0 {
        recommendations
            .push("Write a one-line description and README for every repository.".to_string());
    }

    Insight {
        summary: Some(summary),
        strengths,
        weaknesses,
        recommendations,
        action_plan: vec![ActionItem {
            action: "Build one project aimed squarely at your target role".to_string(),
            priority: Priority::Medium,
            timeline: "Next month".to_string(),
        }],
        source: InsightSource::Heuristic,
        ..Insight::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::testing::{failing, fixed};

    fn repo(name: &str, language: Option<&str>, stars: u32) -> RepoSummary {
        RepoSummary {
            name: name.to_string(),
            language: language.map(str::to_string),
            stars,
            description: Some(format!("{name} project")),
        }
    }

    fn stats(public_repos: u32, total_stars: u32, followers: u32) -> PortfolioStats {
        PortfolioStats {
            public_repos,
            total_stars,
            followers,
            repositories: Vec::new(),
        }
    }

    #[test]
    fn test_baseline_caps_each_term() {
        assert_eq!(baseline_score(&stats(10, 50, 40)), 5.0 + 10.0 + 4.0);
        assert_eq!(baseline_score(&stats(1000, 1000, 1000)), 100.0);
        assert_eq!(baseline_score(&stats(0, 0, 0)), 0.0);
    }

    #[test]
    fn test_blend_weights() {
        // 0.4 × 20 + 0.6 × 90 = 62
        assert_eq!(blend(20.0, 90.0), 62);
        assert_eq!(blend(55.0, 55.0), 55);
    }

    #[tokio::test]
    async fn test_relevance_falls_back_to_baseline() {
        let s = stats(10, 50, 40);
        let report = analyze_portfolio(&s, "Frontend", &failing()).await;
        assert_eq!(report.baseline_score, 19);
        assert_eq!(report.relevance_score, 19);
        assert_eq!(report.score, 19);
        assert_eq!(report.relevance_source, InsightSource::Heuristic);
    }

    #[tokio::test]
    async fn test_provider_relevance_is_blended() {
        let s = stats(10, 50, 40);
        let provider = fixed(r#"{"projectRelevanceScore": "85%"}"#);
        let report = analyze_portfolio(&s, "Frontend", &provider).await;
        // 0.4 × 19 + 0.6 × 85 = 58.6
        assert_eq!(report.score, 59);
        assert_eq!(report.relevance_source, InsightSource::Provider);
        // No narrative from the provider, so the heuristic text stays.
        assert_eq!(report.insight.source, InsightSource::Heuristic);
    }

    #[tokio::test]
    async fn test_zero_repos_explains_itself() {
        let report = analyze_portfolio(&stats(0, 0, 3), "", &failing()).await;
        assert_eq!(report.message.as_deref(), Some(NO_REPOS_MESSAGE));
        assert_eq!(report.insight.summary.as_deref(), Some(NO_REPOS_MESSAGE));
        assert!(report.score <= 100);
    }

    #[test]
    fn test_languages_and_most_starred() {
        let repos = vec![
            repo("api", Some("Rust"), 3),
            repo("site", Some("TypeScript"), 12),
            repo("cli", Some("Rust"), 12),
            repo("notes", None, 0),
            repo("bot", Some("Python"), 1),
        ];
        assert_eq!(top_languages(&repos), vec!["Rust", "Python", "TypeScript"]);
        // First of equally starred repositories wins.
        assert_eq!(most_starred(&repos).map(|r| r.name.as_str()), Some("site"));
    }
}
