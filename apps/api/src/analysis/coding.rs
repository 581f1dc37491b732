//! Coding-Practice Scorer.
//!
//! The score is a pure formula over solved counts and acceptance rate. The insight
//! provider only contributes narrative and focus topics; without it, topics come
//! from the role's practice list ordered by how little of each the user has covered.

use serde::{Deserialize, Serialize};

use crate::analysis::{clamp_score, excerpt, ScoredAnalysis};
use crate::insight::{
    ActionItem, FallbackInsight, Insight, InsightKind, InsightRequest, InsightSource, Priority,
};
use crate::roles::{resolve_role, RoleProfile};

pub const VOLUME_CAP: f64 = 40.0;
pub const PROBLEMS_PER_VOLUME_POINT: f64 = 5.0;
pub const MEDIUM_WEIGHT: f64 = 30.0;
pub const HARD_WEIGHT: f64 = 20.0;
pub const ACCEPTANCE_WEIGHT: f64 = 0.1;
pub const FOCUS_TOPIC_LIMIT: usize = 4;

const INSIGHT_EXCERPT_CHARS: usize = 3000;

pub const NO_PROBLEMS_MESSAGE: &str =
    "No solved problems yet. Solve a few easy problems to get a coding score.";

/// Per-topic progress as reported by the practice platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicStat {
    pub name: String,
    pub solved: u32,
    pub total: u32,
}

/// Normalized practice statistics. Fetching them is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingStats {
    pub total_solved: u32,
    #[serde(default)]
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    /// Percentage in [0, 100].
    pub acceptance_rate: f64,
    #[serde(default)]
    pub topics: Vec<TopicStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DifficultyMix {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodingReport {
    pub score: u8,
    pub total_solved: u32,
    pub difficulty: DifficultyMix,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub insight: Insight,
}

impl ScoredAnalysis for CodingReport {
    fn score(&self) -> u8 {
        self.score
    }

    fn insight(&self) -> Option<&Insight> {
        Some(&self.insight)
    }
}

/// `min(total/5, 40) + medium/total × 30 + hard/total × 20 + acceptance × 0.1`, clamped.
/// No solved problems scores 0 whatever the acceptance rate says.
pub fn compute_coding_score(stats: &CodingStats) -> u8 {
    if stats.total_solved == 0 {
        return 0;
    }
    let total = f64::from(stats.total_solved);
    let volume = (total / PROBLEMS_PER_VOLUME_POINT).min(VOLUME_CAP);
    let medium = f64::from(stats.medium_solved) / total * MEDIUM_WEIGHT;
    let hard = f64::from(stats.hard_solved) / total * HARD_WEIGHT;
    let acceptance = if stats.acceptance_rate.is_finite() {
        stats.acceptance_rate * ACCEPTANCE_WEIGHT
    } else {
        0.0
    };
    clamp_score(volume + medium + hard + acceptance)
}

/// Role practice topics, least covered first (ties: fewest solved first).
pub fn fallback_focus_topics(stats: &CodingStats, profile: &RoleProfile) -> Vec<String> {
    let mut ranked: Vec<(&str, f64, u32)> = profile
        .practice_topics
        .iter()
        .map(|topic| {
            let stat = stats
                .topics
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(topic));
            let (solved, total) = stat.map_or((0, 0), |t| (t.solved, t.total));
            let ratio = if total == 0 {
                0.0
            } else {
                f64::from(solved) / f64::from(total)
            };
            (*topic, ratio, solved)
        })
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(FOCUS_TOPIC_LIMIT)
        .map(|(topic, _, _)| topic.to_string())
        .collect()
}

pub async fn analyze_coding(
    stats: &CodingStats,
    target_role: &str,
    insight: &FallbackInsight,
) -> CodingReport {
    let profile = resolve_role(target_role);
    let score = compute_coding_score(stats);

    let provider = insight
        .consult(&InsightRequest {
            kind: InsightKind::Coding,
            input_excerpt: excerpt(&stats_digest(stats), INSIGHT_EXCERPT_CHARS).to_string(),
            target_role: target_role.to_string(),
        })
        .await;

    let mut narrative = provider.or_fallback(fallback_narrative(stats, profile, score));
    narrative.focus_topics.truncate(FOCUS_TOPIC_LIMIT);
    // Coding has no provider score to blend.
    narrative.role_match_score = None;
    narrative.project_relevance_score = None;

    CodingReport {
        score,
        total_solved: stats.total_solved,
        difficulty: DifficultyMix {
            easy: stats.easy_solved,
            medium: stats.medium_solved,
            hard: stats.hard_solved,
        },
        message: (stats.total_solved == 0).then(|| NO_PROBLEMS_MESSAGE.to_string()),
        insight: narrative,
    }
}

fn stats_digest(stats: &CodingStats) -> String {
    let mut digest = format!(
        "Total solved: {} (easy {}, medium {}, hard {})\nAcceptance rate: {:.1}%\n",
        stats.total_solved,
        stats.easy_solved,
        stats.medium_solved,
        stats.hard_solved,
        stats.acceptance_rate
    );
    for topic in &stats.topics {
        digest.push_str(&format!("- {}: {}/{}\n", topic.name, topic.solved, topic.total));
    }
    digest
}

fn fallback_narrative(stats: &CodingStats, profile: &RoleProfile, score: u8) -> Insight {
    let focus_topics = fallback_focus_topics(stats, profile);

    if stats.total_solved == 0 {
        return Insight {
            summary: Some(NO_PROBLEMS_MESSAGE.to_string()),
            recommendations: vec!["Start with easy problems on arrays and strings.".to_string()],
            action_plan: vec![ActionItem {
                action: "Solve 10 easy problems".to_string(),
                priority: Priority::High,
                timeline: "This week".to_string(),
            }],
            focus_topics,
            source: InsightSource::Heuristic,
            ..Insight::default()
        };
    }

    let total = f64::from(stats.total_solved);
    let medium_share = f64::from(stats.medium_solved) / total;
    let hard_share = f64::from(stats.hard_solved) / total;

    let summary = format!(
        "Coding score {score}/100 from {} solved problems ({} easy, {} medium, {} hard) at {:.0}% acceptance.",
        stats.total_solved,
        stats.easy_solved,
        stats.medium_solved,
        stats.hard_solved,
        stats.acceptance_rate
    );

    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    if stats.total_solved >= 200 {
        strengths.push("Consistent practice volume.".to_string());
    } else {
        weaknesses.push("Practice volume is still low.".to_string());
    }
    if medium_share >= 0.4 {
        strengths.push("Good share of medium-difficulty problems.".to_string());
    } else {
        weaknesses.push("Few medium-difficulty problems solved.".to_string());
    }
    if hard_share >= 0.1 {
        strengths.push("Comfortable attempting hard problems.".to_string());
    } else {
        weaknesses.push("Hard problems are rarely attempted.".to_string());
    }
    if stats.acceptance_rate < 50.0 {
        weaknesses.push("Low acceptance rate; test edge cases before submitting.".to_string());
    }

    let recommendations = focus_topics
        .iter()
        .map(|topic| format!("Practise {topic} problems."))
        .collect();
    let action_plan = focus_topics
        .iter()
        .take(2)
        .map(|topic| ActionItem {
            action: format!("Solve five {topic} problems"),
            priority: Priority::Medium,
            timeline: "Next two weeks".to_string(),
        })
        .collect();

    Insight {
        summary: Some(summary),
        strengths,
        weaknesses,
        recommendations,
        action_plan,
        focus_topics,
        source: InsightSource::Heuristic,
        ..Insight::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insight::testing::{failing, fixed};

    fn stats(total: u32, medium: u32, hard: u32, acceptance: f64) -> CodingStats {
        CodingStats {
            total_solved: total,
            easy_solved: total.saturating_sub(medium + hard),
            medium_solved: medium,
            hard_solved: hard,
            acceptance_rate: acceptance,
            topics: Vec::new(),
        }
    }

    #[test]
    fn test_reference_score() {
        // 40 + 0.5 × 30 + 0.2 × 20 + 80 × 0.1
        assert_eq!(compute_coding_score(&stats(500, 250, 100, 80.0)), 67);
    }

    #[test]
    fn test_zero_solved_scores_zero() {
        assert_eq!(compute_coding_score(&stats(0, 0, 0, 95.0)), 0);
    }

    #[test]
    fn test_inconsistent_counts_are_clamped() {
        // medium and hard exceeding total would push ratios above 1
        let wild = stats(10, 500, 500, 1000.0);
        assert_eq!(compute_coding_score(&wild), 100);
        assert_eq!(compute_coding_score(&stats(10, 0, 0, f64::NAN)), 2);
        assert_eq!(compute_coding_score(&stats(10, 0, 0, -500.0)), 0);
    }

    fn topic(name: &str, solved: u32, total: u32) -> TopicStat {
        TopicStat {
            name: name.to_string(),
            solved,
            total,
        }
    }

    #[test]
    fn test_focus_topics_sorted_by_coverage_then_solved() {
        let profile = resolve_role("");
        let mut s = stats(100, 40, 10, 60.0);
        s.topics = vec![
            topic("array", 40, 50),
            topic("String", 5, 50),
            topic("Hash Table", 10, 20),
            topic("Tree", 2, 20),
        ];
        // Linked List and Dynamic Programming have no stats; String and Tree tie on ratio.
        assert_eq!(
            fallback_focus_topics(&s, profile),
            vec!["Linked List", "Dynamic Programming", "Tree", "String"]
        );
    }

    #[tokio::test]
    async fn test_provider_focus_topics_preferred_and_capped() {
        let provider = fixed(
            r#"Sure! {"summary": "Steady progress.", "focusTopics": ["Graphs", "Tries", "Heaps", "Bit Manipulation", "Geometry"]}"#,
        );
        let report = analyze_coding(&stats(120, 50, 10, 70.0), "", &provider).await;
        assert_eq!(report.score, compute_coding_score(&stats(120, 50, 10, 70.0)));
        assert_eq!(
            report.insight.focus_topics,
            vec!["Graphs", "Tries", "Heaps", "Bit Manipulation"]
        );
        assert_eq!(report.insight.summary.as_deref(), Some("Steady progress."));
        assert_eq!(report.insight.source, InsightSource::Provider);
    }

    #[tokio::test]
    async fn test_failed_provider_gives_heuristic_narrative() {
        let report = analyze_coding(&stats(0, 0, 0, 0.0), "Backend Engineer", &failing()).await;
        assert_eq!(report.score, 0);
        assert_eq!(report.message.as_deref(), Some(NO_PROBLEMS_MESSAGE));
        assert_eq!(report.insight.source, InsightSource::Heuristic);
        assert_eq!(report.insight.focus_topics.len(), FOCUS_TOPIC_LIMIT);
    }
}
