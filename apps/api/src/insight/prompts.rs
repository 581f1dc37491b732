// Insight prompts, one template per analysis kind.
// Reuses the cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, SCORE_RANGE_INSTRUCTION};

use super::{InsightKind, InsightRequest};

/// System prompt shared by every insight request.
pub const INSIGHT_SYSTEM: &str = JSON_ONLY_SYSTEM;

const RESUME_TEMPLATE: &str = r#"You are an experienced technical recruiter reviewing a résumé for the role "{target_role}".

RÉSUMÉ TEXT:
{input}

Return a JSON object with this schema (every field optional):
{
  "roleMatchScore": 0,
  "summary": "two sentences on how well the résumé fits the role",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "recommendations": ["..."],
  "actionPlan": [{"action": "...", "priority": "high|medium|low", "timeline": "..."}]
}"#;

const CODING_TEMPLATE: &str = r#"You are a coding-interview coach preparing a learner for the role "{target_role}".

PRACTICE STATISTICS:
{input}

Return a JSON object with this schema (every field optional):
{
  "summary": "two sentences on the learner's practice habits",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "recommendations": ["..."],
  "focusTopics": ["up to four topics to practise next"],
  "actionPlan": [{"action": "...", "priority": "high|medium|low", "timeline": "..."}]
}"#;

const PORTFOLIO_TEMPLATE: &str = r#"You are a hiring manager reviewing a candidate's public repositories for the role "{target_role}".

PROFILE AND REPOSITORIES:
{input}

Return a JSON object with this schema (every field optional):
{
  "projectRelevanceScore": 0,
  "summary": "two sentences on how relevant the projects are to the role",
  "strengths": ["..."],
  "weaknesses": ["..."],
  "recommendations": ["..."],
  "actionPlan": [{"action": "...", "priority": "high|medium|low", "timeline": "..."}]
}"#;

/// Renders the user prompt for a request.
pub fn build_prompt(request: &InsightRequest) -> String {
    let template = match request.kind {
        InsightKind::Resume => RESUME_TEMPLATE,
        InsightKind::Coding => CODING_TEMPLATE,
        InsightKind::Portfolio => PORTFOLIO_TEMPLATE,
    };
    let role = if request.target_role.trim().is_empty() {
        "software engineer"
    } else {
        request.target_role.trim()
    };
    let mut prompt = template
        .replace("{target_role}", role)
        .replace("{input}", &request.input_excerpt);
    if request.kind != InsightKind::Coding {
        prompt.push_str("\n\n");
        prompt.push_str(SCORE_RANGE_INSTRUCTION);
    }
    prompt
}
