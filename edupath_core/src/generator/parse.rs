//! Validating parse boundary for curriculum documents.
//!
//! Model output is deserialized into payload types that only know the
//! fields the service is allowed to produce, then checked before it is
//! turned into a [`Curriculum`]. Client-only fields (timestamps, reminder
//! settings, completion flags) never come from the service.

use crate::error::GenerationError;
use crate::types::{Curriculum, Level, Module, Topic};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurriculumPayload {
    specialization: String,
    overview: String,
    total_duration: String,
    target_role: String,
    modules: Vec<ModulePayload>,
    suggested_certifications: Vec<String>,
    prerequisites: Vec<String>,
    #[serde(default)]
    adaptive_focus_reasoning: Option<String>,
    industry_relevance_score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModulePayload {
    id: String,
    title: String,
    duration: String,
    level: Level,
    topics: Vec<Topic>,
    learning_outcomes: Vec<String>,
    industry_alignment: String,
    academic_alignment: String,
}

fn code_fence() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| {
        Regex::new(r"(?s)^```[A-Za-z]*\s*(.*?)\s*```$").expect("code fence pattern is valid")
    })
}

/// Strip a surrounding Markdown code fence, if any
fn unwrap_fence(text: &str) -> &str {
    match code_fence().captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str(),
        None => text,
    }
}

fn validate(payload: &CurriculumPayload) -> Result<(), GenerationError> {
    let score = payload.industry_relevance_score;
    if !score.is_finite() || !(0.0..=100.0).contains(&score) {
        return Err(GenerationError::MalformedResponse(format!(
            "industryRelevanceScore {} is outside 0..=100",
            score
        )));
    }

    let mut seen = HashSet::new();
    for module in &payload.modules {
        if module.id.trim().is_empty() {
            return Err(GenerationError::MalformedResponse(format!(
                "module '{}' has a blank id",
                module.title
            )));
        }
        if !seen.insert(module.id.as_str()) {
            return Err(GenerationError::MalformedResponse(format!(
                "duplicate module id '{}'",
                module.id
            )));
        }
    }

    Ok(())
}

/// Parse and validate the text body of a model response
pub fn parse_curriculum(text: &str) -> Result<Curriculum, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let body = unwrap_fence(trimmed);
    if body.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let payload: CurriculumPayload = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;
    validate(&payload)?;

    let modules = payload
        .modules
        .into_iter()
        .map(|m| Module {
            id: m.id,
            title: m.title,
            duration: m.duration,
            level: m.level,
            topics: m.topics,
            learning_outcomes: m.learning_outcomes,
            industry_alignment: m.industry_alignment,
            academic_alignment: m.academic_alignment,
            is_completed: false,
        })
        .collect();

    Ok(Curriculum {
        specialization: payload.specialization,
        overview: payload.overview,
        total_duration: payload.total_duration,
        target_role: payload.target_role,
        modules,
        suggested_certifications: payload.suggested_certifications,
        prerequisites: payload.prerequisites,
        adaptive_focus_reasoning: payload
            .adaptive_focus_reasoning
            .filter(|r| !r.trim().is_empty()),
        industry_relevance_score: payload.industry_relevance_score,
        grounding_sources: None,
        timestamp: None,
        reminder_frequency: None,
        last_check_in: None,
    })
}
