//! Prompt and response schema for curriculum generation.
//!
//! The schema is declared to the service so its output is structurally
//! constrained; the parse boundary still checks every field.

use super::GenerationRequest;
use crate::types::SkillRating;
use serde_json::{json, Value};

/// Ratings at or above this skip the basics
const ADVANCED_RATING: u8 = 4;
/// Ratings at or below this get foundation modules
const NOVICE_RATING: u8 = 2;

fn assessment_section(assessment: &[SkillRating]) -> String {
    if assessment.is_empty() {
        return "No specific skill assessment provided. Design for general proficiency based on the experience level."
            .to_string();
    }

    let ratings = assessment
        .iter()
        .map(|s| format!("- {}: {}/5", s.skill, s.level))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"USER SELF-ASSESSMENT:
The user has rated their skills as follows (1=Novice, 5=Expert):
{}

ADAPTATION RULE:
- If a skill is rated {} or 5, reduce basic coverage and move to advanced applications or specific edge cases.
- If a skill is rated 1 or {}, provide comprehensive foundation modules.
- Ensure the curriculum addresses the gaps specifically."#,
        ratings, ADVANCED_RATING, NOVICE_RATING
    )
}

fn refinement_section(request: &GenerationRequest) -> String {
    match &request.refinement {
        Some(r) => format!(
            r#"

REFINEMENT CONTEXT:
You previously designed the curriculum "{}".
Previous overview: {}
The user asked for the following changes: {}
Produce the complete revised curriculum (all modules), not only the changed parts."#,
            r.specialization, r.overview, r.instruction
        ),
        None => String::new(),
    }
}

/// Build the prompt text for a fresh generation or a refinement
pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        r#"Design a highly detailed adaptive specialization curriculum for "{}".
The target user has a general background of "{}".
Focus preference: {}.

{}

CRITICAL REQUIREMENTS:
1. INDUSTRY STANDARDS: Align with modern market requirements (FAANG, leading startups) and current tech stacks.
2. ACADEMIC STANDARDS: Align with frameworks like ACM/IEEE CS2023 or high-ranking university syllabi.
3. STRUCTURE: Provide 6-8 modules, each with a unique id.
4. ALIGNMENT: Each module must map to a specific certification or academic standard.
5. REASONING: In 'adaptiveFocusReasoning', explain how you tailored this to the assessment provided.
6. RELEVANCE: Rate 'industryRelevanceScore' from 0 to 100.{}"#,
        request.topic,
        request.experience,
        request.focus,
        assessment_section(&request.assessment),
        refinement_section(request)
    )
}

/// Strict output schema declared to the service
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "specialization": { "type": "STRING" },
            "overview": { "type": "STRING" },
            "totalDuration": { "type": "STRING" },
            "targetRole": { "type": "STRING" },
            "adaptiveFocusReasoning": {
                "type": "STRING",
                "description": "Explanation of how the curriculum was customized based on the user's skill assessment."
            },
            "industryRelevanceScore": { "type": "NUMBER" },
            "modules": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "title": { "type": "STRING" },
                        "duration": { "type": "STRING" },
                        "level": { "type": "STRING", "enum": ["Beginner", "Intermediate", "Advanced"] },
                        "topics": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "name": { "type": "STRING" },
                                    "description": { "type": "STRING" }
                                },
                                "required": ["name", "description"]
                            }
                        },
                        "learningOutcomes": { "type": "ARRAY", "items": { "type": "STRING" } },
                        "industryAlignment": { "type": "STRING" },
                        "academicAlignment": { "type": "STRING" }
                    },
                    "required": ["id", "title", "duration", "level", "topics", "learningOutcomes", "industryAlignment", "academicAlignment"]
                }
            },
            "suggestedCertifications": { "type": "ARRAY", "items": { "type": "STRING" } },
            "prerequisites": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": [
            "specialization", "overview", "totalDuration", "targetRole", "modules",
            "suggestedCertifications", "prerequisites", "industryRelevanceScore"
        ]
    })
}
