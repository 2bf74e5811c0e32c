//! Curriculum Generator Client
//!
//! Translates a generation request into the external service's input
//! (prompt plus a strict response schema) and validates what comes back.
//!
//! - `prompt`: prompt text and response schema
//! - `parse`: the validating parse boundary for curriculum documents
//! - `gemini`: the HTTPS client for the hosted model

pub mod gemini;
pub mod parse;
pub mod prompt;

pub use gemini::GeminiClient;
pub use parse::parse_curriculum;
pub use prompt::{build_prompt, response_schema};

use crate::error::GenerationError;
use crate::types::{Curriculum, Focus, SkillRating};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Summary of an existing curriculum plus the change the user asked for
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Refinement {
    pub instruction: String,
    pub specialization: String,
    pub overview: String,
}

impl Refinement {
    /// Only the summary travels to the service, never the whole document
    pub fn of(existing: &Curriculum, instruction: &str) -> Self {
        Self {
            instruction: instruction.to_string(),
            specialization: existing.specialization.clone(),
            overview: existing.overview.clone(),
        }
    }
}

/// Everything one outbound call carries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationRequest {
    pub topic: String,
    pub focus: Focus,
    pub experience: String,
    pub assessment: Vec<SkillRating>,
    pub refinement: Option<Refinement>,
}

impl GenerationRequest {
    pub fn new(topic: &str, focus: Focus, experience: &str, assessment: Vec<SkillRating>) -> Self {
        Self {
            topic: topic.to_string(),
            focus,
            experience: experience.to_string(),
            assessment,
            refinement: None,
        }
    }

    pub fn with_refinement(mut self, refinement: Refinement) -> Self {
        self.refinement = Some(refinement);
        self
    }

    pub fn is_refinement(&self) -> bool {
        self.refinement.is_some()
    }
}

/// One external call per request; no local state is touched
#[async_trait]
pub trait CurriculumGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<Curriculum, GenerationError>;
}
