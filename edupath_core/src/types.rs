//! Curriculum Types
//!
//! Core data structures shared by the generator, the workspace, the
//! reminder scheduler and the export formatter. Field names serialize in
//! camelCase so persisted documents keep the shape the model returns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================
// MODULE
// ============================================================

/// Difficulty level of a single module
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "Beginner",
            Level::Intermediate => "Intermediate",
            Level::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named topic covered by a module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Topic {
    pub name: String,
    pub description: String,
}

/// One unit of a curriculum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Unique within its curriculum and stable across saves
    pub id: String,
    pub title: String,
    pub duration: String,
    pub level: Level,
    pub topics: Vec<Topic>,
    pub learning_outcomes: Vec<String>,
    pub industry_alignment: String,
    pub academic_alignment: String,
    #[serde(default)]
    pub is_completed: bool,
}

// ============================================================
// CURRICULUM
// ============================================================

/// A citation returned alongside a generated curriculum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// How often a saved curriculum asks for a check-in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReminderFrequency {
    #[default]
    #[serde(rename = "None")]
    Off,
    Weekly,
    Monthly,
    Yearly,
}

impl ReminderFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderFrequency::Off => "none",
            ReminderFrequency::Weekly => "weekly",
            ReminderFrequency::Monthly => "monthly",
            ReminderFrequency::Yearly => "yearly",
        }
    }
}

impl fmt::Display for ReminderFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Ok(ReminderFrequency::Off),
            "weekly" => Ok(ReminderFrequency::Weekly),
            "monthly" => Ok(ReminderFrequency::Monthly),
            "yearly" => Ok(ReminderFrequency::Yearly),
            other => Err(format!("unknown reminder frequency '{}'", other)),
        }
    }
}

/// The generated structured learning plan
///
/// Only the per-module completion flags and, on saved copies, the reminder
/// fields change after generation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Curriculum {
    pub specialization: String,
    pub overview: String,
    pub total_duration: String,
    pub target_role: String,
    pub modules: Vec<Module>,
    pub suggested_certifications: Vec<String>,
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adaptive_focus_reasoning: Option<String>,
    pub industry_relevance_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
    /// Epoch milliseconds, set when the curriculum is saved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_frequency: Option<ReminderFrequency>,
    /// Epoch milliseconds of the last acknowledged check-in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_check_in: Option<i64>,
}

impl Curriculum {
    pub fn completed_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_completed).count()
    }
}

// ============================================================
// REQUEST INPUTS
// ============================================================

/// Self-reported proficiency for one skill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillRating {
    pub skill: String,
    /// 1 (novice) to 5 (expert)
    pub level: u8,
}

impl SkillRating {
    pub const MIN_LEVEL: u8 = 1;
    pub const MAX_LEVEL: u8 = 5;
    pub const DEFAULT_LEVEL: u8 = 3;

    pub fn new(skill: &str) -> Self {
        Self {
            skill: skill.to_string(),
            level: Self::DEFAULT_LEVEL,
        }
    }
}

/// Which standards the curriculum should lean towards
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Focus {
    Industry,
    Academic,
    #[default]
    Balanced,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::Industry => "Industry",
            Focus::Academic => "Academic",
            Focus::Balanced => "Balanced",
        }
    }
}

impl fmt::Display for Focus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Focus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "industry" => Ok(Focus::Industry),
            "academic" => Ok(Focus::Academic),
            "balanced" => Ok(Focus::Balanced),
            other => Err(format!("unknown focus '{}'", other)),
        }
    }
}

/// Experience descriptor used when nothing has been stored yet
pub const DEFAULT_EXPERIENCE: &str = "Beginner";

/// Display theme preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reminder_frequency_serializes_none_variant() {
        let json = serde_json::to_string(&ReminderFrequency::Off).unwrap();
        assert_eq!(json, "\"None\"");
        let back: ReminderFrequency = serde_json::from_str("\"Weekly\"").unwrap();
        assert_eq!(back, ReminderFrequency::Weekly);
    }

    #[test]
    fn test_curriculum_omits_unset_client_fields() {
        let curriculum = crate::testing::sample_curriculum("Rust", &["m1"]);
        let value = serde_json::to_value(&curriculum).unwrap();
        assert!(value.get("timestamp").is_none());
        assert!(value.get("reminderFrequency").is_none());
        assert_eq!(value["modules"][0]["isCompleted"], false);
        assert_eq!(value["totalDuration"], "1 weeks");
    }

    #[test]
    fn test_module_completion_defaults_false() {
        let json = r#"{"id":"m1","title":"T","duration":"1w","level":"Advanced",
            "topics":[],"learningOutcomes":[],"industryAlignment":"","academicAlignment":""}"#;
        let module: Module = serde_json::from_str(json).unwrap();
        assert!(!module.is_completed);
        assert_eq!(module.level, Level::Advanced);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("industry".parse::<Focus>().unwrap(), Focus::Industry);
        assert_eq!("Monthly".parse::<ReminderFrequency>().unwrap(), ReminderFrequency::Monthly);
        assert_eq!("none".parse::<ReminderFrequency>().unwrap(), ReminderFrequency::Off);
        assert!("hourly".parse::<ReminderFrequency>().is_err());
        assert_eq!("DARK".parse::<Theme>().unwrap(), Theme::Dark);
    }
}
