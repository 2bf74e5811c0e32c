//! Plain-text rendering for the terminal.
//!
//! Everything here returns a `String` so the output can be checked in tests
//! without a terminal.

use chrono::{TimeZone, Utc};
use edupath_core::controller::GenerationStatus;
use edupath_core::reminder::DueReminder;
use edupath_core::{progress, Curriculum, Preferences, Profile};
use serde::Serialize;
use std::fmt::Write;

const BAR_WIDTH: usize = 20;

pub fn progress_bar(percent: u8) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

pub fn format_date(millis: i64) -> String {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn render_curriculum(curriculum: &Curriculum) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", curriculum.specialization);
    let _ = writeln!(out, "{}", "=".repeat(curriculum.specialization.chars().count()));
    let _ = writeln!(out, "{}", curriculum.overview);
    let _ = writeln!(
        out,
        "Role: {} | Duration: {} | Industry relevance: {:.0}/100",
        curriculum.target_role, curriculum.total_duration, curriculum.industry_relevance_score
    );
    let _ = writeln!(out, "Progress: {}", progress_bar(progress(curriculum)));

    if let Some(reasoning) = &curriculum.adaptive_focus_reasoning {
        let _ = writeln!(out, "\nAdaptive focus: {}", reasoning);
    }

    let _ = writeln!(out, "\nModules:");
    for (i, module) in curriculum.modules.iter().enumerate() {
        let mark = if module.is_completed { "x" } else { " " };
        let _ = writeln!(
            out,
            "  [{}] {:>2}. {} ({}, {}) id={}",
            mark,
            i + 1,
            module.title,
            module.level,
            module.duration,
            module.id
        );
        for topic in &module.topics {
            let _ = writeln!(out, "        - {}: {}", topic.name, topic.description);
        }
    }

    if !curriculum.prerequisites.is_empty() {
        let _ = writeln!(out, "\nPrerequisites: {}", curriculum.prerequisites.join(", "));
    }
    if !curriculum.suggested_certifications.is_empty() {
        let _ = writeln!(
            out,
            "Certifications: {}",
            curriculum.suggested_certifications.join(", ")
        );
    }
    if let Some(sources) = &curriculum.grounding_sources {
        let _ = writeln!(out, "\nSources:");
        for source in sources {
            let _ = writeln!(out, "  - {} <{}>", source.title, source.uri);
        }
    }

    out
}

/// Numbered list, 1-based, newest first
pub fn render_saved(saved: &[Curriculum]) -> String {
    if saved.is_empty() {
        return "No saved paths.\n".to_string();
    }

    let mut out = String::new();
    for (i, entry) in saved.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {} {} saved {} reminder {}",
            i + 1,
            entry.specialization,
            progress_bar(progress(entry)),
            entry.timestamp.map(format_date).unwrap_or_else(|| "-".to_string()),
            entry.reminder_frequency.unwrap_or_default()
        );
    }
    out
}

pub fn render_status(status: &GenerationStatus) -> Option<String> {
    match status {
        GenerationStatus::Idle => None,
        GenerationStatus::Loading(kind) => Some(format!("{:?} in progress...", kind)),
        GenerationStatus::Failed(error) => Some(error.user_message()),
    }
}

pub fn render_reminder(due: &DueReminder) -> String {
    format!(
        "Check-in due: '{}' ({} reminder). Run `edupath check-in` to pick it up again.",
        due.specialization, due.frequency
    )
}

/// Snapshot of the remembered inputs, for `prefs --json`
#[derive(Debug, Serialize)]
pub struct PrefsView<'a> {
    pub query: &'a str,
    pub focus: &'a str,
    pub experience: &'a str,
    pub theme: &'a str,
    pub skills: Vec<(&'a str, u8)>,
    pub signed_in_as: Option<&'a str>,
}

impl<'a> PrefsView<'a> {
    pub fn new(prefs: &'a Preferences, profile: &'a Profile) -> Self {
        Self {
            query: &prefs.query,
            focus: prefs.focus.as_str(),
            experience: &prefs.experience,
            theme: prefs.theme.as_str(),
            skills: prefs
                .skills
                .iter()
                .map(|s| (s.skill.as_str(), s.level))
                .collect(),
            signed_in_as: profile.logged_in.then_some(profile.email.as_str()),
        }
    }
}

pub fn render_prefs(view: &PrefsView<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Query:      {}", view.query);
    let _ = writeln!(out, "Focus:      {}", view.focus);
    let _ = writeln!(out, "Experience: {}", view.experience);
    let _ = writeln!(out, "Theme:      {}", view.theme);
    let _ = writeln!(out, "Signed in:  {}", view.signed_in_as.unwrap_or("no"));
    if view.skills.is_empty() {
        let _ = writeln!(out, "Skills:     (none)");
    } else {
        let _ = writeln!(out, "Skills:");
        for (i, (skill, level)) in view.skills.iter().enumerate() {
            let _ = writeln!(out, "  {:>2}. {} {}/5", i + 1, skill, level);
        }
    }
    out
}
