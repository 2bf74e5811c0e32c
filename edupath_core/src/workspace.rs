//! Workspace & Saved Paths
//!
//! Holds the active curriculum and the saved collection (newest first).
//! Module completion is dual-written: a toggle applies to the active
//! curriculum and to every saved copy containing that module id.

use crate::types::{Curriculum, ReminderFrequency};

/// Completion percentage rounded to the nearest integer; 0 with no modules
pub fn progress(curriculum: &Curriculum) -> u8 {
    let total = curriculum.modules.len();
    if total == 0 {
        return 0;
    }
    let completed = curriculum.completed_count();
    ((completed as f64 / total as f64) * 100.0).round() as u8
}

/// Flip one module in place. Returns false when the id is absent.
fn toggle_in(curriculum: &mut Curriculum, module_id: &str) -> bool {
    match curriculum.modules.iter_mut().find(|m| m.id == module_id) {
        Some(module) => {
            module.is_completed = !module.is_completed;
            true
        }
        None => false,
    }
}

/// Where a toggle landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleReport {
    pub active: bool,
    pub saved: usize,
}

impl ToggleReport {
    pub fn changed(&self) -> bool {
        self.active || self.saved > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    Saved,
    AlreadySaved,
    NothingToSave,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    active: Option<Curriculum>,
    saved: Vec<Curriculum>,
}

impl Workspace {
    pub fn new(active: Option<Curriculum>, saved: Vec<Curriculum>) -> Self {
        Self { active, saved }
    }

    pub fn active(&self) -> Option<&Curriculum> {
        self.active.as_ref()
    }

    pub fn saved(&self) -> &[Curriculum] {
        &self.saved
    }

    pub(crate) fn saved_mut(&mut self) -> &mut [Curriculum] {
        &mut self.saved
    }

    pub fn replace_active(&mut self, curriculum: Option<Curriculum>) {
        self.active = curriculum;
    }

    pub fn toggle_module(&mut self, module_id: &str) -> ToggleReport {
        let mut report = ToggleReport::default();

        if let Some(active) = self.active.as_mut() {
            report.active = toggle_in(active, module_id);
        }
        for entry in self.saved.iter_mut() {
            if toggle_in(entry, module_id) {
                report.saved += 1;
            }
        }

        log::debug!(
            "[WORKSPACE] Toggled '{}' (active: {}, saved copies: {})",
            module_id,
            report.active,
            report.saved
        );
        report
    }

    /// Index of the saved entry with this (specialization, overview) pair
    pub fn find_saved(&self, specialization: &str, overview: &str) -> Option<usize> {
        self.saved
            .iter()
            .position(|c| c.specialization == specialization && c.overview == overview)
    }

    /// Prepend a stamped copy of the active curriculum unless it is already saved
    pub fn save_active(&mut self, now_millis: i64) -> SaveResult {
        let Some(active) = self.active.as_ref() else {
            return SaveResult::NothingToSave;
        };
        if self.find_saved(&active.specialization, &active.overview).is_some() {
            return SaveResult::AlreadySaved;
        }

        let mut entry = active.clone();
        entry.timestamp = Some(now_millis);
        entry.reminder_frequency = Some(ReminderFrequency::Off);
        entry.last_check_in = None;

        log::info!("[WORKSPACE] Saved '{}'", entry.specialization);
        self.saved.insert(0, entry);
        SaveResult::Saved
    }

    pub fn delete_saved(&mut self, index: usize) -> Option<Curriculum> {
        if index >= self.saved.len() {
            return None;
        }
        let removed = self.saved.remove(index);
        log::info!("[WORKSPACE] Deleted saved '{}'", removed.specialization);
        Some(removed)
    }

    /// Make a saved entry the active curriculum; the entry stays saved
    pub fn load_saved(&mut self, index: usize) -> bool {
        match self.saved.get(index) {
            Some(entry) => {
                self.active = Some(entry.clone());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_curriculum as curriculum;

    #[test]
    fn test_progress_rounds() {
        let mut c = curriculum("Rust", &["m1", "m2", "m3"]);
        assert_eq!(progress(&c), 0);
        c.modules[0].is_completed = true;
        assert_eq!(progress(&c), 33);
        c.modules[1].is_completed = true;
        assert_eq!(progress(&c), 67);
        c.modules[2].is_completed = true;
        assert_eq!(progress(&c), 100);
    }

    #[test]
    fn test_progress_without_modules() {
        assert_eq!(progress(&curriculum("Empty", &[])), 0);
    }

    #[test]
    fn test_toggle_is_dual_written() {
        let active = curriculum("Rust", &["m1", "m2"]);
        let mut other = curriculum("Go", &["m1"]);
        other.overview = "something else".to_string();
        let unrelated = curriculum("Zig", &["z1"]);
        let mut ws = Workspace::new(Some(active.clone()), vec![active, other, unrelated]);

        let report = ws.toggle_module("m1");
        assert!(report.active);
        assert_eq!(report.saved, 2);
        assert!(ws.active().unwrap().modules[0].is_completed);
        assert!(ws.saved()[0].modules[0].is_completed);
        assert!(ws.saved()[1].modules[0].is_completed);
        assert!(!ws.saved()[2].modules[0].is_completed);

        ws.toggle_module("m1");
        assert!(!ws.active().unwrap().modules[0].is_completed);
        assert!(!ws.saved()[0].modules[0].is_completed);
    }

    #[test]
    fn test_toggle_unknown_id_changes_nothing() {
        let mut ws = Workspace::new(Some(curriculum("Rust", &["m1"])), vec![]);
        let before = ws.clone();
        assert!(!ws.toggle_module("nope").changed());
        assert_eq!(ws, before);
    }

    #[test]
    fn test_toggle_with_no_active_still_updates_saved() {
        let mut ws = Workspace::new(None, vec![curriculum("Rust", &["m1"])]);
        let report = ws.toggle_module("m1");
        assert!(!report.active);
        assert_eq!(report.saved, 1);
    }

    #[test]
    fn test_save_stamps_and_prepends() {
        let mut ws = Workspace::new(Some(curriculum("Older", &["o1"])), vec![]);
        assert_eq!(ws.save_active(1_000), SaveResult::Saved);

        ws.replace_active(Some(curriculum("Newer", &["n1"])));
        assert_eq!(ws.save_active(2_000), SaveResult::Saved);

        assert_eq!(ws.saved()[0].specialization, "Newer");
        assert_eq!(ws.saved()[0].timestamp, Some(2_000));
        assert_eq!(ws.saved()[0].reminder_frequency, Some(ReminderFrequency::Off));
        assert_eq!(ws.saved()[1].specialization, "Older");
        assert!(ws.active().unwrap().timestamp.is_none());
    }

    #[test]
    fn test_save_is_idempotent() {
        let mut ws = Workspace::new(Some(curriculum("Rust", &["m1"])), vec![]);
        assert_eq!(ws.save_active(1), SaveResult::Saved);
        assert_eq!(ws.save_active(2), SaveResult::AlreadySaved);
        assert_eq!(ws.saved().len(), 1);
        assert_eq!(ws.saved()[0].timestamp, Some(1));
    }

    #[test]
    fn test_save_dedups_on_path_not_content() {
        let mut ws = Workspace::new(Some(curriculum("Rust", &["m1"])), vec![]);
        assert_eq!(ws.save_active(1), SaveResult::Saved);

        let mut regenerated = curriculum("Rust", &["r1", "r2", "r3"]);
        regenerated.modules[0].is_completed = true;
        ws.replace_active(Some(regenerated));
        assert_eq!(ws.save_active(2), SaveResult::AlreadySaved);

        assert_eq!(ws.saved().len(), 1);
        assert_eq!(ws.saved()[0].modules.len(), 1);
        assert_eq!(ws.find_saved("Rust", "A path through Rust"), Some(0));
    }

    #[test]
    fn test_save_without_active() {
        let mut ws = Workspace::default();
        assert_eq!(ws.save_active(1), SaveResult::NothingToSave);
    }

    #[test]
    fn test_delete_and_load() {
        let mut ws = Workspace::new(None, vec![curriculum("A", &["a1"]), curriculum("B", &["b1"])]);
        assert!(ws.load_saved(1));
        assert_eq!(ws.active().unwrap().specialization, "B");
        assert_eq!(ws.saved().len(), 2);

        assert_eq!(ws.delete_saved(0).unwrap().specialization, "A");
        assert!(ws.delete_saved(5).is_none());
        assert!(!ws.load_saved(5));
        assert_eq!(ws.find_saved("B", "A path through B"), Some(0));
    }
}
