//! Application state
//!
//! `AppState` is the composition root. It owns the preferences, the
//! workspace, the generation controller and the reminder scheduler, and
//! writes every mutation through to the persistent store. Store failures
//! are logged and never roll back in-memory state.

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::controller::{Completion, GenerationController, GenerationStatus, Outcome, Ticket};
use crate::export::{render_dossier, DossierMeta};
use crate::generator::{CurriculumGenerator, GenerationRequest};
use crate::reminder::{self, DueReminder, ReminderScheduler};
use crate::store::{Store, StoreKey};
use crate::types::{
    Curriculum, Focus, ReminderFrequency, SkillRating, Theme, DEFAULT_EXPERIENCE,
};
use crate::workspace::{SaveResult, ToggleReport, Workspace};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
    SignInRequired,
    NothingToSave,
}

/// Inputs remembered between runs
#[derive(Debug, Clone, PartialEq)]
pub struct Preferences {
    pub query: String,
    pub focus: Focus,
    pub experience: String,
    pub skills: Vec<SkillRating>,
    pub theme: Theme,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            query: String::new(),
            focus: Focus::default(),
            experience: DEFAULT_EXPERIENCE.to_string(),
            skills: Vec::new(),
            theme: Theme::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub logged_in: bool,
    pub email: String,
}

// ============================================================
// STORE HELPERS
// ============================================================

fn read_raw(store: &dyn Store, key: StoreKey) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("[STORE] Failed to read {}: {}", key.as_str(), e);
            None
        }
    }
}

fn read_parsed<T: FromStr>(store: &dyn Store, key: StoreKey) -> Option<T> {
    let raw = read_raw(store, key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("[STORE] Ignoring unrecognised {} value '{}'", key.as_str(), raw);
            None
        }
    }
}

fn read_json<T: DeserializeOwned>(store: &dyn Store, key: StoreKey) -> Option<T> {
    let raw = read_raw(store, key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("[STORE] Corrupt {} ignored: {}", key.as_str(), e);
            None
        }
    }
}

// ============================================================
// APPLICATION STATE
// ============================================================

pub struct AppState {
    store: Box<dyn Store>,
    clock: Arc<dyn Clock>,
    print_delay_ms: u64,
    prefs: Preferences,
    profile: Profile,
    workspace: Workspace,
    controller: GenerationController,
    reminders: ReminderScheduler,
}

impl AppState {
    /// Read every key independently; absent or corrupt values fall back to
    /// defaults
    pub fn load(
        store: Box<dyn Store>,
        clock: Arc<dyn Clock>,
        generator: Arc<dyn CurriculumGenerator>,
        config: &AppConfig,
    ) -> Self {
        let s = store.as_ref();

        let mut skills: Vec<SkillRating> = read_json(s, StoreKey::Skills).unwrap_or_default();
        for rating in skills.iter_mut() {
            rating.level = rating.level.clamp(SkillRating::MIN_LEVEL, SkillRating::MAX_LEVEL);
        }

        let prefs = Preferences {
            query: read_raw(s, StoreKey::Query).unwrap_or_default(),
            focus: read_parsed(s, StoreKey::Focus).unwrap_or_default(),
            experience: read_raw(s, StoreKey::Experience)
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_EXPERIENCE.to_string()),
            skills,
            theme: read_parsed(s, StoreKey::Theme).unwrap_or_default(),
        };

        let profile = Profile {
            logged_in: read_parsed(s, StoreKey::LoggedIn).unwrap_or(false),
            email: read_raw(s, StoreKey::UserEmail).unwrap_or_default(),
        };

        let workspace = Workspace::new(
            read_json(s, StoreKey::Workspace),
            read_json(s, StoreKey::SavedPaths).unwrap_or_default(),
        );

        log::info!(
            "[APP] Loaded state: {} saved paths, workspace {}",
            workspace.saved().len(),
            if workspace.active().is_some() { "present" } else { "empty" }
        );

        let mut state = Self {
            store,
            clock,
            print_delay_ms: config.print_delay_ms,
            prefs,
            profile,
            workspace,
            controller: GenerationController::new(generator, config.refine_failure),
            reminders: ReminderScheduler::new(),
        };
        state.check_reminders();
        state
    }

    fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    fn persist(&self, key: StoreKey, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            log::warn!("[STORE] Failed to write {}: {}", key.as_str(), e);
        }
    }

    fn persist_json<T: Serialize + ?Sized>(&self, key: StoreKey, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => self.persist(key, &json),
            Err(e) => log::warn!("[STORE] Failed to encode {}: {}", key.as_str(), e),
        }
    }

    fn forget(&self, key: StoreKey) {
        if let Err(e) = self.store.remove(key) {
            log::warn!("[STORE] Failed to remove {}: {}", key.as_str(), e);
        }
    }

    fn persist_workspace(&self) {
        match self.workspace.active() {
            Some(active) => self.persist_json(StoreKey::Workspace, active),
            None => self.forget(StoreKey::Workspace),
        }
    }

    fn persist_saved(&mut self) {
        self.persist_json(StoreKey::SavedPaths, self.workspace.saved());
        self.check_reminders();
    }

    // ---- accessors ----

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn active(&self) -> Option<&Curriculum> {
        self.workspace.active()
    }

    pub fn saved(&self) -> &[Curriculum] {
        self.workspace.saved()
    }

    pub fn status(&self) -> &GenerationStatus {
        self.controller.status()
    }

    pub fn is_loading(&self) -> bool {
        self.controller.is_loading()
    }

    pub fn active_reminder(&self) -> Option<&DueReminder> {
        self.reminders.active()
    }

    // ---- preferences ----

    pub fn set_query(&mut self, query: &str) {
        self.prefs.query = query.to_string();
        self.persist(StoreKey::Query, query);
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.prefs.focus = focus;
        self.persist(StoreKey::Focus, focus.as_str());
    }

    pub fn set_experience(&mut self, experience: &str) {
        self.prefs.experience = experience.to_string();
        self.persist(StoreKey::Experience, experience);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.prefs.theme = theme;
        self.persist(StoreKey::Theme, theme.as_str());
    }

    // ---- skill assessment ----

    pub fn add_skill(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        self.prefs.skills.push(SkillRating::new(name));
        self.persist_json(StoreKey::Skills, &self.prefs.skills);
        true
    }

    pub fn remove_skill(&mut self, index: usize) -> Option<SkillRating> {
        if index >= self.prefs.skills.len() {
            return None;
        }
        let removed = self.prefs.skills.remove(index);
        self.persist_json(StoreKey::Skills, &self.prefs.skills);
        Some(removed)
    }

    /// Levels outside 1..=5 are clamped
    pub fn set_skill_level(&mut self, index: usize, level: u8) -> bool {
        let Some(rating) = self.prefs.skills.get_mut(index) else {
            return false;
        };
        rating.level = level.clamp(SkillRating::MIN_LEVEL, SkillRating::MAX_LEVEL);
        self.persist_json(StoreKey::Skills, &self.prefs.skills);
        true
    }

    // ---- profile ----

    pub fn sign_in(&mut self, email: &str) -> bool {
        let email = email.trim();
        if !email.contains('@') {
            return false;
        }
        self.profile = Profile {
            logged_in: true,
            email: email.to_string(),
        };
        self.persist(StoreKey::LoggedIn, "true");
        self.persist(StoreKey::UserEmail, email);
        log::info!("[APP] Signed in as {}", email);
        true
    }

    pub fn sign_out(&mut self) {
        self.profile = Profile::default();
        self.forget(StoreKey::LoggedIn);
        self.forget(StoreKey::UserEmail);
        log::info!("[APP] Signed out");
    }

    // ---- generation ----

    fn request(&self, topic: &str) -> GenerationRequest {
        GenerationRequest::new(
            topic,
            self.prefs.focus,
            &self.prefs.experience,
            self.prefs.skills.clone(),
        )
    }

    /// Start a fresh generation for the current query. A blank query is
    /// ignored.
    pub fn generate(&mut self) -> Option<Ticket> {
        let topic = self.prefs.query.trim().to_string();
        if topic.is_empty() {
            return None;
        }
        let request = self.request(&topic);
        Some(self.controller.generate(request))
    }

    /// Refine the active curriculum. Needs an active curriculum and a
    /// non-blank instruction.
    pub fn refine(&mut self, instruction: &str) -> Option<Ticket> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return None;
        }
        let existing = self.workspace.active()?.clone();
        let topic = match self.prefs.query.trim() {
            "" => existing.specialization.clone(),
            query => query.to_string(),
        };
        let request = self.request(&topic);
        Some(self.controller.refine(&existing, instruction, request))
    }

    pub fn cancel(&mut self) -> bool {
        self.controller.cancel()
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.controller.next_completion().await
    }

    pub fn apply_completion(&mut self, completion: Completion) -> Outcome {
        let outcome = self.controller.apply(completion);
        match &outcome {
            Outcome::Loaded(curriculum) => {
                self.workspace.replace_active(Some(curriculum.clone()));
                self.persist_workspace();
            }
            Outcome::Failed {
                clear_workspace: true,
                ..
            } => {
                self.workspace.replace_active(None);
                self.persist_workspace();
            }
            Outcome::Failed { .. } | Outcome::Discarded => {}
        }
        outcome
    }

    /// Apply completions until the current operation resolves. Returns
    /// `None` when nothing is loading.
    pub async fn wait_current(&mut self) -> Option<Outcome> {
        while self.controller.is_loading() {
            let completion = self.controller.next_completion().await?;
            match self.apply_completion(completion) {
                Outcome::Discarded => continue,
                outcome => return Some(outcome),
            }
        }
        None
    }

    // ---- workspace ----

    pub fn toggle_module(&mut self, module_id: &str) -> ToggleReport {
        let report = self.workspace.toggle_module(module_id);
        if report.active {
            self.persist_workspace();
        }
        if report.saved > 0 {
            self.persist_saved();
        }
        report
    }

    pub fn save_current(&mut self) -> SaveOutcome {
        if !self.profile.logged_in {
            return SaveOutcome::SignInRequired;
        }
        let now = self.now();
        match self.workspace.save_active(now) {
            SaveResult::Saved => {
                self.persist_saved();
                SaveOutcome::Saved
            }
            SaveResult::AlreadySaved => SaveOutcome::AlreadySaved,
            SaveResult::NothingToSave => SaveOutcome::NothingToSave,
        }
    }

    pub fn delete_saved(&mut self, index: usize) -> Option<Curriculum> {
        let removed = self.workspace.delete_saved(index)?;
        self.persist_saved();
        Some(removed)
    }

    pub fn load_saved(&mut self, index: usize) -> bool {
        if !self.workspace.load_saved(index) {
            return false;
        }
        self.persist_workspace();
        true
    }

    // ---- reminders ----

    pub fn set_reminder(&mut self, index: usize, frequency: ReminderFrequency) -> bool {
        let now = self.now();
        let Some(entry) = self.workspace.saved_mut().get_mut(index) else {
            return false;
        };
        reminder::set_frequency(entry, frequency, now);
        log::info!("[REMINDER] '{}' set to {}", entry.specialization, frequency);
        self.persist_saved();
        true
    }

    pub fn check_reminders(&mut self) -> Option<DueReminder> {
        let now = self.now();
        self.reminders
            .evaluate(self.workspace.saved(), now)
            .cloned()
    }

    /// Check in on the active reminder and load its path into the workspace
    pub fn acknowledge_reminder(&mut self) -> Option<Curriculum> {
        let now = self.now();
        let entry = self
            .reminders
            .acknowledge(self.workspace.saved_mut(), now)?;
        self.workspace.replace_active(Some(entry.clone()));
        self.persist_workspace();
        self.persist_saved();
        Some(entry)
    }

    // ---- export ----

    pub fn export_dossier(&self) -> Option<String> {
        let active = self.workspace.active()?;
        let meta = DossierMeta::generate(self.now(), self.print_delay_ms);
        log::info!("[EXPORT] Rendering dossier {} for '{}'", meta.id, active.specialization);
        Some(render_dossier(active, &meta))
    }
}
