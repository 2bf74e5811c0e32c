//! EduPath core library
//!
//! Adaptive curriculum generation, progress tracking, saved paths with
//! check-in reminders, and printable dossier export.

pub mod app;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod generator;
pub mod reminder;
pub mod store;
pub mod testing;
pub mod types;
pub mod workspace;

pub use app::{AppState, Preferences, Profile, SaveOutcome};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{AppConfig, ConfigError, RefineFailurePolicy};
pub use controller::{GenerationController, GenerationStatus, OperationKind, Outcome, Ticket};
pub use error::GenerationError;
pub use generator::{CurriculumGenerator, GeminiClient, GenerationRequest};
pub use reminder::{DueReminder, ReminderScheduler, ReminderTicker};
pub use store::{InMemoryStore, SqliteStore, Store, StoreError, StoreKey};
pub use types::{Curriculum, Focus, Level, Module, ReminderFrequency, SkillRating, Theme};
pub use workspace::{progress, Workspace};
