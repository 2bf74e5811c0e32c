/// Smoke tests for terminal rendering and store wiring

use edupath_cli::render::{
    format_date, progress_bar, render_curriculum, render_prefs, render_saved, render_status,
    PrefsView,
};
use edupath_cli::session::{open_app, wait_or_cancel};
use edupath_cli::to_index;
use edupath_core::controller::{GenerationStatus, OperationKind};
use edupath_core::testing::sample_curriculum;
use edupath_core::types::GroundingSource;
use edupath_core::{AppConfig, Focus, GenerationError, Preferences, Profile, ReminderFrequency};
use tempfile::TempDir;

#[test]
fn test_progress_bar_bounds() {
    assert_eq!(progress_bar(0), "[--------------------]   0%");
    assert_eq!(progress_bar(100), "[####################] 100%");
    assert_eq!(progress_bar(50), "[##########----------]  50%");
}

#[test]
fn test_format_date() {
    assert_eq!(format_date(1_735_689_600_000), "2025-01-01");
}

#[test]
fn test_render_curriculum_marks_completion() {
    let mut curriculum = sample_curriculum("Platform Engineering", &["p1", "p2"]);
    curriculum.modules[0].is_completed = true;
    curriculum.grounding_sources = Some(vec![GroundingSource {
        title: "CNCF".to_string(),
        uri: "https://cncf.io".to_string(),
    }]);

    let out = render_curriculum(&curriculum);
    assert!(out.starts_with("Platform Engineering\n"));
    assert!(out.contains("[x]  1. Module p1"));
    assert!(out.contains("[ ]  2. Module p2"));
    assert!(out.contains(" 50%"));
    assert!(out.contains("CNCF <https://cncf.io>"));
    assert!(!out.contains("Adaptive focus"));
}

#[test]
fn test_render_saved_list() {
    assert_eq!(render_saved(&[]), "No saved paths.\n");

    let mut entry = sample_curriculum("Go", &["g1"]);
    entry.timestamp = Some(1_735_689_600_000);
    entry.reminder_frequency = Some(ReminderFrequency::Weekly);
    let out = render_saved(&[entry]);
    assert!(out.starts_with(" 1. Go"));
    assert!(out.contains("saved 2025-01-01"));
    assert!(out.contains("reminder weekly"));
}

#[test]
fn test_render_status() {
    assert!(render_status(&GenerationStatus::Idle).is_none());
    assert!(render_status(&GenerationStatus::Loading(OperationKind::Refine))
        .unwrap()
        .contains("Refine"));
    assert_eq!(
        render_status(&GenerationStatus::Failed(GenerationError::CancelledByUser)).unwrap(),
        GenerationError::CancelledByUser.user_message()
    );
}

#[test]
fn test_prefs_view() {
    let prefs = Preferences {
        query: "Rust".to_string(),
        focus: Focus::Academic,
        ..Preferences::default()
    };
    let profile = Profile::default();
    let view = PrefsView::new(&prefs, &profile);
    let out = render_prefs(&view);
    assert!(out.contains("Focus:      Academic"));
    assert!(out.contains("Signed in:  no"));
    assert!(out.contains("Skills:     (none)"));

    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["query"], "Rust");
    assert!(json["signed_in_as"].is_null());
}

#[test]
fn test_to_index_is_one_based() {
    assert_eq!(to_index(0), None);
    assert_eq!(to_index(1), Some(0));
}

#[tokio::test]
async fn test_open_app_uses_configured_data_dir() {
    let dir = TempDir::new().unwrap();
    let config = AppConfig {
        data_dir: Some(dir.path().join("data")),
        ..AppConfig::default()
    };

    {
        let mut app = open_app(&config).unwrap();
        app.set_query("Compilers");
        assert!(wait_or_cancel(&mut app).await.unwrap().is_none());
    }

    assert!(config.store_path().exists());
    let app = open_app(&config).unwrap();
    assert_eq!(app.preferences().query, "Compilers");
}
