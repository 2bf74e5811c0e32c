//! Reminder Scheduler
//!
//! Decides whether a saved curriculum is due for a check-in and holds at
//! most one active notification. Evaluation is passive: it reads the saved
//! collection and never mutates it, so running it twice changes nothing.
//!
//! [`ReminderTicker`] supplies the coarse periodic tick; the owner of the
//! application state re-evaluates whenever a tick arrives.

use crate::types::{Curriculum, ReminderFrequency};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;
pub const WEEK_MS: i64 = 7 * DAY_MS;
pub const MONTH_MS: i64 = 30 * DAY_MS;
pub const YEAR_MS: i64 = 365 * DAY_MS;

pub fn interval_millis(frequency: ReminderFrequency) -> Option<i64> {
    match frequency {
        ReminderFrequency::Off => None,
        ReminderFrequency::Weekly => Some(WEEK_MS),
        ReminderFrequency::Monthly => Some(MONTH_MS),
        ReminderFrequency::Yearly => Some(YEAR_MS),
    }
}

/// Last check-in, else save time, else now
fn reference_time(entry: &Curriculum, now_millis: i64) -> i64 {
    entry.last_check_in.or(entry.timestamp).unwrap_or(now_millis)
}

pub fn is_due(entry: &Curriculum, now_millis: i64) -> bool {
    let Some(interval) = entry.reminder_frequency.and_then(interval_millis) else {
        return false;
    };
    // saturating: persisted times may be arbitrary
    now_millis.saturating_sub(reference_time(entry, now_millis)) >= interval
}

/// Changing the frequency restarts the interval from `now_millis`
pub fn set_frequency(entry: &mut Curriculum, frequency: ReminderFrequency, now_millis: i64) {
    entry.reminder_frequency = Some(frequency);
    entry.last_check_in = Some(now_millis);
}

/// The active notification, identified by the saved entry's path
#[derive(Debug, Clone, PartialEq)]
pub struct DueReminder {
    pub specialization: String,
    pub overview: String,
    pub frequency: ReminderFrequency,
}

impl DueReminder {
    fn of(entry: &Curriculum) -> Self {
        Self {
            specialization: entry.specialization.clone(),
            overview: entry.overview.clone(),
            frequency: entry.reminder_frequency.unwrap_or_default(),
        }
    }

    fn matches(&self, entry: &Curriculum) -> bool {
        entry.specialization == self.specialization && entry.overview == self.overview
    }
}

#[derive(Debug, Default)]
pub struct ReminderScheduler {
    active: Option<DueReminder>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<&DueReminder> {
        self.active.as_ref()
    }

    /// Keep the active notification while its entry still exists, otherwise
    /// surface the first due entry in saved order
    pub fn evaluate(&mut self, saved: &[Curriculum], now_millis: i64) -> Option<&DueReminder> {
        if let Some(active) = &self.active {
            if saved.iter().any(|entry| active.matches(entry)) {
                return self.active.as_ref();
            }
            log::info!(
                "[REMINDER] Dropping notification for deleted path '{}'",
                active.specialization
            );
            self.active = None;
        }

        if let Some(entry) = saved.iter().find(|entry| is_due(entry, now_millis)) {
            log::info!(
                "[REMINDER] '{}' is due for its {} check-in",
                entry.specialization,
                entry.reminder_frequency.unwrap_or_default()
            );
            self.active = Some(DueReminder::of(entry));
        }

        self.active.as_ref()
    }

    /// Record the check-in on the matching entry and clear the notification.
    /// Returns the entry so the caller can load it into the workspace.
    pub fn acknowledge(&mut self, saved: &mut [Curriculum], now_millis: i64) -> Option<Curriculum> {
        let active = self.active.take()?;
        let entry = saved.iter_mut().find(|entry| active.matches(entry))?;
        entry.last_check_in = Some(now_millis);
        log::info!("[REMINDER] Checked in on '{}'", entry.specialization);
        Some(entry.clone())
    }
}

// ============================================================
// PERIODIC TICK
// ============================================================

#[derive(Debug, Error, PartialEq)]
pub enum TickerError {
    #[error("reminder ticker is already running")]
    AlreadyRunning,
}

/// Background loop that emits a tick every `period` until stopped
pub struct ReminderTicker {
    period: Duration,
    running: Arc<AtomicBool>,
}

impl ReminderTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Spawn the loop. Ticks the owner has not consumed yet are coalesced.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<mpsc::Receiver<()>, TickerError> {
        if self.running.swap(true, Ordering::Relaxed) {
            return Err(TickerError::AlreadyRunning);
        }

        log::info!("[REMINDER] Ticker starting (every {:?})", self.period);
        let (tx, rx) = mpsc::channel(1);
        let running = Arc::clone(&self.running);
        let period = self.period;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !running.load(Ordering::Relaxed) || tx.is_closed() {
                    break;
                }
                // full means the previous tick is still pending
                let _ = tx.try_send(());
            }
            running.store(false, Ordering::Relaxed);
            log::info!("[REMINDER] Ticker stopped");
        });

        Ok(rx)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_curriculum as curriculum;

    const NOW: i64 = 1_700_000_000_000;

    fn saved(spec: &str, frequency: ReminderFrequency, last_check_in: Option<i64>) -> Curriculum {
        let mut c = curriculum(spec, &["m1"]);
        c.timestamp = Some(NOW - YEAR_MS * 2);
        c.reminder_frequency = Some(frequency);
        c.last_check_in = last_check_in;
        c
    }

    #[test]
    fn test_weekly_boundary() {
        let due = saved("Rust", ReminderFrequency::Weekly, Some(NOW - 7 * DAY_MS));
        let not_due = saved("Rust", ReminderFrequency::Weekly, Some(NOW - 6 * DAY_MS));
        assert!(is_due(&due, NOW));
        assert!(!is_due(&not_due, NOW));
    }

    #[test]
    fn test_reference_falls_back_to_timestamp() {
        let mut c = saved("Rust", ReminderFrequency::Monthly, None);
        c.timestamp = Some(NOW - 30 * DAY_MS);
        assert!(is_due(&c, NOW));
        c.timestamp = Some(NOW - 29 * DAY_MS);
        assert!(!is_due(&c, NOW));
    }

    #[test]
    fn test_reference_falls_back_to_now() {
        let mut c = saved("Rust", ReminderFrequency::Weekly, None);
        c.timestamp = None;
        assert!(!is_due(&c, NOW));
    }

    #[test]
    fn test_extreme_stored_times() {
        let ancient = saved("Rust", ReminderFrequency::Weekly, Some(i64::MIN));
        assert!(is_due(&ancient, NOW));

        let future = saved("Rust", ReminderFrequency::Weekly, Some(NOW + YEAR_MS));
        assert!(!is_due(&future, NOW));

        let far_future = saved("Rust", ReminderFrequency::Yearly, Some(i64::MAX));
        assert!(!is_due(&far_future, -NOW));
    }

    #[test]
    fn test_off_is_never_due() {
        let c = saved("Rust", ReminderFrequency::Off, Some(0));
        assert!(!is_due(&c, NOW));
        let mut unset = c.clone();
        unset.reminder_frequency = None;
        assert!(!is_due(&unset, NOW));
    }

    #[test]
    fn test_set_frequency_resets_check_in() {
        let mut c = saved("Rust", ReminderFrequency::Off, None);
        set_frequency(&mut c, ReminderFrequency::Weekly, NOW);
        assert_eq!(c.last_check_in, Some(NOW));
        assert!(!is_due(&c, NOW + 6 * DAY_MS));
        assert!(is_due(&c, NOW + WEEK_MS));
    }

    #[test]
    fn test_first_due_entry_wins_and_stays() {
        let list = vec![
            saved("A", ReminderFrequency::Off, None),
            saved("B", ReminderFrequency::Weekly, Some(NOW - WEEK_MS)),
            saved("C", ReminderFrequency::Yearly, Some(NOW - YEAR_MS)),
        ];
        let mut scheduler = ReminderScheduler::new();
        assert_eq!(scheduler.evaluate(&list, NOW).unwrap().specialization, "B");
        assert_eq!(scheduler.evaluate(&list, NOW).unwrap().specialization, "B");
    }

    #[test]
    fn test_no_new_notification_while_one_is_active() {
        let mut list = vec![saved("B", ReminderFrequency::Weekly, Some(NOW - WEEK_MS))];
        let mut scheduler = ReminderScheduler::new();
        scheduler.evaluate(&list, NOW);
        list.insert(0, saved("A", ReminderFrequency::Weekly, Some(NOW - WEEK_MS)));
        assert_eq!(scheduler.evaluate(&list, NOW).unwrap().specialization, "B");
    }

    #[test]
    fn test_stale_notification_is_dropped() {
        let mut list = vec![
            saved("A", ReminderFrequency::Weekly, Some(NOW - WEEK_MS)),
            saved("B", ReminderFrequency::Weekly, Some(NOW - WEEK_MS)),
        ];
        let mut scheduler = ReminderScheduler::new();
        scheduler.evaluate(&list, NOW);
        list.remove(0);
        assert_eq!(scheduler.evaluate(&list, NOW).unwrap().specialization, "B");
        list.clear();
        assert!(scheduler.evaluate(&list, NOW).is_none());
    }

    #[test]
    fn test_acknowledge_records_check_in() {
        let mut list = vec![saved("A", ReminderFrequency::Weekly, Some(NOW - WEEK_MS))];
        let mut scheduler = ReminderScheduler::new();
        scheduler.evaluate(&list, NOW);

        let entry = scheduler.acknowledge(&mut list, NOW).unwrap();
        assert_eq!(entry.specialization, "A");
        assert_eq!(list[0].last_check_in, Some(NOW));
        assert!(scheduler.active().is_none());
        assert!(scheduler.evaluate(&list, NOW).is_none());
        assert!(scheduler.acknowledge(&mut list, NOW).is_none());
    }

    #[tokio::test]
    async fn test_ticker_ticks_until_stopped() {
        let ticker = ReminderTicker::new(Duration::from_millis(10));
        let mut rx = ticker.start().unwrap();
        assert!(ticker.is_running());
        assert_eq!(ticker.start().unwrap_err(), TickerError::AlreadyRunning);

        for _ in 0..2 {
            let tick = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
            assert_eq!(tick.unwrap(), Some(()));
        }

        ticker.stop();
        let drained = tokio::time::timeout(Duration::from_secs(2), async {
            while rx.recv().await.is_some() {}
        })
        .await;
        assert!(drained.is_ok());
        assert!(!ticker.is_running());
    }
}
