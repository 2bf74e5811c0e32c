//! Test doubles for the generator seam.
//!
//! `ScriptedGenerator` lets a test decide when, and with what, each call
//! resolves. `StaticGenerator` answers every call immediately.

use crate::error::GenerationError;
use crate::generator::{CurriculumGenerator, GenerationRequest};
use crate::types::{Curriculum, Level, Module, Topic};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

type Reply = Result<Curriculum, GenerationError>;

struct Slot {
    tx: Option<oneshot::Sender<Reply>>,
    rx: Option<oneshot::Receiver<Reply>>,
}

impl Slot {
    fn new() -> Self {
        let (tx, rx) = oneshot::channel();
        Self {
            tx: Some(tx),
            rx: Some(rx),
        }
    }
}

/// Call `n` blocks until the test calls `resolve(n, ..)`.
/// Resolving before the call arrives is fine.
pub struct ScriptedGenerator {
    slots: Mutex<Vec<Slot>>,
    calls: AtomicUsize,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_slot<T>(&self, index: usize, f: impl FnOnce(&mut Slot) -> T) -> T {
        let mut slots = self.slots.lock().unwrap();
        while slots.len() <= index {
            slots.push(Slot::new());
        }
        f(&mut slots[index])
    }

    pub fn resolve(&self, index: usize, reply: Reply) {
        if let Some(tx) = self.with_slot(index, |slot| slot.tx.take()) {
            let _ = tx.send(reply);
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CurriculumGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Reply {
        self.requests.lock().unwrap().push(request.clone());
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let rx = self.with_slot(index, |slot| slot.rx.take());
        match rx {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(GenerationError::Transport("script dropped".to_string()))),
            None => Err(GenerationError::Transport("slot already used".to_string())),
        }
    }
}

/// Answers every call with the same result
pub struct StaticGenerator {
    reply: Reply,
}

impl StaticGenerator {
    pub fn ok(curriculum: Curriculum) -> Self {
        Self { reply: Ok(curriculum) }
    }

    pub fn failing(error: GenerationError) -> Self {
        Self { reply: Err(error) }
    }
}

#[async_trait]
impl CurriculumGenerator for StaticGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Reply {
        self.reply.clone()
    }
}

/// A small but complete curriculum with the given module ids
pub fn sample_curriculum(specialization: &str, module_ids: &[&str]) -> Curriculum {
    let modules = module_ids
        .iter()
        .map(|id| Module {
            id: id.to_string(),
            title: format!("Module {}", id),
            duration: "1 week".to_string(),
            level: Level::Intermediate,
            topics: vec![Topic {
                name: "Core ideas".to_string(),
                description: "What every practitioner uses".to_string(),
            }],
            learning_outcomes: vec!["Apply the core ideas".to_string()],
            industry_alignment: "Vendor certification".to_string(),
            academic_alignment: "ACM CS2023".to_string(),
            is_completed: false,
        })
        .collect();

    Curriculum {
        specialization: specialization.to_string(),
        overview: format!("A path through {}", specialization),
        total_duration: format!("{} weeks", module_ids.len()),
        target_role: "Practitioner".to_string(),
        modules,
        suggested_certifications: vec![],
        prerequisites: vec![],
        adaptive_focus_reasoning: None,
        industry_relevance_score: 75.0,
        grounding_sources: None,
        timestamp: None,
        reminder_frequency: None,
        last_check_in: None,
    }
}
