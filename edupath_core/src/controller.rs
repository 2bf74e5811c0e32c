//! Generation Controller
//!
//! Runs one logical generate/refine operation at a time. Every operation
//! advances a monotonically increasing request token and captures it in a
//! [`Ticket`]. The external call runs as a spawned task and posts a
//! [`Completion`] back on a channel; the owner of the controller applies
//! completions on its own thread, and a completion whose token is no longer
//! current is dropped without touching any state.
//!
//! Cancellation only advances the token. The underlying call keeps running
//! to completion or failure; its result is suppressed.

use crate::config::RefineFailurePolicy;
use crate::error::GenerationError;
use crate::generator::{CurriculumGenerator, GenerationRequest, Refinement};
use crate::types::Curriculum;
use std::sync::Arc;
use tokio::sync::mpsc;

// ============================================================
// OPERATION TYPES
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Generate,
    Refine,
}

/// Identifies one started operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub token: u64,
    pub kind: OperationKind,
}

/// Result of a background call, tagged with the ticket it was started under
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: Result<Curriculum, GenerationError>,
}

/// What the user sees in place of (or next to) the curriculum
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Loading(OperationKind),
    Failed(GenerationError),
}

/// What applying a completion means for the workspace
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Show this curriculum as the active workspace
    Loaded(Curriculum),
    /// Show the error; drop the active curriculum when `clear_workspace`
    Failed {
        error: GenerationError,
        clear_workspace: bool,
    },
    /// Superseded or cancelled; nothing changes
    Discarded,
}

// ============================================================
// CONTROLLER
// ============================================================

pub struct GenerationController {
    generator: Arc<dyn CurriculumGenerator>,
    refine_failure: RefineFailurePolicy,
    token: u64,
    status: GenerationStatus,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl GenerationController {
    pub fn new(generator: Arc<dyn CurriculumGenerator>, refine_failure: RefineFailurePolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            generator,
            refine_failure,
            token: 0,
            status: GenerationStatus::Idle,
            tx,
            rx,
        }
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, GenerationStatus::Loading(_))
    }

    pub fn current_token(&self) -> u64 {
        self.token
    }

    /// Start a fresh generation, superseding any operation in flight.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn generate(&mut self, request: GenerationRequest) -> Ticket {
        self.start(OperationKind::Generate, request)
    }

    /// Start a refinement of `existing`. Only its summary is sent along.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn refine(
        &mut self,
        existing: &Curriculum,
        instruction: &str,
        request: GenerationRequest,
    ) -> Ticket {
        let request = request.with_refinement(Refinement::of(existing, instruction));
        self.start(OperationKind::Refine, request)
    }

    fn start(&mut self, kind: OperationKind, request: GenerationRequest) -> Ticket {
        self.token += 1;
        let ticket = Ticket {
            token: self.token,
            kind,
        };
        self.status = GenerationStatus::Loading(kind);
        log::info!("[CONTROLLER] Started {:?} with token {}", kind, ticket.token);

        let generator = Arc::clone(&self.generator);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = generator.generate(&request).await;
            if tx.send(Completion { ticket, result }).is_err() {
                log::debug!("[CONTROLLER] Controller dropped before token {} resolved", ticket.token);
            }
        });

        ticket
    }

    /// Suppress whatever is in flight. Returns true when an operation was
    /// loading, in which case the status becomes a cancellation error.
    pub fn cancel(&mut self) -> bool {
        self.token += 1;
        if self.is_loading() {
            log::info!("[CONTROLLER] Cancelled; token advanced to {}", self.token);
            self.status = GenerationStatus::Failed(GenerationError::CancelledByUser);
            true
        } else {
            false
        }
    }

    /// Wait for the next background call to resolve, stale or not
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.rx.recv().await
    }

    /// Apply a completion if its token is still current
    pub fn apply(&mut self, completion: Completion) -> Outcome {
        let Completion { ticket, result } = completion;

        if ticket.token != self.token {
            log::info!(
                "[CONTROLLER] Discarding stale result for token {} (current {})",
                ticket.token,
                self.token
            );
            return Outcome::Discarded;
        }

        match result {
            Ok(curriculum) => {
                log::info!(
                    "[CONTROLLER] Token {} produced '{}' with {} modules",
                    ticket.token,
                    curriculum.specialization,
                    curriculum.modules.len()
                );
                self.status = GenerationStatus::Idle;
                Outcome::Loaded(curriculum)
            }
            Err(error) => {
                log::warn!("[CONTROLLER] Token {} failed: {}", ticket.token, error);
                let clear_workspace = match ticket.kind {
                    OperationKind::Generate => true,
                    OperationKind::Refine => {
                        self.refine_failure == RefineFailurePolicy::ClearWorkspace
                    }
                };
                self.status = GenerationStatus::Failed(error.clone());
                Outcome::Failed {
                    error,
                    clear_workspace,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedGenerator;
    use crate::testing::sample_curriculum as curriculum;
    use crate::types::Focus;

    fn request(topic: &str) -> GenerationRequest {
        GenerationRequest::new(topic, Focus::Balanced, "Beginner", vec![])
    }

    #[tokio::test]
    async fn test_generate_then_apply() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut controller =
            GenerationController::new(generator.clone(), RefineFailurePolicy::ClearWorkspace);

        let ticket = controller.generate(request("Rust"));
        assert_eq!(ticket.token, 1);
        assert_eq!(controller.status(), &GenerationStatus::Loading(OperationKind::Generate));

        generator.resolve(0, Ok(curriculum("Rust", &["m1"])));
        let completion = controller.next_completion().await.unwrap();
        match controller.apply(completion) {
            Outcome::Loaded(c) => assert_eq!(c.specialization, "Rust"),
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(controller.status(), &GenerationStatus::Idle);
    }

    #[tokio::test]
    async fn test_superseded_result_is_discarded() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut controller =
            GenerationController::new(generator.clone(), RefineFailurePolicy::ClearWorkspace);

        let first = controller.generate(request("A"));
        let second = controller.generate(request("B"));
        assert!(second.token > first.token);

        generator.resolve(0, Ok(curriculum("A", &["a1"])));
        let stale = controller.next_completion().await.unwrap();
        assert_eq!(stale.ticket, first);
        assert_eq!(controller.apply(stale), Outcome::Discarded);
        assert!(controller.is_loading());

        generator.resolve(1, Err(GenerationError::EmptyResponse));
        let fresh = controller.next_completion().await.unwrap();
        assert_eq!(
            controller.apply(fresh),
            Outcome::Failed {
                error: GenerationError::EmptyResponse,
                clear_workspace: true
            }
        );
    }

    #[tokio::test]
    async fn test_cancel_suppresses_in_flight_result() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut controller =
            GenerationController::new(generator.clone(), RefineFailurePolicy::ClearWorkspace);

        controller.generate(request("Rust"));
        assert!(controller.cancel());
        assert_eq!(
            controller.status(),
            &GenerationStatus::Failed(GenerationError::CancelledByUser)
        );

        generator.resolve(0, Ok(curriculum("Rust", &["m1"])));
        let completion = controller.next_completion().await.unwrap();
        assert_eq!(controller.apply(completion), Outcome::Discarded);
        assert_eq!(
            controller.status(),
            &GenerationStatus::Failed(GenerationError::CancelledByUser)
        );
    }

    #[tokio::test]
    async fn test_cancel_when_idle_keeps_status() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut controller =
            GenerationController::new(generator, RefineFailurePolicy::ClearWorkspace);
        assert!(!controller.cancel());
        assert_eq!(controller.status(), &GenerationStatus::Idle);
        assert_eq!(controller.current_token(), 1);
    }

    #[tokio::test]
    async fn test_refine_failure_policy() {
        for (policy, expect_clear) in [
            (RefineFailurePolicy::ClearWorkspace, true),
            (RefineFailurePolicy::KeepPrevious, false),
        ] {
            let generator = Arc::new(ScriptedGenerator::new());
            let mut controller = GenerationController::new(generator.clone(), policy);
            let existing = curriculum("Rust", &["m1"]);

            controller.refine(&existing, "shorter please", request("Rust"));
            generator.resolve(0, Err(GenerationError::Transport("reset".into())));
            let completion = controller.next_completion().await.unwrap();
            match controller.apply(completion) {
                Outcome::Failed { clear_workspace, .. } => assert_eq!(clear_workspace, expect_clear),
                other => panic!("unexpected outcome {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_refine_sends_summary() {
        let generator = Arc::new(ScriptedGenerator::new());
        let mut controller =
            GenerationController::new(generator.clone(), RefineFailurePolicy::ClearWorkspace);
        let existing = curriculum("Rust", &["m1"]);

        controller.refine(&existing, "add async", request("Rust"));
        generator.resolve(0, Ok(curriculum("Rust v2", &["m1", "m2"])));
        controller.next_completion().await.unwrap();

        let sent = generator.requests();
        let refinement = sent[0].refinement.as_ref().unwrap();
        assert_eq!(refinement.instruction, "add async");
        assert_eq!(refinement.specialization, "Rust");
        assert_eq!(refinement.overview, existing.overview);
    }
}
