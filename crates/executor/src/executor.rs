// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! [`BootstrapExecutor`] — runs an ordered [`PlanStep`] list strictly
//! sequentially, through a [`nodeagent_bus::Dispatcher`] (design §4.3, C3).
//! `FailurePolicy` decides whether a failing step aborts the remainder of
//! the run or is skipped over so the rest still gets a chance to run.

use crate::plan::{PlanStep, StepKind};
use crate::result::{ExecutionResult, StepOutcome};
use nodeagent_bus::Dispatcher;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Whether a failing step aborts the remaining plan, or is recorded and
/// skipped over so later steps still get a chance to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    AbortOnFirstFailure,
    BestEffort,
}

/// Runs an ordered [`PlanStep`] list strictly sequentially through a
/// [`Dispatcher`] (design §4.3). Cancellation observed between steps stops
/// the run without attempting the remaining steps.
pub struct BootstrapExecutor {
    dispatcher: Dispatcher,
}

impl BootstrapExecutor {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn run(&self, steps: Vec<PlanStep>, policy: FailurePolicy) -> ExecutionResult {
        let run_started = Instant::now();
        let mut outcomes = Vec::with_capacity(steps.len());

        for step in steps {
            if self.dispatcher.context().is_cancelled() {
                outcomes.push(StepOutcome {
                    name: step.name,
                    duration: std::time::Duration::ZERO,
                    success: false,
                    error: Some("cancelled before step started".to_string()),
                });
                break;
            }

            let step_started = Instant::now();
            info!(step = %step.name, "bootstrap executor: starting step");
            let result = self.run_step(&step).await;
            let duration = step_started.elapsed();

            match result {
                Ok(()) => {
                    info!(step = %step.name, duration_ms = duration.as_millis(), "bootstrap executor: step succeeded");
                    outcomes.push(StepOutcome { name: step.name, duration, success: true, error: None });
                }
                Err(message) => {
                    let outcome =
                        StepOutcome { name: step.name.clone(), duration, success: false, error: Some(message.clone()) };
                    match policy {
                        FailurePolicy::AbortOnFirstFailure => {
                            warn!(step = %step.name, error = %message, "bootstrap executor: step failed, aborting");
                            outcomes.push(outcome);
                            break;
                        }
                        FailurePolicy::BestEffort => {
                            warn!(step = %step.name, error = %message, "bootstrap executor: step failed, continuing (best-effort)");
                            outcomes.push(outcome);
                        }
                    }
                }
            }
        }

        ExecutionResult::from_steps(outcomes, run_started.elapsed())
    }

    async fn run_step(&self, step: &PlanStep) -> Result<(), String> {
        match &step.kind {
            StepKind::Dispatch(envelope) => {
                self.dispatcher.apply(envelope.clone()).await.map(|_| ()).map_err(|e| e.to_string())
            }
            StepKind::ServiceStop(unit) => {
                self.dispatcher.context().service_manager.stop(unit).await.map_err(|e| e.to_string())
            }
            StepKind::ServiceRestart(unit) => {
                self.dispatcher.context().service_manager.reload_or_restart(unit).await.map_err(|e| e.to_string())
            }
            StepKind::NoOp => {
                debug!(step = %step.name, "bootstrap executor: no-op step (no removal handler implemented)");
                Ok(())
            }
        }
    }
}
