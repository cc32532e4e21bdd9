//! Tick system - orchestrates one architect decision
//!
//! A tick snapshots the state, asks the decision maker for an action,
//! paces any reasoning steps into the log, then folds the decision back in
//! through `SimulationState::apply_decision`.
//!
//! Ticks are single-flight: `TickPhase` moves Idle -> Ticking -> Idle and a
//! trigger that arrives while Ticking is dropped. A tick in flight always
//! runs to completion; switching auto mode off only stops new ticks.

use crate::core::config::ArchitectConfig;
use crate::llm::decision::{Action, DecisionMaker};
use crate::llm::parser::ActionKind;
use crate::simulation::state::{AgentStatus, SimulationState};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::RwLock;

/// Message logged when applying a decision fails
pub const LOOP_ERROR_MESSAGE: &str = "Connection to the architect core was interrupted";

/// Single-flight state machine for ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    Idle,
    Ticking,
}

/// What a call to `tick` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A decision was applied
    Applied(ActionKind),
    /// Applying the decision failed; state unchanged apart from an error log
    Failed,
    /// Another tick was already in flight
    Skipped,
}

/// Restores `TickPhase::Idle` on every exit path
struct PhaseGuard<'a> {
    phase: &'a Mutex<TickPhase>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut phase) = self.phase.lock() {
            *phase = TickPhase::Idle;
        }
    }
}

/// The architect simulation: state, decision maker and tick orchestration
pub struct Simulation<D> {
    state: RwLock<SimulationState>,
    decider: D,
    config: ArchitectConfig,
    phase: Mutex<TickPhase>,
    auto: AtomicBool,
}

impl<D: DecisionMaker> Simulation<D> {
    pub fn new(decider: D, config: ArchitectConfig) -> Self {
        Self::with_state(decider, config, SimulationState::new())
    }

    pub fn with_state(decider: D, config: ArchitectConfig, state: SimulationState) -> Self {
        Self {
            state: RwLock::new(state),
            decider,
            config,
            phase: Mutex::new(TickPhase::Idle),
            auto: AtomicBool::new(false),
        }
    }

    /// Clone of the current state for rendering
    pub async fn snapshot(&self) -> SimulationState {
        self.state.read().await.clone()
    }

    pub fn phase(&self) -> TickPhase {
        self.phase
            .lock()
            .map(|p| *p)
            .unwrap_or(TickPhase::Idle)
    }

    /// Apply a reducer to the shared state
    pub async fn update(&self, reducer: impl FnOnce(SimulationState) -> SimulationState) {
        let mut guard = self.state.write().await;
        let current = std::mem::take(&mut *guard);
        *guard = reducer(current);
    }

    /// Idle -> Ticking, or None if a tick is already in flight
    fn begin(&self) -> Option<PhaseGuard<'_>> {
        let mut phase = self.phase.lock().ok()?;
        if *phase == TickPhase::Ticking {
            return None;
        }
        *phase = TickPhase::Ticking;
        Some(PhaseGuard { phase: &self.phase })
    }

    /// Run one decision cycle
    pub async fn tick(&self) -> TickOutcome {
        let Some(_guard) = self.begin() else {
            tracing::debug!("tick already in flight, ignoring trigger");
            return TickOutcome::Skipped;
        };

        self.update(|s| s.with_status(AgentStatus::Thinking, 0.1))
            .await;
        let snapshot = self.snapshot().await;
        let decision = self.decider.decide(&snapshot).await;

        let status = match decision.action {
            Action::Place { .. } => AgentStatus::Building,
            Action::Move { .. } => AgentStatus::Moving,
            Action::Wait => AgentStatus::Thinking,
        };
        self.update(|s| s.with_status(status, 0.5)).await;

        let delay = self.config.reasoning_step_delay();
        for (i, step) in decision.reasoning_steps.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.update(|s| s.with_thought(step, Utc::now())).await;
        }

        let outcome = {
            let mut guard = self.state.write().await;
            match (*guard).clone().apply_decision(&decision, Utc::now()) {
                Ok(next) => {
                    *guard = next;
                    TickOutcome::Applied(decision.kind())
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to apply decision");
                    let current = std::mem::take(&mut *guard);
                    *guard = current.with_error(LOOP_ERROR_MESSAGE, Utc::now());
                    TickOutcome::Failed
                }
            }
        };

        self.update(|s| s.with_status(AgentStatus::Idle, 0.0)).await;

        let state = self.state.read().await;
        tracing::info!(
            outcome = ?outcome,
            objects = state.stats.total_blocks,
            tier = %state.stats.tier,
            "tick complete"
        );
        outcome
    }

    /// Enable or disable auto mode
    ///
    /// Disabling never interrupts a tick in flight.
    pub fn set_auto(&self, enabled: bool) {
        self.auto.store(enabled, Ordering::SeqCst);
    }

    pub fn is_auto(&self) -> bool {
        self.auto.load(Ordering::SeqCst)
    }

    /// Tick repeatedly while auto mode is on
    ///
    /// Stops after `max_ticks` ticks (if given) or once auto mode is turned
    /// off. Returns the number of ticks run, skipped triggers included.
    pub async fn run_auto(&self, max_ticks: Option<u64>) -> u64 {
        self.set_auto(true);
        let mut ticks = 0;
        while self.is_auto() {
            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            self.tick().await;
            ticks += 1;

            // A skipped tick never awaits, so always give the runtime a turn
            let delay = self.config.auto_tick_delay();
            if !delay.is_zero() && max_ticks.map_or(true, |max| ticks < max) {
                tokio::time::sleep(delay).await;
            } else {
                tokio::task::yield_now().await;
            }
        }
        self.set_auto(false);
        ticks
    }
}
