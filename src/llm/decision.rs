//! Decision service - turns a world snapshot into one architect action
//!
//! `decide` never fails. Transport errors, bad HTTP statuses, missing JSON
//! and schema mismatches all collapse into the same WAIT decision carrying
//! `FALLBACK_REASON`. There are no retries and no distinction between
//! transient and permanent failures.

use crate::core::config::ArchitectConfig;
use crate::core::error::{ArchError, Result};
use crate::llm::client::CompletionClient;
use crate::llm::context::ArchitectContext;
use crate::llm::parser::{request_decision, ActionKind, DecisionResponse, PlanResponse};
use crate::simulation::state::SimulationState;
use crate::world::knowledge::Citation;
use crate::world::objects::ObjectType;
use crate::world::plan::{ConstructionPlan, PlanStep};
use async_trait::async_trait;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

/// Reason attached to the WAIT substituted for any failed decision
pub const FALLBACK_REASON: &str = "Lost contact with the planning core; holding position";

/// Reason used when the LLM gives none
const DEFAULT_REASON: &str = "No reason given";

/// What the architect does this tick
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Build an object. Missing fields come from the active plan step.
    Place {
        object_type: Option<ObjectType>,
        position: Option<Vec3>,
    },
    /// Walk to a target (vertical coordinate is snapped on apply)
    Move { target: Vec3 },
    Wait,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Place { .. } => ActionKind::Place,
            Action::Move { .. } => ActionKind::Move,
            Action::Wait => ActionKind::Wait,
        }
    }
}

/// A resolved decision with its narrative metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Action,
    pub reason: String,
    pub learning_note: Option<String>,
    pub task_label: Option<String>,
    pub reasoning_steps: Vec<String>,
    pub citations: Vec<Citation>,
    /// Replaces the active plan (honoured for PLACE only)
    pub plan: Option<ConstructionPlan>,
}

impl Decision {
    fn with_action(action: Action, reason: impl Into<String>) -> Self {
        Self {
            action,
            reason: reason.into(),
            learning_note: None,
            task_label: None,
            reasoning_steps: Vec::new(),
            citations: Vec::new(),
            plan: None,
        }
    }

    pub fn wait(reason: impl Into<String>) -> Self {
        Self::with_action(Action::Wait, reason)
    }

    /// The decision substituted when the LLM round-trip fails
    pub fn fallback() -> Self {
        Self::wait(FALLBACK_REASON)
    }

    pub fn place(object_type: ObjectType, position: Vec3, reason: impl Into<String>) -> Self {
        Self::with_action(
            Action::Place {
                object_type: Some(object_type),
                position: Some(position),
            },
            reason,
        )
    }

    pub fn move_to(target: Vec3, reason: impl Into<String>) -> Self {
        Self::with_action(Action::Move { target }, reason)
    }

    pub fn with_learning_note(mut self, note: impl Into<String>) -> Self {
        self.learning_note = Some(note.into());
        self
    }

    pub fn with_plan(mut self, plan: ConstructionPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn with_reasoning_steps(mut self, steps: Vec<String>) -> Self {
        self.reasoning_steps = steps;
        self
    }

    pub fn kind(&self) -> ActionKind {
        self.action.kind()
    }
}

/// Anything that can pick the architect's next action
#[async_trait]
pub trait DecisionMaker: Send + Sync {
    /// Choose an action for this snapshot. Must not fail.
    async fn decide(&self, state: &SimulationState) -> Decision;
}

/// LLM-backed decision maker
pub struct DecisionService<C> {
    client: C,
    config: ArchitectConfig,
    rng: Mutex<ChaCha8Rng>,
}

impl<C: CompletionClient> DecisionService<C> {
    pub fn new(client: C, config: ArchitectConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            client,
            config,
            rng: Mutex::new(rng),
        }
    }

    /// Turn a raw response into a decision, resolving MOVE jitter
    fn resolve(&self, response: DecisionResponse, agent_position: Vec3) -> Result<Decision> {
        let position = response.position.map(Vec3::from_array);

        let action = match response.action {
            ActionKind::Place => {
                let object_type = response
                    .object_type
                    .as_deref()
                    .map(|t| t.parse::<ObjectType>().map_err(ArchError::ParseError))
                    .transpose()?;
                Action::Place {
                    object_type,
                    position,
                }
            }
            ActionKind::Move => {
                let target = match position {
                    Some(target) => target,
                    None => {
                        let mut rng = self
                            .rng
                            .lock()
                            .map_err(|_| ArchError::InvalidAction("rng lock poisoned".into()))?;
                        jitter_target(agent_position, self.config.move_jitter, &mut *rng)
                    }
                };
                Action::Move { target }
            }
            ActionKind::Wait => Action::Wait,
        };

        let plan = response.plan.and_then(convert_plan);

        Ok(Decision {
            action,
            reason: response
                .reason
                .filter(|r| !r.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REASON.to_string()),
            learning_note: response.learning_note.filter(|n| !n.trim().is_empty()),
            task_label: response.task_label,
            reasoning_steps: response.reasoning_steps.unwrap_or_default(),
            citations: response.citations.unwrap_or_default(),
            plan,
        })
    }
}

#[async_trait]
impl<C: CompletionClient> DecisionMaker for DecisionService<C> {
    async fn decide(&self, state: &SimulationState) -> Decision {
        let context = ArchitectContext::from_state(state, &self.config);
        let result = request_decision(&self.client, &context)
            .await
            .and_then(|response| self.resolve(response, state.agent.position));

        match result {
            Ok(decision) => {
                tracing::debug!(action = %decision.kind(), reason = %decision.reason, "decision received");
                decision
            }
            Err(e) => {
                tracing::warn!(error = %e, "decision failed, falling back to WAIT");
                Decision::fallback()
            }
        }
    }
}

/// Random offset on x and z within `radius` of `origin`
pub fn jitter_target<R: Rng + ?Sized>(origin: Vec3, radius: f32, rng: &mut R) -> Vec3 {
    if radius <= 0.0 {
        return origin;
    }
    Vec3::new(
        origin.x + rng.gen_range(-radius..=radius),
        origin.y,
        origin.z + rng.gen_range(-radius..=radius),
    )
}

/// Convert an LLM plan, dropping steps with unknown object types
fn convert_plan(plan: PlanResponse) -> Option<ConstructionPlan> {
    let steps: Vec<PlanStep> = plan
        .steps
        .into_iter()
        .enumerate()
        .filter_map(|(i, step)| match step.object_type.parse::<ObjectType>() {
            Ok(object_type) => Some(PlanStep::new(
                step.label.unwrap_or_else(|| format!("Step {}", i + 1)),
                object_type,
                step.position.map(Vec3::from_array),
            )),
            Err(e) => {
                tracing::warn!(error = %e, "dropping plan step");
                None
            }
        })
        .collect();

    let converted = ConstructionPlan::new(
        plan.id,
        plan.source,
        steps,
        plan.current_step_index.unwrap_or(0),
    );
    if converted.is_none() {
        tracing::warn!("ignoring construction plan without usable steps");
    }
    converted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::parser::parse_response;

    struct Canned(std::result::Result<String, String>);

    #[async_trait]
    impl CompletionClient for Canned {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.0.clone().map_err(ArchError::LlmError)
        }
    }

    fn service(reply: std::result::Result<&str, &str>) -> DecisionService<Canned> {
        let reply = reply.map(String::from).map_err(String::from);
        DecisionService::new(Canned(reply), ArchitectConfig::default())
    }

    #[tokio::test]
    async fn test_place_decision() {
        let svc = service(Ok(
            r#"{"action": "PLACE", "objectType": "Solar Panel", "position": [4, 9, -2],
               "reason": "High ground", "learningNote": "Ridges get sun."}"#,
        ));
        let decision = svc.decide(&SimulationState::new()).await;

        assert_eq!(
            decision.action,
            Action::Place {
                object_type: Some(ObjectType::SolarPanel),
                position: Some(Vec3::new(4.0, 9.0, -2.0)),
            }
        );
        assert_eq!(decision.reason, "High ground");
        assert_eq!(decision.learning_note.as_deref(), Some("Ridges get sun."));
    }

    #[tokio::test]
    async fn test_transport_failure_falls_back() {
        let svc = service(Err("connection refused"));
        let decision = svc.decide(&SimulationState::new()).await;
        assert_eq!(decision, Decision::fallback());
    }

    #[tokio::test]
    async fn test_garbage_falls_back() {
        let svc = service(Ok("I think we should build a castle"));
        let decision = svc.decide(&SimulationState::new()).await;
        assert_eq!(decision.kind(), ActionKind::Wait);
        assert_eq!(decision.reason, FALLBACK_REASON);
    }

    #[tokio::test]
    async fn test_unknown_object_type_falls_back() {
        let svc = service(Ok(r#"{"action": "PLACE", "objectType": "castle"}"#));
        let decision = svc.decide(&SimulationState::new()).await;
        assert_eq!(decision, Decision::fallback());
    }

    #[tokio::test]
    async fn test_move_without_target_is_jittered() {
        let svc = service(Ok(r#"{"action": "MOVE", "reason": "Survey"}"#));
        let state = SimulationState::new();
        let decision = svc.decide(&state).await;

        match decision.action {
            Action::Move { target } => {
                let origin = state.agent.position;
                assert!((target.x - origin.x).abs() <= 2.0);
                assert!((target.z - origin.z).abs() <= 2.0);
            }
            other => panic!("expected MOVE, got {:?}", other),
        }
    }

    #[test]
    fn test_jitter_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let origin = Vec3::new(10.0, 0.0, -10.0);
        for _ in 0..200 {
            let t = jitter_target(origin, 1.5, &mut rng);
            assert!((t.x - origin.x).abs() <= 1.5);
            assert!((t.z - origin.z).abs() <= 1.5);
        }
        assert_eq!(jitter_target(origin, 0.0, &mut rng), origin);
    }

    #[test]
    fn test_plan_conversion_drops_unknown_steps() {
        let response = parse_response(
            r#"{"action": "PLACE", "plan": {"id": "p", "currentStepIndex": 1, "steps": [
                {"label": "Hab", "type": "modular_unit"},
                {"label": "Moat", "type": "moat"},
                {"type": "wall", "position": [1, 0, 1]}
            ]}}"#,
        )
        .unwrap();
        let plan = convert_plan(response.plan.unwrap()).unwrap();

        assert_eq!(plan.step_count(), 2);
        assert_eq!(plan.current().label, "Step 3");
        assert_eq!(plan.current().object_type, ObjectType::Wall);
    }

    #[test]
    fn test_empty_reason_defaulted() {
        let svc = service(Ok("{}"));
        let response = parse_response(r#"{"action": "WAIT", "reason": "  "}"#).unwrap();
        let decision = svc.resolve(response, Vec3::ZERO).unwrap();
        assert_eq!(decision.reason, DEFAULT_REASON);
    }
}
