//! Simulation state container and its reducers
//!
//! Every mutation is a reducer that consumes the current state and returns
//! the next one. The tick loop and the presentation layer only ever see
//! whole states, which keeps tick logic testable without a renderer.

use crate::core::error::{ArchError, Result};
use crate::core::types::{is_finite, Iteration};
use crate::llm::decision::{Action, Decision};
use crate::llm::parser::ActionKind;
use crate::world::knowledge::KnowledgeBase;
use crate::world::log::{ActivityLog, LogCategory};
use crate::world::objects::{ObjectType, WorldObject, WorldObjects};
use crate::world::plan::{ConstructionPlan, PlanProgress};
use crate::world::progression::{ProgressionStats, SettlementTier};
use crate::world::terrain::snap_to_terrain;
use chrono::{DateTime, Utc};
use glam::Vec3;
use serde::Serialize;
use std::fmt;

/// What the architect is doing right now, for the HUD status label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum AgentStatus {
    #[default]
    Idle,
    Thinking,
    Building,
    Moving,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgentStatus::Idle => "Idle",
            AgentStatus::Thinking => "Thinking...",
            AgentStatus::Building => "Building",
            AgentStatus::Moving => "Moving",
        };
        f.write_str(label)
    }
}

/// The architect avatar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Agent {
    pub position: Vec3,
    pub status: AgentStatus,
    /// Progress indicator for the tick in flight (0.0 - 1.0)
    pub progress: f32,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            position: snap_to_terrain(Vec3::ZERO),
            status: AgentStatus::Idle,
            progress: 0.0,
        }
    }
}

/// Everything the architect knows and has built in this session
#[derive(Debug, Clone, Serialize)]
pub struct SimulationState {
    pub objects: WorldObjects,
    pub plan: Option<ConstructionPlan>,
    pub knowledge: KnowledgeBase,
    pub logs: ActivityLog,
    pub stats: ProgressionStats,
    pub agent: Agent,
    pub goal: String,
    /// Label of the task the architect last worked on
    pub current_task: Option<String>,
    /// Number of decisions applied so far
    pub iteration: Iteration,
}

impl Default for SimulationState {
    fn default() -> Self {
        let stats = ProgressionStats::default();
        Self {
            objects: WorldObjects::new(),
            plan: None,
            knowledge: KnowledgeBase::new(),
            logs: ActivityLog::new(),
            goal: stats.tier.goal().to_string(),
            stats,
            agent: Agent::default(),
            current_task: None,
            iteration: 0,
        }
    }
}

impl SimulationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> SettlementTier {
        self.stats.tier
    }

    /// Fold a decision into the state
    ///
    /// Fails with `InvalidAction` on non-finite coordinates; the caller keeps
    /// its previous state in that case.
    pub fn apply_decision(mut self, decision: &Decision, now: DateTime<Utc>) -> Result<Self> {
        validate(decision)?;

        match &decision.action {
            Action::Place {
                object_type,
                position,
            } => self.apply_place(decision, *object_type, *position, now),
            Action::Move { target } => {
                let target = snap_to_terrain(*target);
                self.agent.position = target;
                self.logs.push(
                    LogCategory::Action,
                    Some(ActionKind::Move),
                    format!(
                        "Moved to [{:.1}, {:.2}, {:.1}]: {}",
                        target.x, target.y, target.z, decision.reason
                    ),
                    now,
                );
            }
            Action::Wait => {
                self.logs.push(
                    LogCategory::Action,
                    Some(ActionKind::Wait),
                    format!("Waiting: {}", decision.reason),
                    now,
                );
            }
        }

        if decision.task_label.is_some() {
            self.current_task = decision.task_label.clone();
        }
        self.iteration += 1;
        Ok(self)
    }

    fn apply_place(
        &mut self,
        decision: &Decision,
        object_type: Option<ObjectType>,
        position: Option<Vec3>,
        now: DateTime<Utc>,
    ) {
        if let Some(plan) = &decision.plan {
            self.plan = Some(plan.clone());
            self.logs.push(
                LogCategory::Thinking,
                None,
                format!("New construction plan with {} steps", plan.step_count()),
                now,
            );
        }

        let step = self.plan.as_ref().map(|p| p.current().clone());
        let Some(object_type) = object_type.or(step.as_ref().map(|s| s.object_type)) else {
            self.logs.push(
                LogCategory::Error,
                Some(ActionKind::Place),
                format!("Placement skipped, no object type: {}", decision.reason),
                now,
            );
            return;
        };

        let raw = position
            .or(step.and_then(|s| s.position))
            .unwrap_or(self.agent.position);
        let position = snap_to_terrain(raw);
        self.objects.push(WorldObject::new(object_type, position, now));
        self.logs.push(
            LogCategory::Success,
            Some(ActionKind::Place),
            format!(
                "Placed {} at [{:.1}, {:.2}, {:.1}]: {}",
                object_type, position.x, position.y, position.z, decision.reason
            ),
            now,
        );

        if let Some(plan) = self.plan.as_mut() {
            if plan.advance() == PlanProgress::Finished {
                self.plan = None;
                self.logs
                    .push(LogCategory::Success, None, "Construction plan complete", now);
            }
        }

        let previous_tier = self.stats.tier;
        self.stats = ProgressionStats::from_count(self.objects.len() as u64);
        if self.stats.tier != previous_tier {
            self.goal = self.stats.tier.goal().to_string();
            self.logs.push(
                LogCategory::Success,
                None,
                format!("Settlement is now a {}. New goal: {}", self.stats.tier, self.goal),
                now,
            );
        }

        if let Some(note) = &decision.learning_note {
            let inserted = self.knowledge.insert(
                note,
                object_type.category(),
                self.iteration,
                decision.citations.clone(),
                now,
            );
            if inserted.is_some() {
                self.logs.push(
                    LogCategory::Thinking,
                    None,
                    format!("Learned: {}", note.trim()),
                    now,
                );
            }
        }
    }

    /// Append a reasoning step to the log
    pub fn with_thought(mut self, thought: &str, now: DateTime<Utc>) -> Self {
        self.logs.push(LogCategory::Thinking, None, thought, now);
        self
    }

    /// Record an orchestration failure without touching anything else
    pub fn with_error(mut self, message: &str, now: DateTime<Utc>) -> Self {
        self.logs.push(LogCategory::Error, None, message, now);
        self
    }

    /// Update the HUD status label and progress indicator
    pub fn with_status(mut self, status: AgentStatus, progress: f32) -> Self {
        self.agent.status = status;
        self.agent.progress = progress.clamp(0.0, 1.0);
        self
    }

    /// Replace the current goal
    pub fn with_goal(mut self, goal: impl Into<String>, now: DateTime<Utc>) -> Self {
        self.goal = goal.into();
        self.logs.push(
            LogCategory::System,
            None,
            format!("Goal set: {}", self.goal),
            now,
        );
        self
    }

    /// Forget knowledge and logs. Placed objects, stats and the plan stay.
    pub fn purge(mut self) -> Self {
        self.knowledge.clear();
        self.logs.clear();
        self
    }
}

fn validate(decision: &Decision) -> Result<()> {
    let position = match &decision.action {
        Action::Place { position, .. } => *position,
        Action::Move { target } => Some(*target),
        Action::Wait => None,
    };
    if let Some(p) = position {
        if !is_finite(p) {
            return Err(ArchError::InvalidAction(format!(
                "non-finite {} position {:?}",
                decision.kind(),
                p
            )));
        }
    }

    if let Some(plan) = &decision.plan {
        if plan.steps().iter().filter_map(|s| s.position).any(|p| !is_finite(p)) {
            return Err(ArchError::InvalidAction("non-finite plan step position".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::plan::{PlanStep, StepStatus};
    use crate::world::terrain::elevation;

    fn place(object_type: ObjectType, x: f32, z: f32) -> Decision {
        Decision::place(object_type, Vec3::new(x, 0.0, z), "test")
    }

    fn two_step_plan() -> ConstructionPlan {
        ConstructionPlan::new(
            Some("core".into()),
            None,
            vec![
                PlanStep::new("Habitat", ObjectType::ModularUnit, Some(Vec3::new(6.0, 0.0, 1.0))),
                PlanStep::new("Power", ObjectType::SolarPanel, Some(Vec3::new(8.0, 0.0, 1.0))),
            ],
            0,
        )
        .unwrap()
    }

    #[test]
    fn test_place_snaps_to_terrain() {
        let state = SimulationState::new()
            .apply_decision(&place(ObjectType::ModularUnit, 2.0, 3.0), Utc::now())
            .unwrap();

        let object = state.objects.iter().next().unwrap();
        assert_eq!(object.position, Vec3::new(2.0, elevation(2.0, 3.0), 3.0));
        assert_eq!(state.stats.total_blocks, 1);
        assert_eq!(state.tier(), SettlementTier::Outpost);
        assert_eq!(state.iteration, 1);
    }

    #[test]
    fn test_place_logs_success() {
        let state = SimulationState::new()
            .apply_decision(&place(ObjectType::Wall, 1.0, 1.0), Utc::now())
            .unwrap();
        let entry = state.logs.by_action(ActionKind::Place).next().unwrap();
        assert_eq!(entry.category, LogCategory::Success);
        assert!(entry.message.contains("wall"));
    }

    #[test]
    fn test_tier_change_updates_goal() {
        let mut state = SimulationState::new();
        for i in 0..4 {
            state = state
                .apply_decision(&place(ObjectType::Crop, i as f32, 0.0), Utc::now())
                .unwrap();
        }
        assert_eq!(state.tier(), SettlementTier::Colony);
        assert_eq!(state.goal, SettlementTier::Colony.goal());
        assert!(state.logs.iter().any(|e| e.message.contains("now a Colony")));
    }

    #[test]
    fn test_place_from_plan_step() {
        let decision = Decision {
            action: Action::Place {
                object_type: None,
                position: None,
            },
            ..Decision::wait("follow plan")
        }
        .with_plan(two_step_plan());

        let state = SimulationState::new()
            .apply_decision(&decision, Utc::now())
            .unwrap();

        let object = state.objects.iter().next().unwrap();
        assert_eq!(object.object_type, ObjectType::ModularUnit);
        assert_eq!(object.position.x, 6.0);

        let plan = state.plan.as_ref().unwrap();
        assert_eq!(plan.current_index(), 1);
        assert_eq!(plan.steps()[0].status, StepStatus::Completed);
        assert_eq!(plan.steps()[1].status, StepStatus::Active);
    }

    #[test]
    fn test_plan_cleared_after_last_step() {
        let follow = Decision {
            action: Action::Place {
                object_type: None,
                position: None,
            },
            ..Decision::wait("follow plan")
        };

        let state = SimulationState::new()
            .apply_decision(&follow.clone().with_plan(two_step_plan()), Utc::now())
            .unwrap()
            .apply_decision(&follow, Utc::now())
            .unwrap();

        assert!(state.plan.is_none());
        assert_eq!(state.objects.len(), 2);
        assert!(state.logs.iter().any(|e| e.message == "Construction plan complete"));
    }

    #[test]
    fn test_place_without_type_is_skipped() {
        let decision = Decision {
            action: Action::Place {
                object_type: None,
                position: Some(Vec3::ONE),
            },
            ..Decision::wait("unsure")
        };
        let state = SimulationState::new()
            .apply_decision(&decision, Utc::now())
            .unwrap();

        assert!(state.objects.is_empty());
        assert_eq!(state.logs.recent(1)[0].category, LogCategory::Error);
    }

    #[test]
    fn test_place_without_position_uses_agent() {
        let decision = Decision {
            action: Action::Place {
                object_type: Some(ObjectType::Tree),
                position: None,
            },
            ..Decision::wait("here")
        };
        let state = SimulationState::new()
            .apply_decision(&Decision::move_to(Vec3::new(5.0, 0.0, 5.0), "go"), Utc::now())
            .unwrap()
            .apply_decision(&decision, Utc::now())
            .unwrap();

        let tree = state.objects.iter().next().unwrap();
        assert_eq!(tree.position, state.agent.position);
    }

    #[test]
    fn test_move_snaps_agent() {
        let state = SimulationState::new()
            .apply_decision(&Decision::move_to(Vec3::new(-4.0, 50.0, 7.0), "survey"), Utc::now())
            .unwrap();

        assert_eq!(state.agent.position, Vec3::new(-4.0, elevation(-4.0, 7.0), 7.0));
        assert_eq!(state.logs.by_action(ActionKind::Move).count(), 1);
        assert!(state.objects.is_empty());
    }

    #[test]
    fn test_wait_logs_reason() {
        let state = SimulationState::new()
            .apply_decision(&Decision::wait("dust storm"), Utc::now())
            .unwrap();
        let entry = state.logs.by_action(ActionKind::Wait).next().unwrap();
        assert_eq!(entry.message, "Waiting: dust storm");
        assert_eq!(state.iteration, 1);
    }

    #[test]
    fn test_knowledge_deduplicated_across_placements() {
        let note = "Valleys collect water. Put collectors low.";
        let state = SimulationState::new()
            .apply_decision(
                &place(ObjectType::WaterCollector, 0.0, 0.0).with_learning_note(note),
                Utc::now(),
            )
            .unwrap()
            .apply_decision(
                &place(ObjectType::WaterCollector, 3.0, 0.0)
                    .with_learning_note("Valleys collect water. Different detail."),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(state.knowledge.len(), 1);
        let entry = state.knowledge.iter().next().unwrap();
        assert_eq!(entry.title, "Valleys collect water");
        assert_eq!(entry.iteration, 0);
    }

    #[test]
    fn test_non_finite_rejected() {
        let result = SimulationState::new().apply_decision(
            &Decision::move_to(Vec3::new(f32::NAN, 0.0, 0.0), "lost"),
            Utc::now(),
        );
        assert!(matches!(result, Err(ArchError::InvalidAction(_))));
    }

    #[test]
    fn test_purge_keeps_objects() {
        let state = SimulationState::new()
            .apply_decision(
                &place(ObjectType::Wall, 1.0, 1.0).with_learning_note("Walls shelter crops"),
                Utc::now(),
            )
            .unwrap()
            .purge();

        assert_eq!(state.objects.len(), 1);
        assert_eq!(state.stats.total_blocks, 1);
        assert!(state.knowledge.is_empty());
        assert!(state.logs.is_empty());
    }

    #[test]
    fn test_status_progress_clamped() {
        let state = SimulationState::new().with_status(AgentStatus::Thinking, 1.7);
        assert_eq!(state.agent.status, AgentStatus::Thinking);
        assert_eq!(state.agent.progress, 1.0);
    }
}
