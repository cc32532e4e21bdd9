//! Construction plans - ordered build steps proposed by the architect

use crate::world::objects::ObjectType;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Status of a single plan step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

/// One step of a construction plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanStep {
    pub label: String,
    pub object_type: ObjectType,
    pub position: Option<Vec3>,
    pub status: StepStatus,
}

impl PlanStep {
    pub fn new(label: impl Into<String>, object_type: ObjectType, position: Option<Vec3>) -> Self {
        Self {
            label: label.into(),
            object_type,
            position,
            status: StepStatus::Pending,
        }
    }
}

/// Result of advancing a plan past its current step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanProgress {
    /// Moved on to the step at this index
    Advanced(usize),
    /// The last step was just completed
    Finished,
}

/// Ordered build steps with a cursor
///
/// Invariant: steps before `current_step` are Completed, the step at the
/// cursor is Active, later steps are Pending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructionPlan {
    pub id: Option<String>,
    pub source: Option<String>,
    steps: Vec<PlanStep>,
    current_step: usize,
}

impl ConstructionPlan {
    /// Build a plan and normalize step statuses around the cursor
    ///
    /// Returns None for a plan without steps. An out-of-range cursor is
    /// clamped to the last step.
    pub fn new(
        id: Option<String>,
        source: Option<String>,
        steps: Vec<PlanStep>,
        current_step: usize,
    ) -> Option<Self> {
        if steps.is_empty() {
            return None;
        }
        let current_step = current_step.min(steps.len() - 1);
        let mut plan = Self {
            id,
            source,
            steps,
            current_step,
        };
        plan.normalize();
        Some(plan)
    }

    fn normalize(&mut self) {
        let cursor = self.current_step;
        for (i, step) in self.steps.iter_mut().enumerate() {
            step.status = match i.cmp(&cursor) {
                std::cmp::Ordering::Less => StepStatus::Completed,
                std::cmp::Ordering::Equal => StepStatus::Active,
                std::cmp::Ordering::Greater => StepStatus::Pending,
            };
        }
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn current_index(&self) -> usize {
        self.current_step
    }

    pub fn current(&self) -> &PlanStep {
        &self.steps[self.current_step]
    }

    /// Number of steps (never zero)
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Complete the current step and activate the next one
    pub fn advance(&mut self) -> PlanProgress {
        self.steps[self.current_step].status = StepStatus::Completed;
        if self.current_step + 1 >= self.steps.len() {
            return PlanProgress::Finished;
        }
        self.current_step += 1;
        self.steps[self.current_step].status = StepStatus::Active;
        PlanProgress::Advanced(self.current_step)
    }

    pub fn completed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count()
    }
}
