//! Gather world context for LLM prompts
//!
//! This module turns a simulation snapshot into the natural-language state
//! description the architect LLM reasons over: goal, progression, what has
//! been built and where, what the architect has learned, the active plan,
//! and the shape of the terrain around the agent.

use crate::core::config::ArchitectConfig;
use crate::simulation::state::SimulationState;
use crate::world::objects::ObjectType;
use crate::world::plan::StepStatus;
use crate::world::progression::ProgressionStats;
use crate::world::terrain::TerrainSample;
use glam::Vec3;

/// Planar distance under which the agent's spot counts as crowded
const CROWDED_RADIUS: f32 = 1.5;

/// World context for LLM prompts
pub struct ArchitectContext {
    pub goal: String,
    pub iteration: u64,
    pub stats: ProgressionStats,
    pub agent_position: Vec3,
    /// Most recent placements, oldest first
    pub recent_objects: Vec<(ObjectType, Vec3)>,
    pub object_counts: Vec<(ObjectType, usize)>,
    /// Closest structure to the agent and its planar distance
    pub nearest_structure: Option<(ObjectType, f32)>,
    pub knowledge_titles: Vec<String>,
    pub plan: Option<PlanSummary>,
    pub terrain: Vec<TerrainSample>,
}

/// Condensed view of the active construction plan
pub struct PlanSummary {
    pub id: Option<String>,
    pub current_step: usize,
    pub steps: Vec<(String, ObjectType, StepStatus)>,
}

impl ArchitectContext {
    /// Build a context from a state snapshot
    pub fn from_state(state: &SimulationState, config: &ArchitectConfig) -> Self {
        let agent_position = state.agent.position;

        let recent_objects = state
            .objects
            .recent(config.prompt_object_limit)
            .iter()
            .map(|o| (o.object_type, o.position))
            .collect();

        let nearest_structure = state
            .objects
            .nearest(agent_position)
            .map(|(o, distance)| (o.object_type, distance));

        let knowledge_titles = state
            .knowledge
            .recent(config.prompt_knowledge_limit)
            .iter()
            .map(|e| e.title.clone())
            .collect();

        let plan = state.plan.as_ref().map(|p| PlanSummary {
            id: p.id.clone(),
            current_step: p.current_index(),
            steps: p
                .steps()
                .iter()
                .map(|s| (s.label.clone(), s.object_type, s.status))
                .collect(),
        });

        Self {
            goal: state.goal.clone(),
            iteration: state.iteration,
            stats: state.stats,
            agent_position,
            recent_objects,
            object_counts: state.objects.counts_by_type(),
            nearest_structure,
            knowledge_titles,
            plan,
            terrain: TerrainSample::around(
                agent_position,
                config.terrain_sample_radius,
                config.terrain_sample_step,
            ),
        }
    }

    /// Generate a text summary of the context for LLM prompts
    pub fn summary(&self) -> String {
        let mut s = String::new();

        s.push_str(&format!("Goal: {}\n", self.goal));
        s.push_str(&format!("Iteration: {}\n", self.iteration));
        s.push_str(&format!(
            "Tier: {} (objects: {}, complexity: {})\n",
            self.stats.tier, self.stats.total_blocks, self.stats.complexity_level
        ));
        s.push_str(&format!(
            "Architect position: [{:.1}, {:.2}, {:.1}]\n",
            self.agent_position.x, self.agent_position.y, self.agent_position.z
        ));

        if self.object_counts.is_empty() {
            s.push_str("\nNothing has been built yet.\n");
        } else {
            let counts: Vec<String> = self
                .object_counts
                .iter()
                .map(|(t, n)| format!("{} x{}", t, n))
                .collect();
            s.push_str(&format!("\nBuilt: {}\n", counts.join(", ")));

            s.push_str("Recent placements:\n");
            for (object_type, p) in &self.recent_objects {
                s.push_str(&format!(
                    "- {} at [{:.1}, {:.2}, {:.1}]\n",
                    object_type, p.x, p.y, p.z
                ));
            }
        }

        if let Some((object_type, distance)) = self.nearest_structure {
            s.push_str(&format!(
                "Nearest structure: {} ({:.1} units away)\n",
                object_type, distance
            ));
            if self.is_crowded(CROWDED_RADIUS) {
                s.push_str("The architect is standing on a crowded spot; consider a MOVE.\n");
            }
        }

        if !self.knowledge_titles.is_empty() {
            s.push_str("\nKnown lessons:\n");
            for title in &self.knowledge_titles {
                s.push_str(&format!("- {}\n", title));
            }
        }

        if let Some(plan) = &self.plan {
            s.push_str(&format!(
                "\nActive plan{} (step {} of {}):\n",
                plan.id
                    .as_deref()
                    .map(|id| format!(" '{}'", id))
                    .unwrap_or_default(),
                plan.current_step + 1,
                plan.steps.len()
            ));
            for (label, object_type, status) in &plan.steps {
                let marker = match status {
                    StepStatus::Completed => "[x]",
                    StepStatus::Active => "[>]",
                    StepStatus::Pending => "[ ]",
                };
                s.push_str(&format!("{} {} ({})\n", marker, label, object_type));
            }
        }

        if !self.terrain.is_empty() {
            s.push_str("\nTerrain elevation around the architect (x, z: height):\n");
            let samples: Vec<String> = self
                .terrain
                .iter()
                .map(|t| format!("{:.0},{:.0}: {:.2}", t.x, t.z, t.elevation))
                .collect();
            for row in samples.chunks(5) {
                s.push_str(&row.join(" | "));
                s.push('\n');
            }
        }

        s
    }

    /// True when the agent stands within `radius` of an existing structure
    pub fn is_crowded(&self, radius: f32) -> bool {
        self.nearest_structure
            .map(|(_, distance)| distance < radius)
            .unwrap_or(false)
    }
}
