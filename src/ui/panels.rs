//! Text renditions of the HUD panels

use crate::simulation::state::SimulationState;
use crate::world::log::LogCategory;
use crate::world::plan::StepStatus;
use std::fmt::Write;

/// Width of the progress bar in the stats panel
const PROGRESS_WIDTH: usize = 20;

/// Tier, counts, goal and agent status
pub fn stats_panel(state: &SimulationState) -> String {
    let mut s = String::new();
    let stats = &state.stats;
    let _ = writeln!(
        s,
        "--- {} | Objects: {} | Complexity: {} | Iteration: {} ---",
        stats.tier, stats.total_blocks, stats.complexity_level, state.iteration
    );
    let _ = writeln!(s, "  Goal: {}", state.goal);
    if let Some(task) = &state.current_task {
        let _ = writeln!(s, "  Task: {}", task);
    }

    let p = state.agent.position;
    let _ = writeln!(
        s,
        "  Architect: {} at [{:.1}, {:.2}, {:.1}] {}",
        state.agent.status,
        p.x,
        p.y,
        p.z,
        progress_bar(state.agent.progress)
    );

    let counts = state.objects.counts_by_type();
    if !counts.is_empty() {
        let parts: Vec<String> = counts.iter().map(|(t, n)| format!("{} x{}", t, n)).collect();
        let _ = writeln!(s, "  Built: {}", parts.join(", "));
    }
    s
}

/// Knowledge base entries, newest last
pub fn knowledge_panel(state: &SimulationState) -> String {
    let mut s = String::from("=== Knowledge Base ===\n");
    if state.knowledge.is_empty() {
        s.push_str("  (nothing learned yet)\n");
        return s;
    }
    for entry in state.knowledge.iter() {
        let marker = if entry.highlighted { "*" } else { "-" };
        let _ = writeln!(
            s,
            "  {} [{}] {} (iteration {})",
            marker, entry.category, entry.title, entry.iteration
        );
        if entry.description != entry.title {
            let _ = writeln!(s, "      {}", entry.description);
        }
        for citation in &entry.citations {
            let _ = writeln!(s, "      source: {} <{}>", citation.title, citation.uri);
        }
    }
    s
}

/// Active construction plan with step markers
pub fn plan_panel(state: &SimulationState) -> String {
    let mut s = String::from("=== Construction Plan ===\n");
    let Some(plan) = &state.plan else {
        s.push_str("  (no active plan)\n");
        return s;
    };

    if let Some(id) = &plan.id {
        let _ = writeln!(s, "  Plan: {}", id);
    }
    if let Some(source) = &plan.source {
        let _ = writeln!(s, "  Source: {}", source);
    }
    let _ = writeln!(
        s,
        "  Progress: {}/{} steps",
        plan.completed_count(),
        plan.step_count()
    );
    for step in plan.steps() {
        let marker = match step.status {
            StepStatus::Completed => "[x]",
            StepStatus::Active => "[>]",
            StepStatus::Pending => "[ ]",
        };
        let _ = writeln!(s, "  {} {} ({})", marker, step.label, step.object_type);
    }
    s
}

/// The `limit` most recent log entries
pub fn log_panel(state: &SimulationState, limit: usize) -> String {
    let mut s = String::from("=== Activity Log ===\n");
    for entry in state.logs.recent(limit) {
        let tag = match entry.category {
            LogCategory::Action => "ACT",
            LogCategory::Success => " OK",
            LogCategory::Error => "ERR",
            LogCategory::Thinking => "...",
            LogCategory::System => "SYS",
        };
        let _ = writeln!(
            s,
            "  {} {} {}",
            entry.created_at.format("%H:%M:%S"),
            tag,
            entry.message
        );
    }
    s
}

fn progress_bar(progress: f32) -> String {
    let filled = (progress.clamp(0.0, 1.0) * PROGRESS_WIDTH as f32).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::decision::Decision;
    use crate::world::objects::ObjectType;
    use chrono::Utc;
    use glam::Vec3;

    fn built_state() -> SimulationState {
        SimulationState::new()
            .apply_decision(
                &Decision::place(ObjectType::SolarPanel, Vec3::new(4.0, 0.0, 0.0), "sun")
                    .with_learning_note("Ridges catch light. Panels go high."),
                Utc::now(),
            )
            .unwrap()
    }

    #[test]
    fn test_stats_panel() {
        let text = stats_panel(&built_state());
        assert!(text.contains("Outpost"));
        assert!(text.contains("Objects: 1"));
        assert!(text.contains("solar_panel x1"));
        assert!(text.contains("Idle"));
    }

    #[test]
    fn test_knowledge_panel() {
        let text = knowledge_panel(&built_state());
        assert!(text.contains("[energy] Ridges catch light"));
        assert!(knowledge_panel(&SimulationState::new()).contains("nothing learned"));
    }

    #[test]
    fn test_plan_panel_empty() {
        assert!(plan_panel(&SimulationState::new()).contains("no active plan"));
    }

    #[test]
    fn test_log_panel_limit() {
        let state = built_state();
        let text = log_panel(&state, 1);
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(0.5), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(progress_bar(3.0), format!("[{}]", "#".repeat(20)));
    }
}
