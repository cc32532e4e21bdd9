//! Parse LLM answers into architect decisions
//!
//! The LLM is asked for a single JSON object. This module owns that schema,
//! the system prompt describing it, and the extraction of the JSON object
//! from chatty responses.

use crate::core::error::{ArchError, Result};
use crate::llm::client::CompletionClient;
use crate::llm::context::ArchitectContext;
use crate::world::knowledge::Citation;
use crate::world::plan::StepStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three decisions the architect can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    #[serde(alias = "place")]
    Place,
    #[serde(alias = "move")]
    Move,
    #[serde(alias = "wait")]
    Wait,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Place => "PLACE",
            ActionKind::Move => "MOVE",
            ActionKind::Wait => "WAIT",
        };
        f.write_str(name)
    }
}

/// Raw decision JSON as returned by the LLM
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionResponse {
    pub action: ActionKind,
    /// Object type name, parsed leniently later
    #[serde(default, alias = "object_type", alias = "type")]
    pub object_type: Option<String>,
    /// Target position [x, y, z]; y is replaced by terrain height
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default, alias = "learning_note")]
    pub learning_note: Option<String>,
    #[serde(default, alias = "task_label")]
    pub task_label: Option<String>,
    #[serde(default, alias = "reasoning_steps")]
    pub reasoning_steps: Option<Vec<String>>,
    #[serde(default)]
    pub citations: Option<Vec<Citation>>,
    #[serde(default)]
    pub plan: Option<PlanResponse>,
}

/// Plan proposed by the LLM
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "current_step_index", alias = "currentStep")]
    pub current_step_index: Option<usize>,
    #[serde(default)]
    pub steps: Vec<PlanStepResponse>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanStepResponse {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", alias = "objectType", alias = "object_type")]
    pub object_type: String,
    #[serde(default)]
    pub position: Option<[f32; 3]>,
    /// Ignored on install: statuses are rebuilt from the cursor
    #[serde(default)]
    pub status: Option<StepStatus>,
}

/// Ask the LLM for the next decision
///
/// # Arguments
/// * `client` - Transport used for the completion
/// * `context` - Snapshot of the world rendered into the prompt
///
/// # Returns
/// The parsed response, or an error for transport and schema failures
pub async fn request_decision<C: CompletionClient + ?Sized>(
    client: &C,
    context: &ArchitectContext,
) -> Result<DecisionResponse> {
    let user_prompt = format!(
        "WORLD STATE:\n{}\nDecide the next action. Respond with JSON only:",
        context.summary()
    );
    tracing::debug!(prompt_chars = user_prompt.len(), "requesting architect decision");

    let response = client.complete(DECISION_SYSTEM_PROMPT, &user_prompt).await?;
    parse_response(&response)
}

/// Parse an LLM answer into a decision response
pub fn parse_response(response: &str) -> Result<DecisionResponse> {
    let json_str = extract_json(response)?;
    serde_json::from_str(json_str).map_err(|e| {
        ArchError::ParseError(format!("{} - Response: {}", e, response))
    })
}

/// Extract JSON object from LLM response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str> {
    let start = response
        .find('{')
        .ok_or_else(|| ArchError::ParseError("No JSON found in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| ArchError::ParseError("No closing brace found in response".into()))?;
    if end < start {
        return Err(ArchError::ParseError("Closing brace before opening brace".into()));
    }
    Ok(&response[start..=end])
}

/// System prompt for architect decisions
pub const DECISION_SYSTEM_PROMPT: &str = r#"You are the architect of an autonomous settlement on procedurally generated terrain.
Each turn you choose ONE action that moves the settlement towards its current goal.

AVAILABLE ACTIONS:
- PLACE: Build one object. Give "objectType" and "position" [x, y, z].
  The y coordinate is ignored: objects are snapped onto the terrain.
  If you follow an active construction plan you may omit both; the current plan step is used.
- MOVE: Walk the architect to "position" [x, y, z] to survey new ground.
- WAIT: Do nothing this turn.

OBJECT TYPES:
modular_unit, solar_panel, water_collector, wall, data_spire,
life_support_hub, roof, door, crop, tree

GUIDELINES:
- Prefer gentle terrain (elevation close to 0) for habitats.
- Solar panels work best on high ground, water collectors in low ground.
- Keep new structures 2-6 units from existing ones; avoid stacking objects.
- Record one short, reusable insight in "learningNote" (first sentence becomes its title).
- You may propose a multi-step "plan"; it replaces any active plan.

OUTPUT FORMAT (JSON only, no explanation):
{
  "action": "PLACE|MOVE|WAIT",
  "objectType": "modular_unit" or null,
  "position": [x, y, z] or null,
  "reason": "why this action",
  "learningNote": "insight gained" or null,
  "taskLabel": "short label for the HUD" or null,
  "reasoningSteps": ["step 1", "step 2"] or null,
  "citations": [{"title": "source", "uri": "https://..."}] or null,
  "plan": {
    "id": "plan identifier",
    "currentStepIndex": 0,
    "steps": [{"label": "Foundation", "type": "modular_unit", "position": [x, y, z]}]
  } or null
}

Example:
{"action": "PLACE", "objectType": "solar_panel", "position": [4, 0, -2], "reason": "Ridge east of the hub gets full sun", "learningNote": "Ridges maximise solar exposure. Place panels on local peaks.", "taskLabel": "Power grid", "reasoningSteps": ["Hub has no power", "Ridge at x=4 is the nearest peak"], "citations": null, "plan": null}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_simple() {
        let response = r#"{"action": "WAIT", "reason": "idle"}"#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, response);
    }

    #[test]
    fn test_extract_json_with_surrounding_text() {
        let response = r#"Here is my decision:
{"action": "PLACE", "objectType": "wall", "position": [1, 0, 2], "reason": "perimeter"}
Hope that helps."#;
        let json = extract_json(response).unwrap();
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("PLACE"));
    }

    #[test]
    fn test_extract_json_no_json() {
        assert!(extract_json("I would rather not build today").is_err());
        assert!(extract_json("} backwards {").is_err());
    }

    #[test]
    fn test_action_kind_serialization() {
        assert_eq!(serde_json::to_string(&ActionKind::Place).unwrap(), "\"PLACE\"");
        let action: ActionKind = serde_json::from_str("\"move\"").unwrap();
        assert_eq!(action, ActionKind::Move);
    }

    #[test]
    fn test_full_response_deserialization() {
        let json = r#"```json
{
  "action": "PLACE",
  "objectType": "modular_unit",
  "position": [2, 0, 3],
  "reason": "Flat ground near spawn",
  "learningNote": "Flat ground speeds assembly. Start near the origin.",
  "taskLabel": "Core habitat",
  "reasoningSteps": ["No shelter yet", "Origin is flat"],
  "citations": [{"title": "Habitat design", "uri": "https://example.org/hab"}],
  "plan": {
    "id": "core",
    "currentStepIndex": 0,
    "steps": [
      {"label": "Habitat", "type": "modular_unit", "position": [2, 0, 3], "status": "active"},
      {"label": "Power", "type": "solar_panel"}
    ]
  }
}
```"#;
        let response = parse_response(json).unwrap();
        assert_eq!(response.action, ActionKind::Place);
        assert_eq!(response.object_type.as_deref(), Some("modular_unit"));
        assert_eq!(response.position, Some([2.0, 0.0, 3.0]));
        assert_eq!(response.reasoning_steps.unwrap().len(), 2);
        assert_eq!(response.citations.unwrap()[0].title, "Habitat design");

        let plan = response.plan.unwrap();
        assert_eq!(plan.id.as_deref(), Some("core"));
        assert_eq!(plan.current_step_index, Some(0));
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[1].object_type, "solar_panel");
        assert!(plan.steps[1].position.is_none());
    }

    #[test]
    fn test_snake_case_aliases_and_nulls() {
        let json = r#"{"action": "WAIT", "object_type": null, "position": null,
            "reason": null, "learning_note": "Patience", "reasoning_steps": null}"#;
        let response = parse_response(json).unwrap();
        assert_eq!(response.action, ActionKind::Wait);
        assert!(response.reason.is_none());
        assert_eq!(response.learning_note.as_deref(), Some("Patience"));
        assert!(response.reasoning_steps.is_none());
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = parse_response(r#"{"action": "DEMOLISH"}"#);
        assert!(matches!(result, Err(ArchError::ParseError(_))));
    }
}
