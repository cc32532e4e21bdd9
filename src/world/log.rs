//! Activity log shown in the HUD

use crate::core::types::LogId;
use crate::llm::parser::ActionKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogCategory {
    Action,
    Success,
    Error,
    Thinking,
    System,
}

/// An entry in the activity log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub id: LogId,
    pub category: LogCategory,
    /// Decision that produced this entry, if any
    pub action: Option<ActionKind>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only log for one session (purge clears it)
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityLog {
    entries: Vec<LogEntry>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        category: LogCategory,
        action: Option<ActionKind>,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) {
        self.entries.push(LogEntry {
            id: LogId::new(),
            category,
            action,
            message: message.into(),
            created_at,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// The `n` most recent entries, oldest first
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Entries produced by a given decision kind
    pub fn by_action(&self, action: ActionKind) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(move |e| e.action == Some(action))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
