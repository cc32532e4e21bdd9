//! Knowledge base built from the architect's learning notes
//!
//! Deduplication is a heuristic, not a strict invariant: a note is dropped
//! when its derived title matches an existing title, or when one description
//! contains the other (both compared case-insensitively). Paraphrased
//! duplicates still get through.

use crate::core::types::{Iteration, KnowledgeId};
use crate::world::objects::ObjectCategory;
use ahash::AHashSet;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest derived title, in characters
const MAX_TITLE_CHARS: usize = 60;

/// A grounding link attached to a learning note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeEntry {
    pub id: KnowledgeId,
    pub title: String,
    pub description: String,
    pub category: ObjectCategory,
    pub iteration: Iteration,
    pub created_at: DateTime<Utc>,
    pub citations: Vec<Citation>,
    /// Set for notes backed by citations
    pub highlighted: bool,
}

/// First non-empty clause of a note
///
/// A `.` only ends a clause when followed by whitespace or the end of the
/// text, so decimals like `2.5` stay intact.
fn first_clause(note: &str) -> &str {
    fn clean(s: &str) -> &str {
        s.trim_matches(|c: char| c.is_whitespace() || c == '.')
    }
    let mut start = 0;
    let mut chars = note.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let ends = match c {
            ':' | '!' | '?' | '\n' => true,
            '.' => chars.peek().map_or(true, |&(_, next)| next.is_whitespace()),
            _ => false,
        };
        if ends {
            let clause = clean(&note[start..i]);
            if !clause.is_empty() {
                return clause;
            }
            start = i + c.len_utf8();
        }
    }
    clean(&note[start..])
}

/// Title for a learning note: its first clause, trimmed and capped
pub fn derive_title(note: &str) -> String {
    let first = first_clause(note);

    if first.chars().count() <= MAX_TITLE_CHARS {
        first.to_string()
    } else {
        let cut: String = first.chars().take(MAX_TITLE_CHARS).collect();
        format!("{}...", cut.trim_end())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    #[serde(skip)]
    titles: AHashSet<String>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would this note be suppressed as a duplicate?
    pub fn is_duplicate(&self, note: &str) -> bool {
        let title = derive_title(note).to_lowercase();
        if self.titles.contains(&title) {
            return true;
        }
        let description = note.trim().to_lowercase();
        self.entries.iter().any(|e| {
            let existing = e.description.to_lowercase();
            existing.contains(&description) || description.contains(&existing)
        })
    }

    /// Insert a learning note unless it is empty or a duplicate
    ///
    /// Returns the new entry's id when inserted.
    pub fn insert(
        &mut self,
        note: &str,
        category: ObjectCategory,
        iteration: Iteration,
        citations: Vec<Citation>,
        created_at: DateTime<Utc>,
    ) -> Option<KnowledgeId> {
        let title = derive_title(note);
        if title.is_empty() || self.is_duplicate(note) {
            return None;
        }

        let entry = KnowledgeEntry {
            id: KnowledgeId::new(),
            title: title.clone(),
            description: note.trim().to_string(),
            category,
            iteration,
            created_at,
            highlighted: !citations.is_empty(),
            citations,
        };
        let id = entry.id;
        self.titles.insert(title.to_lowercase());
        self.entries.push(entry);
        Some(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }

    /// The `n` most recent entries, oldest first
    pub fn recent(&self, n: usize) -> &[KnowledgeEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.titles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(kb: &mut KnowledgeBase, note: &str) -> Option<KnowledgeId> {
        kb.insert(note, ObjectCategory::Energy, 1, vec![], Utc::now())
    }

    #[test]
    fn test_derive_title_first_clause() {
        assert_eq!(
            derive_title("Solar output peaks on ridges. Place panels high."),
            "Solar output peaks on ridges"
        );
        assert_eq!(derive_title("Drainage: keep collectors low"), "Drainage");
        assert_eq!(derive_title("  ...  Leading dots"), "Leading dots");
        assert_eq!(derive_title(""), "");
    }

    #[test]
    fn test_derive_title_keeps_decimals() {
        assert_eq!(
            derive_title("Solar output 2.5x higher on ridges. Build up there."),
            "Solar output 2.5x higher on ridges"
        );
        assert_eq!(derive_title("Walls need v1.2 footings."), "Walls need v1.2 footings");
    }

    #[test]
    fn test_decimal_notes_not_collapsed() {
        let mut kb = KnowledgeBase::new();
        assert!(insert(&mut kb, "Solar output 2.5x higher on ridges").is_some());
        assert!(insert(&mut kb, "Solar output 2x lower in valleys").is_some());
        assert_eq!(kb.len(), 2);
    }

    #[test]
    fn test_derive_title_truncates() {
        let long = "a".repeat(100);
        let title = derive_title(&long);
        assert_eq!(title, format!("{}...", "a".repeat(60)));
    }

    #[test]
    fn test_same_title_deduplicated() {
        let mut kb = KnowledgeBase::new();
        assert!(insert(&mut kb, "Ridges catch light. Panels go high.").is_some());
        assert!(insert(&mut kb, "RIDGES CATCH LIGHT. Something else entirely.").is_none());
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_substring_deduplicated() {
        let mut kb = KnowledgeBase::new();
        insert(&mut kb, "Walls on slopes need deeper footings");
        assert!(insert(&mut kb, "deeper footings").is_none());
        assert_eq!(kb.len(), 1);
    }

    #[test]
    fn test_distinct_notes_kept() {
        let mut kb = KnowledgeBase::new();
        insert(&mut kb, "Water pools in valleys");
        insert(&mut kb, "Crops need sunlight");
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.recent(1)[0].title, "Crops need sunlight");
    }

    #[test]
    fn test_empty_note_ignored() {
        let mut kb = KnowledgeBase::new();
        assert!(insert(&mut kb, "   ").is_none());
        assert!(kb.is_empty());
    }

    #[test]
    fn test_citations_highlight() {
        let mut kb = KnowledgeBase::new();
        kb.insert(
            "Regolith insulates well",
            ObjectCategory::Habitat,
            3,
            vec![Citation {
                title: "Lunar habitats".into(),
                uri: "https://example.org/regolith".into(),
            }],
            Utc::now(),
        );
        let entry = kb.iter().next().unwrap();
        assert!(entry.highlighted);
        assert_eq!(entry.iteration, 3);
    }

    #[test]
    fn test_clear_allows_reinsert() {
        let mut kb = KnowledgeBase::new();
        insert(&mut kb, "Water pools in valleys");
        kb.clear();
        assert!(insert(&mut kb, "Water pools in valleys").is_some());
    }
}
