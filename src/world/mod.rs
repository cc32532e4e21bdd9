//! World data: terrain, placed objects, plans, knowledge and logs

pub mod knowledge;
pub mod log;
pub mod objects;
pub mod plan;
pub mod progression;
pub mod terrain;

pub use knowledge::{Citation, KnowledgeBase, KnowledgeEntry};
pub use log::{ActivityLog, LogCategory, LogEntry};
pub use objects::{ObjectCategory, ObjectType, WorldObject, WorldObjects};
pub use plan::{ConstructionPlan, PlanProgress, PlanStep, StepStatus};
pub use progression::{ProgressionStats, SettlementTier};
pub use terrain::{elevation, snap_to_terrain, TerrainSample};
