//! Text HUD for the terminal front end

pub mod panels;

pub use panels::{knowledge_panel, log_panel, plan_panel, stats_panel};
