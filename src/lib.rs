//! Arc Architect - an LLM-driven architect that grows a settlement on procedural terrain

pub mod core;
pub mod llm;
pub mod simulation;
pub mod ui;
pub mod world;
