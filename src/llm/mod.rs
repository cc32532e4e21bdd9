//! LLM decision pipeline: context -> prompt -> completion -> decision

pub mod client;
pub mod context;
pub mod decision;
pub mod parser;

pub use client::{CompletionClient, LlmClient};
pub use context::ArchitectContext;
pub use decision::{Action, Decision, DecisionMaker, DecisionService, FALLBACK_REASON};
pub use parser::ActionKind;
