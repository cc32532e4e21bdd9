pub mod config;
pub mod error;
pub mod types;

pub use config::{ArchitectConfig, LlmConfig};
pub use error::{ArchError, Result};
