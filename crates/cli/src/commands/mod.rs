//! Command handlers for the DocBrain CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod ingest;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;
