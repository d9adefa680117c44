//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON files in a data directory for the Store port
//! - Process memory for the Store port (tests, embedding)
//! - Demo data for onboarding

pub mod demo;
pub mod json_file;
pub mod memory;
