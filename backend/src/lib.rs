//! Gemini Chat Backend Library
//!
//! This library exposes modules for testing and external use.
//! The main binary is in `src/main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
/// Session-local conversation turns
pub mod session;
/// Application state shared by handlers
pub mod state;
