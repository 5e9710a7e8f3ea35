//! Session module
//!
//! Session-local conversation turns. Nothing here is persisted; the session
//! lives as long as the process.

pub mod controller;
pub mod models;

pub use controller::{PendingSubmission, Session, SessionController};
pub use models::{ConversationTurn, Submission, TurnRole};
