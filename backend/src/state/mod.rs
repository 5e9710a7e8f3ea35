// State management module
// Shared application state handed to every handler

pub mod app_state;

pub use app_state::AppState;
