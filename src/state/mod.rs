//! Shared state for the portal's handlers

mod app_state;

pub use app_state::AppState;
