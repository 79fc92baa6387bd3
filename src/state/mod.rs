//! State module for tracking run progress
//!
//! A harvest run moves through a fixed sequence of phases; `RunState` names
//! them and validates every transition the coordinator makes.

mod run_state;

// Re-export main types
pub use run_state::RunState;
