pub mod cli;
pub mod config;
pub mod server;
pub mod state;
pub mod telemetry;

pub use cli::*;
pub use config::*;
pub use server::*;
pub use state::*;

/// Shown when the user submits a blank review
pub const EMPTY_INPUT_WARNING: &str = "Please enter text before predicting.";

/// Shown for any failure the user cannot act on
pub const GENERIC_FAILURE_MESSAGE: &str = "Prediction failed. Please try again.";
