//! # Activity Shared
//! 
//! Shared configuration, telemetry, and identifier helpers for the activity workspace.

pub mod constants;
pub mod types;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
