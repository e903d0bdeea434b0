//! Logging utilities for stage reporting and progress tracking
//!
//! This module provides utilities for logging pipeline stages and showing
//! progress during per-record extraction.

pub mod log;
pub mod progress;

// Re-export commonly used functions for convenience
pub use log::{log_stage_complete, log_stage_start, log_warning};
pub use progress::{create_main_progress_bar, finish_progress_bar};
