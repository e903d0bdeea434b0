//! Logging utilities
//!
//! This module provides standardized logging functions for pipeline stages.

/// Log a stage start with consistent format
///
/// # Arguments
/// * `stage` - Description of the stage
/// * `items` - Number of items entering the stage
pub fn log_stage_start(stage: &str, items: usize) {
    log::info!("{stage}: {items} input rows");
}

/// Log a stage completion with consistent format
///
/// # Arguments
/// * `stage` - Description of the stage
/// * `items` - Number of items produced
/// * `elapsed` - Optional elapsed time
pub fn log_stage_complete(stage: &str, items: usize, elapsed: Option<std::time::Duration>) {
    if let Some(duration) = elapsed {
        log::info!("Finished {stage}: {items} rows in {duration:?}");
    } else {
        log::info!("Finished {stage}: {items} rows");
    }
}

/// Log a stage warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `context` - Optional name of the column, marker or label involved
pub fn log_warning(message: &str, context: Option<&str>) {
    if let Some(context) = context {
        log::warn!("{message}: {context}");
    } else {
        log::warn!("{message}");
    }
}
