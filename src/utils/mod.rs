//! Shared utilities: timestamp parsing, decimal/text helpers and logging.

pub mod dates;
pub mod logging;
pub mod text;

pub use dates::{TimestampFormatConfig, days_between, parse_timestamp};
pub use text::{first_decimal, parse_decimal, title_case};
