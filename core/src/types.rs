//! Shared primitive types used across the generator and aggregator.

/// A subscriber phone number: 11 digits starting with "79".
pub type Msisdn = String;

/// Seconds since the Unix epoch, UTC.
pub type EpochSeconds = i64;

/// Calendar month number, 1-based.
pub type Month = u32;

/// Calendar year of the simulated billing period.
pub type Year = i32;

pub const MONTHS_IN_YEAR: Month = 12;
