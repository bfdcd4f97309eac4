//! Validation of user-supplied report parameters.

use crate::{
    error::{CdrError, CdrResult},
    types::{Month, Msisdn, MONTHS_IN_YEAR},
};

/// Accepts exactly "79" followed by nine digits.
pub fn is_valid_msisdn(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate.starts_with("79")
        && candidate.bytes().all(|b| b.is_ascii_digit())
}

pub fn parse_msisdn(raw: &str) -> CdrResult<Msisdn> {
    if is_valid_msisdn(raw) {
        Ok(raw.to_string())
    } else {
        Err(CdrError::InvalidMsisdn(raw.to_string()))
    }
}

/// Parses a month number in 1..=12. Leading zeros are allowed ("01", "00001").
pub fn parse_month(raw: &str) -> CdrResult<Month> {
    match raw.parse::<Month>() {
        Ok(m) if (1..=MONTHS_IN_YEAR).contains(&m) => Ok(m),
        _ => Err(CdrError::InvalidMonth(raw.to_string())),
    }
}
