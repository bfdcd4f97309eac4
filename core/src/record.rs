//! Call Detail Records and monthly batches.

use crate::{
    error::{CdrError, CdrResult},
    types::{EpochSeconds, Month, Msisdn},
};
use std::{fmt, str::FromStr};

/// Direction of a call relative to the subscriber it is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallDirection {
    Outgoing,
    Incoming,
}

impl CallDirection {
    pub const ALL: [CallDirection; 2] = [CallDirection::Outgoing, CallDirection::Incoming];

    /// Two-digit wire code used in CDR files and the cdr table.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Outgoing => "01",
            Self::Incoming => "02",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "01" => Some(Self::Outgoing),
            "02" => Some(Self::Incoming),
            _ => None,
        }
    }
}

/// One synthesized call. Immutable once accepted by the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub direction: CallDirection,
    pub msisdn:    Msisdn,
    pub start:     EpochSeconds,
    pub end:       EpochSeconds,
}

impl CallRecord {
    pub fn new(direction: CallDirection, msisdn: impl Into<Msisdn>, start: EpochSeconds, end: EpochSeconds) -> Self {
        Self { direction, msisdn: msisdn.into(), start, end }
    }

    pub fn duration_secs(&self) -> u64 {
        (self.end - self.start).max(0) as u64
    }

    /// True when the half-open intervals [start, end) intersect.
    pub fn overlaps(&self, other: &CallRecord) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// CDR file line: `<code>, <msisdn>, <start>, <end>`.
impl fmt::Display for CallRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}, {}", self.direction.code(), self.msisdn, self.start, self.end)
    }
}

impl FromStr for CallRecord {
    type Err = CdrError;

    fn from_str(line: &str) -> CdrResult<Self> {
        let malformed = || CdrError::MalformedRecord(line.to_string());
        let parts: Vec<&str> = line.trim_end().split(", ").collect();
        let [code, msisdn, start, end] = parts.as_slice() else {
            return Err(malformed());
        };
        let direction = CallDirection::from_code(code).ok_or_else(malformed)?;
        let start: EpochSeconds = start.parse().map_err(|_| malformed())?;
        let end: EpochSeconds = end.parse().map_err(|_| malformed())?;
        if end <= start {
            return Err(malformed());
        }
        Ok(Self::new(direction, *msisdn, start, end))
    }
}

/// All accepted calls of one calendar month, ascending by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyBatch {
    pub month: Month,
    records:   Vec<CallRecord>,
}

impl MonthlyBatch {
    /// Build a batch, stable-sorting by start time.
    pub fn new(month: Month, mut records: Vec<CallRecord>) -> Self {
        records.sort_by_key(|r| r.start);
        Self { month, records }
    }

    pub fn records(&self) -> &[CallRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a CDR month file body back into a batch.
    /// Blank lines are skipped.
    pub fn parse(month: Month, body: &str) -> CdrResult<Self> {
        let records = body
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.parse::<CallRecord>())
            .collect::<CdrResult<Vec<_>>>()?;
        Ok(Self::new(month, records))
    }

    /// Render the batch as a CDR file body, one line per record.
    pub fn to_lines(&self) -> String {
        let mut body = String::new();
        for record in &self.records {
            body.push_str(&record.to_string());
            body.push('\n');
        }
        body
    }
}
