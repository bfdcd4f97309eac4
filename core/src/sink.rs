//! Sink traits: where generated calls and usage summaries go.
//!
//! RULE: The generator and aggregator never know what is behind a sink.
//! Production wires the SQLite store and the report directory;
//! tests wire plain vectors.

use crate::{
    error::CdrResult,
    record::CallRecord,
    types::Month,
    usage_aggregator::UsageRecord,
};

/// Receives each accepted call exactly once, in acceptance order.
pub trait CallSink {
    fn record_call(&mut self, record: &CallRecord) -> CdrResult<()>;
}

/// Receives one usage summary per (subscriber, month) pair.
pub trait UsageSink {
    /// Called once per accepted request, before the first write.
    fn prepare(&mut self) -> CdrResult<()> {
        Ok(())
    }

    fn write_usage(&mut self, month: Month, usage: &UsageRecord) -> CdrResult<()>;
}

impl CallSink for Vec<CallRecord> {
    fn record_call(&mut self, record: &CallRecord) -> CdrResult<()> {
        self.push(record.clone());
        Ok(())
    }
}

impl UsageSink for Vec<(Month, UsageRecord)> {
    fn write_usage(&mut self, month: Month, usage: &UsageRecord) -> CdrResult<()> {
        self.push((month, usage.clone()));
        Ok(())
    }
}
