//! Traffic generator: synthesizes one batch of calls per calendar month.
//!
//! RULES:
//!   - A subscriber never has two overlapping calls within a month.
//!   - Every accepted call goes to the CallSink immediately, in acceptance order.
//!   - The returned batch is sorted by start time.
//!   - All randomness comes from the RngBank, one stream per month.

use crate::{
    clock::MonthWindow,
    config::TrafficConfig,
    error::{CdrError, CdrResult},
    record::{CallDirection, CallRecord, MonthlyBatch},
    rng::{RngBank, StreamRng, StreamSlot},
    sink::CallSink,
    types::{EpochSeconds, Msisdn, Year, MONTHS_IN_YEAR},
};
use std::collections::HashMap;

/// End time of each subscriber's most recently accepted call.
/// Lives for the generation of a single month.
#[derive(Debug, Default)]
pub struct ActiveCallIndex {
    last_end: HashMap<Msisdn, EpochSeconds>,
}

impl ActiveCallIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the call unless it starts before the subscriber's last
    /// accepted call ends. Rejected calls are dropped, not rescheduled.
    ///
    /// Every accepted call starts at or after the previous accepted end,
    /// so accepted calls for a subscriber are ordered and disjoint.
    pub fn try_admit(&mut self, msisdn: &str, start: EpochSeconds, end: EpochSeconds) -> bool {
        if let Some(&busy_until) = self.last_end.get(msisdn) {
            if start < busy_until {
                return false;
            }
        }
        self.last_end.insert(msisdn.to_string(), end);
        true
    }

    pub fn len(&self) -> usize {
        self.last_end.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_end.is_empty()
    }
}

pub struct TrafficGenerator {
    config: TrafficConfig,
}

impl TrafficGenerator {
    pub fn new(config: TrafficConfig) -> CdrResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Generate all twelve months of `year`.
    pub fn generate_year<S: CallSink + ?Sized>(
        &self,
        year: Year,
        subscribers: &[Msisdn],
        rng_bank: &RngBank,
        sink: &mut S,
    ) -> CdrResult<Vec<MonthlyBatch>> {
        if subscribers.is_empty() {
            return Err(CdrError::EmptyPopulation);
        }

        let mut batches = Vec::with_capacity(MONTHS_IN_YEAR as usize);
        for month in 1..=MONTHS_IN_YEAR {
            let window = MonthWindow::of(year, month)
                .ok_or_else(|| CdrError::InvalidMonth(format!("{year}-{month:02}")))?;
            let mut rng = rng_bank.for_stream_in_month(StreamSlot::Traffic, month);
            batches.push(self.generate_month(window, subscribers, &mut rng, sink)?);
        }

        let total: usize = batches.iter().map(MonthlyBatch::len).sum();
        log::info!("traffic: generated {total} calls for {year}");
        Ok(batches)
    }

    /// Generate one month of calls inside `window`.
    pub fn generate_month<S: CallSink + ?Sized>(
        &self,
        window: MonthWindow,
        subscribers: &[Msisdn],
        rng: &mut StreamRng,
        sink: &mut S,
    ) -> CdrResult<MonthlyBatch> {
        if subscribers.is_empty() {
            return Err(CdrError::EmptyPopulation);
        }

        let attempts = rng.range_inclusive(self.config.calls_min, self.config.calls_max);
        let range = window.range() as u64;
        let mut active_calls = ActiveCallIndex::new();
        let mut accepted = Vec::new();

        // Inclusive: attempts + 1 draws.
        for _ in 0..=attempts {
            let msisdn = rng.pick(subscribers);
            let direction = *rng.pick(&CallDirection::ALL);

            let start = window.start + rng.next_u64_below(range) as EpochSeconds;
            let duration = rng.range_inclusive(1, self.config.max_call_duration_secs);
            let end = EpochSeconds::try_from(duration)
                .ok()
                .and_then(|secs| start.checked_add(secs))
                .ok_or(CdrError::TimestampOverflow { start, duration })?;

            if !active_calls.try_admit(msisdn, start, end) {
                log::trace!("month={:02} reject {msisdn} at {start}: line busy", window.month);
                continue;
            }

            let record = CallRecord::new(direction, msisdn.clone(), start, end);
            sink.record_call(&record)?;
            accepted.push(record);
        }

        log::info!(
            "{} month={:02}: accepted {} of {} attempts across {} subscribers",
            rng.name,
            window.month,
            accepted.len(),
            attempts + 1,
            active_calls.len()
        );
        Ok(MonthlyBatch::new(window.month, accepted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_call_is_rejected_after_accepted_one() {
        let mut index = ActiveCallIndex::new();
        assert!(index.try_admit("79000000001", 5, 100));
        assert!(!index.try_admit("79000000001", 50, 60));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn call_starting_exactly_at_previous_end_is_accepted() {
        let mut index = ActiveCallIndex::new();
        assert!(index.try_admit("79000000001", 5, 100));
        assert!(index.try_admit("79000000001", 100, 160));
    }

    #[test]
    fn earlier_call_is_rejected_even_when_it_would_fit() {
        let mut index = ActiveCallIndex::new();
        assert!(index.try_admit("79000000001", 500, 600));
        assert!(!index.try_admit("79000000001", 10, 20));
    }

    #[test]
    fn subscribers_do_not_block_each_other() {
        let mut index = ActiveCallIndex::new();
        assert!(index.try_admit("79000000001", 5, 100));
        assert!(index.try_admit("79000000002", 50, 60));
    }

    #[test]
    fn empty_population_is_rejected_before_drawing() {
        let generator = TrafficGenerator::new(TrafficConfig::default()).unwrap();
        let window = MonthWindow::of(2024, 1).unwrap();
        let mut rng = RngBank::new(1).for_stream_in_month(StreamSlot::Traffic, 1);
        let mut sink: Vec<CallRecord> = Vec::new();
        let result = generator.generate_month(window, &[], &mut rng, &mut sink);
        assert!(matches!(result, Err(CdrError::EmptyPopulation)));
        assert!(sink.is_empty());
    }

    #[test]
    fn zero_duration_ceiling_is_a_configuration_error() {
        let config = TrafficConfig { max_call_duration_secs: 0, ..TrafficConfig::default() };
        assert!(matches!(
            TrafficGenerator::new(config),
            Err(CdrError::InvalidRange { name: "call duration", .. })
        ));
    }
}
