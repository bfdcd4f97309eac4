//! Usage aggregator: folds monthly call batches into per-subscriber
//! usage records (UDR) and materializes them as report artifacts.
//!
//! RULES:
//!   - Aggregation never mutates its input batches.
//!   - Every requested subscriber gets exactly one record per month,
//!     zero-filled when they made no calls.
//!   - A request is fully validated before the sink sees anything.

use crate::{
    error::{CdrError, CdrResult},
    record::{CallDirection, CallRecord, MonthlyBatch},
    report::{SubscriberReport, UsageReport},
    sink::UsageSink,
    types::{Month, Msisdn, MONTHS_IN_YEAR},
};
use std::collections::BTreeMap;

/// Running total of call time in one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallTotals {
    total_secs: u64,
}

impl CallTotals {
    pub fn add_secs(&mut self, secs: u64) {
        self.total_secs += secs;
    }

    pub fn seconds(&self) -> u64 {
        self.total_secs
    }
}

/// One subscriber's usage for one month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRecord {
    pub msisdn:   Msisdn,
    pub outgoing: CallTotals,
    pub incoming: CallTotals,
}

impl UsageRecord {
    pub fn new(msisdn: impl Into<Msisdn>) -> Self {
        Self {
            msisdn: msisdn.into(),
            outgoing: CallTotals::default(),
            incoming: CallTotals::default(),
        }
    }

    pub fn add_call(&mut self, record: &CallRecord) {
        let secs = record.duration_secs();
        match record.direction {
            CallDirection::Outgoing => self.outgoing.add_secs(secs),
            CallDirection::Incoming => self.incoming.add_secs(secs),
        }
    }

    pub fn totals(&self, direction: CallDirection) -> CallTotals {
        match direction {
            CallDirection::Outgoing => self.outgoing,
            CallDirection::Incoming => self.incoming,
        }
    }
}

/// Which subscribers and months a report covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportScope {
    /// Every subscriber, every generated month.
    All,
    /// One subscriber, every generated month.
    Subscriber(Msisdn),
    /// One subscriber, one month.
    SubscriberMonth(Msisdn, Month),
}

impl ReportScope {
    fn subscriber(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Subscriber(m) | Self::SubscriberMonth(m, _) => Some(m.as_str()),
        }
    }
}

pub struct UsageAggregator<'a> {
    batches:     &'a [MonthlyBatch],
    subscribers: &'a [Msisdn],
}

impl<'a> UsageAggregator<'a> {
    pub fn new(batches: &'a [MonthlyBatch], subscribers: &'a [Msisdn]) -> Self {
        Self { batches, subscribers }
    }

    pub fn batch_for(&self, month: Month) -> CdrResult<&'a MonthlyBatch> {
        if !(1..=MONTHS_IN_YEAR).contains(&month) {
            return Err(CdrError::InvalidMonth(month.to_string()));
        }
        self.batches
            .iter()
            .find(|b| b.month == month)
            .ok_or_else(|| CdrError::MonthNotGenerated {
                month,
                available: self.batches.len(),
            })
    }

    fn ensure_known(&self, msisdn: &str) -> CdrResult<()> {
        if self.subscribers.iter().any(|s| s == msisdn) {
            Ok(())
        } else {
            Err(CdrError::UnknownSubscriber(msisdn.to_string()))
        }
    }

    /// Totals for one month, keyed and ordered by subscriber.
    /// With a filter only that subscriber is scanned and returned.
    pub fn aggregate_month(
        &self,
        month: Month,
        filter: Option<&str>,
    ) -> CdrResult<BTreeMap<Msisdn, UsageRecord>> {
        if let Some(msisdn) = filter {
            self.ensure_known(msisdn)?;
        }
        let batch = self.batch_for(month)?;
        Ok(self.fold_batch(batch, filter))
    }

    fn fold_batch(&self, batch: &MonthlyBatch, filter: Option<&str>) -> BTreeMap<Msisdn, UsageRecord> {
        let mut usage: BTreeMap<Msisdn, UsageRecord> = BTreeMap::new();

        for record in batch.records() {
            if filter.is_some_and(|m| m != record.msisdn) {
                continue;
            }
            usage
                .entry(record.msisdn.clone())
                .or_insert_with(|| UsageRecord::new(record.msisdn.clone()))
                .add_call(record);
        }

        // Backfill silent subscribers with zero totals.
        match filter {
            Some(msisdn) => {
                usage
                    .entry(msisdn.to_string())
                    .or_insert_with(|| UsageRecord::new(msisdn));
            }
            None => {
                for msisdn in self.subscribers {
                    usage
                        .entry(msisdn.clone())
                        .or_insert_with(|| UsageRecord::new(msisdn.clone()));
                }
            }
        }
        usage
    }

    /// Reject a request before anything is written.
    pub fn validate(&self, scope: &ReportScope) -> CdrResult<()> {
        if let Some(msisdn) = scope.subscriber() {
            self.ensure_known(msisdn)?;
        }
        if let ReportScope::SubscriberMonth(_, month) = scope {
            self.batch_for(*month)?;
        }
        Ok(())
    }

    fn months_in(&self, scope: &ReportScope) -> Vec<Month> {
        match scope {
            ReportScope::SubscriberMonth(_, month) => vec![*month],
            _ => self.batches.iter().map(|b| b.month).collect(),
        }
    }

    /// Aggregate every month in `scope`, hand one artifact per
    /// (subscriber, month) to `sink`, and return the tabular report.
    pub fn generate<S: UsageSink + ?Sized>(
        &self,
        scope: &ReportScope,
        sink: &mut S,
    ) -> CdrResult<UsageReport> {
        self.validate(scope)?;
        sink.prepare()?;

        let filter = scope.subscriber();
        let mut per_subscriber: BTreeMap<Msisdn, Vec<(Month, UsageRecord)>> = BTreeMap::new();
        let mut artifacts = 0usize;

        for month in self.months_in(scope) {
            let batch = self.batch_for(month)?;
            let usage = self.fold_batch(batch, filter);
            for (msisdn, record) in usage {
                sink.write_usage(month, &record)?;
                artifacts += 1;
                per_subscriber.entry(msisdn).or_default().push((month, record));
            }
        }

        // Table rows follow the known population; numbers seen only in
        // the batches still produced artifacts above.
        let subscribers: Vec<&Msisdn> = match filter {
            Some(_) => per_subscriber.keys().collect(),
            None => self.subscribers.iter().collect(),
        };
        let sections = subscribers
            .into_iter()
            .map(|msisdn| SubscriberReport {
                msisdn: msisdn.clone(),
                rows: per_subscriber.get(msisdn).cloned().unwrap_or_default(),
            })
            .collect();

        log::info!("udr: {artifacts} usage records written for {scope:?}");
        Ok(UsageReport { sections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(direction: CallDirection, msisdn: &str, start: i64, end: i64) -> CallRecord {
        CallRecord::new(direction, msisdn, start, end)
    }

    #[test]
    fn outgoing_and_incoming_are_summed_separately() {
        let batch = MonthlyBatch::new(
            1,
            vec![
                rec(CallDirection::Outgoing, "79000000001", 0, 10),
                rec(CallDirection::Incoming, "79000000001", 20, 50),
            ],
        );
        let subscribers = vec!["79000000001".to_string()];
        let batches = [batch];
        let aggregator = UsageAggregator::new(&batches, &subscribers);

        let usage = aggregator.aggregate_month(1, None).unwrap();
        let record = &usage["79000000001"];
        assert_eq!(record.outgoing.seconds(), 10);
        assert_eq!(record.incoming.seconds(), 30);
    }

    #[test]
    fn filter_skips_other_subscribers() {
        let batches = [MonthlyBatch::new(
            1,
            vec![
                rec(CallDirection::Outgoing, "79000000001", 0, 10),
                rec(CallDirection::Outgoing, "79000000002", 0, 99),
            ],
        )];
        let subscribers = vec!["79000000001".to_string(), "79000000002".to_string()];
        let aggregator = UsageAggregator::new(&batches, &subscribers);

        let usage = aggregator.aggregate_month(1, Some("79000000001")).unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage["79000000001"].outgoing.seconds(), 10);
    }

    #[test]
    fn month_outside_calendar_is_invalid() {
        let batches: [MonthlyBatch; 0] = [];
        let subscribers = vec!["79000000001".to_string()];
        let aggregator = UsageAggregator::new(&batches, &subscribers);
        assert!(matches!(aggregator.batch_for(0), Err(CdrError::InvalidMonth(_))));
        assert!(matches!(aggregator.batch_for(13), Err(CdrError::InvalidMonth(_))));
        assert!(matches!(
            aggregator.batch_for(4),
            Err(CdrError::MonthNotGenerated { month: 4, available: 0 })
        ));
    }
}
