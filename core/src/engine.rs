//! The billing engine: wires the store, RNG bank and config into one run.
//!
//! EXECUTION ORDER (fixed):
//!   1. Seed or load the subscriber population
//!   2. Recreate the cdr table
//!   3. Generate twelve monthly batches (each call persisted on acceptance)
//!   4. Write one CDR file per month
//!   5. Aggregate usage for the requested report scope
//!
//! RULES:
//!   - All randomness flows through the RngBank.
//!   - Generation finishes completely before aggregation starts.
//!   - A rejected report request leaves every earlier artifact untouched.

use crate::{
    config::SimConfig,
    error::CdrResult,
    output::{CdrFileWriter, JsonReportWriter},
    population,
    record::MonthlyBatch,
    report::UsageReport,
    rng::{RngBank, StreamSlot},
    store::CdrStore,
    traffic_generator::TrafficGenerator,
    types::Msisdn,
    usage_aggregator::{ReportScope, UsageAggregator},
};
use std::path::Path;

pub struct BillingEngine {
    pub config:   SimConfig,
    pub rng_bank: RngBank,
    pub store:    CdrStore,
    subscribers:  Vec<Msisdn>,
    batches:      Vec<MonthlyBatch>,
}

impl BillingEngine {
    pub fn new(config: SimConfig, seed: u64, store: CdrStore) -> CdrResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            rng_bank: RngBank::new(seed),
            store,
            subscribers: Vec::new(),
            batches: Vec::new(),
        })
    }

    /// Engine over a fresh in-memory store with test config,
    /// writing its files under `workdir`.
    pub fn build_test(seed: u64, workdir: &Path) -> CdrResult<Self> {
        let mut config = SimConfig::default_test();
        config.cdr_dir = workdir.join("cdr_files");
        config.report_dir = workdir.join("reports");
        Self::new(config, seed, CdrStore::in_memory()?)
    }

    /// Steps 1–4: population, traffic, CDR files.
    pub fn generate(&mut self) -> CdrResult<()> {
        let mut population_rng = self.rng_bank.for_stream(StreamSlot::Population);
        self.subscribers =
            population::initialize_subscribers(&self.store, &self.config.population, &mut population_rng)?;

        self.store.recreate_cdr_table()?;

        let generator = TrafficGenerator::new(self.config.traffic.clone())?;
        self.batches = generator.generate_year(
            self.config.year,
            &self.subscribers,
            &self.rng_bank,
            &mut self.store,
        )?;

        let files = CdrFileWriter::new(&self.config.cdr_dir).write_all(&self.batches)?;
        log::info!(
            "engine: seed={} wrote {} CDR files to {}",
            self.rng_bank.master_seed(),
            files.len(),
            self.config.cdr_dir.display()
        );
        Ok(())
    }

    /// Step 5: aggregate `scope` into JSON documents under the report
    /// directory and return the table for printing.
    pub fn report(&self, scope: &ReportScope) -> CdrResult<UsageReport> {
        let mut sink = JsonReportWriter::new(&self.config.report_dir);
        self.aggregator().generate(scope, &mut sink)
    }

    pub fn aggregator(&self) -> UsageAggregator<'_> {
        UsageAggregator::new(&self.batches, &self.subscribers)
    }

    pub fn subscribers(&self) -> &[Msisdn] {
        &self.subscribers
    }

    pub fn batches(&self) -> &[MonthlyBatch] {
        &self.batches
    }
}
