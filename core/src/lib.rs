//! Synthetic call traffic (CDR) generation and monthly usage (UDR) aggregation.

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod output;
pub mod population;
pub mod record;
pub mod report;
pub mod rng;
pub mod sink;
pub mod store;
pub mod traffic_generator;
pub mod types;
pub mod usage_aggregator;
