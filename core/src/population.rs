//! Subscriber population: generation and first-run seeding of the store.

use crate::{
    config::PopulationConfig,
    error::{CdrError, CdrResult},
    rng::StreamRng,
    store::CdrStore,
    types::Msisdn,
};
use std::collections::BTreeSet;

pub const MSISDN_PREFIX: &str = "79";
const MSISDN_RANDOM_DIGITS: usize = 9;

/// "79" followed by nine random digits.
pub fn generate_msisdn(rng: &mut StreamRng) -> Msisdn {
    let mut number = String::with_capacity(MSISDN_PREFIX.len() + MSISDN_RANDOM_DIGITS);
    number.push_str(MSISDN_PREFIX);
    for _ in 0..MSISDN_RANDOM_DIGITS {
        let digit = rng.next_u64_below(10) as u8;
        number.push(char::from(b'0' + digit));
    }
    number
}

/// Draw a population size from [min, max] and fill it with distinct numbers.
pub fn generate_population(config: &PopulationConfig, rng: &mut StreamRng) -> CdrResult<BTreeSet<Msisdn>> {
    if config.min_count == 0 {
        return Err(CdrError::EmptyPopulation);
    }
    let max = config.max_count();
    if config.min_count > max {
        return Err(CdrError::InvalidRange {
            name: "subscriber count",
            min: config.min_count,
            max,
        });
    }

    let target = rng.range_inclusive(config.min_count, max) as usize;
    let mut numbers = BTreeSet::new();
    while numbers.len() < target {
        numbers.insert(generate_msisdn(rng));
    }
    Ok(numbers)
}

/// Seed the subscriber table on first run, then return the population
/// ordered by phone number. An existing table is reused as-is.
pub fn initialize_subscribers(
    store: &CdrStore,
    config: &PopulationConfig,
    rng: &mut StreamRng,
) -> CdrResult<Vec<Msisdn>> {
    if !store.subscriber_table_exists()? {
        store.create_subscriber_table()?;
        let numbers = generate_population(config, rng)?;
        let inserted = store.insert_subscribers(&numbers)?;
        log::info!("{}: seeded {inserted} subscribers", rng.name);
    }

    let subscribers = store.list_subscribers()?;
    if subscribers.is_empty() {
        return Err(CdrError::EmptyPopulation);
    }
    log::info!("population: {} subscribers loaded", subscribers.len());
    Ok(subscribers)
}
