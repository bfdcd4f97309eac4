//! cdr-runner: generate a year of call traffic and print usage reports.
//!
//! Usage:
//!   cdr-runner                          all subscribers, all months
//!   cdr-runner 79123456789              one subscriber, all months
//!   cdr-runner 79123456789 3            one subscriber, one month
//!
//! Flags (any position):
//!   --seed 12345 --year 2024 --db run.db --config sim.json
//!   --cdr-dir cdr_files --report-dir reports

use anyhow::Result;
use cdr_core::{
    config::SimConfig,
    engine::BillingEngine,
    input::{parse_month, parse_msisdn},
    store::CdrStore,
    types::Year,
    usage_aggregator::ReportScope,
};
use std::{env, str::FromStr};

const VALUE_FLAGS: [&str; 6] = ["--seed", "--year", "--db", "--config", "--cdr-dir", "--report-dir"];
const USAGE: &str = "Expected arguments: [msisdn] [month]";

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match Invocation::parse(&args) {
        Ok(invocation) => invocation,
        Err(message) => {
            println!("{message}");
            return Ok(());
        }
    };
    let Invocation { scope, flags, year, seed } = invocation;

    let mut config = match flag_value(&flags, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(year) = year {
        config.year = year;
    }
    if let Some(dir) = flag_value(&flags, "--cdr-dir") {
        config.cdr_dir = dir.into();
    }
    if let Some(dir) = flag_value(&flags, "--report-dir") {
        config.report_dir = dir.into();
    }
    let seed = seed.or(config.seed).unwrap_or_else(seed_from_clock);
    let db = flag_value(&flags, "--db").unwrap_or(":memory:");

    log::info!("cdr-runner: seed={seed} year={} db={db} scope={scope:?}", config.year);

    let store = CdrStore::open(db)?;
    let mut engine = BillingEngine::new(config, seed, store)?;
    engine.generate()?;

    match engine.report(&scope) {
        Ok(report) => print!("{}", report.render()),
        Err(e) if e.is_input_error() => eprintln!("{e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Everything taken from the command line, checked before any work starts.
struct Invocation<'a> {
    scope: ReportScope,
    flags: Vec<(&'a str, &'a str)>,
    year:  Option<Year>,
    seed:  Option<u64>,
}

impl<'a> Invocation<'a> {
    fn parse(args: &'a [String]) -> Result<Self, String> {
        let (flags, positional) = split_args(args)?;
        let scope = parse_scope(&positional)?;
        let year = parse_arg(&flags, "--year")?;
        let seed = parse_arg(&flags, "--seed")?;
        Ok(Self { scope, flags, year, seed })
    }
}

/// Map positional arguments onto a report scope, or a message for the user.
fn parse_scope(positional: &[&str]) -> Result<ReportScope, String> {
    match positional {
        [] => Ok(ReportScope::All),
        [msisdn] => parse_msisdn(msisdn)
            .map(ReportScope::Subscriber)
            .map_err(|e| e.to_string()),
        [msisdn, month] => {
            let msisdn = parse_msisdn(msisdn).map_err(|e| e.to_string())?;
            let month = parse_month(month).map_err(|e| e.to_string())?;
            Ok(ReportScope::SubscriberMonth(msisdn, month))
        }
        _ => Err(USAGE.to_string()),
    }
}

/// Separate `--flag value` pairs from positional arguments.
fn split_args(args: &[String]) -> Result<(Vec<(&str, &str)>, Vec<&str>), String> {
    let mut flags = Vec::new();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            let value = iter.next().ok_or_else(|| format!("Missing value for {arg}"))?;
            flags.push((arg.as_str(), value.as_str()));
        } else {
            positional.push(arg.as_str());
        }
    }
    Ok((flags, positional))
}

fn flag_value<'a>(flags: &[(&str, &'a str)], flag: &str) -> Option<&'a str> {
    flags.iter().find(|(f, _)| *f == flag).map(|(_, v)| *v)
}

fn parse_arg<T: FromStr>(flags: &[(&str, &str)], flag: &str) -> Result<Option<T>, String> {
    flag_value(flags, flag)
        .map(|v| v.parse().map_err(|_| format!("Invalid value for {flag}: '{v}'")))
        .transpose()
}

fn seed_from_clock() -> u64 {
    chrono::Utc::now().timestamp_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_count_selects_scope() {
        assert_eq!(parse_scope(&[]), Ok(ReportScope::All));
        assert_eq!(
            parse_scope(&["79123456789"]),
            Ok(ReportScope::Subscriber("79123456789".into()))
        );
        assert_eq!(
            parse_scope(&["79123456789", "03"]),
            Ok(ReportScope::SubscriberMonth("79123456789".into(), 3))
        );
        assert_eq!(parse_scope(&["a", "b", "c"]), Err(USAGE.to_string()));
    }

    #[test]
    fn invalid_arguments_yield_messages() {
        assert!(parse_scope(&["71123456789"]).is_err());
        assert!(parse_scope(&["79123456789", "13"]).is_err());
    }

    #[test]
    fn flags_are_split_from_positionals() {
        let args: Vec<String> = ["--seed", "7", "79123456789", "--db", "x.db", "2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (flags, positional) = split_args(&args).unwrap();
        assert_eq!(positional, vec!["79123456789", "2"]);
        assert_eq!(parse_arg::<u64>(&flags, "--seed"), Ok(Some(7)));
        assert_eq!(flag_value(&flags, "--db"), Some("x.db"));
        assert_eq!(parse_arg::<Year>(&flags, "--year"), Ok(None));
    }

    #[test]
    fn malformed_flags_yield_messages() {
        let dangling: Vec<String> = vec!["79123456789".into(), "--seed".into()];
        assert_eq!(split_args(&dangling).unwrap_err(), "Missing value for --seed");

        let garbled: Vec<String> = vec!["--seed".into(), "abc".into()];
        assert_eq!(
            Invocation::parse(&garbled).err(),
            Some("Invalid value for --seed: 'abc'".to_string())
        );

        let valid: Vec<String> = vec!["--year".into(), "2023".into(), "79123456789".into()];
        let invocation = Invocation::parse(&valid).unwrap();
        assert_eq!(invocation.year, Some(2023));
        assert_eq!(invocation.seed, None);
        assert_eq!(invocation.scope, ReportScope::Subscriber("79123456789".into()));
    }
}
