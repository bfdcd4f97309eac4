//! End-to-end runs of the billing engine into temporary directories.

use cdr_core::{
    config::SimConfig,
    engine::BillingEngine,
    error::CdrError,
    input::is_valid_msisdn,
    output::CdrFileWriter,
    store::CdrStore,
    usage_aggregator::ReportScope,
};
use std::{fs, path::Path};

fn json_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read report dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".json"))
        .collect();
    names.sort();
    names
}

#[test]
fn generation_persists_calls_and_writes_month_files() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = tempfile::tempdir().unwrap();
    let mut engine = BillingEngine::build_test(42, tmp.path()).expect("build test engine");
    engine.generate().expect("generate");

    let subscribers = engine.subscribers();
    assert!((5..=10).contains(&subscribers.len()), "population {}", subscribers.len());
    assert!(subscribers.iter().all(|s| is_valid_msisdn(s)));
    assert!(subscribers.windows(2).all(|w| w[0] < w[1]), "subscribers not sorted");

    let total: usize = engine.batches().iter().map(|b| b.len()).sum();
    assert_eq!(engine.store.cdr_count().unwrap(), total as i64);

    let files = CdrFileWriter::new(tmp.path().join("cdr_files"));
    for batch in engine.batches() {
        let from_disk = files.read_batch(batch.month).expect("read month file");
        assert_eq!(&from_disk, batch);
    }
}

#[test]
fn full_report_writes_one_document_per_subscriber_month() {
    let tmp = tempfile::tempdir().unwrap();
    let mut engine = BillingEngine::build_test(7, tmp.path()).unwrap();
    engine.generate().unwrap();

    let report = engine.report(&ReportScope::All).unwrap();
    let subscribers = engine.subscribers().len();

    assert_eq!(report.sections.len(), subscribers);
    assert_eq!(json_files(&tmp.path().join("reports")).len(), 12 * subscribers);

    let text = report.render();
    assert_eq!(text.matches("Report for subscriber").count(), subscribers);
}

#[test]
fn rejected_request_leaves_previous_reports_untouched() {
    let tmp = tempfile::tempdir().unwrap();
    let mut engine = BillingEngine::build_test(9, tmp.path()).unwrap();
    engine.generate().unwrap();
    let reports = tmp.path().join("reports");

    let msisdn = engine.subscribers()[0].clone();
    engine.report(&ReportScope::Subscriber(msisdn.clone())).unwrap();
    let before = json_files(&reports);
    assert_eq!(before.len(), 12);

    let err = engine
        .report(&ReportScope::SubscriberMonth(msisdn.clone(), 13))
        .unwrap_err();
    assert!(err.is_input_error());

    let err = engine
        .report(&ReportScope::Subscriber("79999999999".into()))
        .unwrap_err();
    assert!(matches!(err, CdrError::UnknownSubscriber(_)));

    assert_eq!(json_files(&reports), before);
}

#[test]
fn new_request_replaces_previous_reports() {
    let tmp = tempfile::tempdir().unwrap();
    let mut engine = BillingEngine::build_test(10, tmp.path()).unwrap();
    engine.generate().unwrap();
    let reports = tmp.path().join("reports");

    engine.report(&ReportScope::All).unwrap();
    let msisdn = engine.subscribers()[0].clone();
    engine
        .report(&ReportScope::SubscriberMonth(msisdn.clone(), 2))
        .unwrap();

    assert_eq!(json_files(&reports), vec![format!("{msisdn}_2.json")]);
}

#[test]
fn report_totals_match_month_files_on_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let mut engine = BillingEngine::build_test(123, tmp.path()).unwrap();
    engine.generate().unwrap();

    let files = CdrFileWriter::new(tmp.path().join("cdr_files"));
    let from_disk: Vec<_> = (1..=12).map(|m| files.read_batch(m).unwrap()).collect();
    let replay = cdr_core::usage_aggregator::UsageAggregator::new(&from_disk, engine.subscribers());

    for month in 1..=12 {
        assert_eq!(
            replay.aggregate_month(month, None).unwrap(),
            engine.aggregator().aggregate_month(month, None).unwrap(),
            "month {month}"
        );
    }
}

#[test]
fn same_seed_produces_identical_runs() {
    const SEED: u64 = 0xDEAD_BEEF_CAFE_1234;
    let tmp_a = tempfile::tempdir().unwrap();
    let tmp_b = tempfile::tempdir().unwrap();

    let mut a = BillingEngine::build_test(SEED, tmp_a.path()).unwrap();
    let mut b = BillingEngine::build_test(SEED, tmp_b.path()).unwrap();
    a.generate().unwrap();
    b.generate().unwrap();

    assert_eq!(a.subscribers(), b.subscribers());
    assert_eq!(a.batches(), b.batches());
}

#[test]
fn existing_database_keeps_its_subscribers() {
    let tmp = tempfile::tempdir().unwrap();
    let db = tmp.path().join("run.db");
    let db = db.to_str().unwrap();

    let mut config = SimConfig::default_test();
    config.cdr_dir = tmp.path().join("cdr_files");
    config.report_dir = tmp.path().join("reports");

    let mut first = BillingEngine::new(config.clone(), 1, CdrStore::open(db).unwrap()).unwrap();
    first.generate().unwrap();
    let original = first.subscribers().to_vec();
    drop(first);

    let mut second = BillingEngine::new(config, 2, CdrStore::open(db).unwrap()).unwrap();
    second.generate().unwrap();
    assert_eq!(second.subscribers(), original.as_slice());

    // The cdr table only holds the second run's calls.
    let total: usize = second.batches().iter().map(|b| b.len()).sum();
    assert_eq!(second.store.cdr_count().unwrap(), total as i64);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = SimConfig::default_test();
    config.traffic.calls_min = 10;
    config.traffic.calls_max = 5;
    let result = BillingEngine::new(config, 1, CdrStore::in_memory().unwrap());
    assert!(matches!(result, Err(CdrError::InvalidRange { .. })));
}
