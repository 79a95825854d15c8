use reservoscope::parser;
use reservoscope::sample::{self, SampleConfig};

#[test]
fn same_seed_same_records() {
    let a = sample::generate(&SampleConfig::default());
    let b = sample::generate(&SampleConfig::default());
    assert_eq!(a, b);
    let c = sample::generate(&SampleConfig::default().with_seed(7));
    assert_ne!(a, c);
}

#[test]
fn default_sample_shape() {
    let recs = sample::generate(&SampleConfig::default());
    let count = |loc: &str| recs.iter().filter(|r| r.location == loc).count();
    assert_eq!(count("Denver"), 40);
    for loc in ["New York", "Los Angeles", "Chicago", "Boston"] {
        assert!((15..=35).contains(&count(loc)), "{loc}: {}", count(loc));
    }
    assert!(recs.iter().all(|r| (420_000_000..=2_420_000_000).contains(&r.id)));
    let batch = parser::normalize_all(&recs);
    assert_eq!(batch.degenerate_count(), 0);
    // times cycle from the first entry
    assert_eq!(batch.reservations[0].time_label(), "17:30");
    assert_eq!(batch.reservations[1].time_label(), "09:30");
}

#[test]
fn empty_dates_generate_nothing() {
    let cfg = SampleConfig { dates: Vec::new(), ..SampleConfig::default() };
    assert!(sample::generate(&cfg).is_empty());
}
