//! Synthetic reservation generator.
//!
//! Produces records in the external `location, id, datetime` shape so demo
//! data goes through exactly the same normalizer as imported files.

use crate::parser::RawRecord;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Configuration for generating sample reservations.
#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub locations: Vec<String>,
    /// `M/D/YY` date strings
    pub dates: Vec<String>,
    /// `h:mm AM/PM` times, cycled through in order per location
    pub times: Vec<String>,
    /// Record count range for ordinary locations (inclusive)
    pub records_per_location: (usize, usize),
    /// Location that always gets `anchor_records` records
    pub anchor_location: Option<String>,
    pub anchor_records: usize,
    pub seed: u64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        let strings = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            locations: strings(&["Denver", "New York", "Los Angeles", "Chicago", "Boston"]),
            dates: strings(&["9/28/25", "9/29/25", "9/30/25"]),
            times: strings(&[
                "5:30 PM", "9:30 AM", "2:48 PM", "5:30 PM", "2:48 PM", "4:25 PM",
                "9:40 AM", "10:00 AM", "9:44 AM", "3:45 PM", "4:30 PM", "9:49 AM",
                "8:00 AM", "4:50 PM", "10:20 AM", "10:56 AM", "6:33 AM", "12:00 PM",
            ]),
            records_per_location: (15, 35),
            anchor_location: Some("Denver".to_string()),
            anchor_records: 40,
            seed: 42,
        }
    }
}

impl SampleConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Deterministic for a given config and seed.
pub fn generate(config: &SampleConfig) -> Vec<RawRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let mut out = Vec::new();
    if config.dates.is_empty() || config.times.is_empty() {
        return out;
    }
    let (min, max) = config.records_per_location;
    for location in &config.locations {
        let count = if config.anchor_location.as_deref() == Some(location.as_str()) {
            config.anchor_records
        } else {
            rng.random_range(min.min(max)..=max.max(min))
        };
        for i in 0..count {
            let date = &config.dates[rng.random_range(0..config.dates.len())];
            let time = &config.times[i % config.times.len()];
            let id = 420_000_000 + rng.random_range(0..=2_000_000_000i64);
            out.push(RawRecord::new(location.clone(), id, format!("{date} {time}")));
        }
    }
    tracing::debug!(records = out.len(), seed = config.seed, "generated sample reservations");
    out
}
