pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse `"HH:MM"` into minutes since midnight.
///
/// Malformed input yields 0, so bad data lands in the midnight slot instead of
/// failing the whole analysis.
pub fn time_to_minutes(s: &str) -> u32 {
    let mut parts = s.split(':');
    let (Some(h), Some(m), None) = (parts.next(), parts.next(), parts.next()) else {
        return 0;
    };
    match (h.trim().parse::<u32>(), m.trim().parse::<u32>()) {
        (Ok(h), Ok(m)) => h.saturating_mul(60).saturating_add(m),
        _ => 0,
    }
}

/// Zero-padded `"HH:MM"`. Minutes past 24h keep counting hours (`1500` -> `"25:00"`).
pub fn minutes_to_time(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
