use crate::clock;
use crate::error::NormalizeError;
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted reservation datetime shapes, tried in order: two-digit year first.
const DATETIME_FORMATS: [&str; 2] = ["%m/%d/%y %I:%M %p", "%m/%d/%Y %I:%M %p"];

static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DayOfWeek {
    #[serde(rename = "Mo")]
    Monday,
    #[serde(rename = "Tu")]
    Tuesday,
    #[serde(rename = "We")]
    Wednesday,
    #[serde(rename = "Th")]
    Thursday,
    #[serde(rename = "Fr")]
    Friday,
    #[serde(rename = "Sa")]
    Saturday,
    #[serde(rename = "Su")]
    Sunday,
}

impl DayOfWeek {
    /// ISO order, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Mo",
            DayOfWeek::Tuesday => "Tu",
            DayOfWeek::Wednesday => "We",
            DayOfWeek::Thursday => "Th",
            DayOfWeek::Friday => "Fr",
            DayOfWeek::Saturday => "Sa",
            DayOfWeek::Sunday => "Su",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(w: chrono::Weekday) -> Self {
        DayOfWeek::ALL[w.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A reservation as it arrives from a file, sheet or generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    pub location: String,
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    pub datetime: String,
}

impl RawRecord {
    pub fn new(location: impl Into<String>, id: i64, datetime: impl Into<String>) -> Self {
        Self { location: location.into(), id, datetime: datetime.into() }
    }
}

/// Ids arrive as integers, integral floats (spreadsheet exports) or numeric strings.
fn deserialize_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    fn from_float<E: de::Error>(v: f64) -> Result<i64, E> {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            Ok(v as i64)
        } else {
            Err(E::custom(format!("id {v} is not an integer")))
        }
    }

    impl<'de> Visitor<'de> for IdVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer id or a numeric string")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("id {v} out of range")))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            from_float(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            let t = v.trim();
            if let Ok(n) = t.parse::<i64>() {
                return Ok(n);
            }
            match t.parse::<f64>() {
                Ok(f) => from_float(f),
                Err(_) => Err(E::custom(format!("id {v:?} is not numeric"))),
            }
        }
    }

    deserializer.deserialize_any(IdVisitor)
}

/// Canonical, immutable reservation.
///
/// `date` and `day` are `None` only for records whose datetime could not be
/// parsed; those sit at minute 0 and are what the report calls degenerate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reservation {
    pub location: String,
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub minute: u32,
    pub day: Option<DayOfWeek>,
}

impl Reservation {
    pub fn is_degenerate(&self) -> bool {
        self.date.is_none()
    }

    /// `month/day` without leading zeros or year; empty for degenerate records.
    pub fn date_label(&self) -> String {
        date_label(self.date)
    }

    pub fn time_label(&self) -> String {
        clock::minutes_to_time(self.minute)
    }

    pub fn group_key(&self) -> GroupKey {
        GroupKey { date: self.date, location: self.location.clone() }
    }

    fn degenerate(raw: &RawRecord) -> Self {
        Self { location: raw.location.clone(), id: raw.id, date: None, minute: 0, day: None }
    }
}

pub fn date_label(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{}/{}", d.month(), d.day()),
        None => String::new(),
    }
}

/// One location's reservations on one calendar date.
///
/// Ordered by date first; the degenerate group (`date: None`) sorts before
/// every real date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GroupKey {
    pub date: Option<NaiveDate>,
    pub location: String,
}

impl GroupKey {
    pub fn new(location: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self { date, location: location.into() }
    }

    pub fn label(&self) -> String {
        date_label(self.date)
    }

    pub fn contains(&self, r: &Reservation) -> bool {
        r.date == self.date && r.location == self.location
    }
}

/// Result of the lenient normalizer: always a reservation, plus whether the
/// datetime actually parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub reservation: Reservation,
    pub parsed: bool,
}

pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let collapsed = RE_WHITESPACE.replace_all(s.trim(), " ");
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(&collapsed, f).ok())
}

/// Parse a date given on the command line: ISO `YYYY-MM-DD`, `M/D/YY` or `M/D/YYYY`.
pub fn parse_date_arg(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y"]
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
}

fn from_datetime(raw: &RawRecord, dt: NaiveDateTime) -> Reservation {
    Reservation {
        location: raw.location.clone(),
        id: raw.id,
        date: Some(dt.date()),
        minute: dt.hour() * 60 + dt.minute(),
        day: Some(dt.weekday().into()),
    }
}

/// Total normalizer: an unparsable datetime degrades to minute 0 with no date.
pub fn normalize(raw: &RawRecord) -> Normalized {
    match parse_datetime(&raw.datetime) {
        Some(dt) => Normalized { reservation: from_datetime(raw, dt), parsed: true },
        None => Normalized { reservation: Reservation::degenerate(raw), parsed: false },
    }
}

pub fn normalize_strict(raw: &RawRecord) -> Result<Reservation, NormalizeError> {
    parse_datetime(&raw.datetime)
        .map(|dt| from_datetime(raw, dt))
        .ok_or_else(|| NormalizeError::UnparsableDatetime {
            location: raw.location.clone(),
            id: raw.id,
            datetime: raw.datetime.clone(),
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparsedRecord {
    pub index: usize,
    pub location: String,
    pub id: i64,
    pub datetime: String,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub reservations: Vec<Reservation>,
    pub unparsed: Vec<UnparsedRecord>,
}

impl NormalizedBatch {
    pub fn degenerate_count(&self) -> usize {
        self.unparsed.len()
    }
}

/// Normalize every record in input order. Nothing is dropped: unparsable
/// records come back as degenerate reservations and are listed in `unparsed`.
pub fn normalize_all(raws: &[RawRecord]) -> NormalizedBatch {
    let mut batch = NormalizedBatch { reservations: Vec::with_capacity(raws.len()), unparsed: Vec::new() };
    for (index, raw) in raws.iter().enumerate() {
        let n = normalize(raw);
        if !n.parsed {
            batch.unparsed.push(UnparsedRecord {
                index,
                location: raw.location.clone(),
                id: raw.id,
                datetime: raw.datetime.clone(),
            });
        }
        batch.reservations.push(n.reservation);
    }
    tracing::debug!(total = raws.len(), unparsed = batch.unparsed.len(), "normalized reservation records");
    batch
}
