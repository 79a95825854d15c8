use crate::overlap::occupancy_row;
use crate::parser::{DayOfWeek, GroupKey, Reservation};
use crate::slots::SlotGrid;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use std::num::NonZeroU32;

/// Group reservations by `(location, date)`, ascending by parsed date.
pub fn group_reservations<'a, I>(reservations: I) -> Vec<(GroupKey, Vec<&'a Reservation>)>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut groups: AHashMap<GroupKey, Vec<&'a Reservation>> = AHashMap::new();
    for r in reservations {
        groups.entry(r.group_key()).or_default().push(r);
    }
    groups.into_iter().sorted_by(|a, b| a.0.cmp(&b.0)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRow {
    pub key: GroupKey,
    pub label: String,
    pub day: Option<DayOfWeek>,
    pub reservations: usize,
    pub values: Vec<u32>,
}

/// One occupancy row per location-date group. Groups are computed
/// independently, so they run in parallel without shared accumulators.
pub fn date_rows(in_range: &[&Reservation], grid: &SlotGrid) -> Vec<DateRow> {
    group_reservations(in_range.iter().copied())
        .into_par_iter()
        .map(|(key, members)| DateRow {
            label: key.label(),
            day: members.first().and_then(|r| r.day),
            reservations: members.len(),
            values: occupancy_row(members.iter().copied(), grid),
            key,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AverageRow {
    pub groups: usize,
    pub values: Vec<u32>,
}

/// Element-wise mean of the group rows, rounded half away from zero.
/// No rows gives an all-zero row.
pub fn average_row<'a, I>(rows: I, slot_count: usize) -> AverageRow
where
    I: IntoIterator<Item = &'a [u32]>,
{
    let mut sums = vec![0u64; slot_count];
    let mut groups = 0usize;
    for row in rows {
        groups += 1;
        for (acc, v) in sums.iter_mut().zip(row) {
            *acc += *v as u64;
        }
    }
    let values = if groups == 0 {
        vec![0; slot_count]
    } else {
        sums.iter().map(|s| (*s as f64 / groups as f64).round() as u32).collect()
    };
    AverageRow { groups, values }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdayRow {
    pub day: DayOfWeek,
    /// Distinct calendar dates seen for this weekday
    pub dates_observed: usize,
    /// Raw slot hits summed over every date of this weekday
    pub hits: Vec<u32>,
    pub values: Vec<f64>,
}

/// Seven rows, Mo..Su, averaging slot hits over the number of dates observed
/// for each weekday. Weekdays without data give all-zero rows. Degenerate
/// reservations have no weekday and never contribute.
pub fn weekday_rows(in_range: &[&Reservation], grid: &SlotGrid) -> Vec<WeekdayRow> {
    DayOfWeek::ALL
        .par_iter()
        .map(|&day| {
            let members: Vec<&Reservation> = in_range.iter().copied().filter(|r| r.day == Some(day)).collect();
            let dates: AHashSet<_> = members.iter().filter_map(|r| r.date).collect();
            let hits = occupancy_row(members.iter().copied(), grid);
            let values = if dates.is_empty() {
                vec![0.0; grid.len()]
            } else {
                hits.iter().map(|h| *h as f64 / dates.len() as f64).collect()
            };
            WeekdayRow { day, dates_observed: dates.len(), hits, values }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayUtilization {
    pub day: DayOfWeek,
    pub observed: bool,
    pub per_slot: Vec<f64>,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Utilization {
    pub days: Vec<DayUtilization>,
    /// Per-slot utilization averaged over observed weekdays
    pub row: Vec<f64>,
    pub overall: f64,
}

pub fn percent_of_cap(value: f64, cap: NonZeroU32) -> f64 {
    value / cap.get() as f64 * 100.0
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 { return 0.0; }
    values.sum::<f64>() / n as f64
}

/// Occupancy as a percentage of `cap`: per slot, per weekday, and overall.
pub fn utilization(rows: &[WeekdayRow], cap: NonZeroU32) -> Utilization {
    let slot_count = rows.first().map(|r| r.values.len()).unwrap_or(0);
    let days: Vec<DayUtilization> = rows
        .iter()
        .map(|r| {
            let per_slot: Vec<f64> = r.values.iter().map(|v| percent_of_cap(*v, cap)).collect();
            DayUtilization { day: r.day, observed: r.dates_observed > 0, mean: mean(per_slot.iter().copied()), per_slot }
        })
        .collect();

    let observed: Vec<&DayUtilization> = days.iter().filter(|d| d.observed).collect();
    let row = (0..slot_count)
        .map(|i| mean(observed.iter().map(|d| d.per_slot[i])))
        .collect();
    let overall = mean(observed.iter().map(|d| d.mean));
    Utilization { days, row, overall }
}
