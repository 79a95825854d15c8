use crate::clock;
use crate::overlap::occupancy_row;
use crate::parser::Reservation;
use crate::aggregate::group_reservations;
use crate::slots::{SlotGrid, SLOTS_PER_HOUR};
use rayon::prelude::*;
use serde::Serialize;
use std::num::NonZeroU32;

pub const BUSIEST_HOURS_LIMIT: usize = 4;

/// Maximal span of slots `[start, end)` at or above a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Run {
    pub start: usize,
    pub end: usize,
}

impl Run {
    pub fn len(&self) -> usize { self.end - self.start }
    pub fn is_empty(&self) -> bool { self.start == self.end }
}

pub fn find_runs<T: PartialOrd + Copy>(values: &[T], threshold: T) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut current_start: Option<usize> = None;
    for (i, v) in values.iter().enumerate() {
        if *v >= threshold {
            if current_start.is_none() {
                current_start = Some(i);
            }
        } else if let Some(start) = current_start.take() {
            runs.push(Run { start, end: i });
        }
    }
    if let Some(start) = current_start {
        runs.push(Run { start, end: values.len() });
    }
    runs
}

/// Weekly rows are averages and run lower than single days, so they are
/// flagged one below the cap (never below 1).
pub fn weekly_threshold(cap: NonZeroU32) -> u32 {
    cap.get().saturating_sub(1).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourBucket {
    pub label: String,
    pub start_time: String,
    pub end_time: String,
    pub first_slot: usize,
    pub total_overlap: u32,
    pub max_overlap: u32,
    pub busy_slots: usize,
}

/// Top hour buckets by `(total, max)` descending. Buckets are consecutive
/// six-slot chunks; a short final chunk is still labelled start + 60 minutes.
/// Ties keep slot order.
pub fn busiest_hours(grid: &SlotGrid, counts: &[u32]) -> Vec<HourBucket> {
    let mut buckets: Vec<HourBucket> = grid
        .slots()
        .chunks(SLOTS_PER_HOUR)
        .filter_map(|chunk| {
            let first = chunk.first()?;
            let values = counts.get(first.index..first.index + chunk.len())?;
            let start_time = clock::minutes_to_time(first.start_minute);
            let end_time = clock::minutes_to_time(first.start_minute + 60);
            Some(HourBucket {
                label: format!("{start_time} - {end_time}"),
                start_time,
                end_time,
                first_slot: first.index,
                total_overlap: values.iter().sum(),
                max_overlap: values.iter().copied().max().unwrap_or(0),
                busy_slots: values.iter().filter(|c| **c > 0).count(),
            })
        })
        .collect();
    // stable sort
    buckets.sort_by(|a, b| (b.total_overlap, b.max_overlap).cmp(&(a.total_overlap, a.max_overlap)));
    buckets.truncate(BUSIEST_HOURS_LIMIT);
    buckets
}

/// Worst single-slot concurrency over all location-date groups, each group
/// evaluated on its own (pooling dates would over-count).
pub fn max_overlap_across_groups<'a, I>(reservations: I, grid: &SlotGrid) -> u32
where
    I: IntoIterator<Item = &'a Reservation>,
{
    group_reservations(reservations)
        .par_iter()
        .map(|(_, members)| occupancy_row(members.iter().copied(), grid).into_iter().max().unwrap_or(0))
        .max()
        .unwrap_or(0)
}
