use crate::parser::{GroupKey, Reservation};
use crate::slots::{HoursWindow, SlotGrid, TimeSlot};
use chrono::NaiveDate;
use serde::Serialize;
use std::ops::Range;

/// Symmetric buffer applied around every reservation's point in time.
pub const BUFFER_MINUTES: i64 = 30;

/// Half-open `[start, end)` minutes; `start` may be negative near midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BufferedInterval {
    pub start: i64,
    pub end: i64,
}

impl BufferedInterval {
    pub fn around(minute: u32) -> Self {
        let m = minute as i64;
        Self { start: m - BUFFER_MINUTES, end: m + BUFFER_MINUTES }
    }

    pub fn of(reservation: &Reservation) -> Self {
        Self::around(reservation.minute)
    }

    pub fn intersects(&self, window: HoursWindow) -> bool {
        self.end > window.start_minute() as i64 && self.start < window.end_minute() as i64
    }

    pub fn covers(&self, minute: u32) -> bool {
        let m = minute as i64;
        self.start <= m && m < self.end
    }
}

/// Indices of the slots whose start minute lies inside `interval`.
pub fn slot_span(interval: BufferedInterval, grid: &SlotGrid) -> Range<usize> {
    grid.first_index_at_or_after(interval.start)..grid.first_index_at_or_after(interval.end)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub id: i64,
    pub date: Option<NaiveDate>,
    pub minute: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotOccupancy {
    pub slot: TimeSlot,
    pub count: u32,
    pub reservations: Vec<Attribution>,
}

#[derive(Debug, Clone)]
pub struct OverlapResult<'a> {
    pub slots: Vec<SlotOccupancy>,
    /// Reservations whose buffered interval touches the window, in input order.
    pub in_range: Vec<&'a Reservation>,
    /// Reservations in scope but entirely outside the window.
    pub hidden: usize,
}

impl OverlapResult<'_> {
    pub fn counts(&self) -> Vec<u32> {
        self.slots.iter().map(|s| s.count).collect()
    }

    pub fn max_count(&self) -> u32 {
        self.slots.iter().map(|s| s.count).max().unwrap_or(0)
    }
}

/// Per-slot occupancy for `reservations`, optionally restricted to one group.
///
/// The group filter runs before range checks and attribution so a single-date
/// view and the per-group rows always agree.
pub fn compute_occupancy<'a, I>(
    reservations: I,
    grid: &SlotGrid,
    group: Option<&GroupKey>,
) -> OverlapResult<'a>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut slots: Vec<SlotOccupancy> = grid
        .slots()
        .iter()
        .map(|&slot| SlotOccupancy { slot, count: 0, reservations: Vec::new() })
        .collect();

    let mut scoped = 0usize;
    let mut in_range = Vec::new();
    for r in reservations {
        if group.is_some_and(|key| !key.contains(r)) { continue; }
        scoped += 1;
        let interval = BufferedInterval::of(r);
        if !interval.intersects(grid.window()) { continue; }
        for i in slot_span(interval, grid) {
            let s = &mut slots[i];
            s.count += 1;
            s.reservations.push(Attribution { id: r.id, date: r.date, minute: r.minute });
        }
        in_range.push(r);
    }
    let hidden = scoped - in_range.len();
    tracing::debug!(scoped, in_range = in_range.len(), hidden, "computed slot occupancy");
    OverlapResult { slots, in_range, hidden }
}

/// Counts-only occupancy row. Reservations outside the window contribute nothing.
pub fn occupancy_row<'a, I>(reservations: I, grid: &SlotGrid) -> Vec<u32>
where
    I: IntoIterator<Item = &'a Reservation>,
{
    let mut row = vec![0u32; grid.len()];
    for r in reservations {
        for i in slot_span(BufferedInterval::of(r), grid) {
            row[i] += 1;
        }
    }
    row
}
