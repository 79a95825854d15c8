use crate::aggregate::{self, DateRow, WeekdayRow};
use crate::analytics::{self, HourBucket, Run};
use crate::capacity::CapacityPolicy;
use crate::error::ConfigError;
use crate::overlap;
use crate::parser::{DayOfWeek, GroupKey, Reservation};
use crate::slots::{HoursWindow, SlotGrid};
use chrono::NaiveDate;
use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;

const MAX_ERROR_SAMPLES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub location: String,
    pub window: HoursWindow,
    /// Restrict every row to one location-date group
    pub group: Option<GroupKey>,
    /// Feed unparsable records (minute 0, no date) into the engine
    pub include_unparsed: bool,
}

impl AnalysisRequest {
    pub fn new(location: impl Into<String>, window: HoursWindow) -> Self {
        Self { location: location.into(), window, group: None, include_unparsed: true }
    }

    pub fn for_hours(location: impl Into<String>, start_hour: u8, end_hour: u8) -> Result<Self, ConfigError> {
        Ok(Self::new(location, HoursWindow::new(start_hour, end_hour)?))
    }

    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.group = Some(GroupKey::new(self.location.clone(), date));
        self
    }

    pub fn include_unparsed(mut self, include: bool) -> Self {
        self.include_unparsed = include;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub location: String,
    pub capacity: u32,
    pub start_hour: u8,
    pub end_hour: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<String>,
    pub total_records: usize,
    pub in_range: usize,
    /// Records whose buffered interval misses the operating hours entirely
    pub hidden: usize,
    pub degenerate: usize,
    pub date_groups: usize,
    pub max_overlap: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotOut {
    pub index: usize,
    pub time: String,
    pub minute: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateRowOut {
    pub label: String,
    pub date: Option<NaiveDate>,
    pub day: Option<DayOfWeek>,
    pub reservations: usize,
    pub values: Vec<u32>,
    pub over_capacity: Vec<Run>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AverageOut {
    pub groups: usize,
    pub values: Vec<u32>,
    pub over_capacity: Vec<Run>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekdayOut {
    pub day: DayOfWeek,
    pub dates_observed: usize,
    pub values: Vec<f64>,
    pub utilization: Vec<f64>,
    pub mean_utilization: f64,
    pub over_threshold: Vec<Run>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyOut {
    pub threshold: u32,
    pub rows: Vec<WeekdayOut>,
    pub utilization_row: Vec<f64>,
    pub overall_utilization: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorsOut {
    pub degenerate: usize,
    pub samples: Vec<ErrorSample>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSample {
    pub id: i64,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub summary: Summary,
    pub slots: Vec<SlotOut>,
    pub date_rows: Vec<DateRowOut>,
    pub average: AverageOut,
    pub weekly: WeeklyOut,
    pub busiest_hours: Vec<HourBucket>,
    pub errors: ErrorsOut,
}

/// Sorted, de-duplicated location names.
pub fn locations(reservations: &[Reservation]) -> Vec<String> {
    reservations.iter().map(|r| r.location.clone()).unique().sorted().collect()
}

fn date_row_out(row: DateRow, cap: u32) -> DateRowOut {
    DateRowOut {
        over_capacity: analytics::find_runs(&row.values, cap),
        label: row.label,
        date: row.key.date,
        day: row.day,
        reservations: row.reservations,
        values: row.values,
    }
}

fn weekly_out(rows: Vec<WeekdayRow>, policy_cap: std::num::NonZeroU32) -> WeeklyOut {
    let threshold = analytics::weekly_threshold(policy_cap);
    let util = aggregate::utilization(&rows, policy_cap);
    let rows = rows
        .into_iter()
        .zip(util.days)
        .map(|(row, u)| WeekdayOut {
            over_threshold: analytics::find_runs(&row.values, threshold as f64),
            day: row.day,
            dates_observed: row.dates_observed,
            values: row.values,
            utilization: u.per_slot,
            mean_utilization: u.mean,
        })
        .collect();
    WeeklyOut { threshold, rows, utilization_row: util.row, overall_utilization: util.overall }
}

/// Run the full pipeline for one location. Pure: the same reservations,
/// policy and request always give the same report.
pub fn analyze(reservations: &[Reservation], policy: &CapacityPolicy, request: &AnalysisRequest) -> Report {
    let grid = SlotGrid::new(request.window);
    let cap = policy.cap_for(&request.location);

    let at_location: Vec<&Reservation> = reservations.iter().filter(|r| r.location == request.location).collect();
    let degenerate: Vec<&Reservation> = at_location
        .iter()
        .copied()
        .filter(|r| r.is_degenerate() && request.group.as_ref().map_or(true, |k| k.contains(r)))
        .collect();
    if !degenerate.is_empty() {
        tracing::warn!(location = %request.location, count = degenerate.len(), "reservations with unparsable datetimes");
    }
    let scoped: Vec<&Reservation> = at_location
        .iter()
        .copied()
        .filter(|r| request.include_unparsed || !r.is_degenerate())
        .collect();

    let occ = overlap::compute_occupancy(scoped.iter().copied(), &grid, request.group.as_ref());
    let counts = occ.counts();
    if occ.hidden > 0 {
        tracing::debug!(location = %request.location, hidden = occ.hidden, "reservations outside operating hours");
    }

    let rows = aggregate::date_rows(&occ.in_range, &grid);
    let average = aggregate::average_row(rows.iter().map(|r| r.values.as_slice()), grid.len());
    let weekday = aggregate::weekday_rows(&occ.in_range, &grid);
    let max_overlap = analytics::max_overlap_across_groups(
        scoped.iter().copied().filter(|r| request.group.as_ref().map_or(true, |k| k.contains(r))),
        &grid,
    );

    let summary = Summary {
        location: request.location.clone(),
        capacity: cap.get(),
        start_hour: request.window.start_hour(),
        end_hour: request.window.end_hour(),
        date_filter: request.group.as_ref().map(|k| k.label()),
        total_records: occ.in_range.len() + occ.hidden,
        in_range: occ.in_range.len(),
        hidden: occ.hidden,
        degenerate: degenerate.len(),
        date_groups: rows.len(),
        max_overlap,
    };

    Report {
        summary,
        slots: grid.slots().iter().map(|s| SlotOut { index: s.index, time: s.label(), minute: s.start_minute }).collect(),
        average: AverageOut {
            over_capacity: analytics::find_runs(&average.values, cap.get()),
            groups: average.groups,
            values: average.values,
        },
        date_rows: rows.into_iter().map(|r| date_row_out(r, cap.get())).collect(),
        weekly: weekly_out(weekday, cap),
        busiest_hours: analytics::busiest_hours(&grid, &counts),
        errors: ErrorsOut {
            degenerate: degenerate.len(),
            samples: degenerate
                .iter()
                .take(MAX_ERROR_SAMPLES)
                .map(|r| ErrorSample { id: r.id, kind: "unparsable_datetime".into() })
                .collect(),
        },
    }
}

/// One report per location, computed in parallel, ordered by location name.
pub fn analyze_locations(
    reservations: &[Reservation],
    policy: &CapacityPolicy,
    window: HoursWindow,
    include_unparsed: bool,
) -> Vec<Report> {
    locations(reservations)
        .into_par_iter()
        .map(|location| {
            let request = AnalysisRequest::new(location, window).include_unparsed(include_unparsed);
            analyze(reservations, policy, &request)
        })
        .collect()
}
