use reservoscope::analytics::{self, Run};
use reservoscope::parser::{self, RawRecord, Reservation};
use reservoscope::slots::SlotGrid;
use std::num::NonZeroU32;

fn res(location: &str, id: i64, datetime: &str) -> Reservation {
    parser::normalize(&RawRecord::new(location, id, datetime)).reservation
}

#[test]
fn single_run_at_cap() {
    let runs = analytics::find_runs(&[0u32, 1, 2, 2, 2, 1, 0], 2);
    assert_eq!(runs, vec![Run { start: 2, end: 5 }]);
    assert_eq!(runs[0].len(), 3);
}

#[test]
fn runs_are_maximal_and_cover_every_hot_slot() {
    let values = [3u32, 3, 0, 5, 1, 4, 4, 4];
    let runs = analytics::find_runs(&values, 3);
    assert_eq!(runs, vec![Run { start: 0, end: 2 }, Run { start: 3, end: 4 }, Run { start: 5, end: 8 }]);
    for (i, v) in values.iter().enumerate() {
        let hits = runs.iter().filter(|r| (r.start..r.end).contains(&i)).count();
        assert_eq!(hits, usize::from(*v >= 3), "slot {i}");
    }
    for w in runs.windows(2) {
        assert!(w[0].end < w[1].start);
    }
    assert_eq!(analytics::find_runs(&values, 3), runs);
}

#[test]
fn fractional_rows_use_the_same_detector() {
    let runs = analytics::find_runs(&[0.5f64, 1.0, 1.5, 0.9], 1.0);
    assert_eq!(runs, vec![Run { start: 1, end: 3 }]);
    assert!(analytics::find_runs::<u32>(&[], 1).is_empty());
}

#[test]
fn weekly_threshold_is_one_below_cap() {
    let cap = |n| NonZeroU32::new(n).unwrap();
    assert_eq!(analytics::weekly_threshold(cap(40)), 39);
    assert_eq!(analytics::weekly_threshold(cap(2)), 1);
    assert_eq!(analytics::weekly_threshold(cap(1)), 1);
}

#[test]
fn busiest_hours_rank_by_total_then_max() {
    let grid = SlotGrid::for_hours(8, 14).unwrap();
    let mut counts = vec![0u32; grid.len()];
    // 08:00 hour: total 6, max 1
    counts[0..6].copy_from_slice(&[1, 1, 1, 1, 1, 1]);
    // 09:00 hour: total 6, max 3
    counts[6..12].copy_from_slice(&[3, 3, 0, 0, 0, 0]);
    // 10:00 hour: total 2
    counts[12] = 2;
    // 12:00 hour: total 2, same as 10:00
    counts[24] = 2;
    // 13:00 hour: total 1
    counts[30] = 1;

    let top = analytics::busiest_hours(&grid, &counts);
    assert_eq!(top.len(), 4);
    let labels: Vec<&str> = top.iter().map(|b| b.label.as_str()).collect();
    assert_eq!(labels, vec!["09:00 - 10:00", "08:00 - 09:00", "10:00 - 11:00", "12:00 - 13:00"]);
    assert_eq!(top[0].total_overlap, 6);
    assert_eq!(top[0].max_overlap, 3);
    assert_eq!(top[0].busy_slots, 2);
    assert_eq!(top[0].first_slot, 6);
}

#[test]
fn busiest_hours_on_empty_counts_keeps_slot_order() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    let top = analytics::busiest_hours(&grid, &vec![0; grid.len()]);
    assert_eq!(top.iter().map(|b| b.start_time.as_str()).collect::<Vec<_>>(), vec!["08:00", "09:00", "10:00", "11:00"]);
    assert!(top.iter().all(|b| b.total_overlap == 0));
}

#[test]
fn max_overlap_is_per_group_not_pooled() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    let rs = vec![
        res("Denver", 1, "9/28/25 9:30 AM"),
        res("Denver", 2, "9/28/25 9:35 AM"),
        res("Denver", 3, "9/29/25 9:30 AM"),
        res("Denver", 4, "9/30/25 9:30 AM"),
    ];
    // pooled would reach 4 at 09:10
    assert_eq!(analytics::max_overlap_across_groups(&rs, &grid), 2);
    assert_eq!(analytics::max_overlap_across_groups(std::iter::empty(), &grid), 0);
}
