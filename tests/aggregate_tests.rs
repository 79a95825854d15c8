use reservoscope::aggregate;
use reservoscope::parser::{self, DayOfWeek, RawRecord, Reservation};
use reservoscope::slots::SlotGrid;
use std::num::NonZeroU32;

fn res(location: &str, id: i64, datetime: &str) -> Reservation {
    parser::normalize(&RawRecord::new(location, id, datetime)).reservation
}

#[test]
fn groups_by_location_and_date_in_date_order() {
    let rs = vec![
        res("Denver", 1, "9/30/25 9:00 AM"),
        res("Denver", 2, "9/28/25 9:00 AM"),
        res("Denver", 3, "garbled"),
        res("Denver", 4, "9/28/25 3:00 PM"),
    ];
    let groups = aggregate::group_reservations(&rs);
    let labels: Vec<(String, usize)> = groups.iter().map(|(k, m)| (k.label(), m.len())).collect();
    assert_eq!(labels, vec![("".to_string(), 1), ("9/28".to_string(), 2), ("9/30".to_string(), 1)]);
    // members keep input order
    assert_eq!(groups[1].1.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2, 4]);
}

#[test]
fn date_rows_count_each_group_independently() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    let rs = vec![res("Denver", 1, "9/28/25 9:30 AM"), res("Denver", 2, "9/29/25 9:30 AM")];
    let refs: Vec<&Reservation> = rs.iter().collect();
    let rows = aggregate::date_rows(&refs, &grid);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].label, "9/28");
    assert_eq!(rows[0].day, Some(DayOfWeek::Sunday));
    assert_eq!(rows[1].day, Some(DayOfWeek::Monday));
    assert!(rows.iter().all(|r| r.values.iter().copied().max() == Some(1)));
}

#[test]
fn average_rounds_half_away_from_zero() {
    let a = [1u32, 2, 0, 4];
    let b = [2u32, 3, 1, 4];
    let avg = aggregate::average_row([&a[..], &b[..]], 4);
    assert_eq!(avg.groups, 2);
    assert_eq!(avg.values, vec![2, 3, 1, 4]);
}

#[test]
fn average_of_no_groups_is_all_zero() {
    let avg = aggregate::average_row(std::iter::empty::<&[u32]>(), 60);
    assert_eq!(avg.groups, 0);
    assert_eq!(avg.values, vec![0; 60]);
}

#[test]
fn weekday_rows_divide_by_distinct_dates() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    let rs = vec![
        res("Denver", 1, "9/28/25 9:30 AM"),
        res("Denver", 2, "9/28/25 9:30 AM"),
        res("Denver", 3, "10/5/25 9:30 AM"),
        res("Denver", 4, "bad"),
    ];
    let refs: Vec<&Reservation> = rs.iter().collect();
    let rows = aggregate::weekday_rows(&refs, &grid);
    assert_eq!(rows.len(), 7);
    assert_eq!(rows.iter().map(|r| r.day).collect::<Vec<_>>(), DayOfWeek::ALL.to_vec());

    let sunday = &rows[DayOfWeek::Sunday.index()];
    assert_eq!(sunday.dates_observed, 2);
    assert_eq!(sunday.hits[6], 3);
    assert_eq!(sunday.values[6], 1.5);
    assert_eq!(sunday.values[0], 0.0);

    let monday = &rows[DayOfWeek::Monday.index()];
    assert_eq!(monday.dates_observed, 0);
    assert!(monday.values.iter().all(|v| *v == 0.0));
}

#[test]
fn utilization_is_percent_of_cap_over_observed_days() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    let rs = vec![
        res("Denver", 1, "9/28/25 9:30 AM"),
        res("Denver", 2, "9/28/25 9:30 AM"),
        res("Denver", 3, "9/29/25 9:30 AM"),
    ];
    let refs: Vec<&Reservation> = rs.iter().collect();
    let rows = aggregate::weekday_rows(&refs, &grid);
    let cap = NonZeroU32::new(2).unwrap();
    let util = aggregate::utilization(&rows, cap);

    let sunday = &util.days[DayOfWeek::Sunday.index()];
    assert!(sunday.observed);
    assert_eq!(sunday.per_slot[6], 100.0);
    // six of sixty slots at 100%
    assert!((sunday.mean - 10.0).abs() < 1e-9);

    let monday = &util.days[DayOfWeek::Monday.index()];
    assert_eq!(monday.per_slot[6], 50.0);
    assert!(!util.days[DayOfWeek::Friday.index()].observed);

    assert_eq!(util.row[6], 75.0);
    assert!((util.overall - 7.5).abs() < 1e-9);
    assert!((aggregate::percent_of_cap(3.0, NonZeroU32::new(40).unwrap()) - 7.5).abs() < 1e-9);
}
