use reservoscope::error::ConfigError;
use reservoscope::slots::{HoursWindow, SlotGrid};

#[test]
fn eight_to_six_has_sixty_slots() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    assert_eq!(grid.len(), 60);
    let labels = grid.labels();
    assert_eq!(labels.first().map(String::as_str), Some("08:00"));
    assert_eq!(labels.last().map(String::as_str), Some("17:50"));
    assert!(grid.slots().iter().enumerate().all(|(i, s)| s.index == i));
}

#[test]
fn full_day_window() {
    let grid = SlotGrid::for_hours(0, 24).unwrap();
    assert_eq!(grid.len(), 144);
    assert_eq!(grid.slots()[143].label(), "23:50");
}

#[test]
fn rejects_invalid_hours() {
    for (s, e) in [(18, 8), (9, 9), (0, 25)] {
        match HoursWindow::new(s, e) {
            Err(ConfigError::InvalidHours { start, end }) => assert_eq!((start, end), (s, e)),
            other => panic!("expected InvalidHours for {s}..{e}, got {other:?}"),
        }
    }
}

#[test]
fn first_index_rounds_up_and_clamps() {
    let grid = SlotGrid::for_hours(8, 18).unwrap();
    assert_eq!(grid.first_index_at_or_after(-30), 0);
    assert_eq!(grid.first_index_at_or_after(480), 0);
    assert_eq!(grid.first_index_at_or_after(481), 1);
    assert_eq!(grid.first_index_at_or_after(490), 1);
    assert_eq!(grid.first_index_at_or_after(2000), 60);
}
