use crate::clock;
use crate::error::ConfigError;
use serde::Serialize;

pub const SLOT_MINUTES: u32 = 10;
pub const SLOTS_PER_HOUR: usize = (60 / SLOT_MINUTES) as usize;

/// Validated operating-hours window `[start_hour, end_hour)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct HoursWindow {
    start_hour: u8,
    end_hour: u8,
}

impl HoursWindow {
    pub fn new(start_hour: u8, end_hour: u8) -> Result<Self, ConfigError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(ConfigError::InvalidHours { start: start_hour, end: end_hour });
        }
        Ok(Self { start_hour, end_hour })
    }

    pub fn start_hour(&self) -> u8 { self.start_hour }
    pub fn end_hour(&self) -> u8 { self.end_hour }

    pub fn start_minute(&self) -> u32 { self.start_hour as u32 * 60 }
    pub fn end_minute(&self) -> u32 { self.end_hour as u32 * 60 }

    pub fn slot_count(&self) -> usize {
        (self.end_hour - self.start_hour) as usize * SLOTS_PER_HOUR
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    pub index: usize,
    pub start_minute: u32,
}

impl TimeSlot {
    pub fn label(&self) -> String {
        clock::minutes_to_time(self.start_minute)
    }
}

pub fn build_slots(window: HoursWindow) -> Vec<TimeSlot> {
    let start = window.start_minute();
    (0..window.slot_count())
        .map(|index| TimeSlot { index, start_minute: start + index as u32 * SLOT_MINUTES })
        .collect()
}

/// Ordered 10-minute slots for one operating-hours window. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotGrid {
    window: HoursWindow,
    slots: Vec<TimeSlot>,
}

impl SlotGrid {
    pub fn new(window: HoursWindow) -> Self {
        Self { window, slots: build_slots(window) }
    }

    pub fn for_hours(start_hour: u8, end_hour: u8) -> Result<Self, ConfigError> {
        Ok(Self::new(HoursWindow::new(start_hour, end_hour)?))
    }

    pub fn window(&self) -> HoursWindow { self.window }
    pub fn slots(&self) -> &[TimeSlot] { &self.slots }
    pub fn len(&self) -> usize { self.slots.len() }
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    pub fn labels(&self) -> Vec<String> {
        self.slots.iter().map(TimeSlot::label).collect()
    }

    /// Index of the first slot starting at or after `minute` (may equal `len()`).
    pub fn first_index_at_or_after(&self, minute: i64) -> usize {
        let offset = minute - self.window.start_minute() as i64;
        if offset <= 0 {
            return 0;
        }
        let step = SLOT_MINUTES as i64;
        let idx = (offset + step - 1) / step;
        (idx as usize).min(self.slots.len())
    }
}
