//! Morning/afternoon slot derivations
//!
//! Both groupings are pure functions of the availability set. `SlotMemo`
//! caches them against the identity of the `Arc` holding that set, so a new
//! fetch result always produces a fresh grouping and re-reads are free.

use crate::api::AvailabilitySlot;
use std::sync::Arc;

/// First afternoon hour
pub const NOON: u8 = 12;

/// Which half of the day a slot falls in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPeriod {
    Morning,
    Afternoon,
}

impl DayPeriod {
    pub fn of(hour: u8) -> Self {
        if hour < NOON {
            DayPeriod::Morning
        } else {
            DayPeriod::Afternoon
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "Morning",
            DayPeriod::Afternoon => "Afternoon",
        }
    }
}

/// A slot ready for display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotView {
    pub hour: u8,
    pub hour_formatted: String,
    pub available: bool,
}

impl From<&AvailabilitySlot> for SlotView {
    fn from(slot: &AvailabilitySlot) -> Self {
        Self {
            hour: slot.hour,
            hour_formatted: format_hour(slot.hour),
            available: slot.available,
        }
    }
}

/// "HH:00", zero padded, 24-hour clock
pub fn format_hour(hour: u8) -> String {
    format!("{:02}:00", hour)
}

fn derive(slots: &[AvailabilitySlot], period: DayPeriod) -> Vec<SlotView> {
    slots
        .iter()
        .filter(|slot| DayPeriod::of(slot.hour) == period)
        .map(SlotView::from)
        .collect()
}

/// Slots before noon, in source order
pub fn derive_morning_slots(slots: &[AvailabilitySlot]) -> Vec<SlotView> {
    derive(slots, DayPeriod::Morning)
}

/// Slots from noon on, in source order
pub fn derive_afternoon_slots(slots: &[AvailabilitySlot]) -> Vec<SlotView> {
    derive(slots, DayPeriod::Afternoon)
}

/// Both halves of one availability set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaySchedule {
    pub morning: Vec<SlotView>,
    pub afternoon: Vec<SlotView>,
}

impl DaySchedule {
    pub fn from_slots(slots: &[AvailabilitySlot]) -> Self {
        Self {
            morning: derive_morning_slots(slots),
            afternoon: derive_afternoon_slots(slots),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.morning.is_empty() && self.afternoon.is_empty()
    }
}

/// Grouping cached on the identity of the source set
#[derive(Debug, Default)]
pub struct SlotMemo {
    source: Option<Arc<[AvailabilitySlot]>>,
    schedule: Arc<DaySchedule>,
}

impl SlotMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grouping for `slots`, recomputed only when a different set is passed
    pub fn get(&mut self, slots: &Arc<[AvailabilitySlot]>) -> Arc<DaySchedule> {
        let fresh = match &self.source {
            Some(source) => !Arc::ptr_eq(source, slots),
            None => true,
        };

        if fresh {
            self.schedule = Arc::new(DaySchedule::from_slots(slots));
            self.source = Some(Arc::clone(slots));
        }

        Arc::clone(&self.schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(entries: &[(u8, bool)]) -> Vec<AvailabilitySlot> {
        entries
            .iter()
            .map(|&(hour, available)| AvailabilitySlot::new(hour, available))
            .collect()
    }

    #[test]
    fn test_format_hour() {
        assert_eq!(format_hour(0), "00:00");
        assert_eq!(format_hour(9), "09:00");
        assert_eq!(format_hour(14), "14:00");
        assert_eq!(format_hour(23), "23:00");
    }

    #[test]
    fn test_format_every_hour_is_five_chars() {
        for hour in 0..=23u8 {
            let text = format_hour(hour);
            assert_eq!(text.len(), 5);
            assert!(text.ends_with(":00"));
            assert_eq!(text[..2].parse::<u8>().unwrap(), hour);
        }
    }

    #[test]
    fn test_partition_by_noon() {
        let source = slots(&[(8, true), (11, false), (12, true), (17, false)]);
        let morning = derive_morning_slots(&source);
        let afternoon = derive_afternoon_slots(&source);

        assert_eq!(morning.iter().map(|s| s.hour).collect::<Vec<_>>(), vec![8, 11]);
        assert_eq!(afternoon.iter().map(|s| s.hour).collect::<Vec<_>>(), vec![12, 17]);
        assert_eq!(morning.len() + afternoon.len(), source.len());
        assert!(!morning[1].available);
        assert_eq!(afternoon[0].hour_formatted, "12:00");
    }

    #[test]
    fn test_partition_keeps_source_order() {
        // not sorted on purpose
        let source = slots(&[(15, true), (9, true), (13, false), (8, true)]);
        let morning = derive_morning_slots(&source);
        let afternoon = derive_afternoon_slots(&source);
        assert_eq!(morning.iter().map(|s| s.hour).collect::<Vec<_>>(), vec![9, 8]);
        assert_eq!(afternoon.iter().map(|s| s.hour).collect::<Vec<_>>(), vec![15, 13]);
    }

    #[test]
    fn test_empty_set() {
        let schedule = DaySchedule::from_slots(&[]);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_memo_reuses_same_set() {
        let mut memo = SlotMemo::new();
        let source: Arc<[AvailabilitySlot]> = slots(&[(9, true), (14, true)]).into();

        let first = memo.get(&source);
        let second = memo.get(&source);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.morning.len(), 1);
    }

    #[test]
    fn test_memo_recomputes_for_new_set() {
        let mut memo = SlotMemo::new();
        let first_set: Arc<[AvailabilitySlot]> = slots(&[(9, true)]).into();
        let second_set: Arc<[AvailabilitySlot]> = slots(&[(9, true)]).into();

        let first = memo.get(&first_set);
        let second = memo.get(&second_set);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
    }
}
