#[cfg(test)]
mod tests {
    use crate::logic::{calculate_time_slots, BookingRules};
    use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
    use proptest::prelude::*;
    use slotbook_common::CalendarEvent;

    fn date_from_offset(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap() + Duration::days(offset)
    }

    fn midnight(date: NaiveDate) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), 0, 0, 0)
            .unwrap()
    }

    // Events start at arbitrary minutes between 08:00 and 19:00.
    fn create_events(date: NaiveDate, starts: &[i64], length: i64) -> Vec<CalendarEvent> {
        let base = midnight(date) + Duration::hours(8);
        let mut events: Vec<_> = starts
            .iter()
            .map(|m| {
                let start = base + Duration::minutes(*m);
                CalendarEvent::new(start, start + Duration::minutes(length))
            })
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    // Grid-aligned starts, so some of them hit slots exactly.
    fn aligned_events(rules: &BookingRules, date: NaiveDate, indices: &[usize]) -> Vec<CalendarEvent> {
        let grid: Vec<_> = rules.slot_grid(date).collect();
        let mut events: Vec<_> = indices
            .iter()
            .filter_map(|i| grid.get(*i))
            .map(|slot| CalendarEvent::new(slot.start_time, slot.end_time))
            .collect();
        events.sort_by_key(|e| e.start);
        events
    }

    proptest! {
        // Every offered slot sits on the grid, inside operating hours and beyond the lead time
        #[test]
        fn test_slots_on_grid_and_within_hours(
            day_offset in 0..365i64,
            now_offset_hours in -72..72i64,
            starts in proptest::collection::vec(0..660i64, 0..10),
            length in 5..120i64,
        ) {
            let rules = BookingRules::default();
            let date = date_from_offset(day_offset);
            let now = midnight(date) + Duration::hours(now_offset_hours);
            let events = create_events(date, &starts, length);

            let slots = calculate_time_slots(date, &events, now, &rules);

            if !rules.is_working_day(date.weekday()) {
                prop_assert!(slots.is_empty());
            }
            let opening = rules.opening(date);
            for slot in &slots {
                prop_assert_eq!(slot.end_time - slot.start_time, rules.appointment);
                prop_assert!(slot.start_time >= opening);
                prop_assert!(slot.end_time < rules.closing(date));
                let offset = (slot.start_time - opening).num_minutes();
                prop_assert_eq!(offset % rules.stride().num_minutes(), 0);
                prop_assert!(slot.start_time - now >= rules.lead_time);
            }
        }

        // No slot shares its start with an event, and slots come out ascending
        #[test]
        fn test_slots_never_start_with_an_event(
            day_offset in 0..365i64,
            indices in proptest::collection::vec(0..12usize, 0..12),
        ) {
            let rules = BookingRules::default();
            let date = date_from_offset(day_offset);
            let now = midnight(date) - Duration::days(7);
            let events = aligned_events(&rules, date, &indices);

            let slots = calculate_time_slots(date, &events, now, &rules);

            for slot in &slots {
                prop_assert!(events.iter().all(|e| e.start != slot.start_time));
            }
            for pair in slots.windows(2) {
                prop_assert!(pair[0].start_time < pair[1].start_time);
            }
            if rules.is_working_day(date.weekday()) {
                let mut distinct = indices.clone();
                distinct.sort_unstable();
                distinct.dedup();
                prop_assert_eq!(slots.len(), 12 - distinct.len());
            }
        }

        // A later "now" or extra events can only remove slots
        #[test]
        fn test_slots_shrink_monotonically(
            day_offset in 0..365i64,
            now_offset_hours in -48..48i64,
            later_by_minutes in 0..1440i64,
            indices in proptest::collection::vec(0..12usize, 0..6),
            extra in proptest::collection::vec(0..12usize, 0..6),
        ) {
            let rules = BookingRules::default();
            let date = date_from_offset(day_offset);
            let now = midnight(date) + Duration::hours(now_offset_hours);
            let events = aligned_events(&rules, date, &indices);

            let base = calculate_time_slots(date, &events, now, &rules);

            let later = calculate_time_slots(date, &events, now + Duration::minutes(later_by_minutes), &rules);
            prop_assert!(later.iter().all(|s| base.contains(s)));

            let mut more_indices = indices.clone();
            more_indices.extend(extra);
            let more_events = aligned_events(&rules, date, &more_indices);
            let busier = calculate_time_slots(date, &more_events, now, &rules);
            prop_assert!(busier.iter().all(|s| base.contains(s)));
        }
    }
}
