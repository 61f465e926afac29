//! Month grid construction and month arithmetic.
//!
//! A grid always covers whole Sunday-to-Saturday weeks: from the week holding
//! the 1st of the month to the week holding its last day.

use std::iter;

use time::{Date, Duration, Month};

use crate::calendar::{CalendarEvent, aggregate::events_on};

/// Events rendered per cell before collapsing into an overflow count.
pub const MAX_VISIBLE_EVENTS: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: Date,
    pub is_current_month: bool,
    pub is_today: bool,
    pub events: Vec<CalendarEvent>,
}

impl DayCell {
    pub fn visible_events(&self, cap: usize) -> &[CalendarEvent] {
        &self.events[..self.events.len().min(cap)]
    }

    pub fn overflow_count(&self, cap: usize) -> usize {
        self.events.len().saturating_sub(cap)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    month: Date,
    cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn build(reference: Date, today: Date, events: &[CalendarEvent]) -> Self {
        let month = start_of_month(reference);
        let first = start_of_week(month);
        let last = end_of_week(end_of_month(month));

        let cells = iter::successors(Some(first), |day| day.next_day())
            .take_while(|day| *day <= last)
            .map(|day| DayCell {
                date: day,
                is_current_month: same_month(day, month),
                is_today: day == today,
                events: events_on(events, day).cloned().collect(),
            })
            .collect();

        MonthGrid { month, cells }
    }

    /// First day of the month this grid was built for.
    pub fn month(&self) -> Date {
        self.month
    }

    pub fn cells(&self) -> &[DayCell] {
        &self.cells
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, day: Date) -> Option<&DayCell> {
        self.cells.iter().find(|cell| cell.date == day)
    }
}

pub fn days_in_month(year: i32, month: Month) -> u8 {
    match month {
        Month::February if time::util::is_leap_year(year) => 29,
        Month::February => 28,
        Month::April | Month::June | Month::September | Month::November => 30,
        _ => 31,
    }
}

pub fn start_of_month(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

pub fn end_of_month(date: Date) -> Date {
    let start = start_of_month(date);
    start + Duration::days(i64::from(days_in_month(date.year(), date.month())) - 1)
}

pub fn start_of_week(date: Date) -> Date {
    date - Duration::days(i64::from(date.weekday().number_days_from_sunday()))
}

pub fn end_of_week(date: Date) -> Date {
    date + Duration::days(6 - i64::from(date.weekday().number_days_from_sunday()))
}

pub fn same_month(a: Date, b: Date) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Moves by whole calendar months, clamping the day to the target month's length.
pub fn shift_months(date: Date, months: i32) -> Date {
    let mut start = start_of_month(date);
    for _ in 0..months.unsigned_abs() {
        start = if months > 0 {
            end_of_month(start) + Duration::days(1)
        } else {
            start_of_month(start - Duration::days(1))
        };
    }
    let day = date.day().min(days_in_month(start.year(), start.month()));
    start + Duration::days(i64::from(day) - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::aggregate::aggregate;
    use crate::core::db::{Phase, Project};
    use time::macros::date;

    fn milestone_on(id: i64, day: Date) -> Project {
        Project {
            id,
            name: format!("Project {id}"),
            description: String::new(),
            target_date: day,
            phase: Phase::Installation,
            client_id: None,
        }
    }

    #[test]
    fn grid_spans_whole_weeks() {
        for reference in [
            date!(2024 - 02 - 14),
            date!(2024 - 05 - 01),
            date!(2024 - 06 - 30),
            date!(2026 - 02 - 01),
            date!(2023 - 12 - 25),
        ] {
            let grid = MonthGrid::build(reference, reference, &[]);
            assert_eq!(grid.cells().len() % 7, 0, "{reference}");
            assert!((28..=42).contains(&grid.cells().len()), "{reference}");
            assert!(grid.cell(start_of_month(reference)).is_some());
            assert!(grid.cell(end_of_month(reference)).is_some());
            assert_eq!(grid.cells()[0].date.weekday(), time::Weekday::Sunday);
        }
    }

    #[test]
    fn february_2026_fits_four_weeks() {
        let grid = MonthGrid::build(date!(2026 - 02 - 10), date!(2026 - 02 - 10), &[]);
        assert_eq!(grid.cells().len(), 28);
        assert!(grid.cells().iter().all(|c| c.is_current_month));
    }

    #[test]
    fn may_2024_has_leading_and_trailing_days() {
        let grid = MonthGrid::build(date!(2024 - 05 - 15), date!(2024 - 05 - 20), &[]);
        assert_eq!(grid.cells().len(), 35);
        assert_eq!(grid.cells()[0].date, date!(2024 - 04 - 28));
        assert!(!grid.cells()[0].is_current_month);
        assert_eq!(grid.cells()[34].date, date!(2024 - 06 - 01));
        let today: Vec<_> = grid.cells().iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].date, date!(2024 - 05 - 20));
        assert_eq!(grid.weeks().count(), 5);
    }

    #[test]
    fn overflow_counts_hidden_events() {
        let day = date!(2024 - 05 - 10);
        let projects: Vec<_> = (1..=5).map(|id| milestone_on(id, day)).collect();
        let events = aggregate(&[], &projects);
        let grid = MonthGrid::build(day, day, &events);
        let cell = grid.cell(day).unwrap();
        assert_eq!(cell.events.len(), 5);
        assert_eq!(cell.visible_events(MAX_VISIBLE_EVENTS).len(), 2);
        assert_eq!(cell.overflow_count(MAX_VISIBLE_EVENTS), 3);
        assert_eq!(cell.visible_events(MAX_VISIBLE_EVENTS)[0].title, "Project 1 - Target Date");

        let quiet = grid.cell(date!(2024 - 05 - 11)).unwrap();
        assert_eq!(quiet.overflow_count(MAX_VISIBLE_EVENTS), 0);
        assert!(quiet.visible_events(MAX_VISIBLE_EVENTS).is_empty());
    }

    #[test]
    fn events_outside_the_grid_are_dropped() {
        let events = aggregate(&[], &[milestone_on(1, date!(2024 - 08 - 01))]);
        let grid = MonthGrid::build(date!(2024 - 05 - 01), date!(2024 - 05 - 01), &events);
        assert!(grid.cells().iter().all(|c| c.events.is_empty()));
    }

    #[test]
    fn month_shift_clamps_day() {
        assert_eq!(shift_months(date!(2024 - 01 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(shift_months(date!(2023 - 01 - 31), 1), date!(2023 - 02 - 28));
        assert_eq!(shift_months(date!(2024 - 03 - 31), -1), date!(2024 - 02 - 29));
        assert_eq!(shift_months(date!(2024 - 12 - 15), 1), date!(2025 - 01 - 15));
        assert_eq!(shift_months(date!(2024 - 01 - 15), -1), date!(2023 - 12 - 15));
        assert_eq!(shift_months(date!(2024 - 05 - 10), 0), date!(2024 - 05 - 10));
        assert_eq!(shift_months(date!(2024 - 05 - 10), 14), date!(2025 - 07 - 10));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, Month::February), 29);
        assert_eq!(days_in_month(1900, Month::February), 28);
        assert_eq!(days_in_month(2024, Month::April), 30);
        assert_eq!(end_of_month(date!(2024 - 12 - 03)), date!(2024 - 12 - 31));
    }
}
