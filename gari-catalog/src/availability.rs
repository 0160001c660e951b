use chrono::NaiveDate;
use std::collections::HashSet;

/// An inclusive pickup-to-dropoff span, compared by calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Every calendar day the range covers. An inverted range covers
    /// nothing.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start
            .iter_days()
            .take_while(move |d| *d <= self.end)
    }
}

/// The set of calendar days already taken on a car, built from its
/// non-cancelled bookings. A candidate range is rejected when any of its
/// days intersects the set.
#[derive(Debug, Default)]
pub struct AvailabilityCalendar {
    booked: HashSet<NaiveDate>,
}

impl AvailabilityCalendar {
    pub fn new() -> Self {
        Self {
            booked: HashSet::new(),
        }
    }

    /// Build a calendar from existing booking spans. Callers filter out
    /// cancelled bookings before handing ranges in.
    pub fn from_ranges<I: IntoIterator<Item = DateRange>>(ranges: I) -> Self {
        let mut calendar = Self::new();
        for range in ranges {
            calendar.insert_range(range);
        }
        calendar
    }

    pub fn insert_range(&mut self, range: DateRange) {
        self.booked.extend(range.days());
    }

    /// Days of the candidate range that are already booked, in order.
    pub fn conflicting_days(&self, candidate: DateRange) -> Vec<NaiveDate> {
        candidate
            .days()
            .filter(|d| self.booked.contains(d))
            .collect()
    }

    pub fn is_free(&self, candidate: DateRange) -> bool {
        !candidate.days().any(|d| self.booked.contains(&d))
    }

    pub fn booked_day_count(&self) -> usize {
        self.booked.len()
    }
}
