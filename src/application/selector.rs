//! Date range selector
//!
//! Two-click calendar selection over a vehicle's blocked dates.
//!
//! ```text
//! click(a)            -> start = a, end = none
//! click(b), b >= a    -> end = b     (only if every day in a..=b is free)
//! click(b), otherwise -> start = b, end = none
//! click(c) with both  -> start = c, end = none
//! ```
//!
//! Past and blocked days ignore clicks. The hover preview and the commit
//! path share [`DateRangeSelector::span_is_free`].

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::domain::{DateRange, DomainError, DomainResult};

/// Current bounds of the selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Selection {
    /// Complete range, once both bounds are set.
    pub fn range(&self) -> Option<DateRange> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => DateRange::new(start, end).ok(),
            _ => None,
        }
    }
}

/// How a calendar cell is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DayState {
    Past,
    Blocked,
    Start,
    End,
    InRange,
    Preview,
    Available,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub state: DayState,
}

/// Sunday-first month layout; `None` cells pad the first week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    pub month: u32,
    pub cells: Vec<Option<CalendarDay>>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[Option<CalendarDay>]> {
        self.cells.chunks(7)
    }
}

type ChangeListener = Box<dyn FnMut(Selection) + Send>;

pub struct DateRangeSelector {
    blocked: BTreeSet<NaiveDate>,
    today: NaiveDate,
    selection: Selection,
    hover: Option<NaiveDate>,
    listener: Option<ChangeListener>,
}

impl DateRangeSelector {
    pub fn new(blocked: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> Self {
        Self {
            blocked: blocked.into_iter().collect(),
            today,
            selection: Selection::default(),
            hover: None,
            listener: None,
        }
    }

    /// Called with the new selection every time a bound changes.
    pub fn on_change(&mut self, listener: impl FnMut(Selection) + Send + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn is_selectable(&self, day: NaiveDate) -> bool {
        day >= self.today && !self.blocked.contains(&day)
    }

    /// Every day of `start..=end` is unblocked. `false` for inverted spans.
    pub fn span_is_free(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= end && self.blocked.range(start..=end).next().is_none()
    }

    /// Apply a click on `day`. Returns whether the selection changed.
    pub fn click(&mut self, day: NaiveDate) -> bool {
        if !self.is_selectable(day) {
            return false;
        }

        let next = match (self.selection.start_date, self.selection.end_date) {
            (Some(start), None) if self.span_is_free(start, day) => Selection {
                start_date: Some(start),
                end_date: Some(day),
            },
            _ => Selection {
                start_date: Some(day),
                end_date: None,
            },
        };
        self.apply(next)
    }

    /// Pointer moved over `day`, or left the calendar with `None`.
    pub fn hover(&mut self, day: Option<NaiveDate>) {
        self.hover = day;
    }

    /// Provisional range while only the start is set and the pointer rests
    /// on a later day whose whole span is free.
    pub fn preview_range(&self) -> Option<DateRange> {
        match (self.selection.start_date, self.selection.end_date, self.hover) {
            (Some(start), None, Some(hover)) if hover > start && self.span_is_free(start, hover) => {
                DateRange::new(start, hover).ok()
            }
            _ => None,
        }
    }

    /// Replace the blocked set after a re-query. A selection that now covers
    /// a blocked day is dropped.
    pub fn set_blocked_dates(&mut self, blocked: impl IntoIterator<Item = NaiveDate>) {
        self.blocked = blocked.into_iter().collect();

        let still_valid = match (self.selection.start_date, self.selection.end_date) {
            (Some(start), Some(end)) => self.span_is_free(start, end),
            (Some(start), None) => !self.blocked.contains(&start),
            _ => true,
        };
        if !still_valid {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.hover = None;
        self.apply(Selection::default());
    }

    pub fn day_state(&self, day: NaiveDate) -> DayState {
        if day < self.today {
            return DayState::Past;
        }
        if self.blocked.contains(&day) {
            return DayState::Blocked;
        }
        if self.selection.start_date == Some(day) {
            return DayState::Start;
        }
        if self.selection.end_date == Some(day) {
            return DayState::End;
        }
        if self.selection.range().is_some_and(|r| r.contains(day)) {
            return DayState::InRange;
        }
        if self.preview_range().is_some_and(|r| r.contains(day)) {
            return DayState::Preview;
        }
        DayState::Available
    }

    pub fn month_grid(&self, year: i32, month: u32) -> DomainResult<MonthGrid> {
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            DomainError::Validation(format!("invalid month {}-{:02}", year, month))
        })?;

        let leading = first.weekday().num_days_from_sunday() as usize;
        let mut cells: Vec<Option<CalendarDay>> = vec![None; leading];

        let mut next = Some(first);
        while let Some(day) = next.filter(|d| d.month() == month) {
            cells.push(Some(CalendarDay {
                date: day,
                state: self.day_state(day),
            }));
            next = day.succ_opt();
        }

        Ok(MonthGrid { year, month, cells })
    }

    fn apply(&mut self, next: Selection) -> bool {
        if next == self.selection {
            return false;
        }
        self.selection = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(next);
        }
        true
    }
}
