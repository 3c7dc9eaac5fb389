use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::types::{Navigate, ViewMode};

/// Local UI state: which grid is shown and around which date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarView {
    pub mode: ViewMode,
    pub date: NaiveDate,
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_sunday() as i64)
}

impl CalendarView {
    pub fn new(mode: ViewMode, date: NaiveDate) -> Self {
        Self { mode, date }
    }

    /// Half-open `[from, to)` window covered by the current grid.
    ///
    /// Month grids span whole Sunday-first weeks, so the first and last rows
    /// show days of the neighbouring months.
    pub fn visible_range(&self, agenda_days: u32) -> (NaiveDateTime, NaiveDateTime) {
        match self.mode {
            ViewMode::Day => (midnight(self.date), midnight(self.date + Duration::days(1))),
            ViewMode::Week => {
                let from = week_start(self.date);
                (midnight(from), midnight(from + Duration::days(7)))
            }
            ViewMode::Month => {
                let first = self.date.with_day(1).unwrap_or(self.date);
                let next_month = first
                    .checked_add_months(Months::new(1))
                    .unwrap_or(first + Duration::days(31));
                let last = next_month - Duration::days(1);
                let from = week_start(first);
                let to = week_start(last) + Duration::days(7);
                (midnight(from), midnight(to))
            }
            ViewMode::Agenda => (
                midnight(self.date),
                midnight(self.date + Duration::days(agenda_days.max(1) as i64)),
            ),
        }
    }

    pub fn navigate(&mut self, nav: Navigate, today: NaiveDate, agenda_days: u32) {
        let mode = self.mode;
        let step = |forward: bool, date: NaiveDate| -> NaiveDate {
            let days = match mode {
                ViewMode::Month => {
                    let moved = if forward {
                        date.checked_add_months(Months::new(1))
                    } else {
                        date.checked_sub_months(Months::new(1))
                    };
                    return moved.unwrap_or(date);
                }
                ViewMode::Week => 7,
                ViewMode::Day => 1,
                ViewMode::Agenda => agenda_days.max(1) as i64,
            };
            if forward {
                date + Duration::days(days)
            } else {
                date - Duration::days(days)
            }
        };

        self.date = match nav {
            Navigate::Today => today,
            Navigate::Next => step(true, self.date),
            Navigate::Previous => step(false, self.date),
        };
    }
}
