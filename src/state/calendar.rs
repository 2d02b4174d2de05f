use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::HashMap;

use crate::api::{ApiError, ReflectApi};
use crate::models::Reflection;
use crate::session::Session;
use crate::state::record_error;
use crate::utils::month_bounds;

/// Shown in the detail overlay in place of a missing answer
pub const NO_ANSWER: &str = "No answer";

/// Month of reflections for the previous-days calendar
#[derive(Debug, Clone)]
pub struct CalendarState {
    /// First day of the displayed month
    pub month: NaiveDate,
    pub reflections: HashMap<NaiveDate, Reflection>,
    /// Highlighted day of the displayed month
    pub cursor: NaiveDate,
    /// Reflection open in the detail overlay
    pub detail: Option<Reflection>,
    pub loading: bool,
    pub error: Option<String>,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        let (first, _) = month_bounds(today);
        Self {
            month: first,
            reflections: HashMap::new(),
            cursor: today,
            detail: None,
            loading: false,
            error: None,
        }
    }

    /// Fetch the reflections of the displayed month and key them by date
    pub async fn load<A: ReflectApi>(&mut self, api: &A, session: &Session) -> Result<(), ApiError> {
        let (first, last) = month_bounds(self.month);
        self.loading = true;
        let result = api.reflections_in_range(session, first, last).await;
        self.loading = false;

        match result {
            Ok(reflections) => {
                self.reflections = reflections
                    .into_iter()
                    .filter(|r| r.reflection_date >= first && r.reflection_date <= last)
                    .map(|r| (r.reflection_date, r))
                    .collect();
                self.error = None;
                Ok(())
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub fn has_reflection(&self, date: NaiveDate) -> bool {
        self.reflections.contains_key(&date)
    }

    /// Rows of seven cells, Sunday first. `None` pads before the first and after the last day.
    pub fn grid(&self) -> Vec<[Option<NaiveDate>; 7]> {
        month_grid(self.month)
    }

    pub fn title(&self) -> String {
        self.month.format("%B %Y").to_string()
    }

    pub fn previous_month(&mut self) {
        self.shift_month(-1);
    }

    pub fn next_month(&mut self) {
        self.shift_month(1);
    }

    fn shift_month(&mut self, delta: i32) {
        let shifted = if delta < 0 {
            self.month.checked_sub_months(Months::new(delta.unsigned_abs()))
        } else {
            self.month.checked_add_months(Months::new(delta as u32))
        };
        if let Some(month) = shifted {
            self.month = month;
            self.cursor = month;
            self.reflections.clear();
            self.detail = None;
        }
    }

    /// Move the highlighted day, following it into the neighbouring month.
    /// Returns true when the month changed and needs a fetch.
    pub fn move_cursor(&mut self, days: i64) -> bool {
        let target = self.cursor + Duration::days(days);
        if target.month() == self.month.month() && target.year() == self.month.year() {
            self.cursor = target;
            return false;
        }
        let (first, _) = month_bounds(target);
        self.month = first;
        self.cursor = target;
        self.reflections.clear();
        self.detail = None;
        true
    }

    /// Open the overlay for a day; days without a reflection do nothing
    pub fn open_detail(&mut self, date: NaiveDate) -> bool {
        match self.reflections.get(&date) {
            Some(reflection) => {
                self.detail = Some(reflection.clone());
                true
            }
            None => false,
        }
    }

    pub fn open_cursor_detail(&mut self) -> bool {
        self.open_detail(self.cursor)
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }
}

/// Sunday-first month grid with blank leading and trailing cells
pub fn month_grid(month: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let (first, last) = month_bounds(month);
    let lead = first.weekday().num_days_from_sunday() as usize;

    let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];
    cells.extend(first.iter_days().take_while(|d| *d <= last).map(Some));
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    cells
        .chunks(7)
        .map(|week| {
            let mut row = [None; 7];
            row.copy_from_slice(week);
            row
        })
        .collect()
}

/// Answer text for the overlay, with the placeholder for blanks
pub fn answer_or_placeholder(answer: Option<&str>) -> (&str, bool) {
    match answer {
        Some(text) => (text, false),
        None => (NO_ANSWER, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn reflection(day: NaiveDate) -> Reflection {
        Reflection {
            id: day.day() as i64,
            user_id: 1,
            reflection_date: day,
            summary: Some("ok".into()),
            accomplishments: None,
            improvements_to_make: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn grid_starts_on_sunday_with_blanks() {
        // April 2026 starts on a Wednesday
        let april = month_grid(date(2026, 4, 15));
        assert_eq!(april[0][..3], [None, None, None]);
        assert_eq!(april[0][3], Some(date(2026, 4, 1)));
        let days: usize = april.iter().flatten().filter(|d| d.is_some()).count();
        assert_eq!(days, 30);
        assert!(april.iter().all(|w| w.len() == 7));
    }

    #[test]
    fn has_reflection_only_for_exact_dates() {
        let mut state = CalendarState::new(date(2026, 3, 4));
        state.reflections.insert(date(2026, 3, 2), reflection(date(2026, 3, 2)));

        assert!(state.has_reflection(date(2026, 3, 2)));
        assert!(!state.has_reflection(date(2026, 3, 3)));

        assert!(!state.open_detail(date(2026, 3, 3)));
        assert!(state.detail.is_none());
        assert!(state.open_detail(date(2026, 3, 2)));
        let detail = state.detail.as_ref().unwrap();
        assert_eq!(answer_or_placeholder(detail.answers()[1]), (NO_ANSWER, true));
    }

    #[test]
    fn cursor_crosses_into_the_next_month() {
        let mut state = CalendarState::new(date(2026, 3, 30));
        assert!(!state.move_cursor(1));
        assert!(state.move_cursor(1));
        assert_eq!(state.month, date(2026, 4, 1));
        assert_eq!(state.cursor, date(2026, 4, 1));

        state.previous_month();
        assert_eq!(state.month, date(2026, 3, 1));
    }
}
