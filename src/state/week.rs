use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::api::{ApiError, ReflectApi, completion_update};
use crate::models::{ScheduledTask, TaskDraft};
use crate::session::Session;
use crate::state::record_error;
use crate::utils::week_range;

/// First hour row of the grid (06:00)
pub const FIRST_HOUR: u32 = 6;
/// Last hour row of the grid (21:00)
pub const LAST_HOUR: u32 = 21;
/// Shorter tasks are still drawn this tall
pub const MIN_TASK_MINUTES: i64 = 30;

pub fn hours() -> impl Iterator<Item = u32> {
    FIRST_HOUR..=LAST_HOUR
}

pub fn duration_minutes(task: &ScheduledTask) -> i64 {
    (task.end_time - task.start_time).num_minutes()
}

/// Drawn extent of a task in minutes
pub fn visual_minutes(task: &ScheduledTask) -> i64 {
    duration_minutes(task).max(MIN_TASK_MINUTES)
}

/// Whether the drawn extent of a task overlaps the given hour row
pub fn covers_hour(task: &ScheduledTask, hour: u32) -> bool {
    let start = (task.start_time.hour() * 60 + task.start_time.minute()) as i64;
    let end = start + visual_minutes(task);
    let row = hour as i64 * 60;
    start < row + 60 && end > row
}

/// A task is past once its end has gone by. Styling only.
pub fn is_past(task: &ScheduledTask, now: NaiveDateTime) -> bool {
    task.task_date.and_time(task.end_time) < now
}

/// Tasks for the Sunday..Saturday week around `pivot`
#[derive(Debug, Clone)]
pub struct WeekState {
    pub pivot: NaiveDate,
    pub tasks: Vec<ScheduledTask>,
    /// 0 = Sunday
    pub cursor_day: usize,
    pub cursor_hour: u32,
    pub loading: bool,
    pub error: Option<String>,
}

impl WeekState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            pivot: today,
            tasks: Vec::new(),
            cursor_day: today.weekday().num_days_from_sunday() as usize,
            cursor_hour: 9,
            loading: false,
            error: None,
        }
    }

    pub fn range(&self) -> (NaiveDate, NaiveDate) {
        week_range(self.pivot)
    }

    pub fn days(&self) -> [NaiveDate; 7] {
        let (sunday, _) = self.range();
        std::array::from_fn(|i| sunday + Duration::days(i as i64))
    }

    pub fn title(&self) -> String {
        let (start, end) = self.range();
        format!("{} - {}", start.format("%b %-d"), end.format("%b %-d, %Y"))
    }

    pub async fn load<A: ReflectApi>(&mut self, api: &A, session: &Session) -> Result<(), ApiError> {
        let (start, end) = self.range();
        self.loading = true;
        let result = api.scheduled_tasks(session, start, end).await;
        self.loading = false;

        match result {
            Ok(mut tasks) => {
                tasks.sort_by_key(|t| (t.task_date, t.start_time));
                self.tasks = tasks;
                self.error = None;
                Ok(())
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub fn previous_week(&mut self) {
        self.pivot -= Duration::days(7);
    }

    pub fn next_week(&mut self) {
        self.pivot += Duration::days(7);
    }

    pub fn this_week(&mut self, today: NaiveDate) {
        self.pivot = today;
        self.cursor_day = today.weekday().num_days_from_sunday() as usize;
    }

    pub fn tasks_on(&self, day: NaiveDate) -> impl Iterator<Item = &ScheduledTask> {
        self.tasks.iter().filter(move |t| t.task_date == day)
    }

    /// Tasks whose start falls in the given hour row
    pub fn tasks_starting_at(&self, day: NaiveDate, hour: u32) -> Vec<&ScheduledTask> {
        self.tasks_on(day).filter(|t| t.start_time.hour() == hour).collect()
    }

    /// Tasks drawn in the given hour row, whether they start there or run into it
    pub fn tasks_covering(&self, day: NaiveDate, hour: u32) -> Vec<&ScheduledTask> {
        self.tasks_on(day).filter(|t| covers_hour(t, hour)).collect()
    }

    /// Tasks on `day` that start before or after the hour grid
    pub fn tasks_outside_grid(&self, day: NaiveDate) -> usize {
        self.tasks_on(day)
            .filter(|t| !(FIRST_HOUR..=LAST_HOUR).contains(&t.start_time.hour()))
            .count()
    }

    pub fn cursor_date(&self) -> NaiveDate {
        self.days()[self.cursor_day.min(6)]
    }

    pub fn move_cursor(&mut self, day_delta: isize, hour_delta: i32) {
        self.cursor_day = self.cursor_day.saturating_add_signed(day_delta).min(6);
        let hour = self.cursor_hour as i32 + hour_delta;
        self.cursor_hour = hour.clamp(FIRST_HOUR as i32, LAST_HOUR as i32) as u32;
    }

    /// Task under the highlighted slot. One starting there wins over one running into it.
    pub fn selected_task(&self) -> Option<&ScheduledTask> {
        let covering = self.tasks_covering(self.cursor_date(), self.cursor_hour);
        covering
            .iter()
            .find(|t| t.start_time.hour() == self.cursor_hour)
            .or_else(|| covering.last())
            .copied()
    }

    /// Draft for a new task in the highlighted slot, one hour long.
    /// A task running into the slot from an earlier hour pushes the start to its end.
    pub fn draft_at_cursor(&self) -> TaskDraft {
        let slot = NaiveTime::from_hms_opt(self.cursor_hour, 0, 0).unwrap_or(NaiveTime::MIN);
        let start = self
            .tasks_covering(self.cursor_date(), self.cursor_hour)
            .iter()
            .filter(|t| t.start_time < slot && t.end_time > slot)
            .map(|t| t.end_time)
            .max()
            .unwrap_or(slot);
        let end = if start.hour() >= 23 {
            NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(start)
        } else {
            start + Duration::hours(1)
        };
        TaskDraft {
            id: None,
            title: String::new(),
            description: None,
            task_date: self.cursor_date(),
            start_time: start,
            end_time: end,
            is_recurring: false,
            recurrence_pattern: None,
        }
    }

    /// Flip completion, then re-fetch the week
    pub async fn toggle_complete<A: ReflectApi>(&mut self, api: &A, session: &Session, id: i64) -> Result<bool, ApiError> {
        let Some(current) = self.tasks.iter().find(|t| t.id == id).map(|t| t.is_completed) else {
            return Ok(false);
        };
        if let Err(err) = api.update_scheduled_task(session, id, &completion_update(!current)).await {
            return Err(record_error(&mut self.error, err));
        }
        self.load(api, session).await?;
        Ok(!current)
    }

    /// Create a task, or replace one when the draft carries an id; then re-fetch
    pub async fn save<A: ReflectApi>(&mut self, api: &A, session: &Session, draft: &TaskDraft) -> Result<ScheduledTask, ApiError> {
        if draft.title.trim().is_empty() {
            return Err(record_error(&mut self.error, ApiError::validation("Task title cannot be empty")));
        }
        if draft.end_time <= draft.start_time {
            return Err(record_error(
                &mut self.error,
                ApiError::validation("End time must be after start time"),
            ));
        }

        let result = match draft.id {
            Some(id) => api.update_scheduled_task(session, id, draft).await,
            None => api.create_scheduled_task(session, draft).await,
        };
        let task = result.map_err(|err| record_error(&mut self.error, err))?;
        log::info!("task {} saved for {}", task.id, task.task_date);
        self.load(api, session).await?;
        Ok(task)
    }

    pub async fn delete<A: ReflectApi>(&mut self, api: &A, session: &Session, id: i64) -> Result<(), ApiError> {
        api.delete_scheduled_task(session, id)
            .await
            .map_err(|err| record_error(&mut self.error, err))?;
        log::info!("task {} deleted", id);
        self.load(api, session).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i64, day: NaiveDate, start: (u32, u32), end: (u32, u32)) -> ScheduledTask {
        ScheduledTask {
            id,
            user_id: 1,
            title: format!("task {}", id),
            description: None,
            task_date: day,
            start_time: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
            is_recurring: false,
            recurrence_pattern: None,
            is_completed: false,
            completed_at: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn short_tasks_get_the_minimum_extent() {
        let day = date(2026, 3, 4);
        let quick = task(1, day, (9, 0), (9, 10));
        assert_eq!(duration_minutes(&quick), 10);
        assert_eq!(visual_minutes(&quick), MIN_TASK_MINUTES);
        assert!(covers_hour(&quick, 9));
        assert!(!covers_hour(&quick, 10));

        let long = task(2, day, (9, 0), (10, 45));
        assert_eq!(visual_minutes(&long), 105);
        assert!(covers_hour(&long, 10));
        assert!(!covers_hour(&long, 11));
    }

    #[test]
    fn long_task_stays_selected_through_the_hours_it_covers() {
        let day = date(2026, 3, 4);
        let mut state = WeekState::new(day);
        state.tasks = vec![task(1, day, (9, 0), (11, 30)), task(2, day, (11, 0), (11, 45))];

        state.cursor_hour = 10;
        assert_eq!(state.selected_task().map(|t| t.id), Some(1));
        assert!(state.tasks_starting_at(day, 10).is_empty());

        // Both reach 11:00; the one starting there is picked
        state.cursor_hour = 11;
        let covering: Vec<i64> = state.tasks_covering(day, 11).iter().map(|t| t.id).collect();
        assert_eq!(covering, vec![1, 2]);
        assert_eq!(state.selected_task().map(|t| t.id), Some(2));

        state.cursor_hour = 12;
        assert!(state.selected_task().is_none());
    }

    #[test]
    fn new_task_draft_starts_after_a_task_running_into_the_slot() {
        let day = date(2026, 3, 4);
        let mut state = WeekState::new(day);
        state.tasks = vec![task(1, day, (9, 0), (11, 30))];

        state.cursor_hour = 11;
        let draft = state.draft_at_cursor();
        assert_eq!(draft.start_time, NaiveTime::from_hms_opt(11, 30, 0).unwrap());
        assert_eq!(draft.end_time, NaiveTime::from_hms_opt(12, 30, 0).unwrap());

        state.cursor_hour = 13;
        assert_eq!(state.draft_at_cursor().start_time, NaiveTime::from_hms_opt(13, 0, 0).unwrap());
    }

    #[test]
    fn past_is_measured_from_the_end() {
        let day = date(2026, 3, 4);
        let t = task(1, day, (9, 0), (10, 0));
        assert!(!is_past(&t, day.and_hms_opt(9, 59, 0).unwrap()));
        assert!(is_past(&t, day.and_hms_opt(10, 0, 1).unwrap()));
    }

    #[test]
    fn grid_lookup_by_start_hour() {
        let day = date(2026, 3, 4);
        let mut state = WeekState::new(day);
        state.tasks = vec![
            task(1, day, (9, 30), (10, 0)),
            task(2, day, (5, 0), (5, 30)),
            task(3, date(2026, 3, 5), (9, 0), (9, 30)),
        ];

        let at_nine: Vec<i64> = state.tasks_starting_at(day, 9).iter().map(|t| t.id).collect();
        assert_eq!(at_nine, vec![1]);
        assert_eq!(state.tasks_outside_grid(day), 1);
        assert_eq!(hours().count(), 16);
    }

    #[test]
    fn week_navigation_and_cursor() {
        let mut state = WeekState::new(date(2026, 3, 4));
        assert_eq!(state.days()[0], date(2026, 3, 1));
        assert_eq!(state.cursor_date(), date(2026, 3, 4));

        state.next_week();
        assert_eq!(state.range(), (date(2026, 3, 8), date(2026, 3, 14)));

        state.move_cursor(10, 100);
        assert_eq!(state.cursor_day, 6);
        assert_eq!(state.cursor_hour, LAST_HOUR);

        let draft = state.draft_at_cursor();
        assert_eq!(draft.task_date, date(2026, 3, 14));
        assert_eq!(draft.end_time, NaiveTime::from_hms_opt(22, 0, 0).unwrap());
    }
}
