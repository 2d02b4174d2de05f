#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use reflect::api::{ApiError, ReflectApi};
use reflect::models::{
    Goal, GoalStatus, GoalUpdate, Insight, JournalEntry, JournalEntryUpdate, NewGoal, NewJournalEntry, NewReflection,
    Reflection, ScheduledTask, TaskDraft, UserStats,
};
use reflect::Session;

#[derive(Default)]
struct Store {
    next_id: i64,
    reflections: Vec<Reflection>,
    journal: Vec<JournalEntry>,
    goals: Vec<Goal>,
    tasks: Vec<ScheduledTask>,
    insights: Vec<Insight>,
    stats: UserStats,
}

impl Store {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory stand-in for the REST service
#[derive(Default)]
pub struct FakeApi {
    store: Mutex<Store>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `op` answer with a server error
    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn set_insights(&self, insights: Vec<Insight>) {
        self.store.lock().unwrap().insights = insights;
    }

    pub fn set_stats(&self, stats: UserStats) {
        self.store.lock().unwrap().stats = stats;
    }

    pub fn seed_reflection(&self, date: NaiveDate, answers: [&str; 3]) -> Reflection {
        let mut store = self.store.lock().unwrap();
        let reflection = Reflection {
            id: store.next_id(),
            user_id: 1,
            reflection_date: date,
            summary: Some(answers[0].to_string()),
            accomplishments: Some(answers[1].to_string()),
            improvements_to_make: Some(answers[2].to_string()),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        store.reflections.push(reflection.clone());
        reflection
    }

    pub fn seed_journal(&self, date: NaiveDate, content: &str) -> JournalEntry {
        let mut store = self.store.lock().unwrap();
        let entry = JournalEntry {
            id: store.next_id(),
            user_id: 1,
            content: content.to_string(),
            entry_date: date,
            reflection_id: None,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.journal.push(entry.clone());
        entry
    }

    pub fn task(&self, id: i64) -> Option<ScheduledTask> {
        self.store.lock().unwrap().tasks.iter().find(|t| t.id == id).cloned()
    }

    pub fn journal_len(&self) -> usize {
        self.store.lock().unwrap().journal.len()
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Server {
                status: 500,
                message: format!("{} is unavailable", op),
            });
        }
        Ok(())
    }
}

fn not_found(what: &str) -> ApiError {
    ApiError::Server {
        status: 404,
        message: format!("{} not found", what),
    }
}

impl ReflectApi for FakeApi {
    async fn upsert_reflection(&self, session: &Session, body: &NewReflection) -> Result<Reflection, ApiError> {
        self.enter("upsert_reflection")?;
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        if let Some(existing) = store
            .reflections
            .iter_mut()
            .find(|r| r.reflection_date == body.reflection_date)
        {
            existing.summary = Some(body.summary.clone());
            existing.accomplishments = Some(body.accomplishments.clone());
            existing.improvements_to_make = Some(body.improvements_to_make.clone());
            existing.updated_at = Some(now);
            return Ok(existing.clone());
        }
        let reflection = Reflection {
            id: store.next_id(),
            user_id: session.user_id,
            reflection_date: body.reflection_date,
            summary: Some(body.summary.clone()),
            accomplishments: Some(body.accomplishments.clone()),
            improvements_to_make: Some(body.improvements_to_make.clone()),
            created_at: Some(now),
            updated_at: None,
        };
        store.reflections.push(reflection.clone());
        Ok(reflection)
    }

    async fn reflection_for_date(&self, _session: &Session, date: NaiveDate) -> Result<Option<Reflection>, ApiError> {
        self.enter("reflection_for_date")?;
        let store = self.store.lock().unwrap();
        Ok(store.reflections.iter().find(|r| r.reflection_date == date).cloned())
    }

    async fn reflections_in_range(&self, _session: &Session, start: NaiveDate, end: NaiveDate) -> Result<Vec<Reflection>, ApiError> {
        self.enter("reflections_in_range")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .reflections
            .iter()
            .filter(|r| r.reflection_date >= start && r.reflection_date <= end)
            .cloned()
            .collect())
    }

    async fn create_journal_entry(&self, session: &Session, body: &NewJournalEntry) -> Result<JournalEntry, ApiError> {
        self.enter("create_journal_entry")?;
        let mut store = self.store.lock().unwrap();
        let entry = JournalEntry {
            id: store.next_id(),
            user_id: session.user_id,
            content: body.content.clone(),
            entry_date: body.entry_date,
            reflection_id: body.reflection_id,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.journal.push(entry.clone());
        Ok(entry)
    }

    async fn journal_entries_for_date(&self, _session: &Session, date: NaiveDate) -> Result<Vec<JournalEntry>, ApiError> {
        self.enter("journal_entries_for_date")?;
        let store = self.store.lock().unwrap();
        Ok(store.journal.iter().filter(|e| e.entry_date == date).cloned().collect())
    }

    async fn all_journal_entries(&self, _session: &Session) -> Result<Vec<JournalEntry>, ApiError> {
        self.enter("all_journal_entries")?;
        Ok(self.store.lock().unwrap().journal.clone())
    }

    async fn update_journal_entry(&self, _session: &Session, id: i64, update: &JournalEntryUpdate) -> Result<JournalEntry, ApiError> {
        self.enter("update_journal_entry")?;
        let mut store = self.store.lock().unwrap();
        let entry = store.journal.iter_mut().find(|e| e.id == id).ok_or_else(|| not_found("entry"))?;
        entry.content = update.content.clone();
        entry.updated_at = Some(Utc::now());
        Ok(entry.clone())
    }

    async fn delete_journal_entry(&self, _session: &Session, id: i64) -> Result<(), ApiError> {
        self.enter("delete_journal_entry")?;
        let mut store = self.store.lock().unwrap();
        let before = store.journal.len();
        store.journal.retain(|e| e.id != id);
        if store.journal.len() == before {
            return Err(not_found("entry"));
        }
        Ok(())
    }

    async fn create_goal(&self, session: &Session, body: &NewGoal) -> Result<Goal, ApiError> {
        self.enter("create_goal")?;
        let mut store = self.store.lock().unwrap();
        let goal = Goal {
            id: store.next_id(),
            user_id: session.user_id,
            description: body.description.clone(),
            status: GoalStatus::Active,
            deadline: body.deadline,
            created_at: Some(Utc::now()),
        };
        store.goals.push(goal.clone());
        Ok(goal)
    }

    async fn goals(&self, _session: &Session, status: Option<GoalStatus>) -> Result<Vec<Goal>, ApiError> {
        self.enter("goals")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .goals
            .iter()
            .filter(|g| status.is_none_or(|s| g.status == s))
            .cloned()
            .collect())
    }

    async fn update_goal(&self, _session: &Session, id: i64, update: &GoalUpdate) -> Result<Goal, ApiError> {
        self.enter("update_goal")?;
        let mut store = self.store.lock().unwrap();
        let goal = store.goals.iter_mut().find(|g| g.id == id).ok_or_else(|| not_found("goal"))?;
        if let Some(ref description) = update.description {
            goal.description = description.clone();
        }
        if let Some(deadline) = update.deadline {
            goal.deadline = deadline;
        }
        if let Some(status) = update.status {
            goal.status = status;
        }
        Ok(goal.clone())
    }

    async fn delete_goal(&self, _session: &Session, id: i64) -> Result<(), ApiError> {
        self.enter("delete_goal")?;
        self.store.lock().unwrap().goals.retain(|g| g.id != id);
        Ok(())
    }

    async fn create_scheduled_task(&self, session: &Session, draft: &TaskDraft) -> Result<ScheduledTask, ApiError> {
        self.enter("create_scheduled_task")?;
        let mut store = self.store.lock().unwrap();
        let task = ScheduledTask {
            id: store.next_id(),
            user_id: session.user_id,
            title: draft.title.clone(),
            description: draft.description.clone(),
            task_date: draft.task_date,
            start_time: draft.start_time,
            end_time: draft.end_time,
            is_recurring: draft.is_recurring,
            recurrence_pattern: draft.recurrence_pattern,
            is_completed: false,
            completed_at: None,
        };
        store.tasks.push(task.clone());
        Ok(task)
    }

    async fn scheduled_tasks(&self, _session: &Session, start: NaiveDate, end: NaiveDate) -> Result<Vec<ScheduledTask>, ApiError> {
        self.enter("scheduled_tasks")?;
        let store = self.store.lock().unwrap();
        Ok(store
            .tasks
            .iter()
            .filter(|t| t.task_date >= start && t.task_date <= end)
            .cloned()
            .collect())
    }

    /// Merge whatever fields the body carries into the stored task
    async fn update_scheduled_task<U: Serialize + Sync>(&self, _session: &Session, id: i64, update: &U) -> Result<ScheduledTask, ApiError> {
        self.enter("update_scheduled_task")?;
        let patch = serde_json::to_value(update).map_err(|e| ApiError::Decode(e.to_string()))?;
        let mut store = self.store.lock().unwrap();
        let task = store.tasks.iter_mut().find(|t| t.id == id).ok_or_else(|| not_found("task"))?;

        let mut merged = serde_json::to_value(&*task).map_err(|e| ApiError::Decode(e.to_string()))?;
        if let (Some(target), Some(fields)) = (merged.as_object_mut(), patch.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        let mut updated: ScheduledTask = serde_json::from_value(merged).map_err(|e| ApiError::Decode(e.to_string()))?;
        if patch.get("is_completed").and_then(|v| v.as_bool()) == Some(true) {
            updated.completed_at = Some(Utc::now());
        } else if !updated.is_completed {
            updated.completed_at = None;
        }
        *task = updated.clone();
        Ok(updated)
    }

    async fn delete_scheduled_task(&self, _session: &Session, id: i64) -> Result<(), ApiError> {
        self.enter("delete_scheduled_task")?;
        self.store.lock().unwrap().tasks.retain(|t| t.id != id);
        Ok(())
    }

    async fn stats(&self, _session: &Session) -> Result<UserStats, ApiError> {
        self.enter("stats")?;
        Ok(self.store.lock().unwrap().stats.clone())
    }

    async fn morning_insights(&self, _session: &Session) -> Result<Vec<Insight>, ApiError> {
        self.enter("morning_insights")?;
        Ok(self.store.lock().unwrap().insights.clone())
    }
}

pub fn session() -> Session {
    Session::new(1)
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
