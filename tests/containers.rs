mod common;

use chrono::NaiveTime;
use common::{date, session, FakeApi};
use reflect::models::{GoalStatus, Insight, InsightKind, RecurrencePattern, TaskDraft};
use reflect::state::calendar::CalendarState;
use reflect::state::goals::GoalsState;
use reflect::state::insights::{InsightSource, InsightsState};
use reflect::state::journal::{JournalScope, JournalState};
use reflect::state::reflection::{ReflectionPhase, ReflectionState};
use reflect::state::week::WeekState;
use reflect::utils::TimeOfDay;

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[tokio::test]
async fn goal_moves_between_lists() {
    let api = FakeApi::new();
    let session = session();
    let mut goals = GoalsState::new();

    let goal = goals.create(&api, &session, "Ship v1", Some(date(2099, 1, 1))).await.unwrap();
    assert_eq!(goals.active.len(), 1);
    assert!(goals.success.is_set());

    goals.set_status(&api, &session, goal.id, GoalStatus::Completed).await.unwrap();
    assert!(goals.active.is_empty());
    assert_eq!(goals.completed.len(), 1);
    assert_eq!(goals.completed[0].deadline, Some(date(2099, 1, 1)));

    goals.set_status(&api, &session, goal.id, GoalStatus::Active).await.unwrap();
    assert_eq!(goals.active.len(), 1);
    assert!(goals.completed.is_empty());

    // A fresh load agrees with the local copy
    let mut reloaded = GoalsState::new();
    reloaded.load(&api, &session).await.unwrap();
    assert_eq!(reloaded.active, goals.active);
}

#[tokio::test]
async fn blank_goal_is_rejected_without_a_request() {
    let api = FakeApi::new();
    let mut goals = GoalsState::new();

    let err = goals.create(&api, &session(), "   ", None).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(api.calls("create_goal"), 0);
    assert!(goals.error.is_some());
}

#[tokio::test]
async fn failed_goal_update_keeps_the_cache() {
    let api = FakeApi::new();
    let session = session();
    let mut goals = GoalsState::new();
    let goal = goals.create(&api, &session, "Read more", None).await.unwrap();

    api.fail("update_goal");
    assert!(goals.set_status(&api, &session, goal.id, GoalStatus::Completed).await.is_err());

    assert_eq!(goals.active.len(), 1);
    assert_eq!(goals.error.as_deref(), Some("update_goal is unavailable"));
}

#[tokio::test]
async fn reflection_submit_then_reload_is_completed() {
    let api = FakeApi::new();
    let session = session();
    let today = date(2026, 3, 4);
    let mut reflection = ReflectionState::new(today);
    reflection.load(&api, &session).await.unwrap();
    assert!(!reflection.is_completed());

    for answer in ["Good day", "Shipped feature", "Sleep earlier"] {
        reflection.set_answer(answer);
        reflection.advance();
    }
    reflection.submit(&api, &session).await.unwrap();
    assert!(reflection.is_completed());

    let mut reloaded = ReflectionState::new(today);
    reloaded.load(&api, &session).await.unwrap();
    match reloaded.phase {
        ReflectionPhase::Completed { ref record } => {
            assert_eq!(
                record.answers(),
                [Some("Good day"), Some("Shipped feature"), Some("Sleep earlier")]
            );
        }
        ref other => panic!("expected a completed reflection, got {:?}", other),
    }
}

#[tokio::test]
async fn editing_a_reflection_overwrites_the_same_day() {
    let api = FakeApi::new();
    let session = session();
    let today = date(2026, 3, 4);
    let original = api.seed_reflection(today, ["Fine", "Emails", "Focus"]);

    let mut reflection = ReflectionState::new(today);
    reflection.load(&api, &session).await.unwrap();
    reflection.begin_edit();
    reflection.set_answer("Great");
    reflection.save_edit(&api, &session).await.unwrap();

    let saved = reflection.saved().unwrap();
    assert_eq!(saved.id, original.id);
    assert_eq!(saved.answers(), [Some("Great"), Some("Emails"), Some("Focus")]);
    assert!(saved.updated_at.is_some());
}

#[tokio::test]
async fn submitting_twice_keeps_one_reflection_per_day() {
    let api = FakeApi::new();
    let session = session();
    let today = date(2026, 3, 4);
    let mut reflection = ReflectionState::new(today);

    reflection
        .update(&api, &session, ["One".to_string(), "Two".to_string(), "Three".to_string()])
        .await
        .unwrap();
    reflection
        .update(&api, &session, ["Uno".to_string(), "Dos".to_string(), "Tres".to_string()])
        .await
        .unwrap();

    let mut calendar = CalendarState::new(today);
    calendar.load(&api, &session).await.unwrap();
    assert_eq!(calendar.reflections.len(), 1);
    assert_eq!(
        calendar.reflections[&today].answers(),
        [Some("Uno"), Some("Dos"), Some("Tres")]
    );
}

#[tokio::test]
async fn incomplete_reflection_is_not_sent() {
    let api = FakeApi::new();
    let mut reflection = ReflectionState::new(date(2026, 3, 4));
    reflection.set_answer("Only the first");

    assert!(reflection.submit(&api, &session()).await.is_err());
    assert_eq!(api.calls("upsert_reflection"), 0);
    assert!(!reflection.is_completed());
}

#[tokio::test]
async fn deleting_twice_only_sends_one_request() {
    let api = FakeApi::new();
    let session = session();
    let today = date(2026, 3, 4);
    let entry = api.seed_journal(today, "Morning pages");
    api.seed_journal(today, "Evening notes");

    let mut journal = JournalState::new(JournalScope::Date(today));
    journal.load(&api, &session, today).await.unwrap();
    assert_eq!(journal.entries.len(), 2);

    assert!(journal.request_delete(entry.id));
    assert!(journal.confirm_delete(&api, &session, today).await.unwrap());
    assert!(!journal.delete(&api, &session, entry.id, today).await.unwrap());

    assert_eq!(api.calls("delete_journal_entry"), 1);
    assert_eq!(journal.entries.len(), 1);
    assert_eq!(api.journal_len(), 1);
}

#[tokio::test]
async fn journal_entry_for_another_day_stays_out_of_today() {
    let api = FakeApi::new();
    let session = session();
    let today = date(2026, 3, 4);
    let mut journal = JournalState::new(JournalScope::Date(today));

    journal.create(&api, &session, "Looking back", date(2026, 3, 1)).await.unwrap();
    assert!(journal.entries.is_empty());

    let entry = journal.create(&api, &session, "Right now", today).await.unwrap();
    journal.update(&api, &session, entry.id, "Right now, edited").await.unwrap();
    assert_eq!(journal.entries[0].content, "Right now, edited");
}

#[tokio::test]
async fn week_toggle_refetches_the_week() {
    let api = FakeApi::new();
    let session = session();
    let mut week = WeekState::new(date(2026, 3, 4));

    let draft = TaskDraft {
        id: None,
        title: "Gym".to_string(),
        description: None,
        task_date: date(2026, 3, 5),
        start_time: time(7, 0),
        end_time: time(8, 30),
        is_recurring: true,
        recurrence_pattern: Some(RecurrencePattern::Weekdays),
    };
    let task = week.save(&api, &session, &draft).await.unwrap();
    assert_eq!(week.tasks.len(), 1);

    assert!(week.toggle_complete(&api, &session, task.id).await.unwrap());
    assert!(week.tasks[0].is_completed);
    assert!(api.task(task.id).is_some_and(|t| t.completed_at.is_some()));

    assert!(!week.toggle_complete(&api, &session, task.id).await.unwrap());
    assert!(!week.tasks[0].is_completed);
    // save, then two toggles, each followed by a fetch
    assert_eq!(api.calls("scheduled_tasks"), 3);

    // Recurring tasks are stored once and never expanded
    week.next_week();
    week.load(&api, &session).await.unwrap();
    assert!(week.tasks.is_empty());
}

#[tokio::test]
async fn task_ending_before_it_starts_is_rejected() {
    let api = FakeApi::new();
    let mut week = WeekState::new(date(2026, 3, 4));
    let mut draft = week.draft_at_cursor();
    draft.title = "Backwards".to_string();
    draft.end_time = draft.start_time;

    assert!(week.save(&api, &session(), &draft).await.is_err());
    assert_eq!(api.calls("create_scheduled_task"), 0);
    assert!(week.error.is_some());
}

#[tokio::test]
async fn calendar_marks_days_with_reflections() {
    let api = FakeApi::new();
    api.seed_reflection(date(2026, 3, 2), ["a", "b", "c"]);
    api.seed_reflection(date(2026, 4, 1), ["a", "b", "c"]);

    let mut calendar = CalendarState::new(date(2026, 3, 4));
    calendar.load(&api, &session()).await.unwrap();

    assert!(calendar.has_reflection(date(2026, 3, 2)));
    assert!(!calendar.has_reflection(date(2026, 4, 1)));
    assert!(calendar.open_detail(date(2026, 3, 2)));
    assert!(!calendar.open_detail(date(2026, 3, 3)));
}

#[tokio::test]
async fn insights_come_from_the_server_when_available() {
    let api = FakeApi::new();
    let insight = Insight {
        kind: InsightKind::Motivation,
        title: "Keep going".to_string(),
        message: "Three days in a row".to_string(),
        color: Some("green".to_string()),
    };
    api.set_insights(vec![insight.clone()]);

    let mut insights = InsightsState::new();
    insights
        .load(&api, &session(), date(2026, 3, 4), TimeOfDay::Morning)
        .await
        .unwrap();

    assert_eq!(insights.source, Some(InsightSource::Server));
    assert_eq!(insights.insights, vec![insight]);
}

#[tokio::test]
async fn insights_fall_back_to_local_ones() {
    let api = FakeApi::new();
    let session = session();
    let today = date(2026, 3, 4);
    api.seed_reflection(date(2026, 3, 3), ["Okay", "Wrote tests", "Start earlier"]);
    let mut goals = GoalsState::new();
    goals.create(&api, &session, "Ship v1", Some(date(2026, 3, 6))).await.unwrap();
    api.fail("morning_insights");

    let mut insights = InsightsState::new();
    insights.load(&api, &session, today, TimeOfDay::Morning).await.unwrap();

    assert_eq!(insights.source, Some(InsightSource::Local));
    assert!(insights.error.is_none());
    assert!(!insights.insights.is_empty());
    assert_eq!(insights.active_goals.len(), 1);
    assert!(insights.yesterday.is_some());
}
