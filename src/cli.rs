use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::{ApiError, ReflectApi};
use crate::models::{Goal, GoalStatus, GoalUpdate, NewGoal, NewJournalEntry, NewReflection, RecurrencePattern, TaskDraft};
use crate::session::Session;
use crate::utils::{parse_date, parse_time, today};

#[derive(Parser)]
#[command(name = "reflect")]
#[command(about = "Daily reflection, journal, goals and weekly planning in the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (separate dev config and log)
    #[arg(long)]
    pub dev: bool,

    /// Override the API root for this run
    #[arg(long)]
    pub api_url: Option<String>,

    /// Act as this user for this run
    #[arg(long)]
    pub user_id: Option<i64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Save today's reflection in one go
    Reflect {
        /// How was your day?
        summary: String,
        /// What did you accomplish?
        accomplishments: String,
        /// What do you want to improve tomorrow?
        improvements: String,
    },
    /// Add a new goal
    AddGoal {
        /// What you want to achieve
        description: String,
        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,
    },
    /// List goals
    Goals {
        /// Show completed goals instead of active ones
        #[arg(long)]
        completed: bool,
    },
    /// Mark a goal as completed
    CompleteGoal {
        /// Goal ID
        id: i64,
    },
    /// Add a journal entry for today
    AddJournal {
        /// Journal content
        content: String,
    },
    /// Schedule a task on the weekly calendar
    AddTask {
        /// Task title
        title: String,
        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM)
        #[arg(long)]
        end: String,
        /// Optional details
        #[arg(long)]
        description: Option<String>,
        /// daily, weekdays or weekly
        #[arg(long)]
        repeat: Option<String>,
    },
    /// Show reflection streak statistics
    Stats,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("API error: {0}")]
    ApiError(#[from] ApiError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn parse_date_arg(value: &str) -> Result<chrono::NaiveDate, CliError> {
    parse_date(value).map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", value, e)))
}

fn parse_time_arg(value: &str) -> Result<chrono::NaiveTime, CliError> {
    parse_time(value).map_err(|e| CliError::TimeParseError(format!("Invalid time format '{}': {}", value, e)))
}

/// Build a task body from the add-task arguments
pub fn build_task_draft(
    title: &str,
    date: &str,
    start: &str,
    end: &str,
    description: Option<String>,
    repeat: Option<&str>,
) -> Result<TaskDraft, CliError> {
    if title.trim().is_empty() {
        return Err(CliError::InvalidInput("task title cannot be empty".to_string()));
    }
    let recurrence_pattern = match repeat {
        Some(value) => Some(
            RecurrencePattern::parse(value)
                .ok_or_else(|| CliError::InvalidInput(format!("unknown repeat pattern '{}'", value)))?,
        ),
        None => None,
    };
    let start_time = parse_time_arg(start)?;
    let end_time = parse_time_arg(end)?;
    if end_time <= start_time {
        return Err(CliError::InvalidInput("end time must be after start time".to_string()));
    }
    Ok(TaskDraft {
        id: None,
        title: title.trim().to_string(),
        description: description.filter(|d| !d.trim().is_empty()),
        task_date: parse_date_arg(date)?,
        start_time,
        end_time,
        is_recurring: recurrence_pattern.is_some(),
        recurrence_pattern,
    })
}

/// One line of `goals` output
pub fn format_goal_line(goal: &Goal) -> String {
    let check = if goal.is_completed() { "x" } else { " " };
    match goal.deadline {
        Some(deadline) => format!("[{}] #{} {} (due {})", check, goal.id, goal.description, deadline),
        None => format!("[{}] #{} {}", check, goal.id, goal.description),
    }
}

/// Handle the reflect command
pub async fn handle_reflect<A: ReflectApi>(
    api: &A,
    session: &Session,
    summary: String,
    accomplishments: String,
    improvements: String,
) -> Result<(), CliError> {
    if [&summary, &accomplishments, &improvements].iter().any(|a| a.trim().is_empty()) {
        return Err(CliError::InvalidInput("Please answer all three questions".to_string()));
    }
    let body = NewReflection {
        reflection_date: today(),
        summary,
        accomplishments,
        improvements_to_make: improvements,
    };
    let saved = api.upsert_reflection(session, &body).await?;
    println!("Reflection saved for {}", saved.reflection_date);
    Ok(())
}

/// Handle the add-goal command
pub async fn handle_add_goal<A: ReflectApi>(
    api: &A,
    session: &Session,
    description: String,
    deadline: Option<String>,
) -> Result<(), CliError> {
    if description.trim().is_empty() {
        return Err(CliError::InvalidInput("goal description cannot be empty".to_string()));
    }
    let deadline = deadline.as_deref().map(parse_date_arg).transpose()?;
    let goal = api
        .create_goal(session, &NewGoal { description: description.trim().to_string(), deadline })
        .await?;
    println!("Goal created successfully (ID: {})", goal.id);
    Ok(())
}

/// Handle the goals command
pub async fn handle_goals<A: ReflectApi>(api: &A, session: &Session, completed: bool) -> Result<(), CliError> {
    let status = if completed { GoalStatus::Completed } else { GoalStatus::Active };
    let goals = api.goals(session, Some(status)).await?;
    if goals.is_empty() {
        println!("No {} goals", status.as_str());
    }
    for goal in &goals {
        println!("{}", format_goal_line(goal));
    }
    Ok(())
}

/// Handle the complete-goal command
pub async fn handle_complete_goal<A: ReflectApi>(api: &A, session: &Session, id: i64) -> Result<(), CliError> {
    let update = GoalUpdate {
        status: Some(GoalStatus::Completed),
        ..GoalUpdate::default()
    };
    let goal = api.update_goal(session, id, &update).await?;
    println!("Goal completed: {}", goal.description);
    Ok(())
}

/// Handle the add-journal command
pub async fn handle_add_journal<A: ReflectApi>(api: &A, session: &Session, content: String) -> Result<(), CliError> {
    if content.trim().is_empty() {
        return Err(CliError::InvalidInput("journal content cannot be empty".to_string()));
    }
    let body = NewJournalEntry {
        content,
        entry_date: today(),
        reflection_id: None,
    };
    let entry = api.create_journal_entry(session, &body).await?;
    println!("Journal entry created successfully (ID: {})", entry.id);
    Ok(())
}

/// Handle the add-task command
pub async fn handle_add_task<A: ReflectApi>(api: &A, session: &Session, draft: TaskDraft) -> Result<(), CliError> {
    let task = api.create_scheduled_task(session, &draft).await?;
    println!(
        "Task scheduled (ID: {}) on {} {}-{}",
        task.id,
        task.task_date,
        task.start_time.format("%H:%M"),
        task.end_time.format("%H:%M")
    );
    Ok(())
}

/// Handle the stats command
pub async fn handle_stats<A: ReflectApi>(api: &A, session: &Session) -> Result<(), CliError> {
    let stats = api.stats(session).await?;
    println!("Current streak: {} days", stats.current_streak);
    println!("Longest streak: {} days", stats.longest_streak);
    println!("Total reflections: {}", stats.total_reflections);
    Ok(())
}
