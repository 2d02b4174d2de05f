use crate::api::{ApiError, ReflectApi};
use crate::config::Theme;
use crate::models::{GoalStatus, JournalEntry, RecurrencePattern, ScheduledTask, TaskDraft, UserStats};
use crate::state::calendar::CalendarState;
use crate::state::goals::GoalsState;
use crate::state::insights::InsightsState;
use crate::state::journal::{JournalScope, JournalState};
use crate::state::reflection::ReflectionState;
use crate::state::week::WeekState;
use crate::state::FLASH_DURATION;
use crate::tui::widgets::editor::Editor;
use crate::utils::{self, TimeOfDay};
use crate::{Config, Session};
use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use std::time::{Duration, Instant};

/// How often the local clock is consulted for time of day and date changes
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Insights,
    Reflection,
    TodayJournal,
    AllJournal,
    PreviousDays,
    Week,
    ActiveGoals,
    CompletedGoals,
}

impl Screen {
    pub const ALL: [Screen; 8] = [
        Screen::Insights,
        Screen::Reflection,
        Screen::TodayJournal,
        Screen::AllJournal,
        Screen::PreviousDays,
        Screen::Week,
        Screen::ActiveGoals,
        Screen::CompletedGoals,
    ];

    /// Screen shown at startup: insights in the morning, the reflection at night
    pub fn home(time_of_day: TimeOfDay) -> Self {
        match time_of_day {
            TimeOfDay::Morning => Screen::Insights,
            TimeOfDay::Evening => Screen::Reflection,
        }
    }

    pub fn title(&self, time_of_day: TimeOfDay) -> &'static str {
        match self {
            Screen::Insights => "Morning Insights",
            Screen::Reflection => match time_of_day {
                TimeOfDay::Morning => "Today's Reflection",
                TimeOfDay::Evening => "Tonight's Reflection",
            },
            Screen::TodayJournal => "Today's Journal",
            Screen::AllJournal => "All Entries",
            Screen::PreviousDays => "Previous Days",
            Screen::Week => "Weekly Calendar",
            Screen::ActiveGoals => "Active Goals",
            Screen::CompletedGoals => "Completed Goals",
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Something the sidebar or a key binding can navigate to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Screen(Screen),
    NewGoal,
    NewJournal,
    NewTask,
}

impl NavTarget {
    pub fn label(&self, time_of_day: TimeOfDay) -> &'static str {
        match self {
            NavTarget::Screen(screen) => screen.title(time_of_day),
            NavTarget::NewGoal => "New Goal",
            NavTarget::NewJournal => "New Journal Entry",
            NavTarget::NewTask => "New Task",
        }
    }
}

pub const SIDEBAR_ITEMS: [NavTarget; 11] = [
    NavTarget::Screen(Screen::Insights),
    NavTarget::Screen(Screen::Reflection),
    NavTarget::NewGoal,
    NavTarget::NewJournal,
    NavTarget::Screen(Screen::TodayJournal),
    NavTarget::Screen(Screen::AllJournal),
    NavTarget::Screen(Screen::PreviousDays),
    NavTarget::Screen(Screen::Week),
    NavTarget::NewTask,
    NavTarget::Screen(Screen::ActiveGoals),
    NavTarget::Screen(Screen::CompletedGoals),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarState {
    Expanded,
    Collapsed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message in the status bar
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub shown_at: Instant,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.into(),
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: "Error".to_string(),
            message: message.into(),
            shown_at: Instant::now(),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= FLASH_DURATION
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekShift {
    Previous,
    Next,
    This,
}

/// Everything the controller can be asked to do. Each one is a single awaited call.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Navigate(NavTarget),
    Reload,
    SubmitReflection,
    SaveReflectionEdit,
    CreateGoal { description: String, deadline: Option<NaiveDate> },
    EditGoal { id: i64, description: String, deadline: Option<NaiveDate> },
    SetGoalStatus { id: i64, status: GoalStatus },
    DeleteGoal(i64),
    CreateJournal { content: String, entry_date: NaiveDate },
    UpdateJournal { id: i64, content: String },
    /// Delete the journal entry awaiting confirmation
    ConfirmJournalDelete,
    ShiftMonth(i32),
    CalendarMoveCursor(i64),
    ShiftWeek(WeekShift),
    SaveTask(TaskDraft),
    ToggleTask(i64),
    DeleteTask(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalField {
    Description,
    Deadline,
}

#[derive(Debug, Clone)]
pub struct GoalForm {
    pub current_field: GoalField,
    pub description: Editor,
    pub deadline: Editor,
    pub editing_item_id: Option<i64>, // None for new goals
    pub error: Option<String>,
}

impl GoalForm {
    pub fn new() -> Self {
        Self {
            current_field: GoalField::Description,
            description: Editor::new(),
            deadline: Editor::new(),
            editing_item_id: None,
            error: None,
        }
    }

    pub fn edit(id: i64, description: &str, deadline: Option<NaiveDate>) -> Self {
        Self {
            current_field: GoalField::Description,
            description: Editor::from_string(description),
            deadline: Editor::from_string(&deadline.map(|d| d.to_string()).unwrap_or_default()),
            editing_item_id: Some(id),
            error: None,
        }
    }

    pub fn navigate(&mut self) {
        self.current_field = match self.current_field {
            GoalField::Description => GoalField::Deadline,
            GoalField::Deadline => GoalField::Description,
        };
    }

    pub fn current_editor_mut(&mut self) -> &mut Editor {
        match self.current_field {
            GoalField::Description => &mut self.description,
            GoalField::Deadline => &mut self.deadline,
        }
    }

    pub fn to_intent(&self) -> Result<Intent, String> {
        let raw = self.deadline.text();
        let deadline = if raw.trim().is_empty() {
            None
        } else {
            Some(utils::parse_date(raw.trim()).map_err(|_| "Deadline must be YYYY-MM-DD".to_string())?)
        };
        let description = self.description.text();
        Ok(match self.editing_item_id {
            Some(id) => Intent::EditGoal { id, description, deadline },
            None => Intent::CreateGoal { description, deadline },
        })
    }
}

impl Default for GoalForm {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct JournalForm {
    pub content: Editor,
    pub entry_date: NaiveDate,
    pub editing_item_id: Option<i64>,
    pub error: Option<String>,
}

impl JournalForm {
    pub fn new(entry_date: NaiveDate) -> Self {
        Self {
            content: Editor::new(),
            entry_date,
            editing_item_id: None,
            error: None,
        }
    }

    pub fn edit(entry: &JournalEntry) -> Self {
        Self {
            content: Editor::from_string(&entry.content),
            entry_date: entry.entry_date,
            editing_item_id: Some(entry.id),
            error: None,
        }
    }

    pub fn to_intent(&self) -> Intent {
        let content = self.content.text();
        match self.editing_item_id {
            Some(id) => Intent::UpdateJournal { id, content },
            None => Intent::CreateJournal {
                content,
                entry_date: self.entry_date,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Date,
    Start,
    End,
    Repeat,
}

impl TaskField {
    const ORDER: [TaskField; 6] = [
        TaskField::Title,
        TaskField::Description,
        TaskField::Date,
        TaskField::Start,
        TaskField::End,
        TaskField::Repeat,
    ];
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub title: Editor,
    pub description: Editor,
    pub date: Editor,
    pub start: Editor,
    pub end: Editor,
    pub recurrence: Option<RecurrencePattern>,
    pub editing_item_id: Option<i64>,
    pub error: Option<String>,
}

impl TaskForm {
    pub fn from_draft(draft: &TaskDraft) -> Self {
        Self {
            current_field: TaskField::Title,
            title: Editor::from_string(&draft.title),
            description: Editor::from_string(draft.description.as_deref().unwrap_or("")),
            date: Editor::from_string(&draft.task_date.to_string()),
            start: Editor::from_string(&draft.start_time.format("%H:%M").to_string()),
            end: Editor::from_string(&draft.end_time.format("%H:%M").to_string()),
            recurrence: draft.recurrence_pattern,
            editing_item_id: draft.id,
            error: None,
        }
    }

    pub fn navigate(&mut self, forward: bool) {
        let len = TaskField::ORDER.len();
        let pos = TaskField::ORDER.iter().position(|f| *f == self.current_field).unwrap_or(0);
        let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
        self.current_field = TaskField::ORDER[next];
    }

    /// None for the repeat selector
    pub fn current_editor_mut(&mut self) -> Option<&mut Editor> {
        match self.current_field {
            TaskField::Title => Some(&mut self.title),
            TaskField::Description => Some(&mut self.description),
            TaskField::Date => Some(&mut self.date),
            TaskField::Start => Some(&mut self.start),
            TaskField::End => Some(&mut self.end),
            TaskField::Repeat => None,
        }
    }

    /// Never, daily, weekdays, weekly, then back to never
    pub fn cycle_recurrence(&mut self) {
        self.recurrence = match self.recurrence {
            None => Some(RecurrencePattern::Daily),
            Some(RecurrencePattern::Daily) => Some(RecurrencePattern::Weekdays),
            Some(RecurrencePattern::Weekdays) => Some(RecurrencePattern::Weekly),
            Some(RecurrencePattern::Weekly) | Some(RecurrencePattern::Custom) => None,
        };
    }

    pub fn to_draft(&self) -> Result<TaskDraft, String> {
        let task_date = utils::parse_date(self.date.text().trim()).map_err(|_| "Date must be YYYY-MM-DD".to_string())?;
        let start_time = utils::parse_time(self.start.text().trim()).map_err(|_| "Start time must be HH:MM".to_string())?;
        let end_time = utils::parse_time(self.end.text().trim()).map_err(|_| "End time must be HH:MM".to_string())?;
        let description = self.description.text();
        Ok(TaskDraft {
            id: self.editing_item_id,
            title: self.title.text().trim().to_string(),
            description: if description.trim().is_empty() { None } else { Some(description) },
            task_date,
            start_time,
            end_time,
            is_recurring: self.recurrence.is_some(),
            recurrence_pattern: self.recurrence,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Goal { id: i64, label: String },
    JournalEntry { id: i64, label: String },
    Task { id: i64, label: String },
}

impl DeleteTarget {
    pub fn kind(&self) -> &'static str {
        match self {
            DeleteTarget::Goal { .. } => "goal",
            DeleteTarget::JournalEntry { .. } => "journal entry",
            DeleteTarget::Task { .. } => "task",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DeleteTarget::Goal { label, .. }
            | DeleteTarget::JournalEntry { label, .. }
            | DeleteTarget::Task { label, .. } => label,
        }
    }

    pub fn intent(&self) -> Intent {
        match self {
            DeleteTarget::Goal { id, .. } => Intent::DeleteGoal(*id),
            DeleteTarget::JournalEntry { .. } => Intent::ConfirmJournalDelete,
            DeleteTarget::Task { id, .. } => Intent::DeleteTask(*id),
        }
    }
}

/// At most one is open at a time
#[derive(Debug, Clone)]
pub enum Modal {
    GoalForm(GoalForm),
    JournalForm(JournalForm),
    TaskForm(TaskForm),
    ConfirmDelete { target: DeleteTarget, selection: usize }, // 0 = Delete, 1 = Cancel
    Help,
}

pub struct App<A: ReflectApi> {
    pub config: Config,
    pub api: A,
    pub session: Session,
    pub screen: Screen,
    pub focus: Focus,
    pub sidebar_state: SidebarState,
    pub sidebar_index: usize,
    pub modal: Option<Modal>,
    pub notification: Option<Notification>,
    pub reflection: ReflectionState,
    /// Text of the reflection question on screen
    pub answer_editor: Editor,
    pub goals: GoalsState,
    pub goal_cursor: usize,
    pub today_journal: JournalState,
    pub all_journal: JournalState,
    /// Open while typing a journal search
    pub search: Option<Editor>,
    pub calendar: CalendarState,
    pub week: WeekState,
    pub insights: InsightsState,
    pub stats: Option<UserStats>,
    pub time_of_day: TimeOfDay,
    pub theme: Theme,
    pub today: NaiveDate,
    pub content_scroll: u16,
    last_clock_check: Instant,
    reload_pending: bool,
}

impl<A: ReflectApi> App<A> {
    pub fn new(config: Config, api: A, session: Session) -> Self {
        let now = Local::now().naive_local();
        Self::with_clock(config, api, session, now)
    }

    /// Build the controller as if the local clock read `now`
    pub fn with_clock(config: Config, api: A, session: Session, now: NaiveDateTime) -> Self {
        let today = now.date();
        let time_of_day = TimeOfDay::from_hour(now.hour());
        let theme = config.get_active_theme(time_of_day);
        let screen = Screen::home(time_of_day);
        Self {
            config,
            api,
            session,
            screen,
            focus: Focus::Main,
            sidebar_state: SidebarState::Expanded,
            sidebar_index: SIDEBAR_ITEMS
                .iter()
                .position(|t| *t == NavTarget::Screen(screen))
                .unwrap_or(0),
            modal: None,
            notification: None,
            reflection: ReflectionState::new(today),
            answer_editor: Editor::new(),
            goals: GoalsState::new(),
            goal_cursor: 0,
            today_journal: JournalState::new(JournalScope::Date(today)),
            all_journal: JournalState::new(JournalScope::All),
            search: None,
            calendar: CalendarState::new(today),
            week: WeekState::new(today),
            insights: InsightsState::new(),
            stats: None,
            time_of_day,
            theme,
            today,
            content_scroll: 0,
            last_clock_check: Instant::now(),
            reload_pending: false,
        }
    }

    /// Initial fetches: goal counts and stats for the sidebar, then the home screen
    pub async fn start(&mut self) {
        if let Err(e) = self.goals.load(&self.api, &self.session).await {
            log::warn!("failed to load goals: {}", e);
        }
        self.refresh_stats().await;
        let _ = self.load_screen().await;
    }

    pub async fn refresh_stats(&mut self) {
        match self.api.stats(&self.session).await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => log::warn!("failed to load stats: {}", e),
        }
    }

    /// Fetch whatever the active screen shows
    pub async fn load_screen(&mut self) -> Result<(), ApiError> {
        let api = &self.api;
        let session = &self.session;
        let result = match self.screen {
            Screen::Insights => self.insights.load(api, session, self.today, self.time_of_day).await,
            Screen::Reflection => self.reflection.load(api, session).await,
            Screen::TodayJournal => self.today_journal.load(api, session, self.today).await,
            Screen::AllJournal => self.all_journal.load(api, session, self.today).await,
            Screen::PreviousDays => self.calendar.load(api, session).await,
            Screen::Week => self.week.load(api, session).await,
            Screen::ActiveGoals | Screen::CompletedGoals => self.goals.load(api, session).await,
        };
        if self.screen == Screen::Reflection {
            self.sync_answer_editor();
        }
        if let Err(ref e) = result {
            log::warn!("failed to load {}: {}", self.screen.title(self.time_of_day), e);
            self.notify(Notification::error(format!("Failed to load data: {}", e)));
        }
        result
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notification = Some(notification);
    }

    pub async fn dispatch(&mut self, intent: Intent) -> Result<(), ApiError> {
        log::debug!("dispatch {:?}", intent);
        let api = &self.api;
        let session = &self.session;
        match intent {
            Intent::Navigate(target) => {
                self.navigate(target).await;
                Ok(())
            }
            Intent::Reload => self.load_screen().await,
            Intent::SubmitReflection => {
                self.reflection.set_answer(self.answer_editor.text());
                let result = self.reflection.submit(api, session).await;
                self.after_reflection_save(result).await
            }
            Intent::SaveReflectionEdit => {
                self.reflection.set_answer(self.answer_editor.text());
                let result = self.reflection.save_edit(api, session).await;
                self.after_reflection_save(result).await
            }
            Intent::CreateGoal { description, deadline } => {
                match self.goals.create(api, session, &description, deadline).await {
                    Ok(_) => {
                        self.modal = None;
                        self.notify(Notification::success("Goal created!", "Your new goal has been added."));
                        Ok(())
                    }
                    Err(e) => Err(self.form_failed(e)),
                }
            }
            Intent::EditGoal { id, description, deadline } => {
                match self.goals.edit(api, session, id, &description, deadline).await {
                    Ok(_) => {
                        self.modal = None;
                        self.notify(Notification::success("Goal updated", "Your changes have been saved."));
                        Ok(())
                    }
                    Err(e) => Err(self.form_failed(e)),
                }
            }
            Intent::SetGoalStatus { id, status } => match self.goals.set_status(api, session, id, status).await {
                Ok(_) => {
                    self.notify(match status {
                        GoalStatus::Completed => {
                            Notification::success("Goal completed!", "Great work on completing your goal!")
                        }
                        GoalStatus::Active => Notification::success("Goal reopened", "Goal moved back to active."),
                    });
                    self.clamp_goal_cursor();
                    Ok(())
                }
                Err(e) => {
                    let what = match status {
                        GoalStatus::Completed => "Failed to update goal",
                        GoalStatus::Active => "Failed to reopen goal",
                    };
                    self.notify(Notification::error(format!("{}: {}", what, e)));
                    Err(e)
                }
            },
            Intent::DeleteGoal(id) => match self.goals.delete(api, session, id).await {
                Ok(()) => {
                    self.notify(Notification::success("Goal deleted", "Goal has been removed."));
                    self.clamp_goal_cursor();
                    Ok(())
                }
                Err(e) => {
                    self.notify(Notification::error(format!("Failed to delete goal: {}", e)));
                    Err(e)
                }
            },
            Intent::CreateJournal { content, entry_date } => {
                match self.today_journal.create(api, session, &content, entry_date).await {
                    Ok(entry) => {
                        self.all_journal.absorb(entry);
                        self.modal = None;
                        self.notify(Notification::success("Journal entry saved!", "Your thoughts have been captured."));
                        Ok(())
                    }
                    Err(e) => Err(self.form_failed(e)),
                }
            }
            Intent::UpdateJournal { id, content } => {
                let result = if self.all_journal.contains(id) && !self.today_journal.contains(id) {
                    let result = self.all_journal.update(api, session, id, &content).await;
                    if let Ok(ref entry) = result {
                        self.today_journal.absorb(entry.clone());
                    }
                    result
                } else {
                    let result = self.today_journal.update(api, session, id, &content).await;
                    if let Ok(ref entry) = result {
                        self.all_journal.absorb(entry.clone());
                    }
                    result
                };
                match result {
                    Ok(_) => {
                        self.modal = None;
                        self.notify(Notification::success("Journal entry updated", "Your changes have been saved."));
                        Ok(())
                    }
                    Err(e) => Err(self.form_failed(e)),
                }
            }
            Intent::ConfirmJournalDelete => {
                let today = self.today;
                let (owner, other) = if self.today_journal.pending_delete.is_some() {
                    (&mut self.today_journal, &mut self.all_journal)
                } else {
                    (&mut self.all_journal, &mut self.today_journal)
                };
                let Some(id) = owner.pending_delete else {
                    return Ok(());
                };
                match owner.confirm_delete(api, session, today).await {
                    Ok(removed) => {
                        other.forget(id, today);
                        if removed {
                            self.notify(Notification::success("Entry deleted", "Journal entry has been removed."));
                        }
                        Ok(())
                    }
                    Err(e) => {
                        self.notify(Notification::error(format!("Failed to delete entry: {}", e)));
                        Err(e)
                    }
                }
            }
            Intent::ShiftMonth(delta) => {
                if delta < 0 {
                    self.calendar.previous_month();
                } else {
                    self.calendar.next_month();
                }
                self.load_screen_quiet(Screen::PreviousDays).await
            }
            Intent::CalendarMoveCursor(days) => {
                if self.calendar.move_cursor(days) {
                    self.load_screen_quiet(Screen::PreviousDays).await
                } else {
                    Ok(())
                }
            }
            Intent::ShiftWeek(shift) => {
                match shift {
                    WeekShift::Previous => self.week.previous_week(),
                    WeekShift::Next => self.week.next_week(),
                    WeekShift::This => self.week.this_week(self.today),
                }
                self.load_screen_quiet(Screen::Week).await
            }
            Intent::SaveTask(draft) => match self.week.save(api, session, &draft).await {
                Ok(task) => {
                    self.modal = None;
                    self.notify(Notification::success("Task saved", format!("\"{}\" is on your calendar.", task.title)));
                    Ok(())
                }
                Err(e) => Err(self.form_failed(e)),
            },
            Intent::ToggleTask(id) => match self.week.toggle_complete(api, session, id).await {
                Ok(_) => Ok(()),
                Err(e) => {
                    self.notify(Notification::error(format!("Failed to update task: {}", e)));
                    Err(e)
                }
            },
            Intent::DeleteTask(id) => match self.week.delete(api, session, id).await {
                Ok(()) => {
                    self.notify(Notification::success("Task deleted", "Task has been removed."));
                    Ok(())
                }
                Err(e) => {
                    self.notify(Notification::error(format!("Failed to delete task: {}", e)));
                    Err(e)
                }
            },
        }
    }

    async fn navigate(&mut self, target: NavTarget) {
        match target {
            NavTarget::Screen(screen) => {
                self.screen = screen;
                self.content_scroll = 0;
                self.search = None;
                self.goal_cursor = 0;
                if let Some(index) = SIDEBAR_ITEMS.iter().position(|t| *t == target) {
                    self.sidebar_index = index;
                }
                let _ = self.load_screen().await;
            }
            NavTarget::NewGoal => self.modal = Some(Modal::GoalForm(GoalForm::new())),
            NavTarget::NewJournal => self.modal = Some(Modal::JournalForm(JournalForm::new(self.today))),
            NavTarget::NewTask => {
                let draft = self.week.draft_at_cursor();
                self.modal = Some(Modal::TaskForm(TaskForm::from_draft(&draft)));
            }
        }
    }

    /// Re-fetch after calendar navigation; the container shows its own error inline
    async fn load_screen_quiet(&mut self, screen: Screen) -> Result<(), ApiError> {
        let result = match screen {
            Screen::Week => self.week.load(&self.api, &self.session).await,
            _ => self.calendar.load(&self.api, &self.session).await,
        };
        if let Err(ref e) = result {
            self.notify(Notification::error(format!("Failed to load data: {}", e)));
        }
        result
    }

    async fn after_reflection_save(&mut self, result: Result<(), ApiError>) -> Result<(), ApiError> {
        match result {
            Ok(()) => {
                self.sync_answer_editor();
                self.notify(Notification::success("Reflection saved", "See you tomorrow."));
                self.refresh_stats().await;
                Ok(())
            }
            Err(e) => {
                self.notify(Notification::error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Keep the open form so the user can fix the input
    fn form_failed(&mut self, err: ApiError) -> ApiError {
        let message = err.to_string();
        match self.modal {
            Some(Modal::GoalForm(ref mut form)) => form.error = Some(message),
            Some(Modal::JournalForm(ref mut form)) => form.error = Some(message),
            Some(Modal::TaskForm(ref mut form)) => form.error = Some(message),
            _ => self.notify(Notification::error(message)),
        }
        err
    }

    /// Load the text of the current question into the answer editor
    pub fn sync_answer_editor(&mut self) {
        self.answer_editor = Editor::from_string(self.reflection.current_answer().unwrap_or(""));
    }

    /// Store the editor text, then move between questions
    pub fn advance_question(&mut self) {
        self.reflection.set_answer(self.answer_editor.text());
        if self.reflection.can_proceed() {
            self.reflection.advance();
            self.sync_answer_editor();
        }
    }

    pub fn retreat_question(&mut self) {
        self.reflection.set_answer(self.answer_editor.text());
        self.reflection.retreat();
        self.sync_answer_editor();
    }

    pub fn begin_reflection_edit(&mut self) {
        self.reflection.begin_edit();
        self.sync_answer_editor();
    }

    pub fn cancel_reflection_edit(&mut self) {
        self.reflection.cancel_edit();
        self.sync_answer_editor();
    }

    /// Goals listed on the active goals screen or the completed goals screen
    pub fn visible_goals(&self) -> &[crate::models::Goal] {
        match self.screen {
            Screen::CompletedGoals => &self.goals.completed,
            _ => &self.goals.active,
        }
    }

    pub fn selected_goal(&self) -> Option<&crate::models::Goal> {
        self.visible_goals().get(self.goal_cursor)
    }

    pub fn move_goal_cursor(&mut self, delta: isize) {
        let len = self.visible_goals().len();
        self.goal_cursor = self.goal_cursor.saturating_add_signed(delta).min(len.saturating_sub(1));
    }

    fn clamp_goal_cursor(&mut self) {
        self.move_goal_cursor(0);
    }

    /// The journal list on screen, if any
    pub fn active_journal(&self) -> Option<&JournalState> {
        match self.screen {
            Screen::TodayJournal => Some(&self.today_journal),
            Screen::AllJournal => Some(&self.all_journal),
            _ => None,
        }
    }

    pub fn active_journal_mut(&mut self) -> Option<&mut JournalState> {
        match self.screen {
            Screen::TodayJournal => Some(&mut self.today_journal),
            Screen::AllJournal => Some(&mut self.all_journal),
            _ => None,
        }
    }

    pub fn selected_task(&self) -> Option<&ScheduledTask> {
        self.week.selected_task()
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_state = match self.sidebar_state {
            SidebarState::Expanded => SidebarState::Collapsed,
            SidebarState::Collapsed => SidebarState::Expanded,
        };
        if self.sidebar_state == SidebarState::Collapsed {
            self.focus = Focus::Main;
        }
    }

    pub fn move_sidebar(&mut self, delta: isize) {
        self.sidebar_index = self
            .sidebar_index
            .saturating_add_signed(delta)
            .min(SIDEBAR_ITEMS.len() - 1);
    }

    pub fn sidebar_target(&self) -> NavTarget {
        SIDEBAR_ITEMS[self.sidebar_index.min(SIDEBAR_ITEMS.len() - 1)]
    }

    /// Open the delete confirmation for the item under the cursor
    pub fn request_delete(&mut self) {
        let target = match self.screen {
            Screen::ActiveGoals | Screen::CompletedGoals => self.selected_goal().map(|g| DeleteTarget::Goal {
                id: g.id,
                label: g.description.clone(),
            }),
            Screen::Week => self.selected_task().map(|t| DeleteTarget::Task {
                id: t.id,
                label: t.title.clone(),
            }),
            Screen::TodayJournal | Screen::AllJournal => {
                let today = self.today;
                let selected = self
                    .active_journal()
                    .and_then(|j| j.selected_entry(today))
                    .map(|e| (e.id, preview(&e.content)));
                let (id, label) = match selected {
                    Some(found) => found,
                    None => return,
                };
                let requested = self.active_journal_mut().is_some_and(|j| j.request_delete(id));
                requested.then_some(DeleteTarget::JournalEntry { id, label })
            }
            _ => None,
        };
        if let Some(target) = target {
            self.modal = Some(Modal::ConfirmDelete { target, selection: 1 });
        }
    }

    /// Close any modal, dropping a pending journal delete
    pub fn close_modal(&mut self) {
        if let Some(Modal::ConfirmDelete { target: DeleteTarget::JournalEntry { .. }, .. }) = self.modal {
            self.today_journal.cancel_delete();
            self.all_journal.cancel_delete();
        }
        self.modal = None;
    }

    /// Open the edit form for the item under the cursor
    pub fn open_edit(&mut self) {
        let modal = match self.screen {
            Screen::ActiveGoals | Screen::CompletedGoals => self
                .selected_goal()
                .map(|g| Modal::GoalForm(GoalForm::edit(g.id, &g.description, g.deadline))),
            Screen::Week => self
                .selected_task()
                .map(|t| Modal::TaskForm(TaskForm::from_draft(&t.to_draft()))),
            Screen::TodayJournal | Screen::AllJournal => self
                .active_journal()
                .and_then(|j| j.selected_entry(self.today))
                .map(|e| Modal::JournalForm(JournalForm::edit(e))),
            Screen::Reflection => {
                self.begin_reflection_edit();
                None
            }
            _ => None,
        };
        if modal.is_some() {
            self.modal = modal;
        }
    }

    pub fn open_search(&mut self) {
        if let Some(journal) = self.active_journal() {
            self.search = Some(Editor::from_string(&journal.query));
        }
    }

    pub fn update_search(&mut self) {
        let query = self.search.as_ref().map(|e| e.text()).unwrap_or_default();
        if let Some(journal) = self.active_journal_mut() {
            journal.set_query(query);
        }
    }

    /// Close the search box; `clear` also drops the query
    pub fn close_search(&mut self, clear: bool) {
        self.search = None;
        if clear {
            if let Some(journal) = self.active_journal_mut() {
                journal.set_query("");
            }
        }
    }

    /// Text the copy binding puts on the clipboard for the current screen
    pub fn copy_text(&self) -> Option<String> {
        match self.screen {
            Screen::Reflection => match self.reflection.saved() {
                Some(record) if self.reflection.is_completed() => Some(
                    record
                        .answers()
                        .iter()
                        .map(|a| a.unwrap_or(""))
                        .collect::<Vec<_>>()
                        .join("\n\n"),
                ),
                _ => Some(self.answer_editor.text()),
            },
            Screen::TodayJournal | Screen::AllJournal => self
                .active_journal()
                .and_then(|j| j.selected_entry(self.today))
                .map(|e| e.content.clone()),
            Screen::ActiveGoals | Screen::CompletedGoals => self.selected_goal().map(|g| g.description.clone()),
            Screen::Week => self.selected_task().map(|t| t.title.clone()),
            _ => None,
        }
    }

    /// Periodic work: notification expiry, success markers, and the clock check
    pub fn tick(&mut self, now: Instant) {
        if self.notification.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.notification = None;
        }
        self.reflection.tick(now);
        self.goals.success.expire(now);
        self.today_journal.success.expire(now);
        self.all_journal.success.expire(now);

        if now.saturating_duration_since(self.last_clock_check) >= CLOCK_INTERVAL {
            self.last_clock_check = now;
            self.apply_clock(Local::now().naive_local());
        }
    }

    /// Recompute time of day and theme; a new date resets today's views
    pub fn apply_clock(&mut self, now: NaiveDateTime) {
        let time_of_day = TimeOfDay::from_hour(now.hour());
        if time_of_day != self.time_of_day {
            log::info!("time of day is now {:?}", time_of_day);
            self.time_of_day = time_of_day;
            self.theme = self.config.get_active_theme(time_of_day);
        }

        let today = now.date();
        if today != self.today {
            log::info!("date changed to {}", today);
            self.today = today;
            self.reflection = ReflectionState::new(today);
            self.answer_editor = Editor::new();
            self.today_journal.set_scope(JournalScope::Date(today));
            self.reload_pending = true;
        }
    }

    /// True once after the date changed; the event loop then reloads the screen
    pub fn take_reload(&mut self) -> bool {
        std::mem::take(&mut self.reload_pending)
    }
}

/// First line of an entry, shortened for list rows and dialogs
pub fn preview(content: &str) -> String {
    const MAX: usize = 60;
    let first = content.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if first.chars().count() > MAX {
        format!("{}...", first.chars().take(MAX - 3).collect::<String>())
    } else {
        first.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_cycle_in_both_directions() {
        assert_eq!(Screen::CompletedGoals.next(), Screen::Insights);
        assert_eq!(Screen::Insights.prev(), Screen::CompletedGoals);
        assert_eq!(Screen::Reflection.next(), Screen::TodayJournal);
    }

    #[test]
    fn home_screen_and_titles_follow_time_of_day() {
        assert_eq!(Screen::home(TimeOfDay::Morning), Screen::Insights);
        assert_eq!(Screen::home(TimeOfDay::Evening), Screen::Reflection);
        assert_eq!(Screen::Reflection.title(TimeOfDay::Evening), "Tonight's Reflection");
    }

    #[test]
    fn goal_form_rejects_bad_deadline() {
        let mut form = GoalForm::new();
        form.description = Editor::from_string("Ship v1");
        form.deadline = Editor::from_string("next week");
        assert!(form.to_intent().is_err());

        form.deadline = Editor::from_string("2099-01-01");
        assert_eq!(
            form.to_intent().unwrap(),
            Intent::CreateGoal {
                description: "Ship v1".to_string(),
                deadline: NaiveDate::from_ymd_opt(2099, 1, 1),
            }
        );
    }

    #[test]
    fn task_form_round_trips_a_draft() {
        let draft = TaskDraft {
            id: Some(4),
            title: "Standup".to_string(),
            description: None,
            task_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            start_time: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: chrono::NaiveTime::from_hms_opt(9, 15, 0).unwrap(),
            is_recurring: false,
            recurrence_pattern: None,
        };
        let mut form = TaskForm::from_draft(&draft);
        assert_eq!(form.to_draft().unwrap(), draft);

        form.cycle_recurrence();
        form.cycle_recurrence();
        let repeating = form.to_draft().unwrap();
        assert!(repeating.is_recurring);
        assert_eq!(repeating.recurrence_pattern, Some(RecurrencePattern::Weekdays));
    }

    #[test]
    fn preview_uses_first_non_blank_line() {
        assert_eq!(preview("\n  Morning run\nthen coffee"), "Morning run");
        assert_eq!(preview(&"x".repeat(80)).chars().count(), 60);
    }
}
