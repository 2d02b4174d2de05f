use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

use crate::api::ReflectApi;
use crate::config::KeyBindings;
use crate::models::GoalStatus;
use crate::state::reflection::ReflectionPhase;
use crate::tui::app::{
    App, Focus, Intent, Modal, NavTarget, Notification, Screen, SidebarState, TaskField, WeekShift,
};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::utils::{has_primary_modifier, parse_key_binding, ParsedKeyBinding};

/// Guard that ensures terminal state is restored even on panic
/// If the terminal is left in raw mode or alternate screen, the user's terminal is unusable.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Manually restore terminal state (called on normal exit)
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Ignore errors in drop - we're already in a cleanup path
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Key bindings from the config, parsed once at startup
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub toggle_sidebar: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub new_goal: ParsedKeyBinding,
    pub new_journal: ParsedKeyBinding,
    pub new_task: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub search: ParsedKeyBinding,
    pub select: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub previous: ParsedKeyBinding,
    pub next: ParsedKeyBinding,
    pub screen_prev: ParsedKeyBinding,
    pub screen_next: ParsedKeyBinding,
    pub save: ParsedKeyBinding,
    pub toggle_complete: ParsedKeyBinding,
    pub cycle_range: ParsedKeyBinding,
    pub load_more: ParsedKeyBinding,
    pub reload: ParsedKeyBinding,
    pub copy: ParsedKeyBinding,
}

impl KeyMap {
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |name: &str, value: &str| {
            parse_key_binding(value).map_err(|e| TuiError::KeyBindingError(format!("{}: {}", name, e)))
        };
        Ok(Self {
            quit: parse("quit", &bindings.quit)?,
            toggle_sidebar: parse("toggle_sidebar", &bindings.toggle_sidebar)?,
            help: parse("help", &bindings.help)?,
            new_goal: parse("new_goal", &bindings.new_goal)?,
            new_journal: parse("new_journal", &bindings.new_journal)?,
            new_task: parse("new_task", &bindings.new_task)?,
            edit: parse("edit", &bindings.edit)?,
            delete: parse("delete", &bindings.delete)?,
            search: parse("search", &bindings.search)?,
            select: parse("select", &bindings.select)?,
            list_up: parse("list_up", &bindings.list_up)?,
            list_down: parse("list_down", &bindings.list_down)?,
            previous: parse("previous", &bindings.previous)?,
            next: parse("next", &bindings.next)?,
            screen_prev: parse("screen_prev", &bindings.screen_prev)?,
            screen_next: parse("screen_next", &bindings.screen_next)?,
            save: parse("save", &bindings.save)?,
            toggle_complete: parse("toggle_complete", &bindings.toggle_complete)?,
            cycle_range: parse("cycle_range", &bindings.cycle_range)?,
            load_more: parse("load_more", &bindings.load_more)?,
            reload: parse("reload", &bindings.reload)?,
            copy: parse("copy", &bindings.copy)?,
        })
    }
}

/// What the loop does after a key press
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Continue,
    Quit,
    Dispatch(Intent),
}

pub fn run_event_loop<A: ReflectApi>(mut app: App<A>, runtime: &Runtime) -> Result<(), TuiError> {
    // Check terminal size before entering alternate screen so the error shows in the normal terminal
    let (width, height) = terminal_size().map_err(TuiError::IoError)?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let keys = KeyMap::from_config(&app.config.key_bindings)?;

    runtime.block_on(app.start());

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.tick(Instant::now());
        if app.take_reload() {
            let _ = runtime.block_on(app.dispatch(Intent::Reload));
        }

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(
                terminal_rect,
                app.config.sidebar_width_percent,
                app.sidebar_state == SidebarState::Collapsed,
            );
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only process Press events to avoid duplicate processing on Windows
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press {
                    match handle_key_event(&mut app, &keys, key_event)? {
                        Action::Quit => break,
                        Action::Dispatch(intent) => {
                            // Failures are already on screen as notifications and inline errors
                            if let Err(e) = runtime.block_on(app.dispatch(intent)) {
                                log::debug!("intent failed: {}", e);
                            }
                        }
                        Action::Continue => {}
                    }
                }
            }
        }
    }

    guard.restore()?;
    Ok(())
}

pub fn handle_key_event<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    if app.modal.is_some() {
        return handle_modal(app, keys, key_event);
    }

    if app.screen == Screen::PreviousDays && app.calendar.detail.is_some() {
        if matches!(key_event.code, KeyCode::Esc | KeyCode::Enter) || matches_key_event(key_event, &keys.quit) {
            app.calendar.close_detail();
        }
        return Ok(Action::Continue);
    }

    if app.search.is_some() {
        return handle_search(app, key_event);
    }

    if matches_key_event(key_event, &keys.help) {
        app.modal = Some(Modal::Help);
        return Ok(Action::Continue);
    }

    if app.focus == Focus::Sidebar {
        return handle_sidebar(app, keys, key_event);
    }

    if app.screen == Screen::Reflection && !app.reflection.is_completed() {
        return handle_reflection_input(app, keys, key_event);
    }

    if let Some(action) = handle_global_key_bindings(app, keys, key_event)? {
        return Ok(action);
    }

    match app.screen {
        Screen::Reflection => handle_completed_reflection(app, keys, key_event),
        Screen::ActiveGoals | Screen::CompletedGoals => handle_goals(app, keys, key_event),
        Screen::TodayJournal | Screen::AllJournal => handle_journal(app, keys, key_event),
        Screen::PreviousDays => handle_calendar(app, keys, key_event),
        Screen::Week => handle_week(app, keys, key_event),
        Screen::Insights => {
            if is_up(keys, key_event) {
                app.content_scroll = app.content_scroll.saturating_sub(1);
            } else if is_down(keys, key_event) {
                app.content_scroll = app.content_scroll.saturating_add(1);
            }
            Ok(Action::Continue)
        }
    }
}

/// Keys that work on every screen outside text entry
fn handle_global_key_bindings<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Option<Action>, TuiError> {
    if matches_key_event(key_event, &keys.quit) {
        return Ok(Some(Action::Quit));
    }
    if matches_key_event(key_event, &keys.toggle_sidebar) {
        app.toggle_sidebar();
        return Ok(Some(Action::Continue));
    }
    if key_event.code == KeyCode::Tab || key_event.code == KeyCode::Esc {
        if app.sidebar_state == SidebarState::Expanded {
            app.focus = Focus::Sidebar;
        }
        return Ok(Some(Action::Continue));
    }
    let navigate = |target: NavTarget| -> Result<Option<Action>, TuiError> {
        Ok(Some(Action::Dispatch(Intent::Navigate(target))))
    };
    if matches_key_event(key_event, &keys.new_goal) {
        return navigate(NavTarget::NewGoal);
    }
    if matches_key_event(key_event, &keys.new_journal) {
        return navigate(NavTarget::NewJournal);
    }
    if matches_key_event(key_event, &keys.new_task) {
        return navigate(NavTarget::NewTask);
    }
    if matches_key_event(key_event, &keys.screen_prev) {
        return navigate(NavTarget::Screen(app.screen.prev()));
    }
    if matches_key_event(key_event, &keys.screen_next) {
        return navigate(NavTarget::Screen(app.screen.next()));
    }
    if matches_key_event(key_event, &keys.reload) {
        return Ok(Some(Action::Dispatch(Intent::Reload)));
    }
    if matches_key_event(key_event, &keys.copy) {
        copy_current(app);
        return Ok(Some(Action::Continue));
    }
    Ok(None)
}

fn handle_sidebar<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    if is_up(keys, key_event) {
        app.move_sidebar(-1);
    } else if is_down(keys, key_event) {
        app.move_sidebar(1);
    } else if matches_key_event(key_event, &keys.select) || key_event.code == KeyCode::Right {
        app.focus = Focus::Main;
        return Ok(Action::Dispatch(Intent::Navigate(app.sidebar_target())));
    } else if matches!(key_event.code, KeyCode::Tab | KeyCode::Esc) {
        app.focus = Focus::Main;
    } else if let Some(action) = handle_global_key_bindings(app, keys, key_event)? {
        return Ok(action);
    }
    Ok(Action::Continue)
}

/// Answer entry while the reflection is in progress or being edited
fn handle_reflection_input<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    let last = app.reflection.index().is_some_and(|i| i.is_last());

    if matches_key_event(key_event, &keys.save) {
        if !last {
            app.advance_question();
            return Ok(Action::Continue);
        }
        let intent = if app.reflection.is_editing() {
            Intent::SaveReflectionEdit
        } else {
            Intent::SubmitReflection
        };
        return Ok(Action::Dispatch(intent));
    }

    match key_event.code {
        KeyCode::Esc => {
            if app.reflection.is_editing() {
                app.cancel_reflection_edit();
            } else {
                app.reflection.set_answer(app.answer_editor.text());
                if app.sidebar_state == SidebarState::Expanded {
                    app.focus = Focus::Sidebar;
                }
            }
        }
        KeyCode::Tab => app.advance_question(),
        KeyCode::BackTab => app.retreat_question(),
        _ => {
            if matches_key_event(key_event, &keys.copy) {
                copy_current(app);
            } else if is_paste(key_event) {
                if let Some(text) = paste_from_clipboard(app) {
                    app.answer_editor.insert_str(&text);
                    app.reflection.set_answer(app.answer_editor.text());
                }
            } else if app.answer_editor.handle_key(key_event, true) {
                app.reflection.set_answer(app.answer_editor.text());
            }
        }
    }
    Ok(Action::Continue)
}

fn handle_completed_reflection<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    if matches_key_event(key_event, &keys.edit) {
        if let ReflectionPhase::Completed { .. } = app.reflection.phase {
            app.begin_reflection_edit();
        }
    } else if is_up(keys, key_event) {
        app.content_scroll = app.content_scroll.saturating_sub(1);
    } else if is_down(keys, key_event) {
        app.content_scroll = app.content_scroll.saturating_add(1);
    }
    Ok(Action::Continue)
}

fn handle_goals<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    if is_up(keys, key_event) {
        app.move_goal_cursor(-1);
    } else if is_down(keys, key_event) {
        app.move_goal_cursor(1);
    } else if matches_key_event(key_event, &keys.toggle_complete) || matches_key_event(key_event, &keys.select) {
        if let Some(goal) = app.selected_goal() {
            let status = if goal.is_completed() {
                GoalStatus::Active
            } else {
                GoalStatus::Completed
            };
            return Ok(Action::Dispatch(Intent::SetGoalStatus { id: goal.id, status }));
        }
    } else if matches_key_event(key_event, &keys.edit) {
        app.open_edit();
    } else if matches_key_event(key_event, &keys.delete) {
        app.request_delete();
    }
    Ok(Action::Continue)
}

fn handle_journal<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    let today = app.today;
    if is_up(keys, key_event) {
        if let Some(journal) = app.active_journal_mut() {
            journal.move_selection(-1, today);
        }
    } else if is_down(keys, key_event) {
        if let Some(journal) = app.active_journal_mut() {
            journal.move_selection(1, today);
        }
    } else if matches_key_event(key_event, &keys.select) {
        let opened = app.active_journal_mut().and_then(|j| j.activate(today));
        if let Some(entry) = opened {
            app.modal = Some(Modal::JournalForm(crate::tui::app::JournalForm::edit(&entry)));
        }
    } else if matches_key_event(key_event, &keys.search) {
        app.open_search();
    } else if matches_key_event(key_event, &keys.cycle_range) {
        if let Some(journal) = app.active_journal_mut() {
            journal.cycle_range();
        }
    } else if matches_key_event(key_event, &keys.load_more) {
        if let Some(journal) = app.active_journal_mut() {
            journal.load_more();
        }
    } else if matches_key_event(key_event, &keys.edit) {
        app.open_edit();
    } else if matches_key_event(key_event, &keys.delete) {
        app.request_delete();
    }
    Ok(Action::Continue)
}

fn handle_search<A: ReflectApi>(app: &mut App<A>, key_event: KeyEvent) -> Result<Action, TuiError> {
    match key_event.code {
        KeyCode::Esc => app.close_search(true),
        KeyCode::Enter => app.close_search(false),
        _ => {
            let changed = app
                .search
                .as_mut()
                .is_some_and(|editor| editor.handle_key(key_event, false));
            if changed {
                app.update_search();
            }
        }
    }
    Ok(Action::Continue)
}

fn handle_calendar<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    let step = if matches_key_event(key_event, &keys.previous) {
        Some(-1)
    } else if matches_key_event(key_event, &keys.next) {
        Some(1)
    } else if is_up(keys, key_event) {
        Some(-7)
    } else if is_down(keys, key_event) {
        Some(7)
    } else {
        None
    };
    if let Some(days) = step {
        return Ok(Action::Dispatch(Intent::CalendarMoveCursor(days)));
    }

    match key_event.code {
        KeyCode::PageUp => return Ok(Action::Dispatch(Intent::ShiftMonth(-1))),
        KeyCode::PageDown => return Ok(Action::Dispatch(Intent::ShiftMonth(1))),
        _ => {}
    }
    if matches_key_event(key_event, &keys.select) {
        app.calendar.open_cursor_detail();
    }
    Ok(Action::Continue)
}

fn handle_week<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    if matches_key_event(key_event, &keys.previous) {
        app.week.move_cursor(-1, 0);
    } else if matches_key_event(key_event, &keys.next) {
        app.week.move_cursor(1, 0);
    } else if is_up(keys, key_event) {
        app.week.move_cursor(0, -1);
    } else if is_down(keys, key_event) {
        app.week.move_cursor(0, 1);
    } else if key_event.code == KeyCode::PageUp {
        return Ok(Action::Dispatch(Intent::ShiftWeek(WeekShift::Previous)));
    } else if key_event.code == KeyCode::PageDown {
        return Ok(Action::Dispatch(Intent::ShiftWeek(WeekShift::Next)));
    } else if key_event.code == KeyCode::Home {
        return Ok(Action::Dispatch(Intent::ShiftWeek(WeekShift::This)));
    } else if matches_key_event(key_event, &keys.toggle_complete) {
        if let Some(task) = app.selected_task() {
            return Ok(Action::Dispatch(Intent::ToggleTask(task.id)));
        }
    } else if matches_key_event(key_event, &keys.select) {
        if app.selected_task().is_some() {
            app.open_edit();
        } else {
            return Ok(Action::Dispatch(Intent::Navigate(NavTarget::NewTask)));
        }
    } else if matches_key_event(key_event, &keys.edit) {
        app.open_edit();
    } else if matches_key_event(key_event, &keys.delete) {
        app.request_delete();
    }
    Ok(Action::Continue)
}

fn handle_modal<A: ReflectApi>(app: &mut App<A>, keys: &KeyMap, key_event: KeyEvent) -> Result<Action, TuiError> {
    let is_save = matches_key_event(key_event, &keys.save);
    let is_paste = is_paste(key_event);
    let pasted = if is_paste { paste_from_clipboard(app) } else { None };

    let Some(modal) = app.modal.as_mut() else {
        return Ok(Action::Continue);
    };

    match modal {
        Modal::Help => {
            if key_event.code == KeyCode::Esc || matches_key_event(key_event, &keys.help) {
                app.modal = None;
            }
        }
        Modal::ConfirmDelete { target, selection } => match key_event.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                *selection = 1 - (*selection).min(1);
            }
            KeyCode::Char('y') => {
                let intent = target.intent();
                app.modal = None;
                return Ok(Action::Dispatch(intent));
            }
            KeyCode::Enter if *selection == 0 => {
                let intent = target.intent();
                app.modal = None;
                return Ok(Action::Dispatch(intent));
            }
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            _ => {}
        },
        Modal::GoalForm(form) => {
            if key_event.code == KeyCode::Esc {
                app.modal = None;
            } else if is_save || key_event.code == KeyCode::Enter {
                match form.to_intent() {
                    Ok(intent) => return Ok(Action::Dispatch(intent)),
                    Err(message) => form.error = Some(message),
                }
            } else if matches!(key_event.code, KeyCode::Tab | KeyCode::BackTab) {
                form.navigate();
            } else if let Some(text) = pasted {
                form.current_editor_mut().insert_str(&text);
            } else {
                form.current_editor_mut().handle_key(key_event, false);
            }
        }
        Modal::JournalForm(form) => {
            if key_event.code == KeyCode::Esc {
                app.modal = None;
            } else if is_save {
                return Ok(Action::Dispatch(form.to_intent()));
            } else if let Some(text) = pasted {
                form.content.insert_str(&text);
            } else {
                form.content.handle_key(key_event, true);
            }
        }
        Modal::TaskForm(form) => {
            let on_repeat = form.current_field == TaskField::Repeat;
            let on_description = form.current_field == TaskField::Description;
            if key_event.code == KeyCode::Esc {
                app.modal = None;
            } else if is_save {
                match form.to_draft() {
                    Ok(draft) => return Ok(Action::Dispatch(Intent::SaveTask(draft))),
                    Err(message) => form.error = Some(message),
                }
            } else if key_event.code == KeyCode::Tab || (key_event.code == KeyCode::Enter && !on_description && !on_repeat) {
                form.navigate(true);
            } else if key_event.code == KeyCode::BackTab {
                form.navigate(false);
            } else if on_repeat {
                if matches!(key_event.code, KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right) {
                    form.cycle_recurrence();
                }
            } else if let Some(editor) = form.current_editor_mut() {
                match pasted {
                    Some(text) => editor.insert_str(&text),
                    None => {
                        editor.handle_key(key_event, on_description);
                    }
                }
            }
        }
    }
    Ok(Action::Continue)
}

fn is_up(keys: &KeyMap, key_event: KeyEvent) -> bool {
    key_event.code == KeyCode::Up || matches_key_event(key_event, &keys.list_up)
}

fn is_down(keys: &KeyMap, key_event: KeyEvent) -> bool {
    key_event.code == KeyCode::Down || matches_key_event(key_event, &keys.list_down)
}

fn is_paste(key_event: KeyEvent) -> bool {
    has_primary_modifier(key_event.modifiers) && matches!(key_event.code, KeyCode::Char('v') | KeyCode::Char('V'))
}

fn paste_from_clipboard<A: ReflectApi>(app: &mut App<A>) -> Option<String> {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
        Ok(text) => Some(text),
        Err(e) => {
            app.notify(Notification::error(format!("Failed to access clipboard: {}", e)));
            None
        }
    }
}

fn copy_current<A: ReflectApi>(app: &mut App<A>) {
    let Some(text) = app.copy_text().filter(|t| !t.is_empty()) else {
        return;
    };
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => app.notify(Notification::success("Copied", "Copied to clipboard")),
        Err(e) => app.notify(Notification::error(format!("Failed to copy to clipboard: {}", e))),
    }
}

pub fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl on Windows/Linux, Option/Alt on macOS
    let has_primary_mod = has_primary_modifier(key_event.modifiers);
    if binding.requires_ctrl != has_primary_mod {
        return false;
    }
    binding.key_code == key_event.code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn bindings_respect_the_primary_modifier() {
        let save = parse_key_binding("Ctrl+s").unwrap();
        let plain = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert!(!matches_key_event(plain, &save));

        let quit = parse_key_binding("q").unwrap();
        assert!(matches_key_event(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE), &quit));
    }

    #[test]
    fn default_bindings_parse() {
        assert!(KeyMap::from_config(&KeyBindings::default()).is_ok());

        let mut broken = KeyBindings::default();
        broken.quit = "Hyper+q".to_string();
        assert!(matches!(
            KeyMap::from_config(&broken),
            Err(TuiError::KeyBindingError(_))
        ));
    }
}
