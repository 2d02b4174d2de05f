use ratatui::Frame;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::text::{Line, Span};
use chrono::Local;
use crate::api::ReflectApi;
use crate::config::KeyBindings;
use crate::tui::{App, Layout, Screen};
use crate::tui::app::{Focus, Modal, SidebarState};
use crate::tui::widgets::{
    calendar_view::{render_calendar, render_reflection_detail},
    color::parse_color,
    confirm_delete::render_confirm_delete,
    form::{render_goal_form, render_journal_form, render_task_form},
    goals_view::render_goals,
    help::render_help,
    insights_view::render_insights,
    journal_view::render_journal,
    reflection_view::render_reflection,
    sidebar::{render_sidebar, SidebarInfo},
    status_bar::render_status_bar,
    week_view::render_week,
};
use crate::utils::{format_key_binding_for_display as key, format_long_date};

pub fn render<A: ReflectApi>(f: &mut Frame, app: &mut App<A>, layout: &Layout) {
    let theme = app.theme.clone();
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let accent = parse_color(&theme.accent);

    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Reflect")
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    let full = f.area();
    f.render_widget(outer_block, full);

    let header = Line::from(vec![
        Span::styled(app.time_of_day.greeting(), Style::default().fg(accent).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", format_long_date(app.today))),
        Span::styled(
            format!("  |  {}", app.screen.title(app.time_of_day)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(header), layout.header_area);

    if app.sidebar_state == SidebarState::Expanded && layout.sidebar_area.width > 0 {
        let info = SidebarInfo {
            current_screen: app.screen,
            selected: app.sidebar_index,
            focused: app.focus == Focus::Sidebar,
            stats: app.stats.as_ref(),
            active_goals: app.goals.active.len(),
            completed_goals: app.goals.completed.len(),
            time_of_day: app.time_of_day,
        };
        render_sidebar(f, layout.sidebar_area, &info, &theme);
    }

    let main = layout.main_area;
    match app.screen {
        Screen::Insights => render_insights(f, main, &app.insights, app.today, &theme),
        Screen::Reflection => {
            app.content_scroll = render_reflection(
                f,
                main,
                &app.reflection,
                &app.answer_editor,
                app.time_of_day,
                app.content_scroll,
                &theme,
            );
        }
        Screen::TodayJournal => render_journal(f, main, &app.today_journal, app.search.as_ref(), app.today, &theme),
        Screen::AllJournal => render_journal(f, main, &app.all_journal, app.search.as_ref(), app.today, &theme),
        Screen::PreviousDays => render_calendar(f, main, &app.calendar, app.today, &theme),
        Screen::Week => render_week(f, main, &app.week, app.today, Local::now().naive_local(), &theme),
        Screen::ActiveGoals | Screen::CompletedGoals => render_goals(
            f,
            main,
            &app.goals,
            app.visible_goals(),
            app.goal_cursor,
            app.screen.title(app.time_of_day),
            app.today,
            &theme,
        ),
    }

    if app.screen == Screen::PreviousDays {
        if let Some(ref detail) = app.calendar.detail {
            render_reflection_detail(f, full, detail, &theme);
        }
    }

    // Popups go over everything else
    match app.modal {
        Some(Modal::GoalForm(ref form)) => render_goal_form(f, full, form, &theme),
        Some(Modal::JournalForm(ref form)) => render_journal_form(f, full, form, &theme),
        Some(Modal::TaskForm(ref form)) => render_task_form(f, full, form, &theme),
        Some(Modal::ConfirmDelete { ref target, selection }) => {
            render_confirm_delete(f, full, target, selection, &theme)
        }
        Some(Modal::Help) => render_help(f, full, &app.config.key_bindings, &theme),
        None => {}
    }

    let hints = key_hints(app);
    render_status_bar(f, layout.status_area, app.notification.as_ref(), &hints, &theme);
}

/// Key hints for the status bar, most relevant first
pub fn key_hints<A: ReflectApi>(app: &App<A>) -> Vec<String> {
    let kb: &KeyBindings = &app.config.key_bindings;
    let hint = |binding: &str, what: &str| format!("{}: {}", key(binding), what);

    if let Some(ref modal) = app.modal {
        return match modal {
            Modal::ConfirmDelete { .. } => vec!["y/Enter: Delete".to_string(), "Esc: Cancel".to_string()],
            Modal::Help => vec!["Esc: Close".to_string()],
            Modal::JournalForm(_) => vec![hint(&kb.save, "Save"), "Esc: Cancel".to_string()],
            Modal::GoalForm(_) | Modal::TaskForm(_) => vec![
                hint(&kb.save, "Save"),
                "Tab: Next field".to_string(),
                "Esc: Cancel".to_string(),
            ],
        };
    }

    if app.screen == Screen::PreviousDays && app.calendar.detail.is_some() {
        return vec!["Esc: Close".to_string()];
    }
    if app.search.is_some() {
        return vec!["Enter: Keep filter".to_string(), "Esc: Clear search".to_string()];
    }
    if app.focus == Focus::Sidebar {
        return vec![
            format!("{}/{}: Move", key(&kb.list_up), key(&kb.list_down)),
            hint(&kb.select, "Open"),
            "Esc/Tab: Back".to_string(),
            hint(&kb.quit, "Quit"),
        ];
    }

    let mut hints = match app.screen {
        Screen::Reflection if !app.reflection.is_completed() => {
            return vec![
                "Tab: Next".to_string(),
                "Shift+Tab: Back".to_string(),
                hint(&kb.save, "Next / Save"),
                "Esc: Menu".to_string(),
            ];
        }
        Screen::Reflection => vec![hint(&kb.edit, "Edit answers"), hint(&kb.copy, "Copy")],
        Screen::Insights => vec![hint(&kb.new_goal, "New goal"), hint(&kb.reload, "Refresh")],
        Screen::TodayJournal | Screen::AllJournal => vec![
            hint(&kb.new_journal, "New"),
            hint(&kb.select, "Open"),
            hint(&kb.search, "Search"),
            hint(&kb.cycle_range, "Range"),
            hint(&kb.load_more, "More"),
            hint(&kb.delete, "Delete"),
        ],
        Screen::PreviousDays => vec![
            format!("{}/{}: Day", key(&kb.previous), key(&kb.next)),
            "PgUp/PgDn: Month".to_string(),
            hint(&kb.select, "View"),
        ],
        Screen::Week => vec![
            hint(&kb.new_task, "New task"),
            hint(&kb.toggle_complete, "Done"),
            "PgUp/PgDn: Week".to_string(),
            "Home: This week".to_string(),
            hint(&kb.delete, "Delete"),
        ],
        Screen::ActiveGoals | Screen::CompletedGoals => vec![
            hint(&kb.toggle_complete, "Complete/Reopen"),
            hint(&kb.new_goal, "New"),
            hint(&kb.edit, "Edit"),
            hint(&kb.delete, "Delete"),
        ],
    };

    hints.push(format!("{}/{}: Screens", key(&kb.screen_prev), key(&kb.screen_next)));
    hints.push(hint(&kb.help, "Help"));
    hints.push(hint(&kb.quit, "Quit"));
    hints
}
