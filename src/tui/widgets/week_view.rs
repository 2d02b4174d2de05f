use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint, Alignment};
use ratatui::text::{Line, Span};
use chrono::{NaiveDate, NaiveDateTime};
use crate::config::Theme;
use crate::models::ScheduledTask;
use crate::state::week::{hours, duration_minutes, is_past, WeekState, FIRST_HOUR, LAST_HOUR};
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::render_notice;

const HOUR_COLUMN: u16 = 6;
/// Drawn in the hour rows a task runs into after its start row
const CONTINUATION: &str = "┊";

/// Text for one grid cell: the first task's title, plus how many others start in the same hour
pub fn slot_label(tasks: &[&ScheduledTask], width: usize) -> String {
    let Some(first) = tasks.first() else {
        return String::new();
    };
    let check = if first.is_completed { "✓ " } else { "" };
    let extra = if tasks.len() > 1 { format!(" +{}", tasks.len() - 1) } else { String::new() };
    let budget = width.saturating_sub(extra.chars().count() + check.chars().count());
    let mut title: String = first.title.chars().take(budget).collect();
    if first.title.chars().count() > budget && budget > 1 {
        title = first.title.chars().take(budget - 1).collect::<String>() + "…";
    }
    format!("{}{}{}", check, title, extra)
}

/// Column header: weekday, day number, and tasks that fall outside the visible hours
pub fn day_header(day: NaiveDate, outside: usize) -> String {
    if outside > 0 {
        format!("{} (+{})", day.format("%a %-d"), outside)
    } else {
        day.format("%a %-d").to_string()
    }
}

fn task_summary(task: &ScheduledTask) -> String {
    let mut text = format!(
        "{} {}-{} ({} min)",
        task.title,
        task.start_time.format("%H:%M"),
        task.end_time.format("%H:%M"),
        duration_minutes(task)
    );
    if let Some(pattern) = task.recurrence_pattern.filter(|_| task.is_recurring) {
        text.push_str(&format!(" • repeats {}", pattern.label()));
    }
    if task.is_completed {
        text.push_str(" • done");
    }
    if let Some(description) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        text.push_str(" • ");
        text.push_str(description.lines().next().unwrap_or(""));
    }
    text
}

pub fn render_week(f: &mut Frame, area: Rect, state: &WeekState, today: NaiveDate, now: NaiveDateTime, theme: &Theme) {
    let fg = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Week title
            Constraint::Length(1), // Notice
            Constraint::Min(5),    // Grid
            Constraint::Length(1), // Selected task
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(format!("◂ {} ▸", state.title()))
            .alignment(Alignment::Center)
            .style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
        chunks[0],
    );
    render_notice(f, chunks[1], state.loading, state.error.as_ref(), theme);

    let block = Block::default().borders(Borders::ALL).style(Style::default().fg(fg));
    let grid_area = block.inner(chunks[2]);
    f.render_widget(block, chunks[2]);

    let hour_rows = (LAST_HOUR - FIRST_HOUR + 1) as usize;
    let visible_hours = (grid_area.height.saturating_sub(1) as usize).min(hour_rows);
    // Keep the cursor row on screen when the grid is shorter than the day
    let first_visible = (state.cursor_hour - FIRST_HOUR) as usize;
    let first_visible = first_visible.saturating_sub(visible_hours.saturating_sub(1)).min(hour_rows - visible_hours.max(1));

    let mut col_constraints = vec![Constraint::Length(HOUR_COLUMN)];
    col_constraints.extend([Constraint::Ratio(1, 7); 7]);
    let row_split = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(col_constraints.clone())
            .split(row)
    };
    let line_at = |i: usize| Rect::new(grid_area.x, grid_area.y + i as u16, grid_area.width, 1);

    let days = state.days();
    let header = row_split(line_at(0));
    for (i, day) in days.iter().enumerate() {
        let mut style = Style::default().fg(fg).add_modifier(Modifier::BOLD);
        if *day == today {
            style = style.fg(accent).add_modifier(Modifier::UNDERLINED);
        }
        f.render_widget(
            Paragraph::new(day_header(*day, state.tasks_outside_grid(*day))).style(style),
            header[i + 1],
        );
    }

    for (row_index, hour) in hours().skip(first_visible).take(visible_hours).enumerate() {
        let cols = row_split(line_at(row_index + 1));
        f.render_widget(
            Paragraph::new(format!("{:02}:00", hour)).style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
            cols[0],
        );
        for (i, day) in days.iter().enumerate() {
            let tasks = state.tasks_starting_at(*day, hour);
            // Rows after the start hour carry a marker for as long as the task runs
            let running = if tasks.is_empty() { state.tasks_covering(*day, hour) } else { Vec::new() };
            let shown = tasks.first().or(running.first());
            let width = cols[i + 1].width.saturating_sub(1) as usize;
            let mut style = Style::default().fg(accent);
            if shown.is_some_and(|t| is_past(t, now) || t.is_completed) {
                style = style.fg(fg).add_modifier(Modifier::DIM);
            }
            if tasks.first().is_some_and(|t| t.is_completed) {
                style = style.add_modifier(Modifier::CROSSED_OUT);
            }
            let selected = i == state.cursor_day && hour == state.cursor_hour;
            if selected {
                style = style.fg(highlight_fg).bg(highlight_bg).remove_modifier(Modifier::DIM);
            }
            let text = if !tasks.is_empty() {
                slot_label(&tasks, width)
            } else if !running.is_empty() {
                CONTINUATION.to_string()
            } else if selected {
                "·".to_string()
            } else {
                String::new()
            };
            f.render_widget(Paragraph::new(text).style(style), cols[i + 1]);
        }
    }

    let footer = match state.selected_task() {
        Some(task) => Line::from(Span::styled(task_summary(task), Style::default().fg(fg))),
        None => Line::from(Span::styled(
            format!("{} {:02}:00 - free", state.cursor_date().format("%a %b %-d"), state.cursor_hour),
            Style::default().fg(fg).add_modifier(Modifier::DIM),
        )),
    };
    f.render_widget(Paragraph::new(footer), chunks[3]);
}
