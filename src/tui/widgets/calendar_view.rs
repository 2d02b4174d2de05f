use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint, Alignment};
use ratatui::text::{Line, Span};
use chrono::{Datelike, NaiveDate};
use crate::config::Theme;
use crate::models::Reflection;
use crate::state::calendar::{answer_or_placeholder, CalendarState};
use crate::state::reflection::QUESTIONS;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::{popup_area, render_notice};
use crate::utils::format_long_date;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Cell text: day number, with a dot when a reflection exists
pub fn cell_label(date: NaiveDate, has_reflection: bool) -> String {
    if has_reflection {
        format!("{:>2} •", date.day())
    } else {
        format!("{:>2}  ", date.day())
    }
}

pub fn render_calendar(f: &mut Frame, area: Rect, state: &CalendarState, today: NaiveDate, theme: &Theme) {
    let fg = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Month title
            Constraint::Length(1), // Notice
            Constraint::Min(8),    // Grid
            Constraint::Length(1), // Legend
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

    let grid = state.grid();
    let mut row_constraints = vec![Constraint::Length(1)];
    row_constraints.extend(grid.iter().map(|_| Constraint::Length(2)));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(row_constraints)
        .split(grid_area);
    let columns = |row: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(row)
    };

    let header = columns(rows[0]);
    for (i, name) in WEEKDAYS.iter().enumerate() {
        f.render_widget(
            Paragraph::new(*name)
                .alignment(Alignment::Center)
                .style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
            header[i],
        );
    }

    for (week, cells) in grid.iter().enumerate() {
        let Some(row) = rows.get(week + 1) else {
            break;
        };
        let cols = columns(*row);
        for (i, cell) in cells.iter().enumerate() {
            let Some(date) = cell else {
                continue;
            };
            let has = state.has_reflection(*date);
            let mut style = Style::default().fg(if has { accent } else { fg });
            if *date == today {
                style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
            }
            if *date > today {
                style = style.add_modifier(Modifier::DIM);
            }
            if *date == state.cursor {
                style = style.fg(highlight_fg).bg(highlight_bg);
            }
            f.render_widget(
                Paragraph::new(cell_label(*date, has)).alignment(Alignment::Center).style(style),
                cols[i],
            );
        }
    }

    f.render_widget(
        Paragraph::new(format!("• reflection saved   {} this month", state.reflections.len()))
            .style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
        chunks[3],
    );
}

pub fn detail_lines(reflection: &Reflection) -> Vec<(&'static str, &str, bool)> {
    QUESTIONS
        .iter()
        .zip(reflection.answers())
        .map(|(question, answer)| {
            let (text, placeholder) = answer_or_placeholder(answer);
            (question.title, text, placeholder)
        })
        .collect()
}

/// Overlay with the three answers of one day's reflection
pub fn render_reflection_detail(f: &mut Frame, area: Rect, reflection: &Reflection, theme: &Theme) {
    let fg = parse_color(&theme.fg);
    let bg = parse_color(&theme.bg);
    let accent = parse_color(&theme.accent);

    let popup = popup_area(area, 70, 70);
    f.render_widget(Clear, popup);

    let mut lines = Vec::new();
    for (title, text, placeholder) in detail_lines(reflection) {
        lines.push(Line::from(Span::styled(title, Style::default().fg(accent).add_modifier(Modifier::BOLD))));
        let style = if placeholder {
            Style::default().fg(fg).add_modifier(Modifier::ITALIC | Modifier::DIM)
        } else {
            Style::default().fg(fg)
        };
        lines.extend(text.lines().map(|l| Line::from(Span::styled(l.to_string(), style))));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled("Esc to close", Style::default().add_modifier(Modifier::DIM))));

    let paragraph = Paragraph::new(lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format_long_date(reflection.reflection_date))
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg).bg(bg)))
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, popup);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::calendar::NO_ANSWER;

    #[test]
    fn cells_mark_saved_reflections() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
        assert_eq!(cell_label(date, true), " 3 •");
        assert_eq!(cell_label(date, false), " 3  ");
    }

    #[test]
    fn detail_uses_placeholder_for_missing_answers() {
        let reflection = Reflection {
            id: 3,
            user_id: 1,
            reflection_date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
            summary: Some("Calm".into()),
            accomplishments: None,
            improvements_to_make: None,
            created_at: None,
            updated_at: None,
        };
        let lines = detail_lines(&reflection);
        assert_eq!(lines[0].1, "Calm");
        assert!(!lines[0].2);
        assert_eq!(lines[1].1, NO_ANSWER);
        assert!(lines[1].2);
    }
}
