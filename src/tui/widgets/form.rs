use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Constraint, Layout, Direction, Position};
use ratatui::text::{Line, Span};
use crate::config::Theme;
use crate::tui::app::{GoalField, GoalForm, JournalForm, TaskField, TaskForm};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_long_date;

/// Helper function to wrap a long line to fit within a given width
/// Returns wrapped lines and the character offset where each wrapped line starts in the original line
pub fn wrap_line_with_offsets(line: &str, width: usize) -> Vec<(usize, String)> {
    if width == 0 {
        return vec![(0, String::new())];
    }

    if line.chars().count() <= width {
        return vec![(0, line.to_string())];
    }

    let mut wrapped = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let mut char_offset = 0;

    while char_offset < chars.len() {
        let remaining = chars.len() - char_offset;
        if remaining <= width {
            wrapped.push((char_offset, chars[char_offset..].iter().collect()));
            break;
        }

        // Break after the last space before the width limit, or hard-break the word
        let mut break_pos = width;
        let search_end = (char_offset + width + 1).min(chars.len());
        for i in (char_offset..search_end).rev() {
            if chars[i].is_whitespace() {
                break_pos = i - char_offset + 1;
                break;
            }
        }

        let end_pos = char_offset + break_pos;
        wrapped.push((char_offset, chars[char_offset..end_pos].iter().collect()));
        char_offset = end_pos;
    }

    if wrapped.is_empty() {
        wrapped.push((0, String::new()));
    }

    wrapped
}

/// One screen row of wrapped editor content
struct WrappedLineInfo {
    logical_line: usize,
    char_offset: usize,
    wrapped_line: String,
}

fn build_all_wrapped_lines(editor_lines: &[String], content_width: usize) -> Vec<WrappedLineInfo> {
    let mut all_wrapped = Vec::new();
    for (logical_idx, line_str) in editor_lines.iter().enumerate() {
        for (char_offset, wrapped_line) in wrap_line_with_offsets(line_str, content_width) {
            all_wrapped.push(WrappedLineInfo {
                logical_line: logical_idx,
                char_offset,
                wrapped_line,
            });
        }
    }
    all_wrapped
}

/// Row holding the cursor: the last wrapped piece of the cursor's line that starts at or before it
fn find_cursor_wrapped_line(wrapped_lines: &[WrappedLineInfo], cursor_line: usize, cursor_col: usize) -> usize {
    wrapped_lines
        .iter()
        .enumerate()
        .filter(|(_, w)| w.logical_line == cursor_line && w.char_offset <= cursor_col)
        .map(|(idx, _)| idx)
        .last()
        .unwrap_or(0)
}

fn field_block<'a>(title: &'a str, focused: bool, theme: &Theme) -> Block<'a> {
    let border_color = if focused {
        parse_color(&theme.accent)
    } else {
        parse_color(&theme.fg)
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(border_color));
    if focused {
        block = block.title_style(Style::default().add_modifier(Modifier::BOLD));
    }
    block
}

/// Single-line input. Scrolls horizontally to keep the cursor visible.
pub fn render_text_field(f: &mut Frame, area: Rect, title: &str, editor: &Editor, focused: bool, theme: &Theme) {
    let fg = parse_color(&theme.fg);
    let bg = parse_color(&theme.bg);
    let inner_width = area.width.saturating_sub(2) as usize;
    let line = editor.lines.first().map(String::as_str).unwrap_or("");
    let start = editor.cursor_col.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = line.chars().skip(start).take(inner_width).collect();

    let paragraph = Paragraph::new(visible)
        .block(field_block(title, focused, theme))
        .style(Style::default().fg(fg).bg(bg));
    f.render_widget(paragraph, area);

    if focused && area.height > 2 {
        let x = area.x + 1 + (editor.cursor_col - start) as u16;
        f.set_cursor_position(Position::new(x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

/// Multi-line input with word wrap. Shows `placeholder` dimmed while empty.
pub fn render_text_area(
    f: &mut Frame,
    area: Rect,
    title: &str,
    editor: &Editor,
    focused: bool,
    placeholder: &str,
    theme: &Theme,
) {
    let fg = parse_color(&theme.fg);
    let bg = parse_color(&theme.bg);
    let content_width = area.width.saturating_sub(2) as usize;
    let viewport_height = area.height.saturating_sub(2) as usize;
    let block = field_block(title, focused, theme);

    if editor.is_blank() && editor.lines.len() == 1 {
        let paragraph = Paragraph::new(Span::styled(
            placeholder.to_string(),
            Style::default().fg(fg).add_modifier(Modifier::DIM | Modifier::ITALIC),
        ))
        .block(block)
        .style(Style::default().fg(fg).bg(bg))
        .wrap(ratatui::widgets::Wrap { trim: false });
        f.render_widget(paragraph, area);
        if focused && area.height > 2 {
            f.set_cursor_position(Position::new(area.x + 1, area.y + 1));
        }
        return;
    }

    let wrapped = build_all_wrapped_lines(&editor.lines, content_width);
    let cursor_row = find_cursor_wrapped_line(&wrapped, editor.cursor_line, editor.cursor_col);
    let scroll = if viewport_height == 0 {
        0
    } else {
        cursor_row.saturating_sub(viewport_height - 1)
    };

    let lines: Vec<Line> = wrapped
        .iter()
        .skip(scroll)
        .take(viewport_height)
        .map(|w| Line::from(w.wrapped_line.clone()))
        .collect();

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().fg(fg).bg(bg));
    f.render_widget(paragraph, area);

    if focused && viewport_height > 0 {
        if let Some(info) = wrapped.get(cursor_row) {
            let col = editor.cursor_col.saturating_sub(info.char_offset).min(content_width.saturating_sub(1));
            let row = cursor_row - scroll;
            f.set_cursor_position(Position::new(area.x + 1 + col as u16, area.y + 1 + row as u16));
        }
    }
}

fn render_form_frame(f: &mut Frame, area: Rect, title: &str, theme: &Theme) -> Rect {
    let fg = parse_color(&theme.fg);
    let bg = parse_color(&theme.bg);
    f.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(ratatui::layout::Alignment::Center)
        .style(Style::default().fg(fg).bg(bg));
    let inner = block.inner(area);
    f.render_widget(block, area);
    inner
}

fn render_form_error(f: &mut Frame, area: Rect, error: Option<&String>) {
    if let Some(message) = error {
        let paragraph = Paragraph::new(message.as_str())
            .style(Style::default().fg(ratatui::style::Color::Red).add_modifier(Modifier::BOLD));
        f.render_widget(paragraph, area);
    }
}

pub fn render_goal_form(f: &mut Frame, area: Rect, form: &GoalForm, theme: &Theme) {
    let popup = popup_area(area, 60, 50);
    let title = if form.editing_item_id.is_some() { "Edit Goal" } else { "New Goal" };
    let inner = render_form_frame(f, popup, title, theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Description
            Constraint::Length(3), // Deadline
            Constraint::Length(1), // Error
            Constraint::Min(0),
        ])
        .split(inner);

    render_text_field(
        f,
        chunks[0],
        "What do you want to achieve?",
        &form.description,
        form.current_field == GoalField::Description,
        theme,
    );
    render_text_field(
        f,
        chunks[1],
        "Deadline (YYYY-MM-DD, optional)",
        &form.deadline,
        form.current_field == GoalField::Deadline,
        theme,
    );
    render_form_error(f, chunks[2], form.error.as_ref());
}

pub fn render_journal_form(f: &mut Frame, area: Rect, form: &JournalForm, theme: &Theme) {
    let popup = popup_area(area, 70, 70);
    let title = if form.editing_item_id.is_some() { "Edit Journal Entry" } else { "New Journal Entry" };
    let inner = render_form_frame(f, popup, title, theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Date
            Constraint::Min(3),    // Content
            Constraint::Length(1), // Error
        ])
        .split(inner);

    let date_line = Paragraph::new(format_long_date(form.entry_date))
        .style(Style::default().fg(parse_color(&theme.accent)));
    f.render_widget(date_line, chunks[0]);
    render_text_area(
        f,
        chunks[1],
        "Content",
        &form.content,
        true,
        "What's on your mind?",
        theme,
    );
    render_form_error(f, chunks[2], form.error.as_ref());
}

pub fn render_task_form(f: &mut Frame, area: Rect, form: &TaskForm, theme: &Theme) {
    let popup = popup_area(area, 60, 80);
    let title = if form.editing_item_id.is_some() { "Edit Task" } else { "New Task" };
    let inner = render_form_frame(f, popup, title, theme);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(3),    // Description
            Constraint::Length(3), // Date / start / end
            Constraint::Length(1), // Repeat
            Constraint::Length(1), // Error
        ])
        .split(inner);

    render_text_field(f, chunks[0], "Title", &form.title, form.current_field == TaskField::Title, theme);
    render_text_area(
        f,
        chunks[1],
        "Description",
        &form.description,
        form.current_field == TaskField::Description,
        "Optional details",
        theme,
    );

    let row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(chunks[2]);
    render_text_field(f, row[0], "Date", &form.date, form.current_field == TaskField::Date, theme);
    render_text_field(f, row[1], "Start", &form.start, form.current_field == TaskField::Start, theme);
    render_text_field(f, row[2], "End", &form.end, form.current_field == TaskField::End, theme);

    let focused = form.current_field == TaskField::Repeat;
    let repeat = form.recurrence.map(|p| p.label()).unwrap_or("never");
    let style = if focused {
        Style::default()
            .fg(parse_color(&theme.highlight_fg))
            .bg(parse_color(&theme.highlight_bg))
    } else {
        Style::default().fg(parse_color(&theme.fg))
    };
    let repeat_line = Line::from(vec![
        Span::raw("Repeat: "),
        Span::styled(format!("< {} >", repeat), style),
    ]);
    f.render_widget(Paragraph::new(repeat_line), chunks[3]);
    render_form_error(f, chunks[4], form.error.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_at_word_boundaries_with_offsets() {
        let wrapped = wrap_line_with_offsets("the quick brown fox", 10);
        assert_eq!(wrapped, vec![(0, "the quick ".to_string()), (10, "brown fox".to_string())]);
    }

    #[test]
    fn cursor_row_tracks_wrapped_pieces() {
        let lines = vec!["the quick brown fox".to_string(), "jumps".to_string()];
        let wrapped = build_all_wrapped_lines(&lines, 10);
        assert_eq!(wrapped.len(), 3);
        assert_eq!(find_cursor_wrapped_line(&wrapped, 0, 3), 0);
        assert_eq!(find_cursor_wrapped_line(&wrapped, 0, 12), 1);
        assert_eq!(find_cursor_wrapped_line(&wrapped, 1, 0), 2);
    }
}
