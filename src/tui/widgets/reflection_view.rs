use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use crate::config::Theme;
use crate::models::Reflection;
use crate::state::reflection::{ReflectionState, QUESTIONS, QUESTION_COUNT};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::form::render_text_area;
use crate::tui::widgets::markdown::render_markdown_pane;
use crate::tui::widgets::render_notice;
use crate::utils::{format_long_date, TimeOfDay};

/// Markdown summary of a saved reflection, one section per question
pub fn reflection_markdown(record: &Reflection) -> String {
    let mut content = String::new();
    for (question, answer) in QUESTIONS.iter().zip(record.answers()) {
        content.push_str(&format!("**{}**\n\n", question.title));
        content.push_str(answer.unwrap_or("*No answer*"));
        content.push_str("\n\n");
    }
    content
}

/// Dots for the question progress, filled up to and including `index`
pub fn progress_dots(index: usize) -> String {
    (0..QUESTION_COUNT)
        .map(|i| if i <= index { "●" } else { "○" })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_reflection(
    f: &mut Frame,
    area: Rect,
    state: &ReflectionState,
    editor: &Editor,
    time_of_day: TimeOfDay,
    scroll: u16,
    theme: &Theme,
) -> u16 {
    let fg = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Date
            Constraint::Length(1), // Notice
            Constraint::Min(3),    // Body
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(format_long_date(state.date)).style(Style::default().fg(accent)),
        chunks[0],
    );

    if state.success.is_set() {
        f.render_widget(
            Paragraph::new("✓ Saved").style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
            chunks[1],
        );
    } else {
        render_notice(f, chunks[1], state.loading, state.error.as_ref(), theme);
    }

    let Some(index) = state.index() else {
        // Completed: read-only summary
        let title = match time_of_day {
            TimeOfDay::Morning => "Today's reflection is complete",
            TimeOfDay::Evening => "Tonight's reflection is complete",
        };
        return match state.saved() {
            Some(record) => render_markdown_pane(f, chunks[2], title, &reflection_markdown(record), scroll, theme),
            None => 0,
        };
    };

    let question = index.question();
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Progress + question
            Constraint::Length(1), // Hint
            Constraint::Min(3),    // Answer
            Constraint::Length(1), // Navigation help
        ])
        .split(chunks[2]);

    let heading = vec![
        Line::from(vec![
            Span::styled(progress_dots(index.get()), Style::default().fg(accent)),
            Span::raw(format!("  Question {} of {}", index.get() + 1, QUESTION_COUNT)),
            Span::styled(
                if state.is_editing() { "  (editing)" } else { "" },
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ]),
        Line::from(Span::styled(question.title, Style::default().fg(fg).add_modifier(Modifier::BOLD))),
    ];
    f.render_widget(Paragraph::new(heading), body[0]);
    f.render_widget(
        Paragraph::new(question.hint).style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
        body[1],
    );

    render_text_area(f, body[2], "Your answer", editor, true, question.placeholder, theme);

    let nav = if index.is_last() {
        if state.is_editing() { "Shift+Tab back • Ctrl+s save changes • Esc cancel" } else { "Shift+Tab back • Ctrl+s complete reflection" }
    } else if index.is_first() {
        "Tab / Ctrl+s next question"
    } else {
        "Shift+Tab back • Tab / Ctrl+s next question"
    };
    f.render_widget(
        Paragraph::new(nav)
            .block(Block::default().borders(Borders::NONE))
            .style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
        body[3],
    );

    0
}
