use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use chrono::NaiveDate;
use crate::config::Theme;
use crate::state::journal::{JournalRow, JournalScope, JournalState};
use crate::tui::app::preview;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::editor::Editor;
use crate::tui::widgets::form::render_text_field;
use crate::tui::widgets::markdown::render_markdown_pane;
use crate::tui::widgets::render_notice;
use crate::utils::format_long_date;

/// Text of one list row
pub fn row_label(row: &JournalRow) -> String {
    match row {
        JournalRow::Month { key, count, collapsed } => {
            let marker = if *collapsed { "▸" } else { "▾" };
            format!("{} {} ({})", marker, key.label(), count)
        }
        JournalRow::Day { date, count, collapsed } => {
            let marker = if *collapsed { "▸" } else { "▾" };
            let noun = if *count == 1 { "entry" } else { "entries" };
            format!("  {} {} ({} {})", marker, date.format("%a %b %-d"), count, noun)
        }
        JournalRow::Entry(entry) => {
            let time = entry.created_at.with_timezone(&chrono::Local).format("%H:%M");
            format!("    {}  {}", time, preview(&entry.content))
        }
    }
}

/// Line above the list: active query and date range
pub fn filter_summary(state: &JournalState, shown: usize) -> String {
    let mut parts = vec![state.range.label().to_string()];
    if !state.query.is_empty() {
        parts.push(format!("matching \"{}\"", state.query));
    }
    let noun = if shown == 1 { "entry" } else { "entries" };
    format!("{} {} • {}", shown, noun, parts.join(", "))
}

pub fn render_journal(
    f: &mut Frame,
    area: Rect,
    state: &JournalState,
    search: Option<&Editor>,
    today: NaiveDate,
    theme: &Theme,
) {
    let fg = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };

    let filtered_count = state.filtered(today).len();
    let more = state.has_more_months(today);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if search.is_some() { 3 } else { 1 }), // Search / filter summary
            Constraint::Length(1),                                     // Notice
            Constraint::Min(3),                                        // Body
            Constraint::Length(if more { 1 } else { 0 }),              // Load more
        ])
        .split(area);

    match search {
        Some(editor) => render_text_field(f, chunks[0], "Search", editor, true, theme),
        None => {
            let mut spans = vec![Span::styled(filter_summary(state, filtered_count), Style::default().fg(fg))];
            if let JournalScope::Date(date) = state.scope {
                spans.insert(0, Span::styled(format!("{}  ", format_long_date(date)), Style::default().fg(accent)));
            }
            f.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);
        }
    }

    if state.success.is_set() {
        f.render_widget(
            Paragraph::new("✓ Entry saved").style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
            chunks[1],
        );
    } else {
        render_notice(f, chunks[1], state.loading, state.error.as_ref(), theme);
    }

    let rows = state.rows(today);
    let body = if chunks[2].width >= 80 {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2])
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(100), Constraint::Length(0)])
            .split(chunks[2])
    };

    if rows.is_empty() {
        let message = if state.entries.is_empty() {
            "No journal entries yet."
        } else {
            "No entries match the current filters."
        };
        f.render_widget(
            Paragraph::new(message)
                .block(Block::default().borders(Borders::ALL).title("Entries"))
                .style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
            body[0],
        );
    } else {
        let max_width = body[0].width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let mut label = row_label(row);
                if label.chars().count() > max_width {
                    label = label.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
                }
                let style = match row {
                    JournalRow::Month { .. } => Style::default().fg(accent).add_modifier(Modifier::BOLD),
                    JournalRow::Day { .. } => Style::default().fg(accent),
                    JournalRow::Entry(_) => Style::default().fg(fg),
                };
                ListItem::new(label).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Entries"))
            .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));
        let mut list_state = ListState::default();
        list_state.select(Some(state.selected.min(rows.len() - 1)));
        StatefulWidget::render(list, body[0], f.buffer_mut(), &mut list_state);
    }

    if body[1].width > 0 {
        match state.selected_entry(today) {
            Some(entry) => {
                let title = format_long_date(entry.entry_date);
                render_markdown_pane(f, body[1], &title, &entry.content, 0, theme);
            }
            None => f.render_widget(
                Paragraph::new("Select an entry to read it")
                    .block(Block::default().borders(Borders::ALL).title("Entry"))
                    .style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
                body[1],
            ),
        }
    }

    if more {
        let hidden = state.total_months(today).saturating_sub(state.visible_months);
        f.render_widget(
            Paragraph::new(format!("{} more month(s) - press the load more key", hidden))
                .style(Style::default().fg(fg).add_modifier(Modifier::ITALIC)),
            chunks[3],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::journal::MonthKey;

    #[test]
    fn group_rows_show_counts_and_fold_markers() {
        let month = JournalRow::Month {
            key: MonthKey { year: 2026, month: 3 },
            count: 4,
            collapsed: true,
        };
        assert!(row_label(&month).starts_with("▸ "));
        assert!(row_label(&month).ends_with("(4)"));

        let day = JournalRow::Day {
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            count: 1,
            collapsed: false,
        };
        assert_eq!(row_label(&day), "  ▾ Wed Mar 4 (1 entry)");
    }

    #[test]
    fn summary_mentions_query() {
        let mut state = JournalState::new(JournalScope::All);
        state.set_query("run");
        assert_eq!(filter_summary(&state, 2), "2 entries • All time, matching \"run\"");
    }
}
