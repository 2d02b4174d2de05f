use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarState};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Layout as RatLayout, Direction, Constraint};
use ratatui::text::{Text, Line, Span};
use crate::config::Theme;
use crate::tui::widgets::color::parse_color;
use ratskin::RatSkin;
use termimad::minimad::Text as MinimadText;
use std::cmp;

/// Parse markdown with ratskin and convert the result into owned ratatui lines
pub fn markdown_lines(content: &str, width: u16) -> Vec<Line<'static>> {
    let parsed = RatSkin::default().parse(MinimadText::from(content), width);
    parsed
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Bordered markdown pane with a vertical scrollbar. Returns the clamped scroll offset.
pub fn render_markdown_pane(
    f: &mut Frame,
    area: Rect,
    title: &str,
    content: &str,
    scroll_offset: u16,
    theme: &Theme,
) -> u16 {
    if area.width < 3 || area.height < 3 {
        return scroll_offset;
    }

    let horizontal = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // Scrollbar
        ])
        .split(area);
    let content_area = horizontal[0];
    let scrollbar_area = horizontal[1];

    let viewport_height = area.height.saturating_sub(2) as usize;
    let text_width = content_area.width.saturating_sub(2);
    let lines = markdown_lines(content, text_width);
    let total_lines = lines.len();

    let max_scroll = total_lines.saturating_sub(viewport_height);
    let scroll = cmp::min(scroll_offset as usize, max_scroll);
    let end = cmp::min(scroll + viewport_height, total_lines);
    let visible = if scroll < total_lines {
        Text::from(lines[scroll..end].to_vec())
    } else {
        Text::default()
    };

    // trim: false keeps list indentation
    let paragraph = Paragraph::new(visible)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(parse_color(&theme.fg)).bg(parse_color(&theme.bg)))
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let scrollbar_inner_area = Rect::new(
            scrollbar_area.x,
            content_area.y + 1,
            scrollbar_area.width,
            content_area.height.saturating_sub(2),
        );
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(scroll);
        let scrollbar = Scrollbar::default()
            .orientation(ratatui::widgets::ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_inner_area, &mut scrollbar_state);
    }

    scroll as u16
}
