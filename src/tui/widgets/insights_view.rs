use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use chrono::NaiveDate;
use crate::config::Theme;
use crate::models::{Insight, InsightKind};
use crate::state::insights::{quote_of_the_day, InsightSource, InsightsState};
use crate::tui::widgets::color::{insight_color, parse_color};
use crate::tui::widgets::render_notice;

pub fn kind_icon(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::Goal => "◎",
        InsightKind::Improvement => "↗",
        InsightKind::Motivation => "★",
        InsightKind::Reflection => "✎",
    }
}

fn insight_lines(insight: &Insight, theme: &Theme) -> Vec<Line<'static>> {
    let color = insight
        .color
        .as_deref()
        .map(insight_color)
        .unwrap_or_else(|| parse_color(&theme.accent));
    vec![
        Line::from(vec![
            Span::styled(format!("{} ", kind_icon(insight.kind)), Style::default().fg(color)),
            Span::styled(insight.title.clone(), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(format!("  {}", insight.message)),
        Line::from(""),
    ]
}

pub fn render_insights(f: &mut Frame, area: Rect, state: &InsightsState, today: NaiveDate, theme: &Theme) {
    let fg = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Quote
            Constraint::Length(1), // Notice
            Constraint::Min(4),    // Insights + goals
        ])
        .split(area);

    let quote = quote_of_the_day(today);
    let quote_text = vec![
        Line::from(Span::styled(format!("\"{}\"", quote.text), Style::default().fg(fg).add_modifier(Modifier::ITALIC))),
        Line::from(Span::styled(format!("- {}", quote.author), Style::default().fg(accent))),
    ];
    f.render_widget(
        Paragraph::new(quote_text)
            .block(Block::default().borders(Borders::ALL).title("Quote of the Day"))
            .wrap(ratatui::widgets::Wrap { trim: true }),
        chunks[0],
    );

    if state.loading || state.error.is_some() {
        render_notice(f, chunks[1], state.loading, state.error.as_ref(), theme);
    } else if state.source == Some(InsightSource::Local) {
        f.render_widget(
            Paragraph::new("Insights computed offline")
                .style(Style::default().fg(fg).add_modifier(Modifier::DIM)),
            chunks[1],
        );
    }

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(chunks[2]);

    let lines: Vec<Line> = if state.insights.is_empty() {
        vec![Line::from(Span::styled("No insights yet.", Style::default().add_modifier(Modifier::DIM)))]
    } else {
        state.insights.iter().flat_map(|i| insight_lines(i, theme)).collect()
    };
    f.render_widget(
        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Today's Insights"))
            .style(Style::default().fg(fg))
            .wrap(ratatui::widgets::Wrap { trim: false }),
        body[0],
    );

    let mut goal_lines: Vec<Line> = state
        .active_goals
        .iter()
        .map(|g| {
            let deadline = g.deadline.map(|d| format!(" ({})", d.format("%b %-d"))).unwrap_or_default();
            Line::from(format!("• {}{}", g.description, deadline))
        })
        .collect();
    if goal_lines.is_empty() {
        goal_lines.push(Line::from(Span::styled("No active goals", Style::default().add_modifier(Modifier::DIM))));
    }
    if let Some(improve) = state.yesterday.as_ref().and_then(|r| r.answers()[2]) {
        goal_lines.push(Line::from(""));
        goal_lines.push(Line::from(Span::styled("Yesterday you wanted to:", Style::default().fg(accent))));
        goal_lines.push(Line::from(improve.to_string()));
    }
    f.render_widget(
        Paragraph::new(goal_lines)
            .block(Block::default().borders(Borders::ALL).title("Active Goals"))
            .style(Style::default().fg(fg))
            .wrap(ratatui::widgets::Wrap { trim: false }),
        body[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insight_uses_its_palette_color() {
        let insight = Insight {
            kind: InsightKind::Goal,
            title: "Stay on track".to_string(),
            message: "2 goals due this week".to_string(),
            color: Some("amber".to_string()),
        };
        let lines = insight_lines(&insight, &Theme::default());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[1].style.fg, Some(insight_color("amber")));
        assert_eq!(lines[0].spans[0].content, "◎ ");
    }
}
