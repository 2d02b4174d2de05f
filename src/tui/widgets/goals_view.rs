use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget};
use ratatui::style::{Color, Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use chrono::NaiveDate;
use crate::config::Theme;
use crate::models::Goal;
use crate::state::goals::GoalsState;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::render_notice;

/// Deadline column text: "due May 1", flagged when already past
pub fn deadline_label(goal: &Goal, today: NaiveDate) -> Option<(String, bool)> {
    let deadline = goal.deadline?;
    let overdue = !goal.is_completed() && deadline < today;
    let text = if overdue {
        format!("overdue since {}", deadline.format("%b %-d, %Y"))
    } else {
        format!("due {}", deadline.format("%b %-d, %Y"))
    };
    Some((text, overdue))
}

pub fn render_goals(
    f: &mut Frame,
    area: Rect,
    state: &GoalsState,
    goals: &[Goal],
    cursor: usize,
    title: &str,
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

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Notice
            Constraint::Min(3),    // List
        ])
        .split(area);

    if state.success.is_set() {
        f.render_widget(
            Paragraph::new("✓ Goal saved").style(Style::default().fg(accent).add_modifier(Modifier::BOLD)),
            chunks[0],
        );
    } else {
        render_notice(f, chunks[0], state.loading, state.error.as_ref(), theme);
    }

    if goals.is_empty() {
        let empty = Paragraph::new("No goals here yet. Press the new goal key to add one.")
            .block(Block::default().borders(Borders::ALL).title(title.to_string()))
            .style(Style::default().fg(fg).add_modifier(Modifier::DIM));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = goals
        .iter()
        .map(|goal| {
            let (check, style) = if goal.is_completed() {
                ("[x] ", Style::default().fg(fg).add_modifier(Modifier::CROSSED_OUT | Modifier::DIM))
            } else {
                ("[ ] ", Style::default().fg(fg))
            };
            let mut spans = vec![Span::raw(check), Span::styled(goal.description.clone(), style)];
            if let Some((label, overdue)) = deadline_label(goal, today) {
                let deadline_style = if overdue {
                    Style::default().fg(Color::Red)
                } else {
                    Style::default().fg(accent)
                };
                spans.push(Span::styled(format!("  ({})", label), deadline_style));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!("{} ({})", title, goals.len())))
        .style(Style::default().fg(fg))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    let mut list_state = ListState::default();
    list_state.select(Some(cursor.min(goals.len() - 1)));
    StatefulWidget::render(list, chunks[1], f.buffer_mut(), &mut list_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GoalStatus;

    fn goal(status: GoalStatus, deadline: Option<NaiveDate>) -> Goal {
        Goal {
            id: 1,
            user_id: 1,
            description: "Ship v1".to_string(),
            status,
            deadline,
            created_at: None,
        }
    }

    #[test]
    fn past_deadline_is_overdue_only_while_active() {
        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let past = NaiveDate::from_ymd_opt(2026, 5, 1);

        let (text, overdue) = deadline_label(&goal(GoalStatus::Active, past), today).unwrap();
        assert!(overdue);
        assert_eq!(text, "overdue since May 1, 2026");

        let (_, overdue) = deadline_label(&goal(GoalStatus::Completed, past), today).unwrap();
        assert!(!overdue);
        assert!(deadline_label(&goal(GoalStatus::Active, None), today).is_none());
    }
}
