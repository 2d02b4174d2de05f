use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, StatefulWidget};
use ratatui::style::{Style, Modifier};
use ratatui::Frame;
use ratatui::layout::{Rect, Layout, Direction, Constraint};
use ratatui::text::{Line, Span};
use crate::config::Theme;
use crate::models::UserStats;
use crate::tui::app::{NavTarget, Screen, SIDEBAR_ITEMS};
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::utils::TimeOfDay;

/// What the sidebar shows besides the navigation entries
pub struct SidebarInfo<'a> {
    pub current_screen: Screen,
    pub selected: usize,
    pub focused: bool,
    pub stats: Option<&'a UserStats>,
    pub active_goals: usize,
    pub completed_goals: usize,
    pub time_of_day: TimeOfDay,
}

fn item_label(target: NavTarget, info: &SidebarInfo) -> String {
    let label = target.label(info.time_of_day);
    match target {
        NavTarget::Screen(Screen::ActiveGoals) => format!("{} ({})", label, info.active_goals),
        NavTarget::Screen(Screen::CompletedGoals) => format!("{} ({})", label, info.completed_goals),
        NavTarget::NewGoal | NavTarget::NewJournal | NavTarget::NewTask => format!("+ {}", label),
        NavTarget::Screen(_) => label.to_string(),
    }
}

pub fn render_sidebar(f: &mut Frame, area: Rect, info: &SidebarInfo, theme: &Theme) {
    let fg = parse_color(&theme.fg);
    let accent = parse_color(&theme.accent);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = if theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&theme.highlight_fg)
    };
    let max_width = area.width.saturating_sub(4) as usize;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Navigation
            Constraint::Length(5), // Streak
        ])
        .split(area);

    let items: Vec<ListItem> = SIDEBAR_ITEMS
        .iter()
        .map(|target| {
            let mut label = item_label(*target, info);
            if label.chars().count() > max_width {
                label = label.chars().take(max_width.saturating_sub(3)).collect::<String>() + "...";
            }
            let style = if *target == NavTarget::Screen(info.current_screen) {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(fg)
            };
            ListItem::new(label).style(style)
        })
        .collect();

    let border_style = if info.focused {
        Style::default().fg(accent)
    } else {
        Style::default().fg(fg)
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Menu").border_style(border_style))
        .highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg));

    // Only show the cursor while the sidebar has focus
    let mut list_state = ListState::default();
    if info.focused {
        list_state.select(Some(info.selected));
    }
    StatefulWidget::render(list, chunks[0], f.buffer_mut(), &mut list_state);

    let streak_lines = match info.stats {
        Some(stats) => vec![
            Line::from(vec![
                Span::styled(format!("{}", stats.current_streak), Style::default().fg(accent).add_modifier(Modifier::BOLD)),
                Span::raw(" day streak"),
            ]),
            Line::from(format!("Best: {} days", stats.longest_streak)),
            Line::from(format!("Reflections: {}", stats.total_reflections)),
        ],
        None => vec![Line::from(Span::styled("No stats yet", Style::default().add_modifier(Modifier::DIM)))],
    };
    let streak = Paragraph::new(streak_lines)
        .block(Block::default().borders(Borders::ALL).title("Streak"))
        .style(Style::default().fg(fg));
    f.render_widget(streak, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> SidebarInfo<'static> {
        SidebarInfo {
            current_screen: Screen::Insights,
            selected: 0,
            focused: true,
            stats: None,
            active_goals: 2,
            completed_goals: 5,
            time_of_day: TimeOfDay::Evening,
        }
    }

    #[test]
    fn goal_screens_show_counts() {
        let info = info();
        assert_eq!(item_label(NavTarget::Screen(Screen::ActiveGoals), &info), "Active Goals (2)");
        assert_eq!(item_label(NavTarget::Screen(Screen::CompletedGoals), &info), "Completed Goals (5)");
        assert_eq!(item_label(NavTarget::NewTask, &info), "+ New Task");
        assert_eq!(item_label(NavTarget::Screen(Screen::Reflection), &info), "Tonight's Reflection");
    }
}
