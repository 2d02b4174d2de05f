pub mod color;
pub mod confirm_delete;
pub mod editor;
pub mod form;
pub mod help;
pub mod markdown;
pub mod sidebar;
pub mod status_bar;
pub mod reflection_view;
pub mod goals_view;
pub mod journal_view;
pub mod calendar_view;
pub mod week_view;
pub mod insights_view;

use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use crate::config::Theme;
use crate::tui::widgets::color::parse_color;

/// Centered rect using a percentage of the available rect
/// Based on ratatui popup example: https://ratatui.rs/examples/apps/popup/
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}

/// One-line notice used by every screen for loading and error states
pub fn render_notice(f: &mut Frame, area: Rect, loading: bool, error: Option<&String>, theme: &Theme) {
    let (text, style) = match (loading, error) {
        (true, _) => (
            "Loading...".to_string(),
            Style::default().fg(parse_color(&theme.fg)).add_modifier(Modifier::DIM),
        ),
        (false, Some(message)) => (
            message.clone(),
            Style::default().fg(ratatui::style::Color::Red).add_modifier(Modifier::BOLD),
        ),
        (false, None) => return,
    };
    f.render_widget(Paragraph::new(text).style(style), area);
}
