use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use crate::config::{KeyBindings, Theme};
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, bindings: &KeyBindings, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);

    let popup = popup_area(area, 60, 80);
    f.render_widget(Clear, popup);

    let paragraph = Paragraph::new(build_help_text(bindings))
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Help - Key Bindings")
            .title_alignment(Alignment::Center)
            .style(Style::default().fg(fg_color).bg(bg_color)))
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, popup);
}

pub fn build_help_text(kb: &KeyBindings) -> String {
    let mut text = String::new();

    text.push_str("Navigation:\n");
    text.push_str(&format!("  {} / {}: Previous/next screen\n", key(&kb.screen_prev), key(&kb.screen_next)));
    text.push_str(&format!("  {}: Show/hide sidebar\n", key(&kb.toggle_sidebar)));
    text.push_str("  Tab / Esc: Focus the sidebar\n");
    text.push_str(&format!("  {} / {}: Move up/down\n", key(&kb.list_up), key(&kb.list_down)));
    text.push_str(&format!("  {} / {}: Previous/next question or day\n", key(&kb.previous), key(&kb.next)));
    text.push_str(&format!("  {}: Open / select\n", key(&kb.select)));
    text.push_str(&format!("  {}: Reload screen\n", key(&kb.reload)));
    text.push('\n');

    text.push_str("Create:\n");
    text.push_str(&format!("  {}: New goal\n", key(&kb.new_goal)));
    text.push_str(&format!("  {}: New journal entry\n", key(&kb.new_journal)));
    text.push_str(&format!("  {}: New task\n", key(&kb.new_task)));
    text.push('\n');

    text.push_str("Items:\n");
    text.push_str(&format!("  {}: Edit selected item or completed reflection\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete selected item\n", key(&kb.delete)));
    text.push_str(&format!("  {}: Complete/reopen goal or task\n", key(&kb.toggle_complete)));
    text.push_str(&format!("  {}: Copy to clipboard\n", key(&kb.copy)));
    text.push('\n');

    text.push_str("Journal:\n");
    text.push_str(&format!("  {}: Search entries\n", key(&kb.search)));
    text.push_str(&format!("  {}: Cycle date range\n", key(&kb.cycle_range)));
    text.push_str(&format!("  {}: Show more months\n", key(&kb.load_more)));
    text.push('\n');

    text.push_str("Calendars:\n");
    text.push_str("  PageUp / PageDown: Previous/next month or week\n");
    text.push_str("  Home: Back to this week\n");
    text.push('\n');

    text.push_str("Forms:\n");
    text.push_str(&format!("  {}: Save\n", key(&kb.save)));
    text.push_str("  Tab / Shift+Tab: Next/previous field\n");
    text.push_str("  Ctrl+V: Paste\n");
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_bindings() {
        let mut kb = KeyBindings::default();
        kb.new_goal = "G".to_string();
        let text = build_help_text(&kb);
        assert!(text.contains("G: New goal"));
        assert!(text.contains(&format!("{}: Save\n", key(&kb.save))));
    }
}
