use ratatui::widgets::{Block, Borders, Paragraph, Clear};
use ratatui::style::Style;
use ratatui::Frame;
use ratatui::layout::{Rect, Alignment};
use ratatui::text::{Line, Span};
use crate::config::Theme;
use crate::tui::app::DeleteTarget;
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};
use crate::tui::widgets::popup_area;

pub const OPTIONS: [&str; 2] = ["Delete", "Cancel"];

pub fn render_confirm_delete(f: &mut Frame, area: Rect, target: &DeleteTarget, selection: usize, theme: &Theme) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let highlight_bg = parse_color(&theme.highlight_bg);
    let highlight_fg = get_contrast_text_color(highlight_bg);
    let base = Style::default().fg(fg_color).bg(bg_color);

    let popup = popup_area(area, 50, 35);
    f.render_widget(Clear, popup);

    let mut all_lines = vec![
        Line::from(Span::styled(format!("Delete this {}?", target.kind()), base)),
        Line::from(""),
        Line::from(Span::styled(target.label().to_string(), base)),
        Line::from(""),
    ];

    for (index, option) in OPTIONS.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected {
            Style::default().fg(highlight_fg).bg(highlight_bg)
        } else {
            base
        };
        all_lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    all_lines.push(Line::from(""));
    all_lines.push(Line::from(Span::styled(
        "←→ to choose, Enter to confirm, y to delete, Esc to cancel",
        base,
    )));

    let paragraph = Paragraph::new(all_lines)
        .block(Block::default()
            .borders(Borders::ALL)
            .title("Confirm Delete")
            .title_alignment(Alignment::Center)
            .style(base))
        .style(base)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup);
}
