use ratatui::widgets::Paragraph;
use ratatui::style::{Color, Style, Modifier};
use ratatui::Frame;
use ratatui::layout::Rect;
use crate::config::Theme;
use crate::tui::app::{Notification, NotificationKind};
use crate::tui::widgets::color::{parse_color, get_contrast_text_color};

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// Join as many hints as fit in `max_width`, ending with an ellipsis when some are dropped
pub fn fit_key_hints(key_hints: &[String], max_width: usize) -> String {
    let separator_len = SEPARATOR.chars().count();
    let ellipsis_len = ELLIPSIS.chars().count();
    let mut hints_text = String::new();

    for (i, hint) in key_hints.iter().enumerate() {
        let hint_len = hint.chars().count();
        let current_len = hints_text.chars().count();
        let would_be_len = if i == 0 {
            hint_len
        } else {
            current_len + separator_len + hint_len
        };

        if would_be_len > max_width {
            if i == 0 {
                // Even the first hint is too long
                hints_text = hint.chars().take(max_width.saturating_sub(ellipsis_len)).collect();
            } else if current_len + ellipsis_len > max_width {
                hints_text = hints_text.chars().take(max_width.saturating_sub(ellipsis_len)).collect();
            }
            hints_text.push_str(ELLIPSIS);
            break;
        }

        if i > 0 {
            hints_text.push_str(SEPARATOR);
        }
        hints_text.push_str(hint);
    }

    hints_text
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    notification: Option<&Notification>,
    key_hints: &[String],
    theme: &Theme,
) {
    let fg_color = parse_color(&theme.fg);
    let bg_color = parse_color(&theme.bg);
    let max_width = area.width as usize;

    let (content, style) = match notification {
        Some(n) => {
            let bg = match n.kind {
                NotificationKind::Success => parse_color(&theme.highlight_bg),
                NotificationKind::Error => Color::Red,
            };
            let mut text = format!("{}: {}", n.title, n.message);
            if text.chars().count() > max_width {
                text = text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect::<String>() + ELLIPSIS;
            }
            (
                text,
                Style::default()
                    .fg(get_contrast_text_color(bg))
                    .bg(bg)
                    .add_modifier(Modifier::BOLD),
            )
        }
        None => (
            fit_key_hints(key_hints, max_width),
            Style::default().fg(fg_color).bg(bg_color),
        ),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Vec<String> {
        vec!["q: Quit".to_string(), "F1: Help".to_string(), "b: Sidebar".to_string()]
    }

    #[test]
    fn all_hints_fit() {
        assert_eq!(fit_key_hints(&hints(), 80), "q: Quit • F1: Help • b: Sidebar");
    }

    #[test]
    fn overflow_ends_with_ellipsis() {
        assert_eq!(fit_key_hints(&hints(), 25), "q: Quit • F1: Help...");

        let tight = fit_key_hints(&hints(), 20);
        assert!(tight.ends_with("..."));
        assert_eq!(tight.chars().count(), 20);
    }
}
