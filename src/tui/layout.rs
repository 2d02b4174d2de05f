use ratatui::layout::{Rect, Layout as RatLayout, Direction, Constraint};

pub struct Layout {
    pub inner_area: Rect,  // Area inside the outer border
    pub header_area: Rect,
    pub sidebar_area: Rect,
    pub main_area: Rect,
    pub status_area: Rect,
}

impl Layout {
    /// Minimum terminal dimensions required for the application
    /// Width: the sidebar (25) plus a usable main pane, or the main pane alone when collapsed
    /// Height: header, seven-row month grid with borders, and the status line
    pub const MIN_WIDTH: u16 = 60;
    pub const MIN_HEIGHT: u16 = 16;

    pub fn calculate(
        size: Rect,
        sidebar_width_percent: u16,
        sidebar_collapsed: bool,
    ) -> Self {
        let min_width_with_border = Self::MIN_WIDTH + 2;
        let min_height_with_border = Self::MIN_HEIGHT + 2;
        let width = size.width.max(min_width_with_border);
        let height = size.height.max(min_height_with_border);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        // Sidebar: at least 25 chars, at most 40%, and the main pane keeps 30
        let sidebar_width = if sidebar_collapsed {
            0
        } else {
            let requested_width = (inner_area.width * sidebar_width_percent) / 100;
            let min_width = 25;
            let max_width = (inner_area.width * 40) / 100;
            requested_width.max(min_width).min(max_width).min(inner_area.width.saturating_sub(30))
        };

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Greeting and date
                Constraint::Min(1),    // Sidebar + main
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(sidebar_width),
                Constraint::Min(1),
            ])
            .split(vertical[1]);

        Self {
            inner_area,
            header_area: vertical[0],
            sidebar_area: horizontal[0],
            main_area: horizontal[1],
            status_area: vertical[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapsed_sidebar_gives_main_the_full_width() {
        let layout = Layout::calculate(Rect::new(0, 0, 120, 40), 28, true);
        assert_eq!(layout.sidebar_area.width, 0);
        assert_eq!(layout.main_area.width, 118);
    }

    #[test]
    fn sidebar_width_is_clamped() {
        let layout = Layout::calculate(Rect::new(0, 0, 100, 30), 90, false);
        assert_eq!(layout.sidebar_area.width, 39);
        let narrow = Layout::calculate(Rect::new(0, 0, 100, 30), 5, false);
        assert_eq!(narrow.sidebar_area.width, 25);
        assert_eq!(narrow.status_area.height, 1);
    }
}
