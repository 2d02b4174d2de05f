use chrono::{Datelike, Duration, Local, NaiveDate, NaiveTime, Timelike};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(&self) -> &'static str {
        match self {
            Profile::Dev => "reflect-dev",
            Profile::Prod => "reflect",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "reflect-dev" instead of "reflect"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "reflect", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (log file lives here)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "reflect", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// Parse a time of day, `HH:MM` or `HH:MM:SS`
pub fn parse_time(time_str: &str) -> Result<NaiveTime, chrono::ParseError> {
    let time_str = time_str.trim();
    NaiveTime::parse_from_str(time_str, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S"))
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M:%S%.f"))
}

/// Today in the user's local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Sunday..=Saturday of the week containing `pivot`
pub fn week_range(pivot: NaiveDate) -> (NaiveDate, NaiveDate) {
    let offset = pivot.weekday().num_days_from_sunday() as i64;
    let sunday = pivot - Duration::days(offset);
    (sunday, sunday + Duration::days(6))
}

/// First and last day of the month containing `date`
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next_month = first
        .checked_add_months(chrono::Months::new(1))
        .unwrap_or(first);
    let last = next_month.pred_opt().unwrap_or(first);
    (first, last)
}

/// Format a date like "Wednesday, March 4, 2026"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Evening,
}

impl TimeOfDay {
    /// 06:00 up to 18:00 is morning, everything else evening
    pub fn from_hour(hour: u32) -> Self {
        if (6..18).contains(&hour) {
            TimeOfDay::Morning
        } else {
            TimeOfDay::Evening
        }
    }

    pub fn now() -> Self {
        Self::from_hour(Local::now().hour())
    }

    pub fn greeting(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Good Morning",
            TimeOfDay::Evening => "Good Evening",
        }
    }
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "n"), special keys ("Enter", "Left", "F1"),
/// and the Ctrl modifier ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        return Ok(ParsedKeyBinding {
            key_code: parse_key_code(key_part)?,
            requires_ctrl: true,
        });
    }

    Ok(ParsedKeyBinding {
        key_code: parse_key_code(key_str)?,
        requires_ctrl: false,
    })
}

fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;

    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_range_runs_sunday_to_saturday() {
        // 2026-03-04 is a Wednesday
        assert_eq!(week_range(date(2026, 3, 4)), (date(2026, 3, 1), date(2026, 3, 7)));
        // A Sunday pivot starts its own week
        assert_eq!(week_range(date(2026, 3, 1)), (date(2026, 3, 1), date(2026, 3, 7)));
        // Crosses a year boundary
        assert_eq!(week_range(date(2026, 1, 1)), (date(2025, 12, 28), date(2026, 1, 3)));
    }

    #[test]
    fn month_bounds_handle_short_months() {
        assert_eq!(month_bounds(date(2028, 2, 14)), (date(2028, 2, 1), date(2028, 2, 29)));
        assert_eq!(month_bounds(date(2026, 12, 31)), (date(2026, 12, 1), date(2026, 12, 31)));
    }

    #[test]
    fn time_of_day_boundaries() {
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(18), TimeOfDay::Evening);
    }

    #[test]
    fn parse_time_accepts_both_forms() {
        assert_eq!(parse_time("09:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(parse_time("21:00:00").unwrap(), NaiveTime::from_hms_opt(21, 0, 0).unwrap());
        assert!(parse_time("9am").is_err());
    }

    #[test]
    fn key_bindings_parse() {
        let save = parse_key_binding("Ctrl+s").unwrap();
        assert!(save.requires_ctrl);
        assert_eq!(save.key_code, KeyCode::Char('s'));
        assert_eq!(parse_key_binding("F1").unwrap().key_code, KeyCode::F(1));
        assert_eq!(parse_key_binding("[").unwrap().key_code, KeyCode::Char('['));
        assert!(parse_key_binding("Hyper").is_err());
    }
}
