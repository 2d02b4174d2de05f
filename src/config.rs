use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::utils::{self, TimeOfDay};

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Theme name that follows the local clock (morning palette by day, evening palette at night)
pub const AUTO_THEME: &str = "auto";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_user_id")]
    pub user_id: i64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_sidebar_width")]
    pub sidebar_width_percent: u16,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_toggle_sidebar")]
    pub toggle_sidebar: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_new_goal")]
    pub new_goal: String,
    #[serde(default = "default_new_journal")]
    pub new_journal: String,
    #[serde(default = "default_new_task")]
    pub new_task: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_select")]
    pub select: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_previous")]
    pub previous: String,
    #[serde(default = "default_next")]
    pub next: String,
    #[serde(default = "default_screen_prev")]
    pub screen_prev: String,
    #[serde(default = "default_screen_next")]
    pub screen_next: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_toggle_complete")]
    pub toggle_complete: String,
    #[serde(default = "default_cycle_range")]
    pub cycle_range: String,
    #[serde(default = "default_load_more")]
    pub load_more: String,
    #[serde(default = "default_reload")]
    pub reload: String,
    #[serde(default = "default_copy")]
    pub copy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    /// Titles, the sidebar header and the reflection marker in the calendar
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut themes = HashMap::new();

        // Example custom theme so users can see how themes are defined
        themes.insert("forest".to_string(), Theme {
            fg: "lightgreen".to_string(),
            bg: "black".to_string(),
            highlight_bg: "green".to_string(),
            highlight_fg: "black".to_string(),
            accent: "lightyellow".to_string(),
        });

        Self {
            api_base_url: default_api_base_url(),
            user_id: default_user_id(),
            request_timeout_secs: default_request_timeout_secs(),
            sidebar_width_percent: default_sidebar_width(),
            current_theme: default_current_theme(),
            themes,
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            toggle_sidebar: default_toggle_sidebar(),
            help: default_help(),
            new_goal: default_new_goal(),
            new_journal: default_new_journal(),
            new_task: default_new_task(),
            edit: default_edit(),
            delete: default_delete(),
            search: default_search(),
            select: default_select(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            previous: default_previous(),
            next: default_next(),
            screen_prev: default_screen_prev(),
            screen_next: default_screen_next(),
            save: default_save(),
            toggle_complete: default_toggle_complete(),
            cycle_range: default_cycle_range(),
            load_more: default_load_more(),
            reload: default_reload(),
            copy: default_copy(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            accent: default_accent(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("monochrome".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "white".to_string(),
            highlight_fg: "black".to_string(),
            accent: "gray".to_string(),
        });

        // Cool blues for the day
        themes.insert("morning".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            accent: "lightblue".to_string(),
        });

        // Warm ambers for the evening; highlight_fg left empty so it is derived
        themes.insert("evening".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "yellow".to_string(),
            highlight_fg: String::new(),
            accent: "lightyellow".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_api_base_url() -> String {
    "http://127.0.0.1:5000/api".to_string()
}

fn default_user_id() -> i64 {
    1
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_sidebar_width() -> u16 {
    28
}

fn default_current_theme() -> String {
    AUTO_THEME.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_toggle_sidebar() -> String {
    "b".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_new_goal() -> String {
    "g".to_string()
}

fn default_new_journal() -> String {
    "n".to_string()
}

fn default_new_task() -> String {
    "t".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_search() -> String {
    "/".to_string()
}

fn default_select() -> String {
    "Enter".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_previous() -> String {
    "Left".to_string()
}

fn default_next() -> String {
    "Right".to_string()
}

fn default_screen_prev() -> String {
    "[".to_string()
}

fn default_screen_next() -> String {
    "]".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_toggle_complete() -> String {
    "Space".to_string()
}

fn default_cycle_range() -> String {
    "f".to_string()
}

fn default_load_more() -> String {
    "m".to_string()
}

fn default_reload() -> String {
    "r".to_string()
}

fn default_copy() -> String {
    "Ctrl+c".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_accent() -> String {
    "cyan".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),
}

impl Config {
    /// Load configuration from the profile's config directory, creating defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from an explicit file (the `--config` override).
    /// A missing file is created with the defaults.
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to the profile's config file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Resolve `log_level` to a filter, falling back to Info for unknown names
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Name of the theme in effect right now; `auto` follows the time of day
    pub fn resolved_theme_name(&self, time_of_day: TimeOfDay) -> &str {
        if self.current_theme == AUTO_THEME {
            match time_of_day {
                TimeOfDay::Morning => "morning",
                TimeOfDay::Evening => "evening",
            }
        } else {
            &self.current_theme
        }
    }

    /// Get the currently active theme
    /// If highlight_fg is not set (empty string), it will be calculated from highlight_bg
    pub fn get_active_theme(&self, time_of_day: TimeOfDay) -> Theme {
        use crate::tui::widgets::color::{format_color_for_display, get_contrast_text_color, parse_color};

        let name = self.resolved_theme_name(time_of_day);
        let mut theme = if let Some(theme) = self.themes.get(name) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().get(name) {
            theme.clone()
        } else {
            Theme::default()
        };

        if theme.highlight_fg.is_empty() {
            let calculated_fg = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }

    /// Set the active theme by name (`auto`, a preset, or a user-defined theme)
    pub fn set_theme(&mut self, name: &str) -> Result<(), ConfigError> {
        if name != AUTO_THEME
            && !self.themes.contains_key(name)
            && !Theme::get_preset_themes().contains_key(name)
        {
            return Err(ConfigError::ThemeNotFound(name.to_string()));
        }

        self.current_theme = name.to_string();
        Ok(())
    }

    /// Get all available theme names (auto + presets + user-defined), sorted
    pub fn get_available_themes(&self) -> Vec<String> {
        let mut themes: Vec<String> = Theme::get_preset_themes().keys().cloned().collect();
        for theme_name in self.themes.keys() {
            if !themes.contains(theme_name) {
                themes.push(theme_name.clone());
            }
        }
        themes.push(AUTO_THEME.to_string());
        themes.sort();
        themes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.api_base_url, "http://127.0.0.1:5000/api");
        assert_eq!(config.user_id, 1);
        assert_eq!(config.current_theme, AUTO_THEME);
        assert_eq!(config.key_bindings.new_goal, "g");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "user_id = 42\napi_base_url = \"http://example.test/api\"\n\n[key_bindings]\nquit = \"x\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.user_id, 42);
        assert_eq!(config.api_base_url, "http://example.test/api");
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.save, "Ctrl+s");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn saved_config_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.set_theme("monochrome").unwrap();
        config.log_level = "debug".to_string();
        config.save_to_path(&path).unwrap();

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded.current_theme, "monochrome");
        assert_eq!(reloaded.log_level_filter(), log::LevelFilter::Debug);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "user_id = [").unwrap();

        assert!(matches!(Config::load_from_path(&path), Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn auto_theme_follows_time_of_day() {
        let config = Config::default();
        assert_eq!(config.resolved_theme_name(TimeOfDay::Morning), "morning");
        assert_eq!(config.resolved_theme_name(TimeOfDay::Evening), "evening");

        let evening = config.get_active_theme(TimeOfDay::Evening);
        assert_eq!(evening.highlight_bg, "yellow");
        // Derived from the yellow background
        assert_eq!(evening.highlight_fg, "black");
    }

    #[test]
    fn unknown_theme_is_rejected() {
        let mut config = Config::default();
        assert!(matches!(config.set_theme("neon"), Err(ConfigError::ThemeNotFound(_))));
        assert!(config.set_theme("forest").is_ok());
        assert!(config.get_available_themes().contains(&"auto".to_string()));
    }
}
