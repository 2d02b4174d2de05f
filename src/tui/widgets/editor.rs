use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cmp;

/// Plain-text editor used by every input field: reflection answers, journal content,
/// form fields and the search box. Cursor positions are counted in chars.
#[derive(Debug, Clone)]
pub struct Editor {
    pub lines: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
}

impl Editor {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_line: 0,
            cursor_col: 0,
        }
    }

    /// Start with existing text, cursor at the end
    pub fn from_string(content: &str) -> Self {
        let lines: Vec<String> = if content.is_empty() {
            vec![String::new()]
        } else {
            content.split('\n').map(|s| s.trim_end_matches('\r').to_string()).collect()
        };
        let cursor_line = lines.len().saturating_sub(1);
        let cursor_col = lines.last().map(|l| l.chars().count()).unwrap_or(0);
        Self {
            lines,
            cursor_line,
            cursor_col,
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|l| l.trim().is_empty())
    }

    fn current_len(&self) -> usize {
        self.lines[self.cursor_line].chars().count()
    }

    pub fn insert_char(&mut self, ch: char) {
        let line = &mut self.lines[self.cursor_line];
        let at = byte_index(line, self.cursor_col);
        line.insert(at, ch);
        self.cursor_col += 1;
    }

    /// Insert text that may span several lines (clipboard paste)
    pub fn insert_str(&mut self, text: &str) {
        for (i, part) in text.split('\n').enumerate() {
            if i > 0 {
                self.insert_newline();
            }
            for ch in part.chars().filter(|c| *c != '\r') {
                self.insert_char(ch);
            }
        }
    }

    pub fn insert_newline(&mut self) {
        let line = &mut self.lines[self.cursor_line];
        let at = byte_index(line, self.cursor_col);
        let rest = line.split_off(at);
        self.lines.insert(self.cursor_line + 1, rest);
        self.cursor_line += 1;
        self.cursor_col = 0;
    }

    /// Backspace
    pub fn delete_char(&mut self) {
        if self.cursor_col > 0 {
            let line = &mut self.lines[self.cursor_line];
            let at = byte_index(line, self.cursor_col - 1);
            line.remove(at);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            let removed = self.lines.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_len();
            self.lines[self.cursor_line].push_str(&removed);
        }
    }

    /// Delete key
    pub fn delete_forward(&mut self) {
        if self.cursor_col < self.current_len() {
            let line = &mut self.lines[self.cursor_line];
            let at = byte_index(line, self.cursor_col);
            line.remove(at);
        } else if self.cursor_line + 1 < self.lines.len() {
            let next = self.lines.remove(self.cursor_line + 1);
            self.lines[self.cursor_line].push_str(&next);
        }
    }

    pub fn move_cursor_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_len());
        }
    }

    pub fn move_cursor_down(&mut self) {
        if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = cmp::min(self.cursor_col, self.current_len());
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_len();
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_col < self.current_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.lines.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_col = self.current_len();
    }

    /// Apply an editing key. Enter only breaks the line when `multiline` is set.
    /// Returns false for keys the editor does not handle.
    pub fn handle_key(&mut self, key_event: KeyEvent, multiline: bool) -> bool {
        if key_event.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key_event.code {
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Enter if multiline => self.insert_newline(),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.move_cursor_left(),
            KeyCode::Right => self.move_cursor_right(),
            KeyCode::Up if multiline => self.move_cursor_up(),
            KeyCode::Down if multiline => self.move_cursor_down(),
            KeyCode::Home => self.move_cursor_home(),
            KeyCode::End => self.move_cursor_end(),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_backspace_handle_multibyte_chars() {
        let mut editor = Editor::new();
        for ch in "café".chars() {
            editor.insert_char(ch);
        }
        editor.move_cursor_left();
        editor.delete_char();
        assert_eq!(editor.text(), "caé");
        assert_eq!(editor.cursor_col, 2);
    }

    #[test]
    fn newlines_split_and_join() {
        let mut editor = Editor::from_string("hello world");
        for _ in 0..6 {
            editor.move_cursor_left();
        }
        editor.insert_newline();
        assert_eq!(editor.lines, vec!["hello", " world"]);
        editor.delete_char();
        assert_eq!(editor.text(), "hello world");
    }

    #[test]
    fn single_line_fields_ignore_enter() {
        let mut editor = Editor::new();
        assert!(!editor.handle_key(key(KeyCode::Enter), false));
        assert!(editor.handle_key(key(KeyCode::Enter), true));
        assert_eq!(editor.lines.len(), 2);
    }

    #[test]
    fn paste_keeps_line_structure() {
        let mut editor = Editor::new();
        editor.insert_str("one\r\ntwo");
        assert_eq!(editor.text(), "one\ntwo");
        assert!(!editor.is_blank());
    }
}
