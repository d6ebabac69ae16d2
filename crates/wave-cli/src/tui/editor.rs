//! Minimal text editing for the comment modal and the path prompt.
//!
//! Cursor positions are char indices, never byte offsets.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const CURSOR: char = '█';

/// What a modal wants the view to do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAction {
    None,
    Submit,
    Cancel,
}

/// Multi-line buffer. Enter inserts a newline; Ctrl+S or Ctrl+Enter submits.
#[derive(Debug, Clone)]
pub struct TextArea {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for TextArea {
    fn default() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
        }
    }
}

impl TextArea {
    /// Handle a key. Submit is refused while the buffer is blank.
    pub fn handle_key(&mut self, key: KeyEvent) -> EditAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => EditAction::Cancel,
            KeyCode::Char('s') | KeyCode::Enter if ctrl => {
                if self.is_blank() {
                    EditAction::None
                } else {
                    EditAction::Submit
                }
            }
            _ => {
                self.edit(key);
                EditAction::None
            }
        }
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Buffer lines with the cursor drawn on the active row.
    pub fn display_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .enumerate()
            .map(|(row, line)| {
                if row == self.row {
                    with_cursor(line, self.col)
                } else {
                    line.clone()
                }
            })
            .collect()
    }

    fn current_len(&self) -> usize {
        char_len(&self.lines[self.row])
    }

    fn edit(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Left => {
                if self.col > 0 {
                    self.col -= 1;
                } else if self.row > 0 {
                    self.row -= 1;
                    self.col = self.current_len();
                }
            }
            KeyCode::Right => {
                if self.col < self.current_len() {
                    self.col += 1;
                } else if self.row + 1 < self.lines.len() {
                    self.row += 1;
                    self.col = 0;
                }
            }
            KeyCode::Up if self.row > 0 => {
                self.row -= 1;
                self.col = self.col.min(self.current_len());
            }
            KeyCode::Down if self.row + 1 < self.lines.len() => {
                self.row += 1;
                self.col = self.col.min(self.current_len());
            }
            KeyCode::Home => self.col = 0,
            KeyCode::End => self.col = self.current_len(),
            KeyCode::Enter => {
                let split_at = byte_index_at_char(&self.lines[self.row], self.col);
                let tail = self.lines[self.row].split_off(split_at);
                self.row += 1;
                self.col = 0;
                self.lines.insert(self.row, tail);
            }
            KeyCode::Backspace => {
                if self.col > 0 {
                    self.col -= 1;
                    remove_char_at(&mut self.lines[self.row], self.col);
                } else if self.row > 0 {
                    let current = self.lines.remove(self.row);
                    self.row -= 1;
                    self.col = self.current_len();
                    self.lines[self.row].push_str(&current);
                }
            }
            KeyCode::Delete => {
                if self.col < self.current_len() {
                    remove_char_at(&mut self.lines[self.row], self.col);
                } else if self.row + 1 < self.lines.len() {
                    let next = self.lines.remove(self.row + 1);
                    self.lines[self.row].push_str(&next);
                }
            }
            KeyCode::Char(c) => {
                insert_char_at(&mut self.lines[self.row], self.col, c);
                self.col += 1;
            }
            _ => {}
        }
    }
}

/// Single-line input. Enter submits, Esc cancels.
#[derive(Debug, Clone, Default)]
pub struct LineInput {
    value: String,
    cursor: usize,
}

impl LineInput {
    pub fn handle_key(&mut self, key: KeyEvent) -> EditAction {
        match key.code {
            KeyCode::Esc => return EditAction::Cancel,
            KeyCode::Enter => return EditAction::Submit,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(char_len(&self.value)),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = char_len(&self.value),
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                remove_char_at(&mut self.value, self.cursor);
            }
            KeyCode::Delete => remove_char_at(&mut self.value, self.cursor),
            KeyCode::Char(c) => {
                insert_char_at(&mut self.value, self.cursor, c);
                self.cursor += 1;
            }
            _ => {}
        }
        EditAction::None
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn display(&self) -> String {
        with_cursor(&self.value, self.cursor)
    }
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn byte_index_at_char(value: &str, char_idx: usize) -> usize {
    value
        .char_indices()
        .nth(char_idx)
        .map_or(value.len(), |(idx, _)| idx)
}

fn insert_char_at(value: &mut String, char_idx: usize, ch: char) {
    let idx = byte_index_at_char(value, char_idx);
    value.insert(idx, ch);
}

fn remove_char_at(value: &mut String, char_idx: usize) {
    if char_idx >= char_len(value) {
        return;
    }
    let start = byte_index_at_char(value, char_idx);
    let end = byte_index_at_char(value, char_idx + 1);
    value.replace_range(start..end, "");
}

/// `value` with a block cursor inserted before char `char_idx`.
pub fn with_cursor(value: &str, char_idx: usize) -> String {
    let split = byte_index_at_char(value, char_idx);
    let (head, tail) = value.split_at(split);
    format!("{head}{CURSOR}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(area: &mut TextArea, s: &str) {
        for c in s.chars() {
            area.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn enter_splits_lines_and_text_joins_them() {
        let mut area = TextArea::default();
        type_str(&mut area, "hello");
        area.handle_key(key(KeyCode::Enter));
        type_str(&mut area, "world");
        assert_eq!(area.text(), "hello\nworld");
    }

    #[test]
    fn blank_buffer_cannot_submit() {
        let mut area = TextArea::default();
        type_str(&mut area, "   ");
        assert_eq!(area.handle_key(ctrl('s')), EditAction::None);
        type_str(&mut area, "x");
        assert_eq!(area.handle_key(ctrl('s')), EditAction::Submit);
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut area = TextArea::default();
        type_str(&mut area, "ab");
        area.handle_key(key(KeyCode::Enter));
        type_str(&mut area, "cd");
        area.handle_key(key(KeyCode::Home));
        area.handle_key(key(KeyCode::Backspace));
        assert_eq!(area.text(), "abcd");
    }

    #[test]
    fn editing_is_char_aware() {
        let mut area = TextArea::default();
        type_str(&mut area, "héllo");
        area.handle_key(key(KeyCode::Left));
        area.handle_key(key(KeyCode::Left));
        area.handle_key(key(KeyCode::Left));
        area.handle_key(key(KeyCode::Backspace));
        assert_eq!(area.text(), "hllo");
    }

    #[test]
    fn esc_cancels() {
        let mut area = TextArea::default();
        assert_eq!(area.handle_key(key(KeyCode::Esc)), EditAction::Cancel);
    }

    #[test]
    fn line_input_edits_and_submits() {
        let mut input = LineInput::default();
        for c in "comments.json".chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "comments.jso");
        assert_eq!(input.handle_key(key(KeyCode::Enter)), EditAction::Submit);
    }

    #[test]
    fn cursor_is_drawn_at_position() {
        assert_eq!(with_cursor("abc", 1), "a█bc");
        assert_eq!(with_cursor("abc", 3), "abc█");
        assert_eq!(with_cursor("", 0), "█");
    }
}
