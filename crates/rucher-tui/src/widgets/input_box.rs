//! Single-line text input widget

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Single-line text input with unicode-aware cursor handling.
///
/// The input can be disabled while a turn is loading; a disabled input
/// swallows edits and renders dimmed.
#[derive(Debug, Default)]
pub struct InputBox {
    /// Current input text
    content: String,
    /// Cursor position as a character index
    cursor: usize,
    /// Horizontal scroll offset in display columns
    scroll: usize,
    /// Placeholder text
    placeholder: String,
    /// Whether the input accepts edits
    enabled: bool,
}

impl InputBox {
    /// Create a new, enabled input box
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Set placeholder text
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Enable or disable edits
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the input accepts edits
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the current content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the input holds no text
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Clear the content
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    /// Take the content, leaving the input empty
    pub fn take(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        self.scroll = 0;
        content
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn cursor_column(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    fn remove_char_at(&mut self, char_index: usize) {
        let start = self.byte_offset(char_index);
        let end = self.byte_offset(char_index + 1);
        self.content.drain(start..end);
    }

    /// Handle an input action; returns whether the action was consumed
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        if !self.enabled {
            return false;
        }
        let char_count = self.content.chars().count();

        let consumed = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    self.remove_char_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Delete => {
                if self.cursor < char_count {
                    self.remove_char_at(self.cursor);
                    true
                } else {
                    false
                }
            }
            Action::Left => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    true
                } else {
                    false
                }
            }
            Action::Right => {
                if self.cursor < char_count {
                    self.cursor += 1;
                    true
                } else {
                    false
                }
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = char_count;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let chars: Vec<char> = self.content.chars().collect();
                let mut target = self.cursor;
                while target > 0 && chars[target - 1] == ' ' {
                    target -= 1;
                }
                while target > 0 && chars[target - 1] != ' ' {
                    target -= 1;
                }
                let start = self.byte_offset(target);
                let end = self.byte_offset(self.cursor);
                self.content.drain(start..end);
                self.cursor = target;
                true
            }
            Action::Paste(text) => {
                for c in text.chars() {
                    // Newlines become spaces in a single-line input
                    if c == '\n' || c == '\r' {
                        if !self.content.ends_with(' ') && self.cursor > 0 {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };

        if consumed {
            self.update_scroll(width as usize);
        }
        consumed
    }

    fn update_scroll(&mut self, width: usize) {
        let visible = width.saturating_sub(4);
        let column = self.cursor_column();
        if column < self.scroll {
            self.scroll = column;
        } else if visible > 0 && column >= self.scroll + visible {
            self.scroll = column - visible + 1;
        }
    }

    /// Render the input box
    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.enabled {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        let inner = block.inner(area);
        block.render(area, buf);

        let (text, style) = if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_slice(inner.width as usize), theme.base_style())
        };
        let style = if self.enabled {
            style
        } else {
            theme.dim_style()
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if self.enabled && inner.width > 0 {
            let cursor_x = self.cursor_column().saturating_sub(self.scroll);
            if cursor_x < inner.width as usize {
                let pos = (inner.x + cursor_x as u16, inner.y);
                if let Some(cell) = buf.cell_mut(pos) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }

    /// Portion of the content visible at the current scroll offset
    fn visible_slice(&self, width: usize) -> String {
        let mut shown = String::new();
        let mut column = 0;
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if column + w <= self.scroll {
                column += w;
                continue;
            }
            if column + w > self.scroll + width {
                break;
            }
            shown.push(c);
            column += w;
        }
        shown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace_multibyte() {
        let mut input = InputBox::new();
        for c in "prêt".chars() {
            input.handle_action(&Action::Char(c), 40);
        }
        assert_eq!(input.content(), "prêt");

        input.handle_action(&Action::Backspace, 40);
        input.handle_action(&Action::Backspace, 40);
        assert_eq!(input.content(), "pr");
    }

    #[test]
    fn test_cursor_movement_bounds() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Char('a'), 40);
        assert!(!input.handle_action(&Action::Right, 40));
        assert!(input.handle_action(&Action::Left, 40));
        assert!(!input.handle_action(&Action::Left, 40));
    }

    #[test]
    fn test_delete_word() {
        let mut input = InputBox::new();
        for c in "la reine des abeilles".chars() {
            input.handle_action(&Action::Char(c), 40);
        }
        input.handle_action(&Action::DeleteWord, 40);
        assert_eq!(input.content(), "la reine des ");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("une\r\ndeux".to_string()), 40);
        assert_eq!(input.content(), "une deux");
    }

    #[test]
    fn test_disabled_swallows_edits() {
        let mut input = InputBox::new();
        input.set_enabled(false);
        assert!(!input.handle_action(&Action::Char('x'), 40));
        assert!(input.is_empty());
    }

    #[test]
    fn test_take_resets_state() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Char('a'), 40);
        assert_eq!(input.take(), "a");
        assert!(input.is_empty());
    }
}
