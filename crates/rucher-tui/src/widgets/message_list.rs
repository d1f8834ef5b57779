//! Message list widget for the conversation transcript

use crate::theme::Theme;
use crate::widgets::markdown::render_markdown;
use crate::widgets::typing::typing_line;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

/// Who authored a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One entry of the rendered transcript
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub content: String,
    /// Still receiving deltas
    pub streaming: bool,
}

impl ChatMessage {
    /// Create a user entry
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            streaming: false,
        }
    }

    /// Create a finalized assistant entry
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            streaming: false,
        }
    }

    /// Create an in-progress assistant entry
    pub fn assistant_streaming(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            content: content.into(),
            streaming: true,
        }
    }
}

/// Widget for the scrollable transcript, with an optional typing indicator
/// appended after the last entry.
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
    typing_tick: Option<usize>,
}

impl<'a> MessageList<'a> {
    /// Create a new message list
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
            typing_tick: None,
        }
    }

    /// Set scroll offset (in lines)
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the typing indicator, animated by `tick`
    pub fn typing(mut self, tick: Option<usize>) -> Self {
        self.typing_tick = tick;
        self
    }

    fn entry_lines(&self, msg: &ChatMessage, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let header = match (msg.speaker, msg.streaming) {
            (Speaker::User, _) => Span::styled("▶ Vous", self.theme.accent_bold()),
            (Speaker::Assistant, false) => Span::styled(
                "◀ Assistant 🐝",
                self.theme
                    .assistant_style()
                    .add_modifier(ratatui::style::Modifier::BOLD),
            ),
            (Speaker::Assistant, true) => Span::styled(
                "◀ Assistant 🐝 ▌",
                self.theme
                    .assistant_style()
                    .add_modifier(ratatui::style::Modifier::BOLD),
            ),
        };
        lines.push(Line::from(header));

        let content_width = width.saturating_sub(2);
        match msg.speaker {
            Speaker::Assistant => {
                for line in render_markdown(&msg.content, self.theme, content_width) {
                    let mut spans = vec![Span::raw("  ")];
                    spans.extend(line.spans);
                    lines.push(Line::from(spans));
                }
            }
            Speaker::User => {
                for wrapped in textwrap::wrap(&msg.content, content_width) {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", wrapped),
                        self.theme.base_style(),
                    )));
                }
            }
        }

        lines.push(Line::from(""));
        lines
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all_lines: Vec<Line> = Vec::new();
        for msg in self.messages {
            all_lines.extend(self.entry_lines(msg, width));
        }
        if let Some(tick) = self.typing_tick {
            all_lines.push(typing_line(tick, self.theme));
        }

        let visible: Vec<Line> = all_lines
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Total transcript height in lines at `width`, including the typing row.
///
/// Must mirror the rendering logic above so auto-scroll lands on the
/// newest content.
pub fn transcript_height(
    messages: &[ChatMessage],
    theme: &Theme,
    width: usize,
    typing: bool,
) -> usize {
    let content_width = width.saturating_sub(2);
    let mut total = 0;

    for msg in messages {
        total += 1; // header
        total += match msg.speaker {
            Speaker::Assistant => render_markdown(&msg.content, theme, content_width).len(),
            Speaker::User => textwrap::wrap(&msg.content, content_width).len(),
        };
        total += 1; // separator
    }
    if typing {
        total += 1;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_height_counts_headers_and_separators() {
        let theme = Theme::dark();
        let messages = vec![ChatMessage::user("bonjour"), ChatMessage::assistant("salut")];
        // Each entry: header + one content line + separator
        assert_eq!(transcript_height(&messages, &theme, 80, false), 6);
        assert_eq!(transcript_height(&messages, &theme, 80, true), 7);
    }

    #[test]
    fn test_user_content_wraps() {
        let theme = Theme::dark();
        let messages = vec![ChatMessage::user("un long message qui dépasse la largeur")];
        let narrow = transcript_height(&messages, &theme, 16, false);
        let wide = transcript_height(&messages, &theme, 120, false);
        assert!(narrow > wide);
    }

    #[test]
    fn test_streaming_entry_carries_cursor() {
        let msg = ChatMessage::assistant_streaming("en cours");
        assert!(msg.streaming);
        assert_eq!(msg.speaker, Speaker::Assistant);
    }
}
