//! Markdown rendering for assistant replies

use crate::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

/// Convert assistant markdown to styled ratatui lines
pub fn render_markdown(text: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(theme, width);
    for event in Parser::new(text) {
        renderer.handle(event);
    }
    renderer.finish()
}

struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    style: Style,
    list_depth: usize,
    in_code_block: bool,
    code: String,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            spans: Vec::new(),
            style: theme.base_style(),
            list_depth: 0,
            in_code_block: false,
            code: String::new(),
        }
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush_line();
                self.style = match level {
                    HeadingLevel::H1 => self
                        .theme
                        .accent_style()
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                    HeadingLevel::H2 => self.theme.accent_bold(),
                    _ => self.theme.accent_style(),
                };
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style = self.theme.base_style();
            }
            Event::Start(Tag::Paragraph) => self.flush_line(),
            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                self.blank_line();
            }
            Event::Start(Tag::List(_)) => self.list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.blank_line();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                self.spans.push(Span::styled(
                    format!("{}• ", indent),
                    self.theme.dim_style(),
                ));
            }
            Event::End(TagEnd::Item) => self.flush_line(),
            Event::Start(Tag::Emphasis) => {
                self.style = self.style.add_modifier(Modifier::ITALIC);
            }
            Event::Start(Tag::Strong) => {
                self.style = self.style.add_modifier(Modifier::BOLD);
            }
            Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Strong) => {
                self.style = self.theme.base_style();
            }
            Event::Start(Tag::Link { .. }) => {
                self.style = Style::default().fg(self.theme.link);
            }
            Event::End(TagEnd::Link) => {
                self.style = self.theme.base_style();
            }
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_line();
                self.in_code_block = true;
                self.code.clear();
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                let style = Style::default()
                    .fg(self.theme.code)
                    .add_modifier(Modifier::DIM);
                let max = self.width.saturating_sub(4);
                for code_line in std::mem::take(&mut self.code).lines() {
                    let shown: String = if code_line.chars().count() > max {
                        let clipped: String =
                            code_line.chars().take(max.saturating_sub(1)).collect();
                        format!("  {}…", clipped)
                    } else {
                        format!("  {}", code_line)
                    };
                    self.lines.push(Line::from(Span::styled(shown, style)));
                }
                self.blank_line();
            }
            Event::Text(text) => {
                if self.in_code_block {
                    self.code.push_str(&text);
                } else {
                    self.spans.push(Span::styled(text.into_string(), self.style));
                }
            }
            Event::Code(code) => {
                let style = Style::default()
                    .fg(self.theme.code)
                    .add_modifier(Modifier::BOLD);
                self.spans
                    .push(Span::styled(format!("`{}`", code), style));
            }
            Event::SoftBreak => self.spans.push(Span::raw(" ")),
            Event::HardBreak => self.flush_line(),
            _ => {}
        }
    }

    /// Move accumulated spans into a finished line
    fn flush_line(&mut self) {
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn blank_line(&mut self) {
        self.lines.push(Line::from(""));
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self
            .lines
            .last()
            .is_some_and(|l| l.spans.iter().all(|s| s.content.is_empty()))
        {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_simple_paragraph() {
        let theme = Theme::dark();
        let lines = render_markdown("Le miel est prêt.", &theme, 80);
        assert_eq!(plain(&lines), vec!["Le miel est prêt."]);
    }

    #[test]
    fn test_heading_is_styled() {
        let theme = Theme::dark();
        let lines = render_markdown("## Récolte", &theme, 80);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].spans[0]
            .style
            .add_modifier
            .contains(Modifier::BOLD));
    }

    #[test]
    fn test_list_items_get_bullets() {
        let theme = Theme::dark();
        let lines = render_markdown("- une ruche\n- deux ruches", &theme, 80);
        let text = plain(&lines);
        assert!(text[0].starts_with("• "));
        assert!(text[1].starts_with("• "));
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        let theme = Theme::dark();
        let lines = render_markdown("Premier.\n\nSecond.", &theme, 80);
        assert_eq!(plain(&lines), vec!["Premier.", "", "Second."]);
    }

    #[test]
    fn test_code_block_indented() {
        let theme = Theme::dark();
        let lines = render_markdown("```\nabeille\n```", &theme, 80);
        assert_eq!(plain(&lines)[0], "  abeille");
    }

    #[test]
    fn test_no_trailing_blank_lines() {
        let theme = Theme::dark();
        let lines = render_markdown("Fin.\n\n", &theme, 80);
        assert_eq!(plain(&lines).last().unwrap(), "Fin.");
    }
}
