//! Quick-action chips shown on an empty conversation

use crate::theme::Theme;
use ratatui::{buffer::Buffer, layout::Rect, text::Span, widgets::Widget};
use unicode_width::UnicodeWidthStr;

/// Horizontal gap between chips
const CHIP_GAP: u16 = 2;

/// Row of selectable preset chips, wrapping onto multiple lines.
pub struct QuickActionBar<'a> {
    labels: &'a [&'a str],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> QuickActionBar<'a> {
    /// Create a chip bar with one chip highlighted
    pub fn new(labels: &'a [&'a str], selected: usize, theme: &'a Theme) -> Self {
        Self {
            labels,
            selected,
            theme,
        }
    }
}

impl Widget for QuickActionBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut x = area.x;
        let mut y = area.y;

        for (i, label) in self.labels.iter().enumerate() {
            let chip = format!(" {} ", label);
            let chip_width = chip.width() as u16;

            if x > area.x && x + chip_width > area.right() {
                x = area.x;
                y += 1;
            }
            if y >= area.bottom() {
                break;
            }

            let style = if i == self.selected {
                self.theme.selection_style().patch(self.theme.accent_bold())
            } else {
                self.theme.dim_style()
            };
            buf.set_span(x, y, &Span::styled(chip, style), chip_width);
            x += chip_width + CHIP_GAP;
        }
    }
}

/// Rows the chip bar occupies at `width`; mirrors the wrapping above.
pub fn bar_height(labels: &[&str], width: u16) -> u16 {
    if labels.is_empty() || width == 0 {
        return 0;
    }
    let mut rows = 1u16;
    let mut x = 0u16;
    for label in labels {
        let chip_width = format!(" {} ", label).width() as u16;
        if x > 0 && x + chip_width > width {
            rows += 1;
            x = 0;
        }
        x += chip_width + CHIP_GAP;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_height_single_row_when_wide() {
        assert_eq!(bar_height(&["a", "b", "c"], 80), 1);
    }

    #[test]
    fn test_bar_height_wraps_when_narrow() {
        let labels = ["premier chip", "second chip", "troisième chip"];
        assert!(bar_height(&labels, 20) > 1);
    }

    #[test]
    fn test_bar_height_empty() {
        assert_eq!(bar_height(&[], 80), 0);
    }
}
