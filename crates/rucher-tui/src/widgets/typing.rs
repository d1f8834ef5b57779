//! Animated typing indicator

use crate::theme::Theme;
use ratatui::text::{Line, Span};

/// Animation frames: three dots filling in
const TYPING_FRAMES: &[&str] = &["·", "· ·", "· · ·"];

/// Build the typing-indicator line for the given animation tick.
///
/// Shown while a turn is loading and no assistant text has arrived yet.
pub fn typing_line(tick: usize, theme: &Theme) -> Line<'static> {
    let frame = TYPING_FRAMES[(tick / 3) % TYPING_FRAMES.len()];
    Line::from(Span::styled(format!("  {}", frame), theme.dim_style()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_cycle_with_tick() {
        let theme = Theme::dark();
        let a: String = typing_line(0, &theme).spans[0].content.to_string();
        let b: String = typing_line(3, &theme).spans[0].content.to_string();
        let c: String = typing_line(6, &theme).spans[0].content.to_string();
        let wrapped: String = typing_line(9, &theme).spans[0].content.to_string();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_eq!(a, wrapped);
    }
}
