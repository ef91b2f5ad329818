//! Search prompt overlay.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};

use crate::theme::Theme;

/// A one-line text prompt for the torrent search term.
pub struct SearchInput<'a> {
    text: &'a str,
    theme: &'a Theme,
}

impl<'a> SearchInput<'a> {
    /// Creates a new search prompt.
    #[must_use]
    pub const fn new(text: &'a str, theme: &'a Theme) -> Self {
        Self { text, theme }
    }
}

impl Widget for &SearchInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let cursor = Span::styled("▌", Style::default().fg(self.theme.accent));
        let content = if self.text.is_empty() {
            Line::from(vec![
                Span::styled(
                    "Type to search torrents...",
                    self.theme.dimmed_style().add_modifier(Modifier::ITALIC),
                ),
                cursor,
            ])
        } else {
            Line::from(vec![Span::styled(self.text, self.theme.base_style()), cursor])
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.focused_border_style)
            .title(Span::styled(
                " Search (Enter to keep, Esc to clear) ",
                self.theme.header_style,
            ))
            .style(Style::default().bg(self.theme.overlay_bg));

        Paragraph::new(content).block(block).render(area, buf);
    }
}
