//! Header bar component.
//!
//! Shows the application name, the mode indicator (torrent counter or
//! breadcrumb) and the help hint.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use tb_session::Indicator;
use unicode_width::UnicodeWidthStr;

use crate::text::truncate_front;
use crate::theme::Theme;

const TITLE: &str = "torbox-browse";
const HELP_HINT: &str = "? for help";
const SEPARATOR: &str = " │ ";

/// The header bar.
pub struct HeaderBar<'a> {
    indicator: &'a Indicator,
    theme: &'a Theme,
}

impl<'a> HeaderBar<'a> {
    /// Creates a new header bar.
    #[must_use]
    pub const fn new(indicator: &'a Indicator, theme: &'a Theme) -> Self {
        Self { indicator, theme }
    }
}

impl Widget for &HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let fixed = TITLE.width() + HELP_HINT.width() + 2 * SEPARATOR.width();
        let room = usize::from(area.width).saturating_sub(fixed);
        let indicator = self.indicator.to_string();

        let line = Line::from(vec![
            Span::styled(TITLE, self.theme.header_style),
            Span::raw(SEPARATOR),
            Span::styled(truncate_front(&indicator, room).into_owned(), self.theme.base_style()),
            Span::raw(SEPARATOR),
            Span::styled(HELP_HINT, Style::default().fg(Color::Yellow)),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(self.theme.border_style);

        Paragraph::new(line).block(block).render(area, buf);
    }
}
