//! Status bar component.
//!
//! Shows the input mode, the spinner while a job runs, the latest status
//! message, and the cursor position.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use crate::app::{AppMode, StatusMessage};
use crate::theme::Theme;

/// The status bar.
pub struct StatusBar<'a> {
    mode: AppMode,
    spinner: Option<&'static str>,
    status: Option<&'a StatusMessage>,
    position: Option<(usize, usize)>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Creates a status bar for `mode`.
    #[must_use]
    pub const fn new(mode: AppMode, theme: &'a Theme) -> Self {
        Self {
            mode,
            spinner: None,
            status: None,
            position: None,
            theme,
        }
    }

    /// Shows a spinner frame.
    #[must_use]
    pub const fn spinner(mut self, frame: Option<&'static str>) -> Self {
        self.spinner = frame;
        self
    }

    /// Shows a status message.
    #[must_use]
    pub const fn status(mut self, status: Option<&'a StatusMessage>) -> Self {
        self.status = status;
        self
    }

    /// Shows `selected/len`, 1-based.
    #[must_use]
    pub const fn position(mut self, selected: Option<usize>, len: usize) -> Self {
        self.position = match selected {
            Some(index) => Some((index + 1, len)),
            None => None,
        };
        self
    }

    fn build_line(&self) -> Line<'a> {
        let mode_text = match self.mode {
            AppMode::Normal => "BROWSE",
            AppMode::Searching => "SEARCH",
            AppMode::Help => "HELP",
        };
        let mut spans = vec![
            Span::styled(
                format!(" {mode_text} "),
                Style::default()
                    .fg(Color::Black)
                    .bg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
        ];

        if let Some(frame) = self.spinner {
            spans.push(Span::styled(frame, Style::default().fg(self.theme.accent)));
            spans.push(Span::raw(" "));
        }

        if let Some(status) = self.status {
            let style = if status.is_error {
                self.theme.error_style()
            } else {
                self.theme.base_style()
            };
            spans.push(Span::styled(status.text.clone(), style));
            spans.push(Span::raw(" │ "));
        }

        if let Some((index, len)) = self.position {
            spans.push(Span::styled(format!("{index}/{len}"), self.theme.dimmed_style()));
        }

        Line::from(spans)
    }
}

impl Widget for &StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Paragraph::new(self.build_line())
            .style(self.theme.status_bar_style)
            .render(area, buf);
    }
}
