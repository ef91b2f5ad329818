//! The row list: torrents at the top level, directory entries inside a
//! torrent.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::text::Span;
use ratatui::widgets::{
    Block, Borders, Cell, HighlightSpacing, Row, StatefulWidget, Table, TableState,
};
use tb_session::{Mode, View, WatchStatus};

use crate::app::ListState;
use crate::theme::Theme;

/// A stateful list over a [`View`]'s rows.
///
/// The cursor and scroll offset come from [`ListState`]; rows are styled and
/// prefixed with an icon by kind. Completed files are dimmed.
pub struct BrowserList<'a> {
    view: &'a View,
    mode: Mode,
    theme: &'a Theme,
}

impl<'a> BrowserList<'a> {
    /// Creates a new list widget.
    #[must_use]
    pub const fn new(view: &'a View, mode: Mode, theme: &'a Theme) -> Self {
        Self { view, mode, theme }
    }

    fn build_rows(&self) -> Vec<Row<'a>> {
        self.view
            .rows
            .iter()
            .map(|row| {
                let mut style = self.theme.row_style(row.kind);
                if row.watch == Some(WatchStatus::Completed) {
                    style = style.fg(self.theme.dimmed_fg);
                }
                Row::new(vec![
                    Cell::from(Theme::row_icon(row.kind)),
                    Cell::from(Span::styled(row.label.as_str(), style)),
                ])
            })
            .collect()
    }

    fn title(&self) -> String {
        match self.mode {
            Mode::TopLevel => " Torrents ".to_owned(),
            Mode::BrowsingTree => format!(" {} ", self.view.indicator.breadcrumb_text()),
        }
    }
}

impl StatefulWidget for &BrowserList<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.visible_height = usize::from(area.height.saturating_sub(2));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style)
            .title(Span::styled(self.title(), self.theme.header_style));

        let widths = [Constraint::Length(2), Constraint::Min(10)];
        let table = Table::new(self.build_rows(), widths)
            .block(block)
            .row_highlight_style(self.theme.highlight_style)
            .highlight_spacing(HighlightSpacing::Always)
            .highlight_symbol("▸ ");

        let mut table_state = TableState::default()
            .with_selected(state.selected)
            .with_offset(state.scroll_offset);
        StatefulWidget::render(table, area, buf, &mut table_state);
        state.scroll_offset = table_state.offset();
    }
}
