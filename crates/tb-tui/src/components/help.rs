//! Help panel component.

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table, Widget};

use crate::theme::Theme;

struct KeyBinding {
    key: &'static str,
    description: &'static str,
    mode: &'static str,
}

const KEY_BINDINGS: &[KeyBinding] = &[
    KeyBinding {
        key: "j / ↓",
        description: "Next row",
        mode: "Browse",
    },
    KeyBinding {
        key: "k / ↑",
        description: "Previous row",
        mode: "Browse",
    },
    KeyBinding {
        key: "g / G",
        description: "First / last row",
        mode: "Browse",
    },
    KeyBinding {
        key: "PgDn / PgUp",
        description: "Page down / up",
        mode: "Browse",
    },
    KeyBinding {
        key: "Enter / l / →",
        description: "Open torrent or folder, play file",
        mode: "Browse",
    },
    KeyBinding {
        key: "Bksp / h / ←",
        description: "Up one level",
        mode: "Browse",
    },
    KeyBinding {
        key: "Esc",
        description: "Up one level / clear search",
        mode: "Browse",
    },
    KeyBinding {
        key: "/",
        description: "Search torrents",
        mode: "Torrent list",
    },
    KeyBinding {
        key: "r",
        description: "Refresh listing",
        mode: "Torrent list",
    },
    KeyBinding {
        key: "m",
        description: "Toggle watched on file",
        mode: "Inside torrent",
    },
    KeyBinding {
        key: "C",
        description: "Clear watch history",
        mode: "Browse",
    },
    KeyBinding {
        key: "Enter",
        description: "Keep search term",
        mode: "Search",
    },
    KeyBinding {
        key: "Esc",
        description: "Clear search term",
        mode: "Search",
    },
    KeyBinding {
        key: "?",
        description: "Toggle help panel",
        mode: "Browse",
    },
    KeyBinding {
        key: "q / Ctrl+c",
        description: "Quit",
        mode: "Any",
    },
];

/// A modal overlay listing key bindings.
pub struct HelpPanel<'a> {
    theme: &'a Theme,
}

impl<'a> HelpPanel<'a> {
    /// Creates a new help panel.
    #[must_use]
    pub const fn new(theme: &'a Theme) -> Self {
        Self { theme }
    }

    fn build_rows(&self) -> Vec<Row<'static>> {
        let key_style = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD);
        KEY_BINDINGS
            .iter()
            .map(|binding| {
                Row::new(vec![
                    Cell::from(Span::styled(binding.key, key_style)),
                    Cell::from(Span::styled(binding.description, self.theme.base_style())),
                    Cell::from(Span::styled(binding.mode, self.theme.dimmed_style())),
                ])
            })
            .collect()
    }
}

impl Widget for &HelpPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.focused_border_style)
            .title(Span::styled(" Help - Key Bindings ", self.theme.header_style))
            .style(Style::default().bg(self.theme.overlay_bg));

        let heading = Style::default()
            .fg(self.theme.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        let header = Row::new(vec![
            Cell::from(Span::styled("Key", heading)),
            Cell::from(Span::styled("Action", heading)),
            Cell::from(Span::styled("Where", heading)),
        ])
        .bottom_margin(1);

        let widths = [
            Constraint::Length(15),
            Constraint::Min(25),
            Constraint::Length(14),
        ];

        Table::new(self.build_rows(), widths)
            .block(block)
            .header(header)
            .render(area, buf);
    }
}
