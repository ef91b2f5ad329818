//! Theme and styling for the TUI.
//!
//! # Example
//!
//! ```
//! use tb_session::RowKind;
//! use tb_tui::Theme;
//!
//! let theme = Theme::dark();
//! let style = theme.row_style(RowKind::Directory);
//! assert_eq!(style.fg, Some(theme.directory_fg));
//! ```

use ratatui::style::{Color, Modifier, Style};
use tb_core::ColorScheme;
use tb_session::RowKind;

/// Colors and styles used throughout the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    // =========================================================================
    // Row Colors
    // =========================================================================
    /// Torrents in the top-level list.
    pub torrent_fg: Color,

    /// Directories inside a torrent.
    pub directory_fg: Color,

    /// Playable files.
    pub file_fg: Color,

    /// Informational rows ("No torrents match ...").
    pub placeholder_fg: Color,

    // =========================================================================
    // Base Colors
    // =========================================================================
    /// Primary foreground color.
    pub fg: Color,

    /// Dimmed/secondary text color.
    pub dimmed_fg: Color,

    /// Accent color for titles and the cursor.
    pub accent: Color,

    /// Error color.
    pub error_fg: Color,

    /// Background of modal overlays.
    pub overlay_bg: Color,

    // =========================================================================
    // Component Styles
    // =========================================================================
    /// Style for list borders.
    pub border_style: Style,

    /// Style for overlay borders.
    pub focused_border_style: Style,

    /// Style for the row under the cursor.
    pub highlight_style: Style,

    /// Style for titles.
    pub header_style: Style,

    /// Style for the status bar.
    pub status_bar_style: Style,
}

/// Base colors a theme is derived from.
struct Palette {
    text: Color,
    muted: Color,
    accent: Color,
    file: Color,
    error: Color,
    border: Color,
    overlay: Color,
    cursor_fg: Color,
    cursor_bg: Color,
    bar_fg: Color,
    bar_bg: Color,
}

impl Palette {
    fn into_theme(self) -> Theme {
        Theme {
            torrent_fg: self.text,
            directory_fg: self.accent,
            file_fg: self.file,
            placeholder_fg: self.muted,
            fg: self.text,
            dimmed_fg: self.muted,
            accent: self.accent,
            error_fg: self.error,
            overlay_bg: self.overlay,
            border_style: Style::new().fg(self.border),
            focused_border_style: Style::new().fg(self.accent),
            highlight_style: Style::new()
                .fg(self.cursor_fg)
                .bg(self.cursor_bg)
                .add_modifier(Modifier::BOLD),
            header_style: Style::new().fg(self.accent).add_modifier(Modifier::BOLD),
            status_bar_style: Style::new().fg(self.bar_fg).bg(self.bar_bg),
        }
    }
}

impl Theme {
    /// Light text on a dark background.
    #[must_use]
    pub fn dark() -> Self {
        Palette {
            text: Color::Rgb(220, 220, 220),
            muted: Color::Rgb(128, 128, 128),
            accent: Color::Rgb(100, 150, 255),
            file: Color::Rgb(100, 220, 140),
            error: Color::Rgb(255, 80, 80),
            border: Color::Rgb(80, 80, 100),
            overlay: Color::Rgb(30, 30, 40),
            cursor_fg: Color::White,
            cursor_bg: Color::Rgb(60, 60, 80),
            bar_fg: Color::Rgb(180, 180, 180),
            bar_bg: Color::Rgb(40, 40, 50),
        }
        .into_theme()
    }

    /// Dark text on a light background.
    #[must_use]
    pub fn light() -> Self {
        Palette {
            text: Color::Rgb(30, 30, 30),
            muted: Color::Rgb(100, 100, 100),
            accent: Color::Rgb(50, 100, 200),
            file: Color::Rgb(40, 130, 70),
            error: Color::Rgb(180, 50, 50),
            border: Color::Rgb(150, 150, 170),
            overlay: Color::Rgb(235, 235, 245),
            cursor_fg: Color::Black,
            cursor_bg: Color::Rgb(200, 200, 220),
            bar_fg: Color::Rgb(60, 60, 60),
            bar_bg: Color::Rgb(220, 220, 230),
        }
        .into_theme()
    }

    /// Picks a theme for `scheme`; [`ColorScheme::Auto`] means dark.
    #[must_use]
    pub fn from_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Foreground color for a row kind.
    #[must_use]
    pub const fn row_color(&self, kind: RowKind) -> Color {
        match kind {
            RowKind::Torrent => self.torrent_fg,
            RowKind::Directory => self.directory_fg,
            RowKind::File => self.file_fg,
            RowKind::Placeholder => self.placeholder_fg,
        }
    }

    /// Style for a row kind.
    #[must_use]
    pub fn row_style(&self, kind: RowKind) -> Style {
        let style = Style::new().fg(self.row_color(kind));
        match kind {
            RowKind::Placeholder => style.add_modifier(Modifier::ITALIC),
            RowKind::Torrent | RowKind::Directory | RowKind::File => style,
        }
    }

    /// Icon shown before a row.
    #[must_use]
    pub const fn row_icon(kind: RowKind) -> &'static str {
        match kind {
            RowKind::Torrent => "📦",
            RowKind::Directory => "📁",
            RowKind::File => "📄",
            RowKind::Placeholder => "",
        }
    }

    /// Plain text.
    #[must_use]
    pub fn base_style(&self) -> Style {
        Style::new().fg(self.fg)
    }

    /// Secondary text such as sizes and hints.
    #[must_use]
    pub fn dimmed_style(&self) -> Style {
        Style::new().fg(self.dimmed_fg)
    }

    /// Error messages.
    #[must_use]
    pub fn error_style(&self) -> Style {
        Style::new().fg(self.error_fg)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
