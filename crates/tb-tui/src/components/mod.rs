//! Widgets for each part of the screen.
//!
//! - **Widgets** (`Widget`): `HeaderBar`, `StatusBar`
//! - **Stateful widgets** (`StatefulWidget`): `BrowserList`
//! - **Overlays**: `HelpPanel`, `SearchInput`

mod browser;
mod header;
mod help;
mod search_input;
mod status_bar;

pub use browser::BrowserList;
pub use header::HeaderBar;
pub use help::HelpPanel;
pub use search_input::SearchInput;
pub use status_bar::StatusBar;

#[cfg(test)]
pub(crate) mod testing {
    use ratatui::buffer::Buffer;

    /// The buffer's symbols, one line per row, trailing blanks trimmed.
    pub(crate) fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (area.top()..area.bottom())
            .map(|y| {
                (area.left()..area.right())
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_owned()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
