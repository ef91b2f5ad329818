//! Main layout and rendering.
//!
//! ```text
//! +------------------------------------------------------------------+
//! | torbox-browse │ Torrents matching 'one' (1/4) │ ? for help       |
//! +------------------------------------------------------------------+
//! | ┌ Torrents ──────────────────────────────────────────────────────┐|
//! | │▸ 📦 One Piece (24 files)                                       │|
//! | └────────────────────────────────────────────────────────────────┘|
//! +------------------------------------------------------------------+
//! |  BROWSE  ⠋ Loaded 4 torrents │ 1/1                                |
//! +------------------------------------------------------------------+
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use tb_client::PageSource;

use crate::app::{App, AppMode};
use crate::components::{BrowserList, HeaderBar, HelpPanel, SearchInput, StatusBar};
use crate::theme::Theme;

/// Renders the whole screen.
///
/// Takes the app mutably only to record how many rows fit, for paging.
pub fn render<S: PageSource>(app: &mut App<S>, frame: &mut Frame, theme: &Theme) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Rows
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    app.set_visible_height(usize::from(chunks[1].height.saturating_sub(2)));
    let app = &*app;
    let view = app.view();

    frame.render_widget(&HeaderBar::new(&view.indicator, theme), chunks[0]);

    let list = BrowserList::new(view, app.state().mode(), theme);
    frame.render_stateful_widget(&list, chunks[1], &mut app.list_state.clone());

    let status_bar = StatusBar::new(app.mode, theme)
        .spinner(app.spinner())
        .status(app.status.as_ref())
        .position(app.list_state.selected, view.selectable_len());
    frame.render_widget(&status_bar, chunks[2]);

    match app.mode {
        AppMode::Searching => {
            let input = SearchInput::new(app.search_input(), theme);
            frame.render_widget(&input, centered_rect(60, 3, area));
        }
        AppMode::Help => {
            let area = centered_rect(70, area.height.saturating_sub(4).min(21), area);
            frame.render_widget(&HelpPanel::new(theme), area);
        }
        AppMode::Normal => {}
    }
}

/// A rectangle `percent_x` percent wide and `height` rows tall, centered in
/// `area`.
fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::json;
    use tb_client::{FixtureSource, ListingClient};
    use tb_core::ApiConfig;
    use tb_session::Navigator;
    use tb_tree::TreeBuilder;

    use super::*;
    use crate::app::perform;
    use crate::components::testing::buffer_text;

    #[test]
    fn test_centered_rect() {
        let area = Rect::new(0, 0, 100, 30);
        let centered = centered_rect(60, 3, area);
        assert_eq!(centered.height, 3);
        assert_eq!(centered.width, 60);
        assert!(centered.x > 0);
        assert!(centered.y > 0);
    }

    #[tokio::test]
    async fn test_render_top_level() {
        let source = FixtureSource::new(vec![
            json!({"id": 1, "name": "One Piece", "files": [
                {"id": 0, "name": "One Piece/E01.mkv", "size": 10},
                {"id": 1, "name": "One Piece/E02.mkv", "size": 10},
            ]}),
            json!({"id": 2, "name": "Naruto", "files": []}),
        ]);
        let navigator = Navigator::new(
            ListingClient::new(source, ApiConfig::default()),
            Arc::new(TreeBuilder::default()),
        );
        let mut app = App::new(Arc::new(navigator));
        let job = app.start().unwrap();
        let outcome = perform(app.navigator(), job).await;
        app.apply_outcome(outcome);

        let theme = Theme::dark();
        let mut terminal = Terminal::new(TestBackend::new(70, 10)).unwrap();
        terminal
            .draw(|frame| render(&mut app, frame, &theme))
            .unwrap();

        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("Torrents (2/2)"));
        assert!(text.contains("One Piece (2 files)"));
        assert!(text.contains("Naruto (0 files)"));
        assert!(text.contains("Loaded 2 torrents"));
        assert!(text.contains("1/2"));
        assert_eq!(app.list_state.visible_height, 5);
    }
}
