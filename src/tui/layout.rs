use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::dispatch::PaneLayout;
use crate::models::{ProviderId, ProviderMap};

/// Screen regions for one frame
pub struct AppLayout {
    pub input_area: Rect,
    pub panes: ProviderMap<Rect>,
    pub history_area: Option<Rect>,
    pub status_area: Rect,
}

impl AppLayout {
    /// Split the screen:
    /// - Input line: 3 rows at the top
    /// - History list: 30% width on the left (browsing modes only)
    /// - Provider panes: 2x2 grid or four columns
    /// - Status bar: bottom row
    pub fn new(area: Rect, pane_layout: PaneLayout, show_history: bool) -> Self {
        let vertical_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let (history_area, pane_area) = if show_history {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
                .split(vertical_chunks[1]);
            (Some(chunks[0]), chunks[1])
        } else {
            (None, vertical_chunks[1])
        };

        let panes = match pane_layout {
            PaneLayout::Grid => grid(pane_area),
            PaneLayout::Columns => columns(pane_area),
        };

        Self { input_area: vertical_chunks[0], panes, history_area, status_area: vertical_chunks[2] }
    }
}

fn halves(area: Rect, direction: Direction) -> [Rect; 2] {
    let chunks = Layout::default()
        .direction(direction)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .split(area);
    [chunks[0], chunks[1]]
}

// Claude | ChatGPT
// Grok   | Perplexity
fn grid(area: Rect) -> ProviderMap<Rect> {
    let [top, bottom] = halves(area, Direction::Vertical);
    let [top_left, top_right] = halves(top, Direction::Horizontal);
    let [bottom_left, bottom_right] = halves(bottom, Direction::Horizontal);
    ProviderMap::from_fn(|provider| match provider {
        ProviderId::Claude => top_left,
        ProviderId::ChatGpt => top_right,
        ProviderId::Grok => bottom_left,
        ProviderId::Perplexity => bottom_right,
    })
}

fn columns(area: Rect) -> ProviderMap<Rect> {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    ProviderMap::from_fn(|provider| chunks[provider.index()])
}
