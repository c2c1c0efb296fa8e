use chrono::{DateTime, Utc};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

use super::app::{MessageType, StatusMessage};
use super::layout::AppLayout;
use crate::dispatch::{DisplaySource, Mode};
use crate::models::{HistoryEntry, ProviderId, ProviderMap, ResponseSlot};
use crate::utils::{format_timestamp, preview};

const ACCENT: Color = Color::Rgb(16, 185, 129);
const MUTED: Color = Color::Rgb(113, 113, 122);
const BRIGHT: Color = Color::Rgb(250, 250, 250);
const BAR: Color = Color::Rgb(24, 24, 27);
const DANGER: Color = Color::Rgb(239, 68, 68);
const WARNING: Color = Color::Rgb(234, 179, 8);

/// What the input line is collecting
#[derive(Debug, Clone, Copy)]
pub enum InputView<'a> {
    Question(&'a str),
    /// Masked API key entry; only the length is ever rendered
    Key { provider: ProviderId, len: usize },
}

pub struct HistoryView<'a> {
    pub entries: &'a [HistoryEntry],
    pub selected: Option<u64>,
}

/// Everything one frame needs, borrowed from the app
pub struct RenderState<'a> {
    pub mode: Mode,
    pub input: InputView<'a>,
    pub slots: &'a ProviderMap<ResponseSlot>,
    /// Remembered exchanges per provider, in memory modes
    pub memory_counts: Option<ProviderMap<usize>>,
    pub key_overrides: ProviderMap<bool>,
    pub focus: ProviderId,
    pub history: Option<HistoryView<'a>>,
    pub display: DisplaySource,
    pub in_flight: usize,
    pub prompt: Option<String>,
    pub status_message: Option<&'a StatusMessage>,
    pub now: DateTime<Utc>,
}

/// Render the entire UI
pub fn render_ui(frame: &mut Frame, state: &RenderState) {
    let config = state.mode.config();
    let layout = AppLayout::new(frame.area(), config.layout, state.history.is_some());

    render_input(frame, layout.input_area, state);
    for provider in ProviderId::ALL {
        render_pane(frame, layout.panes[provider], provider, state);
    }
    if let (Some(area), Some(history)) = (layout.history_area, state.history.as_ref()) {
        render_history_list(frame, area, history, &state.now);
    }
    render_status_bar(frame, layout.status_area, state);
}

fn border(focused: bool) -> Style {
    Style::default().fg(if focused { ACCENT } else { MUTED })
}

fn render_input(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (title, text, focused) = match state.input {
        InputView::Question(text) => {
            (format!(" {} | Ask all four ", state.mode.title()), text.to_string(), false)
        }
        InputView::Key { provider, len } => (
            format!(" {} API key (Enter: save for this session, Esc: cancel) ", provider),
            "•".repeat(len),
            true,
        ),
    };

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(ACCENT)),
        Span::raw(text),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(border(focused)).title(title));

    frame.render_widget(paragraph, area);
}

fn pane_title(provider: ProviderId, state: &RenderState) -> String {
    let mut title = format!(" {}", provider.display_name());
    if let Some(counts) = &state.memory_counts {
        title.push_str(&format!(" ({} memories)", counts[provider]));
    }
    if state.key_overrides[provider] {
        title.push_str(" [session key]");
    }
    title.push(' ');
    title
}

fn render_pane(frame: &mut Frame, area: Rect, provider: ProviderId, state: &RenderState) {
    let slot = &state.slots[provider];
    let style = match slot {
        ResponseSlot::Loading => Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
        ResponseSlot::Error(_) => Style::default().fg(DANGER),
        ResponseSlot::Empty | ResponseSlot::Text(_) => Style::default(),
    };

    let paragraph = Paragraph::new(slot.display_text())
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border(provider == state.focus))
                .title(pane_title(provider, state)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

fn render_history_list(frame: &mut Frame, area: Rect, history: &HistoryView, now: &DateTime<Utc>) {
    let items: Vec<ListItem> = history
        .entries
        .iter()
        .map(|entry| {
            let content = format!(
                "{} [{}/4] {}",
                format_timestamp(&entry.created_at, now),
                entry.answered_count(),
                preview(&entry.query, 40)
            );

            let style = if history.selected == Some(entry.id) {
                Style::default().fg(BRIGHT).bg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };

            ListItem::new(content).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(MUTED))
            .title(format!(" History ({}) ", history.entries.len())),
    );

    frame.render_widget(list, area);
}

fn viewing_label(state: &RenderState) -> String {
    match state.display {
        DisplaySource::Idle => "[READY]".to_string(),
        DisplaySource::Live(_) => "[LIVE]".to_string(),
        DisplaySource::History(id) => {
            let query = state
                .history
                .as_ref()
                .and_then(|h| h.entries.iter().find(|e| e.id == id))
                .map(|e| preview(&e.query, 30))
                .unwrap_or_default();
            format!("[HISTORY] {}", query)
        }
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, state: &RenderState) {
    let (status_text, style) = if let Some(prompt) = &state.prompt {
        (format!(" {} (y/n) ", prompt), Style::default().fg(BAR).bg(WARNING))
    } else if let Some(message) = state.status_message {
        let fg = match message.message_type {
            MessageType::Success => ACCENT,
            MessageType::Error => DANGER,
        };
        (format!(" {} ", message.text), Style::default().fg(fg).bg(BAR))
    } else {
        let config = state.mode.config();
        let mut parts = vec![viewing_label(state)];

        if state.in_flight > 0 {
            parts.push(format!("{} pending", state.in_flight));
        }
        parts.push("Enter: ask".to_string());
        parts.push("Tab: pane".to_string());
        parts.push("Ctrl+Y: copy".to_string());
        if config.history.enable_memory {
            parts.push("Ctrl+D: forget".to_string());
        }
        if config.browse_history {
            parts.push("Up/Down: history".to_string());
            parts.push("Ctrl+L: live".to_string());
        }
        if config.history.enable_log {
            parts.push("Ctrl+X: clear history".to_string());
        }
        if config.key_entry {
            parts.push("Ctrl+K: key".to_string());
        }
        parts.push("Ctrl+C: quit".to_string());

        (format!(" {} ", parts.join(" | ")), Style::default().fg(BRIGHT).bg(BAR))
    };

    frame.render_widget(Paragraph::new(status_text).style(style), area);
}
