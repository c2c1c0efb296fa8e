//! TUI application state and event handling.
//!
//! The `App` owns the [`Engine`] and runs the main loop via `run()`. Each tick it:
//!
//! - drains finished provider calls into the session (marks dirty if any landed)
//! - clears an expired status message
//! - redraws when dirty, or every 100ms so resizes are picked up
//! - polls one key and applies the resulting [`Action`]
//!
//! Two overlays change what keys mean: a yes/no confirmation in the status bar
//! (clearing memory or history) and masked API key entry.

use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use ratatui::Terminal;
use ratatui::backend::Backend;

use super::events::{Action, poll_event};
use super::rendering::{HistoryView, InputView, RenderState, render_ui};
use crate::clipboard::{ClipboardSink, copy_text};
use crate::dispatch::{Engine, ModeConfig};
use crate::models::{ProviderId, ProviderMap};

/// Duration for success status messages (milliseconds)
const STATUS_SUCCESS_DURATION_MS: u64 = 3000;
/// Duration for error status messages (milliseconds)
const STATUS_ERROR_DURATION_MS: u64 = 5000;
/// Longest question the input line accepts, in characters
const MAX_INPUT_CHARS: usize = 8192;

/// Type of status message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Success,
    Error,
}

/// Transient status message with expiry
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub message_type: MessageType,
    pub expires_at: Instant,
}

/// Destructive operations waiting for a yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirm {
    ClearMemory(ProviderId),
    ClearHistory,
}

impl Confirm {
    fn prompt(self) -> String {
        match self {
            Confirm::ClearMemory(provider) => format!("Clear {} conversation?", provider),
            Confirm::ClearHistory => {
                "Are you sure you want to clear all history? This cannot be undone.".to_string()
            }
        }
    }
}

struct KeyEntry {
    provider: ProviderId,
    buffer: String,
}

pub struct App {
    engine: Engine,
    config: ModeConfig,
    clipboard: Box<dyn ClipboardSink>,
    input: String,
    focus: ProviderId,
    /// Id of the history entry being viewed, if any
    selected_history: Option<u64>,
    confirm: Option<Confirm>,
    key_entry: Option<KeyEntry>,
    should_quit: bool,
    status_message: Option<StatusMessage>,
    needs_redraw: bool,
    last_draw_time: Instant,
}

impl App {
    pub fn new(engine: Engine, clipboard: Box<dyn ClipboardSink>) -> Self {
        let config = engine.mode().config();
        Self {
            engine,
            config,
            clipboard,
            input: String::new(),
            focus: ProviderId::Claude,
            selected_history: None,
            confirm: None,
            key_entry: None,
            should_quit: false,
            status_message: None,
            needs_redraw: true,
            last_draw_time: Instant::now(),
        }
    }

    /// Set a transient status message with automatic expiry
    fn set_status(&mut self, text: impl Into<String>, message_type: MessageType) {
        let duration_ms = match message_type {
            MessageType::Success => STATUS_SUCCESS_DURATION_MS,
            MessageType::Error => STATUS_ERROR_DURATION_MS,
        };
        self.status_message = Some(StatusMessage {
            text: text.into(),
            message_type,
            expires_at: Instant::now() + Duration::from_millis(duration_ms),
        });
        self.needs_redraw = true;
    }

    fn check_and_clear_expired_status(&mut self) {
        if self.status_message.as_ref().is_some_and(|msg| Instant::now() >= msg.expires_at) {
            self.status_message = None;
            self.needs_redraw = true;
        }
    }

    /// Apply any completions that arrived since the last tick
    fn drain_completions(&mut self) {
        if !self.engine.drain().is_empty() {
            self.needs_redraw = true;
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        while !self.should_quit {
            self.check_and_clear_expired_status();
            self.drain_completions();

            let now = Instant::now();
            let elapsed = now.duration_since(self.last_draw_time);
            if self.needs_redraw || elapsed >= Duration::from_millis(100) {
                terminal.draw(|f| render_ui(f, &self.render_state()))?;
                self.needs_redraw = false;
                self.last_draw_time = now;
            }

            let action = poll_event(Duration::from_millis(100))?;
            self.handle_action(action);
        }

        Ok(())
    }

    fn render_state(&self) -> RenderState<'_> {
        let session = self.engine.session();
        let input = match &self.key_entry {
            Some(entry) => {
                InputView::Key { provider: entry.provider, len: entry.buffer.chars().count() }
            }
            None => InputView::Question(&self.input),
        };
        let history = if self.config.browse_history {
            session.log().map(|log| HistoryView {
                entries: log.entries(),
                selected: self.selected_history,
            })
        } else {
            None
        };

        RenderState {
            mode: self.engine.mode(),
            input,
            slots: session.slots(),
            memory_counts: session
                .memory()
                .is_enabled()
                .then(|| ProviderMap::from_fn(|p| session.memory().memory_count(p))),
            key_overrides: ProviderMap::from_fn(|p| self.engine.keys().has_override(p)),
            focus: self.focus,
            history,
            display: session.display(),
            in_flight: session.in_flight_count(),
            prompt: self.confirm.map(Confirm::prompt),
            status_message: self.status_message.as_ref(),
            now: Utc::now(),
        }
    }

    /// Handle a user action (extracted for testing)
    fn handle_action(&mut self, action: Action) {
        if action == Action::None {
            return;
        }
        self.needs_redraw = true;

        if action == Action::Quit {
            self.should_quit = true;
        } else if let Some(confirm) = self.confirm.take() {
            self.answer_confirmation(confirm, action);
        } else if self.key_entry.is_some() {
            self.handle_key_entry(action);
        } else {
            self.handle_main(action);
        }
    }

    fn handle_main(&mut self, action: Action) {
        match action {
            Action::Escape => {
                if self.input.is_empty() {
                    self.should_quit = true;
                } else {
                    self.input.clear();
                }
            }
            Action::Submit => self.submit(),
            Action::NextPane => self.focus = self.focus.next(),
            Action::ClearMemory => {
                if self.config.history.enable_memory {
                    self.confirm = Some(Confirm::ClearMemory(self.focus));
                } else {
                    self.set_status("✗ Conversation memory is off in this mode", MessageType::Error);
                }
            }
            Action::ClearHistory => match self.engine.session().log().map(|log| log.is_empty()) {
                None => self.set_status("✗ History is off in this mode", MessageType::Error),
                Some(true) => self.set_status("History is already empty", MessageType::Success),
                Some(false) => self.confirm = Some(Confirm::ClearHistory),
            },
            Action::HistoryUp => self.move_history_selection(-1),
            Action::HistoryDown => self.move_history_selection(1),
            Action::ShowLive => {
                if self.config.browse_history {
                    self.selected_history = None;
                    self.engine.session_mut().show_live();
                }
            }
            Action::EnterKey => {
                if self.config.key_entry {
                    self.key_entry = Some(KeyEntry { provider: self.focus, buffer: String::new() });
                } else {
                    self.set_status("✗ Key entry is only available in horizontal mode", MessageType::Error);
                }
            }
            Action::CopyToClipboard => self.copy_focused(),
            Action::Input(c) => {
                if self.input.chars().count() < MAX_INPUT_CHARS {
                    self.input.push(c);
                }
            }
            Action::DeleteChar => {
                self.input.pop();
            }
            Action::Quit | Action::None => {}
        }
    }

    fn submit(&mut self) {
        if self.engine.submit(&self.input).is_some() {
            self.input.clear();
            self.selected_history = None;
        }
    }

    fn answer_confirmation(&mut self, confirm: Confirm, action: Action) {
        if !matches!(action, Action::Input('y' | 'Y')) {
            self.set_status("Cancelled", MessageType::Success);
            return;
        }

        match confirm {
            Confirm::ClearMemory(provider) => {
                self.engine.session_mut().clear_memory(provider);
                self.set_status(format!("✓ Cleared {} conversation", provider), MessageType::Success);
            }
            Confirm::ClearHistory => match self.engine.session_mut().clear_history() {
                Ok(()) => {
                    self.selected_history = None;
                    self.set_status("✓ History cleared", MessageType::Success);
                }
                Err(e) => {
                    self.set_status(format!("✗ Failed to clear history: {:#}", e), MessageType::Error)
                }
            },
        }
    }

    fn handle_key_entry(&mut self, action: Action) {
        match action {
            Action::Input(c) => {
                if let Some(entry) = self.key_entry.as_mut() {
                    entry.buffer.push(c);
                }
            }
            Action::DeleteChar => {
                if let Some(entry) = self.key_entry.as_mut() {
                    entry.buffer.pop();
                }
            }
            Action::Escape => {
                self.key_entry = None;
                self.set_status("Key entry cancelled", MessageType::Success);
            }
            Action::Submit => {
                if let Some(KeyEntry { provider, buffer }) = self.key_entry.take() {
                    let text = if buffer.trim().is_empty() {
                        format!("✓ {} session key removed", provider)
                    } else {
                        format!("✓ {} key set for this session", provider)
                    };
                    self.engine.keys_mut().set_override(provider, buffer);
                    self.set_status(text, MessageType::Success);
                }
            }
            _ => {}
        }
    }

    fn move_history_selection(&mut self, delta: isize) {
        if !self.config.browse_history {
            return;
        }
        let Some(log) = self.engine.session().log() else {
            return;
        };
        let entries = log.entries();
        if entries.is_empty() {
            return;
        }

        let current = self.selected_history.and_then(|id| entries.iter().position(|e| e.id == id));
        let next = match current {
            None => 0,
            Some(idx) => (idx as isize + delta).clamp(0, entries.len() as isize - 1) as usize,
        };
        let id = entries[next].id;

        self.selected_history = Some(id);
        self.engine.session_mut().show_history(id);
    }

    fn copy_focused(&mut self) {
        let text = self.engine.session().slot(self.focus).display_text();
        match copy_text(&text, self.clipboard.as_mut()) {
            Ok(()) => {
                self.set_status(format!("✓ Copied {} response", self.focus), MessageType::Success)
            }
            Err(e) => self.set_status(format!("✗ Clipboard error: {}", e), MessageType::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;
    use tokio::runtime::Runtime;

    use super::*;
    use crate::config::{ApiKeySet, ProviderSettings};
    use crate::dispatch::{DisplaySource, Mode};
    use crate::history::MemoryHistoryStore;
    use crate::models::ResponseSlot;
    use crate::providers::{HttpRequest, HttpResponse, ProviderError, Transport, build_adapters};

    /// Answers every provider with "4"; the body satisfies both reply shapes
    struct FourTransport;

    #[async_trait]
    impl Transport for FourTransport {
        async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, ProviderError> {
            Ok(HttpResponse::json(
                200,
                &json!({
                    "content": [{"type": "text", "text": "4"}],
                    "choices": [{"message": {"content": "4"}}]
                }),
            ))
        }
    }

    #[derive(Clone, Default)]
    struct SharedClipboard(Arc<Mutex<Option<String>>>);

    impl ClipboardSink for SharedClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            *self.0.lock().unwrap() = Some(text.to_string());
            Ok(())
        }
    }

    fn create_app(rt: &Runtime, mode: Mode) -> (App, SharedClipboard) {
        let engine = Engine::new(
            mode,
            Box::new(MemoryHistoryStore::new()),
            Arc::new(FourTransport),
            build_adapters(&ProviderSettings::default()),
            ApiKeySet::default(),
            rt.handle().clone(),
        );
        let clipboard = SharedClipboard::default();
        (App::new(engine, Box::new(clipboard.clone())), clipboard)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_action(Action::Input(c));
        }
    }

    fn ask(rt: &Runtime, app: &mut App, question: &str) {
        type_text(app, question);
        app.handle_action(Action::Submit);
        rt.block_on(async { while app.engine.next_completion().await.is_some() {} });
    }

    #[test]
    fn test_app_new_initializes_state() {
        let rt = Runtime::new().unwrap();
        let (app, _) = create_app(&rt, Mode::Grid);

        assert_eq!(app.input, "");
        assert_eq!(app.focus, ProviderId::Claude);
        assert!(!app.should_quit);
        assert!(app.needs_redraw);
    }

    #[test]
    fn test_submit_clears_input_and_fills_panes() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);

        ask(&rt, &mut app, "What is 2+2?");

        assert_eq!(app.input, "");
        for provider in ProviderId::ALL {
            assert_eq!(app.engine.session().slot(provider), &ResponseSlot::Text("4".into()));
            assert_eq!(app.engine.session().memory().memory_count(provider), 1);
        }
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);

        type_text(&mut app, "   ");
        app.handle_action(Action::Submit);

        assert_eq!(app.input, "   ");
        assert_eq!(app.engine.session().display(), DisplaySource::Idle);
        assert!(app.engine.session().log().unwrap().is_empty());
    }

    #[test]
    fn test_escape_clears_then_quits() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);

        type_text(&mut app, "draft");
        app.handle_action(Action::Escape);
        assert_eq!(app.input, "");
        assert!(!app.should_quit);

        app.handle_action(Action::Escape);
        assert!(app.should_quit);
    }

    #[test]
    fn test_delete_char() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);

        type_text(&mut app, "ab");
        app.handle_action(Action::DeleteChar);
        assert_eq!(app.input, "a");
        app.handle_action(Action::DeleteChar);
        app.handle_action(Action::DeleteChar);
        assert_eq!(app.input, "");
    }

    #[test]
    fn test_tab_cycles_focus() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);

        let mut seen = vec![app.focus];
        for _ in 0..4 {
            app.handle_action(Action::NextPane);
            seen.push(app.focus);
        }
        assert_eq!(
            seen,
            vec![
                ProviderId::Claude,
                ProviderId::ChatGpt,
                ProviderId::Grok,
                ProviderId::Perplexity,
                ProviderId::Claude
            ]
        );
    }

    #[test]
    fn test_clear_memory_requires_confirmation() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);
        ask(&rt, &mut app, "q");
        app.handle_action(Action::NextPane);

        app.handle_action(Action::ClearMemory);
        assert_eq!(app.render_state().prompt.as_deref(), Some("Clear ChatGPT conversation?"));

        // Any key other than y cancels
        app.handle_action(Action::Input('n'));
        assert!(app.confirm.is_none());
        assert_eq!(app.engine.session().memory().memory_count(ProviderId::ChatGpt), 1);

        app.handle_action(Action::ClearMemory);
        app.handle_action(Action::Input('y'));
        let session = app.engine.session();
        assert_eq!(session.memory().memory_count(ProviderId::ChatGpt), 0);
        assert_eq!(session.slot(ProviderId::ChatGpt), &ResponseSlot::Empty);
        assert_eq!(session.memory().memory_count(ProviderId::Claude), 1);
        assert_eq!(app.input, "");
    }

    #[test]
    fn test_clear_memory_unavailable_without_memory() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Privacy);

        app.handle_action(Action::ClearMemory);
        assert!(app.confirm.is_none());
        let status = app.status_message.as_ref().unwrap();
        assert_eq!(status.message_type, MessageType::Error);
    }

    #[test]
    fn test_clear_history_confirmation() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::History);

        app.handle_action(Action::ClearHistory);
        assert!(app.confirm.is_none(), "nothing to clear yet");

        ask(&rt, &mut app, "q");
        app.handle_action(Action::ClearHistory);
        assert_eq!(app.confirm, Some(Confirm::ClearHistory));
        app.handle_action(Action::Input('Y'));

        assert!(app.engine.session().log().unwrap().is_empty());
    }

    #[test]
    fn test_history_browsing() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::History);
        ask(&rt, &mut app, "first");
        ask(&rt, &mut app, "second");
        let ids: Vec<u64> =
            app.engine.session().log().unwrap().entries().iter().map(|e| e.id).collect();

        app.handle_action(Action::HistoryDown);
        assert_eq!(app.selected_history, Some(ids[0]));
        app.handle_action(Action::HistoryDown);
        assert_eq!(app.selected_history, Some(ids[1]));
        assert_eq!(app.engine.session().display(), DisplaySource::History(ids[1]));
        app.handle_action(Action::HistoryDown);
        assert_eq!(app.selected_history, Some(ids[1]));

        app.handle_action(Action::HistoryUp);
        assert_eq!(app.selected_history, Some(ids[0]));

        app.handle_action(Action::ShowLive);
        assert_eq!(app.selected_history, None);
        assert_eq!(app.engine.session().display(), DisplaySource::Live(ids[0]));
    }

    #[test]
    fn test_history_keys_ignored_in_grid_mode() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);
        ask(&rt, &mut app, "q");

        app.handle_action(Action::HistoryDown);
        assert_eq!(app.selected_history, None);
        assert!(app.render_state().history.is_none());
    }

    #[test]
    fn test_show_live_keeps_answers_in_privacy_mode() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Privacy);
        ask(&rt, &mut app, "q");

        app.handle_action(Action::ShowLive);
        for provider in ProviderId::ALL {
            assert_eq!(app.engine.session().slot(provider), &ResponseSlot::Text("4".into()));
        }
    }

    #[test]
    fn test_key_entry_sets_session_override() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Horizontal);
        app.handle_action(Action::NextPane);
        app.handle_action(Action::NextPane);

        app.handle_action(Action::EnterKey);
        type_text(&mut app, "xai-secret");
        assert!(matches!(
            app.render_state().input,
            InputView::Key { provider: ProviderId::Grok, len: 10 }
        ));
        assert_eq!(app.input, "", "key characters never reach the question line");

        app.handle_action(Action::Submit);
        assert!(app.key_entry.is_none());
        assert_eq!(app.engine.keys().get(ProviderId::Grok), "xai-secret");
        assert!(!app.engine.keys().has_override(ProviderId::Claude));
    }

    #[test]
    fn test_key_entry_escape_cancels() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Horizontal);

        app.handle_action(Action::EnterKey);
        type_text(&mut app, "sk");
        app.handle_action(Action::Escape);

        assert!(app.key_entry.is_none());
        assert!(!app.should_quit);
        assert!(!app.engine.keys().has_override(ProviderId::Claude));
    }

    #[test]
    fn test_key_entry_only_in_horizontal_mode() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);
        app.handle_action(Action::EnterKey);
        assert!(app.key_entry.is_none());
    }

    #[test]
    fn test_copy_focused_pane() {
        let rt = Runtime::new().unwrap();
        let (mut app, clipboard) = create_app(&rt, Mode::Privacy);

        app.handle_action(Action::CopyToClipboard);
        assert_eq!(app.status_message.as_ref().unwrap().message_type, MessageType::Error);
        assert_eq!(*clipboard.0.lock().unwrap(), None);

        ask(&rt, &mut app, "q");
        app.handle_action(Action::CopyToClipboard);
        assert_eq!(clipboard.0.lock().unwrap().as_deref(), Some("4"));
        assert_eq!(app.status_message.as_ref().unwrap().message_type, MessageType::Success);
    }

    #[test]
    fn test_quit_from_confirmation() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);
        app.handle_action(Action::ClearMemory);
        app.handle_action(Action::Quit);
        assert!(app.should_quit);
    }

    #[test]
    fn test_status_expiry() {
        let rt = Runtime::new().unwrap();
        let (mut app, _) = create_app(&rt, Mode::Grid);
        app.set_status("done", MessageType::Success);
        app.status_message.as_mut().unwrap().expires_at = Instant::now();
        app.needs_redraw = false;

        app.check_and_clear_expired_status();
        assert!(app.status_message.is_none());
        assert!(app.needs_redraw);
    }
}
