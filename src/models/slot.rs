/// Text shown in a pane while its provider call is in flight
pub const LOADING_TEXT: &str = "Loading...";
/// Prefix carried by every error string, both on screen and in the history log
pub const ERROR_PREFIX: &str = "Error: ";

/// Display state of one provider pane
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseSlot {
    #[default]
    Empty,
    Loading,
    Text(String),
    Error(String),
}

impl ResponseSlot {
    /// Rebuild a slot from a string stored in a history entry.
    ///
    /// The empty string means "not answered yet"; strings carrying the error prefix
    /// come back as errors.
    pub fn from_stored(stored: &str) -> Self {
        if stored.is_empty() {
            ResponseSlot::Empty
        } else if let Some(message) = stored.strip_prefix(ERROR_PREFIX) {
            ResponseSlot::Error(message.to_string())
        } else {
            ResponseSlot::Text(stored.to_string())
        }
    }

    /// String written to the pane and to the history log
    pub fn display_text(&self) -> String {
        match self {
            ResponseSlot::Empty => String::new(),
            ResponseSlot::Loading => LOADING_TEXT.to_string(),
            ResponseSlot::Text(text) => text.clone(),
            ResponseSlot::Error(message) => format!("{}{}", ERROR_PREFIX, message),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ResponseSlot::Loading)
    }
}
