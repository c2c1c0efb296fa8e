use clap::ValueEnum;

/// Which of the engine's optional state is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Replay each provider's transcript on the next call
    pub enable_memory: bool,
    /// Record every query in the history log
    pub enable_log: bool,
    /// Keep the log on disk across runs; otherwise it lives only for the session
    pub persist_log: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneLayout {
    /// 2x2 grid
    Grid,
    /// Four side-by-side columns
    Columns,
}

/// Everything a mode switches on or off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeConfig {
    pub history: HistoryConfig,
    /// Past entries can be listed and opened read-only
    pub browse_history: bool,
    /// API keys can be typed in for the session
    pub key_entry: bool,
    pub layout: PaneLayout,
}

/// The four ways of running the same engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Mode {
    /// Grid with per-provider memory and a history log
    #[default]
    Grid,
    /// Grid with a browsable history log, no memory
    History,
    /// Four columns with session-only history browsing and session key entry
    Horizontal,
    /// Nothing remembered, nothing recorded
    Privacy,
}

impl Mode {
    pub fn config(self) -> ModeConfig {
        match self {
            Mode::Grid => ModeConfig {
                history: HistoryConfig { enable_memory: true, enable_log: true, persist_log: true },
                browse_history: false,
                key_entry: false,
                layout: PaneLayout::Grid,
            },
            Mode::History => ModeConfig {
                history: HistoryConfig { enable_memory: false, enable_log: true, persist_log: true },
                browse_history: true,
                key_entry: false,
                layout: PaneLayout::Grid,
            },
            Mode::Horizontal => ModeConfig {
                history: HistoryConfig { enable_memory: false, enable_log: true, persist_log: false },
                browse_history: true,
                key_entry: true,
                layout: PaneLayout::Columns,
            },
            Mode::Privacy => ModeConfig {
                history: HistoryConfig { enable_memory: false, enable_log: false, persist_log: false },
                browse_history: false,
                key_entry: false,
                layout: PaneLayout::Grid,
            },
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Mode::Grid => "Grid",
            Mode::History => "Grid with History",
            Mode::Horizontal => "Horizontal",
            Mode::Privacy => "Privacy Mode",
        }
    }
}
