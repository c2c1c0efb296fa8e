pub mod environment;
pub mod text;
pub mod timestamps;

pub use environment::{DATA_DIR_ENV, resolve_data_dir};
pub use text::preview;
pub use timestamps::{format_full, format_timestamp};
