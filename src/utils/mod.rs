//! Utility modules for common functionality

mod text;

pub use text::{one_line, truncate_str};
