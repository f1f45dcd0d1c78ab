//! Dashboard surface: range state, theme, persisted preferences, rendering
//! and the interactive terminal loop.

pub mod interactive;
pub mod picker;
pub mod preferences;
pub mod render;
pub mod state;
pub mod theme;
