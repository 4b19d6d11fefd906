//! Novel Engine: a linear visual-novel presentation engine.
//!
//! Walks an ordered list of scenes, each a background plus dialogue lines,
//! one line at a time. The crate owns the scene/line state machine, the
//! menu/session mode switch, asset resolution and word-wrapped dialogue
//! layout; a platform layer draws the resulting display list.

pub mod core;
pub mod schema;
