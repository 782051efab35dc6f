//! Cuelink - Translated Caption Overlay Engine
//!
//! Parses WebVTT-style timed text, translates it through an LLM as two
//! boundary-safe halves in parallel, and keeps the translated cues in step
//! with a playback clock.

pub mod cli;
pub mod clock;
pub mod config;
pub mod cue;
pub mod error;
pub mod events;
pub mod overlay;
pub mod pipeline;
pub mod playback;
pub mod segment;
pub mod translate;
pub mod workflow;
