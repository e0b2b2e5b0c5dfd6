//! Sprite generation workflows.
//!
//! Style fan-out, frame sequencing, chat classification and routing, plus
//! the application state, configuration and observability plumbing the
//! browser shell drives them through. [`studio::SpriteStudio`] is the entry
//! point that owns state and persists results after each call returns.

pub mod classifier;
pub mod config;
pub mod events;
pub mod key_store;
pub mod orchestrator;
pub mod router;
pub mod sequencer;
pub mod state;
pub mod studio;
pub mod telemetry;
