//! Lifecycle events emitted around every remote call.
//!
//! The orchestrator, sequencer and classifier report to an injected
//! [`GenerationObserver`] at four points: call start, call success, call
//! failure, and batch completion. [`TracingObserver`] logs them;
//! [`BroadcastObserver`] fans them out to UI subscribers.

use std::fmt;

use serde::Serialize;
use tokio::sync::broadcast;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// Which remote operation a call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Generate,
    Edit,
    Classify,
}

/// What a call was producing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallTarget {
    Style {
        style_id: String,
    },
    Frame {
        style_id: String,
        action_id: String,
        frame_index: u32,
    },
    Classification,
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Style { style_id } => write!(f, "style {style_id}"),
            Self::Frame {
                style_id,
                action_id,
                frame_index,
            } => write!(f, "{action_id} frame {} in {style_id}", u64::from(*frame_index) + 1),
            Self::Classification => f.write_str("classification"),
        }
    }
}

/// A lifecycle point of a generation call or batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    CallStarted {
        target: CallTarget,
        operation: Operation,
    },
    CallSucceeded {
        target: CallTarget,
    },
    CallFailed {
        target: CallTarget,
        error: String,
    },
    BatchCompleted {
        reference_token: String,
        succeeded: usize,
        failed: usize,
    },
}

/// Receives lifecycle events. Must not block.
pub trait GenerationObserver: Send + Sync {
    fn on_event(&self, event: &GenerationEvent);
}

// ---------------------------------------------------------------------------
// TracingObserver
// ---------------------------------------------------------------------------

/// Logs every event through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl GenerationObserver for TracingObserver {
    fn on_event(&self, event: &GenerationEvent) {
        match event {
            GenerationEvent::CallStarted { target, operation } => {
                tracing::debug!(call = %target, ?operation, "Generation call started");
            }
            GenerationEvent::CallSucceeded { target } => {
                tracing::info!(call = %target, "Generation call complete");
            }
            GenerationEvent::CallFailed { target, error } => {
                tracing::warn!(call = %target, error = %error, "Generation call failed");
            }
            GenerationEvent::BatchCompleted {
                reference_token,
                succeeded,
                failed,
            } => {
                tracing::info!(
                    reference_token = %reference_token,
                    succeeded,
                    failed,
                    "Successfully generated {succeeded} out of {} styles",
                    succeeded + failed,
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// BroadcastObserver
// ---------------------------------------------------------------------------

/// Publishes every event on a [`broadcast`] channel.
pub struct BroadcastObserver {
    sender: broadcast::Sender<GenerationEvent>,
}

impl BroadcastObserver {
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GenerationEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastObserver {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl GenerationObserver for BroadcastObserver {
    fn on_event(&self, event: &GenerationEvent) {
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event.clone());
    }
}
