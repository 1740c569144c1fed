//! Observable outcomes of slashing processing.
//!
//! The processor reports every per-claim decision to a [`SlashingEventSink`]. The default sink
//! writes them to `tracing`; [`RecordingEventSink`] keeps them in memory for inspection.

use std::fmt;

use alloy_primitives::B256;
use parking_lot::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashingKind {
    Attester,
    Proposer,
}

impl fmt::Display for SlashingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attester => write!(f, "attester"),
            Self::Proposer => write!(f, "proposer"),
        }
    }
}

/// Which half of a slashing pair an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::Second => write!(f, "second"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashingEvent {
    InvalidSignature {
        kind: SlashingKind,
        side: Side,
    },
    UnknownValidator {
        kind: SlashingKind,
        side: Side,
        validator_index: u64,
    },
    StateUnavailable {
        kind: SlashingKind,
        reason: String,
    },
    PoolRejected {
        kind: SlashingKind,
        reason: String,
    },
    Admitted {
        kind: SlashingKind,
        root: B256,
    },
}

impl SlashingEvent {
    /// Log message the event is reported under.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidSignature { .. } => "Invalid signature",
            Self::UnknownValidator { .. } => "Slashing references unknown validator",
            Self::StateUnavailable { .. } => "Could not resolve state for slashing",
            Self::PoolRejected { .. } => "Could not insert slashing into pool",
            Self::Admitted { .. } => "Slashing admitted to pool",
        }
    }
}

pub trait SlashingEventSink: Send + Sync {
    fn emit(&self, event: SlashingEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventSink;

impl SlashingEventSink for TracingEventSink {
    fn emit(&self, event: SlashingEvent) {
        let message = event.message();
        match event {
            SlashingEvent::InvalidSignature { kind, side } => {
                warn!(%kind, %side, "{message}")
            }
            SlashingEvent::UnknownValidator {
                kind,
                side,
                validator_index,
            } => warn!(%kind, %side, validator_index, "{message}"),
            SlashingEvent::StateUnavailable { kind, reason } => {
                warn!(%kind, %reason, "{message}")
            }
            SlashingEvent::PoolRejected { kind, reason } => {
                warn!(%kind, %reason, "{message}")
            }
            SlashingEvent::Admitted { kind, root } => {
                debug!(%kind, %root, "{message}")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingEventSink {
    events: Mutex<Vec<SlashingEvent>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SlashingEvent> {
        self.events.lock().clone()
    }

    pub fn invalid_signatures(&self) -> Vec<Side> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                SlashingEvent::InvalidSignature { side, .. } => Some(*side),
                _ => None,
            })
            .collect()
    }

    pub fn admitted(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, SlashingEvent::Admitted { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl SlashingEventSink for RecordingEventSink {
    fn emit(&self, event: SlashingEvent) {
        self.events.lock().push(event);
    }
}
