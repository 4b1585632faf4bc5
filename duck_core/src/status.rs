//! Shared node status: the current status kind plus the last failure message.
//!
//! One `ErrorState` is created per node and handed to every component as
//! `Arc<ErrorState>`. The kind/message pair lives behind a single mutex so a
//! reader never observes the kind of one report with the message of another.

use serde::Serialize;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Longest stored message, in characters (50-byte buffer incl. terminator).
pub const MAX_MESSAGE_LEN: usize = 49;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    #[default]
    Ok,
    Bme680Init,
    GpsInit,
    RadioInit,
    QueueFull,
    SensorRead,
    GpsTimeout,
    Transmission,
    /// A reading fell outside its channel's physical bounds.
    InvalidReading,
    LowMemory,
    GpsNoFix,
}

impl StatusKind {
    /// Warnings annotate state for monitoring; they never block the caller.
    pub const fn is_warning(self) -> bool {
        matches!(self, Self::LowMemory | Self::GpsNoFix)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Bme680Init => "bme680_init",
            Self::GpsInit => "gps_init",
            Self::RadioInit => "radio_init",
            Self::QueueFull => "queue_full",
            Self::SensorRead => "sensor_read",
            Self::GpsTimeout => "gps_timeout",
            Self::Transmission => "transmission",
            Self::InvalidReading => "invalid_reading",
            Self::LowMemory => "low_memory",
            Self::GpsNoFix => "gps_no_fix",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Consistent copy of the status pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub kind: StatusKind,
    pub message: String,
}

#[derive(Debug, Default)]
struct Slot {
    kind: StatusKind,
    message: String,
}

#[derive(Debug, Default)]
pub struct ErrorState {
    slot: Mutex<Slot>,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        // The slot holds plain data; a panicking writer cannot leave it torn.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a failure or warning. Without a message the previous message
    /// is kept, only the kind changes.
    pub fn report(&self, kind: StatusKind, message: Option<&str>) {
        if kind == StatusKind::Ok {
            self.reset();
            return;
        }
        let mut slot = self.lock();
        let previous = slot.kind;
        slot.kind = kind;
        if let Some(m) = message {
            slot.message = m.chars().take(MAX_MESSAGE_LEN).collect();
        }
        let msg = slot.message.clone();
        drop(slot);
        if kind.is_warning() {
            tracing::warn!(%kind, %previous, message = %msg, "status warning");
        } else {
            tracing::error!(%kind, %previous, message = %msg, "status error");
        }
    }

    /// Return to `Ok` and forget the last message.
    pub fn reset(&self) {
        let mut slot = self.lock();
        let previous = slot.kind;
        slot.kind = StatusKind::Ok;
        slot.message.clear();
        drop(slot);
        if previous != StatusKind::Ok {
            tracing::info!(%previous, "status cleared");
        }
    }

    pub fn is_error(&self) -> bool {
        self.lock().kind != StatusKind::Ok
    }

    pub fn current_status(&self) -> StatusKind {
        self.lock().kind
    }

    pub fn last_message(&self) -> String {
        self.lock().message.clone()
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        let slot = self.lock();
        StatusSnapshot {
            kind: slot.kind,
            message: slot.message.clone(),
        }
    }
}
