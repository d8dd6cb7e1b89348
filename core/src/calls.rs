use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::conversations::matches_query;
use crate::format::format_duration;
use crate::models::{CallDirection, CallKind, CallLogEntry};
use crate::timer::{schedule_every, TimerHandle};

#[derive(Debug, Clone, Default)]
pub struct CallLog {
    entries: Vec<CallLogEntry>,
}

impl CallLog {
    pub fn new(entries: Vec<CallLogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CallLogEntry] {
        &self.entries
    }

    pub fn search(&self, query: &str) -> Vec<&CallLogEntry> {
        self.entries
            .iter()
            .filter(|e| matches_query(&e.name, query))
            .collect()
    }

    pub fn missed(&self) -> impl Iterator<Item = &CallLogEntry> {
        self.entries
            .iter()
            .filter(|e| e.direction == CallDirection::Missed)
    }

    pub fn record(&mut self, entry: CallLogEntry) {
        self.entries.insert(0, entry);
    }
}

/// An outgoing call in progress. The duration counter stops when the session
/// ends or is dropped.
pub struct CallSession {
    name: String,
    avatar: String,
    kind: CallKind,
    started_at: i64,
    seconds: Arc<AtomicU64>,
    muted: bool,
    speaker_on: bool,
    front_camera: bool,
    _counter: TimerHandle,
}

impl CallSession {
    pub fn start(name: impl Into<String>, avatar: impl Into<String>, kind: CallKind, now: i64) -> Self {
        Self::with_tick(name.into(), avatar.into(), kind, now, Duration::from_secs(1))
    }

    fn with_tick(name: String, avatar: String, kind: CallKind, now: i64, tick: Duration) -> Self {
        let seconds = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&seconds);
        let handle = schedule_every(tick, move |ticks| {
            counter.store(ticks, Ordering::Release);
            true
        });
        info!(%name, ?kind, "call started");
        Self {
            name,
            avatar,
            kind,
            started_at: now,
            seconds,
            muted: false,
            speaker_on: false,
            front_camera: true,
            _counter: handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CallKind {
        self.kind
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.seconds.load(Ordering::Acquire)
    }

    /// Elapsed time as `m:ss`.
    pub fn duration_label(&self) -> String {
        format_duration(self.elapsed_secs())
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn is_speaker_on(&self) -> bool {
        self.speaker_on
    }

    pub fn toggle_speaker(&mut self) -> bool {
        self.speaker_on = !self.speaker_on;
        self.speaker_on
    }

    pub fn is_front_camera(&self) -> bool {
        self.front_camera
    }

    /// Switches between front and back camera. Voice calls have no camera.
    pub fn flip_camera(&mut self) -> bool {
        if self.kind == CallKind::Video {
            self.front_camera = !self.front_camera;
        }
        self.front_camera
    }

    /// Hangs up and returns the log entry for the call.
    pub fn end(self) -> CallLogEntry {
        info!(name = %self.name, secs = self.elapsed_secs(), "call ended");
        CallLogEntry {
            id: Uuid::new_v4().to_string(),
            name: self.name.clone(),
            avatar: self.avatar.clone(),
            direction: CallDirection::Outgoing,
            kind: self.kind,
            at: self.started_at,
        }
    }
}
