//! Keeps a caption overlay in step with the media playback position.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cue::{Cue, CueTrack};

/// Signals emitted by the playback-time source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackSignal {
    /// Current media time in seconds
    TimeUpdate(f64),
    /// Playback finished; terminal
    Ended,
}

/// Where the active cue text is displayed.
pub trait RenderTarget: Send {
    /// Show `text`; an empty string clears the overlay.
    fn render(&mut self, text: &str);

    /// Remove the overlay for good.
    fn teardown(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unarmed,
    Armed,
    Detached,
}

/// Time-indexed lookup over one track.
///
/// For tracks whose starts and ends are both non-decreasing, the cursor sits
/// on the first cue ending at or after the last queried time and only moves
/// forward while time does; a backward seek re-searches from scratch. Other
/// tracks use a linear first-match scan.
#[derive(Debug, Clone)]
pub struct CueCursor {
    track: Arc<CueTrack>,
    time_ordered: bool,
    position: usize,
    last_time: f64,
}

impl CueCursor {
    pub fn new(track: Arc<CueTrack>) -> Self {
        let time_ordered = track.is_time_ordered();
        Self {
            track,
            time_ordered,
            position: 0,
            last_time: f64::NEG_INFINITY,
        }
    }

    pub fn track(&self) -> &Arc<CueTrack> {
        &self.track
    }

    /// Index of the first cue in track order containing `time`.
    pub fn index_at(&mut self, time: f64) -> Option<usize> {
        let cues = self.track.cues();
        if !self.time_ordered {
            return cues.iter().position(|cue| cue.contains(time));
        }

        if time >= self.last_time {
            while self.position < cues.len() && cues[self.position].end < time {
                self.position += 1;
            }
        } else {
            self.position = cues.partition_point(|cue| cue.end < time);
        }
        self.last_time = time;

        cues.get(self.position)
            .filter(|cue| cue.start <= time)
            .map(|_| self.position)
    }

    pub fn cue_at(&mut self, time: f64) -> Option<&Cue> {
        let index = self.index_at(time)?;
        self.track.cues().get(index)
    }
}

/// Drives a render target from time updates.
///
/// Unarmed -> Armed on the first [`arm`](Self::arm); re-arming swaps the
/// track in place. `Ended` detaches for good.
pub struct PlaybackSynchronizer {
    render: Box<dyn RenderTarget>,
    cursor: Option<CueCursor>,
    state: SyncState,
}

impl PlaybackSynchronizer {
    pub fn new(render: Box<dyn RenderTarget>) -> Self {
        Self {
            render,
            cursor: None,
            state: SyncState::Unarmed,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn track(&self) -> Option<&Arc<CueTrack>> {
        self.cursor.as_ref().map(CueCursor::track)
    }

    /// Load `track`, replacing any previous one. Returns false once detached.
    pub fn arm(&mut self, track: Arc<CueTrack>) -> bool {
        if self.state == SyncState::Detached {
            warn!("Ignoring track of {} cues: synchronizer is detached", track.len());
            return false;
        }

        info!("Armed with {} cues", track.len());
        self.cursor = Some(CueCursor::new(track));
        self.state = SyncState::Armed;
        true
    }

    /// Active cue at `time`, or `None` in gaps and before arming.
    pub fn active_cue_at(&mut self, time: f64) -> Option<&Cue> {
        self.cursor.as_mut()?.cue_at(time)
    }

    pub fn on_time_update(&mut self, time: f64) {
        if self.state != SyncState::Armed {
            return;
        }

        let text = self
            .active_cue_at(time)
            .map(|cue| cue.text.clone())
            .unwrap_or_default();
        self.render.render(&text);
    }

    pub fn on_ended(&mut self) {
        if self.state == SyncState::Detached {
            return;
        }

        debug!("Playback ended, tearing down overlay");
        self.render.teardown();
        self.cursor = None;
        self.state = SyncState::Detached;
    }

    pub fn handle(&mut self, signal: PlaybackSignal) {
        match signal {
            PlaybackSignal::TimeUpdate(time) => self.on_time_update(time),
            PlaybackSignal::Ended => self.on_ended(),
        }
    }

    /// Consume signals until `Ended` or until the source goes away.
    ///
    /// The lock is taken per signal so the track can be re-armed concurrently.
    pub async fn drive(sync: Arc<Mutex<Self>>, mut signals: mpsc::Receiver<PlaybackSignal>) {
        while let Some(signal) = signals.recv().await {
            let detached = {
                let mut guard = sync.lock();
                guard.handle(signal);
                guard.state() == SyncState::Detached
            };
            if detached {
                return;
            }
        }

        debug!("Playback source closed");
        sync.lock().on_ended();
    }
}
