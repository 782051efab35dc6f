use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::config::PlaybackConfig;
use crate::playback::PlaybackSignal;

/// Stand-in playback-time source: advances media time on a fixed tick.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    tick: Duration,
    rate: f64,
    start_at: f64,
}

impl SimulatedClock {
    pub fn new(tick: Duration, rate: f64) -> Self {
        Self { tick, rate, start_at: 0.0 }
    }

    pub fn from_config(config: &PlaybackConfig) -> Self {
        Self::new(Duration::from_millis(config.tick_interval_ms), config.playback_rate)
    }

    pub fn starting_at(mut self, seconds: f64) -> Self {
        self.start_at = seconds.max(0.0);
        self
    }

    /// Emit time updates until `until` seconds, then `Ended`.
    ///
    /// Stops early if the receiver is dropped.
    pub async fn run(self, until: f64, signals: mpsc::Sender<PlaybackSignal>) {
        let step = self.tick.as_secs_f64() * self.rate;
        let mut ticker = interval(self.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut media_time = self.start_at.min(until);
        loop {
            ticker.tick().await;
            if signals.send(PlaybackSignal::TimeUpdate(media_time)).await.is_err() {
                debug!("Playback receiver dropped at {:.3}s", media_time);
                return;
            }
            if media_time >= until {
                break;
            }
            media_time = (media_time + step).min(until);
        }

        let _ = signals.send(PlaybackSignal::Ended).await;
    }
}
