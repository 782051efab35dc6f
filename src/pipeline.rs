//! Stage wiring: subtitle arrival, translation, parsing, arming.
//!
//! ```text
//! SubtitleArrived -> (coordinator) -> TranslationComplete -> parse -> CuesReady -> arm
//!                                  \-> TranslationFailed (previous track stays armed)
//! ```

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::TranslateConfig;
use crate::cue::{CueTrack, parse, translation_body};
use crate::error::{CuelinkError, Result};
use crate::events::{PipelineBus, PipelineEvent, Topic};
use crate::playback::{PlaybackSynchronizer, RenderTarget};
use crate::translate::{SegmentTranslator, TranslationCoordinator};

pub struct Pipeline {
    bus: Arc<PipelineBus>,
    coordinator: TranslationCoordinator,
    synchronizer: Arc<Mutex<PlaybackSynchronizer>>,
}

impl Pipeline {
    pub fn new(
        translator: Arc<dyn SegmentTranslator>,
        config: &TranslateConfig,
        render: Box<dyn RenderTarget>,
    ) -> Self {
        let bus = Arc::new(PipelineBus::new());
        let synchronizer = Arc::new(Mutex::new(PlaybackSynchronizer::new(render)));

        let downstream = Arc::downgrade(&bus);
        bus.subscribe(Topic::TranslationComplete, move |event: &PipelineEvent| {
            let PipelineEvent::TranslationComplete { text } = event else {
                return Ok(());
            };

            let track = parse(text);
            if track.is_empty() {
                return Err(CuelinkError::Handler(
                    "translated text contains no cues; keeping the current track".to_string(),
                ));
            }

            info!("Parsed {} translated cues", track.len());
            if let Some(bus) = downstream.upgrade() {
                bus.emit(PipelineEvent::CuesReady { track: Arc::new(track) });
            }
            Ok(())
        });

        let armed = synchronizer.clone();
        bus.subscribe(Topic::CuesReady, move |event: &PipelineEvent| {
            if let PipelineEvent::CuesReady { track } = event {
                armed.lock().arm(track.clone());
            }
            Ok(())
        });

        bus.subscribe(Topic::TranslationFailed, |event: &PipelineEvent| {
            if let PipelineEvent::TranslationFailed { reason } = event {
                warn!("Keeping the current track after failed translation: {}", reason);
            }
            Ok(())
        });

        let coordinator = TranslationCoordinator::new(translator, config).with_bus(bus.clone());

        Self {
            bus,
            coordinator,
            synchronizer,
        }
    }

    pub fn bus(&self) -> &Arc<PipelineBus> {
        &self.bus
    }

    pub fn synchronizer(&self) -> &Arc<Mutex<PlaybackSynchronizer>> {
        &self.synchronizer
    }

    pub fn coordinator(&self) -> &TranslationCoordinator {
        &self.coordinator
    }

    /// Arm the untranslated track so captions show while translation runs.
    pub fn load_source(&self, raw: &str) -> Arc<CueTrack> {
        let track = Arc::new(parse(raw));
        self.bus.emit(PipelineEvent::CuesReady { track: track.clone() });
        track
    }

    /// Run one translation cycle for `raw` and return the merged translation.
    ///
    /// On success the translated track is armed through the bus. On failure,
    /// including a reply that parses to no cues, nothing is armed and the
    /// error is returned.
    pub async fn ingest(&self, raw: &str) -> Result<String> {
        self.bus.emit(PipelineEvent::SubtitleArrived { text: Arc::from(raw) });

        let body = translation_body(raw);
        if body.is_empty() {
            let error = CuelinkError::EmptySubtitle("incoming subtitle text".to_string());
            self.bus.emit(PipelineEvent::TranslationFailed { reason: error.to_string() });
            return Err(error);
        }

        self.coordinator.translate(&body).await
    }
}
