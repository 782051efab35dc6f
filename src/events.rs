//! In-process publish/subscribe used to sequence pipeline stages.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cue::CueTrack;
use crate::error::Result;

type Handler<P> = Arc<dyn Fn(&P) -> Result<()> + Send + Sync>;

/// Synchronous topic-keyed event bus.
///
/// Handlers run in subscription order on the publishing thread. A handler
/// that errors or panics is logged and skipped; later handlers still run.
pub struct EventBus<T, P> {
    handlers: Mutex<HashMap<T, Vec<Handler<P>>>>,
}

impl<T, P> Default for EventBus<T, P>
where
    T: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, P> EventBus<T, P>
where
    T: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe<F>(&self, topic: T, handler: F)
    where
        F: Fn(&P) -> Result<()> + Send + Sync + 'static,
    {
        debug!("Subscribing handler to {:?}", topic);
        self.handlers
            .lock()
            .entry(topic)
            .or_default()
            .push(Arc::new(handler));
    }

    /// Delivers `payload` to every handler of `topic`; returns how many succeeded.
    ///
    /// The handler list is snapshotted before dispatch, so handlers may
    /// subscribe or publish without deadlocking.
    pub fn publish(&self, topic: T, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = match self.handlers.lock().get(&topic) {
            Some(handlers) => handlers.clone(),
            None => {
                debug!("No subscribers for {:?}", topic);
                return 0;
            }
        };

        let mut delivered = 0;
        for (index, handler) in handlers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(Ok(())) => delivered += 1,
                Ok(Err(e)) => warn!("Handler {} for {:?} failed: {}", index, topic, e),
                Err(_) => warn!("Handler {} for {:?} panicked", index, topic),
            }
        }
        delivered
    }

    pub fn subscriber_count(&self, topic: &T) -> usize {
        self.handlers.lock().get(topic).map_or(0, Vec::len)
    }
}

/// Pipeline stage signals, in the order a successful cycle emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SubtitleArrived,
    TranslationComplete,
    TranslationFailed,
    CuesReady,
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// Raw timed text delivered by the acquisition side
    SubtitleArrived { text: Arc<str> },
    /// Merged translation of both segments
    TranslationComplete { text: Arc<str> },
    /// Either segment failed; no blob is carried
    TranslationFailed { reason: String },
    /// A parsed track ready to be armed
    CuesReady { track: Arc<CueTrack> },
}

impl PipelineEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::SubtitleArrived { .. } => Topic::SubtitleArrived,
            Self::TranslationComplete { .. } => Topic::TranslationComplete,
            Self::TranslationFailed { .. } => Topic::TranslationFailed,
            Self::CuesReady { .. } => Topic::CuesReady,
        }
    }
}

pub type PipelineBus = EventBus<Topic, PipelineEvent>;

impl PipelineBus {
    /// Publishes an event on its own topic.
    pub fn emit(&self, event: PipelineEvent) -> usize {
        self.publish(event.topic(), &event)
    }
}
