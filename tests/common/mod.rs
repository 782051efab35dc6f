#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use parking_lot::Mutex;
use std::sync::Arc;

use cuelink::error::{CuelinkError, Result};
use cuelink::playback::RenderTarget;
use cuelink::translate::SegmentTranslator;

mock! {
    pub Translator {}

    #[async_trait]
    impl SegmentTranslator for Translator {
        async fn translate_segment(&self, instructions: &str, text: &str) -> Result<String>;
        async fn check_availability(&self) -> Result<()>;
        fn name(&self) -> &'static str;
    }
}

pub const SCENARIO: &str =
    "WEBVTT\n\n00:00.000 --> 00:02.000\nHello\n\n00:02.000 --> 00:04.000\nWorld\n\n";

pub const FOUR_CUES: &str = "00:00.000 --> 00:02.000\nhello\n\n00:02.000 --> 00:04.000\nworld\n\n00:04.000 --> 00:06.000\nagain\n\n00:06.000 --> 00:08.000\nbye";

/// Mock with `name` stubbed, since every cycle logs it.
pub fn named_translator() -> MockTranslator {
    let mut translator = MockTranslator::new();
    translator.expect_name().return_const("mock");
    translator
}

/// Translates every segment by uppercasing it.
pub fn uppercase_translator() -> MockTranslator {
    let mut translator = named_translator();
    translator
        .expect_translate_segment()
        .returning(|_, text| Ok(text.to_uppercase()));
    translator
}

/// Fails every segment.
pub fn failing_translator() -> MockTranslator {
    let mut translator = named_translator();
    translator
        .expect_translate_segment()
        .returning(|_, _| Err(CuelinkError::Translation("service unavailable".to_string())));
    translator
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub frames: Vec<String>,
    pub torn_down: bool,
}

/// Render target that keeps every frame for later inspection.
pub struct RecordingOverlay(pub Arc<Mutex<Recorded>>);

pub fn recording_overlay() -> (Box<dyn RenderTarget>, Arc<Mutex<Recorded>>) {
    let recorded = Arc::new(Mutex::new(Recorded::default()));
    (Box::new(RecordingOverlay(recorded.clone())), recorded)
}

impl RenderTarget for RecordingOverlay {
    fn render(&mut self, text: &str) {
        self.0.lock().frames.push(text.to_string());
    }

    fn teardown(&mut self) {
        self.0.lock().torn_down = true;
    }
}
