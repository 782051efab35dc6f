use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::clock::SimulatedClock;
use crate::config::Config;
use crate::cue::{CueTrack, parse, translation_body};
use crate::error::{CuelinkError, Result};
use crate::overlay::TerminalOverlay;
use crate::pipeline::Pipeline;
use crate::playback::PlaybackSynchronizer;
use crate::translate::{SegmentTranslator, TranslationCoordinator, TranslatorFactory};

pub struct Workflow {
    config: Config,
    translator: Option<Arc<dyn SegmentTranslator>>,
}

impl Workflow {
    /// The translator is created from the config on first use.
    pub fn new(config: Config) -> Self {
        Self { config, translator: None }
    }

    pub fn with_translator(config: Config, translator: Arc<dyn SegmentTranslator>) -> Self {
        Self {
            config,
            translator: Some(translator),
        }
    }

    fn translator(&self) -> Result<Arc<dyn SegmentTranslator>> {
        match &self.translator {
            Some(translator) => Ok(translator.clone()),
            None => TranslatorFactory::create_translator(self.config.translate.clone()),
        }
    }

    pub async fn check_provider(&self) -> Result<()> {
        self.translator()?.check_availability().await
    }

    /// Translate one subtitle file and write it as WebVTT.
    pub async fn translate_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<CueTrack> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Translating subtitles: {}", input_path.display());

        let raw = read_subtitle(input_path).await?;
        let body = translation_body(&raw);
        if body.is_empty() {
            return Err(CuelinkError::EmptySubtitle(input_path.display().to_string()));
        }

        let translator = self.translator()?;
        let coordinator = TranslationCoordinator::new(translator, &self.config.translate);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("Translating {}", input_path.display()));
        spinner.enable_steady_tick(Duration::from_millis(120));

        let result = coordinator.translate(&body).await;
        spinner.finish_and_clear();

        let track = parse(&result?);

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(output_path, track.to_vtt()).await?;

        info!("Wrote {} cues to {}", track.len(), output_path.display());
        Ok(track)
    }

    /// Translate every `.vtt` file under `input_dir`. Returns how many succeeded.
    pub async fn translate_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<Q>,
    ) -> Result<usize> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(CuelinkError::Config("Input path is not a directory".to_string()));
        }

        let output_dir = match output_dir {
            Some(dir) => dir.as_ref().to_path_buf(),
            None => input_dir.to_path_buf(),
        };
        fs::create_dir_all(&output_dir).await?;

        let language = &self.config.translate.target_language;
        let mut subtitle_files = Vec::new();

        for entry in WalkDir::new(input_dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            let is_vtt = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("vtt"));
            if is_vtt && !is_translation_output(path, language) {
                subtitle_files.push(path.to_path_buf());
            }
        }

        info!("Found {} subtitle files to translate", subtitle_files.len());

        let mut translated = 0;
        for subtitle_path in subtitle_files {
            let output_path = output_dir.join(translated_file_name(&subtitle_path, language));
            match self.translate_file(&subtitle_path, &output_path).await {
                Ok(_) => {
                    info!("Successfully translated: {}", subtitle_path.display());
                    translated += 1;
                }
                Err(e) => warn!("Failed to translate {}: {}", subtitle_path.display(), e),
            }
        }

        Ok(translated)
    }

    /// Play a subtitle file against the simulated clock, optionally
    /// translating it in the background.
    pub async fn play<P: AsRef<Path>>(&self, input_path: P, translate: bool) -> Result<()> {
        let input_path = input_path.as_ref();
        let raw = read_subtitle(input_path).await?;

        let source = parse(&raw);
        if source.is_empty() {
            return Err(CuelinkError::EmptySubtitle(input_path.display().to_string()));
        }
        info!(
            "Playing {} cues ({:.1}s) from {}",
            source.len(),
            source.duration(),
            input_path.display()
        );
        let duration = source.duration();
        let overlay = Box::new(TerminalOverlay::stdout());

        let (synchronizer, translation) = if translate {
            let pipeline = Arc::new(Pipeline::new(self.translator()?, &self.config.translate, overlay));
            pipeline.load_source(&raw);
            let synchronizer = pipeline.synchronizer().clone();
            let handle = tokio::spawn(async move { pipeline.ingest(&raw).await });
            (synchronizer, Some(handle))
        } else {
            let mut synchronizer = PlaybackSynchronizer::new(overlay);
            synchronizer.arm(Arc::new(source));
            (Arc::new(Mutex::new(synchronizer)), None)
        };

        let (tx, rx) = mpsc::channel(16);
        let clock = SimulatedClock::from_config(&self.config.playback);
        let driver = tokio::spawn(PlaybackSynchronizer::drive(synchronizer, rx));
        clock.run(duration, tx).await;

        if driver.await.is_err() {
            warn!("Playback driver stopped unexpectedly");
        }

        if let Some(handle) = translation {
            match handle.await {
                Ok(Ok(_)) => info!("Translated track was armed during playback"),
                Ok(Err(e)) => warn!("Translation did not complete: {}", e),
                Err(e) => warn!("Translation task failed: {}", e),
            }
        }

        Ok(())
    }
}

async fn read_subtitle(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CuelinkError::FileNotFound(path.display().to_string()));
    }
    Ok(fs::read_to_string(path).await?)
}

/// `lecture.vtt` -> `lecture.vi.vtt`
pub fn translated_file_name(path: &Path, language: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "subtitles".to_string());
    PathBuf::from(format!("{}.{}.vtt", stem, language))
}

fn is_translation_output(path: &Path, language: &str) -> bool {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().ends_with(&format!(".{}", language)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translated_file_name() {
        assert_eq!(
            translated_file_name(Path::new("/tmp/lecture 01.vtt"), "vi"),
            PathBuf::from("lecture 01.vi.vtt")
        );
    }

    #[test]
    fn test_is_translation_output() {
        assert!(is_translation_output(Path::new("a/lecture.vi.vtt"), "vi"));
        assert!(!is_translation_output(Path::new("a/lecture.vtt"), "vi"));
        assert!(!is_translation_output(Path::new("a/movie.vtt"), "vi"));
    }
}
