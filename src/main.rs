//! Cuelink - Translated Caption Overlay Engine
//!
//! Command-line entry point: parse, segment, translate and play WebVTT-style
//! subtitle files.

use anyhow::Result;
use clap::Parser;
use tracing::{Level, info};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use cuelink::cli::{Args, Commands};
use cuelink::config::Config;
use cuelink::cue::{self, format_timestamp};
use cuelink::error::CuelinkError;
use cuelink::segment::segment;
use cuelink::workflow::Workflow;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose)?;

    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if std::path::Path::new("cuelink.toml").exists() {
                info!("Found cuelink.toml in current directory, loading...");
                Config::from_file("cuelink.toml")?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Parse { input, json } => {
            let raw = read_input(&input)?;
            let track = cue::parse(&raw);

            if json {
                println!("{}", serde_json::to_string_pretty(track.cues())?);
            } else {
                println!("{:<14} {:<14} {}", "Start", "End", "Text");
                println!("{}", "-".repeat(60));
                for cue in track.cues() {
                    println!(
                        "{:<14} {:<14} {}",
                        format_timestamp(cue.start),
                        format_timestamp(cue.end),
                        cue.text
                    );
                }
                println!("\n{} cues", track.len());
            }
        }
        Commands::Segment { input } => {
            let raw = read_input(&input)?;
            let body = cue::translation_body(&raw);
            let segments = segment(&body);
            let (first, second) = segments.char_counts();

            println!("Split strategy: {:?}", segments.strategy);
            println!("\n=== Segment 1 ({} chars) ===\n{}", first, segments.first);
            println!("\n=== Segment 2 ({} chars) ===\n{}", second, segments.second);
        }
        Commands::Translate { input, output, target_lang } => {
            if let Some(lang) = target_lang {
                config.translate.target_language = lang;
            }

            let workflow = Workflow::new(config);
            let track = workflow.translate_file(&input, &output).await?;
            println!("Translated {} cues into {}", track.len(), output.display());
        }
        Commands::Batch { input_dir, output_dir, target_lang } => {
            if let Some(lang) = target_lang {
                config.translate.target_language = lang;
            }

            let workflow = Workflow::new(config);
            let count = workflow.translate_directory(&input_dir, output_dir.as_ref()).await?;
            println!("Translated {} subtitle files", count);
        }
        Commands::Play { input, translate, rate } => {
            if let Some(rate) = rate {
                config.playback.playback_rate = rate;
                config.validate()?;
            }

            let workflow = Workflow::new(config);
            workflow.play(&input, translate).await?;
        }
        Commands::Check => {
            let workflow = Workflow::new(config.clone());
            workflow.check_provider().await?;
            println!(
                "Provider {:?} at {} is ready (model {})",
                config.translate.provider, config.translate.endpoint, config.translate.model
            );
        }
        Commands::InitConfig { path } => {
            config.save_to_file(&path)?;
            println!("Wrote configuration to {}", path.display());
        }
    }

    info!("Cuelink completed successfully");
    Ok(())
}

fn read_input(path: &std::path::Path) -> Result<String> {
    if !path.exists() {
        return Err(CuelinkError::FileNotFound(path.display().to_string()).into());
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = std::env::current_dir()?.join(".cuelink").join("log");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = rolling::daily(&log_dir, "cuelink.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    // Console output goes to stderr so stdout stays clean for captions and JSON
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("cuelink.log").display()
    );

    Ok(())
}
