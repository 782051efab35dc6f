//! Timed-text cue model and the permissive WebVTT-style parser.
//!
//! A block is a timestamp line (`MM:SS.mmm --> MM:SS.mmm`, optionally with an
//! hour field; without one the minutes field may be wider than two digits)
//! followed by text lines. Anything that does not parse as a
//! timestamp line is treated as text, so malformed input yields fewer cues
//! rather than an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Literal format marker that may open a timed-text blob.
pub const HEADER_TOKEN: &str = "WEBVTT";

/// Separator between blocks.
pub const BLOCK_DELIMITER: &str = "\n\n";

static TIMESTAMP_LINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((?:\d+:)?\d{2,}:\d{2}\.\d{3})\s+-->\s+((?:\d+:)?\d{2,}:\d{2}\.\d{3})(?:\s.*)?$").unwrap()
});

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(\d+):)?(\d{2,}):(\d{2})\.(\d{3})$").unwrap()
});

/// A single timed caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start offset in seconds from the start of the track
    pub start: f64,
    /// End offset in seconds from the start of the track
    pub end: f64,
    pub text: String,
}

impl Cue {
    /// Builds a cue, rejecting inverted ranges and blank text.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Option<Self> {
        let text = text.into().trim().to_string();
        if text.is_empty() || !(start <= end) {
            return None;
        }
        Some(Self { start, end, text })
    }

    /// Inclusive on both ends.
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Ordered cues in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CueTrack {
    cues: Vec<Cue>,
}

impl CueTrack {
    /// Keeps document order and drops cues with blank text or inverted ranges.
    pub fn from_cues(cues: Vec<Cue>) -> Self {
        let cues = cues
            .into_iter()
            .filter(|cue| !cue.text.trim().is_empty() && cue.start <= cue.end)
            .collect();
        Self { cues }
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// End time of the last-ending cue, or 0 for an empty track.
    pub fn duration(&self) -> f64 {
        self.cues.iter().map(|cue| cue.end).fold(0.0, f64::max)
    }

    /// First cue in track order whose range contains `time`.
    pub fn cue_at(&self, time: f64) -> Option<&Cue> {
        self.cues.iter().find(|cue| cue.contains(time))
    }

    /// True when both start and end times are non-decreasing in track order.
    pub fn is_time_ordered(&self) -> bool {
        self.cues
            .windows(2)
            .all(|pair| pair[0].start <= pair[1].start && pair[0].end <= pair[1].end)
    }

    /// Serializes back into timed-text form, header included.
    pub fn to_vtt(&self) -> String {
        let mut content = String::from(HEADER_TOKEN);
        content.push_str(BLOCK_DELIMITER);

        for cue in &self.cues {
            content.push_str(&format!(
                "{} --> {}\n{}\n\n",
                format_timestamp(cue.start),
                format_timestamp(cue.end),
                cue.text
            ));
        }

        content
    }
}

/// Removes a leading `WEBVTT` marker (and byte-order mark) if present.
pub fn strip_header(raw: &str) -> &str {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
    raw.strip_prefix(HEADER_TOKEN).unwrap_or(raw)
}

/// Text handed to the segmenter: `\r\n` normalized, header dropped, trimmed.
pub fn translation_body(raw: &str) -> String {
    let normalized = raw.replace("\r\n", "\n");
    strip_header(&normalized).trim().to_string()
}

/// Parses `MM:SS.mmm` or `H:MM:SS.mmm` into seconds.
pub fn parse_timestamp(value: &str) -> Option<f64> {
    let caps = TIMESTAMP_REGEX.captures(value.trim())?;

    let hours: u64 = match caps.get(1) {
        Some(h) => h.as_str().parse().ok()?,
        None => 0,
    };
    let minutes: u64 = caps[2].parse().ok()?;
    let seconds: u64 = caps[3].parse().ok()?;
    let millis: u64 = caps[4].parse().ok()?;

    if seconds >= 60 || (caps.get(1).is_some() && minutes >= 60) {
        return None;
    }

    let total_ms = hours
        .checked_mul(60)?
        .checked_add(minutes)?
        .checked_mul(60)?
        .checked_add(seconds)?
        .checked_mul(1000)?
        .checked_add(millis)?;

    Some(total_ms as f64 / 1000.0)
}

/// Formats seconds as `HH:MM:SS.mmm`.
pub fn format_timestamp(seconds: f64) -> String {
    let total_milliseconds = (seconds * 1000.0).round().max(0.0) as u64;
    let hours = total_milliseconds / 3_600_000;
    let minutes = (total_milliseconds % 3_600_000) / 60_000;
    let secs = (total_milliseconds % 60_000) / 1_000;
    let millis = total_milliseconds % 1_000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, secs, millis)
}

/// Returns `(start, end)` when `line` is a well-formed timestamp line.
pub fn parse_timestamp_line(line: &str) -> Option<(f64, f64)> {
    timestamp_bounds(line).filter(|(start, end)| start <= end)
}

/// Bounds of a timestamp line, without checking their order.
fn timestamp_bounds(line: &str) -> Option<(f64, f64)> {
    let caps = TIMESTAMP_LINE_REGEX.captures(line.trim())?;
    Some((parse_timestamp(&caps[1])?, parse_timestamp(&caps[2])?))
}

/// True when the first line of `block` is a timestamp line.
pub fn starts_with_timestamp(block: &str) -> bool {
    block
        .trim_start_matches(['\r', '\n'])
        .lines()
        .next()
        .is_some_and(|line| timestamp_bounds(line).is_some())
}

struct PendingCue {
    start: f64,
    end: f64,
    text: String,
}

impl PendingCue {
    fn finish(self) -> Option<Cue> {
        Cue::new(self.start, self.end, self.text)
    }
}

/// Parses raw timed text into a track. Never fails.
pub fn parse(raw: &str) -> CueTrack {
    let body = strip_header(raw);
    let mut cues = Vec::new();
    let mut current: Option<PendingCue> = None;
    let mut dropped = 0usize;

    for line in body.lines() {
        let line = line.trim();

        // Inverted ranges still open a cue so their text is dropped with it.
        if let Some((start, end)) = timestamp_bounds(line) {
            if let Some(pending) = current.take() {
                match pending.finish() {
                    Some(cue) => cues.push(cue),
                    None => dropped += 1,
                }
            }
            current = Some(PendingCue { start, end, text: String::new() });
        } else if !line.is_empty() {
            if let Some(pending) = current.as_mut() {
                if !pending.text.is_empty() {
                    pending.text.push(' ');
                }
                pending.text.push_str(line);
            }
        }
    }

    if let Some(pending) = current {
        match pending.finish() {
            Some(cue) => cues.push(cue),
            None => dropped += 1,
        }
    }

    debug!("Parsed {} cues ({} empty cues dropped)", cues.len(), dropped);
    CueTrack { cues }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT\n\n00:00.000 --> 00:02.000\nHello\n\n00:02.000 --> 00:04.000\nWorld\n\n";

    #[test]
    fn test_parse_sample_track() {
        let track = parse(SAMPLE);
        assert_eq!(
            track.cues(),
            &[
                Cue { start: 0.0, end: 2.0, text: "Hello".to_string() },
                Cue { start: 2.0, end: 4.0, text: "World".to_string() },
            ]
        );
    }

    #[test]
    fn test_parse_joins_multiline_text_with_spaces() {
        let track = parse("00:01.000 --> 00:03.500\nfirst line\n  second line  \n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].text, "first line second line");
        assert_eq!(track.cues()[0].end, 3.5);
    }

    #[test]
    fn test_parse_drops_cues_without_text() {
        let track = parse("00:00.000 --> 00:01.000\n\n00:01.000 --> 00:02.000\nkept\n\n00:02.000 --> 00:03.000\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].text, "kept");
    }

    #[test]
    fn test_parse_treats_malformed_timestamp_as_text() {
        let track = parse("00:00.000 --> 00:01.000\nok\n0:0.0 --> 1:1.1\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].text, "ok 0:0.0 --> 1:1.1");
    }

    #[test]
    fn test_parse_ignores_text_before_first_timestamp() {
        let track = parse("WEBVTT - Lecture 1\nKind: captions\n\n00:05.000 --> 00:06.000\nhi\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].start, 5.0);
    }

    #[test]
    fn test_parse_accepts_hour_qualified_timestamps_and_settings() {
        let track = parse("01:00:01.250 --> 01:00:02.000 align:start position:10%\r\nhour cue\r\n");
        assert_eq!(track.len(), 1);
        assert_eq!(track.cues()[0].start, 3601.25);
        assert_eq!(track.cues()[0].text, "hour cue");
    }

    #[test]
    fn test_parse_rejects_inverted_range() {
        let track = parse("00:05.000 --> 00:01.000\nbackwards\n");
        assert!(track.is_empty());

        let track = parse("00:00.000 --> 00:01.000\nfine\n\n00:05.000 --> 00:02.000\nbackwards\n\n00:06.000 --> 00:07.000\nlater");
        let texts: Vec<&str> = track.cues().iter().map(|cue| cue.text.as_str()).collect();
        assert_eq!(texts, vec!["fine", "later"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("WEBVTT").is_empty());
    }

    #[test]
    fn test_parse_of_serialized_track_is_identical() {
        let track = parse("WEBVTT\n\n00:00.100 --> 00:01.900\nline one\nline two\n\n61:00.500 --> 61:02.000\nlong\n");
        let reparsed = parse(&track.to_vtt());
        assert_eq!(reparsed, track);
    }

    #[test]
    fn test_parse_timestamp_forms() {
        assert_eq!(parse_timestamp("00:02.000"), Some(2.0));
        assert_eq!(parse_timestamp("01:05.123"), Some(65.123));
        assert_eq!(parse_timestamp("1:01:01.500"), Some(3661.5));
        assert_eq!(parse_timestamp("00:60.000"), None);
        assert_eq!(parse_timestamp("1:60:00.000"), None);
        assert_eq!(parse_timestamp("garbage"), None);
    }

    #[test]
    fn test_parse_timestamp_line_requires_ordered_bounds() {
        assert_eq!(
            parse_timestamp_line("00:01.000 --> 00:02.500 align:start"),
            Some((1.0, 2.5))
        );
        assert_eq!(parse_timestamp_line("00:03.000 --> 00:02.000"), None);
        assert_eq!(parse_timestamp_line("00:01.000 -> 00:02.000"), None);
        assert!(starts_with_timestamp("00:03.000 --> 00:02.000\ntext"));
    }

    #[test]
    fn test_wide_minutes_field_encodes_hours() {
        assert_eq!(parse_timestamp("120:00.000"), Some(7200.0));
        assert_eq!(parse_timestamp("1:75:00.000"), None);

        let track = parse("120:00.000 --> 120:02.000\nx");
        assert_eq!(track.len(), 1);
        assert_eq!((track.cues()[0].start, track.cues()[0].end), (7200.0, 7202.0));
    }

    #[test]
    fn test_translation_body_normalizes_crlf() {
        let body = translation_body("WEBVTT\r\n\r\n00:00.000 --> 00:01.000\r\nhi\r\n\r\n");
        assert_eq!(body, "00:00.000 --> 00:01.000\nhi");
        assert_eq!(translation_body("WEBVTT\n\n   \n"), "");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00.000");
        assert_eq!(format_timestamp(65.123), "00:01:05.123");
        assert_eq!(format_timestamp(3661.5), "01:01:01.500");
    }

    #[test]
    fn test_strip_header() {
        assert_eq!(strip_header("WEBVTT\n\nbody"), "\n\nbody");
        assert_eq!(strip_header("\u{feff}WEBVTT"), "");
        assert_eq!(strip_header("no header"), "no header");
    }

    #[test]
    fn test_is_time_ordered() {
        assert!(parse(SAMPLE).is_time_ordered());
        let overlapping = CueTrack::from_cues(vec![
            Cue { start: 0.0, end: 10.0, text: "long".to_string() },
            Cue { start: 1.0, end: 2.0, text: "short".to_string() },
        ]);
        assert!(!overlapping.is_time_ordered());
    }

    #[test]
    fn test_from_cues_filters_blank_text() {
        let track = CueTrack::from_cues(vec![
            Cue { start: 0.0, end: 1.0, text: "   ".to_string() },
            Cue { start: 1.0, end: 2.0, text: "x".to_string() },
        ]);
        assert_eq!(track.len(), 1);
    }
}
