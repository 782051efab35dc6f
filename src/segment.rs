//! Two-way, block-aligned partition of raw timed text.

use tracing::debug;

use crate::cue::{BLOCK_DELIMITER, starts_with_timestamp};

/// How the split index was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// First timestamp block at or past half the character count
    Balanced,
    /// No aligned block found; split at half the block count
    MidpointFallback,
}

/// The two halves of a raw blob. Both borrow from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segments<'a> {
    pub first: &'a str,
    pub second: &'a str,
    /// Whether a block delimiter sits between the halves in the input
    pub delimited: bool,
    pub strategy: SplitStrategy,
}

impl Segments<'_> {
    /// Reconstructs the input exactly.
    pub fn rejoin(&self) -> String {
        join_halves(self.first, self.second, self.delimited)
    }

    /// Character counts of both halves.
    pub fn char_counts(&self) -> (usize, usize) {
        (self.first.chars().count(), self.second.chars().count())
    }
}

/// Joins two halves the same way [`segment`] split them.
pub fn join_halves(first: &str, second: &str, delimited: bool) -> String {
    let mut joined = String::with_capacity(first.len() + second.len() + BLOCK_DELIMITER.len());
    joined.push_str(first);
    if delimited {
        joined.push_str(BLOCK_DELIMITER);
    }
    joined.push_str(second);
    joined
}

/// Splits `raw` into two contiguous halves on a block boundary.
///
/// The split block is the first one whose cumulative character count (with
/// delimiters) reaches half the input and which opens with a timestamp line.
/// A split at the very first block counts as not found. Without an aligned
/// block the split falls back to half the block count.
pub fn segment(raw: &str) -> Segments<'_> {
    let blocks: Vec<&str> = raw.split(BLOCK_DELIMITER).collect();
    let delimiter_chars = BLOCK_DELIMITER.chars().count();
    let target = raw.chars().count().div_ceil(2);

    let mut running = 0usize;
    let mut split_index = 0usize;

    for (index, block) in blocks.iter().enumerate() {
        running += block.chars().count() + delimiter_chars;
        if running >= target && starts_with_timestamp(block) {
            split_index = index;
            break;
        }
    }

    let strategy = if split_index == 0 {
        split_index = blocks.len() / 2;
        debug!(
            "No aligned split block found in {} blocks, falling back to block {}",
            blocks.len(),
            split_index
        );
        SplitStrategy::MidpointFallback
    } else {
        SplitStrategy::Balanced
    };

    if split_index == 0 {
        return Segments {
            first: "",
            second: raw,
            delimited: false,
            strategy,
        };
    }

    // Byte offset where the delimiter before `split_index` starts.
    let offset = blocks[..split_index].iter().map(|block| block.len()).sum::<usize>()
        + BLOCK_DELIMITER.len() * (split_index - 1);

    Segments {
        first: &raw[..offset],
        second: &raw[offset + BLOCK_DELIMITER.len()..],
        delimited: true,
        strategy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue_block(index: usize, text: &str) -> String {
        format!("00:{:02}.000 --> 00:{:02}.000\n{}", index, index + 1, text)
    }

    fn track(texts: &[&str]) -> String {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| cue_block(i, text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn test_segment_splits_evenly_sized_blocks_in_the_middle() {
        let raw = track(&["one", "two", "three", "four"]);
        let segments = segment(&raw);

        assert_eq!(segments.strategy, SplitStrategy::Balanced);
        assert_eq!(segments.first, track(&["one", "two"]));
        assert!(segments.second.starts_with("00:02.000 --> 00:03.000\nthree"));
        assert_eq!(segments.rejoin(), raw);
    }

    #[test]
    fn test_segment_halves_never_cut_inside_a_block() {
        let raw = track(&["a", "a much longer line of caption text here", "b", "c", "d"]);
        let segments = segment(&raw);

        assert!(starts_with_timestamp(segments.second));
        assert!(starts_with_timestamp(segments.first));
        assert_eq!(segments.rejoin(), raw);
    }

    #[test]
    fn test_segment_falls_back_to_block_midpoint_without_timestamps() {
        let raw = "alpha\n\nbeta\n\ngamma\n\ndelta";
        let segments = segment(raw);

        assert_eq!(segments.strategy, SplitStrategy::MidpointFallback);
        assert_eq!(segments.first, "alpha\n\nbeta");
        assert_eq!(segments.second, "gamma\n\ndelta");
        assert_eq!(segments.rejoin(), raw);
    }

    #[test]
    fn test_segment_fallback_when_first_block_dominates() {
        let long = "x".repeat(500);
        let raw = track(&[long.as_str(), "short", "tiny"]);
        let segments = segment(&raw);

        assert_eq!(segments.strategy, SplitStrategy::MidpointFallback);
        assert!(segments.first.ends_with(&long));
        assert!(starts_with_timestamp(segments.second));
        assert_eq!(segments.rejoin(), raw);
    }

    #[test]
    fn test_segment_single_block_goes_entirely_to_second_half() {
        let raw = cue_block(0, "only");
        let segments = segment(&raw);

        assert_eq!(segments.first, "");
        assert_eq!(segments.second, raw);
        assert!(!segments.delimited);
        assert_eq!(segments.rejoin(), raw);
    }

    #[test]
    fn test_segment_empty_input() {
        let segments = segment("");
        assert_eq!(segments.first, "");
        assert_eq!(segments.second, "");
        assert_eq!(segments.rejoin(), "");
    }

    #[test]
    fn test_segment_keeps_trailing_delimiters_and_leading_blank_blocks() {
        for raw in [
            format!("{}\n\n", track(&["one", "two", "three"])),
            format!("\n\n{}", track(&["one", "two"])),
            format!("{}\n\n\n", track(&["x", "y", "z", "w"])),
        ] {
            assert_eq!(segment(&raw).rejoin(), raw);
        }
    }

    #[test]
    fn test_segment_counts_characters_not_bytes() {
        let raw = track(&["xin chào các bạn", "cảm ơn", "tạm biệt", "hẹn gặp lại"]);
        let segments = segment(&raw);
        assert_eq!(segments.rejoin(), raw);
        let (first, second) = segments.char_counts();
        assert!(first > 0 && second > 0);
    }
}
