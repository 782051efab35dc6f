use std::io::Write;
use tracing::warn;

use crate::playback::RenderTarget;

/// Caption overlay for a terminal: prints a line whenever the shown text changes.
pub struct TerminalOverlay<W: Write + Send> {
    out: W,
    shown: String,
    closed: bool,
}

impl TerminalOverlay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalOverlay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            shown: String::new(),
            closed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            warn!("Failed to write overlay: {}", e);
        }
    }
}

impl<W: Write + Send> RenderTarget for TerminalOverlay<W> {
    fn render(&mut self, text: &str) {
        if self.closed || text == self.shown {
            return;
        }

        self.shown = text.to_string();
        if text.is_empty() {
            self.write_line("");
        } else {
            self.write_line(&format!("▶ {}", text));
        }
    }

    fn teardown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.shown.clear();
        self.write_line("■ playback ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_prints_only_on_change() {
        let mut overlay = TerminalOverlay::new(Vec::new());

        overlay.render("Hello");
        overlay.render("Hello");
        overlay.render("");
        overlay.render("World");
        overlay.teardown();
        overlay.render("after end");

        let output = String::from_utf8(overlay.into_inner()).unwrap();
        assert_eq!(output, "▶ Hello\n\n▶ World\n■ playback ended\n");
    }
}
