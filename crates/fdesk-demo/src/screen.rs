//! Plain-text frame output and the virtual clock scripts run on.

use std::io::{self, Write};

use fdesk_render::frame::Frame;
use web_time::{Duration, Instant};

/// Monotonic clock advanced only by the script, so debounce windows elapse
/// without sleeping.
#[derive(Debug, Clone, Copy)]
pub struct VirtualClock {
    now: Instant,
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualClock {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
        }
    }

    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn advance(&mut self, ms: u64) -> Instant {
        self.now += Duration::from_millis(ms);
        self.now
    }
}

/// Print `frame` under a heading, one buffer row per line.
pub fn write_frame(out: &mut dyn Write, title: &str, frame: &Frame) -> io::Result<()> {
    let rule = "─".repeat(usize::from(frame.width()).saturating_sub(title.len() + 4));
    writeln!(out, "── {title} {rule}")?;
    for line in frame.buffer.to_lines() {
        writeln!(out, "{line}")?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fdesk_render::cell::Style;

    #[test]
    fn clock_only_moves_when_told() {
        let mut clock = VirtualClock::new();
        let start = clock.now();
        assert_eq!(clock.advance(300) - start, Duration::from_millis(300));
        assert_eq!(clock.now() - start, Duration::from_millis(300));
    }

    #[test]
    fn frame_is_written_with_heading() {
        let mut frame = Frame::new(12, 2);
        frame.buffer.set_string(0, 1, "Airways", Style::new(), 12);
        let mut out = Vec::new();
        write_frame(&mut out, "modes", &frame).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "── modes ───");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "Airways");
    }
}
