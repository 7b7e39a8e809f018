//! AT command/response channel.
//!
//! Wraps a [`SerialPort`] with the line-oriented discipline the modem
//! speaks: commands go out with a `\r\n` terminator, responses come back as
//! newline-delimited lines that are matched against exact/prefix/suffix
//! patterns under a deadline.
//!
//! Every wait is a bounded busy-poll on the calling thread — the control
//! model is single-threaded and cooperative, so nothing else progresses
//! during a wait and the worst case for one request is the sum of the step
//! deadlines.
//!
//! The poll loop re-reads the channel on every iteration until match or
//! deadline; there is deliberately no pre-loop read whose result could go
//! stale.

use log::{debug, trace};

use crate::app::ports::{Clock, SerialPort};
use crate::error::{Error, Result};

/// Longest response line the modem is expected to produce.
pub const LINE_MAX: usize = 128;

// ───────────────────────────────────────────────────────────────
// Match predicate
// ───────────────────────────────────────────────────────────────

/// How an expected response line is recognised.
#[derive(Debug, Clone, Copy)]
pub enum Match<'a> {
    /// The whole trimmed line equals the target.
    Exact(&'a str),
    /// The trimmed line starts with the target.
    Prefix(&'a str),
    /// The trimmed line ends with the target.
    Suffix(&'a str),
}

impl Match<'_> {
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::Exact(target) => line == *target,
            Self::Prefix(target) => line.starts_with(target),
            Self::Suffix(target) => line.ends_with(target),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// AtChannel
// ───────────────────────────────────────────────────────────────

/// Line-oriented command channel over a serial port.
pub struct AtChannel<S: SerialPort, C: Clock> {
    serial: S,
    clock: C,
    line_buf: heapless::Vec<u8, LINE_MAX>,
}

impl<S: SerialPort, C: Clock> AtChannel<S, C> {
    pub fn new(serial: S, clock: C) -> Self {
        Self {
            serial,
            clock,
            line_buf: heapless::Vec::new(),
        }
    }

    /// Write an AT command followed by the line terminator.
    pub fn send(&mut self, command: &str) -> Result<()> {
        debug!("AT> {command}");
        self.serial
            .write(command.as_bytes())
            .map_err(|_| Error::Serial("command write"))?;
        self.serial
            .write(b"\r\n")
            .map_err(|_| Error::Serial("terminator write"))
    }

    /// Write raw bytes (request payloads, certificate blobs, control bytes).
    pub fn write_raw(&mut self, data: &[u8]) -> Result<()> {
        self.serial
            .write(data)
            .map_err(|_| Error::Serial("raw write"))
    }

    /// Poll for lines until one satisfies `pattern` or `timeout_ms` elapses.
    ///
    /// Returns `true` on the first match. The caller — not this method —
    /// records the retry-counter bump on `false`; a line that arrives after
    /// the deadline is never reported as a match.
    pub fn wait_for(&mut self, pattern: Match<'_>, timeout_ms: u64) -> bool {
        let deadline = self.clock.now_ms().saturating_add(timeout_ms);
        while self.clock.now_ms() < deadline {
            if let Some(line) = self.poll_line() {
                trace!("AT< {line}");
                if pattern.matches(&line) {
                    return true;
                }
            }
        }
        false
    }

    /// Accumulate every byte that arrives during a fixed window.
    ///
    /// Time-bounded collection, not completion detection: the window runs to
    /// its end whether or not a complete response has arrived. Bytes beyond
    /// the buffer's capacity are dropped.
    pub fn collect_for<const N: usize>(
        &mut self,
        window_ms: u64,
        buf: &mut heapless::Vec<u8, N>,
    ) -> usize {
        let deadline = self.clock.now_ms().saturating_add(window_ms);
        let mut collected = 0;
        while self.clock.now_ms() < deadline {
            if let Ok(Some(byte)) = self.serial.read_byte() {
                if buf.push(byte).is_ok() {
                    collected += 1;
                }
            }
        }
        collected
    }

    /// Busy-wait for `ms` milliseconds (settle delays the modem needs
    /// between a prompt and the following payload).
    pub fn pause(&mut self, ms: u64) {
        let deadline = self.clock.now_ms().saturating_add(ms);
        while self.clock.now_ms() < deadline {
            core::hint::spin_loop();
        }
    }

    /// Drain available bytes and return the next complete trimmed line.
    ///
    /// Blank lines are skipped. A bare `>` is surfaced as a line even
    /// though the modem sends its send/upload prompt with no terminator.
    fn poll_line(&mut self) -> Option<heapless::String<LINE_MAX>> {
        while let Ok(Some(byte)) = self.serial.read_byte() {
            if byte == b'\n' {
                let line = Self::take_line(&mut self.line_buf);
                if let Some(line) = line {
                    return Some(line);
                }
                // blank or non-UTF-8 line: keep draining
            } else {
                // Overlong lines lose their tail; the terminator still
                // resets the buffer.
                let _ = self.line_buf.push(byte);
            }
        }
        if self.line_buf.as_slice().trim_ascii() == b">" {
            self.line_buf.clear();
            let mut prompt = heapless::String::new();
            let _ = prompt.push('>');
            return Some(prompt);
        }
        None
    }

    fn take_line(buf: &mut heapless::Vec<u8, LINE_MAX>) -> Option<heapless::String<LINE_MAX>> {
        let trimmed = buf.as_slice().trim_ascii();
        let line = core::str::from_utf8(trimmed)
            .ok()
            .filter(|s| !s.is_empty())
            .and_then(|s| heapless::String::try_from(s).ok());
        buf.clear();
        line
    }
}
