//! Host I/O adapter: the only boundary between the ISA core and a real tty.
//!
//! Production code talks to stdin/stdout through [`StdioConsole`]. Tests
//! substitute [`ScriptedConsole`] so the core's trap and memory-mapped I/O
//! behavior can be exercised without a terminal.

use std::io::{self, Read, Write};

use libc::STDIN_FILENO;
use log::warn;
use nix::sys::select::{select, FdSet};
use nix::sys::time::{TimeVal, TimeValLike};

/// The host-I/O seam described in the design notes: `poll_ready`, `read_byte`,
/// `write_byte`, `flush`. Every place the core touches the outside world goes
/// through this trait.
pub trait Console {
    /// Non-blocking: true if a byte is ready to be read from stdin.
    fn poll_ready(&mut self) -> bool;
    /// Blocking single-byte read from stdin.
    fn read_byte(&mut self) -> u8;
    /// Write a single byte to stdout.
    fn write_byte(&mut self, byte: u8);
    /// Flush stdout.
    fn flush(&mut self);
}

/// Production backend: a zero-timeout `select` readiness poll and direct
/// stdin/stdout access.
#[derive(Default)]
pub struct StdioConsole;

impl Console for StdioConsole {
    fn poll_ready(&mut self) -> bool {
        let mut readfds = FdSet::new();
        readfds.insert(STDIN_FILENO);

        match select(None, &mut readfds, None, None, &mut TimeVal::zero()) {
            Ok(n) => n == 1,
            Err(_) => false,
        }
    }

    fn read_byte(&mut self) -> u8 {
        let mut buffer = [0u8; 1];
        match io::stdin().read_exact(&mut buffer) {
            Ok(()) => buffer[0],
            // EOF on a blocking GETC/IN read is treated as a zero byte
            // rather than copying a C-style -1 cast (see Open Question).
            Err(_) => 0,
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if let Err(err) = io::stdout().write_all(&[byte]) {
            warn!("stdout write failed: {}", err);
        }
    }

    fn flush(&mut self) {
        if let Err(err) = io::stdout().flush() {
            warn!("stdout flush failed: {}", err);
        }
    }
}

/// Test backend: a fixed input script and a captured output buffer, so
/// scenarios involving GETC/IN/PUTS/PUTSP can be asserted on without a tty.
#[derive(Default)]
pub struct ScriptedConsole {
    input: std::collections::VecDeque<u8>,
    pub output: Vec<u8>,
}

impl ScriptedConsole {
    pub fn new(input: impl IntoIterator<Item = u8>) -> Self {
        Self {
            input: input.into_iter().collect(),
            output: Vec::new(),
        }
    }

    pub fn output_string(&self) -> String {
        String::from_utf8_lossy(&self.output).into_owned()
    }
}

impl Console for ScriptedConsole {
    fn poll_ready(&mut self) -> bool {
        !self.input.is_empty()
    }

    fn read_byte(&mut self) -> u8 {
        self.input.pop_front().unwrap_or(0)
    }

    fn write_byte(&mut self, byte: u8) {
        self.output.push(byte);
    }

    fn flush(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_console_read_then_eof_is_zero() {
        let mut console = ScriptedConsole::new(vec![0x41]);

        assert!(console.poll_ready());
        assert_eq!(console.read_byte(), 0x41);
        assert!(!console.poll_ready());
        assert_eq!(console.read_byte(), 0);
    }

    #[test]
    fn scripted_console_captures_output() {
        let mut console = ScriptedConsole::default();

        console.write_byte(b'h');
        console.write_byte(b'i');
        console.flush();

        assert_eq!(console.output_string(), "hi");
    }
}
