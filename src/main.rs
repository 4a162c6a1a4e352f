use std::process;

use log::error;
use nix::sys::termios::{tcgetattr, tcsetattr, LocalFlags, SetArg, Termios};

use lc3::{Config, StdioConsole};

const STDIN_FILENO: i32 = 0;

/// Puts stdin into non-canonical, no-echo mode for the lifetime of the VM
/// and restores the original settings on drop, including on early return or
/// panic unwind.
struct TerminalGuard {
    original: Termios,
}

impl TerminalGuard {
    fn enable() -> nix::Result<Self> {
        let original = tcgetattr(STDIN_FILENO)?;

        let mut raw = original.clone();
        raw.local_flags &= !(LocalFlags::ICANON | LocalFlags::ECHO);
        tcsetattr(STDIN_FILENO, SetArg::TCSANOW, &raw)?;

        Ok(Self { original })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = tcsetattr(STDIN_FILENO, SetArg::TCSANOW, &self.original);
    }
}

fn main() {
    let config = Config::from_args();

    let level = if config.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let _guard = TerminalGuard::enable().unwrap_or_else(|err| {
        eprintln!("failed to set up terminal: {}", err);
        process::exit(1);
    });

    let mut console = StdioConsole::default();
    if let Err(err) = lc3::run(config, &mut console) {
        error!("{}", err);
        process::exit(1);
    }
}
