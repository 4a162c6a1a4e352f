mod config;
mod console;
mod cpu;
mod error;
mod instruction;
mod loader;
mod sign_extend;
mod state;
mod trap_vector;

pub use crate::config::Config;
pub use crate::console::{Console, StdioConsole};
pub use crate::error::Error;

use log::info;

use crate::state::Machine;

/// Loads the image named by `config` and runs it to completion (or HALT)
/// against `console`.
pub fn run(config: Config, console: &mut impl Console) -> Result<(), Error> {
    let mut machine = Machine::new();
    let origin = loader::load_image(&config.image_path, &mut machine.memory)?;
    machine.pc = origin;

    info!("starting execution at {:#06x}", origin);
    cpu::run(&mut machine, console);

    Ok(())
}
