//! Trap dispatch: the six console-I/O service routines a TRAP instruction
//! can invoke, keyed by the low 8 bits of the instruction.

use log::{debug, info};

use crate::console::Console;
use crate::instruction::Register::R0;
use crate::state::Machine;

#[derive(Debug)]
pub enum TrapVector {
    Getc,
    Out,
    Puts,
    In,
    Putsp,
    Halt,
    /// Any vector outside 0x20..=0x25. The ISA defines this as a silent
    /// no-op rather than a fault.
    Unknown(u8),
}

impl TrapVector {
    pub fn decode(instruction: u16) -> TrapVector {
        match instruction & 0xff {
            0x20 => TrapVector::Getc,
            0x21 => TrapVector::Out,
            0x22 => TrapVector::Puts,
            0x23 => TrapVector::In,
            0x24 => TrapVector::Putsp,
            0x25 => TrapVector::Halt,
            other => TrapVector::Unknown(other as u8),
        }
    }
}

/// Runs the service routine named by `trap_vector`, mutating `machine` and
/// talking to the host through `console`.
pub fn execute(trap_vector: &TrapVector, machine: &mut Machine, console: &mut impl Console) {
    match trap_vector {
        TrapVector::Getc => {
            let byte = console.read_byte();
            machine.registers.write(R0, u16::from(byte));
            machine.update_flags(R0);
        }

        TrapVector::Out => {
            let byte = machine.registers.read(R0) as u8;
            console.write_byte(byte);
            console.flush();
        }

        TrapVector::Puts => {
            let mut address = machine.registers.read(R0);
            loop {
                let cell = machine.memory.read(address, console);
                if cell == 0 {
                    break;
                }
                console.write_byte(cell as u8);
                address = address.wrapping_add(1);
            }
            console.flush();
        }

        TrapVector::In => {
            console.write_byte(b'>');
            console.flush();

            let byte = console.read_byte();
            console.write_byte(byte);
            console.flush();

            machine.registers.write(R0, u16::from(byte));
            machine.update_flags(R0);
        }

        TrapVector::Putsp => {
            let mut address = machine.registers.read(R0);
            'outer: loop {
                let cell = machine.memory.read(address, console);
                let low = (cell & 0xff) as u8;
                let high = (cell >> 8) as u8;

                if low == 0 {
                    break 'outer;
                }
                console.write_byte(low);

                if high == 0 {
                    break 'outer;
                }
                console.write_byte(high);

                address = address.wrapping_add(1);
            }
            console.flush();
        }

        TrapVector::Halt => {
            for byte in b"exiting...\n" {
                console.write_byte(*byte);
            }
            console.flush();
            machine.running = false;
            info!("halted at pc={:#06x}", machine.pc);
        }

        TrapVector::Unknown(vector) => {
            debug!("ignoring unknown trap vector {:#04x}", vector);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::instruction::Register::*;

    fn machine_at(pc: u16) -> Machine {
        let mut machine = Machine::new();
        machine.pc = pc;
        machine
    }

    #[test]
    fn getc_stores_byte_and_updates_flags() {
        let mut machine = machine_at(0x3000);
        let mut console = ScriptedConsole::new(vec![b'A']);

        execute(&TrapVector::Getc, &mut machine, &mut console);

        assert_eq!(machine.registers.read(R0), u16::from(b'A'));
    }

    #[test]
    fn getc_on_eof_stores_zero() {
        let mut machine = machine_at(0x3000);
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Getc, &mut machine, &mut console);

        assert_eq!(machine.registers.read(R0), 0);
    }

    #[test]
    fn out_writes_low_byte_of_r0() {
        let mut machine = machine_at(0x3000);
        machine.registers.write(R0, 0x1041); // 'A' with garbage high byte
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Out, &mut machine, &mut console);

        assert_eq!(console.output_string(), "A");
    }

    #[test]
    fn puts_stops_at_nul() {
        let mut machine = machine_at(0x3000);
        machine.registers.write(R0, 0x4000);
        for (i, byte) in b"Hi".iter().enumerate() {
            machine.memory.write(0x4000 + i as u16, u16::from(*byte));
        }
        machine.memory.write(0x4002, 0);
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Puts, &mut machine, &mut console);

        assert_eq!(console.output_string(), "Hi");
    }

    #[test]
    fn in_prompts_echoes_and_stores() {
        let mut machine = machine_at(0x3000);
        let mut console = ScriptedConsole::new(vec![b'x']);

        execute(&TrapVector::In, &mut machine, &mut console);

        assert_eq!(console.output_string(), ">x");
        assert_eq!(machine.registers.read(R0), u16::from(b'x'));
    }

    #[test]
    fn putsp_unpacks_two_chars_per_cell() {
        let mut machine = machine_at(0x3000);
        machine.registers.write(R0, 0x4000);
        machine.memory.write(0x4000, 0x6261); // 'a', 'b'
        machine.memory.write(0x4001, 0x0063); // 'c', then 0
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Putsp, &mut machine, &mut console);

        assert_eq!(console.output_string(), "abc");
    }

    #[test]
    fn putsp_stops_on_odd_length_string() {
        let mut machine = machine_at(0x3000);
        machine.registers.write(R0, 0x4000);
        machine.memory.write(0x4000, 0x0061); // 'a', then 0
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Putsp, &mut machine, &mut console);

        assert_eq!(console.output_string(), "a");
    }

    #[test]
    fn halt_clears_running_flag() {
        let mut machine = machine_at(0x3000);
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Halt, &mut machine, &mut console);

        assert!(!machine.running);
    }

    #[test]
    fn unknown_trap_vector_is_a_no_op() {
        let mut machine = machine_at(0x3000);
        let mut console = ScriptedConsole::default();

        execute(&TrapVector::Unknown(0x99), &mut machine, &mut console);

        assert!(machine.running);
        assert_eq!(console.output_string(), "");
    }

    #[test]
    fn decode_maps_known_vectors() {
        assert!(matches!(TrapVector::decode(0xF020), TrapVector::Getc));
        assert!(matches!(TrapVector::decode(0xF025), TrapVector::Halt));
        assert!(matches!(TrapVector::decode(0xF099), TrapVector::Unknown(0x99)));
    }
}
