//! The fetch/decode/execute loop and the sixteen opcode handlers.

use log::trace;

use crate::console::Console;
use crate::instruction::Instruction;
use crate::instruction::Register::R7;
use crate::sign_extend::SignExtend;
use crate::state::{Condition, Machine};
use crate::trap_vector;

/// Runs `machine` to completion: fetch, decode, dispatch, repeat, until the
/// running flag is cleared by HALT or a reserved opcode.
pub fn run(machine: &mut Machine, console: &mut impl Console) {
    while machine.running {
        step(machine, console);
    }
}

/// Executes exactly one instruction: fetch at PC, post-increment PC, decode,
/// dispatch. Exposed separately from `run` so tests can single-step.
pub fn step(machine: &mut Machine, console: &mut impl Console) {
    let raw = machine.memory.read(machine.pc, console);
    trace!("pc={:#06x} instr={:#06x}", machine.pc, raw);
    machine.pc = machine.pc.wrapping_add(1);

    let instruction = Instruction::decode(raw);
    execute(machine, console, instruction);
}

fn execute(machine: &mut Machine, console: &mut impl Console, instruction: Instruction) {
    match instruction {
        // The condition codes named by bits [11:9] are tested against the
        // one-hot `condition` the last flag-updating instruction left
        // behind; the branch is taken if any named code is currently set.
        Instruction::Br(condition, pc_offset) => {
            let taken = (condition.n && machine.condition == Condition::Neg)
                || (condition.z && machine.condition == Condition::Zero)
                || (condition.p && machine.condition == Condition::Pos);

            if taken {
                machine.pc = machine.pc.wrapping_add(pc_offset.sign_extend(9));
            }
        }

        Instruction::Add(dr, sr1, sr2) => {
            let value = machine
                .registers
                .read(sr1)
                .wrapping_add(machine.registers.read(sr2));
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }
        Instruction::AddImm(dr, sr1, imm5) => {
            let value = machine.registers.read(sr1).wrapping_add(imm5);
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }

        Instruction::Ld(dr, pc_offset) => {
            let address = machine.pc.wrapping_add(pc_offset.sign_extend(9));
            let value = machine.memory.read(address, console);
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }

        Instruction::St(sr, pc_offset) => {
            let address = machine.pc.wrapping_add(pc_offset.sign_extend(9));
            machine.memory.write(address, machine.registers.read(sr));
        }

        // R7 always gets the return address before the jump, whether the
        // target comes from a PC-relative offset (JSR) or a base register
        // (JSRR).
        Instruction::Jsr(pc_offset) => {
            let return_address = machine.pc;
            machine.pc = machine.pc.wrapping_add(pc_offset.sign_extend(11));
            machine.registers.write(R7, return_address);
        }
        Instruction::Jsrr(base_r) => {
            let return_address = machine.pc;
            machine.pc = machine.registers.read(base_r);
            machine.registers.write(R7, return_address);
        }

        Instruction::And(dr, sr1, sr2) => {
            let value = machine.registers.read(sr1) & machine.registers.read(sr2);
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }
        Instruction::AndImm(dr, sr1, imm5) => {
            let value = machine.registers.read(sr1) & imm5;
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }

        Instruction::Ldr(dr, base_r, offset) => {
            let address = machine
                .registers
                .read(base_r)
                .wrapping_add(offset.sign_extend(6));
            let value = machine.memory.read(address, console);
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }

        Instruction::Str(sr, base_r, offset) => {
            let address = machine
                .registers
                .read(base_r)
                .wrapping_add(offset.sign_extend(6));
            machine.memory.write(address, machine.registers.read(sr));
        }

        // Supervisor-only; treated as an unprivileged no-op rather than a
        // fault.
        Instruction::Rti => {}

        Instruction::Not(dr, sr) => {
            let value = !machine.registers.read(sr);
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }

        Instruction::Ldi(dr, pc_offset) => {
            let pointer_address = machine.pc.wrapping_add(pc_offset.sign_extend(9));
            let address = machine.memory.read(pointer_address, console);
            let value = machine.memory.read(address, console);
            machine.registers.write(dr, value);
            machine.update_flags(dr);
        }

        Instruction::Sti(sr, pc_offset) => {
            let pointer_address = machine.pc.wrapping_add(pc_offset.sign_extend(9));
            let address = machine.memory.read(pointer_address, console);
            machine.memory.write(address, machine.registers.read(sr));
        }

        // RET is JMP R7; no separate handling needed.
        Instruction::Jmp(base_r) => {
            machine.pc = machine.registers.read(base_r);
        }

        Instruction::Reserved => {
            machine.running = false;
        }

        Instruction::Lea(dr, pc_offset) => {
            machine
                .registers
                .write(dr, machine.pc.wrapping_add(pc_offset.sign_extend(9)));
            machine.update_flags(dr);
        }

        Instruction::Trap(trap_vector) => {
            machine.registers.write(R7, machine.pc);
            trap_vector::execute(&trap_vector, machine, console);
        }
    }
}
