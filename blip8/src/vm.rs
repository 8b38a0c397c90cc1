//! Virtual machine.
use std::fmt::{self, Write};

use log::trace;

use crate::{
    constants::*,
    devices::Devices,
    error::{Blip8Error, Blip8Result},
    instruction::Instruction,
    keypad::{KeyCode, Keypad},
    machine::Machine,
    screen::{Pixel, Screen},
    timer::DelayTimer,
};

/// Duration of the audible blip requested when a key capture completes.
const KEY_TONE_SECONDS: f64 = 0.1;

/// The instruction execution engine.
///
/// Owns the machine state and is driven from the outside: each [`step`]
/// call executes exactly one fetch-decode-execute cycle. The engine never
/// drives its own clock, and never blocks; the only suspension point is
/// the `FX0A` key wait, which yields by leaving the program counter
/// unchanged.
///
/// [`step`]: Blip8Vm::step
pub struct Blip8Vm {
    machine: Machine,
    screen: Screen,
    keypad: Keypad,
    delay: DelayTimer,
    devices: Devices,
}

impl Default for Blip8Vm {
    fn default() -> Self {
        Self::new(Devices::default())
    }
}

impl Blip8Vm {
    pub fn new(devices: Devices) -> Self {
        Self {
            machine: Machine::new(),
            screen: Screen::new(),
            keypad: Keypad::new(),
            delay: DelayTimer::new(),
            devices,
        }
    }

    /// Load a program and reset all machine state for a fresh run.
    ///
    /// A failed load leaves the previous state untouched. A successful
    /// load clears the screen, abandons any key capture in flight and
    /// disarms the delay timer.
    pub fn load(&mut self, program: &[u8]) -> Blip8Result<()> {
        self.machine.load(program)?;

        self.screen.clear();
        self.keypad.reset();
        self.delay.reset();
        self.devices.renderer.clear_screen();

        Ok(())
    }

    /// Mark a keypad key as held.
    ///
    /// When the press completes a pending `FX0A` capture, a short tone
    /// is requested from the sound device.
    pub fn key_down(&mut self, key: KeyCode) {
        if self.keypad.key_down(key) {
            self.devices.sound.play_tone(KEY_TONE_SECONDS);
        }
    }

    /// Mark a keypad key as released.
    pub fn key_up(&mut self, key: KeyCode) {
        self.keypad.key_up(key);
    }

    /// Advance the machine by exactly one cycle.
    ///
    /// Updates the delay timer from the time source, then fetches,
    /// decodes and executes the instruction at the program counter.
    /// An execution error fails the cycle and leaves the program
    /// counter on the faulting instruction.
    pub fn step(&mut self) -> Blip8Result<()> {
        let now = self.devices.clock.now();
        self.delay.update(now);

        let pc = self.machine.pc;
        let instr = Instruction::new(
            self.machine.read_byte(pc),
            self.machine.read_byte(pc.wrapping_add(1)),
        );
        trace!("{:04X}: {:04X}", pc, instr.code());

        self.machine.pc = self.execute(pc, instr)?;
        Ok(())
    }

    /// Execute one decoded instruction, returning the next program
    /// counter value.
    fn execute(&mut self, pc: Address, instr: Instruction) -> Blip8Result<Address> {
        let (op, _, _, n) = instr.nibbles();
        let (x, y) = (instr.x(), instr.y());
        let nn = instr.nn();
        let nnn = instr.nnn();

        let next = pc.wrapping_add(2);
        let skip = pc.wrapping_add(4);

        match op {
            // Miscellaneous instructions identified by NN
            0x0 | 0xE | 0xF => self.exec_misc(pc, instr),
            // 1NNN (JP addr)
            //
            // Jump to address.
            0x1 => Ok(nnn),
            // 2NNN (CALL addr)
            //
            // Call subroutine at NNN, pushing the return address.
            0x2 => {
                self.machine.stack.push(next);
                Ok(nnn)
            }
            // 3XNN (SE Vx, byte)
            //
            // Skip the next instruction if register VX equals value NN.
            0x3 => {
                if self.machine.registers[x] == nn {
                    Ok(skip)
                } else {
                    Ok(next)
                }
            }
            // 4XNN (SNE Vx, byte)
            //
            // Skip the next instruction if register VX does not equal value NN.
            0x4 => {
                if self.machine.registers[x] != nn {
                    Ok(skip)
                } else {
                    Ok(next)
                }
            }
            // 5XY0 (SE Vx, Vy)
            //
            // Skip the next instruction if register VX equals register VY.
            0x5 if n == 0 => {
                if self.machine.registers[x] == self.machine.registers[y] {
                    Ok(skip)
                } else {
                    Ok(next)
                }
            }
            // 6XNN (LD Vx, byte)
            //
            // Set register VX to value NN.
            0x6 => {
                self.machine.registers[x] = nn;
                Ok(next)
            }
            // 7XNN (ADD Vx, byte)
            //
            // Add value NN to register VX. Carry flag is not set.
            0x7 => {
                self.machine.registers[x] = self.machine.registers[x].wrapping_add(nn);
                Ok(next)
            }
            // Register-to-register arithmetic identified by N
            0x8 => {
                self.exec_math(instr)?;
                Ok(next)
            }
            // 9XY0 (SNE Vx, Vy)
            //
            // Skip the next instruction if register VX does not equal register VY.
            0x9 if n == 0 => {
                if self.machine.registers[x] != self.machine.registers[y] {
                    Ok(skip)
                } else {
                    Ok(next)
                }
            }
            // ANNN (LD I, addr)
            //
            // Set address register I to value NNN.
            0xA => {
                self.machine.index = nnn;
                Ok(next)
            }
            // BNNN (JP V0, addr)
            //
            // Jump to address NNN plus the value of V0.
            0xB => Ok(nnn.wrapping_add(self.machine.registers[0] as u16)),
            // CXNN (RND Vx, byte)
            //
            // Set register VX to a random byte masked with NN.
            0xC => {
                self.machine.registers[x] = self.devices.random.next_byte() & nn;
                Ok(next)
            }
            // DXYN (DRW Vx, Vy, nibble)
            //
            // Draw the N-byte sprite at address register I to the screen
            // buffer at column VX mod 64, row VY mod 32. Sprite bits are
            // XORed into the buffer; rows falling off the bottom edge and
            // columns falling off the right edge are clipped, not wrapped.
            //
            // VF is set to 1 when the draw flips any set pixel to unset,
            // otherwise 0. This is used for collision detection.
            0xD => {
                let col = self.machine.registers[x] as usize % DISPLAY_WIDTH;
                let row = self.machine.registers[y] as usize % DISPLAY_HEIGHT;
                let height = n as usize;

                let mut collision = false;
                for r in 0..height {
                    if row + r >= DISPLAY_HEIGHT {
                        break;
                    }
                    let octet = self.machine.read_byte(self.machine.index.wrapping_add(r as u16));
                    collision |= self.screen.draw_octet(col, row + r, octet);
                }
                self.machine.registers[0xF] = collision as u8;

                let pixels: Vec<Pixel> = self.screen.read(col, row, 8, height).collect();
                self.devices.renderer.draw_pixels(&pixels);

                Ok(next)
            }
            // Unrecognized pattern.
            _ => Err(Blip8Error::UnknownOpcode(instr.code())),
        }
    }

    /// Execute a register-to-register arithmetic instruction.
    ///
    /// The flag lands in VF strictly after the primary register write,
    /// so a flag computation that also targets VF as its destination
    /// observes the pre-write source values.
    #[inline]
    fn exec_math(&mut self, instr: Instruction) -> Blip8Result<()> {
        let (x, y) = (instr.x(), instr.y());

        match instr.n() {
            // 8XY0 (LD Vx, Vy)
            //
            // Store the value of register VY in register VX.
            0x0 => {
                self.machine.registers[x] = self.machine.registers[y];
            }
            // 8XY1 (OR Vx, Vy)
            //
            // Performs bitwise OR on VX and VY, and stores the result in VX.
            0x1 => {
                self.machine.registers[x] |= self.machine.registers[y];
            }
            // 8XY2 (AND Vx, Vy)
            //
            // Performs bitwise AND on VX and VY, and stores the result in VX.
            0x2 => {
                self.machine.registers[x] &= self.machine.registers[y];
            }
            // 8XY3 (XOR Vx, Vy)
            //
            // Performs bitwise XOR on VX and VY, and stores the result in VX.
            0x3 => {
                self.machine.registers[x] ^= self.machine.registers[y];
            }
            // 8XY4 (ADD Vx, Vy)
            //
            // Add VY to VX with wraparound. VF becomes 1 on carry, else 0.
            0x4 => {
                let (a, b) = (self.machine.registers[x], self.machine.registers[y]);
                let (sum, carry) = a.overflowing_add(b);
                self.machine.registers[x] = sum;
                self.machine.registers[0xF] = carry as u8;
            }
            // 8XY5 (SUB Vx, Vy)
            //
            // Subtract VY from VX with wraparound.
            // VF becomes 0 on borrow, 1 when there is none.
            0x5 => {
                let (a, b) = (self.machine.registers[x], self.machine.registers[y]);
                let not_borrow = (a >= b) as u8;
                self.machine.registers[x] = a.wrapping_sub(b);
                self.machine.registers[0xF] = not_borrow;
            }
            // 8XY6 (SHR Vx, Vy)
            //
            // Shift VY right by one into VX. VF receives the shifted-out
            // least significant bit.
            //
            // Dialects differ on whether the source is VY or VX; this
            // implementation reads VY, as the reference does.
            0x6 => {
                let value = self.machine.registers[y];
                self.machine.registers[x] = value >> 1;
                self.machine.registers[0xF] = value & 1;
            }
            // 8XY7 (SUBN Vx, Vy)
            //
            // Subtract VX from VY with wraparound, storing the result in VX.
            // VF becomes 0 on borrow, 1 when there is none.
            0x7 => {
                let (a, b) = (self.machine.registers[x], self.machine.registers[y]);
                let not_borrow = (b >= a) as u8;
                self.machine.registers[x] = b.wrapping_sub(a);
                self.machine.registers[0xF] = not_borrow;
            }
            // 8XYE (SHL Vx, Vy)
            //
            // Shift VY left by one into VX. VF receives the shifted-out
            // most significant bit. Same dialect note as 8XY6.
            0xE => {
                let value = self.machine.registers[y];
                self.machine.registers[x] = value << 1;
                self.machine.registers[0xF] = (value >> 7) & 1;
            }
            // Unrecognized pattern.
            _ => return Err(Blip8Error::UnknownOpcode(instr.code())),
        }

        Ok(())
    }

    /// Execute a miscellaneous instruction, sub-dispatched on the low byte.
    #[inline]
    fn exec_misc(&mut self, pc: Address, instr: Instruction) -> Blip8Result<Address> {
        let (op, _, _, _) = instr.nibbles();
        let x = instr.x();
        let next = pc.wrapping_add(2);
        let skip = pc.wrapping_add(4);

        match (op, instr.nn()) {
            // 00E0 (CLS)
            //
            // Clear the screen buffer and request a renderer clear.
            (0x0, 0xE0) => {
                self.screen.clear();
                self.devices.renderer.clear_screen();
                Ok(next)
            }
            // 00EE (RET)
            //
            // Return from a subroutine by popping the return address.
            (0x0, 0xEE) => self.machine.stack.pop().ok_or(Blip8Error::StackUnderflow),
            // EX9E (SKP Vx)
            //
            // Skip the next instruction if the key named by the low
            // nibble of VX is pressed.
            (0xE, 0x9E) => {
                if self.keypad.is_pressed(self.machine.registers[x]) {
                    Ok(skip)
                } else {
                    Ok(next)
                }
            }
            // EXA1 (SKNP Vx)
            //
            // Skip the next instruction if the key named by the low
            // nibble of VX is not pressed.
            (0xE, 0xA1) => {
                if !self.keypad.is_pressed(self.machine.registers[x]) {
                    Ok(skip)
                } else {
                    Ok(next)
                }
            }
            // FX07 (LD Vx, DT)
            //
            // Set VX to the delay timer value.
            (0xF, 0x07) => {
                self.machine.registers[x] = self.delay.value();
                Ok(next)
            }
            // FX0A (LD Vx, K)
            //
            // Wait for a keypress, then store the key value in VX.
            //
            // The machine stalls by returning the same program counter
            // every cycle: first while armed and no key has been pressed,
            // then while the captured key is still held. Only once that
            // key's press transitions to released does VX receive the key
            // value and the program counter advance.
            (0xF, 0x0A) => {
                if !self.keypad.is_capturing() {
                    self.keypad.begin_capture();
                    return Ok(pc);
                }

                match self.keypad.captured() {
                    Some(key) if self.keypad.is_pressed(key.as_u8()) => Ok(pc),
                    Some(key) => {
                        self.machine.registers[x] = key.as_u8();
                        self.keypad.end_capture();
                        Ok(next)
                    }
                    None => Ok(pc),
                }
            }
            // FX15 (LD DT, Vx)
            //
            // Arm the delay timer with the value of VX.
            (0xF, 0x15) => {
                let now = self.devices.clock.now();
                self.delay.start(self.machine.registers[x], now);
                Ok(next)
            }
            // FX18 (LD ST, Vx)
            //
            // Request a tone for VX 60ths of a second. No sound timer
            // state is kept; the request is fire-and-forget.
            (0xF, 0x18) => {
                let ticks = self.machine.registers[x];
                self.devices.sound.play_tone(ticks as f64 / TIMER_FREQUENCY);
                Ok(next)
            }
            // FX1E (ADD I, Vx)
            //
            // Add VX to address register I with wraparound.
            (0xF, 0x1E) => {
                let value = self.machine.registers[x] as u16;
                self.machine.index = self.machine.index.wrapping_add(value);
                Ok(next)
            }
            // FX29 (LD F, Vx)
            //
            // Point I at the builtin sprite for the hex digit in the low
            // nibble of VX.
            (0xF, 0x29) => {
                let digit = self.machine.registers[x] & 0xF;
                self.machine.index = (FONT_START + digit as usize * FONT_HEIGHT) as Address;
                Ok(next)
            }
            // FX33 (LD B, Vx)
            //
            // Store the binary-coded decimal representation of VX at
            // memory locations I, I+1 and I+2. Bounds are checked before
            // any byte is written, so the store is atomic.
            (0xF, 0x33) => {
                let addr = self.machine.index as usize;
                if addr + 2 >= MEM_SIZE {
                    return Err(Blip8Error::BcdOutOfBounds(self.machine.index));
                }

                let value = self.machine.registers[x];
                self.machine.memory[addr] = value / 100 % 10;
                self.machine.memory[addr + 1] = value / 10 % 10;
                self.machine.memory[addr + 2] = value % 10;
                Ok(next)
            }
            // FX55 (LD [I], Vx)
            //
            // Store registers V0 through VX in memory starting at I,
            // then advance I past the stored range.
            (0xF, 0x55) => {
                for r in 0..=x {
                    let addr = self.machine.index.wrapping_add(r as u16);
                    self.machine.write_byte(addr, self.machine.registers[r]);
                }
                self.machine.index = self.machine.index.wrapping_add(x as u16 + 1);
                Ok(next)
            }
            // FX65 (LD Vx, [I])
            //
            // Read registers V0 through VX from memory starting at I,
            // then advance I past the loaded range.
            (0xF, 0x65) => {
                for r in 0..=x {
                    let addr = self.machine.index.wrapping_add(r as u16);
                    self.machine.registers[r] = self.machine.read_byte(addr);
                }
                self.machine.index = self.machine.index.wrapping_add(x as u16 + 1);
                Ok(next)
            }
            // Unrecognized pattern.
            _ => Err(Blip8Error::UnknownOpcode(instr.code())),
        }
    }
}

/// Troubleshooting
impl Blip8Vm {
    /// Returns the contents of program memory as a human readable string.
    pub fn dump_ram(&self, count: usize) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for offset in (0..count).step_by(2) {
            let addr = MEM_START + offset;
            if addr + 1 >= MEM_SIZE {
                break;
            }
            writeln!(
                buf,
                "{:04X}: {:02X}{:02X}",
                addr,
                self.machine.memory[addr],
                self.machine.memory[addr + 1]
            )?;
        }

        Ok(buf)
    }

    /// Returns the display buffer as a human readable string.
    pub fn dump_display(&self) -> Result<String, fmt::Error> {
        let mut buf = String::new();

        for y in 0..DISPLAY_HEIGHT {
            for x in 0..DISPLAY_WIDTH {
                if self.screen.pixel(x, y) {
                    write!(buf, "#")?;
                } else {
                    write!(buf, ".")?;
                }
            }
            writeln!(buf)?;
        }

        Ok(buf)
    }
}
