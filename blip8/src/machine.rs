//! Memory, registers and the call stack.
use crate::{
    constants::*,
    error::{Blip8Error, Blip8Result},
};

/// Addressable state of the machine.
///
/// Register 16 (VF) is used for either the carry flag or borrow switch
/// depending on opcode.
pub(crate) struct Machine {
    /// Main memory storage space.
    pub(crate) memory: Box<[u8; MEM_SIZE]>,
    /// General purpose registers for temporary values.
    pub(crate) registers: [u8; REGISTER_COUNT],
    /// Pointer register used for temporarily storing an address.
    pub(crate) index: Address,
    /// Program counter pointing to the next instruction to fetch.
    pub(crate) pc: Address,
    /// Stack of return addresses used for jumping when a routine call finishes.
    ///
    /// The reference hardware capped nesting at 16 levels. No depth limit
    /// is enforced here; correctness of programs is unaffected.
    pub(crate) stack: Vec<Address>,
}

impl Default for Machine {
    fn default() -> Self {
        Self {
            memory: Box::new([0; MEM_SIZE]),
            registers: [0; REGISTER_COUNT],
            index: 0,
            pc: 0,
            stack: Vec::new(),
        }
    }
}

impl Machine {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Load a program into memory and prepare the machine for execution.
    ///
    /// Validation happens before any mutation, so a failed load leaves
    /// the previous state untouched. A successful load guarantees the
    /// program cannot observe residual memory from a previous run.
    pub(crate) fn load(&mut self, program: &[u8]) -> Blip8Result<()> {
        if program.is_empty() {
            return Err(Blip8Error::EmptyProgram);
        }
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(Blip8Error::ProgramTooLarge);
        }

        // Fonts live at the bottom of memory, below the start address.
        self.memory[FONT_START..FONT_START + FONT_DATA_LENGTH].copy_from_slice(&FONT_DATA);
        self.memory[FONT_START + FONT_DATA_LENGTH..MEM_START].fill(0);

        let end = MEM_START + program.len();
        self.memory[MEM_START..end].copy_from_slice(program);
        self.memory[end..].fill(0);

        self.registers.fill(0);
        self.index = 0;
        self.stack.clear();
        self.pc = MEM_START as Address;

        Ok(())
    }

    /// Read a memory byte, masking the address into the 4 KiB space.
    #[inline(always)]
    pub(crate) fn read_byte(&self, addr: Address) -> u8 {
        self.memory[addr as usize & ADDRESS_MASK]
    }

    /// Write a memory byte, masking the address into the 4 KiB space.
    #[inline(always)]
    pub(crate) fn write_byte(&mut self, addr: Address, value: u8) {
        self.memory[addr as usize & ADDRESS_MASK] = value;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_copies_program_to_start_address() {
        let mut machine = Machine::new();
        machine.load(&[0x00, 0xE0, 0x12, 0x00]).unwrap();

        assert_eq!(&machine.memory[MEM_START..MEM_START + 4], &[0x00, 0xE0, 0x12, 0x00]);
        assert_eq!(machine.pc, MEM_START as Address);
        assert_eq!(&machine.memory[FONT_START..FONT_START + 5], &FONT_DATA[..5]);
    }

    #[test]
    fn test_load_empty_program_fails() {
        let mut machine = Machine::new();
        assert_eq!(machine.load(&[]), Err(Blip8Error::EmptyProgram));
    }

    #[test]
    fn test_load_exactly_fitting_program_succeeds() {
        let mut machine = Machine::new();
        let program = vec![0xAB; MAX_PROGRAM_SIZE];
        machine.load(&program).unwrap();
        assert_eq!(machine.memory[MEM_SIZE - 1], 0xAB);
    }

    #[test]
    fn test_load_oversized_program_leaves_state_untouched() {
        let mut machine = Machine::new();
        machine.load(&[0x60, 0x42]).unwrap();
        machine.registers[0] = 7;

        let too_large = vec![0; MAX_PROGRAM_SIZE + 1];
        assert_eq!(machine.load(&too_large), Err(Blip8Error::ProgramTooLarge));

        // Prior program and registers survive the failed load.
        assert_eq!(&machine.memory[MEM_START..MEM_START + 2], &[0x60, 0x42]);
        assert_eq!(machine.registers[0], 7);
    }

    #[test]
    fn test_load_clears_residue_from_previous_run() {
        let mut machine = Machine::new();
        machine.load(&[0x11, 0x22, 0x33, 0x44]).unwrap();
        machine.load(&[0x55, 0x66]).unwrap();

        assert_eq!(&machine.memory[MEM_START..MEM_START + 4], &[0x55, 0x66, 0x00, 0x00]);
    }

    #[test]
    fn test_byte_access_masks_address() {
        let mut machine = Machine::new();
        machine.write_byte(0x1005, 0xCD);
        assert_eq!(machine.memory[0x005], 0xCD);
        assert_eq!(machine.read_byte(0x1005), 0xCD);
    }
}
