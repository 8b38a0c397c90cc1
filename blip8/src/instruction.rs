//! Instruction word decoding.

/// A two-byte instruction word split into its addressable fields.
///
/// Decoding is purely structural. Any 16-bit pattern decodes, whether
/// or not the dispatcher recognizes it as an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Instruction {
    code: u16,
}

impl Instruction {
    /// Build an instruction from the high-order and low-order bytes
    /// read from memory at `PC` and `PC+1`.
    #[inline]
    pub(crate) fn new(hi: u8, lo: u8) -> Self {
        Self {
            code: ((hi as u16) << 8) | lo as u16,
        }
    }

    /// The full 16-bit instruction word.
    #[inline]
    pub(crate) fn code(&self) -> u16 {
        self.code
    }

    /// The four 4-bit fields, most significant first.
    #[inline]
    pub(crate) fn nibbles(&self) -> (u8, u8, u8, u8) {
        (
            ((self.code >> 12) & 0xF) as u8,
            ((self.code >> 8) & 0xF) as u8,
            ((self.code >> 4) & 0xF) as u8,
            (self.code & 0xF) as u8,
        )
    }

    /// Register index encoded in the second nibble.
    #[inline]
    pub(crate) fn x(&self) -> usize {
        ((self.code >> 8) & 0xF) as usize
    }

    /// Register index encoded in the third nibble.
    #[inline]
    pub(crate) fn y(&self) -> usize {
        ((self.code >> 4) & 0xF) as usize
    }

    /// Low nibble.
    #[inline]
    pub(crate) fn n(&self) -> u8 {
        (self.code & 0xF) as u8
    }

    /// Literal byte operand, the low-order byte.
    #[inline]
    pub(crate) fn nn(&self) -> u8 {
        (self.code & 0xFF) as u8
    }

    /// 12-bit address operand.
    #[inline]
    pub(crate) fn nnn(&self) -> u16 {
        self.code & 0x0FFF
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_field_extraction() {
        let instr = Instruction::new(0xD2, 0x35);

        assert_eq!(instr.code(), 0xD235);
        assert_eq!(instr.nibbles(), (0xD, 0x2, 0x3, 0x5));
        assert_eq!(instr.x(), 0x2);
        assert_eq!(instr.y(), 0x3);
        assert_eq!(instr.n(), 0x5);
        assert_eq!(instr.nn(), 0x35);
        assert_eq!(instr.nnn(), 0x235);
    }

    #[test]
    fn test_decodes_any_pattern() {
        // Not a canonical opcode, but decodes structurally.
        let instr = Instruction::new(0xFF, 0xFF);
        assert_eq!(instr.nibbles(), (0xF, 0xF, 0xF, 0xF));
        assert_eq!(instr.nnn(), 0xFFF);
    }
}
