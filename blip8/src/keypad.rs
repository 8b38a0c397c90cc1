//! Hexadecimal keypad state.
use crate::constants::KEY_COUNT;

/// One of the 16 keypad keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KeyCode {
    Num0 = 0x0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    A,
    B,
    C,
    D,
    E,
    F = 0xF,
}

impl KeyCode {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl std::fmt::Display for KeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "k{:x}", self.as_u8())
    }
}

impl From<KeyCode> for u8 {
    fn from(key: KeyCode) -> Self {
        key.as_u8()
    }
}

impl TryFrom<u8> for KeyCode {
    type Error = InvalidKeyCode;

    fn try_from(key_id: u8) -> Result<Self, Self::Error> {
        match key_id {
            0x0 => Ok(Self::Num0),
            0x1 => Ok(Self::Num1),
            0x2 => Ok(Self::Num2),
            0x3 => Ok(Self::Num3),
            0x4 => Ok(Self::Num4),
            0x5 => Ok(Self::Num5),
            0x6 => Ok(Self::Num6),
            0x7 => Ok(Self::Num7),
            0x8 => Ok(Self::Num8),
            0x9 => Ok(Self::Num9),
            0xA => Ok(Self::A),
            0xB => Ok(Self::B),
            0xC => Ok(Self::C),
            0xD => Ok(Self::D),
            0xE => Ok(Self::E),
            0xF => Ok(Self::F),
            _ => Err(InvalidKeyCode),
        }
    }
}

#[derive(Debug)]
pub struct InvalidKeyCode;

impl std::error::Error for InvalidKeyCode {}

impl std::fmt::Display for InvalidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "keycode must be in range 0 <= keycode < 16")
    }
}

/// Capture sub-machine driven by the block-on-keypress opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    /// No capture requested.
    Idle,
    /// Armed; waiting for any key to transition to pressed.
    Capturing,
    /// A key press was observed; held until the opcode handler sees
    /// that key released again.
    Captured(KeyCode),
}

/// Pressed/released state for the 16 keys, plus the single-keypress
/// capture machine.
pub(crate) struct Keypad {
    pressed: [bool; KEY_COUNT],
    capture: Capture,
}

impl Default for Keypad {
    fn default() -> Self {
        Self {
            pressed: [false; KEY_COUNT],
            capture: Capture::Idle,
        }
    }
}

impl Keypad {
    pub(crate) fn new() -> Self {
        Default::default()
    }

    /// Mark a key as held.
    ///
    /// Returns `true` when this press completed a pending capture,
    /// so the owner can emit the audible-tone side effect.
    pub(crate) fn key_down(&mut self, key: KeyCode) -> bool {
        self.pressed[key.as_u8() as usize] = true;

        if self.capture == Capture::Capturing {
            self.capture = Capture::Captured(key);
            true
        } else {
            false
        }
    }

    /// Mark a key as released.
    pub(crate) fn key_up(&mut self, key: KeyCode) {
        self.pressed[key.as_u8() as usize] = false;
    }

    pub(crate) fn is_pressed(&self, key_id: u8) -> bool {
        self.pressed[(key_id & 0xF) as usize]
    }

    /// Arm the capture machine. A no-op when a capture is already
    /// in flight.
    pub(crate) fn begin_capture(&mut self) {
        if self.capture == Capture::Idle {
            self.capture = Capture::Capturing;
        }
    }

    pub(crate) fn is_capturing(&self) -> bool {
        self.capture != Capture::Idle
    }

    /// The key observed pressed while capturing, if any yet.
    pub(crate) fn captured(&self) -> Option<KeyCode> {
        match self.capture {
            Capture::Captured(key) => Some(key),
            _ => None,
        }
    }

    /// Return the capture machine to idle.
    pub(crate) fn end_capture(&mut self) {
        self.capture = Capture::Idle;
    }

    /// Release all keys and abandon any capture in flight.
    pub(crate) fn reset(&mut self) {
        self.pressed.fill(false);
        self.capture = Capture::Idle;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_press_and_release() {
        let mut keypad = Keypad::new();

        keypad.key_down(KeyCode::Num7);
        assert!(keypad.is_pressed(0x7));
        assert!(!keypad.is_pressed(0x8));

        keypad.key_up(KeyCode::Num7);
        assert!(!keypad.is_pressed(0x7));
    }

    #[test]
    fn test_key_id_lookup_masks_to_low_nibble() {
        let mut keypad = Keypad::new();
        keypad.key_down(KeyCode::F);
        // 0xAF and 0x0F address the same key.
        assert!(keypad.is_pressed(0xAF));
    }

    #[test]
    fn test_capture_takes_first_press_only() {
        let mut keypad = Keypad::new();
        keypad.begin_capture();

        assert!(keypad.captured().is_none());
        assert!(keypad.key_down(KeyCode::Num5));
        assert_eq!(keypad.captured(), Some(KeyCode::Num5));

        // A second press does not replace the captured key.
        assert!(!keypad.key_down(KeyCode::Num6));
        assert_eq!(keypad.captured(), Some(KeyCode::Num5));
    }

    #[test]
    fn test_press_without_capture_reports_no_tone() {
        let mut keypad = Keypad::new();
        assert!(!keypad.key_down(KeyCode::Num5));
        assert!(keypad.captured().is_none());
    }

    #[test]
    fn test_captured_key_survives_release_until_ended() {
        let mut keypad = Keypad::new();
        keypad.begin_capture();
        keypad.key_down(KeyCode::B);
        keypad.key_up(KeyCode::B);

        // The handler still needs to observe the captured key.
        assert_eq!(keypad.captured(), Some(KeyCode::B));
        assert!(!keypad.is_pressed(0xB));

        keypad.end_capture();
        assert!(keypad.captured().is_none());
        assert!(!keypad.is_capturing());
    }

    #[test]
    fn test_keycode_conversions() {
        assert_eq!(KeyCode::try_from(0xC).unwrap(), KeyCode::C);
        assert_eq!(u8::from(KeyCode::Num9), 9);
        assert!(KeyCode::try_from(16).is_err());
    }
}
