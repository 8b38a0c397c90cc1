//! IO device interfaces.
//!
//! The VM core consumes these collaborator contracts; all calls are
//! in-process and fire-and-forget. Production implementations for the
//! random and time sources are provided here, both substitutable for
//! deterministic testing.
use std::time::Instant;

use rand::prelude::*;

use crate::screen::Pixel;

/// Presents the display buffer to the user.
pub trait Renderer {
    /// Wipe the presented frame.
    fn clear_screen(&mut self);

    /// Present the given pixel records. Called at most once per cycle,
    /// only for regions touched by a draw.
    fn draw_pixels(&mut self, pixels: &[Pixel]);
}

/// Plays the buzzer tone.
pub trait Sound {
    /// Request a tone for the given duration. No completion is observed.
    fn play_tone(&mut self, seconds: f64);
}

/// Source of random bytes for the `CXNN` opcode.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

/// Source of timestamps for the delay timer.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// Renderer that discards all output. Useful headless and in tests.
#[derive(Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear_screen(&mut self) {}

    fn draw_pixels(&mut self, _pixels: &[Pixel]) {}
}

/// Sound device that discards all requests.
#[derive(Default)]
pub struct NullSound;

impl Sound for NullSound {
    fn play_tone(&mut self, _seconds: f64) {}
}

/// Random bytes from the thread-local RNG.
#[derive(Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_byte(&mut self) -> u8 {
        thread_rng().gen()
    }
}

/// The system's monotonic clock.
#[derive(Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Bundle of device collaborators handed to the VM at construction.
pub struct Devices {
    pub renderer: Box<dyn Renderer>,
    pub sound: Box<dyn Sound>,
    pub random: Box<dyn RandomSource>,
    pub clock: Box<dyn TimeSource>,
}

impl Default for Devices {
    fn default() -> Self {
        Self {
            renderer: Box::new(NullRenderer),
            sound: Box::new(NullSound),
            random: Box::new(ThreadRngSource),
            clock: Box::new(SystemClock),
        }
    }
}
