mod devices;
mod instruction;
mod keypad;
mod machine;
mod screen;
mod timer;
mod vm;

pub mod constants;
pub mod error;

pub use self::{
    devices::{
        Devices, NullRenderer, NullSound, RandomSource, Renderer, Sound, SystemClock,
        ThreadRngSource, TimeSource,
    },
    keypad::{InvalidKeyCode, KeyCode},
    screen::Pixel,
    vm::Blip8Vm,
};

pub mod prelude {
    pub use super::{
        error::{Blip8Error, Blip8Result},
        Blip8Vm, KeyCode,
    };
}
