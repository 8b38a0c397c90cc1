//! Entrypoint for CLI
use std::{env, error::Error, fs, thread, time::Duration};

use blip8::{prelude::*, Devices, Sound};
use log::info;

static USAGE: &str = r#"
usage: blip8 run FILE [STEPS]

commands:
    run     Run the target ROM file for STEPS machine cycles
            (default 10000) and print the resulting display

examples:
    blip8 run breakout.rom
    blip8 run maze.rom 2000
"#;

const DEFAULT_STEPS: usize = 10_000;

/// Sound device that reports tone requests on the log.
struct LogSound;

impl Sound for LogSound {
    fn play_tone(&mut self, seconds: f64) {
        info!("tone requested for {seconds:.3}s");
    }
}

fn run_rom(filepath: &str, steps: usize) -> Result<(), Box<dyn Error>> {
    let rom = fs::read(filepath)?;

    let devices = Devices {
        sound: Box::new(LogSound),
        ..Devices::default()
    };
    let mut vm = Blip8Vm::new(devices);
    vm.load(&rom)?;

    info!("loaded {} bytes from {filepath}", rom.len());

    // Roughly 500Hz cycle cadence. The delay timer is wall-clock driven,
    // so the exact rate is not load-bearing.
    let cycle = Duration::from_micros(2_000);
    for _ in 0..steps {
        vm.step()?;
        thread::sleep(cycle);
    }

    println!("{}", vm.dump_display()?);

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new().env().init()?;

    match parse_args() {
        Some(Cmd::Run { filepath, steps }) => run_rom(&filepath, steps)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            std::process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next()?.as_str() {
        "run" => {
            let filepath = args.next()?;
            let steps = match args.next() {
                Some(arg) => arg.parse().ok()?,
                None => DEFAULT_STEPS,
            };
            Some(Cmd::Run { filepath, steps })
        }
        _ => None,
    }
}

fn print_usage() {
    println!("blip8 v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Run file
    Run { filepath: String, steps: usize },
}
