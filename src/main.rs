use std::error::Error;
use std::fs::File;

use clap::Parser;

use vip8::display::MonoTermDisplay;
use vip8::input::StdinInput;
use vip8::interpreter::Chip8Interpreter;
use vip8::sound::{Mute, SimpleBeep, Sound};

#[derive(Parser, Debug)]
#[command(version, about = "CHIP-8 interpreter with a terminal display")]
struct Args {
    /// path to a CHIP-8 ROM image
    rom: String,

    /// interpreter ticks per second (timers and instructions share the rate)
    #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u32).range(1..))]
    tick_rate: u32,

    /// seed for the random-number instruction, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// keep the speaker quiet
    #[arg(long)]
    mute: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // initialise
    let mut display = MonoTermDisplay::new()?;
    let mut input = StdinInput::new();
    let mut beep = SimpleBeep::new();
    let mut mute = Mute::new();
    let sound: &mut dyn Sound = if args.mute { &mut mute } else { &mut beep };

    let mut interpreter = Chip8Interpreter::new(&mut display, &mut input, sound, args.seed);

    // load a program
    let mut f = File::open(&args.rom)?;
    interpreter.load_program(&mut f)?;

    interpreter.main_loop(args.tick_rate)?;

    // shove some junk on stdout to stop the cli messing up the last frame
    for _ in 0..12 {
        println!();
    }
    Ok(())
}
