//! ## Design
//!
//! * one owned interpreter struct holds all machine state; no globals
//! * fetch/decode/execute over 16bit big-endian words; PC moves by two
//!   before execution so control flow just overwrites it
//! * one tick = timers down by one, then exactly one instruction; the
//!   driver loop paces ticks against the wall clock
//! * display, input and sound sit behind traits so the interpreter never
//!   touches a terminal, keyboard or speaker directly
//!    - the framebuffer is plain data; the driver presents it when the
//!      redraw flag says something changed
//!    - "is this key down" is answered by the input collaborator at the
//!      moment the key instructions execute
//! * bad programs die loudly: unknown opcodes, stack misuse and
//!   out-of-range memory access are hard errors, not wrapped arithmetic
//! * the Cxnn random source is seedable so whole runs can be replayed
//!
//! Model
//!
//! main
//!  |-- display, input, sound, CLI args
//!  |-- interpreter(display, input, sound, seed)
//!  |    |-- memory map (font + program space)
//!  |    `-- framebuffer
//!  `-- main_loop(ticks per second)
//!       |-- quit? -> clean exit
//!       |-- tick: timers, fetch, execute
//!       |-- redraw flag set? -> display.draw(framebuffer)
//!       `-- sleep out the rest of the tick period

pub mod display;
pub mod errors;
pub mod framebuffer;
pub mod input;
pub mod interpreter;
pub mod memory;
pub mod sound;
