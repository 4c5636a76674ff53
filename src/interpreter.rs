//! # interpreter
//!
//! The virtual machine itself: registers, stack, timers, memory and
//! framebuffer in one owned struct, with the display/input/sound
//! collaborators borrowed behind traits. One `tick` = decrement the two
//! timers, then fetch and execute exactly one instruction. The program
//! counter is advanced by two *before* execution, so control-flow
//! instructions simply overwrite it.

use crate::display::Display;
use crate::errors::Chip8Error;
use crate::framebuffer::Framebuffer;
use crate::input::Input;
use crate::memory::{Chip8MemoryMap, MemoryMap, MEMORY_SIZE, PROGRAM_ADDR};
use crate::sound::Sound;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::io;
use std::time::{Duration, Instant};

const NUM_REGISTERS: usize = 16;
const STACK_DEPTH: usize = 16;
const NUM_KEYS: u8 = 16;

/// bytes per font glyph; FX29 turns a digit into a glyph address
const GLYPH_LEN: u16 = 5;

pub struct Chip8Interpreter<'a> {
    memory: Chip8MemoryMap,
    framebuffer: Framebuffer,
    display: &'a mut dyn Display,
    input: &'a mut dyn Input,
    sound: &'a mut dyn Sound,
    v: [u8; NUM_REGISTERS],
    pc: u16,
    i: u16,
    stack: [u16; STACK_DEPTH],
    sp: usize,
    delay_timer: u8,
    sound_timer: u8,
    redraw: bool,
    rng: StdRng,
}

impl<'a> Chip8Interpreter<'a> {
    /// a freshly reset machine. pass a seed to make Cxnn reproducible
    pub fn new(
        display: &'a mut dyn Display,
        input: &'a mut dyn Input,
        sound: &'a mut dyn Sound,
        seed: Option<u64>,
    ) -> Chip8Interpreter<'a> {
        Chip8Interpreter {
            memory: Chip8MemoryMap::new(),
            framebuffer: Framebuffer::new(),
            display,
            input,
            sound,
            v: [0; NUM_REGISTERS],
            pc: PROGRAM_ADDR,
            i: 0x0000,
            stack: [0; STACK_DEPTH],
            sp: 0,
            delay_timer: 0x00,
            sound_timer: 0x00,
            redraw: false,
            rng: match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            },
        }
    }

    /// back to power-on state: PC at 0x200, everything else zeroed and the
    /// font back in low memory
    pub fn reset(&mut self) {
        self.memory = Chip8MemoryMap::new();
        self.framebuffer.clear();
        self.v = [0; NUM_REGISTERS];
        self.pc = PROGRAM_ADDR;
        self.i = 0x0000;
        self.stack = [0; STACK_DEPTH];
        self.sp = 0;
        self.delay_timer = 0x00;
        self.sound_timer = 0x00;
        self.redraw = false;
    }

    /// load a chip8 program; returns how many bytes landed in memory
    pub fn load_program(&mut self, reader: &mut impl io::Read) -> Result<usize, Chip8Error> {
        Ok(self.memory.load_program(reader)?)
    }

    /// the framebuffer as the renderer sees it
    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// nonzero means the machine should be sounding
    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// checks and clears the redraw flag
    pub fn take_redraw(&mut self) -> bool {
        let redraw = self.redraw;
        self.redraw = false;
        redraw
    }

    /// one update: timers down, one instruction through
    pub fn tick(&mut self) -> Result<(), Chip8Error> {
        if self.delay_timer > 0 {
            self.delay_timer -= 1;
        }
        if self.sound_timer > 0 {
            self.sound_timer -= 1;
        }
        self.sound.set_sounding(self.sound_timer > 0)?;

        let op = self.fetch()?;
        self.pc += 2;
        self.execute(op)
    }

    /// run ticks at a steady rate until the user quits or the program dies
    pub fn main_loop(&mut self, ticks_per_second: u32) -> Result<(), Chip8Error> {
        let period = Duration::from_secs(1) / ticks_per_second;
        let sleeper = spin_sleep::SpinSleeper::default();
        loop {
            let started = Instant::now();
            if self.input.quit_requested()? {
                return Ok(());
            }
            self.tick()?;
            if self.take_redraw() {
                self.display.draw(self.framebuffer.as_bytes())?;
            }
            let elapsed = started.elapsed();
            if elapsed < period {
                sleeper.sleep(period - elapsed);
            }
        }
    }

    /// big-endian instruction word at PC
    fn fetch(&self) -> Result<u16, Chip8Error> {
        if self.pc as usize > MEMORY_SIZE - 2 {
            return Err(Chip8Error::AddressOutOfRange(self.pc));
        }
        Ok(self.memory.get_word(self.pc))
    }

    /// dispatch one instruction word. PC has already moved past it; jumps,
    /// calls and skips adjust PC from there
    fn execute(&mut self, op: u16) -> Result<(), Chip8Error> {
        let nibbles = (
            (op >> 12) as u8,
            (op >> 8 & 0x0F) as u8,
            (op >> 4 & 0x0F) as u8,
            (op & 0x0F) as u8,
        );
        let x = nibbles.1 as usize;
        let y = nibbles.2 as usize;
        let n = nibbles.3;
        let nn = (op & 0x00FF) as u8;
        let nnn = op & 0x0FFF;

        match nibbles {
            (0x0, 0x0, 0xE, 0x0) => {
                self.framebuffer.clear();
                self.redraw = true;
            }
            (0x0, 0x0, 0xE, 0xE) => self.pc = self.pop_stack()?,
            (0x1, ..) => self.pc = nnn,
            (0x2, ..) => {
                self.push_stack(self.pc)?;
                self.pc = nnn;
            }
            (0x3, ..) => {
                if self.v[x] == nn {
                    self.pc += 2;
                }
            }
            (0x4, ..) => {
                if self.v[x] != nn {
                    self.pc += 2;
                }
            }
            (0x5, _, _, 0x0) => {
                if self.v[x] == self.v[y] {
                    self.pc += 2;
                }
            }
            (0x6, ..) => self.v[x] = nn,
            (0x7, ..) => self.v[x] = self.v[x].wrapping_add(nn),
            (0x8, _, _, 0x0) => self.v[x] = self.v[y],
            (0x8, _, _, 0x1) => self.v[x] |= self.v[y],
            (0x8, _, _, 0x2) => self.v[x] &= self.v[y],
            (0x8, _, _, 0x3) => self.v[x] ^= self.v[y],
            (0x8, _, _, 0x4) => {
                let (sum, carry) = self.v[x].overflowing_add(self.v[y]);
                self.v[x] = sum;
                self.v[0xF] = carry as u8;
            }
            (0x8, _, _, 0x5) => {
                let no_borrow = (self.v[x] > self.v[y]) as u8;
                self.v[x] = self.v[x].wrapping_sub(self.v[y]);
                self.v[0xF] = no_borrow;
            }
            // shifts read VY, not VX (COSMAC VIP behaviour)
            (0x8, _, _, 0x6) => {
                let shifted_out = self.v[y] & 0x01;
                self.v[x] = self.v[y] >> 1;
                self.v[0xF] = shifted_out;
            }
            (0x8, _, _, 0x7) => {
                let no_borrow = (self.v[x] < self.v[y]) as u8;
                self.v[x] = self.v[y].wrapping_sub(self.v[x]);
                self.v[0xF] = no_borrow;
            }
            (0x8, _, _, 0xE) => {
                let shifted_out = self.v[y] >> 7;
                self.v[x] = self.v[y] << 1;
                self.v[0xF] = shifted_out;
            }
            (0x9, _, _, 0x0) => {
                if self.v[x] != self.v[y] {
                    self.pc += 2;
                }
            }
            (0xA, ..) => self.i = nnn,
            (0xB, ..) => self.pc = nnn + self.v[0] as u16,
            (0xC, ..) => self.v[x] = self.rng.next_u32() as u8 & nn,
            (0xD, ..) => self.draw_sprite(x, y, n)?,
            (0xE, _, 0x9, 0xE) => {
                if self.input.is_held(self.v[x])? {
                    self.pc += 2;
                }
            }
            (0xE, _, 0xA, 0x1) => {
                if !self.input.is_held(self.v[x])? {
                    self.pc += 2;
                }
            }
            (0xF, _, 0x0, 0x7) => self.v[x] = self.delay_timer,
            (0xF, _, 0x0, 0xA) => self.wait_for_key(x)?,
            (0xF, _, 0x1, 0x5) => self.delay_timer = self.v[x],
            (0xF, _, 0x1, 0x8) => self.sound_timer = self.v[x],
            (0xF, _, 0x1, 0xE) => self.i = self.i.wrapping_add(self.v[x] as u16),
            (0xF, _, 0x2, 0x9) => self.i = self.v[x] as u16 * GLYPH_LEN,
            (0xF, _, 0x3, 0x3) => {
                self.check_i_range(3)?;
                let digits = self.memory.get_rw_slice(self.i, 3);
                digits[0] = self.v[x] / 100;
                digits[1] = self.v[x] / 10 % 10;
                digits[2] = self.v[x] % 10;
            }
            (0xF, _, 0x5, 0x5) => {
                self.check_i_range(x + 1)?;
                self.memory
                    .get_rw_slice(self.i, x + 1)
                    .copy_from_slice(&self.v[..=x]);
            }
            (0xF, _, 0x6, 0x5) => {
                self.check_i_range(x + 1)?;
                self.v[..=x].copy_from_slice(self.memory.get_ro_slice(self.i, x + 1));
            }
            _ => return Err(Chip8Error::UnknownOpcode(op)),
        }
        Ok(())
    }

    /// DXYN: XOR an n-row sprite from memory[I..] onto the screen at
    /// (VX, VY); VF records whether any pixel was switched off
    fn draw_sprite(&mut self, x: usize, y: usize, n: u8) -> Result<(), Chip8Error> {
        self.check_i_range(n as usize)?;
        let sprite = self.memory.get_ro_slice(self.i, n as usize);
        let collision = self
            .framebuffer
            .blit(self.v[x] as usize, self.v[y] as usize, sprite);
        self.v[0xF] = collision as u8;
        self.redraw = true;
        Ok(())
    }

    /// FX0A: poll the keypad once per tick. no key means rewinding PC so
    /// the instruction runs again next tick; the lowest held key wins
    fn wait_for_key(&mut self, x: usize) -> Result<(), Chip8Error> {
        for key in 0..NUM_KEYS {
            if self.input.is_held(key)? {
                self.v[x] = key;
                return Ok(());
            }
        }
        self.pc -= 2;
        Ok(())
    }

    fn check_i_range(&self, len: usize) -> Result<(), Chip8Error> {
        if self.i as usize + len > MEMORY_SIZE {
            return Err(Chip8Error::AddressOutOfRange(self.i));
        }
        Ok(())
    }

    fn push_stack(&mut self, addr: u16) -> Result<(), Chip8Error> {
        if self.sp == STACK_DEPTH {
            return Err(Chip8Error::StackOverflow);
        }
        self.stack[self.sp] = addr;
        self.sp += 1;
        Ok(())
    }

    fn pop_stack(&mut self) -> Result<u16, Chip8Error> {
        if self.sp == 0 {
            return Err(Chip8Error::StackUnderflow);
        }
        self.sp -= 1;
        Ok(self.stack[self.sp])
    }
}
