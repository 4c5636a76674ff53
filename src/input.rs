use crossterm::event::{poll, read, Event, KeyCode};
use crossterm::terminal;
use std::collections::HashMap;
use std::io;
use std::time::{Duration, Instant};

/// keypad layout on the left-hand side of a qwerty keyboard:
///
///   1 2 3 4        1 2 3 C
///   q w e r   =>   4 5 6 D
///   a s d f        7 8 9 E
///   z x c v        A 0 B F
const CHIP8_CONVENTIONAL_KEYMAP: [(char, u8); 16] = [
    ('x', 0x00),
    ('1', 0x01),
    ('2', 0x02),
    ('3', 0x03),
    ('q', 0x04),
    ('w', 0x05),
    ('e', 0x06),
    ('a', 0x07),
    ('s', 0x08),
    ('d', 0x09),
    ('z', 0x0a),
    ('c', 0x0b),
    ('4', 0x0c),
    ('r', 0x0d),
    ('f', 0x0e),
    ('v', 0x0f),
];

/// how long a keypress counts as "held". terminals deliver no key-up
/// events, so a key is considered down until its last press event ages out
/// (auto-repeat keeps refreshing it while physically held)
const KEY_HOLD: Duration = Duration::from_millis(200);

/// The key-state collaborator. The interpreter queries current state
/// synchronously while executing the key instructions.
pub trait Input {
    /// is the keypad key (0x0-0xF) down right now?
    fn is_held(&mut self, key: u8) -> Result<bool, io::Error>;

    /// has the user asked to leave the emulator?
    fn quit_requested(&mut self) -> Result<bool, io::Error>;
}

/// keyboard state from STDIN via crossterm raw mode
pub struct StdinInput {
    last_press: [Option<Instant>; 16],
    keymap: HashMap<char, u8>,
    quit: bool,
}

impl StdinInput {
    pub fn new() -> Self {
        terminal::enable_raw_mode().unwrap();
        StdinInput {
            last_press: [None; 16],
            keymap: HashMap::from(CHIP8_CONVENTIONAL_KEYMAP),
            quit: false,
        }
    }

    /// drain whatever key events the terminal has queued up
    fn read_stdin(&mut self) -> Result<(), io::Error> {
        while poll(Duration::from_millis(0))? {
            match read()? {
                Event::Key(evt) => match evt.code {
                    KeyCode::Char(key) => match self.keymap.get(&key) {
                        Some(mapped_key) => {
                            self.last_press[*mapped_key as usize] = Some(Instant::now());
                        }
                        None => {
                            eprintln!("Warning: can't map {:?} to a keypad key", key);
                        }
                    },
                    KeyCode::Esc => self.quit = true,
                    _ => {
                        eprintln!("Warning: unknown key event received");
                    }
                },
                _ => {
                    eprintln!("Warning: unknown event received");
                }
            }
        }
        Ok(())
    }
}

impl Drop for StdinInput {
    fn drop(&mut self) {
        terminal::disable_raw_mode().unwrap();
    }
}

impl Input for StdinInput {
    fn is_held(&mut self, key: u8) -> Result<bool, io::Error> {
        self.read_stdin()?;
        if key > 0x0F {
            return Ok(false);
        }
        Ok(match self.last_press[key as usize] {
            Some(pressed) => pressed.elapsed() <= KEY_HOLD,
            None => false,
        })
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        self.read_stdin()?;
        Ok(self.quit)
    }
}

/// fixed held-key set for testing the interpreter without a terminal
pub struct DummyInput {
    held: Vec<u8>,
}

impl DummyInput {
    pub fn new(held: &[u8]) -> Self {
        DummyInput {
            held: Vec::from(held),
        }
    }
}

impl Input for DummyInput {
    fn is_held(&mut self, key: u8) -> Result<bool, io::Error> {
        Ok(self.held.contains(&key))
    }

    fn quit_requested(&mut self) -> Result<bool, io::Error> {
        Ok(false)
    }
}
