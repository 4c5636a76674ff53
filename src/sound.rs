use beep::beep;
use std::io;

/// The audio collaborator. The interpreter reports the sound-timer state
/// once per tick; implementations decide what "sounding" means.
pub trait Sound {
    fn set_sounding(&mut self, on: bool) -> Result<(), io::Error>;
}

const SIMPLEBEEP_PITCH: u16 = 440; // A above middle C

/// square-wave beep on the PC speaker, gated on state transitions so the
/// tick path only touches the device when the timer crosses zero
pub struct SimpleBeep {
    is_beeping: bool,
}

impl SimpleBeep {
    pub fn new() -> Self {
        SimpleBeep { is_beeping: false }
    }
}

impl Sound for SimpleBeep {
    fn set_sounding(&mut self, on: bool) -> Result<(), io::Error> {
        if on == self.is_beeping {
            return Ok(());
        }
        let pitch = if on { SIMPLEBEEP_PITCH } else { 0 };
        beep(pitch).map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        self.is_beeping = on;
        Ok(())
    }
}

impl Drop for SimpleBeep {
    fn drop(&mut self) {
        // leave the speaker quiet whatever state we died in
        let _ = beep(0);
    }
}

pub struct Mute {}
impl Mute {
    pub fn new() -> Self {
        Mute {}
    }
}
impl Sound for Mute {
    fn set_sounding(&mut self, _on: bool) -> Result<(), io::Error> {
        Ok(())
    }
}
