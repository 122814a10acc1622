use crate::error::{Error, Result};
use midly::Timing;

/// Maps a file's native ticks onto the fixed output resolution.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TickScale {
    native_ticks_per_quarter: u16,
    output_ticks_per_quarter: u32,
}

impl TickScale {
    pub fn new(native_ticks_per_quarter: u16, output_ticks_per_quarter: u32) -> Result<Self> {
        if native_ticks_per_quarter == 0 || output_ticks_per_quarter == 0 {
            return Err(Error::UnusableResolution(native_ticks_per_quarter));
        }
        Ok(TickScale {
            native_ticks_per_quarter,
            output_ticks_per_quarter,
        })
    }

    /// Like `new`, but the native resolution must be a whole multiple of the output resolution.
    pub fn exact(native_ticks_per_quarter: u16, output_ticks_per_quarter: u32) -> Result<Self> {
        let scale = Self::new(native_ticks_per_quarter, output_ticks_per_quarter)?;
        if native_ticks_per_quarter as u32 % output_ticks_per_quarter != 0 {
            return Err(Error::IncompatibleResolution {
                native: native_ticks_per_quarter,
                output: output_ticks_per_quarter,
            });
        }
        Ok(scale)
    }

    pub fn from_timing(timing: Timing, output_ticks_per_quarter: u32) -> Result<Self> {
        match timing {
            Timing::Metrical(ticks_per_beat) => {
                Self::new(ticks_per_beat.as_int(), output_ticks_per_quarter)
            }
            Timing::Timecode(_, _) => Err(Error::UnsupportedTiming),
        }
    }

    pub fn native_ticks_per_quarter(&self) -> u16 {
        self.native_ticks_per_quarter
    }

    /// Native ticks per output tick.
    pub fn factor(&self) -> f64 {
        self.native_ticks_per_quarter as f64 / self.output_ticks_per_quarter as f64
    }

    pub fn to_output(&self, native_ticks: u64) -> f64 {
        native_ticks as f64 / self.factor()
    }

    /// One quarter note in output ticks.
    pub fn quarter_note(&self) -> f64 {
        self.native_ticks_per_quarter as f64 / self.factor()
    }
}
