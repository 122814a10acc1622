//! Conversions between frequency, MIDI tone and cents.
//!
//! Formulas follow the MIDI Tuning Standard: tone 69 is A4 at 440 Hz and one
//! semitone is 100 cents.

const A4_TONE: f64 = 69.0;
const A4_FREQUENCY: f64 = 440.0;

/// Half a cent, in semitones.
const TONE_TOLERANCE: f64 = 0.005;

/// Pitch wheel units per cent.
const PITCH_WHEEL_UNITS_PER_CENT: f64 = 40.96;

/// A frequency split into an integer tone and a cents offset above it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ToneCents {
    pub tone: i32,
    pub cents: i32,
}

pub fn tone_to_frequency(tone: f64) -> f64 {
    2f64.powf((tone - A4_TONE) / 12.0) * A4_FREQUENCY
}

/// Splits `freq` into tone and cents. Returns `None` for frequencies that have no tone.
///
/// The tone is rounded down, so cents are normally in `0..100`. A frequency
/// less than half a cent below a semitone counts as that semitone.
pub fn frequency_to_tone(freq: f64) -> Option<ToneCents> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    let float_tone = A4_TONE + 12.0 * (freq / A4_FREQUENCY).log2();
    let tone = (float_tone + TONE_TOLERANCE).floor();
    let cents = (1200.0 * (freq / tone_to_frequency(tone)).log2()).round();
    Some(ToneCents {
        tone: tone as i32,
        cents: cents as i32,
    })
}

pub fn cents_to_pitch_wheel_units(cents: f64) -> i32 {
    (PITCH_WHEEL_UNITS_PER_CENT * cents).round() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4() {
        assert_eq!(tone_to_frequency(69.0), 440.0);
        assert_eq!(tone_to_frequency(81.0), 880.0);
        assert_eq!(
            frequency_to_tone(440.0),
            Some(ToneCents { tone: 69, cents: 0 })
        );
    }

    #[test]
    fn test_every_tone_is_its_own_inverse() {
        for tone in 0..128 {
            let freq = tone_to_frequency(tone as f64);
            let result = frequency_to_tone(freq).unwrap();
            assert_eq!(result.tone, tone, "tone {}", tone);
            assert_eq!(result.cents, 0, "tone {}", tone);
        }
    }

    #[test]
    fn test_single_precision_frequencies_resolve() {
        // Frequencies stored in f32 tensors come back slightly off.
        for tone in 0..128 {
            let freq = (tone_to_frequency(tone as f64) / 1000.0) as f32;
            let result = frequency_to_tone(freq as f64 * 1000.0).unwrap();
            assert_eq!(result.tone, tone);
            assert_eq!(result.cents, 0);
        }
    }

    #[test]
    fn test_cents_reconstruct_frequency() {
        for &freq in &[27.5, 100.0, 261.0, 445.0, 1234.5, 9000.0] {
            let d = frequency_to_tone(freq).unwrap();
            assert!((0..100).contains(&d.cents), "{:?}", d);
            let rebuilt = tone_to_frequency(d.tone as f64 + d.cents as f64 / 100.0);
            assert!((rebuilt - freq).abs() / freq < 0.0006, "{} vs {}", rebuilt, freq);
        }
    }

    #[test]
    fn test_no_tone_for_degenerate_frequency() {
        assert_eq!(frequency_to_tone(0.0), None);
        assert_eq!(frequency_to_tone(-12.0), None);
        assert_eq!(frequency_to_tone(f64::NAN), None);
    }

    #[test]
    fn test_pitch_wheel_units() {
        assert_eq!(cents_to_pitch_wheel_units(0.0), 0);
        assert_eq!(cents_to_pitch_wheel_units(50.0), 2048);
        assert_eq!(cents_to_pitch_wheel_units(-100.0), -4096);
        assert_eq!(cents_to_pitch_wheel_units(1.0), 41);
    }
}
