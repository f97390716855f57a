//! Pure Timing-Logik des Metronoms
//!
//! Funktionen ohne I/O-Abhängigkeiten (testbar!)

use core::num::NonZeroU32;
use core::time::Duration;

use crate::types::ALL_PINS;

const MICROS_PER_MINUTE: u64 = 60_000_000;

const UPPER_PINS: [usize; 3] = [4, 5, 6];
const LOWER_PINS: [usize; 3] = [0, 1, 2];

/// Dauer eines Schlags in Mikrosekunden-Auflösung (`60_000_000 / bpm`, gerundet)
///
/// # Beispiele
///
/// ```
/// # use core::num::NonZeroU32;
/// # use core::time::Duration;
/// # use hat_core::beat_duration;
/// let bpm = NonZeroU32::new(90).unwrap();
/// assert_eq!(beat_duration(bpm), Duration::from_micros(666_667));
/// ```
pub fn beat_duration(bpm: NonZeroU32) -> Duration {
    let bpm = u64::from(bpm.get());
    Duration::from_micros((MICROS_PER_MINUTE + bpm / 2) / bpm)
}

/// Drift-Korrektur: Restschlaf nach Abzug der gemessenen LED-Operationen
///
/// Nie negativ: dauern die Operationen länger als der Schlag, geht es
/// sofort weiter.
pub fn remaining_sleep(beat: Duration, elapsed: Duration) -> Duration {
    beat.saturating_sub(elapsed)
}

/// Die drei Schläge eines Takts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatPhase {
    /// Alle LEDs, Akzent-Farbe
    Downbeat,
    /// LEDs 4..7, Schlag-Farbe
    Upper,
    /// LEDs 0..3, Schlag-Farbe
    Lower,
}

impl BeatPhase {
    pub const BAR: [BeatPhase; 3] = [BeatPhase::Downbeat, BeatPhase::Upper, BeatPhase::Lower];

    pub fn pins(self) -> &'static [usize] {
        match self {
            BeatPhase::Downbeat => &ALL_PINS,
            BeatPhase::Upper => &UPPER_PINS,
            BeatPhase::Lower => &LOWER_PINS,
        }
    }

    pub fn is_accent(self) -> bool {
        self == BeatPhase::Downbeat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_duration_90_bpm() {
        let bpm = NonZeroU32::new(90).unwrap();
        assert_eq!(beat_duration(bpm), Duration::from_micros(666_667));
    }

    #[test]
    fn test_beat_duration_60_bpm() {
        let bpm = NonZeroU32::new(60).unwrap();
        assert_eq!(beat_duration(bpm), Duration::from_secs(1));
    }

    #[test]
    fn test_drift_correction() {
        let beat = Duration::from_micros(666_667);
        let elapsed = Duration::from_micros(5_000);
        assert_eq!(remaining_sleep(beat, elapsed), Duration::from_micros(661_667));
    }

    #[test]
    fn test_drift_correction_never_negative() {
        let beat = Duration::from_micros(666_667);
        let elapsed = Duration::from_micros(700_000);
        assert_eq!(remaining_sleep(beat, elapsed), Duration::ZERO);
    }

    #[test]
    fn test_phase_pins() {
        assert_eq!(BeatPhase::Downbeat.pins(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(BeatPhase::Upper.pins(), &[4, 5, 6]);
        assert_eq!(BeatPhase::Lower.pins(), &[0, 1, 2]);
        assert!(BeatPhase::Downbeat.is_accent());
        assert!(!BeatPhase::Upper.is_accent());
    }
}
