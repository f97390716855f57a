// Metronom Task - Sequencer Loop über die LEDs
use std::time::Instant;

use hat_core::{BeatPhase, ErrorBuffer, HatError, LedArg, RainbowHat, beat_duration, remaining_sleep};
use tracing::{debug, info};

use super::abort;
use crate::config::MetronomeConfig;
use crate::shutdown::Shutdown;

/// Metronom Logic - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Spielt einen 3/4-Takt auf den LEDs, solange der Shutdown Coordinator
/// "keep running" meldet:
/// 1. Schlag: alle LEDs, Akzent-Farbe
/// 2. Schlag: LEDs 4..7, Schlag-Farbe
/// 3. Schlag: LEDs 0..3, Schlag-Farbe
///
/// Pro Schlag wird die Zeit für LEDs an, Leuchtdauer und LEDs aus
/// gemessen und vom Schlag abgezogen (Drift-Korrektur). Dauert das
/// länger als ein Schlag, geht es ohne Pause weiter.
///
/// # Fehlerbehandlung
/// Jeder LED-Fehler ist fatal: Diagnose loggen, Shutdown auslösen,
/// Fehler zurückgeben. Kein Retry.
pub fn metronome_logic<H: RainbowHat>(
    hat: &H,
    config: &MetronomeConfig,
    shutdown: &Shutdown,
) -> Result<(), HatError> {
    let beat = beat_duration(config.bpm);
    let on_duration = config.on_duration();
    let mut diag = ErrorBuffer::new();

    info!("Metronome started: {} BPM", config.bpm);

    'bars: while shutdown.is_running() {
        for phase in BeatPhase::BAR {
            if !shutdown.is_running() {
                break 'bars;
            }

            let color = if phase.is_accent() {
                config.accent_color.as_str()
            } else {
                config.beat_color.as_str()
            };
            let colors = [color];

            let started = Instant::now();
            if let Err(err) = hat.set_leds(&LedArg::pins(phase.pins(), &colors), Some(&mut diag)) {
                return Err(abort("LEDs on", err, &diag, shutdown));
            }

            let held = shutdown.sleep(on_duration);

            if let Err(err) = hat.clear_leds(Some(&mut diag)) {
                return Err(abort("LEDs off", err, &diag, shutdown));
            }
            if !held {
                break 'bars;
            }

            let sleep = remaining_sleep(beat, started.elapsed());
            debug!("{phase:?}: sleeping {sleep:?}");
            if !shutdown.sleep(sleep) {
                break 'bars;
            }
        }
    }

    info!("Metronome stopped");
    Ok(())
}
