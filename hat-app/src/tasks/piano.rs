// Piano Task - Input Loop: Buttons → Buzzer
use hat_core::{ErrorBuffer, HatError, RainbowHat};
use tracing::{debug, info};

use super::abort;
use crate::config::PianoConfig;
use crate::shutdown::Shutdown;

/// Piano Logic - Testbare Business Logic ohne Hardware-Abhängigkeit
///
/// Fragt die Buttons ab und spielt die Frequenz des aktiven Buttons.
/// Ohne gedrückten Button wird der Buzzer stumm geschaltet. Zwischen
/// zwei Abfragen schläft der Task das Polling-Intervall.
///
/// Lese- und Ton-Fehler sind fatal und lösen den Shutdown aus.
pub fn piano_logic<H: RainbowHat>(
    hat: &H,
    config: &PianoConfig,
    shutdown: &Shutdown,
) -> Result<(), HatError> {
    let mut diag = ErrorBuffer::new();
    let mut playing = None;

    info!("Piano started");

    while shutdown.is_running() {
        let button = match hat.read_active_button(Some(&mut diag)) {
            Ok(button) => button,
            Err(err) => return Err(abort("Reading buttons", err, &diag, shutdown)),
        };

        let frequency = button.map_or(0, |button| config.tones.frequency_for(button));
        if let Err(err) = hat.play_tone(frequency, Some(&mut diag)) {
            return Err(abort("Playing tone", err, &diag, shutdown));
        }

        if button != playing {
            match button {
                Some(button) => debug!("Button {}: {frequency} Hz", button.name()),
                None => debug!("Buzzer muted"),
            }
            playing = button;
        }

        shutdown.sleep(config.poll_interval());
    }

    info!("Piano stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use hat_core::{Button, ErrorKind, ToneCommand};

    use super::*;
    use crate::hal::SimBoard;

    #[test]
    fn test_plays_pressed_button() {
        let board = SimBoard::new();
        let hat = board.handle();
        let shutdown = Shutdown::new();
        let config = PianoConfig::default();
        board.press(Button::B);

        thread::scope(|scope| {
            let runner = scope.spawn(|| piano_logic(&hat, &config, &shutdown));
            thread::sleep(Duration::from_millis(50));
            assert_eq!(board.last_tone(), Some(ToneCommand::new(config.tones.b)));

            board.release_all();
            thread::sleep(Duration::from_millis(50));
            assert_eq!(board.last_tone(), Some(ToneCommand::SILENCE));
            assert_eq!(board.pwm(), None);

            shutdown.request();
            runner.join().unwrap().unwrap();
        });
        assert!(!shutdown.is_fatal());
    }

    #[test]
    fn test_read_error_is_fatal() {
        let board = SimBoard::new();
        let hat = board.handle();
        let shutdown = Shutdown::new();
        hat.close();

        let err = piano_logic(&hat, &PianoConfig::default(), &shutdown).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Closed);
        assert!(shutdown.is_fatal());
    }
}
