//! Hardware Abstraction Traits
//!
//! Zwei Ebenen:
//! - Endpoint-Traits: rohe Byte-Streams der drei Device-Files
//! - [`RainbowHat`]: typisierte Operationen des Device Handles
//!
//! # Implementierungen
//! - **Production:** Device-Files unter `/dev/rainbow_*`
//! - **Simulation/Testing:** In-Memory Endpoints

use crate::codec::TONE_BYTES;
use crate::diag::ErrorBuffer;
use crate::error::{Errno, HatError};
use crate::types::{Button, LedArg};

/// Schreib-Endpoint des LED-Strips (write-only)
pub trait LedEndpoint: Send {
    /// Genau ein Write des Kommando-Texts, liefert geschriebene Bytes
    fn write_command(&mut self, command: &[u8]) -> Result<usize, Errno>;
}

/// Lese-Endpoint der Buttons (read-only)
pub trait ButtonEndpoint: Send {
    fn read_state(&mut self, buf: &mut [u8]) -> Result<usize, Errno>;
}

/// Schreib-Endpoint des Buzzers (write-only)
pub trait ToneEndpoint: Send {
    fn write_frequency(&mut self, payload: &[u8; TONE_BYTES]) -> Result<usize, Errno>;
}

/// Capability-Set der Rainbow HAT
///
/// Alle Operationen nehmen `&self`, damit mehrere Tasks denselben Handle
/// teilen können. Schlägt eine Operation fehl und ist ein [`ErrorBuffer`]
/// übergeben, enthält er danach die Diagnose-Nachricht.
pub trait RainbowHat: Sync {
    fn set_leds(&self, arg: &LedArg<'_>, diag: Option<&mut ErrorBuffer>) -> Result<(), HatError>;

    /// Alle LEDs aus (adressiert immer jeden Pin)
    fn clear_leds(&self, diag: Option<&mut ErrorBuffer>) -> Result<(), HatError> {
        self.set_leds(&LedArg::all_off(), diag)
    }

    /// Spielt eine Frequenz, 0 schaltet den Buzzer stumm
    ///
    /// Blockiert nie: ist der Buzzer belegt, kommt sofort `DeviceBusy`.
    fn play_tone(&self, frequency_hz: u64, diag: Option<&mut ErrorBuffer>) -> Result<(), HatError>;

    fn read_active_button(&self, diag: Option<&mut ErrorBuffer>) -> Result<Option<Button>, HatError>;

    /// Gibt alle Endpoints frei (idempotent)
    fn close(&self);
}
