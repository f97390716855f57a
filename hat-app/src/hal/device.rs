// Device Handle - Besitzt die drei Endpoints der Rainbow HAT
//
// Übersetzt typisierte Operationen in genau einen Read/Write pro Aufruf
// und Low-Level-Fehler in kategorisierte HatErrors.
//
// Zugriffs-Regeln pro Endpoint:
// - Buzzer: non-blocking Single-Writer (try_lock → DeviceBusy)
// - LEDs:   der Treiber serialisiert selbst, hier nur ein normales Lock
//           für den &mut-Zugriff auf den Endpoint
// - Buttons: normales Lock
// LEDs und Buzzer werden nie gegeneinander serialisiert.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use hat_core::codec::{BUTTON_BYTES, TONE_BYTES};
use hat_core::{
    Button, ButtonEndpoint, Errno, ErrorBuffer, ErrorKind, HatError, LedArg, LedEndpoint,
    Peripheral, RainbowHat, ToneCommand, ToneEndpoint, decode_buttons, encode_command,
    encode_tone, report,
};
use tracing::{debug, trace, warn};

use super::endpoint::{FileButtons, FileBuzzer, FileLeds, errno_of};
use crate::config::DevicePaths;

/// Handle auf die echten Device-Files
pub type FileHandle = DeviceHandle<FileLeds, FileButtons, FileBuzzer>;

/// Device Handle über drei Endpoints
///
/// Ein Handle existiert nur mit allen drei Endpoints. Nach [`close`]
/// liefern alle Operationen `ErrorKind::Closed`.
///
/// [`close`]: RainbowHat::close
#[derive(Debug)]
pub struct DeviceHandle<L, B, T> {
    leds: Mutex<Option<L>>,
    buttons: Mutex<Option<B>>,
    buzzer: Mutex<Option<T>>,
}

/// Lock ohne Panic: ein vergifteter Mutex enthält trotzdem einen gültigen Endpoint
fn lock<E>(mutex: &Mutex<E>) -> MutexGuard<'_, E> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Loggt den Fehler, füllt den Diagnose-Buffer und gibt ihn zurück
fn fail<V>(err: HatError, diag: Option<&mut ErrorBuffer>) -> Result<V, HatError> {
    warn!("{err}");
    if let Err(truncated) = report(diag, &err) {
        warn!("{truncated}");
    }
    Err(err)
}

impl<L, B, T> DeviceHandle<L, B, T>
where
    L: LedEndpoint,
    B: ButtonEndpoint,
    T: ToneEndpoint,
{
    /// Übernimmt drei bereits offene Endpoints
    pub fn from_endpoints(leds: L, buttons: B, buzzer: T) -> Self {
        Self {
            leds: Mutex::new(Some(leds)),
            buttons: Mutex::new(Some(buttons)),
            buzzer: Mutex::new(Some(buzzer)),
        }
    }

    pub fn is_closed(&self) -> bool {
        lock(&self.leds).is_none() && lock(&self.buttons).is_none() && lock(&self.buzzer).is_none()
    }
}

impl FileHandle {
    /// Öffnet LEDs (write-only), Buttons (read-only) und Buzzer (write-only)
    ///
    /// Alles-oder-nichts: scheitert ein Endpoint, werden die bereits
    /// geöffneten beim Verlassen wieder geschlossen (Drop).
    pub fn open(paths: &DevicePaths, diag: Option<&mut ErrorBuffer>) -> Result<Self, HatError> {
        let opened = open_endpoint(Peripheral::Leds, &paths.leds, FileLeds::open).and_then(|leds| {
            let buttons = open_endpoint(Peripheral::Buttons, &paths.buttons, FileButtons::open)?;
            let buzzer = open_endpoint(Peripheral::Buzzer, &paths.buzzer, FileBuzzer::open)?;
            Ok(Self::from_endpoints(leds, buttons, buzzer))
        });

        match opened {
            Ok(handle) => {
                debug!("Rainbow HAT opened");
                Ok(handle)
            }
            Err(err) => fail(err, diag),
        }
    }
}

fn open_endpoint<E>(
    peripheral: Peripheral,
    path: &Path,
    open: impl FnOnce(&Path) -> std::io::Result<E>,
) -> Result<E, HatError> {
    open(path).map_err(|err| {
        warn!("{peripheral}: open {} failed: {err}", path.display());
        HatError::errno(peripheral, errno_of(&err))
    })
}

impl<L, B, T> RainbowHat for DeviceHandle<L, B, T>
where
    L: LedEndpoint,
    B: ButtonEndpoint,
    T: ToneEndpoint,
{
    fn set_leds(&self, arg: &LedArg<'_>, diag: Option<&mut ErrorBuffer>) -> Result<(), HatError> {
        // Codec-Fehler: keine Seiteneffekte, nichts wird geschrieben
        let command = match encode_command(arg) {
            Ok(command) => command,
            Err(err) => return fail(HatError::codec(Peripheral::Leds, err), diag),
        };

        let mut leds = lock(&self.leds);
        let Some(endpoint) = leds.as_mut() else {
            return fail(HatError::closed(Peripheral::Leds), diag);
        };

        match endpoint.write_command(command.as_bytes()) {
            Ok(written) if written == command.len() => {
                trace!("LEDs: {}", command);
                Ok(())
            }
            Ok(written) => {
                warn!("LED-Device: short write ({written} of {} bytes)", command.len());
                fail(HatError::errno(Peripheral::Leds, Errno::EIO), diag)
            }
            Err(errno) => fail(HatError::errno(Peripheral::Leds, errno), diag),
        }
    }

    fn play_tone(&self, frequency_hz: u64, diag: Option<&mut ErrorBuffer>) -> Result<(), HatError> {
        // Non-blocking: ein zweiter Writer bekommt sofort DeviceBusy
        let mut buzzer = match self.buzzer.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                return fail(HatError::new(Peripheral::Buzzer, ErrorKind::DeviceBusy), diag);
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        let Some(endpoint) = buzzer.as_mut() else {
            return fail(HatError::closed(Peripheral::Buzzer), diag);
        };

        let payload = encode_tone(ToneCommand::new(frequency_hz));
        match endpoint.write_frequency(&payload) {
            Ok(TONE_BYTES) => Ok(()),
            Ok(written) => {
                warn!("Buzzer-Device: short write ({written} of {TONE_BYTES} bytes)");
                fail(HatError::errno(Peripheral::Buzzer, Errno::EIO), diag)
            }
            Err(errno) => fail(HatError::errno(Peripheral::Buzzer, errno), diag),
        }
        // Guard fällt hier → Buzzer wieder frei, auch im Fehlerfall
    }

    fn read_active_button(&self, diag: Option<&mut ErrorBuffer>) -> Result<Option<Button>, HatError> {
        let mut buttons = lock(&self.buttons);
        let Some(endpoint) = buttons.as_mut() else {
            return fail(HatError::closed(Peripheral::Buttons), diag);
        };

        let mut raw = [0u8; BUTTON_BYTES];
        let read = match endpoint.read_state(&mut raw) {
            Ok(read) => read.min(BUTTON_BYTES),
            Err(errno) => return fail(HatError::errno(Peripheral::Buttons, errno), diag),
        };

        match decode_buttons(&raw[..read]) {
            Ok(state) => Ok(state.active()),
            Err(err) => fail(HatError::codec(Peripheral::Buttons, err), diag),
        }
    }

    fn close(&self) {
        let leds = lock(&self.leds).take();
        let buttons = lock(&self.buttons).take();
        let buzzer = lock(&self.buzzer).take();

        if leds.is_some() || buttons.is_some() || buzzer.is_some() {
            debug!("Rainbow HAT closed");
        }
        // Endpoints fallen hier und schließen ihre Files
    }
}

// ============================================================================
// Tests
// ============================================================================
