// Simuliertes Board
//
// Spielt die Treiber-Seite der drei Device-Files im Speicher nach:
// LED-Kommandos werden geparst und als 36-Byte-Frame abgelegt, Buttons
// liefern ihren Zustand als "ABC"-Bits, der Buzzer rechnet Frequenzen in
// PWM-Perioden um. Dient für `simulate: true` und für Tests ohne Hardware.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hat_core::codec::{BUTTON_BYTES, TONE_BYTES};
use hat_core::{
    Button, ButtonEndpoint, ButtonState, Errno, LedEndpoint, LedFrame, LedStrip, PwmConfig,
    ToneCommand, ToneEndpoint, decode_tone, encode_buttons, parse_command,
};
use tracing::trace;

use super::device::DeviceHandle;

/// Handle auf ein simuliertes Board
pub type SimHandle = DeviceHandle<SimLeds, SimButtons, SimBuzzer>;

#[derive(Debug, Default)]
struct SimState {
    strip: LedStrip,
    last_frame: Option<LedFrame>,
    frame_count: usize,
    buttons: ButtonState,
    pwm: Option<PwmConfig>,
    last_tone: Option<ToneCommand>,
}

/// Gemeinsamer Zustand aller Endpoints eines simulierten Boards
#[derive(Debug, Clone, Default)]
pub struct SimBoard {
    state: Arc<Mutex<SimState>>,
}

fn lock(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SimBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Device Handle auf dieses Board (der Board-Zustand bleibt geteilt)
    pub fn handle(&self) -> SimHandle {
        DeviceHandle::from_endpoints(
            SimLeds(Arc::clone(&self.state)),
            SimButtons(Arc::clone(&self.state)),
            SimBuzzer(Arc::clone(&self.state)),
        )
    }

    /// Drückt genau einen Button, alle anderen sind losgelassen
    pub fn press(&self, button: Button) {
        lock(&self.state).buttons = ButtonState::only(button);
    }

    pub fn release_all(&self) {
        lock(&self.state).buttons = ButtonState::default();
    }

    /// Setzt die elektrischen Pegel (High = losgelassen)
    pub fn set_sense_levels(&self, levels: [bool; 3]) {
        lock(&self.state).buttons = ButtonState::from_sense_levels(levels);
    }

    /// Letzter an den Strip gesendeter Frame
    pub fn last_frame(&self) -> Option<LedFrame> {
        lock(&self.state).last_frame
    }

    pub fn frame_count(&self) -> usize {
        lock(&self.state).frame_count
    }

    /// Aktuelle PWM-Konfiguration, `None` = Buzzer aus
    pub fn pwm(&self) -> Option<PwmConfig> {
        lock(&self.state).pwm
    }

    pub fn last_tone(&self) -> Option<ToneCommand> {
        lock(&self.state).last_tone
    }
}

// ============================================================================
// Endpoints
// ============================================================================

#[derive(Debug)]
pub struct SimLeds(Arc<Mutex<SimState>>);

impl LedEndpoint for SimLeds {
    fn write_command(&mut self, command: &[u8]) -> Result<usize, Errno> {
        let map = parse_command(command).map_err(|_| Errno::EINVAL)?;

        let mut state = lock(&self.0);
        state.strip.apply(&map);
        let frame = state.strip.frame();
        state.last_frame = Some(frame);
        state.frame_count += 1;
        trace!("sim frame: {:02X?}", frame);
        Ok(command.len())
    }
}

#[derive(Debug)]
pub struct SimButtons(Arc<Mutex<SimState>>);

impl ButtonEndpoint for SimButtons {
    fn read_state(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        let target = buf.get_mut(..BUTTON_BYTES).ok_or(Errno::EINVAL)?;
        target.copy_from_slice(&encode_buttons(lock(&self.0).buttons));
        Ok(BUTTON_BYTES)
    }
}

#[derive(Debug)]
pub struct SimBuzzer(Arc<Mutex<SimState>>);

impl ToneEndpoint for SimBuzzer {
    fn write_frequency(&mut self, payload: &[u8; TONE_BYTES]) -> Result<usize, Errno> {
        let tone = decode_tone(payload).map_err(|_| Errno::EINVAL)?;
        let pwm = tone.pwm().map_err(|_| Errno::ERANGE)?;

        let mut state = lock(&self.0);
        state.pwm = pwm;
        state.last_tone = Some(tone);
        trace!("sim tone: {} Hz", tone.hz());
        Ok(TONE_BYTES)
    }
}
