//! Core Types der Rainbow HAT
//!
//! Datenstrukturen ohne I/O: LED-Farben, Buttons, Töne.

use rgb::RGB8;

use crate::error::CodecError;

/// Anzahl der LEDs auf dem Rainbow HAT Arc
pub const N_LEDS: usize = 7;

/// Alle LED-Indizes in aufsteigender Reihenfolge
pub const ALL_PINS: [usize; N_LEDS] = [0, 1, 2, 3, 4, 5, 6];

/// Hex-Code für "aus"
pub const COLOR_BLACK: &str = "000000";

const OFF_COLORS: [&str; 1] = [COLOR_BLACK];

/// Eine LED mit ihrer Farbe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LedColor {
    pub index: usize,
    pub color: RGB8,
}

/// Indizierte Farb-Zuordnung eines einzelnen Kommandos
///
/// Nicht genannte Indizes bleiben `None` und werden beim Anwenden
/// nicht verändert. Pro Index gibt es höchstens einen Eintrag
/// (ein späteres Token überschreibt ein früheres).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorMap {
    slots: [Option<RGB8>; N_LEDS],
}

impl ColorMap {
    pub const fn new() -> Self {
        Self {
            slots: [None; N_LEDS],
        }
    }

    /// Alle LEDs auf eine Farbe
    pub const fn uniform(color: RGB8) -> Self {
        Self {
            slots: [Some(color); N_LEDS],
        }
    }

    pub fn set(&mut self, index: usize, color: RGB8) -> Result<(), CodecError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(CodecError::OutOfRange(index))?;
        *slot = Some(color);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<RGB8> {
        self.slots.get(index).copied().flatten()
    }

    /// Anzahl der adressierten LEDs
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = LedColor> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|color| LedColor { index, color }))
    }
}

/// Argument für `set_leds`
///
/// Entweder strukturiert (Pins + Farben) oder bereits als Token-Stream
/// `pin:RRGGBB[,pin:RRGGBB...]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedArg<'a> {
    /// Genau eine Farbe für alle Pins, oder gleich viele Farben wie Pins
    Pins {
        pins: &'a [usize],
        colors: &'a [&'a str],
    },
    Text(&'a str),
}

impl<'a> LedArg<'a> {
    pub fn pins(pins: &'a [usize], colors: &'a [&'a str]) -> Self {
        Self::Pins { pins, colors }
    }

    /// Alle LEDs schwarz (adressiert immer jeden Pin)
    pub fn all_off() -> LedArg<'static> {
        LedArg::Pins {
            pins: &ALL_PINS,
            colors: &OFF_COLORS,
        }
    }
}

/// Die drei Buttons der Rainbow HAT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Button {
    A,
    B,
    C,
}

impl Button {
    /// Feste Prioritäts-Reihenfolge beim Dekodieren
    pub const ALL: [Button; 3] = [Button::A, Button::B, Button::C];

    pub fn name(self) -> char {
        match self {
            Button::A => 'A',
            Button::B => 'B',
            Button::C => 'C',
        }
    }

    pub fn index(self) -> usize {
        match self {
            Button::A => 0,
            Button::B => 1,
            Button::C => 2,
        }
    }
}

/// Gedrückt-Zustand der drei Buttons (Reihenfolge A, B, C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub pressed: [bool; 3],
}

impl ButtonState {
    pub const fn new(pressed: [bool; 3]) -> Self {
        Self { pressed }
    }

    /// Aus elektrischen Pegeln: die Buttons ziehen auf Low, High = losgelassen
    pub fn from_sense_levels(levels: [bool; 3]) -> Self {
        Self {
            pressed: levels.map(|high| !high),
        }
    }

    /// Nur ein Button (oder keiner)
    pub fn only(button: Button) -> Self {
        let mut state = Self::default();
        state.pressed[button.index()] = true;
        state
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.pressed[button.index()]
    }

    /// Erster gedrückter Button in der Reihenfolge A → B → C
    ///
    /// Der Multiplexer meldet nur den zuerst berührten Button; mehrere
    /// gleichzeitige Bits werden hier trotzdem kanonisch aufgelöst.
    pub fn active(&self) -> Option<Button> {
        Button::ALL
            .into_iter()
            .find(|button| self.is_pressed(*button))
    }
}

/// Frequenzen pro Button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToneMap {
    pub a: u64,
    pub b: u64,
    pub c: u64,
}

impl ToneMap {
    pub fn frequency_for(&self, button: Button) -> u64 {
        match button {
            Button::A => self.a,
            Button::B => self.b,
            Button::C => self.c,
        }
    }
}

/// PWM-Konfiguration des Buzzers in Nanosekunden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmConfig {
    pub period_ns: i32,
    pub duty_ns: i32,
}

/// Ton-Kommando: Frequenz in Hz, 0 = Stille
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToneCommand(u64);

impl ToneCommand {
    pub const SILENCE: ToneCommand = ToneCommand(0);

    const NANOS_PER_SEC: u64 = 1_000_000_000;

    pub const fn new(frequency_hz: u64) -> Self {
        Self(frequency_hz)
    }

    pub const fn hz(self) -> u64 {
        self.0
    }

    pub const fn is_silence(self) -> bool {
        self.0 == 0
    }

    /// Rechnet die Frequenz in eine PWM-Periode um
    ///
    /// - `Ok(None)`: Stille, der Ausgang wird deaktiviert (keine Division)
    /// - `Ok(Some(..))`: Periode `1e9 / f` ns, Duty Cycle 50 %
    /// - `Err(FrequencyOutOfRange)`: Periode passt nicht in `i32` oder wäre 0
    pub fn pwm(self) -> Result<Option<PwmConfig>, CodecError> {
        if self.is_silence() {
            return Ok(None);
        }
        let period = Self::NANOS_PER_SEC / self.0;
        let period_ns = i32::try_from(period).map_err(|_| CodecError::FrequencyOutOfRange)?;
        if period_ns == 0 {
            return Err(CodecError::FrequencyOutOfRange);
        }
        Ok(Some(PwmConfig {
            period_ns,
            duty_ns: period_ns / 2,
        }))
    }
}
