//! Protocol Codec
//!
//! Pure Funktionen für die drei Device-Files der Rainbow HAT:
//!
//! - **LEDs:** Text `pin:RRGGBB[,pin:RRGGBB...]` → [`ColorMap`] → [`LedFrame`]
//! - **Buttons:** 3 ASCII-Zeichen `'0'`/`'1'` → aktiver Button
//! - **Buzzer:** Frequenz als `u64` (8 Bytes, native Byte-Order)
//!
//! Kein Modul-globaler Zustand: jeder Aufruf arbeitet auf eigenen Buffern.
//!
//! ## LED-Frame (SPI)
//!
//! ```text
//! ┌────────────┬──────────────────────────────┬────────────┐
//! │ Start      │ 7 × [0xFF, B, G, R]          │ Ende       │
//! │ 4 × 0x00   │ 28 Bytes                     │ 4 × 0xFF   │
//! └────────────┴──────────────────────────────┴────────────┘
//! ```

use core::fmt::Write;

use heapless::String;
use rgb::RGB8;

use crate::error::CodecError;
use crate::types::{ButtonState, ColorMap, LedArg, N_LEDS, ToneCommand};

/// Anzahl Start-Bytes (0x00) eines Frames
pub const START_BYTES: usize = 4;
/// Bytes pro LED: Helligkeit, Blau, Grün, Rot
pub const BYTES_PER_LED: usize = 4;
/// Anzahl End-Bytes (0xFF) eines Frames
pub const END_BYTES: usize = 4;
/// Frame-Länge ist immer gleich, egal wie viele LEDs ein Kommando setzt
pub const FRAME_LEN: usize = START_BYTES + N_LEDS * BYTES_PER_LED + END_BYTES;

/// Maximale Länge eines LED-Kommandos in Bytes
pub const MAX_COMMAND_LEN: usize = 70;

/// Obere 3 Bits des Helligkeits-Bytes sind immer gesetzt
pub const LED_BRIGHTNESS: u8 = 0xE0;
/// Maximale globale Helligkeit (untere 5 Bits)
pub const MAX_BRIGHTNESS: u8 = 0x1F;

/// Bytes, die der Button-Endpoint pro Read liefert
pub const BUTTON_BYTES: usize = 3;
/// Breite der Frequenz auf dem Buzzer-Endpoint
pub const TONE_BYTES: usize = 8;

/// Ein kompletter SPI-Frame für den LED-Strip
pub type LedFrame = [u8; FRAME_LEN];

/// Validierter LED-Text, wie er auf den Endpoint geschrieben wird
pub type CommandText = String<MAX_COMMAND_LEN>;

// ============================================================================
// LEDs: Text
// ============================================================================

/// Parst genau 6 Hex-Ziffern `RRGGBB`
pub fn parse_hex_color(token: &str) -> Result<RGB8, CodecError> {
    let bytes = token.as_bytes();
    if bytes.len() != 6 || !bytes.iter().all(u8::is_ascii_hexdigit) {
        return Err(CodecError::InvalidFormat);
    }
    let value = u32::from_str_radix(token, 16).map_err(|_| CodecError::InvalidFormat)?;
    let [_, r, g, b] = value.to_be_bytes();
    Ok(RGB8 { r, g, b })
}

/// Parst einen LED-Index (nur Dezimalziffern)
fn parse_pin(token: &str) -> Result<usize, CodecError> {
    // Mehr als 9 Ziffern sind sicher kein gültiger Index
    if token.is_empty() || token.len() > 9 || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CodecError::InvalidFormat);
    }
    let pin: usize = token.parse().map_err(|_| CodecError::InvalidFormat)?;
    if pin >= N_LEDS {
        return Err(CodecError::OutOfRange(pin));
    }
    Ok(pin)
}

/// Baut aus einem [`LedArg`] den Text für den LED-Endpoint
///
/// Validiert alles, was auch der Treiber prüft, bevor ein Byte geschrieben wird:
/// Pin-Bereich, Hex-Format und Gesamtlänge. Bei Fehlern entsteht kein Text.
///
/// # Beispiele
///
/// ```
/// # use hat_core::{LedArg, encode_command};
/// let text = encode_command(&LedArg::pins(&[1, 3], &["ABCDEF", "FEDCBA"])).unwrap();
/// assert_eq!(text.as_str(), "1:ABCDEF,3:FEDCBA");
/// ```
pub fn encode_command(arg: &LedArg<'_>) -> Result<CommandText, CodecError> {
    match *arg {
        LedArg::Text(text) => {
            // Prüfen wie der Treiber (toleriert genau ein '\n'), dann ohne '\n' schreiben
            parse_command(text.as_bytes())?;
            let text = text.strip_suffix('\n').unwrap_or(text);
            let mut out = CommandText::new();
            out.push_str(text).map_err(|_| CodecError::TooLarge)?;
            Ok(out)
        }
        LedArg::Pins { pins, colors } => {
            if pins.is_empty() || colors.is_empty() {
                return Err(CodecError::InvalidFormat);
            }
            if pins.len() > N_LEDS || colors.len() > N_LEDS {
                return Err(CodecError::TooLarge);
            }
            // Entweder eine Farbe für alle oder eine pro Pin
            if colors.len() != 1 && colors.len() != pins.len() {
                return Err(CodecError::InvalidFormat);
            }

            let mut out = CommandText::new();
            for (idx, &pin) in pins.iter().enumerate() {
                let color = colors[idx.min(colors.len() - 1)];
                if pin >= N_LEDS {
                    return Err(CodecError::OutOfRange(pin));
                }
                parse_hex_color(color)?;
                let sep = if idx > 0 { "," } else { "" };
                write!(out, "{sep}{pin}:{color}").map_err(|_| CodecError::TooLarge)?;
            }
            Ok(out)
        }
    }
}

/// Parst den Text eines LED-Kommandos (Treiber-Seite)
///
/// Ein einzelnes abschließendes `\n` wird toleriert. Leere Eingaben,
/// fehlende Doppelpunkte, Nicht-Hex-Farben oder Zeichen hinter der Farbe
/// sind `InvalidFormat`.
pub fn parse_command(input: &[u8]) -> Result<ColorMap, CodecError> {
    if input.len() > MAX_COMMAND_LEN {
        return Err(CodecError::TooLarge);
    }
    let text = core::str::from_utf8(input).map_err(|_| CodecError::InvalidFormat)?;
    let text = text.strip_suffix('\n').unwrap_or(text);
    if text.is_empty() {
        return Err(CodecError::InvalidFormat);
    }

    let mut map = ColorMap::new();
    for token in text.split(',') {
        let (pin, color) = token.split_once(':').ok_or(CodecError::InvalidFormat)?;
        let pin = parse_pin(pin)?;
        map.set(pin, parse_hex_color(color)?)?;
    }
    Ok(map)
}

// ============================================================================
// LEDs: Frame
// ============================================================================

/// Serialisiert den kompletten Strip in einen SPI-Frame
///
/// Kanal-Reihenfolge im Frame ist B, G, R (umgekehrt zu `RRGGBB`).
pub fn encode_frame(leds: &[RGB8; N_LEDS]) -> LedFrame {
    let mut frame = [0u8; FRAME_LEN];
    let body = &mut frame[START_BYTES..FRAME_LEN - END_BYTES];
    for (block, led) in body.chunks_exact_mut(BYTES_PER_LED).zip(leds) {
        block.copy_from_slice(&[LED_BRIGHTNESS | MAX_BRIGHTNESS, led.b, led.g, led.r]);
    }
    frame[FRAME_LEN - END_BYTES..].fill(0xFF);
    frame
}

/// Liest die LED-Farben aus einem Frame zurück
pub fn decode_frame(frame: &LedFrame) -> Result<[RGB8; N_LEDS], CodecError> {
    let (start, rest) = frame.split_at(START_BYTES);
    let (body, end) = rest.split_at(N_LEDS * BYTES_PER_LED);
    if start.iter().any(|&b| b != 0x00) || end.iter().any(|&b| b != 0xFF) {
        return Err(CodecError::InvalidFormat);
    }

    let mut leds = [RGB8::default(); N_LEDS];
    for (led, block) in leds.iter_mut().zip(body.chunks_exact(BYTES_PER_LED)) {
        let &[brightness, b, g, r] = block else {
            return Err(CodecError::InvalidFormat);
        };
        if brightness != LED_BRIGHTNESS | MAX_BRIGHTNESS {
            return Err(CodecError::InvalidFormat);
        }
        *led = RGB8 { r, g, b };
    }
    Ok(leds)
}

/// Zustand des LED-Strips, wie ihn der Treiber hält
///
/// Kommandos ändern nur die genannten Indizes, der Rest behält seinen
/// letzten Wert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedStrip {
    leds: [RGB8; N_LEDS],
}

impl LedStrip {
    pub const fn new() -> Self {
        Self {
            leds: [RGB8 { r: 0, g: 0, b: 0 }; N_LEDS],
        }
    }

    pub fn apply(&mut self, map: &ColorMap) {
        for led in map.iter() {
            self.leds[led.index] = led.color;
        }
    }

    pub fn leds(&self) -> &[RGB8; N_LEDS] {
        &self.leds
    }

    pub fn frame(&self) -> LedFrame {
        encode_frame(&self.leds)
    }
}

// ============================================================================
// Buttons
// ============================================================================

/// Dekodiert die 3 ASCII-Zeichen des Button-Endpoints (`'1'` = gedrückt)
pub fn decode_buttons(raw: &[u8]) -> Result<ButtonState, CodecError> {
    let raw = raw.get(..BUTTON_BYTES).ok_or(CodecError::InvalidFormat)?;
    let mut state = ButtonState::default();
    for (pressed, byte) in state.pressed.iter_mut().zip(raw) {
        *pressed = match byte {
            b'1' => true,
            b'0' => false,
            _ => return Err(CodecError::InvalidFormat),
        };
    }
    Ok(state)
}

/// Gegenstück zu [`decode_buttons`] (Treiber-Seite)
pub fn encode_buttons(state: ButtonState) -> [u8; BUTTON_BYTES] {
    state.pressed.map(|pressed| if pressed { b'1' } else { b'0' })
}

// ============================================================================
// Buzzer
// ============================================================================

pub fn encode_tone(tone: ToneCommand) -> [u8; TONE_BYTES] {
    tone.hz().to_ne_bytes()
}

/// Payload muss exakt [`TONE_BYTES`] lang sein
pub fn decode_tone(payload: &[u8]) -> Result<ToneCommand, CodecError> {
    let bytes: [u8; TONE_BYTES] = payload.try_into().map_err(|_| CodecError::InvalidFormat)?;
    Ok(ToneCommand::new(u64::from_ne_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ALL_PINS, Button};

    #[test]
    fn test_frame_length_is_constant() {
        assert_eq!(FRAME_LEN, 36);
        assert_eq!(LedStrip::new().frame().len(), 36);
    }

    #[test]
    fn test_frame_for_pins_one_and_three() {
        let map = parse_command(b"1:ABCDEF,3:FEDCBA").unwrap();
        let mut strip = LedStrip::new();
        strip.apply(&map);
        let frame = strip.frame();

        assert_eq!(&frame[..4], &[0, 0, 0, 0]);
        // LED 0: schwarz, aber Helligkeits-Byte gesetzt
        assert_eq!(&frame[4..8], &[0xFF, 0x00, 0x00, 0x00]);
        // LED 1: B, G, R
        assert_eq!(&frame[8..12], &[0xFF, 0xEF, 0xCD, 0xAB]);
        assert_eq!(&frame[12..16], &[0xFF, 0x00, 0x00, 0x00]);
        // LED 3
        assert_eq!(&frame[16..20], &[0xFF, 0xBA, 0xDC, 0xFE]);
        assert_eq!(&frame[32..], &[0xFF; 4]);
    }

    #[test]
    fn test_unnamed_leds_keep_their_value() {
        let mut strip = LedStrip::new();
        strip.apply(&parse_command(b"0:FF0000,6:00FF00").unwrap());
        strip.apply(&parse_command(b"6:0000FF").unwrap());
        assert_eq!(strip.leds()[0], RGB8::new(0xFF, 0, 0));
        assert_eq!(strip.leds()[6], RGB8::new(0, 0, 0xFF));
    }

    #[test]
    fn test_decode_frame_round_trip() {
        let mut strip = LedStrip::new();
        strip.apply(&parse_command(b"2:123456").unwrap());
        assert_eq!(decode_frame(&strip.frame()).unwrap(), *strip.leds());
    }

    #[test]
    fn test_decode_frame_rejects_bad_marker() {
        let mut frame = LedStrip::new().frame();
        frame[FRAME_LEN - 1] = 0x00;
        assert_eq!(decode_frame(&frame), Err(CodecError::InvalidFormat));
    }

    #[test]
    fn test_parse_out_of_range() {
        assert_eq!(parse_command(b"7:FFFFFF"), Err(CodecError::OutOfRange(7)));
    }

    #[test]
    fn test_parse_invalid_tokens() {
        assert_eq!(parse_command(b"1:GGGGGG"), Err(CodecError::InvalidFormat));
        assert_eq!(parse_command(b"1FFFFFF"), Err(CodecError::InvalidFormat));
        assert_eq!(parse_command(b"1:FFFFF"), Err(CodecError::InvalidFormat));
        assert_eq!(parse_command(b"-1:FFFFFF"), Err(CodecError::InvalidFormat));
        assert_eq!(parse_command(b"1:FFFFFF,"), Err(CodecError::InvalidFormat));
        assert_eq!(parse_command(b""), Err(CodecError::InvalidFormat));
    }

    #[test]
    fn test_parse_tolerates_trailing_newline() {
        let map = parse_command(b"4:00ff00\n").unwrap();
        assert_eq!(map.get(4), Some(RGB8::new(0, 0xFF, 0)));
    }

    #[test]
    fn test_parse_too_large() {
        let input = [b'0'; MAX_COMMAND_LEN + 1];
        assert_eq!(parse_command(&input), Err(CodecError::TooLarge));
    }

    #[test]
    fn test_encode_single_color_for_all_pins() {
        let text = encode_command(&LedArg::pins(&[4, 5, 6], &["FF00FF"])).unwrap();
        assert_eq!(text.as_str(), "4:FF00FF,5:FF00FF,6:FF00FF");
    }

    #[test]
    fn test_encode_all_off_fits() {
        let text = encode_command(&LedArg::all_off()).unwrap();
        assert_eq!(
            text.as_str(),
            "0:000000,1:000000,2:000000,3:000000,4:000000,5:000000,6:000000"
        );
        assert_eq!(parse_command(text.as_bytes()).unwrap().len(), ALL_PINS.len());
    }

    #[test]
    fn test_encode_rejects_mismatched_colors() {
        let err = encode_command(&LedArg::pins(&[0, 1, 2], &["FF0000", "00FF00"]));
        assert_eq!(err, Err(CodecError::InvalidFormat));
    }

    #[test]
    fn test_encode_rejects_pin_seven() {
        let err = encode_command(&LedArg::pins(&[7], &["FF0000"]));
        assert_eq!(err, Err(CodecError::OutOfRange(7)));
    }

    #[test]
    fn test_encode_text_is_validated() {
        assert!(encode_command(&LedArg::Text("0:FF0000,3:00FF00")).is_ok());
        assert_eq!(
            encode_command(&LedArg::Text("0:FF0000,9:00FF00")),
            Err(CodecError::OutOfRange(9))
        );
    }

    #[test]
    fn test_encode_text_strips_one_newline() {
        let text = encode_command(&LedArg::Text("0:FF0000\n")).unwrap();
        assert_eq!(text.as_str(), "0:FF0000");
        assert_eq!(
            encode_command(&LedArg::Text("0:FF0000\n\n")),
            Err(CodecError::InvalidFormat)
        );
    }

    #[test]
    fn test_buttons_decode() {
        assert_eq!(decode_buttons(b"111").unwrap().active(), Some(Button::A));
        assert_eq!(decode_buttons(b"001").unwrap().active(), Some(Button::C));
        assert_eq!(decode_buttons(b"000").unwrap().active(), None);
        assert_eq!(decode_buttons(b"01"), Err(CodecError::InvalidFormat));
        assert_eq!(decode_buttons(b"0x0"), Err(CodecError::InvalidFormat));
    }

    #[test]
    fn test_buttons_encode() {
        assert_eq!(&encode_buttons(ButtonState::only(Button::B)), b"010");
    }

    #[test]
    fn test_tone_payload() {
        let payload = encode_tone(ToneCommand::new(392));
        assert_eq!(payload.len(), TONE_BYTES);
        assert_eq!(decode_tone(&payload), Ok(ToneCommand::new(392)));
        assert_eq!(decode_tone(&payload[..4]), Err(CodecError::InvalidFormat));
    }
}
