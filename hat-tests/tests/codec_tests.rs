//! Integration Tests für den Protocol Codec
//!
//! Feste Beispiele plus Property-Tests (proptest) für die Invarianten:
//! konstante Frame-Länge, höchstens ein aktiver Button, Pin-Bereich.

use hat_core::codec::TONE_BYTES;
use hat_core::{
    Button, ButtonState, CodecError, FRAME_LEN, LedArg, LedStrip, N_LEDS, ToneCommand,
    decode_buttons, decode_frame, decode_tone, encode_buttons, encode_command, encode_tone,
    parse_command,
};
use proptest::prelude::*;
use rgb::RGB8;

// ============================================================================
// Helper
// ============================================================================

/// Text → Strip → Frame, so wie der Treiber es macht
fn render(strip: &mut LedStrip, arg: &LedArg<'_>) -> [u8; FRAME_LEN] {
    let text = encode_command(arg).unwrap();
    strip.apply(&parse_command(text.as_bytes()).unwrap());
    strip.frame()
}

// ============================================================================
// Tests: LED Frame
// ============================================================================

#[test]
fn test_pins_one_and_three() {
    let mut strip = LedStrip::new();
    let frame = render(&mut strip, &LedArg::pins(&[1, 3], &["ABCDEF", "FEDCBA"]));

    let mut expected = vec![0x00; 4];
    for led in 0..N_LEDS {
        let block = match led {
            1 => [0xFF, 0xEF, 0xCD, 0xAB],
            3 => [0xFF, 0xBA, 0xDC, 0xFE],
            _ => [0xFF, 0x00, 0x00, 0x00],
        };
        expected.extend_from_slice(&block);
    }
    expected.extend_from_slice(&[0xFF; 4]);

    assert_eq!(frame.to_vec(), expected);
}

#[test]
fn test_clear_twice_is_identical() {
    let mut strip = LedStrip::new();
    render(&mut strip, &LedArg::pins(&[0, 6], &["123456"]));

    let first = render(&mut strip, &LedArg::all_off());
    let second = render(&mut strip, &LedArg::all_off());
    assert_eq!(first, second);
    assert_eq!(decode_frame(&first).unwrap(), [RGB8::default(); N_LEDS]);
}

#[test]
fn test_pin_seven_is_rejected() {
    assert_eq!(
        encode_command(&LedArg::pins(&[7], &["FF0000"])),
        Err(CodecError::OutOfRange(7))
    );
    assert_eq!(parse_command(b"7:FF0000"), Err(CodecError::OutOfRange(7)));
}

#[test]
fn test_one_color_for_many_pins() {
    let text = encode_command(&LedArg::pins(&[4, 5, 6], &["FF00FF"])).unwrap();
    assert_eq!(text.as_str(), "4:FF00FF,5:FF00FF,6:FF00FF");
}

#[test]
fn test_color_count_mismatch() {
    assert_eq!(
        encode_command(&LedArg::pins(&[1, 2, 3], &["FF0000", "00FF00"])),
        Err(CodecError::InvalidFormat)
    );
}

#[test]
fn test_text_command_is_validated() {
    assert_eq!(
        encode_command(&LedArg::Text("2:00FF00,5:GG0000")),
        Err(CodecError::InvalidFormat)
    );
    let text = encode_command(&LedArg::Text("2:00FF00\n")).unwrap();
    assert_eq!(text.as_str(), "2:00FF00");
}

#[test]
fn test_oversized_command() {
    let long = "0:000000,".repeat(8);
    assert_eq!(parse_command(long.as_bytes()), Err(CodecError::TooLarge));
}

// ============================================================================
// Tests: Buttons
// ============================================================================

#[test]
fn test_all_pressed_yields_a() {
    let state = ButtonState::from_sense_levels([false, false, false]);
    assert_eq!(state.active(), Some(Button::A));
    assert_eq!(decode_buttons(&encode_buttons(state)).unwrap().active(), Some(Button::A));
}

#[test]
fn test_button_garbage() {
    assert_eq!(decode_buttons(b"0x1"), Err(CodecError::InvalidFormat));
    assert_eq!(decode_buttons(b""), Err(CodecError::InvalidFormat));
}

// ============================================================================
// Tests: Buzzer
// ============================================================================

#[test]
fn test_zero_frequency_disables() {
    let tone = decode_tone(&encode_tone(ToneCommand::SILENCE)).unwrap();
    assert!(tone.is_silence());
    assert_eq!(tone.pwm(), Ok(None));
}

#[test]
fn test_tone_payload_width() {
    assert_eq!(encode_tone(ToneCommand::new(440)).len(), TONE_BYTES);
    assert_eq!(decode_tone(&[0; 4]), Err(CodecError::InvalidFormat));
}

// ============================================================================
// Property Tests
// ============================================================================

fn hex_color() -> impl Strategy<Value = String> {
    "[0-9a-fA-F]{6}"
}

proptest! {
    /// Egal wie viele Pins ein Kommando setzt: der Frame hat immer 36 Bytes
    #[test]
    fn frame_length_is_constant(
        pins in proptest::sample::subsequence((0..N_LEDS).collect::<Vec<_>>(), 1..=N_LEDS),
        color in hex_color(),
    ) {
        let colors = [color.as_str()];
        let mut strip = LedStrip::new();
        let frame = render(&mut strip, &LedArg::pins(&pins, &colors));
        prop_assert_eq!(frame.len(), FRAME_LEN);
        prop_assert_eq!(&frame[..4], &[0u8; 4]);
        prop_assert_eq!(&frame[FRAME_LEN - 4..], &[0xFFu8; 4]);
    }

    /// Unbenannte LEDs behalten ihren Wert
    #[test]
    fn unnamed_leds_keep_value(pin in 0..N_LEDS, color in hex_color()) {
        let mut strip = LedStrip::new();
        render(&mut strip, &LedArg::pins(&[pin], &[color.as_str()]));
        let before = *strip.leds();
        let other = (pin + 1) % N_LEDS;
        render(&mut strip, &LedArg::pins(&[other], &["010203"]));
        for led in (0..N_LEDS).filter(|&led| led != other) {
            prop_assert_eq!(strip.leds()[led], before[led]);
        }
    }

    /// Pins außerhalb des Bereichs werden nie geklemmt
    #[test]
    fn out_of_range_pins_fail(pin in N_LEDS..10_000usize) {
        prop_assert_eq!(
            encode_command(&LedArg::pins(&[pin], &["FFFFFF"])),
            Err(CodecError::OutOfRange(pin))
        );
    }

    /// Höchstens ein Button ist aktiv, und zwar der erste gedrückte
    #[test]
    fn at_most_one_active_button(pressed in proptest::array::uniform3(any::<bool>())) {
        let state = decode_buttons(&encode_buttons(ButtonState::new(pressed))).unwrap();
        let expected = Button::ALL.into_iter().find(|b| pressed[b.index()]);
        prop_assert_eq!(state.active(), expected);
    }

    /// Beliebige Bytes bringen den Parser nie zum Panic
    #[test]
    fn parser_never_panics(input in proptest::collection::vec(any::<u8>(), 0..100)) {
        let _ = parse_command(&input);
    }

    /// Jede Frequenz ≠ 0, die konvertiert werden kann, hat 50 % Duty Cycle
    #[test]
    fn pwm_duty_is_half_period(hz in 1u64..=1_000_000_000) {
        if let Ok(Some(pwm)) = ToneCommand::new(hz).pwm() {
            prop_assert!(pwm.period_ns > 0);
            prop_assert_eq!(pwm.duty_ns, pwm.period_ns / 2);
        }
    }
}
