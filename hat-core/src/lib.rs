//! Rainbow HAT Core - Codec, Logic und Traits
//!
//! Diese Crate enthält KEINE I/O.
//! Sie definiert das Wire-Protokoll der drei Device-Files, die
//! Fehler-Taxonomie, Traits und Pure Functions.

#![no_std]

pub mod codec;
pub mod diag;
pub mod error;
pub mod logic;
pub mod traits;
pub mod types;

// Re-exports für einfachen Zugriff
pub use codec::{
    CommandText, FRAME_LEN, LedFrame, LedStrip, MAX_COMMAND_LEN, decode_buttons, decode_frame,
    decode_tone, encode_buttons, encode_command, encode_frame, encode_tone, parse_command,
    parse_hex_color,
};
pub use diag::{ERR_BUF_SIZE, ErrorBuffer, Truncated, report};
pub use error::{CodecError, Errno, ErrorKind, HatError, Peripheral};
pub use logic::{BeatPhase, beat_duration, remaining_sleep};
pub use traits::{ButtonEndpoint, LedEndpoint, RainbowHat, ToneEndpoint};
pub use types::{
    ALL_PINS, Button, ButtonState, COLOR_BLACK, ColorMap, LedArg, LedColor, N_LEDS, PwmConfig,
    ToneCommand, ToneMap,
};

// RGB Farb-Typ (direkt von rgb crate)
pub use rgb::RGB8;
