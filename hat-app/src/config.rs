//! Projekt-Konfiguration: Konstanten, Device-Pfade und Laufzeit-Config
//!
//! Standardwerte sind Konstanten. Zur Laufzeit kann eine JSON-Datei
//! (Pfad in `RAINBOW_HAT_CONFIG`) einzelne Werte überschreiben.

use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hat_core::{CodecError, ToneCommand, ToneMap, parse_hex_color};
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Device-Files
// ============================================================================

/// LED-Strip (write-only)
/// Kann zur Build-Zeit über RAINBOW_LEDS_DEV (.env) überschrieben werden
pub const LEDS_DEV: &str = match option_env!("RAINBOW_LEDS_DEV") {
    Some(path) => path,
    None => "/dev/rainbow_leds",
};

/// Buttons (read-only)
pub const BUTTONS_DEV: &str = match option_env!("RAINBOW_BUTTONS_DEV") {
    Some(path) => path,
    None => "/dev/rainbow_buttons",
};

/// Buzzer (write-only)
pub const BUZZER_DEV: &str = match option_env!("RAINBOW_BUZZER_DEV") {
    Some(path) => path,
    None => "/dev/rainbow_buzzer",
};

/// Environment-Variable mit dem Pfad zur JSON-Config
pub const CONFIG_ENV: &str = "RAINBOW_HAT_CONFIG";

// ============================================================================
// Metronom
// ============================================================================

/// Tempo in Schlägen pro Minute
pub const DEFAULT_BPM: NonZeroU32 = NonZeroU32::new(90).unwrap();

/// Farbe des ersten Schlags (alle LEDs)
pub const COLOR_RED: &str = "FF0000";

/// Farbe des zweiten und dritten Schlags
pub const COLOR_PURPLE: &str = "FF00FF";

/// Wie lange die LEDs pro Schlag leuchten
pub const LED_ON_DURATION_MS: u64 = 100;

// ============================================================================
// Piano
// ============================================================================

/// C4, E4, G4 in Hz
pub const FREQ_C: u64 = 262;
pub const FREQ_E: u64 = 330;
pub const FREQ_G: u64 = 392;

/// Polling-Intervall der Buttons
pub const BUTTON_POLL_INTERVAL_MS: u64 = 10;

// ============================================================================
// Shutdown
// ============================================================================

/// Längster Schlaf-Abschnitt, bevor das Shutdown-Flag erneut geprüft wird
///
/// Nie länger als das Button-Polling, sonst reagiert das Metronom
/// langsamer auf Shutdown als das Piano.
pub const SHUTDOWN_POLL_INTERVAL: Duration = Duration::from_millis(BUTTON_POLL_INTERVAL_MS);

// ============================================================================
// Laufzeit-Config
// ============================================================================

/// Fehler beim Laden der Config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid color in `{field}`")]
    Color {
        field: &'static str,
        #[source]
        source: CodecError,
    },
    #[error("invalid frequency for button {button}")]
    Frequency {
        button: char,
        #[source]
        source: CodecError,
    },
    #[error("`{0}` must be greater than zero")]
    Zero(&'static str),
}

/// Pfade der drei Device-Files
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DevicePaths {
    pub leds: PathBuf,
    pub buttons: PathBuf,
    pub buzzer: PathBuf,
}

impl Default for DevicePaths {
    fn default() -> Self {
        Self {
            leds: PathBuf::from(LEDS_DEV),
            buttons: PathBuf::from(BUTTONS_DEV),
            buzzer: PathBuf::from(BUZZER_DEV),
        }
    }
}

/// Einstellungen des Metronoms (Sequencer Loop)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetronomeConfig {
    pub bpm: NonZeroU32,
    /// Hex-Farbe `RRGGBB` für Schlag 1
    pub accent_color: String,
    /// Hex-Farbe `RRGGBB` für Schlag 2 und 3
    pub beat_color: String,
    pub on_duration_ms: u64,
}

impl MetronomeConfig {
    pub fn on_duration(&self) -> Duration {
        Duration::from_millis(self.on_duration_ms)
    }
}

impl Default for MetronomeConfig {
    fn default() -> Self {
        Self {
            bpm: DEFAULT_BPM,
            accent_color: COLOR_RED.to_owned(),
            beat_color: COLOR_PURPLE.to_owned(),
            on_duration_ms: LED_ON_DURATION_MS,
        }
    }
}

/// Einstellungen des Pianos (Input Loop)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PianoConfig {
    pub tones: ToneMap,
    pub poll_interval_ms: u64,
}

impl PianoConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for PianoConfig {
    fn default() -> Self {
        Self {
            tones: ToneMap {
                a: FREQ_C,
                b: FREQ_E,
                c: FREQ_G,
            },
            poll_interval_ms: BUTTON_POLL_INTERVAL_MS,
        }
    }
}

/// Gesamte Laufzeit-Config, jedes Feld hat einen Standardwert
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub devices: DevicePaths,
    pub metronome: MetronomeConfig,
    pub piano: PianoConfig,
    /// Simuliertes Board statt Device-Files
    pub simulate: bool,
}

impl AppConfig {
    /// Lädt die Config aus `RAINBOW_HAT_CONFIG`, sonst Standardwerte
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_owned(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Prüft Farben und Frequenzen mit dem Codec, Intervalle auf > 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        let colors = [
            ("metronome.accent_color", &self.metronome.accent_color),
            ("metronome.beat_color", &self.metronome.beat_color),
        ];
        for (field, color) in colors {
            parse_hex_color(color).map_err(|source| ConfigError::Color { field, source })?;
        }

        for (button, hz) in [
            ('A', self.piano.tones.a),
            ('B', self.piano.tones.b),
            ('C', self.piano.tones.c),
        ] {
            ToneCommand::new(hz)
                .pwm()
                .map_err(|source| ConfigError::Frequency { button, source })?;
        }

        if self.metronome.on_duration_ms == 0 {
            return Err(ConfigError::Zero("metronome.on_duration_ms"));
        }
        if self.piano.poll_interval_ms == 0 {
            return Err(ConfigError::Zero("piano.poll_interval_ms"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.metronome.bpm.get(), 90);
        assert_eq!(config.piano.tones.a, 262);
        assert_eq!(config.devices.leds, PathBuf::from(LEDS_DEV));
        assert!(!config.simulate);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_shutdown_slice_within_button_poll() {
        assert!(SHUTDOWN_POLL_INTERVAL <= Duration::from_millis(BUTTON_POLL_INTERVAL_MS));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "metronome": { "bpm": 120 }, "simulate": true }"#)
            .unwrap();
        assert_eq!(config.metronome.bpm.get(), 120);
        assert_eq!(config.metronome.accent_color, COLOR_RED);
        assert_eq!(config.piano.poll_interval_ms, BUTTON_POLL_INTERVAL_MS);
        assert!(config.simulate);
    }

    #[test]
    fn test_zero_bpm_rejected() {
        let err = AppConfig::from_json(r#"{ "metronome": { "bpm": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_invalid_color_rejected() {
        let err = AppConfig::from_json(r#"{ "metronome": { "beat_color": "purple" } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Color {
                field: "metronome.beat_color",
                source: CodecError::InvalidFormat
            }
        ));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let err = AppConfig::from_json(r#"{ "piano": { "poll_interval_ms": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Zero("piano.poll_interval_ms")));
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::from_file(Path::new("/nonexistent/rainbow.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
