//! Fehler-Taxonomie
//!
//! Drei Ebenen:
//! - [`CodecError`]: lokale Fehler des Protocol Codecs (keine Seiteneffekte)
//! - [`Errno`]: roher Fehlercode eines Endpoints (Device-File)
//! - [`HatError`]: kategorisierter Fehler des Device Handles inkl. Peripherie

use core::fmt;

use thiserror::Error;

use crate::codec::MAX_COMMAND_LEN;

/// Fehler des Protocol Codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    /// LED-Index außerhalb von `[0, N_LEDS)`
    #[error("LED index {0} out of range")]
    OutOfRange(usize),
    /// Kein Hex-Wert, fehlender Doppelpunkt, leeres Token, ...
    #[error("malformed LED/button/tone token")]
    InvalidFormat,
    /// Eingabe länger als das Protokoll erlaubt
    #[error("command exceeds {max} bytes", max = MAX_COMMAND_LEN)]
    TooLarge,
    /// Frequenz lässt sich nicht sicher in eine PWM-Periode umrechnen
    #[error("frequency cannot be converted to a PWM period")]
    FrequencyOutOfRange,
}

/// Roher Linux-Fehlercode eines Endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Errno(pub i32);

impl Errno {
    /// Kein OS-Fehlercode verfügbar (z.B. Short Write)
    pub const OTHER: Errno = Errno(0);
    pub const EINTR: Errno = Errno(4);
    pub const EIO: Errno = Errno(5);
    pub const ENOMEM: Errno = Errno(12);
    pub const EFAULT: Errno = Errno(14);
    pub const EBUSY: Errno = Errno(16);
    pub const ENODEV: Errno = Errno(19);
    pub const EINVAL: Errno = Errno(22);
    pub const ERANGE: Errno = Errno(34);
    pub const ERESTART: Errno = Errno(85);
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "errno {}", self.0)
    }
}

/// Fehler-Kategorien des Device Handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("Invalid argument!")]
    InvalidArgument,
    #[error("Device busy!")]
    DeviceBusy,
    #[error("Insufficient memory!")]
    OutOfMemory,
    #[error("Faulty transfer between user and kernel space!")]
    FaultyTransfer,
    #[error("Device error!")]
    IoError,
    #[error("Invalid argument - validate frequency!")]
    OutOfRangeValue,
    #[error("Device already closed!")]
    Closed,
    #[error("Unexpected error occurred!")]
    Unknown,
}

impl ErrorKind {
    /// Übersetzt den Fehlercode eines Treibers in eine Kategorie
    pub fn from_errno(errno: Errno) -> Self {
        match errno {
            Errno::ENOMEM => Self::OutOfMemory,
            Errno::EBUSY | Errno::ERESTART | Errno::EINTR => Self::DeviceBusy,
            Errno::EFAULT => Self::FaultyTransfer,
            Errno::EINVAL => Self::InvalidArgument,
            Errno::EIO | Errno::ENODEV => Self::IoError,
            Errno::ERANGE => Self::OutOfRangeValue,
            _ => Self::Unknown,
        }
    }
}

/// Welche Peripherie einen Fehler ausgelöst hat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peripheral {
    Leds,
    Buttons,
    Buzzer,
}

impl fmt::Display for Peripheral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Peripheral::Leds => "LED-Device",
            Peripheral::Buttons => "Button-Device",
            Peripheral::Buzzer => "Buzzer-Device",
        })
    }
}

/// Kategorisierter Fehler einer Handle-Operation
///
/// `Display` liefert die Diagnose-Nachricht, z.B. `LED-Device: Device busy!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{peripheral}: {kind}")]
pub struct HatError {
    pub peripheral: Peripheral,
    pub kind: ErrorKind,
    /// Codec-Fehler, falls die Eingabe schon vor dem Endpoint scheiterte
    #[source]
    pub cause: Option<CodecError>,
}

impl HatError {
    pub fn new(peripheral: Peripheral, kind: ErrorKind) -> Self {
        Self {
            peripheral,
            kind,
            cause: None,
        }
    }

    /// Codec-Fehler: Frequenz-Fehler werden zu `OutOfRangeValue`, alles andere zu `InvalidArgument`
    pub fn codec(peripheral: Peripheral, cause: CodecError) -> Self {
        let kind = match cause {
            CodecError::FrequencyOutOfRange => ErrorKind::OutOfRangeValue,
            _ => ErrorKind::InvalidArgument,
        };
        Self {
            peripheral,
            kind,
            cause: Some(cause),
        }
    }

    pub fn errno(peripheral: Peripheral, errno: Errno) -> Self {
        Self::new(peripheral, ErrorKind::from_errno(errno))
    }

    pub fn closed(peripheral: Peripheral) -> Self {
        Self::new(peripheral, ErrorKind::Closed)
    }

    pub fn is_busy(&self) -> bool {
        self.kind == ErrorKind::DeviceBusy
    }
}
