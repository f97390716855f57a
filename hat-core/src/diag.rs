//! Diagnose-Buffer für Fehlermeldungen
//!
//! Feste Kapazität, vom Aufrufer bereitgestellt. Jede fehlgeschlagene
//! Operation schreibt eine mit `\n` abgeschlossene Nachricht hinein.
//! Kürzungen werden immer gemeldet.

use core::fmt::{self, Write};

use heapless::String;
use thiserror::Error;

use crate::error::HatError;

/// Kapazität des Diagnose-Buffers in Bytes
pub const ERR_BUF_SIZE: usize = 256;

/// Nachricht passte nicht vollständig in den Buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("diagnostic message truncated ({needed} bytes needed, {max} available)", max = ERR_BUF_SIZE)]
pub struct Truncated {
    pub needed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ErrorBuffer {
    text: String<ERR_BUF_SIZE>,
    truncated: bool,
}

impl ErrorBuffer {
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            truncated: false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.truncated = false;
    }

    /// Ersetzt den Inhalt durch `message` + `\n`
    ///
    /// Bei Kürzung bleibt der Anfang der Nachricht erhalten, das `\n` am
    /// Ende ist immer vorhanden.
    pub fn record(&mut self, message: impl fmt::Display) -> Result<(), Truncated> {
        self.clear();
        let mut sink = Sink {
            text: &mut self.text,
            needed: 0,
            full: false,
        };
        // Sink selbst meldet nie einen Fehler
        let _ = write!(sink, "{message}");
        let needed = sink.needed + 1;
        let _ = self.text.push('\n');

        if needed > ERR_BUF_SIZE {
            self.truncated = true;
            return Err(Truncated { needed });
        }
        Ok(())
    }

    /// Schreibt die Nachricht eines [`HatError`] inkl. Codec-Ursache
    pub fn record_error(&mut self, err: &HatError) -> Result<(), Truncated> {
        match err.cause {
            Some(cause) => self.record(format_args!("{err} ({cause})")),
            None => self.record(err),
        }
    }
}

impl fmt::Display for ErrorBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text.trim_end())
    }
}

/// Füllt einen optionalen Buffer; ohne Buffer passiert nichts
pub fn report(diag: Option<&mut ErrorBuffer>, err: &HatError) -> Result<(), Truncated> {
    match diag {
        Some(buffer) => buffer.record_error(err),
        None => Ok(()),
    }
}

/// Schreibt so viel wie passt und reserviert ein Byte für `\n`
struct Sink<'a> {
    text: &'a mut String<ERR_BUF_SIZE>,
    needed: usize,
    full: bool,
}

impl Write for Sink<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.needed += s.len();
        for c in s.chars() {
            if self.full || self.text.len() + c.len_utf8() > ERR_BUF_SIZE - 1 {
                self.full = true;
                break;
            }
            let _ = self.text.push(c);
        }
        Ok(())
    }
}
