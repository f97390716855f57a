//! Shutdown Coordinator
//!
//! Ein prozessweites Abbruch-Token, das beide Tasks bei der Konstruktion
//! bekommen. Es gibt keinen globalen Zustand: der Besitzer (main) teilt
//! das Token per Referenz bzw. `Arc` mit Tasks und Signal-Handler.

use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::SHUTDOWN_POLL_INTERVAL;

#[derive(Debug)]
pub struct Shutdown {
    keep_running: AtomicBool,
    fatal: AtomicBool,
}

impl Shutdown {
    /// Startet im Zustand "keep running"
    pub const fn new() -> Self {
        Self {
            keep_running: AtomicBool::new(true),
            fatal: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.keep_running.load(Ordering::Acquire)
    }

    /// Regulärer Shutdown (z.B. SIGINT/SIGTERM)
    pub fn request(&self) {
        if self.keep_running.swap(false, Ordering::AcqRel) {
            debug!("Shutdown requested");
        }
    }

    /// Fataler Fehler in einem Task: alle Tasks beenden, Exit-Code != 0
    pub fn abort(&self) {
        self.fatal.store(true, Ordering::Release);
        if self.keep_running.swap(false, Ordering::AcqRel) {
            warn!("Fatal error, shutting down all tasks");
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal.load(Ordering::Acquire)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.is_fatal() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    /// Schläft `duration`, wacht aber spätestens alle
    /// [`SHUTDOWN_POLL_INTERVAL`] auf und bricht bei Shutdown ab
    ///
    /// Gibt `true` zurück, wenn der volle Schlaf ohne Shutdown verstrich.
    /// Schläft gegen eine feste Deadline, damit sich die Abschnitte nicht
    /// zu Drift aufaddieren.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if !self.is_running() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep((deadline - now).min(SHUTDOWN_POLL_INTERVAL));
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
