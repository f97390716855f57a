// Task-Modul: Metronom und Piano
//
// Beide Tasks laufen als eigene Threads auf demselben Device Handle.
// Sie kommunizieren nur über den Shutdown Coordinator.

use std::io;
use std::thread::{self, ScopedJoinHandle};

use hat_core::{ErrorBuffer, HatError, RainbowHat};
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::shutdown::Shutdown;

pub mod metronome;
pub mod piano;

// Re-export Tasks für einfachen Import
pub use metronome::metronome_logic;
pub use piano::piano_logic;

/// Ergebnis eines einzelnen Tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    /// Regulär beendet (Shutdown angefordert)
    Finished,
    Failed(HatError),
    Panicked,
    /// Thread konnte nicht gestartet werden
    NotStarted,
}

impl TaskOutcome {
    pub fn is_clean(&self) -> bool {
        *self == TaskOutcome::Finished
    }
}

/// Ergebnisse beider Tasks nach dem Join
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    pub metronome: TaskOutcome,
    pub piano: TaskOutcome,
}

impl TaskReport {
    pub fn is_clean(&self) -> bool {
        self.metronome.is_clean() && self.piano.is_clean()
    }
}

/// Fataler Task-Fehler: Diagnose loggen, alle Tasks beenden
pub(crate) fn abort(step: &str, err: HatError, diag: &ErrorBuffer, shutdown: &Shutdown) -> HatError {
    error!("{step} failed: {diag}");
    shutdown.abort();
    err
}

/// Startet Metronom und Piano parallel und wartet auf beide
///
/// Kehrt erst zurück, wenn beide Threads beendet sind. Ein Panic oder
/// ein nicht startbarer Thread zählt wie ein fataler Fehler und setzt
/// den Shutdown sofort, nicht erst beim Join.
pub fn run_tasks<H: RainbowHat>(hat: &H, config: &AppConfig, shutdown: &Shutdown) -> TaskReport {
    thread::scope(|scope| {
        let metronome = thread::Builder::new()
            .name("metronome".into())
            .spawn_scoped(scope, || {
                guarded(shutdown, || metronome_logic(hat, &config.metronome, shutdown))
            });
        let piano = thread::Builder::new()
            .name("piano".into())
            .spawn_scoped(scope, || guarded(shutdown, || piano_logic(hat, &config.piano, shutdown)));

        // Fehlt ein Thread, wird der andere sofort beendet
        if metronome.is_err() || piano.is_err() {
            shutdown.abort();
        }

        TaskReport {
            metronome: join_task("metronome", metronome),
            piano: join_task("piano", piano),
        }
    })
}

/// Setzt beim Unwind des Task-Threads den fatalen Shutdown
struct AbortOnPanic<'a>(&'a Shutdown);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

/// Führt einen Task aus und beendet bei `Err` oder Panic alle Tasks
fn guarded<F>(shutdown: &Shutdown, task: F) -> Result<(), HatError>
where
    F: FnOnce() -> Result<(), HatError>,
{
    let _guard = AbortOnPanic(shutdown);
    let result = task();
    if result.is_err() {
        shutdown.abort();
    }
    result
}

fn join_task(name: &str, spawned: io::Result<ScopedJoinHandle<'_, Result<(), HatError>>>) -> TaskOutcome {
    match spawned {
        Err(err) => {
            error!("Cannot start {name} thread: {err}");
            TaskOutcome::NotStarted
        }
        Ok(handle) => match handle.join() {
            Ok(Ok(())) => TaskOutcome::Finished,
            Ok(Err(err)) => TaskOutcome::Failed(err),
            Err(_) => {
                error!("{name} thread panicked");
                TaskOutcome::Panicked
            }
        },
    }
}

/// Buzzer stumm und LEDs aus, Fehler werden nur geloggt
pub fn teardown<H: RainbowHat>(hat: &H) {
    if let Err(err) = hat.play_tone(0, None) {
        warn!("Teardown: {err}");
    }
    if let Err(err) = hat.clear_leds(None) {
        warn!("Teardown: {err}");
    }
}
