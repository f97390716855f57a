// Library-Root: Device Handle, Tasks und Shutdown für die Rainbow HAT
//
// Das Binary (src/bin/main.rs) verdrahtet nur noch Config, Handle und Tasks.

// Module
pub mod config;
pub mod hal;
pub mod shutdown;
pub mod tasks;

// Re-exports von hat-core
pub use hat_core::{Button, ErrorBuffer, ErrorKind, HatError, LedArg, Peripheral, RainbowHat};

pub use config::AppConfig;
pub use hal::{DeviceHandle, FileHandle, SimBoard, SimHandle};
pub use shutdown::Shutdown;
pub use tasks::{TaskOutcome, TaskReport, run_tasks, teardown};

/// Lässt beide Tasks auf einem offenen Handle laufen und schließt ihn danach
///
/// Nach einem sauberen Ende werden Buzzer und LEDs noch ausgeschaltet.
/// Der Handle ist bei Rückkehr immer geschlossen.
pub fn drive<H: RainbowHat>(hat: &H, config: &AppConfig, shutdown: &Shutdown) -> TaskReport {
    let report = run_tasks(hat, config, shutdown);
    if report.is_clean() {
        teardown(hat);
    }
    hat.close();
    report
}
