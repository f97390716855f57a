// Hardware Abstraction Layer (HAL) Module
//
// Endpoints der drei Device-Files, der Device Handle darüber und ein
// simuliertes Board für Betrieb und Tests ohne Hardware.

pub mod device;
pub mod endpoint;
pub mod sim;

pub use device::{DeviceHandle, FileHandle};
pub use endpoint::{FileButtons, FileBuzzer, FileLeds};
pub use sim::{SimBoard, SimButtons, SimBuzzer, SimHandle, SimLeds};
