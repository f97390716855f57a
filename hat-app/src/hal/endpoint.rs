// Device-File Endpoints
//
// Die drei Misc-Devices des Kernel-Treibers als Endpoint-Traits.
// Jeder Aufruf ist genau ein read()/write() Syscall, ohne Retry.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;

use hat_core::codec::TONE_BYTES;
use hat_core::{ButtonEndpoint, Errno, LedEndpoint, ToneEndpoint};

/// Übersetzt einen I/O-Fehler in den rohen errno-Wert des Treibers
pub(crate) fn errno_of(err: &io::Error) -> Errno {
    err.raw_os_error().map(Errno).unwrap_or(Errno::OTHER)
}

/// LED-Strip, write-only geöffnet
#[derive(Debug)]
pub struct FileLeds(File);

impl FileLeds {
    pub fn open(path: &Path) -> io::Result<Self> {
        OpenOptions::new().write(true).open(path).map(Self)
    }
}

impl LedEndpoint for FileLeds {
    fn write_command(&mut self, command: &[u8]) -> Result<usize, Errno> {
        self.0.write(command).map_err(|err| errno_of(&err))
    }
}

/// Buttons, read-only geöffnet
#[derive(Debug)]
pub struct FileButtons(File);

impl FileButtons {
    pub fn open(path: &Path) -> io::Result<Self> {
        File::open(path).map(Self)
    }
}

impl ButtonEndpoint for FileButtons {
    fn read_state(&mut self, buf: &mut [u8]) -> Result<usize, Errno> {
        self.0.read(buf).map_err(|err| errno_of(&err))
    }
}

/// Buzzer, write-only geöffnet
#[derive(Debug)]
pub struct FileBuzzer(File);

impl FileBuzzer {
    pub fn open(path: &Path) -> io::Result<Self> {
        OpenOptions::new().write(true).open(path).map(Self)
    }
}

impl ToneEndpoint for FileBuzzer {
    fn write_frequency(&mut self, payload: &[u8; TONE_BYTES]) -> Result<usize, Errno> {
        self.0.write(payload).map_err(|err| errno_of(&err))
    }
}
