use std::{io, path::Path, time::Duration};

use log::debug;
use serialport::{SerialPort, SerialPortInfo};

/// Serial channel a finished report is handed to.
pub struct SerialLink {
    port: Option<Box<dyn SerialPort>>,
}

impl SerialLink {
    pub fn new() -> Self {
        SerialLink { port: None }
    }

    pub fn list_ports() -> Result<Vec<SerialPortInfo>, serialport::Error> {
        serialport::available_ports()
    }

    pub fn connect<P: AsRef<Path>>(&mut self, path: P) -> Result<(), serialport::Error> {
        let path = path.as_ref().to_string_lossy();
        let port = serialport::new(path, 115_200)
            .timeout(Duration::from_millis(500))
            .open()?;

        self.port.replace(port);

        Ok(())
    }

    /// Transmit the encoded bytes unmodified. Blocking, bounded by the
    /// port timeout.
    pub fn send_report(&mut self, encoded: &[u8]) -> io::Result<()> {
        debug!("sending {} byte report", encoded.len());

        let port = self.port.as_mut().ok_or(io::ErrorKind::NotConnected)?;
        port.write_all(encoded)?;
        port.flush()
    }
}
