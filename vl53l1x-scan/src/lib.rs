mod calibration;
mod constants;
mod error;
mod numeric;
mod parser;
mod scan_loop;
mod serial;
mod view;

use crate::constants::DEFAULT_CALIBRATION_SAMPLES;
use log::{debug, info};
use serialport::SerialPort;
use std::time::Duration;
use vl53l1x_data::{ScanConfiguration, ScanReading, ScanSample};

pub use crate::calibration::{calibrate, Confirm, StdinConfirm};
pub use crate::error::{ParseError, ScanError, TransportError};
pub use crate::parser::{parse_scan_line, parse_scan_readings};
pub use crate::scan_loop::{
    pump_until_drawn, terminator, ErrorPolicy, LoopExit, ScanLoop, ScanSink, ScanSource,
};
pub use crate::serial::{open_port, request_line, sync_port, LinePort, PortSettings};
pub use crate::view::{RenderState, ScanView};

/// Number of scans averaged by a default offset calibration.
pub const CALIBRATION_SAMPLES: usize = DEFAULT_CALIBRATION_SAMPLES;

/// Serial connection to the scanner firmware. The port is closed on drop.
pub struct ScanDevice<P: LinePort> {
    port: P,
    points: usize,
    timeout: Duration,
}

impl ScanDevice<Box<dyn SerialPort>> {
    /// Function to open the scanner.
    /// # Arguments
    ///
    /// * `settings` - Serial port name, baud rate and timeouts.
    /// * `config` - Scan geometry, used to validate each response.
    pub fn open(
        settings: &PortSettings,
        config: &ScanConfiguration,
    ) -> Result<ScanDevice<Box<dyn SerialPort>>, ScanError> {
        let port = open_port(settings)?;
        ScanDevice::connect(port, settings, config)
    }
}

impl<P: LinePort> ScanDevice<P> {
    /// Waits for the line the firmware prints after a reset, then returns a
    /// device ready for scan requests.
    pub fn connect(
        mut port: P,
        settings: &PortSettings,
        config: &ScanConfiguration,
    ) -> Result<ScanDevice<P>, ScanError> {
        // Without a reset there is nothing to read, and anything arriving
        // later is discarded as stale by the next request.
        match sync_port(&mut port, settings.startup_timeout) {
            Ok(()) => (),
            Err(ScanError::Transport(TransportError::Timeout(_))) => {
                debug!("No startup line from {}", settings.port_name)
            }
            Err(e) => return Err(e),
        }
        Ok(ScanDevice::with_port(port, config.points(), settings.timeout))
    }

    pub fn with_port(port: P, points: usize, timeout: Duration) -> ScanDevice<P> {
        ScanDevice {
            port,
            points,
            timeout,
        }
    }

    pub fn read_scan(&mut self) -> Result<ScanSample, ScanError> {
        let line = request_line(&mut self.port, self.timeout)?;
        Ok(parse_scan_line(&line, self.points)?)
    }

    /// Like [`ScanDevice::read_scan`] but keeps sigma and ambient light.
    pub fn read_readings(&mut self) -> Result<Vec<ScanReading>, ScanError> {
        let line = request_line(&mut self.port, self.timeout)?;
        Ok(parse_scan_readings(&line, self.points)?)
    }
}

impl<P: LinePort> ScanSource for ScanDevice<P> {
    fn read_scan(&mut self) -> Result<ScanSample, ScanError> {
        ScanDevice::read_scan(self)
    }
}

impl<P: LinePort> Drop for ScanDevice<P> {
    fn drop(&mut self) {
        info!("Closing scanner connection");
    }
}
