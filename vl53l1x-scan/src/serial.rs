use crate::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_PORT_NAME, DEFAULT_READ_TIMEOUT_MS, DEFAULT_STARTUP_TIMEOUT_MS,
    LINE_TERMINATOR, MAX_LINE_SIZE, PORT_POLL_TIMEOUT_MS, SCAN_TRIGGER_BYTE,
};
use crate::error::{ScanError, TransportError};
use crate::numeric::to_string;
use log::{debug, info};
use serialport::SerialPort;
use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

/// Byte stream the scanner talks over.
///
/// Implemented for serial ports; anything that can report how many bytes are
/// waiting to be read can stand in for one.
pub trait LinePort: Read + Write {
    fn pending_bytes(&self) -> Result<usize, ScanError>;
}

impl LinePort for Box<dyn SerialPort> {
    fn pending_bytes(&self) -> Result<usize, ScanError> {
        let n_u32: u32 = SerialPort::bytes_to_read(&**self)?;
        Ok(n_u32.try_into().unwrap_or(0))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PortSettings {
    /// Serial port name such as `/dev/ttyACM0`.
    pub port_name: String,
    pub baud_rate: u32,
    /// Longest time to wait for one complete response line.
    pub timeout: Duration,
    /// Longest time to wait for the line printed after a reset.
    pub startup_timeout: Duration,
}

impl Default for PortSettings {
    fn default() -> Self {
        PortSettings {
            port_name: DEFAULT_PORT_NAME.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            startup_timeout: Duration::from_millis(DEFAULT_STARTUP_TIMEOUT_MS),
        }
    }
}

pub fn open_port(settings: &PortSettings) -> Result<Box<dyn SerialPort>, ScanError> {
    let port = serialport::new(&settings.port_name, settings.baud_rate)
        .timeout(Duration::from_millis(PORT_POLL_TIMEOUT_MS))
        .open()
        .map_err(|e| TransportError::Open(settings.port_name.clone(), e))?;
    info!(
        "Opened {} at {} baud",
        settings.port_name, settings.baud_rate
    );
    Ok(port)
}

pub(crate) fn discard_input<P: LinePort + ?Sized>(port: &mut P) -> Result<(), ScanError> {
    let n_read: usize = port.pending_bytes()?;
    if n_read == 0 {
        return Ok(());
    }
    let mut stale: Vec<u8> = vec![0; n_read];
    let n = port.read(stale.as_mut_slice())?;
    debug!("Discarded {} stale bytes: {}", n, to_string(&stale[..n]));
    Ok(())
}

pub(crate) fn send_trigger<P: LinePort + ?Sized>(port: &mut P) -> Result<(), ScanError> {
    port.write_all(&[SCAN_TRIGGER_BYTE])?;
    port.flush()?;
    Ok(())
}

/// Reads byte by byte until the line terminator so nothing of the next
/// response is consumed.
pub(crate) fn read_line<P: LinePort + ?Sized>(
    port: &mut P,
    timeout: Duration,
) -> Result<Vec<u8>, ScanError> {
    let start = Instant::now();
    let mut line: Vec<u8> = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if start.elapsed() > timeout {
            return Err(TransportError::Timeout(timeout.as_millis() as u64).into());
        }
        match port.read(&mut byte) {
            Ok(0) => return Err(TransportError::Closed().into()),
            Ok(_) => {
                line.push(byte[0]);
                if byte[0] == LINE_TERMINATOR {
                    return Ok(line);
                }
                if line.len() >= MAX_LINE_SIZE {
                    return Err(TransportError::LineTooLong(line.len()).into());
                }
            }
            Err(e) if is_retryable(e.kind()) => continue,
            Err(e) => return Err(TransportError::IoError(e).into()),
        }
    }
}

fn is_retryable(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

/// Triggers one scan and returns the raw response line, terminator included.
pub fn request_line<P: LinePort + ?Sized>(
    port: &mut P,
    timeout: Duration,
) -> Result<Vec<u8>, ScanError> {
    discard_input(port)?;
    send_trigger(port)?;
    let line = read_line(port, timeout)?;
    debug!("Scan line: {}", to_string(&line));
    Ok(line)
}

/// Consumes the line the firmware prints after a reset, so the first
/// request does not read it as a scan.
pub fn sync_port<P: LinePort + ?Sized>(port: &mut P, timeout: Duration) -> Result<(), ScanError> {
    let banner = read_line(port, timeout)?;
    debug!("Startup line: {}", to_string(&banner));
    Ok(())
}
