use std::error::Error;
use std::fmt::Display;
use std::{fmt, io};
use vl53l1x_data::ConfigError;

#[derive(Debug)]
pub enum TransportError {
    Open(String, serialport::Error),
    Closed(),
    Timeout(u64),
    LineTooLong(usize),
    SerialError(serialport::Error),
    IoError(io::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TransportError::Open(port, err) => write!(f, "Failed to open \"{}\". Error: {}", port, err),
            TransportError::Closed() => write!(f, "Serial connection closed by the device"),
            TransportError::Timeout(ms) => write!(f, "No complete line received within {} ms", ms),
            TransportError::LineTooLong(len) => {
                write!(f, "Received {} bytes without a line terminator", len)
            }
            TransportError::SerialError(err) => Display::fmt(&err, f),
            TransportError::IoError(err) => Display::fmt(&err, f),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    NotUtf8(),
    TooShort(usize),
    FieldCount(usize, usize),
    InvalidField(usize, String),
    PointCount(usize, usize),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NotUtf8() => write!(f, "Scan line is not valid UTF-8"),
            ParseError::TooShort(len) => write!(f, "Scan line of {} bytes is shorter than its suffix", len),
            ParseError::FieldCount(expected, actual) => write!(
                f,
                "Expected at least {} fields in the scan line but found {}.",
                expected, actual
            ),
            ParseError::InvalidField(slot, field) => {
                write!(f, "Field \"{}\" of slot {} is not a valid reading", field, slot)
            }
            ParseError::PointCount(expected, actual) => {
                write!(f, "Expected {} points per scan but found {}.", expected, actual)
            }
        }
    }
}

#[derive(Debug)]
pub enum ScanError {
    Transport(TransportError),
    Parse(ParseError),
    Config(ConfigError),
    Display(String),
    Interrupted(),
}

impl ScanError {
    pub fn is_parse_error(&self) -> bool {
        matches!(self, ScanError::Parse(_))
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ScanError::Transport(err) => write!(f, "Transport error: {}", err),
            ScanError::Parse(err) => write!(f, "Parse error: {}", err),
            ScanError::Config(err) => write!(f, "Configuration error: {}", err),
            ScanError::Display(msg) => write!(f, "Display error: {}", msg),
            ScanError::Interrupted() => write!(f, "Interrupted by the operator"),
        }
    }
}

impl Error for TransportError {}
impl Error for ParseError {}
impl Error for ScanError {}

impl From<TransportError> for ScanError {
    fn from(err: TransportError) -> Self {
        ScanError::Transport(err)
    }
}
impl From<ParseError> for ScanError {
    fn from(err: ParseError) -> Self {
        ScanError::Parse(err)
    }
}
impl From<ConfigError> for ScanError {
    fn from(err: ConfigError) -> Self {
        ScanError::Config(err)
    }
}
impl From<io::Error> for ScanError {
    fn from(err: io::Error) -> Self {
        ScanError::Transport(TransportError::IoError(err))
    }
}
impl From<serialport::Error> for ScanError {
    fn from(err: serialport::Error) -> Self {
        ScanError::Transport(TransportError::SerialError(err))
    }
}
