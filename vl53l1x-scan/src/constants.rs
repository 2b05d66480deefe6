/// Byte written to the microcontroller to trigger one scan.
pub(crate) const SCAN_TRIGGER_BYTE: u8 = b'\n';
pub(crate) const LINE_TERMINATOR: u8 = b'\n';
/// Fixed-width suffix ("\r\n") the firmware appends to every line.
pub(crate) const LINE_SUFFIX_SIZE: usize = 2;
pub(crate) const FIELD_SEPARATOR: char = ',';
/// range, standard deviation, ambient light
pub(crate) const FIELDS_PER_POINT: usize = 3;
/// Upper bound for one response line. 13 ROIs are well below 256 bytes.
pub(crate) const MAX_LINE_SIZE: usize = 4096;
pub(crate) const DEFAULT_PORT_NAME: &str = "/dev/ttyACM0";
pub(crate) const DEFAULT_BAUD_RATE: u32 = 115_200;
pub(crate) const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;
/// Opening the port resets the board; bootloader and sensor init come first.
pub(crate) const DEFAULT_STARTUP_TIMEOUT_MS: u64 = 3000;
/// Poll interval of the underlying serial read.
pub(crate) const PORT_POLL_TIMEOUT_MS: u64 = 10;
pub(crate) const DEFAULT_CALIBRATION_SAMPLES: usize = 10;
/// Lower y-limit factor applied to the smallest distance of a scan.
pub(crate) const LOWER_BOUND_FACTOR: f64 = 0.9;
/// Upper y-limit factor applied to the largest distance of a scan.
pub(crate) const UPPER_BOUND_FACTOR: f64 = 1.1;
