pub mod calibration;
pub mod config;
pub mod scan;

pub use calibration::RangeCalibration;
pub use config::{AngleAxis, ConfigError, ScanConfiguration};
pub use scan::{AxisBounds, DisplaySample, ScanReading, ScanSample};
