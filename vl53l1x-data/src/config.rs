#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Number of ROI positions swept by the scanner firmware.
pub const DEFAULT_POINTS: usize = 13;
/// Angle between two neighbouring ROI positions.
pub const DEFAULT_RESOLUTION_DEGREE: f64 = 1.8;
/// Initial y-axis upper limit, replaced after the first scan.
pub const DEFAULT_MAX_RANGE: f64 = 1000.;
/// Delay between two scans, on top of the sensor measurement time.
pub const DEFAULT_SCAN_PERIOD_MS: u64 = 50;

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    NoPoints,
    InvalidResolution(f64),
    InvalidMaxRange(f64),
    CalibrationLength(usize, usize),
    NoCalibrationSamples,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::NoPoints => write!(f, "A scan needs at least one point."),
            ConfigError::InvalidResolution(res) => {
                write!(f, "Angular resolution must be positive. Actually {} degree.", res)
            }
            ConfigError::InvalidMaxRange(range) => {
                write!(f, "Maximum display range must be positive. Actually {} mm.", range)
            }
            ConfigError::CalibrationLength(expected, actual) => write!(
                f,
                "Expected {} calibration offsets but found {}.",
                expected, actual
            ),
            ConfigError::NoCalibrationSamples => {
                write!(f, "Calibration needs at least one scan.")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Scanner geometry and timing. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfiguration {
    points: usize,
    resolution_degree: f64,
    max_range: f64,
    scan_period: Duration,
}

impl ScanConfiguration {
    pub fn new(
        points: usize,
        resolution_degree: f64,
        max_range: f64,
        scan_period: Duration,
    ) -> Result<ScanConfiguration, ConfigError> {
        if points == 0 {
            return Err(ConfigError::NoPoints);
        }
        // written this way so NaN is rejected as well
        if !(resolution_degree > 0.) {
            return Err(ConfigError::InvalidResolution(resolution_degree));
        }
        if !(max_range > 0.) {
            return Err(ConfigError::InvalidMaxRange(max_range));
        }
        Ok(ScanConfiguration {
            points,
            resolution_degree,
            max_range,
            scan_period,
        })
    }

    pub fn points(&self) -> usize {
        self.points
    }

    pub fn resolution_degree(&self) -> f64 {
        self.resolution_degree
    }

    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    pub fn scan_period(&self) -> Duration {
        self.scan_period
    }

    /// Half of the swept angle, i.e. the angle of the outermost ROI.
    pub fn half_scan_angle(&self) -> f64 {
        self.resolution_degree * ((self.points - 1) as f64) / 2.
    }

    pub fn angle_axis(&self) -> AngleAxis {
        let half = self.half_scan_angle();
        let degrees = (0..self.points)
            .map(|i| (i as f64) * self.resolution_degree - half)
            .collect();
        AngleAxis { degrees }
    }
}

impl Default for ScanConfiguration {
    fn default() -> Self {
        ScanConfiguration {
            points: DEFAULT_POINTS,
            resolution_degree: DEFAULT_RESOLUTION_DEGREE,
            max_range: DEFAULT_MAX_RANGE,
            scan_period: Duration::from_millis(DEFAULT_SCAN_PERIOD_MS),
        }
    }
}

/// Scan angles in degree, zero at the sensor's optical axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AngleAxis {
    degrees: Vec<f64>,
}

impl AngleAxis {
    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    pub fn len(&self) -> usize {
        self.degrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.degrees.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = ScanConfiguration::default();
        assert_eq!(config.points(), 13);
        assert!(f64::abs(config.half_scan_angle() - 10.8) < 1e-9);
        assert_eq!(config.scan_period(), Duration::from_millis(50));
    }

    #[test]
    fn test_invalid_configuration() {
        let period = Duration::from_millis(50);
        assert_eq!(
            ScanConfiguration::new(0, 1.8, 1000., period),
            Err(ConfigError::NoPoints)
        );
        assert!(matches!(
            ScanConfiguration::new(13, 0., 1000., period),
            Err(ConfigError::InvalidResolution(_))
        ));
        assert!(matches!(
            ScanConfiguration::new(13, f64::NAN, 1000., period),
            Err(ConfigError::InvalidResolution(_))
        ));
        assert!(matches!(
            ScanConfiguration::new(13, 1.8, -1., period),
            Err(ConfigError::InvalidMaxRange(_))
        ));
    }

    #[test]
    fn test_angle_axis() {
        for (points, resolution) in [(1, 1.), (2, 0.5), (3, 10.), (13, 1.8), (20, 1.)] {
            let config =
                ScanConfiguration::new(points, resolution, 1000., Duration::from_millis(50))
                    .unwrap();
            let axis = config.angle_axis();
            let degrees = axis.degrees();
            assert_eq!(axis.len(), points);
            for i in 0..points {
                assert!(f64::abs(degrees[i] + degrees[points - 1 - i]) < 1e-9);
            }
            for pair in degrees.windows(2) {
                assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn test_angle_axis_values() {
        let config = ScanConfiguration::new(3, 10., 1000., Duration::from_millis(50)).unwrap();
        assert_eq!(config.angle_axis().degrees(), &[-10., 0., 10.]);
    }
}
