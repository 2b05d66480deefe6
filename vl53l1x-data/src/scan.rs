#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ranges of one scan in mm, one per angle slot.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanSample {
    pub ranges: Vec<u16>,
}

impl ScanSample {
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// All three fields reported by the sensor for one ROI.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanReading {
    /// Distance along the optical axis (in mm).
    pub range: u16,
    /// Standard deviation of the range (in mm).
    pub sigma: u16,
    /// Ambient light rate as reported by the firmware.
    pub ambient: u32,
}

/// Perpendicular distances in mm, one per angle slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplaySample {
    pub distances: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisBounds {
    pub lower: f64,
    pub upper: f64,
}
