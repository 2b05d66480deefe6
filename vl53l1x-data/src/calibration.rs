use crate::config::ConfigError;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-angle offsets in mm, subtracted after the cosine projection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeCalibration {
    offsets: Vec<i32>,
}

impl RangeCalibration {
    pub fn zeros(points: usize) -> RangeCalibration {
        RangeCalibration {
            offsets: vec![0; points],
        }
    }

    pub fn from_offsets(points: usize, offsets: Vec<i32>) -> Result<RangeCalibration, ConfigError> {
        if offsets.len() != points {
            return Err(ConfigError::CalibrationLength(points, offsets.len()));
        }
        Ok(RangeCalibration { offsets })
    }

    pub fn offsets(&self) -> &[i32] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.offsets.iter().all(|&o| o == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_offsets() {
        let calib = RangeCalibration::from_offsets(3, vec![1, -2, 1]).unwrap();
        assert_eq!(calib.offsets(), &[1, -2, 1]);
        assert!(!calib.is_zero());
        assert_eq!(
            RangeCalibration::from_offsets(13, vec![1, 2]),
            Err(ConfigError::CalibrationLength(13, 2))
        );
        assert!(RangeCalibration::zeros(13).is_zero());
    }
}
