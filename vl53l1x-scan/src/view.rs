use crate::constants::{LOWER_BOUND_FACTOR, UPPER_BOUND_FACTOR};
use crate::error::{ParseError, ScanError};
use crate::numeric::perpendicular_distance;
use vl53l1x_data::{
    AngleAxis, AxisBounds, ConfigError, DisplaySample, RangeCalibration, ScanConfiguration,
    ScanSample,
};

/// Everything a drawing surface needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderState {
    /// x values, in degree.
    pub angles: Vec<f64>,
    /// y values, perpendicular distances in mm.
    pub distances: DisplaySample,
    pub x_bounds: AxisBounds,
    pub y_bounds: AxisBounds,
}

impl RenderState {
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.angles
            .iter()
            .copied()
            .zip(self.distances.distances.iter().copied())
    }
}

pub struct ScanView {
    config: ScanConfiguration,
    angle_axis: AngleAxis,
    calibration: RangeCalibration,
    state: RenderState,
}

impl ScanView {
    pub fn new(
        config: ScanConfiguration,
        calibration: RangeCalibration,
    ) -> Result<ScanView, ConfigError> {
        if calibration.len() != config.points() {
            return Err(ConfigError::CalibrationLength(
                config.points(),
                calibration.len(),
            ));
        }
        let angle_axis = config.angle_axis();
        let half = config.half_scan_angle();
        let state = RenderState {
            angles: angle_axis.degrees().to_vec(),
            distances: DisplaySample {
                distances: vec![0.; config.points()],
            },
            x_bounds: AxisBounds {
                lower: -half - 1.,
                upper: half + 1.,
            },
            y_bounds: AxisBounds {
                lower: 0.,
                upper: config.max_range(),
            },
        };
        Ok(ScanView {
            config,
            angle_axis,
            calibration,
            state,
        })
    }

    pub fn config(&self) -> &ScanConfiguration {
        &self.config
    }

    pub fn angle_axis(&self) -> &AngleAxis {
        &self.angle_axis
    }

    pub fn calibration(&self) -> &RangeCalibration {
        &self.calibration
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Replaces the plotted series with `sample` and rescales the y-axis to it.
    /// The previous frame is left untouched if the sample does not fit.
    pub fn update(&mut self, sample: &ScanSample) -> Result<&RenderState, ScanError> {
        if sample.len() != self.config.points() {
            return Err(ParseError::PointCount(self.config.points(), sample.len()).into());
        }
        let distances: Vec<f64> = sample
            .ranges
            .iter()
            .zip(self.angle_axis.degrees())
            .zip(self.calibration.offsets())
            .map(|((&range, &angle), &offset)| perpendicular_distance(range, angle, offset))
            .collect();
        self.state.y_bounds = y_bounds(&distances);
        self.state.distances = DisplaySample { distances };
        Ok(&self.state)
    }
}

fn y_bounds(distances: &[f64]) -> AxisBounds {
    let min = distances.iter().copied().fold(f64::INFINITY, f64::min);
    let max = distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    AxisBounds {
        lower: min * LOWER_BOUND_FACTOR,
        upper: max * UPPER_BOUND_FACTOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(points: usize, resolution: f64) -> ScanConfiguration {
        ScanConfiguration::new(points, resolution, 1000., Duration::ZERO).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let view = ScanView::new(ScanConfiguration::default(), RangeCalibration::zeros(13)).unwrap();
        let state = view.state();
        assert_eq!(state.distances.distances, vec![0.; 13]);
        assert_eq!(state.y_bounds, AxisBounds { lower: 0., upper: 1000. });
        assert!(f64::abs(state.x_bounds.lower + 11.8) < 1e-9);
        assert!(f64::abs(state.x_bounds.upper - 11.8) < 1e-9);
    }

    #[test]
    fn test_calibration_length_mismatch() {
        assert!(matches!(
            ScanView::new(ScanConfiguration::default(), RangeCalibration::zeros(3)),
            Err(ConfigError::CalibrationLength(13, 3))
        ));
    }

    #[test]
    fn test_update_at_zero_angle() {
        let mut view = ScanView::new(config(1, 1.8), RangeCalibration::zeros(1)).unwrap();
        let state = view.update(&ScanSample { ranges: vec![734] }).unwrap();
        assert_eq!(state.angles, vec![0.]);
        assert_eq!(state.distances.distances, vec![734.]);
    }

    #[test]
    fn test_update_with_calibration() {
        let calibration = RangeCalibration::from_offsets(3, vec![0, 5, -5]).unwrap();
        let mut view = ScanView::new(config(3, 10.), calibration).unwrap();
        let state = view
            .update(&ScanSample {
                ranges: vec![100, 100, 100],
            })
            .unwrap();
        let cos10 = f64::cos(10f64.to_radians()) * 100.;
        let expected = [cos10, 95., cos10 + 5.];
        for (d, e) in state.distances.distances.iter().zip(expected) {
            assert!(f64::abs(d - e) < 1e-9);
        }
    }

    #[test]
    fn test_update_bounds_are_recomputed() {
        let mut view = ScanView::new(config(3, 1.8), RangeCalibration::zeros(3)).unwrap();

        let state = view
            .update(&ScanSample {
                ranges: vec![1000, 2000, 1500],
            })
            .unwrap();
        let min = state.distances.distances.iter().copied().fold(f64::INFINITY, f64::min);
        let max = state.distances.distances.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(state.y_bounds.lower, 0.9 * min);
        assert_eq!(state.y_bounds.upper, 1.1 * max);

        // a closer target shrinks the axis again
        let state = view
            .update(&ScanSample {
                ranges: vec![100, 100, 100],
            })
            .unwrap();
        assert!(state.y_bounds.upper < 111.);
        assert!(state.y_bounds.lower > 89.);
    }

    #[test]
    fn test_update_rejects_wrong_length() {
        let mut view = ScanView::new(config(3, 1.8), RangeCalibration::zeros(3)).unwrap();
        view.update(&ScanSample {
            ranges: vec![100, 200, 300],
        })
        .unwrap();
        let before = view.state().clone();

        let result = view.update(&ScanSample {
            ranges: vec![100, 200],
        });
        assert!(matches!(
            result,
            Err(ScanError::Parse(ParseError::PointCount(3, 2)))
        ));
        assert_eq!(view.state(), &before);
    }

    #[test]
    fn test_render_points() {
        let mut view = ScanView::new(config(3, 10.), RangeCalibration::zeros(3)).unwrap();
        view.update(&ScanSample {
            ranges: vec![0, 50, 0],
        })
        .unwrap();
        let points: Vec<(f64, f64)> = view.state().points().collect();
        assert_eq!(points[1], (0., 50.));
        assert_eq!(points.len(), 3);
    }
}
