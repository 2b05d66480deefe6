use crate::error::{ParseError, ScanError};
use crate::numeric::mean;
use crate::scan_loop::{do_terminate, ScanSource};
use crossbeam_channel::Receiver;
use log::{debug, info};
use std::io::{BufRead, Write};
use vl53l1x_data::{ConfigError, RangeCalibration, ScanConfiguration};

/// Gate asked once before calibrating. `false` aborts.
pub trait Confirm {
    fn confirm(&mut self) -> Result<bool, ScanError>;
}

impl<F> Confirm for F
where
    F: FnMut() -> bool,
{
    fn confirm(&mut self) -> Result<bool, ScanError> {
        Ok(self())
    }
}

/// Asks on the terminal. Return continues, `x` + Return aborts.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self) -> Result<bool, ScanError> {
        println!("Offset calibration.");
        println!("Point the scanner at a flat surface. Continue with <Return>, abort with <x> + <Return>");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().lock().read_line(&mut answer)?;
        Ok(answer.trim() != "x")
    }
}

/// Averages `sample_count` scans of a flat target into zero-mean offsets.
///
/// Returns `Ok(None)` when the operator declines, and
/// `ScanError::Interrupted` once `true` arrives on `terminator_rx` between
/// two scans.
pub fn calibrate<S, C>(
    source: &mut S,
    config: &ScanConfiguration,
    sample_count: usize,
    confirm: &mut C,
    terminator_rx: Option<&Receiver<bool>>,
) -> Result<Option<RangeCalibration>, ScanError>
where
    S: ScanSource + ?Sized,
    C: Confirm + ?Sized,
{
    if sample_count == 0 {
        return Err(ScanError::Config(ConfigError::NoCalibrationSamples));
    }
    if !confirm.confirm()? {
        info!("Offset calibration aborted");
        return Ok(None);
    }

    let points = config.points();
    let mut sums = vec![0f64; points];
    for i in 0..sample_count {
        if terminator_rx.is_some_and(do_terminate) {
            info!("Offset calibration interrupted");
            return Err(ScanError::Interrupted());
        }
        let sample = source.read_scan()?;
        if sample.len() != points {
            return Err(ParseError::PointCount(points, sample.len()).into());
        }
        for (sum, range) in sums.iter_mut().zip(&sample.ranges) {
            *sum += *range as f64;
        }
        debug!("Calibration scan {}/{}: {:?}", i + 1, sample_count, sample.ranges);
        std::thread::sleep(config.scan_period());
    }

    let averages: Vec<f64> = sums.iter().map(|s| s / (sample_count as f64)).collect();
    let overall = mean(&averages);
    let offsets = averages
        .iter()
        // halves go to the even neighbour
        .map(|a| (a - overall).round_ties_even() as i32)
        .collect();
    let calibration = RangeCalibration::from_offsets(points, offsets)?;
    info!("Offset calibration result: {:?}", calibration.offsets());
    Ok(Some(calibration))
}
