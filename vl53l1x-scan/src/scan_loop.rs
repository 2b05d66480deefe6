use crate::error::ScanError;
use crate::view::{RenderState, ScanView};
use crossbeam_channel::{bounded, Receiver, Sender};
use log::{info, warn};
use vl53l1x_data::ScanSample;

/// Anything that can deliver one complete scan per call.
pub trait ScanSource {
    fn read_scan(&mut self) -> Result<ScanSample, ScanError>;
}

/// Drawing surface fed once per tick.
pub trait ScanSink {
    /// Returns `false` once the display has been closed.
    fn show(&mut self, state: &RenderState) -> Result<bool, ScanError>;
}

/// What a failed acquisition does to the loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Any error ends the loop.
    #[default]
    Fatal,
    /// Up to `max_consecutive` parse errors in a row are skipped.
    /// Transport errors still end the loop.
    RetryParse { max_consecutive: u32 },
}

impl ErrorPolicy {
    fn tolerates(&self, error: &ScanError, consecutive: u32) -> bool {
        match self {
            ErrorPolicy::Fatal => false,
            ErrorPolicy::RetryParse { max_consecutive } => {
                error.is_parse_error() && consecutive <= *max_consecutive
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    DisplayClosed,
    Interrupted,
}

pub fn terminator() -> (Sender<bool>, Receiver<bool>) {
    bounded(10)
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    terminator_rx.try_recv().unwrap_or(false)
}

/// Drives a windowing event loop until one event actually drew the frame.
///
/// `next_event` returns `None` once the window is closed and `Some(drawn)`
/// for every other event. Returns `false` if the window closed first.
pub fn pump_until_drawn<F>(mut next_event: F) -> bool
where
    F: FnMut() -> Option<bool>,
{
    loop {
        match next_event() {
            Some(true) => return true,
            Some(false) => continue,
            None => return false,
        }
    }
}

/// Pull-based acquisition loop: read a scan, update the view, draw, wait.
pub struct ScanLoop {
    view: ScanView,
    policy: ErrorPolicy,
    terminator_rx: Option<Receiver<bool>>,
    consecutive_errors: u32,
}

impl ScanLoop {
    pub fn new(view: ScanView, policy: ErrorPolicy) -> ScanLoop {
        ScanLoop {
            view,
            policy,
            terminator_rx: None,
            consecutive_errors: 0,
        }
    }

    /// Stops the loop at the next tick once `true` is sent on the paired sender.
    pub fn with_terminator(mut self, terminator_rx: Receiver<bool>) -> ScanLoop {
        self.terminator_rx = Some(terminator_rx);
        self
    }

    pub fn view(&self) -> &ScanView {
        &self.view
    }

    fn is_terminated(&self) -> bool {
        self.terminator_rx.as_ref().is_some_and(do_terminate)
    }

    /// Runs one acquisition and redraw.
    ///
    /// Returns `Ok(None)` when a tolerated error skipped the frame, and the
    /// sink's verdict otherwise.
    pub fn tick<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<Option<bool>, ScanError>
    where
        S: ScanSource + ?Sized,
        K: ScanSink + ?Sized,
    {
        let sample = match source.read_scan() {
            Ok(sample) => sample,
            Err(e) => {
                self.consecutive_errors += 1;
                if self.policy.tolerates(&e, self.consecutive_errors) {
                    warn!(
                        "Skipping scan ({} in a row): {}",
                        self.consecutive_errors, e
                    );
                    return Ok(None);
                }
                return Err(e);
            }
        };
        self.consecutive_errors = 0;
        let state = self.view.update(&sample)?;
        sink.show(state).map(Some)
    }

    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<LoopExit, ScanError>
    where
        S: ScanSource + ?Sized,
        K: ScanSink + ?Sized,
    {
        let period = self.view.config().scan_period();
        loop {
            if self.is_terminated() {
                info!("Scan loop interrupted");
                return Ok(LoopExit::Interrupted);
            }
            if let Some(false) = self.tick(source, sink)? {
                info!("Display closed");
                return Ok(LoopExit::DisplayClosed);
            }
            std::thread::sleep(period);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ParseError, TransportError};
    use std::collections::VecDeque;
    use std::time::Duration;
    use vl53l1x_data::{RangeCalibration, ScanConfiguration};

    pub(crate) struct ScriptedSource {
        pub(crate) scans: VecDeque<Result<ScanSample, ScanError>>,
        pub(crate) n_reads: usize,
    }

    impl ScriptedSource {
        pub(crate) fn new(scans: Vec<Result<ScanSample, ScanError>>) -> ScriptedSource {
            ScriptedSource {
                scans: scans.into(),
                n_reads: 0,
            }
        }
    }

    impl ScanSource for ScriptedSource {
        fn read_scan(&mut self) -> Result<ScanSample, ScanError> {
            self.n_reads += 1;
            self.scans
                .pop_front()
                .unwrap_or(Err(TransportError::Closed().into()))
        }
    }

    struct RecordingSink {
        frames: Vec<RenderState>,
        close_after: usize,
    }

    impl ScanSink for RecordingSink {
        fn show(&mut self, state: &RenderState) -> Result<bool, ScanError> {
            self.frames.push(state.clone());
            Ok(self.frames.len() < self.close_after)
        }
    }

    fn sink(close_after: usize) -> RecordingSink {
        RecordingSink {
            frames: Vec::new(),
            close_after,
        }
    }

    fn scan_loop(policy: ErrorPolicy) -> ScanLoop {
        let config = ScanConfiguration::new(3, 10., 1000., Duration::ZERO).unwrap();
        let view = ScanView::new(config, RangeCalibration::zeros(3)).unwrap();
        ScanLoop::new(view, policy)
    }

    fn flat(range: u16) -> Result<ScanSample, ScanError> {
        Ok(ScanSample {
            ranges: vec![range; 3],
        })
    }

    fn parse_error() -> Result<ScanSample, ScanError> {
        Err(ParseError::FieldCount(9, 2).into())
    }

    #[test]
    fn test_run_until_display_closed() {
        let mut source = ScriptedSource::new(vec![flat(100), flat(200), flat(300)]);
        let mut sink = sink(3);
        let exit = scan_loop(ErrorPolicy::Fatal).run(&mut source, &mut sink);
        assert!(matches!(exit, Ok(LoopExit::DisplayClosed)));
        assert_eq!(sink.frames.len(), 3);
        assert_eq!(sink.frames[2].distances.distances[1], 300.);
    }

    #[test]
    fn test_run_stops_on_transport_error() {
        let mut source = ScriptedSource::new(vec![
            flat(100),
            Err(TransportError::Timeout(1000).into()),
            flat(300),
        ]);
        let mut sink = sink(10);
        let exit = scan_loop(ErrorPolicy::RetryParse { max_consecutive: 5 })
            .run(&mut source, &mut sink);
        assert!(matches!(
            exit,
            Err(ScanError::Transport(TransportError::Timeout(1000)))
        ));
        assert_eq!(sink.frames.len(), 1);
        assert_eq!(source.n_reads, 2);
    }

    #[test]
    fn test_fatal_policy_stops_on_parse_error() {
        let mut source = ScriptedSource::new(vec![parse_error(), flat(100)]);
        let mut sink = sink(10);
        let exit = scan_loop(ErrorPolicy::Fatal).run(&mut source, &mut sink);
        assert!(matches!(exit, Err(ScanError::Parse(_))));
        assert!(sink.frames.is_empty());
    }

    #[test]
    fn test_retry_policy_skips_parse_errors() {
        let mut source = ScriptedSource::new(vec![
            flat(100),
            parse_error(),
            parse_error(),
            flat(200),
            parse_error(),
            parse_error(),
            flat(300),
        ]);
        let mut sink = sink(3);
        let exit = scan_loop(ErrorPolicy::RetryParse { max_consecutive: 2 })
            .run(&mut source, &mut sink);
        assert!(matches!(exit, Ok(LoopExit::DisplayClosed)));
        assert_eq!(sink.frames.len(), 3);
        assert_eq!(source.n_reads, 7);
    }

    #[test]
    fn test_retry_policy_limit() {
        let mut source = ScriptedSource::new(vec![
            flat(100),
            parse_error(),
            parse_error(),
            parse_error(),
            flat(200),
        ]);
        let mut sink = sink(10);
        let mut scan_loop = scan_loop(ErrorPolicy::RetryParse { max_consecutive: 2 });
        let exit = scan_loop.run(&mut source, &mut sink);
        assert!(matches!(exit, Err(ScanError::Parse(_))));
        assert_eq!(sink.frames.len(), 1);
        // the failed ticks leave the last frame in place
        assert_eq!(scan_loop.view().state(), &sink.frames[0]);
    }

    #[test]
    fn test_terminator() {
        let (terminator_tx, terminator_rx) = terminator();
        let mut source = ScriptedSource::new(vec![flat(100), flat(200)]);
        let mut sink = sink(10);
        terminator_tx.send(true).unwrap();
        let exit = scan_loop(ErrorPolicy::Fatal)
            .with_terminator(terminator_rx)
            .run(&mut source, &mut sink);
        assert!(matches!(exit, Ok(LoopExit::Interrupted)));
        assert_eq!(source.n_reads, 0);
    }

    #[test]
    fn test_pump_until_drawn() {
        // update and input events come before the render event
        let mut events = VecDeque::from(vec![Some(false), Some(false), Some(true), Some(false)]);
        assert!(pump_until_drawn(|| events.pop_front().flatten()));
        assert_eq!(events.len(), 1);

        let mut events = VecDeque::from(vec![Some(false), None, Some(true)]);
        assert!(!pump_until_drawn(|| events.pop_front().flatten()));
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_tick() {
        let mut source = ScriptedSource::new(vec![parse_error(), flat(100)]);
        let mut sink = sink(10);
        let mut scan_loop = scan_loop(ErrorPolicy::RetryParse { max_consecutive: 1 });
        assert!(matches!(scan_loop.tick(&mut source, &mut sink), Ok(None)));
        assert!(matches!(
            scan_loop.tick(&mut source, &mut sink),
            Ok(Some(true))
        ));
    }
}
