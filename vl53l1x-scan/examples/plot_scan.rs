use clap::Parser;
use crossbeam_channel::Receiver;
use piston_window::{EventLoop, PistonWindow, RenderEvent, WindowSettings};
use plotters::drawing::IntoDrawingArea;
use plotters::prelude::{ChartBuilder, Circle, LineSeries, BLUE, WHITE};
use plotters::style::Color;
use plotters_piston::{draw_piston_window, PistonBackend};
use std::error::Error;
use std::time::Duration;
use vl53l1x_data::{RangeCalibration, ScanConfiguration};
use vl53l1x_scan::{
    calibrate, pump_until_drawn, terminator, ErrorPolicy, PortSettings, RenderState, ScanDevice, ScanError,
    ScanLoop, ScanSink, ScanSource, ScanView, StdinConfirm, CALIBRATION_SAMPLES,
};

const FPS: u64 = 30;

#[derive(Parser)]
#[command(name = "plot_scan", about = "Reads VL53L1X ROI scans and plots them live.")]
struct Args {
    /// The device path to a serial port
    #[arg(long, default_value = "/dev/ttyACM0")]
    port: String,
    #[arg(long, default_value_t = 115_200)]
    baud_rate: u32,
    /// Number of ROI positions per scan
    #[arg(long, default_value_t = 13)]
    points: usize,
    /// Angle between two ROI positions in degree
    #[arg(long, default_value_t = 1.8)]
    resolution: f64,
    /// Initial y-axis limit in mm
    #[arg(long, default_value_t = 1000.)]
    max_range: f64,
    /// Delay between two scans in ms
    #[arg(long, default_value_t = 50)]
    period_ms: u64,
    /// Longest wait for one response line in ms
    #[arg(long, default_value_t = 1000)]
    timeout_ms: u64,
    /// Longest wait for the line the board prints after a reset, in ms
    #[arg(long, default_value_t = 3000)]
    startup_timeout_ms: u64,
    /// Run the offset calibration against a flat surface first
    #[arg(long)]
    calibrate: bool,
    #[arg(long, default_value_t = CALIBRATION_SAMPLES)]
    calibration_samples: usize,
    /// Per-angle offsets in mm, e.g. 9,4,2,-3,-10,-11,-11,-8,-3,-2,6,11,17
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    offsets: Vec<i32>,
    /// Skip up to N malformed scans in a row instead of stopping
    #[arg(long, default_value_t = 0)]
    retry_parse: u32,
}

struct PlotSink {
    window: PistonWindow,
}

impl ScanSink for PlotSink {
    fn show(&mut self, state: &RenderState) -> Result<bool, ScanError> {
        let window = &mut self.window;
        Ok(pump_until_drawn(|| {
            draw_piston_window(window, |b| draw_frame(b, state))
                .map(|event| event.render_args().is_some())
        }))
    }
}

fn draw_frame(b: PistonBackend, state: &RenderState) -> Result<(), Box<dyn Error>> {
    let root = b.into_drawing_area();
    root.fill(&WHITE)?;

    let y_lower = state.y_bounds.lower;
    let y_upper = if state.y_bounds.upper > y_lower {
        state.y_bounds.upper
    } else {
        y_lower + 1.
    };
    let mut cc = ChartBuilder::on(&root)
        .caption("VL53L1X Scan", ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(state.x_bounds.lower..state.x_bounds.upper, y_lower..y_upper)?;
    cc.configure_mesh()
        .x_desc("Angle (°)")
        .y_desc("Perpendicular range (mm)")
        .draw()?;

    cc.draw_series(LineSeries::new(state.points(), BLUE.stroke_width(1)))?;
    cc.draw_series(state.points().map(|p| Circle::new(p, 3, BLUE.filled())))?;
    Ok(())
}

fn initial_calibration(
    args: &Args,
    config: &ScanConfiguration,
    device: &mut dyn ScanSource,
    terminator_rx: &Receiver<bool>,
) -> Result<RangeCalibration, ScanError> {
    let calibration = if args.offsets.is_empty() {
        RangeCalibration::zeros(config.points())
    } else {
        RangeCalibration::from_offsets(config.points(), args.offsets.clone())?
    };
    if !args.calibrate {
        return Ok(calibration);
    }
    match calibrate(
        device,
        config,
        args.calibration_samples,
        &mut StdinConfirm,
        Some(terminator_rx),
    )? {
        Some(measured) => {
            println!("Offset calibration result: {:?}", measured.offsets());
            Ok(measured)
        }
        None => Ok(calibration),
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = ScanConfiguration::new(
        args.points,
        args.resolution,
        args.max_range,
        Duration::from_millis(args.period_ms),
    )?;
    let settings = PortSettings {
        port_name: args.port.clone(),
        baud_rate: args.baud_rate,
        timeout: Duration::from_millis(args.timeout_ms),
        startup_timeout: Duration::from_millis(args.startup_timeout_ms),
    };
    let policy = match args.retry_parse {
        0 => ErrorPolicy::Fatal,
        n => ErrorPolicy::RetryParse { max_consecutive: n },
    };

    let mut device = ScanDevice::open(&settings, &config)?;

    let (terminator_tx, terminator_rx) = terminator();
    ctrlc::set_handler(move || {
        println!();
        println!("Ctrl+C received...");
        let _ = terminator_tx.send(true);
    })?;

    let calibration = match initial_calibration(&args, &config, &mut device, &terminator_rx) {
        Ok(calibration) => calibration,
        Err(ScanError::Interrupted()) => {
            println!("...closing serial connection.");
            drop(device);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let view = ScanView::new(config, calibration)?;

    let mut window: PistonWindow = WindowSettings::new("VL53L1X scan", [800, 600])
        .exit_on_esc(true)
        .build()?;
    window.set_max_fps(FPS);
    let mut sink = PlotSink { window };

    let exit = ScanLoop::new(view, policy)
        .with_terminator(terminator_rx)
        .run(&mut device, &mut sink);

    println!("...closing serial connection.");
    drop(device);
    println!("Scan loop ended: {:?}", exit?);
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
