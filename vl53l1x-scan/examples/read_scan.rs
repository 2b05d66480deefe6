use clap::Parser;
use std::time::Duration;
use vl53l1x_data::config::{DEFAULT_MAX_RANGE, DEFAULT_RESOLUTION_DEGREE, DEFAULT_SCAN_PERIOD_MS};
use vl53l1x_data::ScanConfiguration;
use vl53l1x_scan::{terminator, PortSettings, ScanDevice, ScanError};

#[derive(Parser)]
#[command(name = "read_scan", about = "Reads VL53L1X ROI scans and prints them as JSON lines.")]
struct Args {
    /// The device path to a serial port
    port: String,
    #[arg(long, default_value_t = 115_200)]
    baud_rate: u32,
    #[arg(long, default_value_t = 13)]
    points: usize,
    /// Stop after this many scans
    #[arg(long)]
    count: Option<usize>,
    /// Also print standard deviation and ambient light per ROI
    #[arg(long)]
    readings: bool,
}

fn print_scan(
    device: &mut ScanDevice<Box<dyn serialport::SerialPort>>,
    readings: bool,
) -> Result<(), ScanError> {
    let line = if readings {
        serde_json::to_string(&device.read_readings()?)
    } else {
        serde_json::to_string(&device.read_scan()?)
    };
    match line {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("{e}"),
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match ScanConfiguration::new(
        args.points,
        DEFAULT_RESOLUTION_DEGREE,
        DEFAULT_MAX_RANGE,
        Duration::from_millis(DEFAULT_SCAN_PERIOD_MS),
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let settings = PortSettings {
        port_name: args.port,
        baud_rate: args.baud_rate,
        ..PortSettings::default()
    };

    let mut device = match ScanDevice::open(&settings, &config) {
        Ok(device) => device,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let (terminator_tx, terminator_rx) = terminator();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = terminator_tx.send(true);
    }) {
        eprintln!("{e}");
    }

    let mut n_scans = 0;
    let result = loop {
        if terminator_rx.try_recv().unwrap_or(false) {
            break Ok(());
        }
        if args.count.is_some_and(|count| n_scans >= count) {
            break Ok(());
        }
        if let Err(e) = print_scan(&mut device, args.readings) {
            break Err(e);
        }
        n_scans += 1;
        std::thread::sleep(config.scan_period());
    };

    drop(device);
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
