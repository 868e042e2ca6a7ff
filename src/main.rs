extern crate bme280_telemetry;
extern crate docopt;
extern crate env_logger;
#[cfg(target_os = "linux")]
#[macro_use]
extern crate log;
#[cfg(target_os = "linux")]
#[macro_use]
extern crate serde_derive;

#[cfg(target_os = "linux")]
use docopt::Docopt;

#[cfg(target_os = "linux")]
use std::process;
#[cfg(target_os = "linux")]
use std::time::{Duration, Instant};

#[cfg(target_os = "linux")]
use bme280_telemetry::*;

#[cfg(target_os = "linux")]
const USAGE: &'static str = "
Publishing BME280 sensor readings

Usage:
  bme280-telemetry <device> [options]
  bme280-telemetry (-h | --help)
  bme280-telemetry (-v | --version)

Options:
  -h --help            Show this help text.
  --address <addr>     I2C device address [default: 118] (=0x76)
  --standby <ms>       Standby time between measurements [default: 1000]
  --poll <ms>          Read cycle interval [default: 5000]
  --publish <ms>       Publish interval [default: 30000]
  --topic <topic>      Topic the records are published to [default: /room_meas]
  --once               Read once, print the record and exit.
  -v --version         Show version.
";

#[cfg(target_os = "linux")]
#[derive(Debug, Deserialize)]
struct Args {
    arg_device: String,
    flag_address: u8,
    flag_standby: String,
    flag_poll: u64,
    flag_publish: u64,
    flag_topic: String,
    flag_once: bool,
    flag_version: bool,
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This program can run only on Linux")
}

#[cfg(target_os = "linux")]
fn main() {
    env_logger::init();

    let args: Args = Docopt::new(USAGE).and_then(|d| d.deserialize()).unwrap_or_else(|e| e.exit());

    if args.flag_version {
        println!("bme280-telemetry {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let standby: StandbyTime = args.flag_standby.parse().unwrap_or_else(|e| {
        eprintln!("{}", e);
        process::exit(2);
    });

    let bus = LinuxBus::open(&args.arg_device).unwrap_or_else(|e| {
        error!("cannot open {}: {}", args.arg_device, e);
        process::exit(1);
    });
    let mut bme280 = Bme280::new(bus, args.flag_address, standby).unwrap_or_else(|e| {
        error!("initialization of bme280 at 0x{:02x} failed: {}", args.flag_address, e);
        process::exit(1);
    });

    if args.flag_once {
        // Let the first normal mode measurement complete.
        std::thread::sleep(Duration::from_millis(100));
        match bme280.read_cycle() {
            Ok(_) => println!("{}", bme280.record().unwrap_or_default()),
            Err(e) => {
                error!("read failed: {}", e);
                process::exit(1);
            }
        }
        bme280.release();
        return;
    }

    let schedule = Schedule {
        poll_interval: Duration::from_millis(args.flag_poll),
        publish_interval: Duration::from_millis(args.flag_publish),
    };
    let mut station = Station::new(bme280, StdoutPublisher::new(), &args.flag_topic, schedule, Instant::now());
    station.run();
}
