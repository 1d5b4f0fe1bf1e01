use linux_embedded_hal::Serial;
use mh_zxx::{MhzSensor, SerialChannel};
use std::path::Path;
use std::time::Instant;

fn main() {
    let serial_path = std::env::args().nth(1).unwrap_or("/dev/ttyUSB0".into());
    let serial = Serial::open(Path::new(&serial_path)).unwrap();
    let mut sensor = MhzSensor::new(SerialChannel::new(serial, Instant::now()));

    let probe_ok = sensor.probe().unwrap();
    println!("Probe: {:?}", probe_ok);
    if !probe_ok {
        return;
    }

    let m = sensor.read().unwrap();
    println!("{}", m);
    println!("status: {:#04x}, abc point: {}", m.status, m.auto_calibration_point);
    sensor.close().unwrap();
}
