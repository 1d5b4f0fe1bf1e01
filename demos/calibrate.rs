use mh_zxx::{MhzSensor, SerialConfig, SerialPortChannel};

fn main() {
    let mut args = std::env::args().skip(1);
    let port = args.next().unwrap_or("/dev/ttyUSB0".into());
    let action = args.next().unwrap_or("zero".into());

    let config = SerialConfig::new(port).timeout_secs(0.2);
    let mut sensor = MhzSensor::new(SerialPortChannel::open(&config).unwrap());

    match action.as_str() {
        "zero" => sensor.zero_calibration().unwrap(),
        "span" => {
            let span = args.next().and_then(|s| s.parse().ok()).unwrap_or(2000);
            sensor.span_calibration(span).unwrap()
        }
        "abc-on" => sensor.set_auto_calibration(true).unwrap(),
        "abc-off" => sensor.set_auto_calibration(false).unwrap(),
        other => {
            eprintln!("unknown action {:?}, expected zero, span, abc-on or abc-off", other);
            return;
        }
    }
    println!("CO2: {} ppm", sensor.read_co2().unwrap());
}
