use std::fs;
use std::io;
use std::path::PathBuf;

use structopt::StructOpt;

use log::{debug, info};

use gauger_shared::model::AnalogMeasurement;
use gauger_shared::{encode_analog_measurement, required_size, EncodeError, SerialLink};

mod session;

#[derive(Debug, StructOpt)]
#[structopt(name = "gauger", about = "Analog measurement reporting tool")]
struct Opt {
    /// Serial Device. Defaults to the first detected port
    #[structopt(long = "device", parse(from_os_str))]
    serial: Option<PathBuf>,
    #[structopt(short, long)]
    debug: bool,
    #[structopt(subcommand)]
    cmd: CliCommand,
}

#[derive(StructOpt, Debug)]
enum CliCommand {
    /// Print the encoded size of a session in bytes
    Size { input: PathBuf },
    /// Encode a session. Hex to stdout, or raw bytes with --output
    Encode {
        input: PathBuf,
        #[structopt(short, long, parse(from_os_str))]
        output: Option<PathBuf>,
    },
    /// Encode a session and transmit it over the serial link
    Send { input: PathBuf },
    /// Print an example session description
    Example,
    /// List available serial ports
    Ports,
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    let loglevel = if opt.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new().filter_level(loglevel).init();

    match opt.cmd {
        CliCommand::Size { input } => {
            let report = session::load(&input)?;
            let size = required_size(&report).map_err(to_io)?;
            println!("{} bytes", size);
            Ok(())
        }
        CliCommand::Encode { input, output } => {
            let report = session::load(&input)?;
            let encoded = encode_report(&report)?;
            match output {
                Some(path) => {
                    fs::write(&path, &encoded)?;
                    info!("wrote {} bytes to {}", encoded.len(), path.display());
                }
                None => println!("{}", hex(&encoded)),
            }
            Ok(())
        }
        CliCommand::Send { input } => {
            let report = session::load(&input)?;
            let encoded = encode_report(&report)?;

            let mut link = SerialLink::new();
            link.connect(serial_device(opt.serial))
                .map_err(serial_to_io)?;
            link.send_report(&encoded)?;
            info!("sent {} bytes", encoded.len());
            Ok(())
        }
        CliCommand::Example => {
            let report = session::example();
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        CliCommand::Ports => {
            for port in SerialLink::list_ports().map_err(serial_to_io)? {
                println!("{}", port.port_name);
            }
            Ok(())
        }
    }
}

/// Size the buffer with a measuring pass, then run the writing pass.
fn encode_report(report: &AnalogMeasurement) -> io::Result<Vec<u8>> {
    let size = required_size(report).map_err(to_io)?;
    debug!("encoded size measured as {} bytes", size);

    let mut buf = vec![0u8; size];
    let used = encode_analog_measurement(report, &mut buf)
        .map_err(to_io)?
        .len();
    buf.truncate(used);
    Ok(buf)
}

fn serial_device(arg: Option<PathBuf>) -> PathBuf {
    if let Some(path) = arg {
        path
    } else if let Ok(ports) = serialport::available_ports() {
        ports
            .first()
            .map(|port| PathBuf::from(&port.port_name))
            .unwrap_or_else(|| PathBuf::from("/dev/ttyACM0"))
    } else {
        PathBuf::from("/dev/ttyACM0")
    }
}

fn to_io(e: EncodeError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, e)
}

fn serial_to_io(e: serialport::Error) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e.to_string())
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
