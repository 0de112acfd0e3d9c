use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use envctl_link::{BAUD_RATE, Message, Packet, PacketId, Sensor};

mod commands;
mod link;

use commands::{Request, describe};
use link::Link;

/// Talk to the environment controller over its serial link.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Serial port of the controller.
    #[arg(short, long)]
    port: String,
    #[arg(short, long, default_value_t = BAUD_RATE)]
    baud: u32,
    /// Read timeout before the controller is asked for a ready packet again.
    #[arg(long, default_value_t = 500)]
    timeout_ms: u64,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Cycle through the temperature, conductivity and pH measurements.
    Monitor {
        /// Stop after this many requests.
        #[arg(short, long)]
        cycles: Option<u32>,
    },
    /// Wait until the controller is ready.
    Ready,
    /// Send one request and print the replies.
    Send {
        #[command(subcommand)]
        request: Request,
    },
}

/// Requests of the monitor rotation.
const ROTATION: [Message<'static>; 3] = [
    Message::MeasureTemperature,
    Message::Measure(Sensor::Conductivity),
    Message::Measure(Sensor::Ph),
];

type SerialLink = Link<Box<dyn serialport::SerialPort>>;

fn print_packet(packet: &Packet) {
    match Message::from_packet(packet) {
        Ok(message) => println!("{}", describe(&message)),
        Err(e) => log::warn!("undecodable {:?}: {e}", packet.id()),
    }
}

/// Prints incoming packets until the controller reports ready.
fn wait_ready(link: &mut SerialLink) -> Result<()> {
    loop {
        match link.receive()? {
            Some(packet) if packet.id() == PacketId::ResponseReadyRequest => return Ok(()),
            Some(packet) => print_packet(&packet),
            None => {
                log::debug!("timed out, requesting ready");
                link.send(&Message::ReadyRequest)?;
            }
        }
    }
}

fn monitor(link: &mut SerialLink, cycles: Option<u32>) -> Result<()> {
    let mut sent = 0u32;
    for request in ROTATION.iter().cycle() {
        wait_ready(link)?;
        if cycles.is_some_and(|limit| sent >= limit) {
            break;
        }
        link.send(request)?;
        sent += 1;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let port = serialport::new(&args.port, args.baud)
        .timeout(Duration::from_millis(args.timeout_ms))
        .open()
        .with_context(|| format!("cannot open {}", args.port))?;
    log::info!("opened {} at {} baud", args.port, args.baud);
    let mut link = Link::new(port);
    match args.command {
        Command::Monitor { cycles } => monitor(&mut link, cycles),
        Command::Ready => {
            link.send(&Message::ReadyRequest)?;
            wait_ready(&mut link)?;
            println!("ready");
            Ok(())
        }
        Command::Send { request } => {
            wait_ready(&mut link)?;
            link.send(&request.to_message())?;
            wait_ready(&mut link)
        }
    }
}
