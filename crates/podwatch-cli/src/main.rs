mod logging;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};

use podwatch_core::prelude::*;

use crate::logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "podwatch", version, about = "Passive sniffer for the iPod accessory serial link")]
struct Cli {
    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch both sides of a conversation and print the decoded transcript
    Watch(WatchArgs),
    /// List detected serial ports
    Ports,
}

#[derive(Args, Debug)]
struct WatchArgs {
    /// Serial device tapped on the accessory (request) side
    request_port: String,

    /// Serial device tapped on the player (response) side
    response_port: String,

    /// Baud rate for both taps
    #[arg(long, default_value_t = 38400)]
    baud: u32,

    /// Per-read timeout in milliseconds; also the shutdown poll interval
    #[arg(long, value_name = "MS", default_value_t = 250)]
    timeout_ms: u64,

    /// Transcript format
    #[arg(long, value_enum, default_value = "text")]
    format: Format,

    /// Stop capturing after this many seconds
    #[arg(long, value_name = "SECS")]
    duration: Option<u64>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

static SHUTDOWN: OnceLock<Arc<AtomicBool>> = OnceLock::new();

#[cfg(target_family = "unix")]
fn install_sigint(flag: Arc<AtomicBool>) {
    extern "C" fn on_sigint(_sig: libc::c_int) {
        if let Some(flag) = SHUTDOWN.get() {
            flag.store(true, Ordering::SeqCst);
        }
    }

    let _ = SHUTDOWN.set(flag);
    let handler: extern "C" fn(libc::c_int) = on_sigint;
    unsafe {
        libc::signal(libc::SIGINT, handler as libc::sighandler_t);
    }
}

#[cfg(not(target_family = "unix"))]
fn install_sigint(flag: Arc<AtomicBool>) {
    // No handler on this platform; Ctrl-C falls back to hard termination.
    let _ = SHUTDOWN.set(flag);
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level);

    let result = match cli.command {
        Command::Watch(args) => watch(args),
        Command::Ports => ports(),
    };

    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn watch(args: WatchArgs) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    install_sigint(Arc::clone(&shutdown));

    if let Some(secs) = args.duration {
        let flag = Arc::clone(&shutdown);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_secs(secs));
            tracing::info!(secs, "capture duration elapsed");
            flag.store(true, Ordering::SeqCst);
        });
    }

    let request = SerialByteSource::open(
        &args.request_port,
        Some(args.baud),
        Some(args.timeout_ms),
    )
    .with_context(|| format!("opening request-side port {}", args.request_port))?;

    let response = SerialByteSource::open(
        &args.response_port,
        Some(args.baud),
        Some(args.timeout_ms),
    )
    .with_context(|| format!("opening response-side port {}", args.response_port))?;

    let sink = Arc::new(TranscriptSink::stdout());
    Watcher::new(sink, shutdown)
        .with_format(args.format.into())
        .run(request, response)
        .context("capture session failed")?;

    Ok(())
}

fn ports() -> anyhow::Result<()> {
    let ports = list_ports();
    if ports.is_empty() {
        println!("no serial ports detected");
        return Ok(());
    }

    for port in ports {
        let usb = match (port.vid, port.pid) {
            (Some(vid), Some(pid)) => format!(" [{:04x}:{:04x}]", vid, pid),
            _ => String::new(),
        };
        let product = port.product.as_deref().unwrap_or("");
        println!("{}{} {}", port.name, usb, product);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_watch_subcommand() {
        let cli = Cli::try_parse_from([
            "podwatch",
            "watch",
            "/dev/ttyUSB0",
            "/dev/ttyUSB1",
            "--baud",
            "19200",
            "--format",
            "json",
        ])
        .expect("watch args should parse");

        match cli.command {
            Command::Watch(args) => {
                assert_eq!(args.request_port, "/dev/ttyUSB0");
                assert_eq!(args.response_port, "/dev/ttyUSB1");
                assert_eq!(args.baud, 19200);
                assert!(matches!(args.format, Format::Json));
                assert_eq!(args.timeout_ms, 250);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn watch_requires_both_ports() {
        let err = Cli::try_parse_from(["podwatch", "watch", "/dev/ttyUSB0"])
            .expect_err("single port should fail");
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    fn parses_ports_subcommand() {
        let cli = Cli::try_parse_from(["podwatch", "ports"]).expect("ports should parse");
        assert!(matches!(cli.command, Command::Ports));
    }

    #[test]
    fn format_maps_to_core() {
        assert_eq!(OutputFormat::from(Format::Text), OutputFormat::Text);
        assert_eq!(OutputFormat::from(Format::Json), OutputFormat::Json);
    }
}
