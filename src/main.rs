use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use wmbus_radio::logging::{init_logger_with_level, log_error, log_info};
use wmbus_radio::util::hex::decode_hex;
use wmbus_radio::{Frame, Packet, Receiver, ReceiverConfig, ReplayRadio};

#[derive(Parser)]
#[command(name = "wmbus-radio")]
#[command(about = "Assemble and validate wireless M-Bus radio packets")]
struct Cli {
    /// Default log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one on-air capture
    Decode {
        hex: String,
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        rssi: i8,
        #[arg(long)]
        json: bool,
    },
    /// Show link mode, L-field and expected size of a capture head
    Size { hex: String },
    /// Replay capture lines `<hex>[ <rssi>]` through the receiver
    Replay {
        /// Capture file, stdin when omitted
        file: Option<PathBuf>,
        /// Bytes per simulated FIFO read
        #[arg(long)]
        chunk: Option<usize>,
        /// Receiver configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn render(frame: &Frame, json: bool) -> anyhow::Result<String> {
    if json {
        let record = frame.to_record(Utc::now());
        Ok(serde_json::to_string(&record)? + "\n")
    } else {
        Ok(frame.as_rtlwmbus())
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger_with_level(cli.log_level.into())?;

    match cli.command {
        Commands::Decode { hex, rssi, json } => {
            let bytes = decode_hex(&hex).context("invalid capture")?;
            let mut packet = Packet::from_bytes(&bytes);
            packet.set_rssi(rssi);
            match packet.try_into_frame() {
                Ok(frame) => print!("{}", render(&frame, json)?),
                Err(reason) => bail!("packet dropped: {reason}"),
            }
        }
        Commands::Size { hex } => {
            let bytes = decode_hex(&hex).context("invalid capture")?;
            let mut packet = Packet::from_bytes(&bytes);
            let mode = packet.link_mode();
            let l_field = packet.l_field();
            let expected = packet.expected_size();
            println!(
                "mode={} l_field={} expected_size={} received={}",
                mode,
                l_field.map_or("?".to_string(), |l| l.to_string()),
                expected.map_or("?".to_string(), |s| s.to_string()),
                bytes.len()
            );
        }
        Commands::Replay {
            file,
            chunk,
            config,
            json,
        } => {
            let mut config = match config {
                Some(path) => ReceiverConfig::from_json_file(&path)
                    .with_context(|| format!("loading {}", path.display()))?,
                None => ReceiverConfig::default(),
            };
            if let Some(chunk) = chunk {
                config.chunk_size = chunk.max(1);
            }

            let radio = match file {
                Some(path) => {
                    let file = File::open(&path)
                        .with_context(|| format!("opening {}", path.display()))?;
                    ReplayRadio::from_reader(BufReader::new(file), config.chunk_size)?
                }
                None => ReplayRadio::from_reader(io::stdin().lock(), config.chunk_size)?,
            };

            let mut receiver = Receiver::new(radio, config);
            receiver.add_frame_handler(move |frame| match render(frame, json) {
                Ok(line) => {
                    print!("{line}");
                    frame.mark_as_handled();
                }
                Err(e) => log_error(&format!("cannot render frame: {e}")),
            });
            let stats = receiver.run()?;
            log_info(&format!(
                "{} transmissions, {} frames, {} dropped",
                stats.transmissions, stats.frames_decoded, stats.packets_dropped
            ));
        }
    }

    Ok(())
}
