//! ffbctl - ForceRelay actuator test driver
//!
//! Sends the same datagrams the in-process relay sends, so an actuator can
//! be exercised and soak-tested without launching a host application.

#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forcerelay_channel::{ChannelTarget, UdpCommandChannel};
use forcerelay_control_protocol::{DEFAULT_HOST, DEFAULT_PORT};

#[derive(Parser)]
#[command(name = "ffbctl")]
#[command(about = "ForceRelay actuator test driver - send CONST/STOP datagrams by hand")]
#[command(version)]
struct Cli {
    /// Actuator host
    #[arg(long, global = true, env = "FFB_HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Actuator UDP port
    #[arg(long, global = true, env = "FFB_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hold a constant force, then stop
    Const {
        /// Force value, -100 (full left) to 100 (full right)
        #[arg(value_parser = clap::value_parser!(i8).range(-100..=100))]
        value: i8,
        /// How long to hold the force before stopping, milliseconds
        #[arg(long, default_value_t = 1_000)]
        hold_ms: u64,
        /// Resend interval while holding, milliseconds
        #[arg(long, default_value_t = 200)]
        interval_ms: u64,
    },

    /// Send a single stop command
    Stop,

    /// Step the force through a fixed staircase and back
    Sweep {
        /// Dwell time per step, milliseconds
        #[arg(long, default_value_t = 300)]
        interval_ms: u64,
    },

    /// Translate a raw device magnitude and send the result
    Magnitude {
        /// Magnitude in device units, -10000 to 10000
        #[arg(value_parser = clap::value_parser!(i32).range(-10_000..=10_000))]
        value: i32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ffbctl={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let channel = UdpCommandChannel::new(ChannelTarget::new(cli.host, cli.port));
    match cli.command {
        Commands::Const {
            value,
            hold_ms,
            interval_ms,
        } => commands::run_const(&channel, value, hold_ms, interval_ms),
        Commands::Stop => commands::run_stop(&channel),
        Commands::Sweep { interval_ms } => commands::run_sweep(&channel, interval_ms),
        Commands::Magnitude { value } => commands::run_magnitude(&channel, value),
    }
    Ok(())
}
