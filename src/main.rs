// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `hs100` command-line tool.
//!
//! Usage:
//!   hs100 on 192.168.0.20          # Switch the relay on
//!   hs100 ledoff 192.168.0.20      # Switch the LED off
//!   hs100 info 192.168.0.20        # Print system information
//!   hs100 emeter 192.168.0.20      # Print a realtime energy reading
//!   hs100 -c hs100.toml daemon     # Run the request daemon

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hs100::daemon::{Daemon, Task};
use hs100::{Config, ConfigError, Device, SwitchAction, TcpDeviceBuilder};

#[derive(Parser)]
#[command(name = "hs100", version)]
#[command(about = "Control TP-Link HS100/HS110 smart plugs", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Plug TCP port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the device's relay on
    On {
        /// Plug address
        address: Option<String>,
    },

    /// Turn the device's relay off
    Off {
        /// Plug address
        address: Option<String>,
    },

    /// Turn the device's LED on
    Ledon {
        /// Plug address
        address: Option<String>,
    },

    /// Turn the device's LED off
    Ledoff {
        /// Plug address
        address: Option<String>,
    },

    /// Print the device's system information
    Info {
        /// Plug address
        address: Option<String>,
    },

    /// Print a realtime energy reading (HS110 only)
    Emeter {
        /// Plug address
        address: Option<String>,
    },

    /// Apply request files and publish the device status
    Daemon {
        /// Plug address
        #[arg(short, long)]
        address: Option<String>,

        /// Directory request files are moved into
        #[arg(short, long)]
        requests_dir: Option<PathBuf>,

        /// File the status is published to
        #[arg(short, long)]
        status_file: Option<PathBuf>,

        /// File the process ID is written to
        #[arg(long)]
        pid_file: Option<PathBuf>,

        /// Seconds without requests before the status is refreshed
        #[arg(long)]
        idle_timeout: Option<u64>,
    },
}

/// Failure of a CLI run, mapped to an exit code.
enum Failure {
    Config(ConfigError),
    Command(String),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Self::Config(e) => e.exit_code(),
            Self::Command(_) => 1,
        }
    }
}

impl From<ConfigError> for Failure {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<hs100::Error> for Failure {
    fn from(e: hs100::Error) -> Self {
        Self::Command(e.to_string())
    }
}

impl From<hs100::DaemonError> for Failure {
    fn from(e: hs100::DaemonError) -> Self {
        Self::Command(e.to_string())
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(e) => e.fmt(f),
            Self::Command(message) => f.write_str(message),
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {failure}");
            ExitCode::from(failure.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), Failure> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(port) = cli.port {
        config.device.port = port;
    }

    match cli.command {
        Commands::On { address } => switch(config, address, SwitchAction::RelayOn).await,
        Commands::Off { address } => switch(config, address, SwitchAction::RelayOff).await,
        Commands::Ledon { address } => switch(config, address, SwitchAction::LedOn).await,
        Commands::Ledoff { address } => switch(config, address, SwitchAction::LedOff).await,
        Commands::Info { address } => info(config, address).await,
        Commands::Emeter { address } => emeter(config, address).await,
        Commands::Daemon {
            address,
            requests_dir,
            status_file,
            pid_file,
            idle_timeout,
        } => {
            if address.is_some() {
                config.device.address = address;
            }
            if requests_dir.is_some() {
                config.daemon.requests_dir = requests_dir;
            }
            if status_file.is_some() {
                config.daemon.status_file = status_file;
            }
            if pid_file.is_some() {
                config.daemon.pid_file = pid_file;
            }
            if let Some(secs) = idle_timeout {
                config.daemon.idle_timeout = secs;
            }
            daemon(&config).await
        }
    }
}

fn device(mut config: Config, address: Option<String>) -> Result<TcpDeviceBuilder, Failure> {
    if address.is_some() {
        config.device.address = address;
    }
    let settings = config.tcp_settings()?;
    Ok(Device::tcp_config(settings.to_tcp_config()))
}

async fn switch(
    config: Config,
    address: Option<String>,
    action: SwitchAction,
) -> Result<(), Failure> {
    let device = device(config, address)?.build();
    action.apply(&device).await?;
    tracing::info!(action = %action, "Done: {}", action.description());
    Ok(())
}

async fn info(config: Config, address: Option<String>) -> Result<(), Failure> {
    let device = device(config, address)?.build();
    let payload = device.simple_call("system", "get_sysinfo", None).await?;
    let pretty = serde_json::to_string_pretty(&payload)
        .map_err(|e| Failure::Command(e.to_string()))?;
    println!("{pretty}");
    Ok(())
}

async fn emeter(config: Config, address: Option<String>) -> Result<(), Failure> {
    let device = device(config, address)?.probe().await?;
    let reading = device.emeter_realtime().await?;
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.3}"));
    println!("voltage: {} V", show(reading.voltage()));
    println!("current: {} A", show(reading.current()));
    println!("power:   {} W", show(reading.power()));
    println!("total:   {} kWh", show(reading.total()));
    Ok(())
}

async fn daemon(config: &Config) -> Result<(), Failure> {
    let settings = config.daemon_settings()?;
    let daemon = Daemon::from_settings(&settings);

    let handle = daemon.handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received");
            handle.enqueue(Task::Shutdown);
        }
    });

    tracing::info!(
        address = %settings.device.address,
        port = settings.device.port,
        timeout_secs = settings.device.timeout.as_secs(),
        "Controlling plug"
    );
    daemon.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn daemon_flags_parse() {
        let cli = Cli::try_parse_from([
            "hs100",
            "-p",
            "10000",
            "daemon",
            "-a",
            "plug",
            "-r",
            "/tmp/requests",
            "-s",
            "/tmp/status.json",
            "--idle-timeout",
            "5",
        ])
        .unwrap();
        assert_eq!(cli.port, Some(10000));
        match cli.command {
            Commands::Daemon {
                address,
                requests_dir,
                idle_timeout,
                ..
            } => {
                assert_eq!(address.as_deref(), Some("plug"));
                assert_eq!(requests_dir, Some(PathBuf::from("/tmp/requests")));
                assert_eq!(idle_timeout, Some(5));
            }
            _ => panic!("expected daemon command"),
        }
    }

    #[test]
    fn missing_address_exits_with_two() {
        let err = device(Config::default(), None).err().map(|f| f.exit_code());
        assert_eq!(err, Some(2));
    }

    #[test]
    fn address_argument_overrides_config() {
        let device = device(Config::default(), Some("plug".into()))
            .ok()
            .map(|builder| builder.build().protocol().config().address());
        assert_eq!(device.as_deref(), Some("plug:9999"));
    }
}
