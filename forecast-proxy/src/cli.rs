use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use forecast_core::{Config, ForecastQuery, ForecastService};
use forecast_proxy::server;
use inquire::{Password, PasswordDisplayMode};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast-proxy", version, about = "Tee-time weather forecast proxy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP proxy.
    Serve {
        /// Address to listen on, overriding the config file (e.g. "127.0.0.1:8080").
        #[arg(long)]
        bind: Option<String>,
    },

    /// Store the WeatherAPI.com API key in the config file.
    Configure,

    /// Fetch a single forecast and print it as JSON.
    Show {
        /// Address or location name.
        location: String,

        /// Calendar date, e.g. "2025-08-19".
        #[arg(long)]
        date: String,

        /// Tee time, e.g. "11:20 AM".
        #[arg(long)]
        time: String,
    },

    /// Print the config file location.
    ConfigPath,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let mut config = Config::load()?;
                if let Some(bind) = bind {
                    config.server.bind_address = bind;
                }
                server::serve(&config).await?;
            }
            Command::Configure => {
                // Env overrides are left out so they never get written to disk.
                let path = Config::config_file_path()?;
                let mut config = Config::load_from(&path)?;

                let api_key = Password::new("WeatherAPI.com API key:")
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                if api_key.trim().is_empty() {
                    bail!("API key must not be empty");
                }

                config.set_api_key(api_key);
                config.save_to(&path)?;
                println!("Saved WeatherAPI.com API key to {}", path.display());
            }
            Command::Show { location, date, time } => {
                let config = Config::load()?;
                let service = ForecastService::from_config(&config)?;

                let forecast = service.forecast(&ForecastQuery::new(location, date, time)).await?;
                println!("{}", serde_json::to_string_pretty(&forecast)?);
            }
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
            }
        }

        Ok(())
    }
}
