use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Password, PasswordDisplayMode, Text};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;
use weathered_core::{
    CityAutocomplete, Config, ConfiguredLocation, Coordinates, OpenWeatherClient, WeatherProvider,
    WeatherQuery, WeatherScreen,
};

use crate::{
    completer::{CityCompleter, ERROR_PREFIX},
    render,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathered", version, about = "City weather lookup with live suggestions")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and an optional home location.
    Configure,

    /// Show current weather for a city or coordinates.
    Show {
        /// City name, e.g. "Paris" or "Paris, TX, US". Omit to use your location.
        #[arg(conflicts_with_all = ["lat", "lon"])]
        city: Option<String>,

        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Show weather for your current location.
    Here,

    /// Print city suggestions for a partial name.
    Suggest {
        /// Partial city name.
        text: String,
    },

    /// Search a city interactively with live suggestions.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city, lat, lon } => show(city, lat.zip(lon)).await,
            Command::Here => here().await,
            Command::Suggest { text } => suggest(&text).await,
            Command::Search => search().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key.trim().to_owned());

    let latitude = CustomType::<f64>::new("Home latitude (optional):")
        .with_error_message("Please enter a number, e.g. 48.85")
        .prompt_skippable()
        .context("Failed to read latitude")?;
    let home = match latitude {
        Some(latitude) => {
            let longitude = CustomType::<f64>::new("Home longitude:")
                .with_error_message("Please enter a number, e.g. 2.35")
                .prompt()
                .context("Failed to read longitude")?;
            Some(Coordinates { latitude, longitude })
        }
        None => config.home,
    };
    config.set_home(home);

    if config.api_key().is_none() {
        eprintln!("Warning: the key looks like a placeholder and will be treated as missing.");
    }

    let path = config.save()?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

async fn show(city: Option<String>, coords: Option<(f64, f64)>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = OpenWeatherClient::from_config(&config);
    let mut screen = WeatherScreen::default();

    match (city, coords) {
        (Some(city), _) => {
            let city = city.trim();
            if city.is_empty() {
                debug!("ignoring empty city name");
                return Ok(());
            }
            screen.load(&provider, &WeatherQuery::City(city.to_owned())).await;
        }
        (None, Some((latitude, longitude))) => {
            let query = WeatherQuery::Coordinates(Coordinates { latitude, longitude });
            screen.load(&provider, &query).await;
        }
        (None, None) => {
            let geolocator = ConfiguredLocation::new(config.home);
            screen.bootstrap(&geolocator, &provider).await;
            if screen.report.is_none() && screen.error.is_none() {
                eprintln!(
                    "No location available. Pass a city name, or set a home location with `weathered configure`."
                );
            }
        }
    }

    render::print_screen(&screen);
    Ok(())
}

async fn here() -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = Arc::new(OpenWeatherClient::from_config(&config));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let search_bar = CityAutocomplete::new(client.clone(), tx)
        .with_geolocator(Arc::new(ConfiguredLocation::new(config.home)));

    if search_bar.locate().await.is_err() {
        if let Some(notice) = search_bar.view().notice {
            render::print_notice(&notice);
        }
        return Ok(());
    }

    if let Some(query) = rx.recv().await {
        load_and_print(client.as_ref(), &query).await;
    }
    Ok(())
}

async fn suggest(text: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = Arc::new(OpenWeatherClient::from_config(&config));
    let (tx, _rx) = mpsc::unbounded_channel();
    let search_bar = CityAutocomplete::new(client, tx);

    search_bar.on_input(text);
    search_bar.settled().await;

    render::print_suggestions(&search_bar.view());
    Ok(())
}

async fn search() -> anyhow::Result<()> {
    let config = Config::load()?;
    let client = Arc::new(OpenWeatherClient::from_config(&config));
    let (tx, mut rx) = mpsc::unbounded_channel();
    let search_bar = Arc::new(
        CityAutocomplete::new(client.clone(), tx)
            .with_geolocator(Arc::new(ConfiguredLocation::new(config.home))),
    );

    let completer = CityCompleter::new(Arc::clone(&search_bar));
    // The prompt blocks on terminal input; suggestion timers keep running on the other workers.
    let answer = tokio::task::block_in_place(|| {
        Text::new("City:")
            .with_help_message("type to search, ↑↓ to pick, enter to confirm, esc to cancel")
            .with_autocomplete(completer)
            .prompt_skippable()
    })
    .context("Failed to read city")?;

    let Some(answer) = answer else {
        return Ok(());
    };
    if let Some(error) = answer.strip_prefix(ERROR_PREFIX) {
        eprintln!("{error}");
        return Ok(());
    }

    let picked = search_bar.view().suggestions.iter().position(|s| *s == answer);
    let committed = match picked {
        Some(index) => search_bar.select(index),
        None => {
            search_bar.on_input(&answer);
            search_bar.submit()
        }
    };
    if committed.is_none() {
        return Ok(());
    }

    if let Some(query) = rx.recv().await {
        load_and_print(client.as_ref(), &query).await;
    }
    Ok(())
}

async fn load_and_print(provider: &dyn WeatherProvider, query: &WeatherQuery) {
    let mut screen = WeatherScreen::default();
    screen.load(provider, query).await;
    render::print_screen(&screen);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["weathered", "show", "--lat", "-33.87", "--lon", "151.21"])
            .expect("coordinates should parse");

        match cli.command {
            Command::Show { city, lat, lon } => {
                assert_eq!(city, None);
                assert_eq!(lat.zip(lon), Some((-33.87, 151.21)));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_rejects_city_with_coordinates() {
        let parsed =
            Cli::try_parse_from(["weathered", "show", "Paris", "--lat", "1", "--lon", "2"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn show_requires_both_coordinates() {
        let parsed = Cli::try_parse_from(["weathered", "show", "--lat", "1"]);
        assert!(parsed.is_err());
    }
}
