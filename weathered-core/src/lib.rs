//! Core library for the `weathered` weather lookup.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The geocoding / weather collaborators and their OpenWeather implementation
//! - The debounced city autocomplete controller
//! - Mapping of weather results to what the screen displays
//!
//! It is used by `weathered-cli`, but the controller is front-end agnostic.

pub mod autocomplete;
pub mod config;
pub mod display;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod provider;

pub use autocomplete::{CityAutocomplete, PointerTarget, SuggestionView, UiState};
pub use config::Config;
pub use display::{WeatherCard, WeatherScreen};
pub use error::{GeolocationError, WeatherError};
pub use geolocation::{ConfiguredLocation, Geolocator};
pub use model::{Coordinates, Place, WeatherQuery, WeatherReport};
pub use provider::{Geocoder, OpenWeatherClient, WeatherProvider};
