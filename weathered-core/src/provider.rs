//! Collaborator seams: the geocoding and weather services the views depend on.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{Place, WeatherQuery, WeatherReport},
};

pub mod openweather;

pub use openweather::OpenWeatherClient;

/// Resolves free-text place names to candidate locations.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// Signals a missing credential without touching the network.
    fn ensure_credential(&self) -> Result<(), WeatherError> {
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Place>, WeatherError>;
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn ensure_credential(&self) -> Result<(), WeatherError> {
        Ok(())
    }

    async fn get_weather(&self, query: &WeatherQuery) -> Result<WeatherReport, WeatherError>;
}
