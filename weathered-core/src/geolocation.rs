use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::GeolocationError, model::Coordinates};

/// Source of the user's current position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Reports the home coordinates from configuration, if any were set.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    home: Option<Coordinates>,
}

impl ConfiguredLocation {
    pub fn new(home: Option<Coordinates>) -> Self {
        Self { home }
    }
}

#[async_trait]
impl Geolocator for ConfiguredLocation {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.home.ok_or(GeolocationError::Unavailable)
    }
}
